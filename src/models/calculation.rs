//! # 计算报告数据模型
//!
//! 存储从 vasprun.xml 计算报告中提取的全部结果。
//! 重复出现的段落（例如每个离子步一次的 forces）按文档顺序累积为序列。
//!
//! ## 依赖关系
//! - 被 `parsers/vasprun` 构造
//! - 被 `phonon/force_constants.rs`, `commands/` 使用

use crate::error::{PhonomatError, Result};
use crate::models::element;
use crate::models::mat3::{Mat3, Vec3};
use crate::models::structure::{Atom, Lattice, Structure};

/// `<array name="atomtypes">` 中的一行
#[derive(Debug, Clone, PartialEq)]
pub struct AtomType {
    pub count: usize,
    pub element: String,
    pub mass: f64,
    pub valence: f64,
}

/// 计算报告解析结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalculationReport {
    /// 每个 `forces` 段一个 (num_atoms × 3)
    pub forces: Vec<Vec<Vec3>>,

    /// 每个 `stress` 段一个 3x3
    pub stress: Vec<Mat3>,

    /// 最后一个 `epsilon` 段
    pub epsilon: Option<Mat3>,

    /// Born 有效电荷，每原子一个（文件顺序）
    pub born_charges: Vec<Mat3>,

    /// 晶格快照（不含命名的 initialpos/finalpos 结构）
    pub lattices: Vec<Mat3>,

    /// 分数坐标快照（不含命名的 initialpos/finalpos 结构）
    pub positions: Vec<Vec<Vec3>>,

    /// 每原子元素符号
    pub symbols: Vec<String>,

    pub atom_types: Vec<AtomType>,

    /// 每个 `<energy>` 块的数值（不含电子自洽步内的中间能量）
    pub energies: Vec<Vec<f64>>,

    pub efermi: Option<f64>,

    pub k_weights: Vec<f64>,

    /// [spin][kpoint][band] -> (eigenvalue, occupation, ...)
    pub eigenvalues: Vec<Vec<Vec<Vec<f64>>>>,

    /// [spin][kpoint][band][ion] -> 投影特征
    pub projectors: Vec<Vec<Vec<Vec<Vec<f64>>>>>,

    /// 质量归一化的 Hessian 行（3N × 3N）
    pub hessian: Option<Vec<Vec<f64>>>,

    /// 是否对旧版本写出的报告启用了预处理过滤
    pub legacy_filter_applied: bool,
}

impl CalculationReport {
    /// 按原子展开的质量
    pub fn masses(&self) -> Vec<f64> {
        self.atom_types
            .iter()
            .flat_map(|t| std::iter::repeat(t.mass).take(t.count))
            .collect()
    }

    /// 元素列表（atomtypes 顺序）
    pub fn elements(&self) -> Vec<String> {
        self.atom_types.iter().map(|t| t.element.clone()).collect()
    }

    /// 由最后一组晶格与坐标组装结构
    pub fn final_structure(&self, source: &str) -> Result<Structure> {
        let missing = |what: &str| PhonomatError::MissingData {
            what: what.to_string(),
            path: source.to_string(),
        };

        let lattice = self.lattices.last().ok_or_else(|| missing("basis"))?;
        let positions = self.positions.last().ok_or_else(|| missing("positions"))?;

        if positions.len() != self.symbols.len() {
            return Err(PhonomatError::MalformedStructure(format!(
                "{} positions but {} atom symbols in {}",
                positions.len(),
                self.symbols.len(),
                source
            )));
        }

        let mut atoms = Vec::with_capacity(positions.len());
        for (symbol, position) in self.symbols.iter().zip(positions) {
            let z = element::atomic_number_of(symbol).ok_or_else(|| {
                PhonomatError::MalformedStructure(format!("Unknown element symbol '{}'", symbol))
            })?;
            atoms.push(Atom::new(symbol.clone(), z, *position));
        }

        Structure::new(Lattice::from_vectors(*lattice), atoms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masses_expand_by_count() {
        let report = CalculationReport {
            atom_types: vec![
                AtomType {
                    count: 2,
                    element: "Si".to_string(),
                    mass: 28.085,
                    valence: 4.0,
                },
                AtomType {
                    count: 1,
                    element: "O".to_string(),
                    mass: 16.0,
                    valence: 6.0,
                },
            ],
            ..Default::default()
        };
        assert_eq!(report.masses(), vec![28.085, 28.085, 16.0]);
        assert_eq!(report.elements(), vec!["Si", "O"]);
    }

    #[test]
    fn test_final_structure_requires_snapshots() {
        let report = CalculationReport::default();
        let err = report.final_structure("vasprun.xml").unwrap_err();
        assert!(matches!(err, PhonomatError::MissingData { .. }));
    }

    #[test]
    fn test_final_structure_uses_last_snapshot() {
        let report = CalculationReport {
            lattices: vec![
                [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
                [[2.0, 0.0, 0.0], [0.0, 2.0, 0.0], [0.0, 0.0, 2.0]],
            ],
            positions: vec![vec![[0.0; 3], [0.5; 3]], vec![[0.1; 3], [0.6; 3]]],
            symbols: vec!["Na".to_string(), "Cl".to_string()],
            ..Default::default()
        };
        let s = report.final_structure("vasprun.xml").unwrap();
        assert_eq!(s.lattice().matrix[0][0], 2.0);
        assert_eq!(s.atoms()[1].element, "Cl");
        assert_eq!(s.atoms()[1].atomic_number, 17);
        assert_eq!(s.atoms()[0].position, [0.1; 3]);
    }
}
