//! # 晶体结构数据模型
//!
//! 两种文件格式共用的晶体结构表示。原子按文件顺序存储；
//! 按元素分组的顺序不存储，而是由 [`Structure::species_grouping`] 派生，
//! 并记录分组顺序与原始顺序之间的置换。
//!
//! ## 依赖关系
//! - 被 `parsers/` 和 `phonon/` 使用
//! - 使用 `models/mat3.rs`

use crate::error::{PhonomatError, Result};
use crate::models::mat3::{self, Mat3, Vec3};
use serde::{Deserialize, Serialize};

/// 晶格参数表示
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lattice {
    /// 晶格向量矩阵 (3x3)，行向量表示 a, b, c
    /// [[a1, a2, a3], [b1, b2, b3], [c1, c2, c3]]
    pub matrix: Mat3,
}

impl Lattice {
    /// 从晶格向量矩阵创建
    pub fn from_vectors(matrix: Mat3) -> Self {
        Lattice { matrix }
    }

    /// 计算晶格体积（带符号，右手系为正）
    pub fn volume(&self) -> f64 {
        mat3::determinant(&self.matrix)
    }

    /// 分数坐标转笛卡尔坐标
    pub fn to_cartesian(&self, frac: &Vec3) -> Vec3 {
        mat3::vec_mul(frac, &self.matrix)
    }
}

/// 原子信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    /// 元素符号
    pub element: String,

    /// 原子序数
    pub atomic_number: u32,

    /// 分数坐标 [x, y, z]
    pub position: Vec3,
}

impl Atom {
    pub fn new(element: impl Into<String>, atomic_number: u32, position: Vec3) -> Self {
        Atom {
            element: element.into(),
            atomic_number,
            position,
        }
    }
}

/// 晶体结构
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Structure {
    /// 晶格
    lattice: Lattice,

    /// 原子列表（文件顺序）
    atoms: Vec<Atom>,

    /// 可选：每原子磁矩（文件顺序）
    magnetic_moments: Option<Vec<f64>>,
}

impl Structure {
    /// 创建结构，晶格必须满足右手规则
    pub fn new(lattice: Lattice, atoms: Vec<Atom>) -> Result<Self> {
        let det = lattice.volume();
        if det <= 0.0 {
            return Err(PhonomatError::LeftHandedLattice { det });
        }

        Ok(Structure {
            lattice,
            atoms,
            magnetic_moments: None,
        })
    }

    /// 附加磁矩，数量必须与原子数一致
    pub fn with_magnetic_moments(mut self, moments: Vec<f64>) -> Result<Self> {
        if moments.len() != self.atoms.len() {
            return Err(PhonomatError::InvalidArgument(format!(
                "Invalid MAGMOM setting: {} moments for {} atoms",
                moments.len(),
                self.atoms.len()
            )));
        }
        self.magnetic_moments = Some(moments);
        Ok(self)
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn num_atoms(&self) -> usize {
        self.atoms.len()
    }

    pub fn magnetic_moments(&self) -> Option<&[f64]> {
        self.magnetic_moments.as_deref()
    }

    pub fn positions(&self) -> Vec<Vec3> {
        self.atoms.iter().map(|a| a.position).collect()
    }

    /// 按元素首次出现顺序分组
    pub fn species_grouping(&self) -> SpeciesGrouping {
        let mut symbols: Vec<String> = Vec::new();
        for atom in &self.atoms {
            if !symbols.contains(&atom.element) {
                symbols.push(atom.element.clone());
            }
        }

        let mut counts = vec![0; symbols.len()];
        let mut sort_list = Vec::with_capacity(self.atoms.len());
        for (i, symbol) in symbols.iter().enumerate() {
            for (j, atom) in self.atoms.iter().enumerate() {
                if &atom.element == symbol {
                    sort_list.push(j);
                    counts[i] += 1;
                }
            }
        }

        SpeciesGrouping {
            symbols,
            counts,
            sort_list,
        }
    }
}

/// 元素分组结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeciesGrouping {
    /// 元素符号（首次出现顺序）
    pub symbols: Vec<String>,

    /// 每种元素的原子数
    pub counts: Vec<usize>,

    /// 分组序号 -> 原始序号
    pub sort_list: Vec<usize>,
}

impl SpeciesGrouping {
    /// 原始序号 -> 分组序号
    pub fn grouped_index(&self) -> Vec<usize> {
        let mut inverse = vec![0; self.sort_list.len()];
        for (grouped, &original) in self.sort_list.iter().enumerate() {
            inverse[original] = grouped;
        }
        inverse
    }

    /// 按分组顺序重排任意逐原子数据
    pub fn apply<T: Clone>(&self, per_atom: &[T]) -> Vec<T> {
        self.sort_list.iter().map(|&i| per_atom[i].clone()).collect()
    }
}

/// 将分数坐标约化到 [0, 1)
///
/// 先减去最近整数（四舍六入五成双），若保留 16 位小数后为负则加 1。
/// 保留 16 位小数后为 0 的值统一为 +0.0，加 1 后舍入为 1 的值同样归零。
pub fn reduce_fraction(x: f64) -> f64 {
    let x = x - x.round_ties_even();
    let rounded = round16(x);

    if rounded < 0.0 {
        let wrapped = x + 1.0;
        if round16(wrapped) >= 1.0 {
            0.0
        } else {
            wrapped
        }
    } else if rounded == 0.0 {
        0.0
    } else {
        x
    }
}

fn round16(x: f64) -> f64 {
    format!("{:.16}", x).parse().unwrap_or(x)
}

pub fn reduce_position(p: &Vec3) -> Vec3 {
    [reduce_fraction(p[0]), reduce_fraction(p[1]), reduce_fraction(p[2])]
}
