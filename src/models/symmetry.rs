//! # 对称操作与外部协作接口
//!
//! 本模块不做对称性分析，只定义外部提供的数据形状：
//! - [`SymmetryFinder`]：给定结构与容差返回空间群操作（分数坐标下的旋转 + 平移）
//! - [`CellMapper`]：根据变换矩阵构造超胞、原胞并返回原子序号映射
//!
//! 另外提供关闭对称性时使用的 [`IdentitySymmetry`]，
//! 以及按整数超胞矩阵与原胞矩阵直接构造晶胞的 [`LatticeCellMapper`]。
//!
//! ## 依赖关系
//! - 被 `phonon/born.rs`, `phonon/reduce.rs`, `commands/born.rs` 使用
//! - 使用 `models/structure.rs`, `models/mat3.rs`

use crate::error::{PhonomatError, Result};
use crate::models::mat3::{self, Mat3, Vec3};
use crate::models::structure::{reduce_position, Atom, Lattice, Structure};
use std::collections::HashMap;

pub type IntMat3 = [[i32; 3]; 3];

pub const INT_IDENTITY: IntMat3 = [[1, 0, 0], [0, 1, 0], [0, 0, 1]];

/// 单个空间群操作（分数坐标基）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymmetryOperation {
    pub rotation: IntMat3,
    pub translation: Vec3,
}

impl SymmetryOperation {
    pub fn identity() -> Self {
        SymmetryOperation {
            rotation: INT_IDENTITY,
            translation: [0.0; 3],
        }
    }

    /// 作用于分数坐标：`R·x + t`
    pub fn apply(&self, frac: &Vec3) -> Vec3 {
        let r = mat3::from_int(&self.rotation);
        let rx = mat3::mul_vec(&r, frac);
        [
            rx[0] + self.translation[0],
            rx[1] + self.translation[1],
            rx[2] + self.translation[2],
        ]
    }

    /// 将旋转从晶格基变换到笛卡尔基：`Lᵀ · R · (Lᵀ)⁻¹`
    pub fn cartesian_rotation(&self, lattice: &Mat3) -> Result<Mat3> {
        let lt = mat3::transpose(lattice);
        mat3::similarity(&lt, &mat3::from_int(&self.rotation)).ok_or_else(|| {
            PhonomatError::InvalidArgument("Lattice matrix is singular".to_string())
        })
    }
}

/// 对称操作集合
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SymmetryDataset {
    pub operations: Vec<SymmetryOperation>,
}

impl SymmetryDataset {
    pub fn new(operations: Vec<SymmetryOperation>) -> Self {
        SymmetryDataset { operations }
    }

    pub fn identity() -> Self {
        SymmetryDataset {
            operations: vec![SymmetryOperation::identity()],
        }
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// 点群操作：去重后的旋转部分
    pub fn point_group(&self) -> Vec<IntMat3> {
        let mut rotations: Vec<IntMat3> = Vec::new();
        for op in &self.operations {
            if !rotations.contains(&op.rotation) {
                rotations.push(op.rotation);
            }
        }
        rotations
    }

    /// 解析对称操作文本
    ///
    /// 每个操作占四行：三行整数旋转矩阵，一行平移向量；操作之间可用空行分隔。
    /// `#` 开头的行为注释。
    pub fn parse_text(content: &str) -> Result<Self> {
        let rows: Vec<Vec<&str>> = content
            .lines()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .map(|l| l.split_whitespace().collect())
            .collect();

        if rows.is_empty() || rows.len() % 4 != 0 {
            return Err(PhonomatError::InvalidArgument(format!(
                "Symmetry operations need 4 rows each, found {} rows",
                rows.len()
            )));
        }

        let mut operations = Vec::with_capacity(rows.len() / 4);
        for (k, block) in rows.chunks(4).enumerate() {
            let mut rotation = [[0; 3]; 3];
            for i in 0..3 {
                if block[i].len() != 3 {
                    return Err(PhonomatError::InvalidArgument(format!(
                        "Rotation row {} of operation {} must have 3 integers",
                        i + 1,
                        k + 1
                    )));
                }
                for j in 0..3 {
                    rotation[i][j] = block[i][j].parse().map_err(|_| {
                        PhonomatError::InvalidArgument(format!(
                            "Invalid rotation element '{}' in operation {}",
                            block[i][j],
                            k + 1
                        ))
                    })?;
                }
            }

            if block[3].len() != 3 {
                return Err(PhonomatError::InvalidArgument(format!(
                    "Translation of operation {} must have 3 values",
                    k + 1
                )));
            }
            let mut translation = [0.0; 3];
            for j in 0..3 {
                translation[j] = block[3][j].parse().map_err(|_| {
                    PhonomatError::InvalidArgument(format!(
                        "Invalid translation element '{}' in operation {}",
                        block[3][j],
                        k + 1
                    ))
                })?;
            }

            operations.push(SymmetryOperation {
                rotation,
                translation,
            });
        }

        Ok(SymmetryDataset { operations })
    }
}

/// 寻找原子 `target` 在操作下的原像：满足 `R·x_j + t ≡ x_target (mod 1)` 且距离最近的 `j`
///
/// 距离在笛卡尔空间中度量，超过 `tolerance` 视为未找到。
pub fn find_image_atom(
    structure: &Structure,
    op: &SymmetryOperation,
    target: usize,
    tolerance: f64,
) -> Option<usize> {
    let lattice = &structure.lattice().matrix;
    let atoms = structure.atoms();
    let x_target = atoms.get(target)?.position;

    let mut best: Option<(usize, f64)> = None;
    for (j, atom) in atoms.iter().enumerate() {
        let moved = op.apply(&atom.position);
        let mut diff = [0.0; 3];
        for k in 0..3 {
            let d = moved[k] - x_target[k];
            diff[k] = d - d.round();
        }
        let dist = mat3::norm(&mat3::vec_mul(&diff, lattice));
        if dist < tolerance && best.map_or(true, |(_, d)| dist < d) {
            best = Some((j, dist));
        }
    }

    best.map(|(j, _)| j)
}

/// 操作是否保持 `site` 不动
pub fn fixes_site(structure: &Structure, op: &SymmetryOperation, site: usize, tolerance: f64) -> bool {
    let lattice = &structure.lattice().matrix;
    let x = structure.atoms()[site].position;
    let moved = op.apply(&x);
    let mut diff = [0.0; 3];
    for k in 0..3 {
        let d = moved[k] - x[k];
        diff[k] = d - d.round();
    }
    mat3::norm(&mat3::vec_mul(&diff, lattice)) < tolerance
}

/// 对称性分析协作接口
pub trait SymmetryFinder {
    fn symmetry_operations(&self, structure: &Structure, tolerance: f64) -> Result<SymmetryDataset>;
}

/// 关闭对称性：只有恒等操作
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentitySymmetry;

impl SymmetryFinder for IdentitySymmetry {
    fn symmetry_operations(&self, _structure: &Structure, _tolerance: f64) -> Result<SymmetryDataset> {
        Ok(SymmetryDataset::identity())
    }
}

/// 预先给定的操作集合（例如从文本文件读入）
#[derive(Debug, Clone)]
pub struct FixedSymmetry(pub SymmetryDataset);

impl SymmetryFinder for FixedSymmetry {
    fn symmetry_operations(&self, _structure: &Structure, _tolerance: f64) -> Result<SymmetryDataset> {
        Ok(self.0.clone())
    }
}

/// 超胞及其序号映射
#[derive(Debug, Clone)]
pub struct Supercell {
    pub cell: Structure,

    /// 超胞中代表单胞原子的序号 -> 单胞序号
    pub unitcell_to_unitcell: HashMap<usize, usize>,
}

/// 原胞及其序号映射
#[derive(Debug, Clone)]
pub struct PrimitiveCell {
    pub cell: Structure,

    /// 原胞序号 -> 超胞序号
    pub primitive_to_supercell: Vec<usize>,
}

/// 晶胞构造协作接口
pub trait CellMapper {
    fn supercell(&self, unitcell: &Structure, supercell_matrix: &IntMat3, tolerance: f64) -> Result<Supercell>;

    fn primitive(&self, supercell: &Structure, primitive_matrix: &Mat3, tolerance: f64) -> Result<PrimitiveCell>;
}

/// 按晶格矩阵构造超胞与原胞
///
/// 约定与列向量形式一致：超胞晶格为 `Sᵀ·L`，原胞晶格为 `Pᵀ·L_s`（`L` 的行是晶格向量）。
/// 超胞中原子按 "单胞原子 × 格点" 排列，每个单胞原子的第一个像位于原点格点。
#[derive(Debug, Clone, Copy, Default)]
pub struct LatticeCellMapper;

impl CellMapper for LatticeCellMapper {
    fn supercell(&self, unitcell: &Structure, supercell_matrix: &IntMat3, _tolerance: f64) -> Result<Supercell> {
        let t = mat3::transpose(&mat3::from_int(supercell_matrix));
        let inv_t = mat3::inverse(&t).ok_or_else(|| {
            PhonomatError::InvalidArgument("Supercell matrix is singular".to_string())
        })?;
        let points = lattice_points(supercell_matrix, &inv_t)?;

        let lattice = Lattice::from_vectors(mat3::mul(&t, &unitcell.lattice().matrix));
        let mut atoms = Vec::with_capacity(unitcell.num_atoms() * points.len());
        let mut unitcell_to_unitcell = HashMap::new();
        for (i, atom) in unitcell.atoms().iter().enumerate() {
            unitcell_to_unitcell.insert(atoms.len(), i);
            for n in &points {
                let shifted = [
                    atom.position[0] + n[0],
                    atom.position[1] + n[1],
                    atom.position[2] + n[2],
                ];
                let position = reduce_position(&mat3::vec_mul(&shifted, &inv_t));
                atoms.push(Atom::new(atom.element.clone(), atom.atomic_number, position));
            }
        }

        let mut cell = Structure::new(lattice, atoms)?;
        if let Some(moments) = unitcell.magnetic_moments() {
            let repeated = moments
                .iter()
                .flat_map(|m| std::iter::repeat(*m).take(points.len()))
                .collect();
            cell = cell.with_magnetic_moments(repeated)?;
        }

        Ok(Supercell {
            cell,
            unitcell_to_unitcell,
        })
    }

    fn primitive(&self, supercell: &Structure, primitive_matrix: &Mat3, tolerance: f64) -> Result<PrimitiveCell> {
        let lattice = Lattice::from_vectors(mat3::mul(
            &mat3::transpose(primitive_matrix),
            &supercell.lattice().matrix,
        ));
        let inv_lattice = mat3::inverse(&lattice.matrix).ok_or_else(|| {
            PhonomatError::InvalidArgument("Primitive matrix is singular".to_string())
        })?;

        let mut atoms: Vec<Atom> = Vec::new();
        let mut primitive_to_supercell = Vec::new();
        for (s, atom) in supercell.atoms().iter().enumerate() {
            let cart = supercell.lattice().to_cartesian(&atom.position);
            let position = reduce_position(&mat3::vec_mul(&cart, &inv_lattice));

            let existing = atoms.iter().position(|a| {
                let mut diff = [0.0; 3];
                for k in 0..3 {
                    let d = a.position[k] - position[k];
                    diff[k] = d - d.round();
                }
                mat3::norm(&lattice.to_cartesian(&diff)) < tolerance
            });
            match existing {
                Some(p) if atoms[p].atomic_number != atom.atomic_number => {
                    return Err(PhonomatError::InvalidArgument(format!(
                        "Primitive matrix maps {} onto {} (supercell atom {})",
                        atom.element,
                        atoms[p].element,
                        s + 1
                    )));
                }
                Some(_) => {}
                None => {
                    atoms.push(Atom::new(atom.element.clone(), atom.atomic_number, position));
                    primitive_to_supercell.push(s);
                }
            }
        }

        let expected = supercell.num_atoms() as f64 * mat3::determinant(primitive_matrix).abs();
        if (expected - atoms.len() as f64).abs() > 1e-6 {
            return Err(PhonomatError::InvalidArgument(format!(
                "Primitive matrix gives {} atoms, expected {}",
                atoms.len(),
                expected
            )));
        }

        Ok(PrimitiveCell {
            cell: Structure::new(lattice, atoms)?,
            primitive_to_supercell,
        })
    }
}

/// 超胞内的格点（以单胞分数坐标表示），原点排在第一个
fn lattice_points(supercell_matrix: &IntMat3, inv_t: &Mat3) -> Result<Vec<Vec3>> {
    // n = f·Sᵀ，f ∈ [0,1)³ 时 n_k 落在第 k 行正负元素之和之间
    let mut lo = [0i32; 3];
    let mut hi = [0i32; 3];
    for (k, row) in supercell_matrix.iter().enumerate() {
        lo[k] = row.iter().map(|x| (*x).min(0)).sum();
        hi[k] = row.iter().map(|x| (*x).max(0)).sum();
    }

    let mut points = vec![[0.0; 3]];
    for a in lo[0]..=hi[0] {
        for b in lo[1]..=hi[1] {
            for c in lo[2]..=hi[2] {
                if (a, b, c) == (0, 0, 0) {
                    continue;
                }
                let n = [a as f64, b as f64, c as f64];
                let f = mat3::vec_mul(&n, inv_t);
                if f.iter().all(|x| *x > -1e-8 && *x < 1.0 - 1e-8) {
                    points.push(n);
                }
            }
        }
    }

    let expected = mat3::determinant(&mat3::from_int(supercell_matrix)).abs().round() as usize;
    if points.len() != expected {
        return Err(PhonomatError::MappingIncomplete(format!(
            "found {} lattice points in a supercell of volume {}",
            points.len(),
            expected
        )));
    }
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rock_salt_pair() -> Structure {
        let lattice = Lattice::from_vectors([[4.0, 0.0, 0.0], [0.0, 4.0, 0.0], [0.0, 0.0, 4.0]]);
        Structure::new(
            lattice,
            vec![
                Atom::new("Na", 11, [0.0, 0.0, 0.0]),
                Atom::new("Cl", 17, [0.5, 0.5, 0.5]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_parse_symmetry_text() {
        let text = "\
# identity
1 0 0
0 1 0
0 0 1
0 0 0

0 -1 0
1 0 0
0 0 1
0.5 0.5 0.0
";
        let ds = SymmetryDataset::parse_text(text).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.operations[0], SymmetryOperation::identity());
        assert_eq!(ds.operations[1].rotation, [[0, -1, 0], [1, 0, 0], [0, 0, 1]]);
        assert_eq!(ds.operations[1].translation, [0.5, 0.5, 0.0]);
    }

    #[test]
    fn test_parse_symmetry_text_rejects_partial_block() {
        assert!(SymmetryDataset::parse_text("1 0 0\n0 1 0\n0 0 1\n").is_err());
        assert!(SymmetryDataset::parse_text("1 0 0\n0 1 x\n0 0 1\n0 0 0\n").is_err());
    }

    #[test]
    fn test_point_group_deduplicates_rotations() {
        let mut shifted = SymmetryOperation::identity();
        shifted.translation = [0.5, 0.5, 0.5];
        let ds = SymmetryDataset::new(vec![SymmetryOperation::identity(), shifted]);
        assert_eq!(ds.point_group(), vec![INT_IDENTITY]);
    }

    #[test]
    fn test_find_image_atom_with_translation() {
        let s = rock_salt_pair();
        let mut op = SymmetryOperation::identity();
        op.translation = [0.5, 0.5, -0.5];

        // Na 平移后落在 Cl 上
        assert_eq!(find_image_atom(&s, &op, 1, 1e-5), Some(0));
        assert_eq!(find_image_atom(&s, &op, 0, 1e-5), Some(1));

        op.translation = [0.25, 0.0, 0.0];
        assert_eq!(find_image_atom(&s, &op, 0, 1e-5), None);
    }

    #[test]
    fn test_fixes_site() {
        let s = rock_salt_pair();
        let inversion = SymmetryOperation {
            rotation: [[-1, 0, 0], [0, -1, 0], [0, 0, -1]],
            translation: [0.0; 3],
        };
        assert!(fixes_site(&s, &inversion, 0, 1e-5));
        assert!(fixes_site(&s, &inversion, 1, 1e-5));
    }

    #[test]
    fn test_cartesian_rotation_of_cubic_lattice_is_unchanged() {
        let op = SymmetryOperation {
            rotation: [[0, -1, 0], [1, 0, 0], [0, 0, 1]],
            translation: [0.0; 3],
        };
        let lattice = [[3.0, 0.0, 0.0], [0.0, 3.0, 0.0], [0.0, 0.0, 3.0]];
        let r = op.cartesian_rotation(&lattice).unwrap();
        assert!(mat3::max_abs_diff(&r, &mat3::from_int(&op.rotation)) < 1e-12);
    }

    #[test]
    fn test_identity_matrices_keep_the_cell() {
        let s = rock_salt_pair();
        let mapper = LatticeCellMapper;
        let sc = mapper.supercell(&s, &INT_IDENTITY, 1e-5).unwrap();
        assert_eq!(sc.cell.num_atoms(), 2);
        assert_eq!(sc.unitcell_to_unitcell.get(&1), Some(&1));

        let pc = mapper.primitive(&sc.cell, &mat3::IDENTITY, 1e-5).unwrap();
        assert_eq!(pc.primitive_to_supercell, vec![0, 1]);
    }

    #[test]
    fn test_diagonal_supercell_and_back() {
        let s = rock_salt_pair();
        let mapper = LatticeCellMapper;
        let smat = [[2, 0, 0], [0, 2, 0], [0, 0, 2]];
        let sc = mapper.supercell(&s, &smat, 1e-5).unwrap();

        assert_eq!(sc.cell.num_atoms(), 16);
        assert_eq!(sc.cell.lattice().matrix[0], [8.0, 0.0, 0.0]);
        assert_eq!(sc.unitcell_to_unitcell.len(), 2);
        assert_eq!(sc.unitcell_to_unitcell.get(&0), Some(&0));
        assert_eq!(sc.unitcell_to_unitcell.get(&8), Some(&1));
        assert_eq!(sc.cell.atoms()[8].position, [0.25, 0.25, 0.25]);
        assert!(sc.cell.atoms()[..8].iter().all(|a| a.element == "Na"));

        let half = mat3::scale(&mat3::IDENTITY, 0.5);
        let pc = mapper.primitive(&sc.cell, &half, 1e-5).unwrap();
        assert_eq!(pc.primitive_to_supercell, vec![0, 8]);
        assert_eq!(pc.cell.atoms()[1].position, [0.5, 0.5, 0.5]);
    }

    #[test]
    fn test_sheared_supercell_has_det_lattice_points() {
        let s = rock_salt_pair();
        let sc = LatticeCellMapper
            .supercell(&s, &[[1, 1, 0], [-1, 1, 0], [0, 0, 1]], 1e-5)
            .unwrap();
        assert_eq!(sc.cell.num_atoms(), 4);
        assert!(sc.cell.lattice().volume() > 0.0);
        assert_eq!(sc.unitcell_to_unitcell.get(&2), Some(&1));
    }

    #[test]
    fn test_primitive_rejects_mixed_species_overlap() {
        let s = rock_salt_pair();
        // Cl 落到 Na 上
        let pmat = mat3::scale(&mat3::IDENTITY, 0.5);
        assert!(matches!(
            LatticeCellMapper.primitive(&s, &pmat, 1e-5),
            Err(PhonomatError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_supercell_repeats_magnetic_moments() {
        let s = rock_salt_pair().with_magnetic_moments(vec![1.0, -1.0]).unwrap();
        let sc = LatticeCellMapper
            .supercell(&s, &[[2, 0, 0], [0, 1, 0], [0, 0, 1]], 1e-5)
            .unwrap();
        assert_eq!(sc.cell.magnetic_moments(), Some(&[1.0, 1.0, -1.0, -1.0][..]));
    }
}
