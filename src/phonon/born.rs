//! # Born 有效电荷与介电张量的对称化
//!
//! - 介电张量：对点群中每个旋转做笛卡尔相似变换后取平均；
//! - Born 电荷：先在各原子的位置对称群上平均，再沿轨道平均。
//!   对每个操作找到映射到目标原子的像原子，把像原子的电荷旋转后累加，最后除以操作数。
//!
//! 对称化前后的 Born 电荷相差超过 [`BROKEN_SYMMETRY_THRESHOLD`] 时返回一个提示，
//! 不中断流程。
//!
//! ## 依赖关系
//! - 被 `commands/born.rs` 使用
//! - 使用 `models/symmetry.rs`, `models/tensors.rs`, `phonon/reduce.rs`

use crate::error::{PhonomatError, Result};
use crate::models::mat3::{self, Mat3, IDENTITY};
use crate::models::symmetry::{
    find_image_atom, fixes_site, CellMapper, IntMat3, SymmetryDataset, SymmetryFinder,
    INT_IDENTITY,
};
use crate::models::{BornChargeSet, DielectricTensor, Structure};
use crate::phonon::reduce;
use std::fmt;
use std::fs;
use std::path::Path;

/// 对称性明显破缺的判定阈值（电荷单位）
pub const BROKEN_SYMMETRY_THRESHOLD: f64 = 0.1;

/// 输入 Born 电荷明显偏离对称性
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymmetryBreaking {
    pub max_difference: f64,
}

impl fmt::Display for SymmetryBreaking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Born effective charge symmetry is largely broken. Largest difference among elements: {}",
            self.max_difference
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SymmetrizedTensors {
    pub borns: BornChargeSet,
    pub epsilon: DielectricTensor,
    pub warning: Option<SymmetryBreaking>,
}

/// 对称化 Born 电荷与介电张量
pub fn symmetrize(
    borns: &BornChargeSet,
    epsilon: &DielectricTensor,
    structure: &Structure,
    dataset: &SymmetryDataset,
    tolerance: f64,
) -> Result<SymmetrizedTensors> {
    if borns.len() != structure.num_atoms() {
        return Err(PhonomatError::SiteCountMismatch {
            borns: borns.len(),
            atoms: structure.num_atoms(),
        });
    }
    if dataset.is_empty() {
        return Err(PhonomatError::InvalidArgument(
            "Symmetry operation set is empty".to_string(),
        ));
    }

    let lattice = &structure.lattice().matrix;
    let epsilon_sym = symmetrize_tensor(epsilon.matrix(), &dataset.point_group(), lattice)?;

    let site_averaged = borns
        .charges()
        .iter()
        .enumerate()
        .map(|(i, z)| {
            let site_sym = site_symmetry(structure, dataset, i, tolerance);
            symmetrize_tensor(z, &site_sym, lattice)
        })
        .collect::<Result<Vec<Mat3>>>()?;

    let cartesian = dataset
        .operations
        .iter()
        .map(|op| op.cartesian_rotation(lattice))
        .collect::<Result<Vec<Mat3>>>()?;

    let count = dataset.len() as f64;
    let mut symmetrized = Vec::with_capacity(borns.len());
    for i in 0..structure.num_atoms() {
        let mut sum = mat3::ZERO;
        for (k, op) in dataset.operations.iter().enumerate() {
            let j = find_image_atom(structure, op, i, tolerance).ok_or(
                PhonomatError::NoImageAtomFound {
                    atom: i,
                    operation: k,
                    tolerance,
                },
            )?;
            let rotated = mat3::similarity(&cartesian[k], &site_averaged[j])
                .ok_or_else(|| singular_rotation(k))?;
            mat3::add_assign(&mut sum, &rotated);
        }
        symmetrized.push(mat3::scale(&sum, 1.0 / count));
    }

    let max_difference = borns
        .charges()
        .iter()
        .zip(&symmetrized)
        .map(|(a, b)| mat3::max_abs_diff(a, b))
        .fold(0.0_f64, f64::max);
    let warning = (max_difference > BROKEN_SYMMETRY_THRESHOLD)
        .then_some(SymmetryBreaking { max_difference });

    Ok(SymmetrizedTensors {
        borns: BornChargeSet::new(symmetrized, structure.num_atoms())?,
        epsilon: DielectricTensor(epsilon_sym),
        warning,
    })
}

/// 二阶张量在一组旋转（晶格基）下的平均
pub fn symmetrize_tensor(tensor: &Mat3, rotations: &[IntMat3], lattice: &Mat3) -> Result<Mat3> {
    if rotations.is_empty() {
        return Ok(*tensor);
    }

    let lt = mat3::transpose(lattice);
    let mut sum = mat3::ZERO;
    for (k, r) in rotations.iter().enumerate() {
        let r_cart = mat3::similarity(&lt, &mat3::from_int(r)).ok_or_else(|| {
            PhonomatError::InvalidArgument("Lattice matrix is singular".to_string())
        })?;
        let rotated = mat3::similarity(&r_cart, tensor).ok_or_else(|| singular_rotation(k))?;
        mat3::add_assign(&mut sum, &rotated);
    }
    Ok(mat3::scale(&sum, 1.0 / rotations.len() as f64))
}

/// 保持 `site` 不动的操作的旋转部分
pub fn site_symmetry(
    structure: &Structure,
    dataset: &SymmetryDataset,
    site: usize,
    tolerance: f64,
) -> Vec<IntMat3> {
    let mut rotations: Vec<IntMat3> = Vec::new();
    for op in &dataset.operations {
        if fixes_site(structure, op, site, tolerance) && !rotations.contains(&op.rotation) {
            rotations.push(op.rotation);
        }
    }
    rotations
}

fn singular_rotation(operation: usize) -> PhonomatError {
    PhonomatError::InvalidArgument(format!(
        "Rotation of symmetry operation {} is singular",
        operation
    ))
}

// ─────────────────────────────────────────────────────────────
// 完整流程
// ─────────────────────────────────────────────────────────────

/// Born 电荷处理选项
#[derive(Debug, Clone, Copy)]
pub struct BornOptions {
    pub primitive_matrix: Mat3,
    pub supercell_matrix: IntMat3,
    pub is_symmetry: bool,
    pub symmetrize_tensors: bool,
    pub tolerance: f64,
}

impl Default for BornOptions {
    fn default() -> Self {
        BornOptions {
            primitive_matrix: IDENTITY,
            supercell_matrix: INT_IDENTITY,
            is_symmetry: true,
            symmetrize_tensors: false,
            tolerance: 1e-5,
        }
    }
}

/// 约化后的 Born 电荷与介电张量
#[derive(Debug, Clone, PartialEq)]
pub struct BornResult {
    pub borns: Vec<Mat3>,
    pub epsilon: Mat3,
    pub supercell_indices: Vec<usize>,
    pub warning: Option<SymmetryBreaking>,
}

/// 检查原子数、按需对称化，再约化到独立原子
pub fn get_borns(
    unitcell: &Structure,
    borns: Vec<Mat3>,
    epsilon: Mat3,
    options: &BornOptions,
    finder: &dyn SymmetryFinder,
    mapper: &dyn CellMapper,
) -> Result<BornResult> {
    let mut borns = BornChargeSet::new(borns, unitcell.num_atoms())?;
    let mut epsilon = DielectricTensor(epsilon);
    let mut warning = None;

    if options.symmetrize_tensors {
        let dataset = if options.is_symmetry {
            finder.symmetry_operations(unitcell, options.tolerance)?
        } else {
            SymmetryDataset::identity()
        };
        let sym = symmetrize(&borns, &epsilon, unitcell, &dataset, options.tolerance)?;
        borns = sym.borns;
        epsilon = sym.epsilon;
        warning = sym.warning;
    }

    let reduced = reduce::reduce(
        borns.charges(),
        unitcell,
        &options.primitive_matrix,
        &options.supercell_matrix,
        options.is_symmetry,
        options.tolerance,
        finder,
        mapper,
    )?;

    Ok(BornResult {
        borns: reduced.borns,
        epsilon: epsilon.0,
        supercell_indices: reduced.supercell_indices,
        warning,
    })
}

/// 生成 BORN 文件内容
pub fn format_born(result: &BornResult) -> String {
    let indices: Vec<String> = result
        .supercell_indices
        .iter()
        .map(|i| (i + 1).to_string())
        .collect();

    let mut out = format!("# epsilon and Z* of atoms {}\n", indices.join(" "));
    write_tensor_line(&mut out, &result.epsilon);
    for z in &result.borns {
        write_tensor_line(&mut out, z);
    }
    out
}

fn write_tensor_line(out: &mut String, m: &Mat3) {
    for v in m.iter().flatten() {
        out.push_str(&format!("{:13.8} ", v));
    }
    out.push('\n');
}

pub fn write_born(result: &BornResult, path: &Path) -> Result<()> {
    fs::write(path, format_born(result)).map_err(|e| PhonomatError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })
}
