//! # 独立原子约化
//!
//! 把单胞全部原子的 Born 电荷约化为原胞中对称独立原子对应的那一部分：
//! 1. 由晶胞构造协作者得到超胞，以及 `inv(S)·P` 对应的原胞；
//! 2. 在原胞上按对称操作划分轨道，每个轨道取序号最小的原子；
//! 3. 经 原胞 → 超胞 → 单胞 两级映射取回对应的 Born 电荷。
//!
//! ## 依赖关系
//! - 被 `phonon/born.rs` 使用
//! - 使用 `models/symmetry.rs` 中的协作接口

use crate::error::{PhonomatError, Result};
use crate::models::mat3::{self, Mat3};
use crate::models::symmetry::{
    find_image_atom, CellMapper, IntMat3, SymmetryDataset, SymmetryFinder,
};
use crate::models::Structure;

/// 约化结果
#[derive(Debug, Clone, PartialEq)]
pub struct ReducedBorns {
    /// 每个独立原子一个 Born 电荷
    pub borns: Vec<Mat3>,

    /// 独立原子在超胞中的序号
    pub supercell_indices: Vec<usize>,
}

#[allow(clippy::too_many_arguments)]
pub fn reduce(
    borns: &[Mat3],
    unitcell: &Structure,
    primitive_matrix: &Mat3,
    supercell_matrix: &IntMat3,
    symmetry_is_on: bool,
    tolerance: f64,
    finder: &dyn SymmetryFinder,
    mapper: &dyn CellMapper,
) -> Result<ReducedBorns> {
    let inv_smat = mat3::inverse(&mat3::from_int(supercell_matrix)).ok_or_else(|| {
        PhonomatError::InvalidArgument("Supercell matrix is singular".to_string())
    })?;

    let supercell = mapper.supercell(unitcell, supercell_matrix, tolerance)?;
    let primitive = mapper.primitive(
        &supercell.cell,
        &mat3::mul(&inv_smat, primitive_matrix),
        tolerance,
    )?;

    let dataset = if symmetry_is_on {
        finder.symmetry_operations(&primitive.cell, tolerance)?
    } else {
        SymmetryDataset::identity()
    };
    let independent = independent_atoms(&primitive.cell, &dataset, tolerance)?;

    let mut reduced = Vec::with_capacity(independent.len());
    let mut supercell_indices = Vec::with_capacity(independent.len());
    for p in independent {
        let s = *primitive.primitive_to_supercell.get(p).ok_or_else(|| {
            PhonomatError::MappingIncomplete(format!(
                "primitive atom {} has no supercell counterpart",
                p
            ))
        })?;
        let u = *supercell.unitcell_to_unitcell.get(&s).ok_or_else(|| {
            PhonomatError::MappingIncomplete(format!(
                "supercell atom {} has no unit cell counterpart",
                s
            ))
        })?;
        let born = borns.get(u).ok_or_else(|| {
            PhonomatError::MappingIncomplete(format!(
                "unit cell atom {} is out of range for {} Born charges",
                u,
                borns.len()
            ))
        })?;

        reduced.push(*born);
        supercell_indices.push(s);
    }

    Ok(ReducedBorns {
        borns: reduced,
        supercell_indices,
    })
}

/// 对称独立原子：每个轨道中序号最小者，按序号升序
pub fn independent_atoms(
    structure: &Structure,
    dataset: &SymmetryDataset,
    tolerance: f64,
) -> Result<Vec<usize>> {
    let n = structure.num_atoms();
    let mut visited = vec![false; n];
    let mut independent = Vec::new();

    for i in 0..n {
        if visited[i] {
            continue;
        }
        independent.push(i);
        visited[i] = true;

        for (k, op) in dataset.operations.iter().enumerate() {
            let j = find_image_atom(structure, op, i, tolerance).ok_or(
                PhonomatError::NoImageAtomFound {
                    atom: i,
                    operation: k,
                    tolerance,
                },
            )?;
            visited[j] = true;
        }
    }

    Ok(independent)
}
