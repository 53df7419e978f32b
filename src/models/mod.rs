//! # 数据模型模块
//!
//! 定义晶体结构、受力、张量、对称操作与计算报告的数据模型。
//!
//! ## 依赖关系
//! - 被 `parsers/`, `phonon/` 和 `commands/` 使用
//! - 子模块: mat3, element, structure, forces, tensors, symmetry, calculation

pub mod calculation;
pub mod element;
pub mod forces;
pub mod mat3;
pub mod structure;
pub mod symmetry;
pub mod tensors;

pub use calculation::{AtomType, CalculationReport};
pub use forces::{get_drift_forces, ForceSet};
pub use structure::{Atom, Lattice, SpeciesGrouping, Structure};
pub use symmetry::{
    CellMapper, FixedSymmetry, IdentitySymmetry, LatticeCellMapper, SymmetryDataset,
    SymmetryFinder, SymmetryOperation,
};
pub use tensors::{BornChargeSet, DielectricTensor};
