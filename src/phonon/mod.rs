//! # 声子前处理模块
//!
//! 力常数张量构造、Born 电荷与介电张量的对称化，以及独立原子约化。
//!
//! ## 依赖关系
//! - 被 `commands/fc.rs`, `commands/born.rs`, `parsers/outcar.rs` 使用
//! - 使用 `models/`, `parsers/vasprun`
//! - 子模块: force_constants, born, reduce

pub mod born;
pub mod force_constants;
pub mod reduce;

pub use born::{get_borns, symmetrize, BornOptions, BornResult, SymmetryBreaking};
pub use force_constants::ForceConstants;
pub use reduce::ReducedBorns;
