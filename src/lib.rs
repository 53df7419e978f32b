//! # phonomat
//!
//! PWmat / VASP 计算结果到声子计算输入的转换库。
//!
//! ## 模块
//! ```text
//! lib.rs
//!   ├── models/    (结构、受力、张量、对称操作)
//!   ├── parsers/   (atom.config, POSCAR, 受力文件, vasprun.xml, OUTCAR)
//!   ├── phonon/    (力常数、Born 电荷对称化与约化)
//!   ├── batch/     (文件收集与并行处理)
//!   ├── utils/     (终端输出)
//!   └── error.rs   (错误处理)
//! ```

pub mod batch;
pub mod error;
pub mod models;
pub mod parsers;
pub mod phonon;
pub mod utils;

pub use error::{PhonomatError, Result};
