//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `convert`: 结构格式转换
//! - `forces`: 受力文件读取与漂移力报告
//! - `fc`: 力常数
//! - `born`: Born 有效电荷与介电张量
//!
//! ## 环境变量
//! - `PHONOMAT_JOBS`: 并行作业数（0 = 全部核心）
//! - `PHONOMAT_SYMPREC`: 对称性容差
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: convert, forces, fc, born

pub mod born;
pub mod convert;
pub mod fc;
pub mod forces;

use clap::{Parser, Subcommand, ValueEnum};

/// 默认对称性容差
pub const DEFAULT_SYMPREC: f64 = 1e-5;

/// phonomat - PWmat/VASP 声子前处理工具
#[derive(Parser)]
#[command(name = "phonomat")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(about = "PWmat/VASP structure, force and force-constant conversion for phonon calculations", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Convert PWmat atom.config files to POSCAR or normalised atom.config
    Convert(convert::ConvertArgs),

    /// Read a set of PWmat force files and report drift forces
    Forces(forces::ForcesArgs),

    /// Write FORCE_CONSTANTS from vasprun.xml (hessian) or OUTCAR (second derivatives)
    Fc(fc::FcArgs),

    /// Write BORN from vasprun.xml or OUTCAR
    Born(born::BornArgs),
}

/// 计算报告的来源格式
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ReportKind {
    /// Detect from the file name
    Auto,
    /// vasprun.xml
    Vasprun,
    /// OUTCAR
    Outcar,
}

impl std::fmt::Display for ReportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportKind::Auto => write!(f, "auto"),
            ReportKind::Vasprun => write!(f, "vasprun"),
            ReportKind::Outcar => write!(f, "outcar"),
        }
    }
}
