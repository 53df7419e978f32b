//! # convert 子命令 CLI 定义
//!
//! 批量转换 atom.config (-> POSCAR / 规范化的 atom.config)
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/convert.rs`

use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// 支持的输出格式
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// VASP POSCAR format
    Poscar,
    /// PWmat atom.config (species grouped, positions reduced)
    AtomConfig,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Poscar => write!(f, "poscar"),
            OutputFormat::AtomConfig => write!(f, "atom-config"),
        }
    }
}

/// convert 子命令参数
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Input atom.config file or directory
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output directory for converted files
    #[arg(short, long)]
    pub output: PathBuf,

    /// Target output format
    #[arg(short, long, value_enum, default_value = "poscar")]
    pub target: OutputFormat,

    /// Recurse into subdirectories
    #[arg(short, long, default_value_t = false)]
    pub recursive: bool,

    /// Glob pattern(s) for input files, comma separated
    #[arg(short, long, default_value = "*.config")]
    pub pattern: String,

    /// Also write the MAGMOM line for structures with a MAGNETIC block
    #[arg(long, default_value_t = false)]
    pub magmom: bool,

    /// Number of parallel jobs (0 = auto)
    #[arg(short, long, env = "PHONOMAT_JOBS", default_value_t = 0)]
    pub jobs: usize,

    /// Overwrite existing output files
    #[arg(long, default_value_t = false)]
    pub overwrite: bool,
}
