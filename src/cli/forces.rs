//! # forces 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/forces.rs`

use clap::Args;
use std::path::PathBuf;

/// forces 子命令参数
#[derive(Args, Debug)]
pub struct ForcesArgs {
    /// Force file or directory containing force files
    #[arg(short, long)]
    pub input: PathBuf,

    /// Glob pattern(s) for force files, comma separated
    #[arg(short, long, default_value = "OUT.FORCE*")]
    pub pattern: String,

    /// Supercell atom.config; its atom count is the expected number of force rows
    #[arg(short, long, required_unless_present = "num_atoms")]
    pub structure: Option<PathBuf>,

    /// Expected number of atoms (instead of --structure)
    #[arg(short, long)]
    pub num_atoms: Option<usize>,

    /// Write per-file drift forces to this CSV file
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Number of parallel jobs (0 = auto)
    #[arg(short, long, env = "PHONOMAT_JOBS", default_value_t = 0)]
    pub jobs: usize,
}
