//! # born 子命令 CLI 定义
//!
//! 矩阵参数以 9 个数按行给出，例如 `--pmat "0 0.5 0.5 0.5 0 0.5 0.5 0.5 0"`。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/born.rs`

use super::{ReportKind, DEFAULT_SYMPREC};
use clap::Args;
use std::path::PathBuf;

/// born 子命令参数
#[derive(Args, Debug)]
pub struct BornArgs {
    /// vasprun.xml or OUTCAR containing Born charges and the dielectric tensor
    #[arg(short, long)]
    pub input: PathBuf,

    /// Input file kind
    #[arg(short, long, value_enum, default_value = "auto")]
    pub kind: ReportKind,

    /// Unit cell atom.config or vasprun.xml (required for OUTCAR input)
    #[arg(short, long)]
    pub structure: Option<PathBuf>,

    /// Symmetry operations file (blocks of 3 rotation rows + 1 translation row)
    #[arg(long)]
    pub symmetry: Option<PathBuf>,

    /// Symmetrize Born charges and dielectric tensor before reduction
    #[arg(long, default_value_t = false)]
    pub symmetrize: bool,

    /// Treat the structure as P1 (identity operation only)
    #[arg(long, default_value_t = false)]
    pub no_symmetry: bool,

    /// Symmetry tolerance
    #[arg(long, env = "PHONOMAT_SYMPREC", default_value_t = DEFAULT_SYMPREC)]
    pub symprec: f64,

    /// Primitive matrix, 9 numbers row by row
    #[arg(long)]
    pub pmat: Option<String>,

    /// Supercell matrix, 9 integers row by row
    #[arg(long)]
    pub smat: Option<String>,

    /// Output file
    #[arg(short, long, default_value = "BORN")]
    pub output: PathBuf,
}
