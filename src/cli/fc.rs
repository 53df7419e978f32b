//! # fc 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/fc.rs`

use super::ReportKind;
use clap::Args;
use std::path::PathBuf;

/// fc 子命令参数
#[derive(Args, Debug)]
pub struct FcArgs {
    /// vasprun.xml or OUTCAR of a DFPT / finite-difference run
    #[arg(short, long)]
    pub input: PathBuf,

    /// Input file kind
    #[arg(short, long, value_enum, default_value = "auto")]
    pub kind: ReportKind,

    /// Output file
    #[arg(short, long, default_value = "FORCE_CONSTANTS")]
    pub output: PathBuf,
}
