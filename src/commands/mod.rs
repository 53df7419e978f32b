//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `phonomat::parsers`, `phonomat::phonon`, `phonomat::utils`
//! - 子模块: convert, forces, fc, born

pub mod born;
pub mod convert;
pub mod fc;
pub mod forces;

use crate::cli::{Commands, ReportKind};
use phonomat::error::{PhonomatError, Result};
use std::path::Path;

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Convert(args) => convert::execute(args),
        Commands::Forces(args) => forces::execute(args),
        Commands::Fc(args) => fc::execute(args),
        Commands::Born(args) => born::execute(args),
    }
}

/// 根据文件名确定报告格式
fn resolve_report_kind(path: &Path, kind: ReportKind) -> Result<ReportKind> {
    if kind != ReportKind::Auto {
        return Ok(kind);
    }

    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();

    if name.to_lowercase().ends_with(".xml") || name.starts_with("vasprun") {
        Ok(ReportKind::Vasprun)
    } else if name.starts_with("OUTCAR") {
        Ok(ReportKind::Outcar)
    } else {
        Err(PhonomatError::InvalidArgument(format!(
            "Cannot tell whether '{}' is a vasprun.xml or an OUTCAR; use --kind",
            path.display()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_report_kind() {
        let auto = ReportKind::Auto;
        assert_eq!(
            resolve_report_kind(Path::new("run/vasprun.xml"), auto).unwrap(),
            ReportKind::Vasprun
        );
        assert_eq!(
            resolve_report_kind(Path::new("OUTCAR-born"), auto).unwrap(),
            ReportKind::Outcar
        );
        assert_eq!(
            resolve_report_kind(Path::new("data.txt"), ReportKind::Outcar).unwrap(),
            ReportKind::Outcar
        );
        assert!(resolve_report_kind(Path::new("data.txt"), auto).is_err());
    }
}
