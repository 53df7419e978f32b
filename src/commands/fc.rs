//! # fc 命令实现
//!
//! - vasprun.xml：由质量归一化的 Hessian 与 atomtypes 中的质量构造力常数
//! - OUTCAR：读取 `SECOND DERIVATIVES` 表（取负，不做质量缩放）
//!
//! ## 依赖关系
//! - 使用 `cli/fc.rs` 定义的参数
//! - 使用 `phonomat::parsers::{vasprun, outcar}`, `phonomat::phonon::force_constants`

use super::resolve_report_kind;
use crate::cli::fc::FcArgs;
use crate::cli::ReportKind;
use phonomat::error::Result;
use phonomat::parsers::{outcar, vasprun};
use phonomat::phonon::force_constants::{self, ForceConstants};
use phonomat::utils::{output, progress};
use std::path::Path;

/// 执行 fc 命令
pub fn execute(args: FcArgs) -> Result<()> {
    output::print_header("Building force constants");

    let kind = resolve_report_kind(&args.input, args.kind)?;
    let fc = match kind {
        ReportKind::Outcar => outcar::read_force_constants(&args.input)?,
        _ => read_from_vasprun(&args.input)?,
    };

    output::print_info(&format!(
        "Force constants for {} atoms read from '{}' ({})",
        fc.num_atoms(),
        args.input.display(),
        kind
    ));

    force_constants::write_force_constants(&fc, &args.output)?;
    output::print_success(&format!("Force constants written to '{}'", args.output.display()));

    Ok(())
}

fn read_from_vasprun(path: &Path) -> Result<ForceConstants> {
    let spinner = progress::create_spinner(&format!("Parsing {}", path.display()));
    let report = vasprun::parse_report_file(path);
    spinner.finish_and_clear();
    let report = report?;

    if report.legacy_filter_applied {
        output::print_info("Report written by VASP 5.2.8; PRECFOCK lines were filtered");
    }

    let (fc, elements) = force_constants::from_report(&report, &path.display().to_string())?;
    output::print_info(&format!("Species: {}", elements.join(" ")));
    Ok(fc)
}
