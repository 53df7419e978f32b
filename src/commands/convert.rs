//! # convert 命令实现
//!
//! 批量转换 atom.config 结构文件。
//!
//! ## 功能
//! - 读取 atom.config（含可选 MAGNETIC 段）
//! - 写出 POSCAR 或规范化的 atom.config（按元素分组、坐标约化）
//! - 可选写出 MAGMOM 行
//! - 支持并行处理
//!
//! ## 依赖关系
//! - 使用 `cli/convert.rs` 定义的参数
//! - 使用 `phonomat::parsers`, `phonomat::batch`
//! - 使用 `utils/output.rs`

use crate::cli::convert::{ConvertArgs, OutputFormat};
use phonomat::batch::{BatchRunner, FileCollector, ProcessResult};
use phonomat::error::{PhonomatError, Result};
use phonomat::parsers::{self, atom_config, StructureFormat};
use phonomat::utils::output;

use std::fs;
use std::path::{Path, PathBuf};

/// 执行 convert 命令
pub fn execute(args: ConvertArgs) -> Result<()> {
    output::print_header(&format!("Converting to {} format", args.target));

    // 创建输出目录
    fs::create_dir_all(&args.output).map_err(|e| PhonomatError::FileWriteError {
        path: args.output.display().to_string(),
        source: e,
    })?;

    // 收集输入文件
    let files = FileCollector::new(args.input.clone())
        .with_pattern(&args.pattern)
        .recursive(args.recursive)
        .collect()?;

    if files.is_empty() {
        output::print_warning(&format!(
            "No files matched '{}' under {}",
            args.pattern,
            args.input.display()
        ));
        return Ok(());
    }

    output::print_info(&format!("Found {} files to convert", files.len()));

    let format = match args.target {
        OutputFormat::Poscar => StructureFormat::Poscar,
        OutputFormat::AtomConfig => StructureFormat::AtomConfig,
    };

    let runner = BatchRunner::new(args.jobs);
    let result = runner.run(&files, |input_path| {
        match convert_file(input_path, &args.output, format, args.magmom, args.overwrite) {
            Ok(Some(out)) => ProcessResult::Success(out.display().to_string()),
            Ok(None) => ProcessResult::Skipped(input_path.display().to_string()),
            Err(e) => ProcessResult::Failed(input_path.display().to_string(), e.to_string()),
        }
    });

    for (path, err) in &result.failures {
        output::print_error(&format!("{}: {}", path, err));
    }

    output::print_done(&format!(
        "Converted {} file(s) to '{}' in '{}' ({} skipped, {} failed)",
        result.success,
        args.target,
        args.output.display(),
        result.skipped,
        result.failed
    ));

    Ok(())
}

/// 输出文件路径：POSCAR_<stem> 或 <stem>.config
fn output_path(input_path: &Path, output_dir: &Path, format: StructureFormat) -> PathBuf {
    let stem = input_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("structure");

    match format {
        StructureFormat::Poscar => output_dir.join(format!("POSCAR_{}", stem)),
        StructureFormat::AtomConfig => output_dir.join(format!("{}.config", stem)),
    }
}

/// 转换单个文件；输出已存在且不覆盖时返回 `None`
fn convert_file(
    input_path: &Path,
    output_dir: &Path,
    format: StructureFormat,
    magmom: bool,
    overwrite: bool,
) -> Result<Option<PathBuf>> {
    let out = output_path(input_path, output_dir, format);

    // 检查是否需要跳过
    if out.exists() && !overwrite {
        return Ok(None);
    }

    let structure = atom_config::parse_atom_config_file(input_path)?;
    write_file(&out, &parsers::write_structure(&structure, format))?;

    if magmom {
        if let Some(line) = atom_config::write_magnetic_moments(&structure) {
            let name = out
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("structure");
            write_file(&output_dir.join(format!("MAGMOM_{}", name)), &line)?;
        }
    }

    Ok(Some(out))
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).map_err(|e| PhonomatError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEO: &str = "\
2
Lattice vector
3.0 0.0 0.0
0.0 3.0 0.0
0.0 0.0 3.0
Position
26 0.0 0.0 0.0 1 1 1
8 0.5 0.5 0.5 1 1 1
MAGNETIC
26 4.0
8 0.0
";

    #[test]
    fn test_convert_file_writes_poscar_and_magmom() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("feo.config");
        fs::write(&input, FEO).unwrap();
        let out_dir = dir.path().join("out");
        fs::create_dir(&out_dir).unwrap();

        let out = convert_file(&input, &out_dir, StructureFormat::Poscar, true, false)
            .unwrap()
            .unwrap();
        assert_eq!(out, out_dir.join("POSCAR_feo"));

        let poscar = fs::read_to_string(&out).unwrap();
        assert!(poscar.starts_with("Fe O\n"));

        let magmom = fs::read_to_string(out_dir.join("MAGMOM_POSCAR_feo")).unwrap();
        assert_eq!(magmom, " MAGMOM = 4.000000 0.000000 \n");

        // 已存在且未要求覆盖时跳过
        let again = convert_file(&input, &out_dir, StructureFormat::Poscar, false, false).unwrap();
        assert!(again.is_none());
    }

    #[test]
    fn test_convert_file_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("bad.config");
        fs::write(&input, "2\nLattice vector\n").unwrap();

        let result = convert_file(&input, dir.path(), StructureFormat::AtomConfig, false, true);
        assert!(matches!(result, Err(PhonomatError::MalformedStructure(_))));
    }
}
