//! # forces 命令实现
//!
//! 读取一组 PWmat 受力文件（按文件名排序），报告每个文件的漂移力。
//! 漂移力只报告，不从受力中扣除。
//!
//! ## 依赖关系
//! - 使用 `cli/forces.rs` 定义的参数
//! - 使用 `phonomat::parsers::force_file`, `phonomat::batch`
//! - 使用 `tabled` 显示表格，`csv` + `serde` 写出 CSV

use crate::cli::forces::ForcesArgs;
use phonomat::batch::{BatchRunner, FileCollector};
use phonomat::error::{PhonomatError, Result};
use phonomat::models::mat3;
use phonomat::models::ForceSet;
use phonomat::parsers::{atom_config, force_file};
use phonomat::utils::output;

use serde::Serialize;
use std::path::{Path, PathBuf};
use tabled::{Table, Tabled};

/// 单个受力文件的漂移力
#[derive(Debug, Clone, Serialize, Tabled)]
struct DriftRecord {
    #[tabled(rename = "File")]
    file: String,
    #[tabled(rename = "Fx", display_with = "fmt_force")]
    fx: f64,
    #[tabled(rename = "Fy", display_with = "fmt_force")]
    fy: f64,
    #[tabled(rename = "Fz", display_with = "fmt_force")]
    fz: f64,
    #[tabled(rename = "|F|", display_with = "fmt_force")]
    norm: f64,
}

fn fmt_force(v: &f64) -> String {
    format!("{:12.8}", v)
}

/// 执行 forces 命令
pub fn execute(args: ForcesArgs) -> Result<()> {
    output::print_header("Reading force sets");

    let num_atoms = expected_atom_count(&args)?;

    let files = FileCollector::new(args.input.clone())
        .with_pattern(&args.pattern)
        .collect()?;
    if files.is_empty() {
        return Err(PhonomatError::NoFilesFound {
            pattern: args.pattern.clone(),
        });
    }

    output::print_info(&format!(
        "Found {} force file(s), expecting {} atoms each",
        files.len(),
        num_atoms
    ));

    let runner = BatchRunner::new(args.jobs);
    let sets = runner.try_map(&files, "Reading forces", |p| {
        force_file::parse_forces_file(p, num_atoms)
    })?;

    let records = drift_records(&files, &sets);
    println!("{}", Table::new(&records));

    if let Some(ref path) = args.csv {
        save_drift_csv(&records, path)?;
        output::print_success(&format!("Drift forces saved to '{}'", path.display()));
    }

    output::print_done(&format!("Read {} force set(s)", sets.len()));
    Ok(())
}

fn expected_atom_count(args: &ForcesArgs) -> Result<usize> {
    match (&args.structure, args.num_atoms) {
        (Some(path), _) => Ok(atom_config::parse_atom_config_file(path)?.num_atoms()),
        (None, Some(n)) => Ok(n),
        (None, None) => Err(PhonomatError::InvalidArgument(
            "Either --structure or --num-atoms is required".to_string(),
        )),
    }
}

fn drift_records(files: &[PathBuf], sets: &[ForceSet]) -> Vec<DriftRecord> {
    files
        .iter()
        .zip(sets)
        .map(|(path, set)| {
            let drift = set.drift();
            DriftRecord {
                file: path.display().to_string(),
                fx: drift[0],
                fy: drift[1],
                fz: drift[2],
                norm: mat3::norm(&drift),
            }
        })
        .collect()
}

/// 保存漂移力到 CSV
fn save_drift_csv(records: &[DriftRecord], output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;
    for record in records {
        wtr.serialize(record)?;
    }

    wtr.flush().map_err(|e| PhonomatError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_drift_records_and_csv() {
        let files = vec![PathBuf::from("OUT.FORCE-001")];
        let sets = vec![ForceSet::new(vec![[0.3, 0.0, -0.4], [0.3, 0.0, -0.4]])];
        let records = drift_records(&files, &sets);

        assert_eq!(records.len(), 1);
        assert!((records[0].fx - 0.3).abs() < 1e-12);
        assert!((records[0].norm - 0.5).abs() < 1e-12);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("drift.csv");
        save_drift_csv(&records, &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some("file,fx,fy,fz,norm"));
        assert!(lines.next().unwrap().starts_with("OUT.FORCE-001,0.3"));
    }

    #[test]
    fn test_table_renders_headers() {
        let records = drift_records(
            &[PathBuf::from("OUT.FORCE")],
            &[ForceSet::new(vec![[1.0, 2.0, 2.0]])],
        );
        let table = Table::new(&records).to_string();
        assert!(table.contains("|F|"));
        assert!(table.contains("3.00000000"));
    }
}
