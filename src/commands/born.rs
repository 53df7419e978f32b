//! # born 命令实现
//!
//! 读取 Born 有效电荷与介电张量，按需对称化，约化到独立原子后写出 BORN。
//!
//! ## 功能
//! - vasprun.xml：张量与结构都取自报告（也可用 `--structure` 指定结构）
//! - OUTCAR：张量取自 OUTCAR，结构由 `--structure` 给出
//! - 对称操作来自 `--symmetry` 文件；未给出或 `--no-symmetry` 时只有恒等操作
//! - `--smat` / `--pmat` 给出超胞与原胞矩阵，独立原子序号按超胞编号
//!
//! ## 依赖关系
//! - 使用 `cli/born.rs` 定义的参数
//! - 使用 `phonomat::phonon::born`, `phonomat::models::symmetry`

use super::resolve_report_kind;
use crate::cli::born::BornArgs;
use crate::cli::ReportKind;
use phonomat::error::{PhonomatError, Result};
use phonomat::models::mat3::{Mat3, IDENTITY};
use phonomat::models::symmetry::{IntMat3, INT_IDENTITY};
use phonomat::models::{
    FixedSymmetry, IdentitySymmetry, LatticeCellMapper, Structure, SymmetryDataset,
    SymmetryFinder,
};
use phonomat::parsers::{self, outcar, vasprun};
use phonomat::phonon::born::{self, BornOptions};
use phonomat::utils::output;
use std::fs;
use std::path::Path;

/// 执行 born 命令
pub fn execute(args: BornArgs) -> Result<()> {
    output::print_header("Extracting Born effective charges");

    let kind = resolve_report_kind(&args.input, args.kind)?;
    let (unitcell, borns, epsilon) = match kind {
        ReportKind::Outcar => {
            let path = args.structure.as_ref().ok_or_else(|| {
                PhonomatError::InvalidArgument(
                    "--structure is required when reading Born charges from OUTCAR".to_string(),
                )
            })?;
            let unitcell = parsers::parse_structure_file(path)?;
            let (borns, epsilon) = outcar::read_born_and_epsilon(&args.input)?;
            (unitcell, borns, epsilon)
        }
        _ => read_from_vasprun(&args.input, args.structure.as_deref())?,
    };

    let finder = symmetry_finder(&args)?;
    let options = BornOptions {
        primitive_matrix: match args.pmat {
            Some(ref s) => parse_matrix(s)?,
            None => IDENTITY,
        },
        supercell_matrix: match args.smat {
            Some(ref s) => parse_int_matrix(s)?,
            None => INT_IDENTITY,
        },
        is_symmetry: !args.no_symmetry,
        symmetrize_tensors: args.symmetrize,
        tolerance: args.symprec,
    };

    let result = born::get_borns(
        &unitcell,
        borns,
        epsilon,
        &options,
        finder.as_ref(),
        &LatticeCellMapper,
    )?;

    if let Some(warning) = result.warning {
        output::print_warning(&warning.to_string());
    }

    output::print_tensor("Dielectric tensor", &result.epsilon);

    let indices: Vec<String> = result
        .supercell_indices
        .iter()
        .map(|i| (i + 1).to_string())
        .collect();
    output::print_info(&format!("Independent atoms: {}", indices.join(" ")));

    born::write_born(&result, &args.output)?;
    output::print_success(&format!("BORN written to '{}'", args.output.display()));

    Ok(())
}

fn read_from_vasprun(path: &Path, structure: Option<&Path>) -> Result<(Structure, Vec<Mat3>, Mat3)> {
    let report = vasprun::parse_report_file(path)?;
    if report.legacy_filter_applied {
        output::print_info("Report written by VASP 5.2.8; PRECFOCK lines were filtered");
    }

    let source = path.display().to_string();
    let epsilon = report.epsilon.ok_or_else(|| PhonomatError::MissingData {
        what: "epsilon".to_string(),
        path: source.clone(),
    })?;
    if report.born_charges.is_empty() {
        return Err(PhonomatError::MissingData {
            what: "born_charges".to_string(),
            path: source,
        });
    }

    let unitcell = match structure {
        Some(p) => parsers::parse_structure_file(p)?,
        None => report.final_structure(&source)?,
    };

    Ok((unitcell, report.born_charges, epsilon))
}

fn symmetry_finder(args: &BornArgs) -> Result<Box<dyn SymmetryFinder>> {
    if args.no_symmetry {
        return Ok(Box::new(IdentitySymmetry));
    }

    match args.symmetry {
        Some(ref path) => {
            let content = fs::read_to_string(path).map_err(|e| PhonomatError::FileReadError {
                path: path.display().to_string(),
                source: e,
            })?;
            let dataset = SymmetryDataset::parse_text(&content)?;
            output::print_info(&format!(
                "Loaded {} symmetry operations from '{}'",
                dataset.len(),
                path.display()
            ));
            Ok(Box::new(FixedSymmetry(dataset)))
        }
        None => {
            output::print_warning("No symmetry operations given; treating the structure as P1");
            Ok(Box::new(IdentitySymmetry))
        }
    }
}

/// 9 个数按行组成 3x3 矩阵
fn parse_matrix(text: &str) -> Result<Mat3> {
    let values: Vec<f64> = text
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<f64>()
                .map_err(|_| PhonomatError::InvalidArgument(format!("Invalid matrix element '{}'", s)))
        })
        .collect::<Result<_>>()?;

    if values.len() != 9 {
        return Err(PhonomatError::InvalidArgument(format!(
            "A 3x3 matrix needs 9 numbers, got {}",
            values.len()
        )));
    }

    let mut m = [[0.0; 3]; 3];
    for (k, v) in values.into_iter().enumerate() {
        m[k / 3][k % 3] = v;
    }
    Ok(m)
}

fn parse_int_matrix(text: &str) -> Result<IntMat3> {
    let m = parse_matrix(text)?;
    let mut r = [[0; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            if m[i][j].fract() != 0.0 {
                return Err(PhonomatError::InvalidArgument(format!(
                    "Supercell matrix must be integer, got {}",
                    m[i][j]
                )));
            }
            r[i][j] = m[i][j] as i32;
        }
    }
    Ok(r)
}
