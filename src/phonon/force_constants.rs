//! # 力常数张量
//!
//! 将 (3N × 3N) 平铺矩阵切成 N × N 个 3×3 块，得到 (N, N, 3, 3) 张量。
//!
//! 两条输入路径的符号与缩放约定不同：
//! - 计算报告中的 Hessian 已做质量归一化，每块乘以 `-sqrt(m_i * m_j)`；
//! - 旧式文本表只取负，不做质量缩放。
//!
//! ## 依赖关系
//! - 被 `commands/fc.rs`, `parsers/outcar.rs` 使用
//! - 使用 `parsers/vasprun` 读取 Hessian
//! - 使用 `ndarray` 存储张量

use crate::error::{PhonomatError, Result};
use crate::models::mat3::Mat3;
use crate::models::CalculationReport;
use crate::parsers::vasprun;
use ndarray::{s, Array2, Array4};
use std::fs;
use std::path::Path;

/// (N, N, 3, 3) 力常数
#[derive(Debug, Clone, PartialEq)]
pub struct ForceConstants {
    tensor: Array4<f64>,
}

impl ForceConstants {
    pub fn num_atoms(&self) -> usize {
        self.tensor.shape()[0]
    }

    pub fn tensor(&self) -> &Array4<f64> {
        &self.tensor
    }

    /// 原子对 (i, j) 的 3×3 块
    pub fn block(&self, i: usize, j: usize) -> Mat3 {
        let mut m = [[0.0; 3]; 3];
        for (a, row) in m.iter_mut().enumerate() {
            for (b, x) in row.iter_mut().enumerate() {
                *x = self.tensor[[i, j, a, b]];
            }
        }
        m
    }
}

/// 由质量归一化的平铺矩阵构造力常数
pub fn build(flat: &Array2<f64>, atom_count: usize, masses: &[f64]) -> Result<ForceConstants> {
    let n3 = 3 * atom_count;
    if flat.dim() != (n3, n3) {
        return Err(PhonomatError::ShapeMismatch {
            expected: format!("({}, {})", n3, n3),
            found: format!("{:?}", flat.dim()),
        });
    }
    if masses.len() != atom_count {
        return Err(PhonomatError::ShapeMismatch {
            expected: format!("{} masses", atom_count),
            found: format!("{} masses", masses.len()),
        });
    }

    let mut tensor = Array4::<f64>::zeros((atom_count, atom_count, 3, 3));
    for i in 0..atom_count {
        for j in 0..atom_count {
            let factor = -(masses[i] * masses[j]).sqrt();
            let block = flat.slice(s![3 * i..3 * i + 3, 3 * j..3 * j + 3]);
            tensor
                .slice_mut(s![i, j, .., ..])
                .assign(&(&block * factor));
        }
    }

    Ok(ForceConstants { tensor })
}

/// 解析旧式文本表：首行为标题，随后 3N 行 `序号 v1 ... v3N`，全部取负
pub fn build_from_legacy_table(text: &str, atom_count: usize) -> Result<ForceConstants> {
    let n3 = 3 * atom_count;
    let rows: Vec<&str> = text
        .lines()
        .skip(1)
        .filter(|l| !l.trim().is_empty())
        .take(n3)
        .collect();

    if rows.len() != n3 {
        return Err(PhonomatError::ShapeMismatch {
            expected: format!("{} rows", n3),
            found: format!("{} rows", rows.len()),
        });
    }

    let mut flat = Array2::<f64>::zeros((n3, n3));
    for (r, line) in rows.iter().enumerate() {
        let values: Vec<f64> = line
            .split_whitespace()
            .skip(1)
            .map(|s| s.parse::<f64>())
            .collect::<std::result::Result<_, _>>()
            .map_err(|_| {
                PhonomatError::MalformedStructure(format!(
                    "Invalid force constant row: '{}'",
                    line.trim()
                ))
            })?;
        if values.len() != n3 {
            return Err(PhonomatError::ShapeMismatch {
                expected: format!("{} columns", n3),
                found: format!("{} columns in row {}", values.len(), r + 1),
            });
        }
        for (c, v) in values.into_iter().enumerate() {
            flat[[r, c]] = -v;
        }
    }

    let tensor = flat
        .into_shape_with_order((atom_count, 3, atom_count, 3))
        .map_err(|e| PhonomatError::ShapeMismatch {
            expected: format!("({}, 3, {}, 3)", atom_count, atom_count),
            found: e.to_string(),
        })?
        .permuted_axes([0, 2, 1, 3])
        .as_standard_layout()
        .to_owned();

    Ok(ForceConstants { tensor })
}

/// 从计算报告的 Hessian 读取力常数，同时返回 atomtypes 中的元素列表
pub fn read_force_constants_from_report(path: &Path) -> Result<(ForceConstants, Vec<String>)> {
    let report = vasprun::parse_report_file(path)?;
    from_report(&report, &path.display().to_string())
}

/// 由已解析的计算报告构造力常数
pub fn from_report(report: &CalculationReport, source: &str) -> Result<(ForceConstants, Vec<String>)> {
    let hessian = report
        .hessian
        .as_ref()
        .ok_or_else(|| PhonomatError::MissingData {
            what: "hessian".to_string(),
            path: source.to_string(),
        })?;
    let masses = report.masses();
    if masses.is_empty() {
        return Err(PhonomatError::MissingData {
            what: "atomtypes".to_string(),
            path: source.to_string(),
        });
    }

    let flat = to_array2(hessian)?;
    let fc = build(&flat, masses.len(), &masses)?;
    Ok((fc, report.elements()))
}

fn to_array2(rows: &[Vec<f64>]) -> Result<Array2<f64>> {
    let nrows = rows.len();
    let ncols = rows.first().map_or(0, Vec::len);
    if let Some(bad) = rows.iter().find(|r| r.len() != ncols) {
        return Err(PhonomatError::ShapeMismatch {
            expected: format!("{} columns", ncols),
            found: format!("{} columns", bad.len()),
        });
    }

    Array2::from_shape_vec((nrows, ncols), rows.concat()).map_err(|e| {
        PhonomatError::ShapeMismatch {
            expected: format!("({}, {})", nrows, ncols),
            found: e.to_string(),
        }
    })
}

/// 写出 FORCE_CONSTANTS 文本
pub fn format_force_constants(fc: &ForceConstants) -> String {
    let n = fc.num_atoms();
    let mut out = String::new();
    out.push_str(&format!("{:4} {:4}\n", n, n));
    for i in 0..n {
        for j in 0..n {
            out.push_str(&format!("{} {}\n", i + 1, j + 1));
            for row in fc.block(i, j) {
                out.push_str(&format!("{:22.15}{:22.15}{:22.15}\n", row[0], row[1], row[2]));
            }
        }
    }
    out
}

pub fn write_force_constants(fc: &ForceConstants, path: &Path) -> Result<()> {
    fs::write(path, format_force_constants(fc)).map_err(|e| PhonomatError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })
}
