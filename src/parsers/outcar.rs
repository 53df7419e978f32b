//! # VASP OUTCAR 解析器
//!
//! 从 OUTCAR 中提取：
//! - 宏观介电张量与 Born 有效电荷（`MACROSCOPIC STATIC DIELECTRIC TENSOR`, `BORN`）；
//! - 有限位移计算写出的二阶导数表（`SECOND DERIVATIVES`）。
//!
//! ## 依赖关系
//! - 被 `commands/born.rs`, `commands/fc.rs` 使用
//! - 使用 `phonon/force_constants.rs` 解析二阶导数表

use crate::error::{PhonomatError, Result};
use crate::models::mat3::Mat3;
use crate::phonon::force_constants::{build_from_legacy_table, ForceConstants};
use std::fs;
use std::path::Path;

/// 读取 Born 有效电荷（每原子一个）与介电张量
pub fn read_born_and_epsilon(path: &Path) -> Result<(Vec<Mat3>, Mat3)> {
    let content = read_file(path)?;
    parse_born_and_epsilon(&content, &path.display().to_string())
}

/// 读取 OUTCAR 中的二阶导数表并构造力常数
pub fn read_force_constants(path: &Path) -> Result<ForceConstants> {
    let content = read_file(path)?;
    parse_force_constants(&content, &path.display().to_string())
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| PhonomatError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })
}

/// 从字符串内容提取 Born 电荷与介电张量
pub fn parse_born_and_epsilon(content: &str, source: &str) -> Result<(Vec<Mat3>, Mat3)> {
    let mut lines = content.lines();
    let mut num_atoms: Option<usize> = None;
    let mut epsilon: Option<Mat3> = None;
    let mut borns: Vec<Mat3> = Vec::new();

    while let Some(line) = lines.next() {
        // "   number of dos      NEDOS =    301   number of ions     NIONS =      2"
        if line.contains("NIONS") {
            num_atoms = line.split_whitespace().nth(11).and_then(|s| s.parse().ok());
        }

        if line.contains("MACROSCOPIC STATIC DIELECTRIC TENSOR") {
            lines.next();
            epsilon = Some(read_tensor_rows(&mut lines, 0, source)?);
        }

        if line.contains("BORN") {
            lines.next();
            let header = lines.next().unwrap_or_default();
            if !header.contains("ion") {
                continue;
            }

            let n = num_atoms.ok_or_else(|| PhonomatError::MissingData {
                what: "NIONS".to_string(),
                path: source.to_string(),
            })?;

            // 每个原子 3 行（首列为分量标签），随后一行为下一个原子的 "ion" 标题
            borns.clear();
            for _ in 0..n {
                borns.push(read_tensor_rows(&mut lines, 1, source)?);
                lines.next();
            }
        }
    }

    let epsilon = epsilon.ok_or_else(|| PhonomatError::MissingData {
        what: "MACROSCOPIC STATIC DIELECTRIC TENSOR".to_string(),
        path: source.to_string(),
    })?;
    if borns.is_empty() {
        return Err(PhonomatError::MissingData {
            what: "BORN EFFECTIVE CHARGES".to_string(),
            path: source.to_string(),
        });
    }

    Ok((borns, epsilon))
}

/// 从字符串内容提取二阶导数表
pub fn parse_force_constants(content: &str, source: &str) -> Result<ForceConstants> {
    let mut lines = content.lines();

    lines
        .by_ref()
        .find(|l| l.starts_with(" SECOND DERIVATIVES"))
        .ok_or_else(|| PhonomatError::MissingData {
            what: "SECOND DERIVATIVES".to_string(),
            path: source.to_string(),
        })?;
    lines.next();

    // 列标题 "1X 1Y 1Z ... NZ"，末列去掉方向字母即为原子数
    let table: Vec<&str> = lines.collect();
    let num_atoms = table
        .first()
        .and_then(|h| h.split_whitespace().last())
        .and_then(|t| t.get(..t.len().saturating_sub(1)))
        .and_then(|t| t.parse::<usize>().ok())
        .ok_or_else(|| {
            PhonomatError::MalformedStructure(format!(
                "Cannot read atom count from SECOND DERIVATIVES header in {}",
                source
            ))
        })?;

    build_from_legacy_table(&table.join("\n"), num_atoms)
}

fn read_tensor_rows<'a>(
    lines: &mut impl Iterator<Item = &'a str>,
    skip: usize,
    source: &str,
) -> Result<Mat3> {
    let mut m = [[0.0; 3]; 3];
    for row in m.iter_mut() {
        let line = lines.next().unwrap_or_default();
        let malformed = || {
            PhonomatError::MalformedStructure(format!(
                "Expected 3 tensor components in {}: '{}'",
                source,
                line.trim()
            ))
        };
        let values = line
            .split_whitespace()
            .skip(skip)
            .take(3)
            .map(|s| s.parse::<f64>().map_err(|_| malformed()))
            .collect::<Result<Vec<f64>>>()?;
        if values.len() < 3 {
            return Err(malformed());
        }
        row.copy_from_slice(&values);
    }
    Ok(m)
}

#[cfg(test)]
mod tests {
    use super::*;

    const OUTCAR: &str = "\
   number of dos      NEDOS =    301   number of ions     NIONS =      2

 MACROSCOPIC STATIC DIELECTRIC TENSOR (including local field effects in DFT)
 ------------------------------------------------------
           2.500000     0.000000     0.000000
           0.000000     2.500000     0.000000
           0.000000     0.000000     3.000000
 ------------------------------------------------------

 BORN EFFECTIVE CHARGES (in e, cummulative output)
 ---------------------------------------------------------------------------------
 ion    1
    1     1.10000     0.00000     0.00000
    2     0.00000     1.20000     0.00000
    3     0.00000     0.00000     1.30000
 ion    2
    1    -1.10000     0.00000     0.00000
    2     0.00000    -1.20000     0.00000
    3     0.00000     0.00000    -1.30000
 ---------------------------------------------------------------------------------
";

    #[test]
    fn test_read_born_and_epsilon() {
        let (borns, epsilon) = parse_born_and_epsilon(OUTCAR, "OUTCAR").unwrap();
        assert_eq!(epsilon[2][2], 3.0);
        assert_eq!(epsilon[0][0], 2.5);
        assert_eq!(borns.len(), 2);
        assert_eq!(borns[0][1][1], 1.2);
        assert_eq!(borns[1][2][2], -1.3);
    }

    #[test]
    fn test_missing_dielectric_tensor() {
        let content = OUTCAR.replace("MACROSCOPIC", "MICROSCOPIC");
        assert!(matches!(
            parse_born_and_epsilon(&content, "OUTCAR"),
            Err(PhonomatError::MissingData { .. })
        ));
    }

    #[test]
    fn test_overflowed_component_is_rejected() {
        let content = OUTCAR.replace("    2     0.00000    -1.20000", "    2     0.00000 *********");
        assert!(matches!(
            parse_born_and_epsilon(&content, "OUTCAR"),
            Err(PhonomatError::MalformedStructure(_))
        ));
    }

    #[test]
    fn test_read_second_derivatives() {
        let content = "\
 header
 SECOND DERIVATIVES (NOT SYMMETRIZED)
 ------------------------------------
            1X        1Y        1Z        2X        2Y        2Z
  1X     1.0000    0.0000    0.0000   -1.0000    0.0000    0.0000
  1Y     0.0000    1.0000    0.0000    0.0000   -1.0000    0.0000
  1Z     0.0000    0.0000    1.0000    0.0000    0.0000   -1.0000
  2X    -1.0000    0.0000    0.0000    1.0000    0.0000    0.0000
  2Y     0.0000   -1.0000    0.0000    0.0000    1.0000    0.0000
  2Z     0.0000    0.0000   -1.0000    0.0000    0.0000    1.0000
";
        let fc = parse_force_constants(content, "OUTCAR").unwrap();
        assert_eq!(fc.num_atoms(), 2);
        assert_eq!(fc.block(0, 0)[0][0], -1.0);
        assert_eq!(fc.block(0, 1)[1][1], 1.0);
        assert_eq!(fc.block(1, 0)[0][1], 0.0);
    }

    #[test]
    fn test_missing_second_derivatives() {
        assert!(matches!(
            parse_force_constants(OUTCAR, "OUTCAR"),
            Err(PhonomatError::MissingData { .. })
        ));
    }
}
