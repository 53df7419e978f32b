//! # PWmat 受力文件解析器
//!
//! 解析 OUT.FORCE 风格的受力表：第一行为原子数，随后每行为
//! `原子序号 fx fy fz`。PWmat 的受力符号与声子程序约定相反，读入时取负。
//!
//! ## 依赖关系
//! - 被 `commands/forces.rs` 使用
//! - 使用 `models/forces.rs`

use crate::error::{PhonomatError, Result};
use crate::models::ForceSet;
use std::fs;
use std::path::{Path, PathBuf};

/// 解析单个受力文件
pub fn parse_forces_file(path: &Path, num_atoms: usize) -> Result<ForceSet> {
    let content = fs::read_to_string(path).map_err(|e| PhonomatError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_forces_content(&content, num_atoms).map_err(|e| match e {
        PhonomatError::ForceCountMismatch {
            expected, found, ..
        } => PhonomatError::ForceCountMismatch {
            path: path.display().to_string(),
            expected,
            found,
        },
        other => other,
    })
}

/// 从字符串内容解析受力表
pub fn parse_forces_content(content: &str, num_atoms: usize) -> Result<ForceSet> {
    let mut forces = Vec::with_capacity(num_atoms);

    for line in content.lines().skip(1).take(num_atoms) {
        let values: Vec<f64> = line
            .split_whitespace()
            .skip(1)
            .take(3)
            .map(|s| s.parse::<f64>())
            .collect::<std::result::Result<_, _>>()
            .map_err(|_| {
                PhonomatError::MalformedStructure(format!("Invalid force line: '{}'", line.trim()))
            })?;

        if values.len() < 3 {
            break;
        }
        forces.push([-values[0], -values[1], -values[2]]);
    }

    if forces.len() != num_atoms {
        return Err(PhonomatError::ForceCountMismatch {
            path: "<string>".to_string(),
            expected: num_atoms,
            found: forces.len(),
        });
    }

    Ok(ForceSet::new(forces))
}

/// 按顺序解析一组受力文件，任一失败即整体失败
pub fn parse_set_of_forces(paths: &[PathBuf], num_atoms: usize) -> Result<Vec<ForceSet>> {
    paths
        .iter()
        .map(|p| parse_forces_file(p, num_atoms))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const FORCE: &str = "\
2 atoms
14   0.100   -0.200   0.300
8   -0.100    0.200  -0.300
";

    #[test]
    fn test_forces_are_negated() {
        let set = parse_forces_content(FORCE, 2).unwrap();
        assert_eq!(set.forces()[0], [-0.1, 0.2, -0.3]);
        assert_eq!(set.forces()[1], [0.1, -0.2, 0.3]);
        assert_eq!(set.drift(), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_short_force_file_fails() {
        let err = parse_forces_content(FORCE, 3).unwrap_err();
        assert!(matches!(
            err,
            PhonomatError::ForceCountMismatch {
                expected: 3,
                found: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_set_of_forces_keeps_file_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut paths = Vec::new();
        for (i, f) in ["0.5", "1.5"].iter().enumerate() {
            let path = dir.path().join(format!("OUT.FORCE-{:03}", i + 1));
            let mut file = fs::File::create(&path).unwrap();
            writeln!(file, "1").unwrap();
            writeln!(file, "1 {} 0.0 0.0", f).unwrap();
            paths.push(path);
        }

        let sets = parse_set_of_forces(&paths, 1).unwrap();
        assert_eq!(sets.len(), 2);
        assert_eq!(sets[0].forces()[0][0], -0.5);
        assert_eq!(sets[1].forces()[0][0], -1.5);
    }

    #[test]
    fn test_set_of_forces_names_failing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("OUT.FORCE");
        fs::write(&path, "2\n1 0 0 0\n").unwrap();

        match parse_set_of_forces(&[path.clone()], 2) {
            Err(PhonomatError::ForceCountMismatch { path: p, .. }) => {
                assert_eq!(p, path.display().to_string())
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
