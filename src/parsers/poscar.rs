//! # VASP POSCAR 格式写出
//!
//! ## POSCAR 格式说明
//! ```text
//! Si O                   # element symbols (title line)
//!    1.0                 # scaling factor
//! a1 a2 a3               # lattice vector a
//! b1 b2 b3               # lattice vector b
//! c1 c2 c3               # lattice vector c
//! Si O                   # element symbols
//!    1    1              # number of atoms per element
//! Direct                 # coordinate type
//! x1 y1 z1               # atom positions
//! ...
//!                        # trailing newline
//! ```
//!
//! ## 依赖关系
//! - 被 `commands/convert.rs` 使用
//! - 使用 `models/structure.rs`

use crate::models::structure::{reduce_position, Structure};

/// 将结构转换为 POSCAR 格式字符串
pub fn write_alternate_structure(structure: &Structure) -> String {
    let grouping = structure.species_grouping();
    let atoms = structure.atoms();
    let symbols = grouping.symbols.join(" ");

    let mut lines: Vec<String> = Vec::with_capacity(structure.num_atoms() + 9);

    // Line 0: Comment
    lines.push(symbols.clone());

    // Line 1: Scale
    lines.push("   1.0".to_string());

    // Lines 2-4: Lattice
    for row in &structure.lattice().matrix {
        lines.push(format!("  {:21.16} {:21.16} {:21.16}", row[0], row[1], row[2]));
    }

    // Line 5: Elements
    lines.push(symbols);

    // Line 6: Counts
    let counts: Vec<String> = grouping.counts.iter().map(|n| format!("{:4}", n)).collect();
    lines.push(counts.join(" "));

    // Coordinate type
    lines.push("Direct".to_string());

    // Atom positions
    for &i in &grouping.sort_list {
        let p = reduce_position(&atoms[i].position);
        lines.push(format!("{:20.16}{:20.16}{:20.16}", p[0], p[1], p[2]));
    }

    // 某些平台编译的 VASP 需要结尾换行才能正确读取
    lines.push(String::new());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::atom_config::read_structure;

    #[test]
    fn test_si_o_species_and_counts() {
        let content = "\
2
Lattice vector
1.0 0.0 0.0
0.0 1.0 0.0
0.0 0.0 1.0
Position
14 0.0 0.0 0.0 1 1 1
8 0.5 0.5 0.5 1 1 1
";
        let s = read_structure(content).unwrap();
        let poscar = write_alternate_structure(&s);
        let lines: Vec<&str> = poscar.lines().collect();

        assert_eq!(lines[0], "Si O");
        assert_eq!(lines[1].trim(), "1.0");
        assert_eq!(lines[5], "Si O");
        assert_eq!(lines[6].split_whitespace().collect::<Vec<_>>(), vec!["1", "1"]);
        assert_eq!(lines[7], "Direct");
        assert_eq!(lines.len(), 10);
        assert!(poscar.ends_with('\n'));
    }

    #[test]
    fn test_positions_follow_grouped_order() {
        let content = "\
3
Lattice vector
4.0 0.0 0.0
0.0 4.0 0.0
0.0 0.0 4.0
Position
8 0.1 0.0 0.0 1 1 1
22 0.2 0.0 0.0 1 1 1
8 1.3 0.0 0.0 1 1 1
";
        let s = read_structure(content).unwrap();
        let poscar = write_alternate_structure(&s);
        let xs: Vec<f64> = poscar
            .lines()
            .skip(8)
            .filter(|l| !l.trim().is_empty())
            .map(|l| l.split_whitespace().next().unwrap().parse().unwrap())
            .collect();

        assert_eq!(xs.len(), 3);
        assert!((xs[0] - 0.1).abs() < 1e-12);
        assert!((xs[1] - 0.3).abs() < 1e-12);
        assert!((xs[2] - 0.2).abs() < 1e-12);
        assert_eq!(poscar.lines().nth(6).unwrap(), "   2    1");
    }
}
