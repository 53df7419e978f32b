//! # PWmat atom.config 格式读写
//!
//! ## atom.config 格式说明
//! ```text
//! 2                          # number of atoms
//! Lattice vector             # label (ignored)
//! a1 a2 a3                   # lattice vector a
//! b1 b2 b3                   # lattice vector b
//! c1 c2 c3                   # lattice vector c
//! Position                   # label (ignored)
//! 14  x1 y1 z1  1 1 1        # atomic number, fractional coords, move flags
//! 8   x2 y2 z2  1 1 1
//! MAGNETIC                   # optional
//! 14  0.0                    # atomic number, moment
//! 8   0.0
//! ```
//!
//! 写出时原子按元素首次出现顺序分组，分数坐标约化到 [0, 1)，
//! 每行末尾附带三个占位的移动标志。
//!
//! ## 依赖关系
//! - 被 `commands/convert.rs`, `commands/born.rs` 使用
//! - 使用 `models/structure.rs`, `models/element.rs`

use crate::error::{PhonomatError, Result};
use crate::models::element;
use crate::models::structure::{reduce_position, Atom, Lattice, Structure};
use std::fs;
use std::path::Path;

const HEADER_LINES: usize = 6;

/// 解析 atom.config 文件
pub fn parse_atom_config_file(path: &Path) -> Result<Structure> {
    let content = fs::read_to_string(path).map_err(|e| PhonomatError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    read_structure(&content).map_err(|e| match e {
        PhonomatError::MalformedStructure(reason) => {
            PhonomatError::MalformedStructure(format!("{}: {}", path.display(), reason))
        }
        other => other,
    })
}

/// 从字符串内容解析 atom.config 格式
pub fn read_structure(content: &str) -> Result<Structure> {
    let lines: Vec<&str> = content.lines().collect();

    // Line 0: number of atoms
    let num_atoms: usize = lines
        .first()
        .and_then(|l| l.split_whitespace().next())
        .ok_or_else(|| malformed("Missing atom count line"))?
        .parse()
        .map_err(|_| malformed("Invalid atom count on line 1"))?;

    if lines.len() < HEADER_LINES + num_atoms {
        return Err(malformed(&format!(
            "File too short: {} lines for {} atoms",
            lines.len(),
            num_atoms
        )));
    }

    // Lines 2-4: Lattice vectors
    let mut matrix = [[0.0; 3]; 3];
    for i in 0..3 {
        matrix[i] = parse_vec3(lines[2 + i].split_whitespace(), 3 + i)?;
    }
    let lattice = Lattice::from_vectors(matrix);

    // Atom lines
    let mut atoms = Vec::with_capacity(num_atoms);
    for (k, line) in lines[HEADER_LINES..HEADER_LINES + num_atoms].iter().enumerate() {
        let line_no = HEADER_LINES + k + 1;
        let mut tokens = line.split_whitespace();

        let z: i64 = tokens
            .next()
            .ok_or_else(|| malformed(&format!("Empty atom line {}", line_no)))?
            .parse()
            .map_err(|_| malformed(&format!("Invalid atomic number at line {}", line_no)))?;
        let symbol = u32::try_from(z)
            .ok()
            .and_then(element::symbol_of)
            .ok_or(PhonomatError::UnknownElement(z))?;

        let position = parse_vec3(tokens, line_no)?;
        atoms.push(Atom::new(symbol, z as u32, position));
    }

    let structure = Structure::new(lattice, atoms)?;

    match parse_magnetic_block(&lines[HEADER_LINES + num_atoms..], num_atoms)? {
        Some(moments) => structure.with_magnetic_moments(moments),
        None => Ok(structure),
    }
}

/// 可选的 MAGNETIC 段
fn parse_magnetic_block(rest: &[&str], num_atoms: usize) -> Result<Option<Vec<f64>>> {
    let start = match rest
        .iter()
        .position(|l| l.trim().eq_ignore_ascii_case("magnetic"))
    {
        Some(i) => i + 1,
        None => return Ok(None),
    };

    if rest.len() < start + num_atoms {
        return Err(malformed("MAGNETIC block is shorter than the atom count"));
    }

    let moments = rest[start..start + num_atoms]
        .iter()
        .map(|l| {
            l.split_whitespace()
                .nth(1)
                .and_then(|s| s.parse::<f64>().ok())
                .ok_or_else(|| malformed(&format!("Invalid MAGNETIC entry: '{}'", l.trim())))
        })
        .collect::<Result<Vec<f64>>>()?;

    Ok(Some(moments))
}

fn parse_vec3<'a>(mut tokens: impl Iterator<Item = &'a str>, line_no: usize) -> Result<[f64; 3]> {
    let mut v = [0.0; 3];
    for x in v.iter_mut() {
        *x = tokens
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| malformed(&format!("Expected 3 numbers at line {}", line_no)))?;
    }
    Ok(v)
}

fn malformed(reason: &str) -> PhonomatError {
    PhonomatError::MalformedStructure(reason.to_string())
}

/// 将结构转换为 atom.config 格式字符串
pub fn write_structure(structure: &Structure) -> String {
    let grouping = structure.species_grouping();
    let atoms = structure.atoms();

    let mut lines: Vec<String> = Vec::with_capacity(structure.num_atoms() + HEADER_LINES + 1);
    lines.push(structure.num_atoms().to_string());
    lines.push("Lattice vector".to_string());
    for row in &structure.lattice().matrix {
        lines.push(format!("  {:21.16} {:21.16} {:21.16}", row[0], row[1], row[2]));
    }
    lines.push("Position".to_string());

    for &i in &grouping.sort_list {
        let p = reduce_position(&atoms[i].position);
        lines.push(format!(
            "{}    {:20.16}{:20.16}{:20.16}    0  0  0",
            atoms[i].atomic_number, p[0], p[1], p[2]
        ));
    }

    // 结尾换行
    lines.push(String::new());
    lines.join("\n")
}

/// 生成 MAGMOM 行（分组顺序）；无磁矩时返回 `None`
pub fn write_magnetic_moments(structure: &Structure) -> Option<String> {
    let moments = structure.magnetic_moments()?;
    let grouping = structure.species_grouping();

    let mut result = String::from(" MAGMOM = ");
    for m in grouping.apply(moments) {
        result.push_str(&format!("{:.6} ", m));
    }
    result.push('\n');
    Some(result)
}
