//! # 解析器模块
//!
//! 提供结构文件、受力文件与计算报告的读写。
//!
//! ## 依赖关系
//! - 被 `commands/` 模块使用
//! - 使用 `models/` 数据模型
//! - 子模块: atom_config, poscar, force_file, vasprun, outcar

pub mod atom_config;
pub mod force_file;
pub mod outcar;
pub mod poscar;
pub mod vasprun;

use crate::error::{PhonomatError, Result};
use crate::models::Structure;
use std::path::Path;

/// 输出结构格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureFormat {
    AtomConfig,
    Poscar,
}

/// 从文件路径推断格式并解析结构
pub fn parse_structure_file(path: &Path) -> Result<Structure> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default();

    if name.ends_with(".config") || name.ends_with(".pwmat") || name == "final.config" {
        return atom_config::parse_atom_config_file(path);
    }

    if name.starts_with("vasprun") && name.ends_with(".xml") {
        return vasprun::parse_report_file(path)?.final_structure(&path.display().to_string());
    }

    Err(PhonomatError::InvalidArgument(format!(
        "Cannot determine structure format for: {}",
        path.display()
    )))
}

/// 按格式写出结构
pub fn write_structure(structure: &Structure, format: StructureFormat) -> String {
    match format {
        StructureFormat::AtomConfig => atom_config::write_structure(structure),
        StructureFormat::Poscar => poscar::write_alternate_structure(structure),
    }
}
