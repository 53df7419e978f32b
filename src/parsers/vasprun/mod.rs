//! # vasprun.xml 计算报告流式解析器
//!
//! 基于 `xml-rs` 的事件流逐个处理开始标签、结束标签与文本，不在内存中构造文档树。
//!
//! 同名元素（`varray`、`set`、`v`、`i` ...）的含义取决于祖先元素，
//! 因此解析器维护一个与打开元素一一对应的 [`Frame`] 栈：
//! - 进入元素时根据名称、属性和当前栈顶上下文决定压入哪种帧；
//! - 离开元素时弹出帧，并把该帧对应的累积数据写入结果。
//!
//! 几条规则：
//! - 带 `name` 属性的 `<structure>`（initialpos / finalpos）内不采集 positions / basis；
//! - `<scstep>` 内的 `<energy>` 为电子自洽中间值，不采集；
//! - `<projected>` 内的 `<eigenvalues>` 与普通本征值区分开。
//!
//! 解析失败时整个解析器被丢弃，调用者只得到错误，不会拿到部分结果。
//!
//! ## 依赖关系
//! - 被 `commands/fc.rs`, `commands/born.rs`, `phonon/force_constants.rs` 使用
//! - 使用 `models/calculation.rs`
//! - 子模块: legacy (旧版本写出程序的预处理)

pub mod legacy;

use crate::error::{PhonomatError, Result};
use crate::models::mat3::{Mat3, Vec3};
use crate::models::{AtomType, CalculationReport};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use xml::attribute::OwnedAttribute;
use xml::reader::{ParserConfig, XmlEvent};

/// 解析计算报告文件
pub fn parse_report_file(path: &Path) -> Result<CalculationReport> {
    let file = File::open(path).map_err(|e| PhonomatError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_report(BufReader::new(file))
}

/// 从字节流解析计算报告
pub fn parse_report<R: BufRead>(reader: R) -> Result<CalculationReport> {
    let (source, _version) = legacy::open_report(reader)?;
    let legacy_filter_applied = source.is_legacy();

    let mut report = ReportParser::new().parse(source)?;
    report.legacy_filter_applied = legacy_filter_applied;
    Ok(report)
}

/// 被采集的 `<varray name="...">`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VectorTarget {
    Forces,
    Stress,
    Epsilon,
    Positions,
    Basis,
    KWeights,
    Hessian,
}

/// 被识别的 `<array name="...">`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArrayKind {
    Atoms,
    AtomTypes,
    BornCharges,
    Other,
}

/// `<i>` 标量的去向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScalarTarget {
    Efermi,
    Energy,
    Ignored,
}

/// 每个打开元素对应一帧
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    ScStep,
    NamedStructure,
    Varray(Option<VectorTarget>),
    Array(ArrayKind),
    BornSet,
    Energy,
    Eigenvalues,
    Projected,
    Scalar(ScalarTarget),
    Row,
    Cell,
    Vector,
    BandRow,
    Other,
}

/// `<set comment=...>` 与 `<r>` 所属的能带数据段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BandSection {
    Eigenvalues,
    Projected,
}

/// 单次解析的全部状态，解析结束即丢弃
struct ReportParser {
    stack: Vec<Frame>,
    text: String,
    vectors: Vec<Vec<f64>>,
    born_atom: Vec<Vec<f64>>,
    energy: Vec<f64>,
    row: Vec<String>,
    report: CalculationReport,
}

impl ReportParser {
    fn new() -> Self {
        ReportParser {
            stack: Vec::new(),
            text: String::new(),
            vectors: Vec::new(),
            born_atom: Vec::new(),
            energy: Vec::new(),
            row: Vec::new(),
            report: CalculationReport::default(),
        }
    }

    fn parse<R: Read>(mut self, reader: R) -> Result<CalculationReport> {
        let events = ParserConfig::new()
            .trim_whitespace(false)
            .whitespace_to_characters(false)
            .cdata_to_characters(true)
            .coalesce_characters(true)
            .create_reader(reader);

        for event in events {
            match event.map_err(|e| PhonomatError::StreamParseFailure(e.to_string()))? {
                XmlEvent::StartElement {
                    name, attributes, ..
                } => self.start_element(&name.local_name, &attributes)?,
                XmlEvent::EndElement { name } => self.end_element(&name.local_name)?,
                XmlEvent::Characters(s) | XmlEvent::CData(s) => self.text.push_str(&s),
                XmlEvent::EndDocument => break,
                _ => {}
            }
        }

        if !self.stack.is_empty() {
            return Err(PhonomatError::StreamParseFailure(
                "Document ended with unclosed elements".to_string(),
            ));
        }

        Ok(self.report)
    }

    // ─────────────────────────────────────────────────────────────
    // 上下文查询
    // ─────────────────────────────────────────────────────────────

    fn inside(&self, frame: Frame) -> bool {
        self.stack.contains(&frame)
    }

    fn innermost_array(&self) -> Option<ArrayKind> {
        self.stack.iter().rev().find_map(|f| match f {
            Frame::Array(kind) => Some(*kind),
            _ => None,
        })
    }

    fn band_section(&self) -> Option<BandSection> {
        for frame in self.stack.iter().rev() {
            match frame {
                // <projected> 内的 <eigenvalues> 不采集
                Frame::Eigenvalues if self.inside(Frame::Projected) => return None,
                Frame::Eigenvalues => return Some(BandSection::Eigenvalues),
                Frame::Projected => return Some(BandSection::Projected),
                _ => {}
            }
        }
        None
    }

    fn vector_target(&self, name: &str) -> Option<VectorTarget> {
        match name {
            "forces" => Some(VectorTarget::Forces),
            "stress" => Some(VectorTarget::Stress),
            "epsilon" => Some(VectorTarget::Epsilon),
            "weights" => Some(VectorTarget::KWeights),
            "hessian" => Some(VectorTarget::Hessian),
            "positions" if !self.inside(Frame::NamedStructure) => Some(VectorTarget::Positions),
            "basis" if !self.inside(Frame::NamedStructure) => Some(VectorTarget::Basis),
            _ => None,
        }
    }

    // ─────────────────────────────────────────────────────────────
    // 事件处理
    // ─────────────────────────────────────────────────────────────

    fn start_element(&mut self, name: &str, attributes: &[OwnedAttribute]) -> Result<()> {
        self.text.clear();
        let name_attr = attribute(attributes, "name");

        let frame = match name {
            "scstep" => Frame::ScStep,
            "structure" if name_attr.is_some() => Frame::NamedStructure,
            "varray" => {
                let target = name_attr.and_then(|n| self.vector_target(n));
                if target.is_some() {
                    self.vectors.clear();
                }
                Frame::Varray(target)
            }
            "array" => Frame::Array(match name_attr {
                Some("atoms") => ArrayKind::Atoms,
                Some("atomtypes") => ArrayKind::AtomTypes,
                Some("born_charges") => ArrayKind::BornCharges,
                _ => ArrayKind::Other,
            }),
            "set" if self.stack.last() == Some(&Frame::Array(ArrayKind::BornCharges)) => {
                self.born_atom.clear();
                Frame::BornSet
            }
            "set" => {
                if let Some(comment) = attribute(attributes, "comment") {
                    self.open_band_set(comment)?;
                }
                Frame::Other
            }
            "energy" if !self.inside(Frame::ScStep) => {
                self.energy.clear();
                Frame::Energy
            }
            "i" => Frame::Scalar(if name_attr == Some("efermi") {
                ScalarTarget::Efermi
            } else if self.inside(Frame::Energy) {
                ScalarTarget::Energy
            } else {
                ScalarTarget::Ignored
            }),
            "v" => Frame::Vector,
            "rc" => {
                self.row.clear();
                Frame::Row
            }
            "c" => Frame::Cell,
            "r" => Frame::BandRow,
            "eigenvalues" => {
                // 每个本征值块重新开始
                if !self.inside(Frame::Projected) {
                    self.report.eigenvalues.clear();
                }
                Frame::Eigenvalues
            }
            "projected" => {
                self.report.projectors.clear();
                Frame::Projected
            }
            _ => Frame::Other,
        };

        self.stack.push(frame);
        Ok(())
    }

    fn end_element(&mut self, name: &str) -> Result<()> {
        let frame = self.stack.pop().ok_or_else(|| {
            PhonomatError::StreamParseFailure(format!("Unexpected closing tag </{}>", name))
        })?;

        match frame {
            Frame::Vector => self.close_vector()?,
            Frame::Varray(Some(target)) => self.close_varray(target)?,
            Frame::BornSet => {
                let rows = std::mem::take(&mut self.born_atom);
                self.report.born_charges.push(to_mat3(rows, "born_charges")?);
            }
            Frame::Energy => {
                let block = std::mem::take(&mut self.energy);
                self.report.energies.push(block);
            }
            Frame::Scalar(ScalarTarget::Efermi) => {
                self.report.efermi = Some(parse_scalar(&self.text)?);
            }
            Frame::Scalar(ScalarTarget::Energy) => {
                let value = parse_scalar(&self.text)?;
                self.energy.push(value);
            }
            Frame::Cell => {
                self.row.push(self.text.trim().to_string());
            }
            Frame::Row => self.close_row()?,
            Frame::BandRow => self.close_band_row()?,
            _ => {}
        }

        self.text.clear();
        Ok(())
    }

    /// `<v>`：追加到最近的采集上下文
    fn close_vector(&mut self) -> Result<()> {
        let owner = self
            .stack
            .iter()
            .rev()
            .find(|f| matches!(f, Frame::Varray(_) | Frame::BornSet))
            .copied();

        match owner {
            Some(Frame::BornSet) => {
                let row = parse_row(&self.text)?;
                self.born_atom.push(row);
            }
            Some(Frame::Varray(Some(_))) => {
                let row = parse_row(&self.text)?;
                self.vectors.push(row);
            }
            _ => {}
        }
        Ok(())
    }

    fn close_varray(&mut self, target: VectorTarget) -> Result<()> {
        let rows = std::mem::take(&mut self.vectors);
        match target {
            VectorTarget::Forces => self.report.forces.push(to_vec3_rows(rows, "forces")?),
            VectorTarget::Stress => self.report.stress.push(to_mat3(rows, "stress")?),
            VectorTarget::Epsilon => self.report.epsilon = Some(to_mat3(rows, "epsilon")?),
            VectorTarget::Positions => self
                .report
                .positions
                .push(to_vec3_rows(rows, "positions")?),
            VectorTarget::Basis => self.report.lattices.push(to_mat3(rows, "basis")?),
            VectorTarget::KWeights => {
                self.report.k_weights = rows
                    .into_iter()
                    .map(|r| match r.as_slice() {
                        [w] => Ok(*w),
                        _ => Err(shape_error("weights", "1 value per row")),
                    })
                    .collect::<Result<_>>()?;
            }
            VectorTarget::Hessian => self.report.hessian = Some(rows),
        }
        Ok(())
    }

    /// `<rc>`：atoms 取元素符号，atomtypes 取 (数量, 元素, 质量, 价电子)
    fn close_row(&mut self) -> Result<()> {
        let row = std::mem::take(&mut self.row);
        match self.innermost_array() {
            Some(ArrayKind::Atoms) => {
                let symbol = row
                    .into_iter()
                    .next()
                    .ok_or_else(|| shape_error("atoms", "element symbol"))?;
                self.report.symbols.push(symbol);
            }
            Some(ArrayKind::AtomTypes) => {
                if row.len() < 4 {
                    return Err(shape_error("atomtypes", "count, element, mass, valence"));
                }
                let number = |s: &str| {
                    s.parse::<f64>().map_err(|_| {
                        PhonomatError::StreamParseFailure(format!("Invalid atomtypes value '{}'", s))
                    })
                };
                let count = row[0].parse::<usize>().map_err(|_| {
                    PhonomatError::StreamParseFailure(format!("Invalid atom count '{}'", row[0]))
                })?;
                self.report.atom_types.push(AtomType {
                    count,
                    element: row[1].clone(),
                    mass: number(&row[2])?,
                    valence: number(&row[3])?,
                });
            }
            _ => {}
        }
        Ok(())
    }

    /// 带 comment 的 `<set>`：spin / kpoint / band 分组
    fn open_band_set(&mut self, comment: &str) -> Result<()> {
        let section = match self.band_section() {
            Some(s) => s,
            None => return Ok(()),
        };
        let out_of_order =
            || PhonomatError::StreamParseFailure(format!("Unexpected <set comment=\"{}\">", comment));

        match section {
            BandSection::Eigenvalues => {
                if comment.contains("spin") {
                    self.report.eigenvalues.push(Vec::new());
                } else if comment.contains("kpoint") {
                    self.report
                        .eigenvalues
                        .last_mut()
                        .ok_or_else(out_of_order)?
                        .push(Vec::new());
                }
            }
            BandSection::Projected => {
                if comment.contains("spin") {
                    self.report.projectors.push(Vec::new());
                } else if comment.contains("kpoint") {
                    self.report
                        .projectors
                        .last_mut()
                        .ok_or_else(out_of_order)?
                        .push(Vec::new());
                } else if comment.contains("band") {
                    self.report
                        .projectors
                        .last_mut()
                        .and_then(|s| s.last_mut())
                        .ok_or_else(out_of_order)?
                        .push(Vec::new());
                }
            }
        }
        Ok(())
    }

    fn close_band_row(&mut self) -> Result<()> {
        let section = match self.band_section() {
            Some(s) => s,
            None => return Ok(()),
        };
        let row = parse_row(&self.text)?;
        let misplaced = || PhonomatError::StreamParseFailure("<r> outside a kpoint set".to_string());

        match section {
            BandSection::Eigenvalues => self
                .report
                .eigenvalues
                .last_mut()
                .and_then(|s| s.last_mut())
                .ok_or_else(misplaced)?
                .push(row),
            BandSection::Projected => self
                .report
                .projectors
                .last_mut()
                .and_then(|s| s.last_mut())
                .and_then(|k| k.last_mut())
                .ok_or_else(misplaced)?
                .push(row),
        }
        Ok(())
    }
}

fn attribute<'a>(attributes: &'a [OwnedAttribute], key: &str) -> Option<&'a str> {
    attributes
        .iter()
        .find(|a| a.name.local_name == key)
        .map(|a| a.value.as_str())
}

fn parse_row(text: &str) -> Result<Vec<f64>> {
    text.split_whitespace()
        .map(|s| {
            s.parse::<f64>().map_err(|_| {
                PhonomatError::StreamParseFailure(format!("Invalid number '{}'", s))
            })
        })
        .collect()
}

fn parse_scalar(text: &str) -> Result<f64> {
    let text = text.trim();
    text.parse()
        .map_err(|_| PhonomatError::StreamParseFailure(format!("Invalid number '{}'", text)))
}

fn shape_error(section: &str, expected: &str) -> PhonomatError {
    PhonomatError::StreamParseFailure(format!("'{}' rows must contain {}", section, expected))
}

fn to_vec3_rows(rows: Vec<Vec<f64>>, section: &str) -> Result<Vec<Vec3>> {
    rows.into_iter()
        .map(|r| match r.as_slice() {
            [x, y, z] => Ok([*x, *y, *z]),
            _ => Err(shape_error(section, "3 values")),
        })
        .collect()
}

fn to_mat3(rows: Vec<Vec<f64>>, section: &str) -> Result<Mat3> {
    let rows = to_vec3_rows(rows, section)?;
    match rows.as_slice() {
        [a, b, c] => Ok([*a, *b, *c]),
        _ => Err(PhonomatError::StreamParseFailure(format!(
            "'{}' must have 3 rows, found {}",
            section,
            rows.len()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_str(xml: &str) -> Result<CalculationReport> {
        parse_report(xml.as_bytes())
    }

    const REPORT: &str = r#"<?xml version="1.0" encoding="ISO-8859-1"?>
<modeling>
 <generator>
  <i name="program" type="string">vasp </i>
  <i name="version" type="string">5.4.4.18Apr17-6-g9f103f2a35  </i>
 </generator>
 <kpoints>
  <varray name="weights" >
   <v>       0.25000000 </v>
   <v>       0.75000000 </v>
  </varray>
 </kpoints>
 <atominfo>
  <atoms>       2 </atoms>
  <types>       2 </types>
  <array name="atoms" >
   <dimension dim="1">ion</dimension>
   <field type="string">element</field>
   <field type="int">atomtype</field>
   <set>
    <rc><c>Si</c><c>   1</c></rc>
    <rc><c>O </c><c>   2</c></rc>
   </set>
  </array>
  <array name="atomtypes" >
   <dimension dim="1">type</dimension>
   <set>
    <rc><c>   1</c><c>Si</c><c>     28.08500000</c><c>      4.00000000</c><c>  PAW_PBE Si 05Jan2001</c></rc>
    <rc><c>   1</c><c>O </c><c>     16.00000000</c><c>      6.00000000</c><c>  PAW_PBE O 08Apr2002</c></rc>
   </set>
  </array>
 </atominfo>
 <structure name="initialpos" >
  <crystal>
   <varray name="basis" >
    <v>       9.00000000       0.00000000       0.00000000 </v>
    <v>       0.00000000       9.00000000       0.00000000 </v>
    <v>       0.00000000       0.00000000       9.00000000 </v>
   </varray>
  </crystal>
  <varray name="positions" >
   <v>       0.90000000       0.00000000       0.00000000 </v>
   <v>       0.90000000       0.50000000       0.50000000 </v>
  </varray>
 </structure>
 <calculation>
  <scstep>
   <energy>
    <i name="e_fr_energy">    -99.00000000 </i>
   </energy>
  </scstep>
  <structure>
   <crystal>
    <varray name="basis" >
     <v>       4.00000000       0.00000000       0.00000000 </v>
     <v>       0.00000000       4.00000000       0.00000000 </v>
     <v>       0.00000000       0.00000000       4.00000000 </v>
    </varray>
   </crystal>
   <varray name="positions" >
    <v>       0.00000000       0.00000000       0.00000000 </v>
    <v>       0.50000000       0.50000000       0.50000000 </v>
   </varray>
  </structure>
  <varray name="forces" >
   <v>       0.10000000       0.20000000       0.30000000 </v>
   <v>      -0.10000000      -0.20000000      -0.30000000 </v>
  </varray>
  <varray name="stress" >
   <v>       1.00000000       0.00000000       0.00000000 </v>
   <v>       0.00000000       2.00000000       0.00000000 </v>
   <v>       0.00000000       0.00000000       3.00000000 </v>
  </varray>
  <energy>
   <i name="e_fr_energy">    -10.50000000 </i>
   <i name="e_wo_entrp">    -10.40000000 </i>
   <i name="e_0_energy">    -10.45000000 </i>
  </energy>
  <varray name="forces" >
   <v>       0.01000000       0.02000000       0.03000000 </v>
   <v>      -0.01000000      -0.02000000      -0.03000000 </v>
  </varray>
  <eigenvalues>
   <array>
    <dimension dim="1">band</dimension>
    <set>
     <set comment="spin 1">
      <set comment="kpoint 1">
       <r>   -5.0000    1.0000 </r>
       <r>    2.0000    0.0000 </r>
      </set>
      <set comment="kpoint 2">
       <r>   -4.0000    1.0000 </r>
       <r>    3.0000    0.0000 </r>
      </set>
     </set>
    </set>
   </array>
  </eigenvalues>
  <dos>
   <i name="efermi">      1.25000000 </i>
  </dos>
  <projected>
   <eigenvalues>
    <array>
     <set>
      <set comment="spin 1">
       <set comment="kpoint 1">
        <r>   99.0000    1.0000 </r>
       </set>
      </set>
     </set>
    </array>
   </eigenvalues>
   <array>
    <set>
     <set comment="spin1">
      <set comment="kpoint 1">
       <set comment="band 1">
        <r>    0.1000    0.2000 </r>
        <r>    0.3000    0.4000 </r>
       </set>
       <set comment="band 2">
        <r>    0.5000    0.6000 </r>
       </set>
      </set>
     </set>
    </set>
   </array>
  </projected>
 </calculation>
 <varray name="epsilon" >
  <v>       5.00000000       0.10000000       0.00000000 </v>
  <v>       0.10000000       5.00000000       0.00000000 </v>
  <v>       0.00000000       0.00000000       6.00000000 </v>
 </varray>
 <array name="born_charges" >
  <set>
   <v>       2.00000000       0.00000000       0.00000000 </v>
   <v>       0.00000000       2.00000000       0.00000000 </v>
   <v>       0.00000000       0.00000000       2.00000000 </v>
  </set>
  <set>
   <v>      -2.00000000       0.00000000       0.00000000 </v>
   <v>       0.00000000      -2.00000000       0.00000000 </v>
   <v>       0.00000000       0.00000000      -2.00000000 </v>
  </set>
 </array>
 <structure name="finalpos" >
  <crystal>
   <varray name="basis" >
    <v>       8.00000000       0.00000000       0.00000000 </v>
    <v>       0.00000000       8.00000000       0.00000000 </v>
    <v>       0.00000000       0.00000000       8.00000000 </v>
   </varray>
  </crystal>
 </structure>
</modeling>
"#;

    #[test]
    fn test_two_force_sections_in_document_order() {
        let report = parse_str(REPORT).unwrap();
        assert_eq!(report.forces.len(), 2);
        assert_eq!(report.forces[0], vec![[0.1, 0.2, 0.3], [-0.1, -0.2, -0.3]]);
        assert_eq!(report.forces[1][0], [0.01, 0.02, 0.03]);
        assert_eq!(report.forces[1][1], [-0.01, -0.02, -0.03]);
    }

    #[test]
    fn test_named_structures_are_not_captured() {
        let report = parse_str(REPORT).unwrap();
        assert_eq!(report.lattices.len(), 1);
        assert_eq!(report.lattices[0][0], [4.0, 0.0, 0.0]);
        assert_eq!(report.positions.len(), 1);
        assert_eq!(report.positions[0][1], [0.5, 0.5, 0.5]);
    }

    #[test]
    fn test_scstep_energies_are_skipped() {
        let report = parse_str(REPORT).unwrap();
        assert_eq!(report.energies, vec![vec![-10.5, -10.4, -10.45]]);
    }

    #[test]
    fn test_scalars_and_tensors() {
        let report = parse_str(REPORT).unwrap();
        assert_eq!(report.efermi, Some(1.25));
        assert_eq!(report.k_weights, vec![0.25, 0.75]);
        assert_eq!(report.stress[0][2], [0.0, 0.0, 3.0]);
        assert_eq!(report.epsilon.unwrap()[0], [5.0, 0.1, 0.0]);
        assert_eq!(report.born_charges.len(), 2);
        assert_eq!(report.born_charges[1][2][2], -2.0);
        assert!(!report.legacy_filter_applied);
    }

    #[test]
    fn test_species_and_atom_types() {
        let report = parse_str(REPORT).unwrap();
        assert_eq!(report.symbols, vec!["Si", "O"]);
        assert_eq!(report.atom_types.len(), 2);
        assert_eq!(report.atom_types[1].element, "O");
        assert_eq!(report.masses(), vec![28.085, 16.0]);

        let s = report.final_structure("vasprun.xml").unwrap();
        assert_eq!(s.atoms()[1].atomic_number, 8);
    }

    #[test]
    fn test_eigenvalues_and_projectors() {
        let report = parse_str(REPORT).unwrap();
        assert_eq!(report.eigenvalues.len(), 1);
        assert_eq!(report.eigenvalues[0].len(), 2);
        assert_eq!(report.eigenvalues[0][1], vec![vec![-4.0, 1.0], vec![3.0, 0.0]]);

        assert_eq!(report.projectors.len(), 1);
        assert_eq!(report.projectors[0].len(), 1);
        assert_eq!(report.projectors[0][0].len(), 2);
        assert_eq!(report.projectors[0][0][0], vec![vec![0.1, 0.2], vec![0.3, 0.4]]);
        assert_eq!(report.projectors[0][0][1], vec![vec![0.5, 0.6]]);
    }

    #[test]
    fn test_band_blocks_keep_only_the_last_calculation() {
        let block = |e: f64, p: f64| {
            format!(
                r#"<calculation>
 <eigenvalues><array><set>
  <set comment="spin 1"><set comment="kpoint 1"><r> {} 1.0 </r></set></set>
 </set></array></eigenvalues>
 <projected><array><set>
  <set comment="spin1"><set comment="kpoint 1"><set comment="band 1">
   <r> {} 0.5 </r>
  </set></set></set>
 </set></array></projected>
</calculation>"#,
                e, p
            )
        };
        let xml = format!("<modeling>{}{}</modeling>", block(-1.0, 0.1), block(-2.0, 0.2));
        let report = parse_str(&xml).unwrap();

        assert_eq!(report.eigenvalues.len(), 1);
        assert_eq!(report.eigenvalues[0], vec![vec![vec![-2.0, 1.0]]]);
        assert_eq!(report.projectors.len(), 1);
        assert_eq!(report.projectors[0][0][0], vec![vec![0.2, 0.5]]);
    }

    #[test]
    fn test_hessian_rows() {
        let xml = r#"<modeling><dynmat>
<varray name="hessian">
 <v> 1 2 3 4 5 6 </v>
 <v> 7 8 9 10 11 12 </v>
</varray>
</dynmat></modeling>"#;
        let report = parse_str(xml).unwrap();
        let h = report.hessian.unwrap();
        assert_eq!(h.len(), 2);
        assert_eq!(h[1][5], 12.0);
    }

    #[test]
    fn test_truncated_stream_fails() {
        let cut = &REPORT[..REPORT.len() / 2];
        assert!(matches!(
            parse_str(cut),
            Err(PhonomatError::StreamParseFailure(_))
        ));
    }

    #[test]
    fn test_invalid_markup_fails() {
        let xml = "<modeling><varray name=\"forces\"><v>1 2 3</varray></modeling>";
        assert!(matches!(
            parse_str(xml),
            Err(PhonomatError::StreamParseFailure(_))
        ));
    }

    #[test]
    fn test_bad_force_row_fails() {
        let xml = "<modeling><varray name=\"forces\"><v>1 2</v></varray></modeling>";
        assert!(matches!(
            parse_str(xml),
            Err(PhonomatError::StreamParseFailure(_))
        ));
    }

    #[test]
    fn test_legacy_writer_report_is_filtered() {
        let xml = "<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?>\n<modeling>\n <generator>\n  <i name=\"version\" type=\"string\">5.2.8  </i>\n </generator>\n <incar>\n  <i type=\"string\" name=\"PRECFOCK\"> <<garbled\n </incar>\n <varray name=\"forces\">\n  <v> 1.0 2.0 3.0 </v>\n </varray>\n</modeling>\n";
        let report = parse_str(xml).unwrap();
        assert!(report.legacy_filter_applied);
        assert_eq!(report.forces, vec![vec![[1.0, 2.0, 3.0]]]);
    }
}
