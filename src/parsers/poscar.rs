//! # VASP POSCAR 格式解析器
//!
//! 解析与写出 VASP POSCAR/CONTCAR 文件格式。
//!
//! ## POSCAR 格式说明
//! ```text
//! Comment line (structure name)
//! 1.0                    # scaling factor
//! a1 a2 a3               # lattice vector a
//! b1 b2 b3               # lattice vector b
//! c1 c2 c3               # lattice vector c
//! Element1 Element2 ...  # element symbols
//! n1 n2 ...              # number of atoms per element
//! Selective dynamics     # optional
//! Direct/Cartesian       # coordinate type
//! x1 y1 z1 [T T T]       # atom positions, optional flags + trailing label
//! ...
//! ```
//!
//! ## 依赖关系
//! - 被 `parsers/grid.rs`, `commands/` 使用
//! - 使用 `models/geometry.rs`

use crate::error::{EckitError, Result};
use crate::models::Geometry;
use crate::parsers::format::{fixed, COORD_PRECISION, COORD_WIDTH};
use std::fs;
use std::path::Path;

/// 解析 POSCAR/CONTCAR 文件
pub fn parse_poscar_file(path: &Path) -> Result<Geometry> {
    let content = fs::read_to_string(path).map_err(|e| EckitError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_poscar_content(&content, &path.display().to_string())
}

/// 从字符串内容解析 POSCAR 格式
pub fn parse_poscar_content(content: &str, label: &str) -> Result<Geometry> {
    let lines: Vec<&str> = content.lines().collect();
    let (geometry, _) = parse_poscar_lines(&lines, label)?;
    Ok(geometry)
}

fn parse_error(label: &str, reason: impl Into<String>) -> EckitError {
    EckitError::ParseError {
        format: "poscar".to_string(),
        path: label.to_string(),
        reason: reason.into(),
    }
}

fn line<'a>(lines: &[&'a str], index: usize, label: &str, what: &str) -> Result<&'a str> {
    lines
        .get(index)
        .copied()
        .ok_or_else(|| parse_error(label, format!("unexpected end of file, expected {}", what)))
}

fn parse_float(token: &str, label: &str, what: &str) -> Result<f64> {
    token
        .parse()
        .map_err(|_| parse_error(label, format!("invalid number '{}' in {}", token, what)))
}

/// 从行数组解析几何头部，返回几何与消耗的行数
///
/// CHGCAR/LOCPOT 等网格文件复用同样的头部布局。
pub(crate) fn parse_poscar_lines(lines: &[&str], label: &str) -> Result<(Geometry, usize)> {
    let title = line(lines, 0, label, "title line")?.trim().to_string();

    let scale: f64 = parse_float(
        line(lines, 1, label, "scaling factor")?.trim(),
        label,
        "scaling factor",
    )?;

    let mut lattice = [[0.0; 3]; 3];
    for i in 0..3 {
        let row = line(lines, 2 + i, label, "lattice vector")?;
        let tokens: Vec<&str> = row.split_whitespace().collect();
        if tokens.len() < 3 {
            return Err(parse_error(
                label,
                format!("lattice vector at line {} has fewer than 3 components", 3 + i),
            ));
        }
        for j in 0..3 {
            lattice[i][j] = scale * parse_float(tokens[j], label, "lattice vector")?;
        }
    }

    let ion_types: Vec<String> = line(lines, 5, label, "ion type labels")?
        .split_whitespace()
        .map(|s| s.to_string())
        .collect();
    if ion_types.is_empty() {
        return Err(parse_error(label, "missing ion type labels"));
    }

    let mut ion_counts = Vec::with_capacity(ion_types.len());
    for token in line(lines, 6, label, "ion counts")?.split_whitespace() {
        let count: usize = token
            .parse()
            .map_err(|_| parse_error(label, format!("invalid ion count '{}'", token)))?;
        ion_counts.push(count);
    }
    if ion_counts.len() != ion_types.len() {
        return Err(parse_error(
            label,
            format!(
                "{} ion type labels but {} counts",
                ion_types.len(),
                ion_counts.len()
            ),
        ));
    }

    // 可选 "Selective dynamics" 标记行（只看首字母）
    let mut index = 7;
    let selective = line(lines, index, label, "coordinate mode line")?
        .trim()
        .to_lowercase()
        .starts_with('s');
    if selective {
        index += 1;
    }

    let mode = line(lines, index, label, "coordinate mode line")?.trim();
    let direct = match mode.chars().next().map(|c| c.to_ascii_lowercase()) {
        Some('d') => true,
        Some('c') | Some('k') => false,
        _ => {
            return Err(parse_error(
                label,
                format!("invalid coordinate mode line '{}'", mode),
            ))
        }
    };
    index += 1;

    let n: usize = ion_counts.iter().sum();
    let mut positions = Vec::with_capacity(n);
    let mut flags = Vec::with_capacity(if selective { n } else { 0 });

    for row in 0..n {
        let tokens: Vec<&str> =
            line(lines, index + row, label, "position row")?.split_whitespace().collect();
        if tokens.len() < 3 {
            return Err(parse_error(
                label,
                format!("position row {} has fewer than 3 components", row + 1),
            ));
        }

        positions.push([
            parse_float(tokens[0], label, "position row")?,
            parse_float(tokens[1], label, "position row")?,
            parse_float(tokens[2], label, "position row")?,
        ]);

        if selective {
            if tokens.len() < 6 {
                return Err(parse_error(
                    label,
                    format!("position row {} is missing selective dynamics flags", row + 1),
                ));
            }
            let mut row_flags = [false; 3];
            for (slot, token) in row_flags.iter_mut().zip(&tokens[3..6]) {
                *slot = match *token {
                    "T" | "t" => true,
                    "F" | "f" => false,
                    other => {
                        return Err(parse_error(
                            label,
                            format!("invalid selective dynamics flag '{}'", other),
                        ))
                    }
                };
            }
            flags.push(row_flags);
        }
    }

    let geometry = Geometry::new(
        title,
        lattice,
        ion_types,
        ion_counts,
        positions,
        direct,
        selective.then_some(flags),
    )?;

    Ok((geometry, index + n))
}

/// 将几何序列化为 POSCAR 字符串（定宽定精度，无损往返）
pub fn to_poscar_string(geometry: &Geometry, direct: bool) -> Result<String> {
    let mut result = String::new();

    result.push_str(&format!("{}\n1.0\n", geometry.title));

    for row in &geometry.lattice {
        result.push_str(&format!(
            "{} {} {}\n",
            fixed(row[0], COORD_WIDTH, COORD_PRECISION),
            fixed(row[1], COORD_WIDTH, COORD_PRECISION),
            fixed(row[2], COORD_WIDTH, COORD_PRECISION),
        ));
    }

    result.push_str(&format!("{}\n", geometry.ion_types.join(" ")));
    result.push_str(&format!(
        "{}\n",
        geometry
            .ion_counts
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    ));

    if geometry.selective_dynamics.is_some() {
        result.push_str("Selective dynamics\n");
    }
    result.push_str(if direct { "Direct\n" } else { "Cartesian\n" });

    let positions = geometry.positions_as(direct)?;
    let ions = geometry.ions();
    for (i, pos) in positions.iter().enumerate() {
        result.push_str(&format!(
            "{} {} {}",
            fixed(pos[0], COORD_WIDTH, COORD_PRECISION),
            fixed(pos[1], COORD_WIDTH, COORD_PRECISION),
            fixed(pos[2], COORD_WIDTH, COORD_PRECISION),
        ));

        if let Some(ref flags) = geometry.selective_dynamics {
            for flag in &flags[i] {
                result.push_str(if *flag { " T" } else { " F" });
            }
        }

        result.push_str(&format!(" {}\n", ions[i]));
    }

    Ok(result)
}

/// 写出 POSCAR 文件
pub fn write_poscar_file(path: &Path, geometry: &Geometry, direct: bool) -> Result<()> {
    let content = to_poscar_string(geometry, direct)?;
    fs::write(path, content).map_err(|e| EckitError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })
}
