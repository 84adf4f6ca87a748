//! # VASP 标量场网格文件解析器
//!
//! 解析与写出 CHGCAR/LOCPOT 风格的网格文件：
//! POSCAR 几何头部 + 空行 + `nx ny nz` 行 + 数值块（每行 5 个科学计数值）。
//!
//! 磁盘上的数值顺序是第一轴 (x) 变化最快、第三轴 (z) 最慢；
//! 内存布局为 `[x][y][z]`（z 最快），读写时做相应的转置。
//!
//! ## 依赖关系
//! - 被 `batch/extract.rs`, `commands/grid.rs` 使用
//! - 使用 `parsers/poscar.rs`, `models/grid.rs`

use crate::error::{EckitError, Result};
use crate::models::ScalarField;
use crate::parsers::format::{scientific, GRID_PRECISION, GRID_VALUES_PER_LINE, GRID_WIDTH};
use crate::parsers::poscar::{parse_poscar_lines, to_poscar_string};
use std::fs;
use std::path::Path;

fn parse_error(label: &str, reason: impl Into<String>) -> EckitError {
    EckitError::ParseError {
        format: "grid".to_string(),
        path: label.to_string(),
        reason: reason.into(),
    }
}

/// 解析网格文件
pub fn parse_grid_file(path: &Path) -> Result<ScalarField> {
    let content = fs::read_to_string(path).map_err(|e| EckitError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_grid_content(&content, &path.display().to_string())
}

/// 从字符串内容解析网格文件
pub fn parse_grid_content(content: &str, label: &str) -> Result<ScalarField> {
    let lines: Vec<&str> = content.lines().collect();
    let (geometry, consumed) = parse_poscar_lines(&lines, label)?;

    let blank = lines
        .get(consumed)
        .ok_or_else(|| parse_error(label, "unexpected end of file after geometry header"))?;
    if !blank.trim().is_empty() {
        return Err(parse_error(
            label,
            "expected a blank line between geometry header and grid dimensions",
        ));
    }

    let dims_line = lines
        .get(consumed + 1)
        .ok_or_else(|| parse_error(label, "missing grid dimensions line"))?;
    let dims: Vec<usize> = dims_line
        .split_whitespace()
        .map(|t| {
            t.parse()
                .map_err(|_| parse_error(label, format!("invalid grid dimension '{}'", t)))
        })
        .collect::<Result<_>>()?;
    if dims.len() != 3 || dims.iter().any(|&n| n == 0) {
        return Err(parse_error(
            label,
            format!("grid dimensions line '{}' must hold 3 positive integers", dims_line.trim()),
        ));
    }
    let (nx, ny, nz) = (dims[0], dims[1], dims[2]);
    let total = nx * ny * nz;

    // 磁盘顺序：x 最快，z 最慢；重排为内存 [x][y][z] 布局
    let mut values = vec![0.0; total];
    let mut read = 0usize;
    'outer: for raw in &lines[consumed + 2..] {
        for token in raw.split_whitespace() {
            if read == total {
                // CHGCAR 可能跟随增广占据数据，忽略
                break 'outer;
            }
            let value: f64 = token
                .parse()
                .map_err(|_| parse_error(label, format!("invalid grid value '{}'", token)))?;

            let ix = read % nx;
            let iy = (read / nx) % ny;
            let iz = read / (nx * ny);
            values[(ix * ny + iy) * nz + iz] = value;
            read += 1;
        }
        if read == total {
            break;
        }
    }

    if read < total {
        return Err(parse_error(
            label,
            format!("grid block holds {} values, expected {}", read, total),
        ));
    }

    ScalarField::new(geometry, [nx, ny, nz], values)
}

/// 将标量场序列化为网格文件字符串
///
/// 几何头部沿用来源文件的坐标模式。
pub fn to_grid_string(field: &ScalarField) -> Result<String> {
    let mut result = to_poscar_string(&field.geometry, field.geometry.direct)?;
    result.push('\n');

    let [nx, ny, nz] = field.shape;
    result.push_str(&format!("{:>5} {:>5} {:>5}\n", nx, ny, nz));

    let total = field.value_count();
    for k in 0..total {
        let ix = k % nx;
        let iy = (k / nx) % ny;
        let iz = k / (nx * ny);
        result.push_str(&scientific(field.at(ix, iy, iz), GRID_WIDTH, GRID_PRECISION));

        if (k + 1) % GRID_VALUES_PER_LINE == 0 || k + 1 == total {
            result.push('\n');
        }
    }

    Ok(result)
}

/// 写出网格文件
pub fn write_grid_file(path: &Path, field: &ScalarField) -> Result<()> {
    let content = to_grid_string(field)?;
    fs::write(path, content).map_err(|e| EckitError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })
}
