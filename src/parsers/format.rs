//! # 数值序列化格式策略
//!
//! 集中定义写出几何/网格文件时的定宽定精度格式，
//! 避免格式常量散落在各个写出函数中。
//!
//! ## 依赖关系
//! - 被 `parsers/poscar.rs`, `parsers/grid.rs` 使用

/// 坐标与晶格向量列宽
pub const COORD_WIDTH: usize = 16;
/// 坐标与晶格向量小数位数
pub const COORD_PRECISION: usize = 12;

/// 网格数值列宽
pub const GRID_WIDTH: usize = 18;
/// 网格数值有效位数（科学计数法小数位）
pub const GRID_PRECISION: usize = 10;
/// 网格文件每行数值个数
pub const GRID_VALUES_PER_LINE: usize = 5;

/// 定宽定点格式，非负数保留符号位空格（对应 `% w.pf`）
pub fn fixed(value: f64, width: usize, precision: usize) -> String {
    let body = format!("{:.*}", precision, value);
    let signed = if value.is_sign_negative() {
        body
    } else {
        format!(" {}", body)
    };
    format!("{:>width$}", signed)
}

/// 定宽科学计数法，指数规范为符号 + 两位数字（如 ` 1.2345678901E+03`）
pub fn scientific(value: f64, width: usize, precision: usize) -> String {
    let formatted = format!("{:.*E}", precision, value);
    let (mantissa, exponent) = formatted
        .split_once('E')
        .expect("{:E} always contains an exponent");
    let (sign, digits) = match exponent.strip_prefix('-') {
        Some(rest) => ('-', rest),
        None => ('+', exponent),
    };

    let body = format!("{}E{}{:0>2}", mantissa, sign, digits);
    let signed = if value.is_sign_negative() {
        body
    } else {
        format!(" {}", body)
    };
    format!("{:>width$}", signed)
}
