//! # 解析器模块
//!
//! 提供 VASP 输入/输出文件与结果容器的解析与写出。
//!
//! ## 依赖关系
//! - 被 `commands/` 和 `batch/` 模块使用
//! - 使用 `models/` 数据模型
//! - 子模块: format, poscar, grid, outcar, dataset

pub mod dataset;
pub mod format;
pub mod grid;
pub mod outcar;
pub mod poscar;
