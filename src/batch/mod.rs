//! # 批量处理模块
//!
//! 对扫描序列的所有计算目录并行提取数据。
//!
//! ## 依赖关系
//! - 被 `commands/extract.rs` 调用
//! - 使用 `rayon` 进行并行处理
//! - 使用 `indicatif` 显示进度

pub mod extract;

pub use extract::{aggregate, extract_step, ExtractionReport};
