//! # 数据模型模块
//!
//! 定义晶体几何、三维标量场、扫描参数与结果数据集。
//!
//! ## 依赖关系
//! - 被 `parsers/`, `analysis/` 和 `commands/` 使用
//! - 子模块: geometry, grid, sweep, dataset

pub mod dataset;
pub mod geometry;
pub mod grid;
pub mod sweep;

pub use dataset::{ResultDataset, StepResult};
pub use geometry::Geometry;
pub use grid::ScalarField;
pub use sweep::{SweepParameters, SWEEP_FILE_NAME};
