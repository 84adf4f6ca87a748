//! # 分析模块
//!
//! 标量场的面平均与真空定位、多项式拟合、电化学模型。
//!
//! ## 依赖关系
//! - 被 `commands/` 和 `batch/` 模块使用
//! - 使用 `models/` 数据模型
//! - 子模块: profile, polyfit, electrochem

pub mod electrochem;
pub mod polyfit;
pub mod profile;

pub use electrochem::{ActiveFraction, FeeRow};
pub use profile::{PlanarProfile, VacuumRegion};
