//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `extract`: 聚合扫描序列的计算结果
//! - `fee`: 由结果数据集计算巨势表与微分电容
//! - `steps`: 打印电荷扫描序列
//! - `wf`: 单目录功函数
//! - `geom`: 几何工具（嵌套子命令）
//!   - `slab` / `vacuum` / `merge` / `nelect`
//! - `grid`: 网格工具（嵌套子命令）
//!   - `average` / `integrate` / `fukui`
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: extract, fee, sweep, geom, grid

pub mod extract;
pub mod fee;
pub mod geom;
pub mod grid;
pub mod sweep;

use clap::{Parser, Subcommand};

/// eckit - 电化学界面计算后处理工具箱
#[derive(Parser)]
#[command(name = "eckit")]
#[command(version)]
#[command(about = "Post-processing toolkit for constant-charge electrochemical interface calculations", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Aggregate sweep calculation results into a dataset
    Extract(extract::ExtractArgs),

    /// Compute grand potential tables and differential capacitance
    Fee(fee::FeeArgs),

    /// Print the charge sweep sequence (values and directory names)
    Steps(sweep::StepsArgs),

    /// Work function of a single calculation directory
    Wf(extract::WfArgs),

    /// Slab geometry tools
    Geom(geom::GeomArgs),

    /// Volumetric grid tools
    Grid(grid::GridArgs),
}
