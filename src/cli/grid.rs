//! # grid 子命令 CLI 定义
//!
//! 三维网格文件 (CHGCAR/LOCPOT) 工具统一入口：
//! - `average`: 面平均剖面
//! - `integrate`: 分区电荷积分
//! - `fukui`: 有限差分 Fukui 函数
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/grid.rs`

use clap::{Args, Subcommand};
use std::path::PathBuf;

/// grid 主命令参数
#[derive(Args, Debug)]
pub struct GridArgs {
    #[command(subcommand)]
    pub command: GridCommands,
}

/// grid 子命令
#[derive(Subcommand, Debug)]
pub enum GridCommands {
    /// Planar average profile of a grid file
    Average(AverageArgs),

    /// Integrate a charge density profile between threshold crossings
    Integrate(IntegrateArgs),

    /// Finite-difference Fukui function from two charge densities
    Fukui(FukuiArgs),
}

/// average 子命令参数
#[derive(Args, Debug)]
pub struct AverageArgs {
    /// Grid file (CHGCAR or LOCPOT)
    pub infile: PathBuf,

    /// Reduction axis (0 = x, 1 = y, 2 = z)
    #[arg(short, long, default_value_t = 2)]
    pub axis: usize,

    /// Output TSV (stdout if omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// integrate 子命令参数
#[derive(Args, Debug)]
pub struct IntegrateArgs {
    /// Charge density grid file (CHGCAR)
    pub infile: PathBuf,

    /// Region boundary threshold on the per-plane charge
    #[arg(short, long, default_value_t = 1e-3)]
    pub threshold: f64,
}

/// fukui 子命令参数
#[derive(Args, Debug)]
pub struct FukuiArgs {
    /// Reference charge density ρ(N) (CHGCAR)
    pub reference: PathBuf,

    /// Perturbed charge density ρ(N+ΔN) (CHGCAR)
    pub perturbed: PathBuf,

    /// Value of ΔN
    #[arg(short, long)]
    pub delta: f64,

    /// Central difference: interpret inputs as ρ(N-ΔN) and ρ(N+ΔN)
    #[arg(short, long)]
    pub symmetric: bool,

    /// Output grid file
    #[arg(short, long, default_value = "FUKUI")]
    pub output: PathBuf,
}
