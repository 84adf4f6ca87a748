//! # fee 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/fee.rs`

use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// 电化学嵌入模型
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum FeeModel {
    /// Poisson-Boltzmann model
    Pbm,
    /// Homogeneous background model with a given active fraction
    Hbm,
    /// HBM with the active fraction estimated from the dataset
    HbmIdeal,
    /// HBM using the Fermi energy as the reference potential
    HbmFermi,
}

impl std::fmt::Display for FeeModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeeModel::Pbm => write!(f, "pbm"),
            FeeModel::Hbm => write!(f, "hbm"),
            FeeModel::HbmIdeal => write!(f, "hbm-ideal"),
            FeeModel::HbmFermi => write!(f, "hbm-fermi"),
        }
    }
}

/// fee 子命令参数
#[derive(Args, Debug)]
pub struct FeeArgs {
    /// Binary dataset written by `extract`
    #[arg(short = 'i', long, default_value = "ec_results.dat")]
    pub dataset: PathBuf,

    /// Output TSV table
    #[arg(short, long, default_value = "ec_fee.tsv")]
    pub output: PathBuf,

    /// Embedding model
    #[arg(long, value_enum, default_value_t = FeeModel::HbmFermi)]
    pub model: FeeModel,

    /// Active fraction for --model hbm
    #[arg(long, default_value_t = 1.0)]
    pub alpha: f64,

    /// Shift energies by the cell-average potential of the reference step
    #[arg(long)]
    pub shift_avg: bool,

    /// Reference electrode potential [V] (e.g. 4.44 for SHE)
    #[arg(long = "ref", default_value_t = 0.0)]
    pub reference: f64,
}
