//! # extract / wf 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/extract.rs`

use clap::Args;
use std::path::PathBuf;

/// extract 子命令参数
#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Directory containing ec_interface.toml and the sweep subdirectories
    #[arg(short = 'i', long, default_value = ".")]
    pub directory: PathBuf,

    /// Output TSV table
    #[arg(short, long, default_value = "ec_results.tsv")]
    pub output: PathBuf,

    /// Output binary dataset (read back by `fee`)
    #[arg(long, default_value = "ec_results.dat")]
    pub dataset: PathBuf,

    /// Number of parallel jobs (0 = all available CPUs)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,

    /// Do not write per-step planar average profiles
    #[arg(long)]
    pub skip_profiles: bool,
}

/// wf 子命令参数
#[derive(Args, Debug)]
pub struct WfArgs {
    /// Directory where the calculation is
    #[arg(default_value = ".")]
    pub directory: PathBuf,
}
