//! # steps 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/sweep.rs`

use clap::Args;
use std::path::PathBuf;

/// steps 子命令参数
#[derive(Args, Debug)]
pub struct StepsArgs {
    /// Directory containing ec_interface.toml
    #[arg(short = 'i', long, default_value = ".")]
    pub directory: PathBuf,
}
