//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `parsers/`, `models/`, `analysis/`, `batch/`, `utils/`
//! - 子模块: extract, fee, sweep, geom, grid

pub mod extract;
pub mod fee;
pub mod geom;
pub mod grid;
pub mod sweep;

use crate::cli::Commands;
use crate::error::Result;

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Extract(args) => extract::execute(args),
        Commands::Fee(args) => fee::execute(args),
        Commands::Steps(args) => sweep::execute(args),
        Commands::Wf(args) => extract::execute_wf(args),
        Commands::Geom(args) => geom::execute(args),
        Commands::Grid(args) => grid::execute(args),
    }
}
