//! # eckit - 电化学界面计算后处理工具箱
//!
//! 将定电荷 (constant-charge) 电化学界面计算的后处理脚本
//! 用 Rust 重构，统一成单一可执行文件。
//!
//! ## 子命令
//! - `extract` - 聚合扫描序列的计算结果为数据集
//! - `fee`     - 巨势表与微分电容 (PBM / HBM)
//! - `steps`   - 打印电荷扫描序列
//! - `wf`      - 单目录功函数
//! - `geom`    - 几何工具
//!   - `slab` / `vacuum` / `merge` / `nelect`
//! - `grid`    - 网格工具
//!   - `average` / `integrate` / `fukui`
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── batch/     (并行提取)
//!   │     ├── analysis/  (剖面、拟合、电化学模型)
//!   │     ├── parsers/   (格式解析器)
//!   │     └── models/    (数据模型)
//!   ├── utils/      (工具函数)
//!   └── error.rs    (错误处理)
//! ```

mod analysis;
mod batch;
mod cli;
mod commands;
mod error;
mod models;
mod parsers;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
