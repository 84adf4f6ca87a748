//! # steps 命令实现
//!
//! 打印扫描参数派生出的电荷序列与对应目录名，
//! 用于在运行计算前检查序列是否符合预期。
//!
//! ## 依赖关系
//! - 使用 `cli/sweep.rs` 定义的参数
//! - 使用 `models/sweep.rs`
//! - 使用 `utils/output.rs`

use crate::cli::sweep::StepsArgs;
use crate::error::Result;
use crate::models::SweepParameters;
use crate::utils::output;

use tabled::{Table, Tabled};

/// 序列表的一行
#[derive(Debug, Clone, Tabled)]
struct StepRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "NELECT")]
    value: String,
    #[tabled(rename = "Directory")]
    directory: String,
}

/// 执行 steps 命令
pub fn execute(args: StepsArgs) -> Result<()> {
    let params = SweepParameters::from_directory(&args.directory)?;
    let values = params.steps();

    let rows: Vec<StepRow> = values
        .iter()
        .enumerate()
        .map(|(index, &value)| StepRow {
            index: index + 1,
            value: format!("{:.3}", value),
            directory: params.directory_name(value),
        })
        .collect();
    println!("{}", Table::new(&rows));

    output::print_info(&format!(
        "{} steps, NELECT from {:.3} to {:.3} (zero charge at {:.3})",
        values.len(),
        values.first().copied().unwrap_or(params.ne_zc),
        values.last().copied().unwrap_or(params.ne_zc),
        params.ne_zc
    ));
    Ok(())
}
