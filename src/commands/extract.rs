//! # extract / wf 命令实现
//!
//! `extract`：读取扫描参数，聚合所有步骤目录的计算结果，
//! 打印汇总表并写出 TSV 表与二进制数据集。
//!
//! `wf`：单目录功函数，用于调试。
//!
//! ## 依赖关系
//! - 使用 `cli/extract.rs` 定义的参数
//! - 使用 `batch/extract.rs`, `models/`, `parsers/dataset.rs`
//! - 使用 `utils/output.rs`

use crate::batch;
use crate::cli::extract::{ExtractArgs, WfArgs};
use crate::error::{EckitError, Result};
use crate::models::{ResultDataset, SweepParameters};
use crate::parsers::dataset::write_dataset_file;
use crate::utils::output;

use tabled::{Table, Tabled};

/// 汇总表的一行
#[derive(Debug, Clone, Tabled)]
struct SummaryRow {
    #[tabled(rename = "Directory")]
    directory: String,
    #[tabled(rename = "NELECT")]
    nelect: String,
    #[tabled(rename = "Free energy [eV]")]
    free_energy: String,
    #[tabled(rename = "Fermi [eV]")]
    fermi_energy: String,
    #[tabled(rename = "Vacuum [eV]")]
    vacuum_potential: String,
    #[tabled(rename = "WF [V]")]
    work_function: String,
}

/// 执行 extract 命令
pub fn execute(args: ExtractArgs) -> Result<()> {
    output::print_header("Extracting Sweep Results");

    if !args.directory.is_dir() {
        return Err(EckitError::DirectoryNotFound {
            path: args.directory.display().to_string(),
        });
    }

    let params = SweepParameters::from_directory(&args.directory)?;
    output::print_info(&format!(
        "Sweep of {} steps around NELECT = {:.3}",
        params.steps().len(),
        params.ne_zc
    ));

    let report = batch::aggregate(&params, &args.directory, args.jobs, !args.skip_profiles);

    for (directory, reason) in &report.failures {
        output::print_warning(&format!("{}: {} (skipped)", directory, reason));
    }

    if report.steps.is_empty() {
        return Err(EckitError::Other(
            "no step could be extracted, nothing to write".to_string(),
        ));
    }

    let table_rows: Vec<SummaryRow> = report
        .steps
        .iter()
        .map(|step| SummaryRow {
            directory: step.directory.clone(),
            nelect: format!("{:.3}", step.result.nelect),
            free_energy: format!("{:.5}", step.result.free_energy),
            fermi_energy: format!("{:.4}", step.result.fermi_energy),
            vacuum_potential: format!("{:.4}", step.result.vacuum_potential),
            work_function: format!("{:.4}", step.result.work_function()),
        })
        .collect();
    println!("{}", Table::new(&table_rows));
    output::print_separator();

    let dataset = ResultDataset::new(
        params.ne_zc,
        report.steps.iter().map(|step| step.result).collect(),
    );

    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(&args.output)?;
    for row in &dataset.rows {
        writer.serialize(row)?;
    }
    writer.flush().map_err(|e| EckitError::FileWriteError {
        path: args.output.display().to_string(),
        source: e,
    })?;
    output::print_success(&format!("Wrote table to {}", args.output.display()));

    write_dataset_file(&args.dataset, &dataset)?;
    output::print_success(&format!("Wrote dataset to {}", args.dataset.display()));

    output::print_done(&format!(
        "{} extracted, {} skipped",
        report.steps.len(),
        report.failures.len()
    ));
    Ok(())
}

/// 执行 wf 命令：单目录功函数
pub fn execute_wf(args: WfArgs) -> Result<()> {
    let result = batch::extract_step(&args.directory, false)?;
    println!("{:.3} [V]", result.work_function());
    Ok(())
}
