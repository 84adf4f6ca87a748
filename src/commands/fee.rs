//! # fee 命令实现
//!
//! 加载 `extract` 写出的二进制数据集，按选定的嵌入模型
//! 计算巨势表，写成 TSV 并打印拟合的微分电容。
//!
//! ## 依赖关系
//! - 使用 `cli/fee.rs` 定义的参数
//! - 使用 `analysis/electrochem.rs`, `parsers/dataset.rs`
//! - 使用 `utils/output.rs`

use crate::analysis::electrochem::{
    differential_capacitance, estimate_active_fraction, fee_hbm, fee_hbm_fermi, fee_pbm, FeeRow,
};
use crate::cli::fee::{FeeArgs, FeeModel};
use crate::error::{EckitError, Result};
use crate::models::ResultDataset;
use crate::parsers::dataset::read_dataset_file;
use crate::utils::output;

use tabled::{Table, Tabled};

/// 巨势表的一行（屏幕显示）
#[derive(Debug, Clone, Tabled)]
struct FeeTableRow {
    #[tabled(rename = "Charge [e]")]
    charge: String,
    #[tabled(rename = "WF [V]")]
    work_function: String,
    #[tabled(rename = "WF - ref [V]")]
    work_function_vs_ref: String,
    #[tabled(rename = "Grand potential [eV]")]
    fee: String,
}

fn compute_rows(dataset: &ResultDataset, args: &FeeArgs) -> Result<(Vec<FeeRow>, String)> {
    match args.model {
        FeeModel::Pbm => {
            let rows = fee_pbm(dataset, args.shift_avg, args.reference)?;
            Ok((rows, "PBM".to_string()))
        }
        FeeModel::Hbm => {
            let rows = fee_hbm(dataset, args.alpha, args.shift_avg, args.reference)?;
            Ok((rows, format!("HBM, alpha={:.4}", args.alpha)))
        }
        FeeModel::HbmIdeal => {
            let estimate = estimate_active_fraction(dataset, args.shift_avg)?;
            output::print_info(&format!(
                "Capacitance [e/V] = {:.5} (charge), {:.5} (grand potential), active fraction = {:.3}",
                estimate.cap_charge,
                estimate.cap_grand,
                estimate.fraction()
            ));
            let alpha = estimate.fraction();
            let rows = fee_hbm(dataset, alpha, args.shift_avg, args.reference)?;
            Ok((rows, format!("HBM, alpha={:.4}", alpha)))
        }
        FeeModel::HbmFermi => {
            let rows = fee_hbm_fermi(dataset, args.shift_avg, args.reference)?;
            Ok((rows, "HBM, WF=Fermi".to_string()))
        }
    }
}

/// 执行 fee 命令
pub fn execute(args: FeeArgs) -> Result<()> {
    output::print_header("Computing Grand Potential");

    let dataset = read_dataset_file(&args.dataset)?;
    output::print_info(&format!(
        "{} steps, NELECT(zero charge) = {:.3}",
        dataset.len(),
        dataset.ne_zc
    ));

    let (rows, label) = compute_rows(&dataset, &args)?;
    output::print_info(&format!("Model: {}", label));

    let table_rows: Vec<FeeTableRow> = rows
        .iter()
        .map(|row| FeeTableRow {
            charge: format!("{:.3}", row.charge),
            work_function: format!("{:.4}", row.work_function),
            work_function_vs_ref: format!("{:.4}", row.work_function_vs_ref),
            fee: format!("{:.5}", row.fee),
        })
        .collect();
    println!("{}", Table::new(&table_rows));
    output::print_separator();

    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(&args.output)?;
    for row in &rows {
        writer.serialize(row)?;
    }
    writer.flush().map_err(|e| EckitError::FileWriteError {
        path: args.output.display().to_string(),
        source: e,
    })?;
    output::print_success(&format!("Wrote table to {}", args.output.display()));

    let capacitance = differential_capacitance(&rows)?;
    output::print_info(&format!(
        "Differential capacitance = {:.5} [e/V]",
        capacitance
    ));

    Ok(())
}
