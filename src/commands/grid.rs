//! # grid 命令实现
//!
//! 三维网格文件工具：
//! - `average`: 面平均剖面写成 TSV
//! - `integrate`: 按阈值穿越点分区积分电荷
//! - `fukui`: 两个电荷密度的有限差分 Fukui 函数
//!
//! ## 依赖关系
//! - 使用 `cli/grid.rs` 定义的参数
//! - 使用 `models/grid.rs`, `parsers/grid.rs`, `analysis/profile.rs`
//! - 使用 `utils/output.rs`

use crate::analysis::profile::{integrate_regions, planar_average};
use crate::cli::grid::{AverageArgs, FukuiArgs, GridArgs, GridCommands, IntegrateArgs};
use crate::error::{EckitError, Result};
use crate::models::ScalarField;
use crate::parsers::format::scientific;
use crate::parsers::grid::{parse_grid_file, write_grid_file};
use crate::utils::output;

use std::io::{self, Write};

/// 执行 grid 命令
pub fn execute(args: GridArgs) -> Result<()> {
    match args.command {
        GridCommands::Average(args) => execute_average(args),
        GridCommands::Integrate(args) => execute_integrate(args),
        GridCommands::Fukui(args) => execute_fukui(args),
    }
}

fn execute_average(args: AverageArgs) -> Result<()> {
    let field = parse_grid_file(&args.infile)?;
    let profile = planar_average(&field, args.axis)?;

    let n = profile.len();
    let axis_max = field.geometry.lattice[profile.axis][profile.axis];

    let sink: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(std::fs::File::create(path).map_err(|e| {
            EckitError::FileWriteError {
                path: path.display().to_string(),
                source: e,
            }
        })?),
        None => Box::new(io::stdout()),
    };
    let mut writer = csv::WriterBuilder::new().delimiter(b'\t').from_writer(sink);

    writer.write_record(["position [A]", "average", "average / n"])?;
    for (i, &value) in profile.values.iter().enumerate() {
        writer.write_record([
            format!("{:.5}", i as f64 / n as f64 * axis_max),
            scientific(value, 12, 5),
            scientific(value / n as f64, 12, 5),
        ])?;
    }
    writer.flush().map_err(|e| EckitError::FileWriteError {
        path: args
            .output
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<stdout>".to_string()),
        source: e,
    })?;

    if let Some(path) = &args.output {
        output::print_success(&format!("Wrote profile to {}", path.display()));
    }
    Ok(())
}

fn execute_integrate(args: IntegrateArgs) -> Result<()> {
    let field = parse_grid_file(&args.infile)?;
    let profile = planar_average(&field, 2)?;

    let n = profile.len();
    let z_max = field.geometry.lattice[2][2];
    // CHGCAR 存储 n·V，除以平面数得到每平面电荷
    let per_plane: Vec<f64> = profile.values.iter().map(|v| v / n as f64).collect();

    let total: f64 = per_plane.iter().sum();
    println!("Total = {:.3} [e]", total);

    let regions = integrate_regions(&per_plane, args.threshold);
    output::print_info(&format!(
        "Found {} regions (threshold = {:e})",
        regions.len(),
        args.threshold
    ));

    for region in &regions {
        println!(
            "Charge in z ∈ [{:.3},{:.3}) = {:.3} [e]",
            region.begin as f64 / n as f64 * z_max,
            region.end as f64 / n as f64 * z_max,
            region.charge
        );
    }
    Ok(())
}

fn execute_fukui(args: FukuiArgs) -> Result<()> {
    output::print_info(if args.symmetric {
        "Reading ρ(N-ΔN) charge density"
    } else {
        "Reading ρ(N) charge density"
    });
    let reference = parse_grid_file(&args.reference)?;

    output::print_info("Reading ρ(N+ΔN) charge density");
    let perturbed = parse_grid_file(&args.perturbed)?;

    let fukui = ScalarField::finite_difference(&reference, &perturbed, args.delta, args.symmetric)?;

    write_grid_file(&args.output, &fukui)?;
    output::print_success(&format!("Wrote Fukui function to {}", args.output.display()));
    Ok(())
}
