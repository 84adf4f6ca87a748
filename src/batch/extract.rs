//! # 单步数据提取与批量聚合
//!
//! 从一个定电荷计算目录 (OUTCAR + CHGCAR + LOCPOT) 提取五个标量：
//! NELECT、自由能、费米能、真空势、晶胞平均势；
//! 再通过 rayon 线程池对整个扫描序列并行聚合。
//!
//! 提取失败的步骤被记录并跳过，不会中断聚合。
//!
//! ## 依赖关系
//! - 被 `commands/extract.rs` 调用
//! - 使用 `parsers/`, `analysis/profile.rs`
//! - 使用 `rayon` 并行、`utils/progress.rs` 进度条

use crate::analysis::profile::{find_vacuum_region, planar_average, PlanarProfile};
use crate::error::{EckitError, Result};
use crate::models::{ScalarField, StepResult, SweepParameters};
use crate::parsers::format::scientific;
use crate::parsers::grid::parse_grid_file;
use crate::parsers::outcar::parse_outcar;
use crate::utils::progress;

use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// 真空平台检测阈值 [e·Å³]
pub const VACUUM_THRESHOLD: f64 = 1e-3;

/// 面平均电荷密度剖面文件名（每步计算目录内）
pub const CHARGE_PROFILE_FILE: &str = "charge_density_profile.tsv";

/// 面平均局域势剖面文件名（每步计算目录内）
pub const POTENTIAL_PROFILE_FILE: &str = "local_potential_profile.tsv";

/// 一个成功提取的步骤
#[derive(Debug, Clone)]
pub struct ExtractedStep {
    /// 计算目录
    pub directory: String,
    /// 提取出的标量
    pub result: StepResult,
}

/// 聚合报告：按扫描顺序的成功步骤与失败详情
#[derive(Debug, Default)]
pub struct ExtractionReport {
    pub steps: Vec<ExtractedStep>,
    /// (目录, 错误信息)
    pub failures: Vec<(String, String)>,
}

fn required_file(directory: &Path, name: &str) -> Result<PathBuf> {
    let path = directory.join(name);
    if !path.is_file() {
        return Err(EckitError::MissingOutput {
            path: path.display().to_string(),
        });
    }
    Ok(path)
}

/// 从单个计算目录提取一行结果
///
/// 真空势取 LOCPOT 面平均剖面在真空平台中心处的值，
/// 真空平台由 CHGCAR 面平均剖面的最小值邻域确定。
pub fn extract_step(directory: &Path, write_profiles: bool) -> Result<StepResult> {
    let outcar = required_file(directory, "OUTCAR")?;
    let chgcar = required_file(directory, "CHGCAR")?;
    let locpot = required_file(directory, "LOCPOT")?;

    let energetics = parse_outcar(&outcar)?;

    let charge = parse_grid_file(&chgcar)?;
    let charge_profile = planar_average(&charge, 2)?;
    let vacuum = find_vacuum_region(&charge_profile.values, VACUUM_THRESHOLD)?;

    let potential = parse_grid_file(&locpot)?;
    let potential_profile = planar_average(&potential, 2)?;
    if potential_profile.len() != charge_profile.len() {
        return Err(EckitError::ShapeMismatch {
            left: format!("CHGCAR nz = {}", charge_profile.len()),
            right: format!("LOCPOT nz = {}", potential_profile.len()),
        });
    }

    let vacuum_potential = potential_profile.values[vacuum.center_index];
    let average_potential = potential_profile.mean();

    if write_profiles {
        write_profile_files(directory, &charge, &charge_profile, &potential_profile)?;
    }

    Ok(StepResult {
        nelect: energetics.nelect,
        free_energy: energetics.free_energy,
        fermi_energy: energetics.fermi_energy,
        vacuum_potential,
        average_potential,
    })
}

/// 写出每步的面平均剖面 (tab 分隔)
fn write_profile_files(
    directory: &Path,
    charge: &ScalarField,
    charge_profile: &PlanarProfile,
    potential_profile: &PlanarProfile,
) -> Result<()> {
    let nz = charge_profile.len();
    let z_max = charge.geometry.lattice[2][2];
    let z_of = |i: usize| i as f64 / nz as f64 * z_max;

    let charge_path = directory.join(CHARGE_PROFILE_FILE);
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(&charge_path)?;
    writer.write_record(["z [A]", "n.V [e A^3]", "charge [e]", "cumulative [e]"])?;
    let mut cumulative = 0.0;
    for (i, &value) in charge_profile.values.iter().enumerate() {
        cumulative += value;
        writer.write_record([
            format!("{:.5}", z_of(i)),
            scientific(value, 12, 5),
            scientific(value / nz as f64, 12, 5),
            scientific(cumulative / nz as f64, 12, 5),
        ])?;
    }
    writer.flush().map_err(|e| EckitError::FileWriteError {
        path: charge_path.display().to_string(),
        source: e,
    })?;

    let potential_path = directory.join(POTENTIAL_PROFILE_FILE);
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(&potential_path)?;
    writer.write_record(["z [A]", "potential [eV]"])?;
    for (i, &value) in potential_profile.values.iter().enumerate() {
        writer.write_record([format!("{:.5}", z_of(i)), format!("{:.5}", value)])?;
    }
    writer.flush().map_err(|e| EckitError::FileWriteError {
        path: potential_path.display().to_string(),
        source: e,
    })
}

/// 并行聚合整个扫描序列
///
/// `jobs == 0` 表示使用所有可用 CPU。失败的步骤进入
/// `failures`，成功步骤保持扫描顺序。
pub fn aggregate(
    params: &SweepParameters,
    base: &Path,
    jobs: usize,
    write_profiles: bool,
) -> ExtractionReport {
    let directories = params.directories(base);
    let pb = progress::create_progress_bar(directories.len() as u64, "Extracting");

    let jobs = if jobs == 0 { num_cpus::get() } else { jobs };
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build()
        .unwrap();

    // par_iter + collect 保持输入顺序，聚合结果与扫描序列一致
    let outcomes: Vec<(String, Result<StepResult>)> = pool.install(|| {
        directories
            .par_iter()
            .map(|dir| {
                let name = dir.display().to_string();
                let result = if dir.is_dir() {
                    extract_step(dir, write_profiles)
                } else {
                    Err(EckitError::DirectoryNotFound { path: name.clone() })
                };
                pb.inc(1);
                (name, result)
            })
            .collect()
    });

    pb.finish_and_clear();

    let mut report = ExtractionReport::default();
    for (name, outcome) in outcomes {
        match outcome {
            Ok(result) => report.steps.push(ExtractedStep {
                directory: name,
                result,
            }),
            Err(e) => report.failures.push((name, e.to_string())),
        }
    }
    report
}
