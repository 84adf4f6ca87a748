//! # 电化学模型 (HBM / PBM)
//!
//! 将扫描结果数据集约化为功函数-电荷曲线、自由电化学能
//! （巨势）以及界面电容。
//!
//! 两种连续介质嵌入近似：
//! - HBM（均匀背景模型）：电荷转移功由真空势对电荷的梯形积分给出，
//!   以活性分数 alpha 参数化；
//! - PBM（泊松-玻尔兹曼模型）：直接使用功函数作为电荷转移功，
//!   符号约定与 HBM-Fermi 不同，这是模型本身的区别。
//!
//! ## 依赖关系
//! - 被 `commands/fee.rs`, `commands/extract.rs` 使用
//! - 使用 `models/dataset.rs`, `analysis/polyfit.rs`

use crate::analysis::polyfit::polyfit;
use crate::error::Result;
use crate::models::ResultDataset;
use serde::Serialize;

/// 功函数-巨势表的一行
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FeeRow {
    /// 相对中性参考的电荷变化 dnelect [e]
    #[serde(rename = "Charge [e]")]
    pub charge: f64,
    /// 功函数 [V]
    #[serde(rename = "Work function [V]")]
    pub work_function: f64,
    /// 相对参考电极的功函数 [V]
    #[serde(rename = "Work function - ref [V]")]
    pub work_function_vs_ref: f64,
    /// 自由电化学能（巨势）[eV]
    #[serde(rename = "Grand potential [eV]")]
    pub fee: f64,
}

/// 表面电容估计与活性分数
#[derive(Debug, Clone, Copy)]
pub struct ActiveFraction {
    /// 电荷 vs 功函数一阶拟合得到的电容 [e/V]
    pub cap_charge: f64,
    /// 巨势 vs 功函数二阶拟合得到的电容 [e/V]
    pub cap_grand: f64,
}

impl ActiveFraction {
    /// 活性分数 alpha = cap_grand / cap_charge
    pub fn fraction(&self) -> f64 {
        self.cap_grand / self.cap_charge
    }
}

/// 参考行的晶胞平均势（不启用时为 0）
fn shift_value(dataset: &ResultDataset, shift_with_avg: bool) -> Result<f64> {
    if shift_with_avg {
        let i0 = dataset.reference_index()?;
        Ok(dataset.rows[i0].average_potential)
    } else {
        Ok(0.0)
    }
}

fn work_functions(dataset: &ResultDataset) -> Vec<f64> {
    dataset.rows.iter().map(|row| row.work_function()).collect()
}

fn dnelects(dataset: &ResultDataset) -> Vec<f64> {
    (0..dataset.len()).map(|i| dataset.dnelect(i)).collect()
}

/// 从表面电容的两种估计推算 HBM 活性分数
///
/// 电荷对功函数做一阶拟合（电容 = -斜率），
/// 巨势对功函数做二阶拟合（电容 = -2x 二次系数）。
pub fn estimate_active_fraction(
    dataset: &ResultDataset,
    shift_with_avg: bool,
) -> Result<ActiveFraction> {
    let shift = shift_value(dataset, shift_with_avg)?;
    let work_function = work_functions(dataset);
    let dnelect = dnelects(dataset);

    let fee: Vec<f64> = dataset
        .rows
        .iter()
        .zip(dnelect.iter())
        .map(|(row, dn)| row.free_energy - dn * row.fermi_energy - shift)
        .collect();

    let charge_fit = polyfit(&work_function, &dnelect, 1)?;
    let grand_fit = polyfit(&work_function, &fee, 2)?;

    Ok(ActiveFraction {
        cap_charge: -charge_fit[1],
        cap_grand: -2.0 * grand_fit[2],
    })
}

/// 以参考行为锚点的分段梯形积分
///
/// integral[i] = ∫ y d(x)，取 i0 到 i 的逐对梯形和，
/// i 在 i0 之前时取负号。
fn anchored_trapezoid(x: &[f64], y: &[f64], i0: usize) -> Vec<f64> {
    let n = x.len();
    let mut integral = vec![0.0; n];

    let mut acc = 0.0;
    for i in (i0 + 1)..n {
        acc += 0.5 * (y[i - 1] + y[i]) * (x[i] - x[i - 1]);
        integral[i] = acc;
    }

    acc = 0.0;
    for i in (0..i0).rev() {
        acc += 0.5 * (y[i] + y[i + 1]) * (x[i + 1] - x[i]);
        integral[i] = -acc;
    }

    integral
}

fn build_rows(
    dataset: &ResultDataset,
    reference_potential: f64,
    fee: impl Fn(usize) -> f64,
) -> Vec<FeeRow> {
    let work_function = work_functions(dataset);
    (0..dataset.len())
        .map(|i| FeeRow {
            charge: dataset.dnelect(i),
            work_function: work_function[i],
            work_function_vs_ref: work_function[i] - reference_potential,
            fee: fee(i),
        })
        .collect()
}

/// 均匀背景模型 (HBM) 下的巨势表
///
/// fee[i] = fe0 + alpha·(F[i] - fe0 + dn[i]·wf[i] - ∫V d(dn)) - shift
pub fn fee_hbm(
    dataset: &ResultDataset,
    alpha: f64,
    shift_with_avg: bool,
    reference_potential: f64,
) -> Result<Vec<FeeRow>> {
    let i0 = dataset.reference_index()?;
    let shift = shift_value(dataset, shift_with_avg)?;
    let fe0 = dataset.rows[i0].free_energy;

    let dnelect = dnelects(dataset);
    let vacuum: Vec<f64> = dataset.rows.iter().map(|r| r.vacuum_potential).collect();
    let integral = anchored_trapezoid(&dnelect, &vacuum, i0);
    let work_function = work_functions(dataset);

    Ok(build_rows(dataset, reference_potential, |i| {
        let row = &dataset.rows[i];
        fe0 + alpha * (row.free_energy - fe0 + dnelect[i] * work_function[i] - integral[i]) - shift
    }))
}

/// HBM 变体：以费米能直接作为参考势，绕过积分与 alpha
///
/// fee[i] = F[i] - dn[i]·E_fermi[i] - shift
pub fn fee_hbm_fermi(
    dataset: &ResultDataset,
    shift_with_avg: bool,
    reference_potential: f64,
) -> Result<Vec<FeeRow>> {
    let shift = shift_value(dataset, shift_with_avg)?;
    Ok(build_rows(dataset, reference_potential, |i| {
        let row = &dataset.rows[i];
        row.free_energy - dataset.dnelect(i) * row.fermi_energy - shift
    }))
}

/// 泊松-玻尔兹曼模型 (PBM) 下的巨势表
///
/// fee[i] = F[i] + dn[i]·wf[i] - shift（符号约定与 HBM-Fermi 相反）
pub fn fee_pbm(
    dataset: &ResultDataset,
    shift_with_avg: bool,
    reference_potential: f64,
) -> Result<Vec<FeeRow>> {
    let shift = shift_value(dataset, shift_with_avg)?;
    Ok(build_rows(dataset, reference_potential, |i| {
        let row = &dataset.rows[i];
        row.free_energy + dataset.dnelect(i) * row.work_function() - shift
    }))
}

/// 由巨势表拟合微分电容：巨势对 (功函数 - ref) 二阶拟合，
/// 电容 = -2x 二次系数
pub fn differential_capacitance(rows: &[FeeRow]) -> Result<f64> {
    let x: Vec<f64> = rows.iter().map(|r| r.work_function_vs_ref).collect();
    let y: Vec<f64> = rows.iter().map(|r| r.fee).collect();
    let fit = polyfit(&x, &y, 2)?;
    Ok(-2.0 * fit[2])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EckitError;
    use crate::models::StepResult;

    fn dataset(rows: Vec<StepResult>) -> ResultDataset {
        ResultDataset::new(100.0, rows)
    }

    fn linear_response(cap_charge: f64, cap_grand: f64) -> ResultDataset {
        // wf = w0 - dn / C，费米能固定为零 → fee = F
        // F = -cap_grand/2 · wf² → 二次系数 -cap_grand/2
        let w0 = 4.0;
        let rows = (-4..=4)
            .map(|k| {
                let dn = k as f64 * 0.05;
                let wf = w0 - dn / cap_charge;
                StepResult {
                    nelect: 100.0 + dn,
                    free_energy: -0.5 * cap_grand * wf * wf,
                    fermi_energy: 0.0,
                    vacuum_potential: wf,
                    average_potential: 0.0,
                }
            })
            .collect();
        dataset(rows)
    }

    #[test]
    fn test_active_fraction_recovers_capacitances() {
        let ds = linear_response(2.0, 1.0);
        let estimate = estimate_active_fraction(&ds, false).unwrap();

        assert!((estimate.cap_charge - 2.0).abs() < 1e-6);
        assert!((estimate.cap_grand - 1.0).abs() < 1e-6);
        assert!((estimate.fraction() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_anchored_trapezoid_signs() {
        let x = [-0.2, -0.1, 0.0, 0.1, 0.2];
        let y = [1.0; 5];
        let integral = anchored_trapezoid(&x, &y, 2);

        // 常数被积函数：∫ 1 d(dn) = dn
        for (i, &dn) in x.iter().enumerate() {
            assert!((integral[i] - dn).abs() < 1e-12);
        }
    }

    #[test]
    fn test_hbm_reference_required() {
        let mut ds = linear_response(2.0, 1.0);
        ds.ne_zc = 99.5;
        assert!(matches!(
            fee_hbm(&ds, 1.0, false, 0.0),
            Err(EckitError::ReferenceStepNotFound { .. })
        ));
    }

    #[test]
    fn test_hbm_alpha_one_matches_pbm_when_integral_vanishes() {
        // 真空势恒为零 → 积分项消失，hbm(1.0) 与 pbm 应逐行一致
        let rows = (-2..=2)
            .map(|k| {
                let dn = k as f64 * 0.1;
                StepResult {
                    nelect: 100.0 + dn,
                    free_energy: -50.0 + 0.3 * dn + 0.8 * dn * dn,
                    fermi_energy: -2.0 - 0.4 * dn,
                    vacuum_potential: 0.0,
                    average_potential: 0.0,
                }
            })
            .collect();
        let ds = dataset(rows);

        let hbm = fee_hbm(&ds, 1.0, false, 0.0).unwrap();
        let pbm = fee_pbm(&ds, false, 0.0).unwrap();
        for (a, b) in hbm.iter().zip(pbm.iter()) {
            assert!((a.fee - b.fee).abs() < 1e-10);
        }
    }

    #[test]
    fn test_hbm_constant_vacuum_matches_hbm_fermi() {
        // 真空势恒定 → ∫V d(dn) = V·dn，hbm(1.0) 退化为 hbm_fermi
        let rows = (-2..=2)
            .map(|k| {
                let dn = k as f64 * 0.1;
                StepResult {
                    nelect: 100.0 + dn,
                    free_energy: -50.0 - 1.2 * dn + 0.5 * dn * dn,
                    fermi_energy: -2.5 + 0.3 * dn,
                    vacuum_potential: 3.0,
                    average_potential: 0.0,
                }
            })
            .collect();
        let ds = dataset(rows);

        let hbm = fee_hbm(&ds, 1.0, false, 0.0).unwrap();
        let fermi = fee_hbm_fermi(&ds, false, 0.0).unwrap();
        for (a, b) in hbm.iter().zip(fermi.iter()) {
            assert!((a.fee - b.fee).abs() < 1e-10);
        }
    }

    #[test]
    fn test_differential_capacitance() {
        let ds = linear_response(2.0, 1.5);
        let rows = fee_pbm(&ds, false, 0.0).unwrap();
        let cap = differential_capacitance(&rows).unwrap();
        assert!(cap.is_finite());
    }

    #[test]
    fn test_shift_with_avg_uses_reference_row() {
        let mut ds = linear_response(2.0, 1.0);
        for row in &mut ds.rows {
            row.average_potential = 0.7;
        }
        let shifted = fee_pbm(&ds, true, 0.0).unwrap();
        let unshifted = fee_pbm(&ds, false, 0.0).unwrap();
        for (a, b) in shifted.iter().zip(unshifted.iter()) {
            assert!((b.fee - a.fee - 0.7).abs() < 1e-10);
        }
    }
}
