//! # 最小二乘多项式拟合
//!
//! 通过正规方程 + 小规模高斯消元实现低阶多项式拟合，
//! 用于电容估计（一阶斜率、二阶曲率）。
//!
//! ## 依赖关系
//! - 被 `analysis/electrochem.rs` 使用
//! - 无外部模块依赖

use crate::error::{EckitError, Result};

/// 拟合 y ≈ Σ c_k·x^k，返回系数 [c0, c1, ..., c_degree]（低次在前）
pub fn polyfit(x: &[f64], y: &[f64], degree: usize) -> Result<Vec<f64>> {
    if x.len() != y.len() {
        return Err(EckitError::InvalidArgument(format!(
            "polyfit needs equal-length inputs, got {} and {}",
            x.len(),
            y.len()
        )));
    }
    let order = degree + 1;
    if x.len() < order {
        return Err(EckitError::InvalidArgument(format!(
            "degree {} fit needs at least {} points, got {}",
            degree,
            order,
            x.len()
        )));
    }

    // 正规方程：A[i][j] = Σ x^(i+j)，b[i] = Σ y·x^i
    let mut power_sums = vec![0.0; 2 * degree + 1];
    let mut rhs = vec![0.0; order];
    for (&xi, &yi) in x.iter().zip(y.iter()) {
        let mut power = 1.0;
        for sum in power_sums.iter_mut() {
            *sum += power;
            power *= xi;
        }
        let mut power = 1.0;
        for value in rhs.iter_mut() {
            *value += yi * power;
            power *= xi;
        }
    }

    let mut matrix = vec![vec![0.0; order]; order];
    for i in 0..order {
        for j in 0..order {
            matrix[i][j] = power_sums[i + j];
        }
    }

    solve(matrix, rhs)
}

/// 高斯消元（部分主元），求解 A·c = b
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Result<Vec<f64>> {
    let n = b.len();

    for column in 0..n {
        let pivot = (column..n)
            .max_by(|&r, &s| {
                a[r][column]
                    .abs()
                    .partial_cmp(&a[s][column].abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or(column);
        if a[pivot][column].abs() < 1e-300 {
            return Err(EckitError::InvalidArgument(
                "polynomial fit is singular (degenerate x values)".to_string(),
            ));
        }
        a.swap(column, pivot);
        b.swap(column, pivot);

        for row in (column + 1)..n {
            let factor = a[row][column] / a[column][column];
            for k in column..n {
                a[row][k] -= factor * a[column][k];
            }
            b[row] -= factor * b[column];
        }
    }

    let mut solution = vec![0.0; n];
    for row in (0..n).rev() {
        let mut value = b[row];
        for k in (row + 1)..n {
            value -= a[row][k] * solution[k];
        }
        solution[row] = value / a[row][row];
    }

    Ok(solution)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_fit() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [1.0, 3.0, 5.0, 7.0];
        let c = polyfit(&x, &y, 1).unwrap();
        assert!((c[0] - 1.0).abs() < 1e-10);
        assert!((c[1] - 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_quadratic_fit() {
        let x: Vec<f64> = (0..7).map(|i| i as f64 * 0.5 - 1.5).collect();
        let y: Vec<f64> = x.iter().map(|v| 2.0 - 0.5 * v + 0.25 * v * v).collect();
        let c = polyfit(&x, &y, 2).unwrap();
        assert!((c[0] - 2.0).abs() < 1e-10);
        assert!((c[1] + 0.5).abs() < 1e-10);
        assert!((c[2] - 0.25).abs() < 1e-10);
    }

    #[test]
    fn test_quadratic_fit_noisy_overdetermined() {
        let x: Vec<f64> = (0..50).map(|i| i as f64 * 0.1).collect();
        let y: Vec<f64> = x
            .iter()
            .enumerate()
            .map(|(i, v)| v * v + if i % 2 == 0 { 1e-6 } else { -1e-6 })
            .collect();
        let c = polyfit(&x, &y, 2).unwrap();
        assert!((c[2] - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_insufficient_points() {
        assert!(polyfit(&[1.0, 2.0], &[1.0, 2.0], 2).is_err());
        assert!(polyfit(&[1.0], &[1.0, 2.0], 0).is_err());
    }
}
