//! # 平面平均与真空区域检测
//!
//! 将三维标量场沿某一轴约化为一维剖面（对另外两轴取平均），
//! 并在剖面中定位真空平台及其中心，用于读取参考静电势。
//!
//! ## 依赖关系
//! - 被 `batch/extract.rs`, `commands/grid.rs` 使用
//! - 使用 `models/grid.rs`

use crate::error::{EckitError, Result};
use crate::models::ScalarField;

/// 一维平面平均剖面（概念上随晶格周期回绕）
#[derive(Debug, Clone)]
pub struct PlanarProfile {
    /// 约化轴 (0 = x, 1 = y, 2 = z)
    pub axis: usize,
    /// 每个网格平面一个平均值
    pub values: Vec<f64>,
}

impl PlanarProfile {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 剖面的全剖面平均值
    pub fn mean(&self) -> f64 {
        self.values.iter().sum::<f64>() / self.values.len() as f64
    }
}

/// 检测到的真空平台
///
/// `min_index`/`max_index` 是未归一化的扩张边界（可越过周期边界，
/// 因此可为负或超过剖面长度）；`center_index` 已归一化到 [0, len)。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VacuumRegion {
    pub min_index: i64,
    pub center_index: usize,
    pub max_index: i64,
}

/// 沿 `axis` 对另外两轴取平均，得到长度为该轴网格数的剖面
pub fn planar_average(field: &ScalarField, axis: usize) -> Result<PlanarProfile> {
    if axis > 2 {
        return Err(EckitError::InvalidArgument(format!(
            "axis must be 0, 1 or 2, got {}",
            axis
        )));
    }

    let [nx, ny, nz] = field.shape;
    let plane_count = field.shape[axis];
    let plane_size = (nx * ny * nz / plane_count) as f64;

    let mut sums = vec![0.0; plane_count];
    for x in 0..nx {
        for y in 0..ny {
            for z in 0..nz {
                let plane = match axis {
                    0 => x,
                    1 => y,
                    _ => z,
                };
                sums[plane] += field.at(x, y, z);
            }
        }
    }

    for sum in &mut sums {
        *sum /= plane_size;
    }

    Ok(PlanarProfile { axis, values: sums })
}

/// 周期性索引回绕到 [0, n)
#[inline]
fn wrap(index: i64, n: usize) -> usize {
    index.rem_euclid(n as i64) as usize
}

/// 在剖面中定位真空平台
///
/// 从剖面最小值处向两侧扩张，只要回绕后的值与最小值之差仍在
/// `threshold` 之内就继续。每个方向的扩张以一个完整周期为上限，
/// 超过则判定为没有真空区域（平坦场）。
pub fn find_vacuum_region(profile: &[f64], threshold: f64) -> Result<VacuumRegion> {
    let n = profile.len();
    if n == 0 {
        return Err(EckitError::InvalidArgument(
            "cannot search an empty profile".to_string(),
        ));
    }

    let minimum_index = profile
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i as i64)
        .unwrap_or(0);
    let minimum_value = profile[minimum_index as usize];

    let mut max_index = minimum_index;
    while (profile[wrap(max_index, n)] - minimum_value).abs() < threshold {
        max_index += 1;
        if max_index - minimum_index > n as i64 {
            return Err(EckitError::NoVacuumFound { threshold });
        }
    }

    let mut min_index = minimum_index;
    while (profile[wrap(min_index, n)] - minimum_value).abs() < threshold {
        min_index -= 1;
        if minimum_index - min_index > n as i64 {
            return Err(EckitError::NoVacuumFound { threshold });
        }
    }

    let mut center = ((min_index + max_index) as f64 / 2.0).round() as i64;
    if center < 0 {
        center += n as i64;
    } else if center >= n as i64 {
        center -= n as i64;
    }

    Ok(VacuumRegion {
        min_index,
        center_index: center as usize,
        max_index,
    })
}

/// 以阈值穿越点分割剖面的积分区域
#[derive(Debug, Clone, Copy)]
pub struct ChargeRegion {
    /// 起始平面索引（含）
    pub begin: usize,
    /// 结束平面索引（不含）
    pub end: usize,
    /// 区域内累计电荷
    pub charge: f64,
}

/// 按阈值穿越点将剖面分段并逐段求和
///
/// `profile` 应已归一化为每平面电荷（即平面平均值除以平面数）。
pub fn integrate_regions(profile: &[f64], threshold: f64) -> Vec<ChargeRegion> {
    let n = profile.len();
    let mut boundaries = vec![0usize];
    for i in 1..n {
        let rising = profile[i - 1] < threshold && threshold < profile[i];
        let falling = profile[i - 1] > threshold && threshold > profile[i];
        if rising || falling {
            boundaries.push(i);
        }
    }
    boundaries.push(n);

    boundaries
        .windows(2)
        .map(|pair| ChargeRegion {
            begin: pair[0],
            end: pair[1],
            charge: profile[pair[0]..pair[1]].iter().sum(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Geometry;

    fn field(shape: [usize; 3], values: Vec<f64>) -> ScalarField {
        let geometry = Geometry::new(
            "cell",
            [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            vec!["H".to_string()],
            vec![1],
            vec![[0.0; 3]],
            true,
            None,
        )
        .unwrap();
        ScalarField::new(geometry, shape, values).unwrap()
    }

    #[test]
    fn test_planar_average_uniform() {
        let uniform = field([3, 4, 5], vec![2.5; 60]);
        for axis in 0..3 {
            let profile = planar_average(&uniform, axis).unwrap();
            assert_eq!(profile.len(), uniform.shape[axis]);
            for v in &profile.values {
                assert!((v - 2.5).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_planar_average_z_gradient() {
        // v(z) = z，沿 z 的剖面应还原梯度
        let mut values = vec![0.0; 2 * 2 * 4];
        for x in 0..2 {
            for y in 0..2 {
                for z in 0..4 {
                    values[(x * 2 + y) * 4 + z] = z as f64;
                }
            }
        }
        let f = field([2, 2, 4], values);

        let profile = planar_average(&f, 2).unwrap();
        for (z, v) in profile.values.iter().enumerate() {
            assert!((v - z as f64).abs() < 1e-12);
        }
    }

    #[test]
    fn test_vacuum_region_centered() {
        // 周期 100，[50, 70) 恰好为零，其余为正
        let profile: Vec<f64> = (0..100)
            .map(|i| if (50..70).contains(&i) { 0.0 } else { 1.0 })
            .collect();

        let region = find_vacuum_region(&profile, 1e-3).unwrap();
        // 扩张停在第一个非真空平面
        assert_eq!(region.min_index, 49);
        assert_eq!(region.max_index, 70);
        assert!((50..70).contains(&region.center_index));
    }

    #[test]
    fn test_vacuum_region_wraps_over_period() {
        // 真空横跨周期边界：[90, 100) 与 [0, 10) 为零
        let profile: Vec<f64> = (0..100)
            .map(|i| if !(10..90).contains(&i) { 0.0 } else { 1.0 })
            .collect();

        let region = find_vacuum_region(&profile, 1e-3).unwrap();
        assert!(region.center_index == 0 || region.center_index >= 90 || region.center_index < 10);
    }

    #[test]
    fn test_vacuum_region_flat_profile_bounded() {
        let flat = vec![0.0; 64];
        assert!(matches!(
            find_vacuum_region(&flat, 1e-3),
            Err(EckitError::NoVacuumFound { .. })
        ));
    }

    #[test]
    fn test_integrate_regions() {
        // 两个电荷包，中间与两端低于阈值
        let mut profile = vec![0.0; 20];
        for i in 3..6 {
            profile[i] = 1.0;
        }
        for i in 12..16 {
            profile[i] = 2.0;
        }

        let regions = integrate_regions(&profile, 0.5);
        let total: f64 = regions.iter().map(|r| r.charge).sum();
        assert!((total - 11.0).abs() < 1e-12);
        assert_eq!(regions.first().unwrap().begin, 0);
        assert_eq!(regions.last().unwrap().end, 20);
        assert!(regions.len() >= 4);
    }
}
