//! # 周期性晶格几何模型
//!
//! 表示一个 VASP 风格的周期性原子结构（slab 几何），
//! 支持分数/笛卡尔坐标互转以及 slab 相关的几何查询。
//!
//! ## 依赖关系
//! - 被 `parsers/poscar.rs`, `models/grid.rs`, `commands/` 使用
//! - 无外部模块依赖

use crate::error::{EckitError, Result};
use std::collections::HashMap;
use std::sync::OnceLock;

/// 周期性晶格几何
///
/// 一旦构建即视为不可变；几何变换（调整真空层、合并）返回新实例。
#[derive(Debug, Clone)]
pub struct Geometry {
    /// 标题行
    pub title: String,
    /// 晶格向量矩阵 (3x3)，行向量表示 a, b, c（已含缩放因子）
    pub lattice: [[f64; 3]; 3],
    /// 离子种类标签（按出现顺序）
    pub ion_types: Vec<String>,
    /// 每种离子的数量，与 `ion_types` 等长
    pub ion_counts: Vec<usize>,
    /// 原子坐标，表示方式由 `direct` 决定
    positions: Vec<[f64; 3]>,
    /// true = 分数坐标 (Direct)，false = 笛卡尔坐标
    pub direct: bool,
    /// 可选的 selective dynamics 标志 (N x 3)
    pub selective_dynamics: Option<Vec<[bool; 3]>>,

    cartesian_cache: OnceLock<Vec<[f64; 3]>>,
    direct_cache: OnceLock<Vec<[f64; 3]>>,
}

impl Geometry {
    /// 创建几何，校验离子计数与坐标行数一致
    pub fn new(
        title: impl Into<String>,
        lattice: [[f64; 3]; 3],
        ion_types: Vec<String>,
        ion_counts: Vec<usize>,
        positions: Vec<[f64; 3]>,
        direct: bool,
        selective_dynamics: Option<Vec<[bool; 3]>>,
    ) -> Result<Self> {
        let expected: usize = ion_counts.iter().sum();
        if expected != positions.len() {
            return Err(EckitError::InvalidArgument(format!(
                "ion counts sum to {} but {} positions were given",
                expected,
                positions.len()
            )));
        }
        if ion_types.len() != ion_counts.len() {
            return Err(EckitError::InvalidArgument(format!(
                "{} ion types but {} ion counts",
                ion_types.len(),
                ion_counts.len()
            )));
        }
        if let Some(ref flags) = selective_dynamics {
            if flags.len() != positions.len() {
                return Err(EckitError::InvalidArgument(format!(
                    "{} selective dynamics rows for {} positions",
                    flags.len(),
                    positions.len()
                )));
            }
        }

        Ok(Geometry {
            title: title.into(),
            lattice,
            ion_types,
            ion_counts,
            positions,
            direct,
            selective_dynamics,
            cartesian_cache: OnceLock::new(),
            direct_cache: OnceLock::new(),
        })
    }

    /// 原子总数
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// 按存储表示返回坐标
    pub fn positions(&self) -> &[[f64; 3]] {
        &self.positions
    }

    /// 展开后的逐原子标签列表（每种标签按计数重复）
    pub fn ions(&self) -> Vec<&str> {
        let mut ions = Vec::with_capacity(self.len());
        for (ion_type, &count) in self.ion_types.iter().zip(self.ion_counts.iter()) {
            for _ in 0..count {
                ions.push(ion_type.as_str());
            }
        }
        ions
    }

    /// 笛卡尔坐标表示（按需计算并缓存）
    pub fn cartesian(&self) -> &[[f64; 3]] {
        self.cartesian_cache.get_or_init(|| {
            if self.direct {
                self.positions
                    .iter()
                    .map(|p| row_times_matrix(*p, &self.lattice))
                    .collect()
            } else {
                self.positions.clone()
            }
        })
    }

    /// 分数坐标表示（按需计算并缓存）
    ///
    /// direct = cartesian · lattice⁻¹
    pub fn direct_positions(&self) -> Result<&[[f64; 3]]> {
        if self.direct {
            return Ok(&self.positions);
        }
        if self.direct_cache.get().is_none() {
            let inv = inverse3(&self.lattice).ok_or_else(|| {
                EckitError::InvalidArgument("lattice matrix is singular".to_string())
            })?;
            let converted = self
                .positions
                .iter()
                .map(|p| row_times_matrix(*p, &inv))
                .collect();
            let _ = self.direct_cache.set(converted);
        }
        Ok(self.direct_cache.get().expect("cache was just filled"))
    }

    /// 指定模式下的坐标（direct=true 可能因奇异晶格失败）
    pub fn positions_as(&self, direct: bool) -> Result<Vec<[f64; 3]>> {
        if direct {
            Ok(self.direct_positions()?.to_vec())
        } else {
            Ok(self.cartesian().to_vec())
        }
    }

    // ─────────────────────────────────────────────────────────────
    // slab 几何查询（假定 slab 法向沿第三晶格向量）
    // ─────────────────────────────────────────────────────────────

    fn z_extent(&self) -> (f64, f64) {
        let mut z_min = f64::INFINITY;
        let mut z_max = f64::NEG_INFINITY;
        for p in self.cartesian() {
            z_min = z_min.min(p[2]);
            z_max = z_max.max(p[2]);
        }
        (z_min, z_max)
    }

    /// slab 厚度：max(z) - min(z)（笛卡尔单位）
    pub fn slab_thickness(&self) -> f64 {
        let (z_min, z_max) = self.z_extent();
        z_max - z_min
    }

    /// 相邻周期镜像之间的真空间隙：min(z) + c_z - max(z)
    pub fn interslab_distance(&self) -> f64 {
        let (z_min, z_max) = self.z_extent();
        z_min - z_max + self.lattice[2][2]
    }

    /// slab 表面面积：xy 子晶格 2x2 行列式
    pub fn slab_surface(&self) -> f64 {
        self.lattice[0][0] * self.lattice[1][1] - self.lattice[0][1] * self.lattice[1][0]
    }

    /// 真空区域在 c 轴上所占比例
    pub fn vacuum_fraction(&self) -> f64 {
        self.interslab_distance() / self.lattice[2][2]
    }

    /// 返回新几何：slab 居中、第三晶格向量缩放，使真空间隙等于 `gap`
    ///
    /// slab 厚度与所有非几何属性保持不变。
    pub fn with_interslab_distance(&self, gap: f64) -> Result<Geometry> {
        let z_cart: Vec<f64> = self.cartesian().iter().map(|p| p[2]).collect();
        let z_min = z_cart.iter().cloned().fold(f64::INFINITY, f64::min);
        let slab_size = z_cart
            .iter()
            .map(|z| z - z_min)
            .fold(f64::NEG_INFINITY, f64::max);
        let c_norm = slab_size + gap;

        let mut new_positions = self.positions.clone();
        for (row, z) in new_positions.iter_mut().zip(z_cart.iter()) {
            let recentered = z - z_min + gap / 2.0;
            row[2] = if self.direct {
                recentered / c_norm
            } else {
                recentered
            };
        }

        let mut new_lattice = self.lattice;
        new_lattice[2] = [0.0, 0.0, c_norm];

        Geometry::new(
            self.title.clone(),
            new_lattice,
            self.ion_types.clone(),
            self.ion_counts.clone(),
            new_positions,
            self.direct,
            self.selective_dynamics.clone(),
        )
    }

    /// 合并另一几何的离子（可选笛卡尔平移 `shift`），保留本几何的晶格
    ///
    /// selective dynamics 按行拼接，缺失的一侧默认全部可动 (T T T)。
    pub fn merge_with(&self, other: &Geometry, shift: [f64; 3]) -> Result<Geometry> {
        let mut cartesian: Vec<[f64; 3]> = self.cartesian().to_vec();
        cartesian.extend(other.cartesian().iter().map(|p| {
            [p[0] + shift[0], p[1] + shift[1], p[2] + shift[2]]
        }));

        let positions = if self.direct {
            let inv = inverse3(&self.lattice).ok_or_else(|| {
                EckitError::InvalidArgument("lattice matrix is singular".to_string())
            })?;
            cartesian
                .iter()
                .map(|p| row_times_matrix(*p, &inv))
                .collect()
        } else {
            cartesian
        };

        let mut ion_types = self.ion_types.clone();
        ion_types.extend(other.ion_types.iter().cloned());
        let mut ion_counts = self.ion_counts.clone();
        ion_counts.extend(other.ion_counts.iter().cloned());

        let selective_dynamics =
            if self.selective_dynamics.is_some() || other.selective_dynamics.is_some() {
                let mut flags = self
                    .selective_dynamics
                    .clone()
                    .unwrap_or_else(|| vec![[true; 3]; self.len()]);
                flags.extend(
                    other
                        .selective_dynamics
                        .clone()
                        .unwrap_or_else(|| vec![[true; 3]; other.len()]),
                );
                Some(flags)
            } else {
                None
            };

        Geometry::new(
            self.title.clone(),
            self.lattice,
            ion_types,
            ion_counts,
            positions,
            self.direct,
            selective_dynamics,
        )
    }

    /// 按价电子表求零电荷体系的总电子数
    pub fn electron_count(&self, valence: &HashMap<String, f64>) -> Result<f64> {
        let mut total = 0.0;
        for (ion_type, &count) in self.ion_types.iter().zip(self.ion_counts.iter()) {
            let zval = valence
                .get(ion_type)
                .ok_or_else(|| EckitError::UnknownSpecies {
                    symbol: ion_type.clone(),
                })?;
            total += zval * count as f64;
        }
        Ok(total)
    }
}

// ─────────────────────────────────────────────────────────────
// 3x3 矩阵工具
// ─────────────────────────────────────────────────────────────

/// 行向量乘矩阵：out[j] = Σ_k v[k] · m[k][j]
pub fn row_times_matrix(v: [f64; 3], m: &[[f64; 3]; 3]) -> [f64; 3] {
    [
        v[0] * m[0][0] + v[1] * m[1][0] + v[2] * m[2][0],
        v[0] * m[0][1] + v[1] * m[1][1] + v[2] * m[2][1],
        v[0] * m[0][2] + v[1] * m[1][2] + v[2] * m[2][2],
    ]
}

/// 3x3 行列式
pub fn det3(m: &[[f64; 3]; 3]) -> f64 {
    m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
}

/// 3x3 矩阵求逆，奇异时返回 None
pub fn inverse3(m: &[[f64; 3]; 3]) -> Option<[[f64; 3]; 3]> {
    let det = det3(m);
    if det.abs() < 1e-12 {
        return None;
    }

    Some([
        [
            (m[1][1] * m[2][2] - m[1][2] * m[2][1]) / det,
            (m[0][2] * m[2][1] - m[0][1] * m[2][2]) / det,
            (m[0][1] * m[1][2] - m[0][2] * m[1][1]) / det,
        ],
        [
            (m[1][2] * m[2][0] - m[1][0] * m[2][2]) / det,
            (m[0][0] * m[2][2] - m[0][2] * m[2][0]) / det,
            (m[0][2] * m[1][0] - m[0][0] * m[1][2]) / det,
        ],
        [
            (m[1][0] * m[2][1] - m[1][1] * m[2][0]) / det,
            (m[0][1] * m[2][0] - m[0][0] * m[2][1]) / det,
            (m[0][0] * m[1][1] - m[0][1] * m[1][0]) / det,
        ],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slab() -> Geometry {
        // 4 Å 厚的双层 slab，c = 20 Å
        Geometry::new(
            "slab",
            [[5.0, 0.0, 0.0], [0.0, 5.0, 0.0], [0.0, 0.0, 20.0]],
            vec!["Pt".to_string()],
            vec![2],
            vec![[0.0, 0.0, 0.25], [0.0, 0.0, 0.45]],
            true,
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_invariant_violation() {
        let result = Geometry::new(
            "bad",
            [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            vec!["H".to_string()],
            vec![2],
            vec![[0.0, 0.0, 0.0]],
            true,
            None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_ions_expansion() {
        let g = Geometry::new(
            "NaCl",
            [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            vec!["Na".to_string(), "Cl".to_string()],
            vec![1, 2],
            vec![[0.0; 3], [0.5; 3], [0.25; 3]],
            true,
            None,
        )
        .unwrap();
        assert_eq!(g.ions(), vec!["Na", "Cl", "Cl"]);
    }

    #[test]
    fn test_cartesian_from_direct() {
        let g = slab();
        let cart = g.cartesian();
        assert!((cart[0][2] - 5.0).abs() < 1e-12);
        assert!((cart[1][2] - 9.0).abs() < 1e-12);
    }

    #[test]
    fn test_direct_from_cartesian_round_trip() {
        let g = Geometry::new(
            "skewed",
            [[4.0, 0.0, 0.0], [1.0, 4.0, 0.0], [0.0, 1.0, 10.0]],
            vec!["C".to_string()],
            vec![1],
            vec![[0.2, 0.3, 0.4]],
            true,
            None,
        )
        .unwrap();

        let cart = g.cartesian()[0];
        let g2 = Geometry::new(
            "skewed",
            g.lattice,
            g.ion_types.clone(),
            g.ion_counts.clone(),
            vec![cart],
            false,
            None,
        )
        .unwrap();
        let back = g2.direct_positions().unwrap()[0];

        assert!((back[0] - 0.2).abs() < 1e-12);
        assert!((back[1] - 0.3).abs() < 1e-12);
        assert!((back[2] - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_slab_thickness_and_gap() {
        let g = slab();
        assert!((g.slab_thickness() - 4.0).abs() < 1e-12);
        // min(z) + c_z - max(z) = 5 + 20 - 9
        assert!((g.interslab_distance() - 16.0).abs() < 1e-12);
        assert!((g.vacuum_fraction() - 0.8).abs() < 1e-12);
        assert!((g.slab_surface() - 25.0).abs() < 1e-12);
    }

    #[test]
    fn test_with_interslab_distance() {
        let g = slab();
        let resized = g.with_interslab_distance(10.0).unwrap();

        assert!((resized.slab_thickness() - 4.0).abs() < 1e-12);
        assert!((resized.interslab_distance() - 10.0).abs() < 1e-12);
        assert!((resized.lattice[2][2] - 14.0).abs() < 1e-12);

        // slab 居中：底部原子位于 gap/2
        let z_bottom = resized
            .cartesian()
            .iter()
            .map(|p| p[2])
            .fold(f64::INFINITY, f64::min);
        assert!((z_bottom - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_merge_with_shift() {
        let g = slab();
        let adsorbate = Geometry::new(
            "H",
            g.lattice,
            vec!["H".to_string()],
            vec![1],
            vec![[2.5, 2.5, 10.0]],
            false,
            None,
        )
        .unwrap();

        let merged = g.merge_with(&adsorbate, [0.0, 0.0, 1.0]).unwrap();
        assert_eq!(merged.len(), 3);
        assert_eq!(merged.ion_types, vec!["Pt".to_string(), "H".to_string()]);
        assert!((merged.cartesian()[2][2] - 11.0).abs() < 1e-12);
    }

    #[test]
    fn test_merge_selective_dynamics_defaults() {
        let mut g = slab();
        g.selective_dynamics = Some(vec![[false; 3], [true; 3]]);
        let other = slab();

        let merged = g.merge_with(&other, [0.0; 3]).unwrap();
        let flags = merged.selective_dynamics.unwrap();
        assert_eq!(flags.len(), 4);
        assert_eq!(flags[0], [false; 3]);
        assert_eq!(flags[2], [true; 3]);
    }

    #[test]
    fn test_electron_count() {
        let g = Geometry::new(
            "PtH",
            [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            vec!["Pt".to_string(), "H".to_string()],
            vec![2, 3],
            vec![[0.0; 3]; 5],
            true,
            None,
        )
        .unwrap();

        let mut table = HashMap::new();
        table.insert("Pt".to_string(), 10.0);
        table.insert("H".to_string(), 1.0);
        assert!((g.electron_count(&table).unwrap() - 23.0).abs() < 1e-12);

        table.remove("H");
        assert!(g.electron_count(&table).is_err());
    }

    #[test]
    fn test_inverse3_singular() {
        assert!(inverse3(&[[1.0, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 0.0, 1.0]]).is_none());
    }
}
