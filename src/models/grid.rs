//! # 三维标量场网格
//!
//! 表示定义在周期性晶格上的三维标量场（电荷密度、静电势等），
//! 内存中按 `[x][y][z]` 索引（z 变化最快的扁平数组）。
//!
//! ## 依赖关系
//! - 被 `parsers/grid.rs`, `analysis/` 使用
//! - 使用 `models/geometry.rs`

use crate::error::{EckitError, Result};
use crate::models::Geometry;

/// 绑定到几何的三维标量场
#[derive(Debug, Clone)]
pub struct ScalarField {
    /// 所属晶格几何
    pub geometry: Geometry,
    /// 网格尺寸 (nx, ny, nz)
    pub shape: [usize; 3],
    /// 扁平数据，索引 (x·ny + y)·nz + z
    values: Vec<f64>,
}

impl ScalarField {
    /// 创建标量场，校验网格尺寸与数据量
    pub fn new(geometry: Geometry, shape: [usize; 3], values: Vec<f64>) -> Result<Self> {
        if shape.iter().any(|&n| n == 0) {
            return Err(EckitError::InvalidArgument(format!(
                "grid dimensions must be positive, got {}x{}x{}",
                shape[0], shape[1], shape[2]
            )));
        }
        let expected = shape[0] * shape[1] * shape[2];
        if values.len() != expected {
            return Err(EckitError::InvalidArgument(format!(
                "grid {}x{}x{} expects {} values, got {}",
                shape[0],
                shape[1],
                shape[2],
                expected,
                values.len()
            )));
        }

        Ok(ScalarField {
            geometry,
            shape,
            values,
        })
    }

    /// 扁平索引
    #[inline]
    pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
        (x * self.shape[1] + y) * self.shape[2] + z
    }

    /// 按 (x, y, z) 取值
    #[inline]
    pub fn at(&self, x: usize, y: usize, z: usize) -> f64 {
        self.values[self.index(x, y, z)]
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn value_count(&self) -> usize {
        self.values.len()
    }

    fn shape_label(&self) -> String {
        format!("{}x{}x{}", self.shape[0], self.shape[1], self.shape[2])
    }

    /// 网格形状与晶格是否兼容（算术运算的前提）
    pub fn compatible_with(&self, other: &ScalarField) -> bool {
        if self.shape != other.shape {
            return false;
        }
        for i in 0..3 {
            for j in 0..3 {
                if (self.geometry.lattice[i][j] - other.geometry.lattice[i][j]).abs() > 1e-8 {
                    return false;
                }
            }
        }
        true
    }

    /// 两场之差 self - other，形状或晶格不匹配则报错
    pub fn sub(&self, other: &ScalarField) -> Result<ScalarField> {
        if !self.compatible_with(other) {
            return Err(EckitError::ShapeMismatch {
                left: self.shape_label(),
                right: other.shape_label(),
            });
        }

        let values = self
            .values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| a - b)
            .collect();

        ScalarField::new(self.geometry.clone(), self.shape, values)
    }

    /// 数乘
    pub fn scaled(&self, factor: f64) -> ScalarField {
        ScalarField {
            geometry: self.geometry.clone(),
            shape: self.shape,
            values: self.values.iter().map(|v| v * factor).collect(),
        }
    }

    /// 有限差分 Fukui 场：(excess - reference) / (k·delta)
    ///
    /// 对称差分时 reference 为 ρ(N-ΔN)，k = 2；否则为 ρ(N)，k = 1。
    pub fn finite_difference(
        reference: &ScalarField,
        excess: &ScalarField,
        delta: f64,
        symmetric: bool,
    ) -> Result<ScalarField> {
        if delta == 0.0 {
            return Err(EckitError::InvalidArgument(
                "finite difference delta must be non-zero".to_string(),
            ));
        }
        let k = if symmetric { 2.0 } else { 1.0 };
        Ok(excess.sub(reference)?.scaled(1.0 / (k * delta)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_geometry(c: f64) -> Geometry {
        Geometry::new(
            "cell",
            [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, c]],
            vec!["H".to_string()],
            vec![1],
            vec![[0.0; 3]],
            true,
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_value_count_invariant() {
        let g = unit_geometry(1.0);
        assert!(ScalarField::new(g.clone(), [2, 2, 2], vec![0.0; 7]).is_err());
        assert!(ScalarField::new(g.clone(), [2, 0, 2], vec![]).is_err());
        assert!(ScalarField::new(g, [2, 2, 2], vec![0.0; 8]).is_ok());
    }

    #[test]
    fn test_indexing() {
        let g = unit_geometry(1.0);
        let values: Vec<f64> = (0..24).map(|v| v as f64).collect();
        let field = ScalarField::new(g, [2, 3, 4], values).unwrap();

        assert_eq!(field.at(0, 0, 0), 0.0);
        assert_eq!(field.at(0, 0, 3), 3.0);
        assert_eq!(field.at(0, 1, 0), 4.0);
        assert_eq!(field.at(1, 0, 0), 12.0);
    }

    #[test]
    fn test_sub_shape_mismatch() {
        let a = ScalarField::new(unit_geometry(1.0), [2, 2, 2], vec![1.0; 8]).unwrap();
        let b = ScalarField::new(unit_geometry(1.0), [2, 2, 1], vec![1.0; 4]).unwrap();
        assert!(matches!(
            a.sub(&b),
            Err(crate::error::EckitError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_sub_lattice_mismatch() {
        let a = ScalarField::new(unit_geometry(1.0), [2, 2, 2], vec![1.0; 8]).unwrap();
        let b = ScalarField::new(unit_geometry(2.0), [2, 2, 2], vec![1.0; 8]).unwrap();
        assert!(a.sub(&b).is_err());
    }

    #[test]
    fn test_finite_difference() {
        let reference = ScalarField::new(unit_geometry(1.0), [1, 1, 2], vec![1.0, 2.0]).unwrap();
        let excess = ScalarField::new(unit_geometry(1.0), [1, 1, 2], vec![2.0, 4.0]).unwrap();

        let fukui = ScalarField::finite_difference(&reference, &excess, 0.5, false).unwrap();
        assert!((fukui.values()[0] - 2.0).abs() < 1e-12);
        assert!((fukui.values()[1] - 4.0).abs() < 1e-12);

        let symmetric = ScalarField::finite_difference(&reference, &excess, 0.5, true).unwrap();
        assert!((symmetric.values()[0] - 1.0).abs() < 1e-12);
    }
}
