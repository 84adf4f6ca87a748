//! # 扫描结果数据集
//!
//! 收集每个电荷步骤提取出的标量五元组，供电化学模型使用。
//!
//! ## 依赖关系
//! - 被 `analysis/electrochem.rs`, `batch/extract.rs`, `parsers/dataset.rs` 使用
//! - 无外部模块依赖

use crate::error::{EckitError, Result};
use serde::{Deserialize, Serialize};

/// 单个电荷步骤的提取结果，创建后不再修改
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    /// 该步骤的电子数 (NELECT)
    #[serde(rename = "NELECT")]
    pub nelect: f64,
    /// 总自由能 [eV]
    #[serde(rename = "Free energy [eV]")]
    pub free_energy: f64,
    /// 费米能 [eV]
    #[serde(rename = "Fermi energy [eV]")]
    pub fermi_energy: f64,
    /// 真空（参考）静电势 [eV]
    #[serde(rename = "Vacuum potential [eV]")]
    pub vacuum_potential: f64,
    /// 晶胞平均静电势 [eV]
    #[serde(rename = "Average potential [eV]")]
    pub average_potential: f64,
}

impl StepResult {
    /// 该步骤的功函数：真空势减费米能
    pub fn work_function(&self) -> f64 {
        self.vacuum_potential - self.fermi_energy
    }
}

/// 扫描结果行的有序集合，附带零电荷参考电子数
#[derive(Debug, Clone)]
pub struct ResultDataset {
    /// 零电荷参考电子数
    pub ne_zc: f64,
    /// 结果行（不要求按电荷排序，顺序保留扫描顺序）
    pub rows: Vec<StepResult>,
}

impl ResultDataset {
    pub fn new(ne_zc: f64, rows: Vec<StepResult>) -> Self {
        ResultDataset { ne_zc, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 第 i 行相对于中性参考的电荷变化
    pub fn dnelect(&self, index: usize) -> f64 {
        self.rows[index].nelect - self.ne_zc
    }

    /// 零电荷参考行的索引（要求 NELECT 与 ne_zc 精确相等）
    ///
    /// 该精确相等契约依赖步骤序列算术的可复现性，见 `SweepParameters::steps`。
    pub fn reference_index(&self) -> Result<usize> {
        self.rows
            .iter()
            .position(|row| row.nelect - self.ne_zc == 0.0)
            .ok_or(EckitError::ReferenceStepNotFound { ne_zc: self.ne_zc })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn row(nelect: f64) -> StepResult {
        StepResult {
            nelect,
            free_energy: -10.0,
            fermi_energy: -2.0,
            vacuum_potential: 3.0,
            average_potential: 0.1,
        }
    }

    #[test]
    fn test_work_function() {
        assert!((row(1.0).work_function() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_reference_index() {
        let ds = ResultDataset::new(1.0, vec![row(0.9), row(1.0), row(1.1)]);
        assert_eq!(ds.reference_index().unwrap(), 1);
        assert!((ds.dnelect(0) + 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_reference_index_missing() {
        let ds = ResultDataset::new(1.0, vec![row(0.9), row(1.0001)]);
        assert!(matches!(
            ds.reference_index(),
            Err(EckitError::ReferenceStepNotFound { .. })
        ));
    }
}
