//! # 电荷扫描参数与步骤序列
//!
//! 将紧凑的电荷扫描配置展开为有序、去重的目标电子数序列，
//! 并给出每个步骤对应的计算目录名。
//!
//! ## 依赖关系
//! - 被 `batch/extract.rs`, `commands/` 使用
//! - 使用 `toml` + `serde` 读取 `ec_interface.toml`

use crate::error::{EckitError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// 配置文件名
pub const SWEEP_FILE_NAME: &str = "ec_interface.toml";

fn default_prefix() -> String {
    "EC".to_string()
}

/// 电荷扫描参数
///
/// 构建后不可变，仅用于派生步骤序列与目录名。
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SweepParameters {
    /// 零电荷（中性参考）体系的电子数
    pub ne_zc: f64,
    /// 在中性参考之上探测的附加电子数
    pub ne_added: f64,
    /// 在中性参考之下探测的电子数
    pub ne_removed: f64,
    /// 步长
    pub step: f64,
    /// 目录名前缀
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// 显式附加的目标电子数（加载时排序去重）
    #[serde(default)]
    pub additional: Vec<f64>,
}

impl SweepParameters {
    /// 从 TOML 内容加载并校验
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut params: SweepParameters = toml::from_str(content)
            .map_err(|e| EckitError::InvalidArgument(format!("invalid sweep parameters: {}", e)))?;
        params.validate()?;

        params
            .additional
            .sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        params.additional.dedup();

        Ok(params)
    }

    /// 从目录中的 `ec_interface.toml` 加载
    pub fn from_directory(directory: &Path) -> Result<Self> {
        let path = directory.join(SWEEP_FILE_NAME);
        if !path.exists() {
            return Err(EckitError::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(&path).map_err(|e| EckitError::FileReadError {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_toml_str(&content)
    }

    fn validate(&self) -> Result<()> {
        if self.ne_zc <= 0.0 {
            return Err(EckitError::InvalidArgument(
                "ne_zc must be strictly positive".to_string(),
            ));
        }
        if self.step <= 0.0 {
            return Err(EckitError::InvalidArgument(
                "step must be strictly positive".to_string(),
            ));
        }
        if self.ne_added < 0.0 || self.ne_removed < 0.0 {
            return Err(EckitError::InvalidArgument(
                "ne_added and ne_removed must be non-negative".to_string(),
            ));
        }
        Ok(())
    }

    /// 展开目标电子数序列
    ///
    /// 规则序列为 `ne_zc - ne_removed + k·step`（k·step 不超过
    /// ne_removed + ne_added）。`additional` 中的值按升序插入；
    /// 与某个规则值精确相等（浮点 `==`）的附加值被丢弃。
    pub fn steps(&self) -> Vec<f64> {
        let span = self.ne_removed + self.ne_added;
        let start = self.ne_zc - self.ne_removed;

        // additional 字段公开可写，这里重新排序去重以保证序列升序
        let mut sorted = self.additional.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        sorted.dedup();

        let mut sequence = Vec::new();
        let mut extras = sorted.into_iter().peekable();

        let mut k = 0u32;
        while k as f64 * self.step <= span {
            let regular = start + k as f64 * self.step;

            while let Some(&extra) = extras.peek() {
                if extra < regular {
                    sequence.push(extra);
                    extras.next();
                } else if extra == regular {
                    // 规则值胜出
                    extras.next();
                } else {
                    break;
                }
            }

            sequence.push(regular);
            k += 1;
        }

        sequence.extend(extras);
        sequence
    }

    /// 目标电子数对应的计算目录名：`{prefix}_{value:.3}`
    ///
    /// 注意：两个目标值舍入到同一三位小数时会冲突，
    /// 实际使用中步长须大于 0.001。
    pub fn directory_name(&self, value: f64) -> String {
        format!("{}_{:.3}", self.prefix, value)
    }

    /// 全部步骤的计算目录路径
    pub fn directories(&self, base: &Path) -> Vec<PathBuf> {
        self.steps()
            .iter()
            .map(|&value| base.join(self.directory_name(value)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(additional: Vec<f64>) -> SweepParameters {
        SweepParameters {
            ne_zc: 1.0,
            ne_added: 0.2,
            ne_removed: 0.2,
            step: 0.1,
            prefix: "EC".to_string(),
            additional,
        }
    }

    fn assert_sequence(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len(), "{:?} vs {:?}", actual, expected);
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-9, "{:?} vs {:?}", actual, expected);
        }
    }

    #[test]
    fn test_steps_no_extras() {
        let steps = params(vec![]).steps();
        // floor(0.4 / 0.1) + 1 = 5
        assert_eq!(steps.len(), 5);
        assert!((steps[0] - 0.8).abs() < 1e-12);
        for pair in steps.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn test_steps_with_extras() {
        let steps = params(vec![1.05, 0.85]).steps();
        assert_sequence(&steps, &[0.8, 0.85, 0.9, 1.0, 1.05, 1.1, 1.2]);
    }

    #[test]
    fn test_duplicate_extras_collapse() {
        let p = SweepParameters::from_toml_str(
            "ne_zc = 1.0\nne_added = 0.2\nne_removed = 0.2\nstep = 0.1\nadditional = [0.85, 0.85]\n",
        )
        .unwrap();
        assert_sequence(&p.steps(), &[0.8, 0.85, 0.9, 1.0, 1.1, 1.2]);
    }

    #[test]
    fn test_unsorted_duplicate_extras_normalized() {
        // 不经 from_toml_str 直接构造时 additional 可能乱序含重复
        let steps = params(vec![1.15, 0.85, 1.15]).steps();
        assert_sequence(&steps, &[0.8, 0.85, 0.9, 1.0, 1.1, 1.15, 1.2]);
        for pair in steps.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn test_extra_equal_to_regular_dropped() {
        // 0.8 与规则序列首项精确相等，被丢弃
        let steps = params(vec![1.0 - 0.2]).steps();
        assert_eq!(steps.len(), 5);
    }

    #[test]
    fn test_extras_beyond_range_appended() {
        let steps = params(vec![0.5, 1.5]).steps();
        assert_sequence(&steps, &[0.5, 0.8, 0.9, 1.0, 1.1, 1.2, 1.5]);
    }

    #[test]
    fn test_directory_name() {
        let p = params(vec![]);
        assert_eq!(p.directory_name(0.8), "EC_0.800");
        assert_eq!(p.directory_name(1.05), "EC_1.050");
        assert_eq!(p.directory_name(230.0), "EC_230.000");
    }

    #[test]
    fn test_from_toml_defaults() {
        let p = SweepParameters::from_toml_str(
            "ne_zc = 230.0\nne_added = 1.0\nne_removed = 1.0\nstep = 0.25\n",
        )
        .unwrap();
        assert_eq!(p.prefix, "EC");
        assert!(p.additional.is_empty());
        assert_eq!(p.steps().len(), 9);
    }

    #[test]
    fn test_validation() {
        assert!(SweepParameters::from_toml_str(
            "ne_zc = 0.0\nne_added = 1.0\nne_removed = 1.0\nstep = 0.25\n"
        )
        .is_err());
        assert!(SweepParameters::from_toml_str(
            "ne_zc = 1.0\nne_added = 1.0\nne_removed = 1.0\nstep = 0.0\n"
        )
        .is_err());
        assert!(SweepParameters::from_toml_str(
            "ne_zc = 1.0\nne_added = -1.0\nne_removed = 1.0\nstep = 0.5\n"
        )
        .is_err());
    }
}
