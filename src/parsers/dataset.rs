//! # 结果数据集二进制容器
//!
//! 将 `ResultDataset` 持久化为带格式版本号的小端二进制文件，
//! 读取时拒绝比当前实现更新的版本。
//!
//! ## 布局
//! ```text
//! magic  b"ECRES"      5 bytes
//! version              u16 LE
//! ne_zc                f64 LE
//! row count            u32 LE
//! rows                 count x 5 f64 LE
//!                      (nelect, free energy, fermi energy,
//!                       vacuum potential, average potential)
//! ```
//!
//! ## 依赖关系
//! - 被 `commands/extract.rs`, `commands/fee.rs` 使用
//! - 使用 `models/dataset.rs`

use crate::error::{EckitError, Result};
use crate::models::{ResultDataset, StepResult};
use std::fs;
use std::path::Path;

const MAGIC: &[u8; 5] = b"ECRES";

/// 当前写出的格式版本
pub const FORMAT_VERSION: u16 = 1;

fn parse_error(label: &str, reason: impl Into<String>) -> EckitError {
    EckitError::ParseError {
        format: "dataset".to_string(),
        path: label.to_string(),
        reason: reason.into(),
    }
}

fn take_u16(bytes: &[u8], offset: &mut usize) -> Option<u16> {
    let end = offset.checked_add(2)?;
    let slice = bytes.get(*offset..end)?;
    *offset = end;
    Some(u16::from_le_bytes(slice.try_into().ok()?))
}

fn take_u32(bytes: &[u8], offset: &mut usize) -> Option<u32> {
    let end = offset.checked_add(4)?;
    let slice = bytes.get(*offset..end)?;
    *offset = end;
    Some(u32::from_le_bytes(slice.try_into().ok()?))
}

fn take_f64(bytes: &[u8], offset: &mut usize) -> Option<f64> {
    let end = offset.checked_add(8)?;
    let slice = bytes.get(*offset..end)?;
    *offset = end;
    Some(f64::from_le_bytes(slice.try_into().ok()?))
}

/// 序列化数据集
pub fn to_bytes(dataset: &ResultDataset) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(MAGIC.len() + 2 + 8 + 4 + dataset.len() * 40);
    bytes.extend_from_slice(MAGIC);
    bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    bytes.extend_from_slice(&dataset.ne_zc.to_le_bytes());
    bytes.extend_from_slice(&(dataset.len() as u32).to_le_bytes());

    for row in &dataset.rows {
        bytes.extend_from_slice(&row.nelect.to_le_bytes());
        bytes.extend_from_slice(&row.free_energy.to_le_bytes());
        bytes.extend_from_slice(&row.fermi_energy.to_le_bytes());
        bytes.extend_from_slice(&row.vacuum_potential.to_le_bytes());
        bytes.extend_from_slice(&row.average_potential.to_le_bytes());
    }

    bytes
}

/// 反序列化数据集，版本过新时报 `UnsupportedVersion`
pub fn from_bytes(bytes: &[u8], label: &str) -> Result<ResultDataset> {
    if !bytes.starts_with(MAGIC) {
        return Err(parse_error(label, "missing ECRES magic bytes"));
    }
    let mut offset = MAGIC.len();

    let version = take_u16(bytes, &mut offset)
        .ok_or_else(|| parse_error(label, "truncated version field"))?;
    if version > FORMAT_VERSION {
        return Err(EckitError::UnsupportedVersion {
            found: version,
            supported: FORMAT_VERSION,
        });
    }

    let ne_zc =
        take_f64(bytes, &mut offset).ok_or_else(|| parse_error(label, "truncated ne_zc field"))?;
    let count = take_u32(bytes, &mut offset)
        .ok_or_else(|| parse_error(label, "truncated row count field"))? as usize;

    let mut rows = Vec::with_capacity(count);
    for index in 0..count {
        let mut fields = [0.0; 5];
        for field in &mut fields {
            *field = take_f64(bytes, &mut offset)
                .ok_or_else(|| parse_error(label, format!("truncated row {}", index)))?;
        }
        rows.push(StepResult {
            nelect: fields[0],
            free_energy: fields[1],
            fermi_energy: fields[2],
            vacuum_potential: fields[3],
            average_potential: fields[4],
        });
    }

    Ok(ResultDataset::new(ne_zc, rows))
}

/// 写出数据集文件
pub fn write_dataset_file(path: &Path, dataset: &ResultDataset) -> Result<()> {
    fs::write(path, to_bytes(dataset)).map_err(|e| EckitError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })
}

/// 读取数据集文件
pub fn read_dataset_file(path: &Path) -> Result<ResultDataset> {
    if !path.exists() {
        return Err(EckitError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let bytes = fs::read(path).map_err(|e| EckitError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    from_bytes(&bytes, &path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ResultDataset {
        ResultDataset::new(
            230.0,
            vec![
                StepResult {
                    nelect: 229.75,
                    free_energy: -100.5,
                    fermi_energy: -2.5,
                    vacuum_potential: 3.25,
                    average_potential: 0.125,
                },
                StepResult {
                    nelect: 230.0,
                    free_energy: -101.0,
                    fermi_energy: -2.6,
                    vacuum_potential: 3.5,
                    average_potential: 0.25,
                },
            ],
        )
    }

    #[test]
    fn test_round_trip() {
        let dataset = sample();
        let restored = from_bytes(&to_bytes(&dataset), "test").unwrap();

        assert_eq!(restored.ne_zc, dataset.ne_zc);
        assert_eq!(restored.rows, dataset.rows);
    }

    #[test]
    fn test_newer_version_rejected() {
        let mut bytes = to_bytes(&sample());
        bytes[5..7].copy_from_slice(&(FORMAT_VERSION + 1).to_le_bytes());

        assert!(matches!(
            from_bytes(&bytes, "test"),
            Err(EckitError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn test_bad_magic() {
        assert!(from_bytes(b"NOTECRES", "test").is_err());
    }

    #[test]
    fn test_truncated_rows() {
        let bytes = to_bytes(&sample());
        assert!(from_bytes(&bytes[..bytes.len() - 4], "test").is_err());
    }
}
