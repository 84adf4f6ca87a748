//! # VASP OUTCAR 能量解析器
//!
//! 从 OUTCAR 中提取每步计算所需的三个标量：
//! 电子数 (NELECT)、总自由能 (energy(sigma->0)) 与费米能 (E-fermi)。
//! 多次电子步时取最后一次出现的值。
//!
//! ## 依赖关系
//! - 被 `batch/extract.rs`, `commands/` 使用
//! - 使用 `error.rs`

use crate::error::{EckitError, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// 单次计算的能量标量
#[derive(Debug, Clone, Copy)]
pub struct Energetics {
    /// 电子数
    pub nelect: f64,
    /// 总自由能 [eV]，取 energy(sigma->0)
    pub free_energy: f64,
    /// 费米能 [eV]
    pub fermi_energy: f64,
}

/// 解析 OUTCAR 文件
pub fn parse_outcar(path: &Path) -> Result<Energetics> {
    let file = File::open(path).map_err(|e| EckitError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    let reader = BufReader::new(file);

    let mut nelect: Option<f64> = None;
    let mut free_energy: Option<f64> = None;
    let mut fermi_energy: Option<f64> = None;

    for line in reader.lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => continue,
        };

        // "   NELECT =      230.0000000    total number of electrons"
        if line.contains("NELECT") {
            if let Some(val) = extract_number_after(&line, "NELECT") {
                nelect = Some(val);
            }
        }

        // " E-fermi :  -2.7657     XC(G=0): ..."
        if line.contains("E-fermi") {
            if let Some(val) = extract_number_after(&line, ":") {
                fermi_energy = Some(val);
            }
        }

        // "  energy  without entropy=   -123.4  energy(sigma->0) =   -123.5"
        if line.contains("energy(sigma->0)") {
            if let Some(pos) = line.find("energy(sigma->0)") {
                if let Some(val) = extract_number_after(&line[pos..], "=") {
                    free_energy = Some(val);
                }
            }
        }
    }

    let missing = |field: &str| EckitError::ParseError {
        format: "outcar".to_string(),
        path: path.display().to_string(),
        reason: format!("no '{}' entry found", field),
    };

    Ok(Energetics {
        nelect: nelect.ok_or_else(|| missing("NELECT"))?,
        free_energy: free_energy.ok_or_else(|| missing("energy(sigma->0)"))?,
        fermi_energy: fermi_energy.ok_or_else(|| missing("E-fermi"))?,
    })
}

/// 从字符串中提取指定标记之后的第一个数字
fn extract_number_after(s: &str, marker: &str) -> Option<f64> {
    let pos = s.find(marker)?;
    let after = &s[pos + marker.len()..];
    let token = after.trim_start().trim_start_matches('=');
    token.split_whitespace().next()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const OUTCAR_SNIPPET: &str = "\
 Dimension of arrays:
   NELECT =      230.0000000    total number of electrons
 first electronic step
  energy  without entropy=     -100.10000000  energy(sigma->0) =     -100.20000000
 E-fermi :  -2.1000     XC(G=0):  -8.0000     alpha+bet : -5.0000
 last electronic step
  energy  without entropy=     -101.10000000  energy(sigma->0) =     -101.23456789
 E-fermi :  -2.7657     XC(G=0):  -8.1234     alpha+bet : -5.1234
";

    #[test]
    fn test_parse_outcar_last_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(OUTCAR_SNIPPET.as_bytes()).unwrap();

        let energetics = parse_outcar(file.path()).unwrap();
        assert!((energetics.nelect - 230.0).abs() < 1e-9);
        assert!((energetics.free_energy + 101.23456789).abs() < 1e-9);
        assert!((energetics.fermi_energy + 2.7657).abs() < 1e-9);
    }

    #[test]
    fn test_parse_outcar_missing_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"no relevant content\n").unwrap();
        assert!(parse_outcar(file.path()).is_err());
    }

    #[test]
    fn test_extract_number_after() {
        assert_eq!(
            extract_number_after("   NELECT =      230.0000000    total", "NELECT"),
            Some(230.0)
        );
        assert_eq!(extract_number_after(" E-fermi :  -2.7657 rest", ":"), Some(-2.7657));
        assert_eq!(extract_number_after("nothing here", "NELECT"), None);
    }
}
