//! # geom 命令实现
//!
//! 平板几何工具：
//! - `slab`: 打印平板厚度、表面积、板间距与真空占比
//! - `vacuum`: 重设板间距并写出新的 POSCAR
//! - `merge`: 合并两个 POSCAR（第二个可整体平移）
//! - `nelect`: 由 POSCAR 与价电子表计算零电荷电子数
//!
//! ## 依赖关系
//! - 使用 `cli/geom.rs` 定义的参数
//! - 使用 `models/geometry.rs`, `parsers/poscar.rs`
//! - 使用 `utils/output.rs`

use crate::cli::geom::{GeomArgs, GeomCommands, MergeArgs, NelectArgs, SlabArgs, VacuumArgs};
use crate::error::{EckitError, Result};
use crate::models::Geometry;
use crate::parsers::poscar::{parse_poscar_file, to_poscar_string, write_poscar_file};
use crate::utils::output;

use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// 执行 geom 命令
pub fn execute(args: GeomArgs) -> Result<()> {
    match args.command {
        GeomCommands::Slab(args) => execute_slab(args),
        GeomCommands::Vacuum(args) => execute_vacuum(args),
        GeomCommands::Merge(args) => execute_merge(args),
        GeomCommands::Nelect(args) => execute_nelect(args),
    }
}

fn execute_slab(args: SlabArgs) -> Result<()> {
    let geometry = parse_poscar_file(&args.infile)?;

    // 板间距与真空占比的公式假定 c 轴沿 z
    if geometry.lattice[2][0].abs() > 1e-8 || geometry.lattice[2][1].abs() > 1e-8 {
        output::print_warning(
            "C lattice vector and Z axis do not match, this might affect the results!",
        );
    }

    println!("Slab thickness: {:.4} Å", geometry.slab_thickness());
    println!("Slab surface: {:.4} Å²", geometry.slab_surface());
    println!("Interslab distance: {:.4} Å", geometry.interslab_distance());
    println!("Vacuum fraction: {:.4}", geometry.vacuum_fraction());
    Ok(())
}

fn execute_vacuum(args: VacuumArgs) -> Result<()> {
    let geometry = parse_poscar_file(&args.infile)?;
    let adjusted = geometry.with_interslab_distance(args.vacuum)?;
    emit_geometry(&adjusted, args.output.as_deref(), !args.cartesian)
}

fn execute_merge(args: MergeArgs) -> Result<()> {
    let base = parse_poscar_file(&args.infile)?;
    let additional = parse_poscar_file(&args.additional)?;
    let shift = parse_shift(&args.shift)?;
    let merged = base.merge_with(&additional, shift)?;
    emit_geometry(&merged, args.output.as_deref(), !args.cartesian)
}

fn execute_nelect(args: NelectArgs) -> Result<()> {
    let geometry = parse_poscar_file(&args.infile)?;
    let valence = read_valence_table(&args.valence)?;
    let count = geometry.electron_count(&valence)?;
    println!("{}", count);
    Ok(())
}

/// 解析 "x,y,z" 形式的平移向量
fn parse_shift(text: &str) -> Result<[f64; 3]> {
    let parts: Vec<&str> = text.split(',').map(|p| p.trim()).collect();
    if parts.len() != 3 {
        return Err(EckitError::InvalidArgument(format!(
            "shift must be three comma-separated numbers, got '{}'",
            text
        )));
    }
    let mut shift = [0.0; 3];
    for (slot, part) in shift.iter_mut().zip(parts.iter()) {
        *slot = part.parse().map_err(|_| {
            EckitError::InvalidArgument(format!("invalid shift component '{}'", part))
        })?;
    }
    Ok(shift)
}

/// 读取 `symbol = zval` 形式的 TOML 价电子表
fn read_valence_table(path: &Path) -> Result<HashMap<String, f64>> {
    let content = fs::read_to_string(path).map_err(|e| EckitError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    toml::from_str(&content).map_err(|e| EckitError::ParseError {
        format: "valence table".to_string(),
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// 写出几何：有输出路径写文件，否则打印到 stdout
fn emit_geometry(geometry: &Geometry, output: Option<&Path>, direct: bool) -> Result<()> {
    match output {
        Some(path) => {
            write_poscar_file(path, geometry, direct)?;
            output::print_success(&format!("Wrote {}", path.display()));
            Ok(())
        }
        None => {
            print!("{}", to_poscar_string(geometry, direct)?);
            Ok(())
        }
    }
}
