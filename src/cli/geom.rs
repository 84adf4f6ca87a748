//! # geom 子命令 CLI 定义
//!
//! 平板几何工具统一入口，包含多个子命令：
//! - `slab`: 平板几何检查
//! - `vacuum`: 调整真空层厚度
//! - `merge`: 合并两个 POSCAR
//! - `nelect`: 零电荷电子数
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/geom.rs`

use clap::{Args, Subcommand};
use std::path::PathBuf;

/// geom 主命令参数
#[derive(Args, Debug)]
pub struct GeomArgs {
    #[command(subcommand)]
    pub command: GeomCommands,
}

/// geom 子命令
#[derive(Subcommand, Debug)]
pub enum GeomCommands {
    /// Report slab thickness, surface, interslab distance and vacuum fraction
    Slab(SlabArgs),

    /// Rewrite a POSCAR with a new interslab distance
    Vacuum(VacuumArgs),

    /// Merge two POSCAR files, optionally shifting the second one
    Merge(MergeArgs),

    /// Zero-charge electron count from POSCAR and a valence table
    Nelect(NelectArgs),
}

/// slab 子命令参数
#[derive(Args, Debug)]
pub struct SlabArgs {
    /// POSCAR file
    pub infile: PathBuf,
}

/// vacuum 子命令参数
#[derive(Args, Debug)]
pub struct VacuumArgs {
    /// POSCAR file
    pub infile: PathBuf,

    /// Target interslab distance [Å]
    #[arg(short, long, default_value_t = 5.0)]
    pub vacuum: f64,

    /// Output POSCAR (stdout if omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write cartesian coordinates
    #[arg(short = 'C', long)]
    pub cartesian: bool,
}

/// merge 子命令参数
#[derive(Args, Debug)]
pub struct MergeArgs {
    /// Base POSCAR file
    pub infile: PathBuf,

    /// POSCAR file merged into the base one
    pub additional: PathBuf,

    /// Cartesian shift applied to the additional positions, as "x,y,z"
    #[arg(short, long, default_value = "0,0,0")]
    pub shift: String,

    /// Output POSCAR (stdout if omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write cartesian coordinates
    #[arg(short = 'C', long)]
    pub cartesian: bool,
}

/// nelect 子命令参数
#[derive(Args, Debug)]
pub struct NelectArgs {
    /// POSCAR file
    pub infile: PathBuf,

    /// TOML valence table mapping species to ZVAL (e.g. `Cu = 11.0`)
    #[arg(short = 'z', long)]
    pub valence: PathBuf,
}
