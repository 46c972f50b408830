//! DraftCAD 命令行工具
//!
//! 对 JSON 图纸做离线处理：查看概要、导出 SVG、规范化。

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use draft_core::shape::Shape;
use draft_core::units::Unit;
use draft_core::document::DocumentStore;
use draft_file::SvgOptions;

#[derive(Parser, Debug)]
#[command(name = "draftcad", about = "DraftCAD drawing tools", version)]
struct Cli {
    /// 输出调试日志
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 打印图形数量和范围
    Info {
        input: PathBuf,
        /// 范围的显示单位（mm / cm / m）
        #[arg(long, default_value = "mm")]
        units: Unit,
    },
    /// 导出为 SVG
    ExportSvg {
        input: PathBuf,
        output: PathBuf,
        /// 包围盒外扩边距
        #[arg(long, default_value_t = 10.0)]
        margin: f64,
        /// 背景色
        #[arg(long)]
        background: Option<String>,
    },
    /// 丢弃无效图形和重复 id 的后出现者，然后重新保存
    Normalize { input: PathBuf, output: PathBuf },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing::subscriber::set_global_default(
        FmtSubscriber::builder().with_max_level(level).finish(),
    )?;

    match cli.command {
        Command::Info { input, units } => run_info(&input, units),
        Command::ExportSvg {
            input,
            output,
            margin,
            background,
        } => {
            let shapes = load(&input)?;
            let options = SvgOptions { margin, background };
            draft_file::save_svg(&shapes, &output, &options)
                .with_context(|| format!("failed to write {}", output.display()))
        }
        Command::Normalize { input, output } => {
            let shapes = load(&input)?;
            let before = shapes.len();
            let shapes = draft_file::native::normalize_shapes(shapes);
            if shapes.len() != before {
                info!("Dropped {} invalid shapes", before - shapes.len());
            }
            draft_file::save(&shapes, &output)
                .with_context(|| format!("failed to write {}", output.display()))
        }
    }
}

fn load(path: &Path) -> Result<Vec<Shape>> {
    draft_file::load(path).with_context(|| format!("failed to read {}", path.display()))
}

fn run_info(path: &Path, units: Unit) -> Result<()> {
    let mut store = DocumentStore::default();
    store.load_shapes(load(path)?);

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for shape in store.shapes() {
        *counts.entry(shape.type_name()).or_default() += 1;
    }

    println!("{}: {} shapes", path.display(), store.len());
    for (kind, count) in &counts {
        println!("  {kind:<12} {count}");
    }

    let bounds = store.bounding_box();
    if !bounds.is_empty() {
        println!(
            "  extent       {} x {}",
            units.format(bounds.width(), 2),
            units.format(bounds.height(), 2)
        );
    }
    Ok(())
}
