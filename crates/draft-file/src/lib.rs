//! DraftCAD 文件格式处理
//!
//! 支持：
//! - JSON 文档（图形数组，保留 id）
//! - SVG 导出

pub mod error;
pub mod export;
pub mod native;

pub use error::FileError;
pub use export::{export_svg, save_svg, SvgOptions};
pub use native::{load, load_into, save};
