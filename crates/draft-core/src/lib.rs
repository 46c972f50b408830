//! DraftCAD 核心编辑引擎
//!
//! 提供 2D 几何内核、图形文档存储、对象捕捉、修剪/延伸和选择变换。
//!
//! # 架构设计
//!
//! - `Shape`: 唯一 id + 几何 + 视觉属性
//! - `DocumentStore`: 不可变快照组成的线性历史，所有修改经过校验
//! - `SnapEngine`: 精确捕捉与对齐推断
//! - `trim` / `extend`: 基于交点参数的修剪与延伸
//!
//! 坐标系为 Y 轴向下（与屏幕一致），所有角度为度，正值表示视觉逆时针。
//!
//! # 示例
//!
//! ```rust
//! use draft_core::prelude::*;
//!
//! let mut store = DocumentStore::default();
//! let line = Line::new(Point2::origin(), Point2::new(100.0, 50.0));
//! let id = store.add_shape(Geometry::Line(line), Properties::default());
//! assert!(id.is_some());
//! assert!(store.can_undo());
//! ```

pub mod clipboard;
pub mod document;
pub mod generate;
pub mod geometry;
pub mod history;
pub mod hit;
pub mod intersect;
pub mod math;
pub mod properties;
pub mod selection;
pub mod shape;
pub mod snap;
pub mod transform;
pub mod trim;
pub mod units;
pub mod update;
pub mod view;

pub mod prelude {
    //! 常用类型的便捷导入
    pub use crate::clipboard::Clipboard;
    pub use crate::document::DocumentStore;
    pub use crate::generate::{GenerateError, ShapeGenerator};
    pub use crate::geometry::{
        Circle, Dimension, DimensionKind, Geometry, Line, Rectangle, Symbol, Text, TitleBlock,
        TitleBlockData,
    };
    pub use crate::math::{BoundingBox2, Point2, Vector2};
    pub use crate::properties::{LineType, Properties};
    pub use crate::selection::Selection;
    pub use crate::shape::{Shape, ShapeId};
    pub use crate::snap::{SnapConfig, SnapEngine, SnapResult, SnapType};
    pub use crate::trim::{ExtendResult, TrimResult};
    pub use crate::units::Unit;
    pub use crate::update::{PropertiesUpdate, ShapeUpdate};
    pub use crate::view::{ViewConfig, ViewTransform};
}
