//! 剪贴板（进程内，不使用系统剪贴板）

use crate::geometry::Geometry;
use crate::math::{Point2, Vector2};
use crate::properties::Properties;
use crate::shape::Shape;
use crate::transform::{group_bounds, translate};
use serde::{Deserialize, Serialize};

/// 复制的图形副本及其原点
///
/// 原点取复制时选中图形包围盒的中心，粘贴时整体平移到光标处。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clipboard {
    pub shapes: Vec<Shape>,
    #[serde(with = "crate::math::xy")]
    pub origin: Point2,
}

impl Default for Clipboard {
    fn default() -> Self {
        Self {
            shapes: Vec::new(),
            origin: Point2::origin(),
        }
    }
}

impl Clipboard {
    /// 捕获图形的值副本
    pub fn capture<'a>(shapes: impl IntoIterator<Item = &'a Shape>) -> Self {
        let shapes: Vec<Shape> = shapes.into_iter().cloned().collect();
        let bounds = group_bounds(&shapes);
        let origin = if bounds.is_empty() {
            Point2::origin()
        } else {
            bounds.center()
        };
        Self { shapes, origin }
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// 以光标为新原点生成待插入的几何（id 由文档重新分配）
    pub fn paste_at(&self, cursor: Point2) -> Vec<(Geometry, Properties)> {
        let delta: Vector2 = cursor - self.origin;
        self.shapes
            .iter()
            .map(|s| (translate(&s.geometry, delta), s.properties.clone()))
            .collect()
    }
}
