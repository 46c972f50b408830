//! 图形：唯一标识 + 几何 + 视觉属性

use crate::geometry::Geometry;
use crate::properties::Properties;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 图形唯一标识
///
/// 插入时生成，文档生命周期内不变且不复用。从文件载入的 id 原样保留。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShapeId(String);

impl ShapeId {
    /// 生成新的随机 id
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ShapeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ShapeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 文档中的一个图形
///
/// 持久化格式中几何字段与 `id`、`properties` 平铺在同一个对象里。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub id: ShapeId,
    #[serde(flatten)]
    pub geometry: Geometry,
    #[serde(default)]
    pub properties: Properties,
}

impl Shape {
    /// 以新生成的 id 创建图形
    pub fn new(geometry: Geometry, properties: Properties) -> Self {
        Self {
            id: ShapeId::generate(),
            geometry,
            properties,
        }
    }

    pub fn with_id(id: impl Into<ShapeId>, geometry: Geometry, properties: Properties) -> Self {
        Self {
            id: id.into(),
            geometry,
            properties,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.geometry.type_name()
    }
}

/// 按 id 查找图形
pub fn find_shape<'a>(shapes: &'a [Shape], id: &ShapeId) -> Option<&'a Shape> {
    shapes.iter().find(|s| &s.id == id)
}
