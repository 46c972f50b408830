//! 视觉属性

use serde::{Deserialize, Serialize};

/// 默认线条颜色
pub const DEFAULT_COLOR: &str = "#FFFFFF";

/// 默认填充
pub const DEFAULT_FILL: &str = "transparent";

/// 线型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum LineType {
    #[default]
    Solid,
    Dashed,
    Dotted,
    DashDot,
}

impl LineType {
    /// SVG `stroke-dasharray`，按线宽缩放
    pub fn dash_array(&self, stroke_width: f64) -> Option<String> {
        let w = stroke_width.max(1.0);
        match self {
            LineType::Solid => None,
            LineType::Dashed => Some(format!("{} {}", 6.0 * w, 4.0 * w)),
            LineType::Dotted => Some(format!("{} {}", w, 3.0 * w)),
            LineType::DashDot => Some(format!("{} {} {} {}", 8.0 * w, 3.0 * w, w, 3.0 * w)),
        }
    }
}

/// 图形的视觉属性
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Properties {
    /// 线条颜色（CSS 颜色字符串）
    pub color: String,
    /// 填充（CSS 颜色字符串或 `transparent`）
    pub fill: String,
    pub stroke_width: f64,
    pub line_type: LineType,
}

impl Default for Properties {
    fn default() -> Self {
        Self {
            color: DEFAULT_COLOR.to_string(),
            fill: DEFAULT_FILL.to_string(),
            stroke_width: 1.0,
            line_type: LineType::Solid,
        }
    }
}

impl Properties {
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_line_type(mut self, line_type: LineType) -> Self {
        self.line_type = line_type;
        self
    }

    pub fn is_filled(&self) -> bool {
        !self.fill.is_empty() && self.fill != DEFAULT_FILL && self.fill != "none"
    }
}
