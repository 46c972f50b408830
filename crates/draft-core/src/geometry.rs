//! 几何图元定义
//!
//! 支持的图元：
//! - 线段 (Line)
//! - 矩形 (Rectangle)
//! - 圆 / 圆弧 (Circle)
//! - 尺寸标注 (Dimension)
//! - 文本 (Text)
//! - 符号 (Symbol)
//! - 图框标题栏 (TitleBlock)
//!
//! 所有角度均为度，视觉逆时针，0° 指向 +X。

use crate::intersect::{arc_contains_angle, arc_sweep};
use crate::math::{
    midpoint, normalize_or_zero, perpendicular, polar_to_cartesian, rotate_point, xy,
    BoundingBox2, Point2, Vector2,
};
use serde::{Deserialize, Serialize};

/// 几何类型枚举
///
/// 序列化时以 `type` 字段区分种类。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Geometry {
    Line(Line),
    Rectangle(Rectangle),
    Circle(Circle),
    Dimension(Dimension),
    Text(Text),
    Symbol(Symbol),
    TitleBlock(TitleBlock),
}

impl Geometry {
    /// 获取几何的类型名称
    pub fn type_name(&self) -> &'static str {
        match self {
            Geometry::Line(_) => "line",
            Geometry::Rectangle(_) => "rectangle",
            Geometry::Circle(_) => "circle",
            Geometry::Dimension(_) => "dimension",
            Geometry::Text(_) => "text",
            Geometry::Symbol(_) => "symbol",
            Geometry::TitleBlock(_) => "title_block",
        }
    }

    /// 获取几何的轴对齐包围盒（已考虑旋转）
    pub fn bounding_box(&self) -> BoundingBox2 {
        match self {
            Geometry::Line(l) => BoundingBox2::from_points([l.p1, l.p2]),
            Geometry::Rectangle(r) => BoundingBox2::from_points(r.corners()),
            Geometry::Circle(c) => c.bounding_box(),
            Geometry::Dimension(d) => d.bounding_box(),
            Geometry::Text(t) => BoundingBox2::from_points(t.corners()),
            Geometry::Symbol(s) => BoundingBox2::from_points(s.corners()),
            Geometry::TitleBlock(tb) => BoundingBox2::from_points(tb.corners()),
        }
    }

    /// 旋转和缩放时使用的几何中心
    pub fn center(&self) -> Point2 {
        match self {
            Geometry::Line(l) => l.midpoint(),
            Geometry::Rectangle(r) => r.center(),
            Geometry::Circle(c) => c.center(),
            Geometry::Dimension(d) => midpoint(d.p1, d.p2),
            Geometry::Text(t) => t.center(),
            Geometry::Symbol(s) => s.center(),
            Geometry::TitleBlock(tb) => tb.center(),
        }
    }

    /// 参与修剪/延伸求交的直线段（矩形和标题栏的四条边、线段本身）
    pub fn segments(&self) -> Vec<(Point2, Point2)> {
        match self {
            Geometry::Line(l) => vec![(l.p1, l.p2)],
            Geometry::Rectangle(r) => r.edges().to_vec(),
            Geometry::TitleBlock(tb) => edges_of(tb.corners()).to_vec(),
            _ => vec![],
        }
    }
}

/// 四个角点依次相连得到的四条边
fn edges_of(c: [Point2; 4]) -> [(Point2, Point2); 4] {
    [(c[0], c[1]), (c[1], c[2]), (c[2], c[3]), (c[3], c[0])]
}

/// 以左上角 + 宽高 + 绕中心旋转描述的矩形区域的四个角点
///
/// 顺序：左上、右上、右下、左下（未旋转时）。
fn rotated_box(x: f64, y: f64, width: f64, height: f64, rotation: f64) -> [Point2; 4] {
    let center = Point2::new(x + width / 2.0, y + height / 2.0);
    [
        Point2::new(x, y),
        Point2::new(x + width, y),
        Point2::new(x + width, y + height),
        Point2::new(x, y + height),
    ]
    .map(|p| rotate_point(p, center, rotation))
}

/// 线段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    #[serde(with = "xy")]
    pub p1: Point2,
    #[serde(with = "xy")]
    pub p2: Point2,
}

impl Line {
    pub fn new(p1: Point2, p2: Point2) -> Self {
        Self { p1, p2 }
    }

    /// 计算线段长度
    pub fn length(&self) -> f64 {
        (self.p2 - self.p1).norm()
    }

    /// 单位方向向量（零长度时为零向量）
    pub fn direction(&self) -> Vector2 {
        normalize_or_zero(self.p2 - self.p1)
    }

    pub fn midpoint(&self) -> Point2 {
        midpoint(self.p1, self.p2)
    }

    /// 参数 t 处的点
    pub fn point_at(&self, t: f64) -> Point2 {
        self.p1 + (self.p2 - self.p1) * t
    }
}

/// 矩形
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// 绕矩形中心的旋转角（度）
    #[serde(default)]
    pub rotation: f64,
}

impl Rectangle {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            rotation: 0.0,
        }
    }

    /// 由两个对角点构造（结果总是非负宽高）
    pub fn from_corners(a: Point2, b: Point2) -> Self {
        Self::new(
            a.x.min(b.x),
            a.y.min(b.y),
            (b.x - a.x).abs(),
            (b.y - a.y).abs(),
        )
    }

    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn center(&self) -> Point2 {
        Point2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// 旋转后的四个角点
    pub fn corners(&self) -> [Point2; 4] {
        rotated_box(self.x, self.y, self.width, self.height, self.rotation)
    }

    /// 四条边：上、右、下、左（未旋转时）
    pub fn edges(&self) -> [(Point2, Point2); 4] {
        edges_of(self.corners())
    }
}

/// 圆或圆弧
///
/// 起止角都缺省时为整圆，否则为从起始角逆时针到终止角的圆弧。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Circle {
    pub cx: f64,
    pub cy: f64,
    pub r: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_angle: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_angle: Option<f64>,
}

impl Circle {
    pub fn new(center: Point2, r: f64) -> Self {
        Self {
            cx: center.x,
            cy: center.y,
            r,
            start_angle: None,
            end_angle: None,
        }
    }

    pub fn arc(center: Point2, r: f64, start_angle: f64, end_angle: f64) -> Self {
        Self {
            cx: center.x,
            cy: center.y,
            r,
            start_angle: Some(start_angle),
            end_angle: Some(end_angle),
        }
    }

    pub fn center(&self) -> Point2 {
        Point2::new(self.cx, self.cy)
    }

    /// 圆弧的 `(起始角, 终止角)`；整圆返回 `None`
    pub fn arc_span(&self) -> Option<(f64, f64)> {
        match (self.start_angle, self.end_angle) {
            (Some(s), Some(e)) => Some((s, e)),
            _ => None,
        }
    }

    pub fn is_arc(&self) -> bool {
        self.arc_span().is_some()
    }

    /// 扫掠角（整圆为 360）
    pub fn sweep(&self) -> f64 {
        self.arc_span().map_or(360.0, |(s, e)| arc_sweep(s, e))
    }

    /// 角度是否落在圆弧上（整圆恒为真）
    pub fn contains_angle(&self, angle: f64) -> bool {
        self.arc_span()
            .map_or(true, |(s, e)| arc_contains_angle(s, e, angle))
    }

    pub fn point_at_angle(&self, angle: f64) -> Point2 {
        polar_to_cartesian(self.center(), self.r, angle)
    }

    /// 圆弧两端点
    pub fn arc_endpoints(&self) -> Option<(Point2, Point2)> {
        self.arc_span()
            .map(|(s, e)| (self.point_at_angle(s), self.point_at_angle(e)))
    }

    pub fn bounding_box(&self) -> BoundingBox2 {
        let Some((s, e)) = self.arc_span() else {
            return BoundingBox2::new(
                Point2::new(self.cx - self.r, self.cy - self.r),
                Point2::new(self.cx + self.r, self.cy + self.r),
            );
        };
        let mut bbox = BoundingBox2::from_points([self.point_at_angle(s), self.point_at_angle(e)]);
        // 检查象限点
        for angle in [0.0, 90.0, 180.0, 270.0] {
            if arc_contains_angle(s, e, angle) {
                bbox.expand_to_include(&self.point_at_angle(angle));
            }
        }
        bbox
    }
}

/// 标注类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DimensionKind {
    /// 对齐的线性标注
    #[default]
    Linear,
    /// 半径标注，p1 为圆心，p2 为圆上一点
    Radial,
    /// 直径标注，p1 为圆心，p2 为圆上一点
    Diameter,
}

/// 尺寸界线默认间隙
pub const DEFAULT_EXTENSION_OFFSET: f64 = 2.0;

/// 尺寸界线默认超出量
pub const DEFAULT_EXTENSION_OVERSHOOT: f64 = 2.0;

/// 标注默认字高
pub const DEFAULT_DIMENSION_FONT_SIZE: f64 = 12.0;

/// 尺寸标注（仅注释，不驱动几何）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dimension {
    #[serde(default)]
    pub sub_type: DimensionKind,
    #[serde(with = "xy")]
    pub p1: Point2,
    #[serde(with = "xy")]
    pub p2: Point2,
    #[serde(with = "xy")]
    pub offset_point: Point2,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_override: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension_line_offset: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension_line_overshoot: Option<f64>,
}

impl Dimension {
    pub fn new(sub_type: DimensionKind, p1: Point2, p2: Point2, offset_point: Point2) -> Self {
        Self {
            sub_type,
            p1,
            p2,
            offset_point,
            text_override: None,
            font_size: None,
            extension_line_offset: None,
            extension_line_overshoot: None,
        }
    }

    pub fn font_size(&self) -> f64 {
        self.font_size.unwrap_or(DEFAULT_DIMENSION_FONT_SIZE)
    }

    /// 测量值
    pub fn measurement(&self) -> f64 {
        let len = (self.p2 - self.p1).norm();
        match self.sub_type {
            DimensionKind::Linear | DimensionKind::Radial => len,
            DimensionKind::Diameter => len * 2.0,
        }
    }

    /// 显示文本
    pub fn display_text(&self) -> String {
        if let Some(text) = &self.text_override {
            return text.clone();
        }
        let val = self.measurement();
        match self.sub_type {
            DimensionKind::Linear => format!("{val:.2}"),
            DimensionKind::Radial => format!("R{val:.2}"),
            DimensionKind::Diameter => format!("Ø{val:.2}"),
        }
    }

    /// 标注线相对 p1-p2 基线的有符号垂直偏移
    pub fn offset_distance(&self) -> f64 {
        let normal = perpendicular(normalize_or_zero(self.p2 - self.p1));
        (self.offset_point - self.p1).dot(&normal)
    }

    /// 线性标注的标注线两端
    pub fn dimension_line(&self) -> (Point2, Point2) {
        let normal = perpendicular(normalize_or_zero(self.p2 - self.p1));
        let shift = normal * self.offset_distance();
        (self.p1 + shift, self.p2 + shift)
    }

    /// 线性标注的两条尺寸界线（考虑间隙与超出量）
    pub fn extension_lines(&self) -> [(Point2, Point2); 2] {
        let gap = self.extension_line_offset.unwrap_or(DEFAULT_EXTENSION_OFFSET);
        let overshoot = self
            .extension_line_overshoot
            .unwrap_or(DEFAULT_EXTENSION_OVERSHOOT);
        let d = self.offset_distance();
        let normal = perpendicular(normalize_or_zero(self.p2 - self.p1)) * d.signum();
        let reach = d.abs() + overshoot;
        let start = gap.min(reach);
        [self.p1, self.p2].map(|p| (p + normal * start, p + normal * reach))
    }

    /// 半径/直径标注的引线：(起点, 圆上点, 文字位置)
    pub fn leader(&self) -> (Point2, Point2, Point2) {
        let start = match self.sub_type {
            DimensionKind::Diameter => self.p1 - (self.p2 - self.p1),
            _ => self.p1,
        };
        (start, self.p2, self.offset_point)
    }

    /// 组成标注图形的线段（用于拾取和包围盒）
    pub fn segments(&self) -> Vec<(Point2, Point2)> {
        match self.sub_type {
            DimensionKind::Linear => {
                let (a, b) = self.dimension_line();
                let [e1, e2] = self.extension_lines();
                vec![(a, b), e1, e2]
            }
            DimensionKind::Radial | DimensionKind::Diameter => {
                let (start, on_circle, text) = self.leader();
                vec![(start, on_circle), (on_circle, text)]
            }
        }
    }

    pub fn bounding_box(&self) -> BoundingBox2 {
        let mut bbox = BoundingBox2::from_points([self.p1, self.p2, self.offset_point]);
        for (a, b) in self.segments() {
            bbox.expand_to_include(&a);
            bbox.expand_to_include(&b);
        }
        bbox
    }
}

/// 字符宽度与字高之比（文本宽度估算）
pub const TEXT_WIDTH_FACTOR: f64 = 0.6;

/// 文本，锚点 (x, y) 为文本框左上角
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Text {
    pub x: f64,
    pub y: f64,
    pub content: String,
    pub font_size: f64,
    /// 绕锚点的旋转角（度）
    #[serde(default)]
    pub rotation: f64,
}

impl Text {
    pub fn new(position: Point2, content: impl Into<String>, font_size: f64) -> Self {
        Self {
            x: position.x,
            y: position.y,
            content: content.into(),
            font_size,
            rotation: 0.0,
        }
    }

    pub fn anchor(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }

    /// 估算文本宽度
    pub fn estimated_width(&self) -> f64 {
        let chars = self.content.chars().count().max(1);
        chars as f64 * self.font_size * TEXT_WIDTH_FACTOR
    }

    /// 文本框四角（绕锚点旋转）
    pub fn corners(&self) -> [Point2; 4] {
        let w = self.estimated_width();
        let h = self.font_size;
        let anchor = self.anchor();
        [
            anchor,
            Point2::new(self.x + w, self.y),
            Point2::new(self.x + w, self.y + h),
            Point2::new(self.x, self.y + h),
        ]
        .map(|p| rotate_point(p, anchor, self.rotation))
    }

    pub fn center(&self) -> Point2 {
        let c = self.corners();
        midpoint(c[0], c[2])
    }
}

/// 符号，(x, y) 为符号中心，size 为外接正方形边长
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    pub x: f64,
    pub y: f64,
    pub name: String,
    pub size: f64,
    #[serde(default)]
    pub rotation: f64,
}

impl Symbol {
    pub fn new(center: Point2, name: impl Into<String>, size: f64) -> Self {
        Self {
            x: center.x,
            y: center.y,
            name: name.into(),
            size,
            rotation: 0.0,
        }
    }

    pub fn center(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }

    /// 外接正方形四角（已旋转）
    pub fn corners(&self) -> [Point2; 4] {
        let half = self.size / 2.0;
        rotated_box(
            self.x - half,
            self.y - half,
            self.size,
            self.size,
            self.rotation,
        )
    }
}

/// 标题栏字段
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TitleBlockData {
    pub company: String,
    pub project: String,
    pub sheet: String,
    pub scale: String,
    pub revision: String,
    pub drawn_by: String,
    pub checked_by: String,
    pub date: String,
}

/// 图框标题栏
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitleBlock {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub data: TitleBlockData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_scale: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub letter_spacing: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_spacing: Option<f64>,
    #[serde(default)]
    pub rotation: f64,
}

impl TitleBlock {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            data: TitleBlockData::default(),
            font_scale: None,
            letter_spacing: None,
            line_spacing: None,
            rotation: 0.0,
        }
    }

    pub fn center(&self) -> Point2 {
        Point2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn corners(&self) -> [Point2; 4] {
        rotated_box(self.x, self.y, self.width, self.height, self.rotation)
    }
}
