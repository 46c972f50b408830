//! 图形更新与校验
//!
//! 所有修改都经过这里：
//! - 非有限数值字段被丢弃（点的任一分量非有限则整个点被丢弃）
//! - 宽、高、半径、尺寸、字高不低于 [`MIN_EXTENT`]
//! - 负宽高在提交时折算到 x/y 偏移
//! - `properties` 和 `data` 浅合并，只覆盖给出的字段
//!
//! 非法字段只会被静默丢弃，不会报错。

use crate::geometry::{DimensionKind, Geometry, TitleBlockData};
use crate::math::{is_finite_point, xy, Point2};
use crate::properties::{LineType, Properties};
use crate::shape::Shape;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// 正尺寸下限
pub const MIN_EXTENT: f64 = 0.01;

/// 属性的部分更新
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PropertiesUpdate {
    pub color: Option<String>,
    pub fill: Option<String>,
    pub stroke_width: Option<f64>,
    pub line_type: Option<LineType>,
}

impl PropertiesUpdate {
    fn apply(&self, props: &mut Properties) {
        if let Some(color) = &self.color {
            props.color = color.clone();
        }
        if let Some(fill) = &self.fill {
            props.fill = fill.clone();
        }
        if let Some(w) = finite("strokeWidth", self.stroke_width) {
            props.stroke_width = w.max(0.0);
        }
        if let Some(lt) = self.line_type {
            props.line_type = lt;
        }
    }
}

/// 标题栏字段的部分更新
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TitleBlockDataUpdate {
    pub company: Option<String>,
    pub project: Option<String>,
    pub sheet: Option<String>,
    pub scale: Option<String>,
    pub revision: Option<String>,
    pub drawn_by: Option<String>,
    pub checked_by: Option<String>,
    pub date: Option<String>,
}

impl TitleBlockDataUpdate {
    fn apply(&self, data: &mut TitleBlockData) {
        let fields = [
            (&self.company, &mut data.company),
            (&self.project, &mut data.project),
            (&self.sheet, &mut data.sheet),
            (&self.scale, &mut data.scale),
            (&self.revision, &mut data.revision),
            (&self.drawn_by, &mut data.drawn_by),
            (&self.checked_by, &mut data.checked_by),
            (&self.date, &mut data.date),
        ];
        for (src, dst) in fields {
            if let Some(v) = src {
                dst.clone_from(v);
            }
        }
    }
}

/// 单个图形的部分更新
///
/// 只有与图形种类相关的字段会生效，其余字段被忽略。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShapeUpdate {
    #[serde(with = "xy::option", skip_serializing_if = "Option::is_none")]
    pub p1: Option<Point2>,
    #[serde(with = "xy::option", skip_serializing_if = "Option::is_none")]
    pub p2: Option<Point2>,
    #[serde(with = "xy::option", skip_serializing_if = "Option::is_none")]
    pub offset_point: Option<Point2>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub rotation: Option<f64>,
    pub cx: Option<f64>,
    pub cy: Option<f64>,
    pub r: Option<f64>,
    pub start_angle: Option<f64>,
    pub end_angle: Option<f64>,
    /// 清除圆弧角度，恢复为整圆
    pub full_circle: bool,
    pub sub_type: Option<DimensionKind>,
    pub text_override: Option<String>,
    pub font_size: Option<f64>,
    pub extension_line_offset: Option<f64>,
    pub extension_line_overshoot: Option<f64>,
    pub content: Option<String>,
    pub name: Option<String>,
    pub size: Option<f64>,
    pub font_scale: Option<f64>,
    pub letter_spacing: Option<f64>,
    pub line_spacing: Option<f64>,
    pub data: Option<TitleBlockDataUpdate>,
    pub properties: Option<PropertiesUpdate>,
}

/// 丢弃非有限数值
fn finite(field: &str, value: Option<f64>) -> Option<f64> {
    match value {
        Some(v) if v.is_finite() => Some(v),
        Some(v) => {
            debug!(field, value = v, "dropping non-finite field");
            None
        }
        None => None,
    }
}

/// 丢弃任一分量非有限的点
fn finite_point(field: &str, value: Option<Point2>) -> Option<Point2> {
    match value {
        Some(p) if is_finite_point(&p) => Some(p),
        Some(_) => {
            debug!(field, "dropping non-finite point");
            None
        }
        None => None,
    }
}

fn set(dst: &mut f64, field: &str, value: Option<f64>) {
    if let Some(v) = finite(field, value) {
        *dst = v;
    }
}

fn set_opt(dst: &mut Option<f64>, field: &str, value: Option<f64>) {
    if let Some(v) = finite(field, value) {
        *dst = Some(v);
    }
}

fn set_point(dst: &mut Point2, field: &str, value: Option<Point2>) {
    if let Some(p) = finite_point(field, value) {
        *dst = p;
    }
}

impl ShapeUpdate {
    /// 用完整几何构造更新（用于提交拖拽、缩放、旋转的预览结果）
    pub fn from_geometry(geometry: &Geometry) -> Self {
        let mut update = ShapeUpdate::default();
        match geometry {
            Geometry::Line(l) => {
                update.p1 = Some(l.p1);
                update.p2 = Some(l.p2);
            }
            Geometry::Rectangle(r) => {
                update.x = Some(r.x);
                update.y = Some(r.y);
                update.width = Some(r.width);
                update.height = Some(r.height);
                update.rotation = Some(r.rotation);
            }
            Geometry::Circle(c) => {
                update.cx = Some(c.cx);
                update.cy = Some(c.cy);
                update.r = Some(c.r);
                match c.arc_span() {
                    Some((s, e)) => {
                        update.start_angle = Some(s);
                        update.end_angle = Some(e);
                    }
                    None => update.full_circle = true,
                }
            }
            Geometry::Dimension(d) => {
                update.p1 = Some(d.p1);
                update.p2 = Some(d.p2);
                update.offset_point = Some(d.offset_point);
                update.sub_type = Some(d.sub_type);
            }
            Geometry::Text(t) => {
                update.x = Some(t.x);
                update.y = Some(t.y);
                update.font_size = Some(t.font_size);
                update.rotation = Some(t.rotation);
            }
            Geometry::Symbol(s) => {
                update.x = Some(s.x);
                update.y = Some(s.y);
                update.size = Some(s.size);
                update.rotation = Some(s.rotation);
            }
            Geometry::TitleBlock(tb) => {
                update.x = Some(tb.x);
                update.y = Some(tb.y);
                update.width = Some(tb.width);
                update.height = Some(tb.height);
                update.rotation = Some(tb.rotation);
            }
        }
        update
    }

    /// 仅修改位置的更新
    pub fn position(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Default::default()
        }
    }

    /// 应用到图形，返回图形是否发生变化
    pub fn apply(&self, shape: &mut Shape) -> bool {
        let before = shape.clone();
        self.apply_geometry(&mut shape.geometry);
        if let Some(props) = &self.properties {
            props.apply(&mut shape.properties);
        }
        normalize(&mut shape.geometry);
        *shape != before
    }

    fn apply_geometry(&self, geometry: &mut Geometry) {
        match geometry {
            Geometry::Line(l) => {
                set_point(&mut l.p1, "p1", self.p1);
                set_point(&mut l.p2, "p2", self.p2);
            }
            Geometry::Rectangle(r) => {
                set(&mut r.x, "x", self.x);
                set(&mut r.y, "y", self.y);
                set(&mut r.width, "width", self.width);
                set(&mut r.height, "height", self.height);
                set(&mut r.rotation, "rotation", self.rotation);
            }
            Geometry::Circle(c) => {
                set(&mut c.cx, "cx", self.cx);
                set(&mut c.cy, "cy", self.cy);
                set(&mut c.r, "r", self.r);
                if self.full_circle {
                    c.start_angle = None;
                    c.end_angle = None;
                }
                set_opt(&mut c.start_angle, "startAngle", self.start_angle);
                set_opt(&mut c.end_angle, "endAngle", self.end_angle);
            }
            Geometry::Dimension(d) => {
                set_point(&mut d.p1, "p1", self.p1);
                set_point(&mut d.p2, "p2", self.p2);
                set_point(&mut d.offset_point, "offsetPoint", self.offset_point);
                if let Some(kind) = self.sub_type {
                    d.sub_type = kind;
                }
                if let Some(text) = &self.text_override {
                    d.text_override = (!text.is_empty()).then(|| text.clone());
                }
                set_opt(&mut d.font_size, "fontSize", self.font_size);
                set_opt(
                    &mut d.extension_line_offset,
                    "extensionLineOffset",
                    self.extension_line_offset,
                );
                set_opt(
                    &mut d.extension_line_overshoot,
                    "extensionLineOvershoot",
                    self.extension_line_overshoot,
                );
            }
            Geometry::Text(t) => {
                set(&mut t.x, "x", self.x);
                set(&mut t.y, "y", self.y);
                set(&mut t.font_size, "fontSize", self.font_size);
                set(&mut t.rotation, "rotation", self.rotation);
                if let Some(content) = &self.content {
                    t.content.clone_from(content);
                }
            }
            Geometry::Symbol(s) => {
                set(&mut s.x, "x", self.x);
                set(&mut s.y, "y", self.y);
                set(&mut s.size, "size", self.size);
                set(&mut s.rotation, "rotation", self.rotation);
                if let Some(name) = &self.name {
                    s.name.clone_from(name);
                }
            }
            Geometry::TitleBlock(tb) => {
                set(&mut tb.x, "x", self.x);
                set(&mut tb.y, "y", self.y);
                set(&mut tb.width, "width", self.width);
                set(&mut tb.height, "height", self.height);
                set(&mut tb.rotation, "rotation", self.rotation);
                set_opt(&mut tb.font_scale, "fontScale", self.font_scale);
                set_opt(&mut tb.letter_spacing, "letterSpacing", self.letter_spacing);
                set_opt(&mut tb.line_spacing, "lineSpacing", self.line_spacing);
                if let Some(data) = &self.data {
                    data.apply(&mut tb.data);
                }
            }
        }
    }
}

fn floor_extent(v: &mut f64) {
    if *v < MIN_EXTENT {
        *v = MIN_EXTENT;
    }
}

/// 负宽度折算到起点偏移后再保证正值
fn fold_negative(origin: &mut f64, extent: &mut f64) {
    if *extent < 0.0 {
        *origin += *extent;
        *extent = -*extent;
    }
    floor_extent(extent);
}

/// 规范化几何，保证可提交的状态
///
/// 交互拖拽中的预览可以暂时是负宽高或负半径，提交前都会经过这里。
pub fn normalize(geometry: &mut Geometry) {
    match geometry {
        Geometry::Rectangle(r) => {
            fold_negative(&mut r.x, &mut r.width);
            fold_negative(&mut r.y, &mut r.height);
        }
        Geometry::TitleBlock(tb) => {
            fold_negative(&mut tb.x, &mut tb.width);
            fold_negative(&mut tb.y, &mut tb.height);
        }
        Geometry::Circle(c) => {
            c.r = c.r.abs();
            floor_extent(&mut c.r);
            // 只有一个角度时视为整圆
            if c.start_angle.is_some() != c.end_angle.is_some() {
                c.start_angle = None;
                c.end_angle = None;
            }
        }
        Geometry::Symbol(s) => {
            s.size = s.size.abs();
            floor_extent(&mut s.size);
        }
        Geometry::Text(t) => floor_extent(&mut t.font_size),
        Geometry::Dimension(d) => {
            if let Some(fs) = d.font_size.as_mut() {
                floor_extent(fs);
            }
        }
        Geometry::Line(_) => {}
    }
}

/// 几何中所有数值是否有限
pub fn is_finite(geometry: &Geometry) -> bool {
    let opt = |v: Option<f64>| v.map_or(true, f64::is_finite);
    match geometry {
        Geometry::Line(l) => is_finite_point(&l.p1) && is_finite_point(&l.p2),
        Geometry::Rectangle(r) => [r.x, r.y, r.width, r.height, r.rotation]
            .iter()
            .all(|v| v.is_finite()),
        Geometry::Circle(c) => {
            [c.cx, c.cy, c.r].iter().all(|v| v.is_finite())
                && opt(c.start_angle)
                && opt(c.end_angle)
        }
        Geometry::Dimension(d) => {
            is_finite_point(&d.p1)
                && is_finite_point(&d.p2)
                && is_finite_point(&d.offset_point)
                && opt(d.font_size)
                && opt(d.extension_line_offset)
                && opt(d.extension_line_overshoot)
        }
        Geometry::Text(t) => [t.x, t.y, t.font_size, t.rotation]
            .iter()
            .all(|v| v.is_finite()),
        Geometry::Symbol(s) => [s.x, s.y, s.size, s.rotation].iter().all(|v| v.is_finite()),
        Geometry::TitleBlock(tb) => {
            [tb.x, tb.y, tb.width, tb.height, tb.rotation]
                .iter()
                .all(|v| v.is_finite())
                && opt(tb.font_scale)
                && opt(tb.letter_spacing)
                && opt(tb.line_spacing)
        }
    }
}

/// 校验并规范化待插入的新几何；含非有限数值时拒绝
pub fn sanitize(mut geometry: Geometry) -> Option<Geometry> {
    if !is_finite(&geometry) {
        debug!(kind = geometry.type_name(), "rejecting shape with non-finite values");
        return None;
    }
    normalize(&mut geometry);
    Some(geometry)
}
