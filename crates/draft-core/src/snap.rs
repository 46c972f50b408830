//! 对象捕捉与对齐推断
//!
//! 参考 LibreCAD 的设计。捕捉分两级：
//! 1. 精确捕捉：命中光标附近的图形后，取其最近的已启用捕捉点，直接替换光标位置
//! 2. 对齐推断：没有精确捕捉时，在较大范围内寻找 X 或 Y 与光标对齐的捕捉点，
//!    生成水平/竖直的推断线
//!
//! 所有容差都以屏幕像素配置，按当前缩放换算为世界坐标。

use crate::geometry::Geometry;
use crate::hit::hit_test;
use crate::math::{distance, midpoint, Point2};
use crate::shape::{Shape, ShapeId};
use serde::{Deserialize, Serialize};

/// 捕捉类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapType {
    /// 端点捕捉
    Endpoint,
    /// 中点捕捉
    Midpoint,
    /// 圆心捕捉
    Center,
}

impl SnapType {
    /// 获取捕捉类型的名称
    pub fn name(&self) -> &'static str {
        match self {
            SnapType::Endpoint => "端点",
            SnapType::Midpoint => "中点",
            SnapType::Center => "圆心",
        }
    }

    /// 获取捕捉类型的快捷键
    pub fn shortcut(&self) -> &'static str {
        match self {
            SnapType::Endpoint => "END",
            SnapType::Midpoint => "MID",
            SnapType::Center => "CEN",
        }
    }

    fn bit(&self) -> u8 {
        match self {
            SnapType::Endpoint => SnapMask::ENDPOINT,
            SnapType::Midpoint => SnapMask::MIDPOINT,
            SnapType::Center => SnapMask::CENTER,
        }
    }
}

/// 捕捉掩码（位域，用于快速启用/禁用捕捉类型）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapMask {
    bits: u8,
}

impl SnapMask {
    pub const ENDPOINT: u8 = 1 << 0;
    pub const MIDPOINT: u8 = 1 << 1;
    pub const CENTER: u8 = 1 << 2;

    pub const NONE: SnapMask = SnapMask { bits: 0 };
    pub const ALL: SnapMask = SnapMask {
        bits: Self::ENDPOINT | Self::MIDPOINT | Self::CENTER,
    };

    pub fn new(bits: u8) -> Self {
        Self { bits }
    }

    pub fn is_enabled(&self, snap_type: SnapType) -> bool {
        self.bits & snap_type.bit() != 0
    }

    pub fn set(&mut self, snap_type: SnapType, enabled: bool) {
        if enabled {
            self.bits |= snap_type.bit();
        } else {
            self.bits &= !snap_type.bit();
        }
    }

    pub fn toggle(&mut self, snap_type: SnapType) {
        let enabled = self.is_enabled(snap_type);
        self.set(snap_type, !enabled);
    }
}

impl Default for SnapMask {
    fn default() -> Self {
        Self::ALL
    }
}

/// 捕捉点
#[derive(Debug, Clone, PartialEq)]
pub struct SnapPoint {
    /// 捕捉到的世界坐标
    pub point: Point2,
    /// 捕捉类型
    pub snap_type: SnapType,
    /// 所属图形
    pub shape_id: ShapeId,
    /// 距离光标的世界距离
    pub distance: f64,
}

/// 推断线：从来源捕捉点到对齐后的位置
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InferenceLine {
    pub from: Point2,
    pub to: Point2,
}

/// 一次捕捉解析的结果
#[derive(Debug, Clone, PartialEq)]
pub struct SnapResult {
    /// 解析后的位置
    pub point: Point2,
    /// 精确捕捉（若有）
    pub snap: Option<SnapPoint>,
    /// 对齐推断线（0、1 或 2 条）
    pub inference: Vec<InferenceLine>,
}

impl SnapResult {
    /// 未捕捉的原始位置
    pub fn raw(point: Point2) -> Self {
        Self {
            point,
            snap: None,
            inference: Vec::new(),
        }
    }

    /// 是否命中了精确捕捉点
    pub fn is_snapped(&self) -> bool {
        self.snap.is_some()
    }
}

/// 捕捉配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapConfig {
    /// 是否启用捕捉
    pub enabled: bool,
    /// 捕捉容差（屏幕像素）
    pub tolerance: f64,
    /// 启用的捕捉类型
    pub enabled_types: SnapMask,
    /// 是否启用对齐推断
    pub inference: bool,
    /// 推断搜索范围（屏幕像素）
    pub inference_window: f64,
    /// 推断对齐阈值（屏幕像素）
    pub inference_threshold: f64,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tolerance: 5.0,
            enabled_types: SnapMask::default(),
            inference: true,
            inference_window: 250.0,
            inference_threshold: 5.0,
        }
    }
}

/// 图形的候选捕捉点，顺序固定
pub fn snap_points(geometry: &Geometry) -> Vec<(Point2, SnapType)> {
    use SnapType::*;
    match geometry {
        Geometry::Line(l) => vec![(l.p1, Endpoint), (l.p2, Endpoint), (l.midpoint(), Midpoint)],
        Geometry::Rectangle(r) => {
            let corners = r.corners();
            let mut points: Vec<_> = corners.iter().map(|&c| (c, Endpoint)).collect();
            points.extend(r.edges().iter().map(|&(a, b)| (midpoint(a, b), Midpoint)));
            points.push((r.center(), Center));
            points
        }
        Geometry::Circle(c) => {
            let mut points = vec![(c.center(), Center)];
            match c.arc_endpoints() {
                Some((a, b)) => points.extend([(a, Endpoint), (b, Endpoint)]),
                None => points.extend(
                    [0.0, 90.0, 180.0, 270.0].map(|angle| (c.point_at_angle(angle), Endpoint)),
                ),
            }
            points
        }
        Geometry::Symbol(s) => {
            let mut points = vec![(s.center(), Center)];
            points.extend(s.corners().map(|c| (c, Endpoint)));
            points
        }
        Geometry::Dimension(d) => vec![(d.p1, Endpoint), (d.p2, Endpoint)],
        Geometry::Text(t) => vec![(t.anchor(), Endpoint)],
        Geometry::TitleBlock(tb) => {
            let mut points: Vec<_> = tb.corners().map(|c| (c, Endpoint)).to_vec();
            points.push((tb.center(), Center));
            points
        }
    }
}

/// 正交约束：保留较大的坐标差，较小的一个归零
pub fn apply_ortho(anchor: Point2, target: Point2) -> Point2 {
    let dx = (target.x - anchor.x).abs();
    let dy = (target.y - anchor.y).abs();
    if dx >= dy {
        Point2::new(target.x, anchor.y)
    } else {
        Point2::new(anchor.x, target.y)
    }
}

/// 捕捉引擎
///
/// 负责计算和管理对象捕捉
#[derive(Debug, Clone, Default)]
pub struct SnapEngine {
    config: SnapConfig,
}

impl SnapEngine {
    pub fn new(config: SnapConfig) -> Self {
        Self { config }
    }

    /// 获取配置
    pub fn config(&self) -> &SnapConfig {
        &self.config
    }

    /// 获取配置（可变）
    pub fn config_mut(&mut self) -> &mut SnapConfig {
        &mut self.config
    }

    /// 寻找精确捕捉点
    ///
    /// 先命中光标附近最近的图形，再在它的已启用捕捉点中取容差内最近的一个。
    pub fn find_snap_point(
        &self,
        cursor: Point2,
        shapes: &[Shape],
        exclude: &[ShapeId],
        scale: f64,
    ) -> Option<SnapPoint> {
        if !self.config.enabled {
            return None;
        }
        let tolerance = self.config.tolerance / scale;
        let shape = hit_test(shapes, cursor, tolerance, exclude)?;

        snap_points(&shape.geometry)
            .into_iter()
            .filter(|(_, kind)| self.config.enabled_types.is_enabled(*kind))
            .map(|(point, kind)| (point, kind, distance(point, cursor)))
            .filter(|(_, _, d)| *d <= tolerance)
            .min_by(|a, b| a.2.total_cmp(&b.2))
            .map(|(point, snap_type, distance)| SnapPoint {
                point,
                snap_type,
                shape_id: shape.id.clone(),
                distance,
            })
    }

    /// 对齐推断
    ///
    /// 在推断范围内，分别寻找 X 与光标最接近的捕捉点和 Y 与光标最接近的捕捉点
    /// （偏差须小于阈值）。返回对齐后的位置和推断线；没有任何对齐时返回 `None`。
    pub fn find_inference(
        &self,
        cursor: Point2,
        shapes: &[Shape],
        exclude: &[ShapeId],
        scale: f64,
    ) -> Option<(Point2, Vec<InferenceLine>)> {
        if !self.config.enabled || !self.config.inference {
            return None;
        }
        let window = self.config.inference_window / scale;
        let threshold = self.config.inference_threshold / scale;

        let mut best_x: Option<(Point2, f64)> = None;
        let mut best_y: Option<(Point2, f64)> = None;

        let candidates = shapes
            .iter()
            .filter(|s| !exclude.contains(&s.id))
            .flat_map(|s| snap_points(&s.geometry))
            .map(|(p, _)| p)
            .filter(|p| distance(*p, cursor) <= window);

        for p in candidates {
            let dx = (p.x - cursor.x).abs();
            if dx < threshold && best_x.map_or(true, |(_, d)| dx < d) {
                best_x = Some((p, dx));
            }
            let dy = (p.y - cursor.y).abs();
            if dy < threshold && best_y.map_or(true, |(_, d)| dy < d) {
                best_y = Some((p, dy));
            }
        }

        if best_x.is_none() && best_y.is_none() {
            return None;
        }

        let resolved = Point2::new(
            best_x.map_or(cursor.x, |(p, _)| p.x),
            best_y.map_or(cursor.y, |(p, _)| p.y),
        );
        let lines = [best_x, best_y]
            .into_iter()
            .flatten()
            .map(|(from, _)| InferenceLine { from, to: resolved })
            .collect();
        Some((resolved, lines))
    }

    /// 解析光标位置：精确捕捉优先，其次对齐推断，否则返回原始位置
    pub fn resolve(
        &self,
        cursor: Point2,
        shapes: &[Shape],
        exclude: &[ShapeId],
        scale: f64,
    ) -> SnapResult {
        if let Some(snap) = self.find_snap_point(cursor, shapes, exclude, scale) {
            return SnapResult {
                point: snap.point,
                snap: Some(snap),
                inference: Vec::new(),
            };
        }
        match self.find_inference(cursor, shapes, exclude, scale) {
            Some((point, inference)) => SnapResult {
                point,
                snap: None,
                inference,
            },
            None => SnapResult::raw(cursor),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Circle, Line, Rectangle, Symbol};
    use crate::properties::Properties;

    fn line(id: &str, a: (f64, f64), b: (f64, f64)) -> Shape {
        Shape::with_id(
            id,
            Geometry::Line(Line::new(Point2::new(a.0, a.1), Point2::new(b.0, b.1))),
            Properties::default(),
        )
    }

    #[test]
    fn test_snap_mask() {
        let mut mask = SnapMask::default();
        assert!(mask.is_enabled(SnapType::Endpoint));
        mask.toggle(SnapType::Midpoint);
        assert!(!mask.is_enabled(SnapType::Midpoint));
        mask.set(SnapType::Midpoint, true);
        assert!(mask.is_enabled(SnapType::Midpoint));
        assert!(!SnapMask::NONE.is_enabled(SnapType::Center));
    }

    #[test]
    fn test_snap_points_order() {
        let rect = Geometry::Rectangle(Rectangle::new(0.0, 0.0, 10.0, 20.0));
        let points = snap_points(&rect);
        assert_eq!(points.len(), 9);
        assert_eq!(points[0], (Point2::new(0.0, 0.0), SnapType::Endpoint));
        assert_eq!(points[4].1, SnapType::Midpoint);
        assert_eq!(points[8], (Point2::new(5.0, 10.0), SnapType::Center));

        let arc = Geometry::Circle(Circle::arc(Point2::origin(), 5.0, 0.0, 90.0));
        assert_eq!(snap_points(&arc).len(), 3);
        let full = Geometry::Circle(Circle::new(Point2::origin(), 5.0));
        assert_eq!(snap_points(&full).len(), 5);

        let sym = Geometry::Symbol(Symbol::new(Point2::new(1.0, 1.0), "pump", 10.0));
        assert_eq!(snap_points(&sym)[0], (Point2::new(1.0, 1.0), SnapType::Center));
    }

    #[test]
    fn test_endpoint_snap_within_tolerance() {
        let shapes = vec![line("l", (0.0, 100.0), (100.0, 100.0))];
        let engine = SnapEngine::default();
        let result = engine.resolve(Point2::new(102.0, 100.0), &shapes, &[], 1.0);
        assert_eq!(result.point, Point2::new(100.0, 100.0));
        let snap = result.snap.unwrap();
        assert_eq!(snap.snap_type, SnapType::Endpoint);
        assert_eq!(snap.shape_id.as_str(), "l");
    }

    #[test]
    fn test_tolerance_scales_with_zoom() {
        let shapes = vec![line("l", (0.0, 100.0), (100.0, 100.0))];
        let engine = SnapEngine::default();
        // 放大 2 倍后世界容差只有 2.5
        let result = engine.resolve(Point2::new(103.0, 100.0), &shapes, &[], 2.0);
        assert!(result.snap.is_none());
    }

    #[test]
    fn test_disabled_kind_is_skipped() {
        let shapes = vec![line("l", (0.0, 0.0), (100.0, 0.0))];
        let mut engine = SnapEngine::default();
        engine.config_mut().enabled_types.set(SnapType::Midpoint, false);
        let result = engine.find_snap_point(Point2::new(51.0, 0.0), &shapes, &[], 1.0);
        assert!(result.is_none());
    }

    #[test]
    fn test_excluded_shape_not_snapped() {
        let shapes = vec![line("l", (0.0, 0.0), (100.0, 0.0))];
        let engine = SnapEngine::default();
        let exclude = [ShapeId::from("l")];
        let result = engine.find_snap_point(Point2::new(1.0, 0.0), &shapes, &exclude, 1.0);
        assert!(result.is_none());
    }

    #[test]
    fn test_inference_aligns_both_axes() {
        let shapes = vec![
            line("a", (0.0, 0.0), (0.0, -40.0)),
            line("b", (60.0, 52.0), (90.0, 52.0)),
        ];
        let engine = SnapEngine::default();
        let result = engine.resolve(Point2::new(2.0, 50.0), &shapes, &[], 1.0);
        assert!(result.snap.is_none());
        assert_eq!(result.point, Point2::new(0.0, 52.0));
        assert_eq!(result.inference.len(), 2);
        assert!(result.inference.iter().all(|l| l.to == result.point));
    }

    #[test]
    fn test_inference_respects_window() {
        let shapes = vec![line("a", (0.0, 0.0), (0.0, -10.0))];
        let engine = SnapEngine::default();
        let result = engine.resolve(Point2::new(2.0, 400.0), &shapes, &[], 1.0);
        assert_eq!(result.point, Point2::new(2.0, 400.0));
        assert!(result.inference.is_empty());
    }

    #[test]
    fn test_apply_ortho() {
        let anchor = Point2::new(0.0, 0.0);
        assert_eq!(apply_ortho(anchor, Point2::new(10.0, 3.0)), Point2::new(10.0, 0.0));
        assert_eq!(apply_ortho(anchor, Point2::new(-2.0, 8.0)), Point2::new(0.0, 8.0));
    }
}
