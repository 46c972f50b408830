//! 拾取（点到图形的距离与命中测试）

use crate::geometry::{Circle, Geometry};
use crate::intersect::distance_to_segment;
use crate::math::{angle_between, distance, rotate_point, BoundingBox2, Point2};
use crate::shape::{Shape, ShapeId};

/// 局部坐标系下点到轴对齐盒的距离
///
/// `solid` 为真时盒内距离为 0，否则只计算到边框的距离。
fn distance_to_box(p: Point2, min: Point2, max: Point2, solid: bool) -> f64 {
    let inside = p.x >= min.x && p.x <= max.x && p.y >= min.y && p.y <= max.y;
    if inside {
        if solid {
            return 0.0;
        }
        let dx = (p.x - min.x).min(max.x - p.x);
        let dy = (p.y - min.y).min(max.y - p.y);
        return dx.min(dy);
    }
    let dx = (min.x - p.x).max(0.0).max(p.x - max.x);
    let dy = (min.y - p.y).max(0.0).max(p.y - max.y);
    (dx * dx + dy * dy).sqrt()
}

fn distance_to_circle(c: &Circle, p: Point2) -> f64 {
    let center = c.center();
    let radial = (distance(p, center) - c.r).abs();
    match c.arc_endpoints() {
        None => radial,
        Some(_) if c.contains_angle(angle_between(center, p)) => radial,
        Some((a, b)) => distance(p, a).min(distance(p, b)),
    }
}

/// 点到几何的距离
///
/// 可旋转的图形先把点反向旋转到局部坐标系再计算。
/// `filled` 为真时矩形内部视为命中。
pub fn distance_to_geometry(geometry: &Geometry, p: Point2, filled: bool) -> f64 {
    match geometry {
        Geometry::Line(l) => distance_to_segment(p, l.p1, l.p2),
        Geometry::Rectangle(r) => {
            let local = rotate_point(p, r.center(), -r.rotation);
            distance_to_box(
                local,
                Point2::new(r.x, r.y),
                Point2::new(r.x + r.width, r.y + r.height),
                filled,
            )
        }
        Geometry::Circle(c) => {
            if filled && !c.is_arc() && distance(p, c.center()) <= c.r {
                0.0
            } else {
                distance_to_circle(c, p)
            }
        }
        Geometry::Dimension(d) => d
            .segments()
            .into_iter()
            .map(|(a, b)| distance_to_segment(p, a, b))
            .fold(distance(p, d.offset_point), f64::min),
        Geometry::Text(t) => {
            let local = rotate_point(p, t.anchor(), -t.rotation);
            distance_to_box(
                local,
                t.anchor(),
                Point2::new(t.x + t.estimated_width(), t.y + t.font_size),
                true,
            )
        }
        Geometry::Symbol(s) => {
            let local = rotate_point(p, s.center(), -s.rotation);
            let half = s.size / 2.0;
            distance_to_box(
                local,
                Point2::new(s.x - half, s.y - half),
                Point2::new(s.x + half, s.y + half),
                true,
            )
        }
        Geometry::TitleBlock(tb) => {
            let local = rotate_point(p, tb.center(), -tb.rotation);
            distance_to_box(
                local,
                Point2::new(tb.x, tb.y),
                Point2::new(tb.x + tb.width, tb.y + tb.height),
                true,
            )
        }
    }
}

/// 点到图形的距离（考虑填充）
pub fn distance_to_shape(shape: &Shape, p: Point2) -> f64 {
    distance_to_geometry(&shape.geometry, p, shape.properties.is_filled())
}

/// 命中测试：返回容差内最近的图形
///
/// 从最上层开始遍历，距离相同时上层优先。
pub fn hit_test<'a>(
    shapes: &'a [Shape],
    p: Point2,
    tolerance: f64,
    exclude: &[ShapeId],
) -> Option<&'a Shape> {
    let mut best: Option<(&Shape, f64)> = None;
    for shape in shapes.iter().rev() {
        if exclude.contains(&shape.id) {
            continue;
        }
        let d = distance_to_shape(shape, p);
        if d > tolerance {
            continue;
        }
        if best.map_or(true, |(_, best_d)| d < best_d) {
            best = Some((shape, d));
        }
    }
    best.map(|(shape, _)| shape)
}

/// 框选：包围盒与选框相交的图形
pub fn shapes_in_box(shapes: &[Shape], area: &BoundingBox2) -> Vec<ShapeId> {
    shapes
        .iter()
        .filter(|s| s.geometry.bounding_box().intersects(area))
        .map(|s| s.id.clone())
        .collect()
}
