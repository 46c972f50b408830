//! 修剪与延伸
//!
//! 修剪：求目标图形与其他所有图形的交点参数，排序后找出包住光标的那一段并删除。
//! - 线段：参数 t ∈ [0, 1]
//! - 矩形/标题栏：只修剪离光标最近的一条边，其余三条边作为独立线段保留
//! - 整圆：交点的角度（周期性，至少需要两个交点）
//! - 圆弧：相对起始角的角度偏移，弧自身的起止角是隐含边界
//!
//! 没有任何交点时返回 `None`，由调用方决定是否整体删除。
//!
//! 延伸：从离光标较近的端点沿线段方向发出射线，取最近的前向交点作为新端点。

use crate::geometry::{Circle, Geometry, Line};
use crate::intersect::{
    circle_circle, distance_to_segment, ray_circle_roots, ray_segment, segment_circle,
    segment_param, segment_segment_params, RAY_EPSILON,
};
use crate::math::{angle_between, distance, normalize_degrees, normalize_or_zero, Point2, Vector2};
use crate::shape::{Shape, ShapeId};
use crate::update::ShapeUpdate;
use tracing::debug;

/// 参数去重与端点排除的阈值
const PARAM_EPSILON: f64 = 1e-9;

/// 角度去重阈值（度）
const ANGLE_EPSILON: f64 = 1e-6;

/// 被删除的区间
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrimSpan {
    /// 线段（或矩形边）上的参数区间
    Segment {
        start: Point2,
        end: Point2,
        t0: f64,
        t1: f64,
    },
    /// 圆上逆时针的角度区间
    Arc { start_angle: f64, end_angle: f64 },
}

/// 修剪结果：用 `pieces` 替换 `target`
#[derive(Debug, Clone, PartialEq)]
pub struct TrimResult {
    pub target: ShapeId,
    pub removed: TrimSpan,
    pub pieces: Vec<Geometry>,
}

/// 线段端点
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnd {
    P1,
    P2,
}

/// 延伸结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtendResult {
    pub end: LineEnd,
    pub point: Point2,
}

impl ExtendResult {
    /// 对应的图形更新
    pub fn to_update(&self) -> ShapeUpdate {
        match self.end {
            LineEnd::P1 => ShapeUpdate {
                p1: Some(self.point),
                ..Default::default()
            },
            LineEnd::P2 => ShapeUpdate {
                p2: Some(self.point),
                ..Default::default()
            },
        }
    }
}

fn others<'a>(shapes: &'a [Shape], target: &'a ShapeId) -> impl Iterator<Item = &'a Shape> {
    shapes.iter().filter(move |s| &s.id != target)
}

/// 线段 ab 与其他图形的交点参数（未排序）
fn segment_crossings(a: Point2, b: Point2, shapes: &[Shape], target: &ShapeId) -> Vec<f64> {
    let mut params = Vec::new();
    for shape in others(shapes, target) {
        for (s1, s2) in shape.geometry.segments() {
            if let Some((ua, _)) = segment_segment_params(a, b, s1, s2) {
                params.push(ua);
            }
        }
        if let Geometry::Circle(c) = &shape.geometry {
            for p in segment_circle(a, b, c.center(), c.r) {
                if c.contains_angle(angle_between(c.center(), p)) {
                    params.push(segment_param(p, a, b));
                }
            }
        }
    }
    params
}

/// 圆与其他图形交点的角度（已排序、去重，范围 [0, 360)）
fn circle_crossings(circle: &Circle, shapes: &[Shape], target: &ShapeId) -> Vec<f64> {
    let center = circle.center();
    let mut points = Vec::new();
    for shape in others(shapes, target) {
        for (s1, s2) in shape.geometry.segments() {
            points.extend(segment_circle(s1, s2, center, circle.r));
        }
        if let Geometry::Circle(other) = &shape.geometry {
            points.extend(
                circle_circle(center, circle.r, other.center(), other.r)
                    .into_iter()
                    .filter(|p| other.contains_angle(angle_between(other.center(), *p))),
            );
        }
    }
    let mut angles: Vec<f64> = points
        .into_iter()
        .map(|p| angle_between(center, p))
        .collect();
    angles.sort_by(f64::total_cmp);
    angles.dedup_by(|a, b| (*a - *b).abs() < ANGLE_EPSILON);
    // 首尾跨越 0° 时也可能重复
    if angles.len() > 1 {
        if let (Some(&first), Some(&last)) = (angles.first(), angles.last()) {
            if first + 360.0 - last < ANGLE_EPSILON {
                angles.pop();
            }
        }
    }
    angles
}

/// 在有序参数表中找出包住 `t` 的相邻两项
fn bracket(params: &[f64], t: f64) -> Option<(f64, f64)> {
    params
        .windows(2)
        .find(|w| t >= w[0] && t <= w[1])
        .map(|w| (w[0], w[1]))
}

/// 修剪线段 ab，返回删除区间和剩余部分
fn trim_segment(
    a: Point2,
    b: Point2,
    cursor: Point2,
    shapes: &[Shape],
    target: &ShapeId,
) -> Option<(TrimSpan, Vec<Line>)> {
    let mut params: Vec<f64> = segment_crossings(a, b, shapes, target)
        .into_iter()
        .filter(|t| *t > PARAM_EPSILON && *t < 1.0 - PARAM_EPSILON)
        .collect();
    if params.is_empty() {
        return None;
    }
    params.push(0.0);
    params.push(1.0);
    params.sort_by(f64::total_cmp);
    params.dedup_by(|x, y| (*x - *y).abs() < PARAM_EPSILON);

    let t = segment_param(cursor, a, b).clamp(0.0, 1.0);
    let (t0, t1) = bracket(&params, t)?;
    let at = |t: f64| a + (b - a) * t;

    let mut pieces = Vec::with_capacity(2);
    if t0 > PARAM_EPSILON {
        pieces.push(Line::new(a, at(t0)));
    }
    if t1 < 1.0 - PARAM_EPSILON {
        pieces.push(Line::new(at(t1), b));
    }
    let span = TrimSpan::Segment {
        start: at(t0),
        end: at(t1),
        t0,
        t1,
    };
    Some((span, pieces))
}

fn trim_polygon(
    edges: Vec<(Point2, Point2)>,
    cursor: Point2,
    shapes: &[Shape],
    target: &ShapeId,
) -> Option<(TrimSpan, Vec<Geometry>)> {
    let nearest = edges
        .iter()
        .enumerate()
        .min_by(|x, y| {
            let dx = distance_to_segment(cursor, x.1 .0, x.1 .1);
            let dy = distance_to_segment(cursor, y.1 .0, y.1 .1);
            dx.total_cmp(&dy)
        })
        .map(|(i, _)| i)?;

    let (a, b) = edges[nearest];
    let (span, rest) = trim_segment(a, b, cursor, shapes, target)?;

    let mut pieces = Vec::with_capacity(5);
    for (i, &(p, q)) in edges.iter().enumerate() {
        if i == nearest {
            pieces.extend(rest.iter().cloned().map(Geometry::Line));
        } else {
            pieces.push(Geometry::Line(Line::new(p, q)));
        }
    }
    Some((span, pieces))
}

fn trim_circle(
    circle: &Circle,
    cursor: Point2,
    shapes: &[Shape],
    target: &ShapeId,
) -> Option<(TrimSpan, Vec<Geometry>)> {
    let center = circle.center();
    let angles = circle_crossings(circle, shapes, target);
    let cursor_angle = angle_between(center, cursor);

    match circle.arc_span() {
        None => {
            if angles.len() < 2 {
                return None;
            }
            // 周期区间：lo 为不大于光标角的最大交点，hi 为大于光标角的最小交点
            let lo = angles
                .iter()
                .rev()
                .find(|&&a| a <= cursor_angle)
                .or(angles.last())
                .copied()?;
            let hi = angles
                .iter()
                .find(|&&a| a > cursor_angle)
                .or(angles.first())
                .copied()?;
            let span = TrimSpan::Arc {
                start_angle: lo,
                end_angle: hi,
            };
            let remaining = Circle::arc(center, circle.r, hi, lo);
            Some((span, vec![Geometry::Circle(remaining)]))
        }
        Some((start, end)) => {
            let sweep = circle.sweep();
            let mut params: Vec<f64> = angles
                .iter()
                .map(|a| normalize_degrees(a - start))
                .filter(|r| *r > ANGLE_EPSILON && *r < sweep - ANGLE_EPSILON)
                .collect();
            if params.is_empty() {
                return None;
            }
            params.push(0.0);
            params.push(sweep);
            params.sort_by(f64::total_cmp);

            let mut rel = normalize_degrees(cursor_angle - start);
            if rel > sweep {
                // 光标在弧外，归到较近的一端
                rel = if rel - sweep < 360.0 - rel { sweep } else { 0.0 };
            }
            let (r0, r1) = bracket(&params, rel)?;

            let mut pieces = Vec::with_capacity(2);
            if r0 > ANGLE_EPSILON {
                pieces.push(Geometry::Circle(Circle::arc(
                    center,
                    circle.r,
                    start,
                    normalize_degrees(start + r0),
                )));
            }
            if r1 < sweep - ANGLE_EPSILON {
                pieces.push(Geometry::Circle(Circle::arc(
                    center,
                    circle.r,
                    normalize_degrees(start + r1),
                    end,
                )));
            }
            let span = TrimSpan::Arc {
                start_angle: normalize_degrees(start + r0),
                end_angle: normalize_degrees(start + r1),
            };
            Some((span, pieces))
        }
    }
}

/// 修剪目标图形中包住光标的一段
///
/// 支持线段、矩形、标题栏和圆/圆弧；其他种类或没有交点时返回 `None`。
pub fn trim(target: &Shape, shapes: &[Shape], cursor: Point2) -> Option<TrimResult> {
    let id = &target.id;
    let result = match &target.geometry {
        Geometry::Line(l) => trim_segment(l.p1, l.p2, cursor, shapes, id)
            .map(|(span, pieces)| (span, pieces.into_iter().map(Geometry::Line).collect())),
        Geometry::Rectangle(r) => trim_polygon(r.edges().to_vec(), cursor, shapes, id),
        Geometry::TitleBlock(_) => trim_polygon(target.geometry.segments(), cursor, shapes, id),
        Geometry::Circle(c) => trim_circle(c, cursor, shapes, id),
        _ => None,
    };

    match result {
        Some((removed, pieces)) => Some(TrimResult {
            target: id.clone(),
            removed,
            pieces,
        }),
        None => {
            debug!(%id, "nothing to trim");
            None
        }
    }
}

/// 沿射线寻找最近的前向交点参数
fn nearest_forward_hit(
    origin: Point2,
    dir: Vector2,
    shapes: &[Shape],
    target: &ShapeId,
) -> Option<f64> {
    let mut best: Option<f64> = None;
    let mut consider = |t: f64| {
        if t > RAY_EPSILON && best.map_or(true, |b| t < b) {
            best = Some(t);
        }
    };

    for shape in others(shapes, target) {
        for (a, b) in shape.geometry.segments() {
            if let Some(t) = ray_segment(origin, dir, a, b) {
                consider(t);
            }
        }
        if let Geometry::Circle(c) = &shape.geometry {
            let center = c.center();
            ray_circle_roots(origin, dir, center, c.r)
                .into_iter()
                .find(|&t| c.contains_angle(angle_between(center, origin + dir * t)))
                .into_iter()
                .for_each(&mut consider);
        }
    }
    best
}

/// 延伸线段：离光标较近的端点移动到最近的前向交点
pub fn extend(target: &Shape, shapes: &[Shape], cursor: Point2) -> Option<ExtendResult> {
    let Geometry::Line(line) = &target.geometry else {
        return None;
    };
    let (end, origin, other) = if distance(cursor, line.p1) < distance(cursor, line.p2) {
        (LineEnd::P1, line.p1, line.p2)
    } else {
        (LineEnd::P2, line.p2, line.p1)
    };
    let dir = normalize_or_zero(origin - other);
    if dir == Vector2::zeros() {
        return None;
    }

    let t = nearest_forward_hit(origin, dir, shapes, &target.id)?;
    Some(ExtendResult {
        end,
        point: origin + dir * t,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rectangle;
    use crate::properties::Properties;

    fn shape(id: &str, geometry: Geometry) -> Shape {
        Shape::with_id(id, geometry, Properties::default())
    }

    fn line(id: &str, a: (f64, f64), b: (f64, f64)) -> Shape {
        shape(
            id,
            Geometry::Line(Line::new(Point2::new(a.0, a.1), Point2::new(b.0, b.1))),
        )
    }

    fn approx(a: Point2, b: Point2) -> bool {
        (a - b).norm() < 1e-6
    }

    #[test]
    fn test_trim_line_removes_cursor_interval() {
        let shapes = vec![
            line("h", (0.0, 0.0), (100.0, 0.0)),
            line("v", (50.0, -50.0), (50.0, 50.0)),
        ];
        let result = trim(&shapes[0], &shapes, Point2::new(25.0, 0.0)).unwrap();
        assert_eq!(result.pieces.len(), 1);
        let Geometry::Line(rest) = &result.pieces[0] else {
            panic!("expected line");
        };
        assert!(approx(rest.p1, Point2::new(50.0, 0.0)));
        assert!(approx(rest.p2, Point2::new(100.0, 0.0)));

        let TrimSpan::Segment { t0, t1, .. } = result.removed else {
            panic!("expected segment span");
        };
        assert_eq!((t0, t1), (0.0, 0.5));
    }

    #[test]
    fn test_trim_middle_leaves_two_pieces_with_continuity() {
        let shapes = vec![
            line("h", (0.0, 0.0), (100.0, 0.0)),
            line("v1", (30.0, -5.0), (30.0, 5.0)),
            line("v2", (70.0, -5.0), (70.0, 5.0)),
        ];
        let result = trim(&shapes[0], &shapes, Point2::new(50.0, 1.0)).unwrap();
        let TrimSpan::Segment { start, end, .. } = result.removed else {
            panic!("expected segment span");
        };
        let [Geometry::Line(left), Geometry::Line(right)] = result.pieces.as_slice() else {
            panic!("expected two lines");
        };
        // 剩余部分与删除区间首尾相接，拼回原线段
        assert_eq!(left.p1, Point2::new(0.0, 0.0));
        assert!(approx(left.p2, start));
        assert!(approx(right.p1, end));
        assert_eq!(right.p2, Point2::new(100.0, 0.0));
    }

    #[test]
    fn test_trim_without_crossings_is_none() {
        let shapes = vec![
            line("a", (0.0, 0.0), (100.0, 0.0)),
            line("b", (0.0, 10.0), (100.0, 10.0)),
            // 只在端点处接触
            line("c", (100.0, 0.0), (100.0, 10.0)),
        ];
        assert!(trim(&shapes[0], &shapes, Point2::new(50.0, 0.0)).is_none());
    }

    #[test]
    fn test_trim_rectangle_nearest_edge() {
        let shapes = vec![
            shape("r", Geometry::Rectangle(Rectangle::new(0.0, 0.0, 100.0, 50.0))),
            line("cut", (40.0, -10.0), (40.0, 10.0)),
        ];
        let result = trim(&shapes[0], &shapes, Point2::new(20.0, 1.0)).unwrap();
        // 三条完整边 + 上边剩余的一段
        assert_eq!(result.pieces.len(), 4);
        assert!(result.pieces.iter().all(|g| matches!(g, Geometry::Line(_))));
        let Geometry::Line(top_rest) = &result.pieces[0] else {
            panic!("expected line");
        };
        assert!(approx(top_rest.p1, Point2::new(40.0, 0.0)));
        assert!(approx(top_rest.p2, Point2::new(100.0, 0.0)));
    }

    #[test]
    fn test_trim_full_circle_leaves_arc() {
        let shapes = vec![
            shape("c", Geometry::Circle(Circle::new(Point2::origin(), 10.0))),
            line("l", (-20.0, 0.0), (20.0, 0.0)),
        ];
        // 光标在圆心上方（90° 方向）
        let result = trim(&shapes[0], &shapes, Point2::new(0.0, -10.0)).unwrap();
        assert_eq!(
            result.removed,
            TrimSpan::Arc {
                start_angle: 0.0,
                end_angle: 180.0
            }
        );
        let [Geometry::Circle(arc)] = result.pieces.as_slice() else {
            panic!("expected one arc");
        };
        assert_eq!(arc.arc_span(), Some((180.0, 0.0)));
    }

    #[test]
    fn test_trim_full_circle_needs_two_crossings() {
        let shapes = vec![
            shape("c", Geometry::Circle(Circle::new(Point2::origin(), 10.0))),
            line("l", (0.0, 0.0), (20.0, 0.0)),
        ];
        assert!(trim(&shapes[0], &shapes, Point2::new(0.0, -10.0)).is_none());
    }

    #[test]
    fn test_trim_arc_end_piece() {
        let shapes = vec![
            shape("a", Geometry::Circle(Circle::arc(Point2::origin(), 10.0, 0.0, 180.0))),
            line("l", (0.0, 0.0), (0.0, -20.0)),
        ];
        // 光标在 45° 方向，删除 0°..90°，保留 90°..180°
        let cursor = Point2::new(7.0, -7.0);
        let result = trim(&shapes[0], &shapes, cursor).unwrap();
        let [Geometry::Circle(rest)] = result.pieces.as_slice() else {
            panic!("expected one arc");
        };
        let (s, e) = rest.arc_span().unwrap();
        assert!((s - 90.0).abs() < 1e-9);
        assert!((e - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_extend_to_nearest_forward_hit() {
        let shapes = vec![
            line("t", (0.0, 0.0), (10.0, 0.0)),
            line("near", (30.0, -5.0), (30.0, 5.0)),
            line("far", (60.0, -5.0), (60.0, 5.0)),
            line("behind", (-20.0, -5.0), (-20.0, 5.0)),
        ];
        let result = extend(&shapes[0], &shapes, Point2::new(9.0, 0.0)).unwrap();
        assert_eq!(result.end, LineEnd::P2);
        assert!(approx(result.point, Point2::new(30.0, 0.0)));

        let result = extend(&shapes[0], &shapes, Point2::new(1.0, 0.0)).unwrap();
        assert_eq!(result.end, LineEnd::P1);
        assert!(approx(result.point, Point2::new(-20.0, 0.0)));
        assert_eq!(result.to_update().p1, Some(result.point));
    }

    #[test]
    fn test_extend_to_circle_and_rectangle() {
        let shapes = vec![
            line("t", (0.0, 0.0), (10.0, 0.0)),
            shape("c", Geometry::Circle(Circle::new(Point2::new(50.0, 0.0), 5.0))),
            shape("r", Geometry::Rectangle(Rectangle::new(20.0, -5.0, 5.0, 10.0))),
        ];
        let result = extend(&shapes[0], &shapes, Point2::new(10.0, 0.0)).unwrap();
        assert!(approx(result.point, Point2::new(20.0, 0.0)));

        let shapes = vec![shapes[0].clone(), shapes[1].clone()];
        let result = extend(&shapes[0], &shapes, Point2::new(10.0, 0.0)).unwrap();
        assert!(approx(result.point, Point2::new(45.0, 0.0)));
    }

    #[test]
    fn test_extend_nothing_ahead() {
        let shapes = vec![line("t", (0.0, 0.0), (10.0, 0.0))];
        assert!(extend(&shapes[0], &shapes, Point2::new(10.0, 0.0)).is_none());
    }
    #[test]
    fn test_trim_line_ignores_arc_outside_span() {
        // 圆弧在 30°..150°（上方），与 y=0 的交点落在 0° 和 180°，不算交点
        let shapes = vec![
            line("l", (-20.0, 0.0), (20.0, 0.0)),
            shape("a", Geometry::Circle(Circle::arc(Point2::origin(), 10.0, 30.0, 150.0))),
        ];
        assert!(trim(&shapes[0], &shapes, Point2::new(0.0, 0.0)).is_none());
    }

    #[test]
    fn test_extend_passes_arc_outside_span() {
        let shapes = vec![
            line("t", (-40.0, 0.0), (-30.0, 0.0)),
            shape("a", Geometry::Circle(Circle::arc(Point2::origin(), 10.0, 30.0, 150.0))),
            line("wall", (40.0, -5.0), (40.0, 5.0)),
        ];
        let result = extend(&shapes[0], &shapes, Point2::new(-31.0, 0.0)).unwrap();
        assert_eq!(result.end, LineEnd::P2);
        assert!(approx(result.point, Point2::new(40.0, 0.0)));
    }
}
