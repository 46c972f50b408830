//! 几何变换：平移、绕点旋转、控制柄缩放
//!
//! 所有函数都返回新的几何值，不修改输入，拖拽预览因此不会与已提交的图形共享数据。

use crate::geometry::{Geometry, Rectangle, TitleBlock};
use crate::math::{
    distance, midpoint, normalize_degrees, rotate_point, BoundingBox2, Point2, Vector2,
};
use crate::shape::Shape;
use std::f64::consts::SQRT_2;

/// 平移
pub fn translate(geometry: &Geometry, delta: Vector2) -> Geometry {
    let mut g = geometry.clone();
    match &mut g {
        Geometry::Line(l) => {
            l.p1 += delta;
            l.p2 += delta;
        }
        Geometry::Rectangle(r) => {
            r.x += delta.x;
            r.y += delta.y;
        }
        Geometry::Circle(c) => {
            c.cx += delta.x;
            c.cy += delta.y;
        }
        Geometry::Dimension(d) => {
            d.p1 += delta;
            d.p2 += delta;
            d.offset_point += delta;
        }
        Geometry::Text(t) => {
            t.x += delta.x;
            t.y += delta.y;
        }
        Geometry::Symbol(s) => {
            s.x += delta.x;
            s.y += delta.y;
        }
        Geometry::TitleBlock(tb) => {
            tb.x += delta.x;
            tb.y += delta.y;
        }
    }
    g
}

/// 绕枢轴旋转（视觉逆时针为正）
///
/// 图形的参考点绕枢轴公转，可旋转的图形同时自转相同角度。
/// 枢轴恰为图形自身中心时只有自转。
pub fn rotate_about(geometry: &Geometry, pivot: Point2, angle: f64) -> Geometry {
    let mut g = geometry.clone();
    match &mut g {
        Geometry::Line(l) => {
            l.p1 = rotate_point(l.p1, pivot, angle);
            l.p2 = rotate_point(l.p2, pivot, angle);
        }
        Geometry::Rectangle(r) => {
            let c = rotate_point(r.center(), pivot, angle);
            r.x = c.x - r.width / 2.0;
            r.y = c.y - r.height / 2.0;
            r.rotation = normalize_degrees(r.rotation + angle);
        }
        Geometry::Circle(c) => {
            let center = rotate_point(c.center(), pivot, angle);
            c.cx = center.x;
            c.cy = center.y;
            if let Some((s, e)) = c.arc_span() {
                c.start_angle = Some(normalize_degrees(s + angle));
                c.end_angle = Some(normalize_degrees(e + angle));
            }
        }
        Geometry::Dimension(d) => {
            d.p1 = rotate_point(d.p1, pivot, angle);
            d.p2 = rotate_point(d.p2, pivot, angle);
            d.offset_point = rotate_point(d.offset_point, pivot, angle);
        }
        Geometry::Text(t) => {
            let a = rotate_point(t.anchor(), pivot, angle);
            t.x = a.x;
            t.y = a.y;
            t.rotation = normalize_degrees(t.rotation + angle);
        }
        Geometry::Symbol(s) => {
            let c = rotate_point(s.center(), pivot, angle);
            s.x = c.x;
            s.y = c.y;
            s.rotation = normalize_degrees(s.rotation + angle);
        }
        Geometry::TitleBlock(tb) => {
            let c = rotate_point(tb.center(), pivot, angle);
            tb.x = c.x - tb.width / 2.0;
            tb.y = c.y - tb.height / 2.0;
            tb.rotation = normalize_degrees(tb.rotation + angle);
        }
    }
    g
}

/// 一组图形的包围盒
pub fn group_bounds<'a>(shapes: impl IntoIterator<Item = &'a Shape>) -> BoundingBox2 {
    shapes
        .into_iter()
        .fold(BoundingBox2::empty(), |acc, s| acc.union(&s.geometry.bounding_box()))
}

/// 旋转控制柄位置：包围盒上边中点再向外偏移
pub fn rotation_handle(bounds: &BoundingBox2, offset: f64) -> Point2 {
    Point2::new(bounds.center().x, bounds.min.y - offset)
}

/// 缩放控制柄
///
/// - 线段：两个端点
/// - 圆：圆心，然后是四个象限点（整圆）或两个弧端点（圆弧）
/// - 矩形、标题栏、符号：四个角点（已旋转）
/// - 标注：p1、p2、标注位置
/// - 文本：无
pub fn handles(geometry: &Geometry) -> Vec<Point2> {
    match geometry {
        Geometry::Line(l) => vec![l.p1, l.p2],
        Geometry::Circle(c) => {
            let mut points = vec![c.center()];
            match c.arc_endpoints() {
                Some((a, b)) => points.extend([a, b]),
                None => points.extend([0.0, 90.0, 180.0, 270.0].map(|a| c.point_at_angle(a))),
            }
            points
        }
        Geometry::Rectangle(r) => r.corners().to_vec(),
        Geometry::TitleBlock(tb) => tb.corners().to_vec(),
        Geometry::Symbol(s) => s.corners().to_vec(),
        Geometry::Dimension(d) => vec![d.p1, d.p2, d.offset_point],
        Geometry::Text(_) => vec![],
    }
}

/// 命中半径内最近的控制柄索引
pub fn handle_at(geometry: &Geometry, p: Point2, radius: f64) -> Option<usize> {
    handles(geometry)
        .into_iter()
        .enumerate()
        .map(|(i, h)| (i, distance(h, p)))
        .filter(|(_, d)| *d <= radius)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
}

/// 保持对角点不动，用拖动的角点重新计算旋转矩形的 (x, y, w, h)
///
/// 在局部坐标系（去掉旋转）下测量对角线，新中心为两个角点的中点。
fn box_from_diagonal(opposite: Point2, cursor: Point2, rotation: f64) -> (f64, f64, f64, f64) {
    let local = rotate_point(cursor, opposite, -rotation) - opposite;
    let width = local.x.abs();
    let height = local.y.abs();
    let center = midpoint(opposite, cursor);
    (center.x - width / 2.0, center.y - height / 2.0, width, height)
}

/// 用控制柄缩放，返回预览几何；控制柄无效时返回 `None`
pub fn resize(geometry: &Geometry, handle: usize, cursor: Point2) -> Option<Geometry> {
    let mut g = geometry.clone();
    match &mut g {
        Geometry::Line(l) => match handle {
            0 => l.p1 = cursor,
            1 => l.p2 = cursor,
            _ => return None,
        },
        Geometry::Circle(c) => match handle {
            0 => {
                c.cx = cursor.x;
                c.cy = cursor.y;
            }
            h if h < handles(geometry).len() => c.r = distance(c.center(), cursor),
            _ => return None,
        },
        Geometry::Rectangle(r) => {
            if handle >= 4 {
                return None;
            }
            let opposite = r.corners()[(handle + 2) % 4];
            let (x, y, width, height) = box_from_diagonal(opposite, cursor, r.rotation);
            *r = Rectangle {
                x,
                y,
                width,
                height,
                rotation: r.rotation,
            };
        }
        Geometry::TitleBlock(tb) => {
            if handle >= 4 {
                return None;
            }
            let opposite = tb.corners()[(handle + 2) % 4];
            let (x, y, width, height) = box_from_diagonal(opposite, cursor, tb.rotation);
            *tb = TitleBlock {
                x,
                y,
                width,
                height,
                ..tb.clone()
            };
        }
        Geometry::Symbol(s) => {
            if handle >= 4 {
                return None;
            }
            s.size = distance(s.center(), cursor) * SQRT_2;
        }
        Geometry::Dimension(d) => match handle {
            0 => d.p1 = cursor,
            1 => d.p2 = cursor,
            2 => d.offset_point = cursor,
            _ => return None,
        },
        Geometry::Text(_) => return None,
    }
    Some(g)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Circle, Line, Symbol, Text};
    use crate::properties::Properties;

    fn approx(a: Point2, b: Point2) -> bool {
        (a - b).norm() < 1e-9
    }

    #[test]
    fn test_translate_positional_fields() {
        let d = Vector2::new(5.0, -3.0);
        let line = translate(&Geometry::Line(Line::new(Point2::origin(), Point2::new(1.0, 1.0))), d);
        let Geometry::Line(l) = line else {
            panic!("expected line");
        };
        assert_eq!(l.p1, Point2::new(5.0, -3.0));

        let circle = translate(&Geometry::Circle(Circle::new(Point2::origin(), 2.0)), d);
        assert_eq!(circle.center(), Point2::new(5.0, -3.0));
    }

    #[test]
    fn test_single_shape_rotation_spins_in_place() {
        let rect = Geometry::Rectangle(Rectangle::new(0.0, 0.0, 20.0, 10.0));
        let rotated = rotate_about(&rect, rect.center(), 30.0);
        let Geometry::Rectangle(r) = &rotated else {
            panic!("expected rectangle");
        };
        assert!(approx(r.center(), Point2::new(10.0, 5.0)));
        assert!((r.rotation - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_group_rotation_round_trip() {
        let shapes = vec![
            Shape::with_id(
                "a",
                Geometry::Rectangle(Rectangle::new(0.0, 0.0, 20.0, 10.0)),
                Properties::default(),
            ),
            Shape::with_id(
                "b",
                Geometry::Circle(Circle::arc(Point2::new(50.0, 30.0), 5.0, 10.0, 80.0)),
                Properties::default(),
            ),
        ];
        let pivot = group_bounds(&shapes).center();
        for shape in &shapes {
            let there = rotate_about(&shape.geometry, pivot, 90.0);
            let back = rotate_about(&there, pivot, -90.0);
            match (&back, &shape.geometry) {
                (Geometry::Rectangle(a), Geometry::Rectangle(b)) => {
                    assert!((a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9);
                    assert!(a.rotation.abs() < 1e-9 || (a.rotation - 360.0).abs() < 1e-9);
                }
                (Geometry::Circle(a), Geometry::Circle(b)) => {
                    assert!(approx(a.center(), b.center()));
                    assert!((a.start_angle.unwrap() - 10.0).abs() < 1e-9);
                    assert!((a.end_angle.unwrap() - 80.0).abs() < 1e-9);
                }
                _ => panic!("kind changed"),
            }
        }
    }

    #[test]
    fn test_group_rotation_orbits_members() {
        let line = Geometry::Line(Line::new(Point2::new(10.0, 0.0), Point2::new(20.0, 0.0)));
        let rotated = rotate_about(&line, Point2::origin(), 90.0);
        let Geometry::Line(l) = rotated else {
            panic!("expected line");
        };
        // 视觉逆时针 90°：+X 转到 -Y（屏幕上方）
        assert!(approx(l.p1, Point2::new(0.0, -10.0)));
    }

    #[test]
    fn test_rotation_handle_above_bounds() {
        let bounds = BoundingBox2::from_corners(Point2::new(0.0, 10.0), Point2::new(40.0, 30.0));
        assert_eq!(rotation_handle(&bounds, 24.0), Point2::new(20.0, -14.0));
    }

    #[test]
    fn test_resize_rectangle_keeps_opposite_corner() {
        let rect = Geometry::Rectangle(Rectangle::new(0.0, 0.0, 10.0, 10.0));
        // 拖动右下角越过左上角
        let resized = resize(&rect, 2, Point2::new(-5.0, -8.0)).unwrap();
        let Geometry::Rectangle(r) = resized else {
            panic!("expected rectangle");
        };
        assert_eq!((r.x, r.y, r.width, r.height), (-5.0, -8.0, 5.0, 8.0));
    }

    #[test]
    fn test_resize_rotated_rectangle() {
        let rect = Rectangle::new(0.0, 0.0, 10.0, 10.0).with_rotation(30.0);
        let fixed = rect.corners()[0];
        let geom = Geometry::Rectangle(rect);
        let target = rotate_point(Point2::new(20.0, 15.0), Point2::new(5.0, 5.0), 30.0);
        let Some(Geometry::Rectangle(r)) = resize(&geom, 2, target) else {
            panic!("expected rectangle");
        };
        assert!(approx(r.corners()[0], fixed));
        assert!((r.width - 20.0).abs() < 1e-9);
        assert!((r.height - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_resize_circle_and_symbol() {
        let circle = Geometry::Circle(Circle::new(Point2::origin(), 5.0));
        let Some(Geometry::Circle(c)) = resize(&circle, 3, Point2::new(0.0, 12.0)) else {
            panic!("expected circle");
        };
        assert_eq!(c.r, 12.0);
        let Some(Geometry::Circle(c)) = resize(&circle, 0, Point2::new(3.0, 4.0)) else {
            panic!("expected circle");
        };
        assert_eq!((c.cx, c.cy, c.r), (3.0, 4.0, 5.0));

        let symbol = Geometry::Symbol(Symbol::new(Point2::origin(), "valve", 10.0));
        let Some(Geometry::Symbol(s)) = resize(&symbol, 1, Point2::new(10.0, 10.0)) else {
            panic!("expected symbol");
        };
        assert!((s.size - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_text_has_no_handles() {
        let text = Geometry::Text(Text::new(Point2::origin(), "A", 12.0));
        assert!(handles(&text).is_empty());
        assert!(resize(&text, 0, Point2::origin()).is_none());
        assert!(handle_at(&text, Point2::origin(), 8.0).is_none());
    }

    #[test]
    fn test_handle_at_picks_nearest() {
        let line = Geometry::Line(Line::new(Point2::origin(), Point2::new(10.0, 0.0)));
        assert_eq!(handle_at(&line, Point2::new(9.0, 1.0), 3.0), Some(1));
        assert_eq!(handle_at(&line, Point2::new(5.0, 0.0), 3.0), None);
    }
}
