//! 求交与拟合
//!
//! 纯函数集合。退化输入一律返回约定的哨兵值（`None` 或空列表），从不 panic。

use crate::math::{
    angle_between, cross, normalize_degrees, polar_to_cartesian, Point2, Vector2, EPSILON,
};

/// 射线求交时排除起点本身的最小参数
pub const RAY_EPSILON: f64 = 1e-6;

/// 线段与圆的两个根视为重合的阈值
const ROOT_MERGE_DISTANCE: f64 = 1e-4;

/// 三点共线判定阈值
const COLLINEAR_EPSILON: f64 = 1e-6;

/// 点在线段 ab 上的投影参数（不截断）
pub fn segment_param(p: Point2, a: Point2, b: Point2) -> f64 {
    let v = b - a;
    let len2 = v.dot(&v);
    if len2 < EPSILON {
        return 0.0;
    }
    (p - a).dot(&v) / len2
}

/// 线段上离 p 最近的点
pub fn closest_point_on_segment(p: Point2, a: Point2, b: Point2) -> Point2 {
    let t = segment_param(p, a, b).clamp(0.0, 1.0);
    a + (b - a) * t
}

/// 点到线段的距离
pub fn distance_to_segment(p: Point2, a: Point2, b: Point2) -> f64 {
    (p - closest_point_on_segment(p, a, b)).norm()
}

/// 点是否在线段上（投影参数必须落在 [0, 1] 内）
pub fn point_on_segment(p: Point2, a: Point2, b: Point2, tolerance: f64) -> bool {
    let v = b - a;
    if v.dot(&v) < EPSILON {
        return (p - a).norm() <= tolerance;
    }
    let t = segment_param(p, a, b);
    if !(0.0..=1.0).contains(&t) {
        return false;
    }
    (p - (a + v * t)).norm() <= tolerance
}

/// 线段-线段求交参数 `(ua, ub)`，平行或重合时返回 `None`
pub fn segment_segment_params(
    a1: Point2,
    a2: Point2,
    b1: Point2,
    b2: Point2,
) -> Option<(f64, f64)> {
    let denom = (b2.y - b1.y) * (a2.x - a1.x) - (b2.x - b1.x) * (a2.y - a1.y);
    if denom.abs() < EPSILON {
        return None;
    }
    let ua = ((b2.x - b1.x) * (a1.y - b1.y) - (b2.y - b1.y) * (a1.x - b1.x)) / denom;
    let ub = ((a2.x - a1.x) * (a1.y - b1.y) - (a2.y - a1.y) * (a1.x - b1.x)) / denom;
    if (0.0..=1.0).contains(&ua) && (0.0..=1.0).contains(&ub) {
        Some((ua, ub))
    } else {
        None
    }
}

/// 线段-线段交点
pub fn segment_segment(a1: Point2, a2: Point2, b1: Point2, b2: Point2) -> Option<Point2> {
    segment_segment_params(a1, a2, b1, b2).map(|(ua, _)| a1 + (a2 - a1) * ua)
}

/// 线段-圆求交参数（沿 a→b 方向，已排序，仅保留 [0, 1] 内的根）
pub fn segment_circle_params(a: Point2, b: Point2, center: Point2, radius: f64) -> Vec<f64> {
    let d = b - a;
    let f = a - center;
    let qa = d.dot(&d);
    if qa < EPSILON {
        return vec![];
    }
    let qb = 2.0 * f.dot(&d);
    let qc = f.dot(&f) - radius * radius;
    let disc = qb * qb - 4.0 * qa * qc;
    if disc < 0.0 {
        return vec![];
    }

    let sqrt = disc.sqrt();
    let t1 = (-qb - sqrt) / (2.0 * qa);
    let t2 = (-qb + sqrt) / (2.0 * qa);

    let mut params = Vec::with_capacity(2);
    if (0.0..=1.0).contains(&t1) {
        params.push(t1);
    }
    if (0.0..=1.0).contains(&t2) {
        let merged = params
            .first()
            .is_some_and(|&t| ((t2 - t) * qa.sqrt()).abs() < ROOT_MERGE_DISTANCE);
        if !merged {
            params.push(t2);
        }
    }
    params
}

/// 线段-圆交点（0、1 或 2 个）
pub fn segment_circle(a: Point2, b: Point2, center: Point2, radius: f64) -> Vec<Point2> {
    segment_circle_params(a, b, center, radius)
        .into_iter()
        .map(|t| a + (b - a) * t)
        .collect()
}

/// 圆-圆交点；相离、内含或同心时返回空
pub fn circle_circle(c1: Point2, r1: f64, c2: Point2, r2: f64) -> Vec<Point2> {
    let delta = c2 - c1;
    let d = delta.norm();
    if d < EPSILON || d > r1 + r2 || d < (r1 - r2).abs() {
        return vec![];
    }

    // 根轴构造
    let a = (r1 * r1 - r2 * r2 + d * d) / (2.0 * d);
    let h = (r1 * r1 - a * a).max(0.0).sqrt();
    let dir = delta / d;
    let base = c1 + dir * a;
    let perp = Vector2::new(-dir.y, dir.x);

    if h < EPSILON {
        vec![base]
    } else {
        vec![base + perp * h, base - perp * h]
    }
}

/// 射线-线段求交，返回射线参数 t（t ≥ 0）
pub fn ray_segment(origin: Point2, dir: Vector2, a: Point2, b: Point2) -> Option<f64> {
    let seg = b - a;
    let denom = cross(dir, seg);
    if denom.abs() < EPSILON {
        return None;
    }
    let w = a - origin;
    let t = cross(w, seg) / denom;
    let u = cross(w, dir) / denom;
    if t >= 0.0 && (0.0..=1.0).contains(&u) {
        Some(t)
    } else {
        None
    }
}

/// 射线-圆的所有前向根（> `RAY_EPSILON`，升序）
pub fn ray_circle_roots(origin: Point2, dir: Vector2, center: Point2, radius: f64) -> Vec<f64> {
    let f = origin - center;
    let qa = dir.dot(&dir);
    if qa < EPSILON {
        return vec![];
    }
    let qb = 2.0 * f.dot(&dir);
    let qc = f.dot(&f) - radius * radius;
    let disc = qb * qb - 4.0 * qa * qc;
    if disc < 0.0 {
        return vec![];
    }
    let sqrt = disc.sqrt();
    let t1 = (-qb - sqrt) / (2.0 * qa);
    let t2 = (-qb + sqrt) / (2.0 * qa);
    [t1, t2].into_iter().filter(|&t| t > RAY_EPSILON).collect()
}

/// 射线-圆求交，返回最小的前向根
pub fn ray_circle(origin: Point2, dir: Vector2, center: Point2, radius: f64) -> Option<f64> {
    ray_circle_roots(origin, dir, center, radius).first().copied()
}

/// 三点拟合圆，返回 `(圆心, 半径)`；三点共线时返回 `None`
///
/// 调用方据此退化为直线。
pub fn circle_from_three_points(p1: Point2, p2: Point2, p3: Point2) -> Option<(Point2, f64)> {
    let d = 2.0 * (p1.x * (p2.y - p3.y) + p2.x * (p3.y - p1.y) + p3.x * (p1.y - p2.y));
    if d.abs() < COLLINEAR_EPSILON {
        return None;
    }

    let s1 = p1.x * p1.x + p1.y * p1.y;
    let s2 = p2.x * p2.x + p2.y * p2.y;
    let s3 = p3.x * p3.x + p3.y * p3.y;

    let ux = (s1 * (p2.y - p3.y) + s2 * (p3.y - p1.y) + s3 * (p1.y - p2.y)) / d;
    let uy = (s1 * (p3.x - p2.x) + s2 * (p1.x - p3.x) + s3 * (p2.x - p1.x)) / d;

    let center = Point2::new(ux, uy);
    Some((center, (p1 - center).norm()))
}

/// 由依次经过的三点和已知圆心求弧的 `(起始角, 终止角)`
///
/// 结果总是逆时针（视觉）方向的角度对：若 p1→p2→p3 是顺时针经过，
/// 则交换为 p3→p1。
pub fn arc_angles_from_three_points(
    center: Point2,
    p1: Point2,
    p2: Point2,
    p3: Point2,
) -> (f64, f64) {
    let a1 = angle_between(center, p1);
    let a2 = angle_between(center, p2);
    let a3 = angle_between(center, p3);

    let sweep_to_end = normalize_degrees(a3 - a1);
    let sweep_to_mid = normalize_degrees(a2 - a1);

    if sweep_to_mid <= sweep_to_end {
        (a1, a3)
    } else {
        (a3, a1)
    }
}

/// 逆时针弧的扫掠角（0..360）
pub fn arc_sweep(start_angle: f64, end_angle: f64) -> f64 {
    let sweep = normalize_degrees(end_angle - start_angle);
    if sweep < EPSILON {
        360.0
    } else {
        sweep
    }
}

/// 角度是否落在逆时针弧 [start, end] 内
pub fn arc_contains_angle(start_angle: f64, end_angle: f64, angle: f64) -> bool {
    normalize_degrees(angle - start_angle) <= arc_sweep(start_angle, end_angle) + 1e-9
}

/// SVG 弧路径描述（仅用于渲染与导出）
pub fn describe_arc(center: Point2, radius: f64, start_angle: f64, end_angle: f64) -> String {
    let sweep = arc_sweep(start_angle, end_angle);
    if sweep >= 360.0 - EPSILON {
        // 整圆拆成两段半圆
        let a = polar_to_cartesian(center, radius, 0.0);
        let b = polar_to_cartesian(center, radius, 180.0);
        return format!(
            "M {} {} A {r} {r} 0 1 0 {} {} A {r} {r} 0 1 0 {} {}",
            a.x,
            a.y,
            b.x,
            b.y,
            a.x,
            a.y,
            r = radius
        );
    }
    let start = polar_to_cartesian(center, radius, start_angle);
    let end = polar_to_cartesian(center, radius, end_angle);
    let large_arc = u8::from(sweep > 180.0);
    // Y 轴向下时视觉逆时针对应 sweep-flag = 0
    format!(
        "M {} {} A {r} {r} 0 {} 0 {} {}",
        start.x,
        start.y,
        large_arc,
        end.x,
        end.y,
        r = radius
    )
}
