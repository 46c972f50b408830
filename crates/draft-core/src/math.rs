//! 数学基础类型
//!
//! 世界坐标采用 Y 轴向下（屏幕式）约定。所有角度函数都对此做了补偿，
//! 保证正角度在视觉上总是逆时针，0° 指向 +X 方向，单位为度。

use serde::{Deserialize, Serialize};

/// 二维点
pub type Point2 = nalgebra::Point2<f64>;

/// 二维向量
pub type Vector2 = nalgebra::Vector2<f64>;

/// 通用浮点容差
pub const EPSILON: f64 = 1e-10;

/// 轴对齐包围盒
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox2 {
    #[serde(with = "xy")]
    pub min: Point2,
    #[serde(with = "xy")]
    pub max: Point2,
}

impl BoundingBox2 {
    pub fn new(min: Point2, max: Point2) -> Self {
        Self { min, max }
    }

    /// 空包围盒（min > max），与任何点合并后即为该点
    pub fn empty() -> Self {
        Self {
            min: Point2::new(f64::MAX, f64::MAX),
            max: Point2::new(f64::MIN, f64::MIN),
        }
    }

    pub fn from_points(points: impl IntoIterator<Item = Point2>) -> Self {
        let mut bbox = Self::empty();
        for p in points {
            bbox.expand_to_include(&p);
        }
        bbox
    }

    /// 由任意两个对角点构造
    pub fn from_corners(a: Point2, b: Point2) -> Self {
        Self::from_points([a, b])
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    pub fn expand_to_include(&mut self, p: &Point2) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
    }

    pub fn union(&self, other: &BoundingBox2) -> BoundingBox2 {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        BoundingBox2::new(
            Point2::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            Point2::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        )
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Point2 {
        Point2::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }

    pub fn contains(&self, p: &Point2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn intersects(&self, other: &BoundingBox2) -> bool {
        !(self.is_empty()
            || other.is_empty()
            || other.min.x > self.max.x
            || other.max.x < self.min.x
            || other.min.y > self.max.y
            || other.max.y < self.min.y)
    }

    /// 向四周扩展
    pub fn expanded(&self, margin: f64) -> BoundingBox2 {
        BoundingBox2::new(
            Point2::new(self.min.x - margin, self.min.y - margin),
            Point2::new(self.max.x + margin, self.max.y + margin),
        )
    }
}

/// 两点距离
pub fn distance(a: Point2, b: Point2) -> f64 {
    (b - a).norm()
}

/// 两点中点
pub fn midpoint(a: Point2, b: Point2) -> Point2 {
    Point2::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}

/// 单位化向量；零向量返回零向量，从不除零
pub fn normalize_or_zero(v: Vector2) -> Vector2 {
    let len = v.norm();
    if len < EPSILON {
        Vector2::zeros()
    } else {
        v / len
    }
}

/// 垂直向量（旋转 90°）
pub fn perpendicular(v: Vector2) -> Vector2 {
    Vector2::new(-v.y, v.x)
}

/// 二维叉积
pub fn cross(a: Vector2, b: Vector2) -> f64 {
    a.x * b.y - a.y * b.x
}

/// 角度归一化到 [0, 360)
pub fn normalize_degrees(angle: f64) -> f64 {
    let a = angle.rem_euclid(360.0);
    if a >= 360.0 {
        0.0
    } else {
        a
    }
}

/// 角度差归一化到 (-180, 180]
pub fn wrap_delta_degrees(delta: f64) -> f64 {
    let d = normalize_degrees(delta);
    if d > 180.0 {
        d - 360.0
    } else {
        d
    }
}

/// 向量角度（度，[0, 360)，视觉逆时针）
pub fn angle_of(v: Vector2) -> f64 {
    normalize_degrees((-v.y).atan2(v.x).to_degrees())
}

/// 从 `from` 指向 `to` 的角度
pub fn angle_between(from: Point2, to: Point2) -> f64 {
    angle_of(to - from)
}

/// 绕中心旋转点，正角度为视觉逆时针
///
/// Y 轴向下时标准旋转矩阵表现为顺时针，因此这里先对角度取反。
pub fn rotate_point(point: Point2, center: Point2, angle_deg: f64) -> Point2 {
    let a = (-angle_deg).to_radians();
    let (sin, cos) = a.sin_cos();
    let d = point - center;
    Point2::new(
        center.x + d.x * cos - d.y * sin,
        center.y + d.x * sin + d.y * cos,
    )
}

/// 极坐标转直角坐标（角度为视觉逆时针）
pub fn polar_to_cartesian(center: Point2, radius: f64, angle_deg: f64) -> Point2 {
    let a = angle_deg.to_radians();
    Point2::new(center.x + radius * a.cos(), center.y - radius * a.sin())
}

/// 点的两个分量是否都是有限数
pub fn is_finite_point(p: &Point2) -> bool {
    p.x.is_finite() && p.y.is_finite()
}

/// `{ "x": .., "y": .. }` 形式的点序列化
pub mod xy {
    use super::Point2;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    struct Xy {
        x: f64,
        y: f64,
    }

    pub fn serialize<S: Serializer>(p: &Point2, serializer: S) -> Result<S::Ok, S::Error> {
        Xy { x: p.x, y: p.y }.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Point2, D::Error> {
        let xy = Xy::deserialize(deserializer)?;
        Ok(Point2::new(xy.x, xy.y))
    }

    /// 可选点
    pub mod option {
        use super::{Point2, Xy};
        use serde::{Deserialize, Deserializer, Serialize, Serializer};

        pub fn serialize<S: Serializer>(
            p: &Option<Point2>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            p.map(|p| Xy { x: p.x, y: p.y }).serialize(serializer)
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Point2>, D::Error> {
            let xy = Option::<Xy>::deserialize(deserializer)?;
            Ok(xy.map(|xy| Point2::new(xy.x, xy.y)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-9;

    fn approx(a: Point2, b: Point2) -> bool {
        (a - b).norm() < TOL
    }

    #[test]
    fn test_normalize_zero_vector() {
        assert_eq!(normalize_or_zero(Vector2::zeros()), Vector2::zeros());
        let n = normalize_or_zero(Vector2::new(3.0, 4.0));
        assert!((n.norm() - 1.0).abs() < TOL);
    }

    #[test]
    fn test_angle_is_counter_clockwise_in_y_down() {
        // 屏幕上方（y 减小）为 90°
        assert!((angle_of(Vector2::new(0.0, -1.0)) - 90.0).abs() < TOL);
        assert!((angle_of(Vector2::new(-1.0, 0.0)) - 180.0).abs() < TOL);
        assert!((angle_of(Vector2::new(0.0, 1.0)) - 270.0).abs() < TOL);
        assert!(angle_of(Vector2::new(1.0, 0.0)).abs() < TOL);
    }

    #[test]
    fn test_rotate_point_positive_is_visual_ccw() {
        let p = rotate_point(Point2::new(10.0, 0.0), Point2::origin(), 90.0);
        assert!(approx(p, Point2::new(0.0, -10.0)));
        assert!((angle_between(Point2::origin(), p) - 90.0).abs() < TOL);
    }

    #[test]
    fn test_rotate_round_trip() {
        let center = Point2::new(3.0, -7.0);
        let p = Point2::new(12.5, 4.25);
        for step in 0..36 {
            let theta = step as f64 * 10.0;
            let back = rotate_point(rotate_point(p, center, theta), center, -theta);
            assert!(approx(back, p), "theta = {theta}");
        }
    }

    #[test]
    fn test_polar_matches_angle_of() {
        let c = Point2::new(5.0, 5.0);
        let p = polar_to_cartesian(c, 2.0, 135.0);
        assert!((angle_between(c, p) - 135.0).abs() < 1e-9);
        assert!((distance(c, p) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_wrap_delta() {
        assert!((wrap_delta_degrees(270.0) + 90.0).abs() < TOL);
        assert!((wrap_delta_degrees(-190.0) - 170.0).abs() < TOL);
        assert!((wrap_delta_degrees(180.0) - 180.0).abs() < TOL);
    }

    #[test]
    fn test_bbox_union_and_intersects() {
        let a = BoundingBox2::from_corners(Point2::new(0.0, 0.0), Point2::new(10.0, 10.0));
        let b = BoundingBox2::from_corners(Point2::new(20.0, 5.0), Point2::new(5.0, 30.0));
        let u = a.union(&b);
        assert_eq!(u.min, Point2::new(0.0, 0.0));
        assert_eq!(u.max, Point2::new(20.0, 30.0));
        assert!(a.intersects(&b));
        assert!(!BoundingBox2::empty().intersects(&a));
    }

    #[test]
    fn test_xy_serde() {
        #[derive(Serialize, Deserialize)]
        struct Wrapper {
            #[serde(with = "xy")]
            p: Point2,
        }
        let json = serde_json::to_string(&Wrapper { p: Point2::new(1.5, -2.0) }).unwrap();
        assert_eq!(json, r#"{"p":{"x":1.5,"y":-2.0}}"#);
        let back: Wrapper = serde_json::from_str(&json).unwrap();
        assert_eq!(back.p, Point2::new(1.5, -2.0));
    }
}
