//! 视图变换（平移 + 缩放）
//!
//! `screen = world * scale + (x, y)`，世界坐标与屏幕坐标都是 Y 向下，无需翻转。

use crate::math::{BoundingBox2, Point2, Vector2};
use serde::{Deserialize, Serialize};

/// 视图配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub min_scale: f64,
    pub max_scale: f64,
    /// 滚轮每格缩放倍数
    pub wheel_step: f64,
    /// 缩放到全部时四周留白（屏幕像素）
    pub fit_margin: f64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.05,
            max_scale: 200.0,
            wheel_step: 1.1,
            fit_margin: 20.0,
        }
    }
}

impl ViewConfig {
    pub fn clamp_scale(&self, scale: f64) -> f64 {
        if scale.is_finite() {
            scale.clamp(self.min_scale, self.max_scale)
        } else {
            1.0
        }
    }
}

/// 视图变换
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale: 1.0,
        }
    }
}

impl ViewTransform {
    /// 世界原点位于视口中心，比例 1
    pub fn centered(viewport_width: f64, viewport_height: f64) -> Self {
        Self {
            x: viewport_width / 2.0,
            y: viewport_height / 2.0,
            scale: 1.0,
        }
    }

    fn translation(&self) -> Vector2 {
        Vector2::new(self.x, self.y)
    }

    /// 屏幕 → 世界
    pub fn screen_to_world(&self, screen: Point2) -> Point2 {
        (screen - self.translation()) / self.scale
    }

    /// 世界 → 屏幕
    pub fn world_to_screen(&self, world: Point2) -> Point2 {
        world * self.scale + self.translation()
    }

    /// 屏幕距离换算为世界距离
    pub fn screen_dist_to_world(&self, pixels: f64) -> f64 {
        pixels / self.scale
    }

    /// 平移（屏幕像素）
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
    }

    /// 以光标为锚点缩放，光标下的世界点保持不动
    pub fn zoom_at(&mut self, cursor: Point2, factor: f64, config: &ViewConfig) {
        let new_scale = config.clamp_scale(self.scale * factor);
        let ratio = new_scale / self.scale;
        self.x = cursor.x - (cursor.x - self.x) * ratio;
        self.y = cursor.y - (cursor.y - self.y) * ratio;
        self.scale = new_scale;
    }

    /// 滚轮缩放：`steps` 为正时放大
    pub fn zoom_wheel(&mut self, cursor: Point2, steps: f64, config: &ViewConfig) {
        self.zoom_at(cursor, config.wheel_step.powf(steps), config);
    }

    /// 复位到视口中心，比例 1
    pub fn reset(&mut self, viewport_width: f64, viewport_height: f64) {
        *self = Self::centered(viewport_width, viewport_height);
    }

    /// 缩放到全部：让包围盒居中充满视口
    pub fn zoom_to_fit(
        bounds: &BoundingBox2,
        viewport_width: f64,
        viewport_height: f64,
        config: &ViewConfig,
    ) -> Self {
        if bounds.is_empty() {
            return Self::centered(viewport_width, viewport_height);
        }
        let margin = config.fit_margin * 2.0;
        let sx = (viewport_width - margin).max(1.0) / bounds.width().max(1.0);
        let sy = (viewport_height - margin).max(1.0) / bounds.height().max(1.0);
        let scale = config.clamp_scale(sx.min(sy));
        let c = bounds.center();
        Self {
            x: viewport_width / 2.0 - c.x * scale,
            y: viewport_height / 2.0 - c.y * scale,
            scale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let view = ViewTransform {
            x: 123.0,
            y: -45.0,
            scale: 2.5,
        };
        for p in [Point2::new(0.0, 0.0), Point2::new(-17.3, 88.1), Point2::new(1e4, -3e3)] {
            let back = view.screen_to_world(view.world_to_screen(p));
            assert!((back - p).norm() < 1e-9);
        }
    }

    #[test]
    fn test_zoom_keeps_cursor_anchor() {
        let config = ViewConfig::default();
        let mut view = ViewTransform::centered(800.0, 600.0);
        let cursor = Point2::new(600.0, 100.0);
        let before = view.screen_to_world(cursor);
        view.zoom_at(cursor, 3.0, &config);
        let after = view.screen_to_world(cursor);
        assert!((before - after).norm() < 1e-9);
        assert_eq!(view.scale, 3.0);
    }

    #[test]
    fn test_scale_clamped() {
        let config = ViewConfig::default();
        let mut view = ViewTransform::default();
        view.zoom_at(Point2::origin(), 1e6, &config);
        assert_eq!(view.scale, 200.0);
        view.zoom_at(Point2::origin(), 1e-9, &config);
        assert_eq!(view.scale, 0.05);
    }

    #[test]
    fn test_zoom_to_fit_centers_bounds() {
        let config = ViewConfig::default();
        let bounds = BoundingBox2::from_corners(Point2::new(100.0, 100.0), Point2::new(300.0, 200.0));
        let view = ViewTransform::zoom_to_fit(&bounds, 840.0, 440.0, &config);
        assert!((view.scale - 4.0).abs() < 1e-9);
        let center = view.world_to_screen(bounds.center());
        assert!((center - Point2::new(420.0, 220.0)).norm() < 1e-9);
    }
}
