//! 绘制尺寸标注 Action
//!
//! 线性标注：第一点、第二点、标注位置；直接点击线段或矩形边时跳过前两步。
//! 半径/直径标注：点击圆，再放置标注位置。

use crate::action::{Action, ActionContext, ActionResult, ActionType, PreviewGeometry};
use draft_core::geometry::{Dimension, DimensionKind, Geometry, Line};
use draft_core::hit::hit_test;
use draft_core::intersect::distance_to_segment;
use draft_core::math::{distance, normalize_or_zero, Point2, Vector2};
use draft_core::update::MIN_EXTENT;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    /// 等待第一点（或点击目标）
    SetFirst,
    /// 等待第二点
    SetSecond,
    /// 等待标注位置
    SetOffset,
}

/// 绘制尺寸标注 Action
pub struct DrawDimensionAction {
    kind: DimensionKind,
    status: Status,
    p1: Option<Point2>,
    p2: Option<Point2>,
    /// 半径/直径标注的目标圆半径
    radius: f64,
}

impl DrawDimensionAction {
    pub fn new(kind: DimensionKind) -> Self {
        Self {
            kind,
            status: Status::SetFirst,
            p1: None,
            p2: None,
            radius: 0.0,
        }
    }

    pub fn linear() -> Self {
        Self::new(DimensionKind::Linear)
    }

    fn is_linear(&self) -> bool {
        self.kind == DimensionKind::Linear
    }

    /// 光标下可直接标注的边（线段、矩形边、标题栏边、圆的水平直径）
    fn hovered_edge(ctx: &ActionContext) -> Option<(Point2, Point2)> {
        let shape = hit_test(ctx.shapes, ctx.raw, ctx.pick_tolerance(), &[])?;
        if let Geometry::Circle(c) = &shape.geometry {
            let center = c.center();
            let half = Vector2::new(c.r, 0.0);
            return Some((center - half, center + half));
        }
        shape
            .geometry
            .segments()
            .into_iter()
            .min_by(|a, b| {
                distance_to_segment(ctx.raw, a.0, a.1)
                    .total_cmp(&distance_to_segment(ctx.raw, b.0, b.1))
            })
    }

    /// 光标下的圆：(圆心, 半径)
    fn hovered_circle(ctx: &ActionContext) -> Option<(Point2, f64)> {
        match &hit_test(ctx.shapes, ctx.raw, ctx.pick_tolerance(), &[])?.geometry {
            Geometry::Circle(c) => Some((c.center(), c.r)),
            _ => None,
        }
    }

    /// 当前光标位置下的标注
    fn dimension_at(&self, cursor: Point2) -> Option<Dimension> {
        let p1 = self.p1?;
        if self.is_linear() {
            return Some(Dimension::new(self.kind, p1, self.p2?, cursor));
        }
        let mut dir = normalize_or_zero(cursor - p1);
        if dir == Vector2::zeros() {
            dir = Vector2::new(1.0, 0.0);
        }
        Some(Dimension::new(self.kind, p1, p1 + dir * self.radius, cursor))
    }
}

impl Action for DrawDimensionAction {
    fn action_type(&self) -> ActionType {
        match self.kind {
            DimensionKind::Linear => ActionType::DrawDimension,
            DimensionKind::Radial => ActionType::DrawDimensionRadius,
            DimensionKind::Diameter => ActionType::DrawDimensionDiameter,
        }
    }

    fn reset(&mut self) {
        self.status = Status::SetFirst;
        self.p1 = None;
        self.p2 = None;
        self.radius = 0.0;
    }

    fn is_busy(&self) -> bool {
        self.status != Status::SetFirst
    }

    fn on_pointer_down(&mut self, ctx: &ActionContext) -> ActionResult {
        match self.status {
            Status::SetFirst if self.is_linear() => {
                // 捕捉到具体点时按点标注，否则尝试直接标注光标下的边
                match (!ctx.snapped).then(|| Self::hovered_edge(ctx)).flatten() {
                    Some((a, b)) => {
                        self.p1 = Some(a);
                        self.p2 = Some(b);
                        self.status = Status::SetOffset;
                    }
                    None => {
                        self.p1 = Some(ctx.cursor);
                        self.status = Status::SetSecond;
                    }
                }
                ActionResult::Continue
            }
            Status::SetFirst => {
                if let Some((center, r)) = Self::hovered_circle(ctx) {
                    self.p1 = Some(center);
                    self.radius = r;
                    self.status = Status::SetOffset;
                }
                ActionResult::Continue
            }
            Status::SetSecond => {
                if self.p1.is_some_and(|p1| distance(p1, ctx.cursor) >= MIN_EXTENT) {
                    self.p2 = Some(ctx.cursor);
                    self.status = Status::SetOffset;
                }
                ActionResult::Continue
            }
            Status::SetOffset => {
                let dimension = self.dimension_at(ctx.cursor);
                self.reset();
                match dimension {
                    Some(d) => ActionResult::CreateShapes(vec![Geometry::Dimension(d)]),
                    None => ActionResult::Continue,
                }
            }
        }
    }

    fn get_prompt(&self) -> &str {
        match (self.status, self.is_linear()) {
            (Status::SetFirst, true) => "Specify first point or pick an edge",
            (Status::SetFirst, false) => "Pick a circle",
            (Status::SetSecond, _) => "Specify second point",
            (Status::SetOffset, _) => "Specify dimension position",
        }
    }

    fn get_preview(&self, ctx: &ActionContext) -> Vec<PreviewGeometry> {
        match (self.status, self.p1) {
            (Status::SetSecond, Some(p1)) => vec![PreviewGeometry::reference(Geometry::Line(
                Line::new(p1, ctx.cursor),
            ))],
            (Status::SetOffset, _) => self
                .dimension_at(ctx.cursor)
                .map(|d| PreviewGeometry::new(Geometry::Dimension(d)))
                .into_iter()
                .collect(),
            _ => vec![],
        }
    }

    fn anchor(&self) -> Option<Point2> {
        match self.status {
            Status::SetSecond => self.p1,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::test_support::{circle, line, Harness};

    fn created_dimension(result: ActionResult) -> Dimension {
        match result {
            ActionResult::CreateShapes(mut shapes) => match shapes.pop() {
                Some(Geometry::Dimension(d)) => d,
                other => panic!("unexpected geometry: {other:?}"),
            },
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_linear_three_clicks() {
        let h = Harness::new(vec![]);
        let mut action = DrawDimensionAction::linear();

        action.on_pointer_down(&h.ctx(0.0, 0.0));
        action.on_pointer_down(&h.ctx(100.0, 0.0));
        let d = created_dimension(action.on_pointer_down(&h.ctx(50.0, -20.0)));

        assert_eq!(d.p1, Point2::new(0.0, 0.0));
        assert_eq!(d.p2, Point2::new(100.0, 0.0));
        assert_eq!(d.offset_point, Point2::new(50.0, -20.0));
        assert_eq!(d.display_text(), "100.00");
    }

    #[test]
    fn test_click_on_edge_skips_to_offset() {
        let h = Harness::new(vec![line("a", (0.0, 0.0), (60.0, 0.0))]);
        let mut action = DrawDimensionAction::linear();

        action.on_pointer_down(&h.ctx(30.0, 1.0));
        assert_eq!(action.get_prompt(), "Specify dimension position");

        let d = created_dimension(action.on_pointer_down(&h.ctx(30.0, 15.0)));
        assert_eq!(d.p1, Point2::new(0.0, 0.0));
        assert_eq!(d.p2, Point2::new(60.0, 0.0));
    }

    #[test]
    fn test_radius_dimension_needs_circle() {
        let h = Harness::new(vec![circle("c", (0.0, 0.0), 20.0)]);
        let mut action = DrawDimensionAction::new(DimensionKind::Radial);

        action.on_pointer_down(&h.ctx(100.0, 100.0));
        assert!(!action.is_busy());

        action.on_pointer_down(&h.ctx(20.0, 0.0));
        assert!(action.is_busy());
        let d = created_dimension(action.on_pointer_down(&h.ctx(40.0, 0.0)));

        assert_eq!(d.sub_type, DimensionKind::Radial);
        assert!((distance(d.p2, Point2::new(20.0, 0.0))) < 1e-9);
        assert_eq!(d.display_text(), "R20.00");
    }

    #[test]
    fn test_diameter_text() {
        let h = Harness::new(vec![circle("c", (0.0, 0.0), 5.0)]);
        let mut action = DrawDimensionAction::new(DimensionKind::Diameter);

        action.on_pointer_down(&h.ctx(0.0, 5.0));
        let d = created_dimension(action.on_pointer_down(&h.ctx(0.0, 30.0)));
        assert_eq!(d.display_text(), "Ø10.00");
        assert_eq!(action.action_type(), ActionType::DrawDimensionDiameter);
    }
}
