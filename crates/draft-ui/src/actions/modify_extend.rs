//! 延伸 Action
//!
//! 单击线段靠近要延伸的一端，端点延伸到最近的前向交点。

use crate::action::{Action, ActionContext, ActionResult, ActionType, PreviewGeometry};
use draft_core::geometry::{Geometry, Line};
use draft_core::hit::hit_test;
use draft_core::trim::{extend, LineEnd};

/// 延伸 Action
#[derive(Default)]
pub struct ExtendAction;

impl ExtendAction {
    pub fn new() -> Self {
        Self
    }
}

impl Action for ExtendAction {
    fn action_type(&self) -> ActionType {
        ActionType::Extend
    }

    fn reset(&mut self) {}

    fn is_busy(&self) -> bool {
        false
    }

    fn on_pointer_down(&mut self, ctx: &ActionContext) -> ActionResult {
        let Some(target) = hit_test(ctx.shapes, ctx.raw, ctx.pick_tolerance(), &[]) else {
            return ActionResult::Continue;
        };
        match extend(target, ctx.shapes, ctx.raw) {
            Some(result) => ActionResult::ModifyShapes(vec![(target.id.clone(), result.to_update())]),
            None => ActionResult::Continue,
        }
    }

    fn get_prompt(&self) -> &str {
        "Select line to extend"
    }

    fn get_preview(&self, ctx: &ActionContext) -> Vec<PreviewGeometry> {
        let Some(target) = hit_test(ctx.shapes, ctx.raw, ctx.pick_tolerance(), &[]) else {
            return vec![];
        };
        let (Geometry::Line(line), Some(result)) =
            (&target.geometry, extend(target, ctx.shapes, ctx.raw))
        else {
            return vec![];
        };
        let from = match result.end {
            LineEnd::P1 => line.p1,
            LineEnd::P2 => line.p2,
        };
        vec![PreviewGeometry::reference(Geometry::Line(Line::new(
            from,
            result.point,
        )))]
    }

    fn wants_snap(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::test_support::{line, Harness};
    use draft_core::math::Point2;
    use draft_core::shape::ShapeId;

    #[test]
    fn test_extend_to_boundary() {
        let h = Harness::new(vec![
            line("a", (0.0, 0.0), (40.0, 0.0)),
            line("wall", (100.0, -50.0), (100.0, 50.0)),
        ]);
        let mut action = ExtendAction::new();

        match action.on_pointer_down(&h.ctx(35.0, 0.0)) {
            ActionResult::ModifyShapes(updates) => {
                assert_eq!(updates[0].0, ShapeId::from("a"));
                let p2 = updates[0].1.p2.unwrap_or_else(Point2::origin);
                assert!((p2 - Point2::new(100.0, 0.0)).norm() < 1e-9);
                assert_eq!(updates[0].1.p1, None);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_nothing_ahead() {
        let h = Harness::new(vec![line("a", (0.0, 0.0), (40.0, 0.0))]);
        let mut action = ExtendAction::new();
        assert_eq!(action.on_pointer_down(&h.ctx(35.0, 0.0)), ActionResult::Continue);
        assert!(action.get_preview(&h.ctx(35.0, 0.0)).is_empty());
    }
}
