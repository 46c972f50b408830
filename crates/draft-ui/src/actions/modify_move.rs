//! 移动 Action（单击基点、单击目标点）
//!
//! 参考 LibreCAD 的 RS_ActionModifyMove 实现

use super::{moved_previews, pick, translated_updates};
use crate::action::{Action, ActionContext, ActionResult, ActionType, PreviewGeometry};
use draft_core::geometry::{Geometry, Line};
use draft_core::hit::hit_test;
use draft_core::math::Point2;
use draft_core::shape::ShapeId;
use tracing::debug;

/// 移动状态
#[derive(Debug, Clone, PartialEq)]
enum Status {
    /// 等待指定基点
    SetBasePoint,
    /// 等待指定目标点
    SetDestination,
}

/// 移动 Action
pub struct MoveAction {
    status: Status,
    /// 要移动的图形（指定基点时从选择集中取）
    shape_ids: Vec<ShapeId>,
    /// 基点
    base_point: Option<Point2>,
}

impl MoveAction {
    pub fn new() -> Self {
        Self {
            status: Status::SetBasePoint,
            shape_ids: Vec::new(),
            base_point: None,
        }
    }
}

impl Default for MoveAction {
    fn default() -> Self {
        Self::new()
    }
}

impl Action for MoveAction {
    fn action_type(&self) -> ActionType {
        ActionType::Move
    }

    fn reset(&mut self) {
        self.status = Status::SetBasePoint;
        self.shape_ids.clear();
        self.base_point = None;
    }

    fn is_busy(&self) -> bool {
        self.status == Status::SetDestination
    }

    fn on_pointer_down(&mut self, ctx: &ActionContext) -> ActionResult {
        match self.status {
            Status::SetBasePoint => {
                if ctx.selection.is_empty() {
                    // 没有预选时，点中的图形成为选择集
                    return match hit_test(ctx.shapes, ctx.raw, ctx.pick_tolerance(), &[]) {
                        Some(shape) => ActionResult::SetSelection(vec![shape.id.clone()]),
                        None => ActionResult::Continue,
                    };
                }
                self.shape_ids = ctx.selection.ids().to_vec();
                self.base_point = Some(ctx.cursor);
                self.status = Status::SetDestination;
                ActionResult::Continue
            }
            Status::SetDestination => {
                let Some(base) = self.base_point else {
                    self.reset();
                    return ActionResult::Continue;
                };
                let delta = ctx.cursor - base;
                let ids = std::mem::take(&mut self.shape_ids);
                self.reset();
                if delta.norm() < ctx.config.micro_move_guard {
                    debug!("move below guard distance ignored");
                    return ActionResult::Continue;
                }
                ActionResult::ModifyShapes(translated_updates(pick(ctx.shapes, &ids), delta))
            }
        }
    }

    fn get_prompt(&self) -> &str {
        match self.status {
            Status::SetBasePoint => "Specify base point",
            Status::SetDestination => "Specify destination point",
        }
    }

    fn get_preview(&self, ctx: &ActionContext) -> Vec<PreviewGeometry> {
        let Some(base) = self.base_point else {
            return vec![];
        };
        let mut previews = vec![PreviewGeometry::reference(Geometry::Line(Line::new(
            base, ctx.cursor,
        )))];
        previews.extend(moved_previews(
            pick(ctx.shapes, &self.shape_ids),
            ctx.cursor - base,
        ));
        previews
    }

    fn anchor(&self) -> Option<Point2> {
        self.base_point
    }

    fn editing_ids(&self) -> Vec<ShapeId> {
        self.shape_ids.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::test_support::{line, Harness};
    use draft_core::math::Point2;

    #[test]
    fn test_click_click_move() {
        let mut h = Harness::new(vec![line("a", (0.0, 0.0), (10.0, 0.0))]);
        h.selection.select_only(ShapeId::from("a"));
        let mut action = MoveAction::new();

        assert_eq!(action.on_pointer_down(&h.ctx(0.0, 0.0)), ActionResult::Continue);
        assert!(action.is_busy());
        let result = action.on_pointer_down(&h.ctx(5.0, 5.0));

        match result {
            ActionResult::ModifyShapes(updates) => {
                assert_eq!(updates.len(), 1);
                assert_eq!(updates[0].1.p1, Some(Point2::new(5.0, 5.0)));
                assert_eq!(updates[0].1.p2, Some(Point2::new(15.0, 5.0)));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_escape_cancels_base_point() {
        let mut h = Harness::new(vec![line("a", (0.0, 0.0), (10.0, 0.0))]);
        h.selection.select_only(ShapeId::from("a"));
        let mut action = MoveAction::new();

        action.on_pointer_down(&h.ctx(0.0, 0.0));
        assert!(action.on_escape());
        assert_eq!(action.anchor(), None);
        assert!(action.editing_ids().is_empty());
    }

    #[test]
    fn test_without_selection_picks_shape() {
        let h = Harness::new(vec![line("a", (0.0, 0.0), (10.0, 0.0))]);
        let mut action = MoveAction::new();

        assert_eq!(
            action.on_pointer_down(&h.ctx(5.0, 1.0)),
            ActionResult::SetSelection(vec![ShapeId::from("a")])
        );
        assert!(!action.is_busy());
    }
}
