//! 绘制矩形 Action
//!
//! 两个对角点确定一个轴对齐矩形

use super::two_point::{TwoPoint, TwoPointEvent};
use crate::action::{Action, ActionContext, ActionResult, ActionType, PreviewGeometry};
use draft_core::geometry::{Geometry, Rectangle};
use draft_core::math::Point2;
use draft_core::update::MIN_EXTENT;
use tracing::debug;

/// 绘制矩形 Action
#[derive(Default)]
pub struct DrawRectangleAction {
    corners: TwoPoint,
}

impl DrawRectangleAction {
    pub fn new() -> Self {
        Self::default()
    }

    fn finish(&self, event: TwoPointEvent) -> ActionResult {
        let TwoPointEvent::Done(a, b) = event else {
            return ActionResult::Continue;
        };
        let rect = Rectangle::from_corners(a, b);
        if rect.width < MIN_EXTENT || rect.height < MIN_EXTENT {
            debug!("degenerate rectangle {}x{} ignored", rect.width, rect.height);
            return ActionResult::Continue;
        }
        ActionResult::CreateShapes(vec![Geometry::Rectangle(rect)])
    }
}

impl Action for DrawRectangleAction {
    fn action_type(&self) -> ActionType {
        ActionType::DrawRectangle
    }

    fn reset(&mut self) {
        self.corners.reset();
    }

    fn is_busy(&self) -> bool {
        self.corners.is_active()
    }

    fn on_pointer_down(&mut self, ctx: &ActionContext) -> ActionResult {
        let event = self.corners.pointer_down(ctx);
        self.finish(event)
    }

    fn on_pointer_up(&mut self, ctx: &ActionContext) -> ActionResult {
        let event = self.corners.pointer_up(ctx);
        self.finish(event)
    }

    fn get_prompt(&self) -> &str {
        if self.corners.is_active() {
            "Specify opposite corner"
        } else {
            "Specify first corner"
        }
    }

    fn get_preview(&self, ctx: &ActionContext) -> Vec<PreviewGeometry> {
        self.corners
            .start()
            .map(|a| {
                PreviewGeometry::new(Geometry::Rectangle(Rectangle::from_corners(a, ctx.cursor)))
            })
            .into_iter()
            .collect()
    }

    fn anchor(&self) -> Option<Point2> {
        self.corners.start()
    }
}
