//! 绘制线段 Action
//!
//! 参考 LibreCAD 的 RS_ActionDrawLine 实现

use super::two_point::{TwoPoint, TwoPointEvent};
use crate::action::{Action, ActionContext, ActionResult, ActionType, PreviewGeometry};
use draft_core::geometry::{Geometry, Line};
use draft_core::math::{distance, Point2};
use draft_core::update::MIN_EXTENT;
use tracing::debug;

/// 绘制线段 Action
#[derive(Default)]
pub struct DrawLineAction {
    points: TwoPoint,
}

impl DrawLineAction {
    pub fn new() -> Self {
        Self::default()
    }

    fn finish(&self, event: TwoPointEvent) -> ActionResult {
        match event {
            TwoPointEvent::Done(p1, p2) if distance(p1, p2) >= MIN_EXTENT => {
                ActionResult::CreateShapes(vec![Geometry::Line(Line::new(p1, p2))])
            }
            TwoPointEvent::Done(..) => {
                debug!("zero-length line ignored");
                ActionResult::Continue
            }
            TwoPointEvent::Pending => ActionResult::Continue,
        }
    }
}

impl Action for DrawLineAction {
    fn action_type(&self) -> ActionType {
        ActionType::DrawLine
    }

    fn reset(&mut self) {
        self.points.reset();
    }

    fn is_busy(&self) -> bool {
        self.points.is_active()
    }

    fn on_pointer_down(&mut self, ctx: &ActionContext) -> ActionResult {
        let event = self.points.pointer_down(ctx);
        self.finish(event)
    }

    fn on_pointer_up(&mut self, ctx: &ActionContext) -> ActionResult {
        let event = self.points.pointer_up(ctx);
        self.finish(event)
    }

    fn get_prompt(&self) -> &str {
        if self.points.is_active() {
            "Specify second point"
        } else {
            "Specify first point"
        }
    }

    fn get_preview(&self, ctx: &ActionContext) -> Vec<PreviewGeometry> {
        match self.points.start() {
            Some(start) => vec![PreviewGeometry::new(Geometry::Line(Line::new(
                start, ctx.cursor,
            )))],
            None => vec![],
        }
    }

    fn anchor(&self) -> Option<Point2> {
        self.points.start()
    }
}
