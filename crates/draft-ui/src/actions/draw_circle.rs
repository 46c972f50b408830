//! 绘制圆 Action
//!
//! 参考 LibreCAD 的 RS_ActionDrawCircle：圆心 + 圆上一点

use super::two_point::{TwoPoint, TwoPointEvent};
use crate::action::{Action, ActionContext, ActionResult, ActionType, PreviewGeometry};
use draft_core::geometry::{Circle, Geometry, Line};
use draft_core::math::{distance, Point2};
use draft_core::update::MIN_EXTENT;

/// 绘制圆 Action
#[derive(Default)]
pub struct DrawCircleAction {
    points: TwoPoint,
}

impl DrawCircleAction {
    pub fn new() -> Self {
        Self::default()
    }

    fn finish(&self, event: TwoPointEvent) -> ActionResult {
        match event {
            TwoPointEvent::Done(center, rim) => {
                let r = distance(center, rim);
                if r < MIN_EXTENT {
                    return ActionResult::Continue;
                }
                ActionResult::CreateShapes(vec![Geometry::Circle(Circle::new(center, r))])
            }
            TwoPointEvent::Pending => ActionResult::Continue,
        }
    }
}

impl Action for DrawCircleAction {
    fn action_type(&self) -> ActionType {
        ActionType::DrawCircle
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
            "Specify point on circle"
        } else {
            "Specify center point"
        }
    }

    fn get_preview(&self, ctx: &ActionContext) -> Vec<PreviewGeometry> {
        let Some(center) = self.points.start() else {
            return vec![];
        };
        let r = distance(center, ctx.cursor);
        let mut previews = vec![PreviewGeometry::reference(Geometry::Line(Line::new(
            center, ctx.cursor,
        )))];
        if r >= MIN_EXTENT {
            previews.push(PreviewGeometry::new(Geometry::Circle(Circle::new(center, r))));
        }
        previews
    }

    fn anchor(&self) -> Option<Point2> {
        self.points.start()
    }
}
