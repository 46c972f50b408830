//! 修剪 Action
//!
//! 单击图形，删除光标两侧最近交点之间的一段。

use crate::action::{Action, ActionContext, ActionResult, ActionType, PreviewGeometry};
use draft_core::geometry::{Circle, Geometry, Line};
use draft_core::hit::hit_test;
use draft_core::shape::find_shape;
use draft_core::trim::{trim, TrimSpan};
use tracing::debug;

/// 修剪 Action
#[derive(Default)]
pub struct TrimAction;

impl TrimAction {
    pub fn new() -> Self {
        Self
    }
}

/// 被删除区间的预览几何
fn removed_geometry(span: &TrimSpan, target: &Geometry) -> Option<Geometry> {
    match (span, target) {
        (TrimSpan::Segment { start, end, .. }, _) => Some(Geometry::Line(Line::new(*start, *end))),
        (
            TrimSpan::Arc {
                start_angle,
                end_angle,
            },
            Geometry::Circle(c),
        ) => Some(Geometry::Circle(Circle::arc(
            c.center(),
            c.r,
            *start_angle,
            *end_angle,
        ))),
        _ => None,
    }
}

impl Action for TrimAction {
    fn action_type(&self) -> ActionType {
        ActionType::Trim
    }

    fn reset(&mut self) {}

    fn is_busy(&self) -> bool {
        false
    }

    fn on_pointer_down(&mut self, ctx: &ActionContext) -> ActionResult {
        let Some(target) = hit_test(ctx.shapes, ctx.raw, ctx.pick_tolerance(), &[]) else {
            return ActionResult::Continue;
        };
        match trim(target, ctx.shapes, ctx.raw) {
            Some(result) => ActionResult::ReplaceShapes {
                remove: vec![result.target],
                insert: result
                    .pieces
                    .into_iter()
                    .map(|g| (g, target.properties.clone()))
                    .collect(),
            },
            None if ctx.config.trim_deletes_isolated => {
                debug!(id = %target.id, "no crossings, deleting whole shape");
                ActionResult::DeleteShapes(vec![target.id.clone()])
            }
            None => ActionResult::Continue,
        }
    }

    fn get_prompt(&self) -> &str {
        "Select object to trim"
    }

    fn get_preview(&self, ctx: &ActionContext) -> Vec<PreviewGeometry> {
        let Some(target) = hit_test(ctx.shapes, ctx.raw, ctx.pick_tolerance(), &[]) else {
            return vec![];
        };
        trim(target, ctx.shapes, ctx.raw)
            .and_then(|r| {
                let shape = find_shape(ctx.shapes, &r.target)?;
                removed_geometry(&r.removed, &shape.geometry)
            })
            .map(PreviewGeometry::reference)
            .into_iter()
            .collect()
    }

    fn wants_snap(&self) -> bool {
        false
    }
}
