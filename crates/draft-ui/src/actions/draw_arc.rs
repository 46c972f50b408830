//! 绘制圆弧 Action（三点法）

use crate::action::{Action, ActionContext, ActionResult, ActionType, PreviewGeometry};
use draft_core::geometry::{Circle, Geometry, Line};
use draft_core::intersect::{arc_angles_from_three_points, circle_from_three_points};
use draft_core::math::{distance, Point2};
use draft_core::update::MIN_EXTENT;
use tracing::debug;

/// 圆弧绘制状态（三点法）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    /// 等待第一点（起点）
    SetPoint1,
    /// 等待第二点（弧上的点）
    SetPoint2,
    /// 等待第三点（终点）
    SetPoint3,
}

/// 绘制圆弧 Action
pub struct DrawArcAction {
    status: Status,
    point1: Option<Point2>,
    point2: Option<Point2>,
}

impl DrawArcAction {
    pub fn new() -> Self {
        Self {
            status: Status::SetPoint1,
            point1: None,
            point2: None,
        }
    }
}

impl Default for DrawArcAction {
    fn default() -> Self {
        Self::new()
    }
}

/// 依次经过三点的圆弧；三点共线时退化为首尾相连的线段
fn arc_through(p1: Point2, p2: Point2, p3: Point2) -> Option<Geometry> {
    match circle_from_three_points(p1, p2, p3) {
        Some((center, r)) => {
            let (start, end) = arc_angles_from_three_points(center, p1, p2, p3);
            Some(Geometry::Circle(Circle::arc(center, r, start, end)))
        }
        None if distance(p1, p3) >= MIN_EXTENT => Some(Geometry::Line(Line::new(p1, p3))),
        None => None,
    }
}

impl Action for DrawArcAction {
    fn action_type(&self) -> ActionType {
        ActionType::DrawArc
    }

    fn reset(&mut self) {
        self.status = Status::SetPoint1;
        self.point1 = None;
        self.point2 = None;
    }

    fn is_busy(&self) -> bool {
        self.status != Status::SetPoint1
    }

    fn on_pointer_down(&mut self, ctx: &ActionContext) -> ActionResult {
        let point = ctx.cursor;
        match self.status {
            Status::SetPoint1 => {
                self.point1 = Some(point);
                self.status = Status::SetPoint2;
                ActionResult::Continue
            }
            Status::SetPoint2 => {
                self.point2 = Some(point);
                self.status = Status::SetPoint3;
                ActionResult::Continue
            }
            Status::SetPoint3 => {
                let (Some(p1), Some(p2)) = (self.point1, self.point2) else {
                    self.reset();
                    return ActionResult::Continue;
                };
                self.reset();
                match arc_through(p1, p2, point) {
                    Some(geometry) => ActionResult::CreateShapes(vec![geometry]),
                    None => {
                        debug!("coincident arc points, nothing created");
                        ActionResult::Continue
                    }
                }
            }
        }
    }

    fn get_prompt(&self) -> &str {
        match self.status {
            Status::SetPoint1 => "Specify start point",
            Status::SetPoint2 => "Specify second point",
            Status::SetPoint3 => "Specify end point",
        }
    }

    fn get_preview(&self, ctx: &ActionContext) -> Vec<PreviewGeometry> {
        match (self.status, self.point1, self.point2) {
            (Status::SetPoint2, Some(p1), _) => {
                vec![PreviewGeometry::reference(Geometry::Line(Line::new(
                    p1, ctx.cursor,
                )))]
            }
            (Status::SetPoint3, Some(p1), Some(p2)) => arc_through(p1, p2, ctx.cursor)
                .map(PreviewGeometry::new)
                .into_iter()
                .collect(),
            _ => vec![],
        }
    }

    fn anchor(&self) -> Option<Point2> {
        self.point2.or(self.point1)
    }
}
