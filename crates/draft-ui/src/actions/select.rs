//! 选择 Action
//!
//! 负责点选、框选、拖动移动、控制柄缩放和旋转。
//! 拖拽过程中只更新本地预览，抬起时一次性提交。

use super::{moved_previews, translated_updates};
use crate::action::{Action, ActionContext, ActionResult, ActionType, PreviewGeometry};
use draft_core::geometry::{Geometry, Rectangle};
use draft_core::hit::{hit_test, shapes_in_box};
use draft_core::math::{
    angle_between, distance, wrap_delta_degrees, BoundingBox2, Point2, Vector2,
};
use draft_core::shape::{Shape, ShapeId};
use draft_core::transform::{group_bounds, handle_at, resize, rotate_about, rotation_handle};
use draft_core::update::ShapeUpdate;
use tracing::debug;

/// 选择状态
#[derive(Debug, Clone, PartialEq)]
enum Status {
    /// 空闲，等待选择
    Idle,
    /// 框选（拖动超过阈值后才生效）
    BoxSelect {
        start: Point2,
        current: Point2,
        live: bool,
        additive: bool,
    },
    /// 拖动移动
    Moving {
        start: Point2,
        originals: Vec<Shape>,
        delta: Vector2,
    },
    /// 控制柄缩放
    Resizing {
        original: Shape,
        handle: usize,
        preview: Option<Geometry>,
    },
    /// 绕公共中心旋转
    Rotating {
        pivot: Point2,
        start_angle: f64,
        originals: Vec<Shape>,
        delta: f64,
    },
}

/// 选择 Action
pub struct SelectAction {
    status: Status,
}

impl SelectAction {
    pub fn new() -> Self {
        Self {
            status: Status::Idle,
        }
    }

    /// 当前生效的选框
    pub fn box_select(&self) -> Option<BoundingBox2> {
        match &self.status {
            Status::BoxSelect {
                start,
                current,
                live: true,
                ..
            } => Some(BoundingBox2::from_corners(*start, *current)),
            _ => None,
        }
    }

    /// 是否正在框选
    pub fn is_box_selecting(&self) -> bool {
        matches!(self.status, Status::BoxSelect { .. })
    }

    /// 按下时命中旋转控制柄或缩放控制柄
    fn begin_handle_drag(&mut self, ctx: &ActionContext, selected: &[&Shape]) -> bool {
        let radius = ctx.world_dist(ctx.config.handle_radius);
        let bounds = group_bounds(selected.iter().copied());
        let grip = rotation_handle(&bounds, ctx.world_dist(ctx.config.rotate_handle_offset));

        if distance(grip, ctx.raw) <= radius {
            let pivot = match selected {
                [single] => single.geometry.center(),
                _ => bounds.center(),
            };
            self.status = Status::Rotating {
                pivot,
                start_angle: angle_between(pivot, ctx.raw),
                originals: selected.iter().map(|s| (*s).clone()).collect(),
                delta: 0.0,
            };
            return true;
        }

        if let [single] = selected {
            if let Some(handle) = handle_at(&single.geometry, ctx.raw, radius) {
                self.status = Status::Resizing {
                    original: (*single).clone(),
                    handle,
                    preview: None,
                };
                return true;
            }
        }
        false
    }

    /// 根据当前光标更新拖拽状态
    fn track(&mut self, ctx: &ActionContext) {
        match &mut self.status {
            Status::Idle => {}
            Status::BoxSelect {
                start,
                current,
                live,
                ..
            } => {
                *current = ctx.raw;
                let threshold = ctx.world_dist(ctx.config.box_select_threshold);
                if !*live && distance(*start, ctx.raw) >= threshold {
                    *live = true;
                }
            }
            Status::Moving { start, delta, .. } => *delta = ctx.cursor - *start,
            Status::Resizing {
                original,
                handle,
                preview,
            } => *preview = resize(&original.geometry, *handle, ctx.cursor),
            Status::Rotating {
                pivot,
                start_angle,
                delta,
                ..
            } => *delta = wrap_delta_degrees(angle_between(*pivot, ctx.raw) - *start_angle),
        }
    }
}

impl Default for SelectAction {
    fn default() -> Self {
        Self::new()
    }
}

impl Action for SelectAction {
    fn action_type(&self) -> ActionType {
        ActionType::Select
    }

    fn reset(&mut self) {
        self.status = Status::Idle;
    }

    fn is_busy(&self) -> bool {
        self.status != Status::Idle
    }

    fn on_pointer_down(&mut self, ctx: &ActionContext) -> ActionResult {
        let selected = ctx.selection.shapes(ctx.shapes);

        // 1. 已选图形的控制柄
        if !selected.is_empty() && self.begin_handle_drag(ctx, &selected) {
            return ActionResult::Continue;
        }

        // 2. 点中图形
        if let Some(hit) = hit_test(ctx.shapes, ctx.raw, ctx.pick_tolerance(), &[]) {
            if ctx.modifiers.shift {
                let mut ids = ctx.selection.ids().to_vec();
                match ids.iter().position(|id| id == &hit.id) {
                    Some(i) => {
                        ids.remove(i);
                    }
                    None => ids.push(hit.id.clone()),
                }
                return ActionResult::SetSelection(ids);
            }

            if ctx.selection.contains(&hit.id) {
                self.status = Status::Moving {
                    start: ctx.cursor,
                    originals: selected.into_iter().cloned().collect(),
                    delta: Vector2::zeros(),
                };
                return ActionResult::Continue;
            }

            self.status = Status::Moving {
                start: ctx.cursor,
                originals: vec![hit.clone()],
                delta: Vector2::zeros(),
            };
            return ActionResult::SetSelection(vec![hit.id.clone()]);
        }

        // 3. 多选包围盒内拖动整组
        if selected.len() > 1 && group_bounds(selected.iter().copied()).contains(&ctx.raw) {
            self.status = Status::Moving {
                start: ctx.cursor,
                originals: selected.into_iter().cloned().collect(),
                delta: Vector2::zeros(),
            };
            return ActionResult::Continue;
        }

        // 4. 空白处：开始框选
        let additive = ctx.modifiers.shift;
        self.status = Status::BoxSelect {
            start: ctx.raw,
            current: ctx.raw,
            live: false,
            additive,
        };
        if additive || ctx.selection.is_empty() {
            ActionResult::Continue
        } else {
            ActionResult::SetSelection(vec![])
        }
    }

    fn on_pointer_move(&mut self, ctx: &ActionContext) -> ActionResult {
        self.track(ctx);
        ActionResult::Continue
    }

    fn on_pointer_up(&mut self, ctx: &ActionContext) -> ActionResult {
        self.track(ctx);
        let status = std::mem::replace(&mut self.status, Status::Idle);
        let guard = ctx.config.micro_move_guard;

        match status {
            Status::Idle => ActionResult::Continue,
            Status::BoxSelect {
                start,
                current,
                live,
                additive,
            } => {
                if !live {
                    return ActionResult::Continue;
                }
                let area = BoundingBox2::from_corners(start, current);
                let mut ids = if additive {
                    ctx.selection.ids().to_vec()
                } else {
                    Vec::new()
                };
                for id in shapes_in_box(ctx.shapes, &area) {
                    if !ids.contains(&id) {
                        ids.push(id);
                    }
                }
                ActionResult::SetSelection(ids)
            }
            Status::Moving {
                originals, delta, ..
            } => {
                if delta.norm() < guard {
                    debug!("drag below guard distance not committed");
                    return ActionResult::Continue;
                }
                ActionResult::ModifyShapes(translated_updates(&originals, delta))
            }
            Status::Resizing {
                original, preview, ..
            } => match preview {
                Some(g) if g != original.geometry => {
                    ActionResult::ModifyShapes(vec![(original.id, ShapeUpdate::from_geometry(&g))])
                }
                _ => ActionResult::Continue,
            },
            Status::Rotating {
                pivot,
                originals,
                delta,
                ..
            } => {
                if delta.abs() < guard {
                    return ActionResult::Continue;
                }
                // 每个图形都绕同一个中心旋转：单个图形时中心就是它自己的中心
                let updates = originals
                    .iter()
                    .map(|s| {
                        let rotated = rotate_about(&s.geometry, pivot, delta);
                        (s.id.clone(), ShapeUpdate::from_geometry(&rotated))
                    })
                    .collect();
                ActionResult::ModifyShapes(updates)
            }
        }
    }

    fn get_prompt(&self) -> &str {
        match self.status {
            Status::Idle => "Select objects",
            Status::BoxSelect { .. } => "Specify opposite corner",
            Status::Moving { .. } => "Drag to move",
            Status::Resizing { .. } => "Drag handle to resize",
            Status::Rotating { .. } => "Drag to rotate",
        }
    }

    fn get_preview(&self, _ctx: &ActionContext) -> Vec<PreviewGeometry> {
        match &self.status {
            Status::Idle => vec![],
            Status::BoxSelect { .. } => self
                .box_select()
                .map(|b| {
                    PreviewGeometry::reference(Geometry::Rectangle(Rectangle::from_corners(
                        b.min, b.max,
                    )))
                })
                .into_iter()
                .collect(),
            Status::Moving {
                originals, delta, ..
            } => moved_previews(originals, *delta),
            Status::Resizing { preview, .. } => preview
                .clone()
                .map(PreviewGeometry::new)
                .into_iter()
                .collect(),
            Status::Rotating {
                pivot,
                originals,
                delta,
                ..
            } => originals
                .iter()
                .map(|s| PreviewGeometry::new(rotate_about(&s.geometry, *pivot, *delta)))
                .collect(),
        }
    }

    fn editing_ids(&self) -> Vec<ShapeId> {
        match &self.status {
            Status::Moving { originals, .. } | Status::Rotating { originals, .. } => {
                originals.iter().map(|s| s.id.clone()).collect()
            }
            Status::Resizing { original, .. } => vec![original.id.clone()],
            _ => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::test_support::{line, rect, Harness};
    use crate::state::Modifiers;

    fn updates(result: ActionResult) -> Vec<(ShapeId, ShapeUpdate)> {
        match result {
            ActionResult::ModifyShapes(u) => u,
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_click_selects_and_drag_moves() {
        let mut h = Harness::new(vec![rect("r", 0.0, 0.0, 20.0, 10.0)]);
        let mut action = SelectAction::new();

        let result = action.on_pointer_down(&h.ctx(10.0, 0.0));
        assert_eq!(result, ActionResult::SetSelection(vec![ShapeId::from("r")]));
        h.selection.select_only(ShapeId::from("r"));

        action.on_pointer_move(&h.ctx(15.0, 5.0));
        assert_eq!(action.editing_ids(), vec![ShapeId::from("r")]);
        let u = updates(action.on_pointer_up(&h.ctx(15.0, 5.0)));

        assert_eq!(u.len(), 1);
        assert_eq!((u[0].1.x, u[0].1.y), (Some(5.0), Some(5.0)));
        assert!(!action.is_busy());
    }

    #[test]
    fn test_micro_move_is_not_committed() {
        let mut h = Harness::new(vec![line("a", (0.0, 0.0), (50.0, 0.0))]);
        h.selection.select_only(ShapeId::from("a"));
        let mut action = SelectAction::new();

        action.on_pointer_down(&h.ctx(25.0, 0.0));
        assert_eq!(action.on_pointer_up(&h.ctx(25.05, 0.0)), ActionResult::Continue);
    }

    #[test]
    fn test_shift_click_toggles() {
        let mut h = Harness::new(vec![
            line("a", (0.0, 0.0), (50.0, 0.0)),
            line("b", (0.0, 40.0), (50.0, 40.0)),
        ]);
        h.selection.select_only(ShapeId::from("a"));
        h.modifiers = Modifiers::SHIFT;
        let mut action = SelectAction::new();

        assert_eq!(
            action.on_pointer_down(&h.ctx(25.0, 40.0)),
            ActionResult::SetSelection(vec![ShapeId::from("a"), ShapeId::from("b")])
        );
        assert_eq!(
            action.on_pointer_down(&h.ctx(25.0, 0.0)),
            ActionResult::SetSelection(vec![])
        );
        assert!(!action.is_busy());
    }

    #[test]
    fn test_box_select_after_threshold() {
        let mut h = Harness::new(vec![
            line("a", (10.0, 10.0), (20.0, 10.0)),
            line("b", (100.0, 100.0), (120.0, 100.0)),
        ]);
        h.selection.select_only(ShapeId::from("b"));
        let mut action = SelectAction::new();

        // 空白处按下先清空选择
        assert_eq!(action.on_pointer_down(&h.ctx(0.0, 0.0)), ActionResult::SetSelection(vec![]));
        h.selection.clear();

        action.on_pointer_move(&h.ctx(1.0, 1.0));
        assert!(action.box_select().is_none());
        action.on_pointer_move(&h.ctx(30.0, 30.0));
        assert!(action.box_select().is_some());

        assert_eq!(
            action.on_pointer_up(&h.ctx(30.0, 30.0)),
            ActionResult::SetSelection(vec![ShapeId::from("a")])
        );
    }

    #[test]
    fn test_short_box_drag_selects_nothing() {
        let h = Harness::new(vec![line("a", (10.0, 10.0), (20.0, 10.0))]);
        let mut action = SelectAction::new();

        action.on_pointer_down(&h.ctx(0.0, 0.0));
        assert_eq!(action.on_pointer_up(&h.ctx(1.0, 0.0)), ActionResult::Continue);
    }

    #[test]
    fn test_group_move_inside_bounds() {
        let mut h = Harness::new(vec![
            line("a", (0.0, 0.0), (10.0, 0.0)),
            line("b", (0.0, 40.0), (10.0, 40.0)),
        ]);
        h.selection.set(["a", "b"].map(ShapeId::from));
        let mut action = SelectAction::new();

        // 两条线之间的空白处，仍在组包围盒内
        assert_eq!(action.on_pointer_down(&h.ctx(5.0, 20.0)), ActionResult::Continue);
        let u = updates(action.on_pointer_up(&h.ctx(8.0, 20.0)));

        // 一次手势一组更新
        assert_eq!(u.len(), 2);
        assert_eq!(u[1].1.p1, Some(Point2::new(3.0, 40.0)));
    }

    #[test]
    fn test_resize_line_endpoint() {
        let mut h = Harness::new(vec![line("a", (0.0, 0.0), (50.0, 0.0))]);
        h.selection.select_only(ShapeId::from("a"));
        let mut action = SelectAction::new();

        action.on_pointer_down(&h.ctx(50.0, 2.0));
        action.on_pointer_move(&h.ctx(80.0, 10.0));
        assert_eq!(action.get_preview(&h.ctx(80.0, 10.0)).len(), 1);

        let u = updates(action.on_pointer_up(&h.ctx(80.0, 10.0)));
        assert_eq!(u[0].1.p1, Some(Point2::new(0.0, 0.0)));
        assert_eq!(u[0].1.p2, Some(Point2::new(80.0, 10.0)));
    }

    #[test]
    fn test_rotate_single_shape_about_own_center() {
        let mut h = Harness::new(vec![rect("r", 0.0, 0.0, 40.0, 20.0)]);
        h.selection.select_only(ShapeId::from("r"));
        let mut action = SelectAction::new();

        // 旋转控制柄在上边中点上方 24 像素
        action.on_pointer_down(&h.ctx(20.0, -24.0));
        assert!(action.is_busy());
        // 从正上方拖到正左方：视觉逆时针 90°
        let u = updates(action.on_pointer_up(&h.ctx(-100.0, 10.0)));

        let rotation = u[0].1.rotation.unwrap_or_default();
        assert!((rotation - 90.0).abs() < 1e-9);
        assert!((u[0].1.x.unwrap_or_default() - 0.0).abs() < 1e-9);
        assert!((u[0].1.y.unwrap_or_default() - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_escape_discards_drag() {
        let mut h = Harness::new(vec![line("a", (0.0, 0.0), (50.0, 0.0))]);
        h.selection.select_only(ShapeId::from("a"));
        let mut action = SelectAction::new();

        action.on_pointer_down(&h.ctx(25.0, 0.0));
        action.on_pointer_move(&h.ctx(40.0, 40.0));
        assert!(action.on_escape());
        assert_eq!(action.on_pointer_up(&h.ctx(40.0, 40.0)), ActionResult::Continue);
    }
}
