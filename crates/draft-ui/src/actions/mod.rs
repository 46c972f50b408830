//! 具体的 Action 实现
//!
//! 每个绘图/编辑工具对应一个 Action 实现

mod draw_arc;
mod draw_circle;
mod draw_dimension;
mod draw_line;
mod draw_rectangle;
mod modify_extend;
mod modify_move;
mod modify_trim;
mod place;
mod select;
mod two_point;

pub use draw_arc::DrawArcAction;
pub use draw_circle::DrawCircleAction;
pub use draw_dimension::DrawDimensionAction;
pub use draw_line::DrawLineAction;
pub use draw_rectangle::DrawRectangleAction;
pub use modify_extend::ExtendAction;
pub use modify_move::MoveAction;
pub use modify_trim::TrimAction;
pub use place::{PlaceAction, Placement};
pub use select::SelectAction;

use crate::action::{Action, ActionType, PreviewGeometry};
use draft_core::geometry::DimensionKind;
use draft_core::math::Vector2;
use draft_core::shape::{Shape, ShapeId};
use draft_core::transform::translate;
use draft_core::update::ShapeUpdate;

/// 创建指定类型的 Action
pub fn create_action(action_type: ActionType) -> Box<dyn Action> {
    match action_type {
        ActionType::Select => Box::new(SelectAction::new()),
        ActionType::DrawLine => Box::new(DrawLineAction::new()),
        ActionType::DrawRectangle => Box::new(DrawRectangleAction::new()),
        ActionType::DrawCircle => Box::new(DrawCircleAction::new()),
        ActionType::DrawArc => Box::new(DrawArcAction::new()),
        ActionType::DrawDimension => Box::new(DrawDimensionAction::linear()),
        ActionType::DrawDimensionRadius => {
            Box::new(DrawDimensionAction::new(DimensionKind::Radial))
        }
        ActionType::DrawDimensionDiameter => {
            Box::new(DrawDimensionAction::new(DimensionKind::Diameter))
        }
        ActionType::PlaceText => Box::new(PlaceAction::text()),
        ActionType::PlaceSymbol => Box::new(PlaceAction::symbol()),
        ActionType::PlaceTitleBlock => Box::new(PlaceAction::title_block()),
        ActionType::Move => Box::new(MoveAction::new()),
        ActionType::Trim => Box::new(TrimAction::new()),
        ActionType::Extend => Box::new(ExtendAction::new()),
    }
}

/// 平移一组图形对应的更新
pub(crate) fn translated_updates<'a>(
    shapes: impl IntoIterator<Item = &'a Shape>,
    delta: Vector2,
) -> Vec<(ShapeId, ShapeUpdate)> {
    shapes
        .into_iter()
        .map(|s| {
            let moved = translate(&s.geometry, delta);
            (s.id.clone(), ShapeUpdate::from_geometry(&moved))
        })
        .collect()
}

/// 平移一组图形的预览
pub(crate) fn moved_previews<'a>(
    shapes: impl IntoIterator<Item = &'a Shape>,
    delta: Vector2,
) -> Vec<PreviewGeometry> {
    shapes
        .into_iter()
        .map(|s| PreviewGeometry::new(translate(&s.geometry, delta)))
        .collect()
}

/// 按 id 取图形，已删除的 id 直接跳过
pub(crate) fn pick<'a>(shapes: &'a [Shape], ids: &'a [ShapeId]) -> impl Iterator<Item = &'a Shape> {
    shapes.iter().filter(move |s| ids.contains(&s.id))
}
