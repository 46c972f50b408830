//! 单击放置 Action：文本、符号、标题栏

use crate::action::{Action, ActionContext, ActionResult, ActionType, PreviewGeometry};
use draft_core::generate::{DEFAULT_SYMBOL_SIZE, DEFAULT_TEXT_FONT_SIZE};
use draft_core::geometry::{Geometry, Symbol, Text, TitleBlock};
use draft_core::math::Point2;

/// 默认文本内容
pub const DEFAULT_TEXT: &str = "Text";

/// 默认符号名称
pub const DEFAULT_SYMBOL: &str = "marker";

/// 默认标题栏尺寸
pub const DEFAULT_TITLE_BLOCK_SIZE: (f64, f64) = (180.0, 60.0);

/// 要放置的对象
#[derive(Debug, Clone, PartialEq)]
pub enum Placement {
    /// 文本，锚点为左上角
    Text { content: String, font_size: f64 },
    /// 符号，位置为中心
    Symbol { name: String, size: f64 },
    /// 标题栏，位置为左上角
    TitleBlock { width: f64, height: f64 },
}

impl Placement {
    /// 在指定位置生成几何
    pub fn at(&self, p: Point2) -> Geometry {
        match self {
            Placement::Text { content, font_size } => {
                Geometry::Text(Text::new(p, content.clone(), *font_size))
            }
            Placement::Symbol { name, size } => {
                Geometry::Symbol(Symbol::new(p, name.clone(), *size))
            }
            Placement::TitleBlock { width, height } => {
                Geometry::TitleBlock(TitleBlock::new(p.x, p.y, *width, *height))
            }
        }
    }
}

/// 单击放置 Action
pub struct PlaceAction {
    placement: Placement,
}

impl PlaceAction {
    pub fn new(placement: Placement) -> Self {
        Self { placement }
    }

    pub fn text() -> Self {
        Self::new(Placement::Text {
            content: DEFAULT_TEXT.to_string(),
            font_size: DEFAULT_TEXT_FONT_SIZE,
        })
    }

    pub fn symbol() -> Self {
        Self::new(Placement::Symbol {
            name: DEFAULT_SYMBOL.to_string(),
            size: DEFAULT_SYMBOL_SIZE,
        })
    }

    pub fn title_block() -> Self {
        let (width, height) = DEFAULT_TITLE_BLOCK_SIZE;
        Self::new(Placement::TitleBlock { width, height })
    }

    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    /// 修改后续放置的对象（例如切换符号名称）
    pub fn set_placement(&mut self, placement: Placement) {
        self.placement = placement;
    }
}

impl Action for PlaceAction {
    fn action_type(&self) -> ActionType {
        match self.placement {
            Placement::Text { .. } => ActionType::PlaceText,
            Placement::Symbol { .. } => ActionType::PlaceSymbol,
            Placement::TitleBlock { .. } => ActionType::PlaceTitleBlock,
        }
    }

    fn reset(&mut self) {}

    fn is_busy(&self) -> bool {
        false
    }

    fn on_pointer_down(&mut self, ctx: &ActionContext) -> ActionResult {
        ActionResult::CreateShapes(vec![self.placement.at(ctx.cursor)])
    }

    fn get_prompt(&self) -> &str {
        "Specify insertion point"
    }

    fn get_preview(&self, ctx: &ActionContext) -> Vec<PreviewGeometry> {
        vec![PreviewGeometry::new(self.placement.at(ctx.cursor))]
    }
}
