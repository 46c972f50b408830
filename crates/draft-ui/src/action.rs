//! Action 系统 - 参考 LibreCAD 的状态机设计
//!
//! 每个绘图/编辑工具是一个独立的 Action 实现，
//! 采用状态机模式处理指针按下/移动/抬起。
//! Action 只产出修改意图（[`ActionResult`]），由编辑器统一提交到文档，
//! 拖拽中的预览与已提交的文档分开保存，取消时直接丢弃。

use crate::state::{EditorConfig, Modifiers};
use draft_core::geometry::Geometry;
use draft_core::math::Point2;
use draft_core::properties::Properties;
use draft_core::selection::Selection;
use draft_core::shape::{Shape, ShapeId};
use draft_core::update::ShapeUpdate;

/// Action 执行结果
#[derive(Debug, Clone, PartialEq)]
pub enum ActionResult {
    /// 继续当前 action
    Continue,
    /// 创建图形（默认属性）
    CreateShapes(Vec<Geometry>),
    /// 修改图形（同一手势一个历史快照）
    ModifyShapes(Vec<(ShapeId, ShapeUpdate)>),
    /// 删除图形
    DeleteShapes(Vec<ShapeId>),
    /// 原子替换（修剪）
    ReplaceShapes {
        remove: Vec<ShapeId>,
        insert: Vec<(Geometry, Properties)>,
    },
    /// 设置选择集
    SetSelection(Vec<ShapeId>),
    /// 取消当前 action，回到选择工具
    Cancel,
}

/// Action 类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionType {
    // 选择
    Select,

    // 绘图
    DrawLine,
    DrawRectangle,
    DrawCircle,
    DrawArc,
    DrawDimension,
    DrawDimensionRadius,
    DrawDimensionDiameter,

    // 放置
    PlaceText,
    PlaceSymbol,
    PlaceTitleBlock,

    // 修改
    Move,
    Trim,
    Extend,
}

impl ActionType {
    /// 获取 action 的名称
    pub fn name(&self) -> &'static str {
        match self {
            ActionType::Select => "Select",
            ActionType::DrawLine => "Line",
            ActionType::DrawRectangle => "Rectangle",
            ActionType::DrawCircle => "Circle",
            ActionType::DrawArc => "Arc",
            ActionType::DrawDimension => "Dimension",
            ActionType::DrawDimensionRadius => "Radius Dimension",
            ActionType::DrawDimensionDiameter => "Diameter Dimension",
            ActionType::PlaceText => "Text",
            ActionType::PlaceSymbol => "Symbol",
            ActionType::PlaceTitleBlock => "Title Block",
            ActionType::Move => "Move",
            ActionType::Trim => "Trim",
            ActionType::Extend => "Extend",
        }
    }

    /// 获取快捷键
    pub fn shortcut(&self) -> Option<&'static str> {
        match self {
            ActionType::Select => Some("V"),
            ActionType::DrawLine => Some("L"),
            ActionType::DrawRectangle => Some("R"),
            ActionType::DrawCircle => Some("C"),
            ActionType::DrawArc => Some("A"),
            ActionType::DrawDimension => Some("D"),
            ActionType::DrawDimensionRadius => Some("DRA"),
            ActionType::DrawDimensionDiameter => Some("DDI"),
            ActionType::PlaceText => Some("T"),
            ActionType::PlaceSymbol => Some("S"),
            ActionType::PlaceTitleBlock => Some("TB"),
            ActionType::Move => Some("M"),
            ActionType::Trim => Some("TR"),
            ActionType::Extend => Some("EX"),
        }
    }

    /// 单字符快捷键对应的工具
    pub fn from_key(c: char) -> Option<ActionType> {
        [
            ActionType::Select,
            ActionType::DrawLine,
            ActionType::DrawRectangle,
            ActionType::DrawCircle,
            ActionType::DrawArc,
            ActionType::DrawDimension,
            ActionType::PlaceText,
            ActionType::PlaceSymbol,
            ActionType::Move,
        ]
        .into_iter()
        .find(|t| {
            t.shortcut()
                .is_some_and(|s| s.len() == 1 && s.eq_ignore_ascii_case(&c.to_string()))
        })
    }

    /// 是否参与正交约束和捕捉的两点绘图工具
    pub fn is_drawing(&self) -> bool {
        !matches!(
            self,
            ActionType::Select | ActionType::Trim | ActionType::Extend
        )
    }
}

/// Action 上下文 - 传递给 Action 的运行时信息
pub struct ActionContext<'a> {
    /// 解析后的世界坐标（已应用捕捉、推断和正交）
    pub cursor: Point2,
    /// 原始世界坐标（用于拾取）
    pub raw: Point2,
    /// 是否命中了精确捕捉点
    pub snapped: bool,
    /// 当前文档中的图形
    pub shapes: &'a [Shape],
    /// 当前选择集
    pub selection: &'a Selection,
    /// 当前缩放比例
    pub scale: f64,
    pub modifiers: Modifiers,
    pub config: &'a EditorConfig,
}

impl<'a> ActionContext<'a> {
    /// 屏幕像素换算为世界距离
    pub fn world_dist(&self, pixels: f64) -> f64 {
        pixels / self.scale
    }

    /// 拾取容差（世界距离）
    pub fn pick_tolerance(&self) -> f64 {
        self.world_dist(self.config.pick_tolerance)
    }

    pub fn find(&self, id: &ShapeId) -> Option<&'a Shape> {
        self.shapes.iter().find(|s| &s.id == id)
    }
}

/// 预览几何体
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewGeometry {
    pub geometry: Geometry,
    pub is_reference: bool, // 是否是参考线（虚线显示）
}

impl PreviewGeometry {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            is_reference: false,
        }
    }

    pub fn reference(geometry: Geometry) -> Self {
        Self {
            geometry,
            is_reference: true,
        }
    }
}

/// Action trait - 所有绘图/编辑工具的核心接口
///
/// 参考 LibreCAD 的 RS_ActionInterface
pub trait Action: Send {
    /// 获取 action 类型
    fn action_type(&self) -> ActionType;

    /// 获取 action 名称
    fn name(&self) -> &str {
        self.action_type().name()
    }

    /// 重置 action 状态（切换工具或取消时调用）
    fn reset(&mut self);

    /// 是否有进行中的多步状态或拖拽
    fn is_busy(&self) -> bool;

    // ========== 事件处理 ==========

    /// 指针按下
    fn on_pointer_down(&mut self, ctx: &ActionContext) -> ActionResult;

    /// 指针移动
    fn on_pointer_move(&mut self, _ctx: &ActionContext) -> ActionResult {
        ActionResult::Continue
    }

    /// 指针抬起
    fn on_pointer_up(&mut self, _ctx: &ActionContext) -> ActionResult {
        ActionResult::Continue
    }

    /// Escape：丢弃进行中的状态，返回是否确实取消了什么
    fn on_escape(&mut self) -> bool {
        let busy = self.is_busy();
        self.reset();
        busy
    }

    // ========== UI 提示 ==========

    /// 获取当前状态的提示文本
    fn get_prompt(&self) -> &str;

    // ========== 预览 ==========

    /// 获取预览几何体
    fn get_preview(&self, ctx: &ActionContext) -> Vec<PreviewGeometry>;

    // ========== 捕捉 ==========

    /// 正交约束的基准点
    fn anchor(&self) -> Option<Point2> {
        None
    }

    /// 正在编辑的图形（不参与捕捉）
    fn editing_ids(&self) -> Vec<ShapeId> {
        Vec::new()
    }

    /// 是否对光标做捕捉
    fn wants_snap(&self) -> bool {
        true
    }
}
