//! DraftCAD 交互层
//!
//! 每个工具是一个 [`Action`] 状态机，[`Editor`] 持有全部编辑状态，
//! 把屏幕坐标的输入事件分派给当前工具，并把结果提交到文档。
//! 不依赖任何 GUI 框架，宿主负责渲染 [`Editor::previews`] 和文档图形。

pub mod action;
pub mod actions;
pub mod editor;
pub mod state;

pub use action::{Action, ActionContext, ActionResult, ActionType, PreviewGeometry};
pub use actions::create_action;
pub use editor::Editor;
pub use state::{EditorConfig, Key, Modifiers};
