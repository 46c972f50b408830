//! 编辑器配置与输入状态

use draft_core::history::DEFAULT_HISTORY_DEPTH;
use draft_core::units::Unit;
use serde::{Deserialize, Serialize};

/// 编辑器配置
///
/// 像素单位的阈值都是屏幕距离，使用时按当前缩放换算。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// 框选生效前的拖动距离（屏幕像素）
    pub box_select_threshold: f64,
    /// 控制柄命中半径（屏幕像素）
    pub handle_radius: f64,
    /// 旋转控制柄在包围盒上方的偏移（屏幕像素）
    pub rotate_handle_offset: f64,
    /// 拾取图形的容差（屏幕像素）
    pub pick_tolerance: f64,
    /// 方向键微调步长
    pub nudge_step: f64,
    /// Shift + 方向键微调步长
    pub nudge_step_large: f64,
    /// 小于此位移的拖动不提交
    pub micro_move_guard: f64,
    /// 历史快照上限
    pub history_depth: usize,
    /// 修剪没有交点的图形时是否整体删除
    pub trim_deletes_isolated: bool,
    /// 显示单位
    pub units: Unit,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            box_select_threshold: 3.0,
            handle_radius: 8.0,
            rotate_handle_offset: 24.0,
            pick_tolerance: 5.0,
            nudge_step: 1.0,
            nudge_step_large: 10.0,
            micro_move_guard: 0.1,
            history_depth: DEFAULT_HISTORY_DEPTH,
            trim_deletes_isolated: true,
            units: Unit::Mm,
        }
    }
}

/// 修饰键
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    /// Ctrl（macOS 上为 Command）
    pub ctrl: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
    };

    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ctrl: false,
    };

    pub const CTRL: Modifiers = Modifiers {
        shift: false,
        ctrl: true,
    };
}

/// 编辑器处理的按键
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Delete,
    Backspace,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Char(char),
}
