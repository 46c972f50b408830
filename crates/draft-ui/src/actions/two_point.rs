//! 两点手势：按下-拖动-抬起，或单击-单击

use crate::action::ActionContext;
use draft_core::math::{distance, Point2};

/// 两点手势的输出
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum TwoPointEvent {
    /// 尚未完成
    Pending,
    /// 两个点都已确定
    Done(Point2, Point2),
}

/// 两点输入状态
///
/// 按下记录第一点；抬起时若拖动超过阈值则直接完成，
/// 否则进入等待第二次单击的状态。
#[derive(Debug, Clone, Default)]
pub(crate) struct TwoPoint {
    start: Option<Point2>,
    pressed: bool,
}

impl TwoPoint {
    pub fn start(&self) -> Option<Point2> {
        self.start
    }

    pub fn is_active(&self) -> bool {
        self.start.is_some()
    }

    pub fn reset(&mut self) {
        self.start = None;
        self.pressed = false;
    }

    pub fn pointer_down(&mut self, ctx: &ActionContext) -> TwoPointEvent {
        match self.start {
            None => {
                self.start = Some(ctx.cursor);
                self.pressed = true;
                TwoPointEvent::Pending
            }
            Some(start) => {
                self.reset();
                TwoPointEvent::Done(start, ctx.cursor)
            }
        }
    }

    pub fn pointer_up(&mut self, ctx: &ActionContext) -> TwoPointEvent {
        let Some(start) = self.start else {
            return TwoPointEvent::Pending;
        };
        if !self.pressed {
            return TwoPointEvent::Pending;
        }
        self.pressed = false;
        if distance(start, ctx.cursor) >= ctx.world_dist(ctx.config.box_select_threshold) {
            self.reset();
            TwoPointEvent::Done(start, ctx.cursor)
        } else {
            TwoPointEvent::Pending
        }
    }
}
