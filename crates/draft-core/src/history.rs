//! 线性快照历史
//!
//! 每个快照都是不可变的完整图形列表，`cursor` 指向当前快照。
//! 新的提交会先截断 cursor 之后的所有快照（丢弃 redo 分支）再追加。

use crate::shape::Shape;
use std::sync::Arc;

/// 默认历史深度
pub const DEFAULT_HISTORY_DEPTH: usize = 500;

/// 文档快照（共享只读）
pub type Snapshot = Arc<Vec<Shape>>;

/// 快照历史
#[derive(Debug, Clone)]
pub struct History {
    snapshots: Vec<Snapshot>,
    cursor: usize,
    max_depth: usize,
}

impl History {
    /// 以空文档作为唯一快照创建历史
    pub fn new(max_depth: usize) -> Self {
        Self::with_initial(Vec::new(), max_depth)
    }

    pub fn with_initial(shapes: Vec<Shape>, max_depth: usize) -> Self {
        Self {
            snapshots: vec![Arc::new(shapes)],
            cursor: 0,
            max_depth: max_depth.max(1),
        }
    }

    /// 当前快照
    pub fn current(&self) -> &Snapshot {
        &self.snapshots[self.cursor]
    }

    /// 提交新快照
    pub fn push(&mut self, shapes: Vec<Shape>) {
        // 截断 redo 历史
        self.snapshots.truncate(self.cursor + 1);
        self.snapshots.push(Arc::new(shapes));

        // 超出深度时丢弃最旧的快照
        if self.snapshots.len() > self.max_depth {
            let excess = self.snapshots.len() - self.max_depth;
            self.snapshots.drain(..excess);
        }
        self.cursor = self.snapshots.len() - 1;
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    /// 后退一步，返回新的当前快照
    pub fn undo(&mut self) -> Option<&Snapshot> {
        if self.can_undo() {
            self.cursor -= 1;
            Some(&self.snapshots[self.cursor])
        } else {
            None
        }
    }

    /// 前进一步，返回新的当前快照
    pub fn redo(&mut self) -> Option<&Snapshot> {
        if self.can_redo() {
            self.cursor += 1;
            Some(&self.snapshots[self.cursor])
        } else {
            None
        }
    }

    /// 重置为只包含给定内容的历史
    pub fn reset(&mut self, shapes: Vec<Shape>) {
        self.snapshots.clear();
        self.snapshots.push(Arc::new(shapes));
        self.cursor = 0;
    }

    /// 快照数量
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_DEPTH)
    }
}
