//! 选择集
//!
//! 只按 id 引用图形，不持有图形本身。删除图形后必须调用 [`Selection::retain_existing`]
//! 清除失效的 id。

use crate::shape::{Shape, ShapeId};

/// 选择集（保持选中顺序，无重复）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    ids: Vec<ShapeId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ids(&self) -> &[ShapeId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: &ShapeId) -> bool {
        self.ids.contains(id)
    }

    /// 恰好选中一个图形时返回它的 id
    pub fn primary(&self) -> Option<&ShapeId> {
        match self.ids.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }

    /// 只选中这一个
    pub fn select_only(&mut self, id: ShapeId) {
        self.ids.clear();
        self.ids.push(id);
    }

    /// 替换为给定集合（去重）
    pub fn set(&mut self, ids: impl IntoIterator<Item = ShapeId>) {
        self.ids.clear();
        for id in ids {
            self.add(id);
        }
    }

    pub fn add(&mut self, id: ShapeId) {
        if !self.contains(&id) {
            self.ids.push(id);
        }
    }

    /// 切换成员关系（Shift 点击）
    pub fn toggle(&mut self, id: ShapeId) {
        if let Some(pos) = self.ids.iter().position(|i| i == &id) {
            self.ids.remove(pos);
        } else {
            self.ids.push(id);
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// 移除文档中已不存在的 id，返回移除数量
    pub fn retain_existing(&mut self, shapes: &[Shape]) -> usize {
        let before = self.ids.len();
        self.ids.retain(|id| shapes.iter().any(|s| &s.id == id));
        before - self.ids.len()
    }

    /// 按文档 z 序取出选中的图形
    pub fn shapes<'a>(&self, shapes: &'a [Shape]) -> Vec<&'a Shape> {
        shapes.iter().filter(|s| self.contains(&s.id)).collect()
    }
}
