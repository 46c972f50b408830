//! 文档存储
//!
//! 图形列表的唯一可信来源。所有修改都通过这里的操作完成，
//! 每次真正改变图形列表的操作恰好产生一个历史快照。
//! 对不存在的 id 的操作静默忽略。

use crate::geometry::Geometry;
use crate::history::{History, Snapshot, DEFAULT_HISTORY_DEPTH};
use crate::math::BoundingBox2;
use crate::properties::Properties;
use crate::shape::{Shape, ShapeId};
use crate::update::{normalize, sanitize, ShapeUpdate};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// 文档存储
#[derive(Debug, Clone)]
pub struct DocumentStore {
    history: History,
}

impl DocumentStore {
    pub fn new(history_depth: usize) -> Self {
        Self {
            history: History::new(history_depth),
        }
    }

    /// 当前图形列表（z 序，后者在上）
    pub fn shapes(&self) -> &[Shape] {
        self.history.current()
    }

    /// 当前快照的共享引用
    pub fn snapshot(&self) -> Snapshot {
        self.history.current().clone()
    }

    pub fn get(&self, id: &ShapeId) -> Option<&Shape> {
        self.shapes().iter().find(|s| &s.id == id)
    }

    pub fn contains(&self, id: &ShapeId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.shapes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes().is_empty()
    }

    /// 所有图形的包围盒
    pub fn bounding_box(&self) -> BoundingBox2 {
        self.shapes()
            .iter()
            .fold(BoundingBox2::empty(), |acc, s| acc.union(&s.geometry.bounding_box()))
    }

    fn commit(&mut self, shapes: Vec<Shape>) {
        self.history.push(shapes);
    }

    fn working_copy(&self) -> Vec<Shape> {
        self.shapes().to_vec()
    }

    /// 添加图形，返回新 id；几何含非有限数值时返回 `None`
    pub fn add_shape(&mut self, geometry: Geometry, properties: Properties) -> Option<ShapeId> {
        self.add_shapes(vec![(geometry, properties)]).into_iter().next()
    }

    /// 批量添加图形（一个快照），返回成功添加的 id
    pub fn add_shapes(&mut self, items: Vec<(Geometry, Properties)>) -> Vec<ShapeId> {
        let mut shapes = self.working_copy();
        let mut ids = Vec::with_capacity(items.len());
        for (geometry, properties) in items {
            let Some(geometry) = sanitize(geometry) else {
                continue;
            };
            let shape = Shape::new(geometry, properties);
            ids.push(shape.id.clone());
            shapes.push(shape);
        }
        if !ids.is_empty() {
            self.commit(shapes);
        }
        ids
    }

    /// 更新单个图形，返回是否产生了变化
    pub fn update_shape(&mut self, id: &ShapeId, update: &ShapeUpdate) -> bool {
        self.update_shapes(&[(id.clone(), update.clone())]) > 0
    }

    /// 批量更新（一个手势一个快照），返回实际变化的图形数量
    pub fn update_shapes(&mut self, updates: &[(ShapeId, ShapeUpdate)]) -> usize {
        let mut shapes = self.working_copy();
        let mut changed = 0;
        for (id, update) in updates {
            match shapes.iter_mut().find(|s| &s.id == id) {
                Some(shape) => {
                    if update.apply(shape) {
                        changed += 1;
                    }
                }
                None => debug!(%id, "update on missing shape ignored"),
            }
        }
        if changed > 0 {
            self.commit(shapes);
        }
        changed
    }

    pub fn delete_shape(&mut self, id: &ShapeId) -> bool {
        self.delete_shapes(std::slice::from_ref(id)) > 0
    }

    /// 批量删除，返回删除数量
    pub fn delete_shapes(&mut self, ids: &[ShapeId]) -> usize {
        let remove: HashSet<&ShapeId> = ids.iter().collect();
        let mut shapes = self.working_copy();
        let before = shapes.len();
        shapes.retain(|s| !remove.contains(&s.id));
        let removed = before - shapes.len();
        if removed > 0 {
            self.commit(shapes);
        }
        removed
    }

    /// 原子替换：删除 `remove` 中的图形并插入新图形
    ///
    /// 新图形放在第一个被删除图形的 z 序位置。任一 id 不存在时整个操作放弃，返回 `None`。
    pub fn replace_shapes(
        &mut self,
        remove: &[ShapeId],
        insert: Vec<(Geometry, Properties)>,
    ) -> Option<Vec<ShapeId>> {
        if let Some(missing) = remove.iter().find(|id| !self.contains(id)) {
            debug!(id = %missing, "replace aborted, shape no longer exists");
            return None;
        }

        let remove: HashSet<&ShapeId> = remove.iter().collect();
        let mut shapes = self.working_copy();
        let position = shapes
            .iter()
            .position(|s| remove.contains(&s.id))
            .unwrap_or(shapes.len());
        shapes.retain(|s| !remove.contains(&s.id));

        let new_shapes: Vec<Shape> = insert
            .into_iter()
            .filter_map(|(geometry, properties)| {
                sanitize(geometry).map(|g| Shape::new(g, properties))
            })
            .collect();
        let ids = new_shapes.iter().map(|s| s.id.clone()).collect();
        let position = position.min(shapes.len());
        shapes.splice(position..position, new_shapes);

        self.commit(shapes);
        Some(ids)
    }

    /// 新建空白图纸（历史重置）
    pub fn create_new_drawing(&mut self) {
        self.history.reset(Vec::new());
        info!("new drawing");
    }

    /// 整体载入图形，保留原 id，历史重置
    ///
    /// 含非有限数值的图形被跳过，重复 id 只保留第一个。返回载入数量。
    pub fn load_shapes(&mut self, shapes: Vec<Shape>) -> usize {
        let mut seen = HashSet::new();
        let mut loaded = Vec::with_capacity(shapes.len());
        for mut shape in shapes {
            if !crate::update::is_finite(&shape.geometry) {
                warn!(id = %shape.id, "skipping shape with non-finite values");
                continue;
            }
            if !seen.insert(shape.id.clone()) {
                warn!(id = %shape.id, "skipping duplicate shape id");
                continue;
            }
            normalize(&mut shape.geometry);
            loaded.push(shape);
        }
        let count = loaded.len();
        self.history.reset(loaded);
        info!(count, "loaded drawing");
        count
    }

    pub fn undo(&mut self) -> bool {
        self.history.undo().is_some()
    }

    pub fn redo(&mut self) -> bool {
        self.history.redo().is_some()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_DEPTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Circle, Line, Rectangle};
    use crate::math::Point2;

    fn line_geom(x: f64) -> Geometry {
        Geometry::Line(Line::new(Point2::new(x, 0.0), Point2::new(x + 10.0, 0.0)))
    }

    #[test]
    fn test_add_shape_assigns_unique_ids() {
        let mut store = DocumentStore::default();
        let a = store.add_shape(line_geom(0.0), Properties::default());
        let b = store.add_shape(line_geom(5.0), Properties::default());
        assert!(a.is_some() && b.is_some());
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
        assert_eq!(store.history_len(), 3);
    }

    #[test]
    fn test_add_rejects_non_finite() {
        let mut store = DocumentStore::default();
        let geom = Geometry::Circle(Circle::new(Point2::new(f64::NAN, 0.0), 1.0));
        assert!(store.add_shape(geom, Properties::default()).is_none());
        assert_eq!(store.history_len(), 1);
    }

    #[test]
    fn test_batch_update_is_one_snapshot() {
        let mut store = DocumentStore::default();
        let ids = store.add_shapes(vec![
            (line_geom(0.0), Properties::default()),
            (line_geom(20.0), Properties::default()),
            (line_geom(40.0), Properties::default()),
        ]);
        let before = store.history_len();

        let updates: Vec<_> = ids
            .iter()
            .map(|id| {
                let update = ShapeUpdate {
                    p1: Some(Point2::new(1.0, 1.0)),
                    ..Default::default()
                };
                (id.clone(), update)
            })
            .collect();
        assert_eq!(store.update_shapes(&updates), 3);
        assert_eq!(store.history_len(), before + 1);
    }

    #[test]
    fn test_update_missing_id_is_noop() {
        let mut store = DocumentStore::default();
        store.add_shape(line_geom(0.0), Properties::default());
        let before = store.history_len();
        let changed = store.update_shape(&ShapeId::from("gone"), &ShapeUpdate::position(1.0, 2.0));
        assert!(!changed);
        assert_eq!(store.history_len(), before);
    }

    #[test]
    fn test_undo_restores_previous_snapshot() {
        let mut store = DocumentStore::default();
        let id = store
            .add_shape(
                Geometry::Rectangle(Rectangle::new(0.0, 0.0, 10.0, 10.0)),
                Properties::default(),
            )
            .unwrap();
        let before = store.shapes().to_vec();
        store.update_shape(&id, &ShapeUpdate::position(50.0, 50.0));
        assert_ne!(store.shapes(), before.as_slice());

        assert!(store.undo());
        assert_eq!(store.shapes(), before.as_slice());
        assert!(store.redo());
        assert!(!store.redo());
    }

    #[test]
    fn test_replace_shapes_keeps_z_order() {
        let mut store = DocumentStore::default();
        let ids = store.add_shapes(vec![
            (line_geom(0.0), Properties::default()),
            (line_geom(20.0), Properties::default()),
            (line_geom(40.0), Properties::default()),
        ]);
        let new_ids = store
            .replace_shapes(
                &ids[1..2],
                vec![
                    (line_geom(100.0), Properties::default()),
                    (line_geom(200.0), Properties::default()),
                ],
            )
            .unwrap();
        let order: Vec<_> = store.shapes().iter().map(|s| s.id.clone()).collect();
        assert_eq!(order, vec![ids[0].clone(), new_ids[0].clone(), new_ids[1].clone(), ids[2].clone()]);
    }

    #[test]
    fn test_replace_with_stale_id_aborts() {
        let mut store = DocumentStore::default();
        let id = store.add_shape(line_geom(0.0), Properties::default()).unwrap();
        let before = store.history_len();
        let result = store.replace_shapes(
            &[id, ShapeId::from("gone")],
            vec![(line_geom(1.0), Properties::default())],
        );
        assert!(result.is_none());
        assert_eq!(store.len(), 1);
        assert_eq!(store.history_len(), before);
    }

    #[test]
    fn test_delete_and_new_drawing() {
        let mut store = DocumentStore::default();
        let ids = store.add_shapes(vec![
            (line_geom(0.0), Properties::default()),
            (line_geom(20.0), Properties::default()),
        ]);
        assert_eq!(store.delete_shapes(&ids), 2);
        assert!(store.is_empty());
        assert_eq!(store.delete_shapes(&ids), 0);

        store.create_new_drawing();
        assert!(!store.can_undo());
        assert_eq!(store.history_len(), 1);
    }

    #[test]
    fn test_load_preserves_ids_and_dedupes() {
        let mut store = DocumentStore::default();
        store.add_shape(line_geom(0.0), Properties::default());
        let shapes = vec![
            Shape::with_id("keep", line_geom(1.0), Properties::default()),
            Shape::with_id("keep", line_geom(2.0), Properties::default()),
            Shape::with_id(
                "neg",
                Geometry::Rectangle(Rectangle::new(10.0, 10.0, -4.0, 3.0)),
                Properties::default(),
            ),
        ];
        assert_eq!(store.load_shapes(shapes), 2);
        assert!(!store.can_undo());
        assert!(store.contains(&ShapeId::from("keep")));
        let Geometry::Rectangle(r) = &store.get(&ShapeId::from("neg")).unwrap().geometry else {
            panic!("expected rectangle");
        };
        assert_eq!((r.x, r.width), (6.0, 4.0));
    }

    #[test]
    fn test_positive_extent_after_updates() {
        let mut store = DocumentStore::default();
        let id = store
            .add_shape(
                Geometry::Circle(Circle::new(Point2::origin(), 5.0)),
                Properties::default(),
            )
            .unwrap();
        for r in [-3.0, 0.0, f64::NAN, 1e-9] {
            store.update_shape(
                &id,
                &ShapeUpdate {
                    r: Some(r),
                    ..Default::default()
                },
            );
            let Geometry::Circle(c) = &store.get(&id).unwrap().geometry else {
                panic!("expected circle");
            };
            assert!(c.r > 0.0);
        }
    }
}
