//! 编辑器状态对象
//!
//! 持有文档、选择集、视图、捕捉引擎、剪贴板和当前工具，
//! 把屏幕坐标的指针/键盘事件分派给当前 Action，再把结果提交到文档。
//! 所有状态都在这里显式保存，宿主只需要转发输入事件并读取预览。

use crate::action::{Action, ActionContext, ActionResult, ActionType, PreviewGeometry};
use crate::actions::{create_action, PlaceAction, Placement};
use crate::state::{EditorConfig, Key, Modifiers};
use draft_core::clipboard::Clipboard;
use draft_core::document::DocumentStore;
use draft_core::generate::{generate_shapes, GenerateError, ShapeGenerator};
use draft_core::hit::hit_test;
use draft_core::math::{Point2, Vector2};
use draft_core::properties::Properties;
use draft_core::selection::Selection;
use draft_core::shape::{Shape, ShapeId};
use draft_core::snap::{apply_ortho, InferenceLine, SnapConfig, SnapEngine, SnapResult};
use draft_core::transform::translate;
use draft_core::update::ShapeUpdate;
use draft_core::view::{ViewConfig, ViewTransform};
use tracing::debug;

/// 最近一次解析的光标
#[derive(Debug, Clone)]
struct Cursor {
    /// 屏幕坐标
    screen: Point2,
    /// 世界坐标（未捕捉）
    raw: Point2,
    /// 捕捉/推断结果
    snap: SnapResult,
    /// 最终使用的点（含正交约束）
    point: Point2,
}

impl Cursor {
    fn at(screen: Point2, raw: Point2) -> Self {
        Self {
            screen,
            raw,
            snap: SnapResult::raw(raw),
            point: raw,
        }
    }
}

/// 编辑器
pub struct Editor {
    store: DocumentStore,
    selection: Selection,
    view: ViewTransform,
    view_config: ViewConfig,
    snap: SnapEngine,
    clipboard: Clipboard,
    config: EditorConfig,
    /// 新建图形使用的属性
    current_properties: Properties,
    action: Box<dyn Action>,
    ortho: bool,
    modifiers: Modifiers,
    /// 按下到抬起之间为 true，保证一次手势只提交一次
    pointer_captured: bool,
    cursor: Cursor,
    hover: Option<ShapeId>,
    viewport: (f64, f64),
}

impl Editor {
    pub fn new(config: EditorConfig) -> Self {
        Self::with_configs(config, SnapConfig::default(), ViewConfig::default())
    }

    pub fn with_configs(
        config: EditorConfig,
        snap_config: SnapConfig,
        view_config: ViewConfig,
    ) -> Self {
        Self {
            store: DocumentStore::new(config.history_depth),
            selection: Selection::new(),
            view: ViewTransform::default(),
            view_config,
            snap: SnapEngine::new(snap_config),
            clipboard: Clipboard::default(),
            config,
            current_properties: Properties::default(),
            action: create_action(ActionType::Select),
            ortho: false,
            modifiers: Modifiers::NONE,
            pointer_captured: false,
            cursor: Cursor::at(Point2::origin(), Point2::origin()),
            hover: None,
            viewport: (0.0, 0.0),
        }
    }

    // ========== 查询 ==========

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    pub fn shapes(&self) -> &[Shape] {
        self.store.shapes()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn snap_config_mut(&mut self) -> &mut SnapConfig {
        self.snap.config_mut()
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    pub fn current_properties(&self) -> &Properties {
        &self.current_properties
    }

    pub fn set_current_properties(&mut self, properties: Properties) {
        self.current_properties = properties;
    }

    pub fn action_type(&self) -> ActionType {
        self.action.action_type()
    }

    pub fn prompt(&self) -> &str {
        self.action.get_prompt()
    }

    pub fn is_ortho(&self) -> bool {
        self.ortho
    }

    pub fn set_ortho(&mut self, ortho: bool) {
        self.ortho = ortho;
    }

    /// 光标下的图形（仅用于高亮）
    pub fn hover(&self) -> Option<&ShapeId> {
        self.hover.as_ref()
    }

    /// 最近一次的捕捉结果
    pub fn snap_result(&self) -> &SnapResult {
        &self.cursor.snap
    }

    pub fn inference_lines(&self) -> &[InferenceLine] {
        &self.cursor.snap.inference
    }

    /// 最近一次解析后的光标世界坐标
    pub fn cursor_world(&self) -> Point2 {
        self.cursor.point
    }

    pub fn cursor_screen(&self) -> Point2 {
        self.cursor.screen
    }

    pub fn is_pointer_captured(&self) -> bool {
        self.pointer_captured
    }

    // ========== 工具 ==========

    /// 切换工具，丢弃当前工具的中间状态
    pub fn set_tool(&mut self, action_type: ActionType) {
        self.action.reset();
        self.pointer_captured = false;
        self.action = create_action(action_type);
        debug!(tool = action_type.name(), "tool changed");
    }

    /// 当前工具的预览
    pub fn previews(&self) -> Vec<PreviewGeometry> {
        let ctx = self.context();
        self.action.get_preview(&ctx)
    }

    fn context(&self) -> ActionContext<'_> {
        ActionContext {
            cursor: self.cursor.point,
            raw: self.cursor.raw,
            snapped: self.cursor.snap.is_snapped(),
            shapes: self.store.shapes(),
            selection: &self.selection,
            scale: self.view.scale,
            modifiers: self.modifiers,
            config: &self.config,
        }
    }

    /// 解析光标：捕捉（排除正在编辑的图形），再应用正交约束
    fn resolve_cursor(&mut self, screen: Point2) {
        let raw = self.view.screen_to_world(screen);
        let mut cursor = Cursor::at(screen, raw);

        if self.action.wants_snap() {
            let exclude = self.action.editing_ids();
            cursor.snap = self
                .snap
                .resolve(raw, self.store.shapes(), &exclude, self.view.scale);
            cursor.point = cursor.snap.point;
        }

        if self.ortho && !self.modifiers.shift && !cursor.snap.is_snapped() {
            if let Some(anchor) = self.action.anchor() {
                cursor.point = apply_ortho(anchor, cursor.point);
            }
        }
        self.cursor = cursor;
    }

    /// 以当前光标把事件交给 Action，并提交结果
    fn dispatch(&mut self, event: fn(&mut dyn Action, &ActionContext) -> ActionResult) {
        let ctx = ActionContext {
            cursor: self.cursor.point,
            raw: self.cursor.raw,
            snapped: self.cursor.snap.is_snapped(),
            shapes: self.store.shapes(),
            selection: &self.selection,
            scale: self.view.scale,
            modifiers: self.modifiers,
            config: &self.config,
        };
        let result = event(self.action.as_mut(), &ctx);
        self.apply_result(result);
    }

    // ========== 指针事件（屏幕坐标） ==========

    pub fn pointer_down(&mut self, screen: Point2, modifiers: Modifiers) {
        self.modifiers = modifiers;
        self.resolve_cursor(screen);
        self.pointer_captured = true;
        self.dispatch(|action, ctx| action.on_pointer_down(ctx));
    }

    pub fn pointer_move(&mut self, screen: Point2, modifiers: Modifiers) {
        self.modifiers = modifiers;
        self.resolve_cursor(screen);
        self.hover = if self.action.is_busy() {
            None
        } else {
            let tolerance = self.view.screen_dist_to_world(self.config.pick_tolerance);
            hit_test(self.store.shapes(), self.cursor.raw, tolerance, &[]).map(|s| s.id.clone())
        };
        self.dispatch(|action, ctx| action.on_pointer_move(ctx));
    }

    /// 指针抬起；没有对应的按下时忽略（重复的抬起事件不会重复提交）
    pub fn pointer_up(&mut self, screen: Point2, modifiers: Modifiers) {
        if !self.pointer_captured {
            debug!("pointer up without capture ignored");
            return;
        }
        self.pointer_captured = false;
        self.modifiers = modifiers;
        self.resolve_cursor(screen);
        self.dispatch(|action, ctx| action.on_pointer_up(ctx));
    }

    // ========== 视图 ==========

    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport = (width, height);
    }

    /// 滚轮缩放，光标下的世界点保持不动
    pub fn wheel(&mut self, screen: Point2, steps: f64) {
        self.view.zoom_wheel(screen, steps, &self.view_config);
    }

    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.view.pan(dx, dy);
    }

    pub fn reset_view(&mut self) {
        let (w, h) = self.viewport;
        self.view.reset(w, h);
    }

    pub fn zoom_to_fit(&mut self) {
        let (w, h) = self.viewport;
        self.view = ViewTransform::zoom_to_fit(&self.store.bounding_box(), w, h, &self.view_config);
    }

    // ========== 键盘 ==========

    /// 处理按键，返回是否被消费
    pub fn key_down(&mut self, key: Key, modifiers: Modifiers) -> bool {
        self.modifiers = modifiers;
        match key {
            Key::Escape => {
                self.escape();
                true
            }
            Key::Delete | Key::Backspace => self.delete_selected() > 0,
            Key::ArrowUp | Key::ArrowDown | Key::ArrowLeft | Key::ArrowRight => {
                let step = if modifiers.shift {
                    self.config.nudge_step_large
                } else {
                    self.config.nudge_step
                };
                let delta = match key {
                    Key::ArrowUp => Vector2::new(0.0, -step),
                    Key::ArrowDown => Vector2::new(0.0, step),
                    Key::ArrowLeft => Vector2::new(-step, 0.0),
                    _ => Vector2::new(step, 0.0),
                };
                self.nudge(delta) > 0
            }
            Key::Char(c) if modifiers.ctrl => match c.to_ascii_lowercase() {
                'a' => {
                    self.select_all();
                    true
                }
                'c' => self.copy() > 0,
                'x' => self.cut() > 0,
                'v' => !self.paste().is_empty(),
                'z' if modifiers.shift => self.redo(),
                'z' => self.undo(),
                'y' => self.redo(),
                _ => false,
            },
            Key::Char(c) => {
                if c.eq_ignore_ascii_case(&'o') {
                    self.ortho = !self.ortho;
                    return true;
                }
                match ActionType::from_key(c) {
                    Some(t) => {
                        self.set_tool(t);
                        true
                    }
                    None => false,
                }
            }
        }
    }

    /// Escape：先取消进行中的手势，其次清空选择，最后回到选择工具
    pub fn escape(&mut self) {
        self.pointer_captured = false;
        if self.action.on_escape() {
            debug!("gesture cancelled");
        } else if !self.selection.is_empty() {
            self.selection.clear();
        } else if self.action_type() != ActionType::Select {
            self.set_tool(ActionType::Select);
        }
    }

    // ========== 编辑命令 ==========

    /// 平移选中图形（一个历史快照），返回变化的图形数
    pub fn nudge(&mut self, delta: Vector2) -> usize {
        if self.action.is_busy() || self.selection.is_empty() {
            return 0;
        }
        let updates: Vec<(ShapeId, ShapeUpdate)> = self
            .selection
            .shapes(self.store.shapes())
            .into_iter()
            .map(|s| {
                (
                    s.id.clone(),
                    ShapeUpdate::from_geometry(&translate(&s.geometry, delta)),
                )
            })
            .collect();
        self.store.update_shapes(&updates)
    }

    /// 修改单个图形（属性面板），部分字段浅合并，返回是否有变化
    pub fn update_shape(&mut self, id: &ShapeId, update: ShapeUpdate) -> bool {
        let changed = self.store.update_shapes(&[(id.clone(), update)]);
        self.reconcile_selection();
        changed > 0
    }

    /// 对所有选中图形应用同一更新（一个历史快照），返回变化的图形数
    pub fn update_selected(&mut self, update: &ShapeUpdate) -> usize {
        if self.selection.is_empty() {
            return 0;
        }
        let updates: Vec<(ShapeId, ShapeUpdate)> = self
            .selection
            .ids()
            .iter()
            .map(|id| (id.clone(), update.clone()))
            .collect();
        let changed = self.store.update_shapes(&updates);
        self.reconcile_selection();
        changed
    }

    /// 设置放置工具要放的对象，并切换到对应工具
    pub fn set_placement(&mut self, placement: Placement) {
        self.action.reset();
        self.pointer_captured = false;
        let action = PlaceAction::new(placement);
        debug!(tool = action.name(), "placement changed");
        self.action = Box::new(action);
    }

    pub fn delete_selected(&mut self) -> usize {
        if self.selection.is_empty() {
            return 0;
        }
        let ids = self.selection.ids().to_vec();
        let removed = self.store.delete_shapes(&ids);
        self.reconcile_selection();
        removed
    }

    pub fn select_all(&mut self) {
        let ids: Vec<ShapeId> = self.store.shapes().iter().map(|s| s.id.clone()).collect();
        self.selection.set(ids);
    }

    /// 复制选中图形到剪贴板，返回复制数量
    pub fn copy(&mut self) -> usize {
        if self.selection.is_empty() {
            return 0;
        }
        self.clipboard = Clipboard::capture(self.selection.shapes(self.store.shapes()));
        self.clipboard.shapes.len()
    }

    /// 剪切：复制后删除（一个历史快照）
    pub fn cut(&mut self) -> usize {
        let copied = self.copy();
        if copied > 0 {
            self.delete_selected();
        }
        copied
    }

    /// 在光标处粘贴，新图形成为选择集
    pub fn paste(&mut self) -> Vec<ShapeId> {
        if self.clipboard.is_empty() {
            return Vec::new();
        }
        let items = self.clipboard.paste_at(self.cursor.point);
        let ids = self.store.add_shapes(items);
        self.selection.set(ids.clone());
        ids
    }

    pub fn undo(&mut self) -> bool {
        self.action.reset();
        let changed = self.store.undo();
        self.reconcile_selection();
        changed
    }

    pub fn redo(&mut self) -> bool {
        self.action.reset();
        let changed = self.store.redo();
        self.reconcile_selection();
        changed
    }

    /// 新建空白图纸
    pub fn new_drawing(&mut self) {
        self.action.reset();
        self.store.create_new_drawing();
        self.selection.clear();
        self.hover = None;
    }

    /// 整体替换文档（保留 id），返回载入数量
    pub fn load_shapes(&mut self, shapes: Vec<Shape>) -> usize {
        self.action.reset();
        self.selection.clear();
        self.hover = None;
        self.store.load_shapes(shapes)
    }

    /// 调用生成服务并插入结果；失败时文档不变
    pub async fn generate<G: ShapeGenerator + ?Sized>(
        &mut self,
        generator: &G,
        prompt: &str,
    ) -> Result<Vec<ShapeId>, GenerateError> {
        let ids = generate_shapes(&mut self.store, generator, prompt).await?;
        self.selection.set(ids.clone());
        Ok(ids)
    }

    // ========== 提交 ==========

    fn apply_result(&mut self, result: ActionResult) {
        match result {
            ActionResult::Continue => return,
            ActionResult::CreateShapes(geometries) => {
                let items = geometries
                    .into_iter()
                    .map(|g| (g, self.current_properties.clone()))
                    .collect();
                let ids = self.store.add_shapes(items);
                debug!(count = ids.len(), "shapes created");
            }
            ActionResult::ModifyShapes(updates) => {
                let changed = self.store.update_shapes(&updates);
                debug!(changed, "shapes modified");
            }
            ActionResult::DeleteShapes(ids) => {
                self.store.delete_shapes(&ids);
            }
            ActionResult::ReplaceShapes { remove, insert } => {
                if self.store.replace_shapes(&remove, insert).is_none() {
                    debug!("replace skipped");
                }
            }
            ActionResult::SetSelection(ids) => {
                self.selection.set(ids);
            }
            ActionResult::Cancel => {
                self.set_tool(ActionType::Select);
            }
        }
        self.reconcile_selection();
    }

    /// 去掉选择集中已不存在的图形
    fn reconcile_selection(&mut self) {
        let dropped = self.selection.retain_existing(self.store.shapes());
        if dropped > 0 {
            debug!(dropped, "stale ids removed from selection");
        }
        if self
            .hover
            .as_ref()
            .is_some_and(|id| !self.store.contains(id))
        {
            self.hover = None;
        }
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("tool", &self.action.name())
            .field("shapes", &self.store.len())
            .field("selection", &self.selection)
            .field("view", &self.view)
            .finish()
    }
}
