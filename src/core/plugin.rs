use crate::config::toml_config::CalendarConfig;
use crate::config::PluginOptions;
use crate::core::compiler::MarkCompiler;
use crate::core::dates::parse_date;
use crate::core::scheduler::{Scheduler, TaskId, TaskKind};
use crate::core::store::{validate_batch, RangeStore};
use crate::domain::events::{DateClickEvent, PluginEvent, RangeClickEvent};
use crate::domain::model::{Mark, Range, RangeInput};
use crate::domain::ports::HostCalendar;
use crate::utils::error::Result;
use serde::Serialize;
use std::time::Duration;
use tokio::sync::broadcast;

const MARK_CLICK: &str = "markClick";
const DATE_CLICK: &str = "dateClick";
const EVENT_CHANNEL_CAPACITY: usize = 256;

type RangeClickHook = Box<dyn FnMut(&RangeClickEvent)>;
type DateClickHook = Box<dyn FnMut(&DateClickEvent)>;
type RangeAddHook = Box<dyn FnMut(&Range)>;
type RangeRemoveHook = Box<dyn FnMut(&str, &Range)>;

/// 使用者回呼
#[derive(Default)]
pub struct PluginHooks {
    on_range_click: Option<RangeClickHook>,
    on_date_click: Option<DateClickHook>,
    on_range_add: Option<RangeAddHook>,
    on_range_remove: Option<RangeRemoveHook>,
}

impl PluginHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_range_click(mut self, hook: impl FnMut(&RangeClickEvent) + 'static) -> Self {
        self.on_range_click = Some(Box::new(hook));
        self
    }

    pub fn on_date_click(mut self, hook: impl FnMut(&DateClickEvent) + 'static) -> Self {
        self.on_date_click = Some(Box::new(hook));
        self
    }

    pub fn on_range_add(mut self, hook: impl FnMut(&Range) + 'static) -> Self {
        self.on_range_add = Some(Box::new(hook));
        self
    }

    pub fn on_range_remove(mut self, hook: impl FnMut(&str, &Range) + 'static) -> Self {
        self.on_range_remove = Some(Box::new(hook));
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Active,
    Paused,
    Destroyed,
}

#[derive(Debug, Clone, Serialize)]
pub struct PluginInfo {
    pub range_count: usize,
    pub date_count: usize,
    pub mark_count: usize,
    pub options: PluginOptions,
    pub is_destroyed: bool,
    pub is_paused: bool,
}

/// 日期範圍標記插件：持有範圍資料、編譯標記並安裝到宿主日曆。
///
/// All work runs on the caller's thread. Debounced refreshes and chunked
/// loads are tasks on an internal virtual clock, driven by [`advance`] or by
/// the async [`run_pending`].
///
/// After [`destroy`] every operation is an inert no-op.
///
/// [`advance`]: DateRangePlugin::advance
/// [`run_pending`]: DateRangePlugin::run_pending
/// [`destroy`]: DateRangePlugin::destroy
pub struct DateRangePlugin<H: HostCalendar> {
    host: H,
    options: PluginOptions,
    hooks: PluginHooks,
    store: RangeStore,
    scheduler: Scheduler,
    refresh_task: Option<TaskId>,
    /// 分批安裝進行中時，只有前 N 筆範圍會被編譯安裝
    install_limit: Option<usize>,
    installed: Vec<Mark>,
    lifecycle: Lifecycle,
    events: broadcast::Sender<PluginEvent>,
}

impl<H: HostCalendar> DateRangePlugin<H> {
    pub fn new(mut host: H, options: PluginOptions) -> Self {
        if options.clickable {
            host.on(MARK_CLICK);
            host.on(DATE_CLICK);
        }
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Self {
            host,
            options,
            hooks: PluginHooks::default(),
            store: RangeStore::new(),
            scheduler: Scheduler::new(),
            refresh_task: None,
            install_limit: None,
            installed: Vec::new(),
            lifecycle: Lifecycle::Active,
            events,
        }
    }

    /// 由設定檔建立插件並載入初始範圍
    pub fn from_config(host: H, config: &CalendarConfig) -> Result<Self> {
        let options = config.plugin_options()?;
        let mut plugin = Self::new(host, options);
        if !config.ranges.is_empty() {
            plugin.load(&config.ranges)?;
        }
        Ok(plugin)
    }

    pub fn with_hooks(mut self, hooks: PluginHooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PluginEvent> {
        self.events.subscribe()
    }

    pub fn add(&mut self, input: RangeInput) -> Result<()> {
        if self.is_destroyed() {
            return Ok(());
        }

        let range = self.store.add(&input)?.clone();
        tracing::debug!("Added range '{}'", range.code);
        self.schedule_refresh();

        if let Some(hook) = self.hooks.on_range_add.as_mut() {
            hook(&range);
        }
        self.emit(PluginEvent::RangeAdded { range });
        Ok(())
    }

    /// 移除範圍；code 不存在時回傳 `false`。
    pub fn remove(&mut self, code: &str) -> bool {
        if self.is_destroyed() {
            return false;
        }

        let Some(range) = self.store.take(code) else {
            tracing::warn!("Range with code '{}' not found", code);
            return false;
        };
        self.schedule_refresh();

        if let Some(hook) = self.hooks.on_range_remove.as_mut() {
            hook(code, &range);
        }
        self.emit(PluginEvent::RangeRemoved {
            code: code.to_string(),
            range,
        });
        true
    }

    pub fn update(&mut self, code: &str, patch: RangeInput) -> Result<()> {
        if self.is_destroyed() {
            return Ok(());
        }

        let range = self.store.update(code, patch)?.clone();
        self.schedule_refresh();
        self.emit(PluginEvent::RangeUpdated {
            code: code.to_string(),
            range,
        });
        Ok(())
    }

    pub fn clear(&mut self) {
        if self.is_destroyed() {
            return;
        }

        self.cancel_batches();
        let count = self.store.clear();
        self.refresh();
        self.emit(PluginEvent::RangesCleared { count });
    }

    /// 整批取代現有範圍。全部驗證通過才一次寫入 store；開啟 `chunked_load`
    /// 且數量超過 `max_ranges_per_batch` 時，只有安裝到宿主的工作分批進行：
    /// 第一批立即安裝，其餘每隔 `batch_update_delay_ms` 安裝一批。
    pub fn load(&mut self, inputs: &[RangeInput]) -> Result<usize> {
        if self.is_destroyed() {
            return Ok(0);
        }

        let ranges = validate_batch(inputs)?;
        let count = ranges.len();
        self.cancel_batches();
        self.store.replace_all(ranges);

        let batch_size = self.options.max_ranges_per_batch.max(1);
        let chunked = self.options.chunked_load && count > batch_size;
        if chunked && self.lifecycle == Lifecycle::Active {
            tracing::debug!(
                "Installing {} ranges in {} batches",
                count,
                count.div_ceil(batch_size)
            );
            self.install_limit = Some(0);
            self.install_next_batch();
        } else {
            // 暫停時 refresh 不做事，resume 會一次安裝全部
            self.refresh();
        }

        self.emit(PluginEvent::RangesLoaded { count });
        Ok(count)
    }

    /// 清除上次安裝的標記，重新編譯並安裝。暫停或銷毀時不做事。
    pub fn refresh(&mut self) {
        if self.lifecycle != Lifecycle::Active {
            return;
        }
        if let Some(id) = self.refresh_task.take() {
            self.scheduler.cancel(id);
        }

        for mark in self.installed.drain(..) {
            self.host.remove_mark(&mark.key);
        }

        let ranges = self.store.ranges();
        let visible = match self.install_limit {
            Some(limit) => &ranges[..limit.min(ranges.len())],
            None => ranges,
        };
        let marks = MarkCompiler::new(&self.options).compile(visible);
        self.store.set_mark_index(&marks);
        let mark_count = marks.len();
        let result = if marks.is_empty() {
            Ok(())
        } else {
            self.host.add_marks(&marks)
        };
        // 即使宿主拒絕，也記錄下來，下次 refresh 才能清掉部分安裝的標記
        self.installed = marks;

        match result {
            Ok(()) => {
                tracing::debug!("Refreshed {} marks", mark_count);
                self.emit(PluginEvent::Refreshed { mark_count });
            }
            Err(e) => {
                tracing::error!("Refresh failed: {}", e);
                self.emit(PluginEvent::Error {
                    action: "refresh".to_string(),
                    message: e.to_string(),
                });
            }
        }
    }

    /// 暫停排程中的更新。資料異動已在 store 中，resume 時一次安裝。
    pub fn pause(&mut self) {
        if self.lifecycle != Lifecycle::Active {
            return;
        }
        self.lifecycle = Lifecycle::Paused;

        if let Some(id) = self.refresh_task.take() {
            self.scheduler.cancel(id);
        }
        self.cancel_batches();
        tracing::debug!("Plugin paused");
    }

    pub fn resume(&mut self) {
        if self.is_destroyed() {
            return;
        }
        self.lifecycle = Lifecycle::Active;
        self.refresh();
    }

    pub fn destroy(&mut self) {
        if self.is_destroyed() {
            return;
        }

        self.scheduler.cancel_all();
        self.refresh_task = None;
        self.install_limit = None;

        for mark in self.installed.drain(..) {
            self.host.remove_mark(&mark.key);
        }
        self.store.clear();

        if self.options.clickable {
            self.host.off(MARK_CLICK);
            self.host.off(DATE_CLICK);
        }

        self.lifecycle = Lifecycle::Destroyed;
        tracing::debug!("Plugin destroyed");
        self.emit(PluginEvent::Destroyed);
    }

    /// 推進虛擬時鐘並執行到期的任務
    pub fn advance(&mut self, elapsed: Duration) {
        if self.is_destroyed() {
            return;
        }

        let deadline = self.scheduler.now() + elapsed;
        while let Some(kind) = self.scheduler.pop_due(deadline) {
            match kind {
                TaskKind::Refresh => {
                    self.refresh_task = None;
                    self.refresh();
                }
                TaskKind::InstallBatch => self.install_next_batch(),
            }
        }
        self.scheduler.advance_to(deadline);
    }

    /// 以 tokio 計時器等待並執行所有排程任務，直到沒有待辦任務。
    pub async fn run_pending(&mut self) {
        while let Some(wait) = self.scheduler.time_until_next() {
            if self.is_destroyed() {
                break;
            }
            tokio::time::sleep(wait).await;
            self.advance(wait);
        }
    }

    /// 宿主回報標記被點擊
    pub fn handle_mark_click(&mut self, key: &str) {
        if self.is_destroyed() {
            return;
        }

        let Some((range, mark_ref)) = self.store.resolve_mark(key) else {
            tracing::debug!("Ignoring click on unknown mark '{}'", key);
            return;
        };
        if !mark_ref.clickable {
            return;
        }

        let event = RangeClickEvent {
            range: range.clone(),
            date: mark_ref.date.clone(),
            code: range.code.clone(),
            data: range.data.clone(),
            mark_key: key.to_string(),
        };

        if let Some(hook) = self.hooks.on_range_click.as_mut() {
            hook(&event);
        }
        self.emit(PluginEvent::RangeClick(event));
    }

    /// 宿主回報日期格子被點擊
    pub fn handle_date_click(&mut self, date: &str) {
        if self.is_destroyed() {
            return;
        }

        let day = match parse_date(date) {
            Ok(day) => day,
            Err(e) => {
                tracing::debug!("Ignoring date click: {}", e);
                return;
            }
        };

        let event = DateClickEvent {
            date: date.to_string(),
            ranges: self.store.get_by_date(day).into_iter().cloned().collect(),
        };

        if let Some(hook) = self.hooks.on_date_click.as_mut() {
            hook(&event);
        }
        self.emit(PluginEvent::DateClick(event));
    }

    pub fn get_info(&self) -> PluginInfo {
        PluginInfo {
            range_count: self.store.len(),
            date_count: self.store.date_count(),
            mark_count: self.store.mark_count(),
            options: self.options.clone(),
            is_destroyed: self.is_destroyed(),
            is_paused: self.lifecycle == Lifecycle::Paused,
        }
    }

    /// 不合法的日期字串回傳空集合
    pub fn get_ranges_for_date(&self, date: &str) -> Vec<&Range> {
        match parse_date(date) {
            Ok(day) => self.store.get_by_date(day),
            Err(_) => Vec::new(),
        }
    }

    pub fn get_range(&self, code: &str) -> Option<&Range> {
        self.store.get_by_code(code)
    }

    pub fn is_date_in_range(&self, date: &str, code: &str) -> bool {
        match (parse_date(date), self.store.get_by_code(code)) {
            (Ok(day), Some(range)) => range.contains(day),
            _ => false,
        }
    }

    /// 最近一次 refresh 安裝的標記
    pub fn marks(&self) -> &[Mark] {
        &self.installed
    }

    pub fn options(&self) -> &PluginOptions {
        &self.options
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_paused(&self) -> bool {
        self.lifecycle == Lifecycle::Paused
    }

    pub fn is_destroyed(&self) -> bool {
        self.lifecycle == Lifecycle::Destroyed
    }

    pub fn has_pending_tasks(&self) -> bool {
        self.scheduler.pending() > 0
    }

    fn schedule_refresh(&mut self) {
        // 異動會讓分批安裝失準，改由下一次 refresh 安裝全部
        self.cancel_batches();
        if self.lifecycle != Lifecycle::Active {
            return;
        }
        if self.options.batch_update_delay_ms == 0 {
            self.refresh();
            return;
        }

        // 新的異動取代舊的計時器，只編譯最新狀態
        if let Some(id) = self.refresh_task.take() {
            self.scheduler.cancel(id);
        }
        let delay = Duration::from_millis(self.options.batch_update_delay_ms);
        self.refresh_task = Some(self.scheduler.schedule(delay, TaskKind::Refresh));
    }

    fn install_next_batch(&mut self) {
        let Some(limit) = self.install_limit else {
            return;
        };
        let next = limit + self.options.max_ranges_per_batch.max(1);
        self.install_limit = (next < self.store.len()).then_some(next);
        self.refresh();

        if self.install_limit.is_some() {
            let delay = Duration::from_millis(self.options.batch_update_delay_ms);
            self.scheduler.schedule(delay, TaskKind::InstallBatch);
        }
    }

    fn cancel_batches(&mut self) {
        self.scheduler.cancel_kind(TaskKind::InstallBatch);
        self.install_limit = None;
    }

    fn emit(&mut self, event: PluginEvent) {
        self.host.trigger(&event.host_event_name(), &event);
        // 沒有訂閱者時 send 會失敗，屬正常情況
        let _ = self.events.send(event);
    }
}
