use crate::domain::events::PluginEvent;
use crate::domain::model::Mark;
use crate::utils::error::Result;

/// 宿主日曆需要提供的介面。
///
/// 點擊事件由宿主在收到使用者操作時回呼插件的
/// `handle_mark_click` / `handle_date_click`；`on`/`off` 只用來告訴宿主
/// 插件目前關心哪些事件。
pub trait HostCalendar {
    fn add_marks(&mut self, marks: &[Mark]) -> Result<()>;

    fn remove_mark(&mut self, key: &str);

    fn on(&mut self, event: &str);

    fn off(&mut self, event: &str);

    /// Optional custom event forwarding.
    fn trigger(&mut self, _event: &str, _payload: &PluginEvent) {}
}
