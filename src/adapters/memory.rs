use crate::domain::events::PluginEvent;
use crate::domain::model::Mark;
use crate::domain::ports::HostCalendar;
use crate::utils::error::{DateRangeError, Result};
use std::collections::{BTreeMap, BTreeSet};

/// 在記憶體中保存標記的宿主日曆，供 CLI 與測試使用。
#[derive(Debug, Default)]
pub struct MemoryCalendar {
    marks: BTreeMap<String, Mark>,
    subscriptions: BTreeSet<String>,
    triggered: Vec<(String, PluginEvent)>,
    reject_next: Option<String>,
    add_calls: usize,
}

impl MemoryCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// 下一次 `add_marks` 以指定訊息失敗
    pub fn reject_next_add(&mut self, message: &str) {
        self.reject_next = Some(message.to_string());
    }

    pub fn mark(&self, key: &str) -> Option<&Mark> {
        self.marks.get(key)
    }

    pub fn marks(&self) -> impl Iterator<Item = &Mark> {
        self.marks.values()
    }

    pub fn mark_count(&self) -> usize {
        self.marks.len()
    }

    pub fn marks_on(&self, date: &str) -> Vec<&Mark> {
        self.marks.values().filter(|mark| mark.date == date).collect()
    }

    pub fn is_subscribed(&self, event: &str) -> bool {
        self.subscriptions.contains(event)
    }

    pub fn triggered(&self) -> &[(String, PluginEvent)] {
        &self.triggered
    }

    pub fn triggered_names(&self) -> Vec<&str> {
        self.triggered.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn add_calls(&self) -> usize {
        self.add_calls
    }
}

impl HostCalendar for MemoryCalendar {
    fn add_marks(&mut self, marks: &[Mark]) -> Result<()> {
        self.add_calls += 1;
        if let Some(message) = self.reject_next.take() {
            return Err(DateRangeError::HostError { message });
        }
        for mark in marks {
            self.marks.insert(mark.key.clone(), mark.clone());
        }
        Ok(())
    }

    fn remove_mark(&mut self, key: &str) {
        self.marks.remove(key);
    }

    fn on(&mut self, event: &str) {
        self.subscriptions.insert(event.to_string());
    }

    fn off(&mut self, event: &str) {
        self.subscriptions.remove(event);
    }

    fn trigger(&mut self, event: &str, payload: &PluginEvent) {
        self.triggered.push((event.to_string(), payload.clone()));
    }
}
