use crate::domain::model::Range;
use serde::Serialize;

/// 範圍標記被點擊時送出的事件
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeClickEvent {
    pub range: Range,
    pub date: String,
    pub code: String,
    pub data: Option<serde_json::Value>,
    pub mark_key: String,
}

/// 日期格子被點擊時送出的事件，附帶該日所有範圍
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateClickEvent {
    pub date: String,
    pub ranges: Vec<Range>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "payload", rename_all = "camelCase")]
pub enum PluginEvent {
    RangeAdded { range: Range },
    RangeRemoved { code: String, range: Range },
    RangeUpdated { code: String, range: Range },
    RangesLoaded { count: usize },
    RangesCleared { count: usize },
    Refreshed { mark_count: usize },
    RangeClick(RangeClickEvent),
    DateClick(DateClickEvent),
    Error { action: String, message: String },
    Destroyed,
}

impl PluginEvent {
    pub fn name(&self) -> &'static str {
        match self {
            PluginEvent::RangeAdded { .. } => "rangeAdded",
            PluginEvent::RangeRemoved { .. } => "rangeRemoved",
            PluginEvent::RangeUpdated { .. } => "rangeUpdated",
            PluginEvent::RangesLoaded { .. } => "rangesLoaded",
            PluginEvent::RangesCleared { .. } => "rangesCleared",
            PluginEvent::Refreshed { .. } => "refreshed",
            PluginEvent::RangeClick(_) => "rangeClick",
            PluginEvent::DateClick(_) => "dateClick",
            PluginEvent::Error { .. } => "error",
            PluginEvent::Destroyed => "destroyed",
        }
    }

    /// 轉發給宿主 `trigger` 時使用的事件名稱
    pub fn host_event_name(&self) -> String {
        format!("dateRange:{}", self.name())
    }
}
