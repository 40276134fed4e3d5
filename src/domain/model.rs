use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 樣式表：鍵為宿主日曆理解的樣式屬性名稱（例如 `backgroundColor`）。
/// 使用 BTreeMap 讓輸出順序固定。
pub type Style = BTreeMap<String, serde_json::Value>;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ContentItem {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, alias = "bgColor", skip_serializing_if = "Option::is_none")]
    pub bg_color: Option<String>,
    #[serde(default, skip_serializing_if = "Style::is_empty")]
    pub style: Style,
}

/// 內容可以是純文字或帶樣式的項目；反序列化時一次決定型別。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Content {
    Text(String),
    Styled(ContentItem),
}

impl Content {
    pub fn text(&self) -> &str {
        match self {
            Content::Text(text) => text,
            Content::Styled(item) => &item.text,
        }
    }

    /// 項目本身帶的樣式，`color`/`bg_color` 先寫入，`style` 覆蓋其上。
    pub fn item_style(&self) -> Style {
        let mut style = Style::new();
        if let Content::Styled(item) = self {
            if let Some(color) = &item.color {
                style.insert("color".to_string(), color.clone().into());
            }
            if let Some(bg) = &item.bg_color {
                style.insert("backgroundColor".to_string(), bg.clone().into());
            }
            for (key, value) in &item.style {
                style.insert(key.clone(), value.clone());
            }
        }
        style
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Content::Text(text.to_string())
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Content::Text(text)
    }
}

impl From<ContentItem> for Content {
    fn from(item: ContentItem) -> Self {
        Content::Styled(item)
    }
}

/// Per-position overrides for range marks.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PositionStyle {
    #[serde(default, alias = "markAs", skip_serializing_if = "Option::is_none")]
    pub mark_as: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, alias = "bgColor", skip_serializing_if = "Option::is_none")]
    pub bg_color: Option<String>,
}

/// 使用者提交的原始範圍資料，欄位全部可選，由 Range Store 驗證後轉為 [`Range`]。
/// 也作為 `update` 的 patch 使用。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RangeInput {
    pub code: Option<String>,
    pub name: Option<String>,
    #[serde(alias = "startDate")]
    pub start_date: Option<String>,
    #[serde(alias = "endDate")]
    pub end_date: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default, alias = "bgColor")]
    pub bg_color: Option<String>,
    #[serde(default, alias = "markAs")]
    pub mark_as: Option<String>,
    #[serde(default)]
    pub clickable: Option<bool>,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub contents: Option<Vec<Content>>,
    #[serde(default, alias = "contentStyle")]
    pub content_style: Option<Style>,
    #[serde(default, alias = "startStyle")]
    pub start_style: Option<PositionStyle>,
    #[serde(default, alias = "middleStyle")]
    pub middle_style: Option<PositionStyle>,
    #[serde(default, alias = "endStyle")]
    pub end_style: Option<PositionStyle>,
}

impl RangeInput {
    pub fn new(code: &str, name: &str, start_date: &str, end_date: &str) -> Self {
        Self {
            code: Some(code.to_string()),
            name: Some(name.to_string()),
            start_date: Some(start_date.to_string()),
            end_date: Some(end_date.to_string()),
            ..Default::default()
        }
    }

    pub fn with_color(mut self, color: &str) -> Self {
        self.color = Some(color.to_string());
        self
    }

    pub fn with_bg_color(mut self, bg_color: &str) -> Self {
        self.bg_color = Some(bg_color.to_string());
        self
    }

    pub fn with_mark_as(mut self, mark_as: &str) -> Self {
        self.mark_as = Some(mark_as.to_string());
        self
    }

    pub fn with_clickable(mut self, clickable: bool) -> Self {
        self.clickable = Some(clickable);
        self
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_content(mut self, content: impl Into<Content>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_contents(mut self, contents: Vec<Content>) -> Self {
        self.contents = Some(contents);
        self
    }

    pub fn with_content_style(mut self, style: Style) -> Self {
        self.content_style = Some(style);
        self
    }

    pub fn with_position_style(mut self, position: Position, style: PositionStyle) -> Self {
        match position {
            Position::Start => self.start_style = Some(style),
            Position::Middle => self.middle_style = Some(style),
            Position::End => self.end_style = Some(style),
            Position::Single => {}
        }
        self
    }

    /// 以 `patch` 中有值的欄位覆蓋自身；`code` 永遠保留原值。
    /// `content` 與 `contents` 視為同一欄位，patch 帶任一個就整組取代。
    pub fn merged_with(self, patch: RangeInput) -> Self {
        let (content, contents) = if patch.content.is_some() || patch.contents.is_some() {
            (patch.content, patch.contents)
        } else {
            (self.content, self.contents)
        };

        Self {
            code: self.code,
            name: patch.name.or(self.name),
            start_date: patch.start_date.or(self.start_date),
            end_date: patch.end_date.or(self.end_date),
            color: patch.color.or(self.color),
            bg_color: patch.bg_color.or(self.bg_color),
            mark_as: patch.mark_as.or(self.mark_as),
            clickable: patch.clickable.or(self.clickable),
            data: patch.data.or(self.data),
            content,
            contents,
            content_style: patch.content_style.or(self.content_style),
            start_style: patch.start_style.or(self.start_style),
            middle_style: patch.middle_style.or(self.middle_style),
            end_style: patch.end_style.or(self.end_style),
        }
    }
}

/// A validated date range owned by the Range Store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Range {
    pub code: String,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bg_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mark_as: Option<String>,
    pub clickable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Style::is_empty")]
    pub content_style: Style,
    pub start_style: PositionStyle,
    pub middle_style: PositionStyle,
    pub end_style: PositionStyle,
}

impl Range {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    pub fn has_content(&self) -> bool {
        !self.contents.is_empty()
    }

    /// Position-specific override; `Single` marks never take one.
    pub fn position_style(&self, position: Position) -> Option<&PositionStyle> {
        match position {
            Position::Start => Some(&self.start_style),
            Position::Middle => Some(&self.middle_style),
            Position::End => Some(&self.end_style),
            Position::Single => None,
        }
    }

    /// 轉回原始輸入形式，供 `update` 合併 patch 後重新驗證。
    pub fn to_input(&self) -> RangeInput {
        let non_empty = |style: &PositionStyle| {
            (style != &PositionStyle::default()).then(|| style.clone())
        };
        RangeInput {
            code: Some(self.code.clone()),
            name: Some(self.name.clone()),
            start_date: Some(self.start_date.format("%Y-%m-%d").to_string()),
            end_date: Some(self.end_date.format("%Y-%m-%d").to_string()),
            color: self.color.clone(),
            bg_color: self.bg_color.clone(),
            mark_as: self.mark_as.clone(),
            clickable: Some(self.clickable),
            data: self.data.clone(),
            content: None,
            contents: (!self.contents.is_empty()).then(|| self.contents.clone()),
            content_style: (!self.content_style.is_empty()).then(|| self.content_style.clone()),
            start_style: non_empty(&self.start_style),
            middle_style: non_empty(&self.middle_style),
            end_style: non_empty(&self.end_style),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Single,
    Start,
    Middle,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MarkFamily {
    Range,
    Content,
    SpanContent,
}

impl MarkFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarkFamily::Range => "range",
            MarkFamily::Content => "content",
            MarkFamily::SpanContent => "span-content",
        }
    }
}

/// 範圍在某一個 ISO 週（週一起算）內的日期區段。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekGroup {
    pub week_index: usize,
    /// First covered date of this week, i.e. the Monday clipped to the range.
    pub week_start_date: NaiveDate,
    /// Last covered date of this week.
    pub week_end_date: NaiveDate,
    /// The ISO week bucket (Monday) the dates belong to.
    pub iso_week_start: NaiveDate,
    pub days: usize,
    /// 0 = Sunday .. 6 = Saturday
    pub start_day_of_week: u32,
    pub is_first_week: bool,
    pub is_last_week: bool,
    pub dates: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpanInfo {
    pub total_weeks: usize,
    /// 1-based
    pub current_week: usize,
    pub total_days: usize,
    pub is_multi_week: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MarkMeta {
    Range {
        position: Position,
    },
    Content {
        content_index: usize,
    },
    SpanContent {
        content_index: usize,
        week_group: WeekGroup,
        span_info: SpanInfo,
    },
}

/// 編譯後的標記，每次 refresh 重新產生，不具獨立身分。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mark {
    pub key: String,
    pub date: String,
    pub family: MarkFamily,
    pub mark_as: String,
    pub text: String,
    pub style: Style,
    pub clickable: bool,
    pub range_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range_data: Option<serde_json::Value>,
    pub meta: MarkMeta,
}

impl Mark {
    pub fn position(&self) -> Option<Position> {
        match &self.meta {
            MarkMeta::Range { position } => Some(*position),
            _ => None,
        }
    }

    pub fn week_group(&self) -> Option<&WeekGroup> {
        match &self.meta {
            MarkMeta::SpanContent { week_group, .. } => Some(week_group),
            _ => None,
        }
    }

    pub fn span_info(&self) -> Option<&SpanInfo> {
        match &self.meta {
            MarkMeta::SpanContent { span_info, .. } => Some(span_info),
            _ => None,
        }
    }

    pub fn style_str(&self, key: &str) -> Option<&str> {
        self.style.get(key).and_then(|v| v.as_str())
    }
}
