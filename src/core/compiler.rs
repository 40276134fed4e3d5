//! Range-to-mark compilation.
//!
//! Every compile is a full recompute from the store contents. Output order is
//! range insertion order, then ascending day (or week), then content index,
//! so identical inputs always yield identical mark lists.

use crate::config::{ContentSpanMode, PluginOptions};
use crate::core::dates::{format_date, DaySpan};
use crate::core::weeks::{is_multi_week, week_groups};
use crate::domain::model::{
    Content, Mark, MarkFamily, MarkMeta, Position, Range, SpanInfo, Style, WeekGroup,
};
use chrono::NaiveDate;

const ELLIPSIS: &str = "...";
/// 最後一週顯示的尾端字數
const SPAN_TAIL_CHARS: usize = 15;

const CONTINUITY_BORDER: &str = "2px dashed rgba(0,0,0,0.2)";
const CONTINUITY_SHADOW: &str = "0 2px 4px rgba(0,0,0,0.1)";
const MIDDLE_WEEK_OPACITY: f64 = 0.8;

pub struct MarkCompiler<'a> {
    options: &'a PluginOptions,
}

impl<'a> MarkCompiler<'a> {
    pub fn new(options: &'a PluginOptions) -> Self {
        Self { options }
    }

    pub fn compile(&self, ranges: &[Range]) -> Vec<Mark> {
        let mut marks = Vec::new();

        for range in ranges {
            let span = match DaySpan::new(range.start_date, range.end_date) {
                Ok(span) => span,
                Err(e) => {
                    // Store 已驗證過，理論上不會發生
                    tracing::warn!("Skipping range '{}': {}", range.code, e);
                    continue;
                }
            };

            self.push_range_marks(range, &span, &mut marks);

            if !self.shows_content_for(range) {
                continue;
            }
            match self.options.content_span_mode {
                ContentSpanMode::Single => self.push_single_content_marks(range, &span, &mut marks),
                ContentSpanMode::Span => self.push_span_content_marks(range, &span, &mut marks),
            }
        }

        tracing::debug!("Compiled {} marks from {} ranges", marks.len(), ranges.len());
        marks
    }

    fn shows_content_for(&self, range: &Range) -> bool {
        self.options.show_content && range.has_content() && self.options.max_content_lines > 0
    }

    fn visible_contents<'r>(&self, range: &'r Range) -> &'r [Content] {
        let limit = range.contents.len().min(self.options.max_content_lines);
        &range.contents[..limit]
    }

    fn is_clickable(&self, range: &Range) -> bool {
        self.options.clickable && range.clickable
    }

    fn push_range_marks(&self, range: &Range, span: &DaySpan, marks: &mut Vec<Mark>) {
        for date in span.dates() {
            let position = classify_position(span, date);
            marks.push(self.range_mark(range, date, position));
        }
    }

    /// 樣式優先順序：位置覆寫 > 範圍顏色 > 插件預設
    fn range_mark(&self, range: &Range, date: NaiveDate, position: Position) -> Mark {
        let mut mark_as = range
            .mark_as
            .clone()
            .unwrap_or_else(|| self.options.mark_as.clone());
        let mut color = range
            .color
            .clone()
            .unwrap_or_else(|| self.options.default_color.clone());
        let mut bg_color = range
            .bg_color
            .clone()
            .unwrap_or_else(|| self.options.default_bg_color.clone());

        if let Some(overrides) = range.position_style(position) {
            if let Some(value) = &overrides.mark_as {
                mark_as = value.clone();
            }
            if let Some(value) = &overrides.color {
                color = value.clone();
            }
            if let Some(value) = &overrides.bg_color {
                bg_color = value.clone();
            }
        }

        let mut style = Style::new();
        style.insert("color".to_string(), color.into());
        style.insert("backgroundColor".to_string(), bg_color.into());

        let date_key = format_date(date);
        Mark {
            key: format!("{}_{}", range.code, date_key),
            date: date_key,
            family: MarkFamily::Range,
            mark_as,
            text: range.name.clone(),
            style,
            clickable: self.is_clickable(range),
            range_code: range.code.clone(),
            range_data: range.data.clone(),
            meta: MarkMeta::Range { position },
        }
    }

    /// 內容標記的基礎樣式：插件內容預設值，再疊上範圍層級的內容樣式。
    fn content_base_style(&self, range: &Range) -> Style {
        let mut style = Style::new();
        style.insert("color".to_string(), self.options.content_default_color.clone().into());
        style.insert(
            "backgroundColor".to_string(),
            self.options.content_default_bg_color.clone().into(),
        );
        style.insert(
            "fontSize".to_string(),
            self.options.content_default_font_size.clone().into(),
        );
        style.insert(
            "padding".to_string(),
            self.options.content_default_padding.clone().into(),
        );
        style.insert(
            "borderRadius".to_string(),
            self.options.content_default_border_radius.clone().into(),
        );
        style.insert(
            "lineHeight".to_string(),
            self.options.content_default_line_height.clone().into(),
        );
        style.insert(
            "textAlign".to_string(),
            self.options.content_alignment.as_str().into(),
        );
        overlay(&mut style, &range.content_style);
        style
    }

    fn push_single_content_marks(&self, range: &Range, span: &DaySpan, marks: &mut Vec<Mark>) {
        let contents = self.visible_contents(range);
        let base = self.content_base_style(range);

        for date in span.dates() {
            let date_key = format_date(date);
            for (index, content) in contents.iter().enumerate() {
                let mut style = base.clone();
                overlay(&mut style, &content.item_style());

                marks.push(Mark {
                    key: format!("{}_{}_content_{}", range.code, date_key, index),
                    date: date_key.clone(),
                    family: MarkFamily::Content,
                    mark_as: self.options.content_mark_as.clone(),
                    text: content.text().to_string(),
                    style,
                    clickable: self.is_clickable(range),
                    range_code: range.code.clone(),
                    range_data: range.data.clone(),
                    meta: MarkMeta::Content {
                        content_index: index,
                    },
                });
            }
        }
    }

    fn push_span_content_marks(&self, range: &Range, span: &DaySpan, marks: &mut Vec<Mark>) {
        let contents = self.visible_contents(range);
        let groups = week_groups(span);
        let multi_week = is_multi_week(&groups);

        for group in &groups {
            let anchor = format_date(group.week_start_date);
            let span_info = SpanInfo {
                total_weeks: groups.len(),
                current_week: group.week_index + 1,
                total_days: span.len(),
                is_multi_week: multi_week,
            };

            for (index, content) in contents.iter().enumerate() {
                let mut style = self.options.span_content_style.clone();
                overlay(&mut style, &range.content_style);
                overlay(&mut style, &content.item_style());
                style.insert(
                    "textAlign".to_string(),
                    self.options.content_alignment.as_str().into(),
                );
                style.insert("width".to_string(), format!("{}%", group.days * 100).into());
                if multi_week {
                    apply_continuity_cues(&mut style, group);
                }

                marks.push(Mark {
                    key: format!(
                        "{}_{}_span_content_{}_week_{}",
                        range.code, anchor, index, group.week_index
                    ),
                    date: anchor.clone(),
                    family: MarkFamily::SpanContent,
                    mark_as: self.options.content_mark_as.clone(),
                    text: week_text(content.text(), group, multi_week),
                    style,
                    clickable: self.is_clickable(range),
                    range_code: range.code.clone(),
                    range_data: range.data.clone(),
                    meta: MarkMeta::SpanContent {
                        content_index: index,
                        week_group: group.clone(),
                        span_info: span_info.clone(),
                    },
                });
            }
        }
    }
}

pub fn classify_position(span: &DaySpan, date: NaiveDate) -> Position {
    if span.is_single_day() {
        Position::Single
    } else if date == span.start() {
        Position::Start
    } else if date == span.end() {
        Position::End
    } else {
        Position::Middle
    }
}

/// 跨多週時的文字截斷：第一週完整顯示，最後一週顯示 `...` 加尾端 15 字，
/// 中間週只顯示 `...`。
pub fn week_text(text: &str, group: &WeekGroup, multi_week: bool) -> String {
    if !multi_week || group.is_first_week {
        return text.to_string();
    }
    if group.is_last_week {
        let total = text.chars().count();
        let tail: String = text.chars().skip(total.saturating_sub(SPAN_TAIL_CHARS)).collect();
        return format!("{}{}", ELLIPSIS, tail);
    }
    ELLIPSIS.to_string()
}

fn apply_continuity_cues(style: &mut Style, group: &WeekGroup) {
    match (group.is_first_week, group.is_last_week) {
        (true, false) => {
            style.insert("borderRight".to_string(), CONTINUITY_BORDER.into());
        }
        (false, true) => {
            style.insert("borderLeft".to_string(), CONTINUITY_BORDER.into());
        }
        (false, false) => {
            style.insert("borderLeft".to_string(), CONTINUITY_BORDER.into());
            style.insert("borderRight".to_string(), CONTINUITY_BORDER.into());
            style.insert("opacity".to_string(), MIDDLE_WEEK_OPACITY.into());
        }
        // 單一週不會進到這裡
        (true, true) => {}
    }
    style.insert("boxShadow".to_string(), CONTINUITY_SHADOW.into());
}

fn overlay(style: &mut Style, top: &Style) {
    for (key, value) in top {
        style.insert(key.clone(), value.clone());
    }
}
