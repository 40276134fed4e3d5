#[cfg(feature = "cli")]
pub mod cli;
pub mod presets;
pub mod toml_config;

use crate::domain::model::Style;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_number, validate_range, Validate,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentSpanMode {
    #[default]
    Single,
    Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentAlignment {
    #[default]
    Left,
    Center,
    Right,
}

impl ContentAlignment {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentAlignment::Left => "left",
            ContentAlignment::Center => "center",
            ContentAlignment::Right => "right",
        }
    }
}

/// 跨日期內容標記的內建樣式
pub fn default_span_content_style() -> Style {
    let value = json!({
        "backgroundColor": "rgba(255, 255, 255, 0.95)",
        "border": "1px solid #e0e0e0",
        "borderRadius": "4px",
        "padding": "4px 8px",
        "fontSize": "12px",
        "color": "#333",
        "boxShadow": "0 1px 3px rgba(0,0,0,0.1)",
        "zIndex": 10
    });
    serde_json::from_value(value).unwrap_or_default()
}

/// 插件設定。所有欄位都有預設值，可由 TOML 的 `[plugin]` 表或 preset 覆寫。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginOptions {
    pub mark_as: String,
    pub default_color: String,
    pub default_bg_color: String,
    pub clickable: bool,

    // 內容顯示
    pub show_content: bool,
    pub content_mark_as: String,
    pub content_default_color: String,
    pub content_default_bg_color: String,
    pub content_default_font_size: String,
    pub content_default_padding: String,
    pub content_default_border_radius: String,
    pub content_default_line_height: String,
    pub max_content_lines: usize,

    // 跨日期顯示
    pub content_span_mode: ContentSpanMode,
    pub content_alignment: ContentAlignment,
    pub span_content_style: Style,

    // 批次與防抖
    pub batch_update_delay_ms: u64,
    pub max_ranges_per_batch: usize,
    pub chunked_load: bool,
}

impl Default for PluginOptions {
    fn default() -> Self {
        Self {
            mark_as: "schedule".to_string(),
            default_color: "#667eea".to_string(),
            default_bg_color: "#f0f2ff".to_string(),
            clickable: true,
            show_content: false,
            content_mark_as: "schedule".to_string(),
            content_default_color: "#666666".to_string(),
            content_default_bg_color: "#ffffff".to_string(),
            content_default_font_size: "12px".to_string(),
            content_default_padding: "4px 8px".to_string(),
            content_default_border_radius: "4px".to_string(),
            content_default_line_height: "1.4".to_string(),
            max_content_lines: 3,
            content_span_mode: ContentSpanMode::Single,
            content_alignment: ContentAlignment::Left,
            span_content_style: default_span_content_style(),
            batch_update_delay_ms: 100,
            max_ranges_per_batch: 50,
            chunked_load: false,
        }
    }
}

impl PluginOptions {
    /// 以 patch 覆寫欄位；`span_content_style` 深度合併到內建樣式之上。
    pub fn with_patch(patch: OptionsPatch) -> Self {
        let mut options = Self::default();
        options.apply(patch);
        options
    }

    pub fn apply(&mut self, patch: OptionsPatch) {
        macro_rules! overlay {
            ($($field:ident),* $(,)?) => {
                $(if let Some(value) = patch.$field {
                    self.$field = value;
                })*
            };
        }

        overlay!(
            mark_as,
            default_color,
            default_bg_color,
            clickable,
            show_content,
            content_mark_as,
            content_default_color,
            content_default_bg_color,
            content_default_font_size,
            content_default_padding,
            content_default_border_radius,
            content_default_line_height,
            max_content_lines,
            content_span_mode,
            content_alignment,
            batch_update_delay_ms,
            max_ranges_per_batch,
            chunked_load,
        );

        if let Some(style) = patch.span_content_style {
            for (key, value) in style {
                self.span_content_style.insert(key, value);
            }
        }
    }

    pub fn validate_options(&self) -> Result<()> {
        validate_non_empty_string("mark_as", &self.mark_as)?;
        validate_non_empty_string("default_color", &self.default_color)?;
        validate_non_empty_string("default_bg_color", &self.default_bg_color)?;
        validate_positive_number("max_ranges_per_batch", self.max_ranges_per_batch, 1)?;
        validate_range("batch_update_delay_ms", self.batch_update_delay_ms, 0, 60_000)?;
        Ok(())
    }
}

impl Validate for PluginOptions {
    fn validate(&self) -> Result<()> {
        self.validate_options()
    }
}

/// Partial options; `None` leaves the underlying value untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionsPatch {
    pub mark_as: Option<String>,
    pub default_color: Option<String>,
    pub default_bg_color: Option<String>,
    pub clickable: Option<bool>,
    pub show_content: Option<bool>,
    pub content_mark_as: Option<String>,
    pub content_default_color: Option<String>,
    pub content_default_bg_color: Option<String>,
    pub content_default_font_size: Option<String>,
    pub content_default_padding: Option<String>,
    pub content_default_border_radius: Option<String>,
    pub content_default_line_height: Option<String>,
    pub max_content_lines: Option<usize>,
    pub content_span_mode: Option<ContentSpanMode>,
    pub content_alignment: Option<ContentAlignment>,
    pub span_content_style: Option<Style>,
    pub batch_update_delay_ms: Option<u64>,
    pub max_ranges_per_batch: Option<usize>,
    pub chunked_load: Option<bool>,
}

impl OptionsPatch {
    /// `other` 的欄位優先；兩邊都有 `span_content_style` 時逐鍵合併。
    pub fn overlay(self, other: OptionsPatch) -> OptionsPatch {
        let span_content_style = match (self.span_content_style, other.span_content_style) {
            (Some(mut base), Some(top)) => {
                base.extend(top);
                Some(base)
            }
            (base, top) => top.or(base),
        };

        OptionsPatch {
            mark_as: other.mark_as.or(self.mark_as),
            default_color: other.default_color.or(self.default_color),
            default_bg_color: other.default_bg_color.or(self.default_bg_color),
            clickable: other.clickable.or(self.clickable),
            show_content: other.show_content.or(self.show_content),
            content_mark_as: other.content_mark_as.or(self.content_mark_as),
            content_default_color: other.content_default_color.or(self.content_default_color),
            content_default_bg_color: other
                .content_default_bg_color
                .or(self.content_default_bg_color),
            content_default_font_size: other
                .content_default_font_size
                .or(self.content_default_font_size),
            content_default_padding: other
                .content_default_padding
                .or(self.content_default_padding),
            content_default_border_radius: other
                .content_default_border_radius
                .or(self.content_default_border_radius),
            content_default_line_height: other
                .content_default_line_height
                .or(self.content_default_line_height),
            max_content_lines: other.max_content_lines.or(self.max_content_lines),
            content_span_mode: other.content_span_mode.or(self.content_span_mode),
            content_alignment: other.content_alignment.or(self.content_alignment),
            span_content_style,
            batch_update_delay_ms: other.batch_update_delay_ms.or(self.batch_update_delay_ms),
            max_ranges_per_batch: other.max_ranges_per_batch.or(self.max_ranges_per_batch),
            chunked_load: other.chunked_load.or(self.chunked_load),
        }
    }
}
