//! 常見情境的預設設定：專案管理、日程安排、節假日。
//!
//! Presets are plain [`OptionsPatch`] bundles; user overrides are layered on
//! top with [`merge_preset_with_options`].

use crate::config::{ContentAlignment, ContentSpanMode, OptionsPatch};
use crate::domain::model::Style;
use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    ProjectManagement,
    Schedule,
    Holiday,
}

/// 預設色票中的一組顏色
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Swatch {
    pub color: &'static str,
    pub bg_color: &'static str,
}

const fn swatch(color: &'static str, bg_color: &'static str) -> Swatch {
    Swatch { color, bg_color }
}

const PROJECT_PHASES: &[(&str, Swatch)] = &[
    ("planning", swatch("#6c5ce7", "#f4f3ff")),
    ("design", swatch("#667eea", "#f0f2ff")),
    ("development", swatch("#00b894", "#f0fff4")),
    ("testing", swatch("#f39c12", "#fffbf0")),
    ("deployment", swatch("#e17055", "#fff5f5")),
    ("maintenance", swatch("#636e72", "#f8f9fa")),
];

const SCHEDULE_KINDS: &[(&str, Swatch)] = &[
    ("meeting", swatch("#0984e3", "#e3f2fd")),
    ("event", swatch("#00b894", "#e8f5e8")),
    ("deadline", swatch("#d63031", "#ffebee")),
    ("reminder", swatch("#f39c12", "#fff8e1")),
    ("holiday", swatch("#6c5ce7", "#f3e5f5")),
    ("personal", swatch("#636e72", "#f5f6fa")),
];

const HOLIDAY_KINDS: &[(&str, Swatch)] = &[
    ("national", swatch("#ffffff", "#e74c3c")),
    ("traditional", swatch("#ffffff", "#f39c12")),
    ("international", swatch("#ffffff", "#9b59b6")),
    ("workday", swatch("#ffffff", "#34495e")),
    ("weekend", swatch("#ffffff", "#95a5a6")),
    ("vacation", swatch("#ffffff", "#3498db")),
];

impl Preset {
    /// 依名稱取得預設；未知名稱回退為專案管理。
    pub fn from_name(name: &str) -> Preset {
        match name.trim().to_ascii_lowercase().as_str() {
            "schedule" => Preset::Schedule,
            "holiday" => Preset::Holiday,
            "project" | "project-management" => Preset::ProjectManagement,
            other => {
                tracing::warn!("Unknown preset '{}', falling back to project", other);
                Preset::ProjectManagement
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Preset::ProjectManagement => "project",
            Preset::Schedule => "schedule",
            Preset::Holiday => "holiday",
        }
    }

    pub fn options(&self) -> OptionsPatch {
        match self {
            Preset::ProjectManagement => OptionsPatch {
                show_content: Some(true),
                content_span_mode: Some(ContentSpanMode::Span),
                content_alignment: Some(ContentAlignment::Left),
                max_content_lines: Some(3),
                content_default_color: Some("#333333".to_string()),
                content_default_bg_color: Some("rgba(255, 255, 255, 0.95)".to_string()),
                content_default_font_size: Some("12px".to_string()),
                content_default_padding: Some("4px 8px".to_string()),
                content_default_border_radius: Some("6px".to_string()),
                span_content_style: Some(style(json!({
                    "backgroundColor": "rgba(255, 255, 255, 0.95)",
                    "border": "1px solid #e0e0e0",
                    "borderRadius": "6px",
                    "padding": "4px 8px",
                    "fontSize": "12px",
                    "color": "#333",
                    "boxShadow": "0 2px 8px rgba(0,0,0,0.1)",
                    "zIndex": 10,
                    "fontWeight": "500"
                }))),
                default_color: Some("#667eea".to_string()),
                default_bg_color: Some("#f0f2ff".to_string()),
                ..Default::default()
            },
            Preset::Schedule => OptionsPatch {
                show_content: Some(true),
                content_span_mode: Some(ContentSpanMode::Single),
                content_alignment: Some(ContentAlignment::Center),
                max_content_lines: Some(2),
                content_default_color: Some("#2d3436".to_string()),
                content_default_bg_color: Some("#ffffff".to_string()),
                content_default_font_size: Some("11px".to_string()),
                content_default_padding: Some("3px 6px".to_string()),
                content_default_border_radius: Some("4px".to_string()),
                default_color: Some("#0984e3".to_string()),
                default_bg_color: Some("#e3f2fd".to_string()),
                ..Default::default()
            },
            Preset::Holiday => OptionsPatch {
                show_content: Some(true),
                content_span_mode: Some(ContentSpanMode::Single),
                content_alignment: Some(ContentAlignment::Center),
                max_content_lines: Some(1),
                mark_as: Some("festival".to_string()),
                content_default_color: Some("#ffffff".to_string()),
                content_default_bg_color: Some("#e74c3c".to_string()),
                content_default_font_size: Some("10px".to_string()),
                content_default_padding: Some("2px 4px".to_string()),
                content_default_border_radius: Some("3px".to_string()),
                default_color: Some("#ffffff".to_string()),
                default_bg_color: Some("#e74c3c".to_string()),
                ..Default::default()
            },
        }
    }

    pub fn palette(&self) -> &'static [(&'static str, Swatch)] {
        match self {
            Preset::ProjectManagement => PROJECT_PHASES,
            Preset::Schedule => SCHEDULE_KINDS,
            Preset::Holiday => HOLIDAY_KINDS,
        }
    }

    pub fn swatch(&self, kind: &str) -> Option<Swatch> {
        self.palette()
            .iter()
            .find(|(name, _)| *name == kind)
            .map(|(_, swatch)| *swatch)
    }
}

fn style(value: serde_json::Value) -> Style {
    serde_json::from_value(value).unwrap_or_default()
}

/// 淺層合併使用者設定，`span_content_style` 則逐鍵合併。
pub fn merge_preset_with_options(preset: Preset, custom: OptionsPatch) -> OptionsPatch {
    preset.options().overlay(custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PluginOptions;

    #[test]
    fn test_from_name_falls_back_to_project() {
        assert_eq!(Preset::from_name("schedule"), Preset::Schedule);
        assert_eq!(Preset::from_name("HOLIDAY"), Preset::Holiday);
        assert_eq!(Preset::from_name("unknown"), Preset::ProjectManagement);
    }

    #[test]
    fn test_holiday_preset_marks_as_festival() {
        let options = PluginOptions::with_patch(Preset::Holiday.options());
        assert_eq!(options.mark_as, "festival");
        assert_eq!(options.max_content_lines, 1);
        assert!(options.show_content);
    }

    #[test]
    fn test_merge_keeps_preset_style_keys() {
        let mut custom_style = Style::new();
        custom_style.insert("color".to_string(), "#ff0000".into());

        let merged = merge_preset_with_options(
            Preset::ProjectManagement,
            OptionsPatch {
                span_content_style: Some(custom_style),
                max_content_lines: Some(5),
                ..Default::default()
            },
        );
        let options = PluginOptions::with_patch(merged);

        assert_eq!(options.max_content_lines, 5);
        assert_eq!(options.content_span_mode, ContentSpanMode::Span);
        assert_eq!(options.span_content_style["color"], "#ff0000");
        assert_eq!(options.span_content_style["fontWeight"], "500");
        assert_eq!(options.span_content_style["borderRadius"], "6px");
    }

    #[test]
    fn test_palette_lookup() {
        let swatch = Preset::Schedule.swatch("deadline").unwrap();
        assert_eq!(swatch.color, "#d63031");
        assert!(Preset::Holiday.swatch("meeting").is_none());
    }
}
