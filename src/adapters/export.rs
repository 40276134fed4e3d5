use crate::domain::model::{Mark, MarkMeta};
use crate::utils::error::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

/// 將標記輸出為 JSON 陣列或 CSV 表格
pub fn export_marks(marks: &[Mark], format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Json => Ok(serde_json::to_string_pretty(marks)?),
        ExportFormat::Csv => export_csv(marks),
    }
}

fn export_csv(marks: &[Mark]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "key",
        "date",
        "family",
        "mark_as",
        "text",
        "range_code",
        "clickable",
        "detail",
        "style",
    ])?;

    for mark in marks {
        let detail = match &mark.meta {
            MarkMeta::Range { position } => format!("{:?}", position).to_lowercase(),
            MarkMeta::Content { content_index } => format!("line {}", content_index),
            MarkMeta::SpanContent {
                content_index,
                span_info,
                ..
            } => format!(
                "line {} week {}/{}",
                content_index, span_info.current_week, span_info.total_weeks
            ),
        };
        let style = serde_json::to_string(&mark.style)?;

        writer.write_record([
            mark.key.as_str(),
            mark.date.as_str(),
            mark.family.as_str(),
            mark.mark_as.as_str(),
            mark.text.as_str(),
            mark.range_code.as_str(),
            if mark.clickable { "true" } else { "false" },
            detail.as_str(),
            style.as_str(),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
