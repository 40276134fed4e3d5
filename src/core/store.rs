use crate::core::dates::{parse_date, DaySpan};
use crate::domain::model::{Content, Mark, Range, RangeInput};
use crate::utils::error::{DateRangeError, Result};
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};

/// 已安裝標記對應回範圍的資訊
#[derive(Debug, Clone, PartialEq)]
pub struct MarkRef {
    pub code: String,
    pub date: String,
    pub clickable: bool,
}

/// 驗證單筆輸入並轉為 [`Range`]。`index` 只用於錯誤訊息。
pub fn validate_range(input: &RangeInput, index: usize) -> Result<Range> {
    let code = required_text(&input.code, index, "code")?;
    let name = required_text(&input.name, index, "name")?;

    let (start_raw, end_raw) = match (&input.start_date, &input.end_date) {
        (Some(start), Some(end)) => (start, end),
        _ => {
            return Err(DateRangeError::validation_at(
                index,
                "must have startDate and endDate properties",
            ))
        }
    };

    let start_date = parse_date(start_raw)
        .map_err(|_| DateRangeError::validation_at(index, "has invalid date format"))?;
    let end_date = parse_date(end_raw)
        .map_err(|_| DateRangeError::validation_at(index, "has invalid date format"))?;

    if start_date > end_date {
        return Err(DateRangeError::validation_at(
            index,
            "startDate must be before or equal to endDate",
        ));
    }

    // contents 優先；只有 content 時包成單元素序列
    let contents: Vec<Content> = match (&input.contents, &input.content) {
        (Some(list), _) if !list.is_empty() => list.clone(),
        (_, Some(single)) => vec![single.clone()],
        _ => Vec::new(),
    };

    Ok(Range {
        code,
        name,
        start_date,
        end_date,
        color: input.color.clone(),
        bg_color: input.bg_color.clone(),
        mark_as: input.mark_as.clone(),
        clickable: input.clickable.unwrap_or(true),
        data: input.data.clone(),
        contents,
        content_style: input.content_style.clone().unwrap_or_default(),
        start_style: input.start_style.clone().unwrap_or_default(),
        middle_style: input.middle_style.clone().unwrap_or_default(),
        end_style: input.end_style.clone().unwrap_or_default(),
    })
}

fn required_text(value: &Option<String>, index: usize, field: &str) -> Result<String> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text.clone()),
        _ => Err(DateRangeError::validation_at(
            index,
            format!("must have a {} property", field),
        )),
    }
}

/// 驗證整批輸入；任何一筆失敗（或批次內 code 重複）即整批拒絕。
pub fn validate_batch(inputs: &[RangeInput]) -> Result<Vec<Range>> {
    let mut seen = HashSet::new();
    let mut ranges = Vec::with_capacity(inputs.len());

    for (index, input) in inputs.iter().enumerate() {
        let range = validate_range(input, index)?;
        if !seen.insert(range.code.clone()) {
            return Err(DateRangeError::DuplicateCodeError { code: range.code });
        }
        ranges.push(range);
    }

    Ok(ranges)
}

/// Insertion-ordered collection of ranges keyed by code, with a date index.
///
/// The date index is rebuilt after every mutation. The mark index is replaced
/// wholesale by the plugin after each compile.
#[derive(Debug, Default)]
pub struct RangeStore {
    ranges: Vec<Range>,
    positions: HashMap<String, usize>,
    date_index: HashMap<NaiveDate, Vec<usize>>,
    mark_index: HashMap<String, MarkRef>,
}

impl RangeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn ranges(&self) -> &[Range] {
        &self.ranges
    }

    pub fn add(&mut self, input: &RangeInput) -> Result<&Range> {
        let range = validate_range(input, self.ranges.len())?;
        self.insert(range)
    }

    /// 插入一筆已驗證的範圍
    pub fn insert(&mut self, range: Range) -> Result<&Range> {
        if self.positions.contains_key(&range.code) {
            return Err(DateRangeError::DuplicateCodeError { code: range.code });
        }

        let position = self.ranges.len();
        self.positions.insert(range.code.clone(), position);
        self.ranges.push(range);
        self.rebuild_date_index();

        Ok(&self.ranges[position])
    }

    /// 移除並回傳範圍；不存在時回傳 `None`。
    pub fn take(&mut self, code: &str) -> Option<Range> {
        let position = self.positions.remove(code)?;
        let removed = self.ranges.remove(position);
        self.rebuild_positions();
        self.rebuild_date_index();
        Some(removed)
    }

    pub fn remove(&mut self, code: &str) -> bool {
        self.take(code).is_some()
    }

    pub fn update(&mut self, code: &str, patch: RangeInput) -> Result<&Range> {
        let position = *self
            .positions
            .get(code)
            .ok_or_else(|| DateRangeError::NotFoundError {
                code: code.to_string(),
            })?;

        let merged = self.ranges[position].to_input().merged_with(patch);
        let updated = validate_range(&merged, position)?;

        self.ranges[position] = updated;
        self.rebuild_date_index();
        Ok(&self.ranges[position])
    }

    /// 清空，回傳被清除的數量
    pub fn clear(&mut self) -> usize {
        let count = self.ranges.len();
        self.ranges.clear();
        self.positions.clear();
        self.date_index.clear();
        self.mark_index.clear();
        count
    }

    /// 整批取代。先驗證全部，再一次提交。
    pub fn load(&mut self, inputs: &[RangeInput]) -> Result<usize> {
        let ranges = validate_batch(inputs)?;
        self.replace_all(ranges);
        Ok(self.ranges.len())
    }

    pub fn replace_all(&mut self, ranges: Vec<Range>) {
        self.clear();
        self.positions = ranges
            .iter()
            .enumerate()
            .map(|(position, range)| (range.code.clone(), position))
            .collect();
        self.ranges = ranges;
        self.rebuild_date_index();
    }

    pub fn get_by_code(&self, code: &str) -> Option<&Range> {
        self.positions.get(code).map(|&position| &self.ranges[position])
    }

    pub fn get_by_date(&self, date: NaiveDate) -> Vec<&Range> {
        self.date_index
            .get(&date)
            .map(|positions| positions.iter().map(|&p| &self.ranges[p]).collect())
            .unwrap_or_default()
    }

    /// 至少被一個範圍覆蓋的日期數
    pub fn date_count(&self) -> usize {
        self.date_index.len()
    }

    pub fn mark_count(&self) -> usize {
        self.mark_index.len()
    }

    pub fn set_mark_index(&mut self, marks: &[Mark]) {
        self.mark_index = marks
            .iter()
            .map(|mark| {
                (
                    mark.key.clone(),
                    MarkRef {
                        code: mark.range_code.clone(),
                        date: mark.date.clone(),
                        clickable: mark.clickable,
                    },
                )
            })
            .collect();
    }

    /// 由標記 key 找回範圍；範圍在上次 refresh 後已被移除時回傳 `None`。
    pub fn resolve_mark(&self, key: &str) -> Option<(&Range, &MarkRef)> {
        let mark_ref = self.mark_index.get(key)?;
        let range = self.get_by_code(&mark_ref.code)?;
        Some((range, mark_ref))
    }

    fn rebuild_positions(&mut self) {
        self.positions = self
            .ranges
            .iter()
            .enumerate()
            .map(|(position, range)| (range.code.clone(), position))
            .collect();
    }

    fn rebuild_date_index(&mut self) {
        self.date_index.clear();
        for (position, range) in self.ranges.iter().enumerate() {
            let Ok(span) = DaySpan::new(range.start_date, range.end_date) else {
                continue;
            };
            for date in span.dates() {
                self.date_index.entry(date).or_default().push(position);
            }
        }
    }
}
