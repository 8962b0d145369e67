//! 行过滤：日期范围与状态两个条件按 AND 组合，未配置的条件不做限制

use std::fmt;

use crate::error::InputError;
use crate::filters::date_range::{DateRange, RangeCheck};
use crate::models::work_order::{ORDER_DATE_CELL, STATUS_CELL, MIN_CELLS};

/// 状态过滤（大小写不敏感）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusFilter(String);

impl StatusFilter {
    pub fn new(value: &str) -> Result<Self, InputError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(InputError::EmptyStatusFilter);
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn matches(&self, status: &str) -> bool {
        status.trim().to_uppercase() == self.0.to_uppercase()
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 一次运行中生效的行过滤条件
#[derive(Debug, Clone, Default)]
pub struct RowFilters {
    pub date_range: Option<DateRange>,
    pub status: Option<StatusFilter>,
}

/// 跳过原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// 单元格不足，结构不匹配，不算错误
    Malformed { cells: usize },
    /// 早于开始日期
    BeforeRange { date: String },
    /// 晚于结束日期
    AfterRange { date: String },
    /// 日期缺失或无法解析
    OutsideRange { date: String },
    /// 状态不匹配
    Status { status: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Malformed { cells } => write!(f, "列数不足 ({})", cells),
            SkipReason::BeforeRange { date } => write!(f, "早于开始日期 ({})", date),
            SkipReason::AfterRange { date } => write!(f, "晚于结束日期 ({})", date),
            SkipReason::OutsideRange { date } => write!(f, "不在日期范围内 ({})", date),
            SkipReason::Status { status } => write!(f, "状态被过滤 ({})", status),
        }
    }
}

/// 行过滤结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowDecision {
    Accept,
    Skip(SkipReason),
}

impl RowDecision {
    pub fn is_accept(&self) -> bool {
        matches!(self, RowDecision::Accept)
    }
}

/// 判断一行是否需要处理，并给出跳过原因
pub fn evaluate_row(cells: &[String], filters: &RowFilters) -> RowDecision {
    if cells.len() < MIN_CELLS {
        return RowDecision::Skip(SkipReason::Malformed { cells: cells.len() });
    }

    if let Some(range) = &filters.date_range {
        let date = cells[ORDER_DATE_CELL].trim().to_string();
        match range.check(&date) {
            RangeCheck::InRange => {}
            RangeCheck::BeforeStart => return RowDecision::Skip(SkipReason::BeforeRange { date }),
            RangeCheck::AfterEnd => return RowDecision::Skip(SkipReason::AfterRange { date }),
            RangeCheck::NoDate => return RowDecision::Skip(SkipReason::OutsideRange { date }),
        }
    }

    if let Some(status_filter) = &filters.status {
        // 至少 7 列才有状态单元格；前面的列数检查已保证这一点
        if let Some(status) = cells.get(STATUS_CELL) {
            if !status_filter.matches(status) {
                return RowDecision::Skip(SkipReason::Status {
                    status: status.trim().to_string(),
                });
            }
        }
    }

    RowDecision::Accept
}

pub fn should_process_row(cells: &[String], filters: &RowFilters) -> bool {
    evaluate_row(cells, filters).is_accept()
}
