//! 日期范围过滤
//!
//! 日期格式固定为 `dd.mm.yyyy`。无法解析的字符串视为"没有日期"而不是错误，
//! 调用方把它当作不匹配处理。

use chrono::NaiveDate;

use crate::error::InputError;

const DATE_FORMAT: &str = "%d.%m.%Y";

/// 解析 `dd.mm.yyyy` 格式的日期
pub fn parse_date(date_str: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date_str.trim(), DATE_FORMAT).ok()
}

/// 格式化为 `dd.mm.yyyy`
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// 闭区间日期范围，任一边界缺省表示该侧不设限
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateRange {
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
}

/// 日期相对于范围的位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeCheck {
    InRange,
    /// 早于开始日期
    BeforeStart,
    /// 晚于结束日期
    AfterEnd,
    /// 日期无法解析
    NoDate,
}

impl DateRange {
    /// 两个边界都存在时要求 start <= end
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Self, InputError> {
        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                return Err(InputError::StartAfterEnd);
            }
        }
        Ok(Self { start, end })
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn start(&self) -> Option<NaiveDate> {
        self.start
    }

    pub fn end(&self) -> Option<NaiveDate> {
        self.end
    }

    pub fn check_date(&self, date: NaiveDate) -> RangeCheck {
        if self.start.is_some_and(|s| date < s) {
            RangeCheck::BeforeStart
        } else if self.end.is_some_and(|e| date > e) {
            RangeCheck::AfterEnd
        } else {
            RangeCheck::InRange
        }
    }

    pub fn check(&self, date_str: &str) -> RangeCheck {
        match parse_date(date_str) {
            Some(date) => self.check_date(date),
            None => RangeCheck::NoDate,
        }
    }

    pub fn contains(&self, date_str: &str) -> bool {
        self.check(date_str) == RangeCheck::InRange
    }
}

/// 日期字符串能解析且满足所有已设置的边界（闭区间）时返回 true
pub fn is_date_in_range(date_str: &str, range: &DateRange) -> bool {
    range.contains(date_str)
}

/// 从界面输入解析日期范围
///
/// 空字符串表示该侧不设限；非空但格式错误、或开始晚于结束时返回错误。
pub fn parse_date_range(start_str: &str, end_str: &str) -> Result<DateRange, InputError> {
    let start = parse_bound(start_str, InputError::InvalidStartDate)?;
    let end = parse_bound(end_str, InputError::InvalidEndDate)?;
    DateRange::new(start, end)
}

fn parse_bound(
    value: &str,
    invalid: fn(String) -> InputError,
) -> Result<Option<NaiveDate>, InputError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    parse_date(value).map(Some).ok_or_else(|| invalid(value.to_string()))
}
