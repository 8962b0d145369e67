pub mod date_range;
pub mod row_filter;

pub use date_range::{format_date, is_date_in_range, parse_date, parse_date_range, DateRange, RangeCheck};
pub use row_filter::{evaluate_row, should_process_row, RowDecision, RowFilters, SkipReason, StatusFilter};
