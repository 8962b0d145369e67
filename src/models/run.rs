//! 运行结果模型

use std::fmt;

use crate::filters::SkipReason;

/// 失败原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// 页面中嵌入了服务端错误信息
    ServerError,
    /// 等待某个步骤超时
    Timeout(String),
    /// 其他意外错误
    Unexpected(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::ServerError => write!(f, "服务端错误页"),
            FailureReason::Timeout(step) => write!(f, "超时: {}", step),
            FailureReason::Unexpected(msg) => write!(f, "意外错误: {}", msg),
        }
    }
}

/// 单行处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    /// 收尾流程完成
    Processed { work_order: String },
    /// 被过滤或结构不匹配，没有任何副作用
    Skipped(SkipReason),
    Failed {
        work_order: Option<String>,
        reason: FailureReason,
    },
}

impl RowOutcome {
    pub fn is_processed(&self) -> bool {
        matches!(self, RowOutcome::Processed { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, RowOutcome::Skipped(_))
    }
}

/// 单个产品代码的处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeOutcome {
    /// 某一行处理成功
    Succeeded,
    /// 搜索成功但没有任何行，不再重试
    NotFound,
    /// 重试次数用尽
    Exhausted,
}

/// 运行汇总
///
/// 产品代码模式下 attempted/succeeded/failed 按代码计数；全表模式下按行计数。
/// skipped 始终按被过滤的行计数。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub attempted: usize,
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
    /// 运行被取消而提前结束
    pub cancelled: bool,
}

impl RunSummary {
    pub fn record_code(&mut self, outcome: CodeOutcome) {
        self.attempted += 1;
        match outcome {
            CodeOutcome::Succeeded => self.succeeded += 1,
            CodeOutcome::NotFound | CodeOutcome::Exhausted => self.failed += 1,
        }
    }

    pub fn record_row(&mut self, outcome: &RowOutcome) {
        self.attempted += 1;
        match outcome {
            RowOutcome::Processed { .. } => self.succeeded += 1,
            RowOutcome::Skipped(_) => self.skipped += 1,
            RowOutcome::Failed { .. } => self.failed += 1,
        }
    }
}

/// 每个产品代码独立的重试计数
#[derive(Debug, Clone, Copy)]
pub struct RetryState {
    attempt: usize,
    max_attempts: usize,
}

impl RetryState {
    pub fn new(max_attempts: usize) -> Self {
        Self {
            attempt: 0,
            max_attempts: max_attempts.max(1),
        }
    }

    /// 开始下一次尝试，返回尝试序号（从 1 开始）；次数用尽时返回 None
    pub fn next_attempt(&mut self) -> Option<usize> {
        if self.attempt >= self.max_attempts {
            return None;
        }
        self.attempt += 1;
        Some(self.attempt)
    }

    pub fn attempts(&self) -> usize {
        self.attempt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_state_is_bounded() {
        let mut retry = RetryState::new(3);
        assert_eq!(retry.next_attempt(), Some(1));
        assert_eq!(retry.next_attempt(), Some(2));
        assert_eq!(retry.next_attempt(), Some(3));
        assert_eq!(retry.next_attempt(), None);
        assert_eq!(retry.attempts(), 3);
    }

    #[test]
    fn test_zero_retries_still_allows_one_attempt() {
        let mut retry = RetryState::new(0);
        assert_eq!(retry.next_attempt(), Some(1));
        assert_eq!(retry.next_attempt(), None);
    }

    #[test]
    fn test_summary_counts_rows() {
        let mut summary = RunSummary::default();
        summary.record_row(&RowOutcome::Processed {
            work_order: "IE-1".to_string(),
        });
        summary.record_row(&RowOutcome::Skipped(SkipReason::Malformed { cells: 3 }));
        summary.record_row(&RowOutcome::Failed {
            work_order: None,
            reason: FailureReason::ServerError,
        });
        assert_eq!(
            summary,
            RunSummary {
                attempted: 3,
                succeeded: 1,
                skipped: 1,
                failed: 1,
                cancelled: false,
            }
        );
    }
}
