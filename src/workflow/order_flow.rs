//! 单行工单处理流程 - 流程层
//!
//! 核心职责：定义"一行工单"的完整处理流程
//!
//! 流程顺序：
//! 1. 行过滤（列数 / 日期 / 状态）
//! 2. 点击详情链接 → 切换到新窗口
//! 3. 错误页识别
//! 4. 收尾步骤
//! 5. 无条件清理多余窗口

use std::sync::Arc;

use tracing::{debug, warn};

use crate::browser::SessionDriver;
use crate::config::Config;
use crate::error::BrowserResult;
use crate::filters::{evaluate_row, RowDecision, RowFilters, SkipReason};
use crate::infrastructure::WaitStrategy;
use crate::models::{FailureReason, RowOutcome, WorkOrderRow};
use crate::services::{ErrorLogger, FailureDetector, Progress};
use crate::workflow::close_out::{run_close_out, CloseOutResult};
use crate::workflow::row_ctx::RowCtx;

/// 单行处理流程
///
/// - 不持有浏览器会话，由调用方借用传入
/// - 一行的任何失败都转换为 `RowOutcome::Failed`，不会中断整个批次
pub struct OrderProcessor {
    config: Config,
    detector: Arc<dyn FailureDetector>,
    error_logger: ErrorLogger,
    waiter: Arc<dyn WaitStrategy>,
    progress: Progress,
}

impl OrderProcessor {
    pub fn new(
        config: Config,
        detector: Arc<dyn FailureDetector>,
        error_logger: ErrorLogger,
        waiter: Arc<dyn WaitStrategy>,
        progress: Progress,
    ) -> Self {
        Self {
            config,
            detector,
            error_logger,
            waiter,
            progress,
        }
    }

    pub async fn process_row(
        &self,
        session: &mut dyn SessionDriver,
        row: &WorkOrderRow,
        ctx: &RowCtx,
        filters: &RowFilters,
    ) -> RowOutcome {
        match evaluate_row(&row.cells, filters) {
            RowDecision::Accept => {}
            RowDecision::Skip(reason @ SkipReason::Malformed { .. }) => {
                debug!("{} 结构不匹配，跳过: {}", ctx, reason);
                return RowOutcome::Skipped(reason);
            }
            RowDecision::Skip(reason) => {
                self.progress
                    .emit(format!("  行 {} {}，跳过", ctx.row_number(), reason));
                return RowOutcome::Skipped(reason);
            }
        }

        let work_order = row.work_order_id().unwrap_or_default().to_string();

        let outcome = match self.open_and_close_out(session, row, &work_order, ctx).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("{} ⚠️ 处理工单 {} 时出错: {}", ctx, work_order, e);
                RowOutcome::Failed {
                    work_order: Some(work_order.clone()),
                    reason: FailureReason::Unexpected(e.to_string()),
                }
            }
        };

        self.cleanup_windows(session, ctx).await;

        match &outcome {
            RowOutcome::Processed { .. } => {
                self.progress
                    .emit(format!("  ✅ 工单 {} 处理完成", work_order));
            }
            RowOutcome::Failed { reason, .. } => {
                self.progress
                    .emit(format!("  ❌ 工单 {} 处理失败: {}", work_order, reason));
            }
            RowOutcome::Skipped(_) => {}
        }

        outcome
    }

    /// 步骤 2-4，任何浏览器错误都交给调用方统一清理
    async fn open_and_close_out(
        &self,
        session: &mut dyn SessionDriver,
        row: &WorkOrderRow,
        work_order: &str,
        ctx: &RowCtx,
    ) -> BrowserResult<RowOutcome> {
        debug!("{} 打开工单 {}", ctx, work_order);
        session.click_detail_link(row).await?;
        self.waiter.pause(self.config.click_delay()).await;
        session.switch_to_new_window().await?;

        let page_text = session.page_text().await?.to_lowercase();
        if self.detector.is_failure(&page_text) {
            warn!("{} 工单 {} 打开后是服务端错误页", ctx, work_order);
            self.record_error(work_order);
            return Ok(RowOutcome::Failed {
                work_order: Some(work_order.to_string()),
                reason: FailureReason::ServerError,
            });
        }

        let result = run_close_out(session, &self.config, self.waiter.as_ref(), ctx).await;
        Ok(match result {
            CloseOutResult::Completed => RowOutcome::Processed {
                work_order: work_order.to_string(),
            },
            CloseOutResult::TimedOut(step) => {
                self.record_error(work_order);
                RowOutcome::Failed {
                    work_order: Some(work_order.to_string()),
                    reason: FailureReason::Timeout(step),
                }
            }
            // 没有明确的终止状态，不写错误文件
            CloseOutResult::Failed(message) => RowOutcome::Failed {
                work_order: Some(work_order.to_string()),
                reason: FailureReason::Unexpected(message),
            },
        })
    }

    /// 不论结果如何，只要还有副窗口就关闭并切回主窗口
    async fn cleanup_windows(&self, session: &mut dyn SessionDriver, ctx: &RowCtx) {
        let needs_close = match session.window_count().await {
            Ok(count) => count > 1,
            Err(e) => {
                warn!("{} 无法获取窗口数量，尝试直接清理: {}", ctx, e);
                true
            }
        };
        if needs_close {
            if let Err(e) = session.close_secondary_window().await {
                warn!("{} ⚠️ 关闭副窗口失败: {}", ctx, e);
            }
        }
    }

    fn record_error(&self, identifier: &str) {
        if let Err(e) = self.error_logger.log_error(identifier) {
            warn!("⚠️ {}", e);
        }
    }
}
