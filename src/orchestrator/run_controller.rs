//! 运行控制器 - 编排层
//!
//! ## 职责
//!
//! 遍历产品代码列表（或当前页面上所有行），把每一行交给 `OrderProcessor`，
//! 负责重试、取消检查和汇总统计。
//!
//! ## 两种模式
//!
//! - **产品代码模式**：每个代码最多尝试 `max_retries` 次；搜索超时则等待后重试；
//!   搜索成功但没有任何行时立即记为失败（不重试）；第一行处理成功即视为该代码成功
//! - **全表模式**：当前页面上每一行处理一次，不重试
//!
//! 取消标记只在每个代码 / 每一行开始前检查，不会打断正在进行的页面操作。

use std::sync::Arc;

use tracing::{debug, warn};

use crate::browser::SessionDriver;
use crate::config::Config;
use crate::error::AppResult;
use crate::filters::RowFilters;
use crate::infrastructure::WaitStrategy;
use crate::models::{CodeOutcome, RetryState, RunOptions, RunSummary};
use crate::orchestrator::cancel::CancelFlag;
use crate::services::{ErrorLogger, FailureDetector, KeywordDetector, Progress};
use crate::workflow::{OrderProcessor, RowCtx};

pub struct RunController {
    config: Config,
    processor: OrderProcessor,
    error_logger: ErrorLogger,
    waiter: Arc<dyn WaitStrategy>,
    progress: Progress,
    cancel: CancelFlag,
}

impl RunController {
    /// 使用配置中的关键词识别错误页
    pub fn new(
        config: Config,
        waiter: Arc<dyn WaitStrategy>,
        progress: Progress,
        cancel: CancelFlag,
    ) -> Self {
        let detector = Arc::new(KeywordDetector::new(config.error_keywords.clone()));
        Self::with_detector(config, detector, waiter, progress, cancel)
    }

    pub fn with_detector(
        config: Config,
        detector: Arc<dyn FailureDetector>,
        waiter: Arc<dyn WaitStrategy>,
        progress: Progress,
        cancel: CancelFlag,
    ) -> Self {
        let error_logger = ErrorLogger::with_path(&config.error_file);
        let processor = OrderProcessor::new(
            config.clone(),
            detector,
            error_logger.clone(),
            waiter.clone(),
            progress.clone(),
        );
        Self {
            config,
            processor,
            error_logger,
            waiter,
            progress,
            cancel,
        }
    }

    /// 在已经停在列表页的会话上执行一次运行
    pub async fn run(
        &self,
        session: &mut dyn SessionDriver,
        options: &RunOptions,
    ) -> AppResult<RunSummary> {
        let summary = match &options.codes {
            Some(codes) => self.run_codes(session, codes, &options.filters).await,
            None => self.run_visible_rows(session, &options.filters).await?,
        };

        if summary.cancelled {
            self.progress.emit("⏹ 已取消");
        }
        self.progress.emit(format!(
            "汇总: 尝试 {} | 成功 {} | 跳过 {} | 失败 {}",
            summary.attempted, summary.succeeded, summary.skipped, summary.failed
        ));
        Ok(summary)
    }

    async fn run_codes(
        &self,
        session: &mut dyn SessionDriver,
        codes: &[String],
        filters: &RowFilters,
    ) -> RunSummary {
        let mut summary = RunSummary::default();
        let total = codes.len();

        for (index, code) in codes.iter().enumerate() {
            if self.cancel.is_cancelled() {
                summary.cancelled = true;
                break;
            }

            self.progress
                .emit(format!("[{}/{}] 搜索工单: {}", index + 1, total, code));

            let outcome = self.process_code(session, code, filters, &mut summary).await;
            if outcome != CodeOutcome::Succeeded {
                self.progress.emit(format!("  {} 处理失败", code));
            }
            summary.record_code(outcome);

            self.progress.emit("  继续下一个产品");
            self.waiter.pause(self.config.search_delay()).await;
        }

        summary
    }

    /// 单个产品代码的重试循环
    ///
    /// 被过滤的行只按最后一次拿到结果的尝试计入 `skipped`，重试不会重复计数
    async fn process_code(
        &self,
        session: &mut dyn SessionDriver,
        code: &str,
        filters: &RowFilters,
        summary: &mut RunSummary,
    ) -> CodeOutcome {
        let mut retry = RetryState::new(self.config.max_retries);
        let mut skipped = 0;

        let outcome = 'attempts: {
            while let Some(attempt) = retry.next_attempt() {
                if attempt > 1 {
                    self.progress.emit(format!("  重试 #{}", attempt));
                }

                match session.search_product(code).await {
                    Ok(true) => {}
                    Ok(false) => {
                        self.progress.emit(format!("  {} 搜索超时", code));
                        self.waiter.pause(self.config.search_delay()).await;
                        continue;
                    }
                    Err(e) => {
                        warn!("搜索 {} 出错: {}", code, e);
                        self.progress.emit(format!("  {} 搜索出错: {}", code, e));
                        self.waiter.pause(self.config.search_delay()).await;
                        continue;
                    }
                }

                let rows = match session.result_rows().await {
                    Ok(rows) => rows,
                    Err(e) => {
                        warn!("读取 {} 的结果行失败: {}", code, e);
                        self.waiter.pause(self.config.search_delay()).await;
                        continue;
                    }
                };

                // 代码确实不存在，重试也不会出现
                if rows.is_empty() {
                    self.progress.emit(format!("  {} 没有找到结果", code));
                    self.record_error(code);
                    break 'attempts CodeOutcome::NotFound;
                }

                self.progress
                    .emit(format!("  找到 {} 行，开始处理...", rows.len()));

                skipped = 0;
                for (row_index, row) in rows.iter().enumerate() {
                    let ctx = RowCtx::new(row_index, Some(code));
                    let outcome = self
                        .processor
                        .process_row(session, row, &ctx, filters)
                        .await;
                    if outcome.is_skipped() {
                        skipped += 1;
                    }
                    if outcome.is_processed() {
                        break 'attempts CodeOutcome::Succeeded;
                    }
                }

                debug!("{} 第 {} 次尝试没有成功处理任何行", code, attempt);
                self.waiter.pause(self.config.search_delay()).await;
            }
            CodeOutcome::Exhausted
        };

        summary.skipped += skipped;
        outcome
    }

    async fn run_visible_rows(
        &self,
        session: &mut dyn SessionDriver,
        filters: &RowFilters,
    ) -> AppResult<RunSummary> {
        let mut summary = RunSummary::default();
        self.progress.emit("扫描全部工单...");

        let rows = session.result_rows().await?;
        if rows.is_empty() {
            self.progress.emit("没有找到任何行！");
            return Ok(summary);
        }
        self.progress
            .emit(format!("找到 {} 行，开始过滤...", rows.len()));

        for (row_index, row) in rows.iter().enumerate() {
            if self.cancel.is_cancelled() {
                summary.cancelled = true;
                break;
            }
            let ctx = RowCtx::new(row_index, None);
            let outcome = self.processor.process_row(session, row, &ctx, filters).await;
            summary.record_row(&outcome);
        }

        self.progress
            .emit(format!("共处理 {} 行", summary.succeeded));
        Ok(summary)
    }

    fn record_error(&self, identifier: &str) {
        if let Err(e) = self.error_logger.log_error(identifier) {
            warn!("⚠️ {}", e);
        }
    }
}
