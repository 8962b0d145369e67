//! 运行入口 - 编排层
//!
//! ## 职责
//!
//! 1. **会话生命周期**：打开浏览器 → 加载起始页 → 运行 → 关闭
//! 2. **保证释放**：无论运行成功、失败还是被取消，都会关闭会话
//! 3. **全局统计**：输出最终汇总
//!
//! 不处理单个产品代码或单行的细节，全部委托给 `RunController`。

use std::sync::Arc;

use tracing::{error, warn};

use crate::browser::{ChromeSession, SessionDriver};
use crate::config::Config;
use crate::error::AppResult;
use crate::infrastructure::{TokioWait, WaitStrategy};
use crate::models::{RunOptions, RunSummary};
use crate::orchestrator::cancel::CancelFlag;
use crate::orchestrator::run_controller::RunController;
use crate::services::Progress;
use crate::utils::logging::{log_startup, print_final_stats};

/// 应用主结构
pub struct App {
    config: Config,
    progress: Progress,
    cancel: CancelFlag,
}

impl App {
    pub fn new(config: Config, progress: Progress, cancel: CancelFlag) -> Self {
        Self {
            config,
            progress,
            cancel,
        }
    }

    /// 使用真实浏览器运行
    pub async fn run(&self, options: &RunOptions) -> AppResult<RunSummary> {
        let waiter: Arc<dyn WaitStrategy> = Arc::new(TokioWait);
        let mut session = ChromeSession::new(self.config.clone(), waiter.clone());
        self.run_with(&mut session, waiter, options).await
    }

    /// 在给定会话上运行，返回前总是关闭会话
    pub async fn run_with(
        &self,
        session: &mut dyn SessionDriver,
        waiter: Arc<dyn WaitStrategy>,
        options: &RunOptions,
    ) -> AppResult<RunSummary> {
        log_startup(&self.config);
        if let Some(codes) = &options.codes {
            self.progress.emit(format!("已读取 {} 个产品代码", codes.len()));
        }
        self.progress.emit(format!("运行模式: {}", options));

        let result = self.drive(session, waiter, options).await;

        if let Err(e) = session.close().await {
            warn!("⚠️ 关闭浏览器失败: {}", e);
        }

        match &result {
            Ok(summary) => print_final_stats(summary, &self.config),
            Err(e) => {
                error!("❌ 运行中止: {}", e);
                self.progress.emit(format!("总体错误: {}", e));
            }
        }
        result
    }

    async fn drive(
        &self,
        session: &mut dyn SessionDriver,
        waiter: Arc<dyn WaitStrategy>,
        options: &RunOptions,
    ) -> AppResult<RunSummary> {
        session.open().await?;
        session.navigate_to_start_page().await?;
        self.progress.emit("网站已加载，开始处理...");

        let controller = RunController::new(
            self.config.clone(),
            waiter,
            self.progress.clone(),
            self.cancel.clone(),
        );
        let summary = controller.run(session, options).await?;

        self.progress.emit("全部处理完成。");
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::fake::{row, FakeSession};
    use crate::browser::SessionState;
    use crate::error::{AppError, BrowserError};
    use crate::infrastructure::NoWait;
    use crate::services::MemorySink;
    use tempfile::TempDir;

    fn app(dir: &TempDir, sink: Arc<MemorySink>) -> App {
        let config = Config {
            error_file: dir.path().join("errors.txt").display().to_string(),
            ..Config::default()
        };
        App::new(config, Progress::new(sink), CancelFlag::new())
    }

    #[tokio::test]
    async fn test_session_is_closed_after_run() {
        let dir = TempDir::new().unwrap();
        let sink = Arc::new(MemorySink::default());
        let mut session = FakeSession::new()
            .with_visible_rows(vec![row("r0", "IE-1", "05.07.2025", "HAZIRLIK")]);

        let summary = app(&dir, sink.clone())
            .run_with(&mut session, Arc::new(NoWait), &RunOptions::default())
            .await
            .unwrap();

        assert_eq!(summary.succeeded, 1);
        assert!(session.closed);
        assert_eq!(session.state(), SessionState::Closed);
        assert!(sink.contains("运行模式: 全部工单"));
        assert!(sink.contains("网站已加载"));
        assert!(sink.contains("全部处理完成"));
    }

    #[tokio::test]
    async fn test_run_mode_reaches_the_progress_sink() {
        let dir = TempDir::new().unwrap();
        let sink = Arc::new(MemorySink::default());
        let mut session = FakeSession::new();
        let options = RunOptions {
            codes: Some(crate::models::ProductCodeList::new(["A100", "A200"])),
            ..RunOptions::default()
        };

        app(&dir, sink.clone())
            .run_with(&mut session, Arc::new(NoWait), &options)
            .await
            .unwrap();

        let lines = sink.lines();
        assert!(lines[0].ends_with("已读取 2 个产品代码"));
        assert!(lines[1].ends_with("运行模式: 产品代码: 2 个"));
    }

    #[tokio::test]
    async fn test_session_is_closed_when_open_fails() {
        let dir = TempDir::new().unwrap();
        let sink = Arc::new(MemorySink::default());
        // 已经处于打开状态，再次 open 会失败
        let mut session = FakeSession::on_list_page();

        let result = app(&dir, sink.clone())
            .run_with(&mut session, Arc::new(NoWait), &RunOptions::default())
            .await;

        assert!(matches!(
            result,
            Err(AppError::Browser(BrowserError::InvalidState { .. }))
        ));
        assert!(session.closed);
        assert!(sink.contains("总体错误"));
    }
}
