//! 工单收尾步骤 - 流程层
//!
//! 流程顺序：
//! 1. 读取数量
//! 2. 开始 → 确认开始（可选，超时即跳过，工单可能已经处于开始状态）
//! 3. 结束
//! 4. 把数量写入重量输入框
//! 5. 提交

use tracing::{debug, info};

use crate::browser::SessionDriver;
use crate::config::Config;
use crate::error::StepError;
use crate::infrastructure::WaitStrategy;
use crate::workflow::row_ctx::RowCtx;

/// 收尾结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseOutResult {
    Completed,
    /// 必须成功的步骤等待超时，参数为元素 id
    TimedOut(String),
    /// 其他错误
    Failed(String),
}

impl From<StepError> for CloseOutResult {
    fn from(err: StepError) -> Self {
        match err {
            StepError::Timeout(element) => CloseOutResult::TimedOut(element),
            StepError::Browser(e) => CloseOutResult::Failed(e.to_string()),
        }
    }
}

/// 在当前（详情）窗口上执行收尾步骤
pub async fn run_close_out(
    session: &mut dyn SessionDriver,
    config: &Config,
    waiter: &dyn WaitStrategy,
    ctx: &RowCtx,
) -> CloseOutResult {
    match close_out_steps(session, config, waiter, ctx).await {
        Ok(()) => CloseOutResult::Completed,
        Err(e) => e.into(),
    }
}

async fn close_out_steps(
    session: &mut dyn SessionDriver,
    config: &Config,
    waiter: &dyn WaitStrategy,
    ctx: &RowCtx,
) -> Result<(), StepError> {
    let ids = &config.elements;

    let quantity = session.read_value(&ids.quantity_input).await?;
    debug!("{} 数量: {}", ctx, quantity);

    match start_order(session, config, waiter).await {
        Ok(()) => debug!("{} 已开始", ctx),
        Err(e) if e.is_timeout() => debug!("{} 开始按钮不可用，跳过: {}", ctx, e),
        Err(e) => return Err(e),
    }

    session.click(&ids.finish_button).await?;
    waiter.pause(config.click_delay()).await;

    session.fill(&ids.weight_input, &quantity).await?;
    waiter.pause(config.click_delay()).await;

    session.click(&ids.submit_button).await?;
    waiter.pause(config.update_delay()).await;

    info!("{} ✓ 收尾完成", ctx);
    Ok(())
}

async fn start_order(
    session: &mut dyn SessionDriver,
    config: &Config,
    waiter: &dyn WaitStrategy,
) -> Result<(), StepError> {
    session.click(&config.elements.start_button).await?;
    waiter.pause(config.click_delay()).await;
    session.click(&config.elements.start_confirm_button).await?;
    waiter.pause(config.update_delay()).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::fake::{row, FakeFailure, FakeSession};
    use crate::infrastructure::NoWait;

    async fn open_detail(session: &mut FakeSession, dom_id: &str) {
        let target = row(dom_id, "IE-1", "05.07.2025", "HAZIRLIK");
        session.click_detail_link(&target).await.unwrap();
        session.switch_to_new_window().await.unwrap();
    }

    #[tokio::test]
    async fn test_full_sequence_copies_quantity_into_weight() {
        let config = Config::default();
        let mut session = FakeSession::on_list_page();
        open_detail(&mut session, "r0").await;

        let result = run_close_out(&mut session, &config, &NoWait, &RowCtx::new(0, None)).await;

        assert_eq!(result, CloseOutResult::Completed);
        assert_eq!(
            session.clicks,
            vec!["r0:Baslat", "r0:btnUpdatebaslat", "r0:Bitir", "r0:btnUpdate_CD"]
        );
        assert_eq!(session.fills, vec![("Brut_I".to_string(), "120".to_string())]);
    }

    #[tokio::test]
    async fn test_start_timeout_is_skipped() {
        let config = Config::default();
        let mut session = FakeSession::on_list_page().fail_step("r0", "Baslat", FakeFailure::Timeout);
        open_detail(&mut session, "r0").await;

        let result = run_close_out(&mut session, &config, &NoWait, &RowCtx::new(0, None)).await;

        assert_eq!(result, CloseOutResult::Completed);
        assert_eq!(session.clicks, vec!["r0:Bitir", "r0:btnUpdate_CD"]);
    }

    #[tokio::test]
    async fn test_finish_timeout_is_reported() {
        let config = Config::default();
        let mut session = FakeSession::on_list_page().fail_step("r0", "Bitir", FakeFailure::Timeout);
        open_detail(&mut session, "r0").await;

        let result = run_close_out(&mut session, &config, &NoWait, &RowCtx::new(0, None)).await;

        assert_eq!(result, CloseOutResult::TimedOut("Bitir".to_string()));
        assert!(session.fills.is_empty());
    }

    #[tokio::test]
    async fn test_non_timeout_error_in_start_is_a_failure() {
        let config = Config::default();
        let mut session = FakeSession::on_list_page().fail_step("r0", "btnUpdatebaslat", FakeFailure::Error);
        open_detail(&mut session, "r0").await;

        let result = run_close_out(&mut session, &config, &NoWait, &RowCtx::new(0, None)).await;

        assert!(matches!(result, CloseOutResult::Failed(_)));
        assert_eq!(session.clicks, vec!["r0:Baslat"]);
    }
}
