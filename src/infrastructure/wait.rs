//! 等待策略 - 基础设施层
//!
//! 目标页面没有可靠的"加载完成"信号，所以固定时长的等待是刻意保留的同步方式。
//! 所有固定等待都经过 `WaitStrategy`，测试中换成 `NoWait` 即可不占用真实时间。

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

#[async_trait]
pub trait WaitStrategy: Send + Sync {
    /// 固定时长的等待
    async fn pause(&self, duration: Duration);
}

/// 真实的 tokio 睡眠
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioWait;

#[async_trait]
impl WaitStrategy for TokioWait {
    async fn pause(&self, duration: Duration) {
        if duration.is_zero() {
            return;
        }
        debug!("等待 {:?}", duration);
        tokio::time::sleep(duration).await;
    }
}

/// 立即返回，用于测试
#[derive(Debug, Clone, Copy, Default)]
pub struct NoWait;

#[async_trait]
impl WaitStrategy for NoWait {
    async fn pause(&self, _duration: Duration) {}
}
