/// 日志工具模块
///
/// 初始化 tracing，并提供启动 / 汇总信息的输出
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::models::RunSummary;

/// 初始化日志订阅器
///
/// 优先使用 `RUST_LOG`；否则默认 `info`，开启详细日志时为 `debug`
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // 重复初始化（例如测试中）时忽略
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 工单收尾");
    info!("🌐 起始页: {}", config.start_url());
    info!("🔁 每个产品最多尝试: {} 次", config.max_retries);
    info!("{}", "=".repeat(60));
}

/// 打印最终统计信息
pub fn print_final_stats(summary: &RunSummary, config: &Config) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", summary.succeeded, summary.attempted);
    info!("⏭ 跳过: {}", summary.skipped);
    info!("❌ 失败: {}", summary.failed);
    if summary.cancelled {
        info!("⏹ 运行被取消");
    }
    info!("{}", "=".repeat(60));
    info!("\n失败记录保存在: {}", config.error_file);
}
