use chromiumoxide::cdp::browser_protocol::target::TargetId;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::config::BrowserSettings;
use crate::error::{BrowserError, BrowserResult};

/// 启动参数：关闭无用日志，隐藏自动化标识
const LAUNCH_ARGS: &[&str] = &[
    "--log-level=3",
    "--disable-logging",
    "--disable-gpu",
    "--disable-dev-shm-usage",
    "--no-sandbox",
    "--no-first-run",
    "--no-default-browser-check",
    "--disable-infobars",
    "--disable-blink-features=AutomationControlled",
    // 详情页通过脚本点击在新窗口打开
    "--disable-popup-blocking",
];

/// 启动一个新的浏览器会话，返回浏览器、主窗口以及浏览器自带的启动页
///
/// 启动页不属于本会话，调用方需要把它们排除在副窗口之外。
pub async fn launch_browser(settings: &BrowserSettings) -> BrowserResult<(Browser, Page, Vec<TargetId>)> {
    info!("🚀 启动浏览器...");
    debug!("浏览器设置: {:?}", settings);

    let mut builder = BrowserConfig::builder()
        .disable_default_args()
        .args(LAUNCH_ARGS.iter().copied())
        .viewport(None);

    if settings.headless {
        builder = builder.new_headless_mode();
    } else {
        builder = builder.with_head();
    }
    if let Some(executable) = &settings.chrome_executable {
        builder = builder.chrome_executable(executable);
    }

    let config = builder.build().map_err(|message| {
        error!("配置浏览器失败: {}", message);
        BrowserError::LaunchFailed { message }
    })?;

    let (mut browser, mut handler) = Browser::launch(config).await.map_err(|e| {
        error!("启动浏览器失败: {}", e);
        BrowserError::LaunchFailed {
            message: e.to_string(),
        }
    })?;
    debug!("浏览器启动成功");

    // 在后台处理浏览器事件
    tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // 添加短暂延迟以等待浏览器状态同步
    sleep(tokio::time::Duration::from_millis(300)).await;

    browser.fetch_targets().await?;
    let startup = browser
        .pages()
        .await?
        .iter()
        .map(|p| p.target_id().clone())
        .collect::<Vec<_>>();
    debug!("启动页数量: {}", startup.len());

    let page = browser.new_page("about:blank").await.map_err(|e| {
        error!("创建页面失败: {}", e);
        BrowserError::LaunchFailed {
            message: e.to_string(),
        }
    })?;

    info!("✅ 浏览器已就绪");
    Ok((browser, page, startup))
}
