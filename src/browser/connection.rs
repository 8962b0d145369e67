use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::error::{BrowserError, BrowserResult};

/// 连接到已开启远程调试端口的浏览器，并新建一个主窗口
///
/// 浏览器中已有的标签页不属于本会话，返回其 target id 以便之后忽略。
pub async fn connect_to_browser(
    port: u16,
) -> BrowserResult<(Browser, Page, Vec<chromiumoxide::cdp::browser_protocol::target::TargetId>)> {
    let browser_url = format!("http://localhost:{}", port);
    info!("正在连接到浏览器: {}", browser_url);

    let (mut browser, mut handler) = Browser::connect(&browser_url).await.map_err(|e| {
        error!("连接浏览器失败: {}", e);
        BrowserError::ConnectionFailed { port, source: e }
    })?;
    debug!("浏览器连接成功");

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
    let existing = browser
        .pages()
        .await?
        .iter()
        .map(|p| p.target_id().clone())
        .collect::<Vec<_>>();
    debug!("浏览器中已有 {} 个页面", existing.len());

    let page = browser.new_page("about:blank").await.map_err(|e| {
        error!("创建新页面失败: {}", e);
        e
    })?;

    Ok((browser, page, existing))
}
