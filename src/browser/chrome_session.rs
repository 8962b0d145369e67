//! chromiumoxide 实现的浏览器会话
//!
//! 页面上的交互几乎都通过脚本完成：表格框架的遮罩层会挡住原生点击。

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::target::TargetId;
use chromiumoxide::{Browser, Page};
use tracing::{debug, info, warn};

use crate::browser::driver::{SessionDriver, SessionState, WindowSet};
use crate::browser::{connect_to_browser, launch_browser};
use crate::config::Config;
use crate::error::{BrowserError, BrowserResult, StepError};
use crate::infrastructure::{JsExecutor, WaitStrategy};
use crate::models::WorkOrderRow;

pub struct ChromeSession {
    config: Config,
    waiter: Arc<dyn WaitStrategy>,
    state: SessionState,
    browser: Option<Browser>,
    /// 由本会话启动的浏览器在关闭时一并退出；连接的浏览器保持运行
    launched: bool,
    /// 会话打开前浏览器里已有的标签页
    foreign_targets: Vec<TargetId>,
    windows: WindowSet<JsExecutor>,
}

impl ChromeSession {
    pub fn new(config: Config, waiter: Arc<dyn WaitStrategy>) -> Self {
        Self {
            config,
            waiter,
            state: SessionState::Closed,
            browser: None,
            launched: false,
            foreign_targets: Vec::new(),
            windows: WindowSet::default(),
        }
    }

    fn main_window(&self) -> BrowserResult<&JsExecutor> {
        self.windows.main().ok_or(BrowserError::InvalidState {
            expected: "Started",
            actual: self.state.name(),
        })
    }

    fn current_window(&self) -> BrowserResult<&JsExecutor> {
        self.windows.current().ok_or(BrowserError::InvalidState {
            expected: "Started",
            actual: self.state.name(),
        })
    }

    /// 主窗口以外、属于本会话的所有页面
    async fn secondary_pages(&mut self) -> BrowserResult<Vec<Page>> {
        let main_id = self.main_window()?.page().target_id().clone();
        let browser = self.browser.as_mut().ok_or(BrowserError::InvalidState {
            expected: "Started",
            actual: SessionState::Closed.name(),
        })?;
        browser.fetch_targets().await?;
        let pages = browser.pages().await?;
        Ok(pages
            .into_iter()
            .filter(|p| is_secondary(p.target_id(), &main_id, &self.foreign_targets))
            .collect())
    }
}

#[async_trait]
impl SessionDriver for ChromeSession {
    fn state(&self) -> SessionState {
        self.state
    }

    async fn open(&mut self) -> BrowserResult<()> {
        self.state
            .require(self.state == SessionState::Closed, "Closed")?;

        // 打开会话前已经存在的页面（连接模式下的原有标签页、启动时的空白页）都不算副窗口
        let (browser, page, existing) = match self.config.browser.debug_port {
            Some(port) => {
                self.launched = false;
                connect_to_browser(port).await?
            }
            None => {
                self.launched = true;
                launch_browser(&self.config.browser).await?
            }
        };

        self.browser = Some(browser);
        self.foreign_targets = existing;
        self.windows = WindowSet::with_main(JsExecutor::new(page));
        self.state = SessionState::Started;
        Ok(())
    }

    async fn navigate_to_start_page(&mut self) -> BrowserResult<()> {
        self.state.require(self.state != SessionState::Closed, "Started")?;

        let url = self.config.start_url();
        info!("正在打开: {}", url);
        self.main_window()?
            .page()
            .goto(url.as_str())
            .await
            .map_err(|source| BrowserError::NavigationFailed {
                url: url.clone(),
                source,
            })?;

        // 页面没有可靠的加载完成信号，只能固定等待
        self.waiter.pause(self.config.page_load_delay()).await;
        self.state = SessionState::OnListPage;
        Ok(())
    }

    async fn search_product(&mut self, code: &str) -> BrowserResult<bool> {
        self.state.require(self.state.is_on_list(), "OnListPage")?;
        let search_input = &self.config.elements.search_input;
        let executor = self.main_window()?;

        match wait_for_element(executor, search_input, &self.config).await {
            Ok(()) => {}
            Err(StepError::Timeout(_)) => {
                debug!("搜索框 #{} 未出现", search_input);
                return Ok(false);
            }
            Err(StepError::Browser(e)) => return Err(e),
        }
        match type_into(executor, search_input, code).await {
            Ok(()) => {}
            Err(StepError::Timeout(_)) => return Ok(false),
            Err(StepError::Browser(e)) => return Err(e),
        }
        self.state = SessionState::SearchSubmitted;

        self.waiter.pause(self.config.search_delay()).await;

        let script = results_ready_script(&self.config.elements.row_id_prefix);
        let ready = poll_until(self.main_window()?, &script, &self.config).await;
        if !ready {
            debug!("搜索 {} 超时", code);
        }
        Ok(ready)
    }

    async fn result_rows(&mut self) -> BrowserResult<Vec<WorkOrderRow>> {
        self.state.require(self.state.is_on_list(), "OnListPage")?;
        let script = format!(
            r#"
            (() => Array.from(document.querySelectorAll({}))
                .map(tr => ({{
                    dom_id: tr.id,
                    cells: Array.from(tr.querySelectorAll('td'))
                        .map(td => (td.innerText || td.textContent || '').trim())
                }})))()
            "#,
            js_str(&row_selector(&self.config.elements.row_id_prefix))
        );
        let rows: Vec<WorkOrderRow> = self.main_window()?.eval_as(script).await?;
        Ok(rows
            .into_iter()
            .map(|r| WorkOrderRow::new(r.dom_id, r.cells))
            .collect())
    }

    async fn click_detail_link(&mut self, row: &WorkOrderRow) -> BrowserResult<()> {
        self.state.require(self.state.is_on_list(), "OnListPage")?;
        self.windows.ensure_no_secondary()?;

        let script = format!(
            r#"
            (() => {{
                const tr = document.getElementById({});
                if (!tr) return false;
                const tds = tr.querySelectorAll('td');
                if (tds.length <= {}) return false;
                const link = tds[{}].querySelector('a');
                if (!link) return false;
                link.click();
                return true;
            }})()
            "#,
            js_str(&row.dom_id),
            crate::models::work_order::DETAIL_LINK_CELL,
            crate::models::work_order::DETAIL_LINK_CELL
        );
        let clicked: bool = self.main_window()?.eval_as(script).await?;
        if !clicked {
            return Err(BrowserError::ElementNotFound(format!("{} 的详情链接", row.dom_id)));
        }
        Ok(())
    }

    async fn switch_to_new_window(&mut self) -> BrowserResult<()> {
        self.windows.ensure_no_secondary()?;

        let deadline = Instant::now() + self.config.wait_timeout();
        let mut pages = self.secondary_pages().await?;
        while pages.is_empty() && Instant::now() < deadline {
            tokio::time::sleep(self.config.poll_interval()).await;
            pages = self.secondary_pages().await?;
        }

        match pages.len() {
            0 => Err(BrowserError::NoNewWindow),
            1 => {
                let page = pages.remove(0);
                page.bring_to_front().await?;
                self.windows.attach_secondary(JsExecutor::new(page))
            }
            n => Err(BrowserError::WindowLeak { open: n + 1 }),
        }
    }

    async fn page_text(&mut self) -> BrowserResult<String> {
        self.current_window()?.page_source().await
    }

    async fn window_count(&mut self) -> BrowserResult<usize> {
        Ok(1 + self.secondary_pages().await?.len())
    }

    async fn close_secondary_window(&mut self) -> BrowserResult<()> {
        let tracked = self.windows.take_secondary();
        let mut pages = match self.secondary_pages().await {
            Ok(pages) => pages,
            Err(e) => {
                warn!("获取窗口列表失败: {}", e);
                Vec::new()
            }
        };
        if let Some(tracked) = tracked {
            let tracked_id = tracked.page().target_id().clone();
            if !pages.iter().any(|p| p.target_id() == &tracked_id) {
                pages.push(tracked.into_page());
            }
        }

        for page in pages {
            if let Err(e) = page.close().await {
                warn!("关闭窗口失败: {}", e);
            }
        }

        self.main_window()?.page().bring_to_front().await?;
        Ok(())
    }

    async fn read_value(&mut self, element_id: &str) -> Result<String, StepError> {
        let executor = self.current_window()?;
        wait_for_element(executor, element_id, &self.config).await?;
        let value: Option<String> = executor
            .eval_as(format!(
                "(() => {{ const el = document.getElementById({}); return el ? String(el.value ?? '') : null; }})()",
                js_str(element_id)
            ))
            .await?;
        value.ok_or_else(|| StepError::Browser(BrowserError::ElementNotFound(element_id.to_string())))
    }

    async fn click(&mut self, element_id: &str) -> Result<(), StepError> {
        let executor = self.current_window()?;
        wait_for_clickable(executor, element_id, &self.config).await?;
        let clicked: bool = executor
            .eval_as(format!(
                "(() => {{ const el = document.getElementById({}); if (!el) return false; el.click(); return true; }})()",
                js_str(element_id)
            ))
            .await?;
        if !clicked {
            return Err(BrowserError::ElementNotFound(element_id.to_string()).into());
        }
        Ok(())
    }

    async fn fill(&mut self, element_id: &str, value: &str) -> Result<(), StepError> {
        let executor = self.current_window()?;
        wait_for_element(executor, element_id, &self.config).await?;
        type_into(executor, element_id, value).await
    }

    async fn close(&mut self) -> BrowserResult<()> {
        self.windows.clear();
        self.foreign_targets.clear();
        self.state = SessionState::Closed;

        let Some(mut browser) = self.browser.take() else {
            return Ok(());
        };
        if self.launched {
            info!("正在关闭浏览器...");
            browser.close().await?;
            if let Err(e) = browser.wait().await {
                warn!("等待浏览器进程退出失败: {}", e);
            }
        } else {
            debug!("断开与浏览器的连接，浏览器保持运行");
        }
        Ok(())
    }
}

// ========== 等待与输入 ==========

/// 轮询脚本直到返回 true，超时返回 false
///
/// 页面跳转过程中脚本可能执行失败，这类错误只记录不中断轮询。
async fn poll_until(executor: &JsExecutor, script: &str, config: &Config) -> bool {
    let deadline = Instant::now() + config.wait_timeout();
    loop {
        match executor.eval_as::<bool>(script).await {
            Ok(true) => return true,
            Ok(false) => {}
            Err(e) => debug!("轮询脚本执行失败: {}", e),
        }
        if Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(config.poll_interval()).await;
    }
}

async fn wait_for_element(executor: &JsExecutor, element_id: &str, config: &Config) -> Result<(), StepError> {
    if poll_until(executor, &element_present_script(element_id), config).await {
        Ok(())
    } else {
        Err(StepError::Timeout(element_id.to_string()))
    }
}

async fn wait_for_clickable(executor: &JsExecutor, element_id: &str, config: &Config) -> Result<(), StepError> {
    if poll_until(executor, &element_clickable_script(element_id), config).await {
        Ok(())
    } else {
        Err(StepError::Timeout(element_id.to_string()))
    }
}

/// 清空输入框后逐字输入，触发页面上的键盘事件
async fn type_into(executor: &JsExecutor, element_id: &str, value: &str) -> Result<(), StepError> {
    executor
        .eval(format!(
            "(() => {{ const el = document.getElementById({}); if (el) {{ el.focus(); el.value = ''; }} }})()",
            js_str(element_id)
        ))
        .await?;
    let element = executor.page().find_element(format!("#{}", element_id)).await?;
    element.click().await?;
    element.type_str(value).await?;
    Ok(())
}

/// 属于本会话的副窗口：既不是主窗口，也不是会话打开前就存在的页面
fn is_secondary<T: PartialEq>(target: &T, main: &T, foreign: &[T]) -> bool {
    target != main && !foreign.contains(target)
}

// ========== 脚本辅助函数 ==========

/// 转成 JS 字符串字面量
fn js_str(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}

fn row_selector(prefix: &str) -> String {
    format!("tr[id^=\"{}\"]", prefix)
}

fn element_present_script(element_id: &str) -> String {
    format!("!!document.getElementById({})", js_str(element_id))
}

fn element_clickable_script(element_id: &str) -> String {
    format!(
        r#"
        (() => {{
            const el = document.getElementById({});
            if (!el || el.disabled || el.getAttribute('aria-disabled') === 'true') return false;
            const style = window.getComputedStyle(el);
            if (style.visibility === 'hidden' || style.display === 'none') return false;
            return el.getClientRects().length > 0;
        }})()
        "#,
        js_str(element_id)
    )
}

/// 至少出现一行结果
fn results_ready_script(row_prefix: &str) -> String {
    format!(
        "document.querySelectorAll({}).length > 0",
        js_str(&row_selector(row_prefix))
    )
}
