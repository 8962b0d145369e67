//! 浏览器会话抽象
//!
//! 编排层只通过 `SessionDriver` 操作浏览器，真实实现是 `ChromeSession`，
//! 测试中换成脚本化的假会话。

use std::fmt;

use async_trait::async_trait;

use crate::error::{BrowserError, BrowserResult, StepError};
use crate::models::WorkOrderRow;

/// 会话状态
///
/// ```text
/// Closed --open--> Started --navigate--> OnListPage --search--> SearchSubmitted
///   ^                                                                |
///   +-------------------------------close----------------------------+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Closed,
    Started,
    OnListPage,
    SearchSubmitted,
}

impl SessionState {
    pub fn name(self) -> &'static str {
        match self {
            SessionState::Closed => "Closed",
            SessionState::Started => "Started",
            SessionState::OnListPage => "OnListPage",
            SessionState::SearchSubmitted => "SearchSubmitted",
        }
    }

    pub fn is_on_list(self) -> bool {
        matches!(self, SessionState::OnListPage | SessionState::SearchSubmitted)
    }

    /// 状态不满足时返回 `InvalidState`
    pub fn require(self, ok: bool, expected: &'static str) -> BrowserResult<()> {
        if ok {
            Ok(())
        } else {
            Err(BrowserError::InvalidState {
                expected,
                actual: self.name(),
            })
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 一个浏览器会话
///
/// 窗口约定：点击详情链接会打开一个新窗口。任何打开新窗口的调用方必须在返回前
/// 关闭它并切回主窗口，出错时也一样。任意时刻最多只有一个副窗口。
#[async_trait]
pub trait SessionDriver: Send {
    fn state(&self) -> SessionState;

    /// Closed → Started
    async fn open(&mut self) -> BrowserResult<()>;

    /// Started → OnListPage，加载起始页后固定等待
    async fn navigate_to_start_page(&mut self) -> BrowserResult<()>;

    /// OnListPage → SearchSubmitted
    ///
    /// 超时返回 `Ok(false)`，由调用方决定是否重试
    async fn search_product(&mut self, code: &str) -> BrowserResult<bool>;

    /// 当前列表页上可见的结果行
    async fn result_rows(&mut self) -> BrowserResult<Vec<WorkOrderRow>>;

    /// 通过脚本点击行中的详情链接
    async fn click_detail_link(&mut self, row: &WorkOrderRow) -> BrowserResult<()>;

    /// 切换到点击后新打开的窗口
    async fn switch_to_new_window(&mut self) -> BrowserResult<()>;

    /// 当前窗口的完整页面文本
    async fn page_text(&mut self) -> BrowserResult<String>;

    async fn window_count(&mut self) -> BrowserResult<usize>;

    /// 关闭所有副窗口并切回主窗口
    async fn close_secondary_window(&mut self) -> BrowserResult<()>;

    /// 等待元素出现并读取其 value
    async fn read_value(&mut self, element_id: &str) -> Result<String, StepError>;

    /// 等待元素可点击后通过脚本点击
    async fn click(&mut self, element_id: &str) -> Result<(), StepError>;

    /// 等待元素出现，清空后输入
    async fn fill(&mut self, element_id: &str, value: &str) -> Result<(), StepError>;

    /// 任意状态 → Closed，释放浏览器进程
    async fn close(&mut self) -> BrowserResult<()>;
}

/// 主窗口与唯一副窗口
///
/// 显式维护"最多一个副窗口"的约束，违反时报错而不是按下标静默切错窗口。
#[derive(Debug)]
pub struct WindowSet<H> {
    main: Option<H>,
    secondary: Option<H>,
}

impl<H> Default for WindowSet<H> {
    fn default() -> Self {
        Self {
            main: None,
            secondary: None,
        }
    }
}

impl<H> WindowSet<H> {
    pub fn with_main(main: H) -> Self {
        Self {
            main: Some(main),
            secondary: None,
        }
    }

    pub fn main(&self) -> Option<&H> {
        self.main.as_ref()
    }

    pub fn secondary(&self) -> Option<&H> {
        self.secondary.as_ref()
    }

    /// 有副窗口时为副窗口，否则为主窗口
    pub fn current(&self) -> Option<&H> {
        self.secondary.as_ref().or(self.main.as_ref())
    }

    pub fn has_secondary(&self) -> bool {
        self.secondary.is_some()
    }

    pub fn count(&self) -> usize {
        usize::from(self.main.is_some()) + usize::from(self.secondary.is_some())
    }

    /// 已有副窗口时拒绝
    pub fn ensure_no_secondary(&self) -> BrowserResult<()> {
        if self.has_secondary() {
            return Err(BrowserError::WindowLeak { open: self.count() });
        }
        Ok(())
    }

    pub fn attach_secondary(&mut self, handle: H) -> BrowserResult<()> {
        self.ensure_no_secondary()?;
        self.secondary = Some(handle);
        Ok(())
    }

    pub fn take_secondary(&mut self) -> Option<H> {
        self.secondary.take()
    }

    pub fn clear(&mut self) {
        self.secondary = None;
        self.main = None;
    }
}
