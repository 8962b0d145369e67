//! 脚本化的假会话，只用于测试
//!
//! 按预设返回搜索结果、页面文本和步骤失败，并记录所有调用。

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;

use crate::browser::driver::{SessionDriver, SessionState, WindowSet};
use crate::error::{BrowserError, BrowserResult, StepError};
use crate::models::work_order::{DETAIL_LINK_CELL, MIN_CELLS, ORDER_DATE_CELL, STATUS_CELL, WORK_ORDER_CELL};
use crate::models::WorkOrderRow;
use crate::orchestrator::CancelFlag;

const MAIN: &str = "main";

#[derive(Debug, Clone, Copy)]
pub(crate) enum FakeFailure {
    Timeout,
    Error,
}

pub(crate) struct FakeSession {
    state: SessionState,
    windows: WindowSet<String>,
    /// 每个代码的搜索结果，按尝试顺序消费，最后一项重复使用；None 表示超时
    searches: HashMap<String, VecDeque<Option<Vec<WorkOrderRow>>>>,
    visible_rows: Vec<WorkOrderRow>,
    current_rows: Vec<WorkOrderRow>,
    pending_window: Option<String>,
    page_texts: HashMap<String, String>,
    failures: HashMap<(String, String), FakeFailure>,
    cancel_on_click: Option<(String, CancelFlag)>,
    pub searches_made: Vec<String>,
    /// "行 id:元素 id"
    pub clicks: Vec<String>,
    pub fills: Vec<(String, String)>,
    /// 每次点击详情链接时已打开的窗口数
    pub windows_at_open: Vec<usize>,
    pub closed: bool,
}

/// 构造一行满足默认过滤条件的工单
pub(crate) fn row(dom_id: &str, work_order: &str, date: &str, status: &str) -> WorkOrderRow {
    let mut cells = vec![String::new(); MIN_CELLS];
    cells[WORK_ORDER_CELL] = work_order.to_string();
    cells[DETAIL_LINK_CELL] = "Detay".to_string();
    cells[STATUS_CELL] = status.to_string();
    cells[ORDER_DATE_CELL] = date.to_string();
    WorkOrderRow::new(dom_id, cells)
}

impl FakeSession {
    pub fn new() -> Self {
        Self {
            state: SessionState::Closed,
            windows: WindowSet::default(),
            searches: HashMap::new(),
            visible_rows: Vec::new(),
            current_rows: Vec::new(),
            pending_window: None,
            page_texts: HashMap::new(),
            failures: HashMap::new(),
            cancel_on_click: None,
            searches_made: Vec::new(),
            clicks: Vec::new(),
            fills: Vec::new(),
            windows_at_open: Vec::new(),
            closed: false,
        }
    }

    /// 已打开并停在列表页
    pub fn on_list_page() -> Self {
        let mut session = Self::new();
        session.state = SessionState::OnListPage;
        session.windows = WindowSet::with_main(MAIN.to_string());
        session
    }

    pub fn with_search(mut self, code: &str, attempts: Vec<Option<Vec<WorkOrderRow>>>) -> Self {
        self.searches.insert(code.to_string(), attempts.into());
        self
    }

    pub fn with_visible_rows(mut self, rows: Vec<WorkOrderRow>) -> Self {
        self.visible_rows = rows.clone();
        self.current_rows = rows;
        self
    }

    pub fn with_page_text(mut self, dom_id: &str, text: &str) -> Self {
        self.page_texts.insert(dom_id.to_string(), text.to_string());
        self
    }

    pub fn fail_step(mut self, dom_id: &str, element_id: &str, failure: FakeFailure) -> Self {
        self.failures
            .insert((dom_id.to_string(), element_id.to_string()), failure);
        self
    }

    pub fn cancel_on_click(mut self, element_id: &str, flag: CancelFlag) -> Self {
        self.cancel_on_click = Some((element_id.to_string(), flag));
        self
    }

    pub fn open_windows(&self) -> usize {
        self.windows.count()
    }

    pub fn focused(&self) -> Option<&String> {
        self.windows.current()
    }

    fn check_step(&self, element_id: &str) -> Result<String, StepError> {
        let Some(dom_id) = self.windows.secondary().cloned() else {
            return Err(BrowserError::ElementNotFound(element_id.to_string()).into());
        };
        match self.failures.get(&(dom_id.clone(), element_id.to_string())) {
            Some(FakeFailure::Timeout) => Err(StepError::Timeout(element_id.to_string())),
            Some(FakeFailure::Error) => Err(BrowserError::ElementNotFound(element_id.to_string()).into()),
            None => Ok(dom_id),
        }
    }
}

#[async_trait]
impl SessionDriver for FakeSession {
    fn state(&self) -> SessionState {
        self.state
    }

    async fn open(&mut self) -> BrowserResult<()> {
        self.state.require(self.state == SessionState::Closed, "Closed")?;
        self.windows = WindowSet::with_main(MAIN.to_string());
        self.state = SessionState::Started;
        Ok(())
    }

    async fn navigate_to_start_page(&mut self) -> BrowserResult<()> {
        self.state.require(self.state != SessionState::Closed, "Started")?;
        self.current_rows = self.visible_rows.clone();
        self.state = SessionState::OnListPage;
        Ok(())
    }

    async fn search_product(&mut self, code: &str) -> BrowserResult<bool> {
        self.state.require(self.state.is_on_list(), "OnListPage")?;
        self.searches_made.push(code.to_string());
        self.state = SessionState::SearchSubmitted;

        let Some(attempts) = self.searches.get_mut(code) else {
            return Ok(false);
        };
        let result = if attempts.len() > 1 {
            attempts.pop_front().flatten()
        } else {
            attempts.front().cloned().flatten()
        };
        match result {
            Some(rows) => {
                self.current_rows = rows;
                Ok(true)
            }
            None => {
                self.current_rows.clear();
                Ok(false)
            }
        }
    }

    async fn result_rows(&mut self) -> BrowserResult<Vec<WorkOrderRow>> {
        self.state.require(self.state.is_on_list(), "OnListPage")?;
        Ok(self.current_rows.clone())
    }

    async fn click_detail_link(&mut self, row: &WorkOrderRow) -> BrowserResult<()> {
        self.state.require(self.state.is_on_list(), "OnListPage")?;
        self.windows_at_open.push(self.windows.count());
        self.windows.ensure_no_secondary()?;
        self.pending_window = Some(row.dom_id.clone());
        Ok(())
    }

    async fn switch_to_new_window(&mut self) -> BrowserResult<()> {
        let dom_id = self.pending_window.take().ok_or(BrowserError::NoNewWindow)?;
        self.windows.attach_secondary(dom_id)
    }

    async fn page_text(&mut self) -> BrowserResult<String> {
        Ok(match self.windows.secondary() {
            Some(dom_id) => self
                .page_texts
                .get(dom_id)
                .cloned()
                .unwrap_or_else(|| "<html><body>İş Emri Detay</body></html>".to_string()),
            None => "<html><body>Ürün Nerede</body></html>".to_string(),
        })
    }

    async fn window_count(&mut self) -> BrowserResult<usize> {
        Ok(self.windows.count())
    }

    async fn close_secondary_window(&mut self) -> BrowserResult<()> {
        self.windows.take_secondary();
        Ok(())
    }

    async fn read_value(&mut self, element_id: &str) -> Result<String, StepError> {
        self.check_step(element_id)?;
        Ok("120".to_string())
    }

    async fn click(&mut self, element_id: &str) -> Result<(), StepError> {
        let dom_id = self.check_step(element_id)?;
        self.clicks.push(format!("{}:{}", dom_id, element_id));
        if let Some((trigger, flag)) = &self.cancel_on_click {
            if trigger == element_id {
                flag.cancel();
            }
        }
        Ok(())
    }

    async fn fill(&mut self, element_id: &str, value: &str) -> Result<(), StepError> {
        self.check_step(element_id)?;
        self.fills.push((element_id.to_string(), value.to_string()));
        Ok(())
    }

    async fn close(&mut self) -> BrowserResult<()> {
        self.windows.clear();
        self.state = SessionState::Closed;
        self.closed = true;
        Ok(())
    }
}
