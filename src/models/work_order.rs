//! 结果表格中的一行工单
//!
//! 行只在一次页面渲染内有效，表格重新查询或页面跳转后即失效，不做持久化。

use serde::Deserialize;

/// 单元格索引：工单号
pub const WORK_ORDER_CELL: usize = 2;
/// 单元格索引：详情链接
pub const DETAIL_LINK_CELL: usize = 3;
/// 单元格索引：准备状态
pub const STATUS_CELL: usize = 6;
/// 单元格索引：订单日期
pub const ORDER_DATE_CELL: usize = 14;
/// 一行至少需要的单元格数量
pub const MIN_CELLS: usize = 15;

/// 表格行
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorkOrderRow {
    /// 行的 DOM id，用于触发详情链接的点击
    pub dom_id: String,
    /// 按顺序排列的单元格文本（已去除首尾空白）
    pub cells: Vec<String>,
}

impl WorkOrderRow {
    pub fn new(dom_id: impl Into<String>, cells: Vec<String>) -> Self {
        Self {
            dom_id: dom_id.into(),
            cells: cells.into_iter().map(|c| c.trim().to_string()).collect(),
        }
    }

    pub fn cell(&self, index: usize) -> Option<&str> {
        self.cells.get(index).map(String::as_str)
    }

    pub fn is_malformed(&self) -> bool {
        self.cells.len() < MIN_CELLS
    }

    pub fn work_order_id(&self) -> Option<&str> {
        self.cell(WORK_ORDER_CELL)
    }

    pub fn status(&self) -> Option<&str> {
        self.cell(STATUS_CELL)
    }

    pub fn order_date(&self) -> Option<&str> {
        self.cell(ORDER_DATE_CELL)
    }
}
