//! 行处理上下文
//!
//! 封装"我正在处理哪个产品代码的第几行"这一信息，只用于日志

use std::fmt::Display;

#[derive(Debug, Clone)]
pub struct RowCtx {
    /// 行在结果表格中的索引（从 0 开始）
    pub row_index: usize,

    /// 产品代码模式下当前搜索的代码
    pub code: Option<String>,
}

impl RowCtx {
    pub fn new(row_index: usize, code: Option<&str>) -> Self {
        Self {
            row_index,
            code: code.map(str::to_string),
        }
    }

    /// 面向用户的行号（从 1 开始）
    pub fn row_number(&self) -> usize {
        self.row_index + 1
    }
}

impl Display for RowCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.code {
            Some(code) => write!(f, "[代码 {} 行 #{}]", code, self.row_number()),
            None => write!(f, "[行 #{}]", self.row_number()),
        }
    }
}
