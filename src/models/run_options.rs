//! 运行参数与运行前校验
//!
//! 校验在自动化任务启动前同步完成，任何错误都会阻止运行开始。

use std::fmt;
use std::path::PathBuf;

use crate::error::{AppResult, FileError, InputError};
use crate::filters::{parse_date_range, DateRange, RowFilters, StatusFilter};
use crate::models::{load_product_codes, ProductCodeList};

/// 界面/命令行上填写的原始输入
#[derive(Debug, Clone, Default)]
pub struct RunInputs {
    /// 启用日期过滤时的 (开始, 结束) 字符串，空字符串表示不设限
    pub date_range: Option<(String, String)>,
    /// 启用状态过滤时的值
    pub status: Option<String>,
    /// 启用产品代码文件时的路径；`Some(None)` 表示启用但未选择文件
    pub code_file: Option<Option<PathBuf>>,
}

/// 校验后的运行参数
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub filters: RowFilters,
    /// None 表示处理当前页面上所有可见的行
    pub codes: Option<ProductCodeList>,
}

impl RunInputs {
    /// 只做不需要读文件的校验
    pub fn validate_filters(&self) -> Result<RowFilters, InputError> {
        let date_range = self
            .date_range
            .as_ref()
            .map(|(start, end)| parse_date_range(start, end))
            .transpose()?;
        let status = self.status.as_deref().map(StatusFilter::new).transpose()?;
        if let Some(None) = &self.code_file {
            return Err(InputError::MissingCodeFile);
        }
        Ok(RowFilters { date_range, status })
    }

    /// 完整校验并读取产品代码文件
    pub async fn into_options(self) -> AppResult<RunOptions> {
        let filters = self.validate_filters()?;
        let codes = match self.code_file.flatten() {
            Some(path) => {
                let codes = load_product_codes(&path).await.map_err(|e| {
                    e.downcast::<FileError>().unwrap_or_else(|e| FileError::LoadFailed {
                        path: path.display().to_string(),
                        message: format!("{:#}", e),
                    })
                })?;
                if codes.is_empty() {
                    return Err(InputError::EmptyCodeList.into());
                }
                Some(codes)
            }
            None => None,
        };
        Ok(RunOptions { filters, codes })
    }
}

impl fmt::Display for RunOptions {
    /// 运行模式描述，例如 `日期: 01.07.2025 - 13.07.2025 | 状态: HAZIRLIK | 产品代码: 2 个`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(range) = &self.filters.date_range {
            parts.push(format!("日期: {}", describe_range(range)));
        }
        if let Some(status) = &self.filters.status {
            parts.push(format!("状态: {}", status));
        }
        if let Some(codes) = &self.codes {
            parts.push(format!("产品代码: {} 个", codes.len()));
        }
        if parts.is_empty() {
            parts.push("全部工单".to_string());
        }
        f.write_str(&parts.join(" | "))
    }
}

fn describe_range(range: &DateRange) -> String {
    let bound = |d: Option<chrono::NaiveDate>| d.map(crate::filters::format_date).unwrap_or_default();
    format!("{} - {}", bound(range.start()), bound(range.end()))
}
