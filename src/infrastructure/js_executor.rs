//! JS 执行器 - 基础设施层
//!
//! 持有一个 page 资源，只暴露"执行 JS"的能力

use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::error::BrowserResult;

/// JS 执行器
///
/// 职责：
/// - 持有一个 Page（主窗口或工单详情窗口）
/// - 暴露 eval() 能力
/// - 不认识工单 / 表格行
/// - 不处理业务流程
#[derive(Clone)]
pub struct JsExecutor {
    page: Page,
}

impl JsExecutor {
    /// 创建新的 JS 执行器
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    /// 获取 page 的引用（用于导航、关闭等非脚本操作）
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// 取出 page，执行器随之失效
    pub fn into_page(self) -> Page {
        self.page
    }

    /// 执行 JS 代码并返回 JSON 结果
    pub async fn eval(&self, js_code: impl Into<String>) -> BrowserResult<JsonValue> {
        let result = self.page.evaluate(js_code.into()).await?;
        let json_value = result.into_value::<JsonValue>()?;
        Ok(json_value)
    }

    /// 执行 JS 代码并反序列化为指定类型
    pub async fn eval_as<T: DeserializeOwned>(&self, js_code: impl Into<String>) -> BrowserResult<T> {
        let json_value = self.eval(js_code).await?;
        let typed_value = serde_json::from_value(json_value)?;
        Ok(typed_value)
    }

    /// 整个文档的 HTML 源码
    pub async fn page_source(&self) -> BrowserResult<String> {
        Ok(self.page.content().await?)
    }
}
