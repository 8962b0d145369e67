//! # Portal Cleaner
//!
//! 自动完成生产门户中工单收尾操作的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page），只暴露能力
//! - `JsExecutor` - 提供 eval() 能力
//! - `WaitStrategy` - 所有固定等待都经过它，测试中不占用真实时间
//!
//! ### ② 浏览器会话（Browser）
//! - `SessionDriver` - 会话状态机 + 窗口约定（最多一个副窗口）
//! - `ChromeSession` - chromiumoxide 实现
//!
//! ### ③ 业务能力层（Services / Filters）
//! - `filters/` - 日期范围与状态过滤
//! - `KeywordDetector` - 错误页识别
//! - `ErrorLogger` - 写失败记录文件
//! - `Progress` - 带时间戳的进度日志流
//!
//! ### ④ 流程层（Workflow）
//! - `OrderProcessor` - "一行工单"的完整处理流程（过滤 → 打开 → 识别错误页 → 收尾 → 清理窗口）
//!
//! ### ⑤ 编排层（Orchestration）
//! - `RunController` - 产品代码 / 全表两种模式，重试与取消
//! - `App` - 浏览器会话的生命周期
//!
//! ## 模块结构

pub mod browser;
pub mod config;
pub mod error;
pub mod filters;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use browser::{ChromeSession, SessionDriver, SessionState};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use filters::{parse_date_range, DateRange, RowFilters, StatusFilter};
pub use models::{ProductCodeList, RunInputs, RunOptions, RunSummary, WorkOrderRow};
pub use orchestrator::{App, CancelFlag, RunController};
pub use services::Progress;
pub use workflow::OrderProcessor;
