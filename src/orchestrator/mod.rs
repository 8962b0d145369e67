//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `batch_runner` - 运行入口
//! - 管理浏览器会话的生命周期（打开、加载起始页、关闭）
//! - 输出全局统计信息
//!
//! ### `run_controller` - 运行控制器
//! - 遍历产品代码列表或当前页面上的所有行
//! - 重试、取消检查、汇总
//!
//! ### `cancel` - 协作式取消标记
//!
//! ## 层次关系
//!
//! ```text
//! batch_runner (会话生命周期)
//!     ↓
//! run_controller (Vec<产品代码> / Vec<行>)
//!     ↓
//! workflow::OrderProcessor (处理单行)
//!     ↓
//! services (能力层：错误页识别 / 错误记录 / 进度)
//!     ↓
//! browser + infrastructure (SessionDriver / JsExecutor / WaitStrategy)
//! ```

pub mod batch_runner;
pub mod cancel;
pub mod run_controller;

pub use batch_runner::App;
pub use cancel::CancelFlag;
pub use run_controller::RunController;
