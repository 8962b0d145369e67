use thiserror::Error;

/// 应用程序错误类型
///
/// 只用于真正意外的情况（会话启动失败、输入校验失败等）。
/// 单行工单的成功/跳过/失败通过 `RowOutcome` 返回，不走错误通道。
#[derive(Debug, Error)]
pub enum AppError {
    /// 浏览器相关错误
    #[error("浏览器错误: {0}")]
    Browser(#[from] BrowserError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 运行前的输入校验错误
    #[error("输入错误: {0}")]
    Input(#[from] InputError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 浏览器相关错误
#[derive(Debug, Error)]
pub enum BrowserError {
    /// 启动浏览器失败
    #[error("启动浏览器失败: {message}")]
    LaunchFailed { message: String },
    /// 连接浏览器失败
    #[error("无法连接到浏览器 (端口: {port}): {source}")]
    ConnectionFailed {
        port: u16,
        #[source]
        source: chromiumoxide::error::CdpError,
    },
    /// 导航失败
    #[error("导航到 {url} 失败: {source}")]
    NavigationFailed {
        url: String,
        #[source]
        source: chromiumoxide::error::CdpError,
    },
    /// CDP 调用或脚本执行失败
    #[error("执行脚本失败: {0}")]
    Cdp(#[from] chromiumoxide::error::CdpError),
    /// 脚本返回值无法解析
    #[error("脚本返回值解析失败: {0}")]
    Decode(#[from] serde_json::Error),
    /// 会话状态不允许当前操作
    #[error("会话状态错误: 需要 {expected}, 当前 {actual}")]
    InvalidState {
        expected: &'static str,
        actual: &'static str,
    },
    /// 已经有一个副窗口处于打开状态
    #[error("窗口泄漏: 已打开 {open} 个窗口，只允许一个副窗口")]
    WindowLeak { open: usize },
    /// 点击后没有出现新窗口
    #[error("点击后未检测到新窗口")]
    NoNewWindow,
    /// 找不到元素
    #[error("未找到元素: {0}")]
    ElementNotFound(String),
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 不支持的文件格式
    #[error("不支持的文件格式: {extension}")]
    UnsupportedFormat { extension: String },
    /// 读取产品代码列表失败
    #[error("无法读取产品代码文件 ({path}): {message}")]
    LoadFailed { path: String, message: String },
    /// 表格文件解析失败
    #[error("表格解析失败 ({path}): {message}")]
    SpreadsheetParseFailed { path: String, message: String },
}

/// 运行前的输入校验错误，在自动化任务启动前同步报告
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("开始日期格式无效 (请使用 dd.mm.yyyy): {0}")]
    InvalidStartDate(String),
    #[error("结束日期格式无效 (请使用 dd.mm.yyyy): {0}")]
    InvalidEndDate(String),
    #[error("开始日期不能晚于结束日期")]
    StartAfterEnd,
    #[error("状态过滤值不能为空")]
    EmptyStatusFilter,
    #[error("未选择产品代码文件")]
    MissingCodeFile,
    #[error("文件中没有有效的产品代码")]
    EmptyCodeList,
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("无法读取配置文件 {path}: {source}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("配置文件 {path} 无效: {message}")]
    Invalid { path: String, message: String },
}

/// 单个页面步骤的错误
///
/// 区分"等待超时"和其他失败，收尾流程对两者的处理不同。
#[derive(Debug, Error)]
pub enum StepError {
    #[error("等待元素 #{0} 超时")]
    Timeout(String),
    #[error(transparent)]
    Browser(#[from] BrowserError),
}

impl From<chromiumoxide::error::CdpError> for StepError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        StepError::Browser(BrowserError::Cdp(err))
    }
}

impl StepError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, StepError::Timeout(_))
    }
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

/// 浏览器操作结果类型
pub type BrowserResult<T> = Result<T, BrowserError>;
