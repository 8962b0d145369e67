/// 程序配置文件
///
/// 所有组件在构造时显式接收一份 `Config`，测试可以单独覆盖延时和超时。
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{AppResult, ConfigError};

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 门户根地址
    pub base_url: String,
    /// 工单列表页（相对于 base_url）
    pub start_path: String,
    /// 轮询等待的统一超时（秒）
    pub wait_timeout_secs: u64,
    /// 打开列表页后的固定等待（秒）
    pub page_load_delay_secs: u64,
    /// 输入搜索词后、重试之间的固定等待（秒）
    pub search_delay_secs: u64,
    /// 点击后的固定等待（秒）
    pub click_delay_secs: u64,
    /// 提交类操作后的固定等待（秒）
    pub update_delay_secs: u64,
    /// 轮询间隔（毫秒）
    pub poll_interval_ms: u64,
    /// 每个产品代码的最大尝试次数
    pub max_retries: usize,
    /// 失败记录文件
    pub error_file: String,
    /// 服务端错误页关键词（小写）
    pub error_keywords: Vec<String>,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    pub elements: ElementIds,
    pub browser: BrowserSettings,
}

/// 目标页面上的固定元素 ID
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ElementIds {
    pub search_input: String,
    /// 结果表格行的 DOM id 前缀
    pub row_id_prefix: String,
    pub quantity_input: String,
    pub start_button: String,
    pub start_confirm_button: String,
    pub finish_button: String,
    pub weight_input: String,
    pub submit_button: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    /// 无头模式
    pub headless: bool,
    /// 浏览器可执行文件，为空时由 chromiumoxide 自行查找
    pub chrome_executable: Option<PathBuf>,
    /// 设置后连接已打开的浏览器，而不是启动新的会话
    pub debug_port: Option<u16>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://192.168.1.248/".to_string(),
            start_path: "Uretim/UrunNerede".to_string(),
            wait_timeout_secs: 10,
            page_load_delay_secs: 15,
            search_delay_secs: 2,
            click_delay_secs: 1,
            update_delay_secs: 2,
            poll_interval_ms: 250,
            max_retries: 3,
            error_file: "error_urunler.txt".to_string(),
            error_keywords: default_error_keywords(),
            verbose_logging: false,
            elements: ElementIds::default(),
            browser: BrowserSettings::default(),
        }
    }
}

impl Default for ElementIds {
    fn default() -> Self {
        Self {
            search_input: "gridViewurnerede_DXFREditorcol4_I".to_string(),
            row_id_prefix: "gridViewurnerede_DXDataRow".to_string(),
            quantity_input: "Miktar_I".to_string(),
            start_button: "Baslat".to_string(),
            start_confirm_button: "btnUpdatebaslat".to_string(),
            finish_button: "Bitir".to_string(),
            weight_input: "Brut_I".to_string(),
            submit_button: "btnUpdate_CD".to_string(),
        }
    }
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: false,
            chrome_executable: None,
            debug_port: None,
        }
    }
}

fn default_error_keywords() -> Vec<String> {
    [
        "subquery returned more than 1 value",
        "nesne başvurusu bir nesnenin örneğine ayarlanmadı",
        "sunucu hatası",
        "system.nullreferenceexception",
        "server error",
        "geçerli web isteği yürütülürken işlenmemiş özel durum",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Config {
    /// 默认值 → 可选的 TOML 文件 → 环境变量
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let base = match path {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };
        Ok(base.with_env_overrides())
    }

    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Unreadable {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_toml_str(&content).map_err(|e| {
            ConfigError::Invalid {
                path: path.display().to_string(),
                message: e.to_string(),
            }
            .into()
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    fn with_env_overrides(self) -> Self {
        let default = self;
        Self {
            base_url: std::env::var("PORTAL_BASE_URL").unwrap_or(default.base_url),
            start_path: std::env::var("PORTAL_START_PATH").unwrap_or(default.start_path),
            wait_timeout_secs: env_parse("WAIT_TIMEOUT_SECS").unwrap_or(default.wait_timeout_secs),
            page_load_delay_secs: env_parse("PAGE_LOAD_DELAY_SECS").unwrap_or(default.page_load_delay_secs),
            search_delay_secs: env_parse("SEARCH_DELAY_SECS").unwrap_or(default.search_delay_secs),
            click_delay_secs: env_parse("CLICK_DELAY_SECS").unwrap_or(default.click_delay_secs),
            update_delay_secs: env_parse("UPDATE_DELAY_SECS").unwrap_or(default.update_delay_secs),
            poll_interval_ms: env_parse("POLL_INTERVAL_MS").unwrap_or(default.poll_interval_ms),
            max_retries: env_parse("MAX_RETRIES").unwrap_or(default.max_retries),
            error_file: std::env::var("ERROR_FILE").unwrap_or(default.error_file),
            verbose_logging: env_parse("VERBOSE_LOGGING").unwrap_or(default.verbose_logging),
            browser: BrowserSettings {
                headless: env_parse("BROWSER_HEADLESS").unwrap_or(default.browser.headless),
                chrome_executable: std::env::var("CHROME_EXECUTABLE")
                    .ok()
                    .map(PathBuf::from)
                    .or(default.browser.chrome_executable),
                debug_port: env_parse("BROWSER_DEBUG_PORT").or(default.browser.debug_port),
            },
            ..default
        }
    }

    pub fn start_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.start_path.trim_start_matches('/')
        )
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }

    pub fn page_load_delay(&self) -> Duration {
        Duration::from_secs(self.page_load_delay_secs)
    }

    pub fn search_delay(&self) -> Duration {
        Duration::from_secs(self.search_delay_secs)
    }

    pub fn click_delay(&self) -> Duration {
        Duration::from_secs(self.click_delay_secs)
    }

    pub fn update_delay(&self) -> Duration {
        Duration::from_secs(self.update_delay_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}
