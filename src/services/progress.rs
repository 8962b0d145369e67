//! 进度日志流
//!
//! 核心只输出一行一行带时间戳的文本，由宿主（命令行、界面、文件）决定如何展示。

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc::UnboundedSender;
use tracing::info;

pub trait ProgressSink: Send + Sync {
    fn emit(&self, line: &str);
}

/// 丢弃所有行
///
/// `Progress::emit` 已经把每一行写入 tracing，没有宿主界面时用它即可
#[derive(Debug, Default)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn emit(&self, _line: &str) {}
}

/// 通过通道转发给宿主界面
pub struct ChannelSink {
    tx: UnboundedSender<String>,
}

impl ChannelSink {
    pub fn new(tx: UnboundedSender<String>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelSink {
    fn emit(&self, line: &str) {
        // 接收端关闭后丢弃即可
        let _ = self.tx.send(line.to_string());
    }
}

/// 保存在内存中
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|l| l.contains(needle))
    }
}

impl ProgressSink for MemorySink {
    fn emit(&self, line: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line.to_string());
        }
    }
}

/// 进度发射器：加时间戳，写入 tracing，再转发给 sink
#[derive(Clone)]
pub struct Progress {
    sink: Arc<dyn ProgressSink>,
}

impl Progress {
    pub fn new(sink: Arc<dyn ProgressSink>) -> Self {
        Self { sink }
    }

    /// 只写入 tracing
    pub fn tracing_only() -> Self {
        Self::new(Arc::new(NullSink))
    }

    pub fn emit(&self, message: impl AsRef<str>) {
        let message = message.as_ref();
        info!("{}", message);
        let line = format!("{} - {}", chrono::Local::now().format("%H:%M:%S"), message);
        self.sink.emit(&line);
    }
}
