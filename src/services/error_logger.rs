//! 错误记录服务 - 业务能力层
//!
//! 只负责"写错误文件"能力，不关心流程

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::FileError;

/// 错误记录服务
///
/// 职责：
/// - 把处理失败的工单号 / 产品代码追加到错误文件，每行一个，UTF-8
/// - 每次写入都单独打开、写入、关闭，不持有长期句柄
/// - 文件在第一次写入时创建，从不截断
#[derive(Debug, Clone)]
pub struct ErrorLogger {
    error_file_path: PathBuf,
}

impl ErrorLogger {
    /// 使用自定义文件路径创建
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            error_file_path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.error_file_path
    }

    /// 追加一条失败记录
    ///
    /// 以追加模式打开，单行写入足够小，多个写入者之间也不会交错
    pub fn log_error(&self, identifier: &str) -> Result<(), FileError> {
        debug!("写入错误记录: {}", identifier);

        let write_failed = |source: std::io::Error| FileError::WriteFailed {
            path: self.error_file_path.display().to_string(),
            source,
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.error_file_path)
            .map_err(write_failed)?;

        file.write_all(format!("{}\n", identifier.trim()).as_bytes())
            .map_err(write_failed)?;

        Ok(())
    }
}
