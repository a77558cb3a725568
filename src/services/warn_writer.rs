//! 警告写入服务 - 业务能力层
//!
//! 只负责"把修正记录追加到 warn.txt"能力，不关心流程

use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::services::normalizer::Diagnostic;

/// 警告写入服务
///
/// 职责：
/// - 将形态修正、重复 ID 等记录写入 warn.txt
/// - 每次只写一条记录
pub struct WarnWriter {
    warn_file_path: String,
}

impl WarnWriter {
    /// 创建警告写入服务，写入指定文件
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            warn_file_path: path.into(),
        }
    }

    pub fn path(&self) -> &str {
        &self.warn_file_path
    }

    /// 写入本次运行的分隔头
    pub async fn write_header(&self, title: &str) -> AppResult<()> {
        let header = format!(
            "{}\n{} - {}\n{}\n",
            "=".repeat(60),
            title,
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            "=".repeat(60)
        );
        self.append(&header).await
    }

    /// 写入一条修正记录
    pub async fn write(&self, diagnostic: &Diagnostic) -> AppResult<()> {
        debug!("写入警告: {}", diagnostic);
        self.append(&format!("{}\n", diagnostic)).await
    }

    async fn append(&self, text: &str) -> AppResult<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.warn_file_path)
            .await
            .map_err(|e| AppError::file_write_failed(self.warn_file_path.as_str(), e))?;

        file.write_all(text.as_bytes())
            .await
            .map_err(|e| AppError::file_write_failed(self.warn_file_path.as_str(), e))?;

        Ok(())
    }
}
