//! 采集层错误类型

use thiserror::Error;

/// 采集错误
#[derive(Debug, Error)]
pub enum IngestionError {
    /// 数据源类型依赖的 cargo feature 未编译
    #[error("source kind '{kind}' is unavailable: rebuild with the '{feature}' feature")]
    BackendDisabled {
        /// 配置的数据源类型
        kind: String,
        /// 提供该类型的 cargo feature
        feature: String,
    },

    /// 无法创建上游客户端
    #[error("failed to connect source {source_name}: {message}")]
    Connection {
        /// 数据源名称
        source_name: String,
        /// 错误信息
        message: String,
    },
}

impl IngestionError {
    pub fn backend_disabled(kind: impl Into<String>, feature: impl Into<String>) -> Self {
        Self::BackendDisabled {
            kind: kind.into(),
            feature: feature.into(),
        }
    }

    pub fn connection(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Connection {
            source_name: source_name.into(),
            message: message.into(),
        }
    }
}

/// 采集层 Result 类型别名
pub type Result<T> = std::result::Result<T, IngestionError>;
