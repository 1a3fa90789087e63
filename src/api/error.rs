// ==========================================
// 仓储货位规划引擎 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，将引擎/导入/配置错误转换为调用方可读的消息
// 红线: 所有错误信息必须包含显式原因
// ==========================================

use crate::config::ConfigError;
use crate::engine::EngineError;
use crate::importer::ImportError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 输入与配置错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("配置错误: {0}")]
    ConfigError(String),

    // ==========================================
    // 数据错误
    // ==========================================
    #[error("文件导入失败: {0}")]
    ImportError(String),

    #[error("数据验证失败: {0}")]
    ValidationError(String),

    // ==========================================
    // 输出错误
    // ==========================================
    #[error("结果导出失败: {0}")]
    ExportError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 EngineError 转换
// ==========================================
// 配置类错误与输入数据错误分开上报
impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        if err.is_config_error() {
            ApiError::ConfigError(err.to_string())
        } else {
            ApiError::ValidationError(err.to_string())
        }
    }
}

// ==========================================
// 从 ImportError 转换
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::RequiredColumnMissing { .. } | ImportError::TypeConversionError { .. } => {
                ApiError::ValidationError(err.to_string())
            }
            ImportError::Other(inner) => ApiError::Other(inner),
            other => ApiError::ImportError(other.to_string()),
        }
    }
}

// ==========================================
// 从 ConfigError 转换
// ==========================================
impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::UnknownKey(key) => ApiError::InvalidInput(format!("未知配置键: {}", key)),
            other => ApiError::ConfigError(other.to_string()),
        }
    }
}

impl From<csv::Error> for ApiError {
    fn from(err: csv::Error) -> Self {
        ApiError::ExportError(err.to_string())
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::ExportError(err.to_string())
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_config_error_maps_to_config() {
        let err: ApiError = EngineError::EmptyStorageTypes.into();
        assert!(matches!(err, ApiError::ConfigError(_)));
    }

    #[test]
    fn test_engine_data_error_maps_to_validation() {
        let err: ApiError = EngineError::DuplicateSku("A".to_string()).into();
        match err {
            ApiError::ValidationError(msg) => assert!(msg.contains("A")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_missing_column_maps_to_validation() {
        let err: ApiError = ImportError::RequiredColumnMissing {
            table: "catalog".to_string(),
            column: "KG/UMB".to_string(),
        }
        .into();
        assert!(matches!(err, ApiError::ValidationError(_)));

        let err: ApiError = ImportError::FileNotFound("x.csv".to_string()).into();
        assert!(matches!(err, ApiError::ImportError(_)));
    }

    #[test]
    fn test_unknown_config_key_is_invalid_input() {
        let err: ApiError = ConfigError::UnknownKey("micro.foo".to_string()).into();
        assert!(matches!(err, ApiError::InvalidInput(_)));
    }
}
