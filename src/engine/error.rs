// ==========================================
// 仓储货位规划引擎 - 引擎错误类型
// ==========================================
// 工具: thiserror 派生宏
// 红线: 校验失败在任何部分计算之前返回,不静默补默认值
// ==========================================

use thiserror::Error;

/// 引擎错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    // ===== 配置错误 =====
    #[error("存储类型列表为空，无法执行宏观分区")]
    EmptyStorageTypes,

    #[error("配置无效 ({field}): {message}")]
    InvalidConfig { field: String, message: String },

    #[error("存储类型不存在 ({role}): {storage_id}")]
    UnknownStorage { role: String, storage_id: String },

    // ===== 输入数据错误 =====
    #[error("SKU 数据无效 (sku={sku_id}, 字段 {field}): {message}")]
    InvalidSku {
        sku_id: String,
        field: String,
        message: String,
    },

    #[error("SKU 重复: {0}")]
    DuplicateSku(String),

    #[error("订单行无效 (order={order_id}, 字段 {field}): {message}")]
    InvalidOrderLine {
        order_id: String,
        field: String,
        message: String,
    },
}

impl EngineError {
    pub fn invalid_config(field: &str, message: impl Into<String>) -> Self {
        EngineError::InvalidConfig {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn invalid_sku(sku_id: &str, field: &str, message: impl Into<String>) -> Self {
        EngineError::InvalidSku {
            sku_id: sku_id.to_string(),
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// 是否为配置类错误（相对输入数据错误）
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            EngineError::EmptyStorageTypes
                | EngineError::InvalidConfig { .. }
                | EngineError::UnknownStorage { .. }
        )
    }
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
