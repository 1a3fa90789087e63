// ==========================================
// 仓储货位规划引擎 - 配置层
// ==========================================
// 职责: 配置对象定义、JSON 加载与覆写
// 存储: JSON 文件
// ==========================================

pub mod config_manager;
pub mod slotting_config;

// 重导出核心配置
pub use config_manager::{config_keys, ConfigError, ConfigManager, ConfigResult, CONFIG_ENV_VAR};
pub use slotting_config::{AuditConfig, MacroConfig, MappingConfig, MicroConfig, SlottingConfig};
