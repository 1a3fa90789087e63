// ==========================================
// 仓储货位规划引擎 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写、快照
// 存储: JSON 文件（显式路径 > SLOTTING_CONFIG > 用户配置目录 > 默认值）
// ==========================================

use crate::config::slotting_config::SlottingConfig;
use crate::engine::error::EngineError;
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// 配置文件路径环境变量
pub const CONFIG_ENV_VAR: &str = "SLOTTING_CONFIG";

const CONFIG_DIR_NAME: &str = "warehouse-slotting";
const CONFIG_FILE_NAME: &str = "config.json";

// ==========================================
// ConfigError - 配置错误
// ==========================================
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读写失败 ({path}): {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("配置 JSON 解析失败: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("配置校验失败: {0}")]
    Invalid(#[from] EngineError),

    #[error("未知配置键: {0}")]
    UnknownKey(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: SlottingConfig,
    source: Option<PathBuf>, // None = 内置默认值
}

impl ConfigManager {
    /// 使用内置默认配置
    pub fn with_defaults() -> Self {
        Self {
            config: SlottingConfig::default(),
            source: None,
        }
    }

    /// 按优先级解析配置来源并加载
    ///
    /// # 优先级
    /// 1. explicit_path（命令行参数）
    /// 2. 环境变量 SLOTTING_CONFIG
    /// 3. {config_dir}/warehouse-slotting/config.json（存在时）
    /// 4. 内置默认值
    pub fn load(explicit_path: Option<&Path>) -> ConfigResult<Self> {
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
            let env_path = env_path.trim();
            if !env_path.is_empty() {
                debug!(path = %env_path, "使用环境变量指定的配置文件");
                return Self::from_file(Path::new(env_path));
            }
        }

        if let Some(default_path) = Self::default_config_path() {
            if default_path.is_file() {
                return Self::from_file(&default_path);
            }
        }

        info!("未找到配置文件，使用内置默认配置");
        Ok(Self::with_defaults())
    }

    /// 从 JSON 文件加载（缺省字段取默认值）
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: SlottingConfig = serde_json::from_str(&raw)?;
        config.validate()?;

        info!(path = %path.display(), "配置文件加载完成");
        Ok(Self {
            config,
            source: Some(path.to_path_buf()),
        })
    }

    /// 用户配置目录下的默认配置路径
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    pub fn config(&self) -> &SlottingConfig {
        &self.config
    }

    pub fn into_config(self) -> SlottingConfig {
        self.config
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// 保存为格式化 JSON（自动创建父目录）
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let io_err = |e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(io_err)?;
            }
        }
        let json = serde_json::to_string_pretty(&self.config)?;
        std::fs::write(path, json).map_err(io_err)?;
        Ok(())
    }

    /// 获取配置快照（JSON 字符串）
    ///
    /// # 用途
    /// - 随导出结果一同保存,保证结果可复现
    pub fn get_config_snapshot(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string(&self.config)?)
    }

    /// 从配置快照恢复配置（整体替换,校验失败时保持原配置）
    pub fn restore_config_from_snapshot(&mut self, snapshot_json: &str) -> ConfigResult<()> {
        let config: SlottingConfig = serde_json::from_str(snapshot_json)?;
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// 覆写单个配置项
    ///
    /// # 参数
    /// - key: 点分路径（见 config_keys,如 "micro.vlm_count"）
    /// - value: JSON 字面量（"6"、"true"、"\"vlm\""）；无法解析时按字符串处理
    ///
    /// # 说明
    /// 覆写后整体校验,失败时保持原配置
    pub fn set_value(&mut self, key: &str, value: &str) -> ConfigResult<()> {
        let mut tree = serde_json::to_value(&self.config)?;

        let slot = key
            .split('.')
            .try_fold(&mut tree, |node, part| node.get_mut(part))
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        if slot.is_object() || slot.is_array() {
            return Err(ConfigError::UnknownKey(key.to_string()));
        }

        *slot = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));

        let config: SlottingConfig = serde_json::from_value(tree)?;
        config.validate()?;
        debug!(key, value, "配置项已覆写");
        self.config = config;
        Ok(())
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::with_defaults()
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 审计
    pub const AUDIT_WEIGHT_MAX: &str = "audit.weight_max";
    pub const AUDIT_VOLUME_MAX: &str = "audit.volume_max";
    pub const AUDIT_LINES_THRESHOLD: &str = "audit.lines_threshold";
    pub const AUDIT_FREQUENCY_THRESHOLD: &str = "audit.frequency_threshold";
    pub const AUDIT_EXCLUDE_OUTLIERS: &str = "audit.exclude_outliers";

    // 宏观分区
    pub const MACRO_COVERAGE_DAYS: &str = "macro.coverage_days";
    pub const MACRO_UTILIZATION_TARGET: &str = "macro.utilization_target";
    pub const MACRO_DENSE_STORAGE_ID: &str = "macro.dense_storage_id";
    pub const MACRO_ISOLATION_STORAGE_ID: &str = "macro.isolation_storage_id";

    // 微观装盘
    pub const MICRO_VLM_COUNT: &str = "micro.vlm_count";
    pub const MICRO_TRAYS_PER_VLM: &str = "micro.trays_per_vlm";
    pub const MICRO_REPLICATION_FACTOR: &str = "micro.replication_factor";
    pub const MICRO_CLUSTERING_METHOD: &str = "micro.clustering_method";
    pub const MICRO_INCLUDE_ZERO_ROTATION: &str = "micro.include_zero_rotation";

    // 导入映射
    pub const MAPPING_SHEET_CATALOG: &str = "mapping.sheet_catalog";
    pub const MAPPING_SHEET_ORDERS: &str = "mapping.sheet_orders";
    pub const MAPPING_DEMAND_HORIZON_DAYS: &str = "mapping.demand_horizon_days";
}
