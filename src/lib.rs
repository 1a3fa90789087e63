// ==========================================
// 仓储货位规划引擎 - 核心库
// ==========================================
// 流程: 异常审计 → ABC 分类 → 宏观分区 → VLM 微观装盘
// 系统定位: 决策支持（输出可解释的分配原因,由人工最终确认）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 引擎层 - 业务规则
pub mod engine;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 日志系统
pub mod logging;

// 性能埋点
pub mod perf;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{AbcClass, AssignReason, AuditCategory, ClusteringMethod, DqLevel};

// 领域实体
pub use domain::{
    AuditResult, MacroResult, MicroResult, OrderLine, Sku, StorageAllocation, StorageType, Tray,
};

// 引擎
pub use engine::{
    AbcClassifier, AffinityGrouper, AuditEngine, EngineError, EngineResult, MacroAllocator,
    MicroPacker, SlottingOrchestrator, SlottingRun,
};

// 配置
pub use config::{ConfigManager, SlottingConfig};

// 导入
pub use importer::{CatalogImporter, ImportedDataset};

// API
pub use api::{ApiError, ApiResult, SlottingApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "仓储货位规划引擎";
