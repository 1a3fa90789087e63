// ==========================================
// 仓储货位规划引擎 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、结果结构
// 红线: 不含文件读取逻辑,不含引擎逻辑
// ==========================================

pub mod audit;
pub mod sku;
pub mod slotting;
pub mod storage;
pub mod types;

// 重导出核心类型
pub use audit::{AuditResult, OutlierOrderItem, OutlierSkuItem, OutlierUbiquitousItem};
pub use sku::{DqReport, DqViolation, ImportBatch, OrderLine, RawSkuRecord, Sku};
pub use slotting::{MacroResult, MicroResult, StorageShare, Tray, TraySku, UnplacedSku};
pub use storage::{CapacityConstraint, StorageAllocation, StorageType};
pub use types::{AbcClass, AssignReason, AuditCategory, ClusteringMethod, DqLevel};
