// ==========================================
// 仓储货位规划引擎 - API 层
// ==========================================
// 职责: 提供业务 API 接口,供命令行及外部调用方使用
// ==========================================

pub mod error;
pub mod export;
pub mod slotting_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use export::{allocation_table, assignment_table, audit_table, tray_table, write_run, Table};
pub use slotting_api::SlottingApi;
