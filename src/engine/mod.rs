// ==========================================
// 仓储货位规划引擎 - 引擎层
// ==========================================
// 职责: 纯同步计算阶段,不做文件 I/O
// 红线: 所有分配决策必须输出原因（AssignReason / UnplacedSku.reason）
// 红线: 迭代顺序固定,禁止并行化贪心循环
// ==========================================

pub mod abc;
pub mod affinity;
pub mod audit;
pub mod error;
pub mod input_validator;
pub mod macro_allocator;
pub mod micro_packer;
pub mod orchestrator;

// 重导出核心引擎
pub use abc::AbcClassifier;
pub use affinity::{AffinityGroup, AffinityGrouper};
pub use audit::{AuditEngine, OrderIndex};
pub use error::{EngineError, EngineResult};
pub use macro_allocator::MacroAllocator;
pub use micro_packer::MicroPacker;
pub use orchestrator::{Exclusion, SlottingOrchestrator, SlottingRun};

/// 四舍五入到指定小数位（报表百分比）
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
