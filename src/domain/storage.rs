// ==========================================
// 仓储货位规划引擎 - 存储类型领域模型
// ==========================================
// 红线: priority 定义全序（相同 priority 按输入顺序稳定排序）
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// StorageType - 存储类型（货架/VLM/隔离笼等）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageType {
    pub id: String,      // 存储类型 ID
    pub name: String,    // 显示名称
    pub priority: i32,   // 优先级（越小越先尝试）
    pub max_volume: f64, // 体积上限（m³）
    pub max_weight: f64, // 重量上限（kg）
}

impl StorageType {
    pub fn new(id: &str, name: &str, priority: i32, max_volume: f64, max_weight: f64) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            priority,
            max_volume,
            max_weight,
        }
    }

    /// 默认存储类型（VLM / 隔离笼 / 拣选货架 / 托盘货架）
    pub fn defaults() -> Vec<StorageType> {
        vec![
            StorageType::new("vlm", "VLM", 1, 12.0, 500.0),
            StorageType::new("jaula", "Jaula", 2, 8.0, 1000.0),
            StorageType::new("rack-picking", "Rack Picking", 3, 25.0, 2000.0),
            StorageType::new("rack-pallet", "Rack Pallet", 4, 50.0, 3000.0),
        ]
    }
}

// ==========================================
// StorageAllocation - 单个存储类型的分配统计
// ==========================================
// 用途: MacroAllocator 运行期累加,运行结束后冻结为结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageAllocation {
    // ===== 标识 =====
    pub storage_id: String,
    pub name: String,
    pub priority: i32,

    // ===== 容量参数 =====
    pub volume_target: f64, // max_volume × utilization_target
    pub max_weight: f64,

    // ===== 实际使用 =====
    pub skus_count: usize,
    pub volume_used: f64, // 含强制隔离与溢出
    pub weight_used: f64,
    pub fill_percentage: f64, // volume_used / volume_target × 100（不封顶）

    // ===== 例外分量 =====
    pub forced_count: usize,
    pub forced_volume: f64,
    pub overflow_count: usize,
    pub overflow_volume: f64,
}

impl StorageAllocation {
    /// 以存储类型和利用率目标初始化空分配
    pub fn new(storage: &StorageType, utilization_target: f64) -> Self {
        Self {
            storage_id: storage.id.clone(),
            name: storage.name.clone(),
            priority: storage.priority,
            volume_target: storage.max_volume * utilization_target,
            max_weight: storage.max_weight,
            skus_count: 0,
            volume_used: 0.0,
            weight_used: 0.0,
            fill_percentage: 0.0,
            forced_count: 0,
            forced_volume: 0.0,
            overflow_count: 0,
            overflow_volume: 0.0,
        }
    }

    /// 计入一个 SKU 的周期体积/重量
    pub fn add(&mut self, cycle_volume: f64, cycle_weight: f64) {
        self.skus_count += 1;
        self.volume_used += cycle_volume;
        self.weight_used += cycle_weight;
    }

    /// 刷新填充率
    pub fn refresh_fill(&mut self) {
        self.fill_percentage = self.raw_fill_percentage();
    }

    fn raw_fill_percentage(&self) -> f64 {
        if self.volume_target <= 0.0 {
            return 0.0;
        }
        self.volume_used / self.volume_target * 100.0
    }
}

// ==========================================
// Trait: CapacityConstraint
// ==========================================
// 用途: MacroAllocator 约束检查接口
pub trait CapacityConstraint {
    /// 检查加入 volume 后是否仍在目标容量内
    fn can_fit(&self, volume: f64) -> bool;

    /// 检查是否已超过目标容量
    fn is_overflow(&self) -> bool;
}

impl CapacityConstraint for StorageAllocation {
    fn can_fit(&self, volume: f64) -> bool {
        self.volume_used + volume <= self.volume_target
    }

    fn is_overflow(&self) -> bool {
        self.volume_used > self.volume_target
    }
}
