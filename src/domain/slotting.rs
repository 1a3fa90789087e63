// ==========================================
// 仓储货位规划引擎 - 宏观/微观结果模型
// ==========================================
// 生命周期: 每次运行产出一份新结果,重跑整体替换（不做增量修改）
// ==========================================

use crate::domain::sku::Sku;
use crate::domain::storage::{CapacityConstraint, StorageAllocation};
use serde::{Deserialize, Serialize};

// ==========================================
// MacroResult - 宏观分区结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroResult {
    pub allocations: Vec<StorageAllocation>, // 按 priority 排序
    pub storage_distribution: Vec<StorageShare>,
    pub unassigned_count: usize,   // 溢出 SKU 数
    pub excluded_ids: Vec<String>, // 审计排除（未参与分配）
    pub skus: Vec<Sku>,            // 标注 assigned_storage / cycle_* 的 SKU
}

impl MacroResult {
    /// 按存储类型 ID 查找分配统计
    pub fn allocation(&self, storage_id: &str) -> Option<&StorageAllocation> {
        self.allocations.iter().find(|a| a.storage_id == storage_id)
    }

    /// 分配到指定存储类型的 SKU
    pub fn skus_in<'a>(&'a self, storage_id: &'a str) -> impl Iterator<Item = &'a Sku> + 'a {
        self.skus
            .iter()
            .filter(move |s| s.assigned_storage.as_deref() == Some(storage_id))
    }

    /// 是否存在需要关注的告警（溢出 SKU 或某存储类型超出目标容量）
    pub fn has_warnings(&self) -> bool {
        self.unassigned_count > 0 || self.allocations.iter().any(|a| a.is_overflow())
    }
}

/// 存储类型 SKU 数量分布
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageShare {
    pub storage_id: String,
    pub name: String,
    pub count: usize,
    pub percentage: f64,
}

// ==========================================
// Tray - 托盘
// ==========================================
// 红线: 关闭后不可变; volume_fill / weight_fill 为占上限百分比
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tray {
    pub id: String,       // 物理托盘 ID（每个副本唯一）
    pub vlm_id: usize,    // 所属 VLM 序号
    pub group_id: String, // 来源亲和组
    pub skus: Vec<TraySku>,
    pub volume_fill: f64,
    pub weight_fill: f64,
}

/// 托盘内 SKU 行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraySku {
    pub sku_id: String,
    pub description: String,
    pub units: u64,
}

/// 单件即超托盘上限而无法放置的 SKU
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnplacedSku {
    pub sku_id: String,
    pub reason: String,
}

// ==========================================
// MicroResult - 微观布局结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MicroResult {
    pub vlm_count: usize,
    pub trays_per_vlm: Vec<Vec<Tray>>, // 每台 VLM 一组托盘

    // ===== 效率指标 =====
    pub height_efficiency: f64,
    pub area_efficiency: f64,
    pub avg_trays_per_order: f64,
    pub replication_coverage: f64,

    // ===== 告警 =====
    pub group_count: usize,
    pub unplaced_skus: Vec<UnplacedSku>,
    pub overloaded_vlms: Vec<usize>, // 托盘数超过 trays_per_vlm 的 VLM
}

impl MicroResult {
    /// 空方案（无合格 SKU）
    pub fn empty(vlm_count: usize) -> Self {
        Self {
            vlm_count,
            trays_per_vlm: vec![Vec::new(); vlm_count],
            height_efficiency: 0.0,
            area_efficiency: 0.0,
            avg_trays_per_order: 0.0,
            replication_coverage: 0.0,
            group_count: 0,
            unplaced_skus: Vec::new(),
            overloaded_vlms: Vec::new(),
        }
    }

    pub fn total_trays(&self) -> usize {
        self.trays_per_vlm.iter().map(|v| v.len()).sum()
    }

    pub fn all_trays(&self) -> impl Iterator<Item = &Tray> {
        self.trays_per_vlm.iter().flatten()
    }
}
