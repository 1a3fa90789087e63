// ==========================================
// 仓储货位规划引擎 - 审计结果模型
// ==========================================
// 用途: AuditEngine 输出,只读,与分配阶段无关
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// 异常 SKU（超重/超体积）: value 为触发值（重量或体积）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierSkuItem {
    pub sku_id: String,
    pub description: String,
    pub value: f64,
}

/// 异常订单（B2B 大单）: value 为去重行数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierOrderItem {
    pub order_id: String,
    pub value: usize,
    pub units: f64, // 订单总件数
}

/// 高频 SKU: value 为出现频率（0~1）, count 为出现订单数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierUbiquitousItem {
    pub sku_id: String,
    pub description: String,
    pub value: f64,
    pub count: usize,
}

// ==========================================
// AuditResult - 审计结果
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditResult {
    pub heavy_skus: Vec<OutlierSkuItem>,
    pub bulky_skus: Vec<OutlierSkuItem>,
    pub massive_orders: Vec<OutlierOrderItem>,
    pub ubiquitous_skus: Vec<OutlierUbiquitousItem>,

    // ===== 统计口径 =====
    pub total_skus: usize,
    pub total_orders: usize,
}

impl AuditResult {
    /// 被标记的 SKU ID（超重 ∪ 超体积 ∪ 高频）
    pub fn flagged_sku_ids(&self) -> HashSet<String> {
        self.heavy_skus
            .iter()
            .chain(self.bulky_skus.iter())
            .map(|s| s.sku_id.clone())
            .chain(self.ubiquitous_skus.iter().map(|s| s.sku_id.clone()))
            .collect()
    }

    /// 被标记的订单 ID
    pub fn flagged_order_ids(&self) -> HashSet<String> {
        self.massive_orders.iter().map(|o| o.order_id.clone()).collect()
    }

    pub fn is_clean(&self) -> bool {
        self.heavy_skus.is_empty()
            && self.bulky_skus.is_empty()
            && self.massive_orders.is_empty()
            && self.ubiquitous_skus.is_empty()
    }
}
