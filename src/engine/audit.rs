// ==========================================
// 仓储货位规划引擎 - 异常审计引擎
// ==========================================
// 职责: 超重 / 超体积 / B2B 大单 / 高频 SKU 四类异常检测
// 输入: SKU 目录 + 订单行 + 审计阈值
// 输出: AuditResult（只读,不修改目录）
// ==========================================

use crate::config::AuditConfig;
use crate::domain::audit::{AuditResult, OutlierOrderItem, OutlierSkuItem, OutlierUbiquitousItem};
use crate::domain::sku::{OrderLine, Sku};
use crate::engine::error::EngineResult;
use crate::engine::input_validator::{validate_order_lines, validate_skus};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, instrument};

// ==========================================
// OrderIndex - 订单聚合视图
// ==========================================
// 订单按首次出现顺序保存,保证输出稳定
#[derive(Debug, Default)]
pub struct OrderIndex<'a> {
    pub order_ids: Vec<&'a str>,
    pub skus_by_order: HashMap<&'a str, HashSet<&'a str>>,
    pub units_by_order: HashMap<&'a str, f64>,
}

impl<'a> OrderIndex<'a> {
    pub fn build(lines: &'a [OrderLine]) -> Self {
        let mut index = OrderIndex::default();
        for line in lines {
            let order = line.order_id.as_str();
            if !index.skus_by_order.contains_key(order) {
                index.order_ids.push(order);
            }
            index
                .skus_by_order
                .entry(order)
                .or_default()
                .insert(line.sku_id.as_str());
            *index.units_by_order.entry(order).or_insert(0.0) += line.quantity;
        }
        index
    }

    pub fn order_count(&self) -> usize {
        self.order_ids.len()
    }

    /// SKU → 出现订单数
    pub fn sku_order_counts(&self) -> HashMap<&'a str, usize> {
        let mut counts = HashMap::new();
        for skus in self.skus_by_order.values() {
            for sku in skus {
                *counts.entry(*sku).or_insert(0) += 1;
            }
        }
        counts
    }
}

// ==========================================
// AuditEngine - 异常审计引擎
// ==========================================
pub struct AuditEngine {
    // 无状态引擎，不需要注入依赖
}

impl AuditEngine {
    pub fn new() -> Self {
        Self {}
    }

    /// 执行审计
    ///
    /// 规则：
    /// 1) heavy: weight ∉ [weight_min, weight_max]
    /// 2) bulky: volume ∉ [volume_min, volume_max]
    /// 3) massive_orders: 订单去重行数 > lines_threshold
    /// 4) ubiquitous: 出现订单数 / 总订单数 > frequency_threshold
    ///
    /// 关闭的类别输出为空列表。
    #[instrument(skip_all, fields(skus = skus.len(), order_lines = order_lines.len()))]
    pub fn audit(
        &self,
        skus: &[Sku],
        order_lines: &[OrderLine],
        config: &AuditConfig,
    ) -> EngineResult<AuditResult> {
        config.validate()?;
        validate_skus(skus)?;
        validate_order_lines(order_lines)?;

        let index = OrderIndex::build(order_lines);

        let heavy_skus = if config.heavy_enabled {
            self.out_of_range(skus, config.weight_min, config.weight_max, |s| s.weight)
        } else {
            Vec::new()
        };

        let bulky_skus = if config.bulky_enabled {
            self.out_of_range(skus, config.volume_min, config.volume_max, |s| s.volume)
        } else {
            Vec::new()
        };

        let massive_orders = if config.massive_enabled {
            self.massive_orders(&index, config.lines_threshold)
        } else {
            Vec::new()
        };

        let ubiquitous_skus = if config.ubiquitous_enabled {
            self.ubiquitous_skus(skus, &index, config.frequency_threshold)
        } else {
            Vec::new()
        };

        info!(
            heavy = heavy_skus.len(),
            bulky = bulky_skus.len(),
            massive_orders = massive_orders.len(),
            ubiquitous = ubiquitous_skus.len(),
            total_orders = index.order_count(),
            "审计完成"
        );

        Ok(AuditResult {
            heavy_skus,
            bulky_skus,
            massive_orders,
            ubiquitous_skus,
            total_skus: skus.len(),
            total_orders: index.order_count(),
        })
    }

    // ==========================================
    // 辅助方法
    // ==========================================

    fn out_of_range<F>(&self, skus: &[Sku], min: f64, max: f64, value_of: F) -> Vec<OutlierSkuItem>
    where
        F: Fn(&Sku) -> f64,
    {
        skus.iter()
            .filter_map(|sku| {
                let value = value_of(sku);
                if value < min || value > max {
                    Some(OutlierSkuItem {
                        sku_id: sku.id.clone(),
                        description: sku.description.clone(),
                        value,
                    })
                } else {
                    None
                }
            })
            .collect()
    }

    /// 大单按行数降序（同行数保持首次出现顺序）
    fn massive_orders(&self, index: &OrderIndex<'_>, lines_threshold: usize) -> Vec<OutlierOrderItem> {
        let mut orders: Vec<OutlierOrderItem> = index
            .order_ids
            .iter()
            .filter_map(|order_id| {
                let lines = index.skus_by_order.get(order_id).map_or(0, |s| s.len());
                if lines > lines_threshold {
                    Some(OutlierOrderItem {
                        order_id: order_id.to_string(),
                        value: lines,
                        units: index.units_by_order.get(order_id).copied().unwrap_or(0.0),
                    })
                } else {
                    None
                }
            })
            .collect();
        orders.sort_by(|a, b| b.value.cmp(&a.value));
        orders
    }

    /// 高频 SKU 按频率降序（同频率保持目录顺序）
    fn ubiquitous_skus(
        &self,
        skus: &[Sku],
        index: &OrderIndex<'_>,
        frequency_threshold: f64,
    ) -> Vec<OutlierUbiquitousItem> {
        let total_orders = index.order_count();
        if total_orders == 0 {
            debug!("无订单数据，跳过高频 SKU 检测");
            return Vec::new();
        }

        let counts = index.sku_order_counts();
        let mut items: Vec<OutlierUbiquitousItem> = skus
            .iter()
            .filter_map(|sku| {
                let count = counts.get(sku.id.as_str()).copied().unwrap_or(0);
                let frequency = count as f64 / total_orders as f64;
                if frequency > frequency_threshold {
                    Some(OutlierUbiquitousItem {
                        sku_id: sku.id.clone(),
                        description: sku.description.clone(),
                        value: frequency,
                        count,
                    })
                } else {
                    None
                }
            })
            .collect();
        items.sort_by(|a, b| b.value.total_cmp(&a.value));
        items
    }
}

impl Default for AuditEngine {
    fn default() -> Self {
        Self::new()
    }
}
