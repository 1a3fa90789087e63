// ==========================================
// 仓储货位规划引擎 - 宏观分区引擎
// ==========================================
// 红线: 敏感品强制隔离优先于容量约束
// 红线: 首次适配（first-fit）,处理顺序固定,不做全局最优
// ==========================================
// 职责: 周期体积驱动的存储类型分配
// 输入: SKU 列表 + 存储类型 + 覆盖天数 + 排除集合
// 输出: 标注 assigned_storage / cycle_* 的 SKU + MacroResult
// ==========================================

use crate::config::MacroConfig;
use crate::domain::sku::Sku;
use crate::domain::slotting::{MacroResult, StorageShare};
use crate::domain::storage::{CapacityConstraint, StorageAllocation, StorageType};
use crate::domain::types::AssignReason;
use crate::engine::abc::AbcClassifier;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::input_validator::validate_skus;
use crate::engine::round_to;
use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};

// ==========================================
// MacroAllocator - 宏观分区引擎
// ==========================================
pub struct MacroAllocator {
    utilization_target: f64,
    dense_storage_id: String,
    isolation_storage_id: String,
}

impl MacroAllocator {
    /// 构造函数
    ///
    /// # 参数
    /// - `utilization_target`: 容量利用率上限（如 0.8）
    /// - `dense_storage_id`: VLM 存储类型 ID（仅 is_vlm_eligible 的 SKU 可进入）
    /// - `isolation_storage_id`: 敏感品隔离存储类型 ID
    pub fn new(utilization_target: f64, dense_storage_id: &str, isolation_storage_id: &str) -> Self {
        Self {
            utilization_target,
            dense_storage_id: dense_storage_id.to_string(),
            isolation_storage_id: isolation_storage_id.to_string(),
        }
    }

    pub fn from_config(config: &MacroConfig) -> Self {
        Self::new(
            config.utilization_target,
            &config.dense_storage_id,
            &config.isolation_storage_id,
        )
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 执行宏观分区
    ///
    /// 规则：
    /// 1) cycle_volume = units_per_day_avg × coverage_days × volume（cycle_weight 同理）
    /// 2) exclude_ids 中的非敏感 SKU 不参与分配（assigned_storage 保持为空）
    /// 3) 按 ABC 排名顺序处理（销量降序,同销量保持输入顺序）
    /// 4) 敏感品 → 隔离存储,忽略容量
    /// 5) 按 priority 遍历存储类型,VLM 跳过不合格 SKU,取首个
    ///    used + cycle_volume <= max_volume × utilization_target 的存储类型
    /// 6) 无可用存储 → 溢出到最低优先级存储,计入 unassigned_count
    ///
    /// # 返回
    /// (按输入顺序标注后的 SKU, MacroResult)
    #[instrument(skip(self, skus, storage_types, exclude_ids), fields(
        skus = skus.len(),
        storage_types = storage_types.len(),
        excluded = exclude_ids.map_or(0, |e| e.len())
    ))]
    pub fn allocate(
        &self,
        skus: &[Sku],
        storage_types: &[StorageType],
        coverage_days: f64,
        exclude_ids: Option<&HashSet<String>>,
    ) -> EngineResult<(Vec<Sku>, MacroResult)> {
        // 0. 配置与数据校验（任何计算之前）
        self.validate(skus, storage_types, coverage_days)?;

        // 1. 存储类型按 priority 稳定排序
        let mut sorted_storages: Vec<&StorageType> = storage_types.iter().collect();
        sorted_storages.sort_by_key(|st| st.priority);

        let mut allocations: Vec<StorageAllocation> = sorted_storages
            .iter()
            .map(|st| StorageAllocation::new(st, self.utilization_target))
            .collect();

        // 2. 未分类时先执行 ABC 分类
        let classifier = AbcClassifier::new();
        let mut working = if skus.iter().all(|s| s.abc_class.is_some()) {
            skus.to_vec()
        } else {
            classifier.classify(skus)
        };

        // 3. 周期体积/重量
        for sku in working.iter_mut() {
            let cycle_units = sku.units_per_day_avg * coverage_days;
            sku.cycle_volume = Some(cycle_units * sku.volume);
            sku.cycle_weight = Some(cycle_units * sku.weight);
            sku.assigned_storage = None;
            sku.assign_reason = None;
        }

        // 4. 按排名顺序逐个分配
        let mut excluded_ids = Vec::new();
        let mut unassigned_count = 0;
        for idx in classifier.rank(&working) {
            let sku = &working[idx];
            // 敏感品不受审计排除影响,始终进入隔离存储
            if !sku.is_sensitive && exclude_ids.is_some_and(|ids| ids.contains(&sku.id)) {
                debug!(sku_id = %sku.id, "审计排除，不参与分配");
                excluded_ids.push(sku.id.clone());
                continue;
            }

            let cycle_volume = sku.cycle_volume.unwrap_or(0.0);
            let cycle_weight = sku.cycle_weight.unwrap_or(0.0);
            let (slot, reason) = self.choose_storage(sku, &sorted_storages, &allocations);

            let allocation = &mut allocations[slot];
            allocation.add(cycle_volume, cycle_weight);
            match reason {
                AssignReason::ForcedIsolation => {
                    allocation.forced_count += 1;
                    allocation.forced_volume += cycle_volume;
                }
                AssignReason::Overflow => {
                    allocation.overflow_count += 1;
                    allocation.overflow_volume += cycle_volume;
                    unassigned_count += 1;
                    warn!(
                        sku_id = %sku.id,
                        cycle_volume,
                        storage = %allocation.storage_id,
                        "无可用容量，溢出到最后一级存储"
                    );
                }
                AssignReason::Fitted => {}
            }
            debug!(sku_id = %sku.id, storage = %allocation.storage_id, reason = %reason, "分配完成");

            let storage_id = allocation.storage_id.clone();
            let sku = &mut working[idx];
            sku.assigned_storage = Some(storage_id);
            sku.assign_reason = Some(reason);
        }

        // 5. 汇总
        for allocation in allocations.iter_mut() {
            allocation.refresh_fill();
        }
        let storage_distribution = Self::distribution(&allocations);

        info!(
            assigned = working.len() - excluded_ids.len(),
            unassigned_count,
            excluded = excluded_ids.len(),
            "宏观分区完成"
        );

        let result = MacroResult {
            allocations,
            storage_distribution,
            unassigned_count,
            excluded_ids,
            skus: working.clone(),
        };
        Ok((working, result))
    }

    /// 以 MacroConfig 执行分配
    pub fn allocate_with_config(
        &self,
        skus: &[Sku],
        config: &MacroConfig,
        exclude_ids: Option<&HashSet<String>>,
    ) -> EngineResult<(Vec<Sku>, MacroResult)> {
        self.allocate(skus, &config.storage_types, config.coverage_days, exclude_ids)
    }

    // ==========================================
    // 辅助方法
    // ==========================================

    fn validate(&self, skus: &[Sku], storage_types: &[StorageType], coverage_days: f64) -> EngineResult<()> {
        if storage_types.is_empty() {
            return Err(EngineError::EmptyStorageTypes);
        }
        if !(coverage_days.is_finite() && coverage_days > 0.0) {
            return Err(EngineError::invalid_config(
                "coverage_days",
                format!("必须 > 0，实际 {}", coverage_days),
            ));
        }
        if !(self.utilization_target > 0.0 && self.utilization_target <= 1.0) {
            return Err(EngineError::invalid_config(
                "utilization_target",
                format!("必须位于 (0, 1]，实际 {}", self.utilization_target),
            ));
        }
        for st in storage_types {
            if !(st.max_volume.is_finite() && st.max_volume > 0.0) {
                return Err(EngineError::invalid_config(
                    "max_volume",
                    format!("{} 的体积上限必须 > 0，实际 {}", st.id, st.max_volume),
                ));
            }
        }
        validate_skus(skus)?;

        let needs_isolation = skus.iter().any(|s| s.is_sensitive);
        if needs_isolation && !storage_types.iter().any(|st| st.id == self.isolation_storage_id) {
            return Err(EngineError::UnknownStorage {
                role: "isolation".to_string(),
                storage_id: self.isolation_storage_id.clone(),
            });
        }
        Ok(())
    }

    /// 选择存储类型
    ///
    /// # 返回
    /// (allocations 下标, 分配原因)
    fn choose_storage(
        &self,
        sku: &Sku,
        sorted_storages: &[&StorageType],
        allocations: &[StorageAllocation],
    ) -> (usize, AssignReason) {
        // 硬规则：敏感品强制隔离（validate 已保证隔离存储存在）
        if sku.is_sensitive {
            if let Some(slot) = sorted_storages
                .iter()
                .position(|st| st.id == self.isolation_storage_id)
            {
                return (slot, AssignReason::ForcedIsolation);
            }
        }

        let cycle_volume = sku.cycle_volume.unwrap_or(0.0);
        for (slot, st) in sorted_storages.iter().enumerate() {
            if !self.is_admissible(sku, st) {
                continue;
            }
            if allocations[slot].can_fit(cycle_volume) {
                return (slot, AssignReason::Fitted);
            }
        }

        // 溢出：最低优先级且准入的存储类型；都不准入时取最后一个
        let last_resort = sorted_storages
            .iter()
            .rposition(|st| self.is_admissible(sku, st))
            .unwrap_or(sorted_storages.len() - 1);
        (last_resort, AssignReason::Overflow)
    }

    fn is_admissible(&self, sku: &Sku, storage: &StorageType) -> bool {
        storage.id != self.dense_storage_id || sku.is_vlm_eligible
    }

    fn distribution(allocations: &[StorageAllocation]) -> Vec<StorageShare> {
        let total: usize = allocations.iter().map(|a| a.skus_count).sum();
        allocations
            .iter()
            .map(|a| StorageShare {
                storage_id: a.storage_id.clone(),
                name: a.name.clone(),
                count: a.skus_count,
                percentage: if total == 0 {
                    0.0
                } else {
                    round_to(a.skus_count as f64 / total as f64 * 100.0, 1)
                },
            })
            .collect()
    }
}

impl Default for MacroAllocator {
    fn default() -> Self {
        Self::from_config(&MacroConfig::default())
    }
}
