// ==========================================
// 仓储货位规划引擎 - 引擎编排器
// ==========================================
// 用途: 协调 审计 → 排除 → ABC → 宏观分区 → 微观装盘 的执行顺序
// 红线: 各阶段消费上一阶段的副本,不原地修改
// ==========================================

use crate::config::SlottingConfig;
use crate::domain::audit::AuditResult;
use crate::domain::sku::{OrderLine, Sku};
use crate::domain::slotting::{MacroResult, MicroResult};
use crate::engine::error::EngineResult;
use crate::engine::{AbcClassifier, AuditEngine, MacroAllocator, MicroPacker};
use crate::perf::StageTimer;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info, instrument};

// ==========================================
// SlottingRun - 完整流程结果
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct SlottingRun {
    // Audit 输出
    pub audit: AuditResult,

    // ABC 输出（输入顺序）
    pub classified: Vec<Sku>,

    // Macro 输出
    pub macro_result: MacroResult,

    // Micro 输出
    pub micro_result: MicroResult,
}

// ==========================================
// SlottingOrchestrator - 引擎编排器
// ==========================================
pub struct SlottingOrchestrator {
    auditor: AuditEngine,
    classifier: AbcClassifier,
    packer: MicroPacker,
}

impl SlottingOrchestrator {
    pub fn new() -> Self {
        Self {
            auditor: AuditEngine::new(),
            classifier: AbcClassifier::new(),
            packer: MicroPacker::new(),
        }
    }

    /// 执行完整流程
    ///
    /// # 参数
    /// - skus: SKU 目录
    /// - order_lines: 订单行
    /// - config: 全量配置（进入任何阶段前整体校验）
    ///
    /// # 返回
    /// 四个阶段的结果
    #[instrument(skip_all, fields(skus = skus.len(), order_lines = order_lines.len()))]
    pub fn run(&self, skus: &[Sku], order_lines: &[OrderLine], config: &SlottingConfig) -> EngineResult<SlottingRun> {
        let _timer = StageTimer::new("slotting_run");
        config.validate()?;
        info!(exclude_outliers = config.audit.exclude_outliers, "开始执行货位规划流程");

        // ==========================================
        // 步骤1: Audit Engine - 异常审计
        // ==========================================
        debug!("步骤1: 执行异常审计");
        let audit = self.audit(skus, order_lines, config)?;

        // ==========================================
        // 步骤2: 异常排除（可选）
        // ==========================================
        let exclusion = Exclusion::from_audit(&audit, order_lines, config.audit.exclude_outliers);

        // ==========================================
        // 步骤3-4: ABC 分类 + 宏观分区
        // ==========================================
        let (classified, macro_result) = self.allocate(skus, &exclusion, config)?;

        // ==========================================
        // 步骤5: Micro Packer - VLM 装盘
        // ==========================================
        let micro_result = self.pack(&macro_result, &exclusion, config)?;

        info!(
            flagged_skus = audit.flagged_sku_ids().len(),
            unassigned = macro_result.unassigned_count,
            trays = micro_result.total_trays(),
            "货位规划流程完成"
        );

        Ok(SlottingRun {
            audit,
            classified,
            macro_result,
            micro_result,
        })
    }

    /// 异常审计
    pub fn audit(&self, skus: &[Sku], order_lines: &[OrderLine], config: &SlottingConfig) -> EngineResult<AuditResult> {
        let _timer = StageTimer::new("audit");
        self.auditor.audit(skus, order_lines, &config.audit)
    }

    /// 审计排除（开启时）→ ABC 分类 → 宏观分区
    ///
    /// # 返回
    /// (ABC 标注后的 SKU（输入顺序）, MacroResult)
    pub fn allocate(
        &self,
        skus: &[Sku],
        exclusion: &Exclusion,
        config: &SlottingConfig,
    ) -> EngineResult<(Vec<Sku>, MacroResult)> {
        debug!("步骤3: 执行 ABC 分类");
        let classified = {
            let _timer = StageTimer::new("classify");
            self.classifier.classify(skus)
        };

        debug!("步骤4: 执行宏观分区");
        let _timer = StageTimer::new("macro_allocate");
        let allocator = MacroAllocator::from_config(&config.macro_slotting);
        let (_, macro_result) =
            allocator.allocate_with_config(&classified, &config.macro_slotting, exclusion.sku_ids.as_ref())?;
        Ok((classified, macro_result))
    }

    /// 对宏观结果中分配到密集存储的 SKU 装盘（亲和统计使用排除后的订单行）
    pub fn pack(&self, macro_result: &MacroResult, exclusion: &Exclusion, config: &SlottingConfig) -> EngineResult<MicroResult> {
        let dense_id = config.macro_slotting.dense_storage_id.as_str();
        let dense_skus: Vec<Sku> = macro_result.skus_in(dense_id).cloned().collect();
        debug!(dense_skus = dense_skus.len(), "步骤5: 执行 VLM 装盘");

        let _timer = StageTimer::new("micro_pack");
        self.packer.pack(
            &dense_skus,
            &exclusion.affinity_lines,
            &config.micro,
            config.macro_slotting.coverage_days,
        )
    }
}

impl Default for SlottingOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// Exclusion - 审计排除结果
// ==========================================
// 宏观分区与微观装盘共用,保证单阶段调用与完整流程一致
#[derive(Debug, Clone, PartialEq)]
pub struct Exclusion {
    pub sku_ids: Option<HashSet<String>>, // None = 未开启排除
    pub affinity_lines: Vec<OrderLine>,   // 剔除大单后的订单行
}

impl Exclusion {
    /// 不排除任何 SKU 或订单
    pub fn none(order_lines: &[OrderLine]) -> Self {
        Self {
            sku_ids: None,
            affinity_lines: order_lines.to_vec(),
        }
    }

    /// 按审计结果构建：被标记 SKU 不参与分区,大单不参与亲和统计
    pub fn from_audit(audit: &AuditResult, order_lines: &[OrderLine], enabled: bool) -> Self {
        if !enabled {
            return Self::none(order_lines);
        }

        let excluded_orders = audit.flagged_order_ids();
        let affinity_lines: Vec<OrderLine> = order_lines
            .iter()
            .filter(|line| !excluded_orders.contains(line.order_id.as_str()))
            .cloned()
            .collect();
        let sku_ids = audit.flagged_sku_ids();
        debug!(
            excluded_skus = sku_ids.len(),
            excluded_orders = excluded_orders.len(),
            "步骤2: 排除异常 SKU 与大单"
        );

        Self {
            sku_ids: Some(sku_ids),
            affinity_lines,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::audit::OutlierOrderItem;
    use crate::domain::types::AbcClass;

    fn sku(id: &str, weight: f64, per_day: f64) -> Sku {
        Sku::new(id, id, 0.1, 0.1, 0.1, weight)
            .with_demand(per_day * 365.0, per_day)
            .with_flags(false, weight < 25.0)
    }

    #[test]
    fn test_full_run_excludes_outliers() {
        let orchestrator = SlottingOrchestrator::new();
        let skus = vec![sku("A", 1.0, 10.0), sku("B", 1.0, 5.0), sku("HEAVY", 40.0, 1.0)];
        let mut config = SlottingConfig::default();
        config.audit.ubiquitous_enabled = false;

        let run = orchestrator.run(&skus, &[], &config).unwrap();

        assert_eq!(run.audit.heavy_skus.len(), 1);
        assert_eq!(run.classified[0].abc_class, Some(AbcClass::A));
        assert_eq!(run.macro_result.excluded_ids, vec!["HEAVY".to_string()]);
        assert!(run.macro_result.skus[2].assigned_storage.is_none());
        assert_eq!(run.macro_result.skus[0].assigned_storage.as_deref(), Some("vlm"));
        assert!(run.micro_result.total_trays() > 0);
    }

    #[test]
    fn test_full_run_without_exclusion() {
        let orchestrator = SlottingOrchestrator::new();
        let skus = vec![sku("A", 1.0, 10.0), sku("HEAVY", 40.0, 1.0)];
        let mut config = SlottingConfig::default();
        config.audit.exclude_outliers = false;

        let run = orchestrator.run(&skus, &[], &config).unwrap();

        assert!(run.macro_result.excluded_ids.is_empty());
        assert_eq!(run.macro_result.skus[1].assigned_storage.as_deref(), Some("jaula"));
    }

    #[test]
    fn test_invalid_config_fails_before_audit() {
        let orchestrator = SlottingOrchestrator::new();
        let mut config = SlottingConfig::default();
        config.macro_slotting.storage_types.clear();

        assert!(orchestrator.run(&[sku("A", 1.0, 1.0)], &[], &config).is_err());
    }

    #[test]
    fn test_exclusion_drops_flagged_orders_only_when_enabled() {
        let lines = vec![OrderLine::new("BIG", "A", 1.0), OrderLine::new("P1", "A", 1.0)];
        let mut audit = AuditResult::default();
        audit.massive_orders.push(OutlierOrderItem {
            order_id: "BIG".to_string(),
            value: 60,
            units: 60.0,
        });

        let disabled = Exclusion::from_audit(&audit, &lines, false);
        assert!(disabled.sku_ids.is_none());
        assert_eq!(disabled.affinity_lines.len(), 2);

        let enabled = Exclusion::from_audit(&audit, &lines, true);
        assert_eq!(enabled.sku_ids, Some(HashSet::new()));
        assert_eq!(enabled.affinity_lines, vec![OrderLine::new("P1", "A", 1.0)]);
    }
}
