// ==========================================
// 仓储货位规划引擎 - 货位规划 API
// ==========================================
// 职责: 导入、审计、ABC、宏观分区、微观装盘、完整流程的统一入口
// 红线: 每次调用基于传入数据重新计算,API 不保留跨调用的可变状态
// ==========================================

use std::path::Path;

use tracing::{info, instrument};

use crate::api::error::{ApiError, ApiResult};
use crate::config::{ConfigManager, SlottingConfig};
use crate::domain::{AuditResult, MacroResult, MicroResult, OrderLine, Sku};
use crate::engine::{AbcClassifier, Exclusion, SlottingOrchestrator, SlottingRun};
use crate::importer::{CatalogImporter, ImportedDataset};

// ==========================================
// SlottingApi - 货位规划 API
// ==========================================

/// 货位规划API
///
/// 职责：
/// 1. 目录/订单文件导入
/// 2. 单阶段计算（审计 / ABC / 宏观 / 微观）
/// 3. 完整流程计算
pub struct SlottingApi {
    config: SlottingConfig,
    importer: CatalogImporter,
    orchestrator: SlottingOrchestrator,
}

impl SlottingApi {
    /// 创建新的SlottingApi实例（配置在此处整体校验）
    pub fn new(config: SlottingConfig) -> ApiResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            importer: CatalogImporter::default(),
            orchestrator: SlottingOrchestrator::new(),
        })
    }

    /// 以配置管理器当前配置创建
    pub fn from_manager(manager: &ConfigManager) -> ApiResult<Self> {
        Self::new(manager.config().clone())
    }

    pub fn config(&self) -> &SlottingConfig {
        &self.config
    }

    // ==========================================
    // 导入
    // ==========================================

    /// 导入目录（及可选订单文件）
    ///
    /// # 返回
    /// - Ok(ImportedDataset): SKU、订单行、DQ 报告、批次信息
    /// - Err(ApiError): 文件/列映射错误；有效 SKU 为 0 时返回 InvalidInput
    #[instrument(skip(self))]
    pub fn import(&self, catalog_path: &Path, orders_path: Option<&Path>) -> ApiResult<ImportedDataset> {
        let dataset = self
            .importer
            .import_files(catalog_path, orders_path, &self.config.mapping)?;

        if dataset.skus.is_empty() {
            return Err(ApiError::InvalidInput(format!(
                "目录中无有效 SKU（阻断行 {}）",
                dataset.dq_report.blocked_rows
            )));
        }

        Ok(dataset)
    }

    // ==========================================
    // 单阶段计算
    // ==========================================

    /// 异常审计
    pub fn audit(&self, skus: &[Sku], order_lines: &[OrderLine]) -> ApiResult<AuditResult> {
        Ok(self.orchestrator.audit(skus, order_lines, &self.config)?)
    }

    /// ABC 分类（输入顺序返回）
    pub fn classify(&self, skus: &[Sku]) -> Vec<Sku> {
        AbcClassifier::new().classify(skus)
    }

    /// 宏观分区（与完整流程相同的审计排除规则）
    #[instrument(skip_all, fields(skus = skus.len()))]
    pub fn allocate(&self, skus: &[Sku], order_lines: &[OrderLine]) -> ApiResult<MacroResult> {
        let exclusion = self.exclusion(skus, order_lines)?;
        let (_, result) = self.orchestrator.allocate(skus, &exclusion, &self.config)?;

        info!(
            unassigned = result.unassigned_count,
            excluded = result.excluded_ids.len(),
            "宏观分区完成"
        );
        Ok(result)
    }

    /// 微观装盘：对宏观结果中分配到密集存储的 SKU 装盘
    ///
    /// 开启异常排除时大单不参与亲和统计,结果与完整流程的 micro_result 一致
    pub fn pack(&self, macro_result: &MacroResult, order_lines: &[OrderLine]) -> ApiResult<MicroResult> {
        let exclusion = self.exclusion(&macro_result.skus, order_lines)?;
        Ok(self.orchestrator.pack(macro_result, &exclusion, &self.config)?)
    }

    fn exclusion(&self, skus: &[Sku], order_lines: &[OrderLine]) -> ApiResult<Exclusion> {
        if !self.config.audit.exclude_outliers {
            return Ok(Exclusion::none(order_lines));
        }
        let audit = self.audit(skus, order_lines)?;
        Ok(Exclusion::from_audit(&audit, order_lines, true))
    }

    // ==========================================
    // 完整流程
    // ==========================================

    /// 审计 → 排除 → ABC → 宏观 → 微观
    pub fn run(&self, skus: &[Sku], order_lines: &[OrderLine]) -> ApiResult<SlottingRun> {
        Ok(self.orchestrator.run(skus, order_lines, &self.config)?)
    }

    /// 导入文件后执行完整流程
    pub fn run_files(&self, catalog_path: &Path, orders_path: Option<&Path>) -> ApiResult<(ImportedDataset, SlottingRun)> {
        let dataset = self.import(catalog_path, orders_path)?;
        let run = self.run(&dataset.skus, &dataset.order_lines)?;
        Ok((dataset, run))
    }
}
