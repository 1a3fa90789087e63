// ==========================================
// 仓储货位规划引擎 - 目录导入器实现
// ==========================================
// 职责: 整合导入流程，从文件到引擎输入
// 流程: 解析 → 列映射 → 校验 → 去重 → 订单汇总 → 派生
// 红线: 缺少必需列时整体失败；ERROR 行阻断,不补默认值
// ==========================================

use crate::config::MappingConfig;
use crate::domain::sku::{DqReport, ImportBatch, OrderLine, RawSkuRecord, Sku};
use crate::domain::types::DqLevel;
use crate::importer::dq_validator::DqValidator;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::{ExcelParser, RawTable, UniversalFileParser};
use crate::importer::importer_trait::{
    DerivationService, DqValidator as DqValidatorTrait, FieldMapper, FileParser,
};
use crate::importer::{DerivationServiceImpl, FieldMapperImpl};
use chrono::Utc;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// ImportedDataset - 导入结果
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct ImportedDataset {
    pub skus: Vec<Sku>,
    pub order_lines: Vec<OrderLine>,
    pub dq_report: DqReport,
    pub batch: ImportBatch,
}

// ==========================================
// CatalogImporter - 目录导入器
// ==========================================
pub struct CatalogImporter {
    file_parser: Box<dyn FileParser>,
    field_mapper: Box<dyn FieldMapper>,
    derivation_service: Box<dyn DerivationService>,
    dq_validator: DqValidator,
}

impl CatalogImporter {
    /// 创建新的导入器实例
    ///
    /// # 参数
    /// - file_parser: 文件解析器
    /// - field_mapper: 字段映射器
    /// - derivation_service: 字段派生服务
    pub fn new(
        file_parser: Box<dyn FileParser>,
        field_mapper: Box<dyn FieldMapper>,
        derivation_service: Box<dyn DerivationService>,
    ) -> Self {
        Self {
            file_parser,
            field_mapper,
            derivation_service,
            dq_validator: DqValidator,
        }
    }

    /// 从单个文件导入
    ///
    /// - Excel: 目录与订单分别取配置的工作表（订单表缺失时无订单数据）
    /// - CSV: 仅目录
    pub fn import(&self, path: &Path, mapping: &MappingConfig) -> ImportResult<ImportedDataset> {
        self.import_files(path, None, mapping)
    }

    /// 从目录文件 + 可选订单文件导入
    #[instrument(skip(self, mapping), fields(batch_id = tracing::field::Empty))]
    pub fn import_files(
        &self,
        catalog_path: &Path,
        orders_path: Option<&Path>,
        mapping: &MappingConfig,
    ) -> ImportResult<ImportedDataset> {
        let start_time = Instant::now();
        let batch_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("batch_id", batch_id.as_str());
        info!(catalog = %catalog_path.display(), orders = ?orders_path, "开始导入目录数据");

        // ==========================================
        // 阶段 0: 文件解析
        // ==========================================
        let catalog_table = self
            .file_parser
            .parse_table(catalog_path, Some(&mapping.sheet_catalog))?;
        let orders_table = self.load_orders_table(catalog_path, orders_path, mapping)?;
        debug!(
            catalog_rows = catalog_table.rows.len(),
            order_rows = orders_table.as_ref().map_or(0, |t| t.rows.len()),
            "文件解析完成"
        );

        // ==========================================
        // 阶段 1: 列映射（缺少必需列整体失败）
        // ==========================================
        let catalog_columns = self
            .field_mapper
            .resolve_catalog_columns(&catalog_table.headers, mapping)?;
        let order_columns = match &orders_table {
            Some(table) => Some(self.field_mapper.resolve_order_columns(&table.headers, mapping)?),
            None => None,
        };

        let mut records: Vec<RawSkuRecord> = Vec::with_capacity(catalog_table.rows.len());
        for row in &catalog_table.rows {
            records.push(self.field_mapper.map_to_raw_sku(row, &catalog_columns)?);
        }

        // ==========================================
        // 阶段 2: 目录数据质量校验 + 去重
        // ==========================================
        let mut violations = self.dq_validator.validate_primary_key(&records);
        for record in &records {
            violations.extend(self.dq_validator.validate_ranges(record));
        }

        let blocked_rows: HashSet<usize> = violations
            .iter()
            .filter(|v| v.level == DqLevel::Error)
            .map(|v| v.row_number)
            .collect();

        let mut seen = HashSet::new();
        let accepted: Vec<&RawSkuRecord> = records
            .iter()
            .filter(|r| !blocked_rows.contains(&r.row_number))
            .filter(|r| r.id.as_ref().is_some_and(|id| seen.insert(id.clone())))
            .collect();

        // ==========================================
        // 阶段 3: 订单行
        // ==========================================
        let known_ids: HashSet<&str> = accepted.iter().filter_map(|r| r.id.as_deref()).collect();
        let mut order_lines = Vec::new();
        if let (Some(table), Some(columns)) = (&orders_table, &order_columns) {
            for row in &table.rows {
                let fields = self.field_mapper.map_to_order_fields(row, columns)?;
                let line_violations = self.dq_validator.validate_order_line(row.row_number, &fields);
                if !line_violations.is_empty() {
                    violations.extend(line_violations);
                    continue;
                }
                let (Some(order_id), Some(sku_id), Some(quantity)) = fields else {
                    continue;
                };
                let line = OrderLine::new(&order_id, &sku_id, quantity);
                if let Some(warning) = self.dq_validator.validate_order_reference(
                    row.row_number,
                    &line,
                    known_ids.contains(sku_id.as_str()),
                ) {
                    violations.push(warning);
                }
                order_lines.push(line);
            }
        }

        // ==========================================
        // 阶段 4: 派生
        // ==========================================
        let mut demand_totals: HashMap<String, f64> = HashMap::new();
        for line in &order_lines {
            *demand_totals.entry(line.sku_id.clone()).or_insert(0.0) += line.quantity;
        }
        let skus: Vec<Sku> = accepted
            .iter()
            .map(|r| self.derivation_service.derive_sku(r, &demand_totals, mapping))
            .collect();

        let dq_report = self.dq_validator.generate_dq_report(violations);
        if dq_report.has_errors() {
            warn!(
                blocked_rows = dq_report.blocked_rows,
                warning_rows = dq_report.warning_rows,
                "存在被阻断的数据行"
            );
        }

        let batch = ImportBatch {
            batch_id,
            catalog_file: catalog_path.display().to_string(),
            orders_file: orders_path.map(|p| p.display().to_string()),
            catalog_rows: catalog_table.rows.len(),
            sku_count: skus.len(),
            order_line_count: order_lines.len(),
            imported_at: Utc::now(),
            elapsed_ms: start_time.elapsed().as_millis() as u64,
        };

        info!(
            sku_count = batch.sku_count,
            order_line_count = batch.order_line_count,
            blocked_rows = dq_report.blocked_rows,
            elapsed_ms = batch.elapsed_ms,
            "目录导入完成"
        );

        Ok(ImportedDataset {
            skus,
            order_lines,
            dq_report,
            batch,
        })
    }

    /// 订单表来源：显式文件 > 目录工作簿内的订单工作表 > 无
    fn load_orders_table(
        &self,
        catalog_path: &Path,
        orders_path: Option<&Path>,
        mapping: &MappingConfig,
    ) -> ImportResult<Option<RawTable>> {
        if let Some(path) = orders_path {
            return self
                .file_parser
                .parse_table(path, Some(&mapping.sheet_orders))
                .map(Some);
        }

        if !ExcelParser::is_workbook(catalog_path) {
            return Ok(None);
        }

        match self.file_parser.parse_table(catalog_path, Some(&mapping.sheet_orders)) {
            Ok(table) => Ok(Some(table)),
            Err(ImportError::SheetMissing { sheet, .. }) => {
                warn!(sheet = %sheet, "工作簿中无订单工作表，按无订单数据处理");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

impl Default for CatalogImporter {
    fn default() -> Self {
        Self::new(
            Box::new(UniversalFileParser),
            Box::new(FieldMapperImpl),
            Box::new(DerivationServiceImpl),
        )
    }
}
