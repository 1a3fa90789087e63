// ==========================================
// 仓储货位规划引擎 - 导入层 Trait 定义
// ==========================================
// 职责: 定义导入流水线各组件接口（不包含实现）
// 流程: 解析 → 列映射 → 数据质量校验 → 派生
// ==========================================

use crate::config::MappingConfig;
use crate::domain::sku::{DqViolation, OrderLine, RawSkuRecord, Sku};
use crate::importer::error::ImportResult;
use crate::importer::field_mapper::{CatalogColumns, OrderColumns};
use crate::importer::file_parser::{RawRow, RawTable};
use std::collections::HashMap;
use std::path::Path;

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件 → 表头 + 原始行
// 实现者: CsvParser / ExcelParser / UniversalFileParser
pub trait FileParser: Send + Sync {
    /// 解析文件为原始表
    ///
    /// # 参数
    /// - file_path: 文件路径
    /// - sheet: 工作表名称（CSV 忽略）
    ///
    /// # 返回
    /// - Ok(RawTable): 表头 + 非空数据行（保留原始行号）
    /// - Err: 文件不存在 / 格式不支持 / 工作表不存在 / 解析失败
    fn parse_table(&self, file_path: &Path, sheet: Option<&str>) -> ImportResult<RawTable>;
}

// ==========================================
// FieldMapper Trait
// ==========================================
// 用途: 源列名 → 标准字段 + 类型转换
pub trait FieldMapper: Send + Sync {
    /// 解析目录表列（缺少必需列时失败）
    fn resolve_catalog_columns(&self, headers: &[String], mapping: &MappingConfig) -> ImportResult<CatalogColumns>;

    /// 解析订单表列（缺少必需列时失败）
    fn resolve_order_columns(&self, headers: &[String], mapping: &MappingConfig) -> ImportResult<OrderColumns>;

    /// 目录行 → RawSkuRecord（数值无法解析时失败）
    fn map_to_raw_sku(&self, row: &RawRow, columns: &CatalogColumns) -> ImportResult<RawSkuRecord>;

    /// 订单行 → (订单号, SKU, 数量)，缺失字段为 None
    fn map_to_order_fields(
        &self,
        row: &RawRow,
        columns: &OrderColumns,
    ) -> ImportResult<(Option<String>, Option<String>, Option<f64>)>;
}

// ==========================================
// DqValidator Trait
// ==========================================
// 用途: 数据质量校验（ERROR 阻断,WARNING 保留或去重）
pub trait DqValidator: Send + Sync {
    /// 主键校验（缺失 → ERROR，重复 → WARNING）
    fn validate_primary_key(&self, records: &[RawSkuRecord]) -> Vec<DqViolation>;

    /// 数值范围校验（负数 / 非有限 → ERROR）
    fn validate_ranges(&self, record: &RawSkuRecord) -> Vec<DqViolation>;

    /// 订单行校验（缺失字段 / 负数量 → ERROR）
    fn validate_order_line(
        &self,
        row_number: usize,
        fields: &(Option<String>, Option<String>, Option<f64>),
    ) -> Vec<DqViolation>;

    /// 订单行引用未知 SKU（WARNING，保留用于统计）
    fn validate_order_reference(&self, row_number: usize, line: &OrderLine, known: bool) -> Option<DqViolation>;
}

// ==========================================
// DerivationService Trait
// ==========================================
// 用途: 缺省字段派生（体积 / 需求 / VLM 适配）
pub trait DerivationService: Send + Sync {
    /// RawSkuRecord → Sku
    ///
    /// # 参数
    /// - demand_totals: SKU → 订单累计数量（无销量列时使用）
    fn derive_sku(
        &self,
        record: &RawSkuRecord,
        demand_totals: &HashMap<String, f64>,
        mapping: &MappingConfig,
    ) -> Sku;
}
