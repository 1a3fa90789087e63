// ==========================================
// 仓储货位规划引擎 - 字段映射器实现
// ==========================================
// 职责: 源列名 → 标准字段映射 + 类型转换
// 规则: 列名忽略大小写与首尾空白；配置列名优先,其次为别名
// ==========================================

use crate::config::MappingConfig;
use crate::domain::sku::RawSkuRecord;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::RawRow;
use crate::importer::importer_trait::FieldMapper as FieldMapperTrait;
use std::collections::HashMap;

// SKU 主键别名（上游数据源字段名不统一）
const SKU_ALIASES: &[&str] = &["sku_id", "id", "material", "codigo", "sku"];

/// 目录表列解析结果（实际表头名）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogColumns {
    pub sku: String,
    pub description: Option<String>,
    pub volume: Option<String>,
    pub weight: String,
    pub height: Option<String>,
    pub width: Option<String>,
    pub depth: Option<String>,
    pub units_sold: Option<String>,
    pub units_per_day: Option<String>,
    pub sensitive: Option<String>,
    pub vlm_eligible: Option<String>,
}

/// 订单表列解析结果（实际表头名）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderColumns {
    pub order_id: String,
    pub sku: String,
    pub quantity: String,
}

// ==========================================
// ColumnResolver - 表头查找
// ==========================================
struct ColumnResolver<'a> {
    by_key: HashMap<String, &'a str>,
    table: &'static str,
}

impl<'a> ColumnResolver<'a> {
    fn new(headers: &'a [String], table: &'static str) -> Self {
        let mut by_key = HashMap::new();
        for header in headers {
            // 同名列取第一个
            by_key.entry(Self::key(header)).or_insert(header.as_str());
        }
        Self { by_key, table }
    }

    fn key(name: &str) -> String {
        name.trim().to_lowercase()
    }

    fn find(&self, candidates: &[&str]) -> Option<String> {
        candidates
            .iter()
            .find_map(|c| self.by_key.get(&Self::key(c)))
            .map(|h| h.to_string())
    }

    fn require(&self, candidates: &[&str]) -> ImportResult<String> {
        self.find(candidates).ok_or_else(|| ImportError::RequiredColumnMissing {
            table: self.table.to_string(),
            column: candidates.first().copied().unwrap_or_default().to_string(),
        })
    }
}

pub struct FieldMapper;

impl FieldMapperTrait for FieldMapper {
    fn resolve_catalog_columns(&self, headers: &[String], mapping: &MappingConfig) -> ImportResult<CatalogColumns> {
        let resolver = ColumnResolver::new(headers, "catalog");

        let mut sku_candidates = vec![mapping.col_sku.as_str()];
        sku_candidates.extend_from_slice(SKU_ALIASES);

        let columns = CatalogColumns {
            sku: resolver.require(&sku_candidates)?,
            description: resolver.find(&[mapping.col_description.as_str(), "description", "descripcion"]),
            volume: resolver.find(&[mapping.col_volume.as_str(), "volume"]),
            weight: resolver.require(&[mapping.col_weight.as_str(), "weight"])?,
            height: resolver.find(&[mapping.col_height.as_str(), "height"]),
            width: resolver.find(&[mapping.col_width.as_str(), "width"]),
            depth: resolver.find(&[mapping.col_depth.as_str(), "depth"]),
            units_sold: resolver.find(&[mapping.col_units_sold.as_str(), "units_sold", "units_sold_total"]),
            units_per_day: resolver.find(&[mapping.col_units_per_day.as_str(), "units_per_day", "units_per_day_avg"]),
            sensitive: resolver.find(&[mapping.col_sensitive.as_str(), "sensitive", "is_sensitive"]),
            vlm_eligible: resolver.find(&[mapping.col_vlm_eligible.as_str(), "vlm_eligible", "is_vlm_eligible"]),
        };

        // 体积列缺失时必须具备全部尺寸列
        if columns.volume.is_none() {
            for (column, name) in [
                (&columns.height, &mapping.col_height),
                (&columns.width, &mapping.col_width),
                (&columns.depth, &mapping.col_depth),
            ] {
                if column.is_none() {
                    return Err(ImportError::RequiredColumnMissing {
                        table: "catalog".to_string(),
                        column: format!("{}（或 {}）", mapping.col_volume, name),
                    });
                }
            }
        }

        Ok(columns)
    }

    fn resolve_order_columns(&self, headers: &[String], mapping: &MappingConfig) -> ImportResult<OrderColumns> {
        let resolver = ColumnResolver::new(headers, "orders");

        let mut sku_candidates = vec![mapping.col_order_sku.as_str()];
        sku_candidates.extend_from_slice(SKU_ALIASES);

        Ok(OrderColumns {
            order_id: resolver.require(&[mapping.col_order_id.as_str(), "order_id", "pedido"])?,
            sku: resolver.require(&sku_candidates)?,
            quantity: resolver.require(&[mapping.col_order_qty.as_str(), "quantity", "qty", "cantidad"])?,
        })
    }

    fn map_to_raw_sku(&self, row: &RawRow, columns: &CatalogColumns) -> ImportResult<RawSkuRecord> {
        let n = row.row_number;
        Ok(RawSkuRecord {
            // 主键
            id: self.get_string(row, Some(&columns.sku)),
            description: self.get_string(row, columns.description.as_ref()),

            // 物理属性
            height: self.parse_f64(row, columns.height.as_ref(), n)?,
            width: self.parse_f64(row, columns.width.as_ref(), n)?,
            depth: self.parse_f64(row, columns.depth.as_ref(), n)?,
            volume: self.parse_f64(row, columns.volume.as_ref(), n)?,
            weight: self.parse_f64(row, Some(&columns.weight), n)?,

            // 需求属性
            units_sold_total: self.parse_f64(row, columns.units_sold.as_ref(), n)?,
            units_per_day_avg: self.parse_f64(row, columns.units_per_day.as_ref(), n)?,

            // 标志
            is_sensitive: self.parse_bool(row, columns.sensitive.as_ref(), n)?,
            is_vlm_eligible: self.parse_bool(row, columns.vlm_eligible.as_ref(), n)?,

            // 元信息
            row_number: n,
        })
    }

    fn map_to_order_fields(
        &self,
        row: &RawRow,
        columns: &OrderColumns,
    ) -> ImportResult<(Option<String>, Option<String>, Option<f64>)> {
        Ok((
            self.get_string(row, Some(&columns.order_id)),
            self.get_string(row, Some(&columns.sku)),
            self.parse_f64(row, Some(&columns.quantity), row.row_number)?,
        ))
    }
}

impl FieldMapper {
    /// 提取字符串字段（列未映射或值为空返回 None）
    fn get_string(&self, row: &RawRow, column: Option<&String>) -> Option<String> {
        column.and_then(|c| row.get(c)).map(str::to_string)
    }

    /// 解析浮点数（兼容小数逗号 "0,25"）
    fn parse_f64(&self, row: &RawRow, column: Option<&String>, row_number: usize) -> ImportResult<Option<f64>> {
        let Some(column) = column else {
            return Ok(None);
        };
        match row.get(column) {
            None => Ok(None),
            Some(value) => {
                let normalized = if value.contains(',') && !value.contains('.') {
                    value.replace(',', ".")
                } else {
                    value.to_string()
                };
                normalized
                    .parse::<f64>()
                    .map(Some)
                    .map_err(|_| ImportError::TypeConversionError {
                        row: row_number,
                        field: column.clone(),
                        message: format!("无法解析为浮点数: {}", value),
                    })
            }
        }
    }

    /// 解析布尔标志
    fn parse_bool(&self, row: &RawRow, column: Option<&String>, row_number: usize) -> ImportResult<Option<bool>> {
        let Some(column) = column else {
            return Ok(None);
        };
        match row.get(column) {
            None => Ok(None),
            Some(value) => match value.to_lowercase().as_str() {
                "1" | "true" | "yes" | "y" | "x" | "si" | "sí" | "s" => Ok(Some(true)),
                "0" | "false" | "no" | "n" => Ok(Some(false)),
                _ => Err(ImportError::TypeConversionError {
                    row: row_number,
                    field: column.clone(),
                    message: format!("无法解析为布尔值: {}", value),
                }),
            },
        }
    }
}
