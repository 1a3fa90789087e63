// ==========================================
// 仓储货位规划引擎 - 数据质量校验器实现
// ==========================================
// 职责: ERROR / WARNING / INFO 三级校验 + DQ 报告生成
// 规则: ERROR 阻断该行；重复主键保留首行；未知 SKU 订单行保留
// ==========================================

use crate::domain::sku::{DqReport, DqViolation, OrderLine, RawSkuRecord};
use crate::domain::types::{DqLevel, DqSource};
use crate::importer::importer_trait::DqValidator as DqValidatorTrait;
use std::collections::HashSet;

pub struct DqValidator;

impl DqValidatorTrait for DqValidator {
    /// 校验主键（非空且唯一）
    fn validate_primary_key(&self, records: &[RawSkuRecord]) -> Vec<DqViolation> {
        let mut violations = Vec::new();
        let mut seen_ids = HashSet::new();

        for record in records {
            let Some(id) = record.id.as_ref() else {
                violations.push(DqViolation {
                    source: DqSource::Catalog,
                    row_number: record.row_number,
                    sku_id: None,
                    level: DqLevel::Error,
                    field: "sku_id".to_string(),
                    message: "主键缺失".to_string(),
                });
                continue;
            };

            if !seen_ids.insert(id.as_str()) {
                violations.push(DqViolation {
                    source: DqSource::Catalog,
                    row_number: record.row_number,
                    sku_id: Some(id.clone()),
                    level: DqLevel::Warning,
                    field: "sku_id".to_string(),
                    message: "重复 SKU（保留首行，本行丢弃）".to_string(),
                });
            }
        }

        violations
    }

    /// 校验数值范围
    fn validate_ranges(&self, record: &RawSkuRecord) -> Vec<DqViolation> {
        let mut violations = Vec::new();

        for (field, value) in [
            ("height", record.height),
            ("width", record.width),
            ("depth", record.depth),
            ("volume", record.volume),
            ("weight", record.weight),
            ("units_sold_total", record.units_sold_total),
            ("units_per_day_avg", record.units_per_day_avg),
        ] {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    violations.push(DqViolation {
                        source: DqSource::Catalog,
                        row_number: record.row_number,
                        sku_id: record.id.clone(),
                        level: DqLevel::Error,
                        field: field.to_string(),
                        message: format!("数值非法: {}", v),
                    });
                }
            }
        }

        // 重量缺失（列存在但单元格为空）
        if record.weight.is_none() {
            violations.push(DqViolation {
                source: DqSource::Catalog,
                row_number: record.row_number,
                sku_id: record.id.clone(),
                level: DqLevel::Error,
                field: "weight".to_string(),
                message: "重量缺失".to_string(),
            });
        }

        // 体积为 0（无体积且尺寸不全）
        let has_volume = record.volume.is_some()
            || (record.height.is_some() && record.width.is_some() && record.depth.is_some());
        if !has_volume {
            violations.push(DqViolation {
                source: DqSource::Catalog,
                row_number: record.row_number,
                sku_id: record.id.clone(),
                level: DqLevel::Error,
                field: "volume".to_string(),
                message: "体积缺失且尺寸不全".to_string(),
            });
        }

        violations
    }

    fn validate_order_line(
        &self,
        row_number: usize,
        fields: &(Option<String>, Option<String>, Option<f64>),
    ) -> Vec<DqViolation> {
        let (order_id, sku_id, quantity) = fields;
        let mut violations = Vec::new();

        let mut error = |field: &str, message: String| {
            violations.push(DqViolation {
                source: DqSource::Orders,
                row_number,
                sku_id: sku_id.clone(),
                level: DqLevel::Error,
                field: field.to_string(),
                message,
            });
        };

        if order_id.is_none() {
            error("order_id", "订单号缺失".to_string());
        }
        if sku_id.is_none() {
            error("sku_id", "SKU 缺失".to_string());
        }
        match quantity {
            None => error("quantity", "数量缺失".to_string()),
            Some(q) if !q.is_finite() || *q < 0.0 => error("quantity", format!("数量非法: {}", q)),
            Some(_) => {}
        }

        violations
    }

    fn validate_order_reference(&self, row_number: usize, line: &OrderLine, known: bool) -> Option<DqViolation> {
        if known {
            return None;
        }
        Some(DqViolation {
            source: DqSource::Orders,
            row_number,
            sku_id: Some(line.sku_id.clone()),
            level: DqLevel::Warning,
            field: "sku_id".to_string(),
            message: format!("订单 {} 引用的 SKU 不在目录中", line.order_id),
        })
    }
}

impl DqValidator {
    /// 汇总违规为报告
    pub fn generate_dq_report(&self, violations: Vec<DqViolation>) -> DqReport {
        let mut report = DqReport::default();
        for violation in violations {
            report.push(violation);
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: Option<&str>, row: usize) -> RawSkuRecord {
        RawSkuRecord {
            id: id.map(str::to_string),
            volume: Some(0.01),
            weight: Some(1.0),
            row_number: row,
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_and_duplicate_keys() {
        let records = vec![record(Some("A"), 2), record(None, 3), record(Some("A"), 4)];

        let violations = DqValidator.validate_primary_key(&records);

        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].level, DqLevel::Error);
        assert_eq!(violations[0].row_number, 3);
        assert_eq!(violations[1].level, DqLevel::Warning);
        assert_eq!(violations[1].row_number, 4);
    }

    #[test]
    fn test_negative_value_is_error() {
        let rec = RawSkuRecord {
            weight: Some(-1.0),
            ..record(Some("A"), 2)
        };
        let violations = DqValidator.validate_ranges(&rec);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "weight");
        assert_eq!(violations[0].level, DqLevel::Error);
    }

    #[test]
    fn test_missing_volume_and_dimensions() {
        let rec = RawSkuRecord {
            volume: None,
            height: Some(0.1),
            ..record(Some("A"), 2)
        };
        let violations = DqValidator.validate_ranges(&rec);
        assert!(violations.iter().any(|v| v.field == "volume"));
    }

    #[test]
    fn test_order_line_checks() {
        let ok = (Some("P1".to_string()), Some("A".to_string()), Some(2.0));
        assert!(DqValidator.validate_order_line(2, &ok).is_empty());

        let bad = (None, Some("A".to_string()), Some(-1.0));
        let violations = DqValidator.validate_order_line(3, &bad);
        assert_eq!(violations.len(), 2);

        let line = OrderLine::new("P1", "ZZZ", 1.0);
        let warning = DqValidator.validate_order_reference(4, &line, false).unwrap();
        assert_eq!(warning.level, DqLevel::Warning);
        assert!(DqValidator.validate_order_reference(4, &line, true).is_none());
    }

    #[test]
    fn test_report_counts() {
        let records = vec![record(None, 2), record(Some("A"), 3), record(Some("A"), 4)];
        let report = DqValidator.generate_dq_report(DqValidator.validate_primary_key(&records));
        assert_eq!(report.blocked_rows, 1);
        assert_eq!(report.warning_rows, 1);
        assert!(report.has_errors());
    }
}
