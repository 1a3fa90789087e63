// ==========================================
// 仓储货位规划引擎 - 结果导出
// ==========================================
// 职责: 结果结构 → 行列表格 → CSV
// 表格: 审计异常 / 存储分配 / SKU 分配明细 / 托盘明细
// ==========================================

use crate::api::error::ApiResult;
use crate::domain::{AuditCategory, AuditResult, MacroResult, MicroResult, Sku};
use crate::engine::SlottingRun;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// 行列表格
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    fn with_headers(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 写出 CSV 到任意 writer
    pub fn write_csv<W: Write>(&self, writer: W) -> ApiResult<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(&self.headers)?;
        for row in &self.rows {
            csv_writer.write_record(row)?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    /// 写出 CSV 文件
    pub fn write_csv_file(&self, path: &Path) -> ApiResult<()> {
        let file = fs::File::create(path)?;
        self.write_csv(file)
    }
}

fn num(value: f64) -> String {
    format!("{}", value)
}

fn opt_num(value: Option<f64>) -> String {
    value.map(num).unwrap_or_default()
}

// ==========================================
// 审计异常表
// ==========================================
pub fn audit_table(audit: &AuditResult) -> Table {
    let mut table = Table::with_headers(&["category", "id", "description", "value", "count", "units"]);

    for (category, items) in [
        (AuditCategory::Heavy, &audit.heavy_skus),
        (AuditCategory::Bulky, &audit.bulky_skus),
    ] {
        for item in items {
            table.push(vec![
                category.to_string(),
                item.sku_id.clone(),
                item.description.clone(),
                num(item.value),
                String::new(),
                String::new(),
            ]);
        }
    }

    for item in &audit.massive_orders {
        table.push(vec![
            AuditCategory::MassiveOrders.to_string(),
            item.order_id.clone(),
            String::new(),
            item.value.to_string(),
            String::new(),
            num(item.units),
        ]);
    }

    for item in &audit.ubiquitous_skus {
        table.push(vec![
            AuditCategory::Ubiquitous.to_string(),
            item.sku_id.clone(),
            item.description.clone(),
            num(item.value),
            item.count.to_string(),
            String::new(),
        ]);
    }

    table
}

// ==========================================
// 存储分配表
// ==========================================
pub fn allocation_table(result: &MacroResult) -> Table {
    let mut table = Table::with_headers(&[
        "storage_id",
        "name",
        "priority",
        "skus_count",
        "volume_target",
        "volume_used",
        "weight_used",
        "fill_percentage",
        "forced_count",
        "overflow_count",
        "share_percentage",
    ]);

    for allocation in &result.allocations {
        let share = result
            .storage_distribution
            .iter()
            .find(|s| s.storage_id == allocation.storage_id)
            .map(|s| s.percentage)
            .unwrap_or(0.0);
        table.push(vec![
            allocation.storage_id.clone(),
            allocation.name.clone(),
            allocation.priority.to_string(),
            allocation.skus_count.to_string(),
            num(allocation.volume_target),
            num(allocation.volume_used),
            num(allocation.weight_used),
            num(allocation.fill_percentage),
            allocation.forced_count.to_string(),
            allocation.overflow_count.to_string(),
            num(share),
        ]);
    }

    table
}

// ==========================================
// SKU 分配明细表
// ==========================================
pub fn assignment_table(skus: &[Sku]) -> Table {
    let mut table = Table::with_headers(&[
        "sku_id",
        "description",
        "abc_class",
        "units_per_day_avg",
        "assigned_storage",
        "assign_reason",
        "cycle_volume",
        "cycle_weight",
    ]);

    for sku in skus {
        table.push(vec![
            sku.id.clone(),
            sku.description.clone(),
            sku.abc_class.map(|c| c.to_string()).unwrap_or_default(),
            num(sku.units_per_day_avg),
            sku.assigned_storage.clone().unwrap_or_default(),
            sku.assign_reason.map(|r| r.to_string()).unwrap_or_default(),
            opt_num(sku.cycle_volume),
            opt_num(sku.cycle_weight),
        ]);
    }

    table
}

// ==========================================
// 托盘明细表（每个 SKU 行一行）
// ==========================================
pub fn tray_table(result: &MicroResult) -> Table {
    let mut table = Table::with_headers(&[
        "vlm_id",
        "tray_id",
        "group_id",
        "sku_id",
        "description",
        "units",
        "volume_fill",
        "weight_fill",
    ]);

    for tray in result.all_trays() {
        for line in &tray.skus {
            table.push(vec![
                tray.vlm_id.to_string(),
                tray.id.clone(),
                tray.group_id.clone(),
                line.sku_id.clone(),
                line.description.clone(),
                line.units.to_string(),
                num(tray.volume_fill),
                num(tray.weight_fill),
            ]);
        }
    }

    table
}

/// 将完整流程结果写出为 CSV 文件集合
///
/// # 返回
/// 写出的文件路径（audit / allocations / assignments / trays）
pub fn write_run(run: &SlottingRun, out_dir: &Path) -> ApiResult<Vec<PathBuf>> {
    fs::create_dir_all(out_dir)?;

    let tables = [
        ("audit.csv", audit_table(&run.audit)),
        ("allocations.csv", allocation_table(&run.macro_result)),
        ("assignments.csv", assignment_table(&run.macro_result.skus)),
        ("trays.csv", tray_table(&run.micro_result)),
    ];

    let mut written = Vec::with_capacity(tables.len());
    for (file_name, table) in &tables {
        let path = out_dir.join(file_name);
        table.write_csv_file(&path)?;
        written.push(path);
    }

    info!(out_dir = %out_dir.display(), files = written.len(), "结果已导出");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OutlierOrderItem, OutlierSkuItem, StorageAllocation, StorageType, Tray, TraySku};

    fn sample_micro() -> MicroResult {
        let mut result = MicroResult::empty(2);
        result.trays_per_vlm[1].push(Tray {
            id: "T-1".to_string(),
            vlm_id: 1,
            group_id: "G-1".to_string(),
            skus: vec![TraySku {
                sku_id: "A".to_string(),
                description: "Válvula".to_string(),
                units: 12,
            }],
            volume_fill: 42.5,
            weight_fill: 10.0,
        });
        result
    }

    #[test]
    fn test_audit_table_rows_per_category() {
        let audit = AuditResult {
            heavy_skus: vec![OutlierSkuItem {
                sku_id: "H".to_string(),
                description: "Motor".to_string(),
                value: 30.0,
            }],
            massive_orders: vec![OutlierOrderItem {
                order_id: "P9".to_string(),
                value: 120,
                units: 480.0,
            }],
            ..Default::default()
        };

        let table = audit_table(&audit);

        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0][0], "heavy_skus");
        assert_eq!(table.rows[1][0], "massive_orders");
        assert_eq!(table.rows[1][3], "120");
        assert_eq!(table.rows[1][5], "480");
    }

    #[test]
    fn test_allocation_table_includes_share() {
        let storage = StorageType::new("vlm", "VLM", 1, 10.0, 500.0);
        let mut allocation = StorageAllocation::new(&storage, 0.8);
        allocation.add(4.0, 10.0);
        allocation.refresh_fill();
        let result = MacroResult {
            allocations: vec![allocation],
            storage_distribution: vec![crate::domain::StorageShare {
                storage_id: "vlm".to_string(),
                name: "VLM".to_string(),
                count: 1,
                percentage: 100.0,
            }],
            unassigned_count: 0,
            excluded_ids: Vec::new(),
            skus: Vec::new(),
        };

        let table = allocation_table(&result);

        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0][7], "50");
        assert_eq!(table.rows[0][10], "100");
    }

    #[test]
    fn test_tray_table_and_csv_output() {
        let table = tray_table(&sample_micro());
        assert_eq!(table.rows, vec![vec!["1", "T-1", "G-1", "A", "Válvula", "12", "42.5", "10"]]);

        let mut buffer = Vec::new();
        table.write_csv(&mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.starts_with("vlm_id,tray_id,group_id"));
        assert!(text.contains("1,T-1,G-1,A,Válvula,12,42.5,10"));
    }

    #[test]
    fn test_assignment_table_blank_for_unset_fields() {
        let sku = Sku::new("A", "Válvula", 0.1, 0.1, 0.1, 1.0);
        let table = assignment_table(&[sku]);
        assert_eq!(table.rows[0][2], "");
        assert_eq!(table.rows[0][4], "");
    }
}
