// ==========================================
// 目录导入集成测试
// ==========================================
// 场景: CSV 目录 + 订单文件、列别名、需求派生、数据质量报告、文件错误
// ==========================================

use std::io::Write;
use std::path::Path;
use tempfile::{Builder, NamedTempFile};
use warehouse_slotting::config::MappingConfig;
use warehouse_slotting::domain::DqLevel;
use warehouse_slotting::importer::{CatalogImporter, ImportError};

fn write_csv(lines: &[&str]) -> NamedTempFile {
    let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file
}

#[test]
fn test_alias_headers_and_derived_fields() {
    let catalog = write_csv(&[
        "CODIGO,Descripción,Alto,Ancho,Largo,KG/UMB,Sensible",
        "ELE-001,Válvula,\"0,1\",0.2,0.1,1.5,no",
        "ELE-002,Relé,0.05,0.05,0.05,0.2,si",
    ]);
    let orders = write_csv(&[
        "pedido,sku,qty",
        "P1,ELE-001,100",
        "P2,ELE-001,265",
        "P2,ELE-002,73",
    ]);

    let dataset = CatalogImporter::default()
        .import_files(catalog.path(), Some(orders.path()), &MappingConfig::default())
        .unwrap();

    assert_eq!(dataset.skus.len(), 2);
    let valve = &dataset.skus[0];
    assert_eq!(valve.id, "ELE-001");
    assert!((valve.volume - 0.002).abs() < 1e-12);
    assert_eq!(valve.units_sold_total, 365.0);
    assert_eq!(valve.units_per_day_avg, 1.0);
    assert!(valve.is_vlm_eligible);
    assert!(!valve.is_sensitive);

    let relay = &dataset.skus[1];
    assert!(relay.is_sensitive);
    assert!((relay.units_per_day_avg - 0.2).abs() < 1e-12);

    assert_eq!(dataset.order_lines.len(), 3);
    assert!(!dataset.dq_report.has_errors());
    assert_eq!(dataset.batch.catalog_rows, 2);
    assert_eq!(dataset.batch.order_line_count, 3);
}

#[test]
fn test_supplied_demand_and_flags_win() {
    let catalog = write_csv(&[
        "Material,M3/UMB,KG/UMB,Unidades vendidas,Unidades/día,Apto VLM",
        "A,0.01,30,500,2.5,x",
    ]);

    let dataset = CatalogImporter::default()
        .import(catalog.path(), &MappingConfig::default())
        .unwrap();

    let sku = &dataset.skus[0];
    assert_eq!(sku.units_sold_total, 500.0);
    assert_eq!(sku.units_per_day_avg, 2.5);
    assert!(sku.is_vlm_eligible);
    assert!(dataset.order_lines.is_empty());
    assert!(dataset.batch.orders_file.is_none());
}

#[test]
fn test_dq_report_levels() {
    let catalog = write_csv(&[
        "Material,M3/UMB,KG/UMB",
        ",0.01,1",
        "A,0.01,1",
        "A,0.02,2",
        "B,0.01,",
    ]);
    let orders = write_csv(&[
        "Nro pedido,Codigo II - Producto,Cantidad unidades",
        "P1,A,-4",
        "P2,GHOST,1",
    ]);

    let dataset = CatalogImporter::default()
        .import_files(catalog.path(), Some(orders.path()), &MappingConfig::default())
        .unwrap();

    let ids: Vec<&str> = dataset.skus.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["A"]);
    assert_eq!(dataset.order_lines.len(), 1);
    assert_eq!(dataset.order_lines[0].sku_id, "GHOST");

    let errors: Vec<usize> = dataset
        .dq_report
        .violations
        .iter()
        .filter(|v| v.level == DqLevel::Error)
        .map(|v| v.row_number)
        .collect();
    assert!(errors.contains(&2));
    assert!(errors.contains(&5));
    // 目录第 2、5 行 + 订单第 2 行（行号相同但来源不同）
    assert_eq!(dataset.dq_report.blocked_rows, 3);
    assert_eq!(dataset.dq_report.warning_rows, 2);
}

#[test]
fn test_row_with_several_errors_blocked_once() {
    let catalog = write_csv(&["Material,M3/UMB,KG/UMB", "A,0.01,1", "C,,-1"]);

    let dataset = CatalogImporter::default()
        .import(catalog.path(), &MappingConfig::default())
        .unwrap();

    let row_three: Vec<&str> = dataset
        .dq_report
        .violations
        .iter()
        .filter(|v| v.row_number == 3)
        .map(|v| v.field.as_str())
        .collect();
    assert_eq!(row_three, vec!["weight", "volume"]);
    assert_eq!(dataset.dq_report.blocked_rows, 1);
    assert_eq!(dataset.skus.len(), 1);
}

#[test]
fn test_file_errors() {
    let importer = CatalogImporter::default();
    let mapping = MappingConfig::default();

    let missing = importer.import(Path::new("/nonexistent/catalog.csv"), &mapping);
    assert!(matches!(missing, Err(ImportError::FileNotFound(_))));

    let text = Builder::new().suffix(".txt").tempfile().unwrap();
    let unsupported = importer.import(text.path(), &mapping);
    assert!(matches!(unsupported, Err(ImportError::UnsupportedFormat(_))));
}

#[test]
fn test_non_numeric_weight_fails_with_row() {
    let catalog = write_csv(&["Material,M3/UMB,KG/UMB", "A,0.01,heavy"]);

    let err = CatalogImporter::default()
        .import(catalog.path(), &MappingConfig::default())
        .unwrap_err();

    assert!(matches!(err, ImportError::TypeConversionError { row: 2, .. }));
}
