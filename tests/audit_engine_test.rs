// ==========================================
// 异常审计引擎集成测试
// ==========================================
// 场景: 超重 / 超体积 / B2B 大单 / 高频 SKU / 类别开关
// ==========================================

mod helpers;

use helpers::test_data_builder::{orders, SkuBuilder};
use warehouse_slotting::config::AuditConfig;
use warehouse_slotting::domain::OrderLine;
use warehouse_slotting::engine::{AuditEngine, EngineError};

#[test]
fn test_heavy_and_bulky_with_defaults() {
    let skus = vec![
        SkuBuilder::new("LIGHT").weight(2.0).build(),
        SkuBuilder::new("HEAVY").weight(30.0).build(),
        SkuBuilder::new("BULKY").volume(0.06).build(),
    ];

    let result = AuditEngine::new()
        .audit(&skus, &[], &AuditConfig::default())
        .unwrap();

    assert_eq!(result.heavy_skus.len(), 1);
    assert_eq!(result.heavy_skus[0].sku_id, "HEAVY");
    assert_eq!(result.heavy_skus[0].value, 30.0);
    assert_eq!(result.bulky_skus.len(), 1);
    assert_eq!(result.bulky_skus[0].sku_id, "BULKY");
    assert_eq!(result.total_skus, 3);
    assert_eq!(result.total_orders, 0);
    assert!(result.ubiquitous_skus.is_empty());
}

#[test]
fn test_massive_order_counts_distinct_lines() {
    let mut lines: Vec<OrderLine> = (0..51)
        .map(|i| OrderLine::new("BIG", &format!("S{}", i), 1.0))
        .collect();
    // 重复行不计入行数
    lines.push(OrderLine::new("BIG", "S0", 3.0));
    lines.extend((0..50).map(|i| OrderLine::new("EDGE", &format!("S{}", i), 1.0)));

    let config = AuditConfig {
        ubiquitous_enabled: false,
        ..AuditConfig::default()
    };
    let result = AuditEngine::new().audit(&[], &lines, &config).unwrap();

    assert_eq!(result.massive_orders.len(), 1);
    assert_eq!(result.massive_orders[0].order_id, "BIG");
    assert_eq!(result.massive_orders[0].value, 51);
    assert_eq!(result.massive_orders[0].units, 54.0);
}

#[test]
fn test_ubiquitous_frequency_threshold() {
    let skus = vec![SkuBuilder::new("X").build(), SkuBuilder::new("Y").build()];
    let mut spec: Vec<(String, Vec<&str>)> = (0..8).map(|i| (format!("P{}", i), vec!["Z"])).collect();
    spec.push(("P8".to_string(), vec!["X", "Y"]));
    spec.push(("P9".to_string(), vec!["X"]));
    let spec_refs: Vec<(&str, &[&str])> = spec.iter().map(|(o, s)| (o.as_str(), s.as_slice())).collect();

    let result = AuditEngine::new()
        .audit(&skus, &orders(&spec_refs), &AuditConfig::default())
        .unwrap();

    assert_eq!(result.total_orders, 10);
    assert_eq!(result.ubiquitous_skus.len(), 1);
    assert_eq!(result.ubiquitous_skus[0].sku_id, "X");
    assert_eq!(result.ubiquitous_skus[0].count, 2);
    assert!((result.ubiquitous_skus[0].value - 0.2).abs() < 1e-12);
}

#[test]
fn test_disabled_categories_are_empty() {
    let skus = vec![SkuBuilder::new("HEAVY").weight(300.0).volume(1.0).build()];
    let config = AuditConfig {
        heavy_enabled: false,
        bulky_enabled: false,
        ..AuditConfig::default()
    };

    let result = AuditEngine::new().audit(&skus, &[], &config).unwrap();

    assert!(result.heavy_skus.is_empty());
    assert!(result.bulky_skus.is_empty());
    assert!(result.is_clean());
}

#[test]
fn test_inverted_range_is_rejected_before_audit() {
    let config = AuditConfig {
        weight_min: 10.0,
        weight_max: 5.0,
        ..AuditConfig::default()
    };

    let err = AuditEngine::new().audit(&[], &[], &config).unwrap_err();
    assert!(matches!(err, EngineError::InvalidConfig { .. }));
}

#[test]
fn test_repeated_audit_is_identical() {
    let skus = vec![
        SkuBuilder::new("S1").build(),
        SkuBuilder::new("S2").build(),
        SkuBuilder::new("S3").build(),
        SkuBuilder::new("S4").build(),
        SkuBuilder::new("S5").build(),
        SkuBuilder::new("S6").build(),
        SkuBuilder::new("HEAVY").weight(30.0).build(),
        SkuBuilder::new("BULKY").volume(0.06).build(),
    ];
    let lines = orders(&[
        ("B1", &["S1", "S2", "S3", "S4"]),
        ("B2", &["S1", "S2", "S3", "S4", "S5"]),
        ("B3", &["S2", "S3", "S4", "S6"]),
        ("P1", &["S1", "HEAVY"]),
        ("P2", &["S1", "BULKY"]),
    ]);
    let config = AuditConfig {
        lines_threshold: 3,
        frequency_threshold: 0.5,
        ..AuditConfig::default()
    };

    let engine = AuditEngine::new();
    let first = engine.audit(&skus, &lines, &config).unwrap();
    let second = engine.audit(&skus, &lines, &config).unwrap();

    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );

    // 行数降序,同行数按首次出现
    let massive: Vec<&str> = first.massive_orders.iter().map(|o| o.order_id.as_str()).collect();
    assert_eq!(massive, vec!["B2", "B1", "B3"]);
    // S1 出现在 4/5 订单；S2/S3/S4 为 3/5,同频率按目录顺序
    let ubiquitous: Vec<&str> = first.ubiquitous_skus.iter().map(|u| u.sku_id.as_str()).collect();
    assert_eq!(ubiquitous, vec!["S1", "S2", "S3", "S4"]);
    assert_eq!(first.heavy_skus[0].sku_id, "HEAVY");
    assert_eq!(first.bulky_skus[0].sku_id, "BULKY");
}
