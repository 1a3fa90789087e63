// ==========================================
// 仓储货位规划引擎 - 字段派生服务实现
// ==========================================
// 职责: 体积 / 需求 / VLM 适配 缺省字段派生
// 规则: 源数据提供的值优先,仅在缺失时派生
// ==========================================

use crate::config::MappingConfig;
use crate::domain::sku::{RawSkuRecord, Sku};
use crate::importer::importer_trait::DerivationService as DerivationServiceTrait;
use std::collections::HashMap;

pub struct DerivationService;

impl DerivationServiceTrait for DerivationService {
    fn derive_sku(
        &self,
        record: &RawSkuRecord,
        demand_totals: &HashMap<String, f64>,
        mapping: &MappingConfig,
    ) -> Sku {
        let id = record.id.clone().unwrap_or_default();
        let height = record.height.unwrap_or(0.0);
        let width = record.width.unwrap_or(0.0);
        let depth = record.depth.unwrap_or(0.0);
        let weight = record.weight.unwrap_or(0.0);

        let volume = self.derive_volume(record);
        let units_sold_total = record
            .units_sold_total
            .unwrap_or_else(|| demand_totals.get(&id).copied().unwrap_or(0.0));
        let units_per_day_avg = record
            .units_per_day_avg
            .unwrap_or_else(|| self.derive_units_per_day(units_sold_total, mapping.demand_horizon_days));
        let is_vlm_eligible = record
            .is_vlm_eligible
            .unwrap_or_else(|| self.derive_vlm_eligible(record, mapping));

        Sku::new(
            &id,
            record.description.as_deref().unwrap_or(""),
            height,
            width,
            depth,
            weight,
        )
        .with_volume(volume)
        .with_demand(units_sold_total, units_per_day_avg)
        .with_flags(record.is_sensitive.unwrap_or(false), is_vlm_eligible)
    }
}

impl DerivationService {
    /// 体积 = 源体积，缺失时 h × w × d
    ///
    /// # 规则
    /// - 任一尺寸缺失且无源体积 → 0
    pub fn derive_volume(&self, record: &RawSkuRecord) -> f64 {
        match (record.volume, record.height, record.width, record.depth) {
            (Some(volume), _, _, _) => volume,
            (None, Some(h), Some(w), Some(d)) => h * w * d,
            _ => 0.0,
        }
    }

    /// 日均需求 = 累计销量 / 统计天数
    pub fn derive_units_per_day(&self, units_sold_total: f64, horizon_days: f64) -> f64 {
        if horizon_days > 0.0 {
            units_sold_total / horizon_days
        } else {
            0.0
        }
    }

    /// VLM 适配 = 重量 < 上限 且 三个尺寸均 < 上限
    ///
    /// # 规则
    /// - 尺寸缺失时无法判定 → 不适配
    pub fn derive_vlm_eligible(&self, record: &RawSkuRecord, mapping: &MappingConfig) -> bool {
        match (record.weight, record.height, record.width, record.depth) {
            (Some(weight), Some(h), Some(w), Some(d)) => {
                weight < mapping.vlm_max_weight
                    && h < mapping.vlm_max_height
                    && w < mapping.vlm_max_width
                    && d < mapping.vlm_max_depth
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(h: f64, w: f64, d: f64, weight: f64) -> RawSkuRecord {
        RawSkuRecord {
            id: Some("ELE-001".to_string()),
            height: Some(h),
            width: Some(w),
            depth: Some(d),
            weight: Some(weight),
            row_number: 2,
            ..Default::default()
        }
    }

    #[test]
    fn test_volume_from_dimensions() {
        let service = DerivationService;
        let rec = record(0.5, 0.2, 0.1, 1.0);
        assert!((service.derive_volume(&rec) - 0.01).abs() < 1e-12);

        let supplied = RawSkuRecord {
            volume: Some(0.3),
            ..rec
        };
        assert_eq!(service.derive_volume(&supplied), 0.3);
    }

    #[test]
    fn test_vlm_eligibility_bounds() {
        let service = DerivationService;
        let mapping = MappingConfig::default();

        assert!(service.derive_vlm_eligible(&record(0.29, 0.54, 0.34, 24.9), &mapping));
        assert!(!service.derive_vlm_eligible(&record(0.30, 0.2, 0.2, 1.0), &mapping));
        assert!(!service.derive_vlm_eligible(&record(0.1, 0.1, 0.1, 25.0), &mapping));

        let no_dims = RawSkuRecord {
            height: None,
            ..record(0.1, 0.1, 0.1, 1.0)
        };
        assert!(!service.derive_vlm_eligible(&no_dims, &mapping));
    }

    #[test]
    fn test_demand_from_order_totals() {
        let service = DerivationService;
        let mapping = MappingConfig::default();
        let totals: HashMap<String, f64> = [("ELE-001".to_string(), 730.0)].into_iter().collect();

        let sku = service.derive_sku(&record(0.1, 0.1, 0.1, 1.0), &totals, &mapping);

        assert_eq!(sku.units_sold_total, 730.0);
        assert_eq!(sku.units_per_day_avg, 2.0);
        assert!(sku.is_vlm_eligible);
        assert!(!sku.is_sensitive);
    }

    #[test]
    fn test_supplied_demand_wins() {
        let service = DerivationService;
        let mapping = MappingConfig::default();
        let rec = RawSkuRecord {
            units_sold_total: Some(10.0),
            units_per_day_avg: Some(0.5),
            is_vlm_eligible: Some(false),
            ..record(0.1, 0.1, 0.1, 1.0)
        };
        let totals: HashMap<String, f64> = [("ELE-001".to_string(), 730.0)].into_iter().collect();

        let sku = service.derive_sku(&rec, &totals, &mapping);

        assert_eq!(sku.units_sold_total, 10.0);
        assert_eq!(sku.units_per_day_avg, 0.5);
        assert!(!sku.is_vlm_eligible);
    }
}
