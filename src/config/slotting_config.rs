// ==========================================
// 仓储货位规划引擎 - 配置对象
// ==========================================
// 职责: 审计阈值 / 宏观分区 / 微观布局 / 列映射 四组配置
// 存储: JSON 文件（字段缺省走 serde default）
// ==========================================

use crate::domain::storage::StorageType;
use crate::domain::types::ClusteringMethod;
use crate::engine::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};

// ==========================================
// SlottingConfig - 总配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SlottingConfig {
    pub audit: AuditConfig,
    #[serde(rename = "macro")]
    pub macro_slotting: MacroConfig,
    pub micro: MicroConfig,
    pub mapping: MappingConfig,
}

impl SlottingConfig {
    /// 校验全部配置（在任何计算开始前调用）
    pub fn validate(&self) -> EngineResult<()> {
        self.audit.validate()?;
        self.macro_slotting.validate()?;
        self.micro.validate()?;
        if self.mapping.demand_horizon_days <= 0.0 {
            return Err(EngineError::invalid_config(
                "mapping.demand_horizon_days",
                format!("必须 > 0，实际 {}", self.mapping.demand_horizon_days),
            ));
        }
        Ok(())
    }
}

// ==========================================
// AuditConfig - 异常审计阈值
// ==========================================
// 每个类别独立开关; 关闭的类别输出为空
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    pub heavy_enabled: bool,
    pub weight_min: f64,
    pub weight_max: f64,

    pub bulky_enabled: bool,
    pub volume_min: f64,
    pub volume_max: f64,

    pub massive_enabled: bool,
    pub lines_threshold: usize,

    pub ubiquitous_enabled: bool,
    pub frequency_threshold: f64,

    /// 宏观分区前是否排除被标记的 SKU/订单
    pub exclude_outliers: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            heavy_enabled: true,
            weight_min: 0.0,
            weight_max: 25.0,
            bulky_enabled: true,
            volume_min: 0.0,
            volume_max: 0.05,
            massive_enabled: true,
            lines_threshold: 50,
            ubiquitous_enabled: true,
            frequency_threshold: 0.15,
            exclude_outliers: true,
        }
    }
}

impl AuditConfig {
    pub fn validate(&self) -> EngineResult<()> {
        if self.weight_min > self.weight_max {
            return Err(EngineError::invalid_config(
                "audit.weight_min",
                format!("区间倒置 [{}, {}]", self.weight_min, self.weight_max),
            ));
        }
        if self.volume_min > self.volume_max {
            return Err(EngineError::invalid_config(
                "audit.volume_min",
                format!("区间倒置 [{}, {}]", self.volume_min, self.volume_max),
            ));
        }
        if !(0.0..=1.0).contains(&self.frequency_threshold) {
            return Err(EngineError::invalid_config(
                "audit.frequency_threshold",
                format!("必须位于 [0, 1]，实际 {}", self.frequency_threshold),
            ));
        }
        Ok(())
    }
}

// ==========================================
// MacroConfig - 宏观分区
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MacroConfig {
    pub coverage_days: f64,       // 补货覆盖天数
    pub utilization_target: f64,  // 容量利用率上限（留余量）
    pub dense_storage_id: String, // VLM 存储类型 ID
    pub isolation_storage_id: String, // 敏感品隔离存储类型 ID
    pub storage_types: Vec<StorageType>,
}

impl Default for MacroConfig {
    fn default() -> Self {
        Self {
            coverage_days: 15.0,
            utilization_target: 0.8,
            dense_storage_id: "vlm".to_string(),
            isolation_storage_id: "jaula".to_string(),
            storage_types: StorageType::defaults(),
        }
    }
}

impl MacroConfig {
    pub fn validate(&self) -> EngineResult<()> {
        if self.storage_types.is_empty() {
            return Err(EngineError::EmptyStorageTypes);
        }
        if !(self.coverage_days.is_finite() && self.coverage_days > 0.0) {
            return Err(EngineError::invalid_config(
                "macro.coverage_days",
                format!("必须 > 0，实际 {}", self.coverage_days),
            ));
        }
        if !(self.utilization_target > 0.0 && self.utilization_target <= 1.0) {
            return Err(EngineError::invalid_config(
                "macro.utilization_target",
                format!("必须位于 (0, 1]，实际 {}", self.utilization_target),
            ));
        }
        for st in &self.storage_types {
            if st.id.trim().is_empty() {
                return Err(EngineError::invalid_config("macro.storage_types.id", "存储类型 ID 为空"));
            }
            if !(st.max_volume.is_finite() && st.max_volume > 0.0) {
                return Err(EngineError::invalid_config(
                    "macro.storage_types.max_volume",
                    format!("{} 的体积上限必须 > 0，实际 {}", st.id, st.max_volume),
                ));
            }
            if !(st.max_weight.is_finite() && st.max_weight >= 0.0) {
                return Err(EngineError::invalid_config(
                    "macro.storage_types.max_weight",
                    format!("{} 的重量上限必须 >= 0，实际 {}", st.id, st.max_weight),
                ));
            }
        }
        Ok(())
    }
}

// ==========================================
// MicroConfig - VLM 微观布局
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MicroConfig {
    pub vlm_count: usize,
    pub trays_per_vlm: usize, // 每台 VLM 托盘目标数
    pub tray_width: f64,
    pub tray_depth: f64,
    pub tray_height: f64, // 平均可用高度（托盘有效体积 = 宽 × 深 × 高）
    pub tray_max_weight: f64,
    pub replication_factor: usize,

    // ===== 亲和聚类 =====
    pub clustering_method: ClusteringMethod,
    pub affinity_threshold: f64,
    pub top_k: usize,

    /// 是否纳入零周转 SKU
    pub include_zero_rotation: bool,
}

impl Default for MicroConfig {
    fn default() -> Self {
        Self {
            vlm_count: 4,
            trays_per_vlm: 50,
            tray_width: 0.6,
            tray_depth: 0.4,
            tray_height: 0.3,
            tray_max_weight: 80.0,
            replication_factor: 2,
            clustering_method: ClusteringMethod::Jaccard,
            affinity_threshold: 0.15,
            top_k: 30,
            include_zero_rotation: false,
        }
    }
}

impl MicroConfig {
    pub fn validate(&self) -> EngineResult<()> {
        if self.vlm_count == 0 {
            return Err(EngineError::invalid_config("micro.vlm_count", "VLM 数量必须 >= 1"));
        }
        if self.trays_per_vlm == 0 {
            return Err(EngineError::invalid_config("micro.trays_per_vlm", "托盘目标数必须 >= 1"));
        }
        if self.replication_factor == 0 {
            return Err(EngineError::invalid_config(
                "micro.replication_factor",
                "复制因子必须 >= 1",
            ));
        }
        for (field, value) in [
            ("micro.tray_width", self.tray_width),
            ("micro.tray_depth", self.tray_depth),
            ("micro.tray_height", self.tray_height),
            ("micro.tray_max_weight", self.tray_max_weight),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(EngineError::invalid_config(field, format!("必须 > 0，实际 {}", value)));
            }
        }
        if !(0.0..=1.0).contains(&self.affinity_threshold) {
            return Err(EngineError::invalid_config(
                "micro.affinity_threshold",
                format!("必须位于 [0, 1]，实际 {}", self.affinity_threshold),
            ));
        }
        Ok(())
    }

    /// 托盘有效体积
    pub fn tray_volume(&self) -> f64 {
        self.tray_width * self.tray_depth * self.tray_height
    }

    /// 托盘底面积
    pub fn tray_area(&self) -> f64 {
        self.tray_width * self.tray_depth
    }
}

// ==========================================
// MappingConfig - 源文件工作表/列映射
// ==========================================
// 用途: 导入层一次性归一化,引擎内部只用规范字段名
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingConfig {
    // ===== 目录表 =====
    pub sheet_catalog: String,
    pub col_sku: String,
    pub col_description: String,
    pub col_volume: String,
    pub col_weight: String,
    pub col_height: String,
    pub col_width: String,
    pub col_depth: String,
    pub col_units_sold: String,
    pub col_units_per_day: String,
    pub col_sensitive: String,
    pub col_vlm_eligible: String,

    // ===== 订单表 =====
    pub sheet_orders: String,
    pub col_order_id: String,
    pub col_order_sku: String,
    pub col_order_qty: String,

    // ===== 派生参数 =====
    /// 订单数据覆盖的天数（由订单推导日均需求时使用）
    pub demand_horizon_days: f64,
    /// VLM 准入上限（源数据未给出 VLM 标志时派生）
    pub vlm_max_weight: f64,
    pub vlm_max_height: f64,
    pub vlm_max_width: f64,
    pub vlm_max_depth: f64,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            sheet_catalog: "Base Cód.".to_string(),
            col_sku: "Material".to_string(),
            col_description: "Descripción".to_string(),
            col_volume: "M3/UMB".to_string(),
            col_weight: "KG/UMB".to_string(),
            col_height: "Alto".to_string(),
            col_width: "Ancho".to_string(),
            col_depth: "Largo".to_string(),
            col_units_sold: "Unidades vendidas".to_string(),
            col_units_per_day: "Unidades/día".to_string(),
            col_sensitive: "Sensible".to_string(),
            col_vlm_eligible: "Apto VLM".to_string(),
            sheet_orders: "Pedidos".to_string(),
            col_order_id: "Nro pedido".to_string(),
            col_order_sku: "Codigo II - Producto".to_string(),
            col_order_qty: "Cantidad unidades".to_string(),
            demand_horizon_days: 365.0,
            vlm_max_weight: 25.0,
            vlm_max_height: 0.30,
            vlm_max_width: 0.55,
            vlm_max_depth: 0.35,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SlottingConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{ "macro": { "coverage_days": 20 }, "micro": { "vlm_count": 2 } }"#;
        let config: SlottingConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.macro_slotting.coverage_days, 20.0);
        assert_eq!(config.macro_slotting.utilization_target, 0.8);
        assert_eq!(config.micro.vlm_count, 2);
        assert_eq!(config.micro.tray_max_weight, 80.0);
        assert_eq!(config.audit.lines_threshold, 50);
    }

    #[test]
    fn test_empty_storage_types_rejected() {
        let mut config = SlottingConfig::default();
        config.macro_slotting.storage_types.clear();
        assert!(matches!(config.validate(), Err(EngineError::EmptyStorageTypes)));
    }

    #[test]
    fn test_zero_vlm_rejected() {
        let mut config = SlottingConfig::default();
        config.micro.vlm_count = 0;
        assert!(matches!(
            config.validate(),
            Err(EngineError::InvalidConfig { ref field, .. }) if field == "micro.vlm_count"
        ));
    }

    #[test]
    fn test_non_positive_tray_dimension_rejected() {
        let mut config = MicroConfig::default();
        config.tray_depth = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_inverted_weight_range_rejected() {
        let config = AuditConfig {
            weight_min: 30.0,
            weight_max: 25.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_tray_volume() {
        let config = MicroConfig::default();
        assert!((config.tray_volume() - 0.072).abs() < 1e-12);
        assert!((config.tray_area() - 0.24).abs() < 1e-12);
    }
}
