// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

use warehouse_slotting::domain::{OrderLine, Sku, StorageType};

// ==========================================
// Sku 构建器
// ==========================================

pub struct SkuBuilder {
    id: String,
    description: String,
    height: f64,
    width: f64,
    depth: f64,
    weight: f64,
    volume: Option<f64>,
    units_sold_total: f64,
    units_per_day_avg: f64,
    is_sensitive: bool,
    is_vlm_eligible: bool,
}

impl SkuBuilder {
    /// 默认: 0.1 m 立方体、1 kg、VLM 适配、无需求
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            description: format!("SKU {}", id),
            height: 0.1,
            width: 0.1,
            depth: 0.1,
            weight: 1.0,
            volume: None,
            units_sold_total: 0.0,
            units_per_day_avg: 0.0,
            is_sensitive: false,
            is_vlm_eligible: true,
        }
    }

    pub fn dims(mut self, height: f64, width: f64, depth: f64) -> Self {
        self.height = height;
        self.width = width;
        self.depth = depth;
        self
    }

    pub fn weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn volume(mut self, volume: f64) -> Self {
        self.volume = Some(volume);
        self
    }

    /// 累计销量（日均按 365 天折算）
    pub fn sold(mut self, units_sold_total: f64) -> Self {
        self.units_sold_total = units_sold_total;
        self.units_per_day_avg = units_sold_total / 365.0;
        self
    }

    pub fn per_day(mut self, units_per_day_avg: f64) -> Self {
        self.units_per_day_avg = units_per_day_avg;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.is_sensitive = true;
        self
    }

    pub fn not_vlm(mut self) -> Self {
        self.is_vlm_eligible = false;
        self
    }

    pub fn build(self) -> Sku {
        let sku = Sku::new(
            &self.id,
            &self.description,
            self.height,
            self.width,
            self.depth,
            self.weight,
        )
        .with_demand(self.units_sold_total, self.units_per_day_avg)
        .with_flags(self.is_sensitive, self.is_vlm_eligible);

        match self.volume {
            Some(volume) => sku.with_volume(volume),
            None => sku,
        }
    }
}

// ==========================================
// 订单行构建
// ==========================================

/// 每个订单一组 SKU，数量均为 1
pub fn orders(spec: &[(&str, &[&str])]) -> Vec<OrderLine> {
    spec.iter()
        .flat_map(|(order_id, skus)| skus.iter().map(move |sku_id| OrderLine::new(order_id, sku_id, 1.0)))
        .collect()
}

/// 单个存储类型
pub fn storage(id: &str, priority: i32, max_volume: f64) -> StorageType {
    StorageType::new(id, id, priority, max_volume, 10_000.0)
}
