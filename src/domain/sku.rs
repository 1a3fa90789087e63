// ==========================================
// 仓储货位规划引擎 - SKU 领域模型
// ==========================================
// 用途: 导入层写入,引擎层只读（各阶段返回标注后的新副本）
// ==========================================

use crate::domain::types::{AbcClass, AssignReason, DqLevel, DqSource};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ==========================================
// Sku - 货品主数据
// ==========================================
// 红线: volume / weight / units_per_day_avg >= 0
// 派生字段在对应阶段运行前为 None
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sku {
    // ===== 主键 =====
    pub id: String,          // SKU 唯一标识
    pub description: String, // 描述

    // ===== 物理属性 =====
    pub height: f64, // 高（m）
    pub width: f64,  // 宽（m）
    pub depth: f64,  // 深（m）
    pub volume: f64, // 单件体积（m³，缺省 = h×w×d）
    pub weight: f64, // 单件重量（kg）

    // ===== 需求属性 =====
    pub units_sold_total: f64,  // 历史累计销量
    pub units_per_day_avg: f64, // 日均需求

    // ===== 标志 =====
    pub is_sensitive: bool,    // 敏感品（强制隔离区）
    pub is_vlm_eligible: bool, // 满足 VLM 尺寸/重量约束

    // ===== 派生字段（阶段写入）=====
    #[serde(default)]
    pub abc_class: Option<AbcClass>, // ABC 分类器输出
    #[serde(default)]
    pub assigned_storage: Option<String>, // 宏观分配器输出
    #[serde(default)]
    pub assign_reason: Option<AssignReason>, // 分配原因（可解释性）
    #[serde(default)]
    pub cycle_volume: Option<f64>, // 补货周期体积
    #[serde(default)]
    pub cycle_weight: Option<f64>, // 补货周期重量
}

impl Sku {
    /// 以尺寸构造 SKU（体积 = h×w×d，需求为 0，无标志）
    pub fn new(id: &str, description: &str, height: f64, width: f64, depth: f64, weight: f64) -> Self {
        Self {
            id: id.to_string(),
            description: description.to_string(),
            height,
            width,
            depth,
            volume: height * width * depth,
            weight,
            units_sold_total: 0.0,
            units_per_day_avg: 0.0,
            is_sensitive: false,
            is_vlm_eligible: false,
            abc_class: None,
            assigned_storage: None,
            assign_reason: None,
            cycle_volume: None,
            cycle_weight: None,
        }
    }

    /// 设置需求属性
    pub fn with_demand(mut self, units_sold_total: f64, units_per_day_avg: f64) -> Self {
        self.units_sold_total = units_sold_total;
        self.units_per_day_avg = units_per_day_avg;
        self
    }

    /// 覆盖单件体积（源数据直接提供体积时）
    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = volume;
        self
    }

    pub fn with_flags(mut self, is_sensitive: bool, is_vlm_eligible: bool) -> Self {
        self.is_sensitive = is_sensitive;
        self.is_vlm_eligible = is_vlm_eligible;
        self
    }

    /// 单件底面积（m²）
    pub fn footprint(&self) -> f64 {
        self.width * self.depth
    }
}

// ==========================================
// OrderLine - 订单行
// ==========================================
// 用途: 仅用于统计订单规模与 SKU 频次,引擎不保留
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub order_id: String,
    pub sku_id: String,
    pub quantity: f64,
}

impl OrderLine {
    pub fn new(order_id: &str, sku_id: &str, quantity: f64) -> Self {
        Self {
            order_id: order_id.to_string(),
            sku_id: sku_id.to_string(),
            quantity,
        }
    }
}

// ==========================================
// RawSkuRecord - 导入中间结构体
// ==========================================
// 用途: 文件解析 → 字段映射 → 此结构 → 派生 → Sku
// 生命周期: 仅在导入流程内
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawSkuRecord {
    pub id: Option<String>,
    pub description: Option<String>,
    pub height: Option<f64>,
    pub width: Option<f64>,
    pub depth: Option<f64>,
    pub volume: Option<f64>,
    pub weight: Option<f64>,
    pub units_sold_total: Option<f64>,
    pub units_per_day_avg: Option<f64>,
    pub is_sensitive: Option<bool>,
    pub is_vlm_eligible: Option<bool>,

    // 元信息
    pub row_number: usize, // 原始文件行号（用于 DQ 报告）
}

// ==========================================
// DqViolation - 数据质量违规记录
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DqViolation {
    pub source: DqSource,       // 来源表
    pub row_number: usize,      // 原始文件行号
    pub sku_id: Option<String>, // SKU（如果可解析）
    pub level: DqLevel,         // 违规级别
    pub field: String,          // 违规字段
    pub message: String,        // 违规描述
}

// ==========================================
// DqReport - 数据质量报告
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DqReport {
    pub violations: Vec<DqViolation>,
    pub blocked_rows: usize, // 含 ERROR 的行数（按来源表 + 行号去重）
    pub warning_rows: usize, // 含 WARNING 的行数（同上）
    #[serde(skip)]
    counted: HashSet<(DqSource, usize, DqLevel)>,
}

impl DqReport {
    pub fn push(&mut self, violation: DqViolation) {
        let first_of_row = self
            .counted
            .insert((violation.source, violation.row_number, violation.level));
        if first_of_row {
            match violation.level {
                DqLevel::Error => self.blocked_rows += 1,
                DqLevel::Warning => self.warning_rows += 1,
                DqLevel::Info => {}
            }
        }
        self.violations.push(violation);
    }

    pub fn has_errors(&self) -> bool {
        self.blocked_rows > 0
    }
}

// ==========================================
// ImportBatch - 导入批次元信息
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportBatch {
    pub batch_id: String,               // 批次 ID（UUID）
    pub catalog_file: String,           // 目录源文件
    pub orders_file: Option<String>,    // 订单源文件
    pub catalog_rows: usize,            // 目录总行数
    pub sku_count: usize,               // 有效 SKU 数
    pub order_line_count: usize,        // 有效订单行数
    pub imported_at: DateTime<Utc>,     // 导入时间
    pub elapsed_ms: u64,                // 导入耗时（毫秒）
}
