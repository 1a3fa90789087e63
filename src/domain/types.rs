// ==========================================
// 仓储货位规划引擎 - 领域类型定义
// ==========================================
// 职责: 分类等级、审计类别、分配原因、聚类方法等枚举
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// ABC 分类等级
// ==========================================
// 顺序: A < B < C（A 为高周转）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AbcClass {
    A, // 累计占比 <= 80%
    B, // 累计占比 <= 95%
    C, // 其余
}

impl fmt::Display for AbcClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbcClass::A => write!(f, "A"),
            AbcClass::B => write!(f, "B"),
            AbcClass::C => write!(f, "C"),
        }
    }
}

// ==========================================
// 审计类别 (Audit Category)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditCategory {
    Heavy,         // 超重 SKU
    Bulky,         // 超体积 SKU
    MassiveOrders, // B2B 大单
    Ubiquitous,    // 高频 SKU
}

impl fmt::Display for AuditCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditCategory::Heavy => write!(f, "heavy_skus"),
            AuditCategory::Bulky => write!(f, "bulky_skus"),
            AuditCategory::MassiveOrders => write!(f, "massive_orders"),
            AuditCategory::Ubiquitous => write!(f, "ubiquitous_skus"),
        }
    }
}

// ==========================================
// 分配原因 (Assign Reason)
// ==========================================
// 序列化格式: SCREAMING_SNAKE_CASE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignReason {
    Fitted,         // 容量内首次适配
    ForcedIsolation, // 敏感品强制隔离
    Overflow,       // 无可用容量，溢出到最后一级
}

impl fmt::Display for AssignReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignReason::Fitted => write!(f, "FITTED"),
            AssignReason::ForcedIsolation => write!(f, "FORCED_ISOLATION"),
            AssignReason::Overflow => write!(f, "OVERFLOW"),
        }
    }
}

// ==========================================
// 相似度方法 (Clustering Method)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusteringMethod {
    #[default]
    Jaccard, // |A∩B| / |A∪B|
    Cosine,  // |A∩B| / sqrt(|A|·|B|)
}

impl fmt::Display for ClusteringMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClusteringMethod::Jaccard => write!(f, "jaccard"),
            ClusteringMethod::Cosine => write!(f, "cosine"),
        }
    }
}

// ==========================================
// 数据质量等级 (DQ Level)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DqLevel {
    Error,   // 阻断
    Warning, // 警告（保留）
    Info,    // 提示
}

impl fmt::Display for DqLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DqLevel::Error => write!(f, "ERROR"),
            DqLevel::Warning => write!(f, "WARNING"),
            DqLevel::Info => write!(f, "INFO"),
        }
    }
}

// ==========================================
// 数据质量来源表 (DQ Source)
// ==========================================
// 目录与订单行号各自从 2 开始,统计阻断行时需区分来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DqSource {
    Catalog,
    Orders,
}

impl fmt::Display for DqSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DqSource::Catalog => write!(f, "catalog"),
            DqSource::Orders => write!(f, "orders"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abc_class_order() {
        assert!(AbcClass::A < AbcClass::B);
        assert!(AbcClass::B < AbcClass::C);
    }

    #[test]
    fn test_clustering_method_serde() {
        let method: ClusteringMethod = serde_json::from_str("\"cosine\"").unwrap();
        assert_eq!(method, ClusteringMethod::Cosine);
        assert_eq!(ClusteringMethod::Jaccard.to_string(), "jaccard");
    }

    #[test]
    fn test_assign_reason_serde() {
        let json = serde_json::to_string(&AssignReason::ForcedIsolation).unwrap();
        assert_eq!(json, "\"FORCED_ISOLATION\"");
    }
}
