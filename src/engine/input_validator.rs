// ==========================================
// 仓储货位规划引擎 - 引擎入口数据校验
// ==========================================
// 职责: 各阶段计算前的快速失败校验
// 红线: 数值字段必须有限且 >= 0,缺失/非法不按 0 处理
// ==========================================

use crate::domain::sku::{OrderLine, Sku};
use crate::engine::error::{EngineError, EngineResult};
use std::collections::HashSet;

/// 校验 SKU 列表（主键非空且唯一,数值有限且非负）
pub fn validate_skus(skus: &[Sku]) -> EngineResult<()> {
    let mut seen = HashSet::with_capacity(skus.len());

    for sku in skus {
        if sku.id.trim().is_empty() {
            return Err(EngineError::invalid_sku("", "id", "主键为空"));
        }
        if !seen.insert(sku.id.as_str()) {
            return Err(EngineError::DuplicateSku(sku.id.clone()));
        }

        for (field, value) in [
            ("height", sku.height),
            ("width", sku.width),
            ("depth", sku.depth),
            ("volume", sku.volume),
            ("weight", sku.weight),
            ("units_sold_total", sku.units_sold_total),
            ("units_per_day_avg", sku.units_per_day_avg),
        ] {
            if !value.is_finite() {
                return Err(EngineError::invalid_sku(&sku.id, field, format!("非有限数值: {}", value)));
            }
            if value < 0.0 {
                return Err(EngineError::invalid_sku(&sku.id, field, format!("负数: {}", value)));
            }
        }
    }

    Ok(())
}

/// 校验订单行（订单号/SKU 非空,数量有限且非负）
pub fn validate_order_lines(lines: &[OrderLine]) -> EngineResult<()> {
    for line in lines {
        if line.order_id.trim().is_empty() {
            return Err(EngineError::InvalidOrderLine {
                order_id: String::new(),
                field: "order_id".to_string(),
                message: format!("订单号为空 (sku={})", line.sku_id),
            });
        }
        if line.sku_id.trim().is_empty() {
            return Err(EngineError::InvalidOrderLine {
                order_id: line.order_id.clone(),
                field: "sku_id".to_string(),
                message: "SKU 为空".to_string(),
            });
        }
        if !line.quantity.is_finite() || line.quantity < 0.0 {
            return Err(EngineError::InvalidOrderLine {
                order_id: line.order_id.clone(),
                field: "quantity".to_string(),
                message: format!("数量非法: {}", line.quantity),
            });
        }
    }
    Ok(())
}
