// ==========================================
// 仓储货位规划引擎 - ABC 分类器
// ==========================================
// 职责: 按累计销量占比划分 A/B/C
// 规则: 累计 <= 80% → A, <= 95% → B, 其余 → C
// 输入: SKU 列表
// 输出: 同一集合的标注副本（保持输入顺序）
// ==========================================

use crate::domain::sku::Sku;
use crate::domain::types::AbcClass;
use tracing::{info, instrument};

pub const CLASS_A_CUTOFF: f64 = 0.80;
pub const CLASS_B_CUTOFF: f64 = 0.95;

// ==========================================
// AbcClassifier - ABC 分类器
// ==========================================
pub struct AbcClassifier {
    // 无状态引擎，不需要注入依赖
}

impl AbcClassifier {
    pub fn new() -> Self {
        Self {}
    }

    /// 分类并返回标注后的副本（与输入顺序一致）
    ///
    /// 总销量为 0 时全部判为 C；否则排名第一的 SKU 恒为 A。
    #[instrument(skip_all, fields(skus = skus.len()))]
    pub fn classify(&self, skus: &[Sku]) -> Vec<Sku> {
        let mut result = skus.to_vec();
        let ranking = self.rank(skus);
        let total: f64 = skus.iter().map(|s| s.units_sold_total).sum();

        if total <= 0.0 {
            for sku in result.iter_mut() {
                sku.abc_class = Some(AbcClass::C);
            }
            info!("总销量为 0，全部判为 C 类");
            return result;
        }

        let mut cumulative = 0.0;
        for (position, idx) in ranking.into_iter().enumerate() {
            cumulative += skus[idx].units_sold_total;
            // 排名第一的 SKU 恒为 A（即使其单独占比已越过 A 线）
            let class = if position == 0 {
                AbcClass::A
            } else {
                Self::class_for_share(cumulative / total)
            };
            result[idx].abc_class = Some(class);
        }

        let (a, b, c) = Self::count_classes(&result);
        info!(class_a = a, class_b = b, class_c = c, "ABC 分类完成");
        result
    }

    /// 排名：按 units_sold_total 降序,相同销量保持输入顺序
    ///
    /// # 返回
    /// 输入切片下标序列
    pub fn rank(&self, skus: &[Sku]) -> Vec<usize> {
        let mut order: Vec<usize> = (0..skus.len()).collect();
        // sort_by 为稳定排序
        order.sort_by(|&a, &b| skus[b].units_sold_total.total_cmp(&skus[a].units_sold_total));
        order
    }

    fn class_for_share(share: f64) -> AbcClass {
        if share <= CLASS_A_CUTOFF {
            AbcClass::A
        } else if share <= CLASS_B_CUTOFF {
            AbcClass::B
        } else {
            AbcClass::C
        }
    }

    fn count_classes(skus: &[Sku]) -> (usize, usize, usize) {
        skus.iter().fold((0, 0, 0), |(a, b, c), sku| match sku.abc_class {
            Some(AbcClass::A) => (a + 1, b, c),
            Some(AbcClass::B) => (a, b + 1, c),
            _ => (a, b, c + 1),
        })
    }
}

impl Default for AbcClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sku(id: &str, sold: f64) -> Sku {
        Sku::new(id, id, 0.1, 0.1, 0.1, 1.0).with_demand(sold, sold / 365.0)
    }

    #[test]
    fn test_basic_abc() {
        let classifier = AbcClassifier::new();
        let skus = vec![sku("A1", 700.0), sku("B1", 200.0), sku("C1", 100.0)];

        let result = classifier.classify(&skus);

        assert_eq!(result[0].abc_class, Some(AbcClass::A));
        assert_eq!(result[1].abc_class, Some(AbcClass::B));
        assert_eq!(result[2].abc_class, Some(AbcClass::C));
    }

    #[test]
    fn test_input_order_preserved() {
        let classifier = AbcClassifier::new();
        let skus = vec![sku("low", 100.0), sku("high", 700.0), sku("mid", 200.0)];

        let result = classifier.classify(&skus);

        let ids: Vec<&str> = result.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["low", "high", "mid"]);
        assert_eq!(result[0].abc_class, Some(AbcClass::C));
        assert_eq!(result[1].abc_class, Some(AbcClass::A));
        assert_eq!(result[2].abc_class, Some(AbcClass::B));
    }

    #[test]
    fn test_zero_total_all_c() {
        let classifier = AbcClassifier::new();
        let skus = vec![sku("X", 0.0), sku("Y", 0.0)];

        let result = classifier.classify(&skus);

        assert!(result.iter().all(|s| s.abc_class == Some(AbcClass::C)));
    }

    #[test]
    fn test_rank_ties_keep_input_order() {
        let classifier = AbcClassifier::new();
        let skus = vec![sku("first", 50.0), sku("top", 80.0), sku("second", 50.0)];

        assert_eq!(classifier.rank(&skus), vec![1, 0, 2]);
    }

    #[test]
    fn test_top_ranked_always_a() {
        // 单一 SKU 累计占比 100%,仍为 A
        let classifier = AbcClassifier::new();
        let result = classifier.classify(&[sku("only", 10.0)]);
        assert_eq!(result[0].abc_class, Some(AbcClass::A));

        let result = classifier.classify(&[sku("big", 960.0), sku("small", 40.0)]);
        assert_eq!(result[0].abc_class, Some(AbcClass::A));
        assert_eq!(result[1].abc_class, Some(AbcClass::C));
    }

    #[test]
    fn test_empty_input() {
        let classifier = AbcClassifier::new();
        assert!(classifier.classify(&[]).is_empty());
    }
}
