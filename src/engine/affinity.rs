// ==========================================
// 仓储货位规划引擎 - 亲和分组引擎
// ==========================================
// 职责: 基于订单共现把 VLM SKU 划分为定长亲和组
// 相似度: Jaccard |A∩B| / |A∪B| 或 Cosine |A∩B| / √(|A|·|B|)
// 红线: 分组确定性（同需求按输入顺序）,无随机
// ==========================================

use crate::config::MicroConfig;
use crate::domain::sku::{OrderLine, Sku};
use crate::domain::types::ClusteringMethod;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, instrument};

/// 亲和组
#[derive(Debug, Clone, PartialEq)]
pub struct AffinityGroup {
    pub id: String,
    pub members: Vec<usize>, // 输入 SKU 切片下标（加入顺序）
}

// ==========================================
// AffinityGrouper - 亲和分组引擎
// ==========================================
pub struct AffinityGrouper {
    method: ClusteringMethod,
    threshold: f64,
    top_k: usize,
}

impl AffinityGrouper {
    pub fn new(method: ClusteringMethod, threshold: f64, top_k: usize) -> Self {
        Self {
            method,
            threshold,
            top_k,
        }
    }

    pub fn from_config(config: &MicroConfig) -> Self {
        Self::new(config.clustering_method, config.affinity_threshold, config.top_k)
    }

    /// 组大小 = max(3, SKU 数 / (VLM 数 × 每台托盘目标数))
    pub fn group_size(sku_count: usize, vlm_count: usize, trays_per_vlm: usize) -> usize {
        let slots = vlm_count.saturating_mul(trays_per_vlm).max(1);
        (sku_count / slots).max(3)
    }

    /// 分组
    ///
    /// 贪心生长：
    /// 1) 种子 = 需求最高的未分配 SKU
    /// 2) 依次加入与组内成员相似度之和最大的未分配邻居
    /// 3) 无邻居可用时按需求顺序补位
    ///
    /// 无订单数据时退化为按需求排序的连续切块。
    #[instrument(skip(self, skus, order_lines), fields(skus = skus.len(), method = %self.method))]
    pub fn group(&self, skus: &[Sku], order_lines: &[OrderLine], group_size: usize) -> Vec<AffinityGroup> {
        let n = skus.len();
        if n == 0 {
            return Vec::new();
        }
        let group_size = group_size.max(1);

        let demand_order = Self::demand_order(skus);
        let mut rank_of = vec![0usize; n];
        for (position, &idx) in demand_order.iter().enumerate() {
            rank_of[idx] = position;
        }

        let neighbours = self.neighbours(skus, order_lines);

        let mut assigned = vec![false; n];
        let mut cursor = 0;
        let mut groups = Vec::new();

        while let Some(seed) = Self::next_unassigned(&demand_order, &assigned, &mut cursor) {
            let mut members = vec![seed];
            assigned[seed] = true;

            let mut scores: HashMap<usize, f64> = HashMap::new();
            Self::accumulate(&mut scores, &neighbours[seed], &assigned);

            while members.len() < group_size {
                let next = Self::best_candidate(&scores, &assigned, &rank_of)
                    .or_else(|| Self::next_unassigned(&demand_order, &assigned, &mut cursor));
                let Some(next) = next else { break };

                members.push(next);
                assigned[next] = true;
                scores.remove(&next);
                Self::accumulate(&mut scores, &neighbours[next], &assigned);
            }

            let id = format!("G-{}", groups.len() + 1);
            debug!(group_id = %id, members = members.len(), "亲和组完成");
            groups.push(AffinityGroup { id, members });
        }

        info!(groups = groups.len(), group_size, "亲和分组完成");
        groups
    }

    // ==========================================
    // 辅助方法
    // ==========================================

    /// 按日均需求降序（同需求保持输入顺序）
    fn demand_order(skus: &[Sku]) -> Vec<usize> {
        let mut order: Vec<usize> = (0..skus.len()).collect();
        order.sort_by(|&a, &b| skus[b].units_per_day_avg.total_cmp(&skus[a].units_per_day_avg));
        order
    }

    fn next_unassigned(demand_order: &[usize], assigned: &[bool], cursor: &mut usize) -> Option<usize> {
        while *cursor < demand_order.len() {
            let idx = demand_order[*cursor];
            if !assigned[idx] {
                return Some(idx);
            }
            *cursor += 1;
        }
        None
    }

    fn accumulate(scores: &mut HashMap<usize, f64>, neighbours: &[(usize, f64)], assigned: &[bool]) {
        for &(other, similarity) in neighbours {
            if !assigned[other] {
                *scores.entry(other).or_insert(0.0) += similarity;
            }
        }
    }

    /// 得分最高的候选；同分取需求排名靠前者
    fn best_candidate(scores: &HashMap<usize, f64>, assigned: &[bool], rank_of: &[usize]) -> Option<usize> {
        scores
            .iter()
            .filter(|(idx, _)| !assigned[**idx])
            .max_by(|(a, sa), (b, sb)| sa.total_cmp(sb).then_with(|| rank_of[**b].cmp(&rank_of[**a])))
            .map(|(idx, _)| *idx)
    }

    /// 每个 SKU 的 top_k 邻居（相似度 >= 阈值,降序）
    fn neighbours(&self, skus: &[Sku], order_lines: &[OrderLine]) -> Vec<Vec<(usize, f64)>> {
        let n = skus.len();
        let index_of: HashMap<&str, usize> = skus.iter().enumerate().map(|(i, s)| (s.id.as_str(), i)).collect();

        // 订单 → SKU 集合（仅限本次参与分组的 SKU）
        let mut order_members: HashMap<&str, HashSet<usize>> = HashMap::new();
        for line in order_lines {
            if let Some(&idx) = index_of.get(line.sku_id.as_str()) {
                order_members.entry(line.order_id.as_str()).or_default().insert(idx);
            }
        }

        let mut order_counts = vec![0usize; n];
        let mut co_occurrence: Vec<HashMap<usize, usize>> = vec![HashMap::new(); n];
        for members in order_members.values() {
            let members: Vec<usize> = members.iter().copied().collect();
            for (pos, &a) in members.iter().enumerate() {
                order_counts[a] += 1;
                for &b in &members[pos + 1..] {
                    *co_occurrence[a].entry(b).or_insert(0) += 1;
                    *co_occurrence[b].entry(a).or_insert(0) += 1;
                }
            }
        }

        co_occurrence
            .iter()
            .enumerate()
            .map(|(a, pairs)| {
                let mut list: Vec<(usize, f64)> = pairs
                    .iter()
                    .map(|(&b, &shared)| (b, self.similarity(shared, order_counts[a], order_counts[b])))
                    .filter(|&(_, similarity)| similarity > 0.0 && similarity >= self.threshold)
                    .collect();
                list.sort_by(|x, y| y.1.total_cmp(&x.1).then(x.0.cmp(&y.0)));
                list.truncate(self.top_k);
                list
            })
            .collect()
    }

    fn similarity(&self, shared: usize, count_a: usize, count_b: usize) -> f64 {
        if shared == 0 || count_a == 0 || count_b == 0 {
            return 0.0;
        }
        match self.method {
            ClusteringMethod::Jaccard => shared as f64 / (count_a + count_b - shared) as f64,
            ClusteringMethod::Cosine => shared as f64 / ((count_a * count_b) as f64).sqrt(),
        }
    }
}

impl Default for AffinityGrouper {
    fn default() -> Self {
        Self::from_config(&MicroConfig::default())
    }
}
