// ==========================================
// 仓储货位规划引擎 - 微观装盘引擎
// ==========================================
// 职责: VLM SKU → 亲和组 → 托盘 → 多机复制
// 状态机: 开放托盘(累加) → 关闭托盘(超容量,复制) → ... → 组耗尽
// 红线: 关闭托盘的体积/重量填充率 <= 100%
// 红线: 每组托盘恰好出现在 R = min(replication_factor, vlm_count) 台 VLM
// ==========================================

use crate::config::MicroConfig;
use crate::domain::sku::{OrderLine, Sku};
use crate::domain::slotting::{MicroResult, Tray, TraySku, UnplacedSku};
use crate::engine::affinity::{AffinityGroup, AffinityGrouper};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::input_validator::validate_skus;
use crate::engine::round_to;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, instrument, warn};

// 浮点容差（容量比较）
const CAPACITY_EPSILON: f64 = 1e-9;

// ==========================================
// LogicalTray - 逻辑托盘（复制前）
// ==========================================
#[derive(Debug, Default)]
struct LogicalTray {
    group_id: String,
    lines: Vec<TraySku>,
    volume: f64,
    weight: f64,
    footprint: f64, // 堆叠列底面积之和
}

impl LogicalTray {
    fn open(group_id: &str) -> Self {
        Self {
            group_id: group_id.to_string(),
            ..Default::default()
        }
    }

    fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

// ==========================================
// PackState - 单次装盘的运行状态
// ==========================================
struct PackState<'a> {
    config: &'a MicroConfig,
    replicas: usize,
    trays_per_vlm: Vec<Vec<Tray>>,
    logical_trays: Vec<LogicalTray>,
    next_tray_seq: usize,
}

impl<'a> PackState<'a> {
    fn new(config: &'a MicroConfig, replicas: usize) -> Self {
        Self {
            config,
            replicas,
            trays_per_vlm: vec![Vec::new(); config.vlm_count],
            logical_trays: Vec::new(),
            next_tray_seq: 1,
        }
    }

    /// 托盘数最少的 R 台 VLM（同托盘数取序号小者）
    fn least_loaded_vlms(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.trays_per_vlm.len()).collect();
        order.sort_by_key(|&vlm| (self.trays_per_vlm[vlm].len(), vlm));
        order.truncate(self.replicas);
        order
    }

    /// 关闭托盘：复制到每台目标 VLM,每个副本独立 ID
    fn close(&mut self, tray: LogicalTray, targets: &[usize]) {
        if tray.is_empty() {
            return;
        }
        let volume_fill = round_to(tray.volume / self.config.tray_volume() * 100.0, 1);
        let weight_fill = round_to(tray.weight / self.config.tray_max_weight * 100.0, 1);

        for &vlm in targets {
            let id = format!("T-{}", self.next_tray_seq);
            self.next_tray_seq += 1;
            self.trays_per_vlm[vlm].push(Tray {
                id,
                vlm_id: vlm,
                group_id: tray.group_id.clone(),
                skus: tray.lines.clone(),
                volume_fill,
                weight_fill,
            });
        }
        debug!(group_id = %tray.group_id, volume_fill, weight_fill, replicas = targets.len(), "托盘关闭");
        self.logical_trays.push(tray);
    }
}

// ==========================================
// MicroPacker - 微观装盘引擎
// ==========================================
pub struct MicroPacker {
    // 无状态引擎，不需要注入依赖
}

impl MicroPacker {
    pub fn new() -> Self {
        Self {}
    }

    /// 执行装盘
    ///
    /// # 参数
    /// - `skus`: 已分配到 VLM 的 SKU
    /// - `order_lines`: 订单行（亲和分组与 avg_trays_per_order 统计）
    /// - `config`: 微观参数
    /// - `coverage_days`: 补货覆盖天数
    ///
    /// # 返回
    /// MicroResult（空 SKU 集合返回空托盘列表）
    #[instrument(skip_all, fields(skus = skus.len(), vlm_count = config.vlm_count))]
    pub fn pack(
        &self,
        skus: &[Sku],
        order_lines: &[OrderLine],
        config: &MicroConfig,
        coverage_days: f64,
    ) -> EngineResult<MicroResult> {
        // 0. 配置校验（装盘之前）
        config.validate()?;
        if !(coverage_days.is_finite() && coverage_days > 0.0) {
            return Err(EngineError::invalid_config(
                "coverage_days",
                format!("必须 > 0，实际 {}", coverage_days),
            ));
        }
        validate_skus(skus)?;

        // 1. 零周转过滤
        let eligible: Vec<Sku> = skus
            .iter()
            .filter(|s| config.include_zero_rotation || s.units_per_day_avg > 0.0)
            .cloned()
            .collect();
        if eligible.is_empty() {
            info!("无合格 SKU，返回空方案");
            return Ok(MicroResult::empty(config.vlm_count));
        }

        // 2. 亲和分组
        let group_size = AffinityGrouper::group_size(eligible.len(), config.vlm_count, config.trays_per_vlm);
        let groups = AffinityGrouper::from_config(config).group(&eligible, order_lines, group_size);

        // 3. 逐组装盘 + 复制
        let replicas = config.replication_factor.min(config.vlm_count);
        let mut state = PackState::new(config, replicas);
        let mut unplaced_skus = Vec::new();
        for group in &groups {
            self.pack_group(&mut state, &eligible, group, coverage_days, &mut unplaced_skus);
        }

        // 4. 告警与指标
        let overloaded_vlms: Vec<usize> = state
            .trays_per_vlm
            .iter()
            .enumerate()
            .filter(|(_, trays)| trays.len() > config.trays_per_vlm)
            .map(|(vlm, _)| vlm)
            .collect();
        for &vlm in &overloaded_vlms {
            warn!(vlm, trays = state.trays_per_vlm[vlm].len(), limit = config.trays_per_vlm, "VLM 托盘数超过目标");
        }

        let unplaced_ids: HashSet<&str> = unplaced_skus.iter().map(|u: &UnplacedSku| u.sku_id.as_str()).collect();
        let physical_trays = state.trays_per_vlm.iter().map(|v| v.len()).sum::<usize>();
        let height_efficiency = Self::height_efficiency(&state.logical_trays, config);
        let area_efficiency = Self::area_efficiency(&state.logical_trays, config);
        let avg_trays_per_order = Self::avg_trays_per_order(&state.logical_trays, order_lines);
        let replication_coverage = Self::replication_coverage(&eligible, &unplaced_ids, replicas, config);

        info!(
            groups = groups.len(),
            logical_trays = state.logical_trays.len(),
            physical_trays,
            unplaced = unplaced_skus.len(),
            height_efficiency,
            avg_trays_per_order,
            "微观装盘完成"
        );

        Ok(MicroResult {
            vlm_count: config.vlm_count,
            trays_per_vlm: state.trays_per_vlm,
            height_efficiency,
            area_efficiency,
            avg_trays_per_order,
            replication_coverage,
            group_count: groups.len(),
            unplaced_skus,
            overloaded_vlms,
        })
    }

    // ==========================================
    // 装盘主循环
    // ==========================================

    fn pack_group(
        &self,
        state: &mut PackState<'_>,
        skus: &[Sku],
        group: &AffinityGroup,
        coverage_days: f64,
        unplaced: &mut Vec<UnplacedSku>,
    ) {
        let config = state.config;
        let tray_volume = config.tray_volume();
        let targets = state.least_loaded_vlms();
        debug!(group_id = %group.id, targets = ?targets, "调度亲和组");

        let mut open = LogicalTray::open(&group.id);
        for &idx in &group.members {
            let sku = &skus[idx];

            // 单件即超托盘上限,不装入
            if sku.volume > tray_volume + CAPACITY_EPSILON || sku.weight > config.tray_max_weight + CAPACITY_EPSILON {
                warn!(sku_id = %sku.id, volume = sku.volume, weight = sku.weight, "单件超过托盘上限，无法装盘");
                unplaced.push(UnplacedSku {
                    sku_id: sku.id.clone(),
                    reason: format!(
                        "单件体积 {:.4} / 重量 {:.2} 超过托盘上限 {:.4} / {:.2}",
                        sku.volume, sku.weight, tray_volume, config.tray_max_weight
                    ),
                });
                continue;
            }

            let mut remaining = Self::units_for(sku, coverage_days, state.replicas);

            // 整行放不下时先关闭当前托盘
            if !open.is_empty() && Self::units_that_fit(&open, sku, config) < remaining {
                let full = std::mem::replace(&mut open, LogicalTray::open(&group.id));
                state.close(full, &targets);
            }

            // 超过一个空托盘容量的 SKU 跨托盘拆分
            while remaining > 0 {
                let fit = Self::units_that_fit(&open, sku, config);
                if fit == 0 {
                    if open.is_empty() {
                        warn!(sku_id = %sku.id, remaining, "空托盘仍无法容纳，剩余件数未装入");
                        break;
                    }
                    let full = std::mem::replace(&mut open, LogicalTray::open(&group.id));
                    state.close(full, &targets);
                    continue;
                }
                let units = fit.min(remaining);
                Self::place(&mut open, sku, units, config);
                remaining -= units;
            }
        }
        state.close(open, &targets);
    }

    /// 每个副本装入件数 = max(1, ceil(日均 × 覆盖天数 / R))
    fn units_for(sku: &Sku, coverage_days: f64, replicas: usize) -> u64 {
        let per_replica = (sku.units_per_day_avg * coverage_days / replicas.max(1) as f64).ceil();
        if per_replica.is_finite() && per_replica >= 1.0 {
            per_replica as u64
        } else {
            1
        }
    }

    /// 当前托盘还能放入的件数（体积与重量取小）
    fn units_that_fit(tray: &LogicalTray, sku: &Sku, config: &MicroConfig) -> u64 {
        let by_volume = Self::capacity_in(config.tray_volume() - tray.volume, sku.volume);
        let by_weight = Self::capacity_in(config.tray_max_weight - tray.weight, sku.weight);
        by_volume.min(by_weight)
    }

    fn capacity_in(room: f64, per_unit: f64) -> u64 {
        if per_unit <= 0.0 {
            return u64::MAX;
        }
        let units = (room / per_unit + CAPACITY_EPSILON).floor();
        if units <= 0.0 {
            0
        } else if units >= u64::MAX as f64 {
            u64::MAX
        } else {
            units as u64
        }
    }

    fn place(tray: &mut LogicalTray, sku: &Sku, units: u64, config: &MicroConfig) {
        tray.volume += units as f64 * sku.volume;
        tray.weight += units as f64 * sku.weight;
        tray.footprint += Self::column_count(sku, units, config) as f64 * sku.footprint();
        tray.lines.push(TraySku {
            sku_id: sku.id.clone(),
            description: sku.description.clone(),
            units,
        });
    }

    /// 按托盘可用高度堆叠后的列数
    fn column_count(sku: &Sku, units: u64, config: &MicroConfig) -> u64 {
        let per_column = if sku.height > 0.0 {
            ((config.tray_height / sku.height + CAPACITY_EPSILON).floor() as u64).max(1)
        } else {
            units.max(1)
        };
        units.div_ceil(per_column)
    }

    // ==========================================
    // 效率指标
    // ==========================================

    /// 装盘体积 / (托盘数 × 托盘有效体积) × 100
    fn height_efficiency(trays: &[LogicalTray], config: &MicroConfig) -> f64 {
        if trays.is_empty() {
            return 0.0;
        }
        let packed: f64 = trays.iter().map(|t| t.volume).sum();
        round_to(packed / (trays.len() as f64 * config.tray_volume()) * 100.0, 1)
    }

    /// 堆叠列底面积 / (托盘数 × 托盘面积) × 100
    fn area_efficiency(trays: &[LogicalTray], config: &MicroConfig) -> f64 {
        if trays.is_empty() {
            return 0.0;
        }
        let footprint: f64 = trays.iter().map(|t| t.footprint).sum();
        round_to(footprint / (trays.len() as f64 * config.tray_area()) * 100.0, 1)
    }

    /// 每单平均访问逻辑托盘数（只统计涉及已装盘 SKU 的订单）
    fn avg_trays_per_order(trays: &[LogicalTray], order_lines: &[OrderLine]) -> f64 {
        let mut trays_of_sku: HashMap<&str, Vec<usize>> = HashMap::new();
        for (tray_idx, tray) in trays.iter().enumerate() {
            for line in &tray.lines {
                trays_of_sku.entry(line.sku_id.as_str()).or_default().push(tray_idx);
            }
        }

        let mut visits: HashMap<&str, HashSet<usize>> = HashMap::new();
        for line in order_lines {
            if let Some(tray_ids) = trays_of_sku.get(line.sku_id.as_str()) {
                visits
                    .entry(line.order_id.as_str())
                    .or_default()
                    .extend(tray_ids.iter().copied());
            }
        }

        if visits.is_empty() {
            return 0.0;
        }
        let total: usize = visits.values().map(|t| t.len()).sum();
        round_to(total as f64 / visits.len() as f64, 2)
    }

    /// 完整复制（达到 replication_factor）的需求占合格需求的百分比
    fn replication_coverage(
        eligible: &[Sku],
        unplaced_ids: &HashSet<&str>,
        replicas: usize,
        config: &MicroConfig,
    ) -> f64 {
        let total: f64 = eligible.iter().map(|s| s.units_per_day_avg).sum();
        if total <= 0.0 || replicas < config.replication_factor {
            return 0.0;
        }
        let replicated: f64 = eligible
            .iter()
            .filter(|s| !unplaced_ids.contains(s.id.as_str()))
            .map(|s| s.units_per_day_avg)
            .sum();
        round_to(replicated / total * 100.0, 1)
    }
}

impl Default for MicroPacker {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// 测试模块
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;

    /// 托盘 1m × 1m × 1m（体积 1），承重 100
    fn unit_config(vlm_count: usize, replication_factor: usize) -> MicroConfig {
        MicroConfig {
            vlm_count,
            trays_per_vlm: 50,
            tray_width: 1.0,
            tray_depth: 1.0,
            tray_height: 1.0,
            tray_max_weight: 100.0,
            replication_factor,
            ..Default::default()
        }
    }

    /// 0.1m 立方体,单件体积 0.001,重量 1
    fn cube_sku(id: &str, per_day: f64) -> Sku {
        Sku::new(id, id, 0.1, 0.1, 0.1, 1.0).with_demand(per_day * 365.0, per_day)
    }

    #[test]
    fn test_units_per_replica() {
        let sku = cube_sku("S1", 3.0);
        assert_eq!(MicroPacker::units_for(&sku, 15.0, 2), 23); // ceil(22.5)
        let idle = cube_sku("S2", 0.0);
        assert_eq!(MicroPacker::units_for(&idle, 15.0, 2), 1);
    }

    #[test]
    fn test_replication_on_two_least_loaded_vlms() {
        let packer = MicroPacker::new();
        let config = unit_config(4, 2);
        let skus = vec![cube_sku("A", 1.0), cube_sku("B", 1.0)];

        let result = packer.pack(&skus, &[], &config, 10.0).unwrap();

        assert_eq!(result.group_count, 1);
        assert_eq!(result.trays_per_vlm[0].len(), 1);
        assert_eq!(result.trays_per_vlm[1].len(), 1);
        assert!(result.trays_per_vlm[2].is_empty());
        assert!(result.trays_per_vlm[3].is_empty());
        assert_ne!(result.trays_per_vlm[0][0].id, result.trays_per_vlm[1][0].id);
        assert_eq!(result.trays_per_vlm[0][0].skus, result.trays_per_vlm[1][0].skus);
        assert_eq!(result.trays_per_vlm[0][0].skus[0].units, 5);
    }

    #[test]
    fn test_later_groups_use_least_loaded_vlms() {
        let packer = MicroPacker::new();
        let config = unit_config(4, 2);
        // 6 个 SKU → 组大小 3 → 两个组
        let skus: Vec<Sku> = (0..6).map(|i| cube_sku(&format!("S{}", i), 1.0)).collect();

        let result = packer.pack(&skus, &[], &config, 10.0).unwrap();

        assert_eq!(result.group_count, 2);
        assert!(result.trays_per_vlm.iter().all(|trays| trays.len() == 1));
        assert_eq!(result.trays_per_vlm[2][0].group_id, "G-2");
    }

    #[test]
    fn test_close_tray_before_exceeding_weight() {
        let packer = MicroPacker::new();
        let config = unit_config(1, 1);
        // 每个 SKU 60 件 × 1kg → 两个 SKU 无法同盘
        let skus = vec![cube_sku("A", 6.0), cube_sku("B", 6.0)];

        let result = packer.pack(&skus, &[], &config, 10.0).unwrap();

        let trays = &result.trays_per_vlm[0];
        assert_eq!(trays.len(), 2);
        assert_eq!(trays[0].weight_fill, 60.0);
        assert!(result.all_trays().all(|t| t.volume_fill <= 100.0 && t.weight_fill <= 100.0));
    }

    #[test]
    fn test_large_line_split_across_trays() {
        let packer = MicroPacker::new();
        let config = unit_config(1, 1);
        // 250 件 × 1kg,每盘最多 100 件
        let skus = vec![cube_sku("A", 25.0)];

        let result = packer.pack(&skus, &[], &config, 10.0).unwrap();

        let units: Vec<u64> = result.trays_per_vlm[0].iter().map(|t| t.skus[0].units).collect();
        assert_eq!(units, vec![100, 100, 50]);
        assert_eq!(result.trays_per_vlm[0][0].weight_fill, 100.0);
    }

    #[test]
    fn test_oversized_unit_reported_unplaced() {
        let packer = MicroPacker::new();
        let config = unit_config(2, 1);
        let skus = vec![cube_sku("ok", 1.0), Sku::new("big", "big", 2.0, 1.0, 1.0, 1.0).with_demand(10.0, 1.0)];

        let result = packer.pack(&skus, &[], &config, 10.0).unwrap();

        assert_eq!(result.unplaced_skus.len(), 1);
        assert_eq!(result.unplaced_skus[0].sku_id, "big");
        assert!(result.all_trays().all(|t| t.skus.iter().all(|s| s.sku_id != "big")));
        assert_eq!(result.replication_coverage, 50.0);
    }

    #[test]
    fn test_zero_rotation_filtered() {
        let packer = MicroPacker::new();
        let config = unit_config(2, 1);
        let skus = vec![cube_sku("idle", 0.0)];

        let result = packer.pack(&skus, &[], &config, 10.0).unwrap();
        assert_eq!(result.total_trays(), 0);
        assert_eq!(result.trays_per_vlm.len(), 2);

        let with_idle = MicroConfig {
            include_zero_rotation: true,
            ..config
        };
        let result = packer.pack(&skus, &[], &with_idle, 10.0).unwrap();
        assert_eq!(result.total_trays(), 1);
    }

    #[test]
    fn test_zero_vlm_rejected_before_packing() {
        let packer = MicroPacker::new();
        let config = unit_config(0, 1);
        let err = packer.pack(&[cube_sku("A", 1.0)], &[], &config, 10.0).unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_overloaded_vlm_reported() {
        let packer = MicroPacker::new();
        let config = MicroConfig {
            trays_per_vlm: 1,
            ..unit_config(1, 1)
        };
        let skus = vec![cube_sku("A", 25.0)];

        let result = packer.pack(&skus, &[], &config, 10.0).unwrap();
        assert_eq!(result.overloaded_vlms, vec![0]);
    }

    #[test]
    fn test_metrics_from_plan() {
        let packer = MicroPacker::new();
        let config = unit_config(1, 1);
        // A 100 件 = 0.1 m³; B 50 件 → 同一组,分两盘（重量）
        let skus = vec![cube_sku("A", 10.0), cube_sku("B", 5.0)];
        let lines = vec![
            OrderLine::new("P1", "A", 1.0),
            OrderLine::new("P1", "B", 1.0),
            OrderLine::new("P2", "A", 1.0),
        ];

        let result = packer.pack(&skus, &lines, &config, 10.0).unwrap();

        assert_eq!(result.total_trays(), 2);
        // (0.1 + 0.05) / (2 × 1) = 7.5%
        assert_eq!(result.height_efficiency, 7.5);
        // P1 访问 2 盘,P2 访问 1 盘
        assert_eq!(result.avg_trays_per_order, 1.5);
        assert_eq!(result.replication_coverage, 100.0);
    }
}
