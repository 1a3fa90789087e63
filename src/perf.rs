use std::cell::Cell;
use std::time::Instant;

thread_local! {
    static STAGE_DEPTH: Cell<u32> = const { Cell::new(0) };
}

fn is_true(v: &str) -> bool {
    matches!(
        v.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "y" | "on"
    )
}

/// 慢阶段阈值（毫秒）
///
/// - `WAREHOUSE_SLOTTING_SLOW_STAGE_MS=500` 配置阈值
/// - 未配置时 Debug 为 200，Release 为 1000
/// - `WAREHOUSE_SLOTTING_PERF=0` 关闭慢阶段告警
fn slow_stage_threshold_ms() -> Option<u64> {
    if let Ok(v) = std::env::var("WAREHOUSE_SLOTTING_PERF") {
        if !is_true(&v) {
            return None;
        }
    }
    let ms = std::env::var("WAREHOUSE_SLOTTING_SLOW_STAGE_MS")
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(if cfg!(debug_assertions) { 200 } else { 1000 });
    Some(ms)
}

/// 阶段计时 Guard：drop 时记录 elapsed_ms 与嵌套深度
///
/// 使用方式：
/// ```ignore
/// let _timer = warehouse_slotting::perf::StageTimer::new("macro_allocate");
/// // do work...
/// ```
pub struct StageTimer {
    stage: &'static str,
    start: Instant,
    depth: u32,
}

impl StageTimer {
    pub fn new(stage: &'static str) -> Self {
        let depth = STAGE_DEPTH.with(|d| {
            let current = d.get();
            d.set(current.saturating_add(1));
            current
        });
        Self {
            stage,
            start: Instant::now(),
            depth,
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

impl Drop for StageTimer {
    fn drop(&mut self) {
        let elapsed_ms = self.elapsed_ms();

        tracing::info!(
            target: "perf",
            stage = self.stage,
            depth = self.depth,
            elapsed_ms,
            "done"
        );

        if let Some(threshold) = slow_stage_threshold_ms() {
            if threshold > 0 && elapsed_ms >= threshold {
                tracing::warn!(
                    target: "perf",
                    stage = self.stage,
                    elapsed_ms,
                    threshold_ms = threshold,
                    "slow stage"
                );
            }
        }

        STAGE_DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_true() {
        assert!(is_true(" ON "));
        assert!(is_true("1"));
        assert!(!is_true("off"));
    }

    #[test]
    fn test_nested_depth() {
        let outer = StageTimer::new("outer");
        let inner = StageTimer::new("inner");
        assert_eq!(outer.depth + 1, inner.depth);
        drop(inner);
        let again = StageTimer::new("again");
        assert_eq!(again.depth, outer.depth + 1);
    }
}
