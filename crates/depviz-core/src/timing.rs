//! Opt-in wall-clock timing for pipeline stages.
//!
//! Off by default. The CLI turns it on with `--timing` or `DEPVIZ_TIMING=1`,
//! runs a reduction, then drains the samples with [`collect_report`].
//! Samples are kept per thread; the pipeline is single-threaded.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use serde::Serialize;

/// Environment variable that enables timing.
pub const TIMING_ENV: &str = "DEPVIZ_TIMING";

static ENABLED: AtomicBool = AtomicBool::new(false);

thread_local! {
    static SAMPLES: RefCell<Vec<(&'static str, Duration)>> = const { RefCell::new(Vec::new()) };
}

/// Percentile summary for one stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageTiming {
    pub stage: &'static str,
    pub count: usize,
    #[serde(rename = "p50_us", serialize_with = "as_micros")]
    pub p50: Duration,
    #[serde(rename = "p95_us", serialize_with = "as_micros")]
    pub p95: Duration,
    #[serde(rename = "p99_us", serialize_with = "as_micros")]
    pub p99: Duration,
}

/// All stages timed since the last drain, sorted by stage name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TimingReport {
    pub stages: Vec<StageTiming>,
}

/// True when [`TIMING_ENV`] holds `1`, `true`, `yes` or `on` (any case).
#[must_use]
pub fn enabled_from_env() -> bool {
    std::env::var(TIMING_ENV).is_ok_and(|v| {
        matches!(
            v.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )
    })
}

/// Turn sampling on or off. Turning it off discards pending samples.
pub fn set_enabled(enabled: bool) {
    ENABLED.store(enabled, Ordering::Relaxed);
    if !enabled {
        SAMPLES.with(|s| s.borrow_mut().clear());
    }
}

#[must_use]
pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed)
}

/// Run `f`, recording its duration under `stage` when timing is on.
pub fn timed<R>(stage: &'static str, f: impl FnOnce() -> R) -> R {
    if !is_enabled() {
        return f();
    }
    let start = Instant::now();
    let out = f();
    let elapsed = start.elapsed();
    SAMPLES.with(|s| s.borrow_mut().push((stage, elapsed)));
    out
}

/// Drain this thread's samples into a report.
#[must_use]
pub fn collect_report() -> TimingReport {
    let samples = SAMPLES.with(|s| std::mem::take(&mut *s.borrow_mut()));

    let mut by_stage: BTreeMap<&'static str, Vec<Duration>> = BTreeMap::new();
    for (stage, elapsed) in samples {
        by_stage.entry(stage).or_default().push(elapsed);
    }

    let stages = by_stage
        .into_iter()
        .map(|(stage, mut durations)| {
            durations.sort_unstable();
            StageTiming {
                stage,
                count: durations.len(),
                p50: nearest_rank(&durations, 50),
                p95: nearest_rank(&durations, 95),
                p99: nearest_rank(&durations, 99),
            }
        })
        .collect();

    TimingReport { stages }
}

impl TimingReport {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Fixed-width table for stderr.
    #[must_use]
    pub fn render_table(&self) -> String {
        if self.stages.is_empty() {
            return "no timing samples\n".to_string();
        }
        let mut out = format!(
            "{:<16} {:>6} {:>10} {:>10} {:>10}\n",
            "stage", "count", "p50", "p95", "p99"
        );
        for t in &self.stages {
            let _ = writeln!(
                out,
                "{:<16} {:>6} {:>10} {:>10} {:>10}",
                t.stage,
                t.count,
                human(t.p50),
                human(t.p95),
                human(t.p99)
            );
        }
        out
    }
}

/// Nearest-rank percentile of an ascending slice.
fn nearest_rank(sorted: &[Duration], pct: usize) -> Duration {
    let Some(last) = sorted.len().checked_sub(1) else {
        return Duration::ZERO;
    };
    let rank = (pct.min(100) * sorted.len()).div_ceil(100);
    sorted[rank.saturating_sub(1).min(last)]
}

fn human(d: Duration) -> String {
    let us = d.as_micros();
    match us {
        0..1_000 => format!("{us}µs"),
        1_000..1_000_000 => format!("{:.2}ms", d.as_secs_f64() * 1e3),
        _ => format!("{:.3}s", d.as_secs_f64()),
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn as_micros<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(u64::try_from(d.as_micros()).unwrap_or(u64::MAX))
}
