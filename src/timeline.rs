// =============================================================================
// Master Timeline — fixed-step bucket grid and series alignment
// =============================================================================
//
// Every score series the engine reports lives on one shared grid: "now"
// floored to the nearest step-aligned instant, stepped backward until the
// lookback window is covered. Length is always lookback / step + 1.
//
// Two alignment modes:
// - same-resolution: exact timestamp match into buckets, unmatched samples
//   are dropped, unfilled buckets stay `None`
// - cross-resolution (finer -> coarser): each bucket takes the mean of the
//   last K finer samples with timestamp <= the bucket instant, regardless of
//   how many source samples fall between two buckets

use std::collections::HashMap;

use chrono::{DateTime, Duration, TimeZone, Utc};

/// Ordered, uniformly spaced sequence of bucket instants.
#[derive(Debug, Clone)]
pub struct MasterTimeline {
    instants: Vec<DateTime<Utc>>,
    step_minutes: u32,
}

/// Floor `dt` to the previous instant aligned to `step_minutes` (UTC).
pub fn floor_to_step(dt: DateTime<Utc>, step_minutes: u32) -> DateTime<Utc> {
    let step_secs = i64::from(step_minutes.max(1)) * 60;
    let floored = dt.timestamp() - dt.timestamp().rem_euclid(step_secs);
    Utc.timestamp_opt(floored, 0).single().unwrap_or(dt)
}

impl MasterTimeline {
    /// Build the timeline ending at `now` floored to the step, spanning
    /// `lookback_hours` backward.
    pub fn build(now: DateTime<Utc>, lookback_hours: u32, step_minutes: u32) -> Self {
        let step_minutes = step_minutes.max(1);
        let end = floor_to_step(now, step_minutes);
        let start = end - Duration::hours(i64::from(lookback_hours));
        let step = Duration::minutes(i64::from(step_minutes));

        let mut instants = Vec::new();
        let mut t = start;
        while t <= end {
            instants.push(t);
            t += step;
        }

        Self {
            instants,
            step_minutes,
        }
    }

    pub fn len(&self) -> usize {
        self.instants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instants.is_empty()
    }

    pub fn step_minutes(&self) -> u32 {
        self.step_minutes
    }

    pub fn instants(&self) -> &[DateTime<Utc>] {
        &self.instants
    }

    /// Bucket labels as UTC ISO-8601 strings (`YYYY-MM-DDTHH:MM:SSZ`).
    pub fn labels(&self) -> Vec<String> {
        self.instants
            .iter()
            .map(|t| t.format("%Y-%m-%dT%H:%M:%SZ").to_string())
            .collect()
    }

    /// An all-missing series of timeline length.
    pub fn null_series(&self) -> Vec<Option<f64>> {
        vec![None; self.len()]
    }

    /// Place a series already sampled at the timeline step into buckets by
    /// exact timestamp match (`ts_ms` in epoch milliseconds, one per value).
    ///
    /// Unmatched samples are dropped; unfilled buckets remain `None`. When
    /// duplicate timestamps occur the last sample wins.
    pub fn align_exact(&self, ts_ms: &[i64], values: &[Option<f64>]) -> Vec<Option<f64>> {
        let index: HashMap<i64, usize> = self
            .instants
            .iter()
            .enumerate()
            .map(|(i, t)| (t.timestamp_millis(), i))
            .collect();

        let mut out = self.null_series();
        for (t, v) in ts_ms.iter().zip(values.iter()) {
            if let Some(&i) = index.get(t) {
                out[i] = *v;
            }
        }
        out
    }

    /// Collapse a finer-resolution series onto the timeline: each bucket gets
    /// the arithmetic mean of the last `k` finer samples with timestamp <=
    /// the bucket instant.
    ///
    /// Fewer than `k` samples available: average what exists. No samples at
    /// or before the bucket: `None`. Missing values inside the trailing
    /// window are skipped; a window with no populated values is `None`.
    pub fn collapse_fine(
        &self,
        ts_ms: &[i64],
        values: &[Option<f64>],
        k: usize,
    ) -> Vec<Option<f64>> {
        if k == 0 {
            return self.null_series();
        }

        let mut out = Vec::with_capacity(self.len());
        let mut upper = 0usize; // count of samples with ts <= current bucket
        for bucket in &self.instants {
            let boundary = bucket.timestamp_millis();
            while upper < ts_ms.len() && ts_ms[upper] <= boundary {
                upper += 1;
            }

            let start = upper.saturating_sub(k);
            let window: Vec<f64> = values[start..upper].iter().flatten().copied().collect();
            if window.is_empty() {
                out.push(None);
            } else {
                out.push(Some(window.iter().sum::<f64>() / window.len() as f64));
            }
        }
        out
    }
}
