//! Completion-time extrapolation from polled progress samples.

/// Samples inspected when fitting the trend line.
const WINDOW: usize = 10;

/// Rolling log of (timestamp, fraction-done) samples; timestamps in
/// milliseconds.
#[derive(Debug, Default)]
pub struct ProgressLog {
    samples: Vec<(f64, f64)>,
}

impl ProgressLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, timestamp_ms: f64, fraction: f64) {
        self.samples.push((timestamp_ms, fraction));
    }

    pub fn estimated_completion(&self, start_time: Option<f64>) -> Option<f64> {
        estimate_completion(&self.samples, start_time)
    }
}

/// Secant through the most recent samples, extrapolated to fraction 1.0.
///
/// A non-positive slope falls back to scaling the elapsed time so
/// byte-percent equals time-percent.
pub fn estimate_completion(samples: &[(f64, f64)], start_time: Option<f64>) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }

    // Ignore anything after the first completed sample.
    let len = samples
        .iter()
        .position(|&(_, fraction)| fraction >= 1.0)
        .map(|index| index + 1)
        .unwrap_or(samples.len());

    let (x1, y1) = samples[len.saturating_sub(WINDOW)];
    let (x2, y2) = samples[len - 1];
    if x2 == x1 {
        return None;
    }

    let m = (y2 - y1) / (x2 - x1);
    let c = y2 - m * x2;

    let estimate = if m > 0.0 {
        (1.0 - c) / m
    } else {
        if y2 <= 0.0 {
            return None;
        }
        let x0 = samples[0].0;
        let mut x_start = start_time.unwrap_or_else(|| x0.min(-c / m));
        if !x_start.is_finite() {
            x_start = x0;
        }
        (x2 - x_start) / y2 + x_start
    };

    estimate.is_finite().then_some(estimate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steady_progress_extrapolates_linearly() {
        let samples = vec![(0.0, 0.0), (1000.0, 0.1), (2000.0, 0.2)];
        let estimate = estimate_completion(&samples, None).expect("estimate");
        assert!((estimate - 10_000.0).abs() < 1e-6);
    }

    #[test]
    fn only_the_recent_window_shapes_the_trend() {
        // One slow early sample, then ten fast ones; the early sample must
        // not drag the estimate out.
        let mut samples = vec![(0.0, 0.0)];
        for i in 0..10 {
            let x = 1000.0 + i as f64 * 1000.0;
            let y = 0.5 + i as f64 * 0.05;
            samples.push((x, y));
        }
        let estimate = estimate_completion(&samples, None).expect("estimate");
        // Secant through (1000, 0.5) and (10000, 0.95).
        assert!((estimate - 11_000.0).abs() < 1e-6);
    }

    #[test]
    fn samples_after_completion_are_ignored() {
        let samples = vec![(0.0, 0.0), (1000.0, 0.5), (2000.0, 1.0), (3000.0, 0.2)];
        let estimate = estimate_completion(&samples, None).expect("estimate");
        assert!((estimate - 2000.0).abs() < 1e-6);
    }

    #[test]
    fn stalled_transfers_fall_back_to_time_scaling() {
        let samples = vec![(1000.0, 0.4), (2000.0, 0.4)];
        // 40% took 1000ms from the first sample; scale to 100%.
        let estimate = estimate_completion(&samples, None).expect("estimate");
        assert!((estimate - 3500.0).abs() < 1e-6);
    }

    #[test]
    fn an_explicit_start_time_anchors_the_fallback() {
        let samples = vec![(1000.0, 0.4), (2000.0, 0.4)];
        let estimate = estimate_completion(&samples, Some(0.0)).expect("estimate");
        assert!((estimate - 5000.0).abs() < 1e-6);
    }

    #[test]
    fn degenerate_inputs_yield_no_estimate() {
        assert!(estimate_completion(&[], None).is_none());
        assert!(estimate_completion(&[(1000.0, 0.5)], None).is_none());
        assert!(estimate_completion(&[(1000.0, 0.0), (2000.0, 0.0)], None).is_none());
    }
}
