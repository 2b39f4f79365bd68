//! Short-window efficiency average and trend from recent Vim results.

use serde::Serialize;

/// How many recent results feed the average.
pub const EFFICIENCY_WINDOW: usize = 20;
/// Each half of the trend comparison.
const TREND_HALF: usize = 5;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct EfficiencyTrend {
  /// Mean of up to `EFFICIENCY_WINDOW` values, one decimal.
  pub average: f64,
  /// mean(newest 5) - mean(next 5), one decimal; 0 with fewer than 10 values.
  pub trend: f64,
}

/// `newest_first` is ordered newest to oldest; extra values past the window are ignored.
pub fn efficiency_trend(newest_first: &[f64]) -> EfficiencyTrend {
  let window = &newest_first[..newest_first.len().min(EFFICIENCY_WINDOW)];
  let average = mean(window);
  let trend = if window.len() >= TREND_HALF * 2 {
    mean(&window[..TREND_HALF]) - mean(&window[TREND_HALF..TREND_HALF * 2])
  } else {
    0.0
  };
  EfficiencyTrend { average: round1(average), trend: round1(trend) }
}

fn mean(xs: &[f64]) -> f64 {
  if xs.is_empty() { 0.0 } else { xs.iter().sum::<f64>() / xs.len() as f64 }
}

pub(crate) fn round1(x: f64) -> f64 {
  (x * 10.0).round() / 10.0
}
