//! Daily bars to model features.
//!
//! The engine is a pure transform: the same bars always produce the same
//! table. Every column follows a fixed trailing window and rows whose windows
//! are incomplete are dropped, never imputed.
//!
//! Windows:
//! - returns: 1 prior close
//! - ma7 / ma21 / ma50: trailing simple means of close
//! - ema12 / ema26: recursive EMA, `alpha = 2 / (span + 1)`, seeded with the first close
//! - bollinger: ma21 ± 2 × sample std of the same 21 closes
//! - rsi14: 14-bar means of positive / negative close deltas
//! - vol_change: volume over its 21-bar mean
//! - evm / evm_ma14: ease of movement and its 14-bar mean
//! - lags: close and return shifted by 1, 2, 3, 5, 7 bars

use crate::domain::market::Bar;
use crate::domain::ml::feature_registry::{FEATURE_COUNT, Feature, WARMUP_BARS};
use chrono::{DateTime, Utc};
use statrs::statistics::Statistics;
use ta::Next;
use ta::indicators::{ExponentialMovingAverage, SimpleMovingAverage};
use thiserror::Error;
use tracing::debug;

/// Added to denominators that may be zero.
pub const EPSILON: f64 = 1e-9;

const RSI_PERIOD: usize = 14;
const EVM_PERIOD: usize = 14;
const BB_PERIOD: usize = 21;
const BB_WIDTH: f64 = 2.0;
const VOLUME_PERIOD: usize = 21;

#[derive(Debug, Error)]
pub enum FeatureError {
    #[error("Indicator setup failed: {0}")]
    Indicator(String),
}

fn indicator_error<E: std::fmt::Debug>(err: E) -> FeatureError {
    FeatureError::Indicator(format!("{:?}", err))
}

/// Features for one bar, in schema order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
    values: [f64; FEATURE_COUNT],
}

impl FeatureRow {
    pub fn get(&self, feature: Feature) -> f64 {
        self.values[feature.index()]
    }

    /// Model input vector.
    pub fn vector(&self) -> &[f64] {
        &self.values
    }
}

/// Feature rows in ascending timestamp order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureTable {
    rows: Vec<FeatureRow>,
}

impl FeatureTable {
    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn latest(&self) -> Option<&FeatureRow> {
        self.rows.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.close).collect()
    }
}

pub struct FeatureEngine;

impl FeatureEngine {
    /// Compute the feature table for bars sorted ascending, one bar per day.
    ///
    /// The output holds one row per bar from index [`WARMUP_BARS`] on, so its
    /// length is `bars.len() - WARMUP_BARS` (or zero).
    pub fn compute(bars: &[Bar]) -> Result<FeatureTable, FeatureError> {
        let n = bars.len();
        if n <= WARMUP_BARS {
            return Ok(FeatureTable::default());
        }

        let close: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let volume: Vec<f64> = bars.iter().map(|b| b.volume).collect();

        // Series defined from bar 1 on carry NaN at index 0; no row reads it.
        let mut ret = vec![f64::NAN; n];
        let mut log_ret = vec![f64::NAN; n];
        let mut evm = vec![f64::NAN; n];
        for i in 1..n {
            ret[i] = close[i] / close[i - 1] - 1.0;
            log_ret[i] = (close[i] / close[i - 1]).ln();
            let range = bars[i].high - bars[i].low;
            evm[i] = (bars[i].mid() - bars[i - 1].mid()) * range / (volume[i] + EPSILON);
        }

        let ma7 = trailing_mean(&close, 7)?;
        let ma21 = trailing_mean(&close, 21)?;
        let ma50 = trailing_mean(&close, 50)?;
        let ema12 = exponential_mean(&close, 12)?;
        let ema26 = exponential_mean(&close, 26)?;
        let rsi = relative_strength(&close)?;
        let vol_ma = trailing_mean(&volume, VOLUME_PERIOD)?;
        let evm_ma = shifted_mean(&evm, EVM_PERIOD)?;

        let mut rows = Vec::with_capacity(n - WARMUP_BARS);
        for i in WARMUP_BARS..n {
            let band = BB_WIDTH * close[i + 1 - BB_PERIOD..=i].iter().std_dev();

            let mut values = [0.0; FEATURE_COUNT];
            for feature in Feature::ALL {
                values[feature.index()] = match feature {
                    Feature::Return => ret[i],
                    Feature::LogReturn => log_ret[i],
                    Feature::Ma7 => ma7[i],
                    Feature::Ma21 => ma21[i],
                    Feature::Ma50 => ma50[i],
                    Feature::Ema12 => ema12[i],
                    Feature::Ema26 => ema26[i],
                    Feature::Macd => ema12[i] - ema26[i],
                    Feature::BbUp => ma21[i] + band,
                    Feature::BbDn => ma21[i] - band,
                    Feature::Rsi14 => rsi[i],
                    Feature::VolChange => volume[i] / (vol_ma[i] + EPSILON),
                    Feature::Evm => evm[i],
                    Feature::EvmMa14 => evm_ma[i],
                    lag @ (Feature::LagClose1
                    | Feature::LagClose2
                    | Feature::LagClose3
                    | Feature::LagClose5
                    | Feature::LagClose7) => close[i - lag.lag_distance()],
                    lag @ (Feature::LagReturn1
                    | Feature::LagReturn2
                    | Feature::LagReturn3
                    | Feature::LagReturn5
                    | Feature::LagReturn7) => ret[i - lag.lag_distance()],
                };
            }

            if let Some(bad) = Feature::ALL
                .into_iter()
                .find(|f| !values[f.index()].is_finite())
            {
                debug!(
                    "FeatureEngine: dropping row {} ({}), {} is not finite",
                    i, bars[i].timestamp, bad
                );
                continue;
            }

            rows.push(FeatureRow {
                timestamp: bars[i].timestamp,
                close: close[i],
                values,
            });
        }

        Ok(FeatureTable { rows })
    }
}

/// Trailing simple mean; entries before `period - 1` are partial means.
fn trailing_mean(values: &[f64], period: usize) -> Result<Vec<f64>, FeatureError> {
    let mut sma = SimpleMovingAverage::new(period).map_err(indicator_error)?;
    Ok(values.iter().map(|&v| sma.next(v)).collect())
}

/// Trailing mean of a series whose first entry is undefined.
fn shifted_mean(values: &[f64], period: usize) -> Result<Vec<f64>, FeatureError> {
    let mut out = vec![f64::NAN; values.len()];
    if values.len() > 1 {
        let tail = trailing_mean(&values[1..], period)?;
        out[1..].copy_from_slice(&tail);
    }
    Ok(out)
}

/// Non-adjusted EMA with `alpha = 2 / (span + 1)`, first value as seed.
fn exponential_mean(values: &[f64], span: usize) -> Result<Vec<f64>, FeatureError> {
    let mut ema = ExponentialMovingAverage::new(span).map_err(indicator_error)?;
    Ok(values.iter().map(|&v| ema.next(v)).collect())
}

/// RSI from simple 14-bar means of gains and losses.
///
/// `rsi = 100 - 100 / (1 + avg_gain / (avg_loss + EPSILON))`, valid from bar 14.
fn relative_strength(close: &[f64]) -> Result<Vec<f64>, FeatureError> {
    let n = close.len();
    let mut gains = vec![f64::NAN; n];
    let mut losses = vec![f64::NAN; n];
    for i in 1..n {
        let delta = close[i] - close[i - 1];
        gains[i] = delta.max(0.0);
        losses[i] = (-delta).max(0.0);
    }

    let avg_gain = shifted_mean(&gains, RSI_PERIOD)?;
    let avg_loss = shifted_mean(&losses, RSI_PERIOD)?;

    Ok((0..n)
        .map(|i| {
            if i < RSI_PERIOD {
                return f64::NAN;
            }
            let rs = avg_gain[i] / (avg_loss[i] + EPSILON);
            100.0 - 100.0 / (1.0 + rs)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
        let start = Utc.with_ymd_and_hms(2023, 1, 2, 0, 0, 0).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar {
                timestamp: start + Duration::days(i as i64),
                open: c,
                high: c + 1.0,
                low: c - 1.0,
                close: c,
                volume: 1_000.0 + (i % 7) as f64 * 100.0,
            })
            .collect()
    }

    fn wavy_closes(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 100.0 + 5.0 * (i as f64 * 0.3).sin() + i as f64 * 0.1)
            .collect()
    }

    #[test]
    fn test_output_length_follows_warmup() {
        for n in [0, 10, 49, 50, 51, 120, 300] {
            let table = FeatureEngine::compute(&bars_from_closes(&wavy_closes(n))).unwrap();
            assert_eq!(table.len(), n.saturating_sub(WARMUP_BARS), "n = {}", n);
        }
    }

    #[test]
    fn test_rows_are_complete_and_contiguous() {
        let bars = bars_from_closes(&wavy_closes(150));
        let table = FeatureEngine::compute(&bars).unwrap();

        for (row, bar) in table.rows().iter().zip(&bars[WARMUP_BARS..]) {
            assert_eq!(row.timestamp, bar.timestamp);
            assert_eq!(row.close, bar.close);
            assert_eq!(row.vector().len(), FEATURE_COUNT);
            assert!(row.vector().iter().all(|v| v.is_finite()));
        }
    }

    #[test]
    fn test_deterministic() {
        let bars = bars_from_closes(&wavy_closes(200));
        let first = FeatureEngine::compute(&bars).unwrap();
        let second = FeatureEngine::compute(&bars).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_linear_ramp_values() {
        // close[i] = i + 1, so the first row sits on close = 50.
        let closes: Vec<f64> = (1..=60).map(|i| i as f64).collect();
        let table = FeatureEngine::compute(&bars_from_closes(&closes)).unwrap();
        let row = &table.rows()[0];

        assert_eq!(row.close, 50.0);
        assert!((row.get(Feature::Ma7) - 47.0).abs() < 1e-9);
        assert!((row.get(Feature::Ma21) - 40.0).abs() < 1e-9);
        assert!((row.get(Feature::Ma50) - 25.5).abs() < 1e-9);
        assert!((row.get(Feature::Return) - (50.0 / 49.0 - 1.0)).abs() < 1e-12);
        assert!((row.get(Feature::LogReturn) - (50.0_f64 / 49.0).ln()).abs() < 1e-12);
        assert_eq!(row.get(Feature::LagClose1), 49.0);
        assert_eq!(row.get(Feature::LagClose7), 43.0);
        assert!((row.get(Feature::LagReturn1) - (49.0 / 48.0 - 1.0)).abs() < 1e-12);
        assert!((row.get(Feature::LagReturn7) - (43.0 / 42.0 - 1.0)).abs() < 1e-12);

        // Sample std of 21 consecutive integers is sqrt(21 * 22 / 12).
        let std = (21.0_f64 * 22.0 / 12.0).sqrt();
        assert!((row.get(Feature::BbUp) - (40.0 + 2.0 * std)).abs() < 1e-9);
        assert!((row.get(Feature::BbDn) - (40.0 - 2.0 * std)).abs() < 1e-9);

        // Mid rises by 1 per bar over a range of 2.
        let expected_evm = 2.0 / (row_volume(&closes, 49) + EPSILON);
        assert!((row.get(Feature::Evm) - expected_evm).abs() < 1e-12);
    }

    fn row_volume(closes: &[f64], i: usize) -> f64 {
        bars_from_closes(closes)[i].volume
    }

    #[test]
    fn test_flat_series() {
        let closes = vec![42.0; 80];
        let table = FeatureEngine::compute(&bars_from_closes(&closes)).unwrap();
        let row = table.latest().unwrap();

        assert_eq!(row.get(Feature::Return), 0.0);
        assert!((row.get(Feature::Ema12) - 42.0).abs() < 1e-9);
        assert!((row.get(Feature::Ema26) - 42.0).abs() < 1e-9);
        assert!(row.get(Feature::Macd).abs() < 1e-9);
        assert!((row.get(Feature::BbUp) - 42.0).abs() < 1e-9);
        assert!((row.get(Feature::BbDn) - 42.0).abs() < 1e-9);
        assert_eq!(row.get(Feature::Evm), 0.0);
        // No gains: rs = 0 / eps.
        assert!(row.get(Feature::Rsi14).abs() < 1e-9);
    }

    #[test]
    fn test_rsi_saturates_on_strictly_increasing_closes() {
        let closes: Vec<f64> = (0..15).map(|i| 10.0 + i as f64).collect();
        let rsi = relative_strength(&closes).unwrap();

        assert!(rsi[..RSI_PERIOD].iter().all(|v| v.is_nan()));
        // avg_gain = 1, avg_loss = 0, so rs = 1 / 1e-9.
        assert!((rsi[14] - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_rsi_balanced_moves() {
        // Alternating +1 / -1 deltas: equal averages, RSI near 50.
        let closes: Vec<f64> = (0..40).map(|i| 10.0 + (i % 2) as f64).collect();
        let rsi = relative_strength(&closes).unwrap();
        assert!((rsi[39] - 50.0).abs() < 1e-3);
    }

    #[test]
    fn test_exponential_mean_recursion() {
        // span 3 -> alpha 0.5
        let ema = exponential_mean(&[1.0, 2.0, 3.0], 3).unwrap();
        assert_eq!(ema, vec![1.0, 1.5, 2.25]);
    }

    #[test]
    fn test_non_finite_rows_are_dropped() {
        let mut closes = wavy_closes(60);
        closes[55] = 0.0; // log return and the next return blow up
        let table = FeatureEngine::compute(&bars_from_closes(&closes)).unwrap();

        assert!(table.len() < 60 - WARMUP_BARS);
        assert!(
            table
                .rows()
                .iter()
                .all(|r| r.vector().iter().all(|v| v.is_finite()))
        );
    }
}
