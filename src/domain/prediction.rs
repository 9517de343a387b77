use crate::domain::market::Bar;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    Buy,
    Sell,
}

impl Signal {
    pub fn from_class(class: u8) -> Self {
        if class == 1 { Signal::Buy } else { Signal::Sell }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::Buy => "buy",
            Signal::Sell => "sell",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one `predict` call.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    pub ticker: String,
    pub latest_date: NaiveDate,
    pub signal: Signal,
    /// Class-1 probability; absent when the model cannot emit one.
    pub probability: Option<f64>,
    pub current_price: f64,
    pub estimated_return: Option<f64>,
    pub predicted_price: Option<f64>,
    /// Most recent daily bars, for display.
    pub recent_bars: Vec<Bar>,
}

/// Mean magnitude of realized one-step-ahead returns, split by sign.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReturnStats {
    /// Mean of strictly positive returns, 0 when there are none.
    pub pos_mean: f64,
    /// Mean of non-positive returns, 0 when there are none.
    pub neg_mean: f64,
    pub samples: usize,
}

impl ReturnStats {
    /// Statistics over `close[i + 1] / close[i] - 1` for every consecutive pair.
    ///
    /// Every pair lies at or before the last close, so only outcomes already
    /// realized at that date contribute. `None` when fewer than two closes.
    pub fn from_closes(closes: &[f64]) -> Option<Self> {
        if closes.len() < 2 {
            return None;
        }

        let (mut pos_sum, mut pos_n) = (0.0, 0usize);
        let (mut neg_sum, mut neg_n) = (0.0, 0usize);
        for pair in closes.windows(2) {
            let r = pair[1] / pair[0] - 1.0;
            if !r.is_finite() {
                continue;
            }
            if r > 0.0 {
                pos_sum += r;
                pos_n += 1;
            } else {
                neg_sum += r;
                neg_n += 1;
            }
        }

        let samples = pos_n + neg_n;
        if samples == 0 {
            return None;
        }

        let mean = |sum: f64, n: usize| if n == 0 { 0.0 } else { sum / n as f64 };
        Some(Self {
            pos_mean: mean(pos_sum, pos_n),
            neg_mean: mean(neg_sum, neg_n),
            samples,
        })
    }

    /// Expected next-period return.
    ///
    /// With a probability `p`: `p * pos_mean + (1 - p) * neg_mean`.
    /// Without one, the mean of the side the signal points to.
    pub fn expected_return(&self, probability: Option<f64>, signal: Signal) -> f64 {
        match probability {
            Some(p) => p * self.pos_mean + (1.0 - p) * self.neg_mean,
            None => match signal {
                Signal::Buy => self.pos_mean,
                Signal::Sell => self.neg_mean,
            },
        }
    }
}

/// Price implied by applying `estimated_return` to `current`.
pub fn predicted_price(current: f64, estimated_return: f64) -> f64 {
    current * (1.0 + estimated_return)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blending_formula() {
        let stats = ReturnStats {
            pos_mean: 0.02,
            neg_mean: -0.01,
            samples: 10,
        };
        let r = stats.expected_return(Some(0.7), Signal::Buy);
        assert!((r - 0.011).abs() < 1e-12);

        // Probability drives the blend, not the signal.
        let r_sell = stats.expected_return(Some(0.7), Signal::Sell);
        assert!((r_sell - 0.011).abs() < 1e-12);
    }

    #[test]
    fn test_expected_return_without_probability() {
        let stats = ReturnStats {
            pos_mean: 0.02,
            neg_mean: -0.01,
            samples: 10,
        };
        assert_eq!(stats.expected_return(None, Signal::Buy), 0.02);
        assert_eq!(stats.expected_return(None, Signal::Sell), -0.01);
    }

    #[test]
    fn test_return_stats_partition() {
        // Returns: +10%, 0%, -10%, +20% (approx.)
        let closes = [100.0, 110.0, 110.0, 99.0, 118.8];
        let stats = ReturnStats::from_closes(&closes).unwrap();

        assert_eq!(stats.samples, 4);
        assert!((stats.pos_mean - 0.15).abs() < 1e-9);
        // Zero counts as non-positive.
        assert!((stats.neg_mean - (-0.05)).abs() < 1e-9);
    }

    #[test]
    fn test_return_stats_one_sided() {
        let rising = [1.0, 2.0, 3.0];
        let stats = ReturnStats::from_closes(&rising).unwrap();
        assert_eq!(stats.neg_mean, 0.0);
        assert!(stats.pos_mean > 0.0);
    }

    #[test]
    fn test_return_stats_needs_two_closes() {
        assert!(ReturnStats::from_closes(&[]).is_none());
        assert!(ReturnStats::from_closes(&[100.0]).is_none());
    }

    #[test]
    fn test_predicted_price() {
        assert!((predicted_price(200.0, 0.011) - 202.2).abs() < 1e-9);
    }

    #[test]
    fn test_signal_from_class() {
        assert_eq!(Signal::from_class(1), Signal::Buy);
        assert_eq!(Signal::from_class(0), Signal::Sell);
        assert_eq!(Signal::Buy.to_string(), "buy");
    }
}
