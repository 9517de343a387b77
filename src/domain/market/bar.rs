use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One OHLCV bar. After [`aggregate_daily`] the timestamp is UTC midnight of the trading day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }

    /// Midpoint of the bar's range, used by the ease-of-movement feature.
    pub fn mid(&self) -> f64 {
        (self.high + self.low) / 2.0
    }
}

fn day_start(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .unwrap_or_default()
}

/// Collapse raw records into one bar per calendar day (UTC), sorted ascending.
///
/// Records sharing a day are merged chronologically: open = first, high = max,
/// low = min, close = last, volume = sum. Input order does not matter.
pub fn aggregate_daily(mut records: Vec<Bar>) -> Vec<Bar> {
    // Stable sort keeps provider order for identical timestamps.
    records.sort_by_key(|bar| bar.timestamp);

    let mut daily: Vec<Bar> = Vec::with_capacity(records.len());
    for record in records {
        let day = day_start(record.date());
        match daily.last_mut() {
            Some(current) if current.timestamp == day => {
                current.high = current.high.max(record.high);
                current.low = current.low.min(record.low);
                current.close = record.close;
                current.volume += record.volume;
            }
            _ => daily.push(Bar {
                timestamp: day,
                ..record
            }),
        }
    }
    daily
}

/// The last `n` bars of a sequence (all of them when shorter).
pub fn tail(bars: &[Bar], n: usize) -> &[Bar] {
    &bars[bars.len().saturating_sub(n)..]
}
