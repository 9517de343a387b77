use serde::Deserialize;

// ===== Chart API payload =====

#[derive(Debug, Deserialize)]
pub struct ChartResponse {
    pub chart: ChartEnvelope,
}

#[derive(Debug, Deserialize)]
pub struct ChartEnvelope {
    #[serde(default)]
    pub result: Option<Vec<ChartResult>>,
    #[serde(default)]
    pub error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
pub struct ChartError {
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChartResult {
    /// Unix seconds, one per record.
    #[serde(default)]
    pub timestamp: Option<Vec<Option<i64>>>,
    pub indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
pub struct ChartIndicators {
    #[serde(default)]
    pub quote: Vec<ChartQuote>,
}

/// Column-oriented OHLCV. Any cell may be `null` on holidays or partial days.
#[derive(Debug, Default, Deserialize)]
pub struct ChartQuote {
    #[serde(default)]
    pub open: Vec<Option<f64>>,
    #[serde(default)]
    pub high: Vec<Option<f64>>,
    #[serde(default)]
    pub low: Vec<Option<f64>>,
    #[serde(default)]
    pub close: Vec<Option<f64>>,
    #[serde(default)]
    pub volume: Vec<Option<f64>>,
}

/// Forward-fill then back-fill a column in place, padded to `len`.
pub fn fill_gaps(column: &mut Vec<Option<f64>>, len: usize) {
    column.resize(len, None);

    let mut last = None;
    for cell in column.iter_mut() {
        match cell {
            Some(v) if v.is_finite() => last = Some(*v),
            _ => *cell = last,
        }
    }

    let mut next = None;
    for cell in column.iter_mut().rev() {
        match cell {
            Some(v) => next = Some(*v),
            None => *cell = next,
        }
    }
}
