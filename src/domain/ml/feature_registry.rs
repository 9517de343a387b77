use std::fmt;

/// Number of features in a model input vector.
pub const FEATURE_COUNT: usize = 24;

/// Shift distances used by the lag features.
pub const LAGS: [usize; 5] = [1, 2, 3, 5, 7];

/// One column of the model input vector.
///
/// The discriminant order is the vector order. Any change here is a breaking
/// change for every stored model artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Return,
    LogReturn,
    Ma7,
    Ma21,
    Ma50,
    Ema12,
    Ema26,
    Macd,
    BbUp,
    BbDn,
    Rsi14,
    VolChange,
    Evm,
    EvmMa14,
    LagClose1,
    LagClose2,
    LagClose3,
    LagClose5,
    LagClose7,
    LagReturn1,
    LagReturn2,
    LagReturn3,
    LagReturn5,
    LagReturn7,
}

impl Feature {
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::Return,
        Feature::LogReturn,
        Feature::Ma7,
        Feature::Ma21,
        Feature::Ma50,
        Feature::Ema12,
        Feature::Ema26,
        Feature::Macd,
        Feature::BbUp,
        Feature::BbDn,
        Feature::Rsi14,
        Feature::VolChange,
        Feature::Evm,
        Feature::EvmMa14,
        Feature::LagClose1,
        Feature::LagClose2,
        Feature::LagClose3,
        Feature::LagClose5,
        Feature::LagClose7,
        Feature::LagReturn1,
        Feature::LagReturn2,
        Feature::LagReturn3,
        Feature::LagReturn5,
        Feature::LagReturn7,
    ];

    /// Column name shared with the training pipeline.
    pub const fn name(self) -> &'static str {
        match self {
            Feature::Return => "return",
            Feature::LogReturn => "log_return",
            Feature::Ma7 => "ma7",
            Feature::Ma21 => "ma21",
            Feature::Ma50 => "ma50",
            Feature::Ema12 => "ema12",
            Feature::Ema26 => "ema26",
            Feature::Macd => "macd",
            Feature::BbUp => "bb_up",
            Feature::BbDn => "bb_dn",
            Feature::Rsi14 => "rsi14",
            Feature::VolChange => "vol_change",
            Feature::Evm => "evm",
            Feature::EvmMa14 => "evm_ma14",
            Feature::LagClose1 => "lag_close_1",
            Feature::LagClose2 => "lag_close_2",
            Feature::LagClose3 => "lag_close_3",
            Feature::LagClose5 => "lag_close_5",
            Feature::LagClose7 => "lag_close_7",
            Feature::LagReturn1 => "lag_return_1",
            Feature::LagReturn2 => "lag_return_2",
            Feature::LagReturn3 => "lag_return_3",
            Feature::LagReturn5 => "lag_return_5",
            Feature::LagReturn7 => "lag_return_7",
        }
    }

    /// Position of this feature in the input vector.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Number of leading bars for which the feature is undefined.
    ///
    /// EMAs are seeded with the first close (non-adjusted recursion), so they
    /// are defined from the first bar. Returns need one prior close, and a
    /// lagged return needs one more bar than its shift.
    pub const fn lookback(self) -> usize {
        match self {
            Feature::Ema12 | Feature::Ema26 | Feature::Macd => 0,
            Feature::Return | Feature::LogReturn | Feature::Evm => 1,
            Feature::Ma7 => 6,
            Feature::Ma21 | Feature::BbUp | Feature::BbDn | Feature::VolChange => 20,
            Feature::Ma50 => 49,
            Feature::Rsi14 | Feature::EvmMa14 => 14,
            Feature::LagClose1
            | Feature::LagClose2
            | Feature::LagClose3
            | Feature::LagClose5
            | Feature::LagClose7 => self.lag_distance(),
            Feature::LagReturn1
            | Feature::LagReturn2
            | Feature::LagReturn3
            | Feature::LagReturn5
            | Feature::LagReturn7 => self.lag_distance() + 1,
        }
    }

    /// Shift in bars for the lag columns, 0 for every other feature.
    pub const fn lag_distance(self) -> usize {
        match self {
            Feature::LagClose1 | Feature::LagReturn1 => LAGS[0],
            Feature::LagClose2 | Feature::LagReturn2 => LAGS[1],
            Feature::LagClose3 | Feature::LagReturn3 => LAGS[2],
            Feature::LagClose5 | Feature::LagReturn5 => LAGS[3],
            Feature::LagClose7 | Feature::LagReturn7 => LAGS[4],
            _ => 0,
        }
    }

    pub fn from_name(name: &str) -> Option<Feature> {
        Feature::ALL.into_iter().find(|f| f.name() == name)
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Leading bars dropped from every feature table: the longest lookback.
pub const WARMUP_BARS: usize = {
    let mut max = 0;
    let mut i = 0;
    while i < FEATURE_COUNT {
        let lookback = Feature::ALL[i].lookback();
        if lookback > max {
            max = lookback;
        }
        i += 1;
    }
    max
};

/// Minimum number of daily bars needed to produce one feature row.
pub const MIN_BARS: usize = WARMUP_BARS + 1;

/// Ordered feature names, as written into model artifacts.
pub fn feature_names() -> Vec<&'static str> {
    Feature::ALL.iter().map(|f| f.name()).collect()
}

/// Check that a model was trained on exactly this schema, in this order.
pub fn validate_schema<S: AsRef<str>>(names: &[S]) -> Result<(), String> {
    if names.len() != FEATURE_COUNT {
        return Err(format!(
            "expected {} features, artifact declares {}",
            FEATURE_COUNT,
            names.len()
        ));
    }
    for (position, (expected, actual)) in Feature::ALL.iter().zip(names).enumerate() {
        if expected.name() != actual.as_ref() {
            return Err(format!(
                "feature {} is '{}', expected '{}'",
                position,
                actual.as_ref(),
                expected.name()
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lag_columns_follow_lags() {
        let close_lags: Vec<usize> = Feature::ALL
            .iter()
            .filter(|f| f.name().starts_with("lag_close_"))
            .map(|f| f.lag_distance())
            .collect();
        let return_lags: Vec<usize> = Feature::ALL
            .iter()
            .filter(|f| f.name().starts_with("lag_return_"))
            .map(|f| f.lag_distance())
            .collect();
        assert_eq!(close_lags, LAGS);
        assert_eq!(return_lags, LAGS);

        for feature in Feature::ALL {
            let suffix = feature.name().rsplit('_').next().unwrap();
            if feature.name().starts_with("lag_") {
                assert_eq!(suffix.parse::<usize>().unwrap(), feature.lag_distance());
            } else {
                assert_eq!(feature.lag_distance(), 0);
            }
        }
        assert_eq!(Feature::LagReturn7.lookback(), 8);
    }

    #[test]
    fn test_index_matches_all_order() {
        for (i, feature) in Feature::ALL.iter().enumerate() {
            assert_eq!(feature.index(), i);
        }
    }

    #[test]
    fn test_names_are_unique_and_round_trip() {
        let names = feature_names();
        assert_eq!(names.len(), FEATURE_COUNT);
        for name in &names {
            assert_eq!(Feature::from_name(name).map(|f| f.name()), Some(*name));
        }
        let mut sorted = names.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_warmup_is_ma50_window() {
        assert_eq!(WARMUP_BARS, 49);
        assert_eq!(MIN_BARS, 50);
    }

    #[test]
    fn test_validate_schema() {
        assert!(validate_schema(&feature_names()).is_ok());

        let mut swapped = feature_names();
        swapped.swap(0, 1);
        let err = validate_schema(&swapped).unwrap_err();
        assert!(err.contains("log_return"));

        let short = &feature_names()[..10];
        assert!(validate_schema(short).is_err());
    }
}
