use std::fmt;

/// Placeholder used wherever a value has no meaningful rendering.
pub const NOT_APPLICABLE: &str = "N/A";

/// Percentage growth between two observations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PercentChange {
    /// No previous value, no change, or a decrease.
    NotApplicable,
    /// Growth rounded to two decimals.
    Value(f64),
    /// Growth that rounds below 0.01.
    BelowResolution,
}

impl PercentChange {
    pub fn is_applicable(&self) -> bool {
        !matches!(self, PercentChange::NotApplicable)
    }
}

impl fmt::Display for PercentChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PercentChange::NotApplicable => f.write_str(NOT_APPLICABLE),
            PercentChange::Value(value) => write!(f, "{value:.2}"),
            PercentChange::BelowResolution => f.write_str("< 0.01"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeltaResult {
    pub current: u64,
    pub previous: u64,
    pub increase: i64,
    pub percent_change: PercentChange,
}

/// Compares two consecutive counts. A previous value of zero is
/// indistinguishable from "no history" and never yields a percentage; zero
/// and negative changes do not either.
pub fn compute_delta(previous: u64, current: u64) -> DeltaResult {
    let increase = signed_difference(current, previous);

    let percent_change = if previous == 0 || increase <= 0 {
        PercentChange::NotApplicable
    } else {
        let raw = increase as f64 / previous as f64 * 100.0;
        let rounded = (raw * 100.0).round() / 100.0;
        if rounded < 0.01 {
            PercentChange::BelowResolution
        } else {
            PercentChange::Value(rounded)
        }
    };

    DeltaResult {
        current,
        previous,
        increase,
        percent_change,
    }
}

fn signed_difference(current: u64, previous: u64) -> i64 {
    if current >= previous {
        i64::try_from(current - previous).unwrap_or(i64::MAX)
    } else {
        i64::try_from(previous - current).map_or(i64::MIN, |difference| -difference)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseDelta {
    pub current: String,
    pub previous: Option<String>,
    pub is_new_release: bool,
}

/// Release tags are compared by identity. An absent previous tag compares
/// as `N/A`, so the first observed release is announced; `N/A` itself never
/// counts as a release.
pub fn compare_release(previous: Option<&str>, current: &str) -> ReleaseDelta {
    let is_new_release =
        current != NOT_APPLICABLE && previous.unwrap_or(NOT_APPLICABLE) != current;

    ReleaseDelta {
        current: current.to_owned(),
        previous: previous.map(str::to_owned),
        is_new_release,
    }
}
