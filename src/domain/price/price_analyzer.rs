//! Price change analysis against a session baseline

use serde::Serialize;
use std::fmt;

use crate::shared::utils::calculate_percentage_change;

/// Percentage change of a refreshed price relative to the baseline
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct PriceDelta(pub f64);

impl PriceDelta {
    pub fn percent(&self) -> f64 {
        self.0
    }

    pub fn is_up(&self) -> bool {
        self.0 > 0.0
    }

    pub fn is_down(&self) -> bool {
        self.0 < 0.0
    }
}

impl fmt::Display for PriceDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 > 0.0 {
            write!(f, "+{:.3}%", self.0)
        } else {
            write!(f, "{:.3}%", self.0)
        }
    }
}

/// Analyzes price data against baselines
pub struct PriceAnalyzer;

impl PriceAnalyzer {
    /// Delta of `current` against `baseline`. A missing refreshed price
    /// yields no delta, which is distinct from a 0% move.
    pub fn delta(baseline: Option<f64>, current: Option<f64>) -> Option<PriceDelta> {
        calculate_percentage_change(baseline?, current?).map(PriceDelta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delta_up_and_down() {
        let up = PriceAnalyzer::delta(Some(100.0), Some(105.0)).unwrap();
        assert_eq!(up.to_string(), "+5.000%");
        assert!(up.is_up());

        let down = PriceAnalyzer::delta(Some(100.0), Some(95.0)).unwrap();
        assert_eq!(down.to_string(), "-5.000%");
        assert!(down.is_down());
    }

    #[test]
    fn test_unchanged_price_is_zero_not_missing() {
        let flat = PriceAnalyzer::delta(Some(100.0), Some(100.0)).unwrap();
        assert_eq!(flat.to_string(), "0.000%");
    }

    #[test]
    fn test_missing_price_has_no_delta() {
        assert_eq!(PriceAnalyzer::delta(Some(100.0), None), None);
        assert_eq!(PriceAnalyzer::delta(None, Some(100.0)), None);
    }
}
