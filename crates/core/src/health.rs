//! Health factor risk classification.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, RiskError};

/// Below this the position is eligible for liquidation.
pub const LIQUIDATION_HEALTH_FACTOR: f64 = 1.0;

/// At or above this the position is considered safe.
pub const SAFE_HEALTH_FACTOR: f64 = 1.5;

/// Risk level derived from the health factor.
///
/// Ordered from most to least risky.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    /// HF < 1.0, liquidatable
    Danger,
    /// 1.0 <= HF < 1.5
    Warning,
    /// HF >= 1.5
    Safe,
}

impl RiskLevel {
    /// Classify a health factor.
    ///
    /// Negative or NaN input is a caller error. `+inf` (no debt) is `Safe`.
    pub fn from_health_factor(hf: f64) -> Result<Self> {
        if hf.is_nan() || hf < 0.0 {
            return Err(RiskError::InvalidHealthFactor(hf));
        }

        Ok(if hf < LIQUIDATION_HEALTH_FACTOR {
            Self::Danger
        } else if hf < SAFE_HEALTH_FACTOR {
            Self::Warning
        } else {
            Self::Safe
        })
    }

    /// Short lowercase label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Danger => "danger",
            Self::Warning => "warning",
            Self::Safe => "safe",
        }
    }

    pub fn is_liquidatable(&self) -> bool {
        matches!(self, Self::Danger)
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify a health factor. See [`RiskLevel::from_health_factor`].
pub fn classify(hf: f64) -> Result<RiskLevel> {
    RiskLevel::from_health_factor(hf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert_eq!(classify(0.95).unwrap(), RiskLevel::Danger);
        assert_eq!(classify(1.2).unwrap(), RiskLevel::Warning);
        assert_eq!(classify(2.0).unwrap(), RiskLevel::Safe);
    }

    #[test]
    fn test_band_boundaries() {
        assert_eq!(classify(0.0).unwrap(), RiskLevel::Danger);
        assert_eq!(classify(0.9999).unwrap(), RiskLevel::Danger);
        assert_eq!(classify(1.0).unwrap(), RiskLevel::Warning);
        assert_eq!(classify(1.4999).unwrap(), RiskLevel::Warning);
        assert_eq!(classify(1.5).unwrap(), RiskLevel::Safe);
        assert_eq!(classify(f64::INFINITY).unwrap(), RiskLevel::Safe);
    }

    #[test]
    fn test_rejects_invalid_input() {
        assert_eq!(classify(-0.1), Err(RiskError::InvalidHealthFactor(-0.1)));
        assert!(classify(f64::NAN).is_err());
    }

    #[test]
    fn test_monotonic() {
        // Sweep [0, 3) and check levels never become riskier as HF grows
        let mut previous = RiskLevel::Danger;
        let mut transitions = 0;
        for i in 0..3000 {
            let level = classify(i as f64 / 1000.0).unwrap();
            assert!(level >= previous);
            if level != previous {
                transitions += 1;
            }
            previous = level;
        }
        assert_eq!(transitions, 2);
    }

    #[test]
    fn test_liquidatable() {
        assert!(RiskLevel::Danger.is_liquidatable());
        assert!(!RiskLevel::Warning.is_liquidatable());
        assert_eq!(RiskLevel::Warning.to_string(), "warning");
    }
}
