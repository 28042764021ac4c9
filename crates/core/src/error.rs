//! Error types for the risk engine.
//!
//! These are input contract violations only. An estimate that cannot be
//! computed is reported as [`crate::LiquidationPrice::Unavailable`], never as
//! an error.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RiskError {
    #[error("invalid decimal exponent: {0}")]
    InvalidDecimals(String),

    #[error("invalid health factor: {0}")]
    InvalidHealthFactor(f64),

    #[error("{field} must lie in [0, 1], got {value}")]
    InvalidRatio { field: &'static str, value: f64 },

    #[error("{field} must be a finite non-negative amount, got {value}")]
    InvalidAmount { field: &'static str, value: f64 },

    #[error("price for {asset} must be finite and positive, got {value}")]
    InvalidPrice { asset: String, value: f64 },
}

pub type Result<T> = std::result::Result<T, RiskError>;
