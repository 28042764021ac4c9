//! Riskboard chain interaction layer.
//!
//! This crate provides:
//! - Provider management and chain-id verification for an RPC endpoint
//! - Contract bindings for the AAVE V3 Pool, Protocol Data Provider and Oracle
//! - The [`LendingDataSource`] capability consumed by the risk engine's adapter
//!
//! Everything here is read-only and returns raw fixed-point integers.

pub mod contracts;
pub mod protocol;
mod provider;

pub use protocol::{
    fetch_reserve, AaveV3Config, AaveV3Protocol, AccountData, LendingDataSource,
    ReserveConfiguration, ReserveReading, UserReserveData,
};
pub use provider::ProviderManager;
