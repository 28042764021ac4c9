//! Contract bindings for lending protocols.

pub mod aave_v3;

pub use aave_v3::{IAaveOracle, IPool, IPoolDataProvider};
