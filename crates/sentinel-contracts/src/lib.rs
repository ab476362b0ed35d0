//! # sentinel-contracts
//!
//! Shared records and error types for the Sentinel transaction-authentication
//! engine.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate: only data definitions, input validation, and the error type.

pub mod assessment;
pub mod error;
pub mod liveness;
pub mod otp;
pub mod risk;
pub mod signal;
