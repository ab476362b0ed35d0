//! # sentinel-core
//!
//! The audited decision engine for Sentinel and the traits its collaborators
//! implement.
//!
//! This crate provides:
//! - The collaborator traits (`SessionStore`, `Clock`, `SmsGateway`, `AuditWriter`)
//! - `SystemClock` and `ManualClock`
//! - The `DecisionEngine` that validates requests, runs the scorers in order,
//!   maps the verdict to an action, and records every decision
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sentinel_core::{DecisionEngine, clock::SystemClock};
//!
//! let engine = DecisionEngine::new(policy, audit, Arc::new(SystemClock));
//! let assessment = engine.assess(&request)?;
//! ```

pub mod clock;
pub mod engine;
pub mod traits;

pub use engine::DecisionEngine;
