//! # sentinel-audit
//!
//! Append-only, SHA-256 hash-chained audit trail for Sentinel.
//!
//! ## Overview
//!
//! Every decision the engine returns and every OTP state change is wrapped in
//! an `AuditEvent` linked to the previous event by hash. Tampering with any
//! event breaks the chain and is detected by `verify_chain`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sentinel_audit::InMemoryAuditWriter;
//!
//! let audit = Arc::new(InMemoryAuditWriter::new("sentinel-prod-1"));
//! let engine = DecisionEngine::new(policy, audit.clone(), clock);
//! // ...
//! assert!(audit.verify_integrity());
//! ```

pub mod chain;
pub mod event;
pub mod memory;

pub use chain::{hash_event, verify_chain};
pub use event::{AuditEvent, AuditLog};
pub use memory::InMemoryAuditWriter;

// ── Tests ─────────────────────────────────────────────────────────────────────
