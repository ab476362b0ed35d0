//! # sentinel-scoring
//!
//! Deterministic scorers for the Sentinel engine:
//!
//! - [`lexicon`]: case-insensitive phrase and filler-word matching.
//! - [`liveness`]: challenge-response verification.
//! - [`stress`]: keyword-weighted stress estimation.
//! - [`scam`]: social-engineering phrase detection.
//! - [`risk`]: weighted aggregation into a leveled verdict.
//!
//! Every function here is pure: no I/O, no shared state, no failure return.
//! They read their tables from a [`sentinel_policy::ScoringPolicy`] and may
//! be called from any number of threads at once.

pub mod lexicon;
pub mod liveness;
pub mod risk;
pub mod scam;
pub mod stress;

// ── Tests ─────────────────────────────────────────────────────────────────────
