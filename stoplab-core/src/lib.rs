//! StopLab Core — stop-order engine: domain types, trigger evaluation,
//! lifecycle management, OCO pairing.
//!
//! This crate contains the heart of the engine:
//! - Domain types (submissions, stop orders, markets, positions, ids)
//! - Trigger evaluator (price and trailing-percent triggers)
//! - Stop-order book with per-(party, market) active caps and audit trail
//! - Lifecycle manager (trigger firing, reduce-only capping, expiry)
//! - OCO pair coordinator
//! - Per-tick evaluation pass driven by mark-price updates
//!
//! The order book / trading engine, position service, and mark price feed
//! are collaborators behind the seams in [`ports`].

pub mod domain;
pub mod engine;
pub mod ports;
