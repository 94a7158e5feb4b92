//! # cyclone-wallet — Tx0 funding and empty-wallet refill.
//!
//! The two wallet-level operations of the Cyclone client: building and
//! funding Tx0 transactions (splitting deposit funds into denominated,
//! mix-eligible outputs) and recovering from the empty-wallet condition
//! (aggregating role balances and consolidating postmix funds back into
//! the deposit role).
//!
//! Both operations run synchronously on the caller's thread and speak to
//! the outside world only through the trait seams in [`cyclone_core`].
//!
//! # Modules
//!
//! - [`config`] — `MixConfig` flags
//! - [`gate`] — blocking operator-acknowledgment checkpoint
//! - [`tx0`] — Tx0 builder and its error taxonomy
//! - [`refill`] — empty-wallet signal, refill orchestrator

pub mod config;
pub mod gate;
pub mod refill;
pub mod tx0;

// Re-exports for convenient access
pub use config::MixConfig;
pub use gate::{AckGate, GateOutcome};
pub use refill::{EmptyWalletSignal, RefillError, RefillOrchestrator, RefillOutcome};
pub use tx0::{Tx0Builder, Tx0Error};
