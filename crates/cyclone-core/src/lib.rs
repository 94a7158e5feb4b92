//! # cyclone-core — shared types and collaborator seams.
//!
//! Core vocabulary of the Cyclone coinjoin client: pool and UTXO types,
//! wallet roles, the pure protocol-level fee/balance formulas, and the
//! trait contracts for every external collaborator (wallet backend,
//! transaction assembler, relay, consolidation service, mixing engine).
//!
//! # Modules
//!
//! - [`constants`] — protocol constants and well-known derivation indices
//! - [`error`] — `SourceError` for collaborator failures
//! - [`protocol`] — bit-exact fee and balance formulas
//! - [`traits`] — collaborator trait seams
//! - [`types`] — pools, UTXOs, roles, Tx0 accounting

pub mod constants;
pub mod error;
pub mod protocol;
pub mod traits;
pub mod types;

// Re-exports for convenient access
pub use error::SourceError;
pub use traits::{Consolidator, FeeSource, MixHandle, RoleAccount, TxAssembler, TxRelay, UtxoSource};
pub use types::{
    Address, DerivationPath, OutPoint, Pool, RawTransaction, Tx0, Tx0Request, Utxo, WalletRole,
};
