//! Errors raised by external collaborators.

use thiserror::Error;

/// Failure from one of the collaborator seams in [`traits`](crate::traits).
///
/// Network calls are blocking and never retried by this crate; every variant
/// propagates to the caller as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// Fee-rate lookup failed.
    #[error("fee source: {0}")]
    FeeSource(String),

    /// UTXO listing failed.
    #[error("utxo source: {0}")]
    UtxoSource(String),

    /// Balance fetch failed for a wallet role.
    #[error("balance fetch: {0}")]
    Balance(String),

    /// Address derivation or index reservation failed.
    #[error("address derivation: {0}")]
    Address(String),

    /// The external transaction assembler rejected the request.
    #[error("transaction build: {0}")]
    TxBuild(String),

    /// Transaction relay rejected the broadcast.
    #[error("relay: {0}")]
    Relay(String),

    /// Postmix consolidation failed.
    #[error("consolidation: {0}")]
    Consolidate(String),
}
