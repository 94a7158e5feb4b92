//! Trait interfaces for the Cyclone client.
//!
//! These traits define the contracts with external collaborators:
//! - [`FeeSource`], [`UtxoSource`], [`RoleAccount`] — wallet backend reads
//! - [`TxAssembler`] — BIP84 transaction construction and signing
//! - [`TxRelay`] — optional transaction broadcast
//! - [`Consolidator`] — postmix sweep back into the deposit role
//! - [`MixHandle`] — mixing engine lifecycle
//!
//! All calls are blocking and execute on the caller's thread; this crate
//! introduces no retries and no background scheduling of its own.

use crate::error::SourceError;
use crate::types::{Address, RawTransaction, Tx0Request, Utxo, WalletRole};

/// Current miner fee rate estimation.
pub trait FeeSource: Send + Sync {
    /// Fetch the current fee rate in satoshis per byte.
    fn fetch_fee_rate(&self) -> Result<u64, SourceError>;
}

/// Point-in-time listing of a wallet role's unspent outputs.
pub trait UtxoSource: Send + Sync {
    /// Fetch the UTXOs of a wallet role, in backend enumeration order.
    ///
    /// The order is significant: Tx0 funding selection is first-fit over
    /// this sequence.
    fn fetch_utxos(&self, role: WalletRole) -> Result<Vec<Utxo>, SourceError>;
}

/// Address and balance surface of one wallet role.
///
/// The implementation owns the role's next-unused address index counter.
/// [`reserve_indices`](Self::reserve_indices) must be atomic with respect
/// to concurrent callers: two concurrent Tx0 builds on the same role must
/// never receive overlapping index ranges.
pub trait RoleAccount: Send + Sync {
    /// The wallet role this account backs.
    fn role(&self) -> WalletRole;

    /// Fetch the role's confirmed balance in satoshis.
    fn fetch_balance(&self) -> Result<u64, SourceError>;

    /// The role's next receive address.
    ///
    /// With `increment == false` the index counter is left untouched
    /// (display-only queries); with `increment == true` the address is
    /// consumed and the counter advances by one.
    fn next_address(&self, increment: bool) -> Result<Address, SourceError>;

    /// Re-derive the address at a known index. Never allocates a new index.
    fn address_at(&self, index: u32) -> Result<Address, SourceError>;

    /// Atomically advance the index counter by `count`, returning the first
    /// reserved index. The reservation is persisted before this returns.
    fn reserve_indices(&self, count: u32) -> Result<u32, SourceError>;
}

/// External BIP84 transaction builder.
///
/// Given a complete [`Tx0Request`], produces a fully signed, serialized
/// transaction. Script and signature logic live entirely behind this seam.
pub trait TxAssembler: Send + Sync {
    /// Build and sign a Tx0 from the given parameters.
    fn assemble_tx0(&self, request: &Tx0Request) -> Result<RawTransaction, SourceError>;
}

/// Transaction relay service. Optional: environments without relay access
/// run without one, and Tx0 construction then hands the raw transaction to
/// a human operator instead of broadcasting.
pub trait TxRelay: Send + Sync {
    /// Broadcast a signed transaction to the network.
    fn broadcast(&self, tx: &RawTransaction) -> Result<(), SourceError>;
}

/// Sweeps postmix funds back into the deposit role.
pub trait Consolidator: Send + Sync {
    /// Consolidate postmix outputs into the deposit account.
    fn consolidate(&self) -> Result<(), SourceError>;
}

/// Lifecycle surface of the mixing engine.
///
/// `stop` must complete synchronously: when it returns, no mix round is in
/// flight and wallet funds may be moved safely.
pub trait MixHandle: Send + Sync {
    /// Start (or restart) mixing participation.
    fn start(&self);

    /// Stop mixing participation, halting any in-flight round cleanly.
    fn stop(&self);

    /// Whether the engine is currently started.
    fn is_started(&self) -> bool;

    /// Invalidate any cached balance view so fresh balances are re-read.
    fn clear_cache(&self);
}
