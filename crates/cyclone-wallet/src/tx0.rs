//! Tx0 construction: splitting deposit funds into mix-eligible outputs.
//!
//! A Tx0 spends one wallet UTXO into `nb_outputs` outputs of identical
//! denominated value (net of the per-participant miner fee), one change
//! output, and one coordinator service-fee output. Construction flow:
//!
//! 1. fetch the role's UTXOs and the current fee rate
//! 2. compute the per-output miner fee (capped) and the destination value
//! 3. select the spend-from UTXO first-fit against the spend threshold
//! 4. re-derive the spend-from address, reserve change/destination indices
//! 5. delegate assembly and signing to the external [`TxAssembler`]
//! 6. broadcast, or hand the raw transaction to the operator if no relay
//!    is configured

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use cyclone_core::constants::{SERVICE_FEE, SERVICE_FEE_XPUB};
use cyclone_core::error::SourceError;
use cyclone_core::protocol::{input_balance_min, tx0_miner_fee_per_output};
use cyclone_core::traits::{FeeSource, RoleAccount, TxAssembler, TxRelay, UtxoSource};
use cyclone_core::types::{Pool, Tx0, Tx0Request, Utxo, WalletRole};

/// Errors raised while funding a Tx0.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Tx0Error {
    /// The request itself is malformed.
    #[error("invalid tx0 request: {0}")]
    InvalidRequest(String),

    /// The role holds no UTXOs at all.
    #[error("no utxos available for {0} role")]
    NoUtxos(WalletRole),

    /// No UTXO meets the spend threshold. Fatal; deposit more funds or
    /// wait for confirmations.
    #[error("no utxo meets the spend threshold of {threshold} sats")]
    NoFundingSource {
        /// Minimum UTXO value that would have funded this Tx0.
        threshold: u64,
    },

    /// The transaction is signed but no relay is configured. The hex
    /// serialization must be surfaced to the operator verbatim for manual
    /// broadcast; it is never a retryable condition.
    #[error("tx0 is ready; broadcast the following transaction manually and restart: {hex}")]
    BroadcastUnavailable {
        /// Hex-encoded signed transaction.
        hex: String,
    },

    /// A collaborator call failed.
    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Builds and funds Tx0 transactions for a wallet role.
pub struct Tx0Builder {
    fee_source: Arc<dyn FeeSource>,
    utxo_source: Arc<dyn UtxoSource>,
    assembler: Arc<dyn TxAssembler>,
    relay: Option<Arc<dyn TxRelay>>,
}

impl Tx0Builder {
    /// Create a builder. `relay` is `None` in environments without network
    /// relay access; Tx0s are then handed to the operator instead of
    /// broadcast.
    pub fn new(
        fee_source: Arc<dyn FeeSource>,
        utxo_source: Arc<dyn UtxoSource>,
        assembler: Arc<dyn TxAssembler>,
        relay: Option<Arc<dyn TxRelay>>,
    ) -> Self {
        Self {
            fee_source,
            utxo_source,
            assembler,
            relay,
        }
    }

    /// Build, sign, and broadcast a Tx0 creating `nb_outputs` mix-eligible
    /// outputs for `pool`, funded from `account`'s role.
    pub fn build(
        &self,
        pool: &Pool,
        account: &dyn RoleAccount,
        nb_outputs: u32,
    ) -> Result<Tx0, Tx0Error> {
        if nb_outputs == 0 {
            return Err(Tx0Error::InvalidRequest("nb_outputs must be non-zero".into()));
        }

        let role = account.role();
        let utxos = self.utxo_source.fetch_utxos(role)?;
        if utxos.is_empty() {
            return Err(Tx0Error::NoUtxos(role));
        }
        info!(count = utxos.len(), %role, "fetched utxos for tx0");

        let fee_rate = self.fee_source.fetch_fee_rate()?;
        let miner_fee_per_output = tx0_miner_fee_per_output(pool, fee_rate);
        debug!(
            fee_rate,
            miner_fee_per_output,
            anonymity_set = pool.anonymity_set,
            "tx0 fee computation"
        );

        let destination_value = input_balance_min(pool.denomination, false, miner_fee_per_output);

        let spend_threshold =
            (nb_outputs as u64).saturating_mul(destination_value.saturating_add(SERVICE_FEE));
        let spend_from = select_spend_from(&utxos, spend_threshold)
            .ok_or(Tx0Error::NoFundingSource { threshold: spend_threshold })?;
        debug!(
            outpoint = %spend_from.outpoint,
            value = spend_from.value,
            spend_threshold,
            "selected tx0 spend-from utxo"
        );

        // Spend-from key is re-derived at the index the UTXO was received
        // at; it never consumes a new index.
        let spend_from_address = account.address_at(spend_from.path.index)?;

        // One atomic reservation covers the change index and the nb_outputs
        // destination indices, persisted before assembly begins.
        let change_index = account.reserve_indices(1 + nb_outputs)?;
        let destination_index = change_index + 1;
        let change_address = account.address_at(change_index)?;

        let request = Tx0Request {
            spend_from: spend_from.outpoint.clone(),
            spend_from_address,
            nb_outputs,
            destination_account: role.account(),
            destination_chain: role.chain(),
            destination_value,
            destination_index,
            change_address,
            fee_rate,
            service_fee_xpub: SERVICE_FEE_XPUB.to_string(),
            service_fee: SERVICE_FEE,
        };
        let tx = self.assembler.assemble_tx0(&request)?;

        let tx0 = Tx0 {
            tx,
            nb_outputs,
            destination_value,
            service_fee: SERVICE_FEE,
            miner_fee_per_output,
        };

        match &self.relay {
            Some(relay) => {
                info!(txid = %tx0.tx.txid, "broadcasting tx0");
                relay.broadcast(&tx0.tx)?;
                Ok(tx0)
            }
            None => Err(Tx0Error::BroadcastUnavailable {
                hex: tx0.tx.to_hex(),
            }),
        }
    }
}

/// First-fit selection: the first UTXO in enumeration order whose value
/// meets the threshold. No optimization for change or fragmentation.
fn select_spend_from(utxos: &[Utxo], threshold: u64) -> Option<&Utxo> {
    utxos.iter().find(|utxo| utxo.value >= threshold)
}
