//! Core value types: pools, UTXOs, wallet roles, and constructed Tx0s.
//!
//! All monetary values are in satoshis. Everything here is a snapshot or an
//! immutable description; the only mutable wallet state in the system (the
//! per-role address index counter) lives behind the
//! [`RoleAccount`](crate::traits::RoleAccount) seam.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{
    ACCOUNT_DEPOSIT_AND_PREMIX, ACCOUNT_POSTMIX, CHAIN_DEPOSIT_AND_PREMIX, CHAIN_POSTMIX,
};

/// A mixing pool as published by the coordinator's pool catalog.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Pool {
    /// Pool identifier, e.g. "0.1btc".
    pub id: String,
    /// Fixed output value accepted per participant, in satoshis.
    pub denomination: u64,
    /// Number of participants in one mix round.
    pub anonymity_set: u32,
    /// Minimum allowed miner fee per participant, in satoshis.
    pub miner_fee_min: u64,
    /// Maximum allowed miner fee per participant, in satoshis.
    pub miner_fee_max: u64,
}

/// Reference to a specific output of a previous transaction.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct OutPoint {
    /// Hex-encoded transaction id containing the referenced output.
    pub txid: String,
    /// Index of the output within the transaction.
    pub vout: u32,
}

impl fmt::Display for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.txid, self.vout)
    }
}

/// BIP84 derivation location of a wallet output.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct DerivationPath {
    /// Account level (deposit/premix share one, postmix has its own).
    pub account: u32,
    /// Chain level (external/change).
    pub chain: u32,
    /// Address index within the chain.
    pub index: u32,
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "M/{}/{}/{}", self.account, self.chain, self.index)
    }
}

/// An unspent output owned by the wallet.
///
/// Fetched from the UTXO source as a point-in-time snapshot; never mutated.
/// The derivation path is enough to re-derive the spending key.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Utxo {
    /// The outpoint identifying this output on chain.
    pub outpoint: OutPoint,
    /// Value in satoshis.
    pub value: u64,
    /// Derivation path the output was received at.
    pub path: DerivationPath,
}

/// A bech32 address string.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Address(pub String);

impl Address {
    /// The address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A fully signed, serialized transaction produced by the external assembler.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct RawTransaction {
    /// Hex-encoded transaction id.
    pub txid: String,
    /// Raw serialized transaction bytes.
    pub bytes: Vec<u8>,
}

impl RawTransaction {
    /// Hex encoding of the serialized transaction, for manual broadcast.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }
}

/// The three role-segregated wallet segments.
///
/// Each role has its own balance and its own next-unused address index
/// counter. Deposit and Premix share one derivation account/chain pair so
/// that refill consolidation stays address-compatible with the Tx0 spend
/// path; Postmix derives from its own account.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WalletRole {
    /// Unmixed funds awaiting a Tx0.
    Deposit,
    /// Funds committed to an in-progress mix.
    Premix,
    /// Funds that completed mixing.
    Postmix,
}

impl WalletRole {
    /// BIP84 account index this role derives from.
    pub fn account(&self) -> u32 {
        match self {
            Self::Deposit | Self::Premix => ACCOUNT_DEPOSIT_AND_PREMIX,
            Self::Postmix => ACCOUNT_POSTMIX,
        }
    }

    /// BIP84 chain index this role derives from.
    pub fn chain(&self) -> u32 {
        match self {
            Self::Deposit | Self::Premix => CHAIN_DEPOSIT_AND_PREMIX,
            Self::Postmix => CHAIN_POSTMIX,
        }
    }
}

impl fmt::Display for WalletRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Deposit => "deposit",
            Self::Premix => "premix",
            Self::Postmix => "postmix",
        };
        f.write_str(name)
    }
}

/// Full parameter set handed to the external transaction assembler.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Tx0Request {
    /// Outpoint being spent.
    pub spend_from: OutPoint,
    /// Address the spent output was received at (re-derived, not allocated).
    pub spend_from_address: Address,
    /// Number of mix-eligible outputs to create.
    pub nb_outputs: u32,
    /// Account the destination addresses derive from.
    pub destination_account: u32,
    /// Chain the destination addresses derive from.
    pub destination_chain: u32,
    /// Value of each mix-eligible output, in satoshis.
    pub destination_value: u64,
    /// First derivation index for the destination outputs.
    pub destination_index: u32,
    /// Change address for the remainder.
    pub change_address: Address,
    /// Miner fee rate in satoshis per byte.
    pub fee_rate: u64,
    /// Extended public key of the coordinator's service-fee wallet.
    pub service_fee_xpub: String,
    /// Fixed coordinator service fee, in satoshis.
    pub service_fee: u64,
}

/// A constructed Tx0 with its accounting.
///
/// Immutable after construction; ownership passes to the caller once the
/// builder returns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tx0 {
    /// The signed funding transaction.
    pub tx: RawTransaction,
    /// Number of mix-eligible outputs created.
    pub nb_outputs: u32,
    /// Value of each mix-eligible output, in satoshis.
    pub destination_value: u64,
    /// Coordinator service fee paid, in satoshis.
    pub service_fee: u64,
    /// Miner fee per mix-eligible output, in satoshis.
    pub miner_fee_per_output: u64,
}

impl Tx0 {
    /// Total fee paid by this Tx0: service fee plus miner fees.
    pub fn total_fee(&self) -> u64 {
        self.service_fee
            .saturating_add(self.miner_fee_per_output.saturating_mul(self.nb_outputs as u64))
    }
}
