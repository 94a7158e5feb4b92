//! Protocol constants. All monetary values in satoshis.

/// Base size contribution of a Tx0, in bytes, before per-participant inputs.
pub const TX0_BYTES_INITIAL: u64 = 200;

/// Additional Tx0 size per mix participant, in bytes.
pub const TX0_BYTES_PER_PARTICIPANT: u64 = 50;

/// Fixed coordinator service fee paid by each mix-eligible output, in satoshis.
pub const SERVICE_FEE: u64 = 10_000;

/// Extended public key of the coordinator's service-fee wallet.
///
/// Every Tx0 pays [`SERVICE_FEE`] to an address derived from this key.
pub const SERVICE_FEE_XPUB: &str =
    "vpub5YS8pQgZKVbrSn9wtrmydDWmWMjHrxL2mBCZ81BDp7Z2QyCgTLZCrnBprufuoUJaQu1ZeiRvUkvdQTNqV6hS96WbbVZgweFxYR1RXYkBcKt";

/// BIP84 account shared by the deposit and premix roles.
///
/// The two roles deliberately derive from one account/chain pair so that
/// postmix consolidation lands on addresses the Tx0 spend path can reuse.
pub const ACCOUNT_DEPOSIT_AND_PREMIX: u32 = 0;

/// BIP84 chain shared by the deposit and premix roles.
pub const CHAIN_DEPOSIT_AND_PREMIX: u32 = 0;

/// BIP84 account holding funds that completed mixing.
pub const ACCOUNT_POSTMIX: u32 = 1;

/// BIP84 chain for the postmix role.
pub const CHAIN_POSTMIX: u32 = 0;
