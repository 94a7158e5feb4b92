//! Pure protocol-level fee and balance formulas.
//!
//! These functions must match the coordinator's math bit-exactly: every
//! client in a round has to compute the same destination value or the
//! round's outputs will not be uniform. Integer satoshi arithmetic only.

use crate::constants::{TX0_BYTES_INITIAL, TX0_BYTES_PER_PARTICIPANT};
use crate::types::Pool;

/// Miner fee charged to each mix-eligible output of a Tx0.
///
/// Linear in the estimated mix transaction size
/// (`TX0_BYTES_INITIAL + TX0_BYTES_PER_PARTICIPANT * anonymity_set`),
/// scaled by the current fee rate and capped at the pool's
/// `miner_fee_max`.
pub fn tx0_miner_fee_per_output(pool: &Pool, fee_rate: u64) -> u64 {
    let bytes = TX0_BYTES_INITIAL
        .saturating_add(TX0_BYTES_PER_PARTICIPANT.saturating_mul(pool.anonymity_set as u64));
    bytes.saturating_mul(fee_rate).min(pool.miner_fee_max)
}

/// Minimum input balance funding one mix-eligible output.
///
/// For a must-mix input (`liquidity == false`) the value is the pool
/// denomination net of the per-participant miner fee, saturating at zero.
/// Liquidity inputs pay no miner fee and enter at the denomination itself.
pub fn input_balance_min(denomination: u64, liquidity: bool, miner_fee: u64) -> u64 {
    if liquidity {
        denomination
    } else {
        denomination.saturating_sub(miner_fee)
    }
}
