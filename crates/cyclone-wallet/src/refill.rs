//! Empty-wallet recovery: balance aggregation and postmix consolidation.
//!
//! When the mixing engine discovers mid-operation that no role holds
//! enough spendable value, it raises an [`EmptyWalletSignal`]. The
//! [`RefillOrchestrator`] then walks a fixed recovery sequence:
//!
//! ```text
//! Running -> EmptyWalletDetected -> BalanceChecked{Insufficient|Sufficient}
//!         -> {ManualWait | Stopping -> Consolidating -> Restarting
//!                          -> {CacheCleared | ManualWait}}
//!         -> Running
//! ```
//!
//! Insufficient total balance is terminal for the attempt and surfaces to
//! the caller; nothing in this module retries automatically.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, info, warn};

use cyclone_core::error::SourceError;
use cyclone_core::traits::{Consolidator, MixHandle, RoleAccount};
use cyclone_core::types::Address;

use crate::config::MixConfig;
use crate::gate::{AckGate, GateOutcome};

/// Signal raised by the mixing engine when no eligible funds remain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyWalletSignal {
    /// Balance, in satoshis, the engine needs to continue.
    pub required_balance: u64,
}

impl EmptyWalletSignal {
    /// Human-readable deposit request for the operator.
    pub fn message_deposit(&self, address: &Address) -> String {
        format!(
            "wallet is empty: deposit at least {} sats to {} to continue mixing",
            self.required_balance, address
        )
    }
}

/// Result of a refill attempt, for the empty-wallet callback.
///
/// `Degraded` hands the original signal back to the caller, which applies
/// the engine's default empty-wallet handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefillOutcome {
    /// Funds were replenished (or the operator acknowledged the deposit
    /// request); the engine may re-read balances and resume.
    Recovered,
    /// Refill failed; the original signal propagates upward.
    Degraded(EmptyWalletSignal),
}

/// Errors raised during a refill attempt.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RefillError {
    /// Total balance across all three roles is below the requirement.
    /// Fatal to the attempt; never retried internally.
    #[error("insufficient balance: total {total} < required {required} (missing {missing})")]
    InsufficientBalance {
        /// Sum of deposit, premix, and postmix balances, in satoshis.
        total: u64,
        /// Balance the mixing engine requires, in satoshis.
        required: u64,
        /// `total - required`; negative when short.
        missing: i64,
    },

    /// A collaborator call failed (balance fetch, address derivation).
    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Drives wallet recovery on the empty-wallet signal.
///
/// Composes the base wallet capability set instead of subclassing it: the
/// mixing engine lifecycle, the three role accounts, and the consolidation
/// service are all held as trait objects.
pub struct RefillOrchestrator {
    mixer: Arc<dyn MixHandle>,
    deposit: Arc<dyn RoleAccount>,
    premix: Arc<dyn RoleAccount>,
    postmix: Arc<dyn RoleAccount>,
    consolidator: Arc<dyn Consolidator>,
    gate: Arc<AckGate>,
    config: MixConfig,
}

impl RefillOrchestrator {
    /// Wire an orchestrator over the wallet's collaborators.
    pub fn new(
        mixer: Arc<dyn MixHandle>,
        deposit: Arc<dyn RoleAccount>,
        premix: Arc<dyn RoleAccount>,
        postmix: Arc<dyn RoleAccount>,
        consolidator: Arc<dyn Consolidator>,
        gate: Arc<AckGate>,
        config: MixConfig,
    ) -> Self {
        Self {
            mixer,
            deposit,
            premix,
            postmix,
            consolidator,
            gate,
            config,
        }
    }

    /// Deposit address query for the presentation layer.
    ///
    /// `increment == false` leaves the role's index counter untouched.
    pub fn deposit_address(&self, increment: bool) -> Result<Address, SourceError> {
        self.deposit.next_address(increment)
    }

    /// Empty-wallet callback: attempt a refill, degrade on any failure.
    ///
    /// Failures are logged and the original signal is returned for the
    /// engine's default handling; they are never swallowed silently.
    pub fn on_empty_wallet(&self, signal: EmptyWalletSignal) -> RefillOutcome {
        match self.try_refill(&signal) {
            Ok(()) => RefillOutcome::Recovered,
            Err(e) => {
                error!(error = %e, "refill failed, degrading to default empty-wallet handling");
                RefillOutcome::Degraded(signal)
            }
        }
    }

    /// Run one refill attempt.
    ///
    /// Aggregates the three role balances, fails fast when the total is
    /// short, and otherwise either waits for a manual deposit or stops the
    /// wallet, consolidates postmix into deposit, and restarts. The
    /// restart is unconditional on the prior running state, not on
    /// consolidation success.
    pub fn try_refill(&self, signal: &EmptyWalletSignal) -> Result<(), RefillError> {
        let deposit_balance = self.deposit.fetch_balance()?;
        let premix_balance = self.premix.fetch_balance()?;
        let postmix_balance = self.postmix.fetch_balance()?;
        let total = deposit_balance
            .saturating_add(premix_balance)
            .saturating_add(postmix_balance);

        let required = signal.required_balance;
        let missing = total as i64 - required as i64;
        debug!(
            deposit_balance,
            premix_balance,
            postmix_balance,
            total,
            required,
            missing,
            "refill balance check"
        );

        if total < required {
            return Err(RefillError::InsufficientBalance {
                total,
                required,
                missing,
            });
        }

        // Display-only address: the counter must not advance for a prompt.
        let deposit_address = self.deposit.next_address(false)?;
        let message = signal.message_deposit(&deposit_address);

        if !self.config.auto_aggregate_postmix {
            self.wait_for_operator(&message);
            return Ok(());
        }

        let was_started = self.mixer.is_started();
        if was_started {
            debug!("stopping wallet for refill consolidation");
            self.mixer.stop();
        }

        info!("deposit wallet is empty, aggregating postmix to refill it");
        let consolidation = self.consolidator.consolidate();

        if was_started {
            debug!("restarting wallet after refill consolidation");
            self.mixer.start();
        }

        match consolidation {
            Ok(()) => {
                self.mixer.clear_cache();
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "postmix consolidation failed, waiting for manual deposit");
                self.wait_for_operator(&message);
                Ok(())
            }
        }
    }

    fn wait_for_operator(&self, message: &str) {
        info!("{message}");
        match self.gate.wait() {
            GateOutcome::Acknowledged => debug!("operator acknowledged deposit request"),
            GateOutcome::Cancelled => warn!("deposit checkpoint cancelled by shutdown"),
        }
    }
}
