//! End-to-end exercise of the refill-then-fund cycle against an in-memory
//! wallet backend: a Tx0 attempt fails for lack of funds, the empty-wallet
//! signal triggers postmix consolidation, and the replenished deposit role
//! then funds a Tx0.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;

use cyclone_core::error::SourceError;
use cyclone_core::traits::{
    Consolidator, FeeSource, MixHandle, RoleAccount, TxAssembler, TxRelay, UtxoSource,
};
use cyclone_core::types::{
    Address, DerivationPath, OutPoint, Pool, RawTransaction, Tx0Request, Utxo, WalletRole,
};
use cyclone_wallet::{
    AckGate, EmptyWalletSignal, MixConfig, RefillOrchestrator, RefillOutcome, Tx0Builder, Tx0Error,
};

// ----------------------------------------------------------------------
// In-memory wallet backend shared by all collaborators
// ----------------------------------------------------------------------

struct Backend {
    balances: Mutex<HashMap<WalletRole, u64>>,
    deposit_utxos: Mutex<Vec<Utxo>>,
    indices: Mutex<HashMap<WalletRole, u32>>,
}

impl Backend {
    fn new(deposit: u64, premix: u64, postmix: u64) -> Arc<Self> {
        let mut balances = HashMap::new();
        balances.insert(WalletRole::Deposit, deposit);
        balances.insert(WalletRole::Premix, premix);
        balances.insert(WalletRole::Postmix, postmix);
        Arc::new(Self {
            balances: Mutex::new(balances),
            deposit_utxos: Mutex::new(Vec::new()),
            indices: Mutex::new(HashMap::new()),
        })
    }

    fn add_deposit_utxo(&self, value: u64, index: u32) {
        self.deposit_utxos.lock().push(Utxo {
            outpoint: OutPoint {
                txid: format!("{index:064x}"),
                vout: 0,
            },
            value,
            path: DerivationPath {
                account: WalletRole::Deposit.account(),
                chain: WalletRole::Deposit.chain(),
                index,
            },
        });
    }
}

struct BackendAccount {
    backend: Arc<Backend>,
    role: WalletRole,
}

impl RoleAccount for BackendAccount {
    fn role(&self) -> WalletRole {
        self.role
    }

    fn fetch_balance(&self) -> Result<u64, SourceError> {
        Ok(*self.backend.balances.lock().get(&self.role).unwrap_or(&0))
    }

    fn next_address(&self, increment: bool) -> Result<Address, SourceError> {
        let mut indices = self.backend.indices.lock();
        let slot = indices.entry(self.role).or_insert(0);
        let index = *slot;
        if increment {
            *slot += 1;
        }
        drop(indices);
        self.address_at(index)
    }

    fn address_at(&self, index: u32) -> Result<Address, SourceError> {
        Ok(Address(format!("bc1q{}-{}", self.role, index)))
    }

    fn reserve_indices(&self, count: u32) -> Result<u32, SourceError> {
        let mut indices = self.backend.indices.lock();
        let slot = indices.entry(self.role).or_insert(0);
        let start = *slot;
        *slot += count;
        Ok(start)
    }
}

struct BackendUtxoSource(Arc<Backend>);

impl UtxoSource for BackendUtxoSource {
    fn fetch_utxos(&self, role: WalletRole) -> Result<Vec<Utxo>, SourceError> {
        match role {
            WalletRole::Deposit => Ok(self.0.deposit_utxos.lock().clone()),
            _ => Ok(Vec::new()),
        }
    }
}

/// Consolidation actually moves the postmix balance into deposit and
/// surfaces it as a new spendable deposit UTXO.
struct BackendConsolidator(Arc<Backend>);

impl Consolidator for BackendConsolidator {
    fn consolidate(&self) -> Result<(), SourceError> {
        let mut balances = self.0.balances.lock();
        let swept = balances.insert(WalletRole::Postmix, 0).unwrap_or(0);
        let deposit = balances.entry(WalletRole::Deposit).or_insert(0);
        *deposit += swept;
        let new_balance = *deposit;
        drop(balances);
        self.0.add_deposit_utxo(new_balance, 90);
        Ok(())
    }
}

struct FixedFeeSource(u64);

impl FeeSource for FixedFeeSource {
    fn fetch_fee_rate(&self) -> Result<u64, SourceError> {
        Ok(self.0)
    }
}

#[derive(Default)]
struct TestMixer {
    started: AtomicBool,
    cache_clears: AtomicUsize,
}

impl MixHandle for TestMixer {
    fn start(&self) {
        self.started.store(true, Ordering::SeqCst);
    }

    fn stop(&self) {
        self.started.store(false, Ordering::SeqCst);
    }

    fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    fn clear_cache(&self) {
        self.cache_clears.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
struct RecordingAssembler {
    requests: Mutex<Vec<Tx0Request>>,
}

impl TxAssembler for RecordingAssembler {
    fn assemble_tx0(&self, request: &Tx0Request) -> Result<RawTransaction, SourceError> {
        self.requests.lock().push(request.clone());
        Ok(RawTransaction {
            txid: "cc".repeat(32),
            bytes: vec![0x02, 0x00, 0x00, 0x00],
        })
    }
}

#[derive(Default)]
struct RecordingRelay {
    broadcasts: AtomicUsize,
}

impl TxRelay for RecordingRelay {
    fn broadcast(&self, _tx: &RawTransaction) -> Result<(), SourceError> {
        self.broadcasts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn pool() -> Pool {
    Pool {
        id: "0.001btc".into(),
        denomination: 100_000,
        anonymity_set: 5,
        miner_fee_min: 100,
        miner_fee_max: 5_000,
    }
}

fn orchestrator_for(backend: &Arc<Backend>, mixer: &Arc<TestMixer>, auto: bool) -> (RefillOrchestrator, Arc<AckGate>) {
    let gate = Arc::new(AckGate::new());
    let orchestrator = RefillOrchestrator::new(
        Arc::clone(mixer) as Arc<dyn MixHandle>,
        Arc::new(BackendAccount {
            backend: Arc::clone(backend),
            role: WalletRole::Deposit,
        }),
        Arc::new(BackendAccount {
            backend: Arc::clone(backend),
            role: WalletRole::Premix,
        }),
        Arc::new(BackendAccount {
            backend: Arc::clone(backend),
            role: WalletRole::Postmix,
        }),
        Arc::new(BackendConsolidator(Arc::clone(backend))),
        Arc::clone(&gate),
        MixConfig {
            auto_aggregate_postmix: auto,
        },
    );
    (orchestrator, gate)
}

#[test]
fn refill_replenishes_deposit_and_funds_tx0() {
    // Deposit holds one small utxo; postmix holds plenty.
    let backend = Backend::new(10_000, 5_000, 500_000);
    backend.add_deposit_utxo(10_000, 3);

    let assembler = Arc::new(RecordingAssembler::default());
    let relay = Arc::new(RecordingRelay::default());
    let builder = Tx0Builder::new(
        Arc::new(FixedFeeSource(10)),
        Arc::new(BackendUtxoSource(Arc::clone(&backend))),
        Arc::clone(&assembler) as Arc<dyn TxAssembler>,
        Some(Arc::clone(&relay) as Arc<dyn TxRelay>),
    );
    let deposit_account = BackendAccount {
        backend: Arc::clone(&backend),
        role: WalletRole::Deposit,
    };

    // Not enough deposit funds for 3 outputs: threshold is 316_500.
    let err = builder.build(&pool(), &deposit_account, 3).unwrap_err();
    assert_eq!(err, Tx0Error::NoFundingSource { threshold: 316_500 });

    // The mixing engine reports the empty wallet; auto-aggregate recovers.
    let mixer = Arc::new(TestMixer::default());
    mixer.start();
    let (orchestrator, _gate) = orchestrator_for(&backend, &mixer, true);
    let outcome = orchestrator.on_empty_wallet(EmptyWalletSignal {
        required_balance: 320_000,
    });
    assert_eq!(outcome, RefillOutcome::Recovered);
    assert!(mixer.is_started());
    assert_eq!(mixer.cache_clears.load(Ordering::SeqCst), 1);

    // Postmix was swept into deposit.
    assert_eq!(
        *backend.balances.lock().get(&WalletRole::Postmix).unwrap(),
        0
    );
    assert_eq!(
        *backend.balances.lock().get(&WalletRole::Deposit).unwrap(),
        510_000
    );

    // The consolidated utxo now funds the Tx0.
    let tx0 = builder.build(&pool(), &deposit_account, 3).unwrap();
    assert_eq!(tx0.nb_outputs, 3);
    assert_eq!(tx0.destination_value, 95_500);
    assert_eq!(relay.broadcasts.load(Ordering::SeqCst), 1);

    let requests = assembler.requests.lock();
    assert_eq!(requests.len(), 1);
    // Spend-from re-derived at the consolidated utxo's path index.
    assert_eq!(requests[0].spend_from_address, Address("bc1qdeposit-90".into()));
    // Change consumed index 0, destinations start at 1.
    assert_eq!(requests[0].change_address, Address("bc1qdeposit-0".into()));
    assert_eq!(requests[0].destination_index, 1);
    assert_eq!(
        *backend.indices.lock().get(&WalletRole::Deposit).unwrap(),
        4
    );
}

#[test]
fn insufficient_total_balance_degrades_without_touching_funds() {
    let backend = Backend::new(10_000, 5_000, 20_000);
    let mixer = Arc::new(TestMixer::default());
    mixer.start();
    let (orchestrator, _gate) = orchestrator_for(&backend, &mixer, true);

    let signal = EmptyWalletSignal {
        required_balance: 50_000,
    };
    let outcome = orchestrator.on_empty_wallet(signal.clone());

    assert_eq!(outcome, RefillOutcome::Degraded(signal));
    assert!(mixer.is_started());
    assert_eq!(
        *backend.balances.lock().get(&WalletRole::Postmix).unwrap(),
        20_000
    );
    assert_eq!(mixer.cache_clears.load(Ordering::SeqCst), 0);
}

#[test]
fn manual_mode_blocks_until_operator_acknowledges() {
    let backend = Backend::new(10_000, 5_000, 20_000);
    let mixer = Arc::new(TestMixer::default());
    mixer.start();
    let (orchestrator, gate) = orchestrator_for(&backend, &mixer, false);

    let acker = {
        let gate = Arc::clone(&gate);
        std::thread::spawn(move || {
            std::thread::sleep(std::time::Duration::from_millis(50));
            gate.acknowledge();
        })
    };

    let outcome = orchestrator.on_empty_wallet(EmptyWalletSignal {
        required_balance: 30_000,
    });
    acker.join().unwrap();

    assert_eq!(outcome, RefillOutcome::Recovered);
    // Manual checkpoint never moves funds.
    assert_eq!(
        *backend.balances.lock().get(&WalletRole::Postmix).unwrap(),
        20_000
    );
    // Display address left the deposit index untouched.
    assert_eq!(
        backend
            .indices
            .lock()
            .get(&WalletRole::Deposit)
            .copied()
            .unwrap_or(0),
        0
    );
}

#[test]
fn relayless_environment_surfaces_raw_transaction() {
    let backend = Backend::new(500_000, 0, 0);
    backend.add_deposit_utxo(500_000, 0);

    let builder = Tx0Builder::new(
        Arc::new(FixedFeeSource(10)),
        Arc::new(BackendUtxoSource(Arc::clone(&backend))),
        Arc::new(RecordingAssembler::default()) as Arc<dyn TxAssembler>,
        None,
    );
    let deposit_account = BackendAccount {
        backend: Arc::clone(&backend),
        role: WalletRole::Deposit,
    };

    let err = builder.build(&pool(), &deposit_account, 3).unwrap_err();
    match err {
        Tx0Error::BroadcastUnavailable { hex } => assert_eq!(hex, "02000000"),
        other => panic!("expected BroadcastUnavailable, got {other:?}"),
    }
}
