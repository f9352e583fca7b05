use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};

use babylon_bitcoin::op_return::build_op_return_script;
use babylon_bitcoin::serialize;
use babylon_checkpointing::bls::{self, BlsPublicKey};
use babylon_checkpointing::{
    BlsSigner, CheckpointStatusEvent, CheckpointStore, CheckpointingError, CheckpointingHooks,
    LocalBlsSigner, PubKeyRegistry, RawCheckpoint, RawCheckpointWithMeta, Validator,
    ValidatorSet, ValidatorSetProvider,
};
use bitcoin::absolute::LockTime;
use bitcoin::transaction::Version;
use bitcoin::{Amount, ScriptBuf, Transaction, TxIn, TxOut};
use bitvec::prelude::*;
use cosmwasm_std::Binary;
use rand::RngCore;

/// A validator together with its BLS signer
#[derive(Clone, Debug)]
pub struct TestValidator {
    pub signer: LocalBlsSigner,
    pub power: u64,
}

impl TestValidator {
    /// new derives a deterministic BLS key from the seed
    pub fn new(addr: impl Into<String>, seed: u8, power: u64) -> Self {
        TestValidator {
            signer: LocalBlsSigner::from_seed(addr, &[seed; 32]).unwrap(),
            power,
        }
    }

    pub fn addr(&self) -> &str {
        self.signer.address()
    }

    pub fn pub_key(&self) -> BlsPublicKey {
        self.signer.bls_pub_key()
    }

    pub fn pub_key_bytes(&self) -> Binary {
        Binary::from(self.pub_key().compress().to_vec())
    }

    pub fn pop_bytes(&self) -> Binary {
        Binary::from(self.signer.proof_of_possession().compress().to_vec())
    }

    /// sign returns the compressed signature of the validator on the checkpoint
    /// of the given epoch
    pub fn sign(&self, epoch: u64, last_commit_hash: &[u8]) -> Binary {
        let msg = babylon_checkpointing::signed_msg(epoch, last_commit_hash);
        let sig = self.signer.sign_msg_with_bls(&msg).unwrap();
        Binary::from(sig.compress().to_vec())
    }
}

/// gen_validators creates validators named `val0`, `val1`, ... with the
/// given powers
pub fn gen_validators(powers: &[u64]) -> Vec<TestValidator> {
    powers
        .iter()
        .enumerate()
        .map(|(i, power)| TestValidator::new(format!("val{i}"), i as u8 + 1, *power))
        .collect()
}

pub fn validator_set(vals: &[TestValidator]) -> ValidatorSet {
    ValidatorSet::new(
        vals.iter()
            .map(|val| Validator {
                addr: val.addr().to_string(),
                power: val.power,
            })
            .collect(),
    )
    .unwrap()
}

pub fn random_last_commit_hash() -> Vec<u8> {
    let mut hash = vec![0u8; 32];
    rand::thread_rng().fill_bytes(&mut hash);
    hash
}

/// signed_checkpoint builds the checkpoint carrying the aggregate signature of
/// the given signers
pub fn signed_checkpoint(
    set: &ValidatorSet,
    signers: &[&TestValidator],
    epoch: u64,
    last_commit_hash: &[u8],
) -> RawCheckpoint {
    let mut ckpt = RawCheckpoint::new(epoch, last_commit_hash).unwrap();
    let mut bitmap = ckpt.bitmap.to_vec();
    let mut agg: Option<Binary> = None;

    for val in signers {
        let (index, _) = set.find_validator_with_index(val.addr()).unwrap();
        bitmap.view_bits_mut::<Lsb0>().set(index, true);
        let sig = val.sign(epoch, last_commit_hash);
        agg = Some(match agg {
            None => sig,
            Some(agg) => Binary::from(bls::aggregate(&agg, &sig).unwrap().to_vec()),
        });
    }

    ckpt.bitmap = Binary::from(bitmap);
    ckpt.bls_multi_sig = agg;
    ckpt
}

/// op_return_tx returns a serialized BTC transaction whose only output
/// carries the data in OP_RETURN
pub fn op_return_tx(data: &[u8]) -> Vec<u8> {
    op_return_tx_with_outputs(vec![build_op_return_script(data).unwrap()])
}

pub fn op_return_tx_with_outputs(scripts: Vec<ScriptBuf>) -> Vec<u8> {
    let tx = Transaction {
        version: Version::TWO,
        lock_time: LockTime::ZERO,
        input: vec![TxIn::default()],
        output: scripts
            .into_iter()
            .map(|script_pubkey| TxOut {
                value: Amount::ZERO,
                script_pubkey,
            })
            .collect(),
    };
    serialize(&tx)
}

/// In-memory host for the checkpointing keeper
#[derive(Default)]
pub struct MockHost {
    pub validator_sets: HashMap<u64, ValidatorSet>,
    pub pub_keys: HashMap<String, BlsPublicKey>,
    pub checkpoints: BTreeMap<u64, RawCheckpointWithMeta>,
}

impl MockHost {
    /// new registers the validators for the given epochs along with their keys
    pub fn new(vals: &[TestValidator], epochs: impl IntoIterator<Item = u64>) -> Self {
        let set = validator_set(vals);
        MockHost {
            validator_sets: epochs.into_iter().map(|e| (e, set.clone())).collect(),
            pub_keys: vals
                .iter()
                .map(|val| (val.addr().to_string(), val.pub_key()))
                .collect(),
            checkpoints: BTreeMap::new(),
        }
    }
}

impl ValidatorSetProvider for MockHost {
    fn get_validator_set(&self, epoch: u64) -> Result<ValidatorSet, CheckpointingError> {
        self.validator_sets
            .get(&epoch)
            .cloned()
            .ok_or(CheckpointingError::ValidatorSetNotFound(epoch))
    }
}

impl PubKeyRegistry for MockHost {
    fn get_bls_pub_key(&self, addr: &str) -> Result<BlsPublicKey, CheckpointingError> {
        self.pub_keys
            .get(addr)
            .copied()
            .ok_or_else(|| CheckpointingError::BlsKeyDoesNotExist(addr.to_string()))
    }
}

impl CheckpointStore for MockHost {
    fn get_checkpoint(
        &self,
        epoch: u64,
    ) -> Result<Option<RawCheckpointWithMeta>, CheckpointingError> {
        Ok(self.checkpoints.get(&epoch).cloned())
    }

    fn put_checkpoint(&mut self, ckpt: &RawCheckpointWithMeta) -> Result<(), CheckpointingError> {
        self.checkpoints.insert(ckpt.epoch(), ckpt.clone());
        Ok(())
    }
}

/// Hooks recording every call, optionally failing all of them
#[derive(Default)]
pub struct RecordingHooks {
    pub events: RefCell<Vec<CheckpointStatusEvent>>,
    pub conflicts: RefCell<Vec<(RawCheckpointWithMeta, RawCheckpoint)>>,
    pub fail: bool,
}

impl RecordingHooks {
    pub fn failing() -> Self {
        RecordingHooks {
            fail: true,
            ..Default::default()
        }
    }

    pub fn event_types(&self) -> Vec<&'static str> {
        self.events.borrow().iter().map(|e| e.event_type()).collect()
    }
}

impl CheckpointingHooks for RecordingHooks {
    fn after_status_change(&self, event: &CheckpointStatusEvent) -> Result<(), String> {
        self.events.borrow_mut().push(event.clone());
        if self.fail {
            return Err("hook failure".to_string());
        }
        Ok(())
    }

    fn after_conflicting_checkpoint(
        &self,
        local: &RawCheckpointWithMeta,
        recovered: &RawCheckpoint,
    ) -> Result<(), String> {
        self.conflicts
            .borrow_mut()
            .push((local.clone(), recovered.clone()));
        if self.fail {
            return Err("hook failure".to_string());
        }
        Ok(())
    }
}
