//! Collaborators the checkpointing keeper reads from and writes to. The host
//! (a contract, a node, a test) provides them.
use crate::bls::BlsPublicKey;
use crate::error::CheckpointingError;
use crate::types::{RawCheckpointWithMeta, ValidatorSet};

pub trait ValidatorSetProvider {
    /// get_validator_set returns the validators of the epoch, sorted by address
    fn get_validator_set(&self, epoch: u64) -> Result<ValidatorSet, CheckpointingError>;

    fn get_total_voting_power(&self, epoch: u64) -> Result<u64, CheckpointingError> {
        Ok(self.get_validator_set(epoch)?.total_power())
    }
}

pub trait PubKeyRegistry {
    /// get_bls_pub_key fails with `BlsKeyDoesNotExist` for unregistered validators
    fn get_bls_pub_key(&self, addr: &str) -> Result<BlsPublicKey, CheckpointingError>;
}

pub trait CheckpointStore {
    fn get_checkpoint(&self, epoch: u64)
        -> Result<Option<RawCheckpointWithMeta>, CheckpointingError>;

    fn put_checkpoint(&mut self, ckpt: &RawCheckpointWithMeta) -> Result<(), CheckpointingError>;
}

/// Everything the keeper needs from its host
pub trait CheckpointingHost: ValidatorSetProvider + PubKeyRegistry + CheckpointStore {}

impl<T> CheckpointingHost for T where T: ValidatorSetProvider + PubKeyRegistry + CheckpointStore {}
