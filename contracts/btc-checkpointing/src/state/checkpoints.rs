use cosmwasm_std::Storage;
use cw_storage_plus::Map;

use babylon_checkpointing::bls::BlsPublicKey;
use babylon_checkpointing::{
    CheckpointStore, CheckpointingError, PubKeyRegistry, RawCheckpointWithMeta, ValidatorSet,
    ValidatorSetProvider,
};

use crate::state::registry;

/// Map of raw checkpoints by epoch
pub(crate) const CHECKPOINTS: Map<u64, RawCheckpointWithMeta> = Map::new("checkpoints");
/// Map of validator sets by epoch
pub(crate) const VALIDATOR_SETS: Map<u64, ValidatorSet> = Map::new("validator_sets");

/// StorageHost serves the checkpointing keeper from contract storage
pub(crate) struct StorageHost<'a> {
    storage: &'a mut dyn Storage,
}

impl<'a> StorageHost<'a> {
    pub fn new(storage: &'a mut dyn Storage) -> Self {
        StorageHost { storage }
    }
}

impl ValidatorSetProvider for StorageHost<'_> {
    fn get_validator_set(&self, epoch: u64) -> Result<ValidatorSet, CheckpointingError> {
        VALIDATOR_SETS
            .may_load(&*self.storage, epoch)?
            .ok_or(CheckpointingError::ValidatorSetNotFound(epoch))
    }
}

impl PubKeyRegistry for StorageHost<'_> {
    fn get_bls_pub_key(&self, addr: &str) -> Result<BlsPublicKey, CheckpointingError> {
        registry::load_pub_key(&*self.storage, addr)
    }
}

impl CheckpointStore for StorageHost<'_> {
    fn get_checkpoint(
        &self,
        epoch: u64,
    ) -> Result<Option<RawCheckpointWithMeta>, CheckpointingError> {
        Ok(CHECKPOINTS.may_load(&*self.storage, epoch)?)
    }

    fn put_checkpoint(&mut self, ckpt: &RawCheckpointWithMeta) -> Result<(), CheckpointingError> {
        Ok(CHECKPOINTS.save(self.storage, ckpt.epoch(), ckpt)?)
    }
}
