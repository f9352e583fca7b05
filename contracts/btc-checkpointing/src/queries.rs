use cosmwasm_std::{Binary, Deps, StdResult};

use babylon_checkpointing::btc::encode_checkpoint;
use babylon_checkpointing::{
    CheckpointStatus, CheckpointingError, RawCheckpointWithMeta, ValidatorSet,
};
use btc_checkpoint_codec::{ADDRESS_LEN, CURRENT_VERSION};

use crate::error::ContractError;
use crate::msg::EncodedCheckpointResponse;
use crate::state::checkpoints::{CHECKPOINTS, VALIDATOR_SETS};
use crate::state::config::{Config, CONFIG, CONFLICT};
use crate::state::registry::BLS_KEYS;

pub fn config(deps: Deps) -> StdResult<Config> {
    CONFIG.load(deps.storage)
}

pub fn checkpoint(deps: Deps, epoch: u64) -> Result<RawCheckpointWithMeta, ContractError> {
    CHECKPOINTS
        .may_load(deps.storage, epoch)?
        .ok_or_else(|| CheckpointingError::CkptDoesNotExist(epoch).into())
}

pub fn status(deps: Deps, epoch: u64) -> Result<CheckpointStatus, ContractError> {
    Ok(checkpoint(deps, epoch)?.status)
}

pub fn validator_set(deps: Deps, epoch: u64) -> Result<ValidatorSet, ContractError> {
    VALIDATOR_SETS
        .may_load(deps.storage, epoch)?
        .ok_or_else(|| CheckpointingError::ValidatorSetNotFound(epoch).into())
}

pub fn bls_public_key(deps: Deps, address: String) -> StdResult<Option<Binary>> {
    BLS_KEYS.may_load(deps.storage, &address)
}

/// encoded_checkpoint returns what a submitter puts on BTC for the checkpoint
/// of an epoch
pub fn encoded_checkpoint(
    deps: Deps,
    epoch: u64,
    submitter: String,
) -> Result<EncodedCheckpointResponse, ContractError> {
    let submitter = hex::decode(submitter)?;
    if submitter.len() != ADDRESS_LEN {
        return Err(ContractError::InvalidSubmitter {
            expected: ADDRESS_LEN,
            actual: submitter.len(),
        });
    }
    let ckpt = checkpoint(deps, epoch)?;
    if ckpt.status == CheckpointStatus::Accumulating {
        return Err(ContractError::CheckpointNotSealed(epoch));
    }

    let tag = config(deps)?
        .tag()
        .map_err(CheckpointingError::from)?;
    let (first_part, second_part) =
        encode_checkpoint(&tag, CURRENT_VERSION, &ckpt.ckpt, &submitter)?;
    Ok(EncodedCheckpointResponse {
        first_part: Binary::from(first_part),
        second_part: Binary::from(second_part),
    })
}

pub fn conflict(deps: Deps) -> StdResult<Option<u64>> {
    CONFLICT.may_load(deps.storage)
}
