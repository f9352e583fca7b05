use babylon_checkpointing::CheckpointingError;
use cosmwasm_std::StdError;
use cw_controllers::AdminError;
use hex::FromHexError;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ContractError {
    #[error("{0}")]
    StdError(#[from] StdError),
    #[error("{0}")]
    Admin(#[from] AdminError),
    #[error("{0}")]
    Checkpointing(#[from] CheckpointingError),
    #[error("{0}")]
    HexError(#[from] FromHexError),
    #[error("Caller is not the admin")]
    Unauthorized,
    #[error("Checkpointing is halted after a conflicting checkpoint of epoch {0}")]
    Halted(u64),
    #[error("Validator set of epoch {0} already exists")]
    ValidatorSetAlreadyExists(u64),
    #[error("Checkpoint of epoch {0} is not sealed yet")]
    CheckpointNotSealed(u64),
    #[error("Invalid submitter address: expected {expected} bytes, got {actual}")]
    InvalidSubmitter { expected: usize, actual: usize },
}
