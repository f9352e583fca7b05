use btc_checkpoint_codec::CodecError;
use cosmwasm_std::StdError;
use thiserror::Error;

use crate::types::CheckpointStatus;

#[derive(Error, Debug, PartialEq)]
pub enum CheckpointingError {
    #[error("{0}")]
    Std(#[from] StdError),
    #[error("Raw checkpoint of epoch {0} does not exist")]
    CkptDoesNotExist(u64),
    #[error("Raw checkpoint of epoch {0} already exists")]
    CkptAlreadyExist(u64),
    #[error("Last commit hash does not match the raw checkpoint of epoch {0}")]
    CkptHashNotEqual(u64),
    #[error("Validator set of epoch {0} does not exist")]
    ValidatorSetNotFound(u64),
    #[error("Signer {signer} is not a validator of epoch {epoch}")]
    SignerNotFound { signer: String, epoch: u64 },
    #[error("Validator {0} has already signed this raw checkpoint")]
    AlreadyVoted(String),
    #[error("Invalid BLS signature from {0}")]
    InvalidSignature(String),
    #[error("Checkpoint of epoch {epoch} is {actual}, expected {expected}")]
    InvalidStatusTransition {
        epoch: u64,
        expected: CheckpointStatus,
        actual: CheckpointStatus,
    },
    #[error("Checkpoint of epoch {epoch} cannot move from {from} to {to}")]
    UnsupportedTransition {
        epoch: u64,
        from: CheckpointStatus,
        to: CheckpointStatus,
    },
    #[error("Insufficient voting power: {power} out of {total}")]
    InsufficientVotingPower { power: u64, total: u64 },
    #[error("Invalid BLS multi-signature for epoch {0}: {1}")]
    InvalidMultiSignature(u64, String),
    #[error("Conflicting checkpoint is found for epoch {0}")]
    ConflictingCheckpoint(u64),
    #[error("BLS public key of {0} does not exist")]
    BlsKeyDoesNotExist(String),
    #[error("BLS public key of {0} already exists")]
    BlsKeyAlreadyExist(String),
    #[error("Invalid proof of possession for the BLS key of {0}")]
    InvalidProofOfPossession(String),
    #[error("Invalid BLS public key: {0}")]
    InvalidBlsKey(String),
    #[error("Invalid validator set: {0}")]
    InvalidValidatorSet(String),
    #[error("Invalid raw checkpoint: {0}")]
    InvalidRawCheckpoint(String),
    #[error("Failed to sign with BLS: {0}")]
    SignerFailure(String),
    #[error("{0}")]
    Codec(#[from] CodecError),
    #[error("{0}")]
    Bitcoin(#[from] babylon_bitcoin::error::Error),
}

impl CheckpointingError {
    /// is_fatal tells whether the error proves that two quorum-certified
    /// checkpoints exist for the same epoch. The host must halt on it.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CheckpointingError::ConflictingCheckpoint(_))
    }
}
