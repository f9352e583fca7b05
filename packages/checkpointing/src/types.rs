use std::fmt;

use bitvec::prelude::*;
use cosmwasm_schema::cw_serde;
use cosmwasm_std::Binary;

use btc_checkpoint_codec::{
    ADDRESS_LEN, APPLICATION_DATA_LEN, BITMAP_LEN, BLS_SIG_LEN, LAST_COMMIT_HASH_LEN,
};

use crate::error::CheckpointingError;

/// Largest validator set a bitmap can index
pub const MAX_VALIDATORS: usize = BITMAP_LEN * 8;

/// Lifecycle of a raw checkpoint.
///
/// `Forgotten` is the label of the reorg transition out of `Submitted`. A
/// forgotten checkpoint is stored back as `Sealed`, ready for resubmission.
#[cw_serde]
#[derive(Copy, Eq, Hash)]
pub enum CheckpointStatus {
    Accumulating,
    Sealed,
    Submitted,
    Confirmed,
    Finalized,
    Forgotten,
}

impl CheckpointStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckpointStatus::Accumulating => "accumulating",
            CheckpointStatus::Sealed => "sealed",
            CheckpointStatus::Submitted => "submitted",
            CheckpointStatus::Confirmed => "confirmed",
            CheckpointStatus::Finalized => "finalized",
            CheckpointStatus::Forgotten => "forgotten",
        }
    }

    /// can_transition_to tells whether `to` is reachable from `self` in one step
    pub fn can_transition_to(&self, to: CheckpointStatus) -> bool {
        use CheckpointStatus::*;
        matches!(
            (self, to),
            (Accumulating, Sealed)
                | (Sealed, Submitted)
                | (Submitted, Confirmed)
                | (Confirmed, Finalized)
                | (Submitted, Forgotten)
        )
    }

    /// stored is the status a record keeps after moving to `self`
    pub fn stored(&self) -> CheckpointStatus {
        match self {
            CheckpointStatus::Forgotten => CheckpointStatus::Sealed,
            status => *status,
        }
    }
}

impl fmt::Display for CheckpointStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// signed_msg is what validators sign for an epoch: `epoch (8, BE) || last_commit_hash`
pub fn signed_msg(epoch_num: u64, last_commit_hash: &[u8]) -> Vec<u8> {
    let mut msg_bytes = epoch_num.to_be_bytes().to_vec();
    msg_bytes.extend_from_slice(last_commit_hash);
    msg_bytes
}

#[cw_serde]
pub struct RawCheckpoint {
    pub epoch_num: u64,
    /// Hash of the last block of the epoch
    pub last_commit_hash: Binary,
    /// Bit i is set iff the validator at index i contributed to the multi-signature
    pub bitmap: Binary,
    pub bls_multi_sig: Option<Binary>,
}

impl RawCheckpoint {
    /// new creates an unsigned raw checkpoint with an empty bitmap
    pub fn new(epoch_num: u64, last_commit_hash: &[u8]) -> Result<Self, CheckpointingError> {
        if last_commit_hash.len() != LAST_COMMIT_HASH_LEN {
            return Err(CheckpointingError::InvalidRawCheckpoint(format!(
                "last commit hash must be {LAST_COMMIT_HASH_LEN} bytes, got {}",
                last_commit_hash.len()
            )));
        }
        Ok(RawCheckpoint {
            epoch_num,
            last_commit_hash: Binary::from(last_commit_hash),
            bitmap: Binary::from(vec![0u8; BITMAP_LEN]),
            bls_multi_sig: None,
        })
    }

    pub fn signed_msg(&self) -> Vec<u8> {
        signed_msg(self.epoch_num, &self.last_commit_hash)
    }

    /// validate_basic checks the field lengths of a signed checkpoint
    pub fn validate_basic(&self) -> Result<(), CheckpointingError> {
        let invalid = CheckpointingError::InvalidRawCheckpoint;
        if self.last_commit_hash.len() != LAST_COMMIT_HASH_LEN {
            return Err(invalid("invalid last commit hash length".to_string()));
        }
        if self.bitmap.len() != BITMAP_LEN {
            return Err(invalid("invalid bitmap length".to_string()));
        }
        match &self.bls_multi_sig {
            Some(sig) if sig.len() == BLS_SIG_LEN => Ok(()),
            Some(_) => Err(invalid("invalid BLS multi-signature length".to_string())),
            None => Err(invalid("missing BLS multi-signature".to_string())),
        }
    }

    pub fn has_voted(&self, index: usize) -> bool {
        self.bitmap
            .view_bits::<Lsb0>()
            .get(index)
            .map(|bit| *bit)
            .unwrap_or(false)
    }

    /// to_app_data lays out the checkpoint as
    /// `last_commit_hash(32) | bitmap(13) | bls_multi_sig(48) | submitter(20)`
    pub fn to_app_data(&self, submitter: &[u8]) -> Result<Vec<u8>, CheckpointingError> {
        self.validate_basic()?;
        if submitter.len() != ADDRESS_LEN {
            return Err(CheckpointingError::InvalidRawCheckpoint(format!(
                "submitter address must be {ADDRESS_LEN} bytes, got {}",
                submitter.len()
            )));
        }
        let mut data = Vec::with_capacity(APPLICATION_DATA_LEN);
        data.extend_from_slice(&self.last_commit_hash);
        data.extend_from_slice(&self.bitmap);
        if let Some(sig) = &self.bls_multi_sig {
            data.extend_from_slice(sig);
        }
        data.extend_from_slice(submitter);
        Ok(data)
    }

    /// from_app_data is the inverse of to_app_data. It returns the checkpoint
    /// and the submitter address.
    pub fn from_app_data(epoch_num: u64, data: &[u8]) -> Result<(Self, Vec<u8>), CheckpointingError> {
        if data.len() != APPLICATION_DATA_LEN {
            return Err(CheckpointingError::InvalidRawCheckpoint(format!(
                "application data must be {APPLICATION_DATA_LEN} bytes, got {}",
                data.len()
            )));
        }
        let (last_commit_hash, rest) = data.split_at(LAST_COMMIT_HASH_LEN);
        let (bitmap, rest) = rest.split_at(BITMAP_LEN);
        let (bls_multi_sig, submitter) = rest.split_at(BLS_SIG_LEN);

        let ckpt = RawCheckpoint {
            epoch_num,
            last_commit_hash: Binary::from(last_commit_hash),
            bitmap: Binary::from(bitmap),
            bls_multi_sig: Some(Binary::from(bls_multi_sig)),
        };
        Ok((ckpt, submitter.to_vec()))
    }
}

#[cw_serde]
pub struct RawCheckpointWithMeta {
    pub ckpt: RawCheckpoint,
    pub status: CheckpointStatus,
}

impl RawCheckpointWithMeta {
    pub fn new(ckpt: RawCheckpoint, status: CheckpointStatus) -> Self {
        RawCheckpointWithMeta { ckpt, status }
    }

    pub fn epoch(&self) -> u64 {
        self.ckpt.epoch_num
    }
}

#[cw_serde]
pub struct Validator {
    pub addr: String,
    pub power: u64,
}

/// Validators of an epoch, sorted by address. A validator's position is
/// its index in checkpoint bitmaps.
#[cw_serde]
pub struct ValidatorSet {
    validators: Vec<Validator>,
}

impl ValidatorSet {
    pub fn new(mut validators: Vec<Validator>) -> Result<Self, CheckpointingError> {
        if validators.is_empty() {
            return Err(CheckpointingError::InvalidValidatorSet(
                "validator set is empty".to_string(),
            ));
        }
        if validators.len() > MAX_VALIDATORS {
            return Err(CheckpointingError::InvalidValidatorSet(format!(
                "{} validators exceed the bitmap capacity of {MAX_VALIDATORS}",
                validators.len()
            )));
        }
        validators.sort_by(|a, b| a.addr.cmp(&b.addr));
        if let Some(dup) = validators.windows(2).find(|w| w[0].addr == w[1].addr) {
            return Err(CheckpointingError::InvalidValidatorSet(format!(
                "duplicated validator {}",
                dup[0].addr
            )));
        }
        validators
            .iter()
            .try_fold(0u64, |sum, val| sum.checked_add(val.power))
            .ok_or_else(|| {
                CheckpointingError::InvalidValidatorSet("total voting power overflows".to_string())
            })?;

        Ok(ValidatorSet { validators })
    }

    pub fn validators(&self) -> &[Validator] {
        &self.validators
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    pub fn total_power(&self) -> u64 {
        self.validators.iter().map(|val| val.power).sum()
    }

    pub fn find_validator_with_index(&self, addr: &str) -> Option<(usize, &Validator)> {
        self.validators
            .binary_search_by(|val| val.addr.as_str().cmp(addr))
            .ok()
            .map(|index| (index, &self.validators[index]))
    }

    /// find_subset_with_power_sum returns the validators marked in the bitmap
    /// along with their total voting power
    pub fn find_subset_with_power_sum(
        &self,
        bitmap_bytes: &[u8],
    ) -> Result<(Vec<&Validator>, u64), CheckpointingError> {
        let bitmap = bitmap_bytes.view_bits::<Lsb0>();

        // ensure bitmap is big enough to contain the validator set
        if bitmap.len() < self.validators.len() {
            return Err(CheckpointingError::InvalidRawCheckpoint(format!(
                "bitmap with {} bits cannot contain the validator set with size {}",
                bitmap.len(),
                self.validators.len()
            )));
        }
        if let Some(index) = bitmap.iter_ones().find(|i| *i >= self.validators.len()) {
            return Err(CheckpointingError::InvalidRawCheckpoint(format!(
                "bitmap marks index {index} outside the validator set"
            )));
        }

        let subset: Vec<&Validator> = bitmap
            .iter_ones()
            .map(|i| &self.validators[i])
            .collect();
        let sum = subset.iter().map(|val| val.power).sum();
        Ok((subset, sum))
    }
}

/// Message a validator sends to contribute its signature on a checkpoint
#[cw_serde]
pub struct MsgAddBlsSig {
    pub epoch_num: u64,
    pub last_commit_hash: Binary,
    pub bls_sig: Binary,
    pub signer_address: String,
}
