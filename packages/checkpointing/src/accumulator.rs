use bitvec::prelude::*;
use cosmwasm_std::Binary;
use tracing::debug;

use crate::bls::{self, BlsPublicKey};
use crate::error::CheckpointingError;
use crate::types::{CheckpointStatus, RawCheckpointWithMeta, ValidatorSet};

/// has_quorum tells whether power is strictly more than a third of total
pub fn has_quorum(power: u64, total: u64) -> bool {
    (power as u128) * 3 > total as u128
}

impl RawCheckpointWithMeta {
    /// accumulate folds one validator's signature into the checkpoint.
    ///
    /// Returns true iff this signature made the checkpoint reach quorum and
    /// move to `Sealed`. Signatures arriving after sealing leave the record
    /// untouched. On error the record is not modified.
    pub fn accumulate(
        &mut self,
        vals: &ValidatorSet,
        signer: &str,
        signer_pk: &BlsPublicKey,
        sig: &[u8],
        total_power: u64,
    ) -> Result<bool, CheckpointingError> {
        if self.status != CheckpointStatus::Accumulating {
            return Ok(false);
        }

        let epoch = self.epoch();
        let (index, _) = vals.find_validator_with_index(signer).ok_or_else(|| {
            CheckpointingError::SignerNotFound {
                signer: signer.to_string(),
                epoch,
            }
        })?;
        if self.ckpt.has_voted(index) {
            return Err(CheckpointingError::AlreadyVoted(signer.to_string()));
        }
        if !bls::verify(sig, signer_pk, &self.ckpt.signed_msg()) {
            return Err(CheckpointingError::InvalidSignature(signer.to_string()));
        }

        let multi_sig = match &self.ckpt.bls_multi_sig {
            None => sig.to_vec(),
            Some(agg) => bls::aggregate(agg, sig)
                .map_err(|_| CheckpointingError::InvalidSignature(signer.to_string()))?
                .to_vec(),
        };
        let mut bitmap = self.ckpt.bitmap.to_vec();
        bitmap.view_bits_mut::<Lsb0>().set(index, true);
        let (_, power) = vals.find_subset_with_power_sum(&bitmap)?;

        self.ckpt.bitmap = Binary::from(bitmap);
        self.ckpt.bls_multi_sig = Some(Binary::from(multi_sig));
        debug!(epoch, signer, power, total_power, "accumulated BLS signature");

        if has_quorum(power, total_power) {
            self.status = CheckpointStatus::Sealed;
            return Ok(true);
        }
        Ok(false)
    }

    /// power_sum is the voting power of the validators that signed so far
    pub fn power_sum(&self, vals: &ValidatorSet) -> Result<u64, CheckpointingError> {
        vals.find_subset_with_power_sum(&self.ckpt.bitmap)
            .map(|(_, power)| power)
    }
}
