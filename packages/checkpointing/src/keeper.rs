use cosmwasm_std::Binary;
use tracing::{debug, error, info, warn};

use crate::accumulator::has_quorum;
use crate::bls;
use crate::error::CheckpointingError;
use crate::hooks::{CheckpointStatusEvent, CheckpointingHooks};
use crate::host::CheckpointingHost;
use crate::signer::BlsSigner;
use crate::types::{CheckpointStatus, MsgAddBlsSig, RawCheckpoint, RawCheckpointWithMeta};

/// Keeper drives the lifecycle of raw checkpoints on top of a host.
///
/// Hooks are fixed at construction. Every operation verifies before it
/// writes, so a failed operation leaves the store untouched.
pub struct Keeper<'a, H> {
    host: H,
    hooks: Option<&'a dyn CheckpointingHooks>,
}

impl<'a, H: CheckpointingHost> Keeper<'a, H> {
    pub fn new(host: H) -> Self {
        Keeper { host, hooks: None }
    }

    pub fn with_hooks(host: H, hooks: &'a dyn CheckpointingHooks) -> Self {
        Keeper {
            host,
            hooks: Some(hooks),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    pub fn get_raw_checkpoint(&self, epoch: u64) -> Result<RawCheckpointWithMeta, CheckpointingError> {
        self.host
            .get_checkpoint(epoch)?
            .ok_or(CheckpointingError::CkptDoesNotExist(epoch))
    }

    pub fn get_status(&self, epoch: u64) -> Result<CheckpointStatus, CheckpointingError> {
        Ok(self.get_raw_checkpoint(epoch)?.status)
    }

    /// build_raw_checkpoint creates the unsigned checkpoint of an epoch that
    /// just ended
    pub fn build_raw_checkpoint(
        &mut self,
        epoch: u64,
        last_commit_hash: &[u8],
    ) -> Result<CheckpointStatusEvent, CheckpointingError> {
        if self.host.get_checkpoint(epoch)?.is_some() {
            return Err(CheckpointingError::CkptAlreadyExist(epoch));
        }
        let ckpt = RawCheckpointWithMeta::new(
            RawCheckpoint::new(epoch, last_commit_hash)?,
            CheckpointStatus::Accumulating,
        );
        self.host.put_checkpoint(&ckpt)?;
        info!(
            epoch,
            last_commit_hash = hex::encode(last_commit_hash),
            "raw checkpoint created"
        );

        Ok(self.emit(CheckpointStatusEvent {
            epoch,
            old_status: None,
            new_status: CheckpointStatus::Accumulating,
            checkpoint: ckpt,
        }))
    }

    /// add_bls_sig accumulates a validator's signature on the checkpoint of
    /// its epoch. Returns the sealing event when this signature reached quorum.
    pub fn add_bls_sig(
        &mut self,
        msg: &MsgAddBlsSig,
    ) -> Result<Option<CheckpointStatusEvent>, CheckpointingError> {
        let epoch = msg.epoch_num;
        let mut ckpt = self.get_raw_checkpoint(epoch)?;
        if ckpt.status != CheckpointStatus::Accumulating {
            debug!(epoch, signer = %msg.signer_address, status = %ckpt.status, "ignoring late BLS signature");
            return Ok(None);
        }
        if ckpt.ckpt.last_commit_hash != msg.last_commit_hash {
            return Err(CheckpointingError::CkptHashNotEqual(epoch));
        }

        let vals = self.host.get_validator_set(epoch)?;
        if vals.find_validator_with_index(&msg.signer_address).is_none() {
            return Err(CheckpointingError::SignerNotFound {
                signer: msg.signer_address.clone(),
                epoch,
            });
        }
        let signer_pk = self.host.get_bls_pub_key(&msg.signer_address)?;
        let total_power = self.host.get_total_voting_power(epoch)?;

        let sealed = ckpt.accumulate(
            &vals,
            &msg.signer_address,
            &signer_pk,
            &msg.bls_sig,
            total_power,
        )?;
        self.host.put_checkpoint(&ckpt)?;

        if !sealed {
            return Ok(None);
        }
        info!(epoch, "raw checkpoint sealed");
        Ok(Some(self.emit(CheckpointStatusEvent {
            epoch,
            old_status: Some(CheckpointStatus::Accumulating),
            new_status: CheckpointStatus::Sealed,
            checkpoint: ckpt,
        })))
    }

    /// transition moves a checkpoint from `from` to `to`. Sealing only happens
    /// through signature accumulation.
    pub fn transition(
        &mut self,
        epoch: u64,
        from: CheckpointStatus,
        to: CheckpointStatus,
    ) -> Result<CheckpointStatusEvent, CheckpointingError> {
        if !from.can_transition_to(to) || from == CheckpointStatus::Accumulating {
            return Err(CheckpointingError::UnsupportedTransition { epoch, from, to });
        }
        let mut ckpt = self.get_raw_checkpoint(epoch)?;
        if ckpt.status != from {
            return Err(CheckpointingError::InvalidStatusTransition {
                epoch,
                expected: from,
                actual: ckpt.status,
            });
        }

        ckpt.status = to.stored();
        self.host.put_checkpoint(&ckpt)?;
        info!(epoch, %from, %to, "checkpoint status changed");

        Ok(self.emit(CheckpointStatusEvent {
            epoch,
            old_status: Some(from),
            new_status: to,
            checkpoint: ckpt,
        }))
    }

    pub fn set_checkpoint_submitted(&mut self, epoch: u64) -> Result<CheckpointStatusEvent, CheckpointingError> {
        self.transition(epoch, CheckpointStatus::Sealed, CheckpointStatus::Submitted)
    }

    pub fn set_checkpoint_confirmed(&mut self, epoch: u64) -> Result<CheckpointStatusEvent, CheckpointingError> {
        self.transition(epoch, CheckpointStatus::Submitted, CheckpointStatus::Confirmed)
    }

    pub fn set_checkpoint_finalized(&mut self, epoch: u64) -> Result<CheckpointStatusEvent, CheckpointingError> {
        self.transition(epoch, CheckpointStatus::Confirmed, CheckpointStatus::Finalized)
    }

    /// set_checkpoint_forgotten returns a submitted checkpoint to `Sealed`
    /// after its BTC transactions left the canonical chain
    pub fn set_checkpoint_forgotten(&mut self, epoch: u64) -> Result<CheckpointStatusEvent, CheckpointingError> {
        self.transition(epoch, CheckpointStatus::Submitted, CheckpointStatus::Forgotten)
    }

    /// verify_checkpoint checks a checkpoint recovered from BTC against the
    /// local record and the epoch's validator set.
    ///
    /// Returns the local record when the recovered checkpoint carries the same
    /// last commit hash and multi-signature. Any other quorum-certified
    /// checkpoint for the epoch is reported to the hooks and fails with the
    /// fatal `ConflictingCheckpoint`.
    pub fn verify_checkpoint(
        &self,
        recovered: &RawCheckpoint,
    ) -> Result<RawCheckpointWithMeta, CheckpointingError> {
        recovered.validate_basic()?;
        let epoch = recovered.epoch_num;
        let local = self.get_raw_checkpoint(epoch)?;

        if local.ckpt.last_commit_hash == recovered.last_commit_hash
            && local.ckpt.bls_multi_sig == recovered.bls_multi_sig
        {
            return Ok(local);
        }

        let vals = self.host.get_validator_set(epoch)?;
        let total = self.host.get_total_voting_power(epoch)?;
        let (signers, power) = vals.find_subset_with_power_sum(&recovered.bitmap)?;
        if !has_quorum(power, total) {
            return Err(CheckpointingError::InsufficientVotingPower { power, total });
        }
        let pks = signers
            .iter()
            .map(|val| self.host.get_bls_pub_key(&val.addr))
            .collect::<Result<Vec<_>, _>>()?;
        let multi_sig = recovered.bls_multi_sig.as_ref().map(Binary::as_slice).unwrap_or_default();
        bls::verify_multisig(multi_sig, &pks, &recovered.signed_msg())
            .map_err(|e| CheckpointingError::InvalidMultiSignature(epoch, e))?;

        error!(
            epoch,
            local = hex::encode(&local.ckpt.last_commit_hash),
            recovered = hex::encode(&recovered.last_commit_hash),
            "conflicting checkpoint is found"
        );
        if let Some(hooks) = self.hooks {
            if let Err(e) = hooks.after_conflicting_checkpoint(&local, recovered) {
                warn!(epoch, error = %e, "conflicting checkpoint hook failed");
            }
        }
        Err(CheckpointingError::ConflictingCheckpoint(epoch))
    }

    /// verify_checkpoint_bytes decodes application data carried on BTC and
    /// verifies the checkpoint in it
    pub fn verify_checkpoint_bytes(
        &self,
        epoch: u64,
        app_data: &[u8],
    ) -> Result<RawCheckpointWithMeta, CheckpointingError> {
        let (recovered, _) = RawCheckpoint::from_app_data(epoch, app_data)?;
        self.verify_checkpoint(&recovered)
    }

    /// checkpoint_epoch returns the epoch of a valid checkpoint
    pub fn checkpoint_epoch(&self, epoch: u64, app_data: &[u8]) -> Result<u64, CheckpointingError> {
        Ok(self.verify_checkpoint_bytes(epoch, app_data)?.epoch())
    }

    /// sign_checkpoint builds the signature message of a validator for the
    /// epoch. Returns None when the signer is not a validator of the epoch.
    pub fn sign_checkpoint<S: BlsSigner + ?Sized>(
        &self,
        signer: &S,
        epoch: u64,
    ) -> Result<Option<MsgAddBlsSig>, CheckpointingError> {
        let ckpt = self.get_raw_checkpoint(epoch)?;
        let vals = self.host.get_validator_set(epoch)?;
        if vals.find_validator_with_index(signer.address()).is_none() {
            debug!(epoch, signer = signer.address(), "not a validator of the epoch");
            return Ok(None);
        }
        let sig = signer.sign_msg_with_bls(&ckpt.ckpt.signed_msg())?;

        Ok(Some(MsgAddBlsSig {
            epoch_num: epoch,
            last_commit_hash: ckpt.ckpt.last_commit_hash,
            bls_sig: Binary::from(sig.compress().to_vec()),
            signer_address: signer.address().to_string(),
        }))
    }

    fn emit(&self, event: CheckpointStatusEvent) -> CheckpointStatusEvent {
        if let Some(hooks) = self.hooks {
            if let Err(e) = hooks.after_status_change(&event) {
                warn!(epoch = event.epoch, error = %e, "checkpoint status hook failed");
            }
        }
        event
    }
}
