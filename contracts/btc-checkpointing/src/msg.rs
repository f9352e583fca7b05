#[cfg(not(target_arch = "wasm32"))]
use {
    crate::state::config::Config,
    babylon_checkpointing::{CheckpointStatus, RawCheckpointWithMeta, ValidatorSet},
    cw_controllers::AdminResponse,
};

use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Binary, StdError, StdResult};

use babylon_checkpointing::Validator;
use btc_checkpoint_codec::TAG_LEN;

#[cw_serde]
pub struct InstantiateMsg {
    /// If set, this address can configure validator sets, build checkpoints
    /// and report BTC observations
    pub admin: Option<String>,
    /// babylon_tag is a string encoding four bytes used for identification / tagging of the Babylon zone.
    /// NOTE: this is a hex string, not raw bytes
    pub babylon_tag: String,
    /// Confirmations a checkpoint's BTC transactions need to be confirmed (`k`)
    pub btc_confirmation_depth: u32,
    /// Confirmations a checkpoint's BTC transactions need to be final (`w`)
    pub checkpoint_finalization_timeout: u32,
}

impl InstantiateMsg {
    pub fn validate(&self) -> StdResult<()> {
        if self.babylon_tag.len() != TAG_LEN * 2 {
            return Err(StdError::invalid_data_size(
                TAG_LEN * 2,
                self.babylon_tag.len(),
            ));
        }
        let _ = self.babylon_tag_to_bytes()?;

        if self.btc_confirmation_depth == 0 {
            return Err(StdError::generic_err(
                "btc_confirmation_depth must be positive",
            ));
        }
        if self.checkpoint_finalization_timeout <= self.btc_confirmation_depth {
            return Err(StdError::generic_err(
                "checkpoint_finalization_timeout must be larger than btc_confirmation_depth",
            ));
        }
        Ok(())
    }

    pub fn babylon_tag_to_bytes(&self) -> StdResult<Vec<u8>> {
        hex::decode(&self.babylon_tag).map_err(|_| {
            StdError::generic_err(format!(
                "babylon_tag is not a valid hex string: {}",
                self.babylon_tag
            ))
        })
    }
}

#[cw_serde]
pub enum ExecuteMsg {
    /// Change the admin
    UpdateAdmin { admin: Option<String> },
    /// `SetValidatorSet` records the validators of an epoch.
    ///
    /// This message can be called by the admin only.
    SetValidatorSet {
        epoch: u64,
        validators: Vec<Validator>,
    },
    /// `RegisterBlsKey` registers the BLS key of the sender.
    ///
    /// `pop` is the signature of the key over its own compressed bytes
    RegisterBlsKey { pub_key: Binary, pop: Binary },
    /// `BuildCheckpoint` creates the raw checkpoint of an ended epoch.
    ///
    /// This message can be called by the admin only.
    BuildCheckpoint {
        epoch: u64,
        last_commit_hash: Binary,
    },
    /// `AddBlsSig` adds the sender's BLS signature on the checkpoint of an epoch
    AddBlsSig {
        epoch: u64,
        last_commit_hash: Binary,
        signature: Binary,
    },
    /// `SubmitBtcCheckpoint` reports the two BTC transactions carrying a
    /// checkpoint, in either order.
    ///
    /// This message can be called by the admin only.
    SubmitBtcCheckpoint { first_tx: Binary, second_tx: Binary },
    /// `ReportBtcDepth` reports how deep the transactions of a submitted
    /// checkpoint are buried on BTC.
    ///
    /// This message can be called by the admin only.
    ReportBtcDepth { epoch: u64, depth: u32 },
    /// `ReportBtcRollback` reports that the transactions of a submitted
    /// checkpoint left the canonical BTC chain.
    ///
    /// This message can be called by the admin only.
    ReportBtcRollback { epoch: u64 },
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(AdminResponse)]
    Admin {},
    #[returns(Config)]
    Config {},
    /// `Checkpoint` returns the raw checkpoint of an epoch along with its status
    #[returns(RawCheckpointWithMeta)]
    Checkpoint { epoch: u64 },
    #[returns(CheckpointStatus)]
    Status { epoch: u64 },
    #[returns(ValidatorSet)]
    ValidatorSet { epoch: u64 },
    /// `BlsPublicKey` returns the compressed BLS key of a validator, if registered
    #[returns(Option<Binary>)]
    BlsPublicKey { address: String },
    /// `EncodedCheckpoint` returns the two OP_RETURN payloads of a sealed
    /// checkpoint.
    ///
    /// `submitter` is the 20-byte submitter address, in hex format.
    #[returns(EncodedCheckpointResponse)]
    EncodedCheckpoint { epoch: u64, submitter: String },
    /// `Conflict` returns the epoch of the conflicting checkpoint that halted
    /// the contract, if any
    #[returns(Option<u64>)]
    Conflict {},
}

#[cw_serde]
pub struct EncodedCheckpointResponse {
    pub first_part: Binary,
    pub second_part: Binary,
}
