//! Moving checkpoints in and out of the OP_RETURN outputs of BTC transactions
use babylon_bitcoin::op_return::extract_op_return_data;
use babylon_bitcoin::parse_transaction;
use btc_checkpoint_codec::{
    connect_parts, encode_checkpoint_data, is_babylon_checkpoint_data, BabylonTag, CheckpointPart,
};
use cosmwasm_std::Binary;

use crate::error::CheckpointingError;
use crate::types::RawCheckpoint;

/// A checkpoint read back from BTC, along with the address of its submitter
#[derive(Clone, Debug, PartialEq)]
pub struct RecoveredCheckpoint {
    pub ckpt: RawCheckpoint,
    pub submitter: Binary,
}

/// encode_checkpoint splits a sealed checkpoint into the two OP_RETURN payloads
pub fn encode_checkpoint(
    tag: &BabylonTag,
    version: u8,
    ckpt: &RawCheckpoint,
    submitter: &[u8],
) -> Result<(Vec<u8>, Vec<u8>), CheckpointingError> {
    ckpt.validate_basic()?;
    let bls_multi_sig = ckpt
        .bls_multi_sig
        .as_ref()
        .ok_or_else(|| CheckpointingError::InvalidRawCheckpoint("missing BLS multi-signature".to_string()))?;

    Ok(encode_checkpoint_data(
        tag,
        version,
        ckpt.epoch_num,
        &ckpt.last_commit_hash,
        &ckpt.bitmap,
        bls_multi_sig,
        submitter,
    )?)
}

/// parse_checkpoint_tx decodes a raw BTC transaction and returns the
/// checkpoint part carried in its OP_RETURN output
pub fn parse_checkpoint_tx(
    tag: &BabylonTag,
    version: u8,
    raw_tx: &[u8],
) -> Result<CheckpointPart, CheckpointingError> {
    let tx = parse_transaction(raw_tx)?;
    let data = extract_op_return_data(&tx)?;
    Ok(is_babylon_checkpoint_data(tag, version, &data)?)
}

/// recover_checkpoint rebuilds a checkpoint from the two transactions that
/// carry it, given in either order
pub fn recover_checkpoint(
    tag: &BabylonTag,
    version: u8,
    raw_tx_a: &[u8],
    raw_tx_b: &[u8],
) -> Result<RecoveredCheckpoint, CheckpointingError> {
    let a = parse_checkpoint_tx(tag, version, raw_tx_a)?;
    let b = parse_checkpoint_tx(tag, version, raw_tx_b)?;
    let app_data = connect_parts(version, &a, &b)?;

    let (ckpt, submitter) = RawCheckpoint::from_app_data(a.epoch(), &app_data)?;
    Ok(RecoveredCheckpoint {
        ckpt,
        submitter: Binary::from(submitter),
    })
}
