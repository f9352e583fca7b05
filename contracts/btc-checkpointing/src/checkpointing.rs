use cosmwasm_std::{Binary, Deps, DepsMut, Event, MessageInfo, Response, Storage};

use babylon_checkpointing::btc::recover_checkpoint;
use babylon_checkpointing::{
    CheckpointStatus, CheckpointingError, Keeper, MsgAddBlsSig, Validator, ValidatorSet,
};
use btc_checkpoint_codec::CURRENT_VERSION;

use crate::error::ContractError;
use crate::hooks::{status_event, ApiLogHooks};
use crate::state::checkpoints::{StorageHost, VALIDATOR_SETS};
use crate::state::config::{ADMIN, CONFIG, CONFLICT};
use crate::state::registry;

fn keeper<'a>(
    storage: &'a mut dyn Storage,
    hooks: &'a ApiLogHooks<'a>,
) -> Keeper<'a, StorageHost<'a>> {
    Keeper::with_hooks(StorageHost::new(storage), hooks)
}

// Helper function to check caller is contract admin
fn check_admin(deps: Deps, info: &MessageInfo) -> Result<(), ContractError> {
    if !ADMIN.is_admin(deps, &info.sender)? {
        return Err(ContractError::Unauthorized);
    }
    Ok(())
}

/// ensure_not_halted rejects state changes once a conflicting checkpoint was found
pub(crate) fn ensure_not_halted(storage: &dyn Storage) -> Result<(), ContractError> {
    match CONFLICT.may_load(storage)? {
        Some(epoch) => Err(ContractError::Halted(epoch)),
        None => Ok(()),
    }
}

pub fn handle_set_validator_set(
    deps: DepsMut,
    info: MessageInfo,
    epoch: u64,
    validators: Vec<Validator>,
) -> Result<Response, ContractError> {
    check_admin(deps.as_ref(), &info)?;
    for val in &validators {
        deps.api.addr_validate(&val.addr)?;
    }
    if VALIDATOR_SETS.has(deps.storage, epoch) {
        return Err(ContractError::ValidatorSetAlreadyExists(epoch));
    }
    let set = ValidatorSet::new(validators)?;
    VALIDATOR_SETS.save(deps.storage, epoch, &set)?;

    Ok(Response::new()
        .add_attribute("action", "set_validator_set")
        .add_attribute("epoch", epoch.to_string())
        .add_attribute("validators", set.len().to_string())
        .add_attribute("total_power", set.total_power().to_string()))
}

pub fn handle_register_bls_key(
    deps: DepsMut,
    info: MessageInfo,
    pub_key: Binary,
    pop: Binary,
) -> Result<Response, ContractError> {
    registry::register_bls_key(deps.storage, info.sender.as_str(), &pub_key, &pop)?;
    deps.api
        .debug(&format!("registered BLS key of {}", info.sender));

    Ok(Response::new()
        .add_attribute("action", "register_bls_key")
        .add_attribute("validator", info.sender))
}

pub fn handle_build_checkpoint(
    deps: DepsMut,
    info: MessageInfo,
    epoch: u64,
    last_commit_hash: Binary,
) -> Result<Response, ContractError> {
    check_admin(deps.as_ref(), &info)?;
    if !VALIDATOR_SETS.has(deps.storage, epoch) {
        return Err(CheckpointingError::ValidatorSetNotFound(epoch).into());
    }

    let hooks = ApiLogHooks::new(deps.api);
    let event = keeper(deps.storage, &hooks).build_raw_checkpoint(epoch, &last_commit_hash)?;

    Ok(Response::new()
        .add_attribute("action", "build_checkpoint")
        .add_event(status_event(&event)))
}

pub fn handle_add_bls_sig(
    deps: DepsMut,
    info: MessageInfo,
    epoch: u64,
    last_commit_hash: Binary,
    signature: Binary,
) -> Result<Response, ContractError> {
    let msg = MsgAddBlsSig {
        epoch_num: epoch,
        last_commit_hash,
        bls_sig: signature,
        signer_address: info.sender.to_string(),
    };
    let hooks = ApiLogHooks::new(deps.api);
    let sealed = keeper(deps.storage, &hooks).add_bls_sig(&msg)?;

    let res = Response::new()
        .add_attribute("action", "add_bls_sig")
        .add_attribute("epoch", epoch.to_string())
        .add_attribute("signer", info.sender);
    Ok(match sealed {
        Some(event) => res.add_event(status_event(&event)),
        None => res,
    })
}

/// handle_submit_btc_checkpoint takes the two BTC transactions carrying the
/// checkpoint of an epoch. A valid checkpoint that contradicts the local one
/// halts the contract.
pub fn handle_submit_btc_checkpoint(
    deps: DepsMut,
    info: MessageInfo,
    first_tx: Binary,
    second_tx: Binary,
) -> Result<Response, ContractError> {
    check_admin(deps.as_ref(), &info)?;
    let cfg = CONFIG.load(deps.storage)?;
    let tag = cfg.tag().map_err(CheckpointingError::from)?;
    let recovered = recover_checkpoint(&tag, CURRENT_VERSION, &first_tx, &second_tx)?;
    let epoch = recovered.ckpt.epoch_num;

    let hooks = ApiLogHooks::new(deps.api);
    let mut keeper = keeper(deps.storage, &hooks);
    match keeper.verify_checkpoint(&recovered.ckpt) {
        Ok(_) => {}
        Err(err) if err.is_fatal() => {
            drop(keeper);
            CONFLICT.save(deps.storage, &epoch)?;
            return Ok(Response::new()
                .add_attribute("action", "submit_btc_checkpoint")
                .add_event(
                    Event::new("conflicting_checkpoint")
                        .add_attribute("epoch", epoch.to_string())
                        .add_attribute(
                            "last_commit_hash",
                            hex::encode(&recovered.ckpt.last_commit_hash),
                        ),
                ));
        }
        Err(err) => return Err(err.into()),
    }
    let event = keeper.set_checkpoint_submitted(epoch)?;

    Ok(Response::new()
        .add_attribute("action", "submit_btc_checkpoint")
        .add_attribute("submitter", hex::encode(&recovered.submitter))
        .add_event(status_event(&event)))
}

/// handle_report_btc_depth applies the BTC depth of the transactions of a
/// submitted checkpoint. Both thresholds may be crossed in a single report.
pub fn handle_report_btc_depth(
    deps: DepsMut,
    info: MessageInfo,
    epoch: u64,
    depth: u32,
) -> Result<Response, ContractError> {
    check_admin(deps.as_ref(), &info)?;
    let cfg = CONFIG.load(deps.storage)?;

    let hooks = ApiLogHooks::new(deps.api);
    let mut keeper = keeper(deps.storage, &hooks);
    let mut events = vec![];
    match keeper.get_status(epoch)? {
        CheckpointStatus::Submitted
        | CheckpointStatus::Confirmed
        | CheckpointStatus::Finalized => {}
        actual => {
            return Err(CheckpointingError::InvalidStatusTransition {
                epoch,
                expected: CheckpointStatus::Submitted,
                actual,
            }
            .into())
        }
    }
    if keeper.get_status(epoch)? == CheckpointStatus::Submitted
        && depth >= cfg.btc_confirmation_depth
    {
        events.push(status_event(&keeper.set_checkpoint_confirmed(epoch)?));
    }
    if keeper.get_status(epoch)? == CheckpointStatus::Confirmed
        && depth >= cfg.checkpoint_finalization_timeout
    {
        events.push(status_event(&keeper.set_checkpoint_finalized(epoch)?));
    }

    Ok(Response::new()
        .add_attribute("action", "report_btc_depth")
        .add_attribute("epoch", epoch.to_string())
        .add_attribute("depth", depth.to_string())
        .add_events(events))
}

/// handle_report_btc_rollback returns a submitted checkpoint to `Sealed`
/// after its BTC transactions were reorganised away
pub fn handle_report_btc_rollback(
    deps: DepsMut,
    info: MessageInfo,
    epoch: u64,
) -> Result<Response, ContractError> {
    check_admin(deps.as_ref(), &info)?;

    let hooks = ApiLogHooks::new(deps.api);
    let event = keeper(deps.storage, &hooks).set_checkpoint_forgotten(epoch)?;

    Ok(Response::new()
        .add_attribute("action", "report_btc_rollback")
        .add_event(status_event(&event)))
}
