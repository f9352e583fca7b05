use cosmwasm_std::{
    to_json_binary, Deps, DepsMut, Empty, Env, MessageInfo, QueryResponse, Response, StdResult,
};
use cw2::set_contract_version;
use cw_utils::maybe_addr;

use crate::checkpointing::{
    ensure_not_halted, handle_add_bls_sig, handle_build_checkpoint, handle_register_bls_key,
    handle_report_btc_depth, handle_report_btc_rollback, handle_set_validator_set,
    handle_submit_btc_checkpoint,
};
use crate::error::ContractError;
use crate::msg::{ExecuteMsg, InstantiateMsg, QueryMsg};
use crate::queries;
use crate::state::config::{Config, ADMIN, CONFIG};

pub const CONTRACT_NAME: &str = env!("CARGO_PKG_NAME");
pub const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn instantiate(
    mut deps: DepsMut,
    _env: Env,
    _info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    msg.validate()?;

    let api = deps.api;
    ADMIN.set(deps.branch(), maybe_addr(api, msg.admin.clone())?)?;

    // initialise config
    let cfg = Config {
        babylon_tag: msg.babylon_tag_to_bytes()?,
        btc_confirmation_depth: msg.btc_confirmation_depth,
        checkpoint_finalization_timeout: msg.checkpoint_finalization_timeout,
    };
    CONFIG.save(deps.storage, &cfg)?;
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    Ok(Response::new().add_attribute("action", "instantiate"))
}

pub fn query(deps: Deps, _env: Env, msg: QueryMsg) -> Result<QueryResponse, ContractError> {
    match msg {
        QueryMsg::Admin {} => Ok(to_json_binary(&ADMIN.query_admin(deps)?)?),
        QueryMsg::Config {} => Ok(to_json_binary(&queries::config(deps)?)?),
        QueryMsg::Checkpoint { epoch } => Ok(to_json_binary(&queries::checkpoint(deps, epoch)?)?),
        QueryMsg::Status { epoch } => Ok(to_json_binary(&queries::status(deps, epoch)?)?),
        QueryMsg::ValidatorSet { epoch } => {
            Ok(to_json_binary(&queries::validator_set(deps, epoch)?)?)
        }
        QueryMsg::BlsPublicKey { address } => {
            Ok(to_json_binary(&queries::bls_public_key(deps, address)?)?)
        }
        QueryMsg::EncodedCheckpoint { epoch, submitter } => Ok(to_json_binary(
            &queries::encoded_checkpoint(deps, epoch, submitter)?,
        )?),
        QueryMsg::Conflict {} => Ok(to_json_binary(&queries::conflict(deps)?)?),
    }
}

pub fn migrate(deps: DepsMut, _env: Env, _msg: Empty) -> StdResult<Response> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;
    Ok(Response::default())
}

pub fn execute(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    if !matches!(msg, ExecuteMsg::UpdateAdmin { .. }) {
        ensure_not_halted(deps.storage)?;
    }
    match msg {
        ExecuteMsg::UpdateAdmin { admin } => {
            let new_admin = maybe_addr(deps.api, admin)?;
            Ok(ADMIN.execute_update_admin(deps, info, new_admin)?)
        }
        ExecuteMsg::SetValidatorSet { epoch, validators } => {
            handle_set_validator_set(deps, info, epoch, validators)
        }
        ExecuteMsg::RegisterBlsKey { pub_key, pop } => {
            handle_register_bls_key(deps, info, pub_key, pop)
        }
        ExecuteMsg::BuildCheckpoint {
            epoch,
            last_commit_hash,
        } => handle_build_checkpoint(deps, info, epoch, last_commit_hash),
        ExecuteMsg::AddBlsSig {
            epoch,
            last_commit_hash,
            signature,
        } => handle_add_bls_sig(deps, info, epoch, last_commit_hash, signature),
        ExecuteMsg::SubmitBtcCheckpoint {
            first_tx,
            second_tx,
        } => handle_submit_btc_checkpoint(deps, info, first_tx, second_tx),
        ExecuteMsg::ReportBtcDepth { epoch, depth } => {
            handle_report_btc_depth(deps, info, epoch, depth)
        }
        ExecuteMsg::ReportBtcRollback { epoch } => handle_report_btc_rollback(deps, info, epoch),
    }
}
