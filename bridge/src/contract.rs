//! CL8Y Toll Bridge Contract - Entry Points
//!
//! The implementation is modularized into:
//! - `execute/` - Execute message handlers
//! - `query` - Query message handlers

use cosmwasm_std::{
    entry_point, to_json_binary, Binary, Deps, DepsMut, Env, MessageInfo, Reply, Response,
    StdResult,
};
use cw2::set_contract_version;

use crate::error::ContractError;
use crate::execute::{
    execute_accept_admin, execute_add_claim_fungible, execute_add_claim_mixed_fungible,
    execute_add_claim_non_fungible, execute_add_fee_verifier, execute_add_operator,
    execute_cancel_admin_proposal, execute_claim_fungible, execute_claim_mixed_fungible,
    execute_claim_non_fungible, execute_pause, execute_propose_admin, execute_redeem_fungible,
    execute_redeem_mixed_fungible, execute_redeem_non_fungible, execute_relay_message,
    execute_remove_fee_verifier, execute_remove_operator, execute_send_broadcast,
    execute_send_message, execute_transfer_fungible, execute_transfer_mixed_fungible,
    execute_transfer_non_fungible, execute_unpause, execute_update_config, execute_withdraw_fees,
    handle_relay_reply,
};
use crate::msg::{ExecuteMsg, InstantiateMsg, MigrateMsg, QueryMsg};
use crate::query::{
    query_all_pending_fees, query_claimable, query_compute_fee_hash, query_config,
    query_fee_verifiers, query_is_fee_verifier, query_operators, query_pack_payload,
    query_pending_admin, query_pending_fees, query_proof_consumed, query_stats, query_verify_fee,
};
use crate::signature::EthAddress;
use crate::state::{
    Config, Stats, CONFIG, CONTRACT_NAME, CONTRACT_VERSION, FEE_VERIFIERS, OPERATORS,
    OPERATOR_COUNT, RELAY_REPLY_ID, STATS,
};

// ============================================================================
// Instantiate
// ============================================================================

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    _info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    let admin = deps.api.addr_validate(&msg.admin)?;

    if msg.operators.is_empty() {
        return Err(ContractError::InvalidAmount {
            reason: "At least one operator required".to_string(),
        });
    }
    if msg.native_denom.is_empty() {
        return Err(ContractError::InvalidAmount {
            reason: "native denom cannot be empty".to_string(),
        });
    }

    let config = Config {
        admin,
        paused: false,
        chain_id: msg.chain_id,
        native_denom: msg.native_denom,
        require_fee_proof: msg.require_fee_proof,
    };
    CONFIG.save(deps.storage, &config)?;

    let mut operator_count = 0u32;
    for operator_str in msg.operators {
        let operator = deps.api.addr_validate(&operator_str)?;
        if OPERATORS.has(deps.storage, &operator) {
            continue;
        }
        OPERATORS.save(deps.storage, &operator, &true)?;
        operator_count += 1;
    }
    OPERATOR_COUNT.save(deps.storage, &operator_count)?;

    for address in &msg.fee_verifiers {
        let verifier = EthAddress::parse(address)?;
        if verifier.is_zero() {
            return Err(ContractError::InvalidFeeVerifier {
                address: address.clone(),
            });
        }
        FEE_VERIFIERS.save(deps.storage, verifier.as_bytes(), &true)?;
    }

    STATS.save(deps.storage, &Stats::default())?;

    Ok(Response::new()
        .add_attribute("method", "instantiate")
        .add_attribute("admin", config.admin)
        .add_attribute("chain_id", config.chain_id.to_string())
        .add_attribute("native_denom", config.native_denom)
        .add_attribute("operator_count", operator_count.to_string())
        .add_attribute("fee_verifier_count", msg.fee_verifiers.len().to_string())
        .add_attribute("require_fee_proof", config.require_fee_proof.to_string()))
}

// ============================================================================
// Execute
// ============================================================================

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        // Outgoing
        ExecuteMsg::TransferFungible {
            token,
            amount,
            destination,
            fee_proof,
        } => execute_transfer_fungible(deps, env, info, token, amount, destination, fee_proof),
        ExecuteMsg::TransferNonFungible {
            token,
            token_id,
            destination,
            fee_proof,
        } => execute_transfer_non_fungible(deps, env, info, token, token_id, destination, fee_proof),
        ExecuteMsg::TransferMixedFungible {
            token,
            token_id,
            amount,
            destination,
            fee_proof,
        } => execute_transfer_mixed_fungible(
            deps,
            env,
            info,
            token,
            token_id,
            amount,
            destination,
            fee_proof,
        ),
        ExecuteMsg::SendMessage {
            message_id,
            destination,
            recipient,
            request_receipt,
            message,
            fee_proof,
        } => execute_send_message(
            deps,
            env,
            info,
            message_id,
            destination,
            recipient,
            request_receipt,
            message,
            fee_proof,
        ),
        ExecuteMsg::SendBroadcast {
            message_id,
            request_receipt,
            message,
            fee_proof,
        } => execute_send_broadcast(
            deps,
            env,
            info,
            message_id,
            request_receipt,
            message,
            fee_proof,
        ),

        // Incoming
        ExecuteMsg::ClaimFungible {
            token,
            recipient,
            amount,
            rebate,
        } => execute_claim_fungible(deps, env, info, token, recipient, amount, rebate),
        ExecuteMsg::ClaimNonFungible {
            token,
            recipient,
            token_id,
            rebate,
        } => execute_claim_non_fungible(deps, env, info, token, recipient, token_id, rebate),
        ExecuteMsg::ClaimMixedFungible {
            token,
            recipient,
            token_id,
            amount,
            rebate,
        } => execute_claim_mixed_fungible(
            deps, env, info, token, recipient, token_id, amount, rebate,
        ),
        ExecuteMsg::AddClaimFungible {
            token,
            owner,
            amount,
        } => execute_add_claim_fungible(deps, info, token, owner, amount),
        ExecuteMsg::AddClaimNonFungible {
            token,
            owner,
            token_id,
        } => execute_add_claim_non_fungible(deps, info, token, owner, token_id),
        ExecuteMsg::AddClaimMixedFungible {
            token,
            owner,
            token_id,
            amount,
        } => execute_add_claim_mixed_fungible(deps, info, token, owner, token_id, amount),
        ExecuteMsg::RelayMessage {
            receiver,
            sender,
            from_network,
            message_id,
            request_receipt,
            message,
        } => execute_relay_message(
            deps,
            info,
            receiver,
            sender,
            from_network,
            message_id,
            request_receipt,
            message,
        ),

        // Redemptions
        ExecuteMsg::RedeemFungible { token, amount } => {
            execute_redeem_fungible(deps, env, info, token, amount)
        }
        ExecuteMsg::RedeemNonFungible { token, token_id } => {
            execute_redeem_non_fungible(deps, env, info, token, token_id)
        }
        ExecuteMsg::RedeemMixedFungible {
            token,
            token_id,
            amount,
        } => execute_redeem_mixed_fungible(deps, env, info, token, token_id, amount),

        // Fee management
        ExecuteMsg::AddFeeVerifier { address } => execute_add_fee_verifier(deps, info, address),
        ExecuteMsg::RemoveFeeVerifier { address } => {
            execute_remove_fee_verifier(deps, info, address)
        }
        ExecuteMsg::WithdrawFees {
            fee_token,
            amount,
            recipient,
        } => execute_withdraw_fees(deps, info, fee_token, amount, recipient),
        ExecuteMsg::UpdateConfig {
            native_denom,
            require_fee_proof,
        } => execute_update_config(deps, info, native_denom, require_fee_proof),

        // Operators
        ExecuteMsg::AddOperator { operator } => execute_add_operator(deps, info, operator),
        ExecuteMsg::RemoveOperator { operator } => execute_remove_operator(deps, info, operator),

        // Admin
        ExecuteMsg::Pause {} => execute_pause(deps, info),
        ExecuteMsg::Unpause {} => execute_unpause(deps, info),
        ExecuteMsg::ProposeAdmin { new_admin } => {
            execute_propose_admin(deps, env, info, new_admin)
        }
        ExecuteMsg::AcceptAdmin {} => execute_accept_admin(deps, env, info),
        ExecuteMsg::CancelAdminProposal {} => execute_cancel_admin_proposal(deps, info),
    }
}

// ============================================================================
// Reply
// ============================================================================

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn reply(deps: DepsMut, _env: Env, msg: Reply) -> Result<Response, ContractError> {
    match msg.id {
        RELAY_REPLY_ID => handle_relay_reply(deps, msg),
        id => Err(ContractError::UnknownReplyId { id }),
    }
}

// ============================================================================
// Query
// ============================================================================

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Config {} => to_json_binary(&query_config(deps)?),
        QueryMsg::Stats {} => to_json_binary(&query_stats(deps)?),
        QueryMsg::FeeVerifiers {} => to_json_binary(&query_fee_verifiers(deps)?),
        QueryMsg::IsFeeVerifier { address } => {
            to_json_binary(&query_is_fee_verifier(deps, address)?)
        }
        QueryMsg::Operators {} => to_json_binary(&query_operators(deps)?),
        QueryMsg::PendingFees { fee_token } => to_json_binary(&query_pending_fees(deps, fee_token)?),
        QueryMsg::AllPendingFees { start_after, limit } => {
            to_json_binary(&query_all_pending_fees(deps, start_after, limit)?)
        }
        QueryMsg::Claimable {
            owner,
            token,
            token_id,
        } => to_json_binary(&query_claimable(deps, owner, token, token_id)?),
        QueryMsg::ProofConsumed { message_hash } => {
            to_json_binary(&query_proof_consumed(deps, message_hash)?)
        }
        QueryMsg::PendingAdmin {} => to_json_binary(&query_pending_admin(deps)?),
        QueryMsg::PackPayload {
            token,
            token_id,
            amount,
            message,
            recipient,
            request_receipt,
        } => to_json_binary(&query_pack_payload(
            token,
            token_id,
            amount,
            message,
            recipient,
            request_receipt,
        )?),
        QueryMsg::ComputeFeeHash {
            sender,
            destination,
            fee_token,
            fee_amount,
            max_block,
            payload,
        } => to_json_binary(&query_compute_fee_hash(
            deps,
            sender,
            destination,
            fee_token,
            fee_amount,
            max_block,
            payload,
        )?),
        QueryMsg::VerifyFee {
            sender,
            destination,
            payload,
            fee_proof,
        } => to_json_binary(&query_verify_fee(
            deps,
            env,
            sender,
            destination,
            payload,
            fee_proof,
        )?),
    }
}

// ============================================================================
// Migrate
// ============================================================================

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn migrate(deps: DepsMut, _env: Env, _msg: MigrateMsg) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    if STATS.may_load(deps.storage)?.is_none() {
        STATS.save(deps.storage, &Stats::default())?;
    }

    Ok(Response::new()
        .add_attribute("action", "migrate")
        .add_attribute("version", CONTRACT_VERSION))
}
