//! Incoming operation handlers (claims and message relay).
//!
//! Operators replay transfers and messages observed on other networks. A
//! claim either releases assets straight to the recipient, or records an
//! entitlement the owner later redeems. Releases can refund part of a
//! previously collected fee. Relays deliver a message to a receiver contract
//! and record whether the receiver accepted it.
//!
//! ## Releasable Balance
//!
//! Fungible holdings back three things: fees owed to the pending-fee ledger,
//! recorded entitlements, and whatever is left. Direct claims may only spend
//! what is left. A redemption may also spend the owner's own entitlement.

use cosmwasm_std::{
    from_json, to_json_binary, Addr, Binary, CosmosMsg, Deps, DepsMut, Env, Event, MessageInfo,
    QuerierWrapper, Reply, Response, StdError, StdResult, Storage, SubMsg, Uint128, Uint256,
    WasmMsg,
};
use cw1155::{BalanceResponse as Cw1155BalanceResponse, Cw1155ExecuteMsg, Cw1155QueryMsg};
use cw20::{BalanceResponse as Cw20BalanceResponse, Cw20ExecuteMsg, Cw20QueryMsg};
use cw721::{Cw721ExecuteMsg, Cw721QueryMsg, OwnerOfResponse};
use cw_utils::parse_execute_response_data;

use crate::error::ContractError;
use crate::fee_collector::{debit_pending_fees, fee_payout_msg, pending_fees};
use crate::msg::FeeRebate;
use crate::state::{
    Config, PendingRelay, CLAIMABLE, CONFIG, OPERATORS, PENDING_RELAY, RELAY_REPLY_ID,
    RESERVED_CLAIMS, STATS,
};
use common::BridgeMessage;

/// Token id component of fungible entitlement keys
const FUNGIBLE_ID: &str = "";

// ============================================================================
// Helpers
// ============================================================================

fn load_active_config(storage: &dyn Storage) -> Result<Config, ContractError> {
    let config = CONFIG.load(storage)?;
    if config.paused {
        return Err(ContractError::BridgePaused);
    }
    Ok(config)
}

fn ensure_operator(storage: &dyn Storage, sender: &Addr) -> Result<(), ContractError> {
    load_active_config(storage)?;
    let is_operator = OPERATORS.may_load(storage, sender)?.unwrap_or(false);
    if !is_operator {
        return Err(ContractError::UnauthorizedOperator);
    }
    Ok(())
}

fn ensure_positive(amount: Uint128) -> Result<(), ContractError> {
    if amount.is_zero() {
        return Err(ContractError::InvalidAmount {
            reason: "Amount must be greater than zero".to_string(),
        });
    }
    Ok(())
}

/// Debits the ledger for a rebate and returns the payout message, if any.
fn apply_rebate(
    storage: &mut dyn Storage,
    recipient: &Addr,
    rebate: Option<FeeRebate>,
    event: Event,
) -> Result<(Event, Option<CosmosMsg>), ContractError> {
    let Some(rebate) = rebate.filter(|r| !r.amount.is_zero()) else {
        return Ok((event, None));
    };

    let entry = debit_pending_fees(storage, &rebate.fee_token, rebate.amount)?;
    let msg = fee_payout_msg(entry.asset, rebate.amount, recipient)?;
    let event = event
        .add_attribute("rebate_token", rebate.fee_token)
        .add_attribute("rebate_amount", rebate.amount.to_string());
    Ok((event, Some(msg)))
}

fn record_claim(storage: &mut dyn Storage) -> Result<(), ContractError> {
    STATS.update(storage, |mut stats| -> Result<_, ContractError> {
        stats.total_claims += 1;
        Ok(stats)
    })?;
    Ok(())
}

fn claim_response(
    method: &str,
    release_msg: CosmosMsg,
    rebate_msg: Option<CosmosMsg>,
    event: Event,
) -> Response {
    Response::new()
        .add_message(release_msg)
        .add_messages(rebate_msg)
        .add_event(event)
        .add_attribute("method", method)
}

// ============================================================================
// Holdings
// ============================================================================

fn reserved_claims(storage: &dyn Storage, token: &Addr, token_id: &str) -> StdResult<Uint128> {
    Ok(RESERVED_CLAIMS
        .may_load(storage, (token.as_str(), token_id))?
        .unwrap_or_default())
}

fn cw20_holdings(querier: &QuerierWrapper, token: &Addr, bridge: &Addr) -> StdResult<Uint128> {
    let res: Cw20BalanceResponse = querier.query_wasm_smart(
        token,
        &Cw20QueryMsg::Balance {
            address: bridge.to_string(),
        },
    )?;
    Ok(res.balance)
}

fn cw1155_holdings(
    querier: &QuerierWrapper,
    token: &Addr,
    token_id: &str,
    bridge: &Addr,
) -> StdResult<Uint128> {
    let res: Cw1155BalanceResponse = querier.query_wasm_smart(
        token,
        &Cw1155QueryMsg::Balance {
            owner: bridge.to_string(),
            token_id: token_id.to_string(),
        },
    )?;
    Ok(res.balance)
}

/// Fails unless `amount` fits in `held` after fees owed and reservations.
fn ensure_releasable(
    token: String,
    held: Uint128,
    owed_fees: Uint256,
    reserved: Uint128,
    amount: Uint128,
) -> Result<(), ContractError> {
    let available = Uint256::from(held)
        .saturating_sub(owed_fees)
        .saturating_sub(Uint256::from(reserved));
    if available < Uint256::from(amount) {
        return Err(ContractError::InsufficientBridgeBalance {
            token,
            available,
            requested: Uint256::from(amount),
        });
    }
    Ok(())
}

/// CW20 tokens the bridge may hand out. Fees collected in the same token stay
/// behind for the ledger.
fn ensure_cw20_releasable(
    deps: Deps,
    env: &Env,
    token: &Addr,
    amount: Uint128,
) -> Result<(), ContractError> {
    let held = cw20_holdings(&deps.querier, token, &env.contract.address)?;
    let owed_fees = pending_fees(deps.storage, token.as_str())?;
    let reserved = reserved_claims(deps.storage, token, FUNGIBLE_ID)?;
    ensure_releasable(token.to_string(), held, owed_fees, reserved, amount)
}

fn ensure_cw1155_releasable(
    deps: Deps,
    env: &Env,
    token: &Addr,
    token_id: &str,
    amount: Uint128,
) -> Result<(), ContractError> {
    let held = cw1155_holdings(&deps.querier, token, token_id, &env.contract.address)?;
    let reserved = reserved_claims(deps.storage, token, token_id)?;
    ensure_releasable(
        format!("{}:{}", token, token_id),
        held,
        Uint256::zero(),
        reserved,
        amount,
    )
}

fn ensure_nft_held(
    querier: &QuerierWrapper,
    env: &Env,
    token: &Addr,
    token_id: &str,
) -> Result<(), ContractError> {
    let owner: OwnerOfResponse = querier.query_wasm_smart(
        token,
        &Cw721QueryMsg::OwnerOf {
            token_id: token_id.to_string(),
            include_expired: None,
        },
    )?;
    if owner.owner != env.contract.address.as_str() {
        return Err(ContractError::NftNotHeld {
            token: token.to_string(),
            token_id: token_id.to_string(),
        });
    }
    Ok(())
}

fn ensure_nft_unreserved(
    storage: &dyn Storage,
    token: &Addr,
    token_id: &str,
) -> Result<(), ContractError> {
    if !reserved_claims(storage, token, token_id)?.is_zero() {
        return Err(ContractError::NftReserved {
            token: token.to_string(),
            token_id: token_id.to_string(),
        });
    }
    Ok(())
}

// ============================================================================
// Release Messages
// ============================================================================

fn cw20_release_msg(token: &Addr, recipient: &Addr, amount: Uint128) -> StdResult<CosmosMsg> {
    Ok(CosmosMsg::Wasm(WasmMsg::Execute {
        contract_addr: token.to_string(),
        msg: to_json_binary(&Cw20ExecuteMsg::Transfer {
            recipient: recipient.to_string(),
            amount,
        })?,
        funds: vec![],
    }))
}

fn cw721_release_msg(token: &Addr, recipient: &Addr, token_id: &str) -> StdResult<CosmosMsg> {
    Ok(CosmosMsg::Wasm(WasmMsg::Execute {
        contract_addr: token.to_string(),
        msg: to_json_binary(&Cw721ExecuteMsg::TransferNft {
            recipient: recipient.to_string(),
            token_id: token_id.to_string(),
        })?,
        funds: vec![],
    }))
}

fn cw1155_release_msg(
    env: &Env,
    token: &Addr,
    recipient: &Addr,
    token_id: &str,
    amount: Uint128,
) -> StdResult<CosmosMsg> {
    Ok(CosmosMsg::Wasm(WasmMsg::Execute {
        contract_addr: token.to_string(),
        msg: to_json_binary(&Cw1155ExecuteMsg::SendFrom {
            from: env.contract.address.to_string(),
            to: recipient.to_string(),
            token_id: token_id.to_string(),
            value: amount,
            msg: None,
        })?,
        funds: vec![],
    }))
}

// ============================================================================
// Direct Claims
// ============================================================================

/// Release CW20 tokens held by the bridge.
pub fn execute_claim_fungible(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    token: String,
    recipient: String,
    amount: Uint128,
    rebate: Option<FeeRebate>,
) -> Result<Response, ContractError> {
    ensure_operator(deps.storage, &info.sender)?;
    let token = deps.api.addr_validate(&token)?;
    let recipient = deps.api.addr_validate(&recipient)?;

    ensure_cw20_releasable(deps.as_ref(), &env, &token, amount)?;
    let release_msg = cw20_release_msg(&token, &recipient, amount)?;

    let event = Event::new("claim_processed")
        .add_attribute("from", info.sender.to_string())
        .add_attribute("recipient", recipient.to_string())
        .add_attribute("token", token.to_string())
        .add_attribute("amount", amount.to_string());
    let (event, rebate_msg) = apply_rebate(deps.storage, &recipient, rebate, event)?;
    record_claim(deps.storage)?;

    Ok(claim_response(
        "claim_fungible",
        release_msg,
        rebate_msg,
        event,
    ))
}

/// Release a CW721 token held by the bridge.
pub fn execute_claim_non_fungible(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    token: String,
    recipient: String,
    token_id: String,
    rebate: Option<FeeRebate>,
) -> Result<Response, ContractError> {
    ensure_operator(deps.storage, &info.sender)?;
    let token = deps.api.addr_validate(&token)?;
    let recipient = deps.api.addr_validate(&recipient)?;

    ensure_nft_unreserved(deps.storage, &token, &token_id)?;
    ensure_nft_held(&deps.querier, &env, &token, &token_id)?;
    let release_msg = cw721_release_msg(&token, &recipient, &token_id)?;

    let event = Event::new("claim_processed")
        .add_attribute("from", info.sender.to_string())
        .add_attribute("recipient", recipient.to_string())
        .add_attribute("token", token.to_string())
        .add_attribute("token_id", token_id);
    let (event, rebate_msg) = apply_rebate(deps.storage, &recipient, rebate, event)?;
    record_claim(deps.storage)?;

    Ok(claim_response(
        "claim_non_fungible",
        release_msg,
        rebate_msg,
        event,
    ))
}

/// Release CW1155 tokens held by the bridge.
#[allow(clippy::too_many_arguments)]
pub fn execute_claim_mixed_fungible(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    token: String,
    recipient: String,
    token_id: String,
    amount: Uint128,
    rebate: Option<FeeRebate>,
) -> Result<Response, ContractError> {
    ensure_operator(deps.storage, &info.sender)?;
    let token = deps.api.addr_validate(&token)?;
    let recipient = deps.api.addr_validate(&recipient)?;

    ensure_cw1155_releasable(deps.as_ref(), &env, &token, &token_id, amount)?;
    let release_msg = cw1155_release_msg(&env, &token, &recipient, &token_id, amount)?;

    let event = Event::new("claim_processed")
        .add_attribute("from", info.sender.to_string())
        .add_attribute("recipient", recipient.to_string())
        .add_attribute("token", token.to_string())
        .add_attribute("token_id", token_id)
        .add_attribute("amount", amount.to_string());
    let (event, rebate_msg) = apply_rebate(deps.storage, &recipient, rebate, event)?;
    record_claim(deps.storage)?;

    Ok(claim_response(
        "claim_mixed_fungible",
        release_msg,
        rebate_msg,
        event,
    ))
}

// ============================================================================
// Claimable Entitlements
// ============================================================================

fn grant_entitlement(
    storage: &mut dyn Storage,
    owner: &Addr,
    token: &Addr,
    token_id: &str,
    amount: Uint128,
) -> Result<Uint128, ContractError> {
    let key = (owner, token.as_str(), token_id);
    let updated = CLAIMABLE
        .may_load(storage, key)?
        .unwrap_or_default()
        .checked_add(amount)?;
    CLAIMABLE.save(storage, key, &updated)?;

    let reserved = reserved_claims(storage, token, token_id)?.checked_add(amount)?;
    RESERVED_CLAIMS.save(storage, (token.as_str(), token_id), &reserved)?;
    Ok(updated)
}

/// Removes `amount` from the owner's entitlement and from the reservation.
fn redeem_entitlement(
    storage: &mut dyn Storage,
    owner: &Addr,
    token: &Addr,
    token_id: &str,
    amount: Uint128,
) -> Result<(), ContractError> {
    let key = (owner, token.as_str(), token_id);
    let available = CLAIMABLE.may_load(storage, key)?.unwrap_or_default();
    let remaining =
        available
            .checked_sub(amount)
            .map_err(|_| ContractError::InsufficientClaimable {
                token: token.to_string(),
                token_id: token_id.to_string(),
                available,
                requested: amount,
            })?;
    if remaining.is_zero() {
        CLAIMABLE.remove(storage, key);
    } else {
        CLAIMABLE.save(storage, key, &remaining)?;
    }

    let reserved = reserved_claims(storage, token, token_id)?.checked_sub(amount)?;
    if reserved.is_zero() {
        RESERVED_CLAIMS.remove(storage, (token.as_str(), token_id));
    } else {
        RESERVED_CLAIMS.save(storage, (token.as_str(), token_id), &reserved)?;
    }
    Ok(())
}

fn claim_added_response(
    method: &str,
    owner: &Addr,
    token: &Addr,
    token_id: Option<&str>,
    claimable: Uint128,
) -> Response {
    let mut response = Response::new()
        .add_attribute("method", method)
        .add_attribute("owner", owner.to_string())
        .add_attribute("token", token.to_string());
    if let Some(token_id) = token_id {
        response = response.add_attribute("token_id", token_id);
    }
    response.add_attribute("claimable", claimable.to_string())
}

/// Record CW20 tokens `owner` may redeem.
pub fn execute_add_claim_fungible(
    deps: DepsMut,
    info: MessageInfo,
    token: String,
    owner: String,
    amount: Uint128,
) -> Result<Response, ContractError> {
    ensure_operator(deps.storage, &info.sender)?;
    ensure_positive(amount)?;
    let token = deps.api.addr_validate(&token)?;
    let owner = deps.api.addr_validate(&owner)?;

    let claimable = grant_entitlement(deps.storage, &owner, &token, FUNGIBLE_ID, amount)?;
    Ok(claim_added_response(
        "add_claim_fungible",
        &owner,
        &token,
        None,
        claimable,
    ))
}

/// Record a CW721 token `owner` may redeem. A token can back one entitlement
/// at a time.
pub fn execute_add_claim_non_fungible(
    deps: DepsMut,
    info: MessageInfo,
    token: String,
    owner: String,
    token_id: String,
) -> Result<Response, ContractError> {
    ensure_operator(deps.storage, &info.sender)?;
    let token = deps.api.addr_validate(&token)?;
    let owner = deps.api.addr_validate(&owner)?;

    ensure_nft_unreserved(deps.storage, &token, &token_id)?;
    let claimable = grant_entitlement(deps.storage, &owner, &token, &token_id, Uint128::one())?;
    Ok(claim_added_response(
        "add_claim_non_fungible",
        &owner,
        &token,
        Some(&token_id),
        claimable,
    ))
}

/// Record CW1155 tokens `owner` may redeem.
pub fn execute_add_claim_mixed_fungible(
    deps: DepsMut,
    info: MessageInfo,
    token: String,
    owner: String,
    token_id: String,
    amount: Uint128,
) -> Result<Response, ContractError> {
    ensure_operator(deps.storage, &info.sender)?;
    ensure_positive(amount)?;
    let token = deps.api.addr_validate(&token)?;
    let owner = deps.api.addr_validate(&owner)?;

    let claimable = grant_entitlement(deps.storage, &owner, &token, &token_id, amount)?;
    Ok(claim_added_response(
        "add_claim_mixed_fungible",
        &owner,
        &token,
        Some(&token_id),
        claimable,
    ))
}

// ============================================================================
// Redemptions
// ============================================================================

/// Redeem recorded CW20 tokens to the caller.
pub fn execute_redeem_fungible(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    token: String,
    amount: Uint128,
) -> Result<Response, ContractError> {
    load_active_config(deps.storage)?;
    ensure_positive(amount)?;
    let token = deps.api.addr_validate(&token)?;
    let owner = info.sender;

    redeem_entitlement(deps.storage, &owner, &token, FUNGIBLE_ID, amount)?;
    ensure_cw20_releasable(deps.as_ref(), &env, &token, amount)?;
    let release_msg = cw20_release_msg(&token, &owner, amount)?;
    record_claim(deps.storage)?;

    let event = Event::new("claim_processed")
        .add_attribute("from", owner.to_string())
        .add_attribute("recipient", owner.to_string())
        .add_attribute("token", token.to_string())
        .add_attribute("amount", amount.to_string());
    Ok(claim_response("redeem_fungible", release_msg, None, event))
}

/// Redeem a recorded CW721 token to the caller.
pub fn execute_redeem_non_fungible(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    token: String,
    token_id: String,
) -> Result<Response, ContractError> {
    load_active_config(deps.storage)?;
    let token = deps.api.addr_validate(&token)?;
    let owner = info.sender;

    redeem_entitlement(deps.storage, &owner, &token, &token_id, Uint128::one())?;
    ensure_nft_held(&deps.querier, &env, &token, &token_id)?;
    let release_msg = cw721_release_msg(&token, &owner, &token_id)?;
    record_claim(deps.storage)?;

    let event = Event::new("claim_processed")
        .add_attribute("from", owner.to_string())
        .add_attribute("recipient", owner.to_string())
        .add_attribute("token", token.to_string())
        .add_attribute("token_id", token_id);
    Ok(claim_response("redeem_non_fungible", release_msg, None, event))
}

/// Redeem recorded CW1155 tokens to the caller.
pub fn execute_redeem_mixed_fungible(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    token: String,
    token_id: String,
    amount: Uint128,
) -> Result<Response, ContractError> {
    load_active_config(deps.storage)?;
    ensure_positive(amount)?;
    let token = deps.api.addr_validate(&token)?;
    let owner = info.sender;

    redeem_entitlement(deps.storage, &owner, &token, &token_id, amount)?;
    ensure_cw1155_releasable(deps.as_ref(), &env, &token, &token_id, amount)?;
    let release_msg = cw1155_release_msg(&env, &token, &owner, &token_id, amount)?;
    record_claim(deps.storage)?;

    let event = Event::new("claim_processed")
        .add_attribute("from", owner.to_string())
        .add_attribute("recipient", owner.to_string())
        .add_attribute("token", token.to_string())
        .add_attribute("token_id", token_id)
        .add_attribute("amount", amount.to_string());
    Ok(claim_response("redeem_mixed_fungible", release_msg, None, event))
}

// ============================================================================
// Message Relay
// ============================================================================

/// Deliver a message from another network to `receiver`.
///
/// The receiver runs as a submessage. If it errors the whole relay reverts
/// (hard fail). If it returns `false` as its response data the relay still
/// completes and `message_received` reports `success = false` (soft fail).
#[allow(clippy::too_many_arguments)]
pub fn execute_relay_message(
    deps: DepsMut,
    info: MessageInfo,
    receiver: String,
    sender: String,
    from_network: u64,
    message_id: u64,
    request_receipt: bool,
    message: Binary,
) -> Result<Response, ContractError> {
    ensure_operator(deps.storage, &info.sender)?;
    let receiver = deps.api.addr_validate(&receiver)?;

    PENDING_RELAY.save(
        deps.storage,
        &PendingRelay {
            receiver: receiver.clone(),
            sender: sender.clone(),
            from_network,
            message_id,
            request_receipt,
        },
    )?;

    let delivery = BridgeMessage {
        sender,
        from_network,
        message_id,
        request_receipt,
        message,
    }
    .into_cosmos_msg(receiver.to_string())?;

    Ok(Response::new()
        .add_submessage(SubMsg::reply_on_success(delivery, RELAY_REPLY_ID))
        .add_attribute("method", "relay_message")
        .add_attribute("receiver", receiver)
        .add_attribute("message_id", message_id.to_string()))
}

/// Reads the receiver's delivery flag. No data counts as delivered.
fn delivery_succeeded(reply: Reply) -> Result<bool, ContractError> {
    let response = reply.result.into_result().map_err(StdError::generic_err)?;
    let Some(data) = response.data else {
        return Ok(true);
    };
    match parse_execute_response_data(&data)?.data {
        Some(flag) => Ok(from_json::<bool>(&flag)?),
        None => Ok(true),
    }
}

pub fn handle_relay_reply(deps: DepsMut, reply: Reply) -> Result<Response, ContractError> {
    let pending = PENDING_RELAY
        .may_load(deps.storage)?
        .ok_or(ContractError::NoPendingRelay)?;
    PENDING_RELAY.remove(deps.storage);

    let success = delivery_succeeded(reply)?;
    STATS.update(deps.storage, |mut stats| -> Result<_, ContractError> {
        stats.total_messages_received += 1;
        if !success {
            stats.total_failed_deliveries += 1;
        }
        Ok(stats)
    })?;

    let event = Event::new("message_received")
        .add_attribute("from", pending.sender)
        .add_attribute("from_network", pending.from_network.to_string())
        .add_attribute("receiver", pending.receiver.to_string())
        .add_attribute("success", success.to_string())
        .add_attribute("message_id", pending.message_id.to_string())
        .add_attribute("receipt_requested", pending.request_receipt.to_string());

    Ok(Response::new()
        .add_event(event)
        .add_attribute("method", "relay_reply")
        .add_attribute("success", success.to_string()))
}
