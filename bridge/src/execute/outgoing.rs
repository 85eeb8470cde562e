//! Outgoing operation handlers (transfers, messages and broadcasts).
//!
//! Every handler runs the same sequence: build the payload for the operation,
//! charge the fee (verify proof, consume it, collect), move the asset, then
//! emit one protocol event for the relayer.

use cosmwasm_std::{
    attr, to_json_binary, Attribute, Binary, CosmosMsg, DepsMut, Env, Event, MessageInfo,
    Response, Storage, Uint128, WasmMsg,
};
use cw1155::Cw1155ExecuteMsg;
use cw20::Cw20ExecuteMsg;
use cw721::Cw721ExecuteMsg;

use crate::error::ContractError;
use crate::fee_collector::{collect_fee, ensure_no_funds};
use crate::fee_proof::FeeProof;
use crate::fee_verifier::{consume_fee_proof, FeeRequest, FeeVerifier, TrustedSigners};
use crate::hash::bytes32_to_hex;
use crate::payload::{PackedPayload, BROADCAST_DESTINATION};
use crate::state::{Config, CONFIG, STATS};

// ============================================================================
// Fee Step
// ============================================================================

/// Messages and event attributes produced by charging an operation's fee.
#[derive(Default)]
struct FeeCharge {
    messages: Vec<CosmosMsg>,
    attributes: Vec<Attribute>,
}

/// Verifies and collects the fee for an outgoing operation.
///
/// An absent or empty proof takes the no-fee path, which must not carry
/// funds and is refused while `require_fee_proof` is set. Any other blob is
/// decoded and fully verified, even when it authorizes a zero fee.
fn charge_fee(
    deps: DepsMut,
    env: &Env,
    info: &MessageInfo,
    config: &Config,
    destination: u64,
    payload: &PackedPayload,
    fee_proof: Option<Binary>,
) -> Result<FeeCharge, ContractError> {
    let Some(blob) = fee_proof.filter(|b| !b.is_empty()) else {
        if config.require_fee_proof {
            return Err(ContractError::FeeProofRequired);
        }
        ensure_no_funds(info)?;
        return Ok(FeeCharge::default());
    };

    let proof = FeeProof::decode(&blob)?;
    let verifier = FeeVerifier::new(config.chain_id, TrustedSigners::load(deps.storage)?);
    let request = FeeRequest {
        sender: info.sender.as_str(),
        destination,
        payload,
    };
    let verified = verifier.verify(deps.api, env.block.height, &request, &proof)?;

    consume_fee_proof(deps.storage, &verified.message_hash, env.block.height)?;
    let messages = collect_fee(
        deps.storage,
        deps.api,
        env,
        info,
        &config.native_denom,
        &verified.fee_token,
        verified.fee_amount,
    )?;

    Ok(FeeCharge {
        messages,
        attributes: vec![
            attr("fee_token", verified.fee_token),
            attr("fee_amount", verified.fee_amount.to_string()),
            attr("fee_signer", verified.signer.to_string()),
            attr("fee_hash", bytes32_to_hex(&verified.message_hash)),
        ],
    })
}

fn load_active_config(storage: &dyn Storage) -> Result<Config, ContractError> {
    let config = CONFIG.load(storage)?;
    if config.paused {
        return Err(ContractError::BridgePaused);
    }
    Ok(config)
}

fn ensure_nonzero(amount: Uint128) -> Result<(), ContractError> {
    if amount.is_zero() {
        return Err(ContractError::InvalidAmount {
            reason: "Amount must be greater than zero".to_string(),
        });
    }
    Ok(())
}

fn record_transfer(storage: &mut dyn Storage) -> Result<(), ContractError> {
    STATS.update(storage, |mut stats| -> Result<_, ContractError> {
        stats.total_transfers += 1;
        Ok(stats)
    })?;
    Ok(())
}

// ============================================================================
// Transfers
// ============================================================================

/// Lock CW20 tokens. Pulls `amount` from the sender via allowance.
pub fn execute_transfer_fungible(
    mut deps: DepsMut,
    env: Env,
    info: MessageInfo,
    token: String,
    amount: Uint128,
    destination: u64,
    fee_proof: Option<Binary>,
) -> Result<Response, ContractError> {
    let config = load_active_config(deps.storage)?;
    ensure_nonzero(amount)?;
    let token = deps.api.addr_validate(&token)?;

    let payload = PackedPayload::Fungible {
        token: token.to_string(),
        amount,
    };
    let fee = charge_fee(
        deps.branch(),
        &env,
        &info,
        &config,
        destination,
        &payload,
        fee_proof,
    )?;

    let lock_msg = CosmosMsg::Wasm(WasmMsg::Execute {
        contract_addr: token.to_string(),
        msg: to_json_binary(&Cw20ExecuteMsg::TransferFrom {
            owner: info.sender.to_string(),
            recipient: env.contract.address.to_string(),
            amount,
        })?,
        funds: vec![],
    });
    record_transfer(deps.storage)?;

    let event = Event::new("transfer_initiated")
        .add_attribute("from", info.sender.to_string())
        .add_attribute("token", token.to_string())
        .add_attribute("amount", amount.to_string())
        .add_attribute("destination", destination.to_string())
        .add_attributes(fee.attributes);

    Ok(Response::new()
        .add_messages(fee.messages)
        .add_message(lock_msg)
        .add_event(event)
        .add_attribute("method", "transfer_fungible"))
}

/// Lock a CW721 token. The bridge must be approved to move it.
pub fn execute_transfer_non_fungible(
    mut deps: DepsMut,
    env: Env,
    info: MessageInfo,
    token: String,
    token_id: String,
    destination: u64,
    fee_proof: Option<Binary>,
) -> Result<Response, ContractError> {
    let config = load_active_config(deps.storage)?;
    let token = deps.api.addr_validate(&token)?;

    let payload = PackedPayload::NonFungible {
        token: token.to_string(),
        token_id: token_id.clone(),
    };
    let fee = charge_fee(
        deps.branch(),
        &env,
        &info,
        &config,
        destination,
        &payload,
        fee_proof,
    )?;

    let lock_msg = CosmosMsg::Wasm(WasmMsg::Execute {
        contract_addr: token.to_string(),
        msg: to_json_binary(&Cw721ExecuteMsg::TransferNft {
            recipient: env.contract.address.to_string(),
            token_id: token_id.clone(),
        })?,
        funds: vec![],
    });
    record_transfer(deps.storage)?;

    let event = Event::new("transfer_initiated")
        .add_attribute("from", info.sender.to_string())
        .add_attribute("token", token.to_string())
        .add_attribute("token_id", token_id)
        .add_attribute("destination", destination.to_string())
        .add_attributes(fee.attributes);

    Ok(Response::new()
        .add_messages(fee.messages)
        .add_message(lock_msg)
        .add_event(event)
        .add_attribute("method", "transfer_non_fungible"))
}

/// Lock an amount of a CW1155 token id. The bridge must be an approved
/// operator of the sender.
#[allow(clippy::too_many_arguments)]
pub fn execute_transfer_mixed_fungible(
    mut deps: DepsMut,
    env: Env,
    info: MessageInfo,
    token: String,
    token_id: String,
    amount: Uint128,
    destination: u64,
    fee_proof: Option<Binary>,
) -> Result<Response, ContractError> {
    let config = load_active_config(deps.storage)?;
    ensure_nonzero(amount)?;
    let token = deps.api.addr_validate(&token)?;

    let payload = PackedPayload::MixedFungible {
        token: token.to_string(),
        token_id: token_id.clone(),
        amount,
    };
    let fee = charge_fee(
        deps.branch(),
        &env,
        &info,
        &config,
        destination,
        &payload,
        fee_proof,
    )?;

    let lock_msg = CosmosMsg::Wasm(WasmMsg::Execute {
        contract_addr: token.to_string(),
        msg: to_json_binary(&Cw1155ExecuteMsg::SendFrom {
            from: info.sender.to_string(),
            to: env.contract.address.to_string(),
            token_id: token_id.clone(),
            value: amount,
            msg: None,
        })?,
        funds: vec![],
    });
    record_transfer(deps.storage)?;

    let event = Event::new("transfer_initiated")
        .add_attribute("from", info.sender.to_string())
        .add_attribute("token", token.to_string())
        .add_attribute("token_id", token_id)
        .add_attribute("amount", amount.to_string())
        .add_attribute("destination", destination.to_string())
        .add_attributes(fee.attributes);

    Ok(Response::new()
        .add_messages(fee.messages)
        .add_message(lock_msg)
        .add_event(event)
        .add_attribute("method", "transfer_mixed_fungible"))
}

// ============================================================================
// Messages
// ============================================================================

/// Send a message to a counterparty on another network.
#[allow(clippy::too_many_arguments)]
pub fn execute_send_message(
    mut deps: DepsMut,
    env: Env,
    info: MessageInfo,
    message_id: u64,
    destination: u64,
    recipient: String,
    request_receipt: bool,
    message: Binary,
    fee_proof: Option<Binary>,
) -> Result<Response, ContractError> {
    let config = load_active_config(deps.storage)?;
    if message.is_empty() || recipient.is_empty() {
        return Err(ContractError::InvalidPayload {
            reason: "message and recipient are required".to_string(),
        });
    }

    let payload = PackedPayload::Message {
        message: message.clone(),
        request_receipt,
        recipient: recipient.clone(),
    };
    let fee = charge_fee(
        deps.branch(),
        &env,
        &info,
        &config,
        destination,
        &payload,
        fee_proof,
    )?;

    emit_message_sent(
        deps.storage,
        &info,
        "send_message",
        message_id,
        destination,
        recipient,
        request_receipt,
        message,
        fee,
    )
}

/// Send a message to every network.
pub fn execute_send_broadcast(
    mut deps: DepsMut,
    env: Env,
    info: MessageInfo,
    message_id: u64,
    request_receipt: bool,
    message: Binary,
    fee_proof: Option<Binary>,
) -> Result<Response, ContractError> {
    let config = load_active_config(deps.storage)?;
    if message.is_empty() {
        return Err(ContractError::InvalidPayload {
            reason: "broadcast message is required".to_string(),
        });
    }

    let payload = PackedPayload::Broadcast {
        message: message.clone(),
        request_receipt,
    };
    let fee = charge_fee(
        deps.branch(),
        &env,
        &info,
        &config,
        BROADCAST_DESTINATION,
        &payload,
        fee_proof,
    )?;

    emit_message_sent(
        deps.storage,
        &info,
        "send_broadcast",
        message_id,
        BROADCAST_DESTINATION,
        String::new(),
        request_receipt,
        message,
        fee,
    )
}

#[allow(clippy::too_many_arguments)]
fn emit_message_sent(
    storage: &mut dyn Storage,
    info: &MessageInfo,
    method: &str,
    message_id: u64,
    destination: u64,
    recipient: String,
    request_receipt: bool,
    message: Binary,
    fee: FeeCharge,
) -> Result<Response, ContractError> {
    STATS.update(storage, |mut stats| -> Result<_, ContractError> {
        stats.total_messages_sent += 1;
        Ok(stats)
    })?;

    let event = Event::new("message_sent")
        .add_attribute("from", info.sender.to_string())
        .add_attribute("message_id", message_id.to_string())
        .add_attribute("destination", destination.to_string())
        .add_attribute("recipient", recipient)
        .add_attribute("receipt_requested", request_receipt.to_string())
        .add_attribute("message", message.to_base64())
        .add_attributes(fee.attributes);

    Ok(Response::new()
        .add_messages(fee.messages)
        .add_event(event)
        .add_attribute("method", method))
}
