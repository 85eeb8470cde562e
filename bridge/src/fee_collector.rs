//! Fee Collector Module
//!
//! Charges a verified fee and keeps the pending-fee ledger.
//!
//! ## Payment Rules
//!
//! | Fee token              | Attached funds                   | Transfer                      |
//! |------------------------|----------------------------------|-------------------------------|
//! | Native denom sentinel  | exactly `fee_amount` of the denom | none, funds arrive with the call |
//! | CW20 contract          | none allowed                     | `TransferFrom` payer → bridge |
//!
//! ## Ledger
//!
//! `PENDING_FEES` is keyed by fee-token identifier. Each entry keeps the
//! asset kind it was collected as, so payouts stay correct after the native
//! denom is reconfigured. An entry grows on every collection and shrinks
//! only through admin withdrawals and claim rebates. Both directions are
//! overflow/underflow checked.

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{
    to_json_binary, Addr, Api, CosmosMsg, Env, MessageInfo, StdResult, Storage, Uint128, Uint256,
    WasmMsg,
};
use cw20::Cw20ExecuteMsg;
use cw_storage_plus::Map;
use cw_utils::may_pay;

use crate::error::ContractError;
use common::{Asset, AssetInfo};

#[cw_serde]
pub struct PendingFee {
    pub asset: AssetInfo,
    pub amount: Uint256,
}

/// Collected, not yet withdrawn fees
/// Key: fee token identifier, Value: asset kind and accumulated amount
pub const PENDING_FEES: Map<&str, PendingFee> = Map::new("pending_fees");

/// Charges `fee_amount` of `fee_token` to the caller and credits the ledger.
///
/// Returns the messages that complete the charge (a CW20 pull transfer, or
/// nothing for native fees).
pub fn collect_fee(
    storage: &mut dyn Storage,
    api: &dyn Api,
    env: &Env,
    info: &MessageInfo,
    native_denom: &str,
    fee_token: &str,
    fee_amount: Uint256,
) -> Result<Vec<CosmosMsg>, ContractError> {
    let mut messages = vec![];

    let asset = AssetInfo::from_fee_token(fee_token, native_denom);
    match &asset {
        AssetInfo::Native { denom } => {
            let provided = Uint256::from(may_pay(info, denom)?);
            if provided != fee_amount {
                return Err(ContractError::IncorrectFeeAmount {
                    provided,
                    expected: fee_amount,
                });
            }
        }
        AssetInfo::Cw20 { contract_addr } => {
            ensure_no_funds(info)?;
            let token = api.addr_validate(contract_addr)?;
            let amount = to_uint128(fee_amount)?;
            if !amount.is_zero() {
                messages.push(CosmosMsg::Wasm(WasmMsg::Execute {
                    contract_addr: token.to_string(),
                    msg: to_json_binary(&Cw20ExecuteMsg::TransferFrom {
                        owner: info.sender.to_string(),
                        recipient: env.contract.address.to_string(),
                        amount,
                    })?,
                    funds: vec![],
                }));
            }
        }
    }

    credit_pending_fees(storage, &asset, fee_amount)?;
    Ok(messages)
}

/// Operations paid without a fee proof must not carry funds.
pub fn ensure_no_funds(info: &MessageInfo) -> Result<(), ContractError> {
    if !info.funds.is_empty() {
        return Err(ContractError::FunctionNotPayable);
    }
    Ok(())
}

pub fn credit_pending_fees(
    storage: &mut dyn Storage,
    asset: &AssetInfo,
    amount: Uint256,
) -> Result<Uint256, ContractError> {
    let fee_token = asset.identifier();
    let current = pending_fees(storage, fee_token)?;
    if amount.is_zero() {
        return Ok(current);
    }
    let updated = current.checked_add(amount)?;
    PENDING_FEES.save(
        storage,
        fee_token,
        &PendingFee {
            asset: asset.clone(),
            amount: updated,
        },
    )?;
    Ok(updated)
}

/// Debits the ledger, failing rather than going below zero.
///
/// Returns the entry as it stands after the debit. Its `asset` is the kind
/// the fees were collected as.
pub fn debit_pending_fees(
    storage: &mut dyn Storage,
    fee_token: &str,
    amount: Uint256,
) -> Result<PendingFee, ContractError> {
    let entry = PENDING_FEES.may_load(storage, fee_token)?;
    let available = entry.as_ref().map(|e| e.amount).unwrap_or_default();
    let insufficient = || ContractError::InsufficientPendingFees {
        fee_token: fee_token.to_string(),
        available,
        requested: amount,
    };
    let mut entry = entry.ok_or_else(insufficient)?;
    entry.amount = available.checked_sub(amount).map_err(|_| insufficient())?;

    if entry.amount.is_zero() {
        PENDING_FEES.remove(storage, fee_token);
    } else {
        PENDING_FEES.save(storage, fee_token, &entry)?;
    }
    Ok(entry)
}

pub fn pending_fees(storage: &dyn Storage, fee_token: &str) -> StdResult<Uint256> {
    Ok(PENDING_FEES
        .may_load(storage, fee_token)?
        .map(|entry| entry.amount)
        .unwrap_or_default())
}

/// Message paying `amount` of a collected fee asset out of the bridge.
pub fn fee_payout_msg(
    asset: AssetInfo,
    amount: Uint256,
    recipient: &Addr,
) -> Result<CosmosMsg, ContractError> {
    Ok(Asset::new(asset, to_uint128(amount)?).transfer_msg(recipient)?)
}

/// Bank and CW20 amounts are 128-bit.
pub fn to_uint128(amount: Uint256) -> Result<Uint128, ContractError> {
    Ok(Uint128::try_from(amount)?)
}
