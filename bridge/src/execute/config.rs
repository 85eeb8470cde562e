//! Configuration handlers.
//!
//! This module handles:
//! - Trusted fee verifier set
//! - Operator (relayer) registration
//! - Runtime config updates
//! - Withdrawal of collected fees

use cosmwasm_std::{DepsMut, MessageInfo, Response, Storage, Uint256};

use crate::error::ContractError;
use crate::fee_collector::{debit_pending_fees, fee_payout_msg};
use crate::signature::EthAddress;
use crate::state::{Config, CONFIG, FEE_VERIFIERS, OPERATORS, OPERATOR_COUNT};

pub(crate) fn load_admin_config(
    storage: &dyn Storage,
    info: &MessageInfo,
) -> Result<Config, ContractError> {
    let config = CONFIG.load(storage)?;
    if info.sender != config.admin {
        return Err(ContractError::Unauthorized);
    }
    Ok(config)
}

// ============================================================================
// Fee Verifiers
// ============================================================================

/// Trust a fee verifier address.
pub fn execute_add_fee_verifier(
    deps: DepsMut,
    info: MessageInfo,
    address: String,
) -> Result<Response, ContractError> {
    load_admin_config(deps.storage, &info)?;

    let verifier = EthAddress::parse(&address)?;
    if verifier.is_zero() {
        return Err(ContractError::InvalidFeeVerifier { address });
    }
    let existing = FEE_VERIFIERS
        .may_load(deps.storage, verifier.as_bytes())?
        .unwrap_or(false);
    if existing {
        return Err(ContractError::FeeVerifierAlreadyRegistered {
            address: verifier.to_string(),
        });
    }

    FEE_VERIFIERS.save(deps.storage, verifier.as_bytes(), &true)?;

    Ok(Response::new()
        .add_attribute("method", "add_fee_verifier")
        .add_attribute("fee_verifier", verifier.to_string()))
}

/// Stop trusting a fee verifier address.
pub fn execute_remove_fee_verifier(
    deps: DepsMut,
    info: MessageInfo,
    address: String,
) -> Result<Response, ContractError> {
    load_admin_config(deps.storage, &info)?;

    let verifier = EthAddress::parse(&address)?;
    let existing = FEE_VERIFIERS
        .may_load(deps.storage, verifier.as_bytes())?
        .unwrap_or(false);
    if !existing {
        return Err(ContractError::FeeVerifierNotRegistered {
            address: verifier.to_string(),
        });
    }

    FEE_VERIFIERS.remove(deps.storage, verifier.as_bytes());

    Ok(Response::new()
        .add_attribute("method", "remove_fee_verifier")
        .add_attribute("fee_verifier", verifier.to_string()))
}

// ============================================================================
// Operators
// ============================================================================

/// Add an operator.
pub fn execute_add_operator(
    deps: DepsMut,
    info: MessageInfo,
    operator: String,
) -> Result<Response, ContractError> {
    load_admin_config(deps.storage, &info)?;

    let operator_addr = deps.api.addr_validate(&operator)?;
    let existing = OPERATORS
        .may_load(deps.storage, &operator_addr)?
        .unwrap_or(false);
    if existing {
        return Err(ContractError::OperatorAlreadyRegistered { address: operator });
    }

    OPERATORS.save(deps.storage, &operator_addr, &true)?;
    let count = OPERATOR_COUNT.load(deps.storage)?;
    OPERATOR_COUNT.save(deps.storage, &(count + 1))?;

    Ok(Response::new()
        .add_attribute("method", "add_operator")
        .add_attribute("operator", operator))
}

/// Remove an operator. The last operator cannot be removed.
pub fn execute_remove_operator(
    deps: DepsMut,
    info: MessageInfo,
    operator: String,
) -> Result<Response, ContractError> {
    load_admin_config(deps.storage, &info)?;

    let operator_addr = deps.api.addr_validate(&operator)?;
    let existing = OPERATORS
        .may_load(deps.storage, &operator_addr)?
        .unwrap_or(false);
    if !existing {
        return Err(ContractError::OperatorNotRegistered { address: operator });
    }

    let count = OPERATOR_COUNT.load(deps.storage)?;
    if count <= 1 {
        return Err(ContractError::CannotRemoveLastOperator);
    }

    OPERATORS.remove(deps.storage, &operator_addr);
    OPERATOR_COUNT.save(deps.storage, &(count - 1))?;

    Ok(Response::new()
        .add_attribute("method", "remove_operator")
        .add_attribute("operator", operator))
}

// ============================================================================
// Runtime Config
// ============================================================================

/// Update the native fee denom and/or the fee proof requirement.
///
/// Pending fees collected under a previous native denom stay withdrawable as
/// that denom.
pub fn execute_update_config(
    deps: DepsMut,
    info: MessageInfo,
    native_denom: Option<String>,
    require_fee_proof: Option<bool>,
) -> Result<Response, ContractError> {
    let mut config = load_admin_config(deps.storage, &info)?;

    if let Some(denom) = native_denom {
        if denom.is_empty() {
            return Err(ContractError::InvalidAmount {
                reason: "native denom cannot be empty".to_string(),
            });
        }
        config.native_denom = denom;
    }
    if let Some(required) = require_fee_proof {
        config.require_fee_proof = required;
    }
    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_attribute("method", "update_config")
        .add_attribute("native_denom", config.native_denom)
        .add_attribute("require_fee_proof", config.require_fee_proof.to_string()))
}

// ============================================================================
// Fee Withdrawal
// ============================================================================

/// Pay out collected fees, debiting the pending-fee ledger.
pub fn execute_withdraw_fees(
    deps: DepsMut,
    info: MessageInfo,
    fee_token: String,
    amount: Uint256,
    recipient: String,
) -> Result<Response, ContractError> {
    load_admin_config(deps.storage, &info)?;
    if amount.is_zero() {
        return Err(ContractError::InvalidAmount {
            reason: "Amount must be greater than zero".to_string(),
        });
    }
    let recipient = deps.api.addr_validate(&recipient)?;

    let remaining = debit_pending_fees(deps.storage, &fee_token, amount)?;
    let payout = fee_payout_msg(remaining.asset, amount, &recipient)?;

    Ok(Response::new()
        .add_message(payout)
        .add_attribute("method", "withdraw_fees")
        .add_attribute("fee_token", fee_token)
        .add_attribute("amount", amount.to_string())
        .add_attribute("recipient", recipient)
        .add_attribute("remaining", remaining.amount.to_string()))
}
