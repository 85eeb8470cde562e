//! Asset descriptors for fee tokens.
//!
//! A fee token is either a native bank denom or a CW20 contract. The bridge
//! resolves the kind once, when the fee is collected, and pays out with
//! [`Asset::transfer_msg`].

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{
    to_json_binary, Addr, BankMsg, Coin, CosmosMsg, StdResult, Uint128, WasmMsg,
};
use cw20::Cw20ExecuteMsg;

/// A native bank denom or a CW20 contract.
#[cw_serde]
pub enum AssetInfo {
    Native { denom: String },
    Cw20 { contract_addr: String },
}

impl AssetInfo {
    /// Resolves a fee-token identifier. The configured native denom maps to
    /// `Native`; anything else is treated as a CW20 contract address.
    pub fn from_fee_token(fee_token: &str, native_denom: &str) -> Self {
        if fee_token == native_denom {
            AssetInfo::Native {
                denom: fee_token.to_string(),
            }
        } else {
            AssetInfo::Cw20 {
                contract_addr: fee_token.to_string(),
            }
        }
    }

    /// The denom or contract address naming this asset.
    pub fn identifier(&self) -> &str {
        match self {
            AssetInfo::Native { denom } => denom,
            AssetInfo::Cw20 { contract_addr } => contract_addr,
        }
    }
}

#[cw_serde]
pub struct Asset {
    pub info: AssetInfo,
    pub amount: Uint128,
}

impl Asset {
    pub fn new(info: AssetInfo, amount: impl Into<Uint128>) -> Self {
        Asset {
            info,
            amount: amount.into(),
        }
    }

    /// Builds the message paying this asset out of the calling contract.
    pub fn transfer_msg(&self, recipient: &Addr) -> StdResult<CosmosMsg> {
        match &self.info {
            AssetInfo::Native { denom } => Ok(CosmosMsg::Bank(BankMsg::Send {
                to_address: recipient.to_string(),
                amount: vec![Coin {
                    denom: denom.clone(),
                    amount: self.amount,
                }],
            })),
            AssetInfo::Cw20 { contract_addr } => Ok(CosmosMsg::Wasm(WasmMsg::Execute {
                contract_addr: contract_addr.clone(),
                msg: to_json_binary(&Cw20ExecuteMsg::Transfer {
                    recipient: recipient.to_string(),
                    amount: self.amount,
                })?,
                funds: vec![],
            })),
        }
    }
}
