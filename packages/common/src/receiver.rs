//! Receiver interface for relayed bridge messages.
//!
//! A contract that wants to accept messages from the bridge adds the
//! `ReceiveBridgeMessage` variant to its own `ExecuteMsg`. The receiver
//! signals delivery by setting its response data to a JSON boolean: `false`
//! is a soft failure that the bridge records, an error aborts the relay.

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{to_json_binary, Binary, CosmosMsg, StdResult, WasmMsg};

/// Message relayed from another network.
#[cw_serde]
pub struct BridgeMessage {
    /// Originating account on the source network
    pub sender: String,
    /// Source network id
    pub from_network: u64,
    pub message_id: u64,
    pub request_receipt: bool,
    pub message: Binary,
}

#[cw_serde]
pub enum BridgeReceiverMsg {
    ReceiveBridgeMessage(BridgeMessage),
}

impl BridgeMessage {
    /// Serializes the message wrapped in the receiver enum.
    pub fn into_binary(self) -> StdResult<Binary> {
        let msg = BridgeReceiverMsg::ReceiveBridgeMessage(self);
        to_json_binary(&msg)
    }

    /// Creates a cosmos msg delivering this message to `contract_addr`.
    pub fn into_cosmos_msg<T: Into<String>>(self, contract_addr: T) -> StdResult<CosmosMsg> {
        let msg = self.into_binary()?;
        let execute = WasmMsg::Execute {
            contract_addr: contract_addr.into(),
            msg,
            funds: vec![],
        };
        Ok(execute.into())
    }
}
