//! Canonical message encoding
//!
//! Every fee proof signs over a `CanonicalMessage`: the fee terms plus a
//! `PackedPayload` describing the operation the fee pays for.
//!
//! # Outer tuple
//! ```solidity
//! abi.encode(
//!     uint256 chainId,
//!     string  sender,
//!     uint256 destination,
//!     string  feeToken,
//!     uint256 feeAmount,
//!     uint256 maxBlock,
//!     bytes   packedPayload
//! )
//! ```
//!
//! # Payload modes
//! | Tag | Mode          | Encoding                                              |
//! |-----|---------------|-------------------------------------------------------|
//! | 1   | NonFungible   | `(uint8 1, string token, string tokenId)`             |
//! | 2   | Fungible      | `(uint8 2, string token, uint256 amount)`             |
//! | 3   | MixedFungible | `(uint8 3, string token, string tokenId, uint256 amount)` |
//! | 4   | Message       | `(uint8 4, bytes message, bool receipt, string recipient)` |
//! | 5   | Broadcast     | `(uint8 5, bytes message, bool receipt)`              |
//!
//! The leading tag keeps payloads of different modes from ever sharing an
//! encoding, e.g. a broadcast and a fungible transfer with coincidentally
//! equal words.

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Binary, Uint128, Uint256};

use crate::abi::{encode, Token};
use crate::error::ContractError;
use crate::hash::keccak256;

pub const MODE_NON_FUNGIBLE: u8 = 1;
pub const MODE_FUNGIBLE: u8 = 2;
pub const MODE_MIXED_FUNGIBLE: u8 = 3;
pub const MODE_MESSAGE: u8 = 4;
pub const MODE_BROADCAST: u8 = 5;

/// Destination network id used for broadcasts.
pub const BROADCAST_DESTINATION: u64 = 0;

/// Operation details bound into a fee proof.
#[cw_serde]
pub enum PackedPayload {
    NonFungible {
        token: String,
        token_id: String,
    },
    Fungible {
        token: String,
        amount: Uint128,
    },
    MixedFungible {
        token: String,
        token_id: String,
        amount: Uint128,
    },
    Message {
        message: Binary,
        request_receipt: bool,
        recipient: String,
    },
    Broadcast {
        message: Binary,
        request_receipt: bool,
    },
}

impl PackedPayload {
    /// Selects the payload mode from optional operation fields.
    ///
    /// An absent or empty message selects token mode, which then branches on
    /// which of `token_id` and `amount` are present. A message with a
    /// non-empty recipient selects message mode, without one broadcast mode.
    /// Fields that do not belong to the selected mode are rejected.
    pub fn from_fields(
        token: Option<String>,
        token_id: Option<String>,
        amount: Option<Uint128>,
        message: Option<Binary>,
        recipient: Option<String>,
        request_receipt: bool,
    ) -> Result<Self, ContractError> {
        let message = message.filter(|m| !m.is_empty());
        let recipient = recipient.filter(|r| !r.is_empty());

        let Some(message) = message else {
            if recipient.is_some() || request_receipt {
                return Err(invalid("recipient and receipt flag require a message"));
            }
            let token = token
                .filter(|t| !t.is_empty())
                .ok_or_else(|| invalid("token mode requires a token"))?;
            return match (token_id, amount) {
                (Some(token_id), Some(amount)) => Ok(PackedPayload::MixedFungible {
                    token,
                    token_id,
                    amount,
                }),
                (Some(token_id), None) => Ok(PackedPayload::NonFungible { token, token_id }),
                (None, Some(amount)) => Ok(PackedPayload::Fungible { token, amount }),
                (None, None) => Err(invalid("token mode requires a token id or an amount")),
            };
        };

        if token.is_some() || token_id.is_some() || amount.is_some() {
            return Err(invalid("message payloads cannot carry token fields"));
        }
        Ok(match recipient {
            Some(recipient) => PackedPayload::Message {
                message,
                request_receipt,
                recipient,
            },
            None => PackedPayload::Broadcast {
                message,
                request_receipt,
            },
        })
    }

    pub fn mode(&self) -> u8 {
        match self {
            PackedPayload::NonFungible { .. } => MODE_NON_FUNGIBLE,
            PackedPayload::Fungible { .. } => MODE_FUNGIBLE,
            PackedPayload::MixedFungible { .. } => MODE_MIXED_FUNGIBLE,
            PackedPayload::Message { .. } => MODE_MESSAGE,
            PackedPayload::Broadcast { .. } => MODE_BROADCAST,
        }
    }

    /// ABI encoding of the mode tuple, see the module table.
    pub fn encode(&self) -> Vec<u8> {
        let mut tokens = vec![Token::uint8(self.mode())];
        match self {
            PackedPayload::NonFungible { token, token_id } => {
                tokens.push(Token::String(token.clone()));
                tokens.push(Token::String(token_id.clone()));
            }
            PackedPayload::Fungible { token, amount } => {
                tokens.push(Token::String(token.clone()));
                tokens.push(Token::uint128(*amount));
            }
            PackedPayload::MixedFungible {
                token,
                token_id,
                amount,
            } => {
                tokens.push(Token::String(token.clone()));
                tokens.push(Token::String(token_id.clone()));
                tokens.push(Token::uint128(*amount));
            }
            PackedPayload::Message {
                message,
                request_receipt,
                recipient,
            } => {
                tokens.push(Token::Bytes(message.to_vec()));
                tokens.push(Token::Bool(*request_receipt));
                tokens.push(Token::String(recipient.clone()));
            }
            PackedPayload::Broadcast {
                message,
                request_receipt,
            } => {
                tokens.push(Token::Bytes(message.to_vec()));
                tokens.push(Token::Bool(*request_receipt));
            }
        }
        encode(&tokens)
    }
}

fn invalid(reason: &str) -> ContractError {
    ContractError::InvalidPayload {
        reason: reason.to_string(),
    }
}

/// The full message a fee verifier signs. Derived, never stored.
#[derive(Clone, Debug, PartialEq)]
pub struct CanonicalMessage<'a> {
    pub chain_id: u64,
    pub sender: &'a str,
    pub destination: u64,
    pub fee_token: &'a str,
    pub fee_amount: Uint256,
    pub max_block: Uint256,
    pub payload: &'a PackedPayload,
}

impl CanonicalMessage<'_> {
    pub fn encode(&self) -> Vec<u8> {
        encode(&[
            Token::uint64(self.chain_id),
            Token::String(self.sender.to_string()),
            Token::uint64(self.destination),
            Token::String(self.fee_token.to_string()),
            Token::Uint(self.fee_amount),
            Token::Uint(self.max_block),
            Token::Bytes(self.payload.encode()),
        ])
    }

    /// keccak256 of the canonical encoding
    pub fn hash(&self) -> [u8; 32] {
        keccak256(&self.encode())
    }
}
