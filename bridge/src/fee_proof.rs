//! Fee proof wire format
//!
//! A fee proof is issued off-chain by a trusted fee verifier and attached to
//! a bridge operation as an opaque blob:
//!
//! ```solidity
//! abi.encode(string feeToken, uint256 feeAmount, uint256 maxBlock, bytes32 expectedHash, bytes signature)
//! ```
//!
//! Decoding is strict. Anything that is not the canonical encoding of those
//! five fields, including an all-zero blob, is an `InvalidFeeProof`.
//!
//! `maxBlock` keeps its full 256-bit width. Signers that never want a proof
//! to expire can use `type(uint256).max`.

use cosmwasm_std::Uint256;

use crate::abi::{encode, ensure_canonical, AbiError, Decoder, Token};
use crate::error::ContractError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeeProof {
    /// CW20 contract address, or the configured native denom
    pub fee_token: String,
    pub fee_amount: Uint256,
    /// Last block height (inclusive) at which the proof is accepted
    pub max_block: Uint256,
    /// keccak256 of the canonical message the verifier signed
    pub expected_hash: [u8; 32],
    /// 65-byte `r || s || v`
    pub signature: Vec<u8>,
}

impl FeeProof {
    pub fn decode(data: &[u8]) -> Result<Self, ContractError> {
        Self::try_decode(data).map_err(|e| ContractError::InvalidFeeProof {
            reason: e.to_string(),
        })
    }

    fn try_decode(data: &[u8]) -> Result<Self, AbiError> {
        let decoder = Decoder::new(data);
        let proof = FeeProof {
            fee_token: decoder.string(0)?,
            fee_amount: decoder.uint(1)?,
            max_block: decoder.uint(2)?,
            expected_hash: decoder.fixed_bytes32(3)?,
            signature: decoder.bytes(4)?,
        };
        ensure_canonical(data, &proof.tokens())?;
        Ok(proof)
    }

    pub fn encode(&self) -> Vec<u8> {
        encode(&self.tokens())
    }

    fn tokens(&self) -> Vec<Token> {
        vec![
            Token::String(self.fee_token.clone()),
            Token::Uint(self.fee_amount),
            Token::Uint(self.max_block),
            Token::FixedBytes32(self.expected_hash),
            Token::Bytes(self.signature.clone()),
        ]
    }
}
