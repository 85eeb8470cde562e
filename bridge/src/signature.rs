//! Signature binding for fee proofs
//!
//! Fee verifiers sign with ordinary Ethereum wallet tooling
//! (`personal_sign` / `signMessage(hashBytes)`), so the digest that is
//! actually signed is the EIP-191 personal-message hash of the 32-byte
//! canonical message hash:
//!
//! ```text
//! signing_digest = keccak256("\x19Ethereum Signed Message:\n32" || message_hash)
//! ```
//!
//! Signers are identified by their 20-byte Ethereum address, recovered
//! from the 65-byte `r || s || v` signature with the host's secp256k1
//! recovery.

use std::fmt;

use cosmwasm_std::Api;

use crate::error::ContractError;
use crate::hash::{keccak256, keccak256_concat};

/// EIP-191 prefix for a 32-byte message.
pub const PERSONAL_MESSAGE_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n32";

pub const SIGNATURE_LENGTH: usize = 65;

/// secp256k1 group order divided by two. Signatures with a larger `s` are
/// malleable twins of a low-`s` signature and are rejected.
const SECP256K1_HALF_ORDER: [u8; 32] = [
    0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0x5d, 0x57, 0x6e, 0x73, 0x57, 0xa4, 0x50, 0x1d, 0xdf, 0xe9, 0x2f, 0x46, 0x68, 0x1b, 0x20, 0xa0,
];

/// 20-byte Ethereum-style account identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EthAddress([u8; 20]);

impl EthAddress {
    pub const ZERO: EthAddress = EthAddress([0u8; 20]);

    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let bytes: [u8; 20] = bytes.try_into().ok()?;
        Some(EthAddress(bytes))
    }

    /// Parses `0x`-prefixed (or bare) hex, case-insensitive.
    pub fn parse(address: &str) -> Result<Self, ContractError> {
        let invalid = || ContractError::InvalidFeeVerifier {
            address: address.to_string(),
        };
        let hex_str = address.strip_prefix("0x").unwrap_or(address);
        if hex_str.len() != 40 {
            return Err(invalid());
        }
        let mut bytes = [0u8; 20];
        hex::decode_to_slice(hex_str, &mut bytes).map_err(|_| invalid())?;
        Ok(EthAddress(bytes))
    }

    /// Derives the address of an uncompressed SEC1 public key (`0x04 || x || y`).
    pub fn from_public_key(pubkey: &[u8]) -> Result<Self, ContractError> {
        if pubkey.len() != 65 || pubkey[0] != 0x04 {
            return Err(ContractError::InvalidSignature);
        }
        let hash = keccak256(&pubkey[1..]);
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&hash[12..]);
        Ok(EthAddress(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl fmt::Display for EthAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// EIP-191 personal-message digest of a 32-byte hash.
pub fn personal_message_digest(message_hash: &[u8; 32]) -> [u8; 32] {
    keccak256_concat(&[PERSONAL_MESSAGE_PREFIX, message_hash])
}

/// Recovers the address that produced `signature` over `digest`.
///
/// Accepts `v` as 27/28 or 0/1. Wrong length, any other `v`, zero or
/// high `s`, zero `r`, and signatures recovering to the zero address all
/// fail with `InvalidSignature`.
pub fn recover_signer(
    api: &dyn Api,
    digest: &[u8; 32],
    signature: &[u8],
) -> Result<EthAddress, ContractError> {
    if signature.len() != SIGNATURE_LENGTH {
        return Err(ContractError::InvalidSignature);
    }
    let (rs, v) = signature.split_at(64);
    let (r, s) = rs.split_at(32);

    let recovery_param = match v[0] {
        0 | 27 => 0u8,
        1 | 28 => 1u8,
        _ => return Err(ContractError::InvalidSignature),
    };
    if r.iter().all(|b| *b == 0) || s.iter().all(|b| *b == 0) {
        return Err(ContractError::InvalidSignature);
    }
    if s > SECP256K1_HALF_ORDER.as_slice() {
        return Err(ContractError::InvalidSignature);
    }

    let pubkey = api
        .secp256k1_recover_pubkey(digest, rs, recovery_param)
        .map_err(|_| ContractError::InvalidSignature)?;
    let signer = EthAddress::from_public_key(&pubkey)?;
    if signer.is_zero() {
        return Err(ContractError::InvalidSignature);
    }
    Ok(signer)
}
