//! Fee proof verification
//!
//! A proof is accepted only after passing each stage in order:
//!
//! | Stage            | Check                                                  | Failure                |
//! |------------------|--------------------------------------------------------|------------------------|
//! | HashRecomputed   | canonical message rebuilt from live call parameters    | -                      |
//! | HashChecked      | recomputed hash == `expected_hash`                     | `HashMismatch`         |
//! | ExpiryChecked    | `block.height <= max_block`                            | `FeeValidationExpired` |
//! | SignerRecovered  | signature recovers over personal digest of the hash    | `InvalidSignature`     |
//! | SignerTrusted    | signer is in the trusted set                           | `UntrustedSigner`      |
//!
//! The chain id, sender, destination and payload come from the operation being
//! executed, never from the proof, so a signature cannot be moved to a
//! different operation.
//!
//! Accepted proofs are single-use: the dispatcher records the message hash in
//! `CONSUMED_FEE_PROOFS` before collecting the fee.

use std::collections::BTreeSet;

use cosmwasm_std::{Api, Order, StdResult, Storage, Uint256};
use cw_storage_plus::Map;

use crate::error::ContractError;
use crate::fee_proof::FeeProof;
use crate::hash::bytes32_to_hex;
use crate::payload::{CanonicalMessage, PackedPayload};
use crate::signature::{personal_message_digest, recover_signer, EthAddress};
use crate::state::FEE_VERIFIERS;

/// Consumed proofs
/// Key: 32-byte canonical message hash, Value: block height of consumption
pub const CONSUMED_FEE_PROOFS: Map<&[u8], u64> = Map::new("consumed_fee_proofs");

/// Fee verifier identities whose signatures authorize fees.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TrustedSigners(BTreeSet<EthAddress>);

impl TrustedSigners {
    pub fn load(storage: &dyn Storage) -> StdResult<Self> {
        let signers = FEE_VERIFIERS
            .range(storage, None, None, Order::Ascending)
            .filter_map(|item| match item {
                Ok((key, true)) => EthAddress::from_slice(&key).map(Ok),
                Ok(_) => None,
                Err(e) => Some(Err(e)),
            })
            .collect::<StdResult<BTreeSet<_>>>()?;
        Ok(TrustedSigners(signers))
    }

    pub fn contains(&self, signer: &EthAddress) -> bool {
        self.0.contains(signer)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EthAddress> {
        self.0.iter()
    }
}

impl FromIterator<EthAddress> for TrustedSigners {
    fn from_iter<I: IntoIterator<Item = EthAddress>>(iter: I) -> Self {
        TrustedSigners(iter.into_iter().collect())
    }
}

/// Live parameters of the operation a fee is being paid for.
#[derive(Clone, Debug)]
pub struct FeeRequest<'a> {
    pub sender: &'a str,
    pub destination: u64,
    pub payload: &'a PackedPayload,
}

/// Result of a successful verification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifiedFee {
    pub signer: EthAddress,
    pub fee_token: String,
    pub fee_amount: Uint256,
    pub message_hash: [u8; 32],
}

pub struct FeeVerifier {
    chain_id: u64,
    signers: TrustedSigners,
}

impl FeeVerifier {
    pub fn new(chain_id: u64, signers: TrustedSigners) -> Self {
        FeeVerifier { chain_id, signers }
    }

    pub fn verify(
        &self,
        api: &dyn Api,
        block_height: u64,
        request: &FeeRequest,
        proof: &FeeProof,
    ) -> Result<VerifiedFee, ContractError> {
        // HashRecomputed
        let message = CanonicalMessage {
            chain_id: self.chain_id,
            sender: request.sender,
            destination: request.destination,
            fee_token: &proof.fee_token,
            fee_amount: proof.fee_amount,
            max_block: proof.max_block,
            payload: request.payload,
        };
        let recomputed = message.hash();

        // HashChecked
        if recomputed != proof.expected_hash {
            return Err(ContractError::HashMismatch {
                recomputed: bytes32_to_hex(&recomputed),
                claimed: bytes32_to_hex(&proof.expected_hash),
            });
        }

        // ExpiryChecked
        if Uint256::from(block_height) > proof.max_block {
            return Err(ContractError::FeeValidationExpired {
                max_block: proof.max_block,
                current_block: block_height,
            });
        }

        // SignerRecovered
        let digest = personal_message_digest(&proof.expected_hash);
        let signer = recover_signer(api, &digest, &proof.signature)?;

        // SignerTrusted
        if !self.signers.contains(&signer) {
            return Err(ContractError::UntrustedSigner {
                signer: signer.to_string(),
            });
        }

        Ok(VerifiedFee {
            signer,
            fee_token: proof.fee_token.clone(),
            fee_amount: proof.fee_amount,
            message_hash: recomputed,
        })
    }
}

/// Marks a verified proof as used at `height`.
pub fn consume_fee_proof(
    storage: &mut dyn Storage,
    message_hash: &[u8; 32],
    height: u64,
) -> Result<(), ContractError> {
    if CONSUMED_FEE_PROOFS.has(storage, message_hash) {
        return Err(ContractError::FeeProofAlreadyUsed {
            hash: bytes32_to_hex(message_hash),
        });
    }
    CONSUMED_FEE_PROOFS.save(storage, message_hash, &height)?;
    Ok(())
}
