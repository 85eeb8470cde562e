//! CL8Y Toll Bridge Contract - Fee-Verified Bridging for TerraClassic
//!
//! Every outgoing operation (fungible, non-fungible and mixed-fungible
//! transfers, messages and broadcasts) pays a toll quoted off-chain by a
//! trusted fee verifier.
//!
//! # Outgoing Flow (Lock + Toll)
//! 1. Caller obtains a fee proof from a fee verifier for the exact operation
//! 2. The contract rebuilds the canonical message and checks its keccak hash
//!    against the proof's `expectedHash`
//! 3. The proof's expiry block and signer are checked, then the proof is
//!    marked as used
//! 4. The fee is collected into the pending-fee ledger and the asset locked
//! 5. A protocol event (`transfer_initiated` / `message_sent`) is emitted
//!
//! # Incoming Flow (Operators)
//! - `Claim*` releases held assets, optionally rebating pending fees
//! - `RelayMessage` delivers a message to a receiver contract and reports a
//!   soft failure when the receiver declines it
//!
//! # Security
//! - Fee messages bind chain id, sender, destination, fee and payload
//! - EIP-191 signatures, low-s only, from an admin-managed signer set
//! - Single-use fee proofs
//! - Emergency pause and 7-day admin timelock

pub mod abi;
pub mod contract;
pub mod error;
mod execute;
pub mod fee_collector;
pub mod fee_proof;
pub mod fee_verifier;
pub mod hash;
pub mod msg;
pub mod payload;
mod query;
pub mod signature;
pub mod state;

pub use crate::error::ContractError;
pub use crate::fee_proof::FeeProof;
pub use crate::fee_verifier::{FeeRequest, FeeVerifier, TrustedSigners, VerifiedFee};
pub use crate::hash::{bytes32_to_hex, keccak256};
pub use crate::payload::{CanonicalMessage, PackedPayload, BROADCAST_DESTINATION};
pub use crate::signature::{personal_message_digest, EthAddress};
