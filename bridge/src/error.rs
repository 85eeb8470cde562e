//! Error types for the CL8Y Toll Bridge contract
//!
//! Fee-proof failures are split so a caller can tell a stale proof from a
//! forged one from an underpayment.

use cosmwasm_std::{ConversionOverflowError, OverflowError, StdError, Uint128, Uint256};
use cw_utils::{ParseReplyError, PaymentError};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("{0}")]
    Payment(#[from] PaymentError),

    #[error("{0}")]
    ParseReply(#[from] ParseReplyError),

    #[error("{0}")]
    Overflow(#[from] OverflowError),

    #[error("{0}")]
    ConversionOverflow(#[from] ConversionOverflowError),

    // ========================================================================
    // Authorization Errors
    // ========================================================================

    #[error("Unauthorized: only admin can perform this action")]
    Unauthorized,

    #[error("Unauthorized: only operator can perform this action")]
    UnauthorizedOperator,

    #[error("Unauthorized: only pending admin can accept")]
    UnauthorizedPendingAdmin,

    // ========================================================================
    // Admin Errors
    // ========================================================================

    #[error("No pending admin change")]
    NoPendingAdmin,

    #[error("Timelock not expired: {remaining_seconds} seconds remaining")]
    TimelockNotExpired { remaining_seconds: u64 },

    #[error("Bridge is paused")]
    BridgePaused,

    // ========================================================================
    // Fee Proof Errors
    // ========================================================================

    #[error("Invalid fee proof: {reason}")]
    InvalidFeeProof { reason: String },

    #[error("Fee proof required")]
    FeeProofRequired,

    #[error("Hash mismatch: recomputed {recomputed}, claimed {claimed}")]
    HashMismatch { recomputed: String, claimed: String },

    #[error("Fee validation expired: max block {max_block}, current block {current_block}")]
    FeeValidationExpired {
        max_block: Uint256,
        current_block: u64,
    },

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Untrusted signer: {signer}")]
    UntrustedSigner { signer: String },

    #[error("Fee proof already used: {hash}")]
    FeeProofAlreadyUsed { hash: String },

    // ========================================================================
    // Payment Errors
    // ========================================================================

    #[error("Incorrect fee amount: provided {provided}, expected {expected}")]
    IncorrectFeeAmount { provided: Uint256, expected: Uint256 },

    #[error("Function not payable")]
    FunctionNotPayable,

    #[error("Insufficient pending fees for {fee_token}: available {available}, requested {requested}")]
    InsufficientPendingFees {
        fee_token: String,
        available: Uint256,
        requested: Uint256,
    },

    // ========================================================================
    // Fee Verifier Management Errors
    // ========================================================================

    #[error("Invalid fee verifier address: {address}")]
    InvalidFeeVerifier { address: String },

    #[error("Fee verifier already registered: {address}")]
    FeeVerifierAlreadyRegistered { address: String },

    #[error("Fee verifier not registered: {address}")]
    FeeVerifierNotRegistered { address: String },

    // ========================================================================
    // Operator Management Errors
    // ========================================================================

    #[error("Operator already registered: {address}")]
    OperatorAlreadyRegistered { address: String },

    #[error("Operator not registered: {address}")]
    OperatorNotRegistered { address: String },

    #[error("Cannot remove last operator")]
    CannotRemoveLastOperator,

    // ========================================================================
    // Operation Errors
    // ========================================================================

    #[error("Invalid amount: {reason}")]
    InvalidAmount { reason: String },

    #[error("Invalid payload: {reason}")]
    InvalidPayload { reason: String },

    #[error("Bridge does not hold token {token_id} of {token}")]
    NftNotHeld { token: String, token_id: String },

    #[error("Insufficient bridge balance of {token}: available {available}, requested {requested}")]
    InsufficientBridgeBalance {
        token: String,
        available: Uint256,
        requested: Uint256,
    },

    #[error("Token {token_id} of {token} is reserved for a recorded claim")]
    NftReserved { token: String, token_id: String },

    #[error("Insufficient claimable {token} {token_id}: available {available}, requested {requested}")]
    InsufficientClaimable {
        token: String,
        token_id: String,
        available: Uint128,
        requested: Uint128,
    },

    #[error("Unknown reply id: {id}")]
    UnknownReplyId { id: u64 },

    #[error("No relay in progress")]
    NoPendingRelay,
}
