//! Message types for the CL8Y Toll Bridge contract
//!
//! Transfer and send operations take an optional `fee_proof`: the ABI-encoded
//! fee proof issued by a trusted fee verifier (see `fee_proof`). Omitting it
//! takes the no-fee path, which is only open while `require_fee_proof` is
//! off.

use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Addr, Binary, Timestamp, Uint128, Uint256};

use crate::payload::PackedPayload;

// ============================================================================
// Instantiate
// ============================================================================

#[cw_serde]
pub struct InstantiateMsg {
    /// Admin address for contract management
    pub admin: String,
    /// Initial operators (relayers) allowed to claim and relay
    pub operators: Vec<String>,
    /// Initial trusted fee verifiers as `0x`-prefixed Ethereum addresses
    pub fee_verifiers: Vec<String>,
    /// Network id of this chain
    pub chain_id: u64,
    /// Bank denom used as the native fee token
    pub native_denom: String,
    /// Reject operations without a fee proof
    pub require_fee_proof: bool,
}

// ============================================================================
// Execute Messages
// ============================================================================

#[cw_serde]
pub enum ExecuteMsg {
    // ========================================================================
    // Outgoing Transfers
    // ========================================================================
    /// Lock CW20 tokens for bridging. The bridge must have an allowance for
    /// `amount` (plus the fee, when the fee token is the same CW20).
    TransferFungible {
        token: String,
        amount: Uint128,
        destination: u64,
        fee_proof: Option<Binary>,
    },

    /// Lock a CW721 token. The bridge must be approved for the token.
    TransferNonFungible {
        token: String,
        token_id: String,
        destination: u64,
        fee_proof: Option<Binary>,
    },

    /// Lock an amount of a CW1155 token id. The bridge must be an approved
    /// operator of the sender.
    TransferMixedFungible {
        token: String,
        token_id: String,
        amount: Uint128,
        destination: u64,
        fee_proof: Option<Binary>,
    },

    // ========================================================================
    // Messaging
    // ========================================================================
    /// Send a message to `recipient` on `destination`
    SendMessage {
        message_id: u64,
        destination: u64,
        recipient: String,
        request_receipt: bool,
        message: Binary,
        fee_proof: Option<Binary>,
    },

    /// Send a message to every network
    SendBroadcast {
        message_id: u64,
        request_receipt: bool,
        message: Binary,
        fee_proof: Option<Binary>,
    },

    // ========================================================================
    // Incoming (operator only)
    // ========================================================================
    /// Release CW20 tokens held by the bridge
    ClaimFungible {
        token: String,
        recipient: String,
        amount: Uint128,
        rebate: Option<FeeRebate>,
    },

    /// Release a CW721 token held by the bridge
    ClaimNonFungible {
        token: String,
        recipient: String,
        token_id: String,
        rebate: Option<FeeRebate>,
    },

    /// Release CW1155 tokens held by the bridge
    ClaimMixedFungible {
        token: String,
        recipient: String,
        token_id: String,
        amount: Uint128,
        rebate: Option<FeeRebate>,
    },

    /// Record CW20 tokens `owner` may redeem
    AddClaimFungible {
        token: String,
        owner: String,
        amount: Uint128,
    },

    /// Record a CW721 token `owner` may redeem
    AddClaimNonFungible {
        token: String,
        owner: String,
        token_id: String,
    },

    /// Record CW1155 tokens `owner` may redeem
    AddClaimMixedFungible {
        token: String,
        owner: String,
        token_id: String,
        amount: Uint128,
    },

    /// Deliver a message from another network to a receiver contract
    RelayMessage {
        receiver: String,
        sender: String,
        from_network: u64,
        message_id: u64,
        request_receipt: bool,
        message: Binary,
    },

    // ========================================================================
    // Redemptions (entitlement owner)
    // ========================================================================
    /// Redeem recorded CW20 tokens to the caller
    RedeemFungible { token: String, amount: Uint128 },

    /// Redeem a recorded CW721 token to the caller
    RedeemNonFungible { token: String, token_id: String },

    /// Redeem recorded CW1155 tokens to the caller
    RedeemMixedFungible {
        token: String,
        token_id: String,
        amount: Uint128,
    },

    // ========================================================================
    // Fee Management (admin only)
    // ========================================================================
    /// Trust a fee verifier address
    AddFeeVerifier { address: String },

    /// Stop trusting a fee verifier address
    RemoveFeeVerifier { address: String },

    /// Withdraw collected fees from the pending-fee ledger
    WithdrawFees {
        fee_token: String,
        amount: Uint256,
        recipient: String,
    },

    /// Update runtime configuration
    UpdateConfig {
        native_denom: Option<String>,
        require_fee_proof: Option<bool>,
    },

    // ========================================================================
    // Operator Management (admin only)
    // ========================================================================
    /// Add an operator
    AddOperator { operator: String },

    /// Remove an operator
    RemoveOperator { operator: String },

    // ========================================================================
    // Admin Operations
    // ========================================================================
    /// Pause the bridge (blocks transfers, sends, claims and relays)
    Pause {},

    /// Unpause the bridge
    Unpause {},

    /// Initiate admin transfer (7-day timelock)
    ProposeAdmin { new_admin: String },

    /// Complete admin transfer after timelock
    AcceptAdmin {},

    /// Cancel pending admin change
    CancelAdminProposal {},
}

/// Part of the pending fees refunded to a claim recipient.
#[cw_serde]
pub struct FeeRebate {
    pub fee_token: String,
    pub amount: Uint256,
}

// ============================================================================
// Query Messages
// ============================================================================

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    /// Returns contract configuration
    #[returns(ConfigResponse)]
    Config {},

    /// Returns bridge statistics
    #[returns(StatsResponse)]
    Stats {},

    /// Returns trusted fee verifiers
    #[returns(FeeVerifiersResponse)]
    FeeVerifiers {},

    #[returns(IsFeeVerifierResponse)]
    IsFeeVerifier { address: String },

    /// Returns list of registered operators
    #[returns(OperatorsResponse)]
    Operators {},

    /// Pending (collected, not withdrawn) fees of one token
    #[returns(PendingFeesResponse)]
    PendingFees { fee_token: String },

    /// Pending fees of every token (paginated)
    #[returns(AllPendingFeesResponse)]
    AllPendingFees {
        start_after: Option<String>,
        limit: Option<u32>,
    },

    /// Amount `owner` may redeem. `token_id` is omitted for CW20 tokens.
    #[returns(ClaimableResponse)]
    Claimable {
        owner: String,
        token: String,
        token_id: Option<String>,
    },

    /// Whether a fee proof for `message_hash` (hex) has been used
    #[returns(ProofConsumedResponse)]
    ProofConsumed { message_hash: String },

    /// Returns pending admin change (if any)
    #[returns(Option<PendingAdminResponse>)]
    PendingAdmin {},

    /// Builds a payload from optional operation fields
    #[returns(PackPayloadResponse)]
    PackPayload {
        token: Option<String>,
        token_id: Option<String>,
        amount: Option<Uint128>,
        message: Option<Binary>,
        recipient: Option<String>,
        request_receipt: bool,
    },

    /// Canonical message, its hash and the digest a fee verifier signs
    #[returns(FeeHashResponse)]
    ComputeFeeHash {
        sender: String,
        destination: u64,
        fee_token: String,
        fee_amount: Uint256,
        max_block: Uint256,
        payload: PackedPayload,
    },

    /// Runs the fee verifier against the current block without consuming
    /// the proof
    #[returns(VerifyFeeResponse)]
    VerifyFee {
        sender: String,
        destination: u64,
        payload: PackedPayload,
        fee_proof: Binary,
    },
}

// ============================================================================
// Response Types
// ============================================================================

#[cw_serde]
pub struct ConfigResponse {
    pub admin: Addr,
    pub paused: bool,
    pub chain_id: u64,
    pub native_denom: String,
    pub require_fee_proof: bool,
}

#[cw_serde]
pub struct StatsResponse {
    pub total_transfers: u64,
    pub total_claims: u64,
    pub total_messages_sent: u64,
    pub total_messages_received: u64,
    pub total_failed_deliveries: u64,
}

#[cw_serde]
pub struct FeeVerifiersResponse {
    pub fee_verifiers: Vec<String>,
}

#[cw_serde]
pub struct IsFeeVerifierResponse {
    pub address: String,
    pub trusted: bool,
}

#[cw_serde]
pub struct OperatorsResponse {
    pub operators: Vec<Addr>,
}

#[cw_serde]
pub struct PendingFeesResponse {
    pub fee_token: String,
    pub amount: Uint256,
}

#[cw_serde]
pub struct AllPendingFeesResponse {
    pub fees: Vec<PendingFeesResponse>,
}

#[cw_serde]
pub struct ClaimableResponse {
    pub owner: Addr,
    pub token: Addr,
    pub token_id: Option<String>,
    pub amount: Uint128,
}

#[cw_serde]
pub struct ProofConsumedResponse {
    pub message_hash: String,
    pub consumed: bool,
    /// Block height at which the proof was used
    pub height: Option<u64>,
}

#[cw_serde]
pub struct PendingAdminResponse {
    pub new_address: Addr,
    pub execute_after: Timestamp,
}

#[cw_serde]
pub struct PackPayloadResponse {
    pub payload: PackedPayload,
    pub encoded: Binary,
}

#[cw_serde]
pub struct FeeHashResponse {
    /// ABI-encoded canonical message
    pub encoded: Binary,
    /// keccak256 of `encoded`, the proof's `expectedHash`
    pub message_hash: String,
    /// EIP-191 digest of `message_hash`, the value actually signed
    pub signing_digest: String,
}

#[cw_serde]
pub struct VerifyFeeResponse {
    pub signer: String,
    pub message_hash: String,
    pub fee_token: String,
    pub fee_amount: Uint256,
}

// ============================================================================
// Migration
// ============================================================================

#[cw_serde]
pub struct MigrateMsg {}
