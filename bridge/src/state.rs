//! State definitions for the CL8Y Toll Bridge contract
//!
//! Fee-ledger and proof-consumption storage live next to the logic that owns
//! them, in `fee_collector` and `fee_verifier`.

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Timestamp, Uint128};
use cw_storage_plus::{Item, Map};

// ============================================================================
// Core Configuration
// ============================================================================

/// Contract configuration
#[cw_serde]
pub struct Config {
    /// Admin address for contract management
    pub admin: Addr,
    /// Whether the bridge is currently paused
    pub paused: bool,
    /// Network id of this chain, bound into every signed fee message
    pub chain_id: u64,
    /// Bank denom that fee proofs use as the native-currency fee token
    pub native_denom: String,
    /// When true, every transfer and send must carry a fee proof
    pub require_fee_proof: bool,
}

/// Pending admin change proposal
#[cw_serde]
pub struct PendingAdmin {
    /// Proposed new admin address
    pub new_address: Addr,
    /// Block time when the change can be executed
    pub execute_after: Timestamp,
}

/// Bridge statistics
#[cw_serde]
#[derive(Default)]
pub struct Stats {
    pub total_transfers: u64,
    pub total_claims: u64,
    pub total_messages_sent: u64,
    pub total_messages_received: u64,
    /// Relayed messages the receiver reported as not delivered
    pub total_failed_deliveries: u64,
}

/// Relay awaiting the receiver's reply
#[cw_serde]
pub struct PendingRelay {
    pub receiver: Addr,
    pub sender: String,
    pub from_network: u64,
    pub message_id: u64,
    pub request_receipt: bool,
}

// ============================================================================
// Constants
// ============================================================================

/// Contract name for cw2 migration info
pub const CONTRACT_NAME: &str = "crates.io:cl8y-toll-bridge";

/// Contract version for cw2 migration info
pub const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// 7 days in seconds for admin change timelock
pub const ADMIN_TIMELOCK_DURATION: u64 = 604_800;

/// Reply id for relayed message delivery
pub const RELAY_REPLY_ID: u64 = 1;

// ============================================================================
// Core State Storage
// ============================================================================

/// Primary config storage
pub const CONFIG: Item<Config> = Item::new("config");

/// Pending admin proposal (if any)
pub const PENDING_ADMIN: Item<PendingAdmin> = Item::new("pending_admin");

/// Bridge statistics
pub const STATS: Item<Stats> = Item::new("stats");

/// Relay in flight between `RelayMessage` and its reply
pub const PENDING_RELAY: Item<PendingRelay> = Item::new("pending_relay");

// ============================================================================
// Roles
// ============================================================================

/// Registered operator (relayer) addresses
/// Key: operator address, Value: whether active
pub const OPERATORS: Map<&Addr, bool> = Map::new("operators");

/// Number of active operators
pub const OPERATOR_COUNT: Item<u32> = Item::new("operator_count");

/// Trusted fee verifiers
/// Key: 20-byte Ethereum address, Value: whether trusted
pub const FEE_VERIFIERS: Map<&[u8], bool> = Map::new("fee_verifiers");

// ============================================================================
// Claimable Entitlements
// ============================================================================

/// Claims recorded by operators for their owner to redeem
/// Key: (owner, token, token_id), token_id is empty for CW20, Value: amount
pub const CLAIMABLE: Map<(&Addr, &str, &str), Uint128> = Map::new("claimable");

/// Sum of recorded entitlements, held back from direct claims
/// Key: (token, token_id), Value: amount
pub const RESERVED_CLAIMS: Map<(&str, &str), Uint128> = Map::new("reserved_claims");
