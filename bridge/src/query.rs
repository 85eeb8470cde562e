//! Query handlers for the CL8Y Toll Bridge contract.
//!
//! Besides state lookups this exposes the canonical encoder and the fee
//! verifier read-only, so signer tooling can build `expectedHash` and check a
//! proof against the same code the contract runs.

use cosmwasm_std::{Addr, Binary, Deps, Env, Order, StdError, StdResult, Uint128, Uint256};
use cw_storage_plus::Bound;

use crate::fee_collector::{pending_fees, PENDING_FEES};
use crate::fee_proof::FeeProof;
use crate::fee_verifier::{FeeRequest, FeeVerifier, TrustedSigners, CONSUMED_FEE_PROOFS};
use crate::hash::{bytes32_to_hex, hex_to_bytes32};
use crate::msg::{
    AllPendingFeesResponse, ClaimableResponse, ConfigResponse, FeeHashResponse, FeeVerifiersResponse,
    IsFeeVerifierResponse, OperatorsResponse, PackPayloadResponse, PendingAdminResponse,
    PendingFeesResponse, ProofConsumedResponse, StatsResponse, VerifyFeeResponse,
};
use crate::payload::{CanonicalMessage, PackedPayload};
use crate::signature::{personal_message_digest, EthAddress};
use crate::state::{CLAIMABLE, CONFIG, FEE_VERIFIERS, OPERATORS, PENDING_ADMIN, STATS};

// ============================================================================
// Core Queries
// ============================================================================

/// Query contract configuration.
pub fn query_config(deps: Deps) -> StdResult<ConfigResponse> {
    let config = CONFIG.load(deps.storage)?;
    Ok(ConfigResponse {
        admin: config.admin,
        paused: config.paused,
        chain_id: config.chain_id,
        native_denom: config.native_denom,
        require_fee_proof: config.require_fee_proof,
    })
}

pub fn query_stats(deps: Deps) -> StdResult<StatsResponse> {
    let stats = STATS.load(deps.storage)?;
    Ok(StatsResponse {
        total_transfers: stats.total_transfers,
        total_claims: stats.total_claims,
        total_messages_sent: stats.total_messages_sent,
        total_messages_received: stats.total_messages_received,
        total_failed_deliveries: stats.total_failed_deliveries,
    })
}

pub fn query_pending_admin(deps: Deps) -> StdResult<Option<PendingAdminResponse>> {
    let pending = PENDING_ADMIN.may_load(deps.storage)?;
    Ok(pending.map(|p| PendingAdminResponse {
        new_address: p.new_address,
        execute_after: p.execute_after,
    }))
}

// ============================================================================
// Role Queries
// ============================================================================

/// Query all trusted fee verifiers.
pub fn query_fee_verifiers(deps: Deps) -> StdResult<FeeVerifiersResponse> {
    let signers = TrustedSigners::load(deps.storage)?;
    Ok(FeeVerifiersResponse {
        fee_verifiers: signers.iter().map(|s| s.to_string()).collect(),
    })
}

pub fn query_is_fee_verifier(deps: Deps, address: String) -> StdResult<IsFeeVerifierResponse> {
    let verifier =
        EthAddress::parse(&address).map_err(|e| StdError::generic_err(e.to_string()))?;
    let trusted = FEE_VERIFIERS
        .may_load(deps.storage, verifier.as_bytes())?
        .unwrap_or(false);
    Ok(IsFeeVerifierResponse {
        address: verifier.to_string(),
        trusted,
    })
}

/// Query all operators.
pub fn query_operators(deps: Deps) -> StdResult<OperatorsResponse> {
    let operators: Vec<Addr> = OPERATORS
        .range(deps.storage, None, None, Order::Ascending)
        .filter_map(|item| {
            let (addr, active) = item.ok()?;
            if active {
                Some(addr)
            } else {
                None
            }
        })
        .collect();

    Ok(OperatorsResponse { operators })
}

// ============================================================================
// Fee Ledger Queries
// ============================================================================

pub fn query_pending_fees(deps: Deps, fee_token: String) -> StdResult<PendingFeesResponse> {
    let amount = pending_fees(deps.storage, &fee_token)?;
    Ok(PendingFeesResponse { fee_token, amount })
}

/// Query pending fees of all tokens (paginated).
pub fn query_all_pending_fees(
    deps: Deps,
    start_after: Option<String>,
    limit: Option<u32>,
) -> StdResult<AllPendingFeesResponse> {
    let limit = limit.unwrap_or(10).min(50) as usize;
    let start = start_after.as_deref().map(Bound::exclusive);

    let fees = PENDING_FEES
        .range(deps.storage, start, None, Order::Ascending)
        .take(limit)
        .map(|item| {
            let (fee_token, entry) = item?;
            Ok(PendingFeesResponse {
                fee_token,
                amount: entry.amount,
            })
        })
        .collect::<StdResult<Vec<_>>>()?;

    Ok(AllPendingFeesResponse { fees })
}

pub fn query_proof_consumed(deps: Deps, message_hash: String) -> StdResult<ProofConsumedResponse> {
    let hash = hex_to_bytes32(&message_hash).map_err(StdError::generic_err)?;
    let height = CONSUMED_FEE_PROOFS.may_load(deps.storage, &hash)?;
    Ok(ProofConsumedResponse {
        message_hash: bytes32_to_hex(&hash),
        consumed: height.is_some(),
        height,
    })
}

// ============================================================================
// Claim Queries
// ============================================================================

pub fn query_claimable(
    deps: Deps,
    owner: String,
    token: String,
    token_id: Option<String>,
) -> StdResult<ClaimableResponse> {
    let owner = deps.api.addr_validate(&owner)?;
    let token = deps.api.addr_validate(&token)?;
    let amount = CLAIMABLE
        .may_load(
            deps.storage,
            (&owner, token.as_str(), token_id.as_deref().unwrap_or_default()),
        )?
        .unwrap_or_default();

    Ok(ClaimableResponse {
        owner,
        token,
        token_id,
        amount,
    })
}

// ============================================================================
// Encoder / Verifier Queries
// ============================================================================

pub fn query_pack_payload(
    token: Option<String>,
    token_id: Option<String>,
    amount: Option<Uint128>,
    message: Option<Binary>,
    recipient: Option<String>,
    request_receipt: bool,
) -> StdResult<PackPayloadResponse> {
    let payload =
        PackedPayload::from_fields(token, token_id, amount, message, recipient, request_receipt)
            .map_err(|e| StdError::generic_err(e.to_string()))?;
    let encoded = Binary::from(payload.encode());
    Ok(PackPayloadResponse { payload, encoded })
}

/// Compute the canonical message a fee verifier must sign.
pub fn query_compute_fee_hash(
    deps: Deps,
    sender: String,
    destination: u64,
    fee_token: String,
    fee_amount: Uint256,
    max_block: Uint256,
    payload: PackedPayload,
) -> StdResult<FeeHashResponse> {
    let config = CONFIG.load(deps.storage)?;
    let message = CanonicalMessage {
        chain_id: config.chain_id,
        sender: &sender,
        destination,
        fee_token: &fee_token,
        fee_amount,
        max_block,
        payload: &payload,
    };
    let encoded = message.encode();
    let message_hash = message.hash();

    Ok(FeeHashResponse {
        encoded: Binary::from(encoded),
        message_hash: bytes32_to_hex(&message_hash),
        signing_digest: bytes32_to_hex(&personal_message_digest(&message_hash)),
    })
}

/// Dry-run the fee verifier at the current block height.
pub fn query_verify_fee(
    deps: Deps,
    env: Env,
    sender: String,
    destination: u64,
    payload: PackedPayload,
    fee_proof: Binary,
) -> StdResult<VerifyFeeResponse> {
    let config = CONFIG.load(deps.storage)?;
    let to_std = |e: crate::ContractError| StdError::generic_err(e.to_string());

    let proof = FeeProof::decode(&fee_proof).map_err(to_std)?;
    let verifier = FeeVerifier::new(config.chain_id, TrustedSigners::load(deps.storage)?);
    let request = FeeRequest {
        sender: &sender,
        destination,
        payload: &payload,
    };
    let verified = verifier
        .verify(deps.api, env.block.height, &request, &proof)
        .map_err(to_std)?;

    Ok(VerifyFeeResponse {
        signer: verified.signer.to_string(),
        message_hash: bytes32_to_hex(&verified.message_hash),
        fee_token: verified.fee_token,
        fee_amount: verified.fee_amount,
    })
}
