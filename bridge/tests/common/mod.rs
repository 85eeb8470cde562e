//! Shared setup for the toll bridge integration tests.
//!
//! Provides a cw-multi-test app with the bridge, a cw20-base token, minimal
//! CW721/CW1155 token contracts and a bridge-message receiver, plus helpers
//! that sign fee proofs the way an off-chain fee verifier does.

#![allow(dead_code)]

use cosmwasm_std::{coins, Addr, Binary, Empty, Uint128, Uint256};
use cw20::{BalanceResponse, Cw20Coin, Cw20ExecuteMsg, Cw20QueryMsg};
use cw_multi_test::{App, AppResponse, ContractWrapper, Executor};
use k256::ecdsa::SigningKey;

use toll_bridge::msg::{ExecuteMsg, InstantiateMsg, PendingFeesResponse, QueryMsg};
use toll_bridge::{personal_message_digest, CanonicalMessage, EthAddress, FeeProof, PackedPayload};

pub const NATIVE: &str = "uluna";
/// Network id of the bridge under test
pub const CHAIN_ID: u64 = 7;
/// Destination network used by most tests (BSC)
pub const DEST: u64 = 56;
pub const INITIAL_BALANCE: u128 = 10_000_000_000;

// ============================================================================
// Keys
// ============================================================================

/// Key of the trusted fee verifier registered at instantiation.
pub fn verifier_key() -> SigningKey {
    SigningKey::from_slice(&[1u8; 32]).unwrap()
}

/// Key that is never registered.
pub fn rogue_key() -> SigningKey {
    SigningKey::from_slice(&[2u8; 32]).unwrap()
}

pub fn address_of(key: &SigningKey) -> EthAddress {
    let point = key.verifying_key().to_encoded_point(false);
    EthAddress::from_public_key(point.as_bytes()).unwrap()
}

/// `personal_sign` over a 32-byte hash, `v` in 27/28 form.
pub fn sign_hash(key: &SigningKey, hash: &[u8; 32]) -> Vec<u8> {
    let (sig, recid) = key
        .sign_prehash_recoverable(&personal_message_digest(hash))
        .unwrap();
    let mut out = sig.to_bytes().to_vec();
    out.push(27 + recid.to_byte());
    out
}

// ============================================================================
// Fee Proofs
// ============================================================================

/// Fee terms a verifier quotes for one operation.
pub struct FeeTerms<'a> {
    pub sender: &'a Addr,
    pub destination: u64,
    pub fee_token: &'a str,
    pub fee_amount: u128,
    pub max_block: u64,
}

impl FeeTerms<'_> {
    pub fn hash(&self, payload: &PackedPayload) -> [u8; 32] {
        CanonicalMessage {
            chain_id: CHAIN_ID,
            sender: self.sender.as_str(),
            destination: self.destination,
            fee_token: self.fee_token,
            fee_amount: Uint256::from(self.fee_amount),
            max_block: Uint256::from(self.max_block),
            payload,
        }
        .hash()
    }

    pub fn sign(&self, key: &SigningKey, payload: &PackedPayload) -> FeeProof {
        let expected_hash = self.hash(payload);
        FeeProof {
            fee_token: self.fee_token.to_string(),
            fee_amount: Uint256::from(self.fee_amount),
            max_block: Uint256::from(self.max_block),
            expected_hash,
            signature: sign_hash(key, &expected_hash),
        }
    }

    pub fn proof(&self, key: &SigningKey, payload: &PackedPayload) -> Binary {
        Binary::from(self.sign(key, payload).encode())
    }
}

// ============================================================================
// Suite
// ============================================================================

pub struct Suite {
    pub app: App,
    pub bridge: Addr,
    pub token: Addr,
    pub admin: Addr,
    pub operator: Addr,
    pub user: Addr,
}

fn contract_bridge() -> Box<dyn cw_multi_test::Contract<Empty>> {
    let contract = ContractWrapper::new(
        toll_bridge::contract::execute,
        toll_bridge::contract::instantiate,
        toll_bridge::contract::query,
    )
    .with_reply(toll_bridge::contract::reply);
    Box::new(contract)
}

fn contract_cw20() -> Box<dyn cw_multi_test::Contract<Empty>> {
    let contract = ContractWrapper::new(
        cw20_base::contract::execute,
        cw20_base::contract::instantiate,
        cw20_base::contract::query,
    );
    Box::new(contract)
}

pub fn setup() -> Suite {
    setup_with(false)
}

pub fn setup_with(require_fee_proof: bool) -> Suite {
    let mut app = App::default();

    let admin = Addr::unchecked("terra1admin");
    let operator = Addr::unchecked("terra1operator");
    let user = Addr::unchecked("terra1user");

    app.init_modules(|router, _, storage| {
        router
            .bank
            .init_balance(storage, &user, coins(INITIAL_BALANCE, NATIVE))
            .unwrap();
        router
            .bank
            .init_balance(storage, &operator, coins(INITIAL_BALANCE, NATIVE))
            .unwrap();
    });

    let bridge_code = app.store_code(contract_bridge());
    let bridge = app
        .instantiate_contract(
            bridge_code,
            admin.clone(),
            &InstantiateMsg {
                admin: admin.to_string(),
                operators: vec![operator.to_string()],
                fee_verifiers: vec![address_of(&verifier_key()).to_string()],
                chain_id: CHAIN_ID,
                native_denom: NATIVE.to_string(),
                require_fee_proof,
            },
            &[],
            "cl8y-toll-bridge",
            Some(admin.to_string()),
        )
        .unwrap();

    let cw20_code = app.store_code(contract_cw20());
    let token = app
        .instantiate_contract(
            cw20_code,
            admin.clone(),
            &cw20_base::msg::InstantiateMsg {
                name: "Test Token".to_string(),
                symbol: "TST".to_string(),
                decimals: 6,
                initial_balances: vec![Cw20Coin {
                    address: user.to_string(),
                    amount: Uint128::from(INITIAL_BALANCE),
                }],
                mint: None,
                marketing: None,
            },
            &[],
            "test-token",
            None,
        )
        .unwrap();

    Suite {
        app,
        bridge,
        token,
        admin,
        operator,
        user,
    }
}

impl Suite {
    pub fn height(&self) -> u64 {
        self.app.block_info().height
    }

    /// Fee terms for `sender` valid for the next 100 blocks.
    pub fn terms<'a>(
        &self,
        sender: &'a Addr,
        destination: u64,
        fee_token: &'a str,
        fee_amount: u128,
    ) -> FeeTerms<'a> {
        FeeTerms {
            sender,
            destination,
            fee_token,
            fee_amount,
            max_block: self.height() + 100,
        }
    }

    pub fn execute(
        &mut self,
        sender: &Addr,
        msg: &ExecuteMsg,
        funds: &[cosmwasm_std::Coin],
    ) -> anyhow::Result<AppResponse> {
        self.app
            .execute_contract(sender.clone(), self.bridge.clone(), msg, funds)
    }

    pub fn increase_allowance(&mut self, amount: u128) {
        self.app
            .execute_contract(
                self.user.clone(),
                self.token.clone(),
                &Cw20ExecuteMsg::IncreaseAllowance {
                    spender: self.bridge.to_string(),
                    amount: Uint128::from(amount),
                    expires: None,
                },
                &[],
            )
            .unwrap();
    }

    pub fn cw20_balance(&self, address: &Addr) -> u128 {
        let res: BalanceResponse = self
            .app
            .wrap()
            .query_wasm_smart(
                &self.token,
                &Cw20QueryMsg::Balance {
                    address: address.to_string(),
                },
            )
            .unwrap();
        res.balance.u128()
    }

    pub fn native_balance(&self, address: &Addr) -> u128 {
        self.app
            .wrap()
            .query_balance(address, NATIVE)
            .unwrap()
            .amount
            .u128()
    }

    pub fn pending_fees(&self, fee_token: &str) -> Uint256 {
        let res: PendingFeesResponse = self
            .app
            .wrap()
            .query_wasm_smart(
                &self.bridge,
                &QueryMsg::PendingFees {
                    fee_token: fee_token.to_string(),
                },
            )
            .unwrap();
        res.amount
    }

    pub fn query<T: serde::de::DeserializeOwned>(&self, msg: &QueryMsg) -> T {
        self.app.wrap().query_wasm_smart(&self.bridge, msg).unwrap()
    }

    pub fn store_nft(&mut self, tokens: Vec<mock_nft::NftToken>) -> Addr {
        let code = self.app.store_code(mock_nft::contract());
        self.app
            .instantiate_contract(
                code,
                self.admin.clone(),
                &mock_nft::InstantiateMsg { tokens },
                &[],
                "mock-nft",
                None,
            )
            .unwrap()
    }

    pub fn store_multi_token(&mut self, balances: Vec<mock_multi_token::Holding>) -> Addr {
        let code = self.app.store_code(mock_multi_token::contract());
        self.app
            .instantiate_contract(
                code,
                self.admin.clone(),
                &mock_multi_token::InstantiateMsg { balances },
                &[],
                "mock-multi-token",
                None,
            )
            .unwrap()
    }

    pub fn store_receiver(&mut self) -> Addr {
        let code = self.app.store_code(mock_receiver::contract());
        self.app
            .instantiate_contract(
                code,
                self.admin.clone(),
                &Empty {},
                &[],
                "mock-receiver",
                None,
            )
            .unwrap()
    }
}

// ============================================================================
// Assertions
// ============================================================================

/// Asserts the failure came from `expected`.
pub fn assert_error(err: anyhow::Error, expected: toll_bridge::ContractError) {
    assert_eq!(err.root_cause().to_string(), expected.to_string());
}

/// Value of `key` on the first contract event named `ty`.
pub fn event_attr(res: &AppResponse, ty: &str, key: &str) -> Option<String> {
    let wasm_ty = format!("wasm-{}", ty);
    res.events
        .iter()
        .filter(|e| e.ty == wasm_ty)
        .flat_map(|e| e.attributes.iter())
        .find(|a| a.key == key)
        .map(|a| a.value.clone())
}

pub fn count_events(res: &AppResponse, ty: &str) -> usize {
    let wasm_ty = format!("wasm-{}", ty);
    res.events.iter().filter(|e| e.ty == wasm_ty).count()
}

// ============================================================================
// Mock CW721
// ============================================================================

/// Minimal CW721: ownership, operator approval, `TransferNft` and `OwnerOf`.
pub mod mock_nft {
    use cosmwasm_schema::cw_serde;
    use cosmwasm_std::{
        to_json_binary, Addr, Binary, Deps, DepsMut, Empty, Env, MessageInfo, Response,
        StdError, StdResult,
    };
    use cw721::OwnerOfResponse;
    use cw_multi_test::{Contract, ContractWrapper};
    use cw_storage_plus::Map;

    const OWNERS: Map<&str, Addr> = Map::new("owners");
    const APPROVALS: Map<(&Addr, &Addr), bool> = Map::new("approvals");

    #[cw_serde]
    pub struct NftToken {
        pub token_id: String,
        pub owner: String,
    }

    #[cw_serde]
    pub struct InstantiateMsg {
        pub tokens: Vec<NftToken>,
    }

    #[cw_serde]
    pub enum ExecuteMsg {
        TransferNft { recipient: String, token_id: String },
        ApproveAll { operator: String },
    }

    #[cw_serde]
    pub enum QueryMsg {
        OwnerOf {
            token_id: String,
            include_expired: Option<bool>,
        },
    }

    fn instantiate(
        deps: DepsMut,
        _env: Env,
        _info: MessageInfo,
        msg: InstantiateMsg,
    ) -> StdResult<Response> {
        for token in msg.tokens {
            OWNERS.save(deps.storage, &token.token_id, &Addr::unchecked(token.owner))?;
        }
        Ok(Response::new())
    }

    fn execute(deps: DepsMut, _env: Env, info: MessageInfo, msg: ExecuteMsg) -> StdResult<Response> {
        match msg {
            ExecuteMsg::TransferNft {
                recipient,
                token_id,
            } => {
                let owner = OWNERS.load(deps.storage, &token_id)?;
                let approved = APPROVALS.has(deps.storage, (&owner, &info.sender));
                if info.sender != owner && !approved {
                    return Err(StdError::generic_err("nft: not approved"));
                }
                OWNERS.save(deps.storage, &token_id, &Addr::unchecked(recipient))?;
                Ok(Response::new())
            }
            ExecuteMsg::ApproveAll { operator } => {
                APPROVALS.save(deps.storage, (&info.sender, &Addr::unchecked(operator)), &true)?;
                Ok(Response::new())
            }
        }
    }

    fn query(deps: Deps, _env: Env, msg: QueryMsg) -> StdResult<Binary> {
        match msg {
            QueryMsg::OwnerOf { token_id, .. } => {
                let owner = OWNERS.load(deps.storage, &token_id)?;
                to_json_binary(&OwnerOfResponse {
                    owner: owner.to_string(),
                    approvals: vec![],
                })
            }
        }
    }

    pub fn contract() -> Box<dyn Contract<Empty>> {
        Box::new(ContractWrapper::new(execute, instantiate, query))
    }

    pub fn owner_of(app: &cw_multi_test::App, nft: &Addr, token_id: &str) -> String {
        let res: OwnerOfResponse = app
            .wrap()
            .query_wasm_smart(
                nft,
                &QueryMsg::OwnerOf {
                    token_id: token_id.to_string(),
                    include_expired: None,
                },
            )
            .unwrap();
        res.owner
    }

    pub fn approve_all(app: &mut cw_multi_test::App, nft: &Addr, owner: &Addr, operator: &Addr) {
        use cw_multi_test::Executor;
        app.execute_contract(
            owner.clone(),
            nft.clone(),
            &ExecuteMsg::ApproveAll {
                operator: operator.to_string(),
            },
            &[],
        )
        .unwrap();
    }
}

// ============================================================================
// Mock CW1155
// ============================================================================

/// Minimal CW1155: balances, operator approval, `SendFrom` and `Balance`.
pub mod mock_multi_token {
    use cosmwasm_schema::cw_serde;
    use cosmwasm_std::{
        to_json_binary, Addr, Binary, Deps, DepsMut, Empty, Env, MessageInfo, Response,
        StdError, StdResult, Uint128,
    };
    use cw1155::BalanceResponse;
    use cw_multi_test::{Contract, ContractWrapper};
    use cw_storage_plus::Map;

    const BALANCES: Map<(&str, &str), Uint128> = Map::new("balances");
    const APPROVALS: Map<(&str, &str), bool> = Map::new("approvals");

    #[cw_serde]
    pub struct Holding {
        pub owner: String,
        pub token_id: String,
        pub amount: Uint128,
    }

    #[cw_serde]
    pub struct InstantiateMsg {
        pub balances: Vec<Holding>,
    }

    #[cw_serde]
    pub enum ExecuteMsg {
        SendFrom {
            from: String,
            to: String,
            token_id: String,
            value: Uint128,
            msg: Option<Binary>,
        },
        ApproveAll {
            operator: String,
        },
    }

    #[cw_serde]
    pub enum QueryMsg {
        Balance { owner: String, token_id: String },
    }

    fn instantiate(
        deps: DepsMut,
        _env: Env,
        _info: MessageInfo,
        msg: InstantiateMsg,
    ) -> StdResult<Response> {
        for holding in msg.balances {
            BALANCES.save(
                deps.storage,
                (holding.owner.as_str(), holding.token_id.as_str()),
                &holding.amount,
            )?;
        }
        Ok(Response::new())
    }

    fn execute(deps: DepsMut, _env: Env, info: MessageInfo, msg: ExecuteMsg) -> StdResult<Response> {
        match msg {
            ExecuteMsg::SendFrom {
                from,
                to,
                token_id,
                value,
                ..
            } => {
                let approved = APPROVALS.has(deps.storage, (from.as_str(), info.sender.as_str()));
                if info.sender.as_str() != from && !approved {
                    return Err(StdError::generic_err("multi-token: not approved"));
                }
                let from_balance = BALANCES
                    .may_load(deps.storage, (from.as_str(), token_id.as_str()))?
                    .unwrap_or_default();
                BALANCES.save(
                    deps.storage,
                    (from.as_str(), token_id.as_str()),
                    &from_balance.checked_sub(value)?,
                )?;
                let to_balance = BALANCES
                    .may_load(deps.storage, (to.as_str(), token_id.as_str()))?
                    .unwrap_or_default();
                BALANCES.save(
                    deps.storage,
                    (to.as_str(), token_id.as_str()),
                    &(to_balance + value),
                )?;
                Ok(Response::new())
            }
            ExecuteMsg::ApproveAll { operator } => {
                APPROVALS.save(deps.storage, (info.sender.as_str(), operator.as_str()), &true)?;
                Ok(Response::new())
            }
        }
    }

    fn query(deps: Deps, _env: Env, msg: QueryMsg) -> StdResult<Binary> {
        match msg {
            QueryMsg::Balance { owner, token_id } => {
                let balance = BALANCES
                    .may_load(deps.storage, (owner.as_str(), token_id.as_str()))?
                    .unwrap_or_default();
                to_json_binary(&BalanceResponse { balance })
            }
        }
    }

    pub fn contract() -> Box<dyn Contract<Empty>> {
        Box::new(ContractWrapper::new(execute, instantiate, query))
    }

    pub fn balance_of(app: &cw_multi_test::App, token: &Addr, owner: &Addr, token_id: &str) -> u128 {
        let res: BalanceResponse = app
            .wrap()
            .query_wasm_smart(
                token,
                &QueryMsg::Balance {
                    owner: owner.to_string(),
                    token_id: token_id.to_string(),
                },
            )
            .unwrap();
        res.balance.u128()
    }

    pub fn approve_all(app: &mut cw_multi_test::App, token: &Addr, owner: &Addr, operator: &Addr) {
        use cw_multi_test::Executor;
        app.execute_contract(
            owner.clone(),
            token.clone(),
            &ExecuteMsg::ApproveAll {
                operator: operator.to_string(),
            },
            &[],
        )
        .unwrap();
    }

}

// ============================================================================
// Mock Receiver
// ============================================================================

/// Bridge-message receiver whose delivery result depends on the message body:
/// `reject` answers `false`, `fail` errors, `ack` answers `true`, anything
/// else is stored and answered with no data.
pub mod mock_receiver {
    use common::{BridgeMessage, BridgeReceiverMsg};
    use cosmwasm_schema::cw_serde;
    use cosmwasm_std::{
        to_json_binary, Binary, Deps, DepsMut, Empty, Env, MessageInfo, Response, StdError,
        StdResult,
    };
    use cw_multi_test::{Contract, ContractWrapper};
    use cw_storage_plus::Item;

    const LAST_MESSAGE: Item<BridgeMessage> = Item::new("last_message");

    #[cw_serde]
    pub enum QueryMsg {
        LastMessage {},
    }

    fn instantiate(_deps: DepsMut, _env: Env, _info: MessageInfo, _msg: Empty) -> StdResult<Response> {
        Ok(Response::new())
    }

    fn execute(
        deps: DepsMut,
        _env: Env,
        _info: MessageInfo,
        msg: BridgeReceiverMsg,
    ) -> StdResult<Response> {
        let BridgeReceiverMsg::ReceiveBridgeMessage(message) = msg;
        match message.message.as_slice() {
            b"reject" => Ok(Response::new().set_data(to_json_binary(&false)?)),
            b"fail" => Err(StdError::generic_err("receiver failed")),
            b"ack" => {
                LAST_MESSAGE.save(deps.storage, &message)?;
                Ok(Response::new().set_data(to_json_binary(&true)?))
            }
            _ => {
                LAST_MESSAGE.save(deps.storage, &message)?;
                Ok(Response::new())
            }
        }
    }

    fn query(deps: Deps, _env: Env, msg: QueryMsg) -> StdResult<Binary> {
        match msg {
            QueryMsg::LastMessage {} => to_json_binary(&LAST_MESSAGE.may_load(deps.storage)?),
        }
    }

    pub fn contract() -> Box<dyn Contract<Empty>> {
        Box::new(ContractWrapper::new(execute, instantiate, query))
    }

    pub fn last_message(
        app: &cw_multi_test::App,
        receiver: &cosmwasm_std::Addr,
    ) -> Option<BridgeMessage> {
        app.wrap()
            .query_wasm_smart(receiver, &QueryMsg::LastMessage {})
            .unwrap()
    }
}
