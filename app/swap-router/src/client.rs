//! JSON-RPC quote client
//!
//! Quotes a hop by simulating an exact-input swap through a swap router
//! contract with `eth_call` and reading back the pool's balance delta.

use crate::error::QuoteError;
use crate::quoter::{QuoteRequest, QuoteService, SwapDeltas};
use alloy_primitives::aliases::{I24, U24};
use alloy_primitives::{Address, Bytes, I256, hex};
use alloy_sol_types::{SolCall, sol};
use async_trait::async_trait;
use log::debug;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

sol! {
    struct PoolKey {
        address currency0;
        address currency1;
        uint24 fee;
        int24 tickSpacing;
        address hooks;
    }

    struct SwapParams {
        bool zeroForOne;
        int256 amountSpecified;
        uint160 sqrtPriceLimitX96;
    }

    struct TestSettings {
        bool takeClaims;
        bool settleUsingBurn;
    }

    function swap(
        PoolKey key,
        SwapParams params,
        TestSettings testSettings,
        bytes hookData
    ) external payable returns (int256 delta);
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<String>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

/// Quote service backed by an Ethereum JSON-RPC endpoint
#[derive(Clone)]
pub struct RpcQuoteClient {
    http: reqwest::Client,
    rpc_url: String,
    swap_router: Address,
    caller: Option<Address>,
}

impl RpcQuoteClient {
    /// Create a new client simulating swaps through `swap_router`
    pub fn new(rpc_url: String, swap_router: Address, timeout: Duration) -> Result<Self, QuoteError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            rpc_url,
            swap_router,
            caller: None,
        })
    }

    /// Simulate from `caller` so the router can pull its balances
    pub fn with_caller(mut self, caller: Address) -> Self {
        self.caller = Some(caller);
        self
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    pub fn swap_router(&self) -> Address {
        self.swap_router
    }

    fn call_params(&self, calldata: &[u8]) -> serde_json::Value {
        let mut call = json!({
            "to": self.swap_router,
            "data": hex::encode_prefixed(calldata),
        });
        if let Some(caller) = self.caller {
            call["from"] = json!(caller);
        }
        json!([call, "latest"])
    }

    async fn eth_call(&self, calldata: &[u8]) -> Result<Bytes, QuoteError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_call",
            "params": self.call_params(calldata),
        });

        let response: RpcResponse = self
            .http
            .post(&self.rpc_url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(error) = response.error {
            return Err(QuoteError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        let result = response
            .result
            .ok_or_else(|| QuoteError::MalformedResponse("missing result".to_string()))?;
        hex::decode(&result)
            .map(Bytes::from)
            .map_err(|e| QuoteError::MalformedResponse(e.to_string()))
    }
}

/// ABI-encode a `swap` call for an exact-input quote
pub fn encode_swap_call(request: &QuoteRequest) -> Result<Vec<u8>, QuoteError> {
    let tick_spacing = I24::try_from(request.key.tick_spacing)
        .map_err(|e| QuoteError::Encoding(format!("tick spacing: {}", e)))?;
    let fee = U24::try_from(request.key.fee)
        .map_err(|e| QuoteError::Encoding(format!("fee: {}", e)))?;
    let amount_in = I256::try_from(request.amount_in)
        .map_err(|e| QuoteError::Encoding(format!("amount: {}", e)))?;

    let call = swapCall {
        key: PoolKey {
            currency0: request.key.currency0,
            currency1: request.key.currency1,
            fee,
            tickSpacing: tick_spacing,
            hooks: request.key.hooks,
        },
        params: SwapParams {
            zeroForOne: request.zero_for_one,
            // Negative amounts specify exact input
            amountSpecified: -amount_in,
            sqrtPriceLimitX96: request.sqrt_price_limit_x96,
        },
        testSettings: TestSettings {
            takeClaims: false,
            settleUsingBurn: false,
        },
        hookData: Bytes::new(),
    };

    Ok(call.abi_encode())
}

/// Split a packed balance delta: amount0 in the upper 128 bits, amount1 in the lower
pub fn unpack_balance_delta(delta: I256) -> SwapDeltas {
    let limbs = delta.into_raw().into_limbs();
    let low = (limbs[0] as u128) | ((limbs[1] as u128) << 64);
    let high = (limbs[2] as u128) | ((limbs[3] as u128) << 64);

    SwapDeltas {
        amount0: high as i128,
        amount1: low as i128,
    }
}

#[async_trait]
impl QuoteService for RpcQuoteClient {
    async fn quote_exact_input(&self, request: &QuoteRequest) -> Result<SwapDeltas, QuoteError> {
        let calldata = encode_swap_call(request)?;
        let output = self.eth_call(&calldata).await?;

        let decoded = swapCall::abi_decode_returns(&output, true)
            .map_err(|e| QuoteError::MalformedResponse(e.to_string()))?;
        let deltas = unpack_balance_delta(decoded.delta);

        debug!(
            "eth_call quote for fee {} pool: amount0 {}, amount1 {}",
            request.key.fee, deltas.amount0, deltas.amount1
        );
        Ok(deltas)
    }
}
