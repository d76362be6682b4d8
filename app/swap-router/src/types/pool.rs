//! Pool records and the venue key used when quoting them

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// Optional on-chain state observed for a pool.
///
/// Routing never looks at this; it travels with the pool so callers can
/// display it next to a quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolState {
    pub sqrt_price_x96: U256,
    pub liquidity: u128,
}

/// A trading venue between two tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    /// Opaque stable identifier
    pub id: String,
    pub token_a: Address,
    pub token_b: Address,
    /// Fee tier in hundredths of a basis point (3000 = 0.30%)
    pub fee: u32,
    pub tick_spacing: i32,
    /// Marks pools that take part in the receipt/attribution mechanism
    pub eligibility_marker: Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<PoolState>,
}

impl Pool {
    /// Create a pool, storing its tokens in canonical order
    pub fn new(
        id: impl Into<String>,
        token_a: Address,
        token_b: Address,
        fee: u32,
        tick_spacing: i32,
        eligibility_marker: Address,
    ) -> Self {
        let (token_a, token_b) = sort_tokens(token_a, token_b);
        Self {
            id: id.into(),
            token_a,
            token_b,
            fee,
            tick_spacing,
            eligibility_marker,
            state: None,
        }
    }

    pub fn with_state(mut self, sqrt_price_x96: U256, liquidity: u128) -> Self {
        self.state = Some(PoolState {
            sqrt_price_x96,
            liquidity,
        });
        self
    }

    /// The lower of the two token addresses
    pub fn token0(&self) -> Address {
        self.token_a.min(self.token_b)
    }

    /// The higher of the two token addresses
    pub fn token1(&self) -> Address {
        self.token_a.max(self.token_b)
    }

    pub fn contains(&self, token: &Address) -> bool {
        self.token_a == *token || self.token_b == *token
    }

    /// The token on the other side of the pool, if `token` is one of its sides
    pub fn other_token(&self, token: &Address) -> Option<Address> {
        if self.token_a == *token {
            Some(self.token_b)
        } else if self.token_b == *token {
            Some(self.token_a)
        } else {
            None
        }
    }

    pub fn has_marker(&self, marker: &Address) -> bool {
        self.eligibility_marker == *marker
    }

    /// Venue key sent to the quoting service
    pub fn key(&self) -> PoolKey {
        PoolKey {
            currency0: self.token0(),
            currency1: self.token1(),
            fee: self.fee,
            tick_spacing: self.tick_spacing,
            hooks: self.eligibility_marker,
        }
    }
}

/// Identifies a venue to the quoting service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PoolKey {
    pub currency0: Address,
    pub currency1: Address,
    pub fee: u32,
    pub tick_spacing: i32,
    pub hooks: Address,
}

/// Order two tokens canonically, lower address first
pub fn sort_tokens(a: Address, b: Address) -> (Address, Address) {
    if a <= b { (a, b) } else { (b, a) }
}
