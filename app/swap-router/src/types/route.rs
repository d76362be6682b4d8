//! Route and swap quote types

use crate::types::pool::Pool;
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One traversal step through a single pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteHop {
    /// The pool used for this hop
    pub pool: Arc<Pool>,
    /// Token entering the hop
    pub token_in: Address,
    /// Token leaving the hop
    pub token_out: Address,
    /// Fee tier of the pool
    pub fee: u32,
}

/// An acyclic sequence of hops from a source to a destination token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// All hops in the route
    pub hops: Vec<RouteHop>,
    /// Token sequence including both endpoints
    pub path: Vec<Address>,
    /// Sum of the hop fees, saturating at `u32::MAX`
    pub total_fee: u32,
}

impl Route {
    /// Build a route from its hops. `start` is only used when `hops` is empty.
    pub fn from_hops(start: Address, hops: Vec<RouteHop>) -> Self {
        let mut path = Vec::with_capacity(hops.len() + 1);
        path.push(hops.first().map(|h| h.token_in).unwrap_or(start));
        path.extend(hops.iter().map(|h| h.token_out));

        let total_fee = hops.iter().fold(0u32, |acc, h| acc.saturating_add(h.fee));

        Self {
            hops,
            path,
            total_fee,
        }
    }

    /// Get the number of hops in the route
    pub fn hop_count(&self) -> usize {
        self.hops.len()
    }

    /// Check if this is a direct swap (single hop)
    pub fn is_direct(&self) -> bool {
        self.hops.len() == 1
    }

    pub fn token_in(&self) -> Option<Address> {
        self.path.first().copied()
    }

    pub fn token_out(&self) -> Option<Address> {
        self.path.last().copied()
    }
}

/// Where a hop's numbers came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteSource {
    /// Returned by the quoting service
    Live,
    /// Fee-only fallback after the quoting service failed
    Estimated,
}

/// Quoting result for a single hop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HopQuote {
    pub pool_id: String,
    pub token_in: Address,
    pub token_out: Address,
    pub amount_in: U256,
    pub amount_out: U256,
    pub slippage_bps: u32,
    pub price_impact_bps: u32,
    pub source: QuoteSource,
}

/// Aggregated quote for a whole route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiHopQuote {
    pub route: Route,
    pub amount_in: U256,
    pub amount_out: U256,
    pub hops: Vec<HopQuote>,
    /// Plain sum of per-hop slippage
    pub slippage_bps: u32,
    /// Plain sum of per-hop price impact
    pub price_impact_bps: u32,
    pub gas_estimate: u64,
}

impl MultiHopQuote {
    /// Compare quotes and return true if this one yields strictly more output
    pub fn better_than(&self, other: &MultiHopQuote) -> bool {
        self.amount_out > other.amount_out
    }

    /// Number of hops priced by the fallback estimate
    pub fn estimated_hops(&self) -> usize {
        self.hops
            .iter()
            .filter(|h| h.source == QuoteSource::Estimated)
            .count()
    }

    /// True when at least one hop could not be quoted live
    pub fn is_degraded(&self) -> bool {
        self.estimated_hops() > 0
    }
}
