//! Route quoting against an external quoting service
//!
//! Hops within a route are quoted one after another, each hop consuming the
//! previous hop's output. Candidate routes are independent and are quoted
//! concurrently. A failing quoting call never fails the route: the hop falls
//! back to a fee-only estimate and is marked as [`QuoteSource::Estimated`].

use crate::calculator;
use crate::error::QuoteError;
use crate::types::pool::{Pool, PoolKey};
use crate::types::route::{HopQuote, MultiHopQuote, QuoteSource, Route};
use alloy_primitives::aliases::U160;
use alloy_primitives::{Address, U256, uint};
use async_trait::async_trait;
use futures::future::join_all;
use log::{debug, warn};
use std::time::Duration;

/// Price limit for token0 → token1 swaps (MIN_SQRT_PRICE + 1)
pub const MIN_SQRT_PRICE_LIMIT: U160 = uint!(4295128740_U160);

/// Price limit for token1 → token0 swaps (MAX_SQRT_PRICE - 1)
pub const MAX_SQRT_PRICE_LIMIT: U160 =
    uint!(1461446703485210103287273052203988822378723970341_U160);

pub const DEFAULT_GAS_PER_HOP: u64 = 150_000;
pub const DEFAULT_QUOTE_TIMEOUT: Duration = Duration::from_secs(5);

/// One exact-input quote request for a single pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteRequest {
    pub key: PoolKey,
    pub zero_for_one: bool,
    pub amount_in: U256,
    pub sqrt_price_limit_x96: U160,
}

impl QuoteRequest {
    /// Build an exact-input request selling `token_in` into `pool`
    pub fn exact_input(pool: &Pool, token_in: &Address, amount_in: U256) -> Self {
        let zero_for_one = *token_in == pool.token0();
        Self {
            key: pool.key(),
            zero_for_one,
            amount_in,
            sqrt_price_limit_x96: if zero_for_one {
                MIN_SQRT_PRICE_LIMIT
            } else {
                MAX_SQRT_PRICE_LIMIT
            },
        }
    }
}

/// Signed balance changes reported by the quoting service, from the pool's side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SwapDeltas {
    pub amount0: i128,
    pub amount1: i128,
}

impl SwapDeltas {
    /// Absolute delta of the token leaving the pool
    pub fn amount_out(&self, zero_for_one: bool) -> U256 {
        let delta = if zero_for_one {
            self.amount1
        } else {
            self.amount0
        };
        U256::from(delta.unsigned_abs())
    }
}

/// External quoting service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuoteService: Send + Sync {
    async fn quote_exact_input(&self, request: &QuoteRequest) -> Result<SwapDeltas, QuoteError>;
}

#[async_trait]
impl<T: QuoteService + ?Sized> QuoteService for Box<T> {
    async fn quote_exact_input(&self, request: &QuoteRequest) -> Result<SwapDeltas, QuoteError> {
        (**self).quote_exact_input(request).await
    }
}

/// Quote service used when no endpoint is configured; every hop is estimated
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineQuoter;

#[async_trait]
impl QuoteService for OfflineQuoter {
    async fn quote_exact_input(&self, _request: &QuoteRequest) -> Result<SwapDeltas, QuoteError> {
        Err(QuoteError::Unavailable("no quote endpoint configured".to_string()))
    }
}

/// Outcome of quoting one hop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HopOutcome {
    Live {
        amount_out: U256,
        price_impact_bps: u32,
    },
    Estimated {
        amount_out: U256,
        price_impact_bps: u32,
        reason: String,
    },
}

impl HopOutcome {
    pub fn amount_out(&self) -> U256 {
        match self {
            HopOutcome::Live { amount_out, .. } | HopOutcome::Estimated { amount_out, .. } => {
                *amount_out
            }
        }
    }

    pub fn price_impact_bps(&self) -> u32 {
        match self {
            HopOutcome::Live {
                price_impact_bps, ..
            }
            | HopOutcome::Estimated {
                price_impact_bps, ..
            } => *price_impact_bps,
        }
    }

    pub fn source(&self) -> QuoteSource {
        match self {
            HopOutcome::Live { .. } => QuoteSource::Live,
            HopOutcome::Estimated { .. } => QuoteSource::Estimated,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuoteSettings {
    /// Upper bound on a single quoting call
    pub timeout: Duration,
    pub gas_per_hop: u64,
}

impl Default for QuoteSettings {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_QUOTE_TIMEOUT,
            gas_per_hop: DEFAULT_GAS_PER_HOP,
        }
    }
}

/// Prices routes using a [`QuoteService`]
pub struct RouteQuoter<S> {
    service: S,
    settings: QuoteSettings,
}

impl<S: QuoteService> RouteQuoter<S> {
    pub fn new(service: S) -> Self {
        Self::with_settings(service, QuoteSettings::default())
    }

    pub fn with_settings(service: S, settings: QuoteSettings) -> Self {
        Self { service, settings }
    }

    pub fn settings(&self) -> &QuoteSettings {
        &self.settings
    }

    /// Quote one hop, falling back to a fee-only estimate on any failure
    pub async fn quote_hop(&self, pool: &Pool, token_in: &Address, amount_in: U256) -> HopOutcome {
        let request = QuoteRequest::exact_input(pool, token_in, amount_in);

        let result =
            match tokio::time::timeout(self.settings.timeout, self.service.quote_exact_input(&request))
                .await
            {
                Ok(result) => result,
                Err(_) => Err(QuoteError::Timeout(self.settings.timeout)),
            };

        match result {
            Ok(deltas) => {
                let amount_out = deltas.amount_out(request.zero_for_one);
                HopOutcome::Live {
                    amount_out,
                    price_impact_bps: calculator::calculate_price_impact(amount_in, amount_out),
                }
            }
            Err(e) => {
                warn!(
                    "Quote failed for pool {} (fee {}), using fee-only estimate: {}",
                    pool.id, pool.fee, e
                );
                HopOutcome::Estimated {
                    amount_out: calculator::estimate_amount_out(amount_in, pool.fee),
                    price_impact_bps: calculator::estimate_price_impact(pool.fee),
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Quote every hop of `route` in order, chaining each output into the next input
    pub async fn quote_route(&self, route: &Route, amount_in: U256) -> MultiHopQuote {
        let mut hops = Vec::with_capacity(route.hop_count());
        let mut current_amount = amount_in;

        for hop in &route.hops {
            let outcome = self.quote_hop(&hop.pool, &hop.token_in, current_amount).await;
            let price_impact_bps = outcome.price_impact_bps();

            hops.push(HopQuote {
                pool_id: hop.pool.id.clone(),
                token_in: hop.token_in,
                token_out: hop.token_out,
                amount_in: current_amount,
                amount_out: outcome.amount_out(),
                slippage_bps: calculator::hop_slippage_bps(hop.fee, price_impact_bps),
                price_impact_bps,
                source: outcome.source(),
            });

            current_amount = outcome.amount_out();
        }

        let slippage_bps = hops
            .iter()
            .fold(0u32, |acc, h| acc.saturating_add(h.slippage_bps));
        let price_impact_bps = hops
            .iter()
            .fold(0u32, |acc, h| acc.saturating_add(h.price_impact_bps));

        let quote = MultiHopQuote {
            route: route.clone(),
            amount_in,
            amount_out: current_amount,
            hops,
            slippage_bps,
            price_impact_bps,
            gas_estimate: calculator::gas_estimate(self.settings.gas_per_hop, route.hop_count()),
        };

        debug!(
            "Quoted {}-hop route: {} -> {} ({} estimated hops)",
            route.hop_count(),
            quote.amount_in,
            quote.amount_out,
            quote.estimated_hops()
        );
        quote
    }

    /// Quote all candidates concurrently and keep the one with the largest output.
    ///
    /// Ties go to the earliest candidate.
    pub async fn best_quote(&self, routes: &[Route], amount_in: U256) -> Option<MultiHopQuote> {
        let quotes = join_all(routes.iter().map(|route| self.quote_route(route, amount_in))).await;

        quotes.into_iter().reduce(|best, quote| {
            if quote.better_than(&best) {
                quote
            } else {
                best
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::route::RouteHop;
    use alloy_primitives::address;
    use std::sync::Arc;

    const A: Address = address!("000000000000000000000000000000000000000a");
    const B: Address = address!("000000000000000000000000000000000000000b");
    const C: Address = address!("000000000000000000000000000000000000000c");

    fn pool(id: &str, a: Address, b: Address, fee: u32) -> Arc<Pool> {
        Arc::new(Pool::new(id, a, b, fee, 60, Address::ZERO))
    }

    fn route(hops: &[(Arc<Pool>, Address, Address)]) -> Route {
        let start = hops.first().map(|h| h.1).unwrap_or(A);
        Route::from_hops(
            start,
            hops.iter()
                .map(|(pool, token_in, token_out)| RouteHop {
                    pool: Arc::clone(pool),
                    token_in: *token_in,
                    token_out: *token_out,
                    fee: pool.fee,
                })
                .collect(),
        )
    }

    /// Deltas for an exact-input swap paying out `out`
    fn deltas(request: &QuoteRequest, out: u128) -> SwapDeltas {
        let amount_in = request.amount_in.to::<u128>() as i128;
        if request.zero_for_one {
            SwapDeltas {
                amount0: -amount_in,
                amount1: out as i128,
            }
        } else {
            SwapDeltas {
                amount0: out as i128,
                amount1: -amount_in,
            }
        }
    }

    const D: Address = address!("000000000000000000000000000000000000000d");

    const CALL_DELAY: Duration = Duration::from_secs(1);

    /// Answers every request after a fixed delay, paying out 99%
    struct DelayedQuoter;

    #[async_trait]
    impl QuoteService for DelayedQuoter {
        async fn quote_exact_input(&self, request: &QuoteRequest) -> Result<SwapDeltas, QuoteError> {
            tokio::time::sleep(CALL_DELAY).await;
            let out = request.amount_in.to::<u128>() * 99 / 100;
            Ok(deltas(request, out))
        }
    }

    struct SlowQuoter;

    #[async_trait]
    impl QuoteService for SlowQuoter {
        async fn quote_exact_input(&self, request: &QuoteRequest) -> Result<SwapDeltas, QuoteError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(deltas(request, 1))
        }
    }

    #[test]
    fn test_request_orientation() {
        let p = pool("ab", B, A, 3000);

        let request = QuoteRequest::exact_input(&p, &A, U256::from(100u64));
        assert!(request.zero_for_one);
        assert_eq!(request.sqrt_price_limit_x96, MIN_SQRT_PRICE_LIMIT);
        assert_eq!(request.key.currency0, A);

        let request = QuoteRequest::exact_input(&p, &B, U256::from(100u64));
        assert!(!request.zero_for_one);
        assert_eq!(request.sqrt_price_limit_x96, MAX_SQRT_PRICE_LIMIT);
    }

    #[test]
    fn test_deltas_amount_out() {
        let d = SwapDeltas {
            amount0: -1_000,
            amount1: 990,
        };
        assert_eq!(d.amount_out(true), U256::from(990u64));
        assert_eq!(d.amount_out(false), U256::from(1_000u64));
    }

    #[tokio::test]
    async fn test_live_hop() {
        let mut service = MockQuoteService::new();
        service
            .expect_quote_exact_input()
            .times(1)
            .returning(|req| Ok(deltas(req, 990_000)));

        let quoter = RouteQuoter::new(service);
        let p = pool("ab", A, B, 3000);
        let outcome = quoter.quote_hop(&p, &A, U256::from(1_000_000u64)).await;

        assert_eq!(
            outcome,
            HopOutcome::Live {
                amount_out: U256::from(990_000u64),
                price_impact_bps: 100,
            }
        );
    }

    #[tokio::test]
    async fn test_fallback_is_deterministic() {
        let mut service = MockQuoteService::new();
        service.expect_quote_exact_input().returning(|_| {
            Err(QuoteError::Rpc {
                code: 3,
                message: "execution reverted".to_string(),
            })
        });

        let quoter = RouteQuoter::new(service);
        let p = pool("ab", A, B, 3000);
        let amount_in = U256::from(1_000_000u64);
        let outcome = quoter.quote_hop(&p, &A, amount_in).await;

        assert_eq!(outcome.source(), QuoteSource::Estimated);
        assert_eq!(outcome.amount_out(), amount_in * U256::from(7000u64) / U256::from(10000u64));
        assert_eq!(outcome.price_impact_bps(), 30);
    }

    #[tokio::test]
    async fn test_timeout_falls_back() {
        let settings = QuoteSettings {
            timeout: Duration::from_millis(100),
            ..QuoteSettings::default()
        };
        let quoter = RouteQuoter::with_settings(SlowQuoter, settings);
        let p = pool("ab", A, B, 500);
        let outcome = quoter.quote_hop(&p, &A, U256::from(10_000u64)).await;

        match outcome {
            HopOutcome::Estimated {
                amount_out, reason, ..
            } => {
                assert_eq!(amount_out, U256::from(9_500u64));
                assert!(reason.contains("timed out"));
            }
            other => panic!("expected estimate, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_hops_are_chained() {
        let mut service = MockQuoteService::new();
        // First hop halves the amount, second hop must receive exactly that half
        service
            .expect_quote_exact_input()
            .withf(|req| req.amount_in == U256::from(1_000u64))
            .times(1)
            .returning(|req| Ok(deltas(req, 500)));
        service
            .expect_quote_exact_input()
            .withf(|req| req.amount_in == U256::from(500u64))
            .times(1)
            .returning(|req| Ok(deltas(req, 480)));

        let quoter = RouteQuoter::new(service);
        let r = route(&[(pool("ab", A, B, 500), A, B), (pool("bc", B, C, 3000), B, C)]);
        let quote = quoter.quote_route(&r, U256::from(1_000u64)).await;

        assert_eq!(quote.hops.len(), 2);
        assert_eq!(quote.hops[0].amount_out, U256::from(500u64));
        assert_eq!(quote.hops[1].amount_in, U256::from(500u64));
        assert_eq!(quote.amount_out, U256::from(480u64));
        assert_eq!(quote.gas_estimate, 2 * DEFAULT_GAS_PER_HOP);
        assert!(!quote.is_degraded());

        // impact: 5000 + 400 bps, slippage adds 5 + 30 bps of fees
        assert_eq!(quote.price_impact_bps, 5_400);
        assert_eq!(quote.slippage_bps, 5_435);
    }

    #[tokio::test]
    async fn test_partial_failure_still_completes() {
        let mut service = MockQuoteService::new();
        service
            .expect_quote_exact_input()
            .withf(|req| req.key.fee == 500)
            .returning(|req| Ok(deltas(req, 900)));
        service
            .expect_quote_exact_input()
            .withf(|req| req.key.fee == 3000)
            .returning(|_| Err(QuoteError::MalformedResponse("empty".to_string())));

        let quoter = RouteQuoter::new(service);
        let r = route(&[(pool("ab", A, B, 500), A, B), (pool("bc", B, C, 3000), B, C)]);
        let quote = quoter.quote_route(&r, U256::from(1_000u64)).await;

        assert_eq!(quote.hops[0].source, QuoteSource::Live);
        assert_eq!(quote.hops[1].source, QuoteSource::Estimated);
        assert_eq!(quote.amount_out, U256::from(630u64));
        assert!(quote.is_degraded());
    }

    #[tokio::test]
    async fn test_zero_hop_route() {
        let service = MockQuoteService::new();
        let quoter = RouteQuoter::new(service);
        let r = Route::from_hops(A, vec![]);

        let quote = quoter.quote_route(&r, U256::from(1_234u64)).await;

        assert_eq!(quote.amount_out, U256::from(1_234u64));
        assert!(quote.hops.is_empty());
        assert_eq!(quote.gas_estimate, 0);
        assert_eq!(quote.slippage_bps, 0);
    }

    #[tokio::test]
    async fn test_best_quote_picks_largest_output() {
        let mut service = MockQuoteService::new();
        service
            .expect_quote_exact_input()
            .withf(|req| req.key.fee == 500)
            .returning(|req| Ok(deltas(req, 990)));
        service
            .expect_quote_exact_input()
            .withf(|req| req.key.fee == 100)
            .returning(|req| Ok(deltas(req, 995)));

        let quoter = RouteQuoter::new(service);
        let routes = vec![
            route(&[(pool("ab-500", A, B, 500), A, B)]),
            route(&[(pool("ab-100", A, B, 100), A, B)]),
        ];

        let best = quoter
            .best_quote(&routes, U256::from(1_000u64))
            .await
            .unwrap();
        assert_eq!(best.amount_out, U256::from(995u64));
        assert_eq!(best.hops[0].pool_id, "ab-100");
    }

    #[tokio::test]
    async fn test_best_quote_tie_keeps_first() {
        let mut service = MockQuoteService::new();
        service
            .expect_quote_exact_input()
            .returning(|req| Ok(deltas(req, 990)));

        let quoter = RouteQuoter::new(service);
        let routes = vec![
            route(&[(pool("first", A, B, 500), A, B)]),
            route(&[(pool("second", A, B, 3000), A, B)]),
        ];

        let best = quoter
            .best_quote(&routes, U256::from(1_000u64))
            .await
            .unwrap();
        assert_eq!(best.hops[0].pool_id, "first");
    }

    #[tokio::test(start_paused = true)]
    async fn test_candidates_are_quoted_concurrently() {
        let quoter = RouteQuoter::new(DelayedQuoter);
        let routes = vec![
            route(&[(pool("ab-100", A, B, 100), A, B)]),
            route(&[(pool("ab-500", A, B, 500), A, B)]),
            route(&[(pool("ab-3000", A, B, 3000), A, B)]),
            route(&[(pool("ab-10000", A, B, 10000), A, B)]),
        ];

        let start = tokio::time::Instant::now();
        let best = quoter
            .best_quote(&routes, U256::from(1_000u64))
            .await
            .unwrap();
        let elapsed = start.elapsed();

        assert!(elapsed >= CALL_DELAY);
        assert!(elapsed < CALL_DELAY * 2, "took {:?}", elapsed);
        assert_eq!(best.amount_out, U256::from(990u64));
        assert!(!best.is_degraded());
    }

    #[tokio::test(start_paused = true)]
    async fn test_hops_within_route_are_sequential() {
        let quoter = RouteQuoter::new(DelayedQuoter);
        let r = route(&[
            (pool("ab", A, B, 500), A, B),
            (pool("bc", B, C, 500), B, C),
            (pool("cd", C, D, 500), C, D),
        ]);

        let start = tokio::time::Instant::now();
        let quote = quoter.quote_route(&r, U256::from(1_000_000u64)).await;
        let elapsed = start.elapsed();

        assert!(elapsed >= CALL_DELAY * 3, "took {:?}", elapsed);
        assert_eq!(quote.hops[2].amount_in, U256::from(980_100u64));
        assert_eq!(quote.amount_out, U256::from(970_299u64));
        assert_eq!(quote.estimated_hops(), 0);
    }

    #[tokio::test]
    async fn test_best_quote_empty() {
        let quoter = RouteQuoter::new(MockQuoteService::new());
        assert!(quoter.best_quote(&[], U256::from(1u64)).await.is_none());
    }

    #[tokio::test]
    async fn test_offline_quoter_estimates_everything() {
        let quoter = RouteQuoter::new(OfflineQuoter);
        let r = route(&[(pool("ab", A, B, 3000), A, B), (pool("bc", B, C, 3000), B, C)]);

        let quote = quoter.quote_route(&r, U256::from(1_000_000u64)).await;

        assert_eq!(quote.estimated_hops(), 2);
        assert_eq!(quote.hops[1].amount_in, U256::from(700_000u64));
        assert_eq!(quote.amount_out, U256::from(490_000u64));
        assert_eq!(quote.price_impact_bps, 60);
        assert_eq!(quote.slippage_bps, 120);
    }
}
