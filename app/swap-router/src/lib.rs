//! Multi-hop Swap Router
//!
//! This library finds and prices swap routes through a graph of token pools.
//! Routes are discovered with a breadth-first search over the pool graph,
//! ranked by total fee, and quoted hop by hop against an external quoting
//! service with a deterministic fee-only fallback.

pub mod calculator;
pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod graph;
pub mod quoter;
pub mod router;
pub mod types;

// Re-export commonly used types
pub use client::RpcQuoteClient;
pub use config::Config;
pub use error::{QuoteError, Result, RouterError};
pub use graph::{
    PoolEdge, PoolGraph, build_graph, default_graph, refresh_graph,
    refresh_graph_with_marker,
};
pub use quoter::{OfflineQuoter, QuoteService, RouteQuoter};
pub use router::{RouteSearch, SearchOptions, find_routes};
pub use types::{HopQuote, MultiHopQuote, Pool, Route, RouteHop};
