pub mod pool;
pub mod route;

pub use pool::{Pool, PoolKey, PoolState};
pub use route::{HopQuote, MultiHopQuote, QuoteSource, Route, RouteHop};
