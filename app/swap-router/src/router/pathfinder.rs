//! Multi-hop pathfinder - enumerates acyclic routes through intermediate tokens

use crate::graph::{self, PoolEdge, PoolGraph};
use crate::types::route::{Route, RouteHop};
use alloy_primitives::Address;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

pub const DEFAULT_MAX_HOPS: usize = 3;
pub const DEFAULT_MAX_ROUTES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOptions {
    pub max_hops: usize,
    pub max_routes: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_hops: DEFAULT_MAX_HOPS,
            max_routes: DEFAULT_MAX_ROUTES,
        }
    }
}

/// Result of a route search
///
/// `has_direct_route` reports whether a single pool connects the pair, even
/// when a cheaper multi-hop route is returned as `best_route`. Callers use it
/// to tell users that a direct swap exists but is not the cheapest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteSearch {
    pub best_route: Option<Route>,
    pub alternatives: Vec<Route>,
    pub has_direct_route: bool,
}

impl RouteSearch {
    /// Best route followed by the alternatives, in fee order
    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.best_route.iter().chain(self.alternatives.iter())
    }

    pub fn into_routes(self) -> Vec<Route> {
        self.best_route.into_iter().chain(self.alternatives).collect()
    }
}

/// A branch of the breadth-first search
struct PartialPath {
    current_token: Address,
    hops: Vec<RouteHop>,
    /// Tokens already on this branch; never shared with sibling branches
    visited: HashSet<Address>,
}

impl PartialPath {
    fn extend(&self, edge: &PoolEdge) -> Self {
        let mut hops = self.hops.clone();
        hops.push(RouteHop {
            pool: Arc::clone(&edge.pool),
            token_in: self.current_token,
            token_out: edge.to_token,
            fee: edge.fee,
        });

        let mut visited = self.visited.clone();
        visited.insert(edge.to_token);

        Self {
            current_token: edge.to_token,
            hops,
            visited,
        }
    }
}

/// Find up to `options.max_routes` routes from `token_in` to `token_out`, cheapest first
///
/// Uses a BFS over all acyclic paths of at most `options.max_hops` hops. A
/// missing route, an unknown token or a zero hop limit all yield an empty
/// result; the search itself never fails.
pub fn find_routes(
    graph: &PoolGraph,
    token_in: &Address,
    token_out: &Address,
    options: SearchOptions,
) -> RouteSearch {
    if token_in == token_out {
        return RouteSearch::default();
    }

    let max_routes = if options.max_routes == 0 {
        warn!("max_routes of 0 requested, returning a single route instead");
        1
    } else {
        options.max_routes
    };

    let has_direct_route = graph.has_direct_edge(token_in, token_out);
    let mut routes = find_all_paths(graph, token_in, token_out, options.max_hops);

    // Stable: equal fees keep BFS discovery order
    routes.sort_by_key(|route| route.total_fee);
    routes.truncate(max_routes);

    debug!(
        "Found {} route(s) {} -> {} (direct pool: {})",
        routes.len(),
        token_in,
        token_out,
        has_direct_route
    );

    let mut routes = routes.into_iter();
    RouteSearch {
        best_route: routes.next(),
        alternatives: routes.collect(),
        has_direct_route,
    }
}

/// Enumerate every acyclic path from `token_in` to `token_out` within `max_hops`
fn find_all_paths(
    graph: &PoolGraph,
    token_in: &Address,
    token_out: &Address,
    max_hops: usize,
) -> Vec<Route> {
    let mut found = Vec::new();
    let mut queue = VecDeque::new();

    queue.push_back(PartialPath {
        current_token: *token_in,
        hops: Vec::new(),
        visited: HashSet::from([*token_in]),
    });

    while let Some(partial) = queue.pop_front() {
        // Check if we've reached the destination
        if partial.current_token == *token_out {
            found.push(Route::from_hops(*token_in, partial.hops));
            continue;
        }

        // Check if we've exhausted the hop budget
        if partial.hops.len() >= max_hops {
            continue;
        }

        for edge in graph.edges_for(&partial.current_token) {
            // Avoid cycles
            if partial.visited.contains(&edge.to_token) {
                continue;
            }
            queue.push_back(partial.extend(edge));
        }
    }

    found
}

/// Cheapest route, if any
pub fn find_best_route(graph: &PoolGraph, token_in: &Address, token_out: &Address) -> Option<Route> {
    find_routes(graph, token_in, token_out, SearchOptions::default()).best_route
}

pub fn route_exists(graph: &PoolGraph, token_in: &Address, token_out: &Address) -> bool {
    find_best_route(graph, token_in, token_out).is_some()
}

/// Route with the fewest hops among the returned candidates; ties keep fee order
pub fn find_shortest_route(
    graph: &PoolGraph,
    token_in: &Address,
    token_out: &Address,
) -> Option<Route> {
    find_routes(graph, token_in, token_out, SearchOptions::default())
        .into_routes()
        .into_iter()
        .reduce(|shortest, route| {
            if route.hop_count() < shortest.hop_count() {
                route
            } else {
                shortest
            }
        })
}

/// Render a route as `0x1234…abcd → 0x5678…ef01` for logs
pub fn format_route(route: &Route) -> String {
    route
        .path
        .iter()
        .map(short_address)
        .collect::<Vec<_>>()
        .join(" → ")
}

fn short_address(address: &Address) -> String {
    let hex = alloy_primitives::hex::encode(address);
    format!("0x{}…{}", &hex[..4], &hex[hex.len() - 4..])
}

/// Route search bound to a graph snapshot
#[derive(Debug, Clone)]
pub struct Pathfinder {
    graph: Arc<PoolGraph>,
    options: SearchOptions,
}

impl Pathfinder {
    pub fn new(graph: Arc<PoolGraph>, options: SearchOptions) -> Self {
        Self { graph, options }
    }

    /// Search the current process-wide default graph
    pub fn with_default_graph(options: SearchOptions) -> Self {
        Self::new(graph::default_graph(), options)
    }

    pub fn graph(&self) -> &PoolGraph {
        &self.graph
    }

    pub fn options(&self) -> SearchOptions {
        self.options
    }

    pub fn find_routes(&self, token_in: &Address, token_out: &Address) -> RouteSearch {
        find_routes(&self.graph, token_in, token_out, self.options)
    }
}
