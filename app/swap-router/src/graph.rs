//! Token adjacency graph built from the pool catalog
//!
//! Every retained pool contributes a pair of edges (token0 → token1 and
//! token1 → token0) that share the same pool, so the graph is always
//! symmetric. A built graph is never mutated; catalog changes produce a new
//! graph, and the process-wide default graph is swapped as a whole.

use crate::catalog::{self, DEFAULT_ELIGIBILITY_MARKER};
use crate::types::pool::Pool;
use alloy_primitives::Address;
use indexmap::IndexMap;
use log::{debug, info};
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

/// One directed adjacency entry
#[derive(Debug, Clone, PartialEq)]
pub struct PoolEdge {
    /// Token reached by traversing this edge
    pub to_token: Address,
    pub pool: Arc<Pool>,
    pub fee: u32,
}

/// Mapping from token to its outgoing edges, in catalog order
#[derive(Debug, Clone, Default)]
pub struct PoolGraph {
    adjacency: IndexMap<Address, Vec<PoolEdge>>,
    pool_count: usize,
}

impl PoolGraph {
    /// Build a graph, keeping only pools carrying `required_marker` when one is given
    pub fn build(pools: &[Pool], required_marker: Option<&Address>) -> Self {
        let mut graph = Self::default();

        for pool in pools {
            if let Some(marker) = required_marker {
                if !pool.has_marker(marker) {
                    debug!(
                        "Skipping pool {}: marker {} does not match {}",
                        pool.id, pool.eligibility_marker, marker
                    );
                    continue;
                }
            }
            graph.insert_pool(Arc::new(pool.clone()));
        }

        debug!(
            "Built pool graph: {} pools, {} tokens",
            graph.pool_count,
            graph.adjacency.len()
        );
        graph
    }

    fn insert_pool(&mut self, pool: Arc<Pool>) {
        let token0 = pool.token0();
        let token1 = pool.token1();

        self.adjacency.entry(token0).or_default().push(PoolEdge {
            to_token: token1,
            pool: Arc::clone(&pool),
            fee: pool.fee,
        });
        self.adjacency.entry(token1).or_default().push(PoolEdge {
            to_token: token0,
            fee: pool.fee,
            pool,
        });
        self.pool_count += 1;
    }

    /// Outgoing edges of `token`, empty if the token is unknown
    pub fn edges_for(&self, token: &Address) -> &[PoolEdge] {
        self.adjacency.get(token).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_direct_edge(&self, token_in: &Address, token_out: &Address) -> bool {
        self.edges_for(token_in)
            .iter()
            .any(|edge| edge.to_token == *token_out)
    }

    /// Cheapest pool directly connecting the pair. Ties go to the earlier catalog entry.
    pub fn best_direct_pool(&self, token_in: &Address, token_out: &Address) -> Option<&Pool> {
        self.edges_for(token_in)
            .iter()
            .filter(|edge| edge.to_token == *token_out)
            .reduce(|best, edge| if edge.fee < best.fee { edge } else { best })
            .map(|edge| edge.pool.as_ref())
    }

    /// All tokens in the order they first appeared in the catalog
    pub fn all_tokens(&self) -> Vec<Address> {
        self.adjacency.keys().copied().collect()
    }

    pub fn pool_count(&self) -> usize {
        self.pool_count
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }
}

/// Build a graph, filtering on the configured eligibility marker when asked
pub fn build_graph(pools: &[Pool], require_eligibility_marker: bool) -> PoolGraph {
    let marker = require_eligibility_marker.then_some(&DEFAULT_ELIGIBILITY_MARKER);
    PoolGraph::build(pools, marker)
}

static DEFAULT_GRAPH: LazyLock<RwLock<Arc<PoolGraph>>> = LazyLock::new(|| {
    info!("Building default pool graph from built-in catalog");
    RwLock::new(Arc::new(build_graph(&catalog::default_pools(), true)))
});

/// Snapshot of the process-wide default graph, built on first use
pub fn default_graph() -> Arc<PoolGraph> {
    let guard = DEFAULT_GRAPH.read().unwrap_or_else(PoisonError::into_inner);
    Arc::clone(&*guard)
}

/// Replace the default graph, rebuilding from `pools` or the built-in catalog.
///
/// Filters on [`DEFAULT_ELIGIBILITY_MARKER`]. Deployments with their own
/// marker use [`refresh_graph_with_marker`].
pub fn refresh_graph(pools: Option<&[Pool]>) -> Arc<PoolGraph> {
    refresh_graph_with_marker(pools, Some(&DEFAULT_ELIGIBILITY_MARKER))
}

/// Replace the default graph, keeping only pools carrying `required_marker`.
///
/// Readers holding an earlier snapshot keep it; new readers see the new graph.
pub fn refresh_graph_with_marker(
    pools: Option<&[Pool]>,
    required_marker: Option<&Address>,
) -> Arc<PoolGraph> {
    let graph = Arc::new(match pools {
        Some(pools) => PoolGraph::build(pools, required_marker),
        None => PoolGraph::build(&catalog::default_pools(), required_marker),
    });

    let mut guard = DEFAULT_GRAPH.write().unwrap_or_else(PoisonError::into_inner);
    *guard = Arc::clone(&graph);
    info!(
        "Default pool graph refreshed: {} pools, {} tokens",
        graph.pool_count(),
        graph.all_tokens().len()
    );
    graph
}
