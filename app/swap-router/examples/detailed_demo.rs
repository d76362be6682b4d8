//! Detailed demo showing how routes are found and quoted
//!
//! Run with: cargo run --example detailed_demo

use alloy_primitives::U256;
use swap_router::catalog::{self, CBBTC, DAI};
use swap_router::router::{find_shortest_route, format_route};
use swap_router::*;

#[tokio::main]
async fn main() {
    println!("\n=== MULTI-HOP SWAP ROUTER - DETAILED DEMO ===\n");

    // Step 1: Build the graph from the built-in catalog
    println!("STEP 1: Building the pool graph");
    let pools = catalog::default_pools();
    for pool in &pools {
        println!(
            "  {:<16} fee {:>5}  {} / {}",
            pool.id,
            pool.fee,
            pool.token0(),
            pool.token1()
        );
    }
    let graph = build_graph(&pools, true);
    println!(
        "  -> {} pools, {} tokens, {} directed edges\n",
        graph.pool_count(),
        graph.all_tokens().len(),
        graph.edge_count()
    );

    // Step 2: Search routes
    println!("STEP 2: Searching DAI -> cbBTC");
    let search = find_routes(&graph, &DAI, &CBBTC, SearchOptions::default());
    println!("  Direct pool available: {}", search.has_direct_route);
    for (idx, route) in search.routes().enumerate() {
        println!(
            "  {}. {}  (total fee {}, {} hops)",
            idx + 1,
            format_route(route),
            route.total_fee,
            route.hop_count()
        );
    }
    if let Some(shortest) = find_shortest_route(&graph, &DAI, &CBBTC) {
        println!("  Shortest: {}\n", format_route(&shortest));
    }

    // Step 3: Quote the candidates (offline: fee-only estimates)
    println!("STEP 3: Quoting candidates without a quote endpoint");
    let quoter = RouteQuoter::new(OfflineQuoter);
    let amount_in = U256::from(1_000_000_000_000_000_000u128);
    let routes = search.into_routes();

    match quoter.best_quote(&routes, amount_in).await {
        Some(quote) => {
            println!("  Best output: {}", quote.amount_out);
            println!("  Path:        {}", format_route(&quote.route));
            println!("  Slippage:    {} bps", quote.slippage_bps);
            println!("  Gas:         {}", quote.gas_estimate);
            println!(
                "  Degraded:    {} ({} estimated hops)",
                quote.is_degraded(),
                quote.estimated_hops()
            );
        }
        None => println!("  No route to quote"),
    }

    println!("\nDemo complete!");
}
