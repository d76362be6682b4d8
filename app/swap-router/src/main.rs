//! Multi-hop Swap Router
//!
//! Finds the cheapest routes between two tokens and quotes them

use clap::Parser;
use log::{error, info, warn};
use serde::Serialize;
use std::sync::Arc;
use swap_router::router::{Pathfinder, format_route};
use swap_router::types::QuoteSource;
use swap_router::*;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let args = config::CliArgs::parse();

    // Initialize logger
    if args.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }

    if let Err(e) = run(args).await {
        error!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: config::CliArgs) -> Result<()> {
    info!("Multi-hop Swap Router");

    // Load configuration
    let config = Config::from_args(args.clone())?;

    let graph = Arc::new(PoolGraph::build(
        &config.pools,
        config.eligibility_marker.as_ref(),
    ));
    info!(
        "Pool graph: {} of {} pools routable, {} tokens",
        graph.pool_count(),
        config.pools.len(),
        graph.all_tokens().len()
    );

    let pathfinder = Pathfinder::new(graph, config.search_options());

    match (&args.token_in, &args.token_out, &args.amount) {
        (Some(token_in), Some(token_out), Some(amount)) => {
            let token_in = config::parse_address(token_in)?;
            let token_out = config::parse_address(token_out)?;
            let amount_in = config::parse_amount(amount)?;
            run_quote(&config, &pathfinder, token_in, token_out, amount_in).await
        }
        (None, None, None) => run_demo(&pathfinder),
        _ => Err(RouterError::ConfigError(
            "--token-in, --token-out and --amount must be given together".to_string(),
        )),
    }
}

fn quote_service(config: &Config) -> Result<Box<dyn QuoteService>> {
    match (&config.rpc_url, config.quote_router) {
        (Some(rpc_url), Some(router)) => {
            info!("Quoting through {} at {}", router, rpc_url);
            let mut client = RpcQuoteClient::new(rpc_url.clone(), router, config.quote_timeout)?;
            if let Some(caller) = config.caller {
                client = client.with_caller(caller);
            }
            Ok(Box::new(client))
        }
        _ => {
            warn!("No RPC endpoint configured, quotes are fee-only estimates");
            Ok(Box::new(OfflineQuoter))
        }
    }
}

#[derive(Serialize)]
struct QuoteReport<'a> {
    search: &'a RouteSearch,
    best_quote: &'a MultiHopQuote,
    degraded: bool,
}

async fn run_quote(
    config: &Config,
    pathfinder: &Pathfinder,
    token_in: alloy_primitives::Address,
    token_out: alloy_primitives::Address,
    amount_in: alloy_primitives::U256,
) -> Result<()> {
    info!("Finding routes for swap:");
    info!("   Token In:  {}", token_in);
    info!("   Token Out: {}", token_out);
    info!("   Amount:    {}", amount_in);
    info!("   Max Hops:  {}", config.max_hops);

    let search = pathfinder.find_routes(&token_in, &token_out);

    let Some(best_route) = &search.best_route else {
        error!("No route found for this token pair");
        return Err(RouterError::NoRouteFound);
    };

    info!(
        "Found {} candidate route(s), cheapest: {}",
        search.alternatives.len() + 1,
        format_route(best_route)
    );
    if search.has_direct_route && !best_route.is_direct() {
        info!("A direct pool exists, but a multi-hop route is cheaper");
    }

    let quoter = RouteQuoter::with_settings(quote_service(config)?, config.quote_settings());
    let routes: Vec<Route> = search.routes().cloned().collect();

    let quote = quoter
        .best_quote(&routes, amount_in)
        .await
        .ok_or(RouterError::NoRouteFound)?;

    if config.json {
        let report = QuoteReport {
            search: &search,
            best_quote: &quote,
            degraded: quote.is_degraded(),
        };
        let rendered = serde_json::to_string_pretty(&report).map_err(anyhow::Error::from)?;
        println!("{}", rendered);
    } else {
        print_quote(&quote);
    }

    Ok(())
}

fn run_demo(pathfinder: &Pathfinder) -> Result<()> {
    info!("Running in demo mode");
    info!("   Use --token-in, --token-out, and --amount to quote a swap");

    let tokens = pathfinder.graph().all_tokens();
    info!("\nRoutable tokens:");
    for token in &tokens {
        info!(
            "   {} ({} pools)",
            token,
            pathfinder.graph().edges_for(token).len()
        );
    }

    let (Some(token_a), Some(token_b)) = (tokens.first(), tokens.last()) else {
        warn!("Pool graph is empty, nothing to route");
        return Ok(());
    };

    let search = pathfinder.find_routes(token_a, token_b);
    info!("\nRoutes {} -> {}:", token_a, token_b);
    info!("   Direct pool available: {}", search.has_direct_route);
    for (idx, route) in search.routes().enumerate() {
        info!(
            "   {}. {} (fee {:.2}%, {} hops)",
            idx + 1,
            format_route(route),
            route.total_fee as f64 / 10_000.0,
            route.hop_count()
        );
    }

    info!("\nDemo complete!");
    Ok(())
}

fn print_quote(quote: &MultiHopQuote) {
    info!("\nBest Route Found:");
    info!("   Path:          {}", format_route(&quote.route));
    info!("   Input Amount:  {}", quote.amount_in);
    info!("   Output Amount: {}", quote.amount_out);
    info!(
        "   Slippage:      {:.2}%",
        quote.slippage_bps as f64 / 100.0
    );
    info!(
        "   Price Impact:  {:.2}%",
        quote.price_impact_bps as f64 / 100.0
    );
    info!("   Gas Estimate:  {}", quote.gas_estimate);
    info!("   Hops:          {}", quote.route.hop_count());

    for (idx, hop) in quote.hops.iter().enumerate() {
        info!("\n   Hop {}:", idx + 1);
        info!("      Pool:          {}", hop.pool_id);
        info!("      Amount In:     {}", hop.amount_in);
        info!("      Amount Out:    {}", hop.amount_out);
        info!(
            "      Price Impact:  {:.2}%",
            hop.price_impact_bps as f64 / 100.0
        );
        if hop.source == QuoteSource::Estimated {
            info!("      Source:        fee-only estimate");
        }
    }

    if quote.is_degraded() {
        warn!(
            "{} of {} hops could not be quoted live",
            quote.estimated_hops(),
            quote.hops.len()
        );
    }
}
