//! Configuration management

use crate::catalog::{self, DEFAULT_ELIGIBILITY_MARKER};
use crate::error::{Result, RouterError};
use crate::quoter::{DEFAULT_GAS_PER_HOP, QuoteSettings};
use crate::router::pathfinder::{DEFAULT_MAX_HOPS, DEFAULT_MAX_ROUTES, SearchOptions};
use crate::types::pool::Pool;
use alloy_primitives::{Address, U256};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Hop limits above this make the route enumeration explode
pub const MAX_HOPS_LIMIT: usize = 4;

const DEFAULT_QUOTE_TIMEOUT_MS: u64 = 5_000;

/// Command-line arguments
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "swap-router")]
#[command(about = "Multi-hop swap route finder and quoter", long_about = None)]
pub struct CliArgs {
    /// JSON-RPC URL used for live quotes
    #[arg(short, long)]
    pub rpc_url: Option<String>,

    /// Swap router contract simulated for quotes
    #[arg(long)]
    pub quote_router: Option<String>,

    /// Input token address
    #[arg(long)]
    pub token_in: Option<String>,

    /// Output token address
    #[arg(long)]
    pub token_out: Option<String>,

    /// Amount to swap (in token base units)
    #[arg(long)]
    pub amount: Option<String>,

    /// Maximum number of hops per route
    #[arg(long)]
    pub max_hops: Option<usize>,

    /// Maximum number of candidate routes to quote
    #[arg(long)]
    pub max_routes: Option<usize>,

    /// Pool catalog file (TOML, [[pools]] tables)
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Route through every pool, not only those carrying the eligibility marker
    #[arg(long)]
    pub all_pools: bool,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,

    /// Config file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Configuration file format
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub network: Option<NetworkConfig>,
    pub routing: Option<RoutingConfig>,
    pub quoting: Option<QuotingConfig>,
    pub pools: Option<Vec<Pool>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub rpc_url: Option<String>,
    pub quote_router: Option<Address>,
    pub caller: Option<Address>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    pub max_hops: Option<usize>,
    pub max_routes: Option<usize>,
    pub require_eligibility: Option<bool>,
    pub eligibility_marker: Option<Address>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotingConfig {
    pub timeout_ms: Option<u64>,
    pub gas_per_hop: Option<u64>,
}

/// Final configuration combining CLI args, config file, and defaults
#[derive(Debug, Clone)]
pub struct Config {
    pub rpc_url: Option<String>,
    pub quote_router: Option<Address>,
    pub caller: Option<Address>,
    pub max_hops: usize,
    pub max_routes: usize,
    /// Marker pools must carry to be routed through; `None` routes through every pool
    pub eligibility_marker: Option<Address>,
    pub quote_timeout: Duration,
    pub gas_per_hop: u64,
    pub pools: Vec<Pool>,
    pub json: bool,
    pub verbose: bool,
}

impl Config {
    /// Create config from CLI args
    pub fn from_args(args: CliArgs) -> Result<Self> {
        // Load config file if specified
        let config_file = match &args.config {
            Some(config_path) => Self::load_config_file(config_path)?,
            None => ConfigFile::default(),
        };
        Self::merge(args, config_file)
    }

    /// Merge CLI args over a parsed config file (priority: CLI > config file > default)
    pub fn merge(args: CliArgs, config_file: ConfigFile) -> Result<Self> {
        let network = config_file.network.as_ref();
        let routing = config_file.routing.as_ref();
        let quoting = config_file.quoting.as_ref();

        let rpc_url = args
            .rpc_url
            .clone()
            .or_else(|| network.and_then(|n| n.rpc_url.clone()));

        let quote_router = match &args.quote_router {
            Some(raw) => Some(parse_address(raw)?),
            None => network.and_then(|n| n.quote_router),
        };

        let caller = network.and_then(|n| n.caller);

        let max_hops = args
            .max_hops
            .or_else(|| routing.and_then(|r| r.max_hops))
            .unwrap_or(DEFAULT_MAX_HOPS);

        let max_routes = args
            .max_routes
            .or_else(|| routing.and_then(|r| r.max_routes))
            .unwrap_or(DEFAULT_MAX_ROUTES);

        let require_eligibility =
            !args.all_pools && routing.and_then(|r| r.require_eligibility).unwrap_or(true);
        let eligibility_marker = require_eligibility.then(|| {
            routing
                .and_then(|r| r.eligibility_marker)
                .unwrap_or(DEFAULT_ELIGIBILITY_MARKER)
        });

        let timeout_ms = quoting
            .and_then(|q| q.timeout_ms)
            .unwrap_or(DEFAULT_QUOTE_TIMEOUT_MS);

        let gas_per_hop = quoting
            .and_then(|q| q.gas_per_hop)
            .unwrap_or(DEFAULT_GAS_PER_HOP);

        // Determine pool catalog (priority: --catalog > inline [[pools]] > built-in)
        let pools = match (&args.catalog, config_file.pools) {
            (Some(path), _) => catalog::load_catalog(path)?,
            (None, Some(pools)) => {
                catalog::validate_catalog(&pools)?;
                pools
            }
            (None, None) => catalog::default_pools(),
        };

        // Validate
        if max_hops == 0 || max_hops > MAX_HOPS_LIMIT {
            return Err(RouterError::ConfigError(format!(
                "max_hops must be between 1 and {}",
                MAX_HOPS_LIMIT
            )));
        }
        if max_routes == 0 {
            return Err(RouterError::ConfigError(
                "max_routes must be at least 1".to_string(),
            ));
        }
        if timeout_ms == 0 {
            return Err(RouterError::ConfigError(
                "quoting.timeout_ms must be greater than 0".to_string(),
            ));
        }
        if rpc_url.is_some() && quote_router.is_none() {
            return Err(RouterError::ConfigError(
                "a quote router address is required when an RPC URL is set".to_string(),
            ));
        }

        Ok(Self {
            rpc_url,
            quote_router,
            caller,
            max_hops,
            max_routes,
            eligibility_marker,
            quote_timeout: Duration::from_millis(timeout_ms),
            gas_per_hop,
            pools,
            json: args.json,
            verbose: args.verbose,
        })
    }

    /// Load config file from path
    fn load_config_file(path: &PathBuf) -> Result<ConfigFile> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| RouterError::ConfigError(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&contents)
            .map_err(|e| RouterError::ConfigError(format!("Failed to parse config file: {}", e)))
    }

    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            max_hops: self.max_hops,
            max_routes: self.max_routes,
        }
    }

    pub fn quote_settings(&self) -> QuoteSettings {
        QuoteSettings {
            timeout: self.quote_timeout,
            gas_per_hop: self.gas_per_hop,
        }
    }

    /// Create default config for testing
    pub fn default_offline() -> Self {
        Self {
            rpc_url: None,
            quote_router: None,
            caller: None,
            max_hops: DEFAULT_MAX_HOPS,
            max_routes: DEFAULT_MAX_ROUTES,
            eligibility_marker: Some(DEFAULT_ELIGIBILITY_MARKER),
            quote_timeout: Duration::from_millis(DEFAULT_QUOTE_TIMEOUT_MS),
            gas_per_hop: DEFAULT_GAS_PER_HOP,
            pools: catalog::default_pools(),
            json: false,
            verbose: false,
        }
    }
}

/// Parse a hex address, accepting any letter case
pub fn parse_address(raw: &str) -> Result<Address> {
    Address::from_str(raw.trim()).map_err(|e| RouterError::InvalidAddress(format!("{}: {}", raw, e)))
}

/// Parse a decimal or 0x-prefixed amount
pub fn parse_amount(raw: &str) -> Result<U256> {
    let raw = raw.trim();
    let parsed = match raw.strip_prefix("0x") {
        Some(hex) => U256::from_str_radix(hex, 16),
        None => U256::from_str_radix(raw, 10),
    };
    parsed.map_err(|e| RouterError::InvalidAmount(format!("{}: {}", raw, e)))
}
