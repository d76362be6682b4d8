//! Pool catalog: the built-in pool list and TOML catalog loading

use crate::error::{Result, RouterError};
use crate::types::pool::Pool;
use alloy_primitives::{Address, address};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Marker carried by pools that take part in swap receipts.
/// Deployments override it through `routing.eligibility_marker`.
pub const DEFAULT_ELIGIBILITY_MARKER: Address =
    address!("0000000000000000000000000000000000000044");

/// Highest fee tier a pool can declare (1_000_000 = 100%)
pub const MAX_FEE: u32 = 1_000_000;

pub const WETH: Address = address!("4200000000000000000000000000000000000006");
pub const USDC: Address = address!("833589fCD6eDb6E08f4c7C32D4f71b54bdA02913");
pub const CBBTC: Address = address!("cbB7C0000aB88B473b1f5aFd9ef808440eed33Bf");
pub const DAI: Address = address!("50c5725949A6F0c72E6C4a641F24049A917DB0Cb");

/// On-disk catalog format
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub pools: Vec<Pool>,
}

/// The built-in pool list used for the default graph
pub fn default_pools() -> Vec<Pool> {
    let m = DEFAULT_ELIGIBILITY_MARKER;
    vec![
        Pool::new("weth-usdc-500", WETH, USDC, 500, 10, m),
        Pool::new("weth-usdc-3000", WETH, USDC, 3000, 60, m),
        Pool::new("cbbtc-weth-3000", CBBTC, WETH, 3000, 60, m),
        Pool::new("cbbtc-usdc-3000", CBBTC, USDC, 3000, 60, m),
        Pool::new("dai-usdc-100", DAI, USDC, 100, 1, m),
        Pool::new("dai-weth-3000", DAI, WETH, 3000, 60, m),
    ]
}

/// Read and validate a TOML catalog file
pub fn load_catalog(path: &Path) -> Result<Vec<Pool>> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        RouterError::CatalogError(format!("Failed to read {}: {}", path.display(), e))
    })?;
    parse_catalog(&contents)
}

/// Parse and validate a TOML catalog
pub fn parse_catalog(contents: &str) -> Result<Vec<Pool>> {
    let file: CatalogFile = toml::from_str(contents)
        .map_err(|e| RouterError::CatalogError(format!("Failed to parse catalog: {}", e)))?;
    validate_catalog(&file.pools)?;
    Ok(file.pools)
}

/// Reject catalogs where the same venue appears with two tick spacings
pub fn validate_catalog(pools: &[Pool]) -> Result<()> {
    let mut seen: HashMap<(Address, Address, u32), (i32, &str)> = HashMap::new();

    for pool in pools {
        if pool.token_a == pool.token_b {
            return Err(RouterError::CatalogError(format!(
                "pool {} trades {} against itself",
                pool.id, pool.token_a
            )));
        }

        if pool.fee > MAX_FEE {
            return Err(RouterError::CatalogError(format!(
                "pool {} has fee {} above the maximum of {}",
                pool.id, pool.fee, MAX_FEE
            )));
        }

        let venue = (pool.token0(), pool.token1(), pool.fee);
        match seen.get(&venue) {
            Some((spacing, id)) if *spacing != pool.tick_spacing => {
                return Err(RouterError::CatalogError(format!(
                    "pools {} and {} share fee tier {} but disagree on tick spacing ({} vs {})",
                    id, pool.id, pool.fee, spacing, pool.tick_spacing
                )));
            }
            Some(_) => {}
            None => {
                seen.insert(venue, (pool.tick_spacing, pool.id.as_str()));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"
[[pools]]
id = "a-b"
token_a = "0x000000000000000000000000000000000000000b"
token_b = "0x000000000000000000000000000000000000000A"
fee = 500
tick_spacing = 10
eligibility_marker = "0x0000000000000000000000000000000000000044"

[[pools]]
id = "b-c"
token_a = "0x000000000000000000000000000000000000000b"
token_b = "0x000000000000000000000000000000000000000c"
fee = 3000
tick_spacing = 60
eligibility_marker = "0x0000000000000000000000000000000000000000"
"#;

    #[test]
    fn test_default_catalog_is_valid() {
        let pools = default_pools();
        assert!(!pools.is_empty());
        assert!(validate_catalog(&pools).is_ok());
        assert!(pools.iter().all(|p| p.has_marker(&DEFAULT_ELIGIBILITY_MARKER)));
    }

    #[test]
    fn test_parse_catalog() {
        let pools = parse_catalog(CATALOG).unwrap();

        assert_eq!(pools.len(), 2);
        assert_eq!(pools[0].id, "a-b");
        assert_eq!(pools[0].fee, 500);
        assert_eq!(pools[0].token0(), address!("000000000000000000000000000000000000000a"));
        assert!(pools[0].has_marker(&DEFAULT_ELIGIBILITY_MARKER));
        assert!(!pools[1].has_marker(&DEFAULT_ELIGIBILITY_MARKER));
    }

    #[test]
    fn test_parse_empty_catalog() {
        let pools = parse_catalog("").unwrap();
        assert!(pools.is_empty());
    }

    #[test]
    fn test_unparseable_catalog() {
        let result = parse_catalog("[[pools]]\nid = 7\n");
        assert!(matches!(result, Err(RouterError::CatalogError(_))));
    }

    #[test]
    fn test_conflicting_tick_spacing_rejected() {
        let a = address!("000000000000000000000000000000000000000a");
        let b = address!("000000000000000000000000000000000000000b");
        let pools = vec![
            Pool::new("first", a, b, 3000, 60, DEFAULT_ELIGIBILITY_MARKER),
            Pool::new("second", b, a, 3000, 10, Address::ZERO),
        ];

        let err = validate_catalog(&pools).unwrap_err();
        assert!(err.to_string().contains("tick spacing"));

        // Same venue with matching spacing is fine
        let pools = vec![
            Pool::new("first", a, b, 3000, 60, DEFAULT_ELIGIBILITY_MARKER),
            Pool::new("second", b, a, 3000, 60, Address::ZERO),
        ];
        assert!(validate_catalog(&pools).is_ok());
    }

    #[test]
    fn test_self_pool_rejected() {
        let a = address!("000000000000000000000000000000000000000a");
        let pools = vec![Pool::new("loop", a, a, 3000, 60, Address::ZERO)];
        assert!(validate_catalog(&pools).is_err());
    }

    #[test]
    fn test_oversized_fee_rejected() {
        let contents = r#"
[[pools]]
id = "a-b"
token_a = "0x000000000000000000000000000000000000000a"
token_b = "0x000000000000000000000000000000000000000b"
fee = 3000000000
tick_spacing = 60
eligibility_marker = "0x0000000000000000000000000000000000000044"
"#;
        let err = parse_catalog(contents).unwrap_err();
        assert!(err.to_string().contains("above the maximum"));

        let a = address!("000000000000000000000000000000000000000a");
        let b = address!("000000000000000000000000000000000000000b");
        let pools = vec![Pool::new("full", a, b, MAX_FEE, 60, Address::ZERO)];
        assert!(validate_catalog(&pools).is_ok());
    }
}
