//! Quote arithmetic: price impact, fee-only estimates and slippage in basis points

use alloy_primitives::U256;

/// Basis point denominator (10000 bps = 100%)
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Convert a fee tier (hundredths of a bp) to whole basis points, rounding half up
///
/// # Examples
/// 3000 (0.30%) → 30, 500 → 5, 50 → 1
pub fn fee_to_bps(fee: u32) -> u32 {
    fee.saturating_add(50) / 100
}

/// Output shortfall relative to input, in basis points
///
/// Price impact = round((amount_in - amount_out) * 10000 / amount_in)
///
/// # Returns
/// 0 when `amount_in` is zero or the output is not smaller than the input,
/// otherwise a value in `1..=10000`
pub fn calculate_price_impact(amount_in: U256, amount_out: U256) -> u32 {
    if amount_in.is_zero() || amount_out >= amount_in {
        return 0;
    }

    let mut diff = amount_in - amount_out;
    let mut amount_in = amount_in;

    // Keep diff * 20000 and amount_in * 2 within 256 bits
    let shift = amount_in.bit_len().saturating_sub(240);
    if shift > 0 {
        amount_in >>= shift;
        diff >>= shift;
    }

    let denominator = U256::from(BPS_DENOMINATOR);
    let two = U256::from(2u8);
    let impact = (diff * denominator * two + amount_in) / (amount_in * two);

    u32::try_from(impact).unwrap_or(BPS_DENOMINATOR)
}

/// Fee-only output estimate used when the quoting service cannot answer
///
/// amount_out = amount_in * (10000 - fee) / 10000, floored at zero when the
/// fee exceeds the denominator.
pub fn estimate_amount_out(amount_in: U256, fee: u32) -> U256 {
    let kept = U256::from(BPS_DENOMINATOR.saturating_sub(fee));
    let denominator = U256::from(BPS_DENOMINATOR);

    match amount_in.checked_mul(kept) {
        Some(scaled) => scaled / denominator,
        None => amount_in / denominator * kept,
    }
}

/// Price impact reported alongside a fee-only estimate
pub fn estimate_price_impact(fee: u32) -> u32 {
    fee_to_bps(fee)
}

/// Per-hop slippage: the fee in bps plus the hop's price impact
pub fn hop_slippage_bps(fee: u32, price_impact_bps: u32) -> u32 {
    fee_to_bps(fee).saturating_add(price_impact_bps)
}

/// Gas estimate for a route of `hop_count` hops
pub fn gas_estimate(gas_per_hop: u64, hop_count: usize) -> u64 {
    gas_per_hop.saturating_mul(hop_count as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn u(v: u64) -> U256 {
        U256::from(v)
    }

    #[test]
    fn test_fee_to_bps_rounding() {
        assert_eq!(fee_to_bps(3000), 30);
        assert_eq!(fee_to_bps(500), 5);
        assert_eq!(fee_to_bps(100), 1);
        assert_eq!(fee_to_bps(50), 1);
        assert_eq!(fee_to_bps(49), 0);
        assert_eq!(fee_to_bps(0), 0);
    }

    #[test]
    fn test_price_impact_basic() {
        // 1% shortfall
        assert_eq!(calculate_price_impact(u(1_000_000), u(990_000)), 100);
        // 0.3% shortfall
        assert_eq!(calculate_price_impact(u(1_000_000), u(997_000)), 30);
    }

    #[test]
    fn test_price_impact_rounds_half_up() {
        // 0.5 bps rounds up to 1
        assert_eq!(calculate_price_impact(u(20_000), u(19_999)), 1);
        // 0.4 bps rounds down to 0
        assert_eq!(calculate_price_impact(u(25_000), u(24_999)), 0);
    }

    #[test]
    fn test_price_impact_never_negative() {
        assert_eq!(calculate_price_impact(u(1_000), u(2_000)), 0);
        assert_eq!(calculate_price_impact(u(1_000), u(1_000)), 0);
    }

    #[test]
    fn test_price_impact_zero_input() {
        assert_eq!(calculate_price_impact(U256::ZERO, u(5)), 0);
    }

    #[test]
    fn test_price_impact_total_loss() {
        assert_eq!(calculate_price_impact(u(1_000), U256::ZERO), 10_000);
        assert_eq!(calculate_price_impact(U256::MAX, U256::ZERO), 10_000);
    }

    #[test]
    fn test_price_impact_huge_amounts() {
        let amount_in = U256::MAX;
        let amount_out = amount_in / u(2);
        assert_eq!(calculate_price_impact(amount_in, amount_out), 5_000);
    }

    #[test]
    fn test_estimate_amount_out() {
        assert_eq!(estimate_amount_out(u(1_000_000), 3000), u(700_000));
        assert_eq!(estimate_amount_out(u(1_000_000), 0), u(1_000_000));
        assert_eq!(estimate_amount_out(u(1_000_000), 10_000), U256::ZERO);
        assert_eq!(estimate_amount_out(u(1_000_000), 20_000), U256::ZERO);
        assert_eq!(estimate_amount_out(U256::ZERO, 3000), U256::ZERO);
    }

    #[test]
    fn test_estimate_amount_out_no_overflow() {
        let out = estimate_amount_out(U256::MAX, 3000);
        assert!(out < U256::MAX);
        assert!(out > U256::MAX / u(2));
    }

    #[test]
    fn test_estimate_price_impact() {
        assert_eq!(estimate_price_impact(3000), 30);
        assert_eq!(estimate_price_impact(500), 5);
    }

    #[test]
    fn test_hop_slippage() {
        assert_eq!(hop_slippage_bps(3000, 12), 42);
        assert_eq!(hop_slippage_bps(500, 0), 5);
    }

    #[test]
    fn test_gas_estimate() {
        assert_eq!(gas_estimate(150_000, 0), 0);
        assert_eq!(gas_estimate(150_000, 3), 450_000);
        assert_eq!(gas_estimate(u64::MAX, 2), u64::MAX);
    }

    // Property-based tests
    proptest! {
        #[test]
        fn prop_price_impact_bounded(
            amount_in in 1u128..u128::MAX,
            amount_out in 0u128..u128::MAX,
        ) {
            let impact = calculate_price_impact(U256::from(amount_in), U256::from(amount_out));
            prop_assert!(impact <= BPS_DENOMINATOR);
        }

        #[test]
        fn prop_estimate_never_exceeds_input(
            amount_in in 0u128..u128::MAX,
            fee in 0u32..1_000_000,
        ) {
            let out = estimate_amount_out(U256::from(amount_in), fee);
            prop_assert!(out <= U256::from(amount_in));
        }

        #[test]
        fn prop_higher_fee_lower_estimate(
            amount_in in 1u128..u128::MAX,
            fee in 0u32..9_000,
            bump in 1u32..1_000,
        ) {
            let low_fee = estimate_amount_out(U256::from(amount_in), fee);
            let high_fee = estimate_amount_out(U256::from(amount_in), fee + bump);
            prop_assert!(high_fee <= low_fee);
        }
    }
}
