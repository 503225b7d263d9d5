/// Futures transaction tax rate, 0.00002, expressed as `TAX_RATE_NUMERATOR / TAX_RATE_DENOMINATOR`.
pub const TAX_RATE_NUMERATOR: u64 = 2;
pub const TAX_RATE_DENOMINATOR: u64 = 100_000;

/// Tax on one side (buy or sell) of one contract, rounded up to the next whole unit.
pub fn single_side_tax(index_level: u64, point_value: i64) -> i64 {
    let point_value = point_value.max(0) as u64;
    let scaled = index_level
        .saturating_mul(point_value)
        .saturating_mul(TAX_RATE_NUMERATOR);
    let tax = scaled.div_ceil(TAX_RATE_DENOMINATOR);
    i64::try_from(tax).unwrap_or(i64::MAX)
}

/// Both sides of `trades` round trips for `units` contracts.
pub fn round_trip_tax(index_level: u64, point_value: i64, units: i64, trades: u32) -> i64 {
    single_side_tax(index_level, point_value)
        .saturating_mul(2)
        .saturating_mul(units)
        .saturating_mul(i64::from(trades))
}
