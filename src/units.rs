//! Fixed-point and display formatting
//!
//! Contract prices come back as integers scaled by 10^18. Conversion to a
//! decimal string is exact integer arithmetic; the only lossy step is the
//! final display truncation.

use alloy_primitives::U256;

/// Decimals of the "wei to ether" scaling used by `vixTokensPrice`
pub const ETHER_DECIMALS: u8 = 18;

/// Format a fixed-point integer as a decimal string.
///
/// Trailing fractional zeros are trimmed but at least one fractional digit is
/// kept, so `1e18` with 18 decimals is `"1.0"` and `15e17` is `"1.5"`.
pub fn format_units(value: U256, decimals: u8) -> String {
    let scale = U256::from(10u64).pow(U256::from(decimals));
    let (int, frac) = value.div_rem(scale);

    let digits = frac.to_string();
    let width = decimals as usize;
    let padded = format!("{}{}", "0".repeat(width.saturating_sub(digits.len())), digits);
    let trimmed = padded.trim_end_matches('0');

    if trimmed.is_empty() {
        format!("{}.0", int)
    } else {
        format!("{}.{}", int, trimmed)
    }
}

/// `format_units` with 18 decimals
pub fn format_ether(value: U256) -> String {
    format_units(value, ETHER_DECIMALS)
}

/// Cut a decimal string down to at most `places` fractional digits.
///
/// Truncates, never rounds. `places == 0` drops the fraction entirely.
pub fn truncate_decimal(decimal: &str, places: usize) -> String {
    match decimal.split_once('.') {
        Some((int, _)) if places == 0 => int.to_string(),
        Some((int, frac)) if frac.len() > places => format!("{}.{}", int, &frac[..places]),
        _ => decimal.to_string(),
    }
}

/// Compact USD amount: `200000.0` -> `"200k$"`, `12_500_000.0` -> `"12.5M$"`
pub fn format_compact_usd(value: f64) -> String {
    const TIERS: [(f64, &str); 4] = [(1e9, "B"), (1e6, "M"), (1e3, "k"), (1.0, "")];

    let abs = value.abs();
    let mut tier = TIERS
        .iter()
        .position(|(divisor, _)| abs >= *divisor)
        .unwrap_or(TIERS.len() - 1);
    // 999.999 rounds to 1000.00 at this tier, so it belongs to the next one
    if tier > 0 && (abs / TIERS[tier].0 * 100.0).round() >= 100_000.0 {
        tier -= 1;
    }
    let (divisor, suffix) = TIERS[tier];

    let fixed = format!("{:.2}", value / divisor);
    let fixed = fixed.trim_end_matches('0').trim_end_matches('.');
    format!("{}{}$", fixed, suffix)
}
