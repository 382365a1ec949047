//! Token normalization shared by the candidate generators

use crate::shared::types::MarketType;

/// Quote currency every CEX adapter trades against
pub const QUOTE: &str = "USDT";

const SEPARATORS: [char; 3] = ['-', '/', '_'];

/// Upper-cases the token, drops whitespace and a leading `$`, and rewrites
/// `-`, `/`, `_` to the venue separator (or removes them when the venue has
/// none).
pub fn normalize(token: &str, separator: Option<char>) -> String {
    token
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| !c.is_whitespace())
        .filter_map(|c| {
            if SEPARATORS.contains(&c) {
                separator
            } else {
                Some(c.to_ascii_uppercase())
            }
        })
        .collect()
}

/// Extracts the base asset from a free-form token.
///
/// Perpetual lookups drop every `PERP` marker first. Then any of the
/// `venue_suffixes` (e.g. `SWAP`, `UMCBL`) and the `USDT` quote are stripped
/// from the end, together with dangling separators, so the venue's canonical
/// suffix can be re-appended.
pub fn base_asset(
    token: &str,
    separator: Option<char>,
    market: MarketType,
    venue_suffixes: &[&str],
) -> String {
    let mut s = normalize(token, separator);
    if market == MarketType::Perp {
        s = s.replace("PERP", "");
    }

    let mut base = trim_separator(&s, separator);
    for &suffix in venue_suffixes {
        if let Some(rest) = base.strip_suffix(suffix) {
            base = trim_separator(rest, separator);
        }
    }
    if let Some(rest) = base.strip_suffix(QUOTE) {
        base = trim_separator(rest, separator);
    }
    base.to_string()
}

fn trim_separator(s: &str, separator: Option<char>) -> &str {
    match separator {
        Some(sep) => s.trim_matches(sep),
        None => s,
    }
}

/// Base asset of an already-resolved `{BASE}USDT`-style symbol, used by the
/// link builders
pub fn strip_quote(symbol: &str) -> String {
    let upper = symbol.trim().to_ascii_uppercase();
    match upper.strip_suffix(QUOTE) {
        Some(base) => base.trim_end_matches('_').to_string(),
        None => upper,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  eth / usdt ", None), "ETHUSDT");
        assert_eq!(normalize("eth/usdt", Some('-')), "ETH-USDT");
        assert_eq!(normalize("eth-usdt", Some('_')), "ETH_USDT");
        assert_eq!(normalize("$sol", None), "SOL");
        assert_eq!(normalize(" $SOL/USDT", Some('-')), "SOL-USDT");
    }

    #[test]
    fn test_base_asset_strips_quote_and_perp() {
        assert_eq!(base_asset("eth", None, MarketType::Spot, &[]), "ETH");
        assert_eq!(base_asset("ETHUSDT", None, MarketType::Spot, &[]), "ETH");
        assert_eq!(base_asset("BTC-PERP", None, MarketType::Perp, &[]), "BTC");
        assert_eq!(base_asset("BTC-PERP", Some('-'), MarketType::Perp, &[]), "BTC");
        assert_eq!(
            base_asset("btc-usdt-swap", Some('-'), MarketType::Perp, &["SWAP"]),
            "BTC"
        );
        assert_eq!(base_asset("ETH_USDT", Some('_'), MarketType::Spot, &[]), "ETH");
    }

    #[test]
    fn test_spot_keeps_perp_text() {
        assert_eq!(base_asset("PERPUSDT", None, MarketType::Spot, &[]), "PERP");
        assert_eq!(base_asset("PERPUSDT", None, MarketType::Perp, &[]), "");
    }

    #[test]
    fn test_strip_quote() {
        assert_eq!(strip_quote("ETHUSDT"), "ETH");
        assert_eq!(strip_quote("eth_usdt"), "ETH");
        assert_eq!(strip_quote("ETH"), "ETH");
    }
}
