//! Token metadata constants for the destination ledger.

/// Token identifier on the destination ledger.
pub const TOKEN_ID: &str = "alpha";

/// Token display name; also the `coin` field of the upstream mint payload.
pub const TOKEN_NAME: &str = "alpha";

/// Token symbol.
pub const TOKEN_SYMBOL: &str = "ALPHA";

/// Decimal places of the token.
pub const TOKEN_DECIMALS: u8 = 8;

/// Human-readable token description.
pub const TOKEN_DESCRIPTION: &str =
    "Alpha L1 coins redeemed one-to-one on the destination ledger";

/// Smallest units per coin.
pub const SATOSHIS_PER_COIN: u64 = 100_000_000;

/// Convert a satoshi amount to coin units for display and the mint payload.
///
/// The integer form stays authoritative end-to-end; this conversion is never
/// used for equality checks.
pub fn satoshis_to_coins(satoshis: u64) -> f64 {
    satoshis as f64 / SATOSHIS_PER_COIN as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coin_conversion() {
        assert_eq!(satoshis_to_coins(150_000_000), 1.5);
        assert_eq!(satoshis_to_coins(0), 0.0);
        assert_eq!(satoshis_to_coins(1), 0.00000001);
    }
}
