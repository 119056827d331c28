//! Miscellaneous helper utilities.

use std::str::FromStr;

use bigdecimal::BigDecimal;
use ethers::types::U256;
use num_bigint::{BigInt, Sign};
use tracing_subscriber::{EnvFilter, fmt};

use crate::errors::{AmmError, Result};

/// Initialize `tracing` subscriber with env-based filter.
///
/// If `RUST_LOG` is not set, defaults to `info` level.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

/// Raw base units -> human amount, e.g. `1_500_000` with 6 decimals -> `1.5`.
pub fn format_units(raw: U256, decimals: u8) -> BigDecimal {
    let digits = BigInt::from_bytes_be(Sign::Plus, &u256_to_be_bytes(raw));
    BigDecimal::new(digits, i64::from(decimals))
}

/// Human amount -> raw base units. Digits past `decimals` are truncated.
pub fn parse_units(human: &str, decimals: u8) -> Result<U256> {
    let value = BigDecimal::from_str(human.trim())
        .map_err(|e| AmmError::ParseAmount(format!("{human:?}: {e}")))?;
    // checked before truncation, which would turn tiny negatives into zero
    if value.sign() == Sign::Minus {
        return Err(AmmError::ParseAmount(format!("{human:?} is negative")));
    }
    let (digits, _) = value.with_scale(i64::from(decimals)).as_bigint_and_exponent();
    let (_, bytes) = digits.to_bytes_be();
    if bytes.len() > 32 {
        return Err(AmmError::Overflow("amount does not fit in 256 bits"));
    }
    Ok(U256::from_big_endian(&bytes))
}

fn u256_to_be_bytes(value: U256) -> [u8; 32] {
    let mut buf = [0u8; 32];
    value.to_big_endian(&mut buf);
    buf
}
