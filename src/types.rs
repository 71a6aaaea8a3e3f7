// 1.0: all the primitives live here. nothing in the engine works without these types.
// IDs, sides, profile states, timestamps. each is a newtype so the compiler catches mixups.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProfileId(pub u64);

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// markets are keyed by symbol, e.g. "BTC-USD"
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MarketId(pub String);

impl MarketId {
    pub fn new(symbol: &str) -> Self {
        Self(symbol.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MarketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Long = profit when price goes up. Short = profit when price goes down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Long,
    Short,
}

impl Side {
    pub fn opposite(&self) -> Self {
        match self {
            Side::Long => Side::Short,
            Side::Short => Side::Long,
        }
    }
}

// 1.1: who owns the account. insurance is special: it is never liquidated,
// vaults get flagged to the caller when they are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProfileType {
    Trader,
    Vault,
    Insurance,
}

// 1.2: liquidation state machine. transitions are owned by the external store,
// driven by the liquidation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProfileStatus {
    Active,
    Liquidating,
}

// 1.3: microsecond timestamp. the store records last-liquidation-check times in micros.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimestampMicros(pub i64);

impl TimestampMicros {
    pub fn now() -> Self {
        Self(chrono::Utc::now().timestamp_micros())
    }

    pub fn from_micros(us: i64) -> Self {
        Self(us)
    }

    pub fn as_micros(&self) -> i64 {
        self.0
    }
}

// 1.4: the numeric boundary. risk ratios are dimensionless comparisons against
// fixed thresholds, so they travel as f64. everything currency-denominated
// enters and leaves as Decimal.

/// Lossy read of a store decimal for ratio/size arithmetic.
pub fn approx_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

/// Money-bearing output of an f64 computation. NaN/infinity collapse to zero
/// rather than poisoning a downstream batch.
pub fn decimal_from_f64(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}
