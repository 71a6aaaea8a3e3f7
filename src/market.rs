//! Market snapshot data.
//!
//! A read-only view of one market as of the account snapshot: top of book,
//! fair price, and the liquidity/sizing limits that bound forced exits.

use crate::types::MarketId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Market {
    pub id: MarketId,
    pub best_bid: Decimal,
    pub best_ask: Decimal,
    pub fair_price: Decimal,
    /// Average daily traded notional in quote currency. Bounds forced
    /// liquidation order sizes to limit market impact.
    pub average_daily_volume_q: Decimal,
    /// Minimum order size
    pub min_order: Decimal,
    /// Tick size (minimum price increment)
    pub min_tick: Decimal,
}
