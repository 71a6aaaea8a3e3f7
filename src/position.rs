// 2.0: open position snapshot. pnl = size * (exit - entry), sign-flipped for shorts.
// one account holds at most one position per market.

use crate::types::{approx_f64, MarketId, ProfileId, Side};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub market_id: MarketId,
    pub profile_id: ProfileId,
    pub side: Side,
    /// Unsigned size in base currency; direction lives in `side`.
    pub size: Decimal,
    pub entry_price: Decimal,
    /// Fair price as of the snapshot.
    pub fair_price: Decimal,
}

impl Position {
    // 2.1: paper gain at a hypothetical exit. strictly positive means "winning"
    // for clawback classification.
    pub fn unrealized_pnl(&self, exit_price: f64) -> f64 {
        calc_unrealized_pnl(approx_f64(self.size), approx_f64(self.entry_price), exit_price, self.side)
    }
}

pub fn calc_unrealized_pnl(size: f64, entry_price: f64, exit_price: f64, side: Side) -> f64 {
    match side {
        Side::Long => size * (exit_price - entry_price),
        Side::Short => size * (entry_price - exit_price),
    }
}
