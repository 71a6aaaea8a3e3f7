//! Account risk snapshot.
//!
//! `AccountRiskCache` is produced and owned by the external store; this core
//! only reads it. `AccountData` aggregates one cache with the account's open
//! positions and the markets needed to price them, built fresh for each
//! evaluation and discarded afterwards.

use crate::market::Market;
use crate::position::Position;
use crate::types::{approx_f64, MarketId, ProfileId, ProfileStatus, ProfileType, TimestampMicros};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountRiskCache {
    pub profile_id: ProfileId,
    pub profile_type: ProfileType,
    pub status: ProfileStatus,
    /// Equity / total notional, a signed fraction. The primary risk signal.
    pub account_margin: Decimal,
    pub account_equity: Decimal,
    pub total_notional: Decimal,
    pub last_liq_check: TimestampMicros,
}

impl AccountRiskCache {
    pub fn margin(&self) -> f64 {
        approx_f64(self.account_margin)
    }
}

/// One account's full evaluation input: risk cache, open positions, and a
/// market map covering exactly the markets those positions are in.
#[derive(Debug, Clone)]
pub struct AccountData {
    pub cache: AccountRiskCache,
    pub positions: Vec<Position>,
    pub markets: HashMap<MarketId, Market>,
}

impl AccountData {
    pub fn market(&self, id: &MarketId) -> Option<&Market> {
        self.markets.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Side;
    use rust_decimal_macros::dec;

    fn snapshot_market(symbol: &str) -> Market {
        Market {
            id: MarketId::new(symbol),
            best_bid: dec!(19999),
            best_ask: dec!(20000),
            fair_price: dec!(20000),
            average_daily_volume_q: dec!(10_000_000),
            min_order: dec!(0.01),
            min_tick: dec!(0.01),
        }
    }

    #[test]
    fn account_data_maps_held_markets() {
        let market = snapshot_market("BTC-USD");
        let position = Position {
            market_id: market.id.clone(),
            profile_id: ProfileId(3),
            side: Side::Long,
            size: dec!(1),
            entry_price: dec!(21000),
            fair_price: dec!(20000),
        };
        let account = AccountData {
            cache: AccountRiskCache {
                profile_id: ProfileId(3),
                profile_type: ProfileType::Trader,
                status: ProfileStatus::Active,
                account_margin: dec!(0.025),
                account_equity: dec!(500),
                total_notional: dec!(20000),
                last_liq_check: TimestampMicros::from_micros(0),
            },
            positions: vec![position.clone()],
            markets: HashMap::from([(market.id.clone(), market)]),
        };

        assert!((account.cache.margin() - 0.025).abs() < 1e-12);
        assert!(account.market(&position.market_id).is_some());
        assert!(account.market(&MarketId::new("ETH-USD")).is_none());
    }
}
