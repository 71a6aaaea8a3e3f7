// 5.1: the decision ladder. margin >= 0.03: healthy, nothing to do.
// [0.02, 0.03): waterfall-1, graduated sell orders against each position.
// below 0.02: waterfall-3, insurance takes every position over at the zero price.

use super::params::EngineParams;
use crate::account::{AccountData, AccountRiskCache};
use crate::actions::{Action, ActionKind};
use crate::position::Position;
use crate::time::is_interval_passed_micros;
use crate::types::{approx_f64, decimal_from_f64, ProfileId, ProfileStatus, ProfileType, Side};
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct LiquidationEngine {
    params: EngineParams,
}

impl LiquidationEngine {
    pub fn new(params: EngineParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &EngineParams {
        &self.params
    }

    pub fn below_liquidation_margin(&self, margin: f64) -> bool {
        margin < self.params.liquidation_margin
    }

    /// A liquidating account whose margin has recovered: the liquidation
    /// should be closed out.
    pub fn is_liquidation_ending(&self, cache: &AccountRiskCache) -> bool {
        cache.status == ProfileStatus::Liquidating && cache.margin() >= self.params.liquidation_margin
    }

    /// A liquidating account in the selloff band gets one waterfall interval
    /// between checks; acting every tick would thrash its open orders.
    pub fn should_liquidation_have_more_time(&self, cache: &AccountRiskCache) -> bool {
        let interval_passed =
            is_interval_passed_micros(cache.last_liq_check, self.params.waterfall_interval);
        cache.status == ProfileStatus::Liquidating
            && cache.margin() < self.params.liquidation_margin
            && cache.margin() >= self.params.takeover_margin
            && !interval_passed
    }

    /// The corrective batch for one account, plus any vault ids the caller
    /// must flag as liquidated.
    pub fn required_actions(&self, account: &AccountData) -> (Vec<Action>, Vec<ProfileId>) {
        let mut actions = Vec::new();
        let mut liquidated_vaults = Vec::new();

        let margin = account.cache.margin();
        if margin < self.params.liquidation_margin {
            if margin >= self.params.takeover_margin {
                actions = self.waterfall1(account);
            } else {
                actions = self.waterfall3(account);
                if account.cache.profile_type == ProfileType::Vault {
                    liquidated_vaults.push(account.cache.profile_id);
                }
            }
        }
        (actions, liquidated_vaults)
    }

    pub fn insurance_selloff_actions(&self, insurance: &AccountData) -> Vec<Action> {
        self.generate_sell_orders(insurance, self.params.insurance_max_adv_frac)
    }

    fn waterfall1(&self, account: &AccountData) -> Vec<Action> {
        self.generate_sell_orders(account, self.params.trader_max_adv_frac)
    }

    // 5.2: full takeover. every position moves to insurance at the price that
    // consumes exactly the account's remaining margin.
    fn waterfall3(&self, account: &AccountData) -> Vec<Action> {
        let margin = account.cache.margin();
        let mut actions = Vec::with_capacity(account.positions.len());

        for pos in &account.positions {
            let zp = calc_zp(pos, margin);
            info!(
                market = %pos.market_id,
                trader = %pos.profile_id,
                size = approx_f64(pos.size),
                margin,
                zp,
                "takeover"
            );

            actions.push(Action {
                kind: ActionKind::InsuranceTakeover,
                trader_id: account.cache.profile_id,
                market_id: pos.market_id.clone(),
                size: pos.size,
                price: decimal_from_f64(zp),
            });
        }
        actions
    }
}

/// The zero price: the transfer price at which the position moves to/from
/// insurance consuming exactly the account's remaining margin. Marked down
/// for longs, up for shorts.
pub fn calc_zp(position: &Position, margin: f64) -> f64 {
    let fair = approx_f64(position.fair_price);
    match position.side {
        Side::Long => fair * (1.0 - margin),
        Side::Short => fair * (1.0 + margin),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::market::Market;
    use crate::types::{MarketId, TimestampMicros};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    pub(crate) fn test_market(symbol: &str) -> Market {
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

    pub(crate) fn test_account(
        profile_type: ProfileType,
        status: ProfileStatus,
        margin: Decimal,
        positions: Vec<Position>,
        markets: Vec<Market>,
    ) -> AccountData {
        AccountData {
            cache: AccountRiskCache {
                profile_id: ProfileId(5),
                profile_type,
                status,
                account_margin: margin,
                account_equity: dec!(500),
                total_notional: dec!(20000),
                last_liq_check: TimestampMicros::from_micros(0),
            },
            positions,
            markets: markets.into_iter().map(|m| (m.id.clone(), m)).collect(),
        }
    }

    fn long_btc(size: Decimal) -> Position {
        Position {
            market_id: MarketId::new("BTC-USD"),
            profile_id: ProfileId(5),
            side: Side::Long,
            size,
            entry_price: dec!(21000),
            fair_price: dec!(20000),
        }
    }

    #[test]
    fn healthy_margin_requires_nothing() {
        let engine = LiquidationEngine::default();
        let account = test_account(
            ProfileType::Trader,
            ProfileStatus::Active,
            dec!(0.05),
            vec![long_btc(dec!(1))],
            vec![test_market("BTC-USD")],
        );
        let (actions, vaults) = engine.required_actions(&account);
        assert!(actions.is_empty());
        assert!(vaults.is_empty());
    }

    #[test]
    fn selloff_band_produces_sell_orders_only() {
        let engine = LiquidationEngine::default();
        let account = test_account(
            ProfileType::Trader,
            ProfileStatus::Liquidating,
            dec!(0.025),
            vec![long_btc(dec!(50))],
            vec![test_market("BTC-USD")],
        );
        let (actions, vaults) = engine.required_actions(&account);
        assert!(!actions.is_empty());
        assert!(actions.iter().all(|a| a.kind == ActionKind::PlaceSellOrders));
        assert!(vaults.is_empty());
    }

    #[test]
    fn takeover_band_hands_positions_to_insurance() {
        let engine = LiquidationEngine::default();
        let account = test_account(
            ProfileType::Trader,
            ProfileStatus::Liquidating,
            dec!(0.01),
            vec![long_btc(dec!(50))],
            vec![test_market("BTC-USD")],
        );
        let (actions, vaults) = engine.required_actions(&account);
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].kind, ActionKind::InsuranceTakeover);
        assert_eq!(actions[0].size, dec!(50));
        assert!(vaults.is_empty());
    }

    #[test]
    fn liquidated_vault_is_reported() {
        let engine = LiquidationEngine::default();
        let account = test_account(
            ProfileType::Vault,
            ProfileStatus::Liquidating,
            dec!(0.015),
            vec![long_btc(dec!(2))],
            vec![test_market("BTC-USD")],
        );
        let (_, vaults) = engine.required_actions(&account);
        assert_eq!(vaults, vec![ProfileId(5)]);
    }

    #[test]
    fn required_actions_is_idempotent() {
        let engine = LiquidationEngine::default();
        let account = test_account(
            ProfileType::Trader,
            ProfileStatus::Active,
            dec!(0.025),
            vec![long_btc(dec!(50))],
            vec![test_market("BTC-USD")],
        );
        let first = engine.required_actions(&account);
        let second = engine.required_actions(&account);
        assert_eq!(first.0, second.0);
        assert_eq!(first.1, second.1);
    }

    #[test]
    fn zero_price_marks_longs_down_and_shorts_up() {
        let long = Position {
            market_id: MarketId::new("BTC-USD"),
            profile_id: ProfileId(1),
            side: Side::Long,
            size: dec!(1),
            entry_price: dec!(100),
            fair_price: dec!(100),
        };
        assert_eq!(calc_zp(&long, 0.03), 97.0);

        let short = Position { side: Side::Short, ..long };
        assert_eq!(calc_zp(&short, 0.03), 103.0);
    }

    #[test]
    fn liquidation_ending_needs_recovered_margin() {
        let engine = LiquidationEngine::default();
        let recovered = test_account(
            ProfileType::Trader,
            ProfileStatus::Liquidating,
            dec!(0.04),
            vec![],
            vec![],
        );
        assert!(engine.is_liquidation_ending(&recovered.cache));

        let still_under = test_account(
            ProfileType::Trader,
            ProfileStatus::Liquidating,
            dec!(0.025),
            vec![],
            vec![],
        );
        assert!(!engine.is_liquidation_ending(&still_under.cache));

        let active = test_account(
            ProfileType::Trader,
            ProfileStatus::Active,
            dec!(0.04),
            vec![],
            vec![],
        );
        assert!(!engine.is_liquidation_ending(&active.cache));
    }

    #[test]
    fn more_time_only_in_selloff_band_within_interval() {
        let engine = LiquidationEngine::default();

        // just checked, still in the selloff band: defer
        let mut account = test_account(
            ProfileType::Trader,
            ProfileStatus::Liquidating,
            dec!(0.025),
            vec![],
            vec![],
        );
        account.cache.last_liq_check = TimestampMicros::now();
        assert!(engine.should_liquidation_have_more_time(&account.cache));

        // interval elapsed: process
        account.cache.last_liq_check =
            TimestampMicros::from_micros(TimestampMicros::now().as_micros() - 7_000_000);
        assert!(!engine.should_liquidation_have_more_time(&account.cache));

        // takeover band never gets more time
        account.cache.account_margin = dec!(0.01);
        account.cache.last_liq_check = TimestampMicros::now();
        assert!(!engine.should_liquidation_have_more_time(&account.cache));
    }
}
