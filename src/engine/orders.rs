// 5.3: graduated exit orders. a forced exit is laddered across four price
// levels straddling the book instead of dumped as one order, sized against
// the market's daily volume so the liquidation itself cannot move the market
// through the risk limit.

use super::core::LiquidationEngine;
use crate::account::AccountData;
use crate::actions::{Action, ActionKind};
use crate::rounding::{round_down_to_tick, round_to_nearest_tick};
use crate::types::{approx_f64, decimal_from_f64, Side};
use tracing::warn;

impl LiquidationEngine {
    // 5.3.1: per-position sizing. full position when it is dust (<= $1k
    // equivalent), the $1k reference size up to 10x that, otherwise 10% of the
    // position; then capped by ADV participation and floored above the
    // exchange minimum.
    pub(crate) fn generate_sell_orders(&self, account: &AccountData, max_adv_frac: f64) -> Vec<Action> {
        let trader_id = account.cache.profile_id;
        let mut orders = Vec::with_capacity(account.positions.len() * 4);

        for pos in &account.positions {
            let Some(market) = account.market(&pos.market_id) else {
                warn!(market = %pos.market_id, trader = %trader_id, "position without market snapshot");
                continue;
            };

            let mut best_ask = approx_f64(market.best_ask);
            let mut best_bid = approx_f64(market.best_bid);
            // one-sided book: borrow the surviving side. fully empty: nothing
            // sane to price against, skip.
            if best_ask <= 0.0 && best_bid > 0.0 {
                best_ask = best_bid;
            } else if best_bid <= 0.0 && best_ask > 0.0 {
                best_bid = best_ask;
            }
            if best_bid <= 0.0 {
                continue;
            }

            let fair = approx_f64(market.fair_price);
            let one_k_size = 1000.0 / fair;
            let pos_size = approx_f64(pos.size);

            let mut order_sz = match pos_size {
                s if s <= 0.0 => continue,
                s if s <= one_k_size => s,
                s if s <= 10.0 * one_k_size => one_k_size,
                s => s * 0.1,
            };

            let max_liq_sz = approx_f64(market.average_daily_volume_q) * max_adv_frac;
            if order_sz > max_liq_sz {
                order_sz = max_liq_sz;
            }

            let min_order = approx_f64(market.min_order);
            let tick = approx_f64(market.min_tick);
            if order_sz < min_order * self.params().min_order_floor_mult {
                order_sz = min_order * self.params().min_order_floor_mult;
            }

            let prices = exit_price_ladder(
                pos.side,
                best_bid,
                best_ask,
                tick,
                fair,
                self.params().risk_limit_frac,
            );

            if order_sz <= pos_size {
                // ladder the target across the four levels
                let slices = calc_sell_order_slices(order_sz, min_order);
                for (slice, price) in slices.iter().zip(prices.iter()) {
                    if *slice > 0.0 {
                        orders.push(Action {
                            kind: ActionKind::PlaceSellOrders,
                            trader_id,
                            market_id: pos.market_id.clone(),
                            size: decimal_from_f64(*slice),
                            price: decimal_from_f64(*price),
                        });
                    }
                }
            } else if pos_size >= min_order {
                // the floored target exceeds what is left: close the whole
                // position in one order at the innermost level.
                orders.push(Action {
                    kind: ActionKind::PlaceSellOrders,
                    trader_id,
                    market_id: pos.market_id.clone(),
                    size: pos.size,
                    price: decimal_from_f64(prices[3]),
                });
            }
        }
        orders
    }
}

// 5.3.2: four candidate prices, one tick apart, straddling the book. every
// level is clamped at the risk limit price (fair -1% selling, fair +1%
// buying) so a stale book cannot pull the exit through fair.
fn exit_price_ladder(
    side: Side,
    best_bid: f64,
    best_ask: f64,
    tick: f64,
    fair_price: f64,
    risk_limit_frac: f64,
) -> [f64; 4] {
    match side {
        Side::Long => {
            let risk_limit = round_to_nearest_tick((1.0 - risk_limit_frac) * fair_price, tick);
            [
                (best_ask + tick).max(risk_limit),
                best_ask.max(risk_limit),
                (best_bid + tick).max(risk_limit),
                best_bid.max(risk_limit),
            ]
        }
        Side::Short => {
            let risk_limit = round_to_nearest_tick((1.0 + risk_limit_frac) * fair_price, tick);
            [
                (best_bid - tick).min(risk_limit),
                best_bid.min(risk_limit),
                (best_ask - tick).min(risk_limit),
                best_ask.min(risk_limit),
            ]
        }
    }
}

/// Three equal fifths rounded down to the size tick, with the rounding
/// deficit folded into the double-size fourth slice. The slices sum back to
/// the (tick-aligned) order size.
pub fn calc_sell_order_slices(order_sz: f64, tick: f64) -> [f64; 4] {
    let rounded_fifth = round_down_to_tick(order_sz * 0.2, tick);
    let total_sz = rounded_fifth * 5.0;
    let deficit = round_down_to_tick(order_sz - total_sz, tick);
    [
        rounded_fifth,
        rounded_fifth,
        rounded_fifth,
        rounded_fifth * 2.0 + deficit,
    ]
}
