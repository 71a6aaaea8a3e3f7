// 5.4: clawback allocation. when the insurance fund must shed a losing
// position and the book cannot absorb it, the deficit is debited from
// profitable counter-side positions in proportion to their size. three passes:
// proportional, then capacity-weighted for the rounding shortfall, then greedy
// for whatever residue is left. the total clawed never exceeds the winners'
// combined size or any single winner's position, and tracks the deficit to
// within one size tick whenever capacity allows (sub-tick residue is not
// allocatable).

use super::core::{calc_zp, LiquidationEngine};
use crate::account::AccountData;
use crate::actions::{Action, ActionKind};
use crate::position::Position;
use crate::rounding::{round_to_nearest_tick, round_up_to_tick};
use crate::types::{approx_f64, decimal_from_f64, ProfileId};
use std::collections::BTreeMap;
use tracing::warn;

// per-trader allocation bookkeeping
#[derive(Debug, Default)]
struct TraderCapacity {
    clawback_size: f64,
    remaining: f64,
}

impl LiquidationEngine {
    /// Allocate one insurance position's size across the winning traders.
    /// Traders are visited in ascending id order, so rounding residue lands
    /// deterministically on the lowest-id trader with capacity.
    pub fn clawback_actions(
        &self,
        insurance: &AccountData,
        insurance_pos: &Position,
        winning_traders: &BTreeMap<ProfileId, Position>,
    ) -> Vec<Action> {
        let Some(market) = insurance.market(&insurance_pos.market_id) else {
            warn!(market = %insurance_pos.market_id, "insurance position without market snapshot");
            return Vec::new();
        };
        let min_order = approx_f64(market.min_order);

        let total_winning_size: f64 = winning_traders
            .values()
            .map(|pos| approx_f64(pos.size))
            .sum();

        let mut clawback_map: BTreeMap<ProfileId, TraderCapacity> = BTreeMap::new();
        let mut total_remaining = 0.0;
        let mut deficit = approx_f64(insurance_pos.size);

        // pass 1: proportional share, tick-rounded, capped by the deficit and
        // by the trader's own position.
        for (trader_id, trader_pos) in winning_traders {
            if deficit < min_order {
                break;
            }
            let trader_size = approx_f64(trader_pos.size);
            let frac = trader_size / total_winning_size;
            let mut clawback_size =
                round_to_nearest_tick(approx_f64(insurance_pos.size) * frac, min_order);
            if clawback_size > deficit {
                clawback_size = deficit;
            }
            let mut remaining = 0.0;
            if clawback_size > trader_size {
                clawback_size = trader_size;
            } else {
                remaining = trader_size - clawback_size;
            }
            if clawback_size > 0.0 || remaining > 0.0 {
                clawback_map.insert(
                    *trader_id,
                    TraderCapacity {
                        clawback_size,
                        remaining,
                    },
                );
                deficit -= clawback_size;
                total_remaining += remaining;
            }
        }

        // pass 2: spread the rounding shortfall over whoever still has
        // capacity, weighted by that capacity.
        if deficit >= min_order {
            let remaining_frac = if total_remaining <= deficit {
                1.0
            } else {
                deficit / total_remaining
            };

            for capacity in clawback_map.values_mut() {
                let mut extra = round_up_to_tick(capacity.remaining * remaining_frac, min_order);
                if extra > capacity.remaining {
                    extra = capacity.remaining;
                }
                capacity.clawback_size += extra;
                capacity.remaining -= extra;
                deficit -= extra;

                if deficit < min_order {
                    break;
                }
            }
        }

        // pass 3 folded into emission: greedily drain any residue, then emit
        // one action per trader with a non-zero allocation.
        let zp = calc_zp(insurance_pos, insurance.cache.margin());
        let mut actions = Vec::with_capacity(winning_traders.len());
        for (trader_id, capacity) in clawback_map.iter_mut() {
            if deficit >= min_order && capacity.remaining >= min_order {
                let extra = deficit.min(capacity.remaining);
                capacity.clawback_size += extra;
                capacity.remaining -= extra;
                deficit -= extra;
            }

            if capacity.clawback_size > 0.0 {
                actions.push(Action {
                    kind: ActionKind::InsuranceClawback,
                    trader_id: *trader_id,
                    market_id: insurance_pos.market_id.clone(),
                    size: decimal_from_f64(capacity.clawback_size),
                    price: decimal_from_f64(zp),
                });
            }
        }

        actions
    }
}
