//! Engine tuning parameters.
//!
//! These were compile-time constants in earlier revisions; injectable so the
//! waterfall boundaries can be exercised in scenario tests.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineParams {
    /// Below this margin fraction, corrective action is required.
    pub liquidation_margin: f64,
    /// Below this, a market selloff cannot recover the account; insurance
    /// takes the positions over outright.
    pub takeover_margin: f64,
    /// Max fraction of a market's average daily volume per forced trader order.
    pub trader_max_adv_frac: f64,
    /// Same bound for insurance selloff orders.
    pub insurance_max_adv_frac: f64,
    /// Forced order prices never cross fair price by more than this fraction.
    pub risk_limit_frac: f64,
    /// Floor multiplier over the market minimum order size, so forced orders
    /// always clear exchange minimums.
    pub min_order_floor_mult: f64,
    /// A liquidating account still in the selloff band is left alone until
    /// this much time has passed since its last check.
    pub waterfall_interval: Duration,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            liquidation_margin: 0.03,
            takeover_margin: 0.02,
            trader_max_adv_frac: 0.001,
            insurance_max_adv_frac: 0.001,
            risk_limit_frac: 0.01,
            min_order_floor_mult: 5.0001,
            waterfall_interval: Duration::from_secs(6),
        }
    }
}
