// perps-risk: liquidation core for a perpetual futures exchange.
// risk-first architecture: detect under-margined accounts, compute corrective
// actions, hand them to the execution layer. the engine is pure computation;
// all I/O crosses the Assistant boundary.
//
// file map (search X.0 for structs, X.1+ for logic):
//   1.x  types.rs: primitives: ProfileId, MarketId, Side, statuses, timestamps
//   2.x  position.rs: position snapshot + unrealized pnl
//        market.rs: per-market book/liquidity snapshot
//        account.rs: risk cache + per-evaluation account aggregate
//   3.x  actions.rs: the output artifact handed to execution
//   4.x  rounding.rs: tick quantization helpers
//        time.rs: interval checks against store timestamps
//   5.x  engine/: the waterfall ladder, order slicing, clawback allocation
//   6.x  assistant.rs: the external store/execution boundary
//        retry.rs: bounded confirmation polling
//   7.x  service/: the two periodic control loops

pub mod account;
pub mod actions;
pub mod assistant;
pub mod engine;
pub mod market;
pub mod position;
pub mod retry;
pub mod rounding;
pub mod service;
pub mod time;
pub mod types;

pub use account::{AccountData, AccountRiskCache};
pub use actions::{Action, ActionKind};
pub use assistant::{Assistant, AssistantError, ServiceId, WinningPositions};
pub use engine::{calc_sell_order_slices, calc_zp, EngineParams, LiquidationEngine};
pub use market::Market;
pub use position::Position;
pub use retry::RetryPolicy;
pub use rounding::{round_down_to_tick, round_to_nearest_tick, round_up_to_tick};
pub use service::{
    InsuranceService, InsuranceServiceConfig, LiquidationService, LiquidationServiceConfig,
    ScanSummary, ServiceHandle,
};
pub use time::is_interval_passed_micros;
pub use types::{
    approx_f64, decimal_from_f64, MarketId, ProfileId, ProfileStatus, ProfileType, Side,
    TimestampMicros,
};
