// 5.0: stateless liquidation engine. given one account snapshot, decides whether
// corrective action is required and produces the action batch. no I/O, no
// mutable state; every function is total over well-formed snapshots.

mod clawback;
mod core;
mod orders;
mod params;

pub use core::{calc_zp, LiquidationEngine};
pub use orders::calc_sell_order_slices;
pub use params::EngineParams;
