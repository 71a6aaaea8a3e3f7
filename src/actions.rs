// 3.0: the engine's sole output artifact. opaque to the engine once produced;
// the downstream execution layer interprets it. the Kind enum is the stable
// contract and must not be renumbered or renamed.

use crate::types::{MarketId, ProfileId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionKind {
    /// Directional limit order at a specific price/size for a trader/market.
    PlaceSellOrders,
    /// Transfer of a trader's entire position to insurance at a computed price.
    InsuranceTakeover,
    /// Debit of size from a winning trader's position, crediting insurance.
    InsuranceClawback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub kind: ActionKind,
    pub trader_id: ProfileId,
    pub market_id: MarketId,
    /// Always non-negative; direction is implied by `kind` and the account's
    /// existing position side.
    pub size: Decimal,
    pub price: Decimal,
}
