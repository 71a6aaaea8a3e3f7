// 6.0: the only boundary to the outside world. everything the services need
// from the account store and the execution layer goes through this trait, so
// the whole core runs against an in-memory fake in tests.

use crate::account::{AccountData, AccountRiskCache};
use crate::actions::Action;
use crate::position::Position;
use crate::types::{MarketId, ProfileId, Side};
use async_trait::async_trait;
use std::collections::BTreeMap;

/// Winning counter-positions keyed by trader id. Ordered so allocation
/// passes visit traders deterministically.
pub type WinningPositions = BTreeMap<ProfileId, Position>;

/// Identifies one liquidation worker when several run against the same store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServiceId(pub u32);

#[derive(Debug, Clone, thiserror::Error)]
pub enum AssistantError {
    /// Transient store or transport failure. The current account's processing
    /// is abandoned for this tick; the loop continues.
    #[error("store error: {0}")]
    Store(String),

    /// Bounded cancel-all polling ran out of attempts. The caller must not
    /// liquidate or clawback without cancellation confirmed.
    #[error("cancel-all for trader {trader} not accepted after {attempts} attempts")]
    CancelWaitExhausted { trader: ProfileId, attempts: u32 },

    /// Startup cannot proceed without a valid insurance account.
    #[error("insurance bootstrap failed: {0}")]
    Bootstrap(String),
}

#[async_trait]
pub trait Assistant: Send + Sync {
    /// Submit actions for execution. Must not block indefinitely. Idempotent
    /// submission is the caller's responsibility.
    async fn queue(&self, actions: Vec<Action>) -> Result<(), AssistantError>;

    /// Flag vault accounts whose positions were taken over.
    async fn liquidated_vaults(&self, vaults: Vec<ProfileId>) -> Result<(), AssistantError>;

    /// Transition a recovered account LIQUIDATING -> ACTIVE.
    async fn complete_liquidation(&self, trader_id: ProfileId) -> Result<(), AssistantError>;

    /// Stamp the account's last-liquidation-check time.
    async fn update_last_checked(&self, trader_id: ProfileId) -> Result<(), AssistantError>;

    /// Up to `limit` risk caches with id > `last_id`, ordered by id. An empty
    /// page signals scan completion.
    async fn get_next_liq_batch(
        &self,
        last_id: Option<ProfileId>,
        limit: usize,
    ) -> Result<Vec<AccountRiskCache>, AssistantError>;

    /// Consistent point-in-time snapshot of the insurance account.
    async fn get_insurance_data(&self, insurance_id: ProfileId)
        -> Result<AccountData, AssistantError>;

    /// Consistent point-in-time snapshot of one account. Errors propagate; no
    /// partial data is consumed.
    async fn get_account_data(&self, cache: &AccountRiskCache)
        -> Result<AccountData, AssistantError>;

    /// Global solvency invariant probe: true when insurance must claw back
    /// from winners instead of selling on market. Holds false when the
    /// invariant is intact or the insurance margin is comfortably positive,
    /// and must fail safe to false on error, preferring the less aggressive
    /// path.
    async fn clawback_required(&self) -> bool;

    /// Positions on `side` that are strictly profitable at `at_price`,
    /// excluding the insurance account itself.
    async fn get_winning_trader_positions(
        &self,
        market_id: &MarketId,
        side: Side,
        at_price: f64,
        insurance_id: ProfileId,
    ) -> Result<WinningPositions, AssistantError>;

    /// Bootstrap only. Failure is fatal to service startup.
    async fn get_or_create_insurance(&self) -> Result<ProfileId, AssistantError>;

    /// Request cancel-all for the trader, then poll until the store confirms
    /// or a bounded number of attempts is exhausted
    /// (`AssistantError::CancelWaitExhausted`).
    async fn wait_for_cancel_all_accepted(&self, trader_id: ProfileId)
        -> Result<(), AssistantError>;

    fn next_service_id(&self) -> ServiceId;
}
