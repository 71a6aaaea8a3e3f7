// 7.1: the account sweep. every tick pages through the whole population in
// id order, applies the per-account state machine, and drives the engine for
// anything under-margined. coordination (one liquidation in flight per
// account, exactly-once status transitions) is the store's job, not ours.

use crate::account::AccountRiskCache;
use crate::actions::Action;
use crate::assistant::{Assistant, AssistantError, ServiceId};
use crate::engine::LiquidationEngine;
use crate::types::{ProfileId, ProfileType};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use super::ServiceHandle;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiquidationServiceConfig {
    /// How often the full population is rescanned.
    pub check_interval: Duration,
    /// Page size for the id-cursored scan.
    pub batch_limit: usize,
    /// Margins below this are data anomalies, not liquidations.
    pub margin_anomaly_floor: f64,
}

impl Default for LiquidationServiceConfig {
    fn default() -> Self {
        Self {
            check_interval: Duration::from_secs(2),
            batch_limit: 10,
            margin_anomaly_floor: -0.1,
        }
    }
}

/// What one full sweep did, for observability and tests.
#[derive(Debug, Clone, Default)]
pub struct ScanSummary {
    /// Accounts examined (insurance excluded).
    pub scanned: usize,
    /// Accounts that went through the engine this sweep.
    pub liquidations_started: usize,
    /// Every action queued during the sweep.
    pub actions: Vec<Action>,
}

pub struct LiquidationService {
    service_id: ServiceId,
    insurance_id: ProfileId,
    config: LiquidationServiceConfig,
    assistant: Arc<dyn Assistant>,
    engine: LiquidationEngine,
}

impl LiquidationService {
    /// Resolves the insurance account before anything else; a store that
    /// cannot produce one is fatal.
    pub async fn new(
        assistant: Arc<dyn Assistant>,
        engine: LiquidationEngine,
        config: LiquidationServiceConfig,
    ) -> Result<Self, AssistantError> {
        let insurance_id = assistant.get_or_create_insurance().await?;
        let service_id = assistant.next_service_id();
        Ok(Self {
            service_id,
            insurance_id,
            config,
            assistant,
            engine,
        })
    }

    pub fn service_id(&self) -> ServiceId {
        self.service_id
    }

    pub fn insurance_id(&self) -> ProfileId {
        self.insurance_id
    }

    /// Run the sweep on its own timer until the handle is stopped.
    pub fn spawn(self) -> ServiceHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let stop_probe = shutdown_rx.clone();
        let task = tokio::spawn(async move {
            let start = tokio::time::Instant::now() + self.config.check_interval;
            let mut ticker = tokio::time::interval_at(start, self.config.check_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = shutdown_rx.changed() => break,
                    _ = ticker.tick() => {
                        let _ = self.process_liquidations(&stop_probe).await;
                    }
                }
            }
        });
        ServiceHandle::new(shutdown_tx, task)
    }

    /// One full sweep over the population. Stops early (cleanly) when
    /// `shutdown` flips between accounts.
    pub async fn process_liquidations(
        &self,
        shutdown: &watch::Receiver<bool>,
    ) -> Result<ScanSummary, AssistantError> {
        let mut summary = ScanSummary::default();
        let mut last_id: Option<ProfileId> = None;

        loop {
            let batch = match self
                .assistant
                .get_next_liq_batch(last_id, self.config.batch_limit)
                .await
            {
                Ok(batch) => batch,
                Err(err) => {
                    error!(alert = "crit", %err, "liquidation batch fetch failed");
                    return Err(err);
                }
            };

            debug!(batch = batch.len(), "liquidation scan page");
            if batch.is_empty() {
                break;
            }

            for cache in &batch {
                last_id = Some(cache.profile_id);

                if cache.profile_type == ProfileType::Insurance {
                    warn!("refusing to liquidate the insurance account");
                    continue;
                }
                summary.scanned += 1;

                if *shutdown.borrow() {
                    return Ok(summary);
                }

                let margin = cache.margin();
                if margin < self.config.margin_anomaly_floor
                    || (margin > self.engine.params().liquidation_margin
                        && !self.engine.is_liquidation_ending(cache))
                {
                    error!(
                        alert = "crit",
                        trader = %cache.profile_id,
                        margin,
                        "implausible account margin, skipping"
                    );
                    continue;
                }

                debug!(
                    trader = %cache.profile_id,
                    margin,
                    equity = %cache.account_equity,
                    notional = %cache.total_notional,
                    "liquidation candidate"
                );

                if self.engine.should_liquidation_have_more_time(cache) {
                    continue;
                }

                if self.engine.is_liquidation_ending(cache) {
                    if let Err(err) = self.assistant.wait_for_cancel_all_accepted(cache.profile_id).await {
                        error!(trader = %cache.profile_id, %err, "cancel-all not confirmed");
                        continue;
                    }
                    if let Err(err) = self.assistant.complete_liquidation(cache.profile_id).await {
                        error!(trader = %cache.profile_id, %err, "failed to complete liquidation");
                    }
                    continue;
                }

                if self.engine.below_liquidation_margin(margin) {
                    if let Err(err) = self.assistant.wait_for_cancel_all_accepted(cache.profile_id).await {
                        error!(trader = %cache.profile_id, %err, "cancel-all not confirmed");
                        continue;
                    }

                    summary.liquidations_started += 1;
                    match self.queue_liquidate_actions(cache).await {
                        Ok(actions) => summary.actions.extend(actions),
                        Err(_) => continue,
                    }

                    if let Err(err) = self.assistant.update_last_checked(cache.profile_id).await {
                        error!(trader = %cache.profile_id, %err, "failed to stamp last-checked");
                    }
                }
            }
        }

        if summary.scanned != 0 || summary.liquidations_started != 0 {
            info!(
                scanned = summary.scanned,
                started = summary.liquidations_started,
                "liquidation sweep"
            );
        }
        Ok(summary)
    }

    /// Administrative entry point: confirm cancel-all for one account without
    /// running a sweep.
    pub async fn cancel_all_orders(&self, cache: &AccountRiskCache) -> Result<(), AssistantError> {
        if let Err(err) = self.assistant.wait_for_cancel_all_accepted(cache.profile_id).await {
            error!(trader = %cache.profile_id, %err, "cancel-all not confirmed");
            return Err(err);
        }
        Ok(())
    }

    /// Administrative entry point: evaluate one account and queue whatever the
    /// engine requires. Returns the queued actions.
    pub async fn queue_liquidate_actions(
        &self,
        cache: &AccountRiskCache,
    ) -> Result<Vec<Action>, AssistantError> {
        let account = match self.assistant.get_account_data(cache).await {
            Ok(account) => account,
            Err(err) => {
                error!(
                    alert = "crit",
                    trader = %cache.profile_id,
                    %err,
                    "failed to fetch account data"
                );
                return Err(err);
            }
        };

        let (actions, liquidated_vaults) = self.engine.required_actions(&account);
        if !actions.is_empty() {
            if let Err(err) = self.assistant.queue(actions.clone()).await {
                error!(trader = %cache.profile_id, %err, "failed to queue actions");
            }
        }
        if !liquidated_vaults.is_empty() {
            if let Err(err) = self.assistant.liquidated_vaults(liquidated_vaults).await {
                error!(trader = %cache.profile_id, %err, "failed to flag liquidated vaults");
            }
        }
        Ok(actions)
    }
}
