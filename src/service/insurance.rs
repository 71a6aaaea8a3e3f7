// 7.2: the insurance loop. one account, one decision per tick: if the global
// solvency invariant is broken, claw the deficit back from winning traders;
// otherwise work the positions off on the open market, at most once per
// waterfall interval.

use crate::assistant::{Assistant, AssistantError};
use crate::engine::{calc_zp, LiquidationEngine};
use crate::time::is_interval_passed_micros;
use crate::types::ProfileId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

use super::ServiceHandle;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsuranceServiceConfig {
    /// Tick interval, and the minimum spacing between market selloffs.
    pub waterfall_interval: Duration,
}

impl Default for InsuranceServiceConfig {
    fn default() -> Self {
        Self {
            waterfall_interval: Duration::from_secs(6),
        }
    }
}

pub struct InsuranceService {
    insurance_id: ProfileId,
    config: InsuranceServiceConfig,
    assistant: Arc<dyn Assistant>,
    engine: LiquidationEngine,
}

impl InsuranceService {
    /// Resolves the insurance account before anything else; a store that
    /// cannot produce one is fatal.
    pub async fn new(
        assistant: Arc<dyn Assistant>,
        engine: LiquidationEngine,
        config: InsuranceServiceConfig,
    ) -> Result<Self, AssistantError> {
        let insurance_id = assistant.get_or_create_insurance().await?;
        Ok(Self {
            insurance_id,
            config,
            assistant,
            engine,
        })
    }

    pub fn insurance_id(&self) -> ProfileId {
        self.insurance_id
    }

    /// Run the loop on its own timer until the handle is stopped.
    pub fn spawn(self) -> ServiceHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(async move {
            let start = tokio::time::Instant::now() + self.config.waterfall_interval;
            let mut ticker = tokio::time::interval_at(start, self.config.waterfall_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = shutdown_rx.changed() => break,
                    _ = ticker.tick() => {
                        self.process_positions().await;
                    }
                }
            }
        });
        ServiceHandle::new(shutdown_tx, task)
    }

    /// One tick: probe the solvency invariant and run whichever path it
    /// selects. Returns how many actions were produced.
    pub async fn process_positions(&self) -> usize {
        if self.assistant.clawback_required().await {
            match self.clawback().await {
                Ok(total) => total,
                Err(err) => {
                    error!(alert = "crit", %err, "insurance clawback failed");
                    0
                }
            }
        } else {
            match self.sell_on_market().await {
                Ok(total) => total,
                Err(err) => {
                    error!(alert = "crit", %err, "insurance selloff failed");
                    0
                }
            }
        }
    }

    async fn sell_on_market(&self) -> Result<usize, AssistantError> {
        let insurance = self.assistant.get_insurance_data(self.insurance_id).await?;

        let interval_passed = is_interval_passed_micros(
            insurance.cache.last_liq_check,
            self.config.waterfall_interval,
        );
        info!(
            last_check = insurance.cache.last_liq_check.as_micros(),
            positions = insurance.positions.len(),
            interval_passed,
            "insurance selloff check"
        );

        if insurance.positions.is_empty() || !interval_passed {
            return Ok(0);
        }

        if let Err(err) = self
            .assistant
            .wait_for_cancel_all_accepted(insurance.cache.profile_id)
            .await
        {
            error!(%err, "cancel-all not confirmed for insurance");
            return Err(err);
        }

        // open orders are replaced wholesale by the new ladder
        let actions = self.engine.insurance_selloff_actions(&insurance);
        if !actions.is_empty() {
            if let Err(err) = self.assistant.queue(actions.clone()).await {
                error!(%err, "failed to queue insurance selloff");
            }
        }
        if let Err(err) = self
            .assistant
            .update_last_checked(insurance.cache.profile_id)
            .await
        {
            error!(%err, "failed to stamp insurance last-checked");
        }

        Ok(actions.len())
    }

    async fn clawback(&self) -> Result<usize, AssistantError> {
        let insurance = self.assistant.get_insurance_data(self.insurance_id).await?;
        let margin = insurance.cache.margin();

        if let Err(err) = self
            .assistant
            .wait_for_cancel_all_accepted(insurance.cache.profile_id)
            .await
        {
            error!(%err, "cancel-all not confirmed for insurance");
            return Err(err);
        }

        let mut actions = Vec::with_capacity(insurance.positions.len());
        for insurance_pos in &insurance.positions {
            let required_side = insurance_pos.side.opposite();
            let zero_price = calc_zp(insurance_pos, margin);
            let winning_traders = self
                .assistant
                .get_winning_trader_positions(
                    &insurance_pos.market_id,
                    required_side,
                    zero_price,
                    self.insurance_id,
                )
                .await?;

            if !winning_traders.is_empty() {
                actions.extend(self.engine.clawback_actions(
                    &insurance,
                    insurance_pos,
                    &winning_traders,
                ));
            }
        }

        info!(total = actions.len(), "clawback actions");
        if !actions.is_empty() {
            if let Err(err) = self.assistant.queue(actions.clone()).await {
                error!(%err, "failed to queue clawback");
            }
        }
        Ok(actions.len())
    }
}
