//! Reconciliation loop core.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use signboard_core::{ConfigError, ConfigStore, DisplayMode, SignageConfig, SplitOrientation};
use signboard_renderer::Renderer;

use crate::error::LoopError;

#[cfg(test)]
#[path = "run_loop_tests.rs"]
mod tests;

/// Read side of the applied-state cache.
///
/// Observers (the status endpoint) see either the prior or the new config,
/// never a partial one.
pub type AppliedState = watch::Receiver<Option<SignageConfig>>;

/// Loop tuning.
#[derive(Debug, Clone)]
pub struct LoopConfig {
    /// Fixed polling cadence.
    pub poll_interval: Duration,
    /// Bound on queued triggers; overlapping reloads queue up to this.
    pub trigger_queue: usize,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(30),
            trigger_queue: 8,
        }
    }
}

/// What a tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No config resolved; display keeps showing the last render.
    NoConfig,
    /// Config unchanged; no render performed.
    Unchanged,
    /// Config changed and was rendered.
    Rendered,
}

enum Trigger {
    Reload {
        ack: oneshot::Sender<Result<TickOutcome, LoopError>>,
    },
    Stop,
}

/// The reconciliation engine: sole writer of the applied state.
pub struct ReconciliationLoop {
    store: Arc<dyn ConfigStore>,
    renderer: Arc<dyn Renderer>,
    applied: Option<SignageConfig>,
    applied_tx: watch::Sender<Option<SignageConfig>>,
}

impl ReconciliationLoop {
    /// Create a loop plus the handle observers read the applied state from.
    pub fn new(
        store: Arc<dyn ConfigStore>,
        renderer: Arc<dyn Renderer>,
    ) -> (Self, AppliedState) {
        let (applied_tx, applied_rx) = watch::channel(None);
        (
            Self {
                store,
                renderer,
                applied: None,
                applied_tx,
            },
            applied_rx,
        )
    }

    /// Run one reconciliation pass.
    ///
    /// Never called concurrently with itself: the driver task is the only
    /// caller. Any error leaves the applied state exactly as it was.
    pub async fn tick(&mut self) -> Result<TickOutcome, LoopError> {
        let id = self.store.current_config_id().await?;
        let Some(config) = self.store.config(id).await? else {
            warn!("no configuration found for id {id}, display unchanged");
            return Ok(TickOutcome::NoConfig);
        };

        config.validate()?;

        if self.applied.as_ref() == Some(&config) {
            debug!("configuration unchanged, skipping update");
            return Ok(TickOutcome::Unchanged);
        }

        info!(
            "applying configuration {} ({}, mode {})",
            config.id, config.name, config.display_mode
        );

        match config.display_mode {
            DisplayMode::Single => {
                self.renderer
                    .show_single(&config.primary_url, config.refresh_interval_secs)
                    .await?;
            }
            DisplayMode::SplitHorizontal => {
                self.render_split(&config, SplitOrientation::Horizontal).await?;
            }
            DisplayMode::SplitVertical => {
                self.render_split(&config, SplitOrientation::Vertical).await?;
            }
        }

        self.applied = Some(config.clone());
        self.applied_tx.send_replace(Some(config));
        Ok(TickOutcome::Rendered)
    }

    async fn render_split(
        &self,
        config: &SignageConfig,
        orientation: SplitOrientation,
    ) -> Result<(), LoopError> {
        // validate() guarantees this for split modes.
        let secondary = config.secondary_url().ok_or_else(|| {
            LoopError::Invalid(ConfigError::Invalid {
                id: config.id,
                reason: "secondary_url missing for split mode".to_string(),
            })
        })?;

        self.renderer
            .show_split(
                orientation,
                &config.primary_url,
                secondary,
                config.refresh_interval_secs,
            )
            .await?;
        Ok(())
    }

    /// Start the driver task: one immediate tick, then the fixed cadence,
    /// with reload triggers funneled into the same serialized path.
    pub fn spawn(mut self, config: LoopConfig) -> LoopHandle {
        let (trigger_tx, mut trigger_rx) = mpsc::channel::<Trigger>(config.trigger_queue);

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(config.poll_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    // First interval tick fires immediately: the startup render.
                    _ = interval.tick() => {
                        if let Err(e) = self.tick().await {
                            error!("reconciliation tick failed: {e}");
                        }
                    }
                    trigger = trigger_rx.recv() => match trigger {
                        Some(Trigger::Reload { ack }) => {
                            let result = self.tick().await;
                            if let Err(e) = &result {
                                error!("forced reconciliation failed: {e}");
                            }
                            let _ = ack.send(result);
                        }
                        Some(Trigger::Stop) | None => break,
                    },
                }
            }

            debug!("reconciliation driver stopped");
        });

        LoopHandle { trigger_tx, task }
    }
}

/// Control handle for a running loop.
pub struct LoopHandle {
    trigger_tx: mpsc::Sender<Trigger>,
    task: tokio::task::JoinHandle<()>,
}

impl LoopHandle {
    /// Force an immediate tick and wait for its outcome.
    ///
    /// Queues behind an in-flight tick; at most one render is ever in
    /// flight.
    pub async fn request_reload(&self) -> Result<TickOutcome, LoopError> {
        send_reload(&self.trigger_tx).await
    }

    /// A sender that can be cloned into other components to request reloads
    /// without owning the handle.
    pub fn reload_requester(&self) -> ReloadRequester {
        ReloadRequester {
            trigger_tx: self.trigger_tx.clone(),
        }
    }

    /// Stop the driver: no new renders after the in-flight tick, which gets
    /// up to `grace` to finish before being abandoned.
    pub async fn shutdown(self, grace: Duration) {
        let Self { trigger_tx, mut task } = self;

        // Queued triggers ahead of the stop are still honored; nothing after.
        let _ = trigger_tx.send(Trigger::Stop).await;

        if tokio::time::timeout(grace, &mut task).await.is_err() {
            warn!("in-flight tick did not finish within {grace:?}, abandoning");
            task.abort();
        }
    }
}

/// Clonable reload entry point for the control surface.
#[derive(Clone)]
pub struct ReloadRequester {
    trigger_tx: mpsc::Sender<Trigger>,
}

impl ReloadRequester {
    /// Same contract as [`LoopHandle::request_reload`].
    pub async fn request_reload(&self) -> Result<TickOutcome, LoopError> {
        send_reload(&self.trigger_tx).await
    }
}

async fn send_reload(trigger_tx: &mpsc::Sender<Trigger>) -> Result<TickOutcome, LoopError> {
    let (ack_tx, ack_rx) = oneshot::channel();
    trigger_tx
        .send(Trigger::Reload { ack: ack_tx })
        .await
        .map_err(|_| LoopError::NotRunning)?;

    ack_rx.await.map_err(|_| LoopError::NotRunning)?
}
