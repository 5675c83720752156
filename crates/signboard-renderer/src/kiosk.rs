//! Spawned-process kiosk backend.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::sync::{oneshot, Mutex};
use tracing::{error, info, warn};

use signboard_cdp::launcher::find_chrome;
use signboard_core::SplitOrientation;

use crate::error::RenderError;
use crate::renderer::Renderer;
use crate::split_page;

#[cfg(test)]
#[path = "kiosk_tests.rs"]
mod tests;

/// Bound on waiting for a killed process to be reaped.
const KILL_GRACE: Duration = Duration::from_secs(5);

/// How the kiosk browser process is launched.
#[derive(Debug, Clone)]
pub struct KioskConfig {
    /// Browser executable; auto-detected when unset.
    pub executable: Option<PathBuf>,
    /// X display target.
    pub display: Option<String>,
    /// Window size, width x height.
    pub window_size: (u32, u32),
    /// Where the generated split document is written.
    pub split_page_path: PathBuf,
}

impl Default for KioskConfig {
    fn default() -> Self {
        Self {
            executable: None,
            display: Some(":0".to_string()),
            window_size: (1920, 1080),
            split_page_path: std::env::temp_dir().join("signboard-split.html"),
        }
    }
}

impl KioskConfig {
    /// Argument list for a fire-and-forget kiosk launch of `url`.
    pub fn build_args(&self, url: &str) -> Vec<String> {
        let mut args = vec![
            "--kiosk".to_string(),
            "--start-fullscreen".to_string(),
            "--no-sandbox".to_string(),
            "--disable-gpu".to_string(),
            "--disable-extensions".to_string(),
            "--disable-translate".to_string(),
            "--no-first-run".to_string(),
            "--no-default-browser-check".to_string(),
            format!(
                "--window-size={},{}",
                self.window_size.0, self.window_size.1
            ),
        ];

        if let Some(display) = &self.display {
            args.push(format!("--display={display}"));
        }

        args.push(url.to_string());
        args
    }
}

/// A running kiosk process, owned by its monitor task.
///
/// The monitor task holds the `Child` exclusively: it either observes the
/// process exiting on its own (logged, never auto-restarted) or receives a
/// kill request and reaps the process itself. Kill and crash logging never
/// contend for the same handle.
struct KioskProcess {
    target: String,
    kill_tx: oneshot::Sender<()>,
    monitor: tokio::task::JoinHandle<()>,
}

/// Backend C: one external browser process per target.
///
/// This backend has no page handle, so there is no navigation and no login
/// automation: changing the output means killing the process and spawning a
/// new one pointed at the new target.
pub struct KioskRenderer {
    config: KioskConfig,
    process: Mutex<Option<KioskProcess>>,
}

impl KioskRenderer {
    pub fn new(config: KioskConfig) -> Self {
        Self {
            config,
            process: Mutex::new(None),
        }
    }

    fn resolve_executable(&self) -> Result<PathBuf, RenderError> {
        self.config
            .executable
            .clone()
            .or_else(find_chrome)
            .ok_or_else(|| RenderError::Process("no kiosk browser executable found".to_string()))
    }

    /// Kill and replace the current process with one pointed at `url`.
    async fn respawn(&self, url: &str) -> Result<(), RenderError> {
        self.stop_current().await;

        let executable = self.resolve_executable()?;
        let mut child = Command::new(&executable)
            .args(self.config.build_args(url))
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| RenderError::Process(format!("spawn {}: {e}", executable.display())))?;

        info!("kiosk process started for {url} (pid {:?})", child.id());

        let (kill_tx, mut kill_rx) = oneshot::channel::<()>();
        let target = url.to_string();
        let monitor = tokio::spawn(async move {
            tokio::select! {
                status = child.wait() => match status {
                    Ok(status) => error!("kiosk process for {target} exited unexpectedly: {status}"),
                    Err(e) => error!("kiosk process for {target} lost: {e}"),
                },
                _ = &mut kill_rx => {
                    if let Err(e) = child.kill().await {
                        warn!("failed to kill kiosk process: {e}");
                    }
                }
            }
        });

        *self.process.lock().await = Some(KioskProcess {
            target: url.to_string(),
            kill_tx,
            monitor,
        });
        Ok(())
    }

    /// Tear down the current process, if any. Best-effort and bounded.
    async fn stop_current(&self) {
        let Some(process) = self.process.lock().await.take() else {
            return;
        };

        info!("stopping kiosk process for {}", process.target);

        // An Err here means the monitor already saw the process exit.
        let _ = process.kill_tx.send(());
        if tokio::time::timeout(KILL_GRACE, process.monitor).await.is_err() {
            warn!("kiosk process did not terminate within {KILL_GRACE:?}");
        }
    }
}

#[async_trait]
impl Renderer for KioskRenderer {
    async fn show_single(&self, url: &str, _refresh_secs: u32) -> Result<(), RenderError> {
        self.respawn(url).await
    }

    async fn show_split(
        &self,
        orientation: SplitOrientation,
        primary_url: &str,
        secondary_url: &str,
        _refresh_secs: u32,
    ) -> Result<(), RenderError> {
        let html = split_page::split_document(orientation, primary_url, secondary_url, None);
        tokio::fs::write(&self.config.split_page_path, html).await?;

        let file_url = format!("file://{}", self.config.split_page_path.display());
        self.respawn(&file_url).await
    }

    async fn shutdown(&self) -> Result<(), RenderError> {
        self.stop_current().await;
        Ok(())
    }
}
