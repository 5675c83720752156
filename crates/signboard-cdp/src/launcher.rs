//! Kiosk Chrome launcher.
//!
//! Spawns the display browser in locked-down full-screen mode with remote
//! debugging enabled, and waits for the debug endpoint to accept
//! connections before handing control back.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::{Child, Command};
use tracing::{info, warn};

use crate::error::{CdpError, CdpResult};

/// How the display Chrome is launched.
#[derive(Debug, Clone)]
pub struct LauncherConfig {
    /// Browser executable; auto-detected when unset.
    pub executable: Option<PathBuf>,
    /// Remote debugging port.
    pub debug_port: u16,
    /// X display target (`DISPLAY`-style, e.g. `:0`).
    pub display: Option<String>,
    /// Window size, width x height.
    pub window_size: (u32, u32),
    /// Run full-screen kiosk (off is useful for development).
    pub kiosk: bool,
    /// Profile directory; a throwaway under the temp dir when unset.
    pub user_data_dir: Option<PathBuf>,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            executable: None,
            debug_port: 9222,
            display: Some(":0".to_string()),
            window_size: (1920, 1080),
            kiosk: true,
            user_data_dir: None,
        }
    }
}

impl LauncherConfig {
    /// The CDP endpoint this launch will expose.
    pub fn endpoint(&self) -> String {
        format!("http://127.0.0.1:{}", self.debug_port)
    }

    /// Resolve the executable, falling back to well-known install paths.
    pub fn resolve_executable(&self) -> CdpResult<PathBuf> {
        if let Some(path) = &self.executable {
            return Ok(path.clone());
        }
        find_chrome().ok_or(CdpError::ChromeNotFound)
    }

    /// Argument list for the display browser.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = vec![
            format!("--remote-debugging-port={}", self.debug_port),
            "--no-sandbox".to_string(),
            "--disable-setuid-sandbox".to_string(),
            "--disable-dev-shm-usage".to_string(),
            "--disable-gpu".to_string(),
            "--disable-features=TranslateUI".to_string(),
            "--disable-extensions".to_string(),
            "--disable-plugins".to_string(),
            "--disable-background-timer-throttling".to_string(),
            "--disable-backgrounding-occluded-windows".to_string(),
            "--disable-renderer-backgrounding".to_string(),
            "--no-first-run".to_string(),
            "--no-default-browser-check".to_string(),
            format!(
                "--window-size={},{}",
                self.window_size.0, self.window_size.1
            ),
        ];

        if self.kiosk {
            args.push("--start-fullscreen".to_string());
            args.push("--kiosk".to_string());
        }

        if let Some(display) = &self.display {
            args.push(format!("--display={display}"));
        }

        let profile = self
            .user_data_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("signboard-profile"));
        args.push(format!("--user-data-dir={}", profile.display()));

        args
    }
}

/// Find a Chrome/Chromium executable on this host.
pub fn find_chrome() -> Option<PathBuf> {
    let candidates = [
        "/usr/bin/chromium-browser",
        "/usr/bin/chromium",
        "/usr/bin/google-chrome",
        "/usr/bin/google-chrome-stable",
        "/snap/bin/chromium",
    ];
    candidates
        .iter()
        .map(PathBuf::from)
        .find(|path| path.exists())
}

/// A launched display browser process.
pub struct ChromeLauncher {
    child: Child,
    endpoint: String,
}

impl ChromeLauncher {
    /// Spawn the browser and wait for its debug endpoint to come up.
    pub async fn launch(config: &LauncherConfig) -> CdpResult<Self> {
        let executable = config.resolve_executable()?;
        let endpoint = config.endpoint();

        info!("launching display browser: {}", executable.display());

        let child = Command::new(&executable)
            .args(config.build_args())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| CdpError::LaunchFailed(e.to_string()))?;

        let launcher = Self { child, endpoint };
        launcher.wait_for_endpoint().await?;
        Ok(launcher)
    }

    /// Poll the debug endpoint until it responds, bounded at ~6 seconds.
    async fn wait_for_endpoint(&self) -> CdpResult<()> {
        let url = format!("{}/json/version", self.endpoint);
        for _ in 0..30 {
            tokio::time::sleep(Duration::from_millis(200)).await;
            if reqwest::get(&url).await.is_ok() {
                return Ok(());
            }
        }
        Err(CdpError::LaunchFailed(
            "debug endpoint did not come up within timeout".to_string(),
        ))
    }

    /// The CDP endpoint of this browser.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Kill the browser process. Best-effort, failures are logged.
    pub async fn kill(&mut self) {
        if let Err(e) = self.child.kill().await {
            warn!("failed to kill display browser: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_include_kiosk_lockdown() {
        let config = LauncherConfig::default();
        let args = config.build_args();

        assert!(args.contains(&"--kiosk".to_string()));
        assert!(args.contains(&"--start-fullscreen".to_string()));
        assert!(args.contains(&"--no-sandbox".to_string()));
        assert!(args.contains(&"--remote-debugging-port=9222".to_string()));
        assert!(args.contains(&"--window-size=1920,1080".to_string()));
        assert!(args.contains(&"--display=:0".to_string()));
    }

    #[test]
    fn test_args_without_kiosk_or_display() {
        let config = LauncherConfig {
            kiosk: false,
            display: None,
            debug_port: 9333,
            ..Default::default()
        };
        let args = config.build_args();

        assert!(!args.contains(&"--kiosk".to_string()));
        assert!(!args.iter().any(|a| a.starts_with("--display=")));
        assert!(args.contains(&"--remote-debugging-port=9333".to_string()));
    }

    #[test]
    fn test_explicit_executable_wins() {
        let config = LauncherConfig {
            executable: Some(PathBuf::from("/opt/chrome/chrome")),
            ..Default::default()
        };
        assert_eq!(
            config.resolve_executable().unwrap(),
            PathBuf::from("/opt/chrome/chrome")
        );
    }

    #[test]
    fn test_endpoint_format() {
        let config = LauncherConfig {
            debug_port: 9444,
            ..Default::default()
        };
        assert_eq!(config.endpoint(), "http://127.0.0.1:9444");
    }
}
