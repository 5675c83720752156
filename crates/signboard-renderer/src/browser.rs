//! CDP-driven browser backend.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{info, warn};

use signboard_cdp::{CdpClient, ChromeLauncher, LauncherConfig, PageSession};
use signboard_core::{CredentialStore, SplitOrientation};

use crate::credentials::CredentialResolver;
use crate::error::RenderError;
use crate::login::{LoginAutomator, PageDriver};
use crate::renderer::Renderer;
use crate::split_page;

#[cfg(test)]
#[path = "browser_tests.rs"]
mod tests;

/// Runs before every page's own scripts; hides the automation signal pages
/// use to detect and block non-human traffic.
pub const STEALTH_SCRIPT: &str = r#"
Object.defineProperty(navigator, 'webdriver', {
    get: () => undefined,
});
"#;

/// Backend A: one long-lived automated browser session, one page.
///
/// `show_single` navigates the existing page (running the login heuristic
/// first when credentials are stored for the target host); `show_split`
/// injects the generated two-pane document directly, bypassing navigation
/// (split mode hosts non-authenticated embeds).
pub struct BrowserRenderer {
    launcher: Mutex<ChromeLauncher>,
    client: Arc<CdpClient>,
    page: PageSession,
    resolver: CredentialResolver,
    automator: LoginAutomator,
}

impl BrowserRenderer {
    /// Launch the display browser and attach the signage page.
    ///
    /// This is the one startup step that is allowed to be fatal: a display
    /// daemon with no output resource has no reason to keep running.
    pub async fn launch(
        config: LauncherConfig,
        credential_store: Arc<dyn CredentialStore>,
    ) -> Result<Self, RenderError> {
        let launcher = ChromeLauncher::launch(&config).await?;
        let client = Arc::new(CdpClient::connect(launcher.endpoint()).await?);
        let page = client.attach_page().await?;
        page.add_init_script(STEALTH_SCRIPT).await?;

        info!("browser renderer ready at {}", launcher.endpoint());

        Ok(Self {
            launcher: Mutex::new(launcher),
            client,
            page,
            resolver: CredentialResolver::new(credential_store),
            automator: LoginAutomator::new(),
        })
    }
}

/// Show one page, logging in first only when credentials are stored for the
/// target host. No stored credential means a plain navigation; the login
/// machinery is never touched.
async fn render_single(
    page: &dyn PageDriver,
    resolver: &CredentialResolver,
    automator: &LoginAutomator,
    url: &str,
) -> Result<(), RenderError> {
    match resolver.resolve(url).await {
        Some(credential) => {
            let outcome = automator.attempt_login(page, url, &credential).await;
            info!(logged_in = outcome.logged_in, "showing {url} (with stored credentials)");
        }
        None => {
            page.navigate(url).await?;
            info!("showing {url}");
        }
    }

    page.suppress_chrome().await?;
    Ok(())
}

/// Inject the generated two-pane document into the current page.
async fn render_split(
    page: &dyn PageDriver,
    orientation: SplitOrientation,
    primary_url: &str,
    secondary_url: &str,
) -> Result<(), RenderError> {
    let html = split_page::split_document(orientation, primary_url, secondary_url, None);
    page.set_content(&html).await?;
    info!("showing split view of {primary_url} and {secondary_url}");
    Ok(())
}

#[async_trait]
impl Renderer for BrowserRenderer {
    async fn show_single(&self, url: &str, _refresh_secs: u32) -> Result<(), RenderError> {
        render_single(&self.page, &self.resolver, &self.automator, url).await
    }

    async fn show_split(
        &self,
        orientation: SplitOrientation,
        primary_url: &str,
        secondary_url: &str,
        _refresh_secs: u32,
    ) -> Result<(), RenderError> {
        render_split(&self.page, orientation, primary_url, secondary_url).await
    }

    async fn shutdown(&self) -> Result<(), RenderError> {
        if let Err(e) = self.page.close().await {
            warn!("page close failed: {e}");
        }
        if let Err(e) = self.client.close_browser().await {
            warn!("graceful browser close failed: {e}");
        }
        // Backstop: make sure the process is gone either way.
        self.launcher.lock().await.kill().await;
        Ok(())
    }
}
