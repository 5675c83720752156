//! Best-effort login automation.
//!
//! Third-party login pages have no stable structure, so this is a
//! deterministic heuristic, not an authentication protocol: probe an
//! ordered list of candidate selectors, first match wins, every wait is
//! bounded, and every failure degrades to "not logged in" with the caller
//! proceeding regardless.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use signboard_cdp::{CdpError, PageSession};
use signboard_core::Credential;

#[cfg(test)]
#[path = "login_tests.rs"]
mod tests;

/// Username field candidates, in probe order.
pub const USERNAME_SELECTORS: &[&str] = &[
    r#"input[name="username"]"#,
    r#"input[name="user"]"#,
    r#"input[name="login"]"#,
    r#"input[name="email"]"#,
    r#"input[type="email"]"#,
    r#"input[id*="username"]"#,
    r#"input[id*="user"]"#,
    r#"input[id*="email"]"#,
];

/// Password field candidates, in probe order.
pub const PASSWORD_SELECTORS: &[&str] = &[
    r#"input[name="password"]"#,
    r#"input[name="pass"]"#,
    r#"input[type="password"]"#,
    r#"input[id*="password"]"#,
    r#"input[id*="pass"]"#,
];

/// Submit button candidates, in probe order.
pub const SUBMIT_SELECTORS: &[&str] = &[
    r#"button[type="submit"]"#,
    r#"input[type="submit"]"#,
    r#"button[name="submit"]"#,
    r#"button[id*="login"]"#,
    r#"button[id*="submit"]"#,
];

/// The page operations the browser backend drives.
///
/// [`PageSession`] is the production implementation; tests script their own.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate to a URL and wait for the page to settle.
    async fn navigate(&self, url: &str) -> Result<(), CdpError>;

    /// Wait for a selector to appear, bounded by `timeout`.
    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<(), CdpError>;

    /// Fill an input.
    async fn fill(&self, selector: &str, value: &str) -> Result<(), CdpError>;

    /// Click an element.
    async fn click(&self, selector: &str) -> Result<(), CdpError>;

    /// Wait for a post-submit navigation to settle, bounded by `timeout`.
    async fn wait_for_navigation(&self, timeout: Duration) -> Result<(), CdpError>;

    /// Replace the document with generated markup.
    async fn set_content(&self, html: &str) -> Result<(), CdpError>;

    /// Strip container margins and scrollbars from the current document.
    async fn suppress_chrome(&self) -> Result<(), CdpError>;
}

#[async_trait]
impl PageDriver for PageSession {
    async fn navigate(&self, url: &str) -> Result<(), CdpError> {
        PageSession::navigate(self, url).await
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<(), CdpError> {
        PageSession::wait_for_selector(self, selector, timeout).await
    }

    async fn fill(&self, selector: &str, value: &str) -> Result<(), CdpError> {
        PageSession::fill(self, selector, value).await
    }

    async fn click(&self, selector: &str) -> Result<(), CdpError> {
        PageSession::click_selector(self, selector).await
    }

    async fn wait_for_navigation(&self, timeout: Duration) -> Result<(), CdpError> {
        self.wait_until_settled(Duration::from_millis(500), timeout)
            .await
    }

    async fn set_content(&self, html: &str) -> Result<(), CdpError> {
        PageSession::set_content(self, html).await
    }

    async fn suppress_chrome(&self) -> Result<(), CdpError> {
        PageSession::suppress_chrome(self).await
    }
}

/// Result of a login attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginOutcome {
    pub logged_in: bool,
}

/// Drives the ordered-probe login heuristic against an unknown form.
pub struct LoginAutomator {
    /// Per-selector probe bound.
    probe_timeout: Duration,
    /// Post-submit navigation bound.
    submit_timeout: Duration,
}

impl Default for LoginAutomator {
    fn default() -> Self {
        Self {
            probe_timeout: Duration::from_secs(2),
            submit_timeout: Duration::from_secs(10),
        }
    }
}

impl LoginAutomator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the probe bounds. Tests use millisecond bounds.
    pub fn with_timeouts(probe_timeout: Duration, submit_timeout: Duration) -> Self {
        Self {
            probe_timeout,
            submit_timeout,
        }
    }

    /// Attempt a login on `url` with the given credentials.
    ///
    /// Never fails: every internal error degrades to
    /// `LoginOutcome { logged_in: false }` and the caller treats the page as
    /// already showing unauthenticated content.
    pub async fn attempt_login(
        &self,
        page: &dyn PageDriver,
        url: &str,
        credential: &Credential,
    ) -> LoginOutcome {
        info!("attempting login for domain {}", credential.domain);

        match self.try_login(page, url, credential).await {
            Ok(logged_in) => LoginOutcome { logged_in },
            Err(e) => {
                warn!("login attempt failed: {e}");
                LoginOutcome { logged_in: false }
            }
        }
    }

    async fn try_login(
        &self,
        page: &dyn PageDriver,
        url: &str,
        credential: &Credential,
    ) -> Result<bool, CdpError> {
        page.navigate(url).await?;

        let username_field = self.first_present(page, USERNAME_SELECTORS).await;
        let password_field = self.first_present(page, PASSWORD_SELECTORS).await;

        let (Some(username_field), Some(password_field)) = (username_field, password_field) else {
            info!("no login form found, proceeding without login");
            return Ok(false);
        };

        page.fill(username_field, &credential.username).await?;
        page.fill(password_field, &credential.password).await?;

        let mut submitted = false;
        for selector in SUBMIT_SELECTORS {
            if page
                .wait_for_selector(selector, self.probe_timeout)
                .await
                .is_ok()
            {
                page.click(selector).await?;
                submitted = true;
                break;
            }
        }

        if submitted {
            // Timeout here is tolerable: some forms submit in place.
            if let Err(e) = page.wait_for_navigation(self.submit_timeout).await {
                debug!("post-submit navigation wait: {e}");
            }
        } else {
            debug!("no submit button found, credentials typed but not submitted");
        }

        Ok(true)
    }

    /// First selector from `candidates` that appears within the per-selector
    /// bound. Remaining candidates are not tried once one matches.
    async fn first_present(
        &self,
        page: &dyn PageDriver,
        candidates: &[&'static str],
    ) -> Option<&'static str> {
        for selector in candidates {
            if page
                .wait_for_selector(selector, self.probe_timeout)
                .await
                .is_ok()
            {
                return Some(selector);
            }
        }
        None
    }
}
