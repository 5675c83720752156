use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use signboard_cdp::CdpError;
use signboard_core::{Credential, CredentialStore, SplitOrientation, StoreError};

use super::{render_single, render_split};
use crate::credentials::CredentialResolver;
use crate::login::{LoginAutomator, PageDriver};

/// Page double recording every operation the backend performs.
struct ScriptedPage {
    present: HashSet<&'static str>,
    actions: Mutex<Vec<String>>,
}

impl ScriptedPage {
    fn new(present: &[&'static str]) -> Self {
        Self {
            present: present.iter().copied().collect(),
            actions: Mutex::new(Vec::new()),
        }
    }

    fn log(&self, action: String) {
        self.actions.lock().push(action);
    }

    fn actions(&self) -> Vec<String> {
        self.actions.lock().clone()
    }
}

#[async_trait]
impl PageDriver for ScriptedPage {
    async fn navigate(&self, url: &str) -> Result<(), CdpError> {
        self.log(format!("navigate {url}"));
        Ok(())
    }

    async fn wait_for_selector(&self, selector: &str, _timeout: Duration) -> Result<(), CdpError> {
        self.log(format!("probe {selector}"));
        if self.present.contains(selector) {
            Ok(())
        } else {
            Err(CdpError::Timeout(selector.to_string()))
        }
    }

    async fn fill(&self, selector: &str, value: &str) -> Result<(), CdpError> {
        self.log(format!("fill {selector} = {value}"));
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<(), CdpError> {
        self.log(format!("click {selector}"));
        Ok(())
    }

    async fn wait_for_navigation(&self, _timeout: Duration) -> Result<(), CdpError> {
        self.log("wait_for_navigation".to_string());
        Ok(())
    }

    async fn set_content(&self, html: &str) -> Result<(), CdpError> {
        self.log(format!("set_content {html}"));
        Ok(())
    }

    async fn suppress_chrome(&self) -> Result<(), CdpError> {
        self.log("suppress_chrome".to_string());
        Ok(())
    }
}

/// Store double answering every lookup with the same credential (or none).
struct FixedCredentials(Option<Credential>);

#[async_trait]
impl CredentialStore for FixedCredentials {
    async fn credential_for(&self, _domain: &str) -> Result<Option<Credential>, StoreError> {
        Ok(self.0.clone())
    }

    async fn upsert_credential(&self, _: &str, _: &str, _: &str) -> Result<(), StoreError> {
        unreachable!()
    }

    async fn delete_credential(&self, _: &str) -> Result<(), StoreError> {
        unreachable!()
    }
}

fn resolver_with(credential: Option<Credential>) -> CredentialResolver {
    CredentialResolver::new(Arc::new(FixedCredentials(credential)))
}

fn automator() -> LoginAutomator {
    LoginAutomator::with_timeouts(Duration::from_millis(10), Duration::from_millis(10))
}

fn credential() -> Credential {
    Credential {
        domain: "dash.example.test".to_string(),
        username: "kiosk".to_string(),
        password: "secret".to_string(),
    }
}

#[tokio::test]
async fn test_no_stored_credential_skips_login_automation() {
    // A login form is present, but without a stored credential the page is
    // navigated directly: no probing, no filling, no clicking.
    let page = ScriptedPage::new(&[
        r#"input[name="username"]"#,
        r#"input[name="password"]"#,
        r#"button[type="submit"]"#,
    ]);

    render_single(
        &page,
        &resolver_with(None),
        &automator(),
        "https://dash.example.test/board",
    )
    .await
    .unwrap();

    assert_eq!(
        page.actions(),
        vec![
            "navigate https://dash.example.test/board".to_string(),
            "suppress_chrome".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_stored_credential_runs_login_flow() {
    let page = ScriptedPage::new(&[
        r#"input[name="username"]"#,
        r#"input[name="password"]"#,
        r#"button[type="submit"]"#,
    ]);

    render_single(
        &page,
        &resolver_with(Some(credential())),
        &automator(),
        "https://dash.example.test/board",
    )
    .await
    .unwrap();

    let actions = page.actions();
    assert!(actions.contains(&r#"fill input[name="username"] = kiosk"#.to_string()));
    assert!(actions.contains(&r#"click button[type="submit"]"#.to_string()));
    assert_eq!(actions.last().map(String::as_str), Some("suppress_chrome"));
}

#[tokio::test]
async fn test_split_injects_document_without_navigation_or_login() {
    let page = ScriptedPage::new(&[]);

    render_split(
        &page,
        SplitOrientation::Horizontal,
        "https://example.test/b",
        "https://example.test/c",
    )
    .await
    .unwrap();

    let actions = page.actions();
    assert_eq!(actions.len(), 1);
    assert!(actions[0].starts_with("set_content"));
    assert!(actions[0].contains("flex-direction: row"));
    assert!(actions[0].contains("https://example.test/b"));
    assert!(actions[0].contains("https://example.test/c"));
}
