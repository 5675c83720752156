//! Attached page session.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::{json, Value};
use tracing::debug;

use crate::client::CdpClient;
use crate::error::{CdpError, CdpResult};

/// Hard ceiling on navigation settle waits.
const SETTLE_CEILING: Duration = Duration::from_secs(30);
/// Quiet period after the document reports ready, letting late subresource
/// activity finish before the page is treated as settled.
const SETTLE_QUIET: Duration = Duration::from_millis(500);

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// One attached page, addressed through a flattened CDP session.
///
/// The signage display owns exactly one of these at a time.
pub struct PageSession {
    client: Arc<CdpClient>,
    session_id: String,
    target_id: String,
}

impl PageSession {
    pub(crate) fn new(client: Arc<CdpClient>, session_id: String, target_id: String) -> Self {
        Self {
            client,
            session_id,
            target_id,
        }
    }

    /// Send a command within this session.
    pub async fn call(&self, method: &str, params: Option<Value>) -> CdpResult<Value> {
        self.client
            .send(method, params, Some(&self.session_id))
            .await
    }

    pub(crate) async fn enable_domains(&self) -> CdpResult<()> {
        self.call("Page.enable", None).await?;
        self.call("Runtime.enable", None).await?;
        debug!("enabled CDP domains for session {}", self.session_id);
        Ok(())
    }

    /// Install a script that runs in every new document before page scripts.
    ///
    /// Used to hide automation fingerprints from the pages being displayed.
    pub async fn add_init_script(&self, source: &str) -> CdpResult<()> {
        self.call(
            "Page.addScriptToEvaluateOnNewDocument",
            Some(json!({"source": source})),
        )
        .await?;
        Ok(())
    }

    /// Navigate and wait for the page to settle.
    pub async fn navigate(&self, url: &str) -> CdpResult<()> {
        let result = self
            .call("Page.navigate", Some(json!({"url": url})))
            .await?;

        if let Some(error) = result.get("errorText").and_then(Value::as_str) {
            if !error.is_empty() {
                return Err(CdpError::NavigationFailed(error.to_string()));
            }
        }

        self.wait_until_settled(SETTLE_QUIET, SETTLE_CEILING).await?;
        debug!("navigated to {}", url);
        Ok(())
    }

    /// Wait until the document is ready, then a further quiet period.
    ///
    /// Bounded by `ceiling`; a hung page fails the wait rather than the
    /// caller.
    pub async fn wait_until_settled(&self, quiet: Duration, ceiling: Duration) -> CdpResult<()> {
        let start = Instant::now();

        loop {
            let state = self.evaluate("document.readyState").await?;
            if let Some(state) = state.as_str() {
                if state == "complete" || state == "interactive" {
                    tokio::time::sleep(quiet).await;
                    return Ok(());
                }
            }

            if start.elapsed() > ceiling {
                return Err(CdpError::Timeout("page settle".to_string()));
            }

            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Evaluate an expression, returning its value.
    pub async fn evaluate(&self, expression: &str) -> CdpResult<Value> {
        let result = self
            .call(
                "Runtime.evaluate",
                Some(json!({"expression": expression, "returnByValue": true})),
            )
            .await?;

        if let Some(details) = result.get("exceptionDetails") {
            let text = details["exception"]["description"]
                .as_str()
                .or_else(|| details["text"].as_str())
                .unwrap_or("unknown exception");
            return Err(CdpError::JavaScript(text.to_string()));
        }

        Ok(result["result"]["value"].clone())
    }

    /// Whether an element matching `selector` currently exists.
    pub async fn selector_exists(&self, selector: &str) -> CdpResult<bool> {
        let expr = format!("!!document.querySelector({})", js_string(selector));
        Ok(self.evaluate(&expr).await?.as_bool().unwrap_or(false))
    }

    /// Poll for `selector` until it appears or `timeout` elapses.
    pub async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> CdpResult<()> {
        let start = Instant::now();

        loop {
            if self.selector_exists(selector).await? {
                return Ok(());
            }

            if start.elapsed() > timeout {
                return Err(CdpError::Timeout(format!("selector {selector:?}")));
            }

            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Set an input's value, firing the events frameworks listen for.
    pub async fn fill(&self, selector: &str, value: &str) -> CdpResult<()> {
        let expr = format!(
            r#"(() => {{
                const el = document.querySelector({sel});
                if (!el) return false;
                el.focus();
                el.value = {val};
                el.dispatchEvent(new Event('input', {{ bubbles: true }}));
                el.dispatchEvent(new Event('change', {{ bubbles: true }}));
                return true;
            }})()"#,
            sel = js_string(selector),
            val = js_string(value),
        );

        match self.evaluate(&expr).await?.as_bool() {
            Some(true) => Ok(()),
            _ => Err(CdpError::ElementNotFound(selector.to_string())),
        }
    }

    /// Click the first element matching `selector`.
    pub async fn click_selector(&self, selector: &str) -> CdpResult<()> {
        let expr = format!(
            r#"(() => {{
                const el = document.querySelector({sel});
                if (!el) return false;
                el.click();
                return true;
            }})()"#,
            sel = js_string(selector),
        );

        match self.evaluate(&expr).await?.as_bool() {
            Some(true) => Ok(()),
            _ => Err(CdpError::ElementNotFound(selector.to_string())),
        }
    }

    /// Replace the document with generated markup.
    pub async fn set_content(&self, html: &str) -> CdpResult<()> {
        let expr = format!(
            "document.open(); document.write({}); document.close();",
            js_string(html)
        );
        self.evaluate(&expr).await?;
        Ok(())
    }

    /// Strip container chrome from the current document.
    pub async fn suppress_chrome(&self) -> CdpResult<()> {
        self.evaluate(
            "document.body.style.margin = '0'; \
             document.body.style.padding = '0'; \
             document.body.style.overflow = 'hidden';",
        )
        .await?;
        Ok(())
    }

    /// Close the page target.
    pub async fn close(&self) -> CdpResult<()> {
        self.client
            .send(
                "Target.closeTarget",
                Some(json!({"targetId": self.target_id})),
                None,
            )
            .await?;
        Ok(())
    }
}

/// Quote a string as a JavaScript literal.
fn js_string(s: &str) -> String {
    Value::String(s.to_string()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_js_string_quotes_and_escapes() {
        assert_eq!(js_string("plain"), r#""plain""#);
        assert_eq!(js_string(r#"a"b"#), r#""a\"b""#);
        assert_eq!(js_string("line\nbreak"), r#""line\nbreak""#);
    }

    #[test]
    fn test_js_string_survives_selector_syntax() {
        let quoted = js_string(r#"input[name="username"]"#);
        assert_eq!(quoted, r#""input[name=\"username\"]""#);
    }
}
