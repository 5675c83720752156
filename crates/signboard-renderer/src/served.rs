//! Server-rendered backend.

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::info;

use signboard_core::SplitOrientation;

use crate::error::RenderError;
use crate::renderer::Renderer;
use crate::split_page;

/// The latest generated display document, or `None` before the first render.
pub type DisplayDocument = watch::Receiver<Option<String>>;

/// Backend B: no browser of its own.
///
/// Publishes the generated display document; the control surface serves it
/// at `GET /` to whatever kiosk browser is pointed there. The document
/// embeds a client-side refresh timer so a dumb browser re-pulls the latest
/// render on the configured cadence; no login automation is possible from
/// here.
pub struct ServedRenderer {
    tx: watch::Sender<Option<String>>,
}

impl ServedRenderer {
    /// Create the renderer and the receiver the `GET /` handler reads.
    pub fn new() -> (Self, DisplayDocument) {
        let (tx, rx) = watch::channel(None);
        (Self { tx }, rx)
    }
}

#[async_trait]
impl Renderer for ServedRenderer {
    async fn show_single(&self, url: &str, refresh_secs: u32) -> Result<(), RenderError> {
        let html = split_page::single_document(url, Some(refresh_secs));
        self.tx.send_replace(Some(html));
        info!("publishing single view of {url}");
        Ok(())
    }

    async fn show_split(
        &self,
        orientation: SplitOrientation,
        primary_url: &str,
        secondary_url: &str,
        refresh_secs: u32,
    ) -> Result<(), RenderError> {
        let html =
            split_page::split_document(orientation, primary_url, secondary_url, Some(refresh_secs));
        self.tx.send_replace(Some(html));
        info!("publishing split view of {primary_url} and {secondary_url}");
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), RenderError> {
        // Nothing external to release: the consuming browser is not ours.
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_document_starts_absent() {
        let (_renderer, rx) = ServedRenderer::new();
        assert!(rx.borrow().is_none());
    }

    #[tokio::test]
    async fn test_single_publishes_document_with_refresh() {
        let (renderer, rx) = ServedRenderer::new();
        renderer
            .show_single("https://example.test/a", 300)
            .await
            .unwrap();

        let doc = rx.borrow().clone().unwrap();
        assert!(doc.contains(r#"src="https://example.test/a""#));
        assert!(doc.contains("location.reload(), 300000"));
    }

    #[tokio::test]
    async fn test_split_replaces_previous_document() {
        let (renderer, rx) = ServedRenderer::new();
        renderer
            .show_single("https://example.test/a", 300)
            .await
            .unwrap();
        renderer
            .show_split(
                SplitOrientation::Vertical,
                "https://example.test/b",
                "https://example.test/c",
                60,
            )
            .await
            .unwrap();

        let doc = rx.borrow().clone().unwrap();
        assert!(doc.contains("flex-direction: column"));
        assert!(!doc.contains("https://example.test/a"));
    }
}
