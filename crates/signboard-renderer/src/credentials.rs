//! Credential resolution.

use std::sync::Arc;

use tracing::debug;
use url::Url;

use signboard_core::{Credential, CredentialStore};

/// Looks up stored credentials for a target URL's host.
///
/// Pure query, no caching: reconciliation runs at most once per tick, so
/// re-querying is correct by simplicity. Matching is exact hostname only.
pub struct CredentialResolver {
    store: Arc<dyn CredentialStore>,
}

impl CredentialResolver {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// Resolve credentials for `url`, or `None`.
    ///
    /// A malformed URL or a store failure degrades to `None`: the caller
    /// proceeds unauthenticated rather than failing the render.
    pub async fn resolve(&self, url: &str) -> Option<Credential> {
        let host = match Url::parse(url) {
            Ok(parsed) => parsed.host_str()?.to_string(),
            Err(e) => {
                debug!("cannot extract host from {url:?}: {e}");
                return None;
            }
        };

        match self.store.credential_for(&host).await {
            Ok(credential) => credential,
            Err(e) => {
                debug!("credential lookup for {host} failed: {e}");
                None
            }
        }
    }
}
