//! URL resolver chain.
//!
//! A resolver turns a page URL into a deferred [`Loader`]. The loader, given
//! a [`Client`] and the statuses already known, launches whatever receiver
//! app it needs (typically through [`crate::MediaApp`]) and returns a
//! channel of delivery progress payloads.
//!
//! Resolvers are tried in the order they were added; the first success wins.
//!
//! # Example
//!
//! ```ignore
//! let chain = ResolverChain::new()
//!     .with(SiteA::default())
//!     .with(SiteB::default());
//!
//! let mut progress = chain.load(url, &client, &[status]).await?;
//! while let Some(update) = progress.recv().await { /* ... */ }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use async_trait::async_trait;
use futures_util::future::BoxFuture;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use url::Url;

use crate::client::Client;
use crate::error::{Error, Result};
use crate::protocol::Status;
use crate::transport::Payload;

// ============================================================================
// Types
// ============================================================================

/// Channel of delivery progress payloads produced by a loader.
pub type Delivery = mpsc::Receiver<Payload>;

/// Deferred load operation returned by a resolver.
pub type Loader = Box<dyn FnOnce(Client, Vec<Status>) -> BoxFuture<'static, Result<Delivery>> + Send>;

// ============================================================================
// UrlResolver
// ============================================================================

/// Turns a URL into a [`Loader`].
#[async_trait]
pub trait UrlResolver: Send + Sync {
    /// Short name used in logs and errors.
    fn name(&self) -> &str;

    /// Resolves `url`, or fails with [`Error::Resolver`] if unsupported.
    async fn resolve(&self, url: &Url) -> Result<Loader>;
}

// ============================================================================
// ResolverChain
// ============================================================================

/// Ordered list of resolvers.
#[derive(Default)]
pub struct ResolverChain {
    resolvers: Vec<Box<dyn UrlResolver>>,
}

impl fmt::Debug for ResolverChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverChain")
            .field("resolvers", &self.names())
            .finish()
    }
}

impl ResolverChain {
    /// Creates an empty chain.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a resolver with the lowest priority so far.
    #[inline]
    #[must_use]
    pub fn with(mut self, resolver: impl UrlResolver + 'static) -> Self {
        self.push(resolver);
        self
    }

    /// Appends a resolver with the lowest priority so far.
    pub fn push(&mut self, resolver: impl UrlResolver + 'static) {
        self.resolvers.push(Box::new(resolver));
    }

    /// Returns resolver names in priority order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.resolvers.iter().map(|r| r.name()).collect()
    }

    /// Returns the first resolver result that succeeds.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if `raw_url` is not an absolute URL
    /// - [`Error::NoResolver`] if every resolver fails
    pub async fn resolve(&self, raw_url: &str) -> Result<(&str, Loader)> {
        let url = parse_url(raw_url)?;

        for resolver in &self.resolvers {
            match resolver.resolve(&url).await {
                Ok(loader) => {
                    debug!(resolver = resolver.name(), url = %url, "Resolved URL");
                    return Ok((resolver.name(), loader));
                }
                Err(e) => {
                    debug!(resolver = resolver.name(), error = %e, "Resolver declined");
                }
            }
        }

        Err(Error::no_resolver(raw_url))
    }

    /// Resolves `raw_url` and runs the loader.
    ///
    /// A resolver whose loader fails is skipped like one that failed to
    /// resolve.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if `raw_url` is not an absolute URL
    /// - [`Error::NoResolver`] if no resolver both resolves and loads
    pub async fn load(&self, raw_url: &str, client: &Client, statuses: &[Status]) -> Result<Delivery> {
        let url = parse_url(raw_url)?;

        for resolver in &self.resolvers {
            let loader = match resolver.resolve(&url).await {
                Ok(loader) => loader,
                Err(e) => {
                    debug!(resolver = resolver.name(), error = %e, "Resolver declined");
                    continue;
                }
            };

            match loader(client.clone(), statuses.to_vec()).await {
                Ok(delivery) => {
                    debug!(resolver = resolver.name(), url = %url, "Loaded URL");
                    return Ok(delivery);
                }
                Err(e) => {
                    warn!(resolver = resolver.name(), error = %e, "Unable to load");
                }
            }
        }

        Err(Error::no_resolver(raw_url))
    }
}

/// Parses an absolute URL.
fn parse_url(raw_url: &str) -> Result<Url> {
    Url::parse(raw_url)
        .map_err(|e| Error::invalid_argument(format!("could not parse url '{raw_url}': {e}")))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use futures_util::FutureExt;
    use tokio::io::duplex;

    use serde_json::json;

    use crate::command::{Addressing, DEFAULT_MEDIA_RECEIVER, MediaApp};
    use crate::protocol::MediaItem;
    use crate::testing::FakeReceiver;
    use crate::transport::ConnectionOptions;

    /// Resolver that accepts one host and records how often it was asked.
    struct HostResolver {
        name: &'static str,
        host: &'static str,
        fail_load: bool,
        calls: Arc<AtomicUsize>,
    }

    impl HostResolver {
        fn new(name: &'static str, host: &'static str) -> Self {
            Self {
                name,
                host,
                fail_load: false,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl UrlResolver for HostResolver {
        fn name(&self) -> &str {
            self.name
        }

        async fn resolve(&self, url: &Url) -> Result<Loader> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if url.host_str() != Some(self.host) {
                return Err(Error::resolver(self.name, "unsupported host"));
            }

            let name = self.name;
            let fail = self.fail_load;
            Ok(Box::new(move |_client: Client, statuses: Vec<Status>| {
                async move {
                    if fail {
                        return Err(Error::resolver(name, "load failed"));
                    }
                    let (tx, rx) = mpsc::channel(4);
                    let note = format!(r#"{{"by":"{name}","known":{}}}"#, statuses.len());
                    tx.send(note.into_bytes()).await.map_err(|_| Error::ConnectionClosed)?;
                    Ok(rx)
                }
                .boxed()
            }))
        }
    }

    /// Resolver for direct `.mp4` links, played by the default media receiver.
    struct Mp4Resolver;

    #[async_trait]
    impl UrlResolver for Mp4Resolver {
        fn name(&self) -> &str {
            "mp4"
        }

        async fn resolve(&self, url: &Url) -> Result<Loader> {
            if !url.path().ends_with(".mp4") {
                return Err(Error::resolver("mp4", "not an mp4 link"));
            }

            let content_id = url.to_string();
            Ok(Box::new(move |client: Client, statuses: Vec<Status>| {
                async move {
                    let app = MediaApp::launch_and_connect(&client, &statuses).await?;
                    app.load(MediaItem::new(content_id, "video/mp4")).await
                }
                .boxed()
            }))
        }
    }

    async fn client() -> (Client, FakeReceiver) {
        let (local, remote) = duplex(64 * 1024);
        let client = Client::connect(local, ConnectionOptions::default(), Addressing::default())
            .await
            .expect("client");
        (client, FakeReceiver::new(remote))
    }

    #[tokio::test]
    async fn test_first_match_wins_in_order() {
        let first = HostResolver::new("first", "example.com");
        let second = HostResolver::new("second", "example.com");
        let second_calls = Arc::clone(&second.calls);

        let chain = ResolverChain::new().with(first).with(second);
        assert_eq!(chain.names(), vec!["first", "second"]);

        let (name, _loader) = chain.resolve("https://example.com/v/1").await.expect("resolve");
        assert_eq!(name, "first");
        assert_eq!(second_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_falls_through_to_next() {
        let chain = ResolverChain::new()
            .with(HostResolver::new("a", "a.example"))
            .with(HostResolver::new("b", "b.example"));

        let (name, _) = chain.resolve("https://b.example/x").await.expect("resolve");
        assert_eq!(name, "b");
    }

    #[tokio::test]
    async fn test_no_resolver() {
        let chain = ResolverChain::new().with(HostResolver::new("a", "a.example"));

        let result = chain.resolve("https://elsewhere.example/").await;
        assert!(matches!(result, Err(Error::NoResolver { .. })));
    }

    #[tokio::test]
    async fn test_relative_url_rejected() {
        let chain = ResolverChain::new().with(HostResolver::new("a", "a.example"));

        let result = chain.resolve("/just/a/path").await;
        assert!(matches!(result, Err(Error::InvalidArgument { .. })));
    }

    #[tokio::test]
    async fn test_load_skips_failing_loader() {
        let (client, _receiver) = client().await;

        let mut broken = HostResolver::new("broken", "example.com");
        broken.fail_load = true;
        let chain = ResolverChain::new()
            .with(broken)
            .with(HostResolver::new("working", "example.com"));

        let mut delivery = chain
            .load("https://example.com/v", &client, &[Status::default()])
            .await
            .expect("load");

        let update = delivery.recv().await.expect("progress");
        assert_eq!(update, br#"{"by":"working","known":1}"#);
    }

    #[tokio::test]
    async fn test_load_all_failing() {
        let (client, _receiver) = client().await;

        let mut broken = HostResolver::new("broken", "example.com");
        broken.fail_load = true;
        let chain = ResolverChain::new().with(broken);

        let result = chain.load("https://example.com/v", &client, &[]).await;
        assert!(matches!(result, Err(Error::NoResolver { .. })));
    }

    #[tokio::test]
    async fn test_media_loader_plays_link() {
        let (client, receiver) = client().await;
        let _ = receiver.next_json().await;

        let running: Status = serde_json::from_value(json!({
            "applications": [{ "appId": DEFAULT_MEDIA_RECEIVER, "transportId": "web-2" }]
        }))
        .expect("status");
        let known = [running];
        let chain = ResolverChain::new()
            .with(HostResolver::new("other", "other.example"))
            .with(Mp4Resolver);

        let (delivery, load) = tokio::join!(
            chain.load("https://cdn.example/clip.mp4", &client, &known),
            async {
                let (_, connect) = receiver.next_json().await;
                assert_eq!(connect["type"], "CONNECT");
                let (env, load) = receiver.next_json().await;
                let reply = json!({ "type": "MEDIA_STATUS", "requestId": load["requestId"], "status": [] });
                receiver.send_json(&env.reply(), &reply).await;
                load
            }
        );

        assert_eq!(load["type"], "LOAD");
        assert_eq!(load["media"]["contentId"], "https://cdn.example/clip.mp4");
        let mut delivery = delivery.expect("load");
        assert!(delivery.recv().await.is_some());
    }
}
