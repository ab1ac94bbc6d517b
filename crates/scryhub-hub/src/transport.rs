//! Peer transport: timeout-bounded delivery of one request to one library.
//!
//! The boundary channel is the [`LibraryTransport`] trait; the hub never
//! assumes anything about how a peer is reached. [`DirectClient`] wraps a
//! transport with the typed operations and a per-call timeout race: whichever
//! of answer and timer resolves first wins, the loser is dropped. There are
//! no retries here; retry policy, if any, belongs to the caller.
//!
//! A transport-level success still carries the peer's own `ok` flag inside
//! the decoded response; callers unwrap twice.

use async_trait::async_trait;
use scryhub_protocol::{
    CardLookupDescriptor, CardLookupResponse, LibraryRequest, ListStoresResponse,
    ProtocolCheckResponse,
};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// How long to wait for a peer's answer before giving up.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

#[derive(Debug, Error)]
pub enum TransportError {
    /// The timer won the race; any late answer is discarded.
    #[error("timeout")]
    Timeout,

    /// Delivery failed: no such peer, or the channel reported an error.
    #[error("library unreachable: {0}")]
    Unreachable(String),

    /// The peer answered with bytes that do not decode as the expected shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Addressed delivery of one encoded request to one library peer.
///
/// Implementations must distinguish delivery failure (`Unreachable`) from a
/// peer that answered with a protocol-level failure; the latter is a normal
/// `Ok` carrying the peer's response bytes.
#[async_trait]
pub trait LibraryTransport: Send + Sync {
    async fn call(
        &self,
        library_id: &str,
        request: &LibraryRequest,
    ) -> Result<Vec<u8>, TransportError>;
}

/// The typed operations a hub performs against a library.
///
/// Two implementations exist: [`DirectClient`] talks straight to a transport,
/// and [`crate::coordinator::RoutedClient`] goes through the hub coordinator
/// task. Code already running inside the coordinator must use a direct
/// client, otherwise it would wait on itself.
#[async_trait]
pub trait LibraryClient: Send + Sync {
    async fn check_protocol(
        &self,
        library_id: &str,
    ) -> Result<ProtocolCheckResponse, TransportError>;

    async fn list_stores(&self, library_id: &str) -> Result<ListStoresResponse, TransportError>;

    async fn lookup_card(
        &self,
        library_id: &str,
        store_key: &str,
        descriptor: &CardLookupDescriptor,
    ) -> Result<CardLookupResponse, TransportError>;
}

/// Client that calls the transport directly, racing each call against a timer.
pub struct DirectClient<T> {
    transport: T,
    timeout: Duration,
}

impl<T: LibraryTransport> DirectClient<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the per-call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn call<R: DeserializeOwned>(
        &self,
        library_id: &str,
        request: LibraryRequest,
    ) -> Result<R, TransportError> {
        let raw = match tokio::time::timeout(
            self.timeout,
            self.transport.call(library_id, &request),
        )
        .await
        {
            // Timer fired first; the in-flight call is dropped with it.
            Err(_elapsed) => {
                debug!("call to library {} timed out", library_id);
                return Err(TransportError::Timeout);
            }
            Ok(delivery) => delivery?,
        };

        serde_json::from_slice(&raw)
            .map_err(|e| TransportError::MalformedResponse(e.to_string()))
    }
}

#[async_trait]
impl<T: LibraryTransport> LibraryClient for DirectClient<T> {
    async fn check_protocol(
        &self,
        library_id: &str,
    ) -> Result<ProtocolCheckResponse, TransportError> {
        self.call(library_id, LibraryRequest::ProtocolCheck).await
    }

    async fn list_stores(&self, library_id: &str) -> Result<ListStoresResponse, TransportError> {
        self.call(library_id, LibraryRequest::ListStores).await
    }

    async fn lookup_card(
        &self,
        library_id: &str,
        store_key: &str,
        descriptor: &CardLookupDescriptor,
    ) -> Result<CardLookupResponse, TransportError> {
        self.call(
            library_id,
            LibraryRequest::LookupCard {
                store_key: store_key.to_string(),
                descriptor: descriptor.clone(),
            },
        )
        .await
    }
}

/// A library peer reachable without leaving the process.
#[async_trait]
pub trait LibraryEndpoint: Send + Sync {
    /// Answer one request with encoded response bytes.
    async fn handle(&self, request: LibraryRequest) -> Vec<u8>;
}

/// In-process transport: a registry of endpoints keyed by library id.
///
/// Stands in for the deployment's real message channel; unknown ids surface
/// as `Unreachable`, the same way an absent peer would.
#[derive(Clone, Default)]
pub struct InProcessTransport {
    endpoints: Arc<RwLock<HashMap<String, Arc<dyn LibraryEndpoint>>>>,
}

impl InProcessTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `endpoint` reachable under `library_id`, replacing any previous one.
    pub fn register(&self, library_id: impl Into<String>, endpoint: Arc<dyn LibraryEndpoint>) {
        let mut endpoints = self.endpoints.write().unwrap_or_else(|e| e.into_inner());
        endpoints.insert(library_id.into(), endpoint);
    }

    /// Drop the endpoint under `library_id`; later calls become unreachable.
    pub fn unregister(&self, library_id: &str) {
        let mut endpoints = self.endpoints.write().unwrap_or_else(|e| e.into_inner());
        endpoints.remove(library_id);
    }
}

#[async_trait]
impl LibraryTransport for InProcessTransport {
    async fn call(
        &self,
        library_id: &str,
        request: &LibraryRequest,
    ) -> Result<Vec<u8>, TransportError> {
        let endpoint = {
            let endpoints = self.endpoints.read().unwrap_or_else(|e| e.into_inner());
            endpoints.get(library_id).cloned()
        };

        match endpoint {
            Some(endpoint) => Ok(endpoint.handle(request.clone()).await),
            None => Err(TransportError::Unreachable(format!(
                "no library registered with id {library_id}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scryhub_protocol::PROTOCOL_VERSION;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Endpoint that answers every request as a protocol check, optionally
    /// after a delay.
    struct SlowEndpoint {
        delay: Duration,
        answers: AtomicUsize,
    }

    impl SlowEndpoint {
        fn new(delay: Duration) -> Self {
            Self {
                delay,
                answers: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl LibraryEndpoint for SlowEndpoint {
        async fn handle(&self, _request: LibraryRequest) -> Vec<u8> {
            tokio::time::sleep(self.delay).await;
            self.answers.fetch_add(1, Ordering::SeqCst);
            ProtocolCheckResponse::speaking(PROTOCOL_VERSION).to_json()
        }
    }

    struct GarbageEndpoint;

    #[async_trait]
    impl LibraryEndpoint for GarbageEndpoint {
        async fn handle(&self, _request: LibraryRequest) -> Vec<u8> {
            b"definitely not json".to_vec()
        }
    }

    fn wired(endpoint: Arc<dyn LibraryEndpoint>) -> DirectClient<InProcessTransport> {
        let transport = InProcessTransport::new();
        transport.register("lib-1", endpoint);
        DirectClient::new(transport)
    }

    // ==================== Happy path ====================

    #[tokio::test]
    async fn test_prompt_answer_is_delivered() {
        let client = wired(Arc::new(SlowEndpoint::new(Duration::ZERO)));
        let response = client.check_protocol("lib-1").await.unwrap();

        assert!(response.ok);
        assert_eq!(response.protocol_version.as_deref(), Some(PROTOCOL_VERSION));
    }

    // ==================== Timeout race ====================

    #[tokio::test(start_paused = true)]
    async fn test_slow_peer_resolves_as_timeout() {
        let endpoint = Arc::new(SlowEndpoint::new(Duration::from_secs(60)));
        let client = wired(endpoint.clone());

        let result = client.check_protocol("lib-1").await;
        assert!(matches!(result, Err(TransportError::Timeout)));

        // The race dropped the pending call; the late answer never landed.
        assert_eq!(endpoint.answers.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_answer_just_inside_timeout_wins() {
        let endpoint = Arc::new(SlowEndpoint::new(DEFAULT_TIMEOUT - Duration::from_millis(1)));
        let client = wired(endpoint);

        let response = client.check_protocol("lib-1").await.unwrap();
        assert!(response.ok);
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_timeout_is_respected() {
        let endpoint = Arc::new(SlowEndpoint::new(Duration::from_millis(100)));
        let client = wired(endpoint).with_timeout(Duration::from_millis(50));

        let result = client.check_protocol("lib-1").await;
        assert!(matches!(result, Err(TransportError::Timeout)));
    }

    // ==================== Delivery failures ====================

    #[tokio::test]
    async fn test_unknown_library_is_unreachable() {
        let client = DirectClient::new(InProcessTransport::new());
        let result = client.check_protocol("nobody-home").await;

        match result {
            Err(TransportError::Unreachable(msg)) => assert!(msg.contains("nobody-home")),
            other => panic!("expected Unreachable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unregister_makes_peer_unreachable() {
        let transport = InProcessTransport::new();
        transport.register("lib-1", Arc::new(SlowEndpoint::new(Duration::ZERO)));
        transport.unregister("lib-1");

        let client = DirectClient::new(transport);
        assert!(matches!(
            client.check_protocol("lib-1").await,
            Err(TransportError::Unreachable(_))
        ));
    }

    #[tokio::test]
    async fn test_undecodable_answer_is_malformed() {
        let client = wired(Arc::new(GarbageEndpoint));
        let result = client.check_protocol("lib-1").await;
        assert!(matches!(result, Err(TransportError::MalformedResponse(_))));
    }
}
