//! Hub coordinator: a background task owning the transport.
//!
//! UI surfaces and background jobs do not talk to libraries directly; they
//! send a [`HubRequest`] to the coordinator and wait on a oneshot for the
//! reply. The coordinator serves requests one at a time with a
//! [`DirectClient`], so code already running inside it must never go through
//! a [`RoutedClient`] — it would deadlock waiting on itself.

use crate::transport::{DirectClient, LibraryClient, LibraryTransport, TransportError};
use async_trait::async_trait;
use scryhub_protocol::{
    CardLookupDescriptor, CardLookupResponse, ListStoresResponse, ProtocolCheckResponse,
};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

/// Tag for routed card lookups.
pub const HUB_LOOKUP_CARD: &str = "hub.lookupSpecific";

/// Tag for routed store listings.
pub const HUB_LIST_STORES: &str = "hub.getLibraryStores";

/// Tag for routed protocol checks.
pub const HUB_CHECK_LIBRARY_COMPAT: &str = "hub.libraryProtocolCheck";

/// A library-bound request as the hub's own surfaces phrase it.
///
/// These tags are hub-internal; they never reach a library peer, which only
/// ever sees the `scryhub.*` operation tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum HubRequest {
    #[serde(rename = "hub.lookupSpecific", rename_all = "camelCase")]
    LookupCard {
        library_id: String,
        store_key: String,
        descriptor: CardLookupDescriptor,
    },
    #[serde(rename = "hub.getLibraryStores", rename_all = "camelCase")]
    ListStores { library_id: String },
    #[serde(rename = "hub.libraryProtocolCheck", rename_all = "camelCase")]
    CheckProtocol { library_id: String },
}

/// Reply to a routed request, one variant per operation.
#[derive(Debug, Clone, PartialEq)]
pub enum HubReply {
    ProtocolCheck(ProtocolCheckResponse),
    ListStores(ListStoresResponse),
    LookupCard(CardLookupResponse),
}

struct Envelope {
    request: HubRequest,
    reply_tx: oneshot::Sender<Result<HubReply, TransportError>>,
}

/// Owns the transport and serves routed requests sequentially.
pub struct Coordinator;

impl Coordinator {
    /// Start the coordinator task; the returned client routes through it.
    ///
    /// The task exits once every [`RoutedClient`] clone has been dropped.
    pub fn spawn<T: LibraryTransport + 'static>(transport: T) -> RoutedClient {
        let (tx, mut rx) = mpsc::channel::<Envelope>(32);
        let client = DirectClient::new(transport);

        tokio::spawn(async move {
            info!("hub coordinator started");
            while let Some(envelope) = rx.recv().await {
                let reply = Self::serve(&client, envelope.request).await;
                // A caller that stopped waiting just discards its reply
                let _ = envelope.reply_tx.send(reply);
            }
            info!("hub coordinator stopped");
        });

        RoutedClient { tx }
    }

    async fn serve<T: LibraryTransport>(
        client: &DirectClient<T>,
        request: HubRequest,
    ) -> Result<HubReply, TransportError> {
        match request {
            HubRequest::CheckProtocol { library_id } => {
                debug!("routing protocol check to {}", library_id);
                client
                    .check_protocol(&library_id)
                    .await
                    .map(HubReply::ProtocolCheck)
            }
            HubRequest::ListStores { library_id } => {
                debug!("routing store listing to {}", library_id);
                client
                    .list_stores(&library_id)
                    .await
                    .map(HubReply::ListStores)
            }
            HubRequest::LookupCard {
                library_id,
                store_key,
                descriptor,
            } => {
                debug!("routing lookup to {}/{}", library_id, store_key);
                client
                    .lookup_card(&library_id, &store_key, &descriptor)
                    .await
                    .map(HubReply::LookupCard)
            }
        }
    }
}

/// Client handle that routes every call through the coordinator task.
#[derive(Clone)]
pub struct RoutedClient {
    tx: mpsc::Sender<Envelope>,
}

impl RoutedClient {
    async fn route(&self, request: HubRequest) -> Result<HubReply, TransportError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(Envelope { request, reply_tx })
            .await
            .map_err(|_| TransportError::Unreachable("hub coordinator stopped".into()))?;
        reply_rx
            .await
            .map_err(|_| TransportError::Unreachable("hub coordinator stopped".into()))?
    }
}

#[async_trait]
impl LibraryClient for RoutedClient {
    async fn check_protocol(
        &self,
        library_id: &str,
    ) -> Result<ProtocolCheckResponse, TransportError> {
        match self
            .route(HubRequest::CheckProtocol {
                library_id: library_id.to_string(),
            })
            .await?
        {
            HubReply::ProtocolCheck(response) => Ok(response),
            other => Err(TransportError::MalformedResponse(format!(
                "coordinator answered the wrong operation: {other:?}"
            ))),
        }
    }

    async fn list_stores(&self, library_id: &str) -> Result<ListStoresResponse, TransportError> {
        match self
            .route(HubRequest::ListStores {
                library_id: library_id.to_string(),
            })
            .await?
        {
            HubReply::ListStores(response) => Ok(response),
            other => Err(TransportError::MalformedResponse(format!(
                "coordinator answered the wrong operation: {other:?}"
            ))),
        }
    }

    async fn lookup_card(
        &self,
        library_id: &str,
        store_key: &str,
        descriptor: &CardLookupDescriptor,
    ) -> Result<CardLookupResponse, TransportError> {
        match self
            .route(HubRequest::LookupCard {
                library_id: library_id.to_string(),
                store_key: store_key.to_string(),
                descriptor: descriptor.clone(),
            })
            .await?
        {
            HubReply::LookupCard(response) => Ok(response),
            other => Err(TransportError::MalformedResponse(format!(
                "coordinator answered the wrong operation: {other:?}"
            ))),
        }
    }
}
