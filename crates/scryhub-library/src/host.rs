//! Request dispatch for a library peer.

use crate::handler::StoreHandler;
use scryhub_protocol::{
    CardLookupResponse, LibraryRequest, ListStoresResponse, ProtocolCheckResponse,
    PROTOCOL_VERSION,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// A library peer: a protocol version and the stores it hosts.
///
/// The host never panics on peer input; anything it cannot process comes
/// back as an `ok: false` response so the hub's double-unwrap convention
/// holds. Store order is stable by key.
pub struct LibraryHost {
    version: String,
    handlers: BTreeMap<String, Arc<dyn StoreHandler>>,
}

impl LibraryHost {
    /// A host speaking the crate's own protocol version, with no stores yet.
    pub fn new() -> Self {
        Self::speaking(PROTOCOL_VERSION)
    }

    /// A host claiming a specific protocol version.
    pub fn speaking(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            handlers: BTreeMap::new(),
        }
    }

    /// Host a store; a second handler under the same key replaces the first.
    pub fn with_store(mut self, handler: Arc<dyn StoreHandler>) -> Self {
        self.handlers.insert(handler.meta().key.clone(), handler);
        self
    }

    /// Answer one decoded request.
    pub async fn handle(&self, request: LibraryRequest) -> Vec<u8> {
        match request {
            LibraryRequest::ProtocolCheck => {
                debug!("answering protocol check with {}", self.version);
                ProtocolCheckResponse::speaking(&self.version).to_json()
            }
            LibraryRequest::ListStores => {
                let stores = self.handlers.values().map(|h| h.meta()).collect();
                ListStoresResponse::listing(stores).to_json()
            }
            LibraryRequest::LookupCard {
                store_key,
                descriptor,
            } => {
                let handler = match self.handlers.get(&store_key) {
                    Some(handler) => handler,
                    None => {
                        warn!("lookup addressed an unknown store {}", store_key);
                        return CardLookupResponse::failed(format!("Invalid store {store_key}"))
                            .to_json();
                    }
                };

                match handler.lookup_card(&descriptor).await {
                    Ok(result) => CardLookupResponse::answered(store_key, result).to_json(),
                    Err(e) => {
                        warn!("store {} failed to look up a card: {}", store_key, e);
                        CardLookupResponse {
                            ok: false,
                            store_key: Some(store_key),
                            result: None,
                            error: Some(e.to_string()),
                        }
                        .to_json()
                    }
                }
            }
        }
    }

    /// Answer raw request bytes, as a transport delivers them.
    ///
    /// Undecodable input gets a generic failure; there is no way to tell
    /// which operation the sender meant.
    pub async fn handle_raw(&self, data: &[u8]) -> Vec<u8> {
        match LibraryRequest::from_json(data) {
            Some(request) => self.handle(request).await,
            None => {
                warn!("dropping request that does not decode as any operation");
                serde_json::to_vec(&serde_json::json!({
                    "ok": false,
                    "error": "unrecognized request",
                }))
                .unwrap_or_default()
            }
        }
    }
}

impl Default for LibraryHost {
    fn default() -> Self {
        Self::new()
    }
}
