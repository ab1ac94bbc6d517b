//! The seam a store implementation plugs into.

use async_trait::async_trait;
use scryhub_protocol::{CardLookupDescriptor, CardLookupResult, StoreMeta};

/// One store a library hosts.
///
/// Implementations typically wrap a storefront scraper or API client. Errors
/// from [`lookup_card`](StoreHandler::lookup_card) stay inside the library;
/// the host turns them into protocol-level failures, so a handler can bubble
/// its own error types freely with `?`.
#[async_trait]
pub trait StoreHandler: Send + Sync {
    /// How this store describes itself to hubs.
    fn meta(&self) -> StoreMeta;

    /// Look the card up at this store.
    ///
    /// "Not found" is a successful result, not an error; reserve `Err` for
    /// the store actually failing (network trouble, parse failures).
    async fn lookup_card(
        &self,
        descriptor: &CardLookupDescriptor,
    ) -> anyhow::Result<CardLookupResult>;
}
