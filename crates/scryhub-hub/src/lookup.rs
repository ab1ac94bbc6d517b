//! Hub-wide card lookup: fan one descriptor out to every enabled store.
//!
//! Compatibility is refreshed first (honoring the TTL); incompatible
//! libraries are skipped silently. Stores are asked one at a time and a
//! failure at one store never aborts the sweep. Each store's raw offers are
//! ranked down to at most one pick per finish before the outcome is
//! collected.

use crate::compat::{is_library_compatible, update_compatibilities};
use crate::ranking::pick_top_per_finish;
use crate::settings::SettingsStore;
use crate::transport::LibraryClient;
use anyhow::Result;
use scryhub_protocol::{CardLookupDescriptor, FoundCardInformation};
use tracing::{debug, info, warn};

/// What one store had to say about the card.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreOutcome {
    /// The store has no matching card (or could not be asked).
    NotFound,
    /// The winning offers, at most one per finish.
    Found(Vec<FoundCardInformation>),
}

/// One store's contribution to a hub-wide lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreLookupOutcome {
    pub library_id: String,
    pub store_key: String,
    pub store_name: String,
    pub outcome: StoreOutcome,
}

/// Ask every enabled store of every compatible library about one card.
///
/// The result carries one entry per store asked, in registry order, so
/// callers can render "not found at X" alongside the hits. Only a settings
/// failure aborts; per-store trouble degrades to `NotFound`.
pub async fn lookup_everywhere(
    store: &dyn SettingsStore,
    client: &dyn LibraryClient,
    descriptor: &CardLookupDescriptor,
) -> Result<Vec<StoreLookupOutcome>> {
    let libraries = update_compatibilities(store, client, true).await?;
    info!(
        "looking up \"{}\" across {} libraries",
        descriptor.name,
        libraries.len()
    );

    let mut outcomes = Vec::new();
    for library in &libraries {
        if !is_library_compatible(library) {
            debug!("skipping incompatible library {}", library.id);
            continue;
        }

        for entry in library.enabled_stores() {
            let outcome = lookup_one(client, &library.id, &entry.key, descriptor).await;
            outcomes.push(StoreLookupOutcome {
                library_id: library.id.clone(),
                store_key: entry.key.clone(),
                store_name: entry.name.clone(),
                outcome,
            });
        }
    }

    Ok(outcomes)
}

/// Ask one store, collapsing every failure mode into `NotFound`.
async fn lookup_one(
    client: &dyn LibraryClient,
    library_id: &str,
    store_key: &str,
    descriptor: &CardLookupDescriptor,
) -> StoreOutcome {
    let response = match client.lookup_card(library_id, store_key, descriptor).await {
        Ok(response) => response,
        Err(e) => {
            warn!(
                "lookup at {}/{} failed: {}; treating as not found",
                library_id, store_key, e
            );
            return StoreOutcome::NotFound;
        }
    };

    if !response.ok {
        warn!(
            "store {}/{} reported failure: {}",
            library_id,
            store_key,
            response.error.as_deref().unwrap_or("no reason given")
        );
        return StoreOutcome::NotFound;
    }

    let result = match response.result {
        Some(result) if result.found => result,
        _ => return StoreOutcome::NotFound,
    };

    let picks = pick_top_per_finish(&result.cards, &descriptor.finish_treatments);
    if picks.is_empty() {
        // Found offers, but none in a finish the caller wants
        return StoreOutcome::NotFound;
    }
    StoreOutcome::Found(picks)
}
