//! Registry operations: the hub's canonical list of library peers.
//!
//! Every operation follows the same shape: load the full list from settings,
//! act on it in memory, save the full list back, return the persisted list.
//! The settings store is the single source of truth between operations.

use crate::compat::{ensure_compatibility, is_library_compatible, now_ms};
use crate::library::{Library, StoreEntry};
use crate::settings::{load_libraries, save_libraries, SettingsStore};
use crate::transport::LibraryClient;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("unknown library id: {0}")]
    UnknownLibrary(String),

    #[error("unknown store {store_key} in library {library_id}")]
    UnknownStore {
        library_id: String,
        store_key: String,
    },

    /// The peer was reachable but would not enumerate its stores.
    #[error("library {library_id} failed to list stores: {reason}")]
    StoreDiscovery { library_id: String, reason: String },

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// The registered libraries, as persisted.
pub fn get_libraries(store: &dyn SettingsStore) -> Result<Vec<Library>, RegistryError> {
    Ok(load_libraries(store)?)
}

/// Register a library (or re-register an existing id).
///
/// Compatibility is checked immediately, ignoring the TTL; a compatible peer
/// also has its stores discovered, all enabled. An incompatible peer is still
/// registered, with no stores, so the user can see why it is not serving
/// lookups. Re-registering an existing id replaces its stores and
/// compatibility record; the saved name is only replaced when a new one is
/// given. Returns the full registry as persisted.
pub async fn add_library(
    store: &dyn SettingsStore,
    client: &dyn LibraryClient,
    library_id: &str,
    name: Option<String>,
) -> Result<Vec<Library>, RegistryError> {
    let mut library = Library::new(library_id, name.clone());
    ensure_compatibility(&mut library, client, false, now_ms()).await;

    if is_library_compatible(&library) {
        library.stores = fetch_stores(client, library_id).await?;
        info!(
            "registered library {} with {} stores",
            library_id,
            library.stores.len()
        );
    } else {
        warn!("registered library {} but it is not compatible", library_id);
    }

    let mut libraries = load_libraries(store)?;
    match libraries.iter().position(|l| l.id == library_id) {
        Some(index) => {
            let existing = &mut libraries[index];
            existing.stores = library.stores;
            // The check just ran, so the fresh verdict replaces the prior
            // record's cache rather than leaving a stale stamp behind.
            existing.compatibility = library.compatibility;
            if name.is_some() {
                existing.name = name;
            }
        }
        None => libraries.push(library),
    }

    save_libraries(store, &libraries)?;
    Ok(libraries)
}

/// Remove a library; removing an id that is not registered changes nothing.
///
/// Returns the full registry as persisted.
pub fn remove_library(
    store: &dyn SettingsStore,
    library_id: &str,
) -> Result<Vec<Library>, RegistryError> {
    let mut libraries = load_libraries(store)?;
    let before = libraries.len();
    libraries.retain(|l| l.id != library_id);

    if libraries.len() < before {
        info!("removed library {}", library_id);
    }
    save_libraries(store, &libraries)?;
    Ok(libraries)
}

/// Re-discover a library's stores from the peer.
///
/// Compatibility is rechecked first, ignoring the TTL; the fresh verdict is
/// persisted even when the peer turns out incompatible or unreachable, so the
/// failure itself is on record. Stores surviving the refresh keep their
/// `enabled` flags; stores the peer no longer reports are dropped, and newly
/// reported ones arrive enabled. Returns the full registry as persisted.
pub async fn refresh_stores(
    store: &dyn SettingsStore,
    client: &dyn LibraryClient,
    library_id: &str,
) -> Result<Vec<Library>, RegistryError> {
    let mut libraries = load_libraries(store)?;
    let index = libraries
        .iter()
        .position(|l| l.id == library_id)
        .ok_or_else(|| RegistryError::UnknownLibrary(library_id.to_string()))?;

    ensure_compatibility(&mut libraries[index], client, false, now_ms()).await;

    if !is_library_compatible(&libraries[index]) {
        warn!("not refreshing stores for incompatible library {}", library_id);
        save_libraries(store, &libraries)?;
        return Ok(libraries);
    }

    match fetch_stores(client, library_id).await {
        Ok(fresh) => {
            let library = &mut libraries[index];
            library.stores = merge_stores(&library.stores, fresh);
            save_libraries(store, &libraries)?;
            Ok(libraries)
        }
        Err(e) => {
            // Keep the compatibility stamp even though discovery failed
            save_libraries(store, &libraries)?;
            Err(e)
        }
    }
}

/// Recheck one library's compatibility on demand, ignoring the TTL.
///
/// Returns the full registry as persisted.
pub async fn recheck_compatibility(
    store: &dyn SettingsStore,
    client: &dyn LibraryClient,
    library_id: &str,
) -> Result<Vec<Library>, RegistryError> {
    let mut libraries = load_libraries(store)?;
    let library = libraries
        .iter_mut()
        .find(|l| l.id == library_id)
        .ok_or_else(|| RegistryError::UnknownLibrary(library_id.to_string()))?;

    ensure_compatibility(library, client, false, now_ms()).await;

    save_libraries(store, &libraries)?;
    Ok(libraries)
}

/// Flip one store's `enabled` flag.
///
/// Returns the full registry as persisted.
pub fn toggle_store(
    store: &dyn SettingsStore,
    library_id: &str,
    store_key: &str,
) -> Result<Vec<Library>, RegistryError> {
    let mut libraries = load_libraries(store)?;
    let library = libraries
        .iter_mut()
        .find(|l| l.id == library_id)
        .ok_or_else(|| RegistryError::UnknownLibrary(library_id.to_string()))?;

    let entry = library
        .store_mut(store_key)
        .ok_or_else(|| RegistryError::UnknownStore {
            library_id: library_id.to_string(),
            store_key: store_key.to_string(),
        })?;
    entry.enabled = !entry.enabled;

    save_libraries(store, &libraries)?;
    Ok(libraries)
}

/// Ask the peer for its stores, mapped into registry entries.
async fn fetch_stores(
    client: &dyn LibraryClient,
    library_id: &str,
) -> Result<Vec<StoreEntry>, RegistryError> {
    let response = client
        .list_stores(library_id)
        .await
        .map_err(|e| RegistryError::StoreDiscovery {
            library_id: library_id.to_string(),
            reason: e.to_string(),
        })?;

    if !response.ok {
        return Err(RegistryError::StoreDiscovery {
            library_id: library_id.to_string(),
            reason: response
                .error
                .unwrap_or_else(|| "library reported failure".to_string()),
        });
    }

    Ok(response
        .stores
        .unwrap_or_default()
        .into_iter()
        .map(StoreEntry::from_meta)
        .collect())
}

/// Fold fresh peer-reported stores over the old entries.
///
/// Order follows the peer's fresh listing. A key present in both keeps the
/// old `enabled` flag; a key only in the fresh listing defaults to enabled.
fn merge_stores(old: &[StoreEntry], fresh: Vec<StoreEntry>) -> Vec<StoreEntry> {
    fresh
        .into_iter()
        .map(|mut entry| {
            if let Some(previous) = old.iter().find(|o| o.key == entry.key) {
                entry.enabled = previous.enabled;
            }
            entry
        })
        .collect()
}
