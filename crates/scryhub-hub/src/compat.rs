//! Protocol compatibility negotiation with library peers.
//!
//! Each library carries a cached verdict: compatible or not, when that was
//! last evaluated, and the version the peer reported. Evaluations are
//! throttled by a TTL; operations that must be certain (adding a library,
//! refreshing its stores) bypass the TTL and check anyway.
//!
//! Compatibility is major-version equality. The minor and patch components
//! never affect the verdict.

use crate::library::{CompatibilityCache, Library};
use crate::settings::{load_libraries, save_libraries, SettingsStore};
use crate::transport::LibraryClient;
use anyhow::Result;
use semver::Version;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

/// How long a compatibility verdict stays fresh (5 minutes).
pub const COMPATIBILITY_TTL_MS: u64 = 5 * 60 * 1000;

/// Milliseconds since the Unix epoch.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Whether two protocol versions can interoperate: equal majors.
///
/// A version that does not parse as semver is never compatible.
fn versions_compatible(theirs: &str, ours: &str) -> bool {
    match (Version::parse(theirs), Version::parse(ours)) {
        (Ok(theirs), Ok(ours)) => theirs.major == ours.major,
        _ => false,
    }
}

/// Whether the cached verdict is stale enough to warrant a fresh check.
fn should_check(now: u64, last_evaluated: Option<u64>) -> bool {
    match last_evaluated {
        // Never evaluated; check regardless of TTL.
        None => true,
        Some(last) => now.saturating_sub(last) > COMPATIBILITY_TTL_MS,
    }
}

/// Read the cached verdict without going to the network.
///
/// A library that was never evaluated reads as incompatible; lookups must not
/// talk to a peer the hub knows nothing about.
pub fn is_library_compatible(library: &Library) -> bool {
    match &library.compatibility {
        Some(cache) => cache.is_compatible,
        None => {
            warn!(
                "library {} has no compatibility record, treating as incompatible",
                library.id
            );
            false
        }
    }
}

/// Re-evaluate one library's compatibility in place.
///
/// With `respect_ttl`, a fresh verdict is left untouched. Otherwise the peer
/// is asked for its protocol version and the cache updated: the evaluation
/// timestamp is stamped whether the check succeeded or not, so a dead peer is
/// not hammered on every pass. A failed or refused check marks the library
/// incompatible but leaves the last known reported version alone.
pub async fn ensure_compatibility(
    library: &mut Library,
    client: &dyn LibraryClient,
    respect_ttl: bool,
    now: u64,
) {
    let cache = library
        .compatibility
        .get_or_insert_with(CompatibilityCache::default);

    if respect_ttl && !should_check(now, cache.last_evaluated_time) {
        debug!("compatibility for library {} is still fresh", library.id);
        return;
    }

    let outcome = client.check_protocol(&library.id).await;
    cache.last_evaluated_time = Some(now);

    match outcome {
        Ok(response) if response.ok => match response.protocol_version {
            Some(theirs) => {
                cache.is_compatible =
                    versions_compatible(&theirs, scryhub_protocol::PROTOCOL_VERSION);
                // Record what the peer said even when the majors diverge, so
                // the mismatch can be shown to the user.
                cache.protocol_version = Some(theirs);
            }
            None => {
                warn!("library {} answered without a version", library.id);
                cache.is_compatible = false;
            }
        },
        Ok(_) => {
            warn!("library {} refused the protocol check", library.id);
            cache.is_compatible = false;
        }
        Err(e) => {
            warn!("protocol check for library {} failed: {}", library.id, e);
            cache.is_compatible = false;
        }
    }
}

/// Re-evaluate every registered library and persist the results.
///
/// Returns the refreshed registry. When no libraries are registered nothing
/// is written back.
pub async fn update_compatibilities(
    store: &dyn SettingsStore,
    client: &dyn LibraryClient,
    respect_ttl: bool,
) -> Result<Vec<Library>> {
    let mut libraries = load_libraries(store)?;
    if libraries.is_empty() {
        return Ok(libraries);
    }

    let now = now_ms();
    for library in &mut libraries {
        ensure_compatibility(library, client, respect_ttl, now).await;
    }

    save_libraries(store, &libraries)?;
    Ok(libraries)
}
