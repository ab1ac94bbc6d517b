//! Registry data model: known library peers and their stores.
//!
//! A [`Library`] is one independently-deployed peer. The registry owns these
//! records exclusively; the compatibility cache and the settings store only
//! ever see them through registry operations.

use scryhub_protocol::StoreMeta;
use serde::{Deserialize, Serialize};

/// One store hosted by a library, as the hub tracks it.
///
/// Created or replaced wholesale when a library's stores are refreshed;
/// `enabled` is the only field a user toggles directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreEntry {
    /// Key unique within the library
    pub key: String,
    /// Human-displayable store name
    pub name: String,
    /// Whether lookups should include this store
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_svg: Option<String>,
}

impl StoreEntry {
    /// Build an entry from a peer-reported store meta, enabled by default.
    pub fn from_meta(meta: StoreMeta) -> Self {
        Self {
            key: meta.key,
            name: meta.name,
            enabled: true,
            logo_url: meta.logo_url,
            logo_svg: meta.logo_svg,
        }
    }
}

/// Cached outcome of the last protocol negotiation with a library.
///
/// `is_compatible` is meaningless until at least one evaluation has run; an
/// absent `last_evaluated_time` always forces a fresh check regardless of the
/// TTL policy.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityCache {
    /// Whether the library's protocol major version matches ours
    pub is_compatible: bool,
    /// When compatibility was last evaluated (ms since epoch)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_evaluated_time: Option<u64>,
    /// The version the library reported at its last successful check
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol_version: Option<String>,
}

/// One known library peer and its stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Library {
    /// Opaque peer identifier; registry identity
    pub id: String,
    /// Friendly label chosen by the user
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub stores: Vec<StoreEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compatibility: Option<CompatibilityCache>,
}

impl Library {
    /// Create a library with no stores and no compatibility history.
    pub fn new(id: impl Into<String>, name: Option<String>) -> Self {
        Self {
            id: id.into(),
            name,
            stores: Vec::new(),
            compatibility: None,
        }
    }

    /// Find a store by key.
    pub fn store(&self, key: &str) -> Option<&StoreEntry> {
        self.stores.iter().find(|s| s.key == key)
    }

    /// Find a store by key, mutably.
    pub fn store_mut(&mut self, key: &str) -> Option<&mut StoreEntry> {
        self.stores.iter_mut().find(|s| s.key == key)
    }

    /// Stores lookups should fan out to.
    pub fn enabled_stores(&self) -> impl Iterator<Item = &StoreEntry> {
        self.stores.iter().filter(|s| s.enabled)
    }
}
