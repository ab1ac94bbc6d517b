//! The three protocol operations and their response shapes.
//!
//! Requests are one internally-tagged enum: the `type` field on the wire
//! carries the operation tag. Responses are flat structs with an `ok` flag —
//! a peer that understood the request answers `ok: true` even when no card is
//! found; `ok: false` means the peer could not process the request at all.

use crate::types::{CardLookupDescriptor, CardLookupResult, StoreMeta};
use serde::{Deserialize, Serialize};

/// Tag for the protocol check operation.
pub const MSG_PROTOCOL_CHECK: &str = "scryhub.protocolCheck";

/// Tag for the list stores operation.
pub const MSG_LIST_STORES: &str = "scryhub.adapter.listStores";

/// Tag for the card lookup operation.
pub const MSG_LOOKUP: &str = "scryhub.adapter.lookup";

/// A request addressed to a library peer.
///
/// Wire format: `{"type":"scryhub.protocolCheck"}`,
/// `{"type":"scryhub.adapter.listStores"}`, or
/// `{"type":"scryhub.adapter.lookup","storeKey":...,"descriptor":{...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LibraryRequest {
    #[serde(rename = "scryhub.protocolCheck")]
    ProtocolCheck,
    #[serde(rename = "scryhub.adapter.listStores")]
    ListStores,
    #[serde(rename = "scryhub.adapter.lookup", rename_all = "camelCase")]
    LookupCard {
        /// Which of the library's stores to ask
        store_key: String,
        descriptor: CardLookupDescriptor,
    },
}

impl LibraryRequest {
    /// Serialize to JSON bytes.
    pub fn to_json(&self) -> Vec<u8> {
        serde_json::to_vec(self).expect("LibraryRequest serialization should not fail")
    }

    /// Try to parse from JSON bytes.
    ///
    /// Returns `None` for non-JSON input or an unknown `type` tag.
    pub fn from_json(data: &[u8]) -> Option<Self> {
        serde_json::from_slice(data).ok()
    }
}

/// Answer to a protocol check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolCheckResponse {
    pub ok: bool,
    /// The version the peer speaks, absent when `ok` is false
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol_version: Option<String>,
}

impl ProtocolCheckResponse {
    pub fn speaking(version: impl Into<String>) -> Self {
        Self {
            ok: true,
            protocol_version: Some(version.into()),
        }
    }

    /// Serialize to JSON bytes.
    pub fn to_json(&self) -> Vec<u8> {
        serde_json::to_vec(self).expect("ProtocolCheckResponse serialization should not fail")
    }
}

/// Answer to a list stores request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListStoresResponse {
    pub ok: bool,
    /// Stores the library hosts, absent when `ok` is false
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stores: Option<Vec<StoreMeta>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ListStoresResponse {
    pub fn listing(stores: Vec<StoreMeta>) -> Self {
        Self {
            ok: true,
            stores: Some(stores),
            error: None,
        }
    }

    /// Serialize to JSON bytes.
    pub fn to_json(&self) -> Vec<u8> {
        serde_json::to_vec(self).expect("ListStoresResponse serialization should not fail")
    }
}

/// Answer to a card lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardLookupResponse {
    pub ok: bool,
    /// Store key echoed back so the hub can pair answers with requests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_key: Option<String>,
    /// Populated when the lookup operation itself succeeded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<CardLookupResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CardLookupResponse {
    pub fn answered(store_key: impl Into<String>, result: CardLookupResult) -> Self {
        Self {
            ok: true,
            store_key: Some(store_key.into()),
            result: Some(result),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            store_key: None,
            result: None,
            error: Some(error.into()),
        }
    }

    /// Serialize to JSON bytes.
    pub fn to_json(&self) -> Vec<u8> {
        serde_json::to_vec(self).expect("CardLookupResponse serialization should not fail")
    }
}
