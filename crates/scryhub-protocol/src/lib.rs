//! scryhub-protocol: Wire types for the ScryHub library protocol.
//!
//! A hub talks to independently-deployed "library" peers, each hosting one or
//! more card stores. This crate defines the three operations of that protocol
//! as JSON wire shapes, matching the deployed TypeScript peers exactly:
//! - protocol check (version negotiation)
//! - list stores
//! - card lookup
//!
//! The message tags are stable string literals; changing them breaks every
//! peer that is already deployed.

pub mod operations;
pub mod types;

pub use operations::{
    CardLookupResponse, LibraryRequest, ListStoresResponse, ProtocolCheckResponse,
    MSG_LIST_STORES, MSG_LOOKUP, MSG_PROTOCOL_CHECK,
};
pub use types::{
    Availability, CardLookupDescriptor, CardLookupResult, FinishTreatment, FoundCardInformation,
    MatchQualification, Money, StoreMeta,
};

/// Protocol version this crate speaks, resolved from the package version.
///
/// Peers exchange this during a protocol check; only the major component is
/// significant for compatibility.
pub const PROTOCOL_VERSION: &str = env!("CARGO_PKG_VERSION");
