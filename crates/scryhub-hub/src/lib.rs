//! scryhub-hub: The hub side of the ScryHub library protocol.
//!
//! The hub keeps a registry of known library peers, negotiates protocol
//! compatibility with them, fans card lookups out across their enabled
//! stores, and ranks the raw offers that come back into at most one winning
//! offer per print finish.
//!
//! Transport and persistence are injected collaborators: the hub only sees
//! the [`transport::LibraryTransport`] and [`settings::SettingsStore`] traits,
//! never an actual channel or storage engine.

pub mod compat;
pub mod coordinator;
pub mod library;
pub mod lookup;
pub mod ranking;
pub mod registry;
pub mod settings;
pub mod transport;

pub use compat::{ensure_compatibility, is_library_compatible, update_compatibilities};
pub use coordinator::{Coordinator, HubReply, HubRequest, RoutedClient};
pub use library::{CompatibilityCache, Library, StoreEntry};
pub use lookup::{lookup_everywhere, StoreLookupOutcome, StoreOutcome};
pub use ranking::pick_top_per_finish;
pub use registry::{
    add_library, get_libraries, recheck_compatibility, refresh_stores, remove_library,
    toggle_store, RegistryError,
};
pub use settings::{JsonFileStore, MemoryStore, SettingsStore, LIBRARIES_KEY};
pub use transport::{
    DirectClient, InProcessTransport, LibraryClient, LibraryEndpoint, LibraryTransport,
    TransportError,
};
