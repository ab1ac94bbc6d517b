//! scryhub-library: the peer side of the ScryHub library protocol.
//!
//! A library hosts one or more stores behind [`StoreHandler`] implementations
//! and answers the three protocol operations through a [`LibraryHost`]. The
//! host owns request dispatch and error shaping; handlers only know how to
//! describe themselves and look up cards.

pub mod handler;
pub mod host;

pub use handler::StoreHandler;
pub use host::LibraryHost;
