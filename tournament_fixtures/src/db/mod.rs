//! Storage seam for match results and standings.
//!
//! The crate ships one implementation, [`InMemoryStore`]; anything else
//! (a relational backend, a remote service) plugs in through
//! [`ResultsStore`].

pub mod memory;
pub mod repository;

pub use memory::InMemoryStore;
pub use repository::{ResultsStore, StoreError, StoreResult};
