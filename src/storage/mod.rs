//! Persistence adapters.

pub mod memory;
pub mod projection;
pub mod rest;
pub mod store;

pub use memory::{CollectionSpec, MemoryStore, StoreOp};
pub use projection::{Columns, Embed, Projection};
pub use rest::RestStore;
pub use store::{FetchQuery, SortOrder, Store};
