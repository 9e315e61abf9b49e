// ============================================================================
// Entity Console Library
// ============================================================================

//! Schema-driven data-management panels.
//!
//! Each manageable collection is declared once as an [`EntitySchema`]. A
//! [`Panel`] turns that declaration into a searchable list and a create/edit
//! form over any [`Store`](storage::Store).
//!
//! ```ignore
//! use std::sync::Arc;
//! use entity_console::{Panel, builtin_registry};
//! use entity_console::storage::MemoryStore;
//!
//! let registry = builtin_registry()?;
//! let vendors = registry.find("vendors").unwrap();
//! let mut panel = Panel::new(vendors, Arc::new(MemoryStore::new()));
//! panel.mount().await;
//! panel.open_create();
//! panel.set_field("name", "Acme Denim")?;
//! let row = panel.submit().await?;
//! ```

pub mod config;
pub mod core;
pub mod entities;
pub mod form;
pub mod list;
pub mod loader;
pub mod panel;
pub mod resolver;
pub mod schema;
pub mod storage;

// Re-export main types for convenience
pub use config::{ConsoleConfig, StoreConfig};
pub use core::{
    FormError, PanelError, Record, RecordId, SchemaError, StoreError, StoreResult, Value,
};
pub use entities::builtin_registry;
pub use form::{Draft, FormView};
pub use list::ListView;
pub use loader::RecordSet;
pub use panel::{Modal, Panel, PanelPhase};
pub use resolver::FkOptions;
pub use schema::{EntitySchema, FieldDescriptor, FieldKind, Reference, SchemaRegistry, SelectOption};
