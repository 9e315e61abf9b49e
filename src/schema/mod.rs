//! Declarative entity descriptions.
//!
//! An [`EntitySchema`] names a collection, its fields and how each field is
//! listed, searched, edited and coerced. Declarations are validated when they
//! are built and again when registered, never per render.

pub mod entity;
pub mod field;
pub mod registry;

pub use entity::{BeforeSave, EntitySchema, EntitySchemaBuilder, RowTitle};
pub use field::{FieldDescriptor, FieldKind, ListFormatter, Reference, SelectOption};
pub use registry::SchemaRegistry;
