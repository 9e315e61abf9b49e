pub mod error;
pub mod record;
pub mod value;

pub use error::{FormError, PanelError, SchemaError, StoreError, StoreResult};
pub use record::{ID_COLUMN, Record, RecordId};
pub use value::Value;
