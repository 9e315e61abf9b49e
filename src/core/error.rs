use thiserror::Error;

use super::RecordId;

/// Failure reported by a persistence adapter.
///
/// Callers do not branch on the cause: every variant renders a human-readable
/// message that is surfaced as-is.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Collection '{0}' not found")]
    CollectionNotFound(String),

    #[error("Row '{id}' not found in '{collection}'")]
    RowNotFound { collection: String, id: String },

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    #[error("Invalid projection: {0}")]
    InvalidProjection(String),

    #[error("{message}")]
    Rejected { status: Option<u16>, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Decode error: {0}")]
    Decode(String),
}

impl StoreError {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            status: None,
            message: message.into(),
        }
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Raised when an entity declaration is registered. Declarations are checked
/// once, up front, never per render.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Entity title must not be empty")]
    EmptyTitle,

    #[error("Entity '{0}' has no collection")]
    EmptyCollection(String),

    #[error("Entity '{0}' declares no fields")]
    NoFields(String),

    #[error("Entity '{0}' declares a field with an empty key")]
    EmptyFieldKey(String),

    #[error("Field '{field}' is declared twice in '{entity}'")]
    DuplicateField { entity: String, field: String },

    #[error("Search key '{key}' in '{entity}' is not a declared field")]
    UnknownSearchKey { entity: String, key: String },

    #[error("List column '{key}' in '{entity}' is not a declared field")]
    UnknownListColumn { entity: String, key: String },

    #[error("Select field '{field}' in '{entity}' has no options")]
    MissingOptions { entity: String, field: String },

    #[error("Reference field '{field}' in '{entity}' is incomplete: {detail}")]
    IncompleteReference {
        entity: String,
        field: String,
        detail: String,
    },

    #[error("Invalid projection for '{entity}': {reason}")]
    InvalidProjection { entity: String, reason: String },

    #[error("Collection '{0}' is already registered")]
    DuplicateEntity(String),
}

/// Raised while turning a draft into a payload, before anything is sent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("{label} is required")]
    Required { field: String, label: String },

    #[error("{label}: '{input}' is not a number")]
    NotANumber {
        field: String,
        label: String,
        input: String,
    },

    #[error("Unknown field '{0}'")]
    UnknownField(String),
}

/// Errors a panel surfaces to the user. None of them is fatal: the panel
/// always returns to a usable loaded state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PanelError {
    #[error("Load {entity} failed: {source}")]
    Load { entity: String, source: StoreError },

    #[error("{entity} save failed: {source}")]
    Save { entity: String, source: StoreError },

    #[error("Delete failed: {source}")]
    Delete { id: RecordId, source: StoreError },

    #[error("Options for '{field}' unavailable: {source}")]
    Resolution { field: String, source: StoreError },

    #[error(transparent)]
    Validation(#[from] FormError),

    #[error("Another request is still in flight")]
    Busy,

    #[error("No form is open")]
    NoModal,

    #[error("No row with id '{0}'")]
    UnknownRow(RecordId),

    #[error("No delete is awaiting confirmation")]
    NothingToConfirm,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panel_messages() {
        let load = PanelError::Load {
            entity: "Vendors".into(),
            source: StoreError::rejected("permission denied"),
        };
        assert_eq!(load.to_string(), "Load Vendors failed: permission denied");

        let save = PanelError::Save {
            entity: "Products".into(),
            source: StoreError::ConstraintViolation("name is null".into()),
        };
        assert_eq!(
            save.to_string(),
            "Products save failed: Constraint violation: name is null"
        );

        let delete = PanelError::Delete {
            id: RecordId::new("v-1"),
            source: StoreError::rejected("still referenced"),
        };
        assert_eq!(delete.to_string(), "Delete failed: still referenced");
    }

    #[test]
    fn test_form_messages() {
        let err = FormError::Required {
            field: "name".into(),
            label: "Name".into(),
        };
        assert_eq!(err.to_string(), "Name is required");
        assert_eq!(PanelError::from(err.clone()).to_string(), err.to_string());
    }
}
