use std::collections::HashMap;
use std::sync::Arc;

use super::EntitySchema;
use crate::core::SchemaError;

/// Every entity the console can manage, keyed by collection.
///
/// Immutable once built and cheap to clone; registering returns a new
/// registry (copy-on-write), so panels holding an older one are unaffected.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    entities: Arc<HashMap<String, Arc<EntitySchema>>>,
    order: Arc<Vec<String>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a declaration, returning the extended registry.
    pub fn with_entity(self, schema: EntitySchema) -> Result<Self, SchemaError> {
        schema.validate()?;
        let collection = schema.collection().to_string();
        if self.entities.contains_key(&collection) {
            return Err(SchemaError::DuplicateEntity(collection));
        }

        let mut entities = (*self.entities).clone();
        let mut order = (*self.order).clone();
        entities.insert(collection.clone(), Arc::new(schema));
        order.push(collection);

        Ok(Self {
            entities: Arc::new(entities),
            order: Arc::new(order),
        })
    }

    pub fn register(&mut self, schema: EntitySchema) -> Result<(), SchemaError> {
        *self = self.clone().with_entity(schema)?;
        Ok(())
    }

    pub fn get(&self, collection: &str) -> Option<Arc<EntitySchema>> {
        self.entities.get(collection).cloned()
    }

    /// Resolves a user-typed name: collection name first, then title
    /// (case-insensitive, spaces and dashes read as underscores).
    pub fn find(&self, name: &str) -> Option<Arc<EntitySchema>> {
        if let Some(schema) = self.get(name) {
            return Some(schema);
        }
        let wanted = normalize(name);
        self.entities()
            .find(|schema| normalize(schema.title()) == wanted || normalize(schema.collection()) == wanted)
    }

    /// Declarations in registration order.
    pub fn entities(&self) -> impl Iterator<Item = Arc<EntitySchema>> + '_ {
        self.order.iter().filter_map(|name| self.get(name))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

fn normalize(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}
