use entity_console::{EntitySchema, SchemaRegistry};

/// Prefix suggestions for mistyped entity names and field keys.
pub struct Autocompleter {
    candidates: Vec<String>,
}

impl Autocompleter {
    pub fn for_entities(registry: &SchemaRegistry) -> Self {
        let mut candidates = Vec::new();
        for schema in registry.entities() {
            candidates.push(schema.collection().to_string());
            candidates.push(schema.title().to_lowercase());
        }
        candidates.dedup();
        Self { candidates }
    }

    pub fn for_fields(schema: &EntitySchema) -> Self {
        Self {
            candidates: schema.fields().iter().map(|f| f.key.clone()).collect(),
        }
    }

    pub fn get_suggestions(&self, input: &str) -> Vec<String> {
        let input_lower = input.to_lowercase();
        if input_lower.is_empty() {
            return Vec::new();
        }
        let stem: String = input_lower.chars().take(3).collect();

        let mut suggestions: Vec<String> = self
            .candidates
            .iter()
            .filter(|c| c.starts_with(&input_lower) || c.starts_with(&stem) || c.contains(&input_lower))
            .cloned()
            .collect();
        suggestions.sort();
        suggestions.dedup();
        suggestions
    }

    /// ` (did you mean: a, b?)`, or nothing.
    pub fn hint(&self, input: &str) -> String {
        let suggestions = self.get_suggestions(input);
        if suggestions.is_empty() {
            String::new()
        } else {
            format!(" (did you mean: {}?)", suggestions.join(", "))
        }
    }
}
