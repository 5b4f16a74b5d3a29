//! Grammars
//!
//! A grammar is a named bundle of entity schemas plus the root raw records
//! it seeds into every repository (e.g. the built-in scalar types). Grammars
//! compose by union; overlapping schema names fail fast at composition time.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::{ModelError, Result};
use crate::raw::RawRecord;
use crate::schema::EntitySchema;

/// A named, composable bundle of schemas and seed records
#[derive(Debug, Clone, Default)]
pub struct Grammar {
    name: String,
    schemas: IndexMap<String, Arc<EntitySchema>>,
    root_raws: Vec<RawRecord>,
}

impl Grammar {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schemas: IndexMap::new(),
            root_raws: Vec::new(),
        }
    }

    /// Add a schema, rejecting duplicates within this grammar
    pub fn with_schema(mut self, schema: Arc<EntitySchema>) -> Result<Self> {
        if self.schemas.contains_key(schema.name()) {
            return Err(ModelError::DuplicateSchema(schema.name().to_string()));
        }
        self.schemas.insert(schema.name().to_string(), schema);
        Ok(self)
    }

    /// Add a seed record inserted at repository construction
    pub fn with_root_raw(mut self, raw: RawRecord) -> Self {
        self.root_raws.push(raw);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up a schema by name
    pub fn schema(&self, name: &str) -> Option<&Arc<EntitySchema>> {
        self.schemas.get(name)
    }

    /// The de-duplicated schema set, in declaration order
    pub fn entities(&self) -> impl Iterator<Item = &Arc<EntitySchema>> {
        self.schemas.values()
    }

    pub fn root_raws(&self) -> &[RawRecord] {
        &self.root_raws
    }

    /// Union of member grammars
    ///
    /// Fails with `DuplicateSchema` at composition time if two members
    /// declare the same schema name, before any record is processed.
    pub fn compose(
        name: impl Into<String>,
        members: impl IntoIterator<Item = Grammar>,
    ) -> Result<Self> {
        let mut composed = Grammar::new(name);
        for member in members {
            for (schema_name, schema) in member.schemas {
                if composed.schemas.contains_key(&schema_name) {
                    return Err(ModelError::DuplicateSchema(schema_name));
                }
                composed.schemas.insert(schema_name, schema);
            }
            composed.root_raws.extend(member.root_raws);
        }
        Ok(composed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::EntitySchema;

    fn grammar(name: &str, schemas: &[&str]) -> Grammar {
        let mut g = Grammar::new(name);
        for s in schemas {
            g = g
                .with_schema(Arc::new(EntitySchema::new(*s, Vec::new()).unwrap()))
                .unwrap();
        }
        g
    }

    #[test]
    fn test_compose_unions_schemas() {
        let composed = Grammar::compose(
            "model",
            vec![grammar("a", &["domain"]), grammar("b", &["entity", "task"])],
        )
        .unwrap();
        assert!(composed.schema("domain").is_some());
        assert!(composed.schema("task").is_some());
        assert_eq!(composed.entities().count(), 3);
    }

    #[test]
    fn test_compose_rejects_overlap() {
        let err = Grammar::compose(
            "model",
            vec![grammar("a", &["task"]), grammar("b", &["task"])],
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::DuplicateSchema(ref n) if n == "task"));
    }

    #[test]
    fn test_duplicate_within_grammar() {
        let schema = Arc::new(EntitySchema::new("task", Vec::new()).unwrap());
        let err = Grammar::new("a")
            .with_schema(schema.clone())
            .unwrap()
            .with_schema(schema)
            .unwrap_err();
        assert!(matches!(err, ModelError::DuplicateSchema(_)));
    }
}
