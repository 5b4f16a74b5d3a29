//! Raw repository: the gather phase
//!
//! Accumulates all raw records for one resolution run, indexed by key.
//! Root raws from the installed grammars are seeded at construction, before
//! any loader runs. Inserting a record triggers the owning factory's cascade
//! hook, whose derived records are inserted recursively with the same
//! checks, bounded by an explicit expansion depth.
//!
//! Consuming `solve` ends the gather phase; the record set is read-only from
//! there on.

use indexmap::IndexMap;

use crate::error::{ModelError, Result};
use crate::factory::FactoryRegistry;
use crate::notebook::Notebook;
use crate::raw::{RawKey, RawRecord};

/// Cascade expansion depth cap; exceeding it aborts the insert
pub const MAX_CASCADE_DEPTH: usize = 8;

/// All raw records gathered for one resolution run
pub struct RawRepository<'r> {
    registry: &'r FactoryRegistry,
    records: IndexMap<RawKey, RawRecord>,
}

impl<'r> RawRepository<'r> {
    /// Create a repository seeded with the grammars' root raws
    pub fn new(registry: &'r FactoryRegistry) -> Result<Self> {
        let mut repository = Self {
            registry,
            records: IndexMap::new(),
        };
        for raw in registry.grammar().root_raws() {
            repository.insert(raw.clone(), 0)?;
        }
        Ok(repository)
    }

    /// Insert a gathered record, cascading derived records
    pub fn add_raw(&mut self, record: RawRecord) -> Result<()> {
        self.insert(record, 0)
    }

    fn insert(&mut self, record: RawRecord, depth: usize) -> Result<()> {
        if depth > MAX_CASCADE_DEPTH {
            return Err(ModelError::CascadeDepthExceeded {
                key: record.key().to_string(),
                depth: MAX_CASCADE_DEPTH,
            });
        }
        let schema_name = record.schema().name().to_string();
        if self.registry.grammar().schema(&schema_name).is_none() {
            return Err(ModelError::UnknownSchema {
                key: record.key().to_string(),
                schema: schema_name,
            });
        }
        if self.records.contains_key(record.key()) {
            return Err(ModelError::DuplicateKey(record.key().to_string()));
        }

        // An unclaimed schema has no cascade hook; dispatch reports NoOwner
        // during solve.
        let derived = match self.registry.owner(&schema_name) {
            Ok(owner) => owner.on_new_raw(&record)?,
            Err(ModelError::NoOwner { .. }) => Vec::new(),
            Err(e) => return Err(e),
        };

        tracing::debug!(key = %record.key(), schema = %schema_name, depth, "gathered raw record");
        self.records.insert(record.key().clone(), record);

        for child in derived {
            self.insert(child, depth + 1)?;
        }
        Ok(())
    }

    /// The composed grammar the repository validates against
    pub fn grammar(&self) -> &crate::grammar::Grammar {
        self.registry.grammar()
    }

    /// Whether a record with the given key has been gathered
    pub fn contains(&self, key: &RawKey) -> bool {
        self.records.contains_key(key)
    }

    /// Gathered records, in registration order
    pub fn records(&self) -> impl Iterator<Item = &RawRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drain the repository into a completed notebook
    ///
    /// Consumes the repository: gathering is over once solve begins.
    pub fn solve(self) -> Result<Notebook> {
        crate::solve::solve(self.registry, self.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::factory::SketchFactory;
    use crate::grammar::Grammar;
    use crate::raw::RawBuilder;
    use crate::schema::{Cardinality, EntitySchema, FieldSpec};
    use crate::sketch::Sketch;
    use crate::PropertyType;

    fn widget_schema() -> Arc<EntitySchema> {
        Arc::new(
            EntitySchema::new(
                "widget",
                vec![FieldSpec::scalar(
                    "label",
                    PropertyType::Text,
                    Cardinality::Optional,
                )],
            )
            .unwrap(),
        )
    }

    /// Factory whose cascade hook re-derives a widget from every widget,
    /// so insertion never terminates without the depth cap.
    struct LoopingFactory;

    impl SketchFactory for LoopingFactory {
        fn name(&self) -> &'static str {
            "looping"
        }

        fn grammar(&self) -> crate::Result<Grammar> {
            Grammar::new("looping").with_schema(widget_schema())
        }

        fn supports(&self, schema: &EntitySchema) -> bool {
            schema.name() == "widget"
        }

        fn create_sketches(
            &self,
            _: &crate::Notebook,
            _: &RawRecord,
        ) -> crate::Result<Vec<Sketch>> {
            Ok(Vec::new())
        }

        fn on_new_raw(&self, record: &RawRecord) -> crate::Result<Vec<RawRecord>> {
            let next = format!("{}x", record.key());
            Ok(vec![RawBuilder::new(next, widget_schema()).build()?])
        }
    }

    struct QuietFactory;

    impl SketchFactory for QuietFactory {
        fn name(&self) -> &'static str {
            "quiet"
        }

        fn grammar(&self) -> crate::Result<Grammar> {
            Grammar::new("quiet").with_schema(widget_schema())
        }

        fn supports(&self, schema: &EntitySchema) -> bool {
            schema.name() == "widget"
        }

        fn create_sketches(
            &self,
            _: &crate::Notebook,
            _: &RawRecord,
        ) -> crate::Result<Vec<Sketch>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let registry = FactoryRegistry::new(vec![Box::new(QuietFactory)]).unwrap();
        let mut repo = RawRepository::new(&registry).unwrap();
        repo.add_raw(RawBuilder::new("W1", widget_schema()).build().unwrap())
            .unwrap();
        let err = repo
            .add_raw(RawBuilder::new("W1", widget_schema()).build().unwrap())
            .unwrap_err();
        assert!(matches!(err, ModelError::DuplicateKey(ref k) if k == "W1"));
    }

    #[test]
    fn test_unknown_schema_rejected() {
        let registry = FactoryRegistry::new(vec![Box::new(QuietFactory)]).unwrap();
        let mut repo = RawRepository::new(&registry).unwrap();
        let stray = Arc::new(EntitySchema::new("stray", Vec::new()).unwrap());
        let err = repo
            .add_raw(RawBuilder::new("S1", stray).build().unwrap())
            .unwrap_err();
        assert!(matches!(err, ModelError::UnknownSchema { ref schema, .. } if schema == "stray"));
    }

    #[test]
    fn test_cascade_depth_capped() {
        let registry = FactoryRegistry::new(vec![Box::new(LoopingFactory)]).unwrap();
        let mut repo = RawRepository::new(&registry).unwrap();
        let err = repo
            .add_raw(RawBuilder::new("W1", widget_schema()).build().unwrap())
            .unwrap_err();
        assert!(matches!(
            err,
            ModelError::CascadeDepthExceeded { depth: MAX_CASCADE_DEPTH, .. }
        ));
    }
}
