//! Sketch factories and dispatch
//!
//! A factory owns one sub-grammar and turns raw records of its schemas into
//! sketches, looking up already-resolved sketches in the notebook to satisfy
//! its links. The registry routes each record to the single factory claiming
//! its schema; the ownership table is built and validated eagerly at startup.

use std::collections::HashMap;
use std::fmt;

use crate::error::{ModelError, Result};
use crate::grammar::Grammar;
use crate::notebook::Notebook;
use crate::raw::RawRecord;
use crate::schema::EntitySchema;
use crate::sketch::Sketch;

/// Owner of one sub-grammar, responsible for resolving its records
pub trait SketchFactory {
    /// Stable factory name, used in ownership diagnostics
    fn name(&self) -> &'static str;

    /// The sub-grammar this factory contributes
    fn grammar(&self) -> Result<Grammar>;

    /// Whether this factory claims the given schema
    fn supports(&self, schema: &EntitySchema) -> bool;

    /// Resolve one raw record into one or more sketches
    ///
    /// Every link is satisfied through the notebook, which already contains
    /// all targets thanks to the solve ordering. A dangling reference fails
    /// with `UnresolvedLink`.
    fn create_sketches(&self, notebook: &Notebook, record: &RawRecord) -> Result<Vec<Sketch>>;

    /// Cascade hook, called once per newly inserted record during gather
    ///
    /// Returned records are inserted into the repository with the same
    /// duplicate/unknown-schema checks, recursively up to the expansion
    /// depth cap.
    fn on_new_raw(&self, _record: &RawRecord) -> Result<Vec<RawRecord>> {
        Ok(Vec::new())
    }
}

/// Dispatch table routing each schema to the factory owning it
pub struct FactoryRegistry {
    factories: Vec<Box<dyn SketchFactory>>,
    grammar: Grammar,
    owners: HashMap<String, usize>,
}

impl fmt::Debug for FactoryRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let factories: Vec<_> = self.factories.iter().map(|f| f.name()).collect();
        f.debug_struct("FactoryRegistry")
            .field("factories", &factories)
            .field("owners", &self.owners)
            .finish()
    }
}

impl FactoryRegistry {
    /// Compose the factories' grammars and build the ownership table
    ///
    /// Fails with `DuplicateSchema` if two factories declare the same schema
    /// and with `AmbiguousOwnership` if two factories claim one schema. A
    /// schema nobody claims is reported at dispatch time, not here.
    pub fn new(factories: Vec<Box<dyn SketchFactory>>) -> Result<Self> {
        let grammar = Grammar::compose(
            "composed",
            factories
                .iter()
                .map(|f| f.grammar())
                .collect::<Result<Vec<_>>>()?,
        )?;

        let mut owners = HashMap::new();
        for schema in grammar.entities() {
            for (index, factory) in factories.iter().enumerate() {
                if !factory.supports(schema) {
                    continue;
                }
                if let Some(first) = owners.insert(schema.name().to_string(), index) {
                    return Err(ModelError::AmbiguousOwnership {
                        schema: schema.name().to_string(),
                        first: factories[first].name().to_string(),
                        second: factory.name().to_string(),
                    });
                }
            }
        }

        tracing::debug!(
            factories = factories.len(),
            schemas = grammar.entities().count(),
            "factory registry ready"
        );
        Ok(Self {
            factories,
            grammar,
            owners,
        })
    }

    /// The composed grammar of all installed factories
    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// The factory owning the named schema
    pub fn owner(&self, schema: &str) -> Result<&dyn SketchFactory> {
        self.owners
            .get(schema)
            .map(|&i| self.factories[i].as_ref())
            .ok_or_else(|| ModelError::NoOwner {
                schema: schema.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    struct StubFactory {
        name: &'static str,
        schemas: Vec<&'static str>,
        claims: Vec<&'static str>,
    }

    impl SketchFactory for StubFactory {
        fn name(&self) -> &'static str {
            self.name
        }

        fn grammar(&self) -> Result<Grammar> {
            let mut grammar = Grammar::new(self.name);
            for s in &self.schemas {
                grammar =
                    grammar.with_schema(Arc::new(EntitySchema::new(*s, Vec::new())?))?;
            }
            Ok(grammar)
        }

        fn supports(&self, schema: &EntitySchema) -> bool {
            self.claims.contains(&schema.name())
        }

        fn create_sketches(&self, _: &Notebook, _: &RawRecord) -> Result<Vec<Sketch>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_owner_lookup() {
        let registry = FactoryRegistry::new(vec![Box::new(StubFactory {
            name: "stub",
            schemas: vec!["widget"],
            claims: vec!["widget"],
        })])
        .unwrap();
        assert_eq!(registry.owner("widget").unwrap().name(), "stub");
    }

    #[test]
    fn test_no_owner_at_dispatch() {
        // declared but unclaimed: registry construction succeeds
        let registry = FactoryRegistry::new(vec![Box::new(StubFactory {
            name: "stub",
            schemas: vec!["widget"],
            claims: vec![],
        })])
        .unwrap();
        let err = match registry.owner("widget") {
            Ok(factory) => panic!("unexpected owner `{}`", factory.name()),
            Err(err) => err,
        };
        assert!(matches!(err, ModelError::NoOwner { ref schema } if schema == "widget"));
    }

    #[test]
    fn test_registry_debug_names_factories() {
        let registry = FactoryRegistry::new(vec![Box::new(StubFactory {
            name: "stub",
            schemas: vec!["widget"],
            claims: vec!["widget"],
        })])
        .unwrap();
        let rendered = format!("{registry:?}");
        assert!(rendered.contains("stub"));
        assert!(rendered.contains("widget"));
    }

    #[test]
    fn test_ambiguous_ownership() {
        let err = FactoryRegistry::new(vec![
            Box::new(StubFactory {
                name: "first",
                schemas: vec!["widget"],
                claims: vec!["widget"],
            }),
            Box::new(StubFactory {
                name: "second",
                schemas: vec![],
                claims: vec!["widget"],
            }),
        ])
        .unwrap_err();
        assert!(matches!(err, ModelError::AmbiguousOwnership { .. }));
    }

    #[test]
    fn test_duplicate_schema_across_factories() {
        let err = FactoryRegistry::new(vec![
            Box::new(StubFactory {
                name: "first",
                schemas: vec!["widget"],
                claims: vec!["widget"],
            }),
            Box::new(StubFactory {
                name: "second",
                schemas: vec!["widget"],
                claims: vec![],
            }),
        ])
        .unwrap_err();
        assert!(matches!(err, ModelError::DuplicateSchema(_)));
    }
}
