//! The solve phase
//!
//! Drains a gathered record set in dependency-safe order and produces the
//! completed notebook:
//!
//! 1. Build a dependency graph over schema kinds (A depends on B if any
//!    field of A, directly or through nested sub-schemas, links to B).
//! 2. Fail fast on cycles; the ordering strategy assumes an acyclic kind
//!    graph, and intra-kind self-reference is unsupported by design.
//! 3. Topologically order the kinds; within a kind, keep registration order
//!    so solve is reproducible run to run.
//! 4. Dispatch every record to its owning factory and register the produced
//!    sketches. The first failure aborts the run; no partial notebook.

use std::collections::HashMap;

use indexmap::IndexMap;
use petgraph::algo::{kosaraju_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};

use crate::error::{ModelError, Result};
use crate::factory::FactoryRegistry;
use crate::notebook::Notebook;
use crate::raw::{RawKey, RawRecord};

pub(crate) fn solve(
    registry: &FactoryRegistry,
    records: IndexMap<RawKey, RawRecord>,
) -> Result<Notebook> {
    let order = kind_order(registry)?;

    // Group records per schema kind, preserving registration order within
    // each group.
    let mut groups: IndexMap<String, Vec<RawRecord>> = IndexMap::new();
    for (_, record) in records {
        groups
            .entry(record.schema().name().to_string())
            .or_default()
            .push(record);
    }

    let mut notebook = Notebook::new();
    for kind in &order {
        let Some(group) = groups.get(kind.as_str()) else {
            continue;
        };
        let factory = registry.owner(kind)?;
        tracing::debug!(schema = %kind, records = group.len(), factory = factory.name(), "solving kind");
        for record in group {
            for sketch in factory.create_sketches(&notebook, record)? {
                notebook.register(sketch)?;
            }
        }
    }

    tracing::info!(sketches = notebook.len(), kinds = order.len(), "solve complete");
    Ok(notebook)
}

/// Topological order of schema kinds, dependencies first
fn kind_order(registry: &FactoryRegistry) -> Result<Vec<String>> {
    let grammar = registry.grammar();
    let mut graph: DiGraph<String, ()> = DiGraph::new();
    let mut nodes: HashMap<&str, NodeIndex> = HashMap::new();

    for schema in grammar.entities() {
        let index = graph.add_node(schema.name().to_string());
        nodes.insert(schema.name(), index);
    }
    for schema in grammar.entities() {
        let dependent = nodes[schema.name()];
        for target in schema.link_targets() {
            // Links to schemas outside the grammar surface later, as
            // unresolved links on the records that carry them.
            if let Some(&dependency) = nodes.get(target) {
                graph.add_edge(dependency, dependent, ());
            }
        }
    }

    match toposort(&graph, None) {
        Ok(order) => Ok(order.into_iter().map(|i| graph[i].clone()).collect()),
        Err(_) => Err(ModelError::CyclicSchemaDependency(describe_cycle(&graph))),
    }
}

/// Human-readable description of one offending cycle
fn describe_cycle(graph: &DiGraph<String, ()>) -> String {
    for scc in kosaraju_scc(graph) {
        let cyclic = scc.len() > 1
            || scc
                .first()
                .is_some_and(|&n| graph.find_edge(n, n).is_some());
        if cyclic {
            let mut names: Vec<&str> = scc.iter().map(|&n| graph[n].as_str()).collect();
            names.sort_unstable();
            return names.join(" -> ");
        }
    }
    String::from("unknown cycle")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::factory::SketchFactory;
    use crate::grammar::Grammar;
    use crate::schema::{Cardinality, EntitySchema, FieldSpec};
    use crate::sketch::Sketch;

    struct GrammarOnly(Grammar);

    impl SketchFactory for GrammarOnly {
        fn name(&self) -> &'static str {
            "grammar-only"
        }

        fn grammar(&self) -> Result<Grammar> {
            Ok(self.0.clone())
        }

        fn supports(&self, schema: &EntitySchema) -> bool {
            self.0.schema(schema.name()).is_some()
        }

        fn create_sketches(&self, _: &Notebook, _: &RawRecord) -> Result<Vec<Sketch>> {
            Ok(Vec::new())
        }
    }

    fn linked(name: &str, target: &str) -> Arc<EntitySchema> {
        Arc::new(
            EntitySchema::new(
                name,
                vec![FieldSpec::link("to", target, Cardinality::One)],
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_dependencies_precede_dependents() {
        let grammar = Grammar::new("g")
            .with_schema(linked("field", "domain"))
            .unwrap()
            .with_schema(Arc::new(EntitySchema::new("domain", Vec::new()).unwrap()))
            .unwrap();
        let registry = FactoryRegistry::new(vec![Box::new(GrammarOnly(grammar))]).unwrap();
        let order = kind_order(&registry).unwrap();
        let domain = order.iter().position(|k| k == "domain").unwrap();
        let field = order.iter().position(|k| k == "field").unwrap();
        assert!(domain < field);
    }

    #[test]
    fn test_cycle_detected() {
        let grammar = Grammar::new("g")
            .with_schema(linked("a", "b"))
            .unwrap()
            .with_schema(linked("b", "a"))
            .unwrap();
        let registry = FactoryRegistry::new(vec![Box::new(GrammarOnly(grammar))]).unwrap();
        let err = kind_order(&registry).unwrap_err();
        assert!(matches!(err, ModelError::CyclicSchemaDependency(ref c) if c == "a -> b"));
    }

    #[test]
    fn test_self_reference_is_a_cycle() {
        let grammar = Grammar::new("g").with_schema(linked("a", "a")).unwrap();
        let registry = FactoryRegistry::new(vec![Box::new(GrammarOnly(grammar))]).unwrap();
        let err = kind_order(&registry).unwrap_err();
        assert!(matches!(err, ModelError::CyclicSchemaDependency(_)));
    }
}
