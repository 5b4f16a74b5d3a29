//! Built-in sketch factories
//!
//! One factory per model domain, each owning its sub-grammar. This module
//! also assembles the standard registry used by the binary and most tests.

pub mod association;
pub mod core;
pub mod entity;
pub mod filekind;
pub mod service;
pub mod task;

use crate::error::{ModelError, Result};
use crate::factory::FactoryRegistry;
use crate::notebook::Notebook;
use crate::raw::{RawKey, RawRecord};
use crate::sketch::{Sketch, SketchKind};

/// Registry with every built-in factory installed
pub fn standard_registry() -> Result<FactoryRegistry> {
    FactoryRegistry::new(vec![
        Box::new(core::CoreFactory),
        Box::new(entity::EntityFactory),
        Box::new(association::AssociationFactory),
        Box::new(task::TaskFactory),
        Box::new(filekind::FileKindFactory),
        Box::new(service::ServiceFactory),
    ])
}

/// Resolve a link field through the notebook
///
/// Absence becomes `UnresolvedLink` pointing at the offending record and
/// field; a kind mismatch keeps its own context and propagates as is.
pub(crate) fn resolve_link<'a>(
    notebook: &'a Notebook,
    key: &str,
    field: &str,
    target: &RawKey,
    kind: SketchKind,
) -> Result<&'a Sketch> {
    match notebook.resolve(target.as_str(), kind) {
        Ok(sketch) => Ok(sketch),
        Err(ModelError::SketchNotFound { .. }) => Err(ModelError::UnresolvedLink {
            key: key.to_string(),
            field: field.to_string(),
            target: target.to_string(),
        }),
        Err(e) => Err(e),
    }
}

/// Single target of a required link field
///
/// The raw builder guarantees required fields are present; this keeps the
/// guarantee explicit instead of unwrapping.
pub(crate) fn one_link<'a>(record: &'a RawRecord, field: &str) -> Result<&'a RawKey> {
    record
        .link(field)
        .ok_or_else(|| ModelError::MissingRequiredField {
            key: record.key().to_string(),
            field: field.to_string(),
        })
}

/// Error for a record dispatched to a factory that does not own its schema
pub(crate) fn wrong_factory(record: &RawRecord) -> ModelError {
    ModelError::NoOwner {
        schema: record.schema().name().to_string(),
    }
}
