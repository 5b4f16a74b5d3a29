//! Sketchbook
//!
//! A definition resolution engine: ingests declarative model descriptions
//! (entities, associations, tasks, master data, file kinds, web services)
//! and turns them into a validated, cross-referenced registry of finished
//! model objects for downstream code generators.
//!
//! ## Features
//!
//! - **Composable grammars**: independent sub-grammars of entity schemas,
//!   unioned with eager duplicate detection
//! - **Early validation**: raw records are checked against their schema at
//!   construction time; only link target existence waits for solve
//! - **Deterministic solve**: schema kinds are topologically ordered,
//!   records processed in registration order, so identical inputs yield
//!   identical notebooks
//! - **Fail-fast errors**: every failure names the offending record key and
//!   field; no partial notebook is ever returned
//! - **Stable export**: pretty-printed JSON with sorted keys and a SHA256
//!   checksum, byte-identical across runs
//!
//! ## Two-phase pipeline
//!
//! ```text
//! loaders --> RawRepository (gather, may cascade)
//!                  |
//!                  v solve
//!             Notebook of Sketches --> generation layer
//! ```

pub mod checksum;
pub mod error;
pub mod export;
pub mod factories;
pub mod factory;
pub mod generation;
pub mod grammar;
pub mod loader;
pub mod notebook;
pub mod property;
pub mod raw;
pub mod repository;
pub mod schema;
pub mod sketch;
mod solve;

pub use checksum::Checksum;
pub use error::{ModelError, Result};
pub use export::{export_notebook, write_export, NotebookExport};
pub use factories::standard_registry;
pub use factory::{FactoryRegistry, SketchFactory};
pub use generation::{GenerationConfig, GeneratorOptions};
pub use grammar::Grammar;
pub use notebook::Notebook;
pub use property::{PropertyType, PropertyValue};
pub use raw::{RawBuilder, RawKey, RawRecord};
pub use repository::{RawRepository, MAX_CASCADE_DEPTH};
pub use schema::{Cardinality, EntitySchema, FieldKind, FieldSpec};
pub use sketch::{Sketch, SketchKind};
