//! Error types for the resolution engine
//!
//! Three groups, matching where an error can surface:
//! - Schema errors: raised while gathering raw records, attributable to one
//!   record or loader input.
//! - Repository errors: misconfiguration of the installed grammars/factories,
//!   fatal at startup rather than per-record.
//! - Resolution errors: raised during solve, abort the whole run. No partial
//!   notebook is ever returned.

use thiserror::Error;

use crate::sketch::SketchKind;

/// Result type for resolution operations
pub type Result<T> = std::result::Result<T, ModelError>;

/// Resolution engine errors
#[derive(Error, Debug)]
pub enum ModelError {
    // ---- Schema errors (gather phase) ----
    #[error("record `{key}` declares unknown schema `{schema}`")]
    UnknownSchema { key: String, schema: String },

    #[error("schema `{0}` is declared by more than one grammar")]
    DuplicateSchema(String),

    #[error("schema `{schema}` declares field `{field}` more than once")]
    DuplicateField { schema: String, field: String },

    #[error("record `{key}`: schema `{schema}` has no field `{field}`")]
    UnknownField {
        key: String,
        schema: String,
        field: String,
    },

    #[error("record `{key}`, field `{field}`: expected {expected}, got {found}")]
    TypeMismatch {
        key: String,
        field: String,
        expected: String,
        found: String,
    },

    #[error("record `{key}`: field `{field}` assigned more than once")]
    DuplicateAssignment { key: String, field: String },

    #[error("record `{key}` is missing required field `{field}`")]
    MissingRequiredField { key: String, field: String },

    #[error("record `{key}`: schema `{schema}` is provided by the host and cannot be declared in sources")]
    ProvidedSchema { key: String, schema: String },

    // ---- Repository errors (startup / configuration) ----
    #[error("duplicate raw record key `{0}`")]
    DuplicateKey(String),

    #[error("schema `{schema}` is claimed by both factory `{first}` and factory `{second}`")]
    AmbiguousOwnership {
        schema: String,
        first: String,
        second: String,
    },

    #[error("no factory owns schema `{schema}`")]
    NoOwner { schema: String },

    #[error("cyclic schema dependency: {0}")]
    CyclicSchemaDependency(String),

    #[error("cascade expansion exceeded depth {depth} while inserting record `{key}`")]
    CascadeDepthExceeded { key: String, depth: usize },

    // ---- Resolution errors (solve phase) ----
    #[error("record `{key}`: link `{field}` -> `{target}` does not resolve")]
    UnresolvedLink {
        key: String,
        field: String,
        target: String,
    },

    #[error("no sketch named `{name}` of kind {kind}")]
    SketchNotFound { name: String, kind: SketchKind },

    #[error("sketch `{name}` is {found}, expected {expected}")]
    SketchKindMismatch {
        name: String,
        expected: SketchKind,
        found: SketchKind,
    },

    #[error("duplicate sketch name `{0}`")]
    DuplicateSketchName(String),

    #[error("invalid sketch name `{name}` for kind {kind}: {reason}")]
    InvalidSketchName {
        name: String,
        kind: SketchKind,
        reason: String,
    },

    // ---- Passthrough ----
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}
