//! Sketches
//!
//! A sketch is the finished, strongly-typed model object produced by
//! resolving one raw record (or a nested group of them). Sketch names are
//! kind-prefixed: `TypText`, `DomCore`, `EntCustomer`. Member sketches carry
//! a `$member` suffix (`EntCustomer$name`). The kind set is closed on
//! purpose: dispatch is an explicit registration list, not open class
//! hierarchies, so ambiguity is detected at startup.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::error::{ModelError, Result};
use crate::property::PropertyType;

/// `Name` or `Name$member`, bounds on both parts
const NAME_PATTERN: &str = r"^[A-Z][A-Za-z0-9]{2,60}(\$[a-z][A-Za-z0-9]{2,60})?$";

fn name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(NAME_PATTERN).expect("valid sketch name pattern"))
}

/// The closed set of sketch kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SketchKind {
    Type,
    Domain,
    Entity,
    Attribute,
    StaticData,
    Association,
    Task,
    FileKind,
    Service,
}

impl SketchKind {
    /// Declared name prefix for this kind
    ///
    /// Attribute sketches are members of an entity and share its prefix.
    pub fn prefix(&self) -> &'static str {
        match self {
            SketchKind::Type => "Typ",
            SketchKind::Domain => "Dom",
            SketchKind::Entity | SketchKind::Attribute => "Ent",
            SketchKind::StaticData => "Dat",
            SketchKind::Association => "Asc",
            SketchKind::Task => "Tsk",
            SketchKind::FileKind => "Fil",
            SketchKind::Service => "Svc",
        }
    }

    /// Whether names of this kind carry the `$member` suffix
    pub fn is_member(&self) -> bool {
        matches!(self, SketchKind::Attribute)
    }

    /// Validate a sketch name against the shape rules for this kind
    pub fn validate_name(&self, name: &str) -> Result<()> {
        let fail = |reason: &str| {
            Err(ModelError::InvalidSketchName {
                name: name.to_string(),
                kind: *self,
                reason: reason.to_string(),
            })
        };
        if !name_regex().is_match(name) {
            return fail("does not match the sketch name pattern");
        }
        let prefix = self.prefix();
        let Some(rest) = name.strip_prefix(prefix) else {
            return fail(&format!("must start with prefix `{prefix}`"));
        };
        if !rest.chars().next().is_some_and(|c| c.is_ascii_uppercase()) {
            return fail("character after the prefix must be upper-case");
        }
        let has_member = name.contains('$');
        if self.is_member() && !has_member {
            return fail("member kind requires a `$member` suffix");
        }
        if !self.is_member() && has_member {
            return fail("non-member kind must not carry a `$member` suffix");
        }
        Ok(())
    }
}

impl fmt::Display for SketchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SketchKind::Type => "type",
            SketchKind::Domain => "domain",
            SketchKind::Entity => "entity",
            SketchKind::Attribute => "attribute",
            SketchKind::StaticData => "static_data",
            SketchKind::Association => "association",
            SketchKind::Task => "task",
            SketchKind::FileKind => "file_kind",
            SketchKind::Service => "service",
        };
        f.write_str(s)
    }
}

/// One of the built-in scalar value types
#[derive(Debug, Clone, Serialize)]
pub struct TypeSketch {
    pub name: String,
    pub property: PropertyType,
    pub label: Option<String>,
}

/// A namespace/module grouping for entities
#[derive(Debug, Clone, Serialize)]
pub struct DomainSketch {
    pub name: String,
    pub namespace: Option<String>,
    pub label: Option<String>,
}

/// A persistent entity definition
#[derive(Debug, Clone, Serialize)]
pub struct EntitySketch {
    pub name: String,
    pub domain: String,
    pub label: Option<String>,
    /// Member attribute sketch names, in declaration order
    pub attributes: Vec<String>,
    pub has_static_data: bool,
}

/// One attribute of an entity, named `Entity$attr`
#[derive(Debug, Clone, Serialize)]
pub struct AttributeSketch {
    pub name: String,
    pub entity: String,
    /// Type sketch name of the value
    pub value_type: String,
    pub required: bool,
    pub label: Option<String>,
}

/// Master-data rows shipped with an entity
#[derive(Debug, Clone, Serialize)]
pub struct StaticDataSketch {
    pub name: String,
    pub entity: String,
    /// One object per row, keyed by attribute member name
    pub rows: Vec<serde_json::Value>,
}

/// A directed association between two entities
#[derive(Debug, Clone, Serialize)]
pub struct AssociationSketch {
    pub name: String,
    pub source: String,
    pub target: String,
    pub cardinality: Option<String>,
    pub label: Option<String>,
}

/// A task acting on one entity
#[derive(Debug, Clone, Serialize)]
pub struct TaskSketch {
    pub name: String,
    pub entity: String,
    pub label: Option<String>,
    /// Input attribute sketch names, in declaration order
    pub inputs: Vec<String>,
    /// At most one output attribute
    pub output: Option<String>,
    pub logged: bool,
}

/// A file artifact shape serializing one entity
#[derive(Debug, Clone, Serialize)]
pub struct FileKindSketch {
    pub name: String,
    pub entity: String,
    pub extension: String,
    pub format: Option<String>,
    pub label: Option<String>,
}

/// One operation of a web service
#[derive(Debug, Clone, Serialize)]
pub struct OperationSketch {
    pub name: String,
    pub direction: String,
}

/// A web-service shape exposing one entity
#[derive(Debug, Clone, Serialize)]
pub struct ServiceSketch {
    pub name: String,
    pub entity: String,
    pub label: Option<String>,
    pub operations: Vec<OperationSketch>,
}

/// The finished, immutable model object
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Sketch {
    Type(TypeSketch),
    Domain(DomainSketch),
    Entity(EntitySketch),
    Attribute(AttributeSketch),
    StaticData(StaticDataSketch),
    Association(AssociationSketch),
    Task(TaskSketch),
    FileKind(FileKindSketch),
    Service(ServiceSketch),
}

impl Sketch {
    pub fn name(&self) -> &str {
        match self {
            Sketch::Type(s) => &s.name,
            Sketch::Domain(s) => &s.name,
            Sketch::Entity(s) => &s.name,
            Sketch::Attribute(s) => &s.name,
            Sketch::StaticData(s) => &s.name,
            Sketch::Association(s) => &s.name,
            Sketch::Task(s) => &s.name,
            Sketch::FileKind(s) => &s.name,
            Sketch::Service(s) => &s.name,
        }
    }

    pub fn kind(&self) -> SketchKind {
        match self {
            Sketch::Type(_) => SketchKind::Type,
            Sketch::Domain(_) => SketchKind::Domain,
            Sketch::Entity(_) => SketchKind::Entity,
            Sketch::Attribute(_) => SketchKind::Attribute,
            Sketch::StaticData(_) => SketchKind::StaticData,
            Sketch::Association(_) => SketchKind::Association,
            Sketch::Task(_) => SketchKind::Task,
            Sketch::FileKind(_) => SketchKind::FileKind,
            Sketch::Service(_) => SketchKind::Service,
        }
    }

    pub fn as_type(&self) -> Option<&TypeSketch> {
        match self {
            Sketch::Type(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_domain(&self) -> Option<&DomainSketch> {
        match self {
            Sketch::Domain(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_entity(&self) -> Option<&EntitySketch> {
        match self {
            Sketch::Entity(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_attribute(&self) -> Option<&AttributeSketch> {
        match self {
            Sketch::Attribute(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_static_data(&self) -> Option<&StaticDataSketch> {
        match self {
            Sketch::StaticData(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_association(&self) -> Option<&AssociationSketch> {
        match self {
            Sketch::Association(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_task(&self) -> Option<&TaskSketch> {
        match self {
            Sketch::Task(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_file_kind(&self) -> Option<&FileKindSketch> {
        match self {
            Sketch::FileKind(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_service(&self) -> Option<&ServiceSketch> {
        match self {
            Sketch::Service(s) => Some(s),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        assert!(SketchKind::Entity.validate_name("EntCustomer").is_ok());
        assert!(SketchKind::Type.validate_name("TypText").is_ok());
        assert!(SketchKind::Attribute.validate_name("EntCustomer$name").is_ok());
    }

    #[test]
    fn test_wrong_prefix() {
        let err = SketchKind::Entity.validate_name("TskCustomer").unwrap_err();
        assert!(matches!(err, ModelError::InvalidSketchName { .. }));
    }

    #[test]
    fn test_lowercase_after_prefix() {
        assert!(SketchKind::Entity.validate_name("Entcustomer").is_err());
    }

    #[test]
    fn test_member_suffix_rules() {
        // member kind without suffix
        assert!(SketchKind::Attribute.validate_name("EntCustomer").is_err());
        // non-member kind with suffix
        assert!(SketchKind::Entity.validate_name("EntCustomer$name").is_err());
        // suffix must start lower-case
        assert!(SketchKind::Attribute.validate_name("EntCustomer$Name").is_err());
    }

    #[test]
    fn test_pattern_bounds() {
        // too short after the leading capital
        assert!(SketchKind::Type.validate_name("Ty").is_err());
        // non-alphanumeric
        assert!(SketchKind::Entity.validate_name("Ent-Customer").is_err());
    }
}
