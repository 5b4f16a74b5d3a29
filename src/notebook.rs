//! The notebook: typed registry of finished sketches
//!
//! Built fresh by every solve run and handed read-only to the generation
//! layer. Registration order is preserved for determinism checks; query
//! results are presented name-sorted.

use indexmap::IndexMap;

use crate::error::{ModelError, Result};
use crate::sketch::{Sketch, SketchKind};

/// Registry of all sketches produced by one resolution run
#[derive(Debug, Default)]
pub struct Notebook {
    sketches: IndexMap<String, Sketch>,
}

impl Notebook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a finished sketch
    ///
    /// Validates the name against its kind's shape rules and rejects
    /// duplicates. A sketch is registered exactly once and owned by the
    /// notebook from then on.
    pub fn register(&mut self, sketch: Sketch) -> Result<()> {
        sketch.kind().validate_name(sketch.name())?;
        if self.sketches.contains_key(sketch.name()) {
            return Err(ModelError::DuplicateSketchName(sketch.name().to_string()));
        }
        tracing::debug!(name = sketch.name(), kind = %sketch.kind(), "registered sketch");
        self.sketches.insert(sketch.name().to_string(), sketch);
        Ok(())
    }

    /// Look up a sketch by name, any kind
    pub fn get(&self, name: &str) -> Option<&Sketch> {
        self.sketches.get(name)
    }

    /// Resolve a sketch by name and expected kind
    ///
    /// Fails if the name is absent or registered under a different kind.
    pub fn resolve(&self, name: &str, kind: SketchKind) -> Result<&Sketch> {
        let sketch = self
            .sketches
            .get(name)
            .ok_or_else(|| ModelError::SketchNotFound {
                name: name.to_string(),
                kind,
            })?;
        if sketch.kind() != kind {
            return Err(ModelError::SketchKindMismatch {
                name: name.to_string(),
                expected: kind,
                found: sketch.kind(),
            });
        }
        Ok(sketch)
    }

    /// All sketches of one kind, sorted by name
    pub fn get_all(&self, kind: SketchKind) -> Vec<&Sketch> {
        let mut out: Vec<&Sketch> = self
            .sketches
            .values()
            .filter(|s| s.kind() == kind)
            .collect();
        out.sort_by(|a, b| a.name().cmp(b.name()));
        out
    }

    /// Sketch names in registration order
    pub fn registration_order(&self) -> impl Iterator<Item = &str> {
        self.sketches.keys().map(String::as_str)
    }

    /// All sketches in registration order
    pub fn sketches(&self) -> impl Iterator<Item = &Sketch> {
        self.sketches.values()
    }

    pub fn len(&self) -> usize {
        self.sketches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sketches.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sketch::{DomainSketch, EntitySketch};

    fn domain(name: &str) -> Sketch {
        Sketch::Domain(DomainSketch {
            name: name.to_string(),
            namespace: None,
            label: None,
        })
    }

    fn entity(name: &str, domain: &str) -> Sketch {
        Sketch::Entity(EntitySketch {
            name: name.to_string(),
            domain: domain.to_string(),
            label: None,
            attributes: Vec::new(),
            has_static_data: false,
        })
    }

    #[test]
    fn test_register_and_resolve() {
        let mut notebook = Notebook::new();
        notebook.register(domain("DomCore")).unwrap();
        let sketch = notebook.resolve("DomCore", SketchKind::Domain).unwrap();
        assert_eq!(sketch.name(), "DomCore");
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut notebook = Notebook::new();
        notebook.register(domain("DomCore")).unwrap();
        let err = notebook.register(domain("DomCore")).unwrap_err();
        assert!(matches!(err, ModelError::DuplicateSketchName(ref n) if n == "DomCore"));
    }

    #[test]
    fn test_resolve_missing() {
        let notebook = Notebook::new();
        let err = notebook.resolve("DomCore", SketchKind::Domain).unwrap_err();
        assert!(matches!(err, ModelError::SketchNotFound { .. }));
    }

    #[test]
    fn test_resolve_kind_mismatch() {
        let mut notebook = Notebook::new();
        notebook.register(domain("DomCore")).unwrap();
        let err = notebook.resolve("DomCore", SketchKind::Entity).unwrap_err();
        assert!(matches!(
            err,
            ModelError::SketchKindMismatch { expected: SketchKind::Entity, found: SketchKind::Domain, .. }
        ));
    }

    #[test]
    fn test_get_all_name_sorted() {
        let mut notebook = Notebook::new();
        notebook.register(entity("EntZebra", "DomCore")).unwrap();
        notebook.register(entity("EntApple", "DomCore")).unwrap();
        let names: Vec<_> = notebook
            .get_all(SketchKind::Entity)
            .iter()
            .map(|s| s.name())
            .collect();
        assert_eq!(names, vec!["EntApple", "EntZebra"]);
        // registration order is preserved independently
        let order: Vec<_> = notebook.registration_order().collect();
        assert_eq!(order, vec!["EntZebra", "EntApple"]);
    }

    #[test]
    fn test_invalid_name_rejected() {
        let mut notebook = Notebook::new();
        let err = notebook.register(domain("core")).unwrap_err();
        assert!(matches!(err, ModelError::InvalidSketchName { .. }));
    }
}
