//! Notebook export
//!
//! Serializes a completed notebook to a pretty-printed, human-diffable JSON
//! form with stable key order. Given identical inputs, exporting twice
//! yields byte-identical output: sketches are sorted by name, per-kind
//! counts use a sorted map, and the envelope carries no timestamps.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::checksum::Checksum;
use crate::error::Result;
use crate::notebook::Notebook;
use crate::sketch::Sketch;

/// Deterministic export envelope
#[derive(Debug, Serialize)]
pub struct NotebookExport<'a> {
    /// Total number of sketches
    pub sketch_count: usize,
    /// Per-kind counts, sorted by kind label
    pub kinds: BTreeMap<String, usize>,
    /// All sketches, sorted by name
    pub sketches: Vec<&'a Sketch>,
    /// Checksum over the serialized sketch list
    pub checksum: Checksum,
}

impl<'a> NotebookExport<'a> {
    pub fn new(notebook: &'a Notebook) -> Result<Self> {
        let mut sketches: Vec<&Sketch> = notebook.sketches().collect();
        sketches.sort_by(|a, b| a.name().cmp(b.name()));

        let mut kinds: BTreeMap<String, usize> = BTreeMap::new();
        for sketch in &sketches {
            *kinds.entry(sketch.kind().to_string()).or_insert(0) += 1;
        }

        let checksum = Checksum::from_json(&serde_json::to_value(&sketches)?);
        Ok(Self {
            sketch_count: sketches.len(),
            kinds,
            sketches,
            checksum,
        })
    }
}

/// Render the notebook as pretty-printed JSON
pub fn export_notebook(notebook: &Notebook) -> Result<String> {
    let export = NotebookExport::new(notebook)?;
    let mut out = serde_json::to_string_pretty(&export)?;
    out.push('\n');
    Ok(out)
}

/// Write the export to a file
pub fn write_export(notebook: &Notebook, path: impl AsRef<Path>) -> Result<()> {
    let rendered = export_notebook(notebook)?;
    fs::write(path.as_ref(), rendered)?;
    tracing::info!(path = %path.as_ref().display(), "wrote notebook export");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sketch::DomainSketch;

    fn notebook() -> Notebook {
        let mut notebook = Notebook::new();
        for name in ["DomZoo", "DomCore"] {
            notebook
                .register(Sketch::Domain(DomainSketch {
                    name: name.to_string(),
                    namespace: None,
                    label: None,
                }))
                .unwrap();
        }
        notebook
    }

    #[test]
    fn test_export_idempotent() {
        let notebook = notebook();
        let first = export_notebook(&notebook).unwrap();
        let second = export_notebook(&notebook).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_export_name_sorted_regardless_of_registration() {
        let rendered = export_notebook(&notebook()).unwrap();
        let zoo = rendered.find("DomZoo").unwrap();
        let core = rendered.find("DomCore").unwrap();
        assert!(core < zoo);
    }
}
