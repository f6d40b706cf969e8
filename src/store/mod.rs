//! # Lab Storage
//!
//! The whole lab is one document, so storage is a load/save pair over that
//! document. [`JsonFileStore`] is what the CLI uses; [`MemoryStore`] backs
//! tests and embedders that manage persistence themselves.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::{LabError, Result};
use crate::model::Lab;

/// Persistence for the singleton lab document.
pub trait LabStore {
    /// Load the lab, or `None` if none has been created.
    fn load(&self) -> Result<Option<Lab>>;

    /// Replace the stored lab with `lab`.
    fn save(&mut self, lab: &Lab) -> Result<()>;
}

/// Stores the lab as pretty-printed JSON in a single file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn storage_err(&self, source: io::Error) -> LabError {
        LabError::Storage {
            path: self.path.display().to_string(),
            source,
        }
    }
}

impl LabStore for JsonFileStore {
    fn load(&self) -> Result<Option<Lab>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.storage_err(e)),
        };
        let lab: Lab = serde_json::from_str(&text)?;
        Ok(Some(lab))
    }

    fn save(&mut self, lab: &Lab) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.storage_err(e))?;
            }
        }
        let json = serde_json::to_string_pretty(lab)?;

        // Write beside the target and rename over it so readers never see
        // a partially written document.
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, json).map_err(|e| self.storage_err(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.storage_err(e))?;
        debug!("saved lab document to {}", self.path.display());
        Ok(())
    }
}

/// Keeps the lab in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    lab: Option<Lab>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lab(lab: Lab) -> Self {
        Self { lab: Some(lab) }
    }
}

impl LabStore for MemoryStore {
    fn load(&self) -> Result<Option<Lab>> {
        Ok(self.lab.clone())
    }

    fn save(&mut self, lab: &Lab) -> Result<()> {
        self.lab = Some(lab.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_means_no_lab() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("lab.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn file_store_persists_whole_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("lab.json");
        let mut store = JsonFileStore::new(&path);
        let lab = Lab::new("RVCE Bio Lab", "Bengaluru");
        store.save(&lab).unwrap();

        assert!(path.exists());
        assert!(!dir.path().join("nested").join("lab.json.tmp").exists());

        let reopened = JsonFileStore::new(&path);
        assert_eq!(reopened.load().unwrap(), Some(lab));
    }

    #[test]
    fn corrupt_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lab.json");
        fs::write(&path, "{ not json").unwrap();
        let store = JsonFileStore::new(&path);
        assert!(matches!(store.load(), Err(LabError::ParseError { .. })));
    }

    #[test]
    fn memory_store_roundtrip() {
        let mut store = MemoryStore::new();
        assert!(store.load().unwrap().is_none());
        store.save(&Lab::new("A", "B")).unwrap();
        assert_eq!(store.load().unwrap().unwrap().name, "A");
    }
}
