// src/core/store.rs

use serde_json::Value;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use tracing::debug;

use crate::core::error::{AuditError, AuditResult};

/// Named JSON documents with full-overwrite semantics.
pub trait DocumentStore: Send + Sync {
    fn read(&self, name: &str) -> AuditResult<Option<Value>>;
    fn write(&self, name: &str, document: &Value) -> AuditResult<()>;
}

/// Stores each document as `<dir>/<name>.json`.
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> AuditResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .map_err(|e| AuditError::Persistence(format!("cannot create {}: {}", dir.display(), e)))?;
        Ok(Self { dir })
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", name))
    }
}

impl DocumentStore for JsonFileStore {
    fn read(&self, name: &str) -> AuditResult<Option<Value>> {
        let path = self.path_for(name);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(AuditError::Persistence(format!("cannot read {}: {}", path.display(), e))),
        };
        Ok(Some(serde_json::from_str(&text)?))
    }

    /// Writes to a temp file, flushes it to disk, then renames it over the
    /// previous document so readers never see a partial write.
    fn write(&self, name: &str, document: &Value) -> AuditResult<()> {
        let path = self.path_for(name);
        let tmp = self.dir.join(format!(".{}.json.tmp", name));
        let text = serde_json::to_string_pretty(document)?;

        let write_err = |e: std::io::Error| AuditError::Persistence(format!("cannot write {}: {}", tmp.display(), e));
        let mut file = fs::File::create(&tmp).map_err(write_err)?;
        file.write_all(text.as_bytes()).map_err(write_err)?;
        file.sync_all().map_err(write_err)?;
        drop(file);
        fs::rename(&tmp, &path)
            .map_err(|e| AuditError::Persistence(format!("cannot replace {}: {}", path.display(), e)))?;
        debug!(document = name, path = %path.display(), "Document written.");
        Ok(())
    }
}

/// In-process store.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryStore {
    documents: std::sync::Mutex<std::collections::HashMap<String, Value>>,
}

#[cfg(test)]
impl DocumentStore for MemoryStore {
    fn read(&self, name: &str) -> AuditResult<Option<Value>> {
        let documents = self.documents.lock().map_err(|_| AuditError::Persistence("store lock poisoned".into()))?;
        Ok(documents.get(name).cloned())
    }

    fn write(&self, name: &str, document: &Value) -> AuditResult<()> {
        let mut documents =
            self.documents.lock().map_err(|_| AuditError::Persistence("store lock poisoned".into()))?;
        documents.insert(name.to_string(), document.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("warden-store-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn file_store_overwrites_documents() {
        let dir = scratch_dir();
        let store = JsonFileStore::new(&dir).unwrap();

        assert_eq!(store.read("scan_history").unwrap(), None);
        store.write("scan_history", &json!([1, 2, 3])).unwrap();
        store.write("scan_history", &json!([4])).unwrap();
        assert_eq!(store.read("scan_history").unwrap(), Some(json!([4])));
        assert!(dir.join("scan_history.json").exists());
        assert!(!dir.join(".scan_history.json.tmp").exists());

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn shorter_document_fully_replaces_longer_one() {
        let dir = scratch_dir();
        let store = JsonFileStore::new(&dir).unwrap();
        store.write("current_report", &json!({"findings": ["a", "b", "c", "d"], "total_findings": 4})).unwrap();
        store.write("current_report", &json!({"total_findings": 0})).unwrap();

        let raw = fs::read_to_string(dir.join("current_report.json")).unwrap();
        assert_eq!(serde_json::from_str::<Value>(&raw).unwrap(), json!({"total_findings": 0}));
        assert_eq!(store.read("current_report").unwrap(), Some(json!({"total_findings": 0})));
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn corrupt_document_is_a_persistence_error() {
        let dir = scratch_dir();
        let store = JsonFileStore::new(&dir).unwrap();
        fs::write(dir.join("current_report.json"), "{ not json").unwrap();

        assert!(matches!(store.read("current_report"), Err(AuditError::Persistence(_))));
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn memory_store_keeps_documents_apart() {
        let store = MemoryStore::default();
        store.write("a", &json!({"x": 1})).unwrap();
        assert_eq!(store.read("a").unwrap(), Some(json!({"x": 1})));
        assert_eq!(store.read("b").unwrap(), None);
    }
}
