use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use chrono::Utc;
use tracing::warn;

use crate::error::{JumperError, Result};
use crate::store::schema::StoreDocument;

const STORE_FILE: &str = "store.json";

/// Durable string key/value primitives. Absent keys are `Ok(None)`, never an error.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

// --- File-backed store ---

/// Every `set` rewrites the whole document through a `.tmp` file and a rename,
/// so a reload always sees the latest completed write.
pub struct JsonKvStore {
    base_dir: PathBuf,
    doc: StoreDocument,
}

impl JsonKvStore {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("leveljumper");
        Self::with_base_dir(base_dir)
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)?;
        let mut store = Self {
            base_dir,
            doc: StoreDocument::default(),
        };
        store.doc = store.load();
        Ok(store)
    }

    fn file_path(&self) -> PathBuf {
        self.base_dir.join(STORE_FILE)
    }

    fn load(&self) -> StoreDocument {
        let path = self.file_path();
        if !path.exists() {
            return StoreDocument::default();
        }
        let doc = fs::read_to_string(&path)
            .ok()
            .and_then(|content| serde_json::from_str::<StoreDocument>(&content).ok());
        match doc {
            Some(doc) if !doc.needs_reset() => doc,
            _ => {
                warn!(path = %path.display(), "unreadable or outdated store, starting empty");
                StoreDocument::default()
            }
        }
    }

    fn save(&self, doc: &StoreDocument) -> Result<()> {
        let path = self.file_path();
        let tmp_path = path.with_extension("tmp");

        let json = serde_json::to_string_pretty(doc)?;
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }
}

impl KeyValueStore for JsonKvStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.doc.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut next = self.doc.clone();
        next.values.insert(key.to_string(), value.to_string());
        next.updated_at = Some(Utc::now());
        self.save(&next)
            .map_err(|e| JumperError::store(key, e.to_string()))?;
        self.doc = next;
        Ok(())
    }
}

// --- In-memory store ---

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
