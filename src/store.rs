//! Persistence for saved forms.
//!
//! Saved forms are stored as one JSON array of [`FormSchema`] under a single
//! key of a textual key-value store. [`FormRepository`] is the seam; the
//! application injects whichever backend fits and [`FormLibrary`] keeps the
//! in-memory list and the store in step.

use crate::config::EngineConfig;
use crate::error::StoreError;
use crate::schema::FormSchema;
use ahash::AHashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Loads and saves the complete list of saved forms.
pub trait FormRepository {
    /// Returns every saved form; an empty store yields an empty list.
    fn load(&self) -> Result<Vec<FormSchema>, StoreError>;

    /// Replaces the stored list with `forms`.
    fn save(&mut self, forms: &[FormSchema]) -> Result<(), StoreError>;
}

fn decode(key: &str, text: &str) -> Result<Vec<FormSchema>, StoreError> {
    serde_json::from_str(text).map_err(|source| StoreError::Malformed {
        key: key.to_string(),
        source,
    })
}

/// An in-process string key-value store, the shape of browser local storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    key: String,
    entries: AHashMap<String, String>,
}

impl MemoryStore {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            key: config.storage_key.clone(),
            entries: AHashMap::new(),
        }
    }

    /// Raw text stored under `key`.
    pub fn get_item(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn set_item(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }
}

impl FormRepository for MemoryStore {
    fn load(&self) -> Result<Vec<FormSchema>, StoreError> {
        match self.get_item(&self.key) {
            Some(text) => decode(&self.key, text),
            None => Ok(Vec::new()),
        }
    }

    fn save(&mut self, forms: &[FormSchema]) -> Result<(), StoreError> {
        let text = serde_json::to_string(forms)?;
        let key = self.key.clone();
        self.set_item(&key, text);
        Ok(())
    }
}

/// Stores the forms list as `<dir>/<storage key>.json`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    key: String,
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl AsRef<Path>, config: &EngineConfig) -> Self {
        let key = config.storage_key.clone();
        let path = dir.as_ref().join(format!("{}.json", key));
        Self { key, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

impl FormRepository for JsonFileStore {
    fn load(&self) -> Result<Vec<FormSchema>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(text) => decode(&self.key, &text),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no saved forms yet");
                Ok(Vec::new())
            }
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn save(&mut self, forms: &[FormSchema]) -> Result<(), StoreError> {
        let text = serde_json::to_string_pretty(forms)?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        // Written beside the target, then renamed over it.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, text).map_err(|e| self.io_error(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))
    }
}

/// The saved-forms list, persisted through a repository after every change.
pub struct FormLibrary<R: FormRepository> {
    repository: R,
    forms: Vec<FormSchema>,
}

impl<R: FormRepository> FormLibrary<R> {
    pub fn open(repository: R) -> Result<Self, StoreError> {
        let forms = repository.load()?;
        debug!(count = forms.len(), "opened form library");
        Ok(Self { repository, forms })
    }

    /// Saved forms, newest first.
    pub fn list(&self) -> Vec<&FormSchema> {
        let mut forms: Vec<&FormSchema> = self.forms.iter().collect();
        forms.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        forms
    }

    pub fn get(&self, id: &str) -> Option<&FormSchema> {
        self.forms.iter().find(|f| f.id == id)
    }

    /// Adds a form. The library is left unchanged if the store rejects the write.
    pub fn insert(&mut self, schema: FormSchema) -> Result<(), StoreError> {
        info!(form = %schema.id, name = %schema.name, "storing form");
        let mut forms = self.forms.clone();
        forms.push(schema);
        self.commit(forms)
    }

    /// Removes a form. The library is left unchanged if the store rejects the write.
    pub fn delete(&mut self, id: &str) -> Result<FormSchema, StoreError> {
        let index = self
            .forms
            .iter()
            .position(|f| f.id == id)
            .ok_or_else(|| StoreError::FormNotFound(id.to_string()))?;
        let mut forms = self.forms.clone();
        let removed = forms.remove(index);
        self.commit(forms)?;
        info!(form = %id, "deleted form");
        Ok(removed)
    }

    fn commit(&mut self, forms: Vec<FormSchema>) -> Result<(), StoreError> {
        self.repository.save(&forms)?;
        self.forms = forms;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.forms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }
}
