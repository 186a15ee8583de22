#![forbid(unsafe_code)]

//! Named storage slots for layouts.
//!
//! A [`StorageBackend`] is a plain string key/value store. [`LayoutStore`]
//! layers two typed slots on top of it:
//!
//! - the current layout, one serialized tree;
//! - templates, a single JSON object mapping template names to trees.
//!
//! Everything read back is validated before it is handed to the editor.

use std::collections::BTreeMap;
use std::fmt;
#[cfg(feature = "state-persistence")]
use std::path::{Path, PathBuf};

#[cfg(feature = "policy-config")]
use serde::{Deserialize, Serialize};
use splitcanvas_layout::{LayoutModelError, LayoutNode, LayoutPolicy};
use tracing::{debug, warn};

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors raised by storage backends and [`LayoutStore`].
#[derive(Debug)]
pub enum StorageError {
    /// Backend I/O failure.
    Io(std::io::Error),
    /// Stored text is not valid JSON for the expected shape.
    Json(serde_json::Error),
    /// Stored tree parsed but violates layout invariants.
    InvalidLayout {
        key: String,
        source: LayoutModelError,
    },
    /// Template names must contain a non-whitespace character.
    InvalidTemplateName { name: String },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "storage I/O error: {e}"),
            Self::Json(e) => write!(f, "stored layout is not valid JSON: {e}"),
            Self::InvalidLayout { key, source } => {
                write!(f, "stored layout under {key:?} is invalid: {source}")
            }
            Self::InvalidTemplateName { name } => {
                write!(f, "invalid template name {name:?}")
            }
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::InvalidLayout { source, .. } => Some(source),
            Self::InvalidTemplateName { .. } => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

/// String key/value persistence.
pub trait StorageBackend {
    /// Read the value under `key`, if any.
    fn load(&self, key: &str) -> StorageResult<Option<String>>;

    /// Write `value` under `key`, replacing any previous value.
    fn store(&mut self, key: &str, value: &str) -> StorageResult<()>;

    /// Delete `key`. Returns whether a value was present.
    fn remove(&mut self, key: &str) -> StorageResult<bool>;
}

/// In-process backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStorage {
    entries: BTreeMap<String, String>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Raw value under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl StorageBackend for MemoryStorage {
    fn load(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn store(&mut self, key: &str, value: &str) -> StorageResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StorageResult<bool> {
        Ok(self.entries.remove(key).is_some())
    }
}

/// Directory backend: one `<key>.json` file per key.
///
/// Writes go to a sibling temporary file that is renamed into place.
#[cfg(feature = "state-persistence")]
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

#[cfg(feature = "state-persistence")]
impl FileStorage {
    /// Open (creating if needed) a storage directory.
    pub fn open(root: impl AsRef<Path>) -> StorageResult<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File backing `key`. Characters outside `[A-Za-z0-9._-]` map to `_`.
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        let file_stem: String = key
            .chars()
            .map(|ch| {
                if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-') {
                    ch
                } else {
                    '_'
                }
            })
            .collect();
        self.root.join(format!("{file_stem}.json"))
    }
}

#[cfg(feature = "state-persistence")]
impl StorageBackend for FileStorage {
    fn load(&self, key: &str) -> StorageResult<Option<String>> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn store(&mut self, key: &str, value: &str) -> StorageResult<()> {
        let path = self.path_for(key);
        let staging = path.with_extension("json.tmp");
        std::fs::write(&staging, value)?;
        std::fs::rename(&staging, &path)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StorageResult<bool> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// Slot keys used by [`LayoutStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "policy-config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "policy-config", serde(default))]
pub struct StorageConfig {
    /// Key of the current-layout slot.
    pub layout_key: String,
    /// Key of the template collection.
    pub templates_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            layout_key: "splitcanvas.layout".to_string(),
            templates_key: "splitcanvas.templates".to_string(),
        }
    }
}

impl StorageConfig {
    /// List range errors; empty when the keys are usable.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.layout_key.trim().is_empty() {
            errors.push("storage.layout_key must not be blank".to_string());
        }
        if self.templates_key.trim().is_empty() {
            errors.push("storage.templates_key must not be blank".to_string());
        }
        if self.layout_key == self.templates_key {
            errors.push(format!(
                "storage.layout_key and storage.templates_key must differ (both {:?})",
                self.layout_key
            ));
        }
        errors
    }
}

/// Templates are kept as raw JSON so one unreadable entry does not block the
/// others; each tree is decoded and checked only when it is loaded.
type TemplateMap = BTreeMap<String, serde_json::Value>;

/// Typed current-layout and template slots over a backend.
#[derive(Debug, Clone)]
pub struct LayoutStore<B> {
    backend: B,
    config: StorageConfig,
    policy: LayoutPolicy,
}

impl<B: StorageBackend> LayoutStore<B> {
    #[must_use]
    pub fn new(backend: B, config: StorageConfig, policy: LayoutPolicy) -> Self {
        Self {
            backend,
            config,
            policy,
        }
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[must_use]
    pub fn into_backend(self) -> B {
        self.backend
    }

    #[must_use]
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Persist `tree` as the current layout.
    pub fn save_current(&mut self, tree: &LayoutNode) -> StorageResult<()> {
        let text = serde_json::to_string(tree)?;
        self.backend.store(&self.config.layout_key, &text)?;
        debug!(key = %self.config.layout_key, hash = tree.state_hash(), "saved current layout");
        Ok(())
    }

    /// Read back the current layout, if one was saved.
    pub fn load_current(&self) -> StorageResult<Option<LayoutNode>> {
        let key = &self.config.layout_key;
        let Some(text) = self.backend.load(key)? else {
            return Ok(None);
        };
        let tree: LayoutNode = serde_json::from_str(&text)?;
        self.check(key, &tree)?;
        Ok(Some(tree))
    }

    /// Forget the current layout. Returns whether one was stored.
    pub fn clear_current(&mut self) -> StorageResult<bool> {
        self.backend.remove(&self.config.layout_key)
    }

    /// Store `tree` under `name`, replacing any template of that name.
    ///
    /// Returns the trimmed name actually used.
    pub fn save_template(&mut self, name: &str, tree: &LayoutNode) -> StorageResult<String> {
        let name = normalize_template_name(name)?;
        let mut templates = self.read_templates()?;
        templates.insert(name.clone(), serde_json::to_value(tree)?);
        self.write_templates(&templates)?;
        debug!(template = %name, count = templates.len(), "saved template");
        Ok(name)
    }

    /// Decode and validate the template stored under `name`.
    pub fn load_template(&self, name: &str) -> StorageResult<Option<LayoutNode>> {
        let name = normalize_template_name(name)?;
        let Some(value) = self.read_templates()?.remove(&name) else {
            return Ok(None);
        };
        let tree: LayoutNode = serde_json::from_value(value)?;
        self.check(&format!("{}/{name}", self.config.templates_key), &tree)?;
        Ok(Some(tree))
    }

    /// Remove a template. Returns whether it existed.
    pub fn delete_template(&mut self, name: &str) -> StorageResult<bool> {
        let name = normalize_template_name(name)?;
        let mut templates = self.read_templates()?;
        if templates.remove(&name).is_none() {
            return Ok(false);
        }
        self.write_templates(&templates)?;
        Ok(true)
    }

    /// Stored template names, sorted.
    pub fn template_names(&self) -> StorageResult<Vec<String>> {
        Ok(self.read_templates()?.into_keys().collect())
    }

    fn read_templates(&self) -> StorageResult<TemplateMap> {
        let key = &self.config.templates_key;
        let Some(text) = self.backend.load(key)? else {
            return Ok(TemplateMap::new());
        };
        Ok(serde_json::from_str(&text)?)
    }

    fn write_templates(&mut self, templates: &TemplateMap) -> StorageResult<()> {
        let text = serde_json::to_string(templates)?;
        self.backend.store(&self.config.templates_key, &text)
    }

    fn check(&self, key: &str, tree: &LayoutNode) -> StorageResult<()> {
        tree.validate(&self.policy).map_err(|source| {
            warn!(key, error = %source, "rejecting stored layout");
            StorageError::InvalidLayout {
                key: key.to_string(),
                source,
            }
        })
    }
}

fn normalize_template_name(name: &str) -> StorageResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(StorageError::InvalidTemplateName {
            name: name.to_string(),
        });
    }
    Ok(trimmed.to_string())
}
