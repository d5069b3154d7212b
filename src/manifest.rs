//! Manifest store for package.json files
//!
//! Every manifest is kept together with the raw text it was parsed from. The
//! structured form is what gets mutated and rewritten (pretty, two-space
//! indent, key order preserved); the raw text is what restoration writes back,
//! so a restored file is byte-identical to the original no matter what the
//! serializer would have done to it.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::error::{GinstallError, Result};

/// A parsed package.json plus its original raw text
#[derive(Debug, Clone)]
pub struct Manifest {
    path: PathBuf,
    value: Value,
    raw: String,
}

impl Manifest {
    /// Load a manifest, keeping the raw text alongside the parsed value
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(GinstallError::ManifestNotFound {
                path: path.display().to_string(),
            });
        }

        let raw = fs::read_to_string(path).map_err(|e| GinstallError::ManifestReadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let value: Value =
            serde_json::from_str(&raw).map_err(|e| GinstallError::ManifestParseFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        if !value.is_object() {
            return Err(GinstallError::ManifestParseFailed {
                path: path.display().to_string(),
                reason: "top-level value is not an object".to_string(),
            });
        }

        Ok(Self {
            path: path.to_path_buf(),
            value,
            raw,
        })
    }

    /// The raw text the manifest was loaded from
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The declared version, if any
    pub fn version(&self) -> Option<&str> {
        self.value.get("version").and_then(Value::as_str)
    }

    /// Whether the manifest declares any devDependencies
    pub fn has_dev_dependencies(&self) -> bool {
        self.value
            .get("devDependencies")
            .and_then(Value::as_object)
            .is_some_and(|m| !m.is_empty())
    }

    /// Pin `dependencies[name] = version` and drop any same-named entry from
    /// `devDependencies`
    ///
    /// A missing `dependencies` mapping is treated as empty and created.
    pub fn pin_dependency(&mut self, name: &str, version: &str) {
        let object = match self.value.as_object_mut() {
            Some(object) => object,
            None => return,
        };

        object
            .entry("dependencies")
            .or_insert_with(|| Value::Object(Map::new()));
        if let Some(deps) = object.get_mut("dependencies").and_then(Value::as_object_mut) {
            deps.insert(name.to_string(), Value::String(version.to_string()));
        }

        if let Some(dev) = object
            .get_mut("devDependencies")
            .and_then(Value::as_object_mut)
        {
            dev.remove(name);
        }
    }

    /// Merge devDependencies into dependencies, existing dependencies winning
    /// on conflict; the devDependencies section itself stays untouched
    ///
    /// Returns true if the manifest changed.
    pub fn merge_dev_dependencies(&mut self) -> bool {
        let dev: Vec<(String, Value)> = match self
            .value
            .get("devDependencies")
            .and_then(Value::as_object)
        {
            Some(map) if !map.is_empty() => {
                map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
            }
            _ => return false,
        };

        let object = match self.value.as_object_mut() {
            Some(object) => object,
            None => return false,
        };

        object
            .entry("dependencies")
            .or_insert_with(|| Value::Object(Map::new()));
        let deps = match object.get_mut("dependencies").and_then(Value::as_object_mut) {
            Some(deps) => deps,
            None => return false,
        };

        let mut changed = false;
        for (name, requirement) in dev {
            if !deps.contains_key(&name) {
                deps.insert(name, requirement);
                changed = true;
            }
        }

        changed
    }

    /// Serialize and write the manifest back to its path
    pub fn write(&self) -> Result<()> {
        let text = serde_json::to_string_pretty(&self.value).map_err(|e| {
            GinstallError::ManifestWriteFailed {
                path: self.path.display().to_string(),
                reason: e.to_string(),
            }
        })?;

        fs::write(&self.path, text).map_err(|e| GinstallError::ManifestWriteFailed {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Write exact text, used to restore originals byte-for-byte
    pub fn write_raw(path: &Path, text: &str) -> Result<()> {
        fs::write(path, text).map_err(|e| GinstallError::ManifestWriteFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }
}
