//! Bundle registry: loaded bundles by id, compiled once per version.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::bundle::Bundle;
use crate::defaults::{default_bundles, DEFAULT_BUNDLE_ID};
use crate::error::{BundleError, Result};
use crate::matcher::CompiledBundle;

/// Loaded bundles.
///
/// Each `(id, version)` pair is compiled at most once; loading a newer
/// version of an id replaces what lookups by that id return.
#[derive(Debug)]
pub struct BundleRegistry {
    /// Current bundle for each id.
    active: HashMap<String, Arc<CompiledBundle>>,

    /// Every compiled version, for cache hits on reload.
    compiled: HashMap<(String, String), Arc<CompiledBundle>>,

    /// Ids in first-load order, for listing.
    order: Vec<String>,

    default_id: String,
}

impl BundleRegistry {
    /// An empty registry whose default id is [`DEFAULT_BUNDLE_ID`].
    pub fn empty() -> Self {
        Self {
            active: HashMap::new(),
            compiled: HashMap::new(),
            order: Vec::new(),
            default_id: DEFAULT_BUNDLE_ID.to_string(),
        }
    }

    /// A registry with the built-in bundles loaded.
    pub fn with_defaults() -> Result<Self> {
        let mut registry = Self::empty();
        for bundle in default_bundles() {
            registry.load(bundle)?;
        }
        Ok(registry)
    }

    /// Validate, compile, and register a bundle.
    pub fn load(&mut self, bundle: Bundle) -> Result<Arc<CompiledBundle>> {
        let key = (bundle.id.clone(), bundle.version.clone());

        let compiled = match self.compiled.get(&key) {
            Some(existing) => {
                debug!(bundle_id = %key.0, version = %key.1, "bundle already compiled");
                Arc::clone(existing)
            }
            None => {
                let compiled = Arc::new(CompiledBundle::compile(bundle)?);
                self.compiled.insert(key.clone(), Arc::clone(&compiled));
                info!(bundle_id = %key.0, version = %key.1, "loaded bundle");
                compiled
            }
        };

        if !self.active.contains_key(&key.0) {
            self.order.push(key.0.clone());
        }
        self.active.insert(key.0, Arc::clone(&compiled));
        Ok(compiled)
    }

    /// Parse and load a JSON bundle document.
    pub fn load_json(&mut self, json: &str) -> Result<Arc<CompiledBundle>> {
        self.load(Bundle::from_json(json)?)
    }

    /// Load a JSON bundle document from disk.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<Arc<CompiledBundle>> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| BundleError::Config(format!("cannot read {}: {e}", path.display())))?;
        self.load_json(&json)
    }

    /// Look up the current bundle for an id.
    pub fn get(&self, id: &str) -> Result<Arc<CompiledBundle>> {
        self.active
            .get(id)
            .cloned()
            .ok_or_else(|| BundleError::UnknownBundle(id.to_string()))
    }

    /// The default bundle, or the first loaded one if the default id is not
    /// registered.
    pub fn default_bundle(&self) -> Result<Arc<CompiledBundle>> {
        self.get(&self.default_id).or_else(|err| {
            self.order
                .first()
                .and_then(|id| self.active.get(id))
                .cloned()
                .ok_or(err)
        })
    }

    /// Resolve an optional id, falling back to the default bundle.
    pub fn resolve(&self, id: Option<&str>) -> Result<Arc<CompiledBundle>> {
        match id {
            Some(id) => self.get(id),
            None => self.default_bundle(),
        }
    }

    /// Change the default bundle. The id must be loaded.
    pub fn set_default(&mut self, id: &str) -> Result<()> {
        if !self.active.contains_key(id) {
            return Err(BundleError::UnknownBundle(id.to_string()));
        }
        self.default_id = id.to_string();
        Ok(())
    }

    pub fn default_id(&self) -> &str {
        &self.default_id
    }

    /// Current bundles in load order.
    pub fn all(&self) -> Vec<Arc<CompiledBundle>> {
        self.order
            .iter()
            .filter_map(|id| self.active.get(id).cloned())
            .collect()
    }
}

impl Default for BundleRegistry {
    fn default() -> Self {
        Self::empty()
    }
}
