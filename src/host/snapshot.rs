//! In-memory module snapshot

use super::{LoadedModule, ModuleHost};
use crate::{Error, Result};
use std::collections::BTreeMap;

/// An immutable snapshot of loaded modules, keyed by dotted name.
///
/// Top-level names are those without a dot, in name order.
#[derive(Debug, Clone, Default)]
pub struct ModuleSnapshot {
    modules: BTreeMap<String, LoadedModule>,
}

impl ModuleSnapshot {
    pub fn new(modules: impl IntoIterator<Item = LoadedModule>) -> Self {
        Self {
            modules: modules.into_iter().map(|m| (m.name.clone(), m)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl FromIterator<LoadedModule> for ModuleSnapshot {
    fn from_iter<T: IntoIterator<Item = LoadedModule>>(iter: T) -> Self {
        Self::new(iter)
    }
}

impl ModuleHost for ModuleSnapshot {
    fn load(&self, name: &str) -> Result<LoadedModule> {
        self.modules
            .get(name)
            .cloned()
            .ok_or_else(|| Error::ModuleNotFound(name.to_string()))
    }

    fn top_level(&self) -> Result<Vec<String>> {
        Ok(self
            .modules
            .keys()
            .filter(|name| !name.contains('.'))
            .cloned()
            .collect())
    }
}
