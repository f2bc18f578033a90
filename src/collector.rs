//! Module universe collection
//!
//! Depth-first walk over the submodules each package declares, starting from
//! one or more roots. A module is recorded once even when several roots or
//! packages reach it. Modules the host fails to load are skipped and logged;
//! the walk itself never fails.

use crate::host::ModuleHost;
use serde::Serialize;
use std::collections::HashSet;
use std::path::PathBuf;

/// A module selected for scanning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRecord {
    pub name: String,
    pub file_path: Option<PathBuf>,
    /// `None` when the host has no source (native module)
    pub source_text: Option<String>,
    pub is_package: bool,
}

/// A module the host could not load
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectFailure {
    pub module: String,
    pub reason: String,
}

/// Result of one collector run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collection {
    /// Modules in visit order
    pub modules: Vec<ModuleRecord>,
    pub failures: Vec<CollectFailure>,
}

/// Enumerates modules reachable from root packages
pub struct ModuleCollector<'h> {
    host: &'h dyn ModuleHost,
    exclude: Vec<String>,
}

impl<'h> ModuleCollector<'h> {
    pub fn new(host: &'h dyn ModuleHost) -> Self {
        Self {
            host,
            exclude: Vec::new(),
        }
    }

    /// Skip modules named by these dotted prefixes, with their subtrees
    pub fn with_exclude(mut self, prefixes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.exclude = prefixes.into_iter().map(Into::into).collect();
        self
    }

    fn is_excluded(&self, name: &str) -> bool {
        self.exclude.iter().any(|prefix| {
            name == prefix
                || name
                    .strip_prefix(prefix.as_str())
                    .is_some_and(|rest| rest.starts_with('.'))
        })
    }

    /// Walk every root in order, pre-order within each package
    pub fn enumerate<S: AsRef<str>>(&self, roots: &[S]) -> Collection {
        let mut collection = Collection::default();
        let mut visited: HashSet<String> = HashSet::new();

        for root in roots {
            let mut stack = vec![root.as_ref().to_string()];

            while let Some(name) = stack.pop() {
                if self.is_excluded(&name) {
                    tracing::debug!("Excluding module {}", name);
                    continue;
                }
                if !visited.insert(name.clone()) {
                    continue;
                }

                match self.host.load(&name) {
                    Ok(module) => {
                        tracing::debug!(
                            "Collected {} ({} submodules)",
                            name,
                            module.submodules.len()
                        );
                        // Reverse so the first declared submodule is visited next
                        stack.extend(module.submodules.iter().rev().cloned());
                        collection.modules.push(ModuleRecord {
                            name: module.name,
                            file_path: module.file_path,
                            source_text: module.source,
                            is_package: module.is_package,
                        });
                    }
                    Err(e) => {
                        tracing::warn!("Skipping module {}: {}", name, e);
                        collection.failures.push(CollectFailure {
                            module: name,
                            reason: e.to_string(),
                        });
                    }
                }
            }
        }

        collection
    }

    /// Walk `roots`, or every top-level module of the host when none are given
    pub fn enumerate_from(&self, roots: &[String]) -> Collection {
        if !roots.is_empty() {
            return self.enumerate(roots);
        }

        match self.host.top_level() {
            Ok(top_level) => self.enumerate(top_level.as_slice()),
            Err(e) => {
                tracing::warn!("Failed to list top-level modules: {}", e);
                Collection {
                    modules: Vec::new(),
                    failures: vec![CollectFailure {
                        module: "*".to_string(),
                        reason: e.to_string(),
                    }],
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{LoadedModule, ModuleSnapshot};

    fn names(collection: &Collection) -> Vec<&str> {
        collection.modules.iter().map(|m| m.name.as_str()).collect()
    }

    fn sample() -> ModuleSnapshot {
        ModuleSnapshot::new([
            LoadedModule::source("addon", "addon/__init__.py", "")
                .with_submodules(["addon.ops", "addon.ui"]),
            LoadedModule::source("addon.ops", "addon/ops/__init__.py", "")
                .with_submodules(["addon.ops.mesh", "addon.ops.text"]),
            LoadedModule::source("addon.ops.mesh", "addon/ops/mesh.py", ""),
            LoadedModule::source("addon.ops.text", "addon/ops/text.py", ""),
            LoadedModule::source("addon.ui", "addon/ui.py", ""),
            LoadedModule::source("other", "other/__init__.py", "")
                .with_submodules(["other.util", "addon.ops"]),
            LoadedModule::source("other.util", "other/util.py", ""),
        ])
    }

    #[test]
    fn test_depth_first_preorder() {
        let snapshot = sample();
        let collection = ModuleCollector::new(&snapshot).enumerate(&["addon"]);
        assert_eq!(
            names(&collection),
            vec!["addon", "addon.ops", "addon.ops.mesh", "addon.ops.text", "addon.ui"]
        );
        assert!(collection.failures.is_empty());
    }

    #[test]
    fn test_each_module_visited_once_across_roots() {
        let snapshot = sample();
        let collection = ModuleCollector::new(&snapshot).enumerate(&["addon", "other", "addon"]);
        assert_eq!(
            names(&collection),
            vec![
                "addon",
                "addon.ops",
                "addon.ops.mesh",
                "addon.ops.text",
                "addon.ui",
                "other",
                "other.util"
            ]
        );
    }

    #[test]
    fn test_failures_are_skipped() {
        let snapshot = ModuleSnapshot::new([
            LoadedModule::source("addon", "addon/__init__.py", "")
                .with_submodules(["addon.broken", "addon.ok"]),
            LoadedModule::source("addon.ok", "addon/ok.py", ""),
        ]);
        let collection = ModuleCollector::new(&snapshot).enumerate(&["addon", "missing_root"]);

        assert_eq!(names(&collection), vec!["addon", "addon.ok"]);
        let failed: Vec<&str> = collection.failures.iter().map(|f| f.module.as_str()).collect();
        assert_eq!(failed, vec!["addon.broken", "missing_root"]);
    }

    #[test]
    fn test_enumerate_from_defaults_to_top_level() {
        let snapshot = sample();
        let collection = ModuleCollector::new(&snapshot).enumerate_from(&[]);
        assert_eq!(collection.modules.len(), 7);
        assert_eq!(collection.modules[0].name, "addon");

        let collection = ModuleCollector::new(&snapshot).enumerate_from(&["other".to_string()]);
        assert_eq!(collection.modules.len(), 5);
    }

    #[test]
    fn test_exclude_prefixes() {
        let snapshot = sample();
        let collection = ModuleCollector::new(&snapshot)
            .with_exclude(["addon.ops"])
            .enumerate(&["addon"]);
        assert_eq!(names(&collection), vec!["addon", "addon.ui"]);

        // Prefixes match whole segments only
        let collection = ModuleCollector::new(&snapshot)
            .with_exclude(["addon.op"])
            .enumerate(&["addon"]);
        assert_eq!(collection.modules.len(), 5);
    }
}
