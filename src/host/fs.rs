//! Package trees on disk
//!
//! Maps dotted module names onto a search path the way the import system
//! lays packages out:
//!
//! - `pkg/__init__.py` is the package `pkg`, its source is the `__init__`
//! - `pkg/mod.py` is the module `pkg.mod`
//! - a directory without `__init__.py` is a namespace package with no source

use super::{LoadedModule, ModuleHost};
use crate::ignore::IgnoreFilter;
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const INIT_FILE: &str = "__init__.py";

/// A [`ModuleHost`] over a directory of Python packages
pub struct FsPackageHost {
    search_path: PathBuf,
    filter: IgnoreFilter,
}

impl FsPackageHost {
    pub fn new(search_path: impl Into<PathBuf>, extra_excludes: Option<&[String]>) -> Self {
        let search_path = search_path.into();
        let filter = IgnoreFilter::new(&search_path, extra_excludes);
        Self {
            search_path,
            filter,
        }
    }

    fn module_dir(&self, name: &str) -> PathBuf {
        name.split('.')
            .fold(self.search_path.clone(), |path, segment| path.join(segment))
    }

    /// Module names directly inside `dir`, in file-name order
    fn children(&self, dir: &Path) -> Vec<String> {
        WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter_map(|entry| {
                let path = entry.path();
                let is_dir = entry.file_type().is_dir();
                if self.filter.is_ignored(path, is_dir) {
                    return None;
                }
                let name = if is_dir {
                    if !path.join(INIT_FILE).is_file() {
                        return None;
                    }
                    path.file_name()?.to_str()?
                } else {
                    if path.extension().and_then(|e| e.to_str()) != Some("py") {
                        return None;
                    }
                    let stem = path.file_stem()?.to_str()?;
                    if stem == "__init__" {
                        return None;
                    }
                    stem
                };
                is_module_name(name).then(|| name.to_string())
            })
            .collect()
    }

    fn read_source(path: &Path) -> Option<String> {
        match std::fs::read_to_string(path) {
            Ok(source) => Some(source),
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", path.display(), e);
                None
            }
        }
    }
}

fn is_module_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c == '_' || c.is_alphabetic())
        && chars.all(|c| c == '_' || c.is_alphanumeric())
}

impl ModuleHost for FsPackageHost {
    fn load(&self, name: &str) -> Result<LoadedModule> {
        if name.is_empty() || !name.split('.').all(is_module_name) {
            return Err(Error::ModuleNotFound(name.to_string()));
        }

        let dir = self.module_dir(name);
        let qualify = |child: String| format!("{}.{}", name, child);

        let init = dir.join(INIT_FILE);
        if init.is_file() {
            return Ok(LoadedModule {
                name: name.to_string(),
                source: Self::read_source(&init),
                file_path: Some(init),
                is_package: true,
                submodules: self.children(&dir).into_iter().map(qualify).collect(),
            });
        }

        let file = dir.with_extension("py");
        if file.is_file() {
            return Ok(LoadedModule {
                name: name.to_string(),
                source: Self::read_source(&file),
                file_path: Some(file),
                is_package: false,
                submodules: Vec::new(),
            });
        }

        if dir.is_dir() && !self.filter.is_ignored(&dir, true) {
            tracing::debug!("{} is a namespace package", name);
            return Ok(LoadedModule {
                name: name.to_string(),
                file_path: None,
                source: None,
                is_package: true,
                submodules: self.children(&dir).into_iter().map(qualify).collect(),
            });
        }

        Err(Error::ModuleNotFound(name.to_string()))
    }

    fn top_level(&self) -> Result<Vec<String>> {
        if !self.search_path.is_dir() {
            return Err(Error::Host(format!(
                "search path {} is not a directory",
                self.search_path.display()
            )));
        }
        Ok(self.children(&self.search_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_package_layout() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "addon/__init__.py", "from . import ops\n");
        write(root, "addon/ops.py", "def run(): pass\n");
        write(root, "addon/ui/__init__.py", "");
        write(root, "addon/ui/panel.py", "");
        write(root, "addon/data/readme.txt", "");
        write(root, "addon/__pycache__/ops.cpython-311.pyc", "");
        write(root, "addon/not-a-module.py", "");
        write(root, "single.py", "x = 1\n");

        let host = FsPackageHost::new(root, None);

        let addon = host.load("addon").unwrap();
        assert!(addon.is_package);
        assert_eq!(addon.file_path, Some(root.join("addon/__init__.py")));
        assert_eq!(addon.submodules, vec!["addon.ops", "addon.ui"]);

        let ops = host.load("addon.ops").unwrap();
        assert!(!ops.is_package);
        assert_eq!(ops.source.as_deref(), Some("def run(): pass\n"));

        let ui = host.load("addon.ui").unwrap();
        assert_eq!(ui.submodules, vec!["addon.ui.panel"]);

        assert!(matches!(host.load("addon.missing"), Err(Error::ModuleNotFound(_))));
        assert_eq!(host.top_level().unwrap(), vec!["addon", "single"]);
    }

    #[test]
    fn test_namespace_package() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "ns/inner.py", "");

        let host = FsPackageHost::new(dir.path(), None);
        let ns = host.load("ns").unwrap();
        assert!(ns.is_package);
        assert_eq!(ns.source, None);
        assert_eq!(ns.submodules, vec!["ns.inner"]);
    }

    #[test]
    fn test_user_excludes() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "addon/__init__.py", "");
        write(dir.path(), "addon/tests/__init__.py", "");
        write(dir.path(), "addon/core.py", "");

        let host = FsPackageHost::new(dir.path(), Some(&["tests/".to_string()]));
        assert_eq!(host.load("addon").unwrap().submodules, vec!["addon.core"]);
    }
}
