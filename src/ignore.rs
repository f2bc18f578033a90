use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::path::Path;

/// Gitignore-style filter for package directory listings
pub struct IgnoreFilter {
    inner: Gitignore,
}

impl IgnoreFilter {
    pub fn new(root: &Path, extra_excludes: Option<&[String]>) -> Self {
        let mut builder = GitignoreBuilder::new(root);

        // 1. Load from .gitignore and .ignore
        builder.add(root.join(".gitignore"));
        builder.add(root.join(".ignore"));

        // 2. Add defaults (global)
        let defaults = [
            // Environments and caches, never part of a package
            "__pycache__/", "venv/", ".venv/", "env/", ".tox/", ".mypy_cache/",
            ".pytest_cache/", "node_modules/", "egg-info/", "*.egg-info/",
            ".git/", ".vscode/", ".idea/",

            // Compiled artefacts and editor leftovers
            "*.pyc", "*.pyo", "*.pyd", "*.so", "*.dylib", "*.dll",
            "*.swp", "*~", ".#*",
        ];

        for pattern in defaults {
            // We ignore errors here as these correspond to static valid patterns
            builder.add_line(None, pattern).ok();
        }

        // 3. Add user config excludes
        if let Some(excludes) = extra_excludes {
            for pattern in excludes {
                builder.add_line(None, pattern).ok();
            }
        }

        Self {
            inner: builder.build().unwrap_or_else(|_| Gitignore::empty()),
        }
    }

    pub fn is_ignored(&self, path: &Path, is_dir: bool) -> bool {
        self.inner.matched(path, is_dir).is_ignore()
    }
}
