//! Host module introspection
//!
//! The collector never reads the filesystem or imports anything itself. It
//! asks a [`ModuleHost`] for modules that are already resident, by dotted
//! name, and follows each package's own submodule listing.

pub mod fs;
pub mod snapshot;

pub use fs::FsPackageHost;
pub use snapshot::ModuleSnapshot;

use crate::Result;
use std::path::PathBuf;

/// A module as the host sees it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedModule {
    /// Dotted module name (`addon.ops.mesh`)
    pub name: String,
    /// File the module was loaded from, if any
    pub file_path: Option<PathBuf>,
    /// Source text; `None` for native modules
    pub source: Option<String>,
    pub is_package: bool,
    /// Fully qualified names of the package's declared submodules, in order
    pub submodules: Vec<String>,
}

impl LoadedModule {
    /// A plain source module
    pub fn source(
        name: impl Into<String>,
        file_path: impl Into<PathBuf>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            file_path: Some(file_path.into()),
            source: Some(source.into()),
            is_package: false,
            submodules: Vec::new(),
        }
    }

    /// Mark as a package declaring the given submodules
    pub fn with_submodules<I, S>(mut self, submodules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.is_package = true;
        self.submodules = submodules.into_iter().map(Into::into).collect();
        self
    }

    /// A module without source text (native or compiled)
    pub fn native(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            file_path: None,
            source: None,
            is_package: false,
            submodules: Vec::new(),
        }
    }
}

/// Read access to the host's loaded-module state
pub trait ModuleHost {
    /// Load a module by dotted name
    fn load(&self, name: &str) -> Result<LoadedModule>;

    /// Top-level packages visible to the host, used when no roots are given
    fn top_level(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}
