//! Definition and call-site finder
//!
//! Wires the pipeline together: resolve the identifier, collect the module
//! universe, then parse, annotate and match every module on its own before
//! merging everything into a [`Report`].

use crate::collector::{Collection, ModuleCollector, ModuleRecord};
use crate::host::ModuleHost;
use crate::identifier::Identifier;
use crate::matcher;
use crate::registry::SymbolRegistry;
use crate::report::{ModuleScan, Report};
use crate::resolver;
use crate::syntax::SyntaxTree;

/// Resolves identifiers against a registry and scans a host's modules
pub struct Finder<'a> {
    registry: &'a dyn SymbolRegistry,
    host: &'a dyn ModuleHost,
    roots: Vec<String>,
    exclude: Vec<String>,
}

impl<'a> Finder<'a> {
    /// Create a finder scanning every top-level package of the host
    pub fn new(registry: &'a dyn SymbolRegistry, host: &'a dyn ModuleHost) -> Self {
        Self {
            registry,
            host,
            roots: Vec::new(),
            exclude: Vec::new(),
        }
    }

    /// Restrict the scan to these root packages, in order
    pub fn with_roots(mut self, roots: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.roots = roots.into_iter().map(Into::into).collect();
        self
    }

    /// Skip modules under these dotted prefixes
    pub fn with_exclude(mut self, prefixes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.exclude = prefixes.into_iter().map(Into::into).collect();
        self
    }

    /// Enumerate the module universe for this finder's roots
    pub fn collect(&self) -> Collection {
        ModuleCollector::new(self.host)
            .with_exclude(self.exclude.iter().cloned())
            .enumerate_from(&self.roots)
    }

    /// Parse, annotate and match one module.
    ///
    /// Independent of every other module, so a scan can stop at any module
    /// boundary with consistent partial results.
    pub fn scan_module(&self, module: &ModuleRecord, identifier: &Identifier) -> ModuleScan {
        let skipped = |reason: String| ModuleScan::Skipped {
            module: module.name.clone(),
            reason,
        };

        // Native modules and namespace packages are expected to lack source
        let (Some(source), Some(file_path)) =
            (module.source_text.as_deref(), module.file_path.as_deref())
        else {
            tracing::debug!("Skipping {}: no source", module.name);
            return skipped("source unavailable".to_string());
        };

        let tree = match SyntaxTree::parse(source) {
            Ok(tree) => tree.annotate(),
            Err(e) => {
                tracing::warn!("Skipping {}: {}", module.name, e);
                return skipped(e.to_string());
            }
        };

        let matches = matcher::find_calls(&tree, identifier, &module.name, file_path);
        tracing::debug!(
            "{}: {} nodes, {} matches",
            module.name,
            tree.len(),
            matches.len()
        );
        ModuleScan::Scanned {
            module: module.name.clone(),
            matches,
        }
    }

    /// Resolve `identifier` and find every call site referencing it.
    ///
    /// The scan runs whatever the resolution outcome; an unregistered
    /// identifier is searched for by its literal text.
    pub fn find_definition_and_calls(&self, identifier: &Identifier) -> Report {
        let collection = self.collect();
        self.find_in(identifier, &collection)
    }

    /// Same as [`Finder::find_definition_and_calls`] over an already
    /// collected module universe
    pub fn find_in(&self, identifier: &Identifier, collection: &Collection) -> Report {
        let resolution = resolver::resolve(self.registry, identifier);
        tracing::info!(
            "Scanning {} modules for {}",
            collection.modules.len(),
            identifier
        );

        let scans = collection
            .modules
            .iter()
            .map(|module| self.scan_module(module, identifier))
            .collect();

        Report::assemble(identifier, resolution, collection, scans)
    }
}

/// One-shot form of [`Finder::find_definition_and_calls`]
pub fn find_definition_and_calls<S: AsRef<str>>(
    registry: &dyn SymbolRegistry,
    host: &dyn ModuleHost,
    roots: &[S],
    identifier: &Identifier,
) -> Report {
    Finder::new(registry, host)
        .with_roots(roots.iter().map(|r| r.as_ref().to_string()))
        .find_definition_and_calls(identifier)
}
