//! # opscope - operator definition and call-site finder
//!
//! Given an operator identifier (`category.command`) opscope:
//! - resolves it through a registry to the type implementing it and
//!   classifies that type as addon-defined, native, or unresolvable
//! - scans a package's modules, without importing them, for every call
//!   expression invoking or referencing the identifier
//! - reports each call site with file, line, column and enclosing scope
//!
//! Python sources are parsed with tree-sitter into arena trees with upward
//! parent links; call sites are recognised by a small table of call shapes.

pub mod identifier;
pub mod syntax;
pub mod matcher;
pub mod host;
pub mod collector;
pub mod registry;
pub mod resolver;
pub mod report;
pub mod finder;
pub mod ignore;
pub mod config;
pub mod output;
pub mod ui;


// Re-exports for convenient access
pub use identifier::Identifier;
pub use matcher::{ArgShape, CallMatch, MatchPattern};
pub use host::{FsPackageHost, LoadedModule, ModuleHost, ModuleSnapshot};
pub use collector::{Collection, ModuleCollector, ModuleRecord};
pub use registry::{InMemoryRegistry, SymbolRegistry, TypeInfo};
pub use resolver::{DefinitionLocation, OriginKind, Resolution, UNKNOWN_LINE};
pub use report::{Diagnostic, Report};
pub use finder::{Finder, find_definition_and_calls};

/// Result type alias for opscope operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for opscope operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Not registered: {0}")]
    NotRegistered(String),

    #[error("Parse error: {0}")]
    ParseFailure(String),

    #[error("Reflection error: {0}")]
    ReflectionFailure(String),

    #[error("Module not found: {0}")]
    ModuleNotFound(String),

    #[error("Host error: {0}")]
    Host(String),

    #[error("Manifest error: {0}")]
    Manifest(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
