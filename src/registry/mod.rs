//! Operator registry
//!
//! The registry maps an identifier to the type implementing it in two steps,
//! mirroring how the host exposes it: the registered command only names its
//! type, and the type is then looked up in the global type namespace.

pub mod discover;
pub mod memory;

pub use discover::discover_registry;
pub use memory::InMemoryRegistry;

use crate::identifier::Identifier;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Module name under which native operator types live
pub const BUILTIN_NAMESPACE: &str = "bpy.types";

/// Type descriptor exposed by a registered command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredCommand {
    pub type_name: String,
}

/// What reflection knows about an implementing type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeInfo {
    pub name: String,
    /// Defining module (`addon.ops`, or the builtin namespace)
    pub module: String,
    /// File of the defining module, when it has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<PathBuf>,
    /// 1-indexed definition line, when it can be read
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

/// Capability interface over a live operator registry
pub trait SymbolRegistry {
    /// Look a command up by category, then command
    fn lookup(&self, category: &str, command: &str) -> Option<RegisteredCommand>;

    /// Find a type in the global type namespace
    fn locate_type(&self, type_name: &str) -> Option<TypeInfo>;

    /// Every registered identifier, sorted
    fn identifiers(&self) -> Vec<Identifier>;

    /// Module name marking native, non-editable types
    fn builtin_namespace(&self) -> &str {
        BUILTIN_NAMESPACE
    }

    /// Lookup followed by type location
    fn resolve(&self, category: &str, command: &str) -> Option<TypeInfo> {
        let command = self.lookup(category, command)?;
        self.locate_type(&command.type_name)
    }
}
