//! In-memory registry and its manifest format
//!
//! A host can dump its live registry to a manifest that loads straight into
//! an [`InMemoryRegistry`]:
//!
//! ```toml
//! builtin_namespace = "bpy.types"
//!
//! [commands.text]
//! edit_operator = "TEXT_OT_edit_operator"
//!
//! [types.TEXT_OT_edit_operator]
//! module = "dev_tools.edit_operator"
//! file_path = "/addons/dev_tools/edit_operator.py"
//! line = 233
//! ```

use super::{BUILTIN_NAMESPACE, RegisteredCommand, SymbolRegistry, TypeInfo};
use crate::identifier::Identifier;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct TypeEntry {
    module: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    file_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    line: Option<u32>,
}

/// Registry held entirely in memory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InMemoryRegistry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    builtin_namespace: Option<String>,
    /// category → command → type name
    #[serde(default)]
    commands: BTreeMap<String, BTreeMap<String, String>>,
    #[serde(default)]
    types: BTreeMap<String, TypeEntry>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the builtin namespace
    pub fn with_builtin_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.builtin_namespace = Some(namespace.into());
        self
    }

    /// Register an identifier against a type name
    pub fn register(&mut self, identifier: &Identifier, type_name: impl Into<String>) {
        self.commands
            .entry(identifier.category.clone())
            .or_default()
            .insert(identifier.command.clone(), type_name.into());
    }

    /// Add a type to the global type namespace
    pub fn define_type(&mut self, info: TypeInfo) {
        self.types.insert(
            info.name,
            TypeEntry {
                module: info.module,
                file_path: info.file_path,
                line: info.line,
            },
        );
    }

    /// Register a native command whose type lives in the builtin namespace
    pub fn register_builtin(&mut self, identifier: &Identifier) {
        let type_name = format!(
            "{}_OT_{}",
            identifier.category.to_uppercase(),
            identifier.command
        );
        let module = self.builtin_namespace().to_string();
        self.register(identifier, type_name.clone());
        self.define_type(TypeInfo {
            name: type_name,
            module,
            file_path: None,
            line: None,
        });
    }

    /// Number of registered commands
    pub fn len(&self) -> usize {
        self.commands.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decode a TOML manifest
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Manifest(e.to_string()))
    }

    /// Decode a JSON manifest
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::Manifest(e.to_string()))
    }

    /// Load a manifest file, JSON by `.json` extension, TOML otherwise
    pub fn load_manifest(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let registry = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&text)?,
            _ => Self::from_toml_str(&text)?,
        };
        tracing::debug!(
            "Loaded {} registered commands from {}",
            registry.len(),
            path.display()
        );
        Ok(registry)
    }
}

impl SymbolRegistry for InMemoryRegistry {
    fn lookup(&self, category: &str, command: &str) -> Option<RegisteredCommand> {
        self.commands
            .get(category)?
            .get(command)
            .map(|type_name| RegisteredCommand {
                type_name: type_name.clone(),
            })
    }

    fn locate_type(&self, type_name: &str) -> Option<TypeInfo> {
        self.types.get(type_name).map(|entry| TypeInfo {
            name: type_name.to_string(),
            module: entry.module.clone(),
            file_path: entry.file_path.clone(),
            line: entry.line,
        })
    }

    fn identifiers(&self) -> Vec<Identifier> {
        // Both maps are ordered, so the listing comes out sorted
        self.commands
            .iter()
            .flat_map(|(category, commands)| {
                commands
                    .keys()
                    .filter_map(move |command| Identifier::new(category, command).ok())
            })
            .collect()
    }

    fn builtin_namespace(&self) -> &str {
        self.builtin_namespace.as_deref().unwrap_or(BUILTIN_NAMESPACE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"
builtin_namespace = "host.types"

[commands.text]
edit_operator = "TEXT_OT_edit_operator"
jump = "TEXT_OT_jump"

[commands.mesh]
primitive_cube_add = "MESH_OT_primitive_cube_add"

[types.TEXT_OT_edit_operator]
module = "dev_tools.edit_operator"
file_path = "/addons/dev_tools/edit_operator.py"
line = 233

[types.TEXT_OT_jump]
module = "host.types"
"#;

    #[test]
    fn test_toml_manifest() {
        let registry = InMemoryRegistry::from_toml_str(MANIFEST).unwrap();
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.builtin_namespace(), "host.types");

        let info = registry.resolve("text", "edit_operator").unwrap();
        assert_eq!(info.module, "dev_tools.edit_operator");
        assert_eq!(info.line, Some(233));

        // Registered but the type is not in the type table
        assert!(registry.lookup("mesh", "primitive_cube_add").is_some());
        assert!(registry.resolve("mesh", "primitive_cube_add").is_none());

        assert!(registry.lookup("text", "missing").is_none());
        assert!(registry.lookup("missing", "edit_operator").is_none());
    }

    #[test]
    fn test_json_manifest() {
        let json = r#"{
            "commands": {"cat": {"cmd": "CAT_OT_cmd"}},
            "types": {"CAT_OT_cmd": {"module": "addon", "file_path": "addon/__init__.py", "line": 3}}
        }"#;
        let registry = InMemoryRegistry::from_json_str(json).unwrap();
        assert_eq!(registry.builtin_namespace(), BUILTIN_NAMESPACE);
        assert_eq!(registry.resolve("cat", "cmd").unwrap().line, Some(3));
    }

    #[test]
    fn test_bad_manifest() {
        assert!(matches!(
            InMemoryRegistry::from_toml_str("commands = 3"),
            Err(Error::Manifest(_))
        ));
    }

    #[test]
    fn test_identifiers_sorted() {
        let registry = InMemoryRegistry::from_toml_str(MANIFEST).unwrap();
        let names: Vec<String> = registry.identifiers().iter().map(|i| i.to_string()).collect();
        assert_eq!(
            names,
            vec!["mesh.primitive_cube_add", "text.edit_operator", "text.jump"]
        );
    }

    #[test]
    fn test_register_builtin() {
        let mut registry = InMemoryRegistry::new();
        let id = Identifier::parse("mesh.primitive_cube_add").unwrap();
        registry.register_builtin(&id);

        let info = registry.resolve("mesh", "primitive_cube_add").unwrap();
        assert_eq!(info.name, "MESH_OT_primitive_cube_add");
        assert_eq!(info.module, BUILTIN_NAMESPACE);
        assert_eq!(info.file_path, None);
    }
}
