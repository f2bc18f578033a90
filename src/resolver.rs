//! Runtime symbol resolution
//!
//! Classifies where an identifier's implementation lives:
//!
//! 1. Not registered → unresolvable
//! 2. Registered, but its type cannot be located → unresolvable
//! 3. Type defined in the builtin namespace → native, no editable source
//! 4. Type without a source file (host main script) → unresolvable
//! 5. Otherwise → addon-defined, with the line when reflection can read it

use crate::Error;
use crate::identifier::Identifier;
use crate::registry::SymbolRegistry;
use crate::report::Diagnostic;
use serde::{Serialize, Serializer};
use std::path::PathBuf;

/// Line value reported when the definition line is unknown
pub const UNKNOWN_LINE: i64 = -1;

/// Where an identifier's implementation comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OriginKind {
    AddonDefined,
    NativeBuiltin,
    Unresolvable,
}

impl OriginKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OriginKind::AddonDefined => "addon",
            OriginKind::NativeBuiltin => "native",
            OriginKind::Unresolvable => "unresolvable",
        }
    }
}

impl std::fmt::Display for OriginKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Resolved definition of an identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DefinitionLocation {
    pub identifier: Identifier,
    pub type_name: Option<String>,
    pub module: Option<String>,
    pub file_path: Option<PathBuf>,
    #[serde(serialize_with = "serialize_line")]
    pub line: Option<u32>,
    pub origin_kind: OriginKind,
}

fn serialize_line<S: Serializer>(line: &Option<u32>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_i64(line.map_or(UNKNOWN_LINE, i64::from))
}

impl DefinitionLocation {
    fn unresolvable(identifier: &Identifier) -> Self {
        Self {
            identifier: identifier.clone(),
            type_name: None,
            module: None,
            file_path: None,
            line: None,
            origin_kind: OriginKind::Unresolvable,
        }
    }

    /// Definition line, or [`UNKNOWN_LINE`]
    pub fn line_number(&self) -> i64 {
        self.line.map_or(UNKNOWN_LINE, i64::from)
    }

    pub fn is_addon_defined(&self) -> bool {
        self.origin_kind == OriginKind::AddonDefined
    }
}

/// Outcome of resolving one identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub location: DefinitionLocation,
    /// Why the location is incomplete, if it is
    pub diagnostics: Vec<Diagnostic>,
}

/// Resolve an identifier through the registry and classify its origin
pub fn resolve(registry: &dyn SymbolRegistry, identifier: &Identifier) -> Resolution {
    let mut location = DefinitionLocation::unresolvable(identifier);

    let Some(command) = registry.lookup(&identifier.category, &identifier.command) else {
        tracing::warn!("{} is not registered", identifier);
        return Resolution {
            location,
            diagnostics: vec![Diagnostic::NotRegistered {
                identifier: identifier.clone(),
            }],
        };
    };
    location.type_name = Some(command.type_name.clone());

    let Some(info) = registry.locate_type(&command.type_name) else {
        tracing::warn!("{} names type {} which cannot be located", identifier, command.type_name);
        return Resolution {
            location,
            diagnostics: vec![Diagnostic::TypeNotFound {
                type_name: command.type_name,
            }],
        };
    };
    location.type_name = Some(info.name.clone());
    location.module = Some(info.module.clone());

    if info.module == registry.builtin_namespace() {
        tracing::debug!("{} is native ({})", identifier, info.name);
        location.origin_kind = OriginKind::NativeBuiltin;
        return Resolution {
            location,
            diagnostics: vec![Diagnostic::NativeBuiltin { type_name: info.name }],
        };
    }

    let Some(file_path) = info.file_path else {
        tracing::warn!("{} is defined in {} which has no source file", identifier, info.module);
        return Resolution {
            location,
            diagnostics: vec![Diagnostic::NoSourceFile {
                type_name: info.name,
                module: info.module,
            }],
        };
    };

    location.origin_kind = OriginKind::AddonDefined;
    location.file_path = Some(file_path);
    location.line = info.line;

    let mut diagnostics = Vec::new();
    if info.line.is_none() {
        tracing::warn!("Definition line of {} could not be read", info.name);
        diagnostics.push(Diagnostic::UnknownLine { type_name: info.name });
    }

    Resolution {
        location,
        diagnostics,
    }
}

/// Editable definition of an identifier, or why there is none.
///
/// An unknown line is not an error; the location is still returned.
pub fn definition(
    registry: &dyn SymbolRegistry,
    identifier: &Identifier,
) -> crate::Result<DefinitionLocation> {
    let Resolution {
        location,
        diagnostics,
    } = resolve(registry, identifier);
    if location.is_addon_defined() {
        return Ok(location);
    }

    match diagnostics.into_iter().next() {
        Some(Diagnostic::NotRegistered { identifier }) => {
            Err(Error::NotRegistered(identifier.to_string()))
        }
        Some(diagnostic) => Err(Error::ReflectionFailure(diagnostic.to_string())),
        None => Err(Error::ReflectionFailure(format!(
            "{} has no inspectable implementation",
            identifier
        ))),
    }
}
