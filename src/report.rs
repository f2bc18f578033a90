//! Report assembly
//!
//! Merges the resolved definition and the per-module scan results into one
//! ordered [`Report`]. Anything that kept the report from being complete is
//! recorded as a [`Diagnostic`] instead of failing the request.

use crate::collector::Collection;
use crate::identifier::Identifier;
use crate::matcher::CallMatch;
use crate::resolver::{DefinitionLocation, OriginKind, Resolution};
use serde::Serialize;
use std::fmt;

/// Explanation attached to an incomplete or partial report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    NotRegistered { identifier: Identifier },
    TypeNotFound { type_name: String },
    NativeBuiltin { type_name: String },
    NoSourceFile { type_name: String, module: String },
    UnknownLine { type_name: String },
    ModuleSkipped { module: String, reason: String },
    CollectionFailed { module: String, reason: String },
    NothingScanned,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::NotRegistered { identifier } => {
                write!(f, "{} is not registered; scanned for its literal name only", identifier)
            }
            Diagnostic::TypeNotFound { type_name } => {
                write!(f, "implementing type {} could not be located", type_name)
            }
            Diagnostic::NativeBuiltin { type_name } => {
                write!(f, "{} is a native operator without editable source", type_name)
            }
            Diagnostic::NoSourceFile { type_name, module } => {
                write!(f, "{} is defined in {} which has no source file", type_name, module)
            }
            Diagnostic::UnknownLine { type_name } => {
                write!(f, "definition line of {} could not be read", type_name)
            }
            Diagnostic::ModuleSkipped { module, reason } => {
                write!(f, "skipped {}: {}", module, reason)
            }
            Diagnostic::CollectionFailed { module, reason } => {
                write!(f, "could not load {}: {}", module, reason)
            }
            Diagnostic::NothingScanned => write!(f, "no module could be scanned"),
        }
    }
}

/// Result of scanning a single module
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleScan {
    /// Matches in ascending source position
    Scanned { module: String, matches: Vec<CallMatch> },
    /// Source missing or unparsable
    Skipped { module: String, reason: String },
}

/// Definition and call sites of one identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub identifier: Identifier,
    pub origin_kind: OriginKind,
    /// Present only for addon-defined identifiers
    pub definition: Option<DefinitionLocation>,
    /// Module collection order, then ascending position
    pub matches: Vec<CallMatch>,
    pub modules_scanned: usize,
    pub modules_skipped: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl Report {
    /// Merge a resolution and module scans, given in collection order
    pub fn assemble(
        identifier: &Identifier,
        resolution: Resolution,
        collection: &Collection,
        scans: Vec<ModuleScan>,
    ) -> Self {
        let Resolution {
            location,
            mut diagnostics,
        } = resolution;
        let origin_kind = location.origin_kind;
        let definition = location.is_addon_defined().then_some(location);

        diagnostics.extend(collection.failures.iter().map(|failure| {
            Diagnostic::CollectionFailed {
                module: failure.module.clone(),
                reason: failure.reason.clone(),
            }
        }));

        let mut matches = Vec::new();
        let mut modules_scanned = 0;
        let mut modules_skipped = 0;
        for scan in scans {
            match scan {
                ModuleScan::Scanned {
                    matches: found, ..
                } => {
                    modules_scanned += 1;
                    matches.extend(found);
                }
                ModuleScan::Skipped { module, reason } => {
                    modules_skipped += 1;
                    diagnostics.push(Diagnostic::ModuleSkipped { module, reason });
                }
            }
        }

        if modules_scanned == 0 {
            diagnostics.push(Diagnostic::NothingScanned);
        }

        Self {
            identifier: identifier.clone(),
            origin_kind,
            definition,
            matches,
            modules_scanned,
            modules_skipped,
            diagnostics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::CollectFailure;
    use crate::matcher::MatchPattern;
    use std::path::PathBuf;

    fn id() -> Identifier {
        Identifier::parse("cat.cmd").unwrap()
    }

    fn call(module: &str, line: u32) -> CallMatch {
        CallMatch {
            identifier: id(),
            enclosing_scope: None,
            module: module.to_string(),
            file_path: PathBuf::from(format!("{}.py", module)),
            line,
            column: 0,
            pattern_kind: MatchPattern::AttributeCall,
        }
    }

    fn location(origin_kind: OriginKind) -> DefinitionLocation {
        DefinitionLocation {
            identifier: id(),
            type_name: Some("CAT_OT_cmd".to_string()),
            module: Some("addon".to_string()),
            file_path: Some(PathBuf::from("addon.py")),
            line: Some(7),
            origin_kind,
        }
    }

    #[test]
    fn test_definition_heads_only_addon_defined() {
        let collection = Collection::default();
        let addon = Resolution {
            location: location(OriginKind::AddonDefined),
            diagnostics: vec![],
        };
        let report = Report::assemble(&id(), addon, &collection, vec![]);
        assert_eq!(report.definition.as_ref().and_then(|d| d.line), Some(7));

        let native = Resolution {
            location: location(OriginKind::NativeBuiltin),
            diagnostics: vec![Diagnostic::NativeBuiltin {
                type_name: "CAT_OT_cmd".to_string(),
            }],
        };
        let report = Report::assemble(&id(), native, &collection, vec![]);
        assert!(report.definition.is_none());
        assert_eq!(report.origin_kind, OriginKind::NativeBuiltin);
        assert!(matches!(report.diagnostics[0], Diagnostic::NativeBuiltin { .. }));
    }

    #[test]
    fn test_matches_keep_module_order_and_count_skips() {
        let collection = Collection {
            modules: vec![],
            failures: vec![CollectFailure {
                module: "addon.gone".to_string(),
                reason: "Module not found: addon.gone".to_string(),
            }],
        };
        let scans = vec![
            ModuleScan::Scanned {
                module: "b".to_string(),
                matches: vec![call("b", 1), call("b", 9)],
            },
            ModuleScan::Skipped {
                module: "broken".to_string(),
                reason: "invalid syntax".to_string(),
            },
            ModuleScan::Scanned {
                module: "a".to_string(),
                matches: vec![call("a", 3)],
            },
        ];
        let resolution = Resolution {
            location: location(OriginKind::AddonDefined),
            diagnostics: vec![],
        };
        let report = Report::assemble(&id(), resolution, &collection, scans);

        let order: Vec<(&str, u32)> = report
            .matches
            .iter()
            .map(|m| (m.module.as_str(), m.line))
            .collect();
        assert_eq!(order, vec![("b", 1), ("b", 9), ("a", 3)]);
        assert_eq!(report.modules_scanned, 2);
        assert_eq!(report.modules_skipped, 1);
        assert!(matches!(report.diagnostics[0], Diagnostic::CollectionFailed { .. }));
        assert!(matches!(report.diagnostics[1], Diagnostic::ModuleSkipped { .. }));
    }

    #[test]
    fn test_nothing_scanned() {
        let resolution = Resolution {
            location: location(OriginKind::AddonDefined),
            diagnostics: vec![],
        };
        let report = Report::assemble(&id(), resolution, &Collection::default(), vec![]);
        assert_eq!(report.diagnostics, vec![Diagnostic::NothingScanned]);
        assert!(report.definition.is_some());
    }

    #[test]
    fn test_diagnostic_display() {
        let diagnostic = Diagnostic::NotRegistered { identifier: id() };
        assert_eq!(
            diagnostic.to_string(),
            "cat.cmd is not registered; scanned for its literal name only"
        );
    }
}
