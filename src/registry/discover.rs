//! Registry discovery from source
//!
//! Without a live host to ask, the registry can be rebuilt statically: an
//! operator class declares its identifier as a `bl_idname` class attribute,
//!
//! ```python
//! class TEXT_OT_edit_operator(Operator):
//!     bl_idname = "text.edit_operator"
//! ```
//!
//! and every such class found in the collected modules is registered with its
//! defining module, file and line.

use super::{InMemoryRegistry, TypeInfo};
use crate::collector::ModuleRecord;
use crate::identifier::Identifier;
use crate::matcher::string_value;
use crate::syntax::{AnnotatedTree, NodeId, SyntaxTree};

/// Class attribute holding an operator's identifier
pub const IDNAME_ATTRIBUTE: &str = "bl_idname";

/// Build a registry from operator classes in `modules`, plus native builtins.
///
/// Types are keyed by `module.ClassName`. Modules without source or with
/// syntax errors contribute nothing.
pub fn discover_registry(modules: &[ModuleRecord], builtins: &[Identifier]) -> InMemoryRegistry {
    let mut registry = InMemoryRegistry::new();

    for identifier in builtins {
        registry.register_builtin(identifier);
    }

    for module in modules {
        let Some(source) = module.source_text.as_deref() else {
            continue;
        };
        let tree = match SyntaxTree::parse(source) {
            Ok(tree) => tree.annotate(),
            Err(e) => {
                tracing::debug!("Discovery skipped {}: {}", module.name, e);
                continue;
            }
        };

        for class in tree.ids().filter(|id| tree.kind(*id) == "class_definition") {
            let Some(identifier) = class_idname(&tree, class) else {
                continue;
            };
            let Some(name) = tree.child_by_field(class, "name").map(|n| tree.text(n)) else {
                continue;
            };

            // A decorated class starts at its first decorator
            let start = match tree.parent(class) {
                Some(parent) if tree.kind(parent) == "decorated_definition" => parent,
                _ => class,
            };

            let type_name = format!("{}.{}", module.name, name);
            tracing::debug!("Discovered {} -> {}", identifier, type_name);
            registry.register(&identifier, type_name.clone());
            registry.define_type(TypeInfo {
                name: type_name,
                module: module.name.clone(),
                file_path: module.file_path.clone(),
                line: Some(tree.node(start).position.line),
            });
        }
    }

    registry
}

/// Identifier assigned to `bl_idname` directly in the class body
fn class_idname(tree: &AnnotatedTree<'_>, class: NodeId) -> Option<Identifier> {
    let body = tree.child_by_field(class, "body")?;
    tree.named_children(body)
        .filter(|stmt| tree.kind(*stmt) == "expression_statement")
        .filter_map(|stmt| tree.named_children(stmt).next())
        .filter(|expr| tree.kind(*expr) == "assignment")
        .find_map(|assignment| {
            let left = tree.child_by_field(assignment, "left")?;
            if tree.kind(left) != "identifier" || tree.text(left) != IDNAME_ATTRIBUTE {
                return None;
            }
            let right = tree.child_by_field(assignment, "right")?;
            Identifier::parse(&string_value(tree, right)?).ok()
        })
}
