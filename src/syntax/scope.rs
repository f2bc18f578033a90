//! Enclosing scope lookup over parent links
//!
//! Decorators sit outside the definition node in the tree but belong to it:
//! a call inside `@deco(...)` above `def foo` is scoped to `foo`.

use super::tree::{AnnotatedTree, NodeId};

/// Node kinds that open a named scope
pub const SCOPE_KINDS: &[&str] = &["function_definition", "class_definition"];

/// Name of the nearest function or class definition enclosing `node`.
///
/// Returns `None` when the walk reaches the module root first. The node
/// itself is not considered, only its ancestors.
pub fn enclosing_scope<'src>(tree: &AnnotatedTree<'src>, node: NodeId) -> Option<&'src str> {
    let mut current = tree.parent(node);
    while let Some(id) = current {
        let kind = tree.kind(id);
        if SCOPE_KINDS.contains(&kind) {
            return tree.child_by_field(id, "name").map(|name| tree.text(name));
        }
        if kind == "decorated_definition" {
            let definition = tree.child_by_field(id, "definition")?;
            return tree.child_by_field(definition, "name").map(|name| tree.text(name));
        }
        current = tree.parent(id);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::SyntaxTree;

    fn scope_of_first_call(source: &str) -> Option<String> {
        let tree = SyntaxTree::parse(source).unwrap().annotate();
        let call = tree.ids().find(|id| tree.kind(*id) == "call").unwrap();
        enclosing_scope(&tree, call).map(str::to_string)
    }

    #[test]
    fn test_top_level_has_no_scope() {
        assert_eq!(scope_of_first_call("print('x')\n"), None);
    }

    #[test]
    fn test_nearest_scope_wins() {
        let source = r#"
class Outer:
    def method(self):
        run()
"#;
        assert_eq!(scope_of_first_call(source).as_deref(), Some("method"));
    }

    #[test]
    fn test_class_body_scope() {
        let source = r#"
class Outer:
    items = build()
"#;
        assert_eq!(scope_of_first_call(source).as_deref(), Some("Outer"));
    }

    #[test]
    fn test_nested_functions_and_decorators() {
        let source = r#"
@decorate
async def outer():
    def inner():
        if True:
            while flag:
                call_me()
"#;
        assert_eq!(scope_of_first_call(source).as_deref(), Some("inner"));
    }

    #[test]
    fn test_decorator_call_belongs_to_decorated_definition() {
        let source = r#"
class P:
    @cat.cmd()
    def foo(self):
        pass
"#;
        assert_eq!(scope_of_first_call(source).as_deref(), Some("foo"));

        let source = r#"
@register(make())
class Q:
    pass
"#;
        assert_eq!(scope_of_first_call(source).as_deref(), Some("Q"));
    }

    #[test]
    fn test_walk_terminates_on_deep_tree() {
        let depth = 60;
        let mut source = String::from("def top():\n");
        for level in 0..depth {
            source.push_str(&" ".repeat(level + 1));
            source.push_str("if x:\n");
        }
        source.push_str(&" ".repeat(depth + 1));
        source.push_str("deep()\n");

        let tree = SyntaxTree::parse(&source).unwrap().annotate();
        for id in tree.ids() {
            let _ = enclosing_scope(&tree, id);
        }
        let call = tree.ids().find(|id| tree.kind(*id) == "call").unwrap();
        assert_eq!(enclosing_scope(&tree, call), Some("top"));
    }
}
