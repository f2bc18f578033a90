//! Call-site matching
//!
//! Every `call` node of an annotated tree is run through a table of rules.
//! Each rule recognises one call shape:
//!
//! - attribute calls whose dotted callee ends in `category.command`
//!   (`bpy.ops.mesh.primitive_cube_add()`, `ops.mesh.primitive_cube_add()`)
//! - builder calls `<expr>.operator(<arg>, ...)` whose first positional
//!   argument renders to the identifier text (`layout.operator("mesh.primitive_cube_add")`)
//!
//! Matching is syntactic only. Aliased imports are not followed, and an
//! unrelated chain sharing the trailing two segments, or an unrelated string
//! equal to the identifier, is reported as well.

use crate::identifier::Identifier;
use crate::syntax::{AnnotatedTree, NodeId, enclosing_scope};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Attribute name of the builder call carrying an identifier as data
pub const BUILDER_TOKEN: &str = "operator";

/// How the first argument of a builder call was written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgShape {
    StringLiteral,
    Name,
}

/// Which call shape produced a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "pattern", content = "argument", rename_all = "snake_case")]
pub enum MatchPattern {
    /// `a.b.category.command(...)`
    AttributeCall,
    /// `x.operator("category.command")`
    StringRegistration(ArgShape),
}

impl MatchPattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchPattern::AttributeCall => "attribute call",
            MatchPattern::StringRegistration(ArgShape::StringLiteral) => "operator(\"...\")",
            MatchPattern::StringRegistration(ArgShape::Name) => "operator(name)",
        }
    }
}

impl std::fmt::Display for MatchPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One located call expression believed to reference an identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallMatch {
    pub identifier: Identifier,
    /// Nearest enclosing function or class name
    pub enclosing_scope: Option<String>,
    /// Dotted module name the file belongs to
    pub module: String,
    pub file_path: PathBuf,
    /// 1-indexed line
    pub line: u32,
    /// 0-indexed byte column
    pub column: u32,
    pub pattern_kind: MatchPattern,
}

/// A rule inspects one call node and reports the shape it recognised
type Rule = fn(&AnnotatedTree<'_>, NodeId, &Identifier) -> Option<MatchPattern>;

/// Rules in evaluation order; a call may satisfy several
const RULES: &[Rule] = &[attribute_call, string_registration];

/// Walk a module tree and collect every call that references `identifier`.
///
/// Matches come out in ascending source position; calls starting at the same
/// position keep tree order, and rules keep table order.
pub fn find_calls(
    tree: &AnnotatedTree<'_>,
    identifier: &Identifier,
    module: &str,
    file_path: &Path,
) -> Vec<CallMatch> {
    let mut matches = Vec::new();

    for id in tree.ids() {
        if tree.kind(id) != "call" {
            continue;
        }
        for rule in RULES {
            if let Some(pattern_kind) = rule(tree, id, identifier) {
                let position = tree.node(id).position;
                matches.push(CallMatch {
                    identifier: identifier.clone(),
                    enclosing_scope: enclosing_scope(tree, id).map(str::to_string),
                    module: module.to_string(),
                    file_path: file_path.to_path_buf(),
                    line: position.line,
                    column: position.column,
                    pattern_kind,
                });
            }
        }
    }

    // Stable: equal positions keep pre-order and rule order
    matches.sort_by_key(|m| (m.line, m.column));
    matches
}

fn attribute_call(
    tree: &AnnotatedTree<'_>,
    call: NodeId,
    identifier: &Identifier,
) -> Option<MatchPattern> {
    let callee = tree.child_by_field(call, "function")?;
    if tree.kind(callee) != "attribute" {
        return None;
    }
    let segments = dotted_segments(tree, callee)?;
    identifier
        .matches_tail(&segments)
        .then_some(MatchPattern::AttributeCall)
}

fn string_registration(
    tree: &AnnotatedTree<'_>,
    call: NodeId,
    identifier: &Identifier,
) -> Option<MatchPattern> {
    let callee = tree.child_by_field(call, "function")?;
    if tree.kind(callee) != "attribute" {
        return None;
    }
    let attribute = tree.child_by_field(callee, "attribute")?;
    if tree.text(attribute) != BUILDER_TOKEN {
        return None;
    }

    let arguments = tree.child_by_field(call, "arguments")?;
    if tree.kind(arguments) != "argument_list" {
        return None;
    }
    let first = unparenthesize(tree, first_positional(tree, arguments)?)?;
    let (rendered, shape) = render_argument(tree, first)?;
    (rendered == identifier.to_text()).then_some(MatchPattern::StringRegistration(shape))
}

/// Segments of a callee made purely of names and attribute accesses.
///
/// `bpy.ops.mesh.add` yields `["bpy", "ops", "mesh", "add"]`; anything else in
/// the chain (calls, subscripts, parentheses) yields `None`.
pub fn dotted_segments<'src>(tree: &AnnotatedTree<'src>, node: NodeId) -> Option<Vec<&'src str>> {
    let mut segments = Vec::new();
    let mut current = node;
    loop {
        match tree.kind(current) {
            "attribute" => {
                let attribute = tree.child_by_field(current, "attribute")?;
                segments.push(tree.text(attribute));
                current = tree.child_by_field(current, "object")?;
            }
            "identifier" => {
                segments.push(tree.text(current));
                break;
            }
            _ => return None,
        }
    }
    segments.reverse();
    Some(segments)
}

fn first_positional(tree: &AnnotatedTree<'_>, arguments: NodeId) -> Option<NodeId> {
    tree.named_children(arguments).find(|arg| {
        !matches!(
            tree.kind(*arg),
            "keyword_argument" | "dictionary_splat" | "comment"
        )
    })
}

/// Strip grouping parentheses: `(("a.b"))` is the literal `"a.b"`
fn unparenthesize(tree: &AnnotatedTree<'_>, mut node: NodeId) -> Option<NodeId> {
    while tree.kind(node) == "parenthesized_expression" {
        node = tree
            .named_children(node)
            .find(|child| tree.kind(*child) != "comment")?;
    }
    Some(node)
}

/// Render an argument back to the text it denotes
fn render_argument(tree: &AnnotatedTree<'_>, argument: NodeId) -> Option<(String, ArgShape)> {
    match tree.kind(argument) {
        "identifier" => Some((tree.text(argument).to_string(), ArgShape::Name)),
        "string" => string_value(tree, argument).map(|s| (s, ArgShape::StringLiteral)),
        "concatenated_string" => {
            let mut value = String::new();
            for part in tree.named_children(argument) {
                if tree.kind(part) == "comment" {
                    continue;
                }
                value.push_str(&string_value(tree, part)?);
            }
            Some((value, ArgShape::StringLiteral))
        }
        _ => None,
    }
}

/// Value of a plain string literal.
///
/// Byte strings and f-strings with interpolations have no static text value.
pub fn string_value(tree: &AnnotatedTree<'_>, node: NodeId) -> Option<String> {
    if tree.kind(node) != "string" || tree.contains_kind(node, "interpolation") {
        return None;
    }
    decode_literal(tree.text(node))
}

fn decode_literal(text: &str) -> Option<String> {
    let quote_start = text.find(['"', '\''])?;
    let prefix = text[..quote_start].to_ascii_lowercase();
    if prefix.contains('b') {
        return None;
    }
    let raw = prefix.contains('r');

    let quoted = &text[quote_start..];
    let body = ["\"\"\"", "'''", "\"", "'"].iter().find_map(|q| {
        quoted
            .strip_prefix(*q)
            .and_then(|rest| rest.strip_suffix(*q))
    })?;

    if raw {
        return Some(body.to_string());
    }
    unescape(body)
}

/// Decode the escape sequences of a non-raw string body.
///
/// `\N{...}` needs the Unicode name table and yields `None`, as do malformed
/// hex escapes and code points that are not scalar values.
fn unescape(body: &str) -> Option<String> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('a') => out.push('\u{07}'),
            Some('b') => out.push('\u{08}'),
            Some('f') => out.push('\u{0C}'),
            Some('v') => out.push('\u{0B}'),
            Some('\n') => {}
            Some(other @ ('\\' | '\'' | '"')) => out.push(other),
            Some(first @ '0'..='7') => {
                let mut value = first.to_digit(8)?;
                for _ in 0..2 {
                    match chars.peek().and_then(|d| d.to_digit(8)) {
                        Some(digit) => {
                            value = value * 8 + digit;
                            chars.next();
                        }
                        None => break,
                    }
                }
                out.push(char::from_u32(value)?);
            }
            Some('x') => out.push(hex_escape(&mut chars, 2)?),
            Some('u') => out.push(hex_escape(&mut chars, 4)?),
            Some('U') => out.push(hex_escape(&mut chars, 8)?),
            Some('N') => return None,
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    Some(out)
}

/// Exactly `digits` hex digits forming one code point
fn hex_escape(chars: &mut impl Iterator<Item = char>, digits: usize) -> Option<char> {
    let mut value = 0u32;
    for _ in 0..digits {
        value = value.checked_mul(16)? + chars.next()?.to_digit(16)?;
    }
    char::from_u32(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::SyntaxTree;

    fn run(source: &str, id: &str) -> Vec<CallMatch> {
        let tree = SyntaxTree::parse(source).unwrap().annotate();
        let identifier = Identifier::parse(id).unwrap();
        find_calls(&tree, &identifier, "pkg.mod", Path::new("pkg/mod.py"))
    }

    #[test]
    fn test_attribute_call_any_qualifier_length() {
        let source = r#"
def foo():
    cat.cmd()
    pkg.ops.cat.cmd(value=1)
"#;
        let matches = run(source, "cat.cmd");
        assert_eq!(matches.len(), 2);
        for m in &matches {
            assert_eq!(m.enclosing_scope.as_deref(), Some("foo"));
            assert_eq!(m.pattern_kind, MatchPattern::AttributeCall);
            assert_eq!(m.file_path, PathBuf::from("pkg/mod.py"));
            assert_eq!(m.module, "pkg.mod");
        }
        assert_eq!((matches[0].line, matches[0].column), (3, 4));
        assert_eq!((matches[1].line, matches[1].column), (4, 4));
    }

    #[test]
    fn test_string_registration_at_top_level() {
        let matches = run("layout.operator(\"cat.cmd\")\n", "cat.cmd");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].enclosing_scope, None);
        assert_eq!(
            matches[0].pattern_kind,
            MatchPattern::StringRegistration(ArgShape::StringLiteral)
        );
        assert_eq!((matches[0].line, matches[0].column), (1, 0));
    }

    #[test]
    fn test_string_registration_variants() {
        let source = r#"
class PANEL:
    def draw(self, context):
        row.operator('cat.cmd', text="Go")
        row.operator(text="Go", *args)
        row.operator("cat" ".cmd")
        row.operator(r'cat.cmd')
        row.operator(f"cat.{name}")
        row.operator(b"cat.cmd")
        row.operator("cat.other")
        row.menu("cat.cmd")
"#;
        let matches = run(source, "cat.cmd");
        let lines: Vec<u32> = matches.iter().map(|m| m.line).collect();
        assert_eq!(lines, vec![4, 6, 7]);
        assert!(matches.iter().all(|m| m.enclosing_scope.as_deref() == Some("draw")));
    }

    #[test]
    fn test_unrelated_calls_do_not_match() {
        let source = r#"
cmd()
cat()
other.cmd()
cat.cmd.extra()
get_ops().cat.cmd()
items[0].cat.cmd()
"#;
        assert!(run(source, "cat.cmd").is_empty());
    }

    #[test]
    fn test_aliases_are_not_followed() {
        let source = r#"
import pkg.ops as o
o.category.run()
"#;
        assert!(run(source, "cat.cmd").is_empty());
        // Trailing segments still match regardless of what the qualifier is
        assert_eq!(run(source, "category.run").len(), 1);
    }

    #[test]
    fn test_nested_calls_ordered_by_position() {
        let source = "outer(cat.cmd(), x.cat.cmd())\ncat.cmd()\n";
        let matches = run(source, "cat.cmd");
        let positions: Vec<(u32, u32)> = matches.iter().map(|m| (m.line, m.column)).collect();
        assert_eq!(positions, vec![(1, 6), (1, 17), (2, 0)]);
    }

    #[test]
    fn test_both_patterns_on_one_call() {
        let matches = run("layout.operator(\"layout.operator\")\n", "layout.operator");
        let kinds: Vec<MatchPattern> = matches.iter().map(|m| m.pattern_kind).collect();
        assert_eq!(
            kinds,
            vec![
                MatchPattern::AttributeCall,
                MatchPattern::StringRegistration(ArgShape::StringLiteral)
            ]
        );
    }

    #[test]
    fn test_decode_literal() {
        assert_eq!(decode_literal("'a.b'").as_deref(), Some("a.b"));
        assert_eq!(decode_literal("\"\"\"a.b\"\"\"").as_deref(), Some("a.b"));
        assert_eq!(decode_literal("u'a.b'").as_deref(), Some("a.b"));
        assert_eq!(decode_literal(r"'a\.b'").as_deref(), Some(r"a\.b"));
        assert_eq!(decode_literal(r"'it\'s'").as_deref(), Some("it's"));
        assert_eq!(decode_literal("b'a.b'"), None);
    }

    #[test]
    fn test_decode_literal_numeric_escapes() {
        assert_eq!(decode_literal(r"'a\x2eb'").as_deref(), Some("a.b"));
        assert_eq!(decode_literal(r"'a\056b'").as_deref(), Some("a.b"));
        assert_eq!(decode_literal(r"'a\u002eb'").as_deref(), Some("a.b"));
        assert_eq!(decode_literal(r"'a\U0000002eb'").as_deref(), Some("a.b"));
        assert_eq!(decode_literal(r"'\0'").as_deref(), Some("\0"));
        assert_eq!(decode_literal(r"'\a\v'").as_deref(), Some("\u{07}\u{0B}"));
        assert_eq!(decode_literal(r"'a\N{FULL STOP}b'"), None);
        assert_eq!(decode_literal(r"'a\x2'"), None);
        assert_eq!(decode_literal(r"'\ud800'"), None);
        assert_eq!(decode_literal(r"r'a\x2eb'").as_deref(), Some(r"a\x2eb"));
    }

    #[test]
    fn test_string_registration_sees_literal_value() {
        let source = r#"
layout.operator(("cat.cmd"))
layout.operator("cat\x2ecmd")
layout.operator((  # grouped
    "cat" ".cmd"))
layout.operator(("cat.cmd",))
layout.operator("cat\N{FULL STOP}cmd")
"#;
        let matches = run(source, "cat.cmd");
        let lines: Vec<u32> = matches.iter().map(|m| m.line).collect();
        assert_eq!(lines, vec![2, 3, 4]);
        assert!(matches.iter().all(
            |m| m.pattern_kind == MatchPattern::StringRegistration(ArgShape::StringLiteral)
        ));
    }
}
