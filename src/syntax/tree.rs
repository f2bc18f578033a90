//! Arena syntax tree with upward parent links
//!
//! Python source is parsed with tree-sitter and copied into a flat arena in
//! pre-order. Parents own their children as ids; the upward `parent` id is
//! filled in by a separate annotation pass that turns a [`SyntaxTree`] into
//! an [`AnnotatedTree`].

use crate::{Error, Result};
use std::ops::Range;
use tree_sitter::Parser;

/// Index of a node inside its tree's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// The module's top-level node
    pub fn root() -> Self {
        Self(0)
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Source position of a node start
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    /// 1-indexed line
    pub line: u32,
    /// 0-indexed byte column
    pub column: u32,
}

/// A single node in the arena
#[derive(Debug, Clone)]
pub struct SyntaxNode {
    /// Grammar kind (`call`, `attribute`, `function_definition`, ...)
    pub kind: &'static str,
    /// Field name under which the parent holds this node (`function`, `name`, ...)
    pub field: Option<&'static str>,
    /// Named grammar node, as opposed to punctuation and keywords
    pub named: bool,
    pub position: Position,
    /// Byte range in the module source
    pub span: Range<usize>,
    pub children: Vec<NodeId>,
    /// Upward link, set only by [`SyntaxTree::annotate`]
    pub parent: Option<NodeId>,
}

/// A parsed module whose parent links are not yet set
#[derive(Debug)]
pub struct SyntaxTree<'src> {
    source: &'src str,
    nodes: Vec<SyntaxNode>,
}

impl<'src> SyntaxTree<'src> {
    /// Parse Python source into an arena tree.
    ///
    /// Trees with syntax errors are rejected, so a module either parses fully
    /// or is skipped.
    pub fn parse(source: &'src str) -> Result<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|e| Error::ParseFailure(format!("Failed to set language: {}", e)))?;

        let tree = parser
            .parse(source, None)
            .ok_or_else(|| Error::ParseFailure("Failed to parse source".to_string()))?;

        let root = tree.root_node();
        if root.has_error() {
            let at = first_error_position(root);
            return Err(Error::ParseFailure(format!(
                "invalid syntax at line {}, column {}",
                at.line, at.column
            )));
        }

        let mut nodes: Vec<SyntaxNode> = Vec::with_capacity(root.descendant_count());
        let mut ancestors: Vec<NodeId> = Vec::new();
        let mut cursor = root.walk();

        loop {
            let node = cursor.node();
            let id = NodeId(nodes.len() as u32);
            nodes.push(SyntaxNode {
                kind: node.kind(),
                field: cursor.field_name(),
                named: node.is_named(),
                position: Position {
                    line: node.start_position().row as u32 + 1,
                    column: node.start_position().column as u32,
                },
                span: node.byte_range(),
                children: Vec::new(),
                parent: None,
            });
            if let Some(parent) = ancestors.last() {
                nodes[parent.index()].children.push(id);
            }

            if cursor.goto_first_child() {
                ancestors.push(id);
                continue;
            }

            // Climb until a sibling is available or the root is reached
            loop {
                if cursor.goto_next_sibling() {
                    break;
                }
                if !cursor.goto_parent() {
                    return Ok(Self { source, nodes });
                }
                ancestors.pop();
            }
        }
    }

    /// Set every node's parent link in one pre-order pass
    pub fn annotate(mut self) -> AnnotatedTree<'src> {
        let mut stack = vec![NodeId::root()];
        while let Some(id) = stack.pop() {
            let children = std::mem::take(&mut self.nodes[id.index()].children);
            for child in &children {
                self.nodes[child.index()].parent = Some(id);
            }
            stack.extend(children.iter().rev().copied());
            self.nodes[id.index()].children = children;
        }

        AnnotatedTree {
            source: self.source,
            nodes: self.nodes,
        }
    }
}

fn first_error_position(root: tree_sitter::Node) -> Position {
    let mut node = root;
    // Descend towards the first error or missing node
    loop {
        let mut cursor = node.walk();
        let children: Vec<_> = node.children(&mut cursor).collect();
        match children.into_iter().find(|c| c.has_error() || c.is_missing()) {
            Some(child) if child.is_error() || child.is_missing() => {
                node = child;
                break;
            }
            Some(child) => node = child,
            None => break,
        }
    }
    Position {
        line: node.start_position().row as u32 + 1,
        column: node.start_position().column as u32,
    }
}

/// A fully annotated, read-only module tree
#[derive(Debug)]
pub struct AnnotatedTree<'src> {
    source: &'src str,
    nodes: Vec<SyntaxNode>,
}

impl<'src> AnnotatedTree<'src> {
    pub fn root(&self) -> NodeId {
        NodeId::root()
    }

    pub fn node(&self, id: NodeId) -> &SyntaxNode {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> &'static str {
        self.node(id).kind
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Source text covered by a node
    pub fn text(&self, id: NodeId) -> &'src str {
        let span = self.node(id).span.clone();
        &self.source[span]
    }

    /// First child held under the given field name
    pub fn child_by_field(&self, id: NodeId, field: &str) -> Option<NodeId> {
        self.node(id)
            .children
            .iter()
            .copied()
            .find(|c| self.node(*c).field == Some(field))
    }

    /// Named children in source order
    pub fn named_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.node(id)
            .children
            .iter()
            .copied()
            .filter(|c| self.node(*c).named)
    }

    /// All node ids in pre-order
    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    /// Whether any node below `id` has the given kind
    pub fn contains_kind(&self, id: NodeId, kind: &str) -> bool {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if self.kind(current) == kind {
                return true;
            }
            stack.extend(self.node(current).children.iter().copied());
        }
        false
    }

    /// Number of nodes in the arena
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
