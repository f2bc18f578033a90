//! Python syntax trees
//!
//! Parsing, parent annotation and enclosing-scope lookup. Everything
//! downstream reads an [`AnnotatedTree`] and never touches tree-sitter
//! directly.

pub mod scope;
pub mod tree;

pub use scope::enclosing_scope;
pub use tree::{AnnotatedTree, NodeId, Position, SyntaxNode, SyntaxTree};
