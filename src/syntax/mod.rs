//! Arena-backed Go syntax trees.
//!
//! Each file parsed by tree-sitter is lowered into a shared [`SyntaxArena`]:
//! - nodes are numbered in lexical pre-order, so a subtree is a contiguous
//!   id range and "visit in source order" is a plain loop;
//! - every node keeps a parent link, so ancestor queries walk the depth of
//!   the tree instead of rescanning the file;
//! - comments are pulled out of the tree and grouped per file
//!   (see [`CommentGroup`]).

mod comment;
mod kind;
mod lower;

use std::fmt;

use serde::Serialize;

pub use comment::{group_comments, CommentGroup, RawComment};
pub use kind::{Category, SyntaxKind};
pub use lower::{GoParser, ImportRef, LoweredFile};

/// Handle to a node in the [`SyntaxArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Handle to a source file of the program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FileId(pub(crate) u32);

impl FileId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Source location span with byte offsets and line/column positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Span {
    /// Start byte offset (0-indexed).
    pub start: usize,
    /// End byte offset (0-indexed, exclusive).
    pub end: usize,
    /// Start line (1-indexed).
    pub start_line: usize,
    /// Start column (1-indexed).
    pub start_col: usize,
    /// End line (1-indexed).
    pub end_line: usize,
    /// End column (1-indexed).
    pub end_col: usize,
}

impl Span {
    /// Create a span from a tree-sitter node.
    pub fn from_node(node: tree_sitter::Node) -> Self {
        let start = node.start_position();
        let end = node.end_position();
        Self {
            start: node.start_byte(),
            end: node.end_byte(),
            start_line: start.row + 1, // tree-sitter is 0-indexed
            start_col: start.column + 1,
            end_line: end.row + 1,
            end_col: end.column + 1,
        }
    }

    /// Span running from the start of `first` to the end of `last`.
    pub fn cover(first: Span, last: Span) -> Self {
        Self {
            start: first.start,
            start_line: first.start_line,
            start_col: first.start_col,
            end: last.end,
            end_line: last.end_line,
            end_col: last.end_col,
        }
    }

    /// Whether `other` lies completely inside this span.
    pub fn encloses(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Whether the byte offset falls in `[start, end)`.
    pub fn contains_offset(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start_line, self.start_col)
    }
}

/// A lowered syntax node.
#[derive(Debug, Clone)]
pub struct NodeData {
    pub kind: SyntaxKind,
    pub span: Span,
    pub file: FileId,
    pub parent: Option<NodeId>,
    /// Field name of this node inside its parent (`left`, `body`, ...).
    pub field: Option<&'static str>,
    /// Operator token for unary, binary, assignment and inc/dec nodes.
    pub operator: Option<&'static str>,
    /// Source text, kept for identifiers and literals only.
    pub text: Option<Box<str>>,
    pub(crate) children: Vec<NodeId>,
    /// Last id of this node's subtree (inclusive).
    pub(crate) last_descendant: NodeId,
}

/// Storage for every syntax node of a program.
#[derive(Debug, Default)]
pub struct SyntaxArena {
    nodes: Vec<NodeData>,
}

impl SyntaxArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(data);
        id
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.index()]
    }

    pub fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> SyntaxKind {
        self.node(id).kind
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.node(id).span
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Source text of an identifier or literal node, empty for other nodes.
    pub fn text(&self, id: NodeId) -> &str {
        self.node(id).text.as_deref().unwrap_or("")
    }

    /// First child stored under the given field name.
    pub fn child_by_field(&self, id: NodeId, field: &str) -> Option<NodeId> {
        self.children_by_field(id, field).next()
    }

    /// All children stored under the given field name, in source order.
    pub fn children_by_field<'a>(
        &'a self,
        id: NodeId,
        field: &'a str,
    ) -> impl Iterator<Item = NodeId> + 'a {
        self.children(id)
            .iter()
            .copied()
            .filter(move |c| self.node(*c).field == Some(field))
    }

    /// First child of the given kind.
    pub fn child_of_kind(&self, id: NodeId, kind: SyntaxKind) -> Option<NodeId> {
        self.children(id).iter().copied().find(|c| self.kind(*c) == kind)
    }

    /// Strict ancestors of a node, innermost first.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            arena: self,
            next: self.parent(id),
        }
    }

    /// The node and all its descendants in lexical pre-order.
    pub fn subtree(&self, id: NodeId) -> impl Iterator<Item = NodeId> {
        (id.0..=self.node(id).last_descendant.0).map(NodeId)
    }

    /// Whether `inner` is `outer` or one of its descendants.
    pub fn is_within(&self, inner: NodeId, outer: NodeId) -> bool {
        outer <= inner && inner <= self.node(outer).last_descendant
    }

    /// Pre-order walk starting at `root`.
    ///
    /// The callback returns whether to descend into the visited node; when it
    /// returns `false` the whole subtree is skipped.
    pub fn inspect<F>(&self, root: NodeId, mut visit: F)
    where
        F: FnMut(NodeId) -> bool,
    {
        let end = self.node(root).last_descendant.0;
        let mut current = root.0;
        while current <= end {
            let id = NodeId(current);
            if visit(id) {
                current += 1;
            } else {
                current = self.node(id).last_descendant.0 + 1;
            }
        }
    }

    /// Strip any number of parentheses around an expression.
    pub fn unparen(&self, mut id: NodeId) -> NodeId {
        while matches!(
            self.kind(id),
            SyntaxKind::ParenthesizedExpression | SyntaxKind::ParenthesizedType
        ) {
            match self.children(id).first() {
                Some(inner) => id = *inner,
                None => break,
            }
        }
        id
    }

    /// Nearest enclosing function declaration or literal, excluding `id` itself.
    pub fn enclosing_function(&self, id: NodeId) -> Option<NodeId> {
        self.ancestors(id).find(|a| self.kind(*a).is_function())
    }
}

/// Iterator over the ancestors of a node.
pub struct Ancestors<'a> {
    arena: &'a SyntaxArena,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.arena.parent(current);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lower(source: &str) -> (SyntaxArena, NodeId) {
        let mut arena = SyntaxArena::new();
        let parser = GoParser::new().unwrap();
        let lowered = parser.parse_into(&mut arena, FileId(0), source).unwrap();
        (arena, lowered.root)
    }

    #[test]
    fn test_preorder_numbering_and_parents() {
        let (arena, root) = lower("package main\n\nfunc f() int {\n\treturn 1 + 2\n}\n");

        assert_eq!(arena.kind(root), SyntaxKind::SourceFile);
        for id in arena.subtree(root).skip(1) {
            let parent = arena.parent(id).expect("non-root nodes have a parent");
            assert!(parent < id, "parents precede children");
            assert!(arena.is_within(id, parent));
        }
    }

    #[test]
    fn test_inspect_skips_subtrees() {
        let (arena, root) = lower("package main\n\nfunc f() {\n\tg := func() { return }\n\t_ = g\n}\n");

        let mut returns = 0;
        arena.inspect(root, |id| {
            if arena.kind(id) == SyntaxKind::FuncLiteral {
                return false;
            }
            if arena.kind(id) == SyntaxKind::ReturnStatement {
                returns += 1;
            }
            true
        });
        assert_eq!(returns, 0);
    }

    #[test]
    fn test_statement_lists_are_flattened() {
        let (arena, root) = lower("package main\n\nfunc f() {\n\ta := 1\n\t_ = a\n}\n");

        let block = arena
            .subtree(root)
            .find(|id| arena.kind(*id) == SyntaxKind::Block)
            .unwrap();
        let kinds: Vec<_> = arena.children(block).iter().map(|c| arena.kind(*c)).collect();
        assert_eq!(
            kinds,
            vec![SyntaxKind::ShortVarDeclaration, SyntaxKind::AssignmentStatement]
        );
    }

    #[test]
    fn test_binary_operator_is_recorded() {
        let (arena, root) = lower("package main\n\nconst c = 1 << 2\n");

        let binary = arena
            .subtree(root)
            .find(|id| arena.kind(*id) == SyntaxKind::BinaryExpression)
            .unwrap();
        assert_eq!(arena.node(binary).operator, Some("<<"));
        assert_eq!(arena.children(binary).len(), 2);
    }
}
