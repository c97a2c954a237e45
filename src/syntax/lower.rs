//! Tree-sitter front end: parse Go source and lower it into the arena.

use std::collections::HashMap;

use streaming_iterator::StreamingIterator;
use tree_sitter::{Language, Parser, Query, QueryCursor, Tree};

use super::{FileId, NodeData, NodeId, RawComment, Span, SyntaxArena, SyntaxKind};
use crate::error::{Error, Result};

/// Tree-sitter query for the package clause.
const PACKAGE_QUERY: &str = r#"
(package_clause
  (package_identifier) @package_name
)
"#;

/// Tree-sitter query for import specs, grouped or not.
const IMPORT_QUERY: &str = r#"
(import_spec
  name: (_)? @alias
  path: (_) @path
) @import
"#;

/// An import spec found in a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRef {
    /// Explicit package name (`.` and `_` included), if any.
    pub alias: Option<String>,
    /// Import path with the quotes removed.
    pub path: String,
    /// The `import_spec` node.
    pub spec: NodeId,
}

/// Result of lowering one file.
#[derive(Debug, Clone)]
pub struct LoweredFile {
    pub root: NodeId,
    pub package_name: Option<String>,
    pub imports: Vec<ImportRef>,
    pub comments: Vec<RawComment>,
    /// Tree-sitter reported at least one syntax error.
    pub has_errors: bool,
}

/// Go parser producing arena nodes.
///
/// `tree_sitter::Parser` is not `Sync`, so a fresh parser is created for
/// every call; the grammar itself is shared.
#[derive(Clone)]
pub struct GoParser {
    language: Language,
}

impl GoParser {
    pub fn new() -> Result<Self> {
        let language: Language = tree_sitter_go::LANGUAGE.into();
        // Fail early when the grammar ABI does not match the runtime.
        Parser::new().set_language(&language)?;
        Ok(Self { language })
    }

    /// Parse source code and return the tree.
    pub fn parse(&self, path: &str, source: &str) -> Result<Tree> {
        let mut parser = Parser::new();
        parser.set_language(&self.language)?;
        parser.parse(source, None).ok_or_else(|| Error::Parse {
            path: path.to_string(),
        })
    }

    /// Parse and lower in one step.
    pub fn parse_into(&self, arena: &mut SyntaxArena, file: FileId, source: &str) -> Result<LoweredFile> {
        let tree = self.parse("<memory>", source)?;
        self.lower(arena, file, &tree, source)
    }

    /// Lower a parsed tree into the arena.
    pub fn lower(
        &self,
        arena: &mut SyntaxArena,
        file: FileId,
        tree: &Tree,
        source: &str,
    ) -> Result<LoweredFile> {
        let mut lowering = Lowering {
            arena,
            file,
            source,
            comments: Vec::new(),
            ids: HashMap::new(),
        };
        let ts_root = tree.root_node();
        // Comments are skipped when computing extents, so the file node
        // starts at its package clause like Go's `ast.File`.
        let root = lowering.lower_node(ts_root, None, None);

        let Lowering { comments, ids, .. } = lowering;

        let package_name = self.extract_package(tree, source)?;
        let imports = self.extract_imports(tree, source, &ids)?;

        Ok(LoweredFile {
            root,
            package_name,
            imports,
            comments,
            has_errors: ts_root.has_error(),
        })
    }

    /// Extract the package name from a parsed file.
    fn extract_package(&self, tree: &Tree, source: &str) -> Result<Option<String>> {
        let query = Query::new(&self.language, PACKAGE_QUERY)?;
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&query, tree.root_node(), source.as_bytes());

        if let Some(m) = matches.next() {
            for capture in m.captures {
                let name = query.capture_names()[capture.index as usize];
                if name == "package_name" {
                    let text = capture.node.utf8_text(source.as_bytes()).unwrap_or("");
                    return Ok(Some(text.to_string()));
                }
            }
        }
        Ok(None)
    }

    /// Extract import specs in source order.
    fn extract_imports(
        &self,
        tree: &Tree,
        source: &str,
        ids: &HashMap<usize, NodeId>,
    ) -> Result<Vec<ImportRef>> {
        let query = Query::new(&self.language, IMPORT_QUERY)?;
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&query, tree.root_node(), source.as_bytes());

        let mut imports = Vec::new();
        while let Some(m) = matches.next() {
            let mut alias = None;
            let mut path = None;
            let mut spec = None;

            for capture in m.captures {
                let text = capture.node.utf8_text(source.as_bytes()).unwrap_or("");
                match query.capture_names()[capture.index as usize] {
                    "alias" => alias = Some(text.to_string()),
                    "path" => path = Some(unquote_import(text)),
                    "import" => spec = ids.get(&capture.node.id()).copied(),
                    _ => {}
                }
            }

            if let (Some(path), Some(spec)) = (path, spec) {
                imports.push(ImportRef { alias, path, spec });
            }
        }
        imports.sort_by_key(|i| i.spec);
        Ok(imports)
    }
}

fn unquote_import(text: &str) -> String {
    text.trim_matches(|c| c == '"' || c == '`').to_string()
}

struct Lowering<'a> {
    arena: &'a mut SyntaxArena,
    file: FileId,
    source: &'a str,
    comments: Vec<RawComment>,
    /// Tree-sitter node id to arena id, for query captures.
    ids: HashMap<usize, NodeId>,
}

impl Lowering<'_> {
    fn lower_node(
        &mut self,
        node: tree_sitter::Node,
        parent: Option<NodeId>,
        field: Option<&'static str>,
    ) -> NodeId {
        let kind = SyntaxKind::from_ts(node.kind());
        let text = kind
            .is_leaf_text()
            .then(|| node.utf8_text(self.source.as_bytes()).unwrap_or("").into());

        let id = self.arena.push(NodeData {
            kind,
            span: Span::from_node(node),
            file: self.file,
            parent,
            field,
            operator: None,
            text,
            children: Vec::new(),
            last_descendant: NodeId(0),
        });
        self.ids.insert(node.id(), id);

        let mut children = Vec::new();
        let mut extent: Option<(Span, Span)> = None;
        if !kind.is_leaf_text() {
            self.lower_children(node, id, &mut children, &mut extent);
        }

        let last = NodeId(self.arena.len() as u32 - 1);
        let data = self.arena.node_mut(id);
        data.children = children;
        data.last_descendant = last;
        // Trailing comments may sit inside a tree-sitter node; Go's nodes end
        // at their last token.
        if let Some((first, last)) = extent {
            data.span = Span::cover(first, last);
        }
        id
    }

    fn lower_children(
        &mut self,
        node: tree_sitter::Node,
        id: NodeId,
        children: &mut Vec<NodeId>,
        extent: &mut Option<(Span, Span)>,
    ) {
        let mut cursor = node.walk();
        if !cursor.goto_first_child() {
            return;
        }
        loop {
            let child = cursor.node();
            let field = cursor.field_name();

            if child.kind() == "comment" {
                self.comments.push(RawComment {
                    span: Span::from_node(child),
                    text: child.utf8_text(self.source.as_bytes()).unwrap_or("").to_string(),
                });
            } else {
                let span = Span::from_node(child);
                *extent = match *extent {
                    Some((first, _)) => Some((first, span)),
                    None => Some((span, span)),
                };

                if child.is_named() && SyntaxKind::is_transparent(child.kind()) {
                    let mut inner = None;
                    self.lower_children(child, id, children, &mut inner);
                } else if child.is_named() {
                    children.push(self.lower_node(child, Some(id), field));
                } else if field == Some("operator") || matches!(child.kind(), "++" | "--" | ":=")
                {
                    self.arena.node_mut(id).operator = Some(child.kind());
                }
            }

            if !cursor.goto_next_sibling() {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_and_imports() {
        let parser = GoParser::new().unwrap();
        let mut arena = SyntaxArena::new();
        let source = r#"
package main

import (
	"fmt"
	s "strings"
)

import "os"
"#;
        let lowered = parser.parse_into(&mut arena, FileId(0), source).unwrap();

        assert_eq!(lowered.package_name.as_deref(), Some("main"));
        let paths: Vec<_> = lowered.imports.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(paths, vec!["fmt", "strings", "os"]);
        assert_eq!(lowered.imports[1].alias.as_deref(), Some("s"));
        assert_eq!(arena.kind(lowered.imports[0].spec), SyntaxKind::ImportSpec);
    }

    #[test]
    fn test_comments_are_collected_not_lowered() {
        let parser = GoParser::new().unwrap();
        let mut arena = SyntaxArena::new();
        let source = "// package doc\npackage main\n\n// f doc\nfunc f() {} // trailing\n";
        let lowered = parser.parse_into(&mut arena, FileId(0), source).unwrap();

        assert_eq!(lowered.comments.len(), 3);
        assert!(!lowered.has_errors);
        // The file span starts at the package clause.
        assert_eq!(arena.span(lowered.root).start_line, 2);
        let func = arena
            .subtree(lowered.root)
            .find(|id| arena.kind(*id) == SyntaxKind::FunctionDeclaration)
            .unwrap();
        assert_eq!(arena.span(func).end, source.find(" // trailing").unwrap());
    }
}
