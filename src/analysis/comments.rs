//! Comment attachment.
//!
//! Comment groups are attached to nodes with the same heuristics as Go's
//! `ast.NewCommentMap`: a group belongs to the preceding node (or node
//! group) when it starts on the line that node ends on, or on the next line
//! with a blank line before the following node; otherwise it belongs to the
//! following node.

use std::collections::HashMap;

use tracing::trace;

use crate::program::Program;
use crate::syntax::{Category, CommentGroup, FileId, NodeId, SyntaxKind};

/// Answers "which comments document this node" for one file.
pub struct CommentScanner<'p> {
    program: &'p Program,
    file: FileId,
    /// Node → indices into the file's comment groups.
    attached: HashMap<NodeId, Vec<usize>>,
    directive_prefixes: Vec<String>,
}

impl<'p> CommentScanner<'p> {
    /// Build the comment map of a file.
    pub fn new(program: &'p Program, file: FileId) -> Self {
        let attached = attach(program, file);
        trace!(
            file = %program.file(file).path,
            nodes = attached.len(),
            "comment map built"
        );
        Self {
            program,
            file,
            attached,
            directive_prefixes: program.config().directive_prefixes(),
        }
    }

    /// Scanner for the file containing `node`.
    pub fn for_node(program: &'p Program, node: NodeId) -> Self {
        Self::new(program, program.file_of(node).id)
    }

    /// Replace the directive prefixes filtered out of rendered text.
    pub fn with_directive_prefixes(mut self, prefixes: Vec<String>) -> Self {
        self.directive_prefixes = prefixes;
        self
    }

    /// Comment groups documenting a node, in source order.
    ///
    /// - files, declarations, fields and statements use their own comments;
    /// - a spec without comments of its own uses its declaration's;
    /// - any other node uses its innermost enclosing declaration, spec,
    ///   field or statement.
    pub fn comment_groups_of(&self, node: NodeId) -> Vec<&'p CommentGroup> {
        if self.program.node(node).file != self.file {
            return Vec::new();
        }

        let indices = match self.program.kind(node).category() {
            Category::File | Category::Declaration | Category::Field | Category::Statement => {
                self.own(node).to_vec()
            }
            Category::Specifier => {
                let own = self.own(node);
                if own.is_empty() {
                    match self.grouping_declaration(node) {
                        Some(decl) => self.own(decl).to_vec(),
                        None => Vec::new(),
                    }
                } else {
                    own.to_vec()
                }
            }
            _ => match self.commentable_ancestor(node) {
                Some(ancestor) => return self.comment_groups_of(ancestor),
                None => Vec::new(),
            },
        };

        let groups = &self.program.file(self.file).comments;
        let mut result: Vec<&'p CommentGroup> = indices.iter().map(|i| &groups[*i]).collect();
        result.sort_by_key(|g| g.span.start);
        result
    }

    /// Rendered comment text of a node; empty when nothing is attached.
    pub fn comments_of(&self, node: NodeId) -> String {
        render_comment_groups(&self.comment_groups_of(node), &self.directive_prefixes)
    }

    fn own(&self, node: NodeId) -> &[usize] {
        self.attached.get(&node).map(Vec::as_slice).unwrap_or(&[])
    }

    fn grouping_declaration(&self, spec: NodeId) -> Option<NodeId> {
        self.program
            .ancestors(spec)
            .find(|a| self.program.kind(*a).category() == Category::Declaration)
    }

    fn commentable_ancestor(&self, node: NodeId) -> Option<NodeId> {
        self.program.ancestors(node).find(|a| {
            let kind = self.program.kind(*a);
            kind.is_commentable() && kind != SyntaxKind::SourceFile
        })
    }
}

/// Join comment groups into one text.
///
/// Every line is prefixed with a newline, each group ends with an empty
/// line, lines starting with one of `directive_prefixes` are dropped and the
/// result is trimmed.
pub fn render_comment_groups(groups: &[&CommentGroup], directive_prefixes: &[String]) -> String {
    let mut text = String::new();
    for group in groups {
        for line in group.text().split('\n') {
            if directive_prefixes.iter().any(|p| line.starts_with(p.as_str())) {
                continue;
            }
            text.push('\n');
            text.push_str(line);
        }
    }
    text.trim().to_string()
}

fn attach(program: &Program, file: FileId) -> HashMap<NodeId, Vec<usize>> {
    let source_file = program.file(file);
    let groups = &source_file.comments;
    let mut attached: HashMap<NodeId, Vec<usize>> = HashMap::new();
    if groups.is_empty() {
        return attached;
    }

    let syntax = program.syntax();
    let mut next = 0;
    let mut stack: Vec<NodeId> = Vec::new();
    let mut previous: Option<NodeId> = None;
    let mut previous_group: Option<NodeId> = None;

    // A trailing `None` flushes the comments after the last node.
    let nodes = syntax.subtree(source_file.root).map(Some).chain(std::iter::once(None));
    for current in nodes {
        let (offset, line) = match current {
            Some(node) => {
                let span = syntax.span(node);
                (span.start, span.start_line)
            }
            None => (usize::MAX, usize::MAX),
        };

        while next < groups.len() && groups[next].span.end <= offset {
            let group = &groups[next];
            if let Some(top) = pop_ended(program, &mut stack, group.span.start) {
                previous_group = Some(top);
            }

            let start_line = group.span.start_line;
            let blank_before_current = group.span.end_line + 1 < line;
            let follows = |node: NodeId| {
                let end_line = syntax.span(node).end_line;
                end_line == start_line || (end_line + 1 == start_line && blank_before_current)
            };

            let owner = match (previous_group, previous) {
                (Some(g), _) if follows(g) => Some(g),
                (_, Some(p)) if follows(p) || current.is_none() => Some(p),
                _ => current,
            };
            attached
                .entry(owner.unwrap_or(source_file.root))
                .or_default()
                .push(next);
            next += 1;
        }

        let Some(node) = current else { break };
        if next >= groups.len() {
            break;
        }
        previous = Some(node);
        if syntax.kind(node).is_commentable() {
            pop_ended(program, &mut stack, syntax.span(node).start);
            stack.push(node);
        }
    }
    attached
}

/// Pop the node groups ending at or before `offset`; returns the outermost
/// popped one.
fn pop_ended(program: &Program, stack: &mut Vec<NodeId>, offset: usize) -> Option<NodeId> {
    let mut top = None;
    while let Some(last) = stack.last() {
        if program.span(*last).end > offset {
            break;
        }
        top = stack.pop();
    }
    top
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::ProgramBuilder;

    fn program(source: &str) -> Program {
        ProgramBuilder::new()
            .package("example.com/p", [("p.go", source)])
            .build()
            .unwrap()
    }

    fn ident(p: &Program, name: &str) -> NodeId {
        let id = p
            .func(name)
            .or_else(|| p.type_name(name))
            .or_else(|| p.const_(name))
            .or_else(|| p.var(name))
            .unwrap();
        p.object(id).ident.unwrap()
    }

    #[test]
    fn test_leading_comment_documents_declaration() {
        let p = program("package p\n\n// Run starts it.\nfunc Run() {}\n");

        assert_eq!(p.comments_of(ident(&p, "Run")), "Run starts it.");
    }

    #[test]
    fn test_spec_falls_back_to_declaration() {
        let p = program("package p\n\n// counters\nvar hits = 0\n");

        assert_eq!(p.comments_of(ident(&p, "hits")), "counters");
    }

    #[test]
    fn test_trailing_comment_joins_leading_one() {
        let p = program("package p\n\nconst (\n\t// first\n\tA = 1 // one\n\t// second\n\tB = 2\n)\n");

        assert_eq!(p.comments_of(ident(&p, "A")), "first\n\none");
        assert_eq!(p.comments_of(ident(&p, "B")), "second");
    }

    #[test]
    fn test_directive_lines_are_dropped() {
        let p = program("package p\n\n//go:generate stringer\n// go:generate spaced\n// Kind names things.\ntype Kind int\n");

        assert_eq!(p.comments_of(ident(&p, "Kind")), "Kind names things.");
    }

    #[test]
    fn test_custom_directive_prefixes() {
        let p = program("package p\n\n// lint:ignore all\n// T is a type.\ntype T int\n");
        let node = ident(&p, "T");

        let scanner = CommentScanner::for_node(&p, node).with_directive_prefixes(vec!["lint:".into()]);
        assert_eq!(scanner.comments_of(node), "T is a type.");
    }

    #[test]
    fn test_detached_comment_is_not_attached_to_next_declaration() {
        let p = program("package p\n\nfunc A() {} // about A\n\nfunc B() {}\n");

        assert_eq!(p.comments_of(ident(&p, "A")), "about A");
        assert_eq!(p.comments_of(ident(&p, "B")), "");
    }

    #[test]
    fn test_statement_comments() {
        let p = program("package p\n\nfunc f() int {\n\t// the answer\n\tx := 42\n\treturn x\n}\n");
        let x = p.var("x").unwrap();
        let node = p.object(x).ident.unwrap();

        assert_eq!(p.comments_of(node), "the answer");
    }

    #[test]
    fn test_uncommented_file() {
        let p = program("package p\n\nfunc f() {}\n");

        assert_eq!(p.comments_of(ident(&p, "f")), "");
    }

    #[test]
    fn test_render_groups() {
        let p = program("package p\n\n// a\n// b\n\n// c\nvar v int\n");
        let groups: Vec<&CommentGroup> = p.files()[0].comments.iter().collect();

        assert_eq!(render_comment_groups(&groups, &[]), "a\nb\n\nc");
    }
}
