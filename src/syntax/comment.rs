//! Comment extraction and grouping.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use super::Span;

/// `//[a-z0-9]+:[a-z0-9]` compiler directives, with the slashes removed.
static DIRECTIVE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z0-9]+:[a-z0-9]").expect("valid regex"));

/// A single `//` or `/* */` comment as it appears in the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawComment {
    pub span: Span,
    pub text: String,
}

/// A run of comments with no code and no blank line between them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentGroup {
    pub span: Span,
    pub comments: Vec<RawComment>,
    /// The group starts after code on the same line.
    pub trailing: bool,
}

impl CommentGroup {
    fn new(comment: RawComment, trailing: bool) -> Self {
        Self {
            span: comment.span,
            comments: vec![comment],
            trailing,
        }
    }

    fn push(&mut self, comment: RawComment) {
        self.span = Span::cover(self.span, comment.span);
        self.comments.push(comment);
    }

    /// Comment lines with markers stripped.
    ///
    /// Follows Go's `CommentGroup.Text`: a single space after `//` is
    /// removed, compiler directives are dropped, trailing whitespace is
    /// trimmed, leading blank lines are removed and interior runs of blank
    /// lines collapse into one.
    pub fn lines(&self) -> Vec<String> {
        let mut raw = Vec::new();
        for comment in &self.comments {
            let body = if let Some(rest) = comment.text.strip_prefix("//") {
                if let Some(rest) = rest.strip_prefix(' ') {
                    rest
                } else if is_directive(rest) {
                    continue;
                } else {
                    rest
                }
            } else {
                comment
                    .text
                    .strip_prefix("/*")
                    .and_then(|t| t.strip_suffix("*/"))
                    .unwrap_or(&comment.text)
            };
            raw.extend(body.split('\n').map(|l| l.trim_end().to_string()));
        }

        let mut lines: Vec<String> = Vec::with_capacity(raw.len());
        for line in raw {
            let previous_blank = lines.last().map(|l| l.is_empty()).unwrap_or(true);
            if !line.is_empty() || !previous_blank {
                lines.push(line);
            }
        }
        while lines.last().map(|l| l.is_empty()).unwrap_or(false) {
            lines.pop();
        }
        lines
    }

    /// Group text with a trailing newline, empty when nothing remains.
    pub fn text(&self) -> String {
        let lines = self.lines();
        if lines.is_empty() {
            return String::new();
        }
        let mut text = lines.join("\n");
        text.push('\n');
        text
    }
}

fn is_directive(text: &str) -> bool {
    text.starts_with("line ")
        || text.starts_with("extern ")
        || text.starts_with("export ")
        || DIRECTIVE.is_match(text)
}

/// Group the comments of one file the way Go's scanner does.
///
/// A comment that follows code on its line opens a trailing group which only
/// extends along that line; any other comment opens a group that absorbs the
/// comments on the immediately following lines.
pub fn group_comments(mut comments: Vec<RawComment>, source: &str) -> Vec<CommentGroup> {
    comments.sort_by_key(|c| c.span.start);

    let mut groups: Vec<CommentGroup> = Vec::new();
    for comment in comments {
        if let Some(group) = groups.last_mut() {
            let only_space = source
                .get(group.span.end..comment.span.start)
                .map(|gap| gap.trim().is_empty())
                .unwrap_or(false);
            let line_gap = comment.span.start_line.saturating_sub(group.span.end_line);
            let allowed = if group.trailing { 0 } else { 1 };
            if only_space && line_gap <= allowed {
                group.push(comment);
                continue;
            }
        }
        let line_start = source[..comment.span.start]
            .rfind('\n')
            .map(|i| i + 1)
            .unwrap_or(0);
        let trailing = !source[line_start..comment.span.start].trim().is_empty();
        groups.push(CommentGroup::new(comment, trailing));
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(source: &str, needle: &str) -> RawComment {
        let start = source.find(needle).unwrap();
        let end = start + needle.len();
        let line = |offset: usize| source[..offset].matches('\n').count() + 1;
        RawComment {
            span: Span {
                start,
                end,
                start_line: line(start),
                start_col: 1,
                end_line: line(end),
                end_col: 1,
            },
            text: needle.to_string(),
        }
    }

    #[test]
    fn test_adjacent_lines_form_one_group() {
        let source = "//go:generate echo\n// func Print\nfunc Print() {}\n";
        let groups = group_comments(
            vec![comment(source, "//go:generate echo"), comment(source, "// func Print")],
            source,
        );

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].text(), "func Print\n");
    }

    #[test]
    fn test_trailing_comment_is_its_own_group() {
        let source = "const (\n\tA = 1 // A\n\t// b\n\tB = 2\n)\n";
        let groups = group_comments(vec![comment(source, "// A"), comment(source, "// b")], source);

        assert_eq!(groups.len(), 2);
        assert!(groups[0].trailing);
        assert!(!groups[1].trailing);
    }

    #[test]
    fn test_blank_line_splits_groups() {
        let source = "// one\n\n// two\nvar x int\n";
        let groups = group_comments(vec![comment(source, "// one"), comment(source, "// two")], source);

        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn test_block_comment_lines() {
        let source = "/*\n  first\n\n\n  second  \n*/\n";
        let groups = group_comments(vec![comment(source, "/*\n  first\n\n\n  second  \n*/")], source);

        assert_eq!(groups[0].lines(), vec!["  first", "", "  second"]);
    }
}
