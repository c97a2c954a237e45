//! Serializable views of analysis results.
//!
//! Analysis results refer to syntax nodes by id; the reports here resolve
//! them to file positions and source text so they can be printed or written
//! as JSON without the [`Program`] at hand.

use serde::{Deserialize, Serialize};

use crate::analysis::{FunctionResults, TypedValue};
use crate::program::{ObjectId, Program};
use crate::syntax::NodeId;

/// JSON view of one possible return value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueReport {
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Source text of the originating expression.
    pub expr: String,
    pub file: String,
    pub line: usize,
}

impl ValueReport {
    pub fn new(program: &Program, value: &TypedValue) -> Self {
        let span = program.span(value.expr);
        Self {
            ty: value.ty.to_string(),
            value: value.value.as_ref().map(ToString::to_string),
            expr: source_text(program, value.expr).to_string(),
            file: program.file_of(value.expr).path.clone(),
            line: span.start_line,
        }
    }
}

/// JSON view of a function's resolved results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionReport {
    pub function: String,
    pub arity: usize,
    /// Possible values per result slot.
    pub results: Vec<Vec<ValueReport>>,
}

impl FunctionReport {
    pub fn new(program: &Program, function: ObjectId, results: &FunctionResults) -> Self {
        Self {
            function: program.object(function).name.clone(),
            arity: results.arity,
            results: results
                .results
                .slots()
                .iter()
                .map(|slot| slot.iter().map(|v| ValueReport::new(program, v)).collect())
                .collect(),
        }
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// JSON view of the comments documenting a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentReport {
    pub kind: String,
    pub file: String,
    pub line: usize,
    pub text: String,
}

impl CommentReport {
    pub fn new(program: &Program, node: NodeId) -> Self {
        Self {
            kind: program.kind(node).to_string(),
            file: program.file_of(node).path.clone(),
            line: program.span(node).start_line,
            text: program.comments_of(node),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn source_text(program: &Program, node: NodeId) -> &str {
    let span = program.span(node);
    program
        .file_of(node)
        .source
        .get(span.start..span.end)
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::ProgramBuilder;

    #[test]
    fn test_function_report_json() {
        let p = ProgramBuilder::new()
            .package(
                "example.com/p",
                [("p.go", "package p\n\nfunc f() (int, string) {\n\treturn 1 + 1, \"x\"\n}\n")],
            )
            .build()
            .unwrap();
        let f = p.func("f").unwrap();
        let results = p.results_of(f).unwrap().unwrap();

        let report = FunctionReport::new(&p, f, &results);
        assert_eq!(report.function, "f");
        assert_eq!(report.results[0][0].expr, "1 + 1");
        assert_eq!(report.results[0][0].value.as_deref(), Some("2"));
        assert_eq!(report.results[1][0].line, 4);

        let json = report.to_json().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["results"][0][0]["type"], "int");
        assert_eq!(parsed["results"][1][0]["value"], "\"x\"");
    }

    #[test]
    fn test_comment_report() {
        let p = ProgramBuilder::new()
            .package("example.com/p", [("p.go", "package p\n\n// V is a value.\nvar V = 1\n")])
            .build()
            .unwrap();
        let node = p.object(p.var("V").unwrap()).ident.unwrap();

        let report = CommentReport::new(&p, node);
        assert_eq!(report.text, "V is a value.");
        assert_eq!(report.kind, "Identifier");
        assert_eq!(report.line, 4);
    }
}
