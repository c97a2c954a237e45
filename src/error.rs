//! Error types.

use std::path::PathBuf;

use thiserror::Error;

use crate::syntax::{Span, SyntaxKind};

/// Errors raised while loading a program or evaluating its expressions.
///
/// Missing declarations or bodies are not errors: queries return `None` or
/// empty results for them.
#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}")]
    Parse { path: String },
    #[error("failed to load the Go grammar: {0}")]
    Language(#[from] tree_sitter::LanguageError),
    #[error("invalid tree-sitter query: {0}")]
    Query(#[from] tree_sitter::QueryError),
    #[error("cannot type-check {kind} at {path}:{span}")]
    Eval {
        kind: SyntaxKind,
        path: String,
        span: Span,
    },
    #[error("no Go packages found under {0}")]
    NoPackages(PathBuf),
    #[error("directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("invalid exclusion pattern: {0}")]
    Glob(#[from] globset::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
