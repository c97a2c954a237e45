//! goinfer - static return-value inference and doc-comment lookup for Go.
//!
//! goinfer loads a tree of Go packages, type-checks it, and answers two
//! questions code generators keep asking about Go sources:
//!
//! - which comments document a declaration, field, statement or expression;
//! - which concrete values (type plus constant value when known) a function
//!   may return in each of its result slots.
//!
//! # Architecture
//!
//! The codebase uses tree-sitter for parsing:
//!
//! - `syntax`: tree-sitter front end lowering files into a shared node arena
//! - `program`: packages, objects and the static type checker
//! - `analysis`: comment attachment and return value resolution
//! - `report`: serializable views of analysis results
//! - `config`: optional YAML configuration
//!
//! # Example
//!
//! ```no_run
//! use goinfer::Program;
//!
//! let program = Program::load("./mypkg")?;
//! if let Some(f) = program.func("Handler") {
//!     println!("{}", program.comments_of(program.object(f).ident.unwrap()));
//!     if let Some(results) = program.results_of(f)? {
//!         for (slot, values) in results.results.slots().iter().enumerate() {
//!             for value in values {
//!                 println!("{}: {}", slot, value);
//!             }
//!         }
//!     }
//! }
//! # Ok::<(), goinfer::Error>(())
//! ```

pub mod analysis;
pub mod config;
pub mod error;
pub mod program;
pub mod report;
pub mod syntax;

pub use analysis::{
    CommentScanner, ExpressionEvaluator, FunctionResults, ResultSet, ReturnValueResolver,
    TypedValue,
};
pub use config::Config;
pub use error::{Error, Result};
pub use program::{ObjectId, Program, ProgramBuilder, SymbolKind};
pub use syntax::{FileId, NodeId, Span};
