//! Analyses over a loaded [`Program`].
//!
//! Two questions are answered here:
//! - which comments document a node ([`CommentScanner`]);
//! - which values a function can return in each result slot
//!   ([`ReturnValueResolver`]).
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────────┐     ┌─────────────────┐
//! │ Program         │────▶│ ReturnValue      │────▶│ FunctionResults │
//! │ (types, objects)│     │ Resolver         │     │ (slot → values) │
//! └─────────────────┘     └──────────────────┘     └─────────────────┘
//!          │                       │
//!          │                       ▼
//!          │              ┌──────────────────┐
//!          │              │ Expression       │
//!          │              │ Evaluator        │
//!          │              └──────────────────┘
//!          ▼
//! ┌─────────────────┐
//! │ CommentScanner  │────▶ comment text per node
//! └─────────────────┘
//! ```
//!
//! Both analyses are read-only over the program, so any number of them may
//! run concurrently against one [`Program`].

mod comments;
mod eval;
mod results;

pub use comments::{render_comment_groups, CommentScanner};
pub use eval::ExpressionEvaluator;
pub use results::{FunctionResults, ResultSet, ReturnValueResolver, TypedValue};

use crate::error::Result;
use crate::program::{ObjectId, Program};
use crate::syntax::NodeId;

impl Program {
    /// Comment text documenting a node, or an empty string.
    pub fn comments_of(&self, node: NodeId) -> String {
        CommentScanner::for_node(self, node).comments_of(node)
    }

    /// Possible return values of a function or method object.
    ///
    /// Returns `Ok(None)` when the object is not a function with a body in
    /// the program.
    pub fn results_of(&self, function: ObjectId) -> Result<Option<FunctionResults>> {
        ReturnValueResolver::new(self).results_of(function)
    }
}
