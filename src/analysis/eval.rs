//! Expression evaluation against the recorded static types.

use super::results::TypedValue;
use crate::error::Result;
use crate::program::Program;
use crate::syntax::NodeId;

/// Turns an expression node into a [`TypedValue`].
///
/// Evaluation is a lookup: the program's checker has already computed the
/// static type of every expression and folded every constant.
#[derive(Clone, Copy)]
pub struct ExpressionEvaluator<'p> {
    program: &'p Program,
}

impl<'p> ExpressionEvaluator<'p> {
    pub fn new(program: &'p Program) -> Self {
        Self { program }
    }

    /// Static type and constant value of `expr`.
    ///
    /// Fails with [`Error::Eval`](crate::Error::Eval) when the expression was
    /// never type-checked, e.g. because it sits inside a syntax error.
    pub fn evaluate(&self, expr: NodeId) -> Result<TypedValue> {
        let tv = self.program.type_and_value_of(expr)?;
        Ok(TypedValue {
            ty: tv.ty.clone(),
            value: tv.value.clone(),
            expr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::{BasicKind, ConstValue, ProgramBuilder, Type};
    use crate::syntax::SyntaxKind;

    #[test]
    fn test_evaluate_folded_constant() {
        let p = ProgramBuilder::new()
            .package("example.com/p", [("p.go", "package p\n\nfunc f() int {\n\treturn 1 << 3\n}\n")])
            .build()
            .unwrap();
        let binary = p
            .syntax()
            .subtree(p.files()[0].root)
            .find(|n| p.kind(*n) == SyntaxKind::BinaryExpression)
            .unwrap();

        let value = ExpressionEvaluator::new(&p).evaluate(binary).unwrap();
        assert_eq!(value.ty, Type::Basic(BasicKind::UntypedInt));
        assert_eq!(value.value, Some(ConstValue::Int(8)));
        assert_eq!(value.expr, binary);
    }

    #[test]
    fn test_unchecked_node_is_an_error() {
        let p = ProgramBuilder::new()
            .package("example.com/p", [("p.go", "package p\n\nfunc f() {}\n")])
            .build()
            .unwrap();
        let block = p
            .syntax()
            .subtree(p.files()[0].root)
            .find(|n| p.kind(*n) == SyntaxKind::Block)
            .unwrap();

        assert!(ExpressionEvaluator::new(&p).evaluate(block).is_err());
    }
}
