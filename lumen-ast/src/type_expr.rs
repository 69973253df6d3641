//! Surface-syntax type expressions, as written by the programmer, before
//! Sema resolves them into canonical [`crate::ty::Type`] values.

use lumen_diagnostics::SourceRange;

#[derive(Debug)]
pub enum TypeExprKind<'ast> {
    /// A bare name, possibly with generic arguments: `i32`, `Box<T>`.
    Named {
        path: &'ast str,
        type_args: &'ast [&'ast TypeExpr<'ast>],
    },
    Array {
        element: &'ast TypeExpr<'ast>,
        length: &'ast crate::expr::Expr<'ast>,
    },
    Slice {
        element: &'ast TypeExpr<'ast>,
        mutable: bool,
    },
    Tuple(&'ast [&'ast TypeExpr<'ast>]),
    Optional(&'ast TypeExpr<'ast>),
    Reference {
        pointee: &'ast TypeExpr<'ast>,
        mutable: bool,
    },
    Pointer {
        pointee: &'ast TypeExpr<'ast>,
        mutable: bool,
    },
    Function {
        params: &'ast [&'ast TypeExpr<'ast>],
        ret: Option<&'ast TypeExpr<'ast>>,
    },
    /// `!T`, an error-returning type.
    ErrorReturning(&'ast TypeExpr<'ast>),
    SelfType,
    Void,
}

#[derive(Debug)]
pub struct TypeExpr<'ast> {
    pub kind: TypeExprKind<'ast>,
    pub range: SourceRange,
}

impl<'ast> TypeExpr<'ast> {
    pub fn new(kind: TypeExprKind<'ast>, range: SourceRange) -> Self {
        TypeExpr { kind, range }
    }
}
