//! Statement nodes: the contents of a block, aside from its optional tail
//! expression (which lives directly on `ExprKind::Block`).

use crate::decl::Decl;
use crate::expr::Expr;
use lumen_diagnostics::SourceRange;

#[derive(Debug)]
pub enum StmtKind<'ast> {
    /// A local `var`/`const` declaration.
    Decl(&'ast Decl<'ast>),
    Expr(&'ast Expr<'ast>),
    Return(Option<&'ast Expr<'ast>>),
    /// `defer { … }`: runs when the enclosing function scope exits.
    Defer(&'ast Expr<'ast>),
}

#[derive(Debug)]
pub struct Stmt<'ast> {
    pub kind: StmtKind<'ast>,
    pub range: SourceRange,
}

impl<'ast> Stmt<'ast> {
    pub fn new(kind: StmtKind<'ast>, range: SourceRange) -> Self {
        Stmt { kind, range }
    }
}
