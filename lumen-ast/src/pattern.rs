//! Pattern nodes, used in `match` arms, `let` destructuring, and function
//! parameters.

use crate::expr::Expr;
use crate::ty::Type;
use lumen_diagnostics::SourceRange;
use std::cell::Cell;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeBound {
    Inclusive,
    Exclusive,
}

#[derive(Debug)]
pub enum PatternKind<'ast> {
    Wildcard,
    Identifier {
        name: &'ast str,
        mutable: bool,
        type_annotation: Option<&'ast crate::type_expr::TypeExpr<'ast>>,
    },
    Literal(&'ast Expr<'ast>),
    Tuple(&'ast [&'ast Pattern<'ast>]),
    Struct {
        path: &'ast str,
        fields: &'ast [(&'ast str, &'ast Pattern<'ast>)],
        has_rest: bool,
    },
    EnumVariant {
        path: &'ast str,
        payload: Option<&'ast [&'ast Pattern<'ast>]>,
    },
    Range {
        low: &'ast Pattern<'ast>,
        high: &'ast Pattern<'ast>,
        bound: RangeBound,
    },
    Or(&'ast [&'ast Pattern<'ast>]),
    Bind {
        name: &'ast str,
        inner: &'ast Pattern<'ast>,
    },
    /// The `..` rest marker inside a tuple/struct pattern.
    Rest,
}

#[derive(Debug)]
pub struct Pattern<'ast> {
    pub kind: PatternKind<'ast>,
    pub range: SourceRange,
    pub ty: Cell<Option<&'ast Type<'ast>>>,
}

impl<'ast> Pattern<'ast> {
    pub fn new(kind: PatternKind<'ast>, range: SourceRange) -> Self {
        Pattern {
            kind,
            range,
            ty: Cell::new(None),
        }
    }

    /// The set of names this pattern binds, for or-pattern arm-consistency
    /// checking (err 3024).
    pub fn bound_names(&self, out: &mut Vec<&'ast str>) {
        match &self.kind {
            PatternKind::Identifier { name, .. } => out.push(name),
            PatternKind::Tuple(elems) => elems.iter().for_each(|p| p.bound_names(out)),
            PatternKind::Struct { fields, .. } => fields.iter().for_each(|(_, p)| p.bound_names(out)),
            PatternKind::EnumVariant { payload: Some(pats), .. } => pats.iter().for_each(|p| p.bound_names(out)),
            PatternKind::Or(arms) => {
                if let Some(first) = arms.first() {
                    first.bound_names(out);
                }
            }
            PatternKind::Bind { name, inner } => {
                out.push(name);
                inner.bound_names(out);
            }
            _ => {}
        }
    }
}
