//! Pass 2: type resolution.
//!
//! Turns the surface-syntax [`TypeExpr`] trees written by the programmer
//! into canonical, interned [`Type`] values. Struct, enum, and alias
//! declarations are resolved eagerly here (so a cyclic definition is
//! caught regardless of whether anything ever references it); function
//! and method signatures are resolved on demand by later passes through
//! [`resolve_type_expr`], since their generics need to be bound into scope
//! at the specific point each signature is visited.

use crate::scope::{ScopeKind, Symbol, SymbolKind, SymbolTable};
use lumen_ast::{
    AstContext, BinaryOp, CompilationUnit, Decl, EnumDecl, Expr, ExprKind, GenericParam, StructDecl, Type,
    TypeAliasDecl, TypeExpr, TypeExprKind, UnaryOp,
};
use lumen_diagnostics::{DiagID, DiagnosticEngine};
use std::collections::HashSet;

pub fn resolve_types<'ast>(
    ctx: &'ast AstContext<'ast>,
    diag: &mut DiagnosticEngine<'_>,
    unit: &CompilationUnit<'ast>,
    table: &mut SymbolTable<'ast>,
) {
    let mut resolving = HashSet::new();

    for decl in unit.decls {
        match decl {
            Decl::Struct(s) => {
                resolve_struct(ctx, diag, table, &mut resolving, s);
            }
            Decl::Enum(e) => {
                resolve_enum(ctx, diag, table, &mut resolving, e);
            }
            Decl::TypeAlias(a) => {
                resolve_alias(ctx, diag, table, &mut resolving, a);
            }
            Decl::Var(v) => {
                if let Some(annotation) = v.type_annotation {
                    let ty = resolve_type_expr(ctx, diag, table, &mut resolving, annotation);
                    if let Some(sym) = table.lookup(v.name) {
                        sym.set_type(ty);
                    }
                }
            }
            Decl::Const(c) => {
                if let Some(annotation) = c.type_annotation {
                    let ty = resolve_type_expr(ctx, diag, table, &mut resolving, annotation);
                    if let Some(sym) = table.lookup(c.name) {
                        sym.set_type(ty);
                    }
                }
            }
            Decl::Func(_) | Decl::Trait(_) | Decl::Impl(_) => {
                // Signatures depend on per-declaration generic scopes;
                // resolved on demand by the impl-indexing and body passes.
            }
        }
    }
}

/// Push a scope binding `generics` as in-scope generic type parameters.
/// Callers must pair this with a matching `table.pop()`.
pub fn push_generic_scope<'ast>(ctx: &'ast AstContext<'ast>, table: &mut SymbolTable<'ast>, generics: &'ast [&'ast GenericParam<'ast>]) {
    table.push(ScopeKind::Block);
    for g in generics {
        let ty = ctx.intern_type(Type::Generic { name: g.name, bounds: g.bounds });
        table.insert(Symbol::with_type(g.name, SymbolKind::Generic, ty, g.range));
    }
}

pub fn resolve_type_expr<'ast>(
    ctx: &'ast AstContext<'ast>,
    diag: &mut DiagnosticEngine<'_>,
    table: &mut SymbolTable<'ast>,
    resolving: &mut HashSet<&'ast str>,
    te: &'ast TypeExpr<'ast>,
) -> &'ast Type<'ast> {
    match &te.kind {
        TypeExprKind::Void => ctx.get_void(),
        TypeExprKind::SelfType => match table.lookup("Self") {
            Some(sym) => sym.get_type().unwrap_or_else(|| ctx.get_error_placeholder()),
            None => {
                diag.report_range(DiagID::ErrUndeclaredType, te.range).arg("Self").emit();
                ctx.get_error_placeholder()
            }
        },
        TypeExprKind::Named { path, type_args } => resolve_named(ctx, diag, table, resolving, te, path, type_args),
        TypeExprKind::Array { element, length } => {
            let el = resolve_type_expr(ctx, diag, table, resolving, element);
            let len = eval_array_length(diag, length);
            ctx.intern_type(Type::Array { element: el, length: len })
        }
        TypeExprKind::Slice { element, mutable } => {
            let el = resolve_type_expr(ctx, diag, table, resolving, element);
            ctx.intern_type(Type::Slice { element: el, mutable: *mutable })
        }
        TypeExprKind::Tuple(elems) => {
            let tys: Vec<_> = elems.iter().map(|e| resolve_type_expr(ctx, diag, table, resolving, e)).collect();
            ctx.intern_type(Type::Tuple(ctx.alloc_slice(tys)))
        }
        TypeExprKind::Optional(inner) => {
            let t = resolve_type_expr(ctx, diag, table, resolving, inner);
            ctx.get_optional(t)
        }
        TypeExprKind::Reference { pointee, mutable } => {
            let t = resolve_type_expr(ctx, diag, table, resolving, pointee);
            ctx.intern_type(Type::Reference { pointee: t, mutable: *mutable })
        }
        TypeExprKind::Pointer { pointee, mutable } => {
            let t = resolve_type_expr(ctx, diag, table, resolving, pointee);
            ctx.intern_type(Type::Pointer { pointee: t, mutable: *mutable })
        }
        TypeExprKind::Function { params, ret } => {
            let ptys: Vec<_> = params.iter().map(|p| resolve_type_expr(ctx, diag, table, resolving, p)).collect();
            let rty = match ret {
                Some(r) => resolve_type_expr(ctx, diag, table, resolving, r),
                None => ctx.get_void(),
            };
            ctx.intern_type(Type::Function { params: ctx.alloc_slice(ptys), ret: rty, variadic: false })
        }
        TypeExprKind::ErrorReturning(inner) => {
            let t = resolve_type_expr(ctx, diag, table, resolving, inner);
            ctx.intern_type(Type::Error { success: t })
        }
    }
}

fn resolve_named<'ast>(
    ctx: &'ast AstContext<'ast>,
    diag: &mut DiagnosticEngine<'_>,
    table: &mut SymbolTable<'ast>,
    resolving: &mut HashSet<&'ast str>,
    te: &'ast TypeExpr<'ast>,
    path: &'ast str,
    type_args: &'ast [&'ast TypeExpr<'ast>],
) -> &'ast Type<'ast> {
    let Some(symbol) = table.lookup(path) else {
        diag.report_range(DiagID::ErrUndeclaredType, te.range).arg(path).emit();
        return ctx.get_error_placeholder();
    };

    let (base, expected_arity) = match symbol.kind {
        SymbolKind::Builtin | SymbolKind::Generic => (symbol.get_type().unwrap_or_else(|| ctx.get_error_placeholder()), 0),
        SymbolKind::Struct(s) => (resolve_struct(ctx, diag, table, resolving, s), s.generics.len()),
        SymbolKind::Enum(e) => (resolve_enum(ctx, diag, table, resolving, e), e.generics.len()),
        SymbolKind::TypeAlias(a) => (resolve_alias(ctx, diag, table, resolving, a), 0),
        _ => {
            diag.report_range(DiagID::ErrUndeclaredType, te.range).arg(path).emit();
            return ctx.get_error_placeholder();
        }
    };

    if type_args.is_empty() {
        return base;
    }
    if type_args.len() != expected_arity {
        diag.report_range(DiagID::ErrGenericArityMismatch, te.range)
            .arg(expected_arity.to_string())
            .arg(type_args.len().to_string())
            .emit();
    }
    let args: Vec<_> = type_args.iter().map(|t| resolve_type_expr(ctx, diag, table, resolving, t)).collect();
    ctx.intern_type(Type::GenericInstance { base, args: ctx.alloc_slice(args) })
}

fn resolve_struct<'ast>(
    ctx: &'ast AstContext<'ast>,
    diag: &mut DiagnosticEngine<'_>,
    table: &mut SymbolTable<'ast>,
    resolving: &mut HashSet<&'ast str>,
    s: &'ast StructDecl<'ast>,
) -> &'ast Type<'ast> {
    if let Some(sym) = table.lookup(s.name) {
        if let Some(ty) = sym.get_type() {
            return ty;
        }
    }
    if resolving.contains(s.name) {
        diag.report_range(DiagID::ErrRecursiveType, s.range).arg(s.name).emit();
        return ctx.get_error_placeholder();
    }
    resolving.insert(s.name);
    push_generic_scope(ctx, table, s.generics);
    let fields: Vec<_> = s
        .fields
        .iter()
        .map(|f| lumen_ast::StructField {
            name: f.name,
            ty: resolve_type_expr(ctx, diag, table, resolving, f.type_annotation),
            offset: 0,
        })
        .collect();
    table.pop();
    resolving.remove(s.name);

    let ty = ctx.intern_type(Type::Struct { name: s.name, fields: ctx.alloc_slice(fields) });
    if let Some(sym) = table.lookup(s.name) {
        sym.set_type(ty);
    }
    ty
}

fn resolve_enum<'ast>(
    ctx: &'ast AstContext<'ast>,
    diag: &mut DiagnosticEngine<'_>,
    table: &mut SymbolTable<'ast>,
    resolving: &mut HashSet<&'ast str>,
    e: &'ast EnumDecl<'ast>,
) -> &'ast Type<'ast> {
    if let Some(sym) = table.lookup(e.name) {
        if let Some(ty) = sym.get_type() {
            return ty;
        }
    }
    if resolving.contains(e.name) {
        diag.report_range(DiagID::ErrRecursiveType, e.range).arg(e.name).emit();
        return ctx.get_error_placeholder();
    }
    resolving.insert(e.name);
    push_generic_scope(ctx, table, e.generics);
    let variants: Vec<_> = e
        .variants
        .iter()
        .map(|v| lumen_ast::EnumVariant {
            name: v.name,
            payload: match &v.payload {
                lumen_ast::EnumVariantPayload::Unit => lumen_ast::EnumPayload::Unit,
                lumen_ast::EnumVariantPayload::Tuple(elems) => {
                    let tys: Vec<_> = elems.iter().map(|t| resolve_type_expr(ctx, diag, table, resolving, t)).collect();
                    lumen_ast::EnumPayload::Tuple(ctx.alloc_slice(tys))
                }
                lumen_ast::EnumVariantPayload::Struct(fields) => {
                    let fields: Vec<_> = fields
                        .iter()
                        .map(|f| lumen_ast::StructField {
                            name: f.name,
                            ty: resolve_type_expr(ctx, diag, table, resolving, f.type_annotation),
                            offset: 0,
                        })
                        .collect();
                    lumen_ast::EnumPayload::Struct(ctx.alloc_slice(fields))
                }
            },
            discriminant: v.discriminant,
        })
        .collect();
    table.pop();
    resolving.remove(e.name);

    let ty = ctx.intern_type(Type::Enum { name: e.name, variants: ctx.alloc_slice(variants) });
    if let Some(sym) = table.lookup(e.name) {
        sym.set_type(ty);
    }
    ty
}

fn resolve_alias<'ast>(
    ctx: &'ast AstContext<'ast>,
    diag: &mut DiagnosticEngine<'_>,
    table: &mut SymbolTable<'ast>,
    resolving: &mut HashSet<&'ast str>,
    a: &'ast TypeAliasDecl<'ast>,
) -> &'ast Type<'ast> {
    if let Some(sym) = table.lookup(a.name) {
        if let Some(ty) = sym.get_type() {
            return ty;
        }
    }
    if resolving.contains(a.name) {
        diag.report_range(DiagID::ErrRecursiveType, a.range).arg(a.name).emit();
        return ctx.get_error_placeholder();
    }
    resolving.insert(a.name);
    let aliased = a.aliased.map(|te| resolve_type_expr(ctx, diag, table, resolving, te));
    resolving.remove(a.name);

    let ty = ctx.intern_type(Type::TypeAlias { name: a.name, aliased });
    if let Some(sym) = table.lookup(a.name) {
        sym.set_type(ty);
    }
    ty
}

/// Const-evaluate an array-length expression. Only literal integers and
/// the basic arithmetic operators are supported; anything else yields `0`
/// (the parser already requires `length` to be some constant expression,
/// full general constant folding over arbitrary identifiers is future work).
fn eval_array_length(diag: &mut DiagnosticEngine<'_>, expr: &Expr<'_>) -> u64 {
    match eval_const_int(diag, expr) {
        Some(n) if n >= 0 => n as u64,
        _ => 0,
    }
}

fn eval_const_int(diag: &mut DiagnosticEngine<'_>, expr: &Expr<'_>) -> Option<i128> {
    match &expr.kind {
        ExprKind::IntegerLiteral { value, .. } => Some(*value as i128),
        ExprKind::Unary { op: UnaryOp::Neg, operand } => eval_const_int(diag, operand).map(|v| -v),
        ExprKind::Binary { op, lhs, rhs } => {
            let l = eval_const_int(diag, lhs)?;
            let r = eval_const_int(diag, rhs)?;
            match op {
                BinaryOp::Add => Some(l + r),
                BinaryOp::Sub => Some(l - r),
                BinaryOp::Mul => Some(l * r),
                BinaryOp::Div => {
                    if r == 0 {
                        diag.report_range(DiagID::ErrDivisionByZero, expr.range).emit();
                        None
                    } else {
                        Some(l / r)
                    }
                }
                BinaryOp::Rem => {
                    if r == 0 {
                        diag.report_range(DiagID::ErrDivisionByZero, expr.range).emit();
                        None
                    } else {
                        Some(l % r)
                    }
                }
                _ => None,
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::SymbolTable;
    use lumen_diagnostics::{DiagnosticEngine, SourceManager};
    use std::cell::RefCell;

    #[test]
    fn resolves_a_named_builtin_type() {
        let ctx = AstContext::new(64);
        let sm = RefCell::new(SourceManager::new());
        let mut diag = DiagnosticEngine::new(&sm);
        let mut table = SymbolTable::new(&ctx);
        let mut resolving = HashSet::new();

        let te = ctx.alloc_type_expr(TypeExpr::new(
            TypeExprKind::Named { path: "i32", type_args: &[] },
            Default::default(),
        ));
        let ty = resolve_type_expr(&ctx, &mut diag, &mut table, &mut resolving, te);
        assert_eq!(ty, ctx.get_integer(32, lumen_ast::Signedness::Signed));
        assert!(!diag.has_errors());
    }

    #[test]
    fn undeclared_type_reports_and_yields_error_placeholder() {
        let ctx = AstContext::new(64);
        let sm = RefCell::new(SourceManager::new());
        let mut diag = DiagnosticEngine::new(&sm);
        let mut table = SymbolTable::new(&ctx);
        let mut resolving = HashSet::new();

        let te = ctx.alloc_type_expr(TypeExpr::new(
            TypeExprKind::Named { path: "Nonexistent", type_args: &[] },
            Default::default(),
        ));
        let ty = resolve_type_expr(&ctx, &mut diag, &mut table, &mut resolving, te);
        assert!(ty.is_error_placeholder());
        assert!(diag.has_errors());
    }
}
