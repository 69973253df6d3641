//! Pass 4: function body analysis.
//!
//! Walks every function/method/closure body in execution order, resolving
//! identifiers, typing expressions, and threading an [`OwnershipChecker`]
//! alongside the type walk so a move is flagged at the same point its value
//! is consumed. `Analyzer` does not hold the ownership checker as a field:
//! every `check_*` method takes `own: &mut OwnershipChecker<'ast>` as an
//! explicit parameter instead, since branch handling (`if`, `match`, loops)
//! needs to call back into the analyzer's own methods from inside a branch
//! body while a second branch's snapshot is still live — two struct fields
//! both wanting `&mut self` at once doesn't work, a threaded parameter does.
//!
//! `await` does not strip an async wrapper off the operand's type: the type
//! system here has no separate future/task type, so an `async fn`'s declared
//! return type already is the value the body produces, and `await` only
//! checks that it's being used inside an `async` function (err 3047).

use crate::ownership::{is_copy_type, OwnershipChecker};
use crate::resolve_type::{push_generic_scope, resolve_type_expr};
use crate::scope::{ScopeKind, Symbol, SymbolKind, SymbolTable};
use lumen_ast::{
    ArrayExpr, AstContext, BinaryOp, CallArg, CompilationUnit, Decl, Expr, ExprKind, FuncDecl, ImplDecl, LoopKind,
    MatchArm, ParamKind, Pattern, PatternKind, RangeKind, Stmt, StmtKind, TraitDecl, Type, UnaryOp, VarDecl,
};
use lumen_diagnostics::{DiagID, DiagnosticEngine, SourceRange};
use std::collections::HashSet;

/// Fixed arity table for the handful of builtin (`@name(...)`) calls the
/// language defines; an unrecognized name still type-checks its arguments
/// but yields the error placeholder type rather than guessing a shape.
const BUILTIN_ARITY: &[(&str, usize)] = &[("sizeof", 1), ("typeof", 1), ("unreachable", 0), ("panic", 1)];

pub fn check_bodies<'ast>(
    ctx: &'ast AstContext<'ast>,
    diag: &mut DiagnosticEngine<'_>,
    unit: &CompilationUnit<'ast>,
    table: &mut SymbolTable<'ast>,
) {
    for decl in unit.decls {
        match decl {
            Decl::Func(f) => check_function(ctx, diag, table, f, None),
            Decl::Impl(impl_decl) => check_impl(ctx, diag, table, impl_decl),
            Decl::Trait(t) => check_trait_defaults(ctx, diag, table, t),
            _ => {}
        }
    }
}

fn check_impl<'ast>(
    ctx: &'ast AstContext<'ast>,
    diag: &mut DiagnosticEngine<'_>,
    table: &mut SymbolTable<'ast>,
    impl_decl: &'ast ImplDecl<'ast>,
) {
    let mut resolving = HashSet::new();
    push_generic_scope(ctx, table, impl_decl.generics);
    let target = resolve_type_expr(ctx, diag, table, &mut resolving, impl_decl.target);
    table.insert(Symbol::with_type("Self", SymbolKind::Generic, target, impl_decl.range));
    for method in impl_decl.methods {
        check_function(ctx, diag, table, method, None);
    }
    table.pop();
}

fn check_trait_defaults<'ast>(
    ctx: &'ast AstContext<'ast>,
    diag: &mut DiagnosticEngine<'_>,
    table: &mut SymbolTable<'ast>,
    trait_decl: &'ast TraitDecl<'ast>,
) {
    push_generic_scope(ctx, table, trait_decl.generics);
    let self_ty = ctx.intern_type(Type::Generic { name: "Self", bounds: &[] });
    table.insert(Symbol::with_type("Self", SymbolKind::Generic, self_ty, trait_decl.range));
    for method in trait_decl.methods {
        if method.body.is_some() {
            check_function(ctx, diag, table, method, Some(trait_decl.methods));
        }
    }
    table.pop();
}

fn check_function<'ast>(
    ctx: &'ast AstContext<'ast>,
    diag: &mut DiagnosticEngine<'_>,
    table: &mut SymbolTable<'ast>,
    func: &'ast FuncDecl<'ast>,
    self_methods: Option<&'ast [&'ast FuncDecl<'ast>]>,
) {
    let Some(body) = func.body else {
        // Abstract trait method or extern declaration: nothing to walk.
        return;
    };

    push_generic_scope(ctx, table, func.generics);
    table.push(ScopeKind::Function);
    let mut resolving = HashSet::new();
    let mut own = OwnershipChecker::new();

    for param in func.params {
        bind_param(ctx, diag, table, &mut resolving, &mut own, param);
    }

    let expected_return = match func.return_type {
        Some(rt) => resolve_type_expr(ctx, diag, table, &mut resolving, rt),
        None => ctx.get_void(),
    };

    {
        let mut analyzer = Analyzer {
            ctx,
            diag: &mut *diag,
            table: &mut *table,
            resolving,
            self_methods,
            current_func: func,
            expected_return,
        };
        analyzer.check_expr(body, &mut own);
    }

    if !matches!(expected_return, Type::Void) && !expected_return.is_error_placeholder() && !always_returns(body) {
        diag.report_range(DiagID::ErrMissingReturn, func.range).arg(func.name).emit();
    }

    warn_unused_bindings(diag, table);
    table.pop();
    table.pop();
}

fn bind_param<'ast>(
    ctx: &'ast AstContext<'ast>,
    diag: &mut DiagnosticEngine<'_>,
    table: &mut SymbolTable<'ast>,
    resolving: &mut HashSet<&'ast str>,
    own: &mut OwnershipChecker<'ast>,
    param: &'ast lumen_ast::ParamDecl<'ast>,
) {
    let ty = match param.kind {
        ParamKind::SelfValue | ParamKind::RefSelf | ParamKind::MutRefSelf => {
            let self_ty = table.lookup("Self").and_then(|s| s.get_type()).unwrap_or_else(|| ctx.get_error_placeholder());
            match param.kind {
                ParamKind::RefSelf => ctx.intern_type(Type::Reference { pointee: self_ty, mutable: false }),
                ParamKind::MutRefSelf => ctx.intern_type(Type::Reference { pointee: self_ty, mutable: true }),
                _ => self_ty,
            }
        }
        ParamKind::Variadic => {
            let elem = param
                .type_annotation
                .map(|te| resolve_type_expr(ctx, diag, table, resolving, te))
                .unwrap_or_else(|| ctx.get_error_placeholder());
            ctx.intern_type(Type::VarArgs(elem))
        }
        ParamKind::Normal => param
            .type_annotation
            .map(|te| resolve_type_expr(ctx, diag, table, resolving, te))
            .unwrap_or_else(|| ctx.get_error_placeholder()),
    };
    let mutable = param.mutable || matches!(param.kind, ParamKind::MutRefSelf);
    let sym = Symbol::with_type(param.name, SymbolKind::Param { mutable }, ty, param.range);
    if !table.insert(sym) {
        diag.report_range(DiagID::ErrRedefinition, param.range).arg(param.name).emit();
    } else if !is_copy_type(ty) {
        own.bind(param.name);
    }
}

/// Warn on every `var`/parameter binding left unread in the scope about to
/// be popped (4001/4002); run just before `check_function` pops the
/// function scope.
fn warn_unused_bindings(diag: &mut DiagnosticEngine<'_>, table: &SymbolTable<'_>) {
    for sym in table.current_scope_symbols() {
        if sym.is_used() {
            continue;
        }
        match sym.kind {
            SymbolKind::Var { .. } if !sym.name.starts_with('_') => {
                diag.report_range(DiagID::WarnUnusedVariable, sym.range).arg(sym.name).emit();
            }
            SymbolKind::Param { .. } if !sym.name.starts_with('_') => {
                diag.report_range(DiagID::WarnUnusedParameter, sym.range).arg(sym.name).emit();
            }
            _ => {}
        }
    }
}

/// Syntactic "does every path return a value" check: a block always
/// returns if it ends in an explicit `return` or an exhaustive `if`/`match`
/// that itself always returns on every arm. It does not reason about loop
/// breaks or unreachable code after a diverging statement; those are out
/// of scope for this pass.
fn always_returns(expr: &Expr<'_>) -> bool {
    match &expr.kind {
        ExprKind::Block { stmts, tail } => {
            if tail.is_some() {
                return true;
            }
            match stmts.last() {
                Some(s) => match &s.kind {
                    StmtKind::Return(_) => true,
                    StmtKind::Expr(e) => always_returns(e),
                    _ => false,
                },
                None => false,
            }
        }
        ExprKind::If { then_branch, else_branch, .. } => {
            else_branch.map_or(false, |e| always_returns(then_branch) && always_returns(e))
        }
        ExprKind::Match { arms, .. } => !arms.is_empty() && arms.iter().all(|a| always_returns(a.body)),
        _ => false,
    }
}

struct Analyzer<'a, 'b, 'ast> {
    ctx: &'ast AstContext<'ast>,
    diag: &'a mut DiagnosticEngine<'b>,
    table: &'a mut SymbolTable<'ast>,
    resolving: HashSet<&'ast str>,
    /// Trait methods visible for `self`-based fallback resolution, when
    /// checking a trait's own default method bodies (`Self` is abstract).
    self_methods: Option<&'ast [&'ast FuncDecl<'ast>]>,
    current_func: &'ast FuncDecl<'ast>,
    expected_return: &'ast Type<'ast>,
}

impl<'a, 'b, 'ast> Analyzer<'a, 'b, 'ast> {
    fn resolve_te(&mut self, te: &'ast lumen_ast::TypeExpr<'ast>) -> &'ast Type<'ast> {
        resolve_type_expr(self.ctx, self.diag, self.table, &mut self.resolving, te)
    }

    fn common_type(&self, a: &'ast Type<'ast>, b: &'ast Type<'ast>) -> Option<&'ast Type<'ast>> {
        if a == b {
            return Some(a);
        }
        match (a, b) {
            (Type::Integer { bits: ba, signed: sa }, Type::Integer { bits: bb, signed: sb }) if sa == sb => {
                Some(if ba >= bb { a } else { b })
            }
            (Type::Float { bits: ba }, Type::Float { bits: bb }) => Some(if ba >= bb { a } else { b }),
            (Type::Float { .. }, Type::Integer { .. }) => Some(a),
            (Type::Integer { .. }, Type::Float { .. }) => Some(b),
            (Type::Optional(inner), other) if *inner == other => Some(a),
            (other, Type::Optional(inner)) if *inner == other => Some(b),
            _ if self.is_none_type(a) => {
                Some(if matches!(b, Type::Optional(_)) { b } else { self.ctx.get_optional(b) })
            }
            _ if self.is_none_type(b) => {
                Some(if matches!(a, Type::Optional(_)) { a } else { self.ctx.get_optional(a) })
            }
            _ => None,
        }
    }

    fn is_none_type(&self, ty: &Type<'_>) -> bool {
        matches!(ty, Type::Optional(inner) if matches!(inner, Type::Void))
    }

    /// Whether a value of type `actual` may be used where `expected` is
    /// required: exact match, `None` widening to any `Optional<T>`, or the
    /// common-type rule landing on `expected` itself.
    fn assignable(&self, actual: &'ast Type<'ast>, expected: &'ast Type<'ast>) -> bool {
        if actual == expected {
            return true;
        }
        if self.is_none_type(actual) && matches!(expected, Type::Optional(_)) {
            return true;
        }
        matches!(self.common_type(actual, expected), Some(common) if common == expected)
    }

    fn check_return(&mut self, value: Option<&'ast Expr<'ast>>, own: &mut OwnershipChecker<'ast>, range: SourceRange) {
        let actual = match value {
            Some(e) => {
                let ty = self.check_expr(e, own);
                self.consume_value(e, own);
                ty
            }
            None => self.ctx.get_void(),
        };
        if !self.assignable(actual, self.expected_return) {
            self.diag
                .report_range(DiagID::ErrTypeMismatch, range)
                .arg(self.expected_return.to_string())
                .arg(actual.to_string())
                .emit();
        }
    }

    /// Mark a by-value use of `expr` as a move, if it names a non-Copy
    /// binding. Called at every value-consuming site: assignment RHS,
    /// call arguments, `return` values. A member/index expression rooted in
    /// a tracked binding is not a move (that binding's fields stay
    /// separately owned in this model) but is a partial-move error (3021)
    /// when the projected value itself isn't Copy.
    fn consume_value(&mut self, expr: &'ast Expr<'ast>, own: &mut OwnershipChecker<'ast>) {
        match &expr.kind {
            ExprKind::Identifier(name) => {
                if let Some(ty) = expr.get_type() {
                    if !is_copy_type(ty) {
                        own.mark_moved(name, expr.range);
                    }
                }
            }
            ExprKind::Member { receiver, name: field, .. } => self.check_partial_move(receiver, expr, &format!(".{field}")),
            ExprKind::Index { receiver, .. } => self.check_partial_move(receiver, expr, "[]"),
            _ => {}
        }
    }

    fn check_partial_move(&mut self, receiver: &'ast Expr<'ast>, projected: &'ast Expr<'ast>, via: &str) {
        let Some(ty) = projected.get_type() else { return };
        if is_copy_type(ty) {
            return;
        }
        let Some(root) = member_root_identifier(receiver) else { return };
        if self.table.lookup(root).and_then(|s| s.get_type()).is_some_and(|t| !is_copy_type(t)) {
            self.diag.report_range(DiagID::ErrPartialMove, projected.range).arg(root).arg(via).emit();
        }
    }

    fn check_block(&mut self, stmts: &'ast [&'ast Stmt<'ast>], tail: Option<&'ast Expr<'ast>>, own: &mut OwnershipChecker<'ast>) -> &'ast Type<'ast> {
        self.table.push(ScopeKind::Block);
        for stmt in stmts {
            self.check_stmt(stmt, own);
        }
        let ty = match tail {
            Some(e) => self.check_expr(e, own),
            None => self.ctx.get_void(),
        };
        warn_unused_bindings(self.diag, self.table);
        self.table.pop();
        ty
    }

    fn check_stmt(&mut self, stmt: &'ast Stmt<'ast>, own: &mut OwnershipChecker<'ast>) {
        match &stmt.kind {
            StmtKind::Decl(d) => self.check_local_decl(*d, own),
            StmtKind::Expr(e) => {
                self.check_expr(e, own);
            }
            StmtKind::Return(value) => self.check_return(*value, own, stmt.range),
            StmtKind::Defer(e) => {
                self.check_expr(e, own);
            }
        }
    }

    fn check_local_decl(&mut self, decl: &'ast Decl<'ast>, own: &mut OwnershipChecker<'ast>) {
        match decl {
            Decl::Var(v) => self.check_var_decl(v, own),
            Decl::Const(c) => {
                let annotated = c.type_annotation.map(|te| self.resolve_te(te));
                let init_ty = self.check_expr(c.initializer, own);
                let ty = annotated.unwrap_or(init_ty);
                if let Some(a) = annotated {
                    if !self.assignable(init_ty, a) {
                        self.diag
                            .report_range(DiagID::ErrTypeMismatch, c.range)
                            .arg(a.to_string())
                            .arg(init_ty.to_string())
                            .emit();
                    }
                }
                self.consume_value(c.initializer, own);
                let sym = Symbol::with_type(c.name, SymbolKind::Const, ty, c.range);
                if !self.table.insert(sym) {
                    self.diag.report_range(DiagID::ErrRedefinition, c.range).arg(c.name).emit();
                }
            }
            // Nested item declarations (struct/enum/func/trait/impl) are
            // not part of the block-statement grammar this language
            // exposes; only `var`/`const` appear as local statements.
            _ => {}
        }
    }

    fn check_var_decl(&mut self, v: &'ast VarDecl<'ast>, own: &mut OwnershipChecker<'ast>) {
        let annotated = v.type_annotation.map(|te| self.resolve_te(te));
        let init_ty = v.initializer.map(|e| self.check_expr(e, own));
        let ty = match (annotated, init_ty) {
            (Some(a), Some(i)) => {
                if !self.assignable(i, a) {
                    self.diag
                        .report_range(DiagID::ErrTypeMismatch, v.range)
                        .arg(a.to_string())
                        .arg(i.to_string())
                        .emit();
                }
                a
            }
            (Some(a), None) => a,
            (None, Some(i)) => i,
            (None, None) => self.ctx.get_error_placeholder(),
        };
        if let Some(init) = v.initializer {
            self.consume_value(init, own);
        }
        if let Some(pat) = v.destructure {
            self.bind_pattern(pat, ty, v.mutable, own);
        } else {
            let sym = Symbol::with_type(v.name, SymbolKind::Var { mutable: v.mutable }, ty, v.range);
            if !self.table.insert(sym) {
                self.diag.report_range(DiagID::ErrRedefinition, v.range).arg(v.name).emit();
            } else if !is_copy_type(ty) {
                own.bind(v.name);
            }
        }
    }

    /// Binds every identifier a pattern introduces, typing each against
    /// `scrutinee_ty` as precisely as its shape lets us (exact struct
    /// fields and enum variant payloads when the scrutinee type is known;
    /// the scrutinee type itself for a bare identifier/bind pattern).
    fn bind_pattern(&mut self, pat: &'ast Pattern<'ast>, scrutinee_ty: &'ast Type<'ast>, outer_mutable: bool, own: &mut OwnershipChecker<'ast>) {
        pat.ty.set(Some(scrutinee_ty));
        match &pat.kind {
            PatternKind::Wildcard | PatternKind::Rest => {}
            PatternKind::Identifier { name, mutable, type_annotation } => {
                let ty = type_annotation.map(|te| self.resolve_te(te)).unwrap_or(scrutinee_ty);
                let sym = Symbol::with_type(name, SymbolKind::Var { mutable: *mutable || outer_mutable }, ty, pat.range);
                if self.table.insert(sym) && !is_copy_type(ty) {
                    own.bind(name);
                }
            }
            PatternKind::Literal(e) => {
                self.check_expr(e, own);
            }
            PatternKind::Tuple(elems) => match scrutinee_ty {
                Type::Tuple(tys) if tys.len() == elems.len() => {
                    for (sub, ty) in elems.iter().zip(tys.iter()) {
                        self.bind_pattern(sub, ty, outer_mutable, own);
                    }
                }
                _ => {
                    let placeholder = self.ctx.get_error_placeholder();
                    for sub in *elems {
                        self.bind_pattern(sub, placeholder, outer_mutable, own);
                    }
                }
            },
            PatternKind::Struct { fields, .. } => {
                let struct_fields = match scrutinee_ty {
                    Type::Struct { fields, .. } => Some(*fields),
                    _ => None,
                };
                for (name, sub) in fields.iter() {
                    let field_ty = struct_fields
                        .and_then(|fs| fs.iter().find(|f| f.name == *name))
                        .map(|f| f.ty)
                        .unwrap_or_else(|| self.ctx.get_error_placeholder());
                    self.bind_pattern(sub, field_ty, outer_mutable, own);
                }
            }
            PatternKind::EnumVariant { path, payload } => {
                if let Some(pats) = payload {
                    let payload_tys = match scrutinee_ty {
                        Type::Enum { variants, .. } => variants
                            .iter()
                            .find(|v| v.name == variant_name_from_path(path))
                            .and_then(|v| match &v.payload {
                                lumen_ast::EnumPayload::Tuple(tys) => Some(*tys),
                                _ => None,
                            }),
                        _ => None,
                    };
                    for (i, sub) in pats.iter().enumerate() {
                        let ty = payload_tys
                            .and_then(|tys| tys.get(i).copied())
                            .unwrap_or_else(|| self.ctx.get_error_placeholder());
                        self.bind_pattern(sub, ty, outer_mutable, own);
                    }
                }
            }
            PatternKind::Range { low, high, .. } => {
                self.bind_pattern(low, scrutinee_ty, outer_mutable, own);
                self.bind_pattern(high, scrutinee_ty, outer_mutable, own);
            }
            PatternKind::Or(arms) => {
                let mut first_names = Vec::new();
                if let Some(first) = arms.first() {
                    first.bound_names(&mut first_names);
                    self.bind_pattern(first, scrutinee_ty, outer_mutable, own);
                }
                for arm in arms.iter().skip(1) {
                    let mut names = Vec::new();
                    arm.bound_names(&mut names);
                    if names != first_names {
                        self.diag.report_range(DiagID::ErrOrPatternBindingMismatch, arm.range).emit();
                    }
                }
            }
            PatternKind::Bind { name, inner } => {
                let sym = Symbol::with_type(name, SymbolKind::Var { mutable: outer_mutable }, scrutinee_ty, pat.range);
                if self.table.insert(sym) && !is_copy_type(scrutinee_ty) {
                    own.bind(name);
                }
                self.bind_pattern(inner, scrutinee_ty, outer_mutable, own);
            }
        }
    }

    fn check_expr(&mut self, expr: &'ast Expr<'ast>, own: &mut OwnershipChecker<'ast>) -> &'ast Type<'ast> {
        let ty = self.check_expr_kind(expr, own);
        expr.set_type(ty);
        ty
    }

    fn check_expr_kind(&mut self, expr: &'ast Expr<'ast>, own: &mut OwnershipChecker<'ast>) -> &'ast Type<'ast> {
        match &expr.kind {
            ExprKind::IntegerLiteral { suffix, .. } => integer_suffix_type(self.ctx, *suffix),
            ExprKind::FloatLiteral { is_f32, .. } => self.ctx.get_float(if *is_f32 { 32 } else { 64 }),
            ExprKind::BoolLiteral(_) => self.ctx.get_bool(),
            ExprKind::CharLiteral(_) => self.ctx.get_char(),
            ExprKind::StringLiteral(_) => self.ctx.get_string(),
            ExprKind::NoneLiteral => self.ctx.get_none_type(),

            ExprKind::Identifier(name) => self.check_identifier(name, expr.range, own),

            ExprKind::Binary { op, lhs, rhs } => self.check_binary(*op, lhs, rhs, expr.range, own),
            ExprKind::Unary { op, operand } => self.check_unary(*op, operand, expr.range, own),
            ExprKind::Assign { op, target, value } => self.check_assign(*op, target, value, expr.range, own),

            ExprKind::Call { callee, type_args, args } => self.check_call(callee, type_args, args, expr.range, own),
            ExprKind::BuiltinCall { name, args } => self.check_builtin_call(name, args, expr.range, own),

            ExprKind::Member { receiver, name, optional_chain } => self.check_member(receiver, name, *optional_chain, expr.range, own),
            ExprKind::Index { receiver, index } => self.check_index(receiver, index, own),
            ExprKind::Slice { receiver, low, high } => self.check_slice(receiver, *low, *high, own),

            ExprKind::Cast { operand, target } => self.check_cast(operand, target, expr.range, own),

            ExprKind::If { cond, then_branch, else_branch } => self.check_if(cond, then_branch, *else_branch, expr.range, own),
            ExprKind::Match { scrutinee, arms } => self.check_match(scrutinee, arms, expr.range, own),
            ExprKind::Block { stmts, tail } => self.check_block(stmts, *tail, own),
            ExprKind::Loop { label, kind, body } => self.check_loop(*label, kind, body, own),
            ExprKind::Break { value, .. } => self.check_break(*value, own),
            ExprKind::Continue { label } => {
                self.check_loop_control(*label, expr.range);
                self.ctx.get_void()
            }

            ExprKind::Closure { params, return_type, body } => self.check_closure(params, *return_type, body),

            ExprKind::Array(array) => self.check_array(array, own),
            ExprKind::Tuple(elems) => {
                let tys: Vec<_> = elems.iter().map(|e| self.check_expr(e, own)).collect();
                self.ctx.intern_type(Type::Tuple(self.ctx.alloc_slice(tys)))
            }
            ExprKind::StructLiteral { path, fields, base } => self.check_struct_literal(path, fields, *base, expr.range, own),
            ExprKind::Range { low, high, kind } => self.check_range(*low, *high, *kind, own),

            ExprKind::Await(inner) => self.check_await(inner, expr.range, own),
            ExprKind::ErrorPropagate(inner) => self.check_error_propagate(inner, expr.range, own),
            ExprKind::ErrorHandle { operand, err_name, handler } => self.check_error_handle(operand, err_name, handler, expr.range, own),
        }
    }

    fn check_identifier(&mut self, name: &'ast str, range: SourceRange, own: &mut OwnershipChecker<'ast>) -> &'ast Type<'ast> {
        match self.table.lookup(name) {
            Some(sym) => {
                sym.mark_used();
                own.use_var(self.diag, name, range);
                sym.get_type().unwrap_or_else(|| self.ctx.get_error_placeholder())
            }
            None => {
                self.diag.report_range(DiagID::ErrUndeclaredIdentifier, range).arg(name).emit();
                self.ctx.get_error_placeholder()
            }
        }
    }

    fn check_binary(&mut self, op: BinaryOp, lhs: &'ast Expr<'ast>, rhs: &'ast Expr<'ast>, range: SourceRange, own: &mut OwnershipChecker<'ast>) -> &'ast Type<'ast> {
        let lty = self.check_expr(lhs, own);
        let rty = self.check_expr(rhs, own);
        match op {
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
                if self.common_type(lty, rty).is_none() && !self.operator_overload(lty, op) {
                    self.diag.report_range(DiagID::ErrTypeMismatch, range).arg(lty.to_string()).arg(rty.to_string()).emit();
                }
                self.ctx.get_bool()
            }
            BinaryOp::And | BinaryOp::Or => self.ctx.get_bool(),
            _ => match self.common_type(lty, rty) {
                Some(common) => common,
                None if self.operator_overload(lty, op) => lty,
                None => {
                    self.diag.report_range(DiagID::ErrTypeMismatch, range).arg(lty.to_string()).arg(rty.to_string()).emit();
                    self.ctx.get_error_placeholder()
                }
            },
        }
    }

    /// Whether `lty` has a registered `impl` of `op`'s operator trait,
    /// letting a user type opt out of the builtin common-type rule.
    fn operator_overload(&self, lty: &'ast Type<'ast>, op: BinaryOp) -> bool {
        self.ctx.trait_impls.implements(lty, operator_trait_name(op))
    }

    fn check_unary(&mut self, op: UnaryOp, operand: &'ast Expr<'ast>, range: SourceRange, own: &mut OwnershipChecker<'ast>) -> &'ast Type<'ast> {
        let ty = self.check_expr(operand, own);
        match op {
            UnaryOp::Neg => ty,
            UnaryOp::Not => self.ctx.get_bool(),
            UnaryOp::BitNot => ty,
            UnaryOp::Ref => self.ctx.intern_type(Type::Reference { pointee: ty, mutable: false }),
            UnaryOp::RefMut => {
                if !operand.is_lvalue() {
                    self.diag.report_range(DiagID::ErrNonLvalueAssignmentTarget, range).emit();
                } else if let ExprKind::Identifier(name) = operand.kind {
                    if let Some(sym) = self.table.lookup(name) {
                        if !sym.is_mutable() {
                            self.diag.report_range(DiagID::ErrCannotMutRefImmutable, range).emit();
                        }
                    }
                }
                self.ctx.intern_type(Type::Reference { pointee: ty, mutable: true })
            }
            UnaryOp::Deref => match ty {
                Type::Reference { pointee, .. } | Type::Pointer { pointee, .. } => pointee,
                _ => {
                    self.diag.report_range(DiagID::ErrInvalidCast, range).arg(ty.to_string()).arg("<deref>").emit();
                    self.ctx.get_error_placeholder()
                }
            },
        }
    }

    fn check_assign(&mut self, op: Option<BinaryOp>, target: &'ast Expr<'ast>, value: &'ast Expr<'ast>, range: SourceRange, own: &mut OwnershipChecker<'ast>) -> &'ast Type<'ast> {
        if !target.is_lvalue() {
            self.diag.report_range(DiagID::ErrNonLvalueAssignmentTarget, range).emit();
        }
        if let ExprKind::Identifier(name) = target.kind {
            if let Some(sym) = self.table.lookup(name) {
                if sym.is_const() {
                    self.diag.report_range(DiagID::ErrCannotAssignToConst, range).arg(name).emit();
                } else if !sym.is_mutable() && !matches!(sym.kind, SymbolKind::Builtin) {
                    self.diag.report_range(DiagID::ErrCannotAssignToImmutable, range).arg(name).emit();
                }
            }
        }
        let target_ty = self.check_expr(target, own);
        let value_ty = self.check_expr(value, own);
        self.consume_value(value, own);
        if let ExprKind::Identifier(name) = target.kind {
            // Reassignment restores a moved binding to Live.
            own.bind(name);
        }
        let effective_value_ty = match op {
            None => value_ty,
            Some(_) => self.common_type(target_ty, value_ty).unwrap_or(value_ty),
        };
        if !self.assignable(effective_value_ty, target_ty) {
            self.diag
                .report_range(DiagID::ErrTypeMismatch, range)
                .arg(target_ty.to_string())
                .arg(value_ty.to_string())
                .emit();
        }
        self.ctx.get_void()
    }

    fn check_call(&mut self, callee: &'ast Expr<'ast>, type_args: &'ast [&'ast lumen_ast::TypeExpr<'ast>], args: &'ast [CallArg<'ast>], range: SourceRange, own: &mut OwnershipChecker<'ast>) -> &'ast Type<'ast> {
        let _ = type_args; // generics are resolved arity-only here, mirroring impl indexing's trait-completeness check.
        if let ExprKind::Member { receiver, name, optional_chain } = callee.kind {
            return self.check_method_call(receiver, name, optional_chain, args, range, own);
        }

        if matches!(callee.kind, ExprKind::Identifier("drop")) && self.table.lookup("drop").is_none() {
            return self.check_explicit_drop(args, range, own);
        }

        if let ExprKind::Identifier(name) = callee.kind {
            if let Some(sym) = self.table.lookup(name) {
                if let SymbolKind::Func(func) = sym.kind {
                    sym.mark_used();
                    return self.check_known_call(func, args, range, own);
                }
            }
        }

        let callee_ty = self.check_expr(callee, own);
        match callee_ty {
            Type::Function { params, ret, .. } => {
                self.check_call_args_against(params, args, range, own);
                ret
            }
            _ => {
                for arg in args {
                    self.check_expr(arg.value, own);
                }
                self.ctx.get_error_placeholder()
            }
        }
    }

    /// `drop(x)` is not a user-declared function; it's a pseudo-builtin
    /// call form forbidden on a receiver whose type has its own
    /// `drop(&mut self)` impl, since that drop already runs automatically
    /// when the binding goes out of scope (err 3020). On any other
    /// receiver type it's accepted as an ordinary move-and-discard.
    fn check_explicit_drop(&mut self, args: &'ast [CallArg<'ast>], range: SourceRange, own: &mut OwnershipChecker<'ast>) -> &'ast Type<'ast> {
        if args.len() != 1 {
            self.diag
                .report_range(DiagID::ErrWrongArgumentCount, range)
                .arg("drop")
                .arg("1")
                .arg(args.len().to_string())
                .emit();
            for arg in args {
                self.check_expr(arg.value, own);
            }
            return self.ctx.get_void();
        }
        let arg = &args[0];
        let arg_ty = self.check_expr(arg.value, own);
        let unwrapped = Type::unwrap_aliases(arg_ty);
        if self.ctx.methods.lookup(unwrapped, "drop").is_some() {
            self.diag.report_range(DiagID::ErrExplicitDropForbidden, range).arg(arg_ty.to_string()).emit();
        } else {
            self.consume_value(arg.value, own);
        }
        self.ctx.get_void()
    }

    fn check_known_call(&mut self, func: &'ast FuncDecl<'ast>, args: &'ast [CallArg<'ast>], range: SourceRange, own: &mut OwnershipChecker<'ast>) -> &'ast Type<'ast> {
        let non_variadic = if func.is_variadic() { func.params.len() - 1 } else { func.params.len() };
        if func.is_variadic() {
            if args.len() < non_variadic {
                self.diag
                    .report_range(DiagID::ErrWrongArgumentCount, range)
                    .arg(func.name)
                    .arg(func.params.len().to_string())
                    .arg(args.len().to_string())
                    .emit();
            }
        } else if args.len() != func.params.len() {
            self.diag
                .report_range(DiagID::ErrWrongArgumentCount, range)
                .arg(func.name)
                .arg(func.params.len().to_string())
                .arg(args.len().to_string())
                .emit();
        }

        for (i, arg) in args.iter().enumerate() {
            let arg_ty = self.check_expr(arg.value, own);
            self.consume_value(arg.value, own);
            if let Some(param) = func.params.get(i.min(non_variadic.saturating_sub(1).max(i))).filter(|_| i < non_variadic) {
                if let Some(annotation) = param.type_annotation {
                    let expected = self.resolve_te(annotation);
                    if !arg.is_spread && !self.assignable(arg_ty, expected) {
                        self.diag
                            .report_range(DiagID::ErrTypeMismatch, arg.value.range)
                            .arg(expected.to_string())
                            .arg(arg_ty.to_string())
                            .emit();
                    }
                }
            }
        }

        match func.return_type {
            Some(rt) => self.resolve_te(rt),
            None => self.ctx.get_void(),
        }
    }

    fn check_call_args_against(&mut self, params: &'ast [&'ast Type<'ast>], args: &'ast [CallArg<'ast>], range: SourceRange, own: &mut OwnershipChecker<'ast>) {
        if args.len() != params.len() {
            self.diag
                .report_range(DiagID::ErrWrongArgumentCount, range)
                .arg("<closure>")
                .arg(params.len().to_string())
                .arg(args.len().to_string())
                .emit();
        }
        for (i, arg) in args.iter().enumerate() {
            let arg_ty = self.check_expr(arg.value, own);
            self.consume_value(arg.value, own);
            if let Some(expected) = params.get(i) {
                if !self.assignable(arg_ty, expected) {
                    self.diag
                        .report_range(DiagID::ErrTypeMismatch, arg.value.range)
                        .arg(expected.to_string())
                        .arg(arg_ty.to_string())
                        .emit();
                }
            }
        }
    }

    fn check_method_call(&mut self, receiver: &'ast Expr<'ast>, name: &'ast str, optional_chain: bool, args: &'ast [CallArg<'ast>], range: SourceRange, own: &mut OwnershipChecker<'ast>) -> &'ast Type<'ast> {
        let receiver_ty = self.check_expr(receiver, own);
        let unwrapped = Type::unwrap_aliases(receiver_ty);
        let method = self.lookup_method(unwrapped, name);

        match method {
            Some(func) => {
                match func.params.first().map(|p| p.kind) {
                    Some(ParamKind::SelfValue) => self.consume_value(receiver, own),
                    _ => {}
                }
                let rest = &args[..];
                let declared = func.params.iter().skip(1).collect::<Vec<_>>();
                if declared.len() != rest.len() && !func.is_variadic() {
                    self.diag
                        .report_range(DiagID::ErrWrongArgumentCount, range)
                        .arg(func.name)
                        .arg(declared.len().to_string())
                        .arg(rest.len().to_string())
                        .emit();
                }
                for (i, arg) in rest.iter().enumerate() {
                    let arg_ty = self.check_expr(arg.value, own);
                    self.consume_value(arg.value, own);
                    if let Some(param) = declared.get(i) {
                        if let Some(annotation) = param.type_annotation {
                            let expected = self.resolve_te(annotation);
                            if !arg.is_spread && !self.assignable(arg_ty, expected) {
                                self.diag
                                    .report_range(DiagID::ErrTypeMismatch, arg.value.range)
                                    .arg(expected.to_string())
                                    .arg(arg_ty.to_string())
                                    .emit();
                            }
                        }
                    }
                }
                let ret = match func.return_type {
                    Some(rt) => self.resolve_te(rt),
                    None => self.ctx.get_void(),
                };
                if optional_chain {
                    self.ctx.get_optional(ret)
                } else {
                    ret
                }
            }
            None => {
                self.diag.report_range(DiagID::ErrUnknownMember, range).arg(name).arg(unwrapped.to_string()).emit();
                for arg in args {
                    self.check_expr(arg.value, own);
                }
                self.ctx.get_error_placeholder()
            }
        }
    }

    /// Method lookup order: the impl-method registry for the receiver's
    /// own type, then (only while checking a trait's own default bodies)
    /// the sibling default methods of that same trait, for `self.other()`
    /// calls inside one default implementation.
    fn lookup_method(&self, ty: &'ast Type<'ast>, name: &str) -> Option<&'ast FuncDecl<'ast>> {
        self.ctx.methods.lookup(ty, name).or_else(|| {
            self.self_methods.and_then(|methods| methods.iter().copied().find(|m| m.name == name && m.body.is_some()))
        })
    }

    fn check_builtin_call(&mut self, name: &'ast str, args: &'ast [CallArg<'ast>], range: SourceRange, own: &mut OwnershipChecker<'ast>) -> &'ast Type<'ast> {
        for arg in args {
            self.check_expr(arg.value, own);
        }
        match BUILTIN_ARITY.iter().find(|(n, _)| *n == name) {
            Some((_, arity)) if *arity != args.len() => {
                self.diag
                    .report_range(DiagID::ErrWrongBuiltinArgumentCount, range)
                    .arg(name)
                    .arg(arity.to_string())
                    .arg(args.len().to_string())
                    .emit();
                self.ctx.get_error_placeholder()
            }
            Some(("sizeof", _)) => self.ctx.get_usize(),
            Some(("typeof", _)) => self.ctx.get_string(),
            Some(("unreachable", _)) | Some(("panic", _)) => self.ctx.get_void(),
            _ => self.ctx.get_error_placeholder(),
        }
    }

    fn check_member(&mut self, receiver: &'ast Expr<'ast>, name: &'ast str, optional_chain: bool, range: SourceRange, own: &mut OwnershipChecker<'ast>) -> &'ast Type<'ast> {
        let receiver_ty = self.check_expr(receiver, own);
        let unwrapped = Type::unwrap_aliases(receiver_ty);

        let field_ty = match unwrapped {
            Type::Struct { fields, .. } => fields.iter().find(|f| f.name == name).map(|f| f.ty),
            _ => None,
        };

        // Bare member access naming a method (not calling it) yields a
        // function value; its parameter types aren't resolved here since
        // nothing downstream of a bare reference needs them.
        let resolved = field_ty.or_else(|| {
            self.lookup_method(unwrapped, name).map(|_| {
                self.ctx.intern_type(Type::Function { params: &[], ret: self.ctx.get_void(), variadic: false })
            })
        });

        match resolved {
            Some(ty) => {
                if optional_chain {
                    self.ctx.get_optional(ty)
                } else {
                    ty
                }
            }
            None => {
                self.diag.report_range(DiagID::ErrUnknownMember, range).arg(name).arg(unwrapped.to_string()).emit();
                self.ctx.get_error_placeholder()
            }
        }
    }

    fn check_index(&mut self, receiver: &'ast Expr<'ast>, index: &'ast Expr<'ast>, own: &mut OwnershipChecker<'ast>) -> &'ast Type<'ast> {
        let receiver_ty = self.check_expr(receiver, own);
        self.check_expr(index, own);
        match Type::unwrap_aliases(receiver_ty) {
            Type::Array { element, .. } | Type::Slice { element, .. } => element,
            _ => self.ctx.get_error_placeholder(),
        }
    }

    fn check_slice(&mut self, receiver: &'ast Expr<'ast>, low: Option<&'ast Expr<'ast>>, high: Option<&'ast Expr<'ast>>, own: &mut OwnershipChecker<'ast>) -> &'ast Type<'ast> {
        let receiver_ty = self.check_expr(receiver, own);
        if let Some(l) = low {
            self.check_expr(l, own);
        }
        if let Some(h) = high {
            self.check_expr(h, own);
        }
        match Type::unwrap_aliases(receiver_ty) {
            Type::Array { element, .. } => self.ctx.intern_type(Type::Slice { element, mutable: false }),
            Type::Slice { element, mutable } => self.ctx.intern_type(Type::Slice { element, mutable: *mutable }),
            _ => self.ctx.get_error_placeholder(),
        }
    }

    fn check_cast(&mut self, operand: &'ast Expr<'ast>, target: &'ast lumen_ast::TypeExpr<'ast>, range: SourceRange, own: &mut OwnershipChecker<'ast>) -> &'ast Type<'ast> {
        let from = self.check_expr(operand, own);
        let to = self.resolve_te(target);
        let legal = (from.is_numeric() && to.is_numeric())
            || matches!((from, to), (Type::Pointer { .. }, Type::Pointer { .. }))
            || matches!((from, to), (Type::Reference { .. }, Type::Pointer { .. }));
        if !legal {
            self.diag.report_range(DiagID::ErrInvalidCast, range).arg(from.to_string()).arg(to.to_string()).emit();
        }
        to
    }

    fn check_if(&mut self, cond: &'ast Expr<'ast>, then_branch: &'ast Expr<'ast>, else_branch: Option<&'ast Expr<'ast>>, range: SourceRange, own: &mut OwnershipChecker<'ast>) -> &'ast Type<'ast> {
        self.check_expr(cond, own);

        let entry = own.snapshot();
        let then_ty = self.check_expr(then_branch, own);
        let then_state = own.snapshot();

        match else_branch {
            Some(else_expr) => {
                own.restore(entry);
                let else_ty = self.check_expr(else_expr, own);
                let else_state = own.snapshot();
                own.join_two(then_state, else_state);

                match self.common_type(then_ty, else_ty) {
                    Some(common) => common,
                    None => {
                        self.diag
                            .report_range(DiagID::ErrTypeMismatch, range)
                            .arg(then_ty.to_string())
                            .arg(else_ty.to_string())
                            .emit();
                        self.ctx.get_error_placeholder()
                    }
                }
            }
            None => {
                let entry_state = entry.snapshot();
                own.restore(entry);
                own.join_two(then_state, entry_state);
                self.ctx.get_void()
            }
        }
    }

    fn check_match(&mut self, scrutinee: &'ast Expr<'ast>, arms: &'ast [MatchArm<'ast>], range: SourceRange, own: &mut OwnershipChecker<'ast>) -> &'ast Type<'ast> {
        let scrutinee_ty = self.check_expr(scrutinee, own);
        self.consume_value(scrutinee, own);

        let entry = own.snapshot();
        let mut arm_results = Vec::new();
        let mut arm_tys = Vec::new();
        for arm in arms {
            own.restore(entry.snapshot());
            self.table.push(ScopeKind::Block);
            self.bind_pattern(arm.pattern, scrutinee_ty, false, own);
            if let Some(guard) = arm.guard {
                self.check_expr(guard, own);
            }
            let ty = self.check_expr(arm.body, own);
            warn_unused_bindings(self.diag, self.table);
            self.table.pop();
            arm_tys.push(ty);
            arm_results.push(own.snapshot());
        }
        own.join_many(arm_results);

        if let Some(missing) = self.missing_match_case(scrutinee_ty, arms) {
            self.diag.report_range(DiagID::ErrNonExhaustiveMatch, range).arg(missing).emit();
        }

        arm_tys.into_iter().reduce(|acc, ty| self.common_type(acc, ty).unwrap_or(acc)).unwrap_or_else(|| self.ctx.get_void())
    }

    /// Structural exhaustiveness check for enums and booleans (§ missing
    /// cases). Any other scrutinee type is accepted without a structural
    /// check, and a catch-all pattern anywhere always satisfies it.
    fn missing_match_case(&self, scrutinee_ty: &'ast Type<'ast>, arms: &'ast [MatchArm<'ast>]) -> Option<String> {
        if arms.iter().any(|a| a.guard.is_none() && matches!(a.pattern.kind, PatternKind::Wildcard | PatternKind::Identifier { .. } | PatternKind::Bind { .. })) {
            return None;
        }
        match Type::unwrap_aliases(scrutinee_ty) {
            Type::Bool => {
                let mut seen_true = false;
                let mut seen_false = false;
                for a in arms {
                    for leaf in pattern_leaves(a.pattern) {
                        if let PatternKind::Literal(e) = &leaf.kind {
                            if let ExprKind::BoolLiteral(b) = e.kind {
                                if b {
                                    seen_true = true
                                } else {
                                    seen_false = true
                                }
                            }
                        }
                    }
                }
                if !seen_true {
                    Some("true".to_string())
                } else if !seen_false {
                    Some("false".to_string())
                } else {
                    None
                }
            }
            Type::Enum { variants, .. } => {
                let mut seen = HashSet::new();
                for a in arms {
                    for leaf in pattern_leaves(a.pattern) {
                        if let PatternKind::EnumVariant { path, .. } = &leaf.kind {
                            seen.insert(variant_name_from_path(path));
                        }
                    }
                }
                variants.iter().find(|v| !seen.contains(v.name)).map(|v| v.name.to_string())
            }
            _ => None,
        }
    }

    fn check_loop(&mut self, label: Option<&'ast str>, kind: &'ast LoopKind<'ast>, body: &'ast Expr<'ast>, own: &mut OwnershipChecker<'ast>) -> &'ast Type<'ast> {
        match kind {
            LoopKind::Infinite => {}
            LoopKind::While(cond) => {
                self.check_expr(cond, own);
            }
            LoopKind::For { pattern: _, iterable } => {
                self.check_expr(iterable, own);
            }
        }

        self.table.push(ScopeKind::Loop { label });
        if let LoopKind::For { pattern, iterable } = kind {
            let elem_ty = match Type::unwrap_aliases(self.check_expr(iterable, own)) {
                Type::Array { element, .. } | Type::Slice { element, .. } | Type::Range { element } => *element,
                _ => self.ctx.get_error_placeholder(),
            };
            self.bind_pattern(pattern, elem_ty, false, own);
        }

        // One-pass fixed-point approximation: run the body once from the
        // pre-loop state and join that against entry, rather than
        // iterating to a true fixed point. A binding moved on some but not
        // every pass through a real loop is rightly flagged MaybeMoved on
        // the second iteration; this captures that without modeling
        // iteration count.
        let entry = own.snapshot();
        self.check_expr(body, own);
        let after_one_pass = own.snapshot();
        own.restore(entry.snapshot());
        own.join_two(entry, after_one_pass);
        warn_unused_bindings(self.diag, self.table);
        self.table.pop();

        self.ctx.get_void()
    }

    fn check_break(&mut self, value: Option<&'ast Expr<'ast>>, own: &mut OwnershipChecker<'ast>) -> &'ast Type<'ast> {
        if !self.table.in_loop() {
            self.diag.report_range(DiagID::ErrBreakOutsideLoop, SourceRange::default()).emit();
        }
        match value {
            Some(e) => self.check_expr(e, own),
            None => self.ctx.get_void(),
        }
    }

    fn check_loop_control(&mut self, label: Option<&'ast str>, range: SourceRange) {
        match label {
            Some(l) => {
                if !self.table.resolve_label(l) {
                    self.diag.report_range(DiagID::ErrUnknownLabel, range).arg(l).emit();
                }
            }
            None => {
                if !self.table.in_loop() {
                    self.diag.report_range(DiagID::ErrContinueOutsideLoop, range).emit();
                }
            }
        }
    }

    fn check_closure(&mut self, params: &'ast [&'ast lumen_ast::ParamDecl<'ast>], return_type: Option<&'ast lumen_ast::TypeExpr<'ast>>, body: &'ast Expr<'ast>) -> &'ast Type<'ast> {
        self.table.push(ScopeKind::Function);
        let mut own = OwnershipChecker::new();
        let mut param_tys = Vec::new();
        for param in params {
            let ty = param.type_annotation.map(|te| self.resolve_te(te)).unwrap_or_else(|| self.ctx.fresh_type_var());
            param_tys.push(ty);
            let sym = Symbol::with_type(param.name, SymbolKind::Param { mutable: param.mutable }, ty, param.range);
            if self.table.insert(sym) && !is_copy_type(ty) {
                own.bind(param.name);
            }
        }
        let body_ty = self.check_expr(body, &mut own);
        let ret = match return_type {
            Some(rt) => self.resolve_te(rt),
            None => body_ty,
        };
        warn_unused_bindings(self.diag, self.table);
        self.table.pop();
        self.ctx.intern_type(Type::Function { params: self.ctx.alloc_slice(param_tys), ret, variadic: false })
    }

    fn check_array(&mut self, array: &'ast ArrayExpr<'ast>, own: &mut OwnershipChecker<'ast>) -> &'ast Type<'ast> {
        match array {
            ArrayExpr::List(elems) => {
                let tys: Vec<_> = elems.iter().map(|e| self.check_expr(e, own)).collect();
                let element = tys.into_iter().reduce(|acc, ty| self.common_type(acc, ty).unwrap_or(acc)).unwrap_or_else(|| self.ctx.get_error_placeholder());
                self.ctx.intern_type(Type::Array { element, length: elems.len() as u64 })
            }
            ArrayExpr::Repeat { value, count } => {
                let element = self.check_expr(value, own);
                self.check_expr(count, own);
                self.ctx.intern_type(Type::Array { element, length: 0 })
            }
        }
    }

    fn check_struct_literal(&mut self, path: &'ast str, fields: &'ast [lumen_ast::StructLiteralField<'ast>], base: Option<&'ast Expr<'ast>>, range: SourceRange, own: &mut OwnershipChecker<'ast>) -> &'ast Type<'ast> {
        let ty = match self.table.lookup(path).and_then(|sym| sym.get_type()) {
            Some(ty) => ty,
            None => {
                self.diag.report_range(DiagID::ErrUndeclaredType, range).arg(path).emit();
                self.ctx.get_error_placeholder()
            }
        };

        let struct_fields = match ty {
            Type::Struct { fields, .. } => Some(*fields),
            _ => None,
        };

        for field in fields {
            let value_ty = self.check_expr(field.value, own);
            self.consume_value(field.value, own);
            if let Some(expected) = struct_fields.and_then(|fs| fs.iter().find(|f| f.name == field.name)).map(|f| f.ty) {
                if !self.assignable(value_ty, expected) {
                    self.diag
                        .report_range(DiagID::ErrTypeMismatch, field.value.range)
                        .arg(expected.to_string())
                        .arg(value_ty.to_string())
                        .emit();
                }
            } else {
                self.diag.report_range(DiagID::ErrUnknownMember, field.value.range).arg(field.name).arg(ty.to_string()).emit();
            }
        }

        if let Some(b) = base {
            self.check_expr(b, own);
        }

        ty
    }

    fn check_range(&mut self, low: Option<&'ast Expr<'ast>>, high: Option<&'ast Expr<'ast>>, _kind: RangeKind, own: &mut OwnershipChecker<'ast>) -> &'ast Type<'ast> {
        let element = low
            .map(|e| self.check_expr(e, own))
            .or_else(|| high.map(|e| self.check_expr(e, own)))
            .unwrap_or_else(|| self.ctx.get_isize());
        if let (Some(l), Some(h)) = (low, high) {
            self.check_expr(h, own);
            let _ = l;
        }
        self.ctx.intern_type(Type::Range { element })
    }

    fn check_await(&mut self, inner: &'ast Expr<'ast>, range: SourceRange, own: &mut OwnershipChecker<'ast>) -> &'ast Type<'ast> {
        if !self.current_func.is_async {
            self.diag.report_range(DiagID::ErrAwaitOutsideAsync, range).emit();
        }
        self.check_expr(inner, own)
    }

    fn check_error_propagate(&mut self, inner: &'ast Expr<'ast>, range: SourceRange, own: &mut OwnershipChecker<'ast>) -> &'ast Type<'ast> {
        let inner_ty = self.check_expr(inner, own);
        if !self.current_func.is_error_returning {
            self.diag.report_range(DiagID::ErrErrorPropagationInvalid, range).arg(self.current_func.name).emit();
        }
        match inner_ty {
            Type::Error { success } => success,
            _ => {
                self.diag.report_range(DiagID::ErrTypeMismatch, range).arg("!T").arg(inner_ty.to_string()).emit();
                self.ctx.get_error_placeholder()
            }
        }
    }

    fn check_error_handle(&mut self, operand: &'ast Expr<'ast>, err_name: &'ast str, handler: &'ast Expr<'ast>, range: SourceRange, own: &mut OwnershipChecker<'ast>) -> &'ast Type<'ast> {
        let operand_ty = self.check_expr(operand, own);
        let success_ty = match operand_ty {
            Type::Error { success } => *success,
            _ => {
                self.diag.report_range(DiagID::ErrTypeMismatch, range).arg("!T").arg(operand_ty.to_string()).emit();
                self.ctx.get_error_placeholder()
            }
        };

        self.table.push(ScopeKind::Block);
        let err_sym = Symbol::with_type(err_name, SymbolKind::Var { mutable: false }, self.ctx.get_error_placeholder(), range);
        self.table.insert(err_sym);
        let handler_ty = self.check_expr(handler, own);
        warn_unused_bindings(self.diag, self.table);
        self.table.pop();

        self.common_type(success_ty, handler_ty).unwrap_or(success_ty)
    }
}

fn variant_name_from_path(path: &str) -> &str {
    path.rsplit('.').next().unwrap_or(path)
}

/// Unwraps `Or` and `Bind` wrappers down to the leaf patterns they
/// actually cover, for exhaustiveness collection: `C.A | C.B` contributes
/// two leaves, `x @ C.A` contributes the same leaf as a bare `C.A`.
fn pattern_leaves<'ast>(pattern: &'ast Pattern<'ast>) -> Vec<&'ast Pattern<'ast>> {
    match &pattern.kind {
        PatternKind::Or(alts) => alts.iter().flat_map(|p| pattern_leaves(p)).collect(),
        PatternKind::Bind { inner, .. } => pattern_leaves(inner),
        _ => vec![pattern],
    }
}

/// Walks down a chain of member/index projections to the identifier they
/// are ultimately rooted in, or `None` for a projection off a temporary
/// (a call result, a literal) that partial-move tracking doesn't apply to.
fn member_root_identifier<'ast>(expr: &'ast Expr<'ast>) -> Option<&'ast str> {
    match &expr.kind {
        ExprKind::Identifier(name) => Some(name),
        ExprKind::Member { receiver, .. } => member_root_identifier(receiver),
        ExprKind::Index { receiver, .. } => member_root_identifier(receiver),
        _ => None,
    }
}

fn integer_suffix_type<'ast>(ctx: &'ast AstContext<'ast>, suffix: lumen_ast::IntegerSuffix) -> &'ast Type<'ast> {
    use lumen_ast::IntegerSuffix::*;
    use lumen_ast::Signedness::*;
    match suffix {
        None => ctx.get_integer(32, Signed),
        I8 => ctx.get_integer(8, Signed),
        I16 => ctx.get_integer(16, Signed),
        I32 => ctx.get_integer(32, Signed),
        I64 => ctx.get_integer(64, Signed),
        I128 => ctx.get_integer(128, Signed),
        Isize => ctx.get_isize(),
        U8 => ctx.get_integer(8, Unsigned),
        U16 => ctx.get_integer(16, Unsigned),
        U32 => ctx.get_integer(32, Unsigned),
        U64 => ctx.get_integer(64, Unsigned),
        U128 => ctx.get_integer(128, Unsigned),
        Usize => ctx.get_usize(),
    }
}

fn operator_trait_name(op: BinaryOp) -> &'static str {
    op.trait_method_name()
}
