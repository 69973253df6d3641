//! Stable, golden-file-comparable tree dump of an AST (§6 "AST dump").
//!
//! Each node prints as `Kind(attr1=val1, attr2=val2)` followed by indented
//! children keyed by an edge label (`lhs`, `field[0]`, `branch.cond`, …).

use crate::decl::*;
use crate::expr::*;
use crate::pattern::{Pattern, PatternKind};
use crate::stmt::{Stmt, StmtKind};
use crate::type_expr::{TypeExpr, TypeExprKind};
use std::fmt::Write;

pub struct Dumper {
    out: String,
    indent: usize,
}

impl Dumper {
    pub fn new() -> Self {
        Dumper { out: String::new(), indent: 0 }
    }

    pub fn finish(self) -> String {
        self.out
    }

    fn line(&mut self, edge: &str, text: &str) {
        for _ in 0..self.indent {
            self.out.push_str("  ");
        }
        if !edge.is_empty() {
            let _ = write!(self.out, "{edge}: ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn child<F: FnOnce(&mut Self)>(&mut self, f: F) {
        self.indent += 1;
        f(self);
        self.indent -= 1;
    }

    pub fn dump_unit(&mut self, unit: &CompilationUnit<'_>) {
        self.line("", "CompilationUnit");
        self.child(|d| {
            for (i, decl) in unit.decls.iter().enumerate() {
                d.dump_decl(&format!("decl[{i}]"), decl);
            }
        });
    }

    pub fn dump_decl(&mut self, edge: &str, decl: &Decl<'_>) {
        match decl {
            Decl::Var(v) => {
                self.line(
                    edge,
                    &format!("VarDecl(name={}, mutable={}, visibility={:?})", v.name, v.mutable, v.visibility),
                );
                self.child(|d| {
                    if let Some(init) = v.initializer {
                        d.dump_expr("init", init);
                    }
                });
            }
            Decl::Const(c) => {
                self.line(edge, &format!("ConstDecl(name={})", c.name));
                self.child(|d| d.dump_expr("init", c.initializer));
            }
            Decl::Func(f) => {
                self.line(
                    edge,
                    &format!(
                        "FuncDecl(name={}, async={}, error_returning={}, params={})",
                        f.name,
                        f.is_async,
                        f.is_error_returning,
                        f.params.len()
                    ),
                );
                self.child(|d| {
                    for (i, p) in f.params.iter().enumerate() {
                        d.line(&format!("param[{i}]"), &format!("{}({:?})", p.name, p.kind));
                    }
                    if let Some(body) = f.body {
                        d.dump_expr("body", body);
                    }
                });
            }
            Decl::Struct(s) => {
                self.line(edge, &format!("StructDecl(name={}, fields={})", s.name, s.fields.len()));
                self.child(|d| {
                    for field in s.fields {
                        d.line("field", field.name);
                    }
                });
            }
            Decl::Enum(e) => {
                self.line(edge, &format!("EnumDecl(name={}, variants={})", e.name, e.variants.len()));
                self.child(|d| {
                    for v in e.variants {
                        d.line("variant", v.name);
                    }
                });
            }
            Decl::TypeAlias(t) => {
                self.line(edge, &format!("TypeAliasDecl(name={})", t.name));
            }
            Decl::Trait(t) => {
                self.line(edge, &format!("TraitDecl(name={}, methods={})", t.name, t.methods.len()));
            }
            Decl::Impl(i) => {
                self.line(edge, &format!("ImplDecl(trait={:?}, methods={})", i.trait_name, i.methods.len()));
            }
        }
    }

    pub fn dump_stmt(&mut self, edge: &str, stmt: &Stmt<'_>) {
        match &stmt.kind {
            StmtKind::Decl(d) => self.dump_decl(edge, d),
            StmtKind::Expr(e) => self.dump_expr(edge, e),
            StmtKind::Return(e) => {
                self.line(edge, "Return");
                if let Some(e) = e {
                    self.child(|d| d.dump_expr("value", e));
                }
            }
            StmtKind::Defer(e) => {
                self.line(edge, "Defer");
                self.child(|d| d.dump_expr("body", e));
            }
        }
    }

    pub fn dump_expr(&mut self, edge: &str, expr: &Expr<'_>) {
        match &expr.kind {
            ExprKind::IntegerLiteral { value, suffix } => {
                self.line(edge, &format!("IntegerLiteral(value={value}, suffix={suffix:?})"));
            }
            ExprKind::FloatLiteral { value, is_f32 } => {
                self.line(edge, &format!("FloatLiteral(value={value}, f32={is_f32})"));
            }
            ExprKind::BoolLiteral(v) => self.line(edge, &format!("BoolLiteral({v})")),
            ExprKind::CharLiteral(c) => self.line(edge, &format!("CharLiteral({c:?})")),
            ExprKind::StringLiteral(s) => self.line(edge, &format!("StringLiteral({s:?})")),
            ExprKind::NoneLiteral => self.line(edge, "NoneLiteral"),
            ExprKind::Identifier(name) => self.line(edge, &format!("Identifier({name})")),
            ExprKind::Binary { op, lhs, rhs } => {
                self.line(edge, &format!("Binary(op={})", op.spelling()));
                self.child(|d| {
                    d.dump_expr("lhs", lhs);
                    d.dump_expr("rhs", rhs);
                });
            }
            ExprKind::Unary { op, operand } => {
                self.line(edge, &format!("Unary(op={})", op.spelling()));
                self.child(|d| d.dump_expr("operand", operand));
            }
            ExprKind::Assign { op, target, value } => {
                let spelling = op.map(|o| o.spelling()).unwrap_or("=");
                self.line(edge, &format!("Assign(op={spelling})"));
                self.child(|d| {
                    d.dump_expr("target", target);
                    d.dump_expr("value", value);
                });
            }
            ExprKind::Call { callee, args, type_args } => {
                self.line(edge, &format!("Call(args={}, type_args={})", args.len(), type_args.len()));
                self.child(|d| {
                    d.dump_expr("callee", callee);
                    for (i, a) in args.iter().enumerate() {
                        d.dump_expr(&format!("arg[{i}]{}", if a.is_spread { "..." } else { "" }), a.value);
                    }
                });
            }
            ExprKind::BuiltinCall { name, args } => {
                self.line(edge, &format!("BuiltinCall(name=@{name}, args={})", args.len()));
                self.child(|d| {
                    for (i, a) in args.iter().enumerate() {
                        d.dump_expr(&format!("arg[{i}]"), a.value);
                    }
                });
            }
            ExprKind::Member { receiver, name, optional_chain } => {
                self.line(edge, &format!("Member(name={name}, optional_chain={optional_chain})"));
                self.child(|d| d.dump_expr("receiver", receiver));
            }
            ExprKind::Index { receiver, index } => {
                self.line(edge, "Index");
                self.child(|d| {
                    d.dump_expr("receiver", receiver);
                    d.dump_expr("index", index);
                });
            }
            ExprKind::Slice { receiver, low, high } => {
                self.line(edge, "Slice");
                self.child(|d| {
                    d.dump_expr("receiver", receiver);
                    if let Some(low) = low {
                        d.dump_expr("low", low);
                    }
                    if let Some(high) = high {
                        d.dump_expr("high", high);
                    }
                });
            }
            ExprKind::Cast { operand, .. } => {
                self.line(edge, "Cast");
                self.child(|d| d.dump_expr("operand", operand));
            }
            ExprKind::If { cond, then_branch, else_branch } => {
                self.line(edge, "If");
                self.child(|d| {
                    d.dump_expr("cond", cond);
                    d.dump_expr("then", then_branch);
                    if let Some(e) = else_branch {
                        d.dump_expr("else", e);
                    }
                });
            }
            ExprKind::Match { scrutinee, arms } => {
                self.line(edge, &format!("Match(arms={})", arms.len()));
                self.child(|d| {
                    d.dump_expr("scrutinee", scrutinee);
                    for (i, arm) in arms.iter().enumerate() {
                        d.dump_pattern(&format!("arm[{i}].pattern"), arm.pattern);
                        d.dump_expr(&format!("arm[{i}].body"), arm.body);
                    }
                });
            }
            ExprKind::Block { stmts, tail } => {
                self.line(edge, &format!("Block(stmts={})", stmts.len()));
                self.child(|d| {
                    for (i, s) in stmts.iter().enumerate() {
                        d.dump_stmt(&format!("stmt[{i}]"), s);
                    }
                    if let Some(tail) = tail {
                        d.dump_expr("tail", tail);
                    }
                });
            }
            ExprKind::Loop { label, kind, body } => {
                self.line(edge, &format!("Loop(label={label:?})"));
                self.child(|d| {
                    match kind {
                        LoopKind::While(cond) => d.dump_expr("cond", cond),
                        LoopKind::For { pattern, iterable } => {
                            d.dump_pattern("pattern", pattern);
                            d.dump_expr("iterable", iterable);
                        }
                        LoopKind::Infinite => {}
                    }
                    d.dump_expr("body", body);
                });
            }
            ExprKind::Break { label, value } => {
                self.line(edge, &format!("Break(label={label:?})"));
                if let Some(v) = value {
                    self.child(|d| d.dump_expr("value", v));
                }
            }
            ExprKind::Continue { label } => self.line(edge, &format!("Continue(label={label:?})")),
            ExprKind::Closure { params, body, .. } => {
                self.line(edge, &format!("Closure(params={})", params.len()));
                self.child(|d| d.dump_expr("body", body));
            }
            ExprKind::Array(arr) => match arr {
                ArrayExpr::List(elems) => {
                    self.line(edge, &format!("ArrayList(len={})", elems.len()));
                    self.child(|d| {
                        for (i, e) in elems.iter().enumerate() {
                            d.dump_expr(&format!("elem[{i}]"), e);
                        }
                    });
                }
                ArrayExpr::Repeat { value, count } => {
                    self.line(edge, "ArrayRepeat");
                    self.child(|d| {
                        d.dump_expr("value", value);
                        d.dump_expr("count", count);
                    });
                }
            },
            ExprKind::Tuple(elems) => {
                self.line(edge, &format!("Tuple(len={})", elems.len()));
                self.child(|d| {
                    for (i, e) in elems.iter().enumerate() {
                        d.dump_expr(&format!("elem[{i}]"), e);
                    }
                });
            }
            ExprKind::StructLiteral { path, fields, base } => {
                self.line(edge, &format!("StructLiteral(path={path}, fields={})", fields.len()));
                self.child(|d| {
                    for f in fields.iter() {
                        d.dump_expr(&format!("field[{}]", f.name), f.value);
                    }
                    if let Some(base) = base {
                        d.dump_expr("base", base);
                    }
                });
            }
            ExprKind::Range { low, high, kind } => {
                self.line(edge, &format!("Range(kind={kind:?})"));
                self.child(|d| {
                    if let Some(low) = low {
                        d.dump_expr("low", low);
                    }
                    if let Some(high) = high {
                        d.dump_expr("high", high);
                    }
                });
            }
            ExprKind::Await(inner) => {
                self.line(edge, "Await");
                self.child(|d| d.dump_expr("operand", inner));
            }
            ExprKind::ErrorPropagate(inner) => {
                self.line(edge, "ErrorPropagate");
                self.child(|d| d.dump_expr("operand", inner));
            }
            ExprKind::ErrorHandle { operand, err_name, handler } => {
                self.line(edge, &format!("ErrorHandle(err_name={err_name})"));
                self.child(|d| {
                    d.dump_expr("operand", operand);
                    d.dump_expr("handler", handler);
                });
            }
        }
    }

    pub fn dump_pattern(&mut self, edge: &str, pat: &Pattern<'_>) {
        match &pat.kind {
            PatternKind::Wildcard => self.line(edge, "Wildcard"),
            PatternKind::Identifier { name, mutable, .. } => {
                self.line(edge, &format!("IdentifierPattern(name={name}, mutable={mutable})"));
            }
            PatternKind::Literal(e) => {
                self.line(edge, "LiteralPattern");
                self.child(|d| d.dump_expr("value", e));
            }
            PatternKind::Tuple(elems) => {
                self.line(edge, &format!("TuplePattern(len={})", elems.len()));
                self.child(|d| {
                    for (i, p) in elems.iter().enumerate() {
                        d.dump_pattern(&format!("elem[{i}]"), p);
                    }
                });
            }
            PatternKind::Struct { path, fields, has_rest } => {
                self.line(edge, &format!("StructPattern(path={path}, rest={has_rest})"));
                self.child(|d| {
                    for (name, p) in fields.iter() {
                        d.dump_pattern(&format!("field[{name}]"), p);
                    }
                });
            }
            PatternKind::EnumVariant { path, payload } => {
                self.line(edge, &format!("EnumVariantPattern(path={path})"));
                if let Some(pats) = payload {
                    self.child(|d| {
                        for (i, p) in pats.iter().enumerate() {
                            d.dump_pattern(&format!("payload[{i}]"), p);
                        }
                    });
                }
            }
            PatternKind::Range { bound, .. } => self.line(edge, &format!("RangePattern(bound={bound:?})")),
            PatternKind::Or(arms) => {
                self.line(edge, &format!("OrPattern(arms={})", arms.len()));
                self.child(|d| {
                    for (i, p) in arms.iter().enumerate() {
                        d.dump_pattern(&format!("arm[{i}]"), p);
                    }
                });
            }
            PatternKind::Bind { name, inner } => {
                self.line(edge, &format!("BindPattern(name={name})"));
                self.child(|d| d.dump_pattern("inner", inner));
            }
            PatternKind::Rest => self.line(edge, "RestPattern"),
        }
    }

    pub fn dump_type_expr(&mut self, edge: &str, ty: &TypeExpr<'_>) {
        match &ty.kind {
            TypeExprKind::Named { path, type_args } => {
                self.line(edge, &format!("NamedType(path={path}, args={})", type_args.len()));
            }
            TypeExprKind::Array { .. } => self.line(edge, "ArrayType"),
            TypeExprKind::Slice { mutable, .. } => self.line(edge, &format!("SliceType(mutable={mutable})")),
            TypeExprKind::Tuple(elems) => self.line(edge, &format!("TupleType(len={})", elems.len())),
            TypeExprKind::Optional(_) => self.line(edge, "OptionalType"),
            TypeExprKind::Reference { mutable, .. } => self.line(edge, &format!("ReferenceType(mutable={mutable})")),
            TypeExprKind::Pointer { mutable, .. } => self.line(edge, &format!("PointerType(mutable={mutable})")),
            TypeExprKind::Function { params, .. } => self.line(edge, &format!("FunctionType(params={})", params.len())),
            TypeExprKind::ErrorReturning(_) => self.line(edge, "ErrorReturningType"),
            TypeExprKind::SelfType => self.line(edge, "SelfType"),
            TypeExprKind::Void => self.line(edge, "VoidType"),
        }
    }
}

pub fn dump_unit(unit: &CompilationUnit<'_>) -> String {
    let mut dumper = Dumper::new();
    dumper.dump_unit(unit);
    dumper.finish()
}
