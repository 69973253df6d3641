//! Surface-syntax pretty-printer. Output is valid source text that
//! re-lexes and re-parses to an AST equal in shape to the input (the
//! round-trip property tracked in the data model notes).

use crate::decl::*;
use crate::expr::*;
use crate::pattern::{Pattern, PatternKind};
use crate::stmt::{Stmt, StmtKind};
use crate::type_expr::{TypeExpr, TypeExprKind};
use std::fmt::Write;

pub struct Printer {
    out: String,
    indent: usize,
}

impl Printer {
    pub fn new() -> Self {
        Printer { out: String::new(), indent: 0 }
    }

    pub fn finish(self) -> String {
        self.out
    }

    fn pad(&mut self) {
        for _ in 0..self.indent {
            self.out.push_str("    ");
        }
    }

    fn vis(&mut self, vis: Visibility) {
        match vis {
            Visibility::Public => self.out.push_str("pub "),
            Visibility::Internal => self.out.push_str("intern "),
            Visibility::Private => {}
        }
    }

    pub fn print_unit(&mut self, unit: &CompilationUnit<'_>) {
        for (i, decl) in unit.decls.iter().enumerate() {
            if i > 0 {
                self.out.push('\n');
            }
            self.print_decl(decl);
        }
    }

    pub fn print_decl(&mut self, decl: &Decl<'_>) {
        self.pad();
        match decl {
            Decl::Var(v) => {
                self.vis(v.visibility);
                self.out.push_str("var ");
                if v.mutable {
                    self.out.push_str("mut ");
                }
                self.out.push_str(v.name);
                if let Some(ty) = v.type_annotation {
                    self.out.push_str(": ");
                    self.print_type_expr(ty);
                }
                if let Some(init) = v.initializer {
                    self.out.push_str(" = ");
                    self.print_expr(init);
                }
                self.out.push_str(";\n");
            }
            Decl::Const(c) => {
                self.vis(c.visibility);
                let _ = write!(self.out, "const {}", c.name);
                if let Some(ty) = c.type_annotation {
                    self.out.push_str(": ");
                    self.print_type_expr(ty);
                }
                self.out.push_str(" = ");
                self.print_expr(c.initializer);
                self.out.push_str(";\n");
            }
            Decl::Func(f) => {
                self.vis(f.visibility);
                if f.is_async {
                    self.out.push_str("async ");
                }
                let _ = write!(self.out, "func {}", f.name);
                if !f.generics.is_empty() {
                    self.out.push('<');
                    for (i, g) in f.generics.iter().enumerate() {
                        if i > 0 {
                            self.out.push_str(", ");
                        }
                        self.out.push_str(g.name);
                    }
                    self.out.push('>');
                }
                self.out.push('(');
                for (i, p) in f.params.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.print_param(p);
                }
                self.out.push(')');
                if f.is_error_returning {
                    self.out.push('!');
                }
                if let Some(ret) = f.return_type {
                    self.out.push_str(" -> ");
                    self.print_type_expr(ret);
                }
                match f.body {
                    Some(body) => {
                        self.out.push(' ');
                        self.print_expr(body);
                        self.out.push('\n');
                    }
                    None => self.out.push_str(";\n"),
                }
            }
            Decl::Struct(s) => {
                self.vis(s.visibility);
                let _ = write!(self.out, "struct {} {{\n", s.name);
                self.indent += 1;
                for field in s.fields {
                    self.pad();
                    self.vis(field.visibility);
                    self.out.push_str(field.name);
                    self.out.push_str(": ");
                    self.print_type_expr(field.type_annotation);
                    self.out.push_str(",\n");
                }
                self.indent -= 1;
                self.pad();
                self.out.push_str("}\n");
            }
            Decl::Enum(e) => {
                self.vis(e.visibility);
                let _ = write!(self.out, "enum {} {{\n", e.name);
                self.indent += 1;
                for variant in e.variants {
                    self.pad();
                    self.out.push_str(variant.name);
                    match &variant.payload {
                        EnumVariantPayload::Unit => {}
                        EnumVariantPayload::Tuple(types) => {
                            self.out.push('(');
                            for (i, t) in types.iter().enumerate() {
                                if i > 0 {
                                    self.out.push_str(", ");
                                }
                                self.print_type_expr(t);
                            }
                            self.out.push(')');
                        }
                        EnumVariantPayload::Struct(fields) => {
                            self.out.push_str(" { ");
                            for (i, f) in fields.iter().enumerate() {
                                if i > 0 {
                                    self.out.push_str(", ");
                                }
                                let _ = write!(self.out, "{}: ", f.name);
                                self.print_type_expr(f.type_annotation);
                            }
                            self.out.push_str(" }");
                        }
                    }
                    self.out.push_str(",\n");
                }
                self.indent -= 1;
                self.pad();
                self.out.push_str("}\n");
            }
            Decl::TypeAlias(t) => {
                self.vis(t.visibility);
                let _ = write!(self.out, "type {}", t.name);
                if let Some(aliased) = t.aliased {
                    self.out.push_str(" = ");
                    self.print_type_expr(aliased);
                }
                self.out.push_str(";\n");
            }
            Decl::Trait(t) => {
                self.vis(t.visibility);
                let _ = write!(self.out, "trait {} {{\n", t.name);
                self.indent += 1;
                for m in t.methods {
                    self.print_decl(&Decl::Func(clone_sig(m)));
                }
                self.indent -= 1;
                self.pad();
                self.out.push_str("}\n");
            }
            Decl::Impl(i) => {
                self.out.push_str("impl ");
                if let Some(tr) = i.trait_name {
                    let _ = write!(self.out, "{tr} for ");
                }
                self.print_type_expr(i.target);
                self.out.push_str(" {\n");
                self.indent += 1;
                for m in i.methods {
                    self.print_decl(&Decl::Func(clone_sig(m)));
                }
                self.indent -= 1;
                self.pad();
                self.out.push_str("}\n");
            }
        }
    }

    fn print_param(&mut self, p: &ParamDecl<'_>) {
        match p.kind {
            ParamKind::SelfValue => self.out.push_str("self"),
            ParamKind::RefSelf => self.out.push_str("&self"),
            ParamKind::MutRefSelf => self.out.push_str("&mut self"),
            ParamKind::Variadic => {
                self.out.push_str(p.name);
                self.out.push_str("...");
            }
            ParamKind::Normal => {
                if p.mutable {
                    self.out.push_str("mut ");
                }
                self.out.push_str(p.name);
                if let Some(ty) = p.type_annotation {
                    self.out.push_str(": ");
                    self.print_type_expr(ty);
                }
                if let Some(def) = p.default_value {
                    self.out.push_str(" = ");
                    self.print_expr(def);
                }
            }
        }
    }

    pub fn print_stmt(&mut self, stmt: &Stmt<'_>) {
        match &stmt.kind {
            StmtKind::Decl(d) => self.print_decl(d),
            StmtKind::Expr(e) => {
                self.pad();
                self.print_expr(e);
                self.out.push_str(";\n");
            }
            StmtKind::Return(e) => {
                self.pad();
                self.out.push_str("return");
                if let Some(e) = e {
                    self.out.push(' ');
                    self.print_expr(e);
                }
                self.out.push_str(";\n");
            }
            StmtKind::Defer(e) => {
                self.pad();
                self.out.push_str("defer ");
                self.print_expr(e);
                self.out.push_str(";\n");
            }
        }
    }

    pub fn print_expr(&mut self, expr: &Expr<'_>) {
        match &expr.kind {
            ExprKind::IntegerLiteral { value, .. } => {
                let _ = write!(self.out, "{value}");
            }
            ExprKind::FloatLiteral { value, .. } => {
                let _ = write!(self.out, "{value}");
            }
            ExprKind::BoolLiteral(b) => {
                let _ = write!(self.out, "{b}");
            }
            ExprKind::CharLiteral(c) => {
                let _ = write!(self.out, "'{}'", c.escape_default());
            }
            ExprKind::StringLiteral(s) => {
                let _ = write!(self.out, "\"{}\"", s.escape_default());
            }
            ExprKind::NoneLiteral => self.out.push_str("none"),
            ExprKind::Identifier(name) => self.out.push_str(name),
            ExprKind::Binary { op, lhs, rhs } => {
                self.print_expr(lhs);
                let _ = write!(self.out, " {} ", op.spelling());
                self.print_expr(rhs);
            }
            ExprKind::Unary { op, operand } => {
                self.out.push_str(op.spelling());
                self.print_expr(operand);
            }
            ExprKind::Assign { op, target, value } => {
                self.print_expr(target);
                let spelling = op.map(|o| o.spelling()).unwrap_or("");
                let _ = write!(self.out, " {spelling}= ");
                self.print_expr(value);
            }
            ExprKind::Call { callee, args, type_args } => {
                self.print_expr(callee);
                if !type_args.is_empty() {
                    self.out.push('<');
                    for (i, t) in type_args.iter().enumerate() {
                        if i > 0 {
                            self.out.push_str(", ");
                        }
                        self.print_type_expr(t);
                    }
                    self.out.push('>');
                }
                self.out.push('(');
                self.print_call_args(args);
                self.out.push(')');
            }
            ExprKind::BuiltinCall { name, args } => {
                let _ = write!(self.out, "@{name}(");
                self.print_call_args(args);
                self.out.push(')');
            }
            ExprKind::Member { receiver, name, optional_chain } => {
                self.print_expr(receiver);
                self.out.push_str(if *optional_chain { "?." } else { "." });
                self.out.push_str(name);
            }
            ExprKind::Index { receiver, index } => {
                self.print_expr(receiver);
                self.out.push('[');
                self.print_expr(index);
                self.out.push(']');
            }
            ExprKind::Slice { receiver, low, high } => {
                self.print_expr(receiver);
                self.out.push('[');
                if let Some(low) = low {
                    self.print_expr(low);
                }
                self.out.push_str("..");
                if let Some(high) = high {
                    self.print_expr(high);
                }
                self.out.push(']');
            }
            ExprKind::Cast { operand, target } => {
                self.print_expr(operand);
                self.out.push_str(" as ");
                self.print_type_expr(target);
            }
            ExprKind::If { cond, then_branch, else_branch } => {
                self.out.push_str("if ");
                self.print_expr(cond);
                self.out.push(' ');
                self.print_expr(then_branch);
                if let Some(e) = else_branch {
                    self.out.push_str(" else ");
                    self.print_expr(e);
                }
            }
            ExprKind::Match { scrutinee, arms } => {
                self.out.push_str("match ");
                self.print_expr(scrutinee);
                self.out.push_str(" {\n");
                self.indent += 1;
                for arm in arms.iter() {
                    self.pad();
                    self.print_pattern(arm.pattern);
                    if let Some(guard) = arm.guard {
                        self.out.push_str(" if ");
                        self.print_expr(guard);
                    }
                    self.out.push_str(" => ");
                    self.print_expr(arm.body);
                    self.out.push_str(",\n");
                }
                self.indent -= 1;
                self.pad();
                self.out.push('}');
            }
            ExprKind::Block { stmts, tail } => {
                self.out.push_str("{\n");
                self.indent += 1;
                for s in stmts.iter() {
                    self.print_stmt(s);
                }
                if let Some(tail) = tail {
                    self.pad();
                    self.print_expr(tail);
                    self.out.push('\n');
                }
                self.indent -= 1;
                self.pad();
                self.out.push('}');
            }
            ExprKind::Loop { label, kind, body } => {
                if let Some(label) = label {
                    let _ = write!(self.out, "{label}: ");
                }
                match kind {
                    LoopKind::Infinite => self.out.push_str("loop "),
                    LoopKind::While(cond) => {
                        self.out.push_str("while ");
                        self.print_expr(cond);
                        self.out.push(' ');
                    }
                    LoopKind::For { pattern, iterable } => {
                        self.out.push_str("for ");
                        self.print_pattern(pattern);
                        self.out.push_str(" in ");
                        self.print_expr(iterable);
                        self.out.push(' ');
                    }
                }
                self.print_expr(body);
            }
            ExprKind::Break { label, value } => {
                self.out.push_str("break");
                if let Some(label) = label {
                    let _ = write!(self.out, " :{label}");
                }
                if let Some(v) = value {
                    self.out.push(' ');
                    self.print_expr(v);
                }
            }
            ExprKind::Continue { label } => {
                self.out.push_str("continue");
                if let Some(label) = label {
                    let _ = write!(self.out, " :{label}");
                }
            }
            ExprKind::Closure { params, return_type, body } => {
                self.out.push('|');
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.print_param(p);
                }
                self.out.push('|');
                if let Some(ret) = return_type {
                    self.out.push_str(" -> ");
                    self.print_type_expr(ret);
                }
                self.out.push(' ');
                self.print_expr(body);
            }
            ExprKind::Array(arr) => match arr {
                ArrayExpr::List(elems) => {
                    self.out.push('[');
                    for (i, e) in elems.iter().enumerate() {
                        if i > 0 {
                            self.out.push_str(", ");
                        }
                        self.print_expr(e);
                    }
                    self.out.push(']');
                }
                ArrayExpr::Repeat { value, count } => {
                    self.out.push('[');
                    self.print_expr(value);
                    self.out.push_str("; ");
                    self.print_expr(count);
                    self.out.push(']');
                }
            },
            ExprKind::Tuple(elems) => {
                self.out.push('(');
                for (i, e) in elems.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.print_expr(e);
                }
                if elems.len() == 1 {
                    self.out.push(',');
                }
                self.out.push(')');
            }
            ExprKind::StructLiteral { path, fields, base } => {
                self.out.push_str(path);
                self.out.push_str(" { ");
                for (i, f) in fields.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    let _ = write!(self.out, "{}: ", f.name);
                    self.print_expr(f.value);
                }
                if let Some(base) = base {
                    if !fields.is_empty() {
                        self.out.push_str(", ");
                    }
                    self.out.push_str("..");
                    self.print_expr(base);
                }
                self.out.push_str(" }");
            }
            ExprKind::Range { low, high, kind } => {
                if let Some(low) = low {
                    self.print_expr(low);
                }
                self.out.push_str(match kind {
                    RangeKind::Exclusive => "..",
                    RangeKind::Inclusive => "..=",
                });
                if let Some(high) = high {
                    self.print_expr(high);
                }
            }
            ExprKind::Await(inner) => {
                self.print_expr(inner);
                self.out.push_str(".await");
            }
            ExprKind::ErrorPropagate(inner) => {
                self.print_expr(inner);
                self.out.push('!');
            }
            ExprKind::ErrorHandle { operand, err_name, handler } => {
                self.print_expr(operand);
                let _ = write!(self.out, " orelse |{err_name}| ");
                self.print_expr(handler);
            }
        }
    }

    fn print_call_args(&mut self, args: &[CallArg<'_>]) {
        for (i, a) in args.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.print_expr(a.value);
            if a.is_spread {
                self.out.push_str("...");
            }
        }
    }

    pub fn print_pattern(&mut self, pat: &Pattern<'_>) {
        match &pat.kind {
            PatternKind::Wildcard => self.out.push('_'),
            PatternKind::Identifier { name, mutable, .. } => {
                if *mutable {
                    self.out.push_str("mut ");
                }
                self.out.push_str(name);
            }
            PatternKind::Literal(e) => self.print_expr(e),
            PatternKind::Tuple(elems) => {
                self.out.push('(');
                for (i, p) in elems.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.print_pattern(p);
                }
                self.out.push(')');
            }
            PatternKind::Struct { path, fields, has_rest } => {
                self.out.push_str(path);
                self.out.push_str(" { ");
                for (i, (name, p)) in fields.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    let _ = write!(self.out, "{name}: ");
                    self.print_pattern(p);
                }
                if *has_rest {
                    if !fields.is_empty() {
                        self.out.push_str(", ");
                    }
                    self.out.push_str("..");
                }
                self.out.push_str(" }");
            }
            PatternKind::EnumVariant { path, payload } => {
                self.out.push_str(path);
                if let Some(pats) = payload {
                    self.out.push('(');
                    for (i, p) in pats.iter().enumerate() {
                        if i > 0 {
                            self.out.push_str(", ");
                        }
                        self.print_pattern(p);
                    }
                    self.out.push(')');
                }
            }
            PatternKind::Range { low, high, bound } => {
                self.print_pattern(low);
                self.out.push_str(match bound {
                    crate::pattern::RangeBound::Exclusive => "..",
                    crate::pattern::RangeBound::Inclusive => "..=",
                });
                self.print_pattern(high);
            }
            PatternKind::Or(arms) => {
                for (i, p) in arms.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(" | ");
                    }
                    self.print_pattern(p);
                }
            }
            PatternKind::Bind { name, inner } => {
                let _ = write!(self.out, "{name} @ ");
                self.print_pattern(inner);
            }
            PatternKind::Rest => self.out.push_str(".."),
        }
    }

    pub fn print_type_expr(&mut self, ty: &TypeExpr<'_>) {
        match &ty.kind {
            TypeExprKind::Named { path, type_args } => {
                self.out.push_str(path);
                if !type_args.is_empty() {
                    self.out.push('<');
                    for (i, t) in type_args.iter().enumerate() {
                        if i > 0 {
                            self.out.push_str(", ");
                        }
                        self.print_type_expr(t);
                    }
                    self.out.push('>');
                }
            }
            TypeExprKind::Array { element, length } => {
                self.out.push('[');
                self.print_type_expr(element);
                self.out.push_str("; ");
                self.print_expr(length);
                self.out.push(']');
            }
            TypeExprKind::Slice { element, mutable } => {
                self.out.push_str("[]");
                if *mutable {
                    self.out.push_str("mut ");
                }
                self.print_type_expr(element);
            }
            TypeExprKind::Tuple(elems) => {
                self.out.push('(');
                for (i, t) in elems.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.print_type_expr(t);
                }
                self.out.push(')');
            }
            TypeExprKind::Optional(inner) => {
                self.print_type_expr(inner);
                self.out.push('?');
            }
            TypeExprKind::Reference { pointee, mutable } => {
                self.out.push('&');
                if *mutable {
                    self.out.push_str("mut ");
                }
                self.print_type_expr(pointee);
            }
            TypeExprKind::Pointer { pointee, mutable } => {
                self.out.push_str("ptr ");
                if *mutable {
                    self.out.push_str("mut ");
                }
                self.print_type_expr(pointee);
            }
            TypeExprKind::Function { params, ret } => {
                self.out.push_str("func(");
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    self.print_type_expr(p);
                }
                self.out.push(')');
                if let Some(ret) = ret {
                    self.out.push_str(" -> ");
                    self.print_type_expr(ret);
                }
            }
            TypeExprKind::ErrorReturning(inner) => {
                self.out.push('!');
                self.print_type_expr(inner);
            }
            TypeExprKind::SelfType => self.out.push_str("Self"),
            TypeExprKind::Void => self.out.push_str("void"),
        }
    }
}

/// Builds a signature-only copy of a `FuncDecl` (body dropped), used when
/// printing trait method signatures and impl methods through the same
/// `Decl::Func` path as top-level functions.
fn clone_sig<'ast>(f: &FuncDecl<'ast>) -> FuncDecl<'ast> {
    FuncDecl {
        name: f.name,
        params: f.params,
        return_type: f.return_type,
        body: f.body,
        is_async: f.is_async,
        is_error_returning: f.is_error_returning,
        visibility: f.visibility,
        generics: f.generics,
        extern_link_name: f.extern_link_name,
        range: f.range,
    }
}

pub fn print_unit(unit: &CompilationUnit<'_>) -> String {
    let mut printer = Printer::new();
    printer.print_unit(unit);
    printer.finish()
}

pub fn print_expr(expr: &Expr<'_>) -> String {
    let mut printer = Printer::new();
    printer.print_expr(expr);
    printer.finish()
}
