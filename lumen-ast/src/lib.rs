//! Abstract syntax tree, canonical type system, and arena ownership for a
//! compilation unit. Nodes are allocated out of an [`AstContext`] and live
//! for the lifetime of one compile; structural types are interned so that
//! pointer equality between two `&Type` implies full type equality.

mod arena;
mod decl;
mod dump;
mod expr;
mod pattern;
mod pretty;
mod registries;
mod stmt;
mod ty;
mod type_expr;

pub use arena::AstContext;
pub use decl::{
    AssociatedTypeBinding, ConstDecl, Decl, EnumDecl, EnumVariantDecl, EnumVariantPayload, FieldDecl, FuncDecl,
    GenericParam, ImplDecl, ParamDecl, ParamKind, StructDecl, TraitDecl, TypeAliasDecl, VarDecl, Visibility,
};
pub use dump::{dump_unit, Dumper};
pub use expr::{
    ArrayExpr, AssignOp, BinaryOp, CallArg, Expr, ExprKind, IntegerSuffix, LoopKind, MatchArm, RangeKind,
    StructLiteralField, UnaryOp,
};
pub use pattern::{Pattern, PatternKind, RangeBound};
pub use pretty::{print_expr, print_unit, Printer};
pub use registries::{FormatSpecializations, MethodRegistry, TraitImplRegistry};
pub use stmt::{Stmt, StmtKind};
pub use ty::{EnumPayload, EnumVariant, Signedness, StructField, Type, TypeVarCounter};
pub use type_expr::{TypeExpr, TypeExprKind};

pub use decl::CompilationUnit;

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_diagnostics::{SourceLocation, SourceRange};

    fn dummy_range() -> SourceRange {
        SourceRange::point(SourceLocation::new(0))
    }

    #[test]
    fn interning_gives_pointer_identity_for_equal_types() {
        let ctx = AstContext::new(64);
        let a = ctx.get_integer(32, Signedness::Signed);
        let b = ctx.get_integer(32, Signedness::Signed);
        assert!(std::ptr::eq(a, b));

        let c = ctx.get_integer(32, Signedness::Unsigned);
        assert!(!std::ptr::eq(a, c));
    }

    #[test]
    fn interning_nested_types_is_structural() {
        let ctx = AstContext::new(64);
        let i32_ty = ctx.get_integer(32, Signedness::Signed);
        let opt_a = ctx.get_optional(i32_ty);
        let opt_b = ctx.get_optional(i32_ty);
        assert!(std::ptr::eq(opt_a, opt_b));
    }

    #[test]
    fn none_canonicalizes_to_optional_void() {
        let ctx = AstContext::new(64);
        let none_ty = ctx.get_none_type();
        let expected = ctx.get_optional(ctx.get_void());
        assert!(std::ptr::eq(none_ty, expected));
    }

    #[test]
    fn unwrap_aliases_peels_to_structural_type() {
        let ctx = AstContext::new(64);
        let int_ty = ctx.get_integer(32, Signedness::Signed);
        let alias = Type::TypeAlias { name: "MyInt", aliased: Some(int_ty) };
        assert_eq!(Type::unwrap_aliases(&alias), int_ty);
        // Idempotent: unwrapping an already-structural type is a no-op.
        assert_eq!(Type::unwrap_aliases(int_ty), int_ty);
    }

    #[test]
    fn method_registry_rejects_duplicate_registration() {
        let ctx = AstContext::new(64);
        let ty = ctx.get_integer(32, Signedness::Signed);
        let func = ctx.alloc_decl(Decl::Func(FuncDecl {
            name: "double",
            params: &[],
            return_type: None,
            body: None,
            is_async: false,
            is_error_returning: false,
            visibility: Visibility::Public,
            generics: &[],
            extern_link_name: None,
            range: dummy_range(),
        }));
        let Decl::Func(func) = func else { unreachable!() };

        assert!(ctx.methods.register(ty, "double", func));
        assert!(!ctx.methods.register(ty, "double", func));
        assert!(ctx.methods.lookup(ty, "double").is_some());
        assert!(ctx.methods.lookup(ty, "triple").is_none());
    }

    #[test]
    fn dump_and_pretty_print_a_var_decl() {
        let ctx = AstContext::new(64);
        let init = ctx.alloc_expr(Expr::new(
            ExprKind::IntegerLiteral { value: 42, suffix: IntegerSuffix::None },
            dummy_range(),
        ));
        let decl = Decl::Var(VarDecl {
            name: "answer",
            type_annotation: None,
            initializer: Some(init),
            mutable: false,
            visibility: Visibility::Private,
            destructure: None,
            range: dummy_range(),
        });

        let dumped = {
            let mut dumper = Dumper::new();
            dumper.dump_decl("", &decl);
            dumper.finish()
        };
        assert!(dumped.contains("VarDecl(name=answer"));
        assert!(dumped.contains("IntegerLiteral(value=42"));

        let printed = {
            let mut printer = Printer::new();
            printer.print_decl(&decl);
            printer.finish()
        };
        assert_eq!(printed, "var answer = 42;\n");
    }

    #[test]
    fn pretty_print_round_trips_a_binary_expression() {
        let ctx = AstContext::new(64);
        let lhs = ctx.alloc_expr(Expr::new(
            ExprKind::IntegerLiteral { value: 1, suffix: IntegerSuffix::None },
            dummy_range(),
        ));
        let rhs = ctx.alloc_expr(Expr::new(
            ExprKind::IntegerLiteral { value: 2, suffix: IntegerSuffix::None },
            dummy_range(),
        ));
        let add = Expr::new(ExprKind::Binary { op: BinaryOp::Add, lhs, rhs }, dummy_range());
        assert_eq!(print_expr(&add), "1 + 2");
    }

    #[test]
    fn bound_names_collects_or_pattern_arm_bindings() {
        let ctx = AstContext::new(64);
        let a = ctx.alloc_pattern(Pattern::new(
            PatternKind::Identifier { name: "x", mutable: false, type_annotation: None },
            dummy_range(),
        ));
        let b = ctx.alloc_pattern(Pattern::new(
            PatternKind::Identifier { name: "x", mutable: false, type_annotation: None },
            dummy_range(),
        ));
        let or_pat = Pattern::new(PatternKind::Or(ctx.alloc_slice(vec![a, b])), dummy_range());

        let mut names = Vec::new();
        or_pat.bound_names(&mut names);
        assert_eq!(names, vec!["x"]);
    }
}
