//! Pass 3: trait/impl indexing.
//!
//! Resolves each `impl` block's target type, binds `Self` to it while its
//! methods are visited, and populates the cross-cutting registries on
//! [`AstContext`] (`methods`, `trait_impls`, `formats`) that later passes
//! and codegen consult. Also where operator-overload-on-builtin (err 3048)
//! and trait-completeness (err 3033/3034) are checked.

use crate::resolve_type::{push_generic_scope, resolve_type_expr};
use crate::scope::{Symbol, SymbolKind, SymbolTable};
use lumen_ast::{AstContext, BinaryOp, CompilationUnit, Decl, FuncDecl, ImplDecl, TraitDecl, Type};
use lumen_diagnostics::{DiagID, DiagnosticEngine};
use std::collections::HashSet;

pub fn index_impls<'ast>(
    ctx: &'ast AstContext<'ast>,
    diag: &mut DiagnosticEngine<'_>,
    unit: &CompilationUnit<'ast>,
    table: &mut SymbolTable<'ast>,
) {
    for decl in unit.decls {
        if let Decl::Impl(impl_decl) = decl {
            index_one_impl(ctx, diag, table, impl_decl);
        }
    }
}

fn index_one_impl<'ast>(
    ctx: &'ast AstContext<'ast>,
    diag: &mut DiagnosticEngine<'_>,
    table: &mut SymbolTable<'ast>,
    impl_decl: &'ast ImplDecl<'ast>,
) {
    let mut resolving = HashSet::new();
    push_generic_scope(ctx, table, impl_decl.generics);
    let target = resolve_type_expr(ctx, diag, table, &mut resolving, impl_decl.target);
    table.insert(Symbol::with_type("Self", SymbolKind::Generic, target, impl_decl.range));

    let trait_decl = impl_decl.trait_name.and_then(|name| lookup_trait(table, name));

    if let Some(name) = impl_decl.trait_name {
        if is_operator_trait(name) && is_builtin_type(target) {
            diag.report_range(DiagID::ErrOperatorTraitOnBuiltin, impl_decl.range)
                .arg(name)
                .arg(target.to_string())
                .emit();
        } else {
            ctx.trait_impls.register(target, name);
            if name == "Display" {
                ctx.formats.mark_display(target);
            } else if name == "Debug" {
                ctx.formats.mark_debug(target);
            }
        }
    }

    for method in impl_decl.methods {
        if !ctx.methods.register(target, method.name, method) {
            diag.report_range(DiagID::ErrDuplicateImplMethod, method.range)
                .arg(method.name)
                .arg(target.to_string())
                .emit();
        }
        resolve_method_signature(ctx, diag, table, &mut resolving, method);
    }

    if let (Some(name), Some(trait_decl)) = (impl_decl.trait_name, trait_decl) {
        check_trait_completeness(diag, impl_decl, name, trait_decl);
    }

    table.pop();
}

fn lookup_trait<'ast>(table: &SymbolTable<'ast>, name: &str) -> Option<&'ast TraitDecl<'ast>> {
    match table.lookup(name)?.kind {
        SymbolKind::Trait(t) => Some(t),
        _ => None,
    }
}

fn resolve_method_signature<'ast>(
    ctx: &'ast AstContext<'ast>,
    diag: &mut DiagnosticEngine<'_>,
    table: &mut SymbolTable<'ast>,
    resolving: &mut HashSet<&'ast str>,
    method: &'ast FuncDecl<'ast>,
) {
    push_generic_scope(ctx, table, method.generics);
    for param in method.params {
        if let Some(annotation) = param.type_annotation {
            resolve_type_expr(ctx, diag, table, resolving, annotation);
        }
    }
    if let Some(ret) = method.return_type {
        resolve_type_expr(ctx, diag, table, resolving, ret);
    }
    table.pop();
}

fn check_trait_completeness(diag: &mut DiagnosticEngine<'_>, impl_decl: &ImplDecl<'_>, trait_name: &str, trait_decl: &TraitDecl<'_>) {
    for required in trait_decl.methods {
        // An abstract trait method has no default body; a default-bodied
        // one is already complete without an override.
        if required.body.is_some() {
            continue;
        }
        let implemented = impl_decl.methods.iter().find(|m| m.name == required.name);
        match implemented {
            None => {
                diag.report_range(DiagID::ErrMissingTraitMethod, impl_decl.range)
                    .arg(trait_name)
                    .arg(impl_decl_target_name(impl_decl))
                    .arg(required.name)
                    .emit();
            }
            Some(found) => {
                if found.params.len() != required.params.len()
                    || found.is_async != required.is_async
                    || found.is_error_returning != required.is_error_returning
                {
                    diag.report_range(DiagID::ErrTraitMethodSignatureMismatch, found.range)
                        .arg(found.name)
                        .arg(trait_name)
                        .emit();
                }
            }
        }
    }
}

fn impl_decl_target_name(impl_decl: &ImplDecl<'_>) -> String {
    match &impl_decl.target.kind {
        lumen_ast::TypeExprKind::Named { path, .. } => path.to_string(),
        _ => "<type>".to_string(),
    }
}

fn is_operator_trait(name: &str) -> bool {
    use BinaryOp::*;
    [Add, Sub, Mul, Div, Rem, BitAnd, BitOr, BitXor, Shl, Shr, And, Or, Eq, Ne, Lt, Le, Gt, Ge]
        .iter()
        .any(|op| op.trait_method_name() == name)
}

fn is_builtin_type(ty: &Type<'_>) -> bool {
    matches!(
        ty,
        Type::Void | Type::Bool | Type::Char | Type::String | Type::Integer { .. } | Type::Float { .. }
    )
}
