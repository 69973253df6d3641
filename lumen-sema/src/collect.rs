//! Pass 1: declaration collection.
//!
//! Walks every top-level declaration once, binding module-level names into
//! the global scope before any type is resolved or any body is checked, so
//! that later passes can freely forward-reference a function or type
//! declared further down the file. Also validates purely structural
//! invariants that don't need a resolved type: duplicate fields, duplicate
//! variants, duplicate generic parameters, and the enum-variant-shortcut
//! naming rules.

use crate::scope::{Symbol, SymbolKind, SymbolTable};
use lumen_ast::{CompilationUnit, Decl, EnumDecl, EnumVariantDecl, GenericParam, StructDecl};
use lumen_diagnostics::{DiagID, DiagnosticEngine};
use std::collections::HashSet;

pub fn collect_declarations<'ast>(
    diag: &mut DiagnosticEngine<'_>,
    unit: &CompilationUnit<'ast>,
    table: &mut SymbolTable<'ast>,
) {
    let mut enums = Vec::new();

    for decl in unit.decls {
        match decl {
            Decl::Func(f) => {
                declare_or_report(diag, table, Symbol::new(f.name, SymbolKind::Func(f), f.range));
                check_duplicate_generics(diag, f.generics);
            }
            Decl::Struct(s) => {
                declare_or_report(diag, table, Symbol::new(s.name, SymbolKind::Struct(s), s.range));
                check_duplicate_generics(diag, s.generics);
                check_duplicate_fields(diag, s);
            }
            Decl::Enum(e) => {
                declare_or_report(diag, table, Symbol::new(e.name, SymbolKind::Enum(e), e.range));
                check_duplicate_generics(diag, e.generics);
                check_duplicate_variants(diag, e);
                enums.push(e);
            }
            Decl::Trait(t) => {
                declare_or_report(diag, table, Symbol::new(t.name, SymbolKind::Trait(t), t.range));
                check_duplicate_generics(diag, t.generics);
            }
            Decl::TypeAlias(a) => {
                declare_or_report(diag, table, Symbol::new(a.name, SymbolKind::TypeAlias(a), a.range));
            }
            Decl::Var(v) => {
                declare_or_report(diag, table, Symbol::new(v.name, SymbolKind::Var { mutable: v.mutable }, v.range));
            }
            Decl::Const(c) => {
                declare_or_report(diag, table, Symbol::new(c.name, SymbolKind::Const, c.range));
            }
            // Impl blocks contribute methods, not top-level names; indexed
            // in pass 3 once target types can be resolved.
            Decl::Impl(i) => check_duplicate_generics(diag, i.generics),
        }
    }

    for enum_decl in enums {
        for variant in enum_decl.variants {
            register_enum_shortcut(diag, table, enum_decl, variant);
        }
    }
}

fn declare_or_report<'ast>(diag: &mut DiagnosticEngine<'_>, table: &mut SymbolTable<'ast>, symbol: Symbol<'ast>) {
    if let Some(existing) = table.lookup_local(symbol.name) {
        diag.report_range(DiagID::ErrRedefinition, symbol.range).arg(symbol.name).emit();
        diag.report_range(DiagID::NotePreviousDefinitionHere, existing.range).emit();
        return;
    }
    table.insert(symbol);
}

fn register_enum_shortcut<'ast>(
    diag: &mut DiagnosticEngine<'_>,
    table: &mut SymbolTable<'ast>,
    enum_decl: &'ast EnumDecl<'ast>,
    variant: &'ast EnumVariantDecl<'ast>,
) {
    if let Some(existing) = table.lookup_local(variant.name) {
        if matches!(existing.kind, SymbolKind::Func(_)) {
            diag.report_range(DiagID::WarnEnumShortcutShadowedByFunction, variant.range)
                .arg(variant.name)
                .emit();
        } else {
            diag.report_range(DiagID::ErrDuplicateEnumShortcut, variant.range).arg(variant.name).emit();
        }
        return;
    }
    table.insert(Symbol::new(
        variant.name,
        SymbolKind::EnumVariantShortcut { enum_decl, variant },
        variant.range,
    ));
}

fn check_duplicate_generics(diag: &mut DiagnosticEngine<'_>, generics: &[&GenericParam<'_>]) {
    let mut seen = HashSet::new();
    for g in generics {
        if !seen.insert(g.name) {
            diag.report_range(DiagID::ErrDuplicateGenericParam, g.range).arg(g.name).emit();
        }
    }
}

fn check_duplicate_fields(diag: &mut DiagnosticEngine<'_>, s: &StructDecl<'_>) {
    let mut seen = HashSet::new();
    for field in s.fields {
        if !seen.insert(field.name) {
            diag.report_range(DiagID::ErrDuplicateField, field.range).arg(field.name).emit();
        }
    }
}

fn check_duplicate_variants(diag: &mut DiagnosticEngine<'_>, e: &EnumDecl<'_>) {
    let mut seen = HashSet::new();
    for variant in e.variants {
        if !seen.insert(variant.name) {
            diag.report_range(DiagID::ErrDuplicateVariant, variant.range).arg(variant.name).emit();
        }
    }
}
