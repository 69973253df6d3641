//! Lexical scope stack and symbol table, shared by every Sema pass.
//!
//! A [`SymbolTable`] is a stack of [`Scope`]s. The global scope is created
//! at construction and seeded with built-in type names; every further
//! scope (function body, block, loop body) is pushed and popped by the
//! pass that walks into and back out of it.

use lumen_ast::{
    AstContext, EnumDecl, EnumVariantDecl, FuncDecl, Signedness, StructDecl, TraitDecl, Type, TypeAliasDecl,
};
use lumen_diagnostics::SourceRange;
use std::cell::Cell;
use std::collections::HashMap;

/// What a name in scope refers to. Carries the declaration node so later
/// passes can walk back to it without a second lookup.
#[derive(Debug, Clone, Copy)]
pub enum SymbolKind<'ast> {
    Var { mutable: bool },
    Const,
    Param { mutable: bool },
    Func(&'ast FuncDecl<'ast>),
    Struct(&'ast StructDecl<'ast>),
    Enum(&'ast EnumDecl<'ast>),
    Trait(&'ast TraitDecl<'ast>),
    TypeAlias(&'ast TypeAliasDecl<'ast>),
    Generic,
    /// A bare `Variant` name standing in for `Enum.Variant` at top level.
    EnumVariantShortcut {
        enum_decl: &'ast EnumDecl<'ast>,
        variant: &'ast EnumVariantDecl<'ast>,
    },
    /// A built-in name seeded into the global scope (`i32`, `bool`, …).
    Builtin,
}

/// One named entry in a scope. `ty` starts empty for anything whose type
/// depends on a later pass (a `var` with no annotation, a function before
/// its signature is resolved) and is filled in by whichever pass resolves
/// it, mirroring the `Cell<Option<&Type>>` decoration already used on
/// `Expr`/`Pattern`.
#[derive(Debug)]
pub struct Symbol<'ast> {
    pub name: &'ast str,
    pub kind: SymbolKind<'ast>,
    pub ty: Cell<Option<&'ast Type<'ast>>>,
    pub range: SourceRange,
    used: Cell<bool>,
}

impl<'ast> Symbol<'ast> {
    pub fn new(name: &'ast str, kind: SymbolKind<'ast>, range: SourceRange) -> Self {
        Symbol { name, kind, ty: Cell::new(None), range, used: Cell::new(false) }
    }

    pub fn with_type(name: &'ast str, kind: SymbolKind<'ast>, ty: &'ast Type<'ast>, range: SourceRange) -> Self {
        Symbol { name, kind, ty: Cell::new(Some(ty)), range, used: Cell::new(false) }
    }

    pub fn set_type(&self, ty: &'ast Type<'ast>) {
        self.ty.set(Some(ty));
    }

    pub fn get_type(&self) -> Option<&'ast Type<'ast>> {
        self.ty.get()
    }

    pub fn is_mutable(&self) -> bool {
        matches!(self.kind, SymbolKind::Var { mutable: true } | SymbolKind::Param { mutable: true })
    }

    pub fn is_const(&self) -> bool {
        matches!(self.kind, SymbolKind::Const)
    }

    /// Record a read of this binding, for unused-variable/parameter
    /// warnings (4001/4002) checked when its scope is popped.
    pub fn mark_used(&self) {
        self.used.set(true);
    }

    pub fn is_used(&self) -> bool {
        self.used.get()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind<'ast> {
    Global,
    Function,
    Block,
    /// `label` is `None` for an unlabeled loop; `break`/`continue` without
    /// a label always target the nearest enclosing `Loop` scope regardless.
    Loop { label: Option<&'ast str> },
}

struct Scope<'ast> {
    kind: ScopeKind<'ast>,
    symbols: HashMap<&'ast str, Symbol<'ast>>,
}

impl<'ast> Scope<'ast> {
    fn new(kind: ScopeKind<'ast>) -> Self {
        Scope { kind, symbols: HashMap::new() }
    }
}

pub struct SymbolTable<'ast> {
    scopes: Vec<Scope<'ast>>,
}

impl<'ast> SymbolTable<'ast> {
    /// Builds a table with just the global scope, seeded with every
    /// built-in type name.
    pub fn new(ctx: &'ast AstContext<'ast>) -> Self {
        let mut global = Scope::new(ScopeKind::Global);
        seed_builtins(ctx, &mut global);
        SymbolTable { scopes: vec![global] }
    }

    pub fn push(&mut self, kind: ScopeKind<'ast>) {
        self.scopes.push(Scope::new(kind));
    }

    pub fn pop(&mut self) {
        debug_assert!(self.scopes.len() > 1, "the global scope is never popped");
        self.scopes.pop();
    }

    /// Insert `symbol` into the current (innermost) scope. Fails, leaving
    /// the table unchanged, if that scope already binds the name (err
    /// 3005 — redefinition); shadowing a name from an *enclosing* scope is
    /// always allowed (warn 4005 is the caller's concern, not this one's).
    pub fn insert(&mut self, symbol: Symbol<'ast>) -> bool {
        let Some(top) = self.scopes.last_mut() else {
            return false;
        };
        if top.symbols.contains_key(symbol.name) {
            return false;
        }
        top.symbols.insert(symbol.name, symbol);
        true
    }

    /// Walk outward from the current scope, returning the first match.
    pub fn lookup(&self, name: &str) -> Option<&Symbol<'ast>> {
        self.scopes.iter().rev().find_map(|scope| scope.symbols.get(name))
    }

    /// Look up `name` in the current scope only, without walking parents.
    pub fn lookup_local(&self, name: &str) -> Option<&Symbol<'ast>> {
        self.scopes.last().and_then(|scope| scope.symbols.get(name))
    }

    /// Every symbol bound directly in the current (innermost) scope, for
    /// the unused-variable/parameter sweep run just before it is popped.
    pub fn current_scope_symbols(&self) -> impl Iterator<Item = &Symbol<'ast>> {
        self.scopes.last().into_iter().flat_map(|scope| scope.symbols.values())
    }

    /// Whether a name is already visible anywhere along the current scope
    /// chain, for shadow-warning purposes.
    pub fn is_shadowing(&self, name: &str) -> bool {
        self.scopes.iter().rev().skip(1).any(|scope| scope.symbols.contains_key(name))
    }

    /// Whether `break`/unlabeled `continue` has a loop to target. Stops at
    /// the nearest enclosing function boundary: a loop in an outer
    /// function does not reach into a nested closure body.
    pub fn in_loop(&self) -> bool {
        for scope in self.scopes.iter().rev() {
            match scope.kind {
                ScopeKind::Loop { .. } => return true,
                ScopeKind::Function => return false,
                _ => continue,
            }
        }
        false
    }

    /// Whether the current position is inside some function body at all
    /// (used to validate top-level `return`/error-propagation contexts).
    pub fn in_function(&self) -> bool {
        self.scopes.iter().any(|scope| scope.kind == ScopeKind::Function)
    }

    /// Resolve a labeled `break`/`continue` target. Returns `false` (err
    /// 3027 — unknown label) if no loop with that label is in scope before
    /// a function boundary is crossed.
    pub fn resolve_label(&self, label: &str) -> bool {
        for scope in self.scopes.iter().rev() {
            match scope.kind {
                ScopeKind::Loop { label: Some(l) } if l == label => return true,
                ScopeKind::Function => return false,
                _ => continue,
            }
        }
        false
    }
}

fn seed_builtins<'ast>(ctx: &'ast AstContext<'ast>, scope: &mut Scope<'ast>) {
    let range = SourceRange::default();
    let mut bind = |name: String, ty: &'ast Type<'ast>| {
        let name = ctx.alloc_str(name);
        scope.symbols.insert(name, Symbol::with_type(name, SymbolKind::Builtin, ty, range));
    };

    bind("void".to_string(), ctx.get_void());
    bind("bool".to_string(), ctx.get_bool());
    bind("char".to_string(), ctx.get_char());
    bind("str".to_string(), ctx.get_string());
    for bits in [8, 16, 32, 64, 128] {
        bind(format!("i{bits}"), ctx.get_integer(bits, Signedness::Signed));
        bind(format!("u{bits}"), ctx.get_integer(bits, Signedness::Unsigned));
    }
    bind("isize".to_string(), ctx.get_isize());
    bind("usize".to_string(), ctx.get_usize());
    bind("f32".to_string(), ctx.get_float(32));
    bind("f64".to_string(), ctx.get_float(64));
    // The system-level tagged error type: every `!T` carries one of these
    // alongside its success payload.
    bind("error".to_string(), ctx.get_error_placeholder());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_scope_resolves_builtin_names() {
        let ctx = AstContext::new(64);
        let table = SymbolTable::new(&ctx);
        let sym = table.lookup("i32").expect("i32 should be seeded");
        assert!(matches!(sym.kind, SymbolKind::Builtin));
        assert_eq!(sym.get_type(), Some(ctx.get_integer(32, Signedness::Signed)));
    }

    #[test]
    fn insert_rejects_redefinition_in_the_same_scope() {
        let ctx = AstContext::new(64);
        let mut table = SymbolTable::new(&ctx);
        let name = ctx.alloc_str("x");
        assert!(table.insert(Symbol::new(name, SymbolKind::Var { mutable: false }, SourceRange::default())));
        assert!(!table.insert(Symbol::new(name, SymbolKind::Var { mutable: false }, SourceRange::default())));
    }

    #[test]
    fn nested_scope_may_shadow_an_outer_binding() {
        let ctx = AstContext::new(64);
        let mut table = SymbolTable::new(&ctx);
        let name = ctx.alloc_str("x");
        table.insert(Symbol::new(name, SymbolKind::Var { mutable: false }, SourceRange::default()));
        table.push(ScopeKind::Block);
        assert!(table.is_shadowing(name));
        assert!(table.insert(Symbol::new(name, SymbolKind::Var { mutable: true }, SourceRange::default())));
        assert!(table.lookup_local(name).unwrap().is_mutable());
        table.pop();
        assert!(!table.lookup(name).unwrap().is_mutable());
    }

    #[test]
    fn loop_query_stops_at_a_function_boundary() {
        let ctx = AstContext::new(64);
        let mut table = SymbolTable::new(&ctx);
        table.push(ScopeKind::Function);
        table.push(ScopeKind::Loop { label: None });
        assert!(table.in_loop());
        table.push(ScopeKind::Function);
        assert!(!table.in_loop());
    }

    #[test]
    fn labeled_break_resolves_through_intervening_blocks() {
        let ctx = AstContext::new(64);
        let mut table = SymbolTable::new(&ctx);
        table.push(ScopeKind::Function);
        table.push(ScopeKind::Loop { label: Some("outer") });
        table.push(ScopeKind::Block);
        assert!(table.resolve_label("outer"));
        assert!(!table.resolve_label("missing"));
    }
}
