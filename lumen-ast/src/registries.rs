//! Cross-cutting tables built during Sema's trait/impl-indexing pass and
//! consulted by later passes and by codegen.

use crate::decl::FuncDecl;
use crate::ty::Type;
use dashmap::DashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct TypeKey(String);

fn key_for<'ast>(ty: &Type<'ast>) -> TypeKey {
    TypeKey(ty.to_string())
}

/// `(type, method-name) -> FuncDecl`, built from impl blocks (§4.4).
#[derive(Default)]
pub struct MethodRegistry<'ast> {
    methods: DashMap<(TypeKey, String), &'ast FuncDecl<'ast>>,
}

impl<'ast> MethodRegistry<'ast> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a method, returning `false` if `(type, name)` was already
    /// occupied (err 3022 — duplicate impl method).
    pub fn register(&self, ty: &Type<'ast>, name: &str, decl: &'ast FuncDecl<'ast>) -> bool {
        let key = (key_for(ty), name.to_string());
        if self.methods.contains_key(&key) {
            return false;
        }
        self.methods.insert(key, decl);
        true
    }

    pub fn lookup(&self, ty: &Type<'ast>, name: &str) -> Option<&'ast FuncDecl<'ast>> {
        self.methods.get(&(key_for(ty), name.to_string())).map(|r| *r.value())
    }
}

/// `type -> implemented trait names`, consulted for operator overload
/// resolution and trait-bound checks.
#[derive(Default)]
pub struct TraitImplRegistry {
    impls: DashMap<TypeKey, Vec<String>>,
}

impl TraitImplRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<'ast>(&self, ty: &Type<'ast>, trait_name: &str) {
        self.impls
            .entry(key_for(ty))
            .or_default()
            .push(trait_name.to_string());
    }

    pub fn implements<'ast>(&self, ty: &Type<'ast>, trait_name: &str) -> bool {
        self.impls
            .get(&key_for(ty))
            .map(|names| names.iter().any(|n| n == trait_name))
            .unwrap_or(false)
    }
}

/// Per-concrete-type `Display`/`Debug` method presence, set when an impl
/// exposes either method under its well-known name.
#[derive(Default)]
pub struct FormatSpecializations {
    display: DashMap<TypeKey, ()>,
    debug: DashMap<TypeKey, ()>,
}

impl FormatSpecializations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_display<'ast>(&self, ty: &Type<'ast>) {
        self.display.insert(key_for(ty), ());
    }

    pub fn mark_debug<'ast>(&self, ty: &Type<'ast>) {
        self.debug.insert(key_for(ty), ());
    }

    pub fn has_display<'ast>(&self, ty: &Type<'ast>) -> bool {
        self.display.contains_key(&key_for(ty))
    }

    pub fn has_debug<'ast>(&self, ty: &Type<'ast>) -> bool {
        self.debug.contains_key(&key_for(ty))
    }
}
