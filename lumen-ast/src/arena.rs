//! The AST context: owns every node and canonical type for one compilation
//! pipeline. Individual nodes live in per-kind [`typed_arena::Arena`]s so
//! that self-referential construction (a node referring to a sibling
//! allocated moments earlier) gets a stable address; variable-length lists
//! (`&'ast [T]`) are boxed and leaked, which is sound here because the
//! context anyway lives for the whole pipeline and nothing individually
//! frees these lists before the process using them exits.

use crate::decl::Decl;
use crate::expr::Expr;
use crate::pattern::Pattern;
use crate::registries::{FormatSpecializations, MethodRegistry, TraitImplRegistry};
use crate::stmt::Stmt;
use crate::ty::{Signedness, Type, TypeVarCounter};
use crate::type_expr::TypeExpr;
use dashmap::DashMap;
use typed_arena::Arena;

pub struct AstContext<'ast> {
    decls: Arena<Decl<'ast>>,
    stmts: Arena<Stmt<'ast>>,
    exprs: Arena<Expr<'ast>>,
    type_exprs: Arena<TypeExpr<'ast>>,
    patterns: Arena<Pattern<'ast>>,
    types: Arena<Type<'ast>>,
    strings: Arena<String>,

    type_interner: DashMap<Type<'ast>, &'ast Type<'ast>>,
    pointer_width: u32,

    pub type_vars: TypeVarCounter,
    pub methods: MethodRegistry<'ast>,
    pub trait_impls: TraitImplRegistry,
    pub formats: FormatSpecializations,
}

impl<'ast> AstContext<'ast> {
    pub fn new(pointer_width: u32) -> Self {
        AstContext {
            decls: Arena::new(),
            stmts: Arena::new(),
            exprs: Arena::new(),
            type_exprs: Arena::new(),
            patterns: Arena::new(),
            types: Arena::new(),
            strings: Arena::new(),
            type_interner: DashMap::new(),
            pointer_width,
            type_vars: TypeVarCounter::default(),
            methods: MethodRegistry::new(),
            trait_impls: TraitImplRegistry::new(),
            formats: FormatSpecializations::new(),
        }
    }

    pub fn pointer_width(&self) -> u32 {
        self.pointer_width
    }

    // ---- node allocation ----

    pub fn alloc_decl(&'ast self, decl: Decl<'ast>) -> &'ast Decl<'ast> {
        self.decls.alloc(decl)
    }

    pub fn alloc_stmt(&'ast self, stmt: Stmt<'ast>) -> &'ast Stmt<'ast> {
        self.stmts.alloc(stmt)
    }

    pub fn alloc_expr(&'ast self, expr: Expr<'ast>) -> &'ast Expr<'ast> {
        self.exprs.alloc(expr)
    }

    pub fn alloc_type_expr(&'ast self, ty: TypeExpr<'ast>) -> &'ast TypeExpr<'ast> {
        self.type_exprs.alloc(ty)
    }

    pub fn alloc_pattern(&'ast self, pat: Pattern<'ast>) -> &'ast Pattern<'ast> {
        self.patterns.alloc(pat)
    }

    pub fn alloc_str(&'ast self, s: impl Into<String>) -> &'ast str {
        self.strings.alloc(s.into()).as_str()
    }

    pub fn alloc_slice<T>(&self, items: Vec<T>) -> &'ast [T] {
        Box::leak(items.into_boxed_slice())
    }

    /// Leak a single value of an auxiliary node kind (parameters, fields,
    /// enum variants, generic params, nested function signatures) that
    /// doesn't warrant its own typed arena.
    pub fn alloc<T>(&self, value: T) -> &'ast T {
        Box::leak(Box::new(value))
    }

    // ---- type interning ----

    /// Intern a canonical type by structural key: repeated calls with an
    /// equal `Type` value return the same `&'ast Type` (invariant 1).
    pub fn intern_type(&'ast self, ty: Type<'ast>) -> &'ast Type<'ast> {
        if let Some(existing) = self.type_interner.get(&ty) {
            return *existing.value();
        }
        let allocated = self.types.alloc(ty.clone());
        self.type_interner.insert(ty, allocated);
        allocated
    }

    pub fn get_void(&'ast self) -> &'ast Type<'ast> {
        self.intern_type(Type::Void)
    }

    pub fn get_bool(&'ast self) -> &'ast Type<'ast> {
        self.intern_type(Type::Bool)
    }

    pub fn get_char(&'ast self) -> &'ast Type<'ast> {
        self.intern_type(Type::Char)
    }

    pub fn get_string(&'ast self) -> &'ast Type<'ast> {
        self.intern_type(Type::String)
    }

    pub fn get_integer(&'ast self, bits: u32, signed: Signedness) -> &'ast Type<'ast> {
        self.intern_type(Type::Integer { bits, signed })
    }

    /// `isize`/`usize` resolve against the driver-configured pointer width.
    pub fn get_isize(&'ast self) -> &'ast Type<'ast> {
        self.get_integer(self.pointer_width, Signedness::Signed)
    }

    pub fn get_usize(&'ast self) -> &'ast Type<'ast> {
        self.get_integer(self.pointer_width, Signedness::Unsigned)
    }

    pub fn get_float(&'ast self, bits: u32) -> &'ast Type<'ast> {
        self.intern_type(Type::Float { bits })
    }

    pub fn get_error_placeholder(&'ast self) -> &'ast Type<'ast> {
        self.intern_type(Type::Error_)
    }

    pub fn get_optional(&'ast self, inner: &'ast Type<'ast>) -> &'ast Type<'ast> {
        self.intern_type(Type::Optional(inner))
    }

    /// `None`'s canonical type per the spec's canonicalization of
    /// `None` vs `Optional<void>` (open question, §9): `Optional<void>`.
    pub fn get_none_type(&'ast self) -> &'ast Type<'ast> {
        let void = self.get_void();
        self.get_optional(void)
    }

    pub fn fresh_type_var(&'ast self) -> &'ast Type<'ast> {
        self.intern_type(Type::TypeVar(self.type_vars.fresh()))
    }
}
