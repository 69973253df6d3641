//! Declaration nodes: module- and type-level items, plus the local
//! `var`/`const` declarations that also appear as statements.

use crate::expr::Expr;
use crate::pattern::Pattern;
use crate::type_expr::TypeExpr;
use lumen_diagnostics::SourceRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Visibility {
    Public,
    Internal,
    Private,
}

#[derive(Debug)]
pub struct VarDecl<'ast> {
    pub name: &'ast str,
    pub type_annotation: Option<&'ast TypeExpr<'ast>>,
    pub initializer: Option<&'ast Expr<'ast>>,
    pub mutable: bool,
    pub visibility: Visibility,
    pub destructure: Option<&'ast Pattern<'ast>>,
    pub range: SourceRange,
}

#[derive(Debug)]
pub struct ConstDecl<'ast> {
    pub name: &'ast str,
    pub type_annotation: Option<&'ast TypeExpr<'ast>>,
    pub initializer: &'ast Expr<'ast>,
    pub visibility: Visibility,
    pub range: SourceRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Normal,
    SelfValue,
    RefSelf,
    MutRefSelf,
    Variadic,
}

#[derive(Debug)]
pub struct ParamDecl<'ast> {
    pub name: &'ast str,
    pub type_annotation: Option<&'ast TypeExpr<'ast>>,
    pub default_value: Option<&'ast Expr<'ast>>,
    pub mutable: bool,
    pub kind: ParamKind,
    pub range: SourceRange,
}

#[derive(Debug)]
pub struct GenericParam<'ast> {
    pub name: &'ast str,
    pub bounds: &'ast [&'ast str],
    pub range: SourceRange,
}

#[derive(Debug)]
pub struct FuncDecl<'ast> {
    pub name: &'ast str,
    pub params: &'ast [&'ast ParamDecl<'ast>],
    pub return_type: Option<&'ast TypeExpr<'ast>>,
    pub body: Option<&'ast Expr<'ast>>,
    pub is_async: bool,
    pub is_error_returning: bool,
    pub visibility: Visibility,
    pub generics: &'ast [&'ast GenericParam<'ast>],
    pub extern_link_name: Option<&'ast str>,
    pub range: SourceRange,
}

impl<'ast> FuncDecl<'ast> {
    pub fn is_variadic(&self) -> bool {
        matches!(self.params.last(), Some(p) if p.kind == ParamKind::Variadic)
    }
}

#[derive(Debug)]
pub struct FieldDecl<'ast> {
    pub name: &'ast str,
    pub type_annotation: &'ast TypeExpr<'ast>,
    pub visibility: Visibility,
    pub range: SourceRange,
}

#[derive(Debug)]
pub struct StructDecl<'ast> {
    pub name: &'ast str,
    pub fields: &'ast [&'ast FieldDecl<'ast>],
    pub generics: &'ast [&'ast GenericParam<'ast>],
    pub visibility: Visibility,
    pub range: SourceRange,
}

#[derive(Debug)]
pub enum EnumVariantPayload<'ast> {
    Unit,
    Tuple(&'ast [&'ast TypeExpr<'ast>]),
    Struct(&'ast [&'ast FieldDecl<'ast>]),
}

#[derive(Debug)]
pub struct EnumVariantDecl<'ast> {
    pub name: &'ast str,
    pub payload: EnumVariantPayload<'ast>,
    pub discriminant: Option<i64>,
    pub range: SourceRange,
}

#[derive(Debug)]
pub struct EnumDecl<'ast> {
    pub name: &'ast str,
    pub variants: &'ast [&'ast EnumVariantDecl<'ast>],
    pub generics: &'ast [&'ast GenericParam<'ast>],
    pub visibility: Visibility,
    pub range: SourceRange,
}

/// Also represents an associated-type declaration inside a trait when
/// `aliased` is absent.
#[derive(Debug)]
pub struct TypeAliasDecl<'ast> {
    pub name: &'ast str,
    pub aliased: Option<&'ast TypeExpr<'ast>>,
    pub visibility: Visibility,
    pub range: SourceRange,
}

#[derive(Debug)]
pub struct TraitDecl<'ast> {
    pub name: &'ast str,
    pub methods: &'ast [&'ast FuncDecl<'ast>],
    pub associated_types: &'ast [&'ast TypeAliasDecl<'ast>],
    pub super_traits: &'ast [&'ast str],
    pub generics: &'ast [&'ast GenericParam<'ast>],
    pub visibility: Visibility,
    pub range: SourceRange,
}

#[derive(Debug)]
pub struct AssociatedTypeBinding<'ast> {
    pub name: &'ast str,
    pub ty: &'ast TypeExpr<'ast>,
}

#[derive(Debug)]
pub struct ImplDecl<'ast> {
    pub target: &'ast TypeExpr<'ast>,
    pub trait_name: Option<&'ast str>,
    pub methods: &'ast [&'ast FuncDecl<'ast>],
    pub associated_type_bindings: &'ast [AssociatedTypeBinding<'ast>],
    pub generics: &'ast [&'ast GenericParam<'ast>],
    pub range: SourceRange,
}

#[derive(Debug)]
pub enum Decl<'ast> {
    Var(VarDecl<'ast>),
    Const(ConstDecl<'ast>),
    Func(FuncDecl<'ast>),
    Struct(StructDecl<'ast>),
    Enum(EnumDecl<'ast>),
    TypeAlias(TypeAliasDecl<'ast>),
    Trait(TraitDecl<'ast>),
    Impl(ImplDecl<'ast>),
}

impl<'ast> Decl<'ast> {
    pub fn range(&self) -> SourceRange {
        match self {
            Decl::Var(d) => d.range,
            Decl::Const(d) => d.range,
            Decl::Func(d) => d.range,
            Decl::Struct(d) => d.range,
            Decl::Enum(d) => d.range,
            Decl::TypeAlias(d) => d.range,
            Decl::Trait(d) => d.range,
            Decl::Impl(d) => d.range,
        }
    }

    pub fn name(&self) -> Option<&'ast str> {
        match self {
            Decl::Var(d) => Some(d.name),
            Decl::Const(d) => Some(d.name),
            Decl::Func(d) => Some(d.name),
            Decl::Struct(d) => Some(d.name),
            Decl::Enum(d) => Some(d.name),
            Decl::TypeAlias(d) => Some(d.name),
            Decl::Trait(d) => Some(d.name),
            Decl::Impl(_) => None,
        }
    }
}

/// The root node of a parsed compilation unit: a flat list of top-level
/// declarations in source order.
#[derive(Debug)]
pub struct CompilationUnit<'ast> {
    pub decls: &'ast [&'ast Decl<'ast>],
}
