//! Canonical semantic types: interned by structural identity so that
//! pointer equality implies type equality (invariant 1 in the data model).

use std::cell::Cell;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Signedness {
    Signed,
    Unsigned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StructField<'ast> {
    pub name: &'ast str,
    pub ty: &'ast Type<'ast>,
    pub offset: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumPayload<'ast> {
    Unit,
    Tuple(&'ast [&'ast Type<'ast>]),
    Struct(&'ast [StructField<'ast>]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnumVariant<'ast> {
    pub name: &'ast str,
    pub payload: EnumPayload<'ast>,
    pub discriminant: Option<i64>,
}

/// A canonical, structurally-interned semantic type. Two `Type` values
/// compare equal (and, once interned, share one allocation) iff their
/// constructor and every child are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type<'ast> {
    Void,
    Bool,
    Char,
    String,
    Integer {
        bits: u32,
        signed: Signedness,
    },
    Float {
        bits: u32,
    },
    Array {
        element: &'ast Type<'ast>,
        length: u64,
    },
    Slice {
        element: &'ast Type<'ast>,
        mutable: bool,
    },
    Tuple(&'ast [&'ast Type<'ast>]),
    Optional(&'ast Type<'ast>),
    Reference {
        pointee: &'ast Type<'ast>,
        mutable: bool,
    },
    Pointer {
        pointee: &'ast Type<'ast>,
        mutable: bool,
    },
    Function {
        params: &'ast [&'ast Type<'ast>],
        ret: &'ast Type<'ast>,
        variadic: bool,
    },
    Struct {
        name: &'ast str,
        fields: &'ast [StructField<'ast>],
    },
    Enum {
        name: &'ast str,
        variants: &'ast [EnumVariant<'ast>],
    },
    TypeAlias {
        name: &'ast str,
        aliased: Option<&'ast Type<'ast>>,
    },
    Error {
        success: &'ast Type<'ast>,
    },
    Range {
        element: &'ast Type<'ast>,
    },
    Generic {
        name: &'ast str,
        bounds: &'ast [&'ast str],
    },
    GenericInstance {
        base: &'ast Type<'ast>,
        args: &'ast [&'ast Type<'ast>],
    },
    /// A fresh, unresolved inference variable; never interned (each one is
    /// distinct by construction), identified by a monotonically increasing id.
    TypeVar(u32),
    VarArgs(&'ast Type<'ast>),
    Value,
    /// Placeholder assigned to an expression whose type could not be
    /// determined because of an earlier error; suppresses cascades.
    Error_,
}

impl<'ast> Type<'ast> {
    pub fn is_integer(&self) -> bool {
        matches!(self, Type::Integer { .. })
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Type::Float { .. })
    }

    pub fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_float()
    }

    pub fn is_error_placeholder(&self) -> bool {
        matches!(self, Type::Error_)
    }

    /// Peel through `TypeAlias` wrappers to the underlying structural type.
    /// Transparent to all structural queries (invariant 3); user-facing
    /// diagnostic text must be produced from the unaliased name *before*
    /// calling this.
    pub fn unwrap_aliases<'a>(ty: &'a Type<'ast>) -> &'a Type<'ast> {
        let mut current = ty;
        while let Type::TypeAlias { aliased: Some(inner), .. } = current {
            current = inner;
        }
        current
    }
}

impl<'ast> fmt::Display for Type<'ast> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Void => write!(f, "void"),
            Type::Bool => write!(f, "bool"),
            Type::Char => write!(f, "char"),
            Type::String => write!(f, "str"),
            Type::Integer { bits, signed } => {
                let prefix = if *signed == Signedness::Signed { "i" } else { "u" };
                match bits {
                    0 => write!(f, "{prefix}size"),
                    _ => write!(f, "{prefix}{bits}"),
                }
            }
            Type::Float { bits } => write!(f, "f{bits}"),
            Type::Array { element, length } => write!(f, "[{element}; {length}]"),
            Type::Slice { element, mutable } => {
                if *mutable {
                    write!(f, "[]mut {element}")
                } else {
                    write!(f, "[]{element}")
                }
            }
            Type::Tuple(elems) => {
                write!(f, "(")?;
                for (i, e) in elems.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{e}")?;
                }
                write!(f, ")")
            }
            Type::Optional(inner) => write!(f, "{inner}?"),
            Type::Reference { pointee, mutable } => {
                if *mutable {
                    write!(f, "&mut {pointee}")
                } else {
                    write!(f, "&{pointee}")
                }
            }
            Type::Pointer { pointee, mutable } => {
                if *mutable {
                    write!(f, "ptr mut {pointee}")
                } else {
                    write!(f, "ptr {pointee}")
                }
            }
            Type::Function { params, ret, variadic } => {
                write!(f, "func(")?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{p}")?;
                }
                if *variadic {
                    write!(f, ", ...")?;
                }
                write!(f, ") -> {ret}")
            }
            Type::Struct { name, .. } => write!(f, "{name}"),
            Type::Enum { name, .. } => write!(f, "{name}"),
            Type::TypeAlias { name, .. } => write!(f, "{name}"),
            Type::Error { success } => write!(f, "!{success}"),
            Type::Range { element } => write!(f, "Range<{element}>"),
            Type::Generic { name, .. } => write!(f, "{name}"),
            Type::GenericInstance { base, args } => {
                write!(f, "{base}<")?;
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{a}")?;
                }
                write!(f, ">")
            }
            Type::TypeVar(id) => write!(f, "?{id}"),
            Type::VarArgs(inner) => write!(f, "VarArgs<{inner}>"),
            Type::Value => write!(f, "<value>"),
            Type::Error_ => write!(f, "<error>"),
        }
    }
}

/// A monotonic counter for fresh `TypeVar`s, held by the context.
#[derive(Default)]
pub struct TypeVarCounter(Cell<u32>);

impl TypeVarCounter {
    pub fn fresh(&self) -> u32 {
        let id = self.0.get();
        self.0.set(id + 1);
        id
    }
}
