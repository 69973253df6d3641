//! The closed token enumeration and its keyword table.

use lumen_diagnostics::SourceLocation;

/// The closed set of token kinds the lexer ever produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    EndOfFile,
    Invalid,

    Identifier,
    BuiltinIdentifier,

    IntegerLiteral,
    FloatLiteral,
    CharLiteral,
    StringLiteral,
    RawStringLiteral,
    MultilineStringLiteral,

    // Keywords
    KwVar,
    KwConst,
    KwFunc,
    KwReturn,
    KwStruct,
    KwEnum,
    KwTrait,
    KwImpl,
    KwPub,
    KwPriv,
    KwInternal,
    KwIf,
    KwElif,
    KwElse,
    KwMatch,
    KwWhile,
    KwLoop,
    KwFor,
    KwIn,
    KwBreak,
    KwContinue,
    KwTrue,
    KwFalse,
    KwAsync,
    KwAwait,
    KwAs,
    KwSelfValue,
    KwSelfType,
    KwMut,
    KwRef,
    KwPtr,
    KwVoid,
    KwDefer,
    KwType,
    KwWhere,
    KwNone,
    KwOrElse,

    // Primitive type keywords
    KwI8,
    KwI16,
    KwI32,
    KwI64,
    KwI128,
    KwIsize,
    KwU8,
    KwU16,
    KwU32,
    KwU64,
    KwU128,
    KwUsize,
    KwF32,
    KwF64,
    KwBool,
    KwChar,
    KwStr,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Amp,
    Pipe,
    Caret,
    Tilde,
    Shl,
    Shr,
    AmpAmp,
    PipePipe,
    Bang,
    Eq,
    EqEq,
    BangEq,
    Lt,
    Gt,
    Le,
    Ge,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    PercentEq,
    AmpEq,
    PipeEq,
    CaretEq,
    ShlEq,
    ShrEq,
    Arrow,
    FatArrow,
    DotDot,
    DotDotEq,
    Ellipsis,
    Question,
    QuestionDot,

    // Punctuation
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Colon,
    ColonColon,
    Semicolon,
    Dot,
    At,
    Underscore,
}

impl TokenKind {
    pub fn is_keyword(self) -> bool {
        matches!(
            self,
            TokenKind::KwVar
                | TokenKind::KwConst
                | TokenKind::KwFunc
                | TokenKind::KwReturn
                | TokenKind::KwStruct
                | TokenKind::KwEnum
                | TokenKind::KwTrait
                | TokenKind::KwImpl
                | TokenKind::KwPub
                | TokenKind::KwPriv
                | TokenKind::KwInternal
                | TokenKind::KwIf
                | TokenKind::KwElif
                | TokenKind::KwElse
                | TokenKind::KwMatch
                | TokenKind::KwWhile
                | TokenKind::KwLoop
                | TokenKind::KwFor
                | TokenKind::KwIn
                | TokenKind::KwBreak
                | TokenKind::KwContinue
                | TokenKind::KwTrue
                | TokenKind::KwFalse
                | TokenKind::KwAsync
                | TokenKind::KwAwait
                | TokenKind::KwAs
                | TokenKind::KwSelfValue
                | TokenKind::KwSelfType
                | TokenKind::KwMut
                | TokenKind::KwRef
                | TokenKind::KwPtr
                | TokenKind::KwVoid
                | TokenKind::KwDefer
                | TokenKind::KwType
                | TokenKind::KwWhere
                | TokenKind::KwNone
                | TokenKind::KwOrElse
                | TokenKind::KwI8
                | TokenKind::KwI16
                | TokenKind::KwI32
                | TokenKind::KwI64
                | TokenKind::KwI128
                | TokenKind::KwIsize
                | TokenKind::KwU8
                | TokenKind::KwU16
                | TokenKind::KwU32
                | TokenKind::KwU64
                | TokenKind::KwU128
                | TokenKind::KwUsize
                | TokenKind::KwF32
                | TokenKind::KwF64
                | TokenKind::KwBool
                | TokenKind::KwChar
                | TokenKind::KwStr
        )
    }

    pub fn is_literal(self) -> bool {
        matches!(
            self,
            TokenKind::IntegerLiteral
                | TokenKind::FloatLiteral
                | TokenKind::CharLiteral
                | TokenKind::StringLiteral
                | TokenKind::RawStringLiteral
                | TokenKind::MultilineStringLiteral
                | TokenKind::KwTrue
                | TokenKind::KwFalse
                | TokenKind::KwNone
        )
    }

    pub fn is_operator(self) -> bool {
        matches!(
            self,
            TokenKind::Plus
                | TokenKind::Minus
                | TokenKind::Star
                | TokenKind::Slash
                | TokenKind::Percent
                | TokenKind::Amp
                | TokenKind::Pipe
                | TokenKind::Caret
                | TokenKind::Tilde
                | TokenKind::Shl
                | TokenKind::Shr
                | TokenKind::AmpAmp
                | TokenKind::PipePipe
                | TokenKind::Bang
                | TokenKind::Eq
                | TokenKind::EqEq
                | TokenKind::BangEq
                | TokenKind::Lt
                | TokenKind::Gt
                | TokenKind::Le
                | TokenKind::Ge
                | TokenKind::PlusEq
                | TokenKind::MinusEq
                | TokenKind::StarEq
                | TokenKind::SlashEq
                | TokenKind::PercentEq
                | TokenKind::AmpEq
                | TokenKind::PipeEq
                | TokenKind::CaretEq
                | TokenKind::ShlEq
                | TokenKind::ShrEq
        )
    }
}

/// The fixed keyword table consulted after scanning a raw identifier word.
pub fn lookup_keyword(word: &str) -> Option<TokenKind> {
    use TokenKind::*;
    Some(match word {
        "var" => KwVar,
        "const" => KwConst,
        "func" => KwFunc,
        "return" => KwReturn,
        "struct" => KwStruct,
        "enum" => KwEnum,
        "trait" => KwTrait,
        "impl" => KwImpl,
        "pub" => KwPub,
        "priv" => KwPriv,
        "internal" => KwInternal,
        "if" => KwIf,
        "elif" => KwElif,
        "else" => KwElse,
        "match" => KwMatch,
        "while" => KwWhile,
        "loop" => KwLoop,
        "for" => KwFor,
        "in" => KwIn,
        "break" => KwBreak,
        "continue" => KwContinue,
        "true" => KwTrue,
        "false" => KwFalse,
        "async" => KwAsync,
        "await" => KwAwait,
        "as" => KwAs,
        "self" => KwSelfValue,
        "Self" => KwSelfType,
        "mut" => KwMut,
        "ref" => KwRef,
        "ptr" => KwPtr,
        "void" => KwVoid,
        "defer" => KwDefer,
        "type" => KwType,
        "where" => KwWhere,
        "None" => KwNone,
        "orelse" => KwOrElse,
        "i8" => KwI8,
        "i16" => KwI16,
        "i32" => KwI32,
        "i64" => KwI64,
        "i128" => KwI128,
        "isize" => KwIsize,
        "u8" => KwU8,
        "u16" => KwU16,
        "u32" => KwU32,
        "u64" => KwU64,
        "u128" => KwU128,
        "usize" => KwUsize,
        "f32" => KwF32,
        "f64" => KwF64,
        "bool" => KwBool,
        "char" => KwChar,
        "str" => KwStr,
        _ => return None,
    })
}

/// A lexed token: its kind, its first byte's location, its verbatim
/// surface text, and any doc comment attached from a preceding `///` run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub location: SourceLocation,
    pub text: String,
    pub doc_comment: Option<String>,
}

impl Token {
    pub fn new(kind: TokenKind, location: SourceLocation, text: impl Into<String>) -> Self {
        Token {
            kind,
            location,
            text: text.into(),
            doc_comment: None,
        }
    }

    pub fn with_doc_comment(mut self, doc: Option<String>) -> Self {
        self.doc_comment = doc;
        self
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    pub fn has_doc_comment(&self) -> bool {
        self.doc_comment.is_some()
    }
}
