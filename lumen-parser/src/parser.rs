//! Hand-written recursive-descent parser with Pratt-style expression
//! precedence. Consumes tokens from a [`Lexer`] and allocates every node
//! out of an [`AstContext`].

use lumen_ast::*;
use lumen_diagnostics::{DiagID, SourceLocation, SourceRange};
use lumen_lexer::{Lexer, Token, TokenKind};

/// How many tokens the parser is allowed to skip while synchronizing after
/// one failed production, before giving up and returning a placeholder.
const MAX_RECOVERY_SKIPS: usize = 64;

pub struct Parser<'ast, 'src, 'eng, 'sm> {
    ctx: &'ast AstContext<'ast>,
    lexer: Lexer<'src, 'eng, 'sm>,
    current: Token,
    /// Suppresses the struct-literal production while parsing the head
    /// expression of `if`/`while`/`match`/`for`'s iterable (§4.5).
    no_struct_literal: u32,
}

impl<'ast, 'src, 'eng, 'sm> Parser<'ast, 'src, 'eng, 'sm> {
    pub fn new(ctx: &'ast AstContext<'ast>, mut lexer: Lexer<'src, 'eng, 'sm>) -> Self {
        let current = lexer.lex();
        Parser { ctx, lexer, current, no_struct_literal: 0 }
    }

    // ---------------------------------------------------------------
    // Token stream primitives
    // ---------------------------------------------------------------

    fn bump(&mut self) -> Token {
        let next = self.lexer.lex();
        std::mem::replace(&mut self.current, next)
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    fn at_eof(&self) -> bool {
        self.current.kind == TokenKind::EndOfFile
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Consume `kind` or report err 2001 and leave the cursor in place.
    fn expect(&mut self, kind: TokenKind) -> Token {
        if self.check(kind) {
            self.bump()
        } else {
            self.report_arg2(DiagID::ErrExpectedToken, self.current.location, format!("{kind:?}"), self.current.text.clone());
            self.current.clone()
        }
    }

    fn expect_identifier(&mut self) -> &'ast str {
        if self.check(TokenKind::Identifier) {
            let tok = self.bump();
            self.ctx.alloc_str(tok.text)
        } else {
            self.report_arg(DiagID::ErrExpectedIdentifier, self.current.location, self.current.text.clone());
            self.ctx.alloc_str("<error>")
        }
    }

    fn range_from(&self, begin: SourceLocation) -> SourceRange {
        SourceRange::new(begin, self.current.location)
    }

    fn report(&mut self, id: DiagID, loc: SourceLocation) {
        self.lexer.diag().report(id, loc).emit();
    }

    fn report_arg(&mut self, id: DiagID, loc: SourceLocation, arg: impl Into<String>) {
        self.lexer.diag().report(id, loc).arg(arg).emit();
    }

    fn report_arg2(&mut self, id: DiagID, loc: SourceLocation, a: impl Into<String>, b: impl Into<String>) {
        self.lexer.diag().report(id, loc).arg(a).arg(b).emit();
    }

    /// Split a pending `>>` into two `>` tokens (nested generic closes).
    fn split_shr(&mut self) {
        if self.current.kind == TokenKind::Shr {
            let loc = self.current.location;
            let synthetic = Token::new(TokenKind::Gt, SourceLocation::new(loc.offset() + 1), ">");
            self.lexer.push_front(synthetic);
            self.current = Token::new(TokenKind::Gt, loc, ">");
        }
    }

    /// Skip tokens until one of `sync` is next, a statement terminator, a
    /// closing bracket, or EOF. Always makes progress.
    fn synchronize(&mut self, sync: &[TokenKind]) {
        let mut skipped = 0;
        while !self.at_eof() && skipped < MAX_RECOVERY_SKIPS {
            if sync.contains(&self.current.kind) {
                return;
            }
            if matches!(self.current.kind, TokenKind::Semicolon | TokenKind::RBrace) {
                return;
            }
            if is_decl_start(self.current.kind) {
                return;
            }
            self.bump();
            skipped += 1;
        }
    }

    // ---------------------------------------------------------------
    // Compilation unit
    // ---------------------------------------------------------------

    pub fn parse_compilation_unit(&mut self) -> CompilationUnit<'ast> {
        let mut decls = Vec::new();
        while !self.at_eof() {
            if let Some(decl) = self.parse_top_level_decl() {
                decls.push(self.ctx.alloc_decl(decl) as &'ast Decl<'ast>);
            }
        }
        CompilationUnit { decls: self.ctx.alloc_slice(decls) }
    }

    fn parse_top_level_decl(&mut self) -> Option<Decl<'ast>> {
        let visibility = self.parse_visibility();
        let is_async = self.eat(TokenKind::KwAsync);

        let decl = match self.current.kind {
            TokenKind::KwVar => Some(self.parse_var_decl(visibility)),
            TokenKind::KwConst => Some(self.parse_const_decl(visibility)),
            TokenKind::KwFunc => Some(self.parse_func_decl(visibility, is_async)),
            TokenKind::KwStruct => Some(self.parse_struct_decl(visibility)),
            TokenKind::KwEnum => Some(self.parse_enum_decl(visibility)),
            TokenKind::KwType => Some(self.parse_type_alias_decl(visibility)),
            TokenKind::KwTrait => Some(self.parse_trait_decl(visibility)),
            TokenKind::KwImpl => Some(self.parse_impl_decl()),
            _ => {
                self.report_arg(DiagID::ErrExpectedTopLevelItem, self.current.location, self.current.text.clone());
                self.synchronize(&[]);
                None
            }
        };
        decl
    }

    fn parse_visibility(&mut self) -> Visibility {
        match self.current.kind {
            TokenKind::KwPub => {
                self.bump();
                Visibility::Public
            }
            TokenKind::KwInternal => {
                self.bump();
                Visibility::Internal
            }
            TokenKind::KwPriv => {
                self.bump();
                Visibility::Private
            }
            _ => Visibility::Private,
        }
    }

    // ---------------------------------------------------------------
    // Declarations
    // ---------------------------------------------------------------

    fn parse_var_decl(&mut self, visibility: Visibility) -> Decl<'ast> {
        let begin = self.current.location;
        self.expect(TokenKind::KwVar);
        let mutable = self.eat(TokenKind::KwMut);
        let name = self.expect_identifier();
        let type_annotation = if self.eat(TokenKind::Colon) { Some(self.parse_type_expr()) } else { None };
        let initializer = if self.eat(TokenKind::Eq) { Some(self.parse_expr()) } else { None };
        self.expect(TokenKind::Semicolon);
        Decl::Var(VarDecl {
            name,
            type_annotation,
            initializer,
            mutable,
            visibility,
            destructure: None,
            range: self.range_from(begin),
        })
    }

    fn parse_const_decl(&mut self, visibility: Visibility) -> Decl<'ast> {
        let begin = self.current.location;
        self.expect(TokenKind::KwConst);
        let name = self.expect_identifier();
        let type_annotation = if self.eat(TokenKind::Colon) { Some(self.parse_type_expr()) } else { None };
        self.expect(TokenKind::Eq);
        let initializer = self.parse_expr();
        self.expect(TokenKind::Semicolon);
        Decl::Const(ConstDecl { name, type_annotation, initializer, visibility, range: self.range_from(begin) })
    }

    fn parse_func_decl(&mut self, visibility: Visibility, is_async: bool) -> Decl<'ast> {
        let begin = self.current.location;
        self.expect(TokenKind::KwFunc);
        let name = self.expect_identifier();
        let generics = self.parse_generic_param_list();
        self.expect(TokenKind::LParen);
        let mut params = Vec::new();
        while !self.check(TokenKind::RParen) && !self.at_eof() {
            let p = self.parse_param();
            let is_variadic = p.kind == ParamKind::Variadic;
            params.push(self.ctx.alloc(p));
            if is_variadic && !self.check(TokenKind::RParen) {
                self.report(DiagID::ErrVariadicParamMustBeLast, self.current.location);
            }
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen);
        let is_error_returning = self.eat(TokenKind::Bang);
        let return_type = if self.eat(TokenKind::Arrow) { Some(self.parse_type_expr()) } else { None };
        let body = if self.check(TokenKind::LBrace) { Some(self.parse_block_expr()) } else { self.expect(TokenKind::Semicolon); None };
        Decl::Func(FuncDecl {
            name,
            params: self.ctx.alloc_slice(params),
            return_type,
            body,
            is_async,
            is_error_returning,
            visibility,
            generics,
            extern_link_name: None,
            range: self.range_from(begin),
        })
    }

    fn parse_generic_param_list(&mut self) -> &'ast [&'ast GenericParam<'ast>] {
        if !self.eat(TokenKind::Lt) {
            return &[];
        }
        let mut params = Vec::new();
        while !self.check(TokenKind::Gt) && !self.check(TokenKind::Shr) && !self.at_eof() {
            let begin = self.current.location;
            let name = self.expect_identifier();
            let mut bounds = Vec::new();
            if self.eat(TokenKind::Colon) {
                bounds.push(self.expect_identifier());
                while self.eat(TokenKind::Plus) {
                    bounds.push(self.expect_identifier());
                }
            }
            let gp = self.ctx.alloc(GenericParam {
                name,
                bounds: self.ctx.alloc_slice(bounds),
                range: self.range_from(begin),
            });
            params.push(gp);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.split_shr();
        self.expect(TokenKind::Gt);
        self.ctx.alloc_slice(params)
    }

    fn parse_param(&mut self) -> ParamDecl<'ast> {
        let begin = self.current.location;
        if self.check(TokenKind::KwSelfValue) {
            self.bump();
            return ParamDecl { name: "self", type_annotation: None, default_value: None, mutable: false, kind: ParamKind::SelfValue, range: self.range_from(begin) };
        }
        if self.check(TokenKind::Amp) {
            let save = self.current.clone();
            self.bump();
            let mutable = self.eat(TokenKind::KwMut);
            if self.check(TokenKind::KwSelfValue) {
                self.bump();
                let kind = if mutable { ParamKind::MutRefSelf } else { ParamKind::RefSelf };
                return ParamDecl { name: "self", type_annotation: None, default_value: None, mutable: false, kind, range: self.range_from(begin) };
            }
            // Not actually `&self` / `&mut self`: fall through to a
            // normal parameter parse is not supported here (a reference
            // type on a bare param must be spelled out via `name: &T`),
            // report and recover.
            self.report_arg(DiagID::ErrExpectedIdentifier, save.location, save.text.clone());
        }
        let mutable = self.eat(TokenKind::KwMut);
        let name = self.expect_identifier();
        if self.eat(TokenKind::Ellipsis) {
            return ParamDecl { name, type_annotation: None, default_value: None, mutable, kind: ParamKind::Variadic, range: self.range_from(begin) };
        }
        let type_annotation = if self.eat(TokenKind::Colon) { Some(self.parse_type_expr()) } else { None };
        let default_value = if self.eat(TokenKind::Eq) { Some(self.parse_expr()) } else { None };
        ParamDecl { name, type_annotation, default_value, mutable, kind: ParamKind::Normal, range: self.range_from(begin) }
    }

    fn parse_struct_decl(&mut self, visibility: Visibility) -> Decl<'ast> {
        let begin = self.current.location;
        self.expect(TokenKind::KwStruct);
        let name = self.expect_identifier();
        let generics = self.parse_generic_param_list();
        self.expect(TokenKind::LBrace);
        let mut fields = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.at_eof() {
            let fbegin = self.current.location;
            let fvis = self.parse_visibility();
            let fname = self.expect_identifier();
            self.expect(TokenKind::Colon);
            let fty = self.parse_type_expr();
            let field = self.ctx.alloc(FieldDecl { name: fname, type_annotation: fty, visibility: fvis, range: self.range_from(fbegin) });
            fields.push(field);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RBrace);
        Decl::Struct(StructDecl { name, fields: self.ctx.alloc_slice(fields), generics, visibility, range: self.range_from(begin) })
    }

    fn parse_enum_decl(&mut self, visibility: Visibility) -> Decl<'ast> {
        let begin = self.current.location;
        self.expect(TokenKind::KwEnum);
        let name = self.expect_identifier();
        let generics = self.parse_generic_param_list();
        self.expect(TokenKind::LBrace);
        let mut variants = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.at_eof() {
            let vbegin = self.current.location;
            let vname = self.expect_identifier();
            let payload = if self.eat(TokenKind::LParen) {
                let mut types = Vec::new();
                while !self.check(TokenKind::RParen) && !self.at_eof() {
                    types.push(self.parse_type_expr());
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(TokenKind::RParen);
                EnumVariantPayload::Tuple(self.ctx.alloc_slice(types))
            } else if self.eat(TokenKind::LBrace) {
                let mut fields = Vec::new();
                while !self.check(TokenKind::RBrace) && !self.at_eof() {
                    let fbegin = self.current.location;
                    let fname = self.expect_identifier();
                    self.expect(TokenKind::Colon);
                    let fty = self.parse_type_expr();
                    fields.push(self.ctx.alloc(FieldDecl { name: fname, type_annotation: fty, visibility: Visibility::Public, range: self.range_from(fbegin) }));
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(TokenKind::RBrace);
                EnumVariantPayload::Struct(self.ctx.alloc_slice(fields))
            } else {
                EnumVariantPayload::Unit
            };
            let discriminant = if self.eat(TokenKind::Eq) {
                match self.parse_integer_literal_value() {
                    Some(v) => Some(v as i64),
                    None => None,
                }
            } else {
                None
            };
            variants.push(self.ctx.alloc(EnumVariantDecl { name: vname, payload, discriminant, range: self.range_from(vbegin) }));
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RBrace);
        Decl::Enum(EnumDecl { name, variants: self.ctx.alloc_slice(variants), generics, visibility, range: self.range_from(begin) })
    }

    fn parse_integer_literal_value(&mut self) -> Option<u128> {
        if self.check(TokenKind::IntegerLiteral) {
            let tok = self.bump();
            tok.text.parse::<u128>().ok()
        } else {
            None
        }
    }

    fn parse_type_alias_decl(&mut self, visibility: Visibility) -> Decl<'ast> {
        let begin = self.current.location;
        self.expect(TokenKind::KwType);
        let name = self.expect_identifier();
        let aliased = if self.eat(TokenKind::Eq) { Some(self.parse_type_expr()) } else { None };
        self.expect(TokenKind::Semicolon);
        Decl::TypeAlias(TypeAliasDecl { name, aliased, visibility, range: self.range_from(begin) })
    }

    fn parse_trait_decl(&mut self, visibility: Visibility) -> Decl<'ast> {
        let begin = self.current.location;
        self.expect(TokenKind::KwTrait);
        let name = self.expect_identifier();
        let generics = self.parse_generic_param_list();
        let mut super_traits = Vec::new();
        if self.eat(TokenKind::Colon) {
            super_traits.push(self.expect_identifier());
            while self.eat(TokenKind::Plus) {
                super_traits.push(self.expect_identifier());
            }
        }
        self.expect(TokenKind::LBrace);
        let mut methods = Vec::new();
        let mut associated_types = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.at_eof() {
            if self.check(TokenKind::KwType) {
                let tbegin = self.current.location;
                self.bump();
                let tname = self.expect_identifier();
                self.expect(TokenKind::Semicolon);
                associated_types.push(self.ctx.alloc(TypeAliasDecl { name: tname, aliased: None, visibility: Visibility::Public, range: self.range_from(tbegin) }));
                continue;
            }
            let is_async = self.eat(TokenKind::KwAsync);
            if self.check(TokenKind::KwFunc) {
                let Decl::Func(f) = self.parse_func_decl(Visibility::Public, is_async) else { unreachable!() };
                methods.push(self.ctx.alloc(f));
            } else {
                self.report_arg(DiagID::ErrExpectedTopLevelItem, self.current.location, self.current.text.clone());
                self.synchronize(&[TokenKind::RBrace]);
            }
        }
        self.expect(TokenKind::RBrace);
        Decl::Trait(TraitDecl {
            name,
            methods: self.ctx.alloc_slice(methods),
            associated_types: self.ctx.alloc_slice(associated_types),
            super_traits: self.ctx.alloc_slice(super_traits),
            generics,
            visibility,
            range: self.range_from(begin),
        })
    }

    fn parse_impl_decl(&mut self) -> Decl<'ast> {
        let begin = self.current.location;
        self.expect(TokenKind::KwImpl);
        let generics = self.parse_generic_param_list();
        let first = self.parse_type_expr();
        let (trait_name, target) = if self.eat(TokenKind::KwFor) {
            let trait_name = match &first.kind {
                TypeExprKind::Named { path, .. } => Some(*path),
                _ => None,
            };
            (trait_name, self.parse_type_expr())
        } else {
            (None, first)
        };
        self.expect(TokenKind::LBrace);
        let mut methods = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.at_eof() {
            let visibility = self.parse_visibility();
            let is_async = self.eat(TokenKind::KwAsync);
            if self.check(TokenKind::KwFunc) {
                let Decl::Func(f) = self.parse_func_decl(visibility, is_async) else { unreachable!() };
                methods.push(self.ctx.alloc(f));
            } else {
                self.report_arg(DiagID::ErrExpectedTopLevelItem, self.current.location, self.current.text.clone());
                self.synchronize(&[TokenKind::RBrace]);
            }
        }
        self.expect(TokenKind::RBrace);
        Decl::Impl(ImplDecl {
            target,
            trait_name,
            methods: self.ctx.alloc_slice(methods),
            associated_type_bindings: self.ctx.alloc_slice(Vec::new()),
            generics,
            range: self.range_from(begin),
        })
    }

    // ---------------------------------------------------------------
    // Types
    // ---------------------------------------------------------------

    fn parse_type_expr(&mut self) -> &'ast TypeExpr<'ast> {
        let begin = self.current.location;
        let kind = match self.current.kind {
            TokenKind::KwVoid => {
                self.bump();
                TypeExprKind::Void
            }
            TokenKind::KwSelfType => {
                self.bump();
                TypeExprKind::SelfType
            }
            TokenKind::Bang => {
                self.bump();
                TypeExprKind::ErrorReturning(self.parse_type_expr())
            }
            TokenKind::Amp => {
                self.bump();
                let mutable = self.eat(TokenKind::KwMut);
                TypeExprKind::Reference { pointee: self.parse_type_expr(), mutable }
            }
            TokenKind::KwPtr => {
                self.bump();
                let mutable = self.eat(TokenKind::KwMut);
                TypeExprKind::Pointer { pointee: self.parse_type_expr(), mutable }
            }
            TokenKind::LBracket => {
                self.bump();
                if self.eat(TokenKind::RBracket) {
                    let mutable = self.eat(TokenKind::KwMut);
                    TypeExprKind::Slice { element: self.parse_type_expr(), mutable }
                } else {
                    let element = self.parse_type_expr();
                    self.expect(TokenKind::Semicolon);
                    let length = self.parse_expr();
                    self.expect(TokenKind::RBracket);
                    TypeExprKind::Array { element, length }
                }
            }
            TokenKind::LParen => {
                self.bump();
                let mut elems = Vec::new();
                while !self.check(TokenKind::RParen) && !self.at_eof() {
                    elems.push(self.parse_type_expr());
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(TokenKind::RParen);
                TypeExprKind::Tuple(self.ctx.alloc_slice(elems))
            }
            TokenKind::KwFunc => {
                self.bump();
                self.expect(TokenKind::LParen);
                let mut params = Vec::new();
                while !self.check(TokenKind::RParen) && !self.at_eof() {
                    params.push(self.parse_type_expr());
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(TokenKind::RParen);
                let ret = if self.eat(TokenKind::Arrow) { Some(self.parse_type_expr()) } else { None };
                TypeExprKind::Function { params: self.ctx.alloc_slice(params), ret }
            }
            _ if is_named_type_start(self.current.kind) => {
                let path = self.type_path_text();
                let type_args = if self.eat(TokenKind::Lt) {
                    let mut args = Vec::new();
                    while !self.check(TokenKind::Gt) && !self.check(TokenKind::Shr) && !self.at_eof() {
                        args.push(self.parse_type_expr());
                        if !self.eat(TokenKind::Comma) {
                            break;
                        }
                    }
                    self.split_shr();
                    self.expect(TokenKind::Gt);
                    self.ctx.alloc_slice(args)
                } else {
                    &[]
                };
                TypeExprKind::Named { path, type_args }
            }
            _ => {
                self.report_arg(DiagID::ErrExpectedType, self.current.location, self.current.text.clone());
                TypeExprKind::Void
            }
        };
        let node = TypeExpr::new(kind, self.range_from(begin));
        let mut result = self.ctx.alloc_type_expr(node);
        while self.eat(TokenKind::Question) {
            let optional = TypeExpr::new(TypeExprKind::Optional(result), self.range_from(begin));
            result = self.ctx.alloc_type_expr(optional);
        }
        result
    }

    fn type_path_text(&mut self) -> &'ast str {
        let tok = self.bump();
        self.ctx.alloc_str(tok.text)
    }

    // ---------------------------------------------------------------
    // Statements and blocks
    // ---------------------------------------------------------------

    fn parse_block_expr(&mut self) -> &'ast Expr<'ast> {
        let begin = self.current.location;
        self.expect(TokenKind::LBrace);
        let mut stmts = Vec::new();
        let mut tail = None;
        while !self.check(TokenKind::RBrace) && !self.at_eof() {
            if self.is_expr_start() {
                let save_checkpoint = self.current.location;
                let expr = self.parse_expr();
                if self.check(TokenKind::RBrace) && !Self::requires_semicolon_always(expr) {
                    tail = Some(expr);
                    break;
                }
                let _ = save_checkpoint;
                self.expect(TokenKind::Semicolon);
                stmts.push(self.ctx.alloc_stmt(Stmt::new(StmtKind::Expr(expr), expr.range)));
            } else if let Some(stmt) = self.parse_stmt() {
                stmts.push(stmt);
            } else {
                break;
            }
        }
        self.expect(TokenKind::RBrace);
        let block = Expr::new(ExprKind::Block { stmts: self.ctx.alloc_slice(stmts), tail }, self.range_from(begin));
        self.ctx.alloc_expr(block)
    }

    fn requires_semicolon_always(_expr: &Expr<'_>) -> bool {
        false
    }

    fn is_expr_start(&self) -> bool {
        !matches!(self.current.kind, TokenKind::KwVar | TokenKind::KwConst | TokenKind::KwReturn | TokenKind::KwDefer)
    }

    fn parse_stmt(&mut self) -> Option<&'ast Stmt<'ast>> {
        let begin = self.current.location;
        match self.current.kind {
            TokenKind::KwVar => {
                let decl = self.parse_var_decl(Visibility::Private);
                let d = self.ctx.alloc_decl(decl);
                Some(self.ctx.alloc_stmt(Stmt::new(StmtKind::Decl(d), self.range_from(begin))))
            }
            TokenKind::KwConst => {
                let decl = self.parse_const_decl(Visibility::Private);
                let d = self.ctx.alloc_decl(decl);
                Some(self.ctx.alloc_stmt(Stmt::new(StmtKind::Decl(d), self.range_from(begin))))
            }
            TokenKind::KwReturn => {
                self.bump();
                let value = if self.check(TokenKind::Semicolon) { None } else { Some(self.parse_expr()) };
                self.expect(TokenKind::Semicolon);
                Some(self.ctx.alloc_stmt(Stmt::new(StmtKind::Return(value), self.range_from(begin))))
            }
            TokenKind::KwDefer => {
                self.bump();
                let body = self.parse_expr();
                self.expect(TokenKind::Semicolon);
                Some(self.ctx.alloc_stmt(Stmt::new(StmtKind::Defer(body), self.range_from(begin))))
            }
            TokenKind::RBrace | TokenKind::EndOfFile => None,
            _ => {
                self.report_arg(DiagID::ErrExpectedStatement, self.current.location, self.current.text.clone());
                self.synchronize(&[]);
                self.eat(TokenKind::Semicolon);
                None
            }
        }
    }

    // ---------------------------------------------------------------
    // Expressions (Pratt parser)
    // ---------------------------------------------------------------

    pub fn parse_expr(&mut self) -> &'ast Expr<'ast> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> &'ast Expr<'ast> {
        let begin = self.current.location;
        let target = self.parse_binary(1);
        let op = match self.current.kind {
            TokenKind::Eq => Some(None),
            TokenKind::PlusEq => Some(Some(BinaryOp::Add)),
            TokenKind::MinusEq => Some(Some(BinaryOp::Sub)),
            TokenKind::StarEq => Some(Some(BinaryOp::Mul)),
            TokenKind::SlashEq => Some(Some(BinaryOp::Div)),
            TokenKind::PercentEq => Some(Some(BinaryOp::Rem)),
            TokenKind::AmpEq => Some(Some(BinaryOp::BitAnd)),
            TokenKind::PipeEq => Some(Some(BinaryOp::BitOr)),
            TokenKind::CaretEq => Some(Some(BinaryOp::BitXor)),
            TokenKind::ShlEq => Some(Some(BinaryOp::Shl)),
            TokenKind::ShrEq => Some(Some(BinaryOp::Shr)),
            _ => None,
        };
        if let Some(assign_op) = op {
            self.bump();
            if !target.is_lvalue() {
                self.report(DiagID::ErrInvalidAssignmentTarget, begin);
            }
            let value = self.parse_assignment();
            let node = Expr::new(ExprKind::Assign { op: assign_op, target, value }, self.range_from(begin));
            return self.ctx.alloc_expr(node);
        }
        target
    }

    /// Precedence-climbing binary operator parser. `min_prec` is the
    /// lowest precedence level (1 = logical-or) this call will consume.
    fn parse_binary(&mut self, min_prec: u8) -> &'ast Expr<'ast> {
        let begin = self.current.location;
        let mut lhs = self.parse_range(begin);
        loop {
            let Some((op, prec)) = binary_op_and_prec(self.current.kind) else { break };
            if prec < min_prec {
                break;
            }
            self.bump();
            let rhs = self.parse_binary_rhs(prec);
            lhs = self.ctx.alloc_expr(Expr::new(ExprKind::Binary { op, lhs, rhs }, self.range_from(begin)));
        }
        lhs
    }

    fn parse_binary_rhs(&mut self, prec: u8) -> &'ast Expr<'ast> {
        // All binary levels are left-associative: the rhs parses one
        // level tighter by requiring prec + 1 as the new floor.
        let begin = self.current.location;
        let mut rhs = self.parse_range(begin);
        loop {
            let Some((op, p)) = binary_op_and_prec(self.current.kind) else { break };
            if p <= prec {
                break;
            }
            self.bump();
            let inner = self.parse_binary_rhs(p);
            rhs = self.ctx.alloc_expr(Expr::new(ExprKind::Binary { op, lhs: rhs, rhs: inner }, self.range_from(begin)));
        }
        rhs
    }

    fn parse_range(&mut self, begin: SourceLocation) -> &'ast Expr<'ast> {
        if matches!(self.current.kind, TokenKind::DotDot | TokenKind::DotDotEq) {
            let kind = if self.current.kind == TokenKind::DotDotEq { RangeKind::Inclusive } else { RangeKind::Exclusive };
            self.bump();
            let high = if self.is_range_end() { None } else { Some(self.parse_additive()) };
            return self.ctx.alloc_expr(Expr::new(ExprKind::Range { low: None, high, kind }, self.range_from(begin)));
        }
        let low = self.parse_additive();
        if matches!(self.current.kind, TokenKind::DotDot | TokenKind::DotDotEq) {
            let kind = if self.current.kind == TokenKind::DotDotEq { RangeKind::Inclusive } else { RangeKind::Exclusive };
            self.bump();
            let high = if self.is_range_end() { None } else { Some(self.parse_additive()) };
            return self.ctx.alloc_expr(Expr::new(ExprKind::Range { low: Some(low), high, kind }, self.range_from(begin)));
        }
        low
    }

    fn is_range_end(&self) -> bool {
        matches!(self.current.kind, TokenKind::RBracket | TokenKind::RParen | TokenKind::RBrace | TokenKind::Comma | TokenKind::Semicolon)
    }

    fn parse_additive(&mut self) -> &'ast Expr<'ast> {
        let begin = self.current.location;
        let mut lhs = self.parse_multiplicative();
        while matches!(self.current.kind, TokenKind::Plus | TokenKind::Minus) {
            let op = if self.current.kind == TokenKind::Plus { BinaryOp::Add } else { BinaryOp::Sub };
            self.bump();
            let rhs = self.parse_multiplicative();
            lhs = self.ctx.alloc_expr(Expr::new(ExprKind::Binary { op, lhs, rhs }, self.range_from(begin)));
        }
        lhs
    }

    fn parse_multiplicative(&mut self) -> &'ast Expr<'ast> {
        let begin = self.current.location;
        let mut lhs = self.parse_cast();
        while matches!(self.current.kind, TokenKind::Star | TokenKind::Slash | TokenKind::Percent) {
            let op = match self.current.kind {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                _ => BinaryOp::Rem,
            };
            self.bump();
            let rhs = self.parse_cast();
            lhs = self.ctx.alloc_expr(Expr::new(ExprKind::Binary { op, lhs, rhs }, self.range_from(begin)));
        }
        lhs
    }

    fn parse_cast(&mut self) -> &'ast Expr<'ast> {
        let begin = self.current.location;
        let mut operand = self.parse_unary();
        while self.eat(TokenKind::KwAs) {
            let target = self.parse_type_expr();
            operand = self.ctx.alloc_expr(Expr::new(ExprKind::Cast { operand, target }, self.range_from(begin)));
        }
        operand
    }

    fn parse_unary(&mut self) -> &'ast Expr<'ast> {
        let begin = self.current.location;
        let op = match self.current.kind {
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Tilde => Some(UnaryOp::BitNot),
            TokenKind::Star => Some(UnaryOp::Deref),
            TokenKind::Amp => {
                let next_is_mut = self.lexer_peek_is_mut();
                Some(if next_is_mut { UnaryOp::RefMut } else { UnaryOp::Ref })
            }
            _ => None,
        };
        if let Some(op) = op {
            self.bump();
            if op == UnaryOp::RefMut {
                self.eat(TokenKind::KwMut);
            }
            let operand = self.parse_unary();
            return self.ctx.alloc_expr(Expr::new(ExprKind::Unary { op, operand }, self.range_from(begin)));
        }
        self.parse_postfix()
    }

    fn lexer_peek_is_mut(&mut self) -> bool {
        self.lexer.peek(0).kind == TokenKind::KwMut
    }

    fn parse_postfix(&mut self) -> &'ast Expr<'ast> {
        let begin = self.current.location;
        let mut expr = self.parse_primary();
        loop {
            expr = match self.current.kind {
                TokenKind::Dot => {
                    self.bump();
                    let name = self.expect_identifier();
                    self.ctx.alloc_expr(Expr::new(ExprKind::Member { receiver: expr, name, optional_chain: false }, self.range_from(begin)))
                }
                TokenKind::QuestionDot => {
                    self.bump();
                    let name = self.expect_identifier();
                    self.ctx.alloc_expr(Expr::new(ExprKind::Member { receiver: expr, name, optional_chain: true }, self.range_from(begin)))
                }
                TokenKind::LParen => {
                    self.bump();
                    let args = self.parse_call_args();
                    self.expect(TokenKind::RParen);
                    self.ctx.alloc_expr(Expr::new(ExprKind::Call { callee: expr, type_args: &[], args: self.ctx.alloc_slice(args) }, self.range_from(begin)))
                }
                TokenKind::LBracket => {
                    self.bump();
                    self.parse_index_or_slice(expr, begin)
                }
                TokenKind::KwAwait => {
                    self.bump();
                    self.ctx.alloc_expr(Expr::new(ExprKind::Await(expr), self.range_from(begin)))
                }
                TokenKind::Bang => {
                    self.bump();
                    self.ctx.alloc_expr(Expr::new(ExprKind::ErrorPropagate(expr), self.range_from(begin)))
                }
                TokenKind::KwOrElse => {
                    self.bump();
                    self.expect(TokenKind::Pipe);
                    let err_name = self.expect_identifier();
                    self.expect(TokenKind::Pipe);
                    let handler = self.parse_block_expr();
                    self.ctx.alloc_expr(Expr::new(ExprKind::ErrorHandle { operand: expr, err_name, handler }, self.range_from(begin)))
                }
                _ => break,
            };
        }
        expr
    }

    fn parse_index_or_slice(&mut self, receiver: &'ast Expr<'ast>, begin: SourceLocation) -> &'ast Expr<'ast> {
        if self.check(TokenKind::DotDot) {
            self.bump();
            let high = if self.check(TokenKind::RBracket) { None } else { Some(self.parse_expr()) };
            self.expect(TokenKind::RBracket);
            return self.ctx.alloc_expr(Expr::new(ExprKind::Slice { receiver, low: None, high }, self.range_from(begin)));
        }
        let first = self.parse_expr();
        if self.check(TokenKind::DotDot) {
            self.bump();
            let high = if self.check(TokenKind::RBracket) { None } else { Some(self.parse_expr()) };
            self.expect(TokenKind::RBracket);
            return self.ctx.alloc_expr(Expr::new(ExprKind::Slice { receiver, low: Some(first), high }, self.range_from(begin)));
        }
        self.expect(TokenKind::RBracket);
        self.ctx.alloc_expr(Expr::new(ExprKind::Index { receiver, index: first }, self.range_from(begin)))
    }

    fn parse_call_args(&mut self) -> Vec<CallArg<'ast>> {
        let mut args = Vec::new();
        while !self.check(TokenKind::RParen) && !self.at_eof() {
            let value = self.parse_expr();
            let is_spread = self.eat(TokenKind::Ellipsis);
            args.push(CallArg { value, is_spread });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        args
    }

    fn parse_primary(&mut self) -> &'ast Expr<'ast> {
        let begin = self.current.location;
        if self.check(TokenKind::Identifier)
            && self.lexer.peek(0).kind == TokenKind::Colon
            && matches!(self.lexer.peek(1).kind, TokenKind::KwLoop | TokenKind::KwWhile | TokenKind::KwFor)
        {
            let tok = self.bump();
            let label = Some(self.ctx.alloc_str(tok.text));
            self.bump(); // ':'
            return match self.current.kind {
                TokenKind::KwLoop => self.parse_loop_expr(label),
                TokenKind::KwWhile => self.parse_while_expr(label),
                TokenKind::KwFor => self.parse_for_expr(label),
                _ => unreachable!(),
            };
        }
        match self.current.kind.clone() {
            TokenKind::IntegerLiteral => {
                let tok = self.bump();
                let (digits, suffix) = split_numeric_suffix(&tok.text, true);
                let value = parse_int_literal_text(digits);
                self.ctx.alloc_expr(Expr::new(ExprKind::IntegerLiteral { value, suffix }, self.range_from(begin)))
            }
            TokenKind::FloatLiteral => {
                let tok = self.bump();
                let (digits, is_f32) = split_float_suffix(&tok.text);
                let value = digits.parse::<f64>().unwrap_or(0.0);
                self.ctx.alloc_expr(Expr::new(ExprKind::FloatLiteral { value, is_f32 }, self.range_from(begin)))
            }
            TokenKind::KwTrue => {
                self.bump();
                self.ctx.alloc_expr(Expr::new(ExprKind::BoolLiteral(true), self.range_from(begin)))
            }
            TokenKind::KwFalse => {
                self.bump();
                self.ctx.alloc_expr(Expr::new(ExprKind::BoolLiteral(false), self.range_from(begin)))
            }
            TokenKind::KwNone => {
                self.bump();
                self.ctx.alloc_expr(Expr::new(ExprKind::NoneLiteral, self.range_from(begin)))
            }
            TokenKind::CharLiteral => {
                let tok = self.bump();
                let c = tok.text.chars().next().unwrap_or('\0');
                self.ctx.alloc_expr(Expr::new(ExprKind::CharLiteral(c), self.range_from(begin)))
            }
            TokenKind::StringLiteral | TokenKind::RawStringLiteral | TokenKind::MultilineStringLiteral => {
                let tok = self.bump();
                let s = self.ctx.alloc_str(tok.text);
                self.ctx.alloc_expr(Expr::new(ExprKind::StringLiteral(s), self.range_from(begin)))
            }
            TokenKind::Identifier | TokenKind::KwSelfValue => {
                let tok = self.bump();
                let name = self.ctx.alloc_str(tok.text);
                if self.check(TokenKind::LBrace) && self.no_struct_literal == 0 {
                    return self.parse_struct_literal(name, begin);
                }
                self.ctx.alloc_expr(Expr::new(ExprKind::Identifier(name), self.range_from(begin)))
            }
            TokenKind::At => {
                self.bump();
                let name = self.expect_identifier();
                self.expect(TokenKind::LParen);
                let args = self.parse_call_args();
                self.expect(TokenKind::RParen);
                self.ctx.alloc_expr(Expr::new(ExprKind::BuiltinCall { name, args: self.ctx.alloc_slice(args) }, self.range_from(begin)))
            }
            TokenKind::LParen => {
                self.bump();
                if self.eat(TokenKind::RParen) {
                    return self.ctx.alloc_expr(Expr::new(ExprKind::Tuple(&[]), self.range_from(begin)));
                }
                let first = self.parse_expr();
                if self.eat(TokenKind::Comma) {
                    let mut elems = vec![first];
                    while !self.check(TokenKind::RParen) && !self.at_eof() {
                        elems.push(self.parse_expr());
                        if !self.eat(TokenKind::Comma) {
                            break;
                        }
                    }
                    self.expect(TokenKind::RParen);
                    return self.ctx.alloc_expr(Expr::new(ExprKind::Tuple(self.ctx.alloc_slice(elems)), self.range_from(begin)));
                }
                self.expect(TokenKind::RParen);
                first
            }
            TokenKind::LBracket => {
                self.bump();
                if self.eat(TokenKind::RBracket) {
                    return self.ctx.alloc_expr(Expr::new(ExprKind::Array(ArrayExpr::List(&[])), self.range_from(begin)));
                }
                let first = self.parse_expr();
                if self.eat(TokenKind::Semicolon) {
                    let count = self.parse_expr();
                    self.expect(TokenKind::RBracket);
                    return self.ctx.alloc_expr(Expr::new(ExprKind::Array(ArrayExpr::Repeat { value: first, count }), self.range_from(begin)));
                }
                let mut elems = vec![first];
                while self.eat(TokenKind::Comma) {
                    if self.check(TokenKind::RBracket) {
                        break;
                    }
                    elems.push(self.parse_expr());
                }
                self.expect(TokenKind::RBracket);
                self.ctx.alloc_expr(Expr::new(ExprKind::Array(ArrayExpr::List(self.ctx.alloc_slice(elems))), self.range_from(begin)))
            }
            TokenKind::LBrace => self.parse_block_expr(),
            TokenKind::KwIf => self.parse_if_expr(),
            TokenKind::KwMatch => self.parse_match_expr(),
            TokenKind::KwLoop => self.parse_loop_expr(None),
            TokenKind::KwWhile => self.parse_while_expr(None),
            TokenKind::KwFor => self.parse_for_expr(None),
            TokenKind::KwBreak => {
                self.bump();
                let label = self.maybe_label();
                let value = if self.is_expr_start() && !matches!(self.current.kind, TokenKind::Semicolon | TokenKind::RBrace) {
                    Some(self.parse_expr())
                } else {
                    None
                };
                self.ctx.alloc_expr(Expr::new(ExprKind::Break { label, value }, self.range_from(begin)))
            }
            TokenKind::KwContinue => {
                self.bump();
                let label = self.maybe_label();
                self.ctx.alloc_expr(Expr::new(ExprKind::Continue { label }, self.range_from(begin)))
            }
            TokenKind::Pipe => self.parse_closure(),
            _ => {
                self.report_arg(DiagID::ErrExpectedExpression, self.current.location, self.current.text.clone());
                self.bump();
                self.ctx.alloc_expr(Expr::new(ExprKind::NoneLiteral, self.range_from(begin)))
            }
        }
    }

    /// `break`/`continue` reference a label as `:name`, distinct from a
    /// bare identifier (which would otherwise be ambiguous with `break`'s
    /// optional value expression).
    fn maybe_label(&mut self) -> Option<&'ast str> {
        if self.check(TokenKind::Colon) {
            self.bump();
            let name = self.expect_identifier();
            Some(name)
        } else {
            None
        }
    }

    fn parse_closure(&mut self) -> &'ast Expr<'ast> {
        let begin = self.current.location;
        self.expect(TokenKind::Pipe);
        let mut params = Vec::new();
        while !self.check(TokenKind::Pipe) && !self.at_eof() {
            let p = self.parse_param();
            params.push(self.ctx.alloc(p));
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::Pipe);
        let return_type = if self.eat(TokenKind::Arrow) { Some(self.parse_type_expr()) } else { None };
        let body = self.parse_expr();
        self.ctx.alloc_expr(Expr::new(ExprKind::Closure { params: self.ctx.alloc_slice(params), return_type, body }, self.range_from(begin)))
    }

    fn without_struct_literal<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        self.no_struct_literal += 1;
        let result = f(self);
        self.no_struct_literal -= 1;
        result
    }

    fn parse_if_expr(&mut self) -> &'ast Expr<'ast> {
        let begin = self.current.location;
        self.expect(TokenKind::KwIf);
        let cond = self.without_struct_literal(|p| p.parse_expr());
        let then_branch = self.parse_block_expr();
        let else_branch = if self.eat(TokenKind::KwElse) {
            if self.check(TokenKind::KwIf) {
                Some(self.parse_if_expr())
            } else {
                Some(self.parse_block_expr())
            }
        } else if self.check(TokenKind::KwElif) {
            self.bump();
            let cond2 = self.without_struct_literal(|p| p.parse_expr());
            let then2 = self.parse_block_expr();
            let else2 = if self.eat(TokenKind::KwElse) { Some(self.parse_block_expr()) } else { None };
            Some(self.ctx.alloc_expr(Expr::new(ExprKind::If { cond: cond2, then_branch: then2, else_branch: else2 }, self.range_from(begin))))
        } else {
            None
        };
        self.ctx.alloc_expr(Expr::new(ExprKind::If { cond, then_branch, else_branch }, self.range_from(begin)))
    }

    fn parse_match_expr(&mut self) -> &'ast Expr<'ast> {
        let begin = self.current.location;
        self.expect(TokenKind::KwMatch);
        let scrutinee = self.without_struct_literal(|p| p.parse_expr());
        self.expect(TokenKind::LBrace);
        let mut arms = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.at_eof() {
            let pattern = self.parse_pattern();
            let guard = if self.eat(TokenKind::KwIf) { Some(self.parse_expr()) } else { None };
            self.expect(TokenKind::FatArrow);
            let body = self.parse_expr();
            arms.push(MatchArm { pattern, guard, body });
            if !self.eat(TokenKind::Comma) && !self.check(TokenKind::RBrace) {
                break;
            }
        }
        self.expect(TokenKind::RBrace);
        self.ctx.alloc_expr(Expr::new(ExprKind::Match { scrutinee, arms: self.ctx.alloc_slice(arms) }, self.range_from(begin)))
    }

    fn parse_loop_expr(&mut self, label: Option<&'ast str>) -> &'ast Expr<'ast> {
        let begin = self.current.location;
        self.expect(TokenKind::KwLoop);
        let body = self.parse_block_expr();
        self.ctx.alloc_expr(Expr::new(ExprKind::Loop { label, kind: LoopKind::Infinite, body }, self.range_from(begin)))
    }

    fn parse_while_expr(&mut self, label: Option<&'ast str>) -> &'ast Expr<'ast> {
        let begin = self.current.location;
        self.expect(TokenKind::KwWhile);
        let cond = self.without_struct_literal(|p| p.parse_expr());
        let body = self.parse_block_expr();
        self.ctx.alloc_expr(Expr::new(ExprKind::Loop { label, kind: LoopKind::While(cond), body }, self.range_from(begin)))
    }

    fn parse_for_expr(&mut self, label: Option<&'ast str>) -> &'ast Expr<'ast> {
        let begin = self.current.location;
        self.expect(TokenKind::KwFor);
        let pattern = self.parse_pattern();
        self.expect(TokenKind::KwIn);
        let iterable = self.without_struct_literal(|p| p.parse_expr());
        let body = self.parse_block_expr();
        self.ctx.alloc_expr(Expr::new(ExprKind::Loop { label, kind: LoopKind::For { pattern, iterable }, body }, self.range_from(begin)))
    }

    fn parse_struct_literal(&mut self, path: &'ast str, begin: SourceLocation) -> &'ast Expr<'ast> {
        self.expect(TokenKind::LBrace);
        let mut fields = Vec::new();
        let mut base = None;
        while !self.check(TokenKind::RBrace) && !self.at_eof() {
            if self.eat(TokenKind::DotDot) {
                base = Some(self.parse_expr());
                break;
            }
            let name = self.expect_identifier();
            let value = if self.eat(TokenKind::Colon) {
                self.parse_expr()
            } else {
                self.ctx.alloc_expr(Expr::new(ExprKind::Identifier(name), self.range_from(begin)))
            };
            fields.push(StructLiteralField { name, value });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RBrace);
        self.ctx.alloc_expr(Expr::new(ExprKind::StructLiteral { path, fields: self.ctx.alloc_slice(fields), base }, self.range_from(begin)))
    }

    // ---------------------------------------------------------------
    // Patterns
    // ---------------------------------------------------------------

    pub fn parse_pattern(&mut self) -> &'ast Pattern<'ast> {
        let first = self.parse_pattern_primary();
        if !self.check(TokenKind::Pipe) {
            return first;
        }
        let begin = first.range.begin();
        let mut arms = vec![first];
        while self.eat(TokenKind::Pipe) {
            arms.push(self.parse_pattern_primary());
        }
        self.ctx.alloc_pattern(Pattern::new(PatternKind::Or(self.ctx.alloc_slice(arms)), self.range_from(begin)))
    }

    fn parse_pattern_primary(&mut self) -> &'ast Pattern<'ast> {
        let begin = self.current.location;
        let pat = match self.current.kind {
            TokenKind::Underscore => {
                self.bump();
                PatternKind::Wildcard
            }
            TokenKind::DotDot => {
                self.bump();
                PatternKind::Rest
            }
            TokenKind::KwMut => {
                self.bump();
                let name = self.expect_identifier();
                PatternKind::Identifier { name, mutable: true, type_annotation: None }
            }
            TokenKind::LParen => {
                self.bump();
                let mut elems = Vec::new();
                while !self.check(TokenKind::RParen) && !self.at_eof() {
                    elems.push(self.parse_pattern());
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(TokenKind::RParen);
                PatternKind::Tuple(self.ctx.alloc_slice(elems))
            }
            TokenKind::IntegerLiteral | TokenKind::FloatLiteral | TokenKind::StringLiteral | TokenKind::CharLiteral | TokenKind::KwTrue | TokenKind::KwFalse | TokenKind::Minus => {
                let lit = self.parse_unary();
                if matches!(self.current.kind, TokenKind::DotDot | TokenKind::DotDotEq) {
                    let bound = if self.current.kind == TokenKind::DotDotEq { RangeBound::Inclusive } else { RangeBound::Exclusive };
                    self.bump();
                    let low = self.ctx.alloc_pattern(Pattern::new(PatternKind::Literal(lit), self.range_from(begin)));
                    let high_lit = self.parse_unary();
                    let high = self.ctx.alloc_pattern(Pattern::new(PatternKind::Literal(high_lit), self.range_from(begin)));
                    PatternKind::Range { low, high, bound }
                } else {
                    PatternKind::Literal(lit)
                }
            }
            TokenKind::Identifier => {
                let tok = self.bump();
                let name = self.ctx.alloc_str(tok.text);
                if self.eat(TokenKind::LParen) {
                    let mut pats = Vec::new();
                    while !self.check(TokenKind::RParen) && !self.at_eof() {
                        pats.push(self.parse_pattern());
                        if !self.eat(TokenKind::Comma) {
                            break;
                        }
                    }
                    self.expect(TokenKind::RParen);
                    PatternKind::EnumVariant { path: name, payload: Some(self.ctx.alloc_slice(pats)) }
                } else if self.check(TokenKind::LBrace) {
                    self.bump();
                    let mut fields = Vec::new();
                    let mut has_rest = false;
                    while !self.check(TokenKind::RBrace) && !self.at_eof() {
                        if self.eat(TokenKind::DotDot) {
                            has_rest = true;
                            break;
                        }
                        let fname = self.expect_identifier();
                        let fpat = if self.eat(TokenKind::Colon) {
                            self.parse_pattern()
                        } else {
                            self.ctx.alloc_pattern(Pattern::new(PatternKind::Identifier { name: fname, mutable: false, type_annotation: None }, self.range_from(begin)))
                        };
                        fields.push((fname, fpat));
                        if !self.eat(TokenKind::Comma) {
                            break;
                        }
                    }
                    self.expect(TokenKind::RBrace);
                    PatternKind::Struct { path: name, fields: self.ctx.alloc_slice(fields), has_rest }
                } else if self.eat(TokenKind::At) {
                    let inner = self.parse_pattern_primary();
                    PatternKind::Bind { name, inner }
                } else if looks_like_path_or_variant(name) {
                    PatternKind::EnumVariant { path: name, payload: None }
                } else {
                    PatternKind::Identifier { name, mutable: false, type_annotation: None }
                }
            }
            TokenKind::KwNone => {
                self.bump();
                PatternKind::Literal(self.ctx.alloc_expr(Expr::new(ExprKind::NoneLiteral, self.range_from(begin))))
            }
            _ => {
                self.report_arg(DiagID::ErrExpectedPattern, self.current.location, self.current.text.clone());
                self.bump();
                PatternKind::Wildcard
            }
        };
        self.ctx.alloc_pattern(Pattern::new(pat, self.range_from(begin)))
    }
}

fn looks_like_path_or_variant(name: &str) -> bool {
    name.chars().next().map(|c| c.is_uppercase()).unwrap_or(false)
}

fn is_named_type_start(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Identifier
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

fn is_decl_start(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::KwVar
            | TokenKind::KwConst
            | TokenKind::KwFunc
            | TokenKind::KwStruct
            | TokenKind::KwEnum
            | TokenKind::KwType
            | TokenKind::KwTrait
            | TokenKind::KwImpl
            | TokenKind::KwPub
            | TokenKind::KwInternal
    )
}

/// Precedence levels 2 through 9 of §4.5's table (1 is assignment, handled
/// by `parse_assignment`; 10+ are cast/unary/postfix, handled below range).
fn binary_op_and_prec(kind: TokenKind) -> Option<(BinaryOp, u8)> {
    use TokenKind::*;
    Some(match kind {
        PipePipe => (BinaryOp::Or, 2),
        AmpAmp => (BinaryOp::And, 3),
        EqEq => (BinaryOp::Eq, 4),
        BangEq => (BinaryOp::Ne, 4),
        Lt => (BinaryOp::Lt, 5),
        Le => (BinaryOp::Le, 5),
        Gt => (BinaryOp::Gt, 5),
        Ge => (BinaryOp::Ge, 5),
        Pipe => (BinaryOp::BitOr, 6),
        Caret => (BinaryOp::BitXor, 6),
        Amp => (BinaryOp::BitAnd, 6),
        Shl => (BinaryOp::Shl, 7),
        Shr => (BinaryOp::Shr, 7),
        _ => return None,
    })
}

fn split_numeric_suffix(text: &str, _integer: bool) -> (&str, IntegerSuffix) {
    const SUFFIXES: &[(&str, IntegerSuffix)] = &[
        ("i8", IntegerSuffix::I8),
        ("i16", IntegerSuffix::I16),
        ("i32", IntegerSuffix::I32),
        ("i64", IntegerSuffix::I64),
        ("i128", IntegerSuffix::I128),
        ("isize", IntegerSuffix::Isize),
        ("u8", IntegerSuffix::U8),
        ("u16", IntegerSuffix::U16),
        ("u32", IntegerSuffix::U32),
        ("u64", IntegerSuffix::U64),
        ("u128", IntegerSuffix::U128),
        ("usize", IntegerSuffix::Usize),
    ];
    for (spelling, suffix) in SUFFIXES {
        if let Some(digits) = text.strip_suffix(spelling) {
            return (digits, *suffix);
        }
    }
    (text, IntegerSuffix::None)
}

fn split_float_suffix(text: &str) -> (&str, bool) {
    if let Some(digits) = text.strip_suffix("f32") {
        (digits, true)
    } else if let Some(digits) = text.strip_suffix("f64") {
        (digits, false)
    } else {
        (text, false)
    }
}

fn parse_int_literal_text(text: &str) -> u128 {
    let cleaned: String = text.chars().filter(|c| *c != '_').collect();
    if let Some(hex) = cleaned.strip_prefix("0x").or_else(|| cleaned.strip_prefix("0X")) {
        u128::from_str_radix(hex, 16).unwrap_or(0)
    } else if let Some(oct) = cleaned.strip_prefix("0o").or_else(|| cleaned.strip_prefix("0O")) {
        u128::from_str_radix(oct, 8).unwrap_or(0)
    } else if let Some(bin) = cleaned.strip_prefix("0b").or_else(|| cleaned.strip_prefix("0B")) {
        u128::from_str_radix(bin, 2).unwrap_or(0)
    } else {
        cleaned.parse::<u128>().unwrap_or(0)
    }
}
