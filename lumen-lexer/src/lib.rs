//! Stateful, single-threaded lexer: turns source text into a token stream
//! on demand, reporting lexical errors through [`lumen_diagnostics`] and
//! recovering by continuing to scan rather than aborting.

mod lexer;
mod token;
mod unicode;

pub use lexer::Lexer;
pub use token::{lookup_keyword, Token, TokenKind};

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_diagnostics::{DiagnosticEngine, SourceManager};
    use std::cell::RefCell;

    fn lex_all(source: &str) -> Vec<Token> {
        let sm = RefCell::new(SourceManager::new());
        let mut engine = DiagnosticEngine::new(&sm);
        let mut lexer = Lexer::new(&mut engine, source, 1);
        let mut tokens = Vec::new();
        loop {
            let tok = lexer.lex();
            let done = tok.is(TokenKind::EndOfFile);
            tokens.push(tok);
            if done {
                break;
            }
        }
        tokens
    }

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex_all(source).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn tokenizes_keywords_and_identifiers() {
        assert_eq!(
            kinds("func main return"),
            vec![
                TokenKind::KwFunc,
                TokenKind::Identifier,
                TokenKind::KwReturn,
                TokenKind::EndOfFile,
            ]
        );
    }

    #[test]
    fn doc_comment_attaches_to_next_token_only() {
        let tokens = lex_all("/// computes the answer\nfunc answer() i32 { return 42 }");
        let func_tok = &tokens[0];
        assert_eq!(func_tok.kind, TokenKind::KwFunc);
        assert_eq!(func_tok.doc_comment.as_deref(), Some("computes the answer"));
        let name_tok = &tokens[1];
        assert!(!name_tok.has_doc_comment());
    }

    #[test]
    fn multiline_doc_comment_runs_join_with_newline() {
        let tokens = lex_all("/// line one\n/// line two\nvar x = 1");
        assert_eq!(tokens[0].doc_comment.as_deref(), Some("line one\nline two"));
    }

    #[test]
    fn splits_shift_right_into_two_tokens_is_parser_responsibility_but_lexes_maximally() {
        // The lexer always produces a single Shr for `>>`; splitting it for
        // nested generics is the parser's job via `Lexer::push_front`.
        assert_eq!(kinds(">>"), vec![TokenKind::Shr, TokenKind::EndOfFile]);
    }

    #[test]
    fn push_front_reinjects_a_synthetic_token() {
        let sm = RefCell::new(SourceManager::new());
        let mut engine = DiagnosticEngine::new(&sm);
        let mut lexer = Lexer::new(&mut engine, ">>", 1);
        let shr = lexer.lex();
        assert_eq!(shr.kind, TokenKind::Shr);
        // Simulate the parser splitting `>>` into two `>` tokens.
        let loc = shr.location;
        lexer.push_front(Token::new(TokenKind::Gt, loc, ">"));
        assert_eq!(lexer.lex().kind, TokenKind::Gt);
        assert_eq!(lexer.lex().kind, TokenKind::EndOfFile);
    }

    #[test]
    fn peek_does_not_consume() {
        let sm = RefCell::new(SourceManager::new());
        let mut engine = DiagnosticEngine::new(&sm);
        let mut lexer = Lexer::new(&mut engine, "a b c", 1);
        assert_eq!(lexer.peek(0).kind, TokenKind::Identifier);
        assert_eq!(lexer.peek(1).kind, TokenKind::Identifier);
        assert_eq!(lexer.lex().text, "a");
        assert_eq!(lexer.lex().text, "b");
    }

    #[test]
    fn number_literal_bases_and_suffixes() {
        assert_eq!(kinds("0xFFu8"), vec![TokenKind::IntegerLiteral, TokenKind::EndOfFile]);
        assert_eq!(kinds("0b1010"), vec![TokenKind::IntegerLiteral, TokenKind::EndOfFile]);
        assert_eq!(kinds("0o777"), vec![TokenKind::IntegerLiteral, TokenKind::EndOfFile]);
        assert_eq!(kinds("3.14f32"), vec![TokenKind::FloatLiteral, TokenKind::EndOfFile]);
        assert_eq!(kinds("1_000_000"), vec![TokenKind::IntegerLiteral, TokenKind::EndOfFile]);
    }

    #[test]
    fn range_operator_does_not_get_swallowed_by_fractional_scan() {
        // `1..10` must not be parsed as a float `1.` followed by garbage.
        assert_eq!(
            kinds("1..10"),
            vec![
                TokenKind::IntegerLiteral,
                TokenKind::DotDot,
                TokenKind::IntegerLiteral,
                TokenKind::EndOfFile,
            ]
        );
    }

    #[test]
    fn raw_string_matches_hash_count() {
        let tokens = lex_all(r##"r#"hello "world""#"##);
        assert_eq!(tokens[0].kind, TokenKind::RawStringLiteral);
    }

    #[test]
    fn unicode_identifier_is_accepted() {
        assert_eq!(kinds("var 中文 = 1"), vec![
            TokenKind::KwVar,
            TokenKind::Identifier,
            TokenKind::Eq,
            TokenKind::IntegerLiteral,
            TokenKind::EndOfFile,
        ]);
    }

    #[test]
    fn lone_underscore_is_its_own_token_kind() {
        assert_eq!(kinds("_"), vec![TokenKind::Underscore, TokenKind::EndOfFile]);
        assert_eq!(kinds("_foo"), vec![TokenKind::Identifier, TokenKind::EndOfFile]);
    }

    #[test]
    fn builtin_identifier_keeps_at_prefix() {
        let tokens = lex_all("@sizeOf");
        assert_eq!(tokens[0].kind, TokenKind::BuiltinIdentifier);
        assert_eq!(tokens[0].text, "@sizeOf");
    }

    #[test]
    fn shift_and_shift_assign_are_maximal_munch() {
        assert_eq!(kinds("<<="), vec![TokenKind::ShlEq, TokenKind::EndOfFile]);
        assert_eq!(kinds("<<"), vec![TokenKind::Shl, TokenKind::EndOfFile]);
        assert_eq!(kinds("<"), vec![TokenKind::Lt, TokenKind::EndOfFile]);
    }
}
