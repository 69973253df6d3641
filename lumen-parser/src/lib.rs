//! Recursive-descent parser: turns a token stream from `lumen-lexer` into
//! the AST defined by `lumen-ast`. No semantic analysis happens here; a
//! `CompilationUnit` built by this crate may still be structurally
//! nonsensical (undeclared names, type mismatches) — that is `lumen-sema`'s
//! job.

mod parser;
pub use parser::Parser;

use lumen_ast::{dump_unit, print_unit, AstContext, CompilationUnit};
use lumen_diagnostics::{DiagnosticEngine, SourceManager};
use lumen_lexer::Lexer;
use std::cell::RefCell;

/// Parse one source buffer into a `CompilationUnit` allocated out of `ctx`.
/// Parse errors are reported through `diag` rather than returned; the
/// caller decides whether `diag.has_errors()` should abort the pipeline.
pub fn parse_buffer<'ast, 'sm>(
    ctx: &'ast AstContext<'ast>,
    diag: &mut DiagnosticEngine<'sm>,
    source: &str,
    base_offset: u32,
) -> CompilationUnit<'ast> {
    let lexer = Lexer::new(diag, source, base_offset);
    let mut parser = Parser::new(ctx, lexer);
    parser.parse_compilation_unit()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> String {
        let sm = RefCell::new(SourceManager::new());
        let fid = sm.borrow_mut().create_buffer("<test>".to_string(), source.to_string());
        let base_offset = sm.borrow().get_location(fid, 0).offset();
        let mut diag = DiagnosticEngine::new(&sm);
        let ctx = AstContext::new(64);
        let unit = parse_buffer(&ctx, &mut diag, source, base_offset);
        assert!(!diag.has_errors(), "unexpected parse errors for: {source}");
        dump_unit(&unit)
    }

    fn parse_unit<'ast>(ctx: &'ast AstContext<'ast>, source: &str) -> CompilationUnit<'ast> {
        let sm = RefCell::new(SourceManager::new());
        let fid = sm.borrow_mut().create_buffer("<test>".to_string(), source.to_string());
        let base_offset = sm.borrow().get_location(fid, 0).offset();
        let mut diag = DiagnosticEngine::new(&sm);
        let unit = parse_buffer(ctx, &mut diag, source, base_offset);
        assert!(!diag.has_errors(), "unexpected parse errors for: {source}");
        unit
    }

    #[test]
    fn parses_a_var_decl_with_initializer() {
        let dump = parse("var answer: i32 = 42;");
        assert!(dump.contains("VarDecl(name=answer"));
        assert!(dump.contains("IntegerLiteral(value=42"));
    }

    #[test]
    fn parses_a_function_with_binary_body() {
        let dump = parse("func add(a: i32, b: i32) -> i32 { return a + b; }");
        assert!(dump.contains("FuncDecl(name=add"));
        assert!(dump.contains("Binary(op=+)"));
    }

    #[test]
    fn parses_struct_and_enum_decls() {
        let dump = parse("struct Point { x: i32, y: i32 }");
        assert!(dump.contains("StructDecl(name=Point"));

        let dump = parse("enum Shape { Circle(f64), Square { side: f64 } }");
        assert!(dump.contains("EnumDecl(name=Shape"));
    }

    #[test]
    fn parses_if_else_and_match() {
        let dump = parse("func f() -> i32 { if true { return 1; } else { return 2; } }");
        assert!(dump.contains("If\n"));

        let dump = parse("func f(x: i32) -> i32 { match x { 0 => 1, _ => 2, } }");
        assert!(dump.contains("Match("));
    }

    #[test]
    fn parses_error_propagate_and_error_handle() {
        let dump = parse("func f() -> i32 { return g()! orelse |err| { return 0; }; }");
        assert!(dump.contains("ErrorPropagate"));
        assert!(dump.contains("ErrorHandle(err_name=err)"));
    }

    #[test]
    fn suppresses_struct_literals_in_if_condition_head() {
        // `x` here must parse as a bare identifier condition, not the start
        // of a `x { .. }` struct literal, per the struct-literal
        // suppression rule for `if`/`while`/`match`/`for` heads.
        let dump = parse("func f(x: bool) -> i32 { if x { return 1; } return 0; }");
        assert!(dump.contains("cond: Identifier(x)"));
    }

    #[test]
    fn recovers_from_an_expected_token_error_and_keeps_parsing() {
        let sm = RefCell::new(SourceManager::new());
        let source = "func f(a: i32 { return a; }\nfunc g() -> i32 { return 1; }";
        let fid = sm.borrow_mut().create_buffer("<test>".to_string(), source.to_string());
        let base_offset = sm.borrow().get_location(fid, 0).offset();
        let mut diag = DiagnosticEngine::new(&sm);
        let ctx = AstContext::new(64);
        let unit = parse_buffer(&ctx, &mut diag, source, base_offset);
        assert!(diag.has_errors());
        assert_eq!(unit.decls.len(), 2, "recovery should still find both top-level functions");
    }

    #[test]
    fn pretty_printed_output_reparses_to_a_structurally_equal_dump() {
        let source = "func add(a: i32, b: i32) -> i32 { return a + b * 2; }";
        let ctx_a = AstContext::new(64);
        let unit_a = parse_unit(&ctx_a, source);
        let printed = print_unit(&unit_a);

        let ctx_b = AstContext::new(64);
        let unit_b = parse_unit(&ctx_b, &printed);

        assert_eq!(dump_unit(&unit_a), dump_unit(&unit_b));
    }
}
