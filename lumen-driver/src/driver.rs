//! Orchestrates one compilation run: for each input, load it, run the
//! minimum pass subset the requested action needs, and fold the per-input
//! results into one overall [`CompilationResult`].
//!
//! Units are analyzed independently: each input gets its own
//! [`AstContext`] and symbol table. Nothing here shares state across
//! inputs in the same invocation — cross-file name resolution is a module
//! system's job, not this driver's.

use crate::options::{Action, CompilerOptions, InputSource};
use crate::result::{CompilationResult, DriverError};
use lumen_ast::{dump_unit, print_unit, AstContext};
use lumen_diagnostics::{DiagnosticEngine, SourceManager, TextDiagnosticConsumer};
use lumen_lexer::{Lexer, TokenKind};
use lumen_parser::parse_buffer;
use std::cell::RefCell;
use std::fs;

pub struct Driver {
    options: CompilerOptions,
}

impl Driver {
    pub fn new(options: CompilerOptions) -> Self {
        Driver { options }
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Run the whole invocation. Inputs are compiled independently; the
    /// returned status is the worst one seen across all of them (an
    /// earlier input's failure never stops a later input from being
    /// loaded and analyzed too).
    pub fn run(&self) -> CompilationResult {
        if self.options.inputs.is_empty() {
            log::error!("no input files given");
            return CompilationResult::IOError;
        }

        let mut worst = CompilationResult::Success;
        for input in &self.options.inputs {
            log::info!("compiling {}", input.display_name());
            let result = self.run_one(input);
            if !result.is_success() {
                log::warn!("{}: {:?}", input.display_name(), result);
            }
            worst = worse_of(worst, result);
        }
        worst
    }

    fn run_one(&self, input: &InputSource) -> CompilationResult {
        let content = match self.load(input) {
            Ok(content) => content,
            Err(err) => {
                log::error!("{err}");
                return CompilationResult::IOError;
            }
        };

        let sm = RefCell::new(SourceManager::new());
        let fid = sm.borrow_mut().create_buffer(input.display_name(), content.clone());
        let base_offset = sm.borrow().get_location(fid, 0).offset();
        let mut diag = DiagnosticEngine::new(&sm);
        diag.set_consumer(Box::new(TextDiagnosticConsumer::new(true)));

        if self.options.action == Action::Tokens {
            let dump = self.dump_tokens(&mut diag, &sm, &content, base_offset);
            return if diag.has_errors() {
                CompilationResult::LexerError
            } else {
                self.write_output(&dump);
                CompilationResult::Success
            };
        }

        let ctx = AstContext::new(self.options.pointer_width);
        let unit = parse_buffer(&ctx, &mut diag, &content, base_offset);
        if diag.has_errors() {
            return CompilationResult::ParserError;
        }

        if !self.options.action.needs_sema() {
            // Tokens already returned above; only Ast/Pretty reach here.
            match self.options.action {
                Action::Ast => self.write_output(&dump_unit(&unit)),
                Action::Pretty => self.write_output(&print_unit(&unit)),
                _ => {}
            }
            return CompilationResult::Success;
        }

        lumen_sema::analyze_unit(&ctx, &mut diag, &unit);
        if diag.has_errors() {
            return CompilationResult::SemanticError;
        }

        if self.options.action.needs_codegen() {
            let err = DriverError::NoCodegenBackend(self.options.action);
            log::error!("{err}");
            return CompilationResult::CodeGenError;
        }

        CompilationResult::Success
    }

    fn load(&self, input: &InputSource) -> Result<String, DriverError> {
        match input {
            InputSource::File(path) => fs::read_to_string(path).map_err(|source| DriverError::Io {
                path: path.display().to_string(),
                source,
            }),
            InputSource::Buffer { content, .. } => Ok(content.clone()),
        }
    }

    fn dump_tokens(
        &self,
        diag: &mut DiagnosticEngine<'_>,
        sm: &RefCell<SourceManager>,
        source: &str,
        base_offset: u32,
    ) -> String {
        let mut lexer = Lexer::new(diag, source, base_offset);
        let mut out = String::new();
        loop {
            let tok = lexer.lex();
            let (line, col) = sm.borrow().get_line_and_column(tok.location);
            out.push_str(&format!("{line}:{col}: {:?} {:?}\n", tok.kind, tok.text));
            if tok.is(TokenKind::EndOfFile) {
                break;
            }
        }
        out
    }

    /// Single-input actions honor `-o`; a multi-input run always writes to
    /// stdout, since one output path can't stand in for several dumps.
    fn write_output(&self, content: &str) {
        match &self.options.output {
            Some(path) if self.options.inputs.len() == 1 => {
                if let Err(source) = fs::write(path, content) {
                    log::error!(
                        "{}",
                        DriverError::Io { path: path.display().to_string(), source }
                    );
                }
            }
            _ => print!("{content}"),
        }
    }
}

fn worse_of(a: CompilationResult, b: CompilationResult) -> CompilationResult {
    if b.exit_code() > a.exit_code() {
        b
    } else {
        a
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::InputSource;

    fn buffer(content: &str) -> InputSource {
        InputSource::Buffer { name: "<test>".to_string(), content: content.to_string() }
    }

    #[test]
    fn a_well_formed_program_checks_clean() {
        let options = CompilerOptions::new(
            vec![buffer("func add(a: i32, b: i32) -> i32 { return a + b; }")],
            Action::Check,
        );
        let driver = Driver::new(options);
        assert_eq!(driver.run(), CompilationResult::Success);
    }

    #[test]
    fn a_syntax_error_is_reported_as_parser_error() {
        let options = CompilerOptions::new(vec![buffer("func f( -> i32 { return 1; }")], Action::Check);
        let driver = Driver::new(options);
        assert_eq!(driver.run(), CompilationResult::ParserError);
    }

    #[test]
    fn a_type_error_is_reported_as_semantic_error() {
        let options = CompilerOptions::new(vec![buffer("func f() -> bool { return 1; }")], Action::Check);
        let driver = Driver::new(options);
        assert_eq!(driver.run(), CompilationResult::SemanticError);
    }

    #[test]
    fn requesting_an_unimplemented_backend_is_a_codegen_error() {
        let options = CompilerOptions::new(vec![buffer("func main() {}")], Action::Exe);
        let driver = Driver::new(options);
        assert_eq!(driver.run(), CompilationResult::CodeGenError);
    }

    #[test]
    fn one_bad_input_does_not_stop_a_later_good_one_from_running() {
        let options = CompilerOptions::new(
            vec![buffer("func f( -> i32 { return 1; }"), buffer("func g() -> i32 { return 1; }")],
            Action::Check,
        );
        let driver = Driver::new(options);
        assert_eq!(driver.run(), CompilationResult::ParserError);
    }

    #[test]
    fn an_empty_invocation_is_an_io_error() {
        let options = CompilerOptions::new(vec![], Action::Check);
        let driver = Driver::new(options);
        assert_eq!(driver.run(), CompilationResult::IOError);
    }
}
