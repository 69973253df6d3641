//! Semantic analysis: four passes run in sequence over one parsed
//! [`CompilationUnit`], sharing a single [`SymbolTable`] and the registries
//! on [`AstContext`].
//!
//! 1. [`collect::collect_declarations`] binds every top-level name so later
//!    passes can forward-reference freely.
//! 2. [`resolve_type::resolve_types`] turns struct/enum/alias surface syntax
//!    into canonical, interned [`Type`](lumen_ast::Type) values.
//! 3. [`impls::index_impls`] resolves impl-block targets and populates the
//!    method/trait-impl registries.
//! 4. [`body::check_bodies`] walks every function/method/closure body,
//!    typing expressions and threading the move/borrow dataflow analysis.
//!
//! A pass that finds fatal structural trouble (a cyclic type, say) still
//! lets the remaining passes run to completion, so one source error doesn't
//! suppress diagnostics from unrelated parts of the file; `diag.has_errors()`
//! after `analyze_unit` returns is the caller's signal to stop before codegen.

mod body;
mod collect;
mod impls;
mod ownership;
mod resolve_type;
mod scope;

pub use body::check_bodies;
pub use collect::collect_declarations;
pub use impls::index_impls;
pub use ownership::{is_copy_type, MoveState, OwnershipChecker};
pub use resolve_type::{push_generic_scope, resolve_type_expr};
pub use scope::{ScopeKind, Symbol, SymbolKind, SymbolTable};

use lumen_ast::{AstContext, CompilationUnit};
use lumen_diagnostics::DiagnosticEngine;

/// Run every pass over `unit` in order, returning the symbol table built up
/// along the way (the driver consults it for, e.g., a `main` function
/// lookup; the LSP backend would consult it for hover/completion).
pub fn analyze_unit<'ast, 'sm>(
    ctx: &'ast AstContext<'ast>,
    diag: &mut DiagnosticEngine<'sm>,
    unit: &CompilationUnit<'ast>,
) -> SymbolTable<'ast> {
    let mut table = SymbolTable::new(ctx);
    collect_declarations(diag, unit, &mut table);
    resolve_type::resolve_types(ctx, diag, unit, &mut table);
    index_impls(ctx, diag, unit, &mut table);
    check_bodies(ctx, diag, unit, &mut table);
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_diagnostics::SourceManager;
    use lumen_parser::parse_buffer;
    use std::cell::RefCell;

    fn analyze(source: &str) -> bool {
        let ctx = AstContext::new(64);
        let sm = RefCell::new(SourceManager::new());
        let fid = sm.borrow_mut().create_buffer("<test>".to_string(), source.to_string());
        let base_offset = sm.borrow().get_location(fid, 0).offset();
        let mut diag = DiagnosticEngine::new(&sm);
        let unit = parse_buffer(&ctx, &mut diag, source, base_offset);
        analyze_unit(&ctx, &mut diag, &unit);
        diag.has_errors()
    }

    #[test]
    fn a_well_typed_function_has_no_diagnostics() {
        assert!(!analyze(
            r#"
            func add(a: i32, b: i32) -> i32 {
                return a + b;
            }
            "#,
        ));
    }

    #[test]
    fn calling_an_undeclared_function_is_an_error() {
        assert!(analyze(
            r#"
            func main() {
                undeclared_fn();
            }
            "#,
        ));
    }

    #[test]
    fn returning_the_wrong_type_is_an_error() {
        assert!(analyze(
            r#"
            func give_bool() -> bool {
                return 1;
            }
            "#,
        ));
    }

    #[test]
    fn use_after_move_is_caught_across_a_call() {
        assert!(analyze(
            r#"
            struct Box { value: i32 }
            func consume(b: Box) -> i32 { return b.value; }
            func main() -> i32 {
                var b: Box = Box { value: 1 };
                consume(b);
                return consume(b);
            }
            "#,
        ));
    }

    #[test]
    fn a_struct_method_resolves_through_the_impl_registry() {
        assert!(!analyze(
            r#"
            struct Point { x: i32, y: i32 }
            impl Point {
                func sum(self) -> i32 { return self.x + self.y; }
            }
            func main() -> i32 {
                var p: Point = Point { x: 1, y: 2 };
                return p.sum();
            }
            "#,
        ));
    }

    #[test]
    fn explicit_drop_of_a_drop_impl_receiver_is_an_error() {
        assert!(analyze(
            r#"
            struct Resource { handle: i32 }
            impl Resource {
                func drop(self) { }
            }
            func main() {
                var r: Resource = Resource { handle: 1 };
                drop(r);
            }
            "#,
        ));
    }

    #[test]
    fn explicit_drop_of_a_plain_value_is_allowed() {
        assert!(!analyze(
            r#"
            struct Plain { handle: i32 }
            func main() {
                var p: Plain = Plain { handle: 1 };
                drop(p);
            }
            "#,
        ));
    }

    #[test]
    fn partial_move_through_a_field_access_is_an_error() {
        assert!(analyze(
            r#"
            struct Inner { handle: Plain }
            struct Plain { handle: i32 }
            func consume(p: Plain) { }
            func main() {
                var i: Inner = Inner { handle: Plain { handle: 1 } };
                consume(i.handle);
            }
            "#,
        ));
    }

    #[test]
    fn none_widens_against_a_plain_element_type_in_an_array_literal() {
        assert!(!analyze(
            r#"
            func main() {
                var xs = [None, 1];
            }
            "#,
        ));
    }

    #[test]
    fn or_patterns_nested_under_a_bind_still_count_toward_exhaustiveness() {
        assert!(!analyze(
            r#"
            func classify(x: bool) -> i32 {
                match x {
                    y @ true | false => 1,
                }
            }
            "#,
        ));
    }
}
