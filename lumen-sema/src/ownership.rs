//! Move/borrow dataflow analysis: a three-state lattice (Live, Moved,
//! MaybeMoved) tracked per binding across one function body, with real
//! joins at control-flow merges.
//!
//! The teacher's own move checker (`vex-compiler`'s
//! `borrow_checker/moves`) walks branches sequentially against one shared
//! mutable map with no save/restore, so an `if` that moves a value in one
//! arm leaves it looking moved on the other arm's path too, and a loop
//! body is checked exactly once with no notion of "state going into
//! iteration two". That is wrong for structured control flow, so this
//! module does not port it: every branch runs from a snapshot of the
//! state at its entry, and results are joined back with the lattice below
//! rather than overwriting a shared map in place.

use lumen_ast::Type;
use lumen_diagnostics::{DiagID, DiagnosticEngine, SourceRange};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveState {
    Live,
    Moved,
    MaybeMoved,
}

impl MoveState {
    /// `Live ⊔ Live = Live`, `Moved ⊔ Moved = Moved`, anything else joins
    /// to `MaybeMoved` (one path moved it, the other may not have).
    fn join(self, other: MoveState) -> MoveState {
        match (self, other) {
            (MoveState::Live, MoveState::Live) => MoveState::Live,
            (MoveState::Moved, MoveState::Moved) => MoveState::Moved,
            _ => MoveState::MaybeMoved,
        }
    }
}

/// Whether a value of `ty` is copied rather than moved on every by-value
/// use. Builtin scalars, references, pointers, and function values are
/// Copy; a tuple or optional is Copy iff its element(s) are; everything
/// else (struct, enum, array, slice, string, generic instance, unresolved
/// type variable) is treated conservatively as move-only.
pub fn is_copy_type(ty: &Type<'_>) -> bool {
    match ty {
        Type::Void
        | Type::Bool
        | Type::Char
        | Type::Integer { .. }
        | Type::Float { .. }
        | Type::Reference { .. }
        | Type::Pointer { .. }
        | Type::Function { .. } => true,
        Type::Optional(inner) => is_copy_type(inner),
        Type::Tuple(elems) => elems.iter().all(|e| is_copy_type(e)),
        _ => false,
    }
}

/// Tracks move state for the bindings of one function body.
pub struct OwnershipChecker<'ast> {
    state: HashMap<&'ast str, MoveState>,
    moved_at: HashMap<&'ast str, SourceRange>,
}

impl<'ast> OwnershipChecker<'ast> {
    pub fn new() -> Self {
        OwnershipChecker { state: HashMap::new(), moved_at: HashMap::new() }
    }

    /// Start tracking `name` (a fresh `var`/`const`/parameter binding of a
    /// non-Copy type). Copy-typed bindings are never entered, so `use_var`
    /// and `mark_moved` are no-ops for them — exactly the behavior we want.
    pub fn bind(&mut self, name: &'ast str) {
        self.state.insert(name, MoveState::Live);
        self.moved_at.remove(name);
    }

    /// Record a read of `name` at `range`, reporting err 3017/3019 if it
    /// is moved or possibly moved. Names never bound here (parameters of
    /// Copy type, globals, constants) are always fine to read.
    pub fn use_var(&mut self, diag: &mut DiagnosticEngine<'_>, name: &str, range: SourceRange) {
        match self.state.get(name) {
            Some(MoveState::Moved) => {
                diag.report_range(DiagID::ErrUseAfterMove, range).arg(name).emit();
                if let Some(&moved_at) = self.moved_at.get(name) {
                    diag.report_range(DiagID::NoteMovedHere, moved_at).emit();
                }
            }
            Some(MoveState::MaybeMoved) => {
                diag.report_range(DiagID::ErrUseOfMaybeMoved, range).arg(name).emit();
            }
            Some(MoveState::Live) | None => {}
        }
    }

    /// Record that `name` was moved out of at `range` (passed by value,
    /// assigned away, returned, used to initialize another binding).
    pub fn mark_moved(&mut self, name: &'ast str, range: SourceRange) {
        if self.state.contains_key(name) {
            self.state.insert(name, MoveState::Moved);
            self.moved_at.insert(name, range);
        }
    }

    /// Save the current state so a branch can run from it and be rolled
    /// back to it afterward. Callers drive branching directly (see
    /// `body.rs`'s `if`/`match`/loop handling) rather than through a
    /// higher-order combinator here, since the branch bodies need to call
    /// back into the expression checker, which already holds `&mut self`
    /// on the analyzer — a closure-based API would need two independent
    /// `&mut` captures of the same analyzer alive at once.
    pub fn snapshot(&self) -> Self {
        OwnershipChecker { state: self.state.clone(), moved_at: self.moved_at.clone() }
    }

    pub fn restore(&mut self, snapshot: Self) {
        *self = snapshot;
    }

    /// Join two branch-end snapshots (e.g. `if`/`else`, or a loop's
    /// pre-body state against its post-one-iteration state) into `self`.
    /// A binding missing from one side is treated as unchanged on that
    /// path (the "no else" / "zero iterations" case).
    pub fn join_two(&mut self, a: Self, b: Self) {
        let mut joined = HashMap::new();
        for (name, a_state) in &a.state {
            let b_state = b.state.get(name).copied().unwrap_or(*a_state);
            joined.insert(*name, a_state.join(b_state));
        }
        for (name, b_state) in &b.state {
            joined.entry(name).or_insert(*b_state);
        }
        self.state = joined;
        let mut moved_at = a.moved_at;
        for (name, range) in b.moved_at {
            moved_at.entry(name).or_insert(range);
        }
        self.moved_at = moved_at;
    }

    /// Join every arm of a `match` (or other N-way exhaustive branch)
    /// together. Arms must all start from the same snapshot; an empty
    /// list leaves `self` unchanged.
    pub fn join_many(&mut self, results: Vec<Self>) {
        let mut iter = results.into_iter();
        let Some(first) = iter.next() else { return };
        let joined = iter.fold(first, |mut acc, next| {
            let mut combined = acc.snapshot();
            combined.join_two(std::mem::take(&mut acc), next);
            combined
        });
        *self = joined;
    }
}

impl<'ast> Default for OwnershipChecker<'ast> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_diagnostics::{DiagnosticEngine, SourceLocation, SourceManager};
    use std::cell::RefCell;

    fn range() -> SourceRange {
        SourceRange::point(SourceLocation::new(1))
    }

    #[test]
    fn use_after_unconditional_move_is_an_error() {
        let sm = RefCell::new(SourceManager::new());
        let mut diag = DiagnosticEngine::new(&sm);
        let mut checker = OwnershipChecker::new();
        checker.bind("x");
        checker.mark_moved("x", range());
        checker.use_var(&mut diag, "x", range());
        assert!(diag.has_errors());
    }

    #[test]
    fn move_in_only_one_branch_yields_maybe_moved() {
        let sm = RefCell::new(SourceManager::new());
        let mut diag = DiagnosticEngine::new(&sm);
        let mut checker = OwnershipChecker::new();
        checker.bind("x");

        let entry = checker.snapshot();
        checker.mark_moved("x", range());
        let then_result = checker.snapshot();
        checker.restore(entry);
        let else_result = checker.snapshot();
        checker.join_two(then_result, else_result);

        checker.use_var(&mut diag, "x", range());
        assert!(diag.has_errors());
    }

    #[test]
    fn move_in_every_branch_is_a_plain_move() {
        let sm = RefCell::new(SourceManager::new());
        let mut diag = DiagnosticEngine::new(&sm);
        let mut checker = OwnershipChecker::new();
        checker.bind("x");

        let entry = checker.snapshot();
        checker.mark_moved("x", range());
        let then_result = checker.snapshot();
        checker.restore(entry);
        checker.mark_moved("x", range());
        let else_result = checker.snapshot();
        checker.join_two(then_result, else_result);

        checker.use_var(&mut diag, "x", range());
        assert!(diag.has_errors());
    }

    #[test]
    fn move_in_neither_branch_stays_live() {
        let sm = RefCell::new(SourceManager::new());
        let mut diag = DiagnosticEngine::new(&sm);
        let mut checker = OwnershipChecker::new();
        checker.bind("x");

        let entry = checker.snapshot();
        let then_result = checker.snapshot();
        checker.restore(entry);
        let else_result = checker.snapshot();
        checker.join_two(then_result, else_result);

        checker.use_var(&mut diag, "x", range());
        assert!(!diag.has_errors());
    }
}
