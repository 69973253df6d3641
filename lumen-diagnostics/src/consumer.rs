//! Pluggable diagnostic sinks.

use crate::diag_ids::{format_code, DiagnosticLevel};
use crate::diagnostic::Diagnostic;
use crate::source_manager::SourceManager;
use colored::Colorize;
use std::cell::RefCell;

/// Receives diagnostics as they are emitted. Implementations may print
/// them, store them, discard them, or fan them out to other consumers.
pub trait DiagnosticConsumer {
    fn handle_diagnostic(&mut self, diagnostic: &Diagnostic, source_manager: &SourceManager);

    /// Called once after the owning action completes; the default is a
    /// no-op flush.
    fn finish(&mut self) {}
}

/// Renders diagnostics Clang-style: a `file:line:col: severity[code]: msg`
/// header, the offending source line with a gutter, and a caret/underline.
pub struct TextDiagnosticConsumer {
    pub use_color: bool,
    tab_width: usize,
}

impl TextDiagnosticConsumer {
    pub fn new(use_color: bool) -> Self {
        TextDiagnosticConsumer {
            use_color,
            tab_width: 4,
        }
    }

    fn colorize(&self, level: DiagnosticLevel, text: &str) -> String {
        if !self.use_color {
            return text.to_string();
        }
        match level {
            DiagnosticLevel::Error | DiagnosticLevel::Fatal => text.red().bold().to_string(),
            DiagnosticLevel::Warning => text.yellow().bold().to_string(),
            DiagnosticLevel::Note => text.cyan().bold().to_string(),
        }
    }

    /// Expand tabs to `tab_width`-column stops when computing a visual
    /// column offset for the caret line.
    fn visual_column(&self, line: &str, byte_col: usize) -> usize {
        let mut visual = 0usize;
        for ch in line.chars().take(byte_col.saturating_sub(1)) {
            if ch == '\t' {
                visual += self.tab_width - (visual % self.tab_width);
            } else {
                visual += 1;
            }
        }
        visual
    }
}

impl Default for TextDiagnosticConsumer {
    fn default() -> Self {
        TextDiagnosticConsumer::new(true)
    }
}

impl DiagnosticConsumer for TextDiagnosticConsumer {
    fn handle_diagnostic(&mut self, diagnostic: &Diagnostic, source_manager: &SourceManager) {
        let (line, col) = source_manager.get_line_and_column(diagnostic.location);
        let filename = {
            let fid = source_manager.get_file_id(diagnostic.location);
            source_manager.get_filename(fid).to_string()
        };

        let header = format!("{filename}:{line}:{col}:");
        let level_word = self.colorize(diagnostic.level, &diagnostic.level.to_string());
        let code = format_code(diagnostic.id);
        println!("{header} {level_word} [{code}]: {}", diagnostic.message());

        if line == 0 {
            return;
        }

        let source_line = source_manager.get_line_content(diagnostic.location);
        let gutter_width = 5;
        println!("{:>width$} | {}", line, source_line, width = gutter_width);

        let visual_col = self.visual_column(&source_line, col as usize);
        let mut underline = String::new();
        underline.push_str(&" ".repeat(visual_col));
        underline.push('^');
        for range in &diagnostic.ranges {
            let (range_line, range_col) = source_manager.get_line_and_column(range.begin());
            let (end_line, end_col) = source_manager.get_line_and_column(range.end());
            if range_line == line && end_line == line && end_col > range_col {
                let start_visual = self.visual_column(&source_line, range_col as usize);
                let end_visual = self.visual_column(&source_line, end_col as usize);
                if start_visual > underline.len() {
                    underline.push_str(&" ".repeat(start_visual - underline.len()));
                }
                let width = end_visual.saturating_sub(start_visual).max(1);
                if start_visual + width > underline.len() {
                    underline.push_str(&"~".repeat(start_visual + width - underline.len()));
                }
            }
        }
        println!("{}{}", " ".repeat(gutter_width + 3), underline);

        for fix_it in &diagnostic.fix_its {
            if fix_it.is_removal() {
                println!("  fix: remove this code");
            } else {
                println!("  fix: replace with '{}'", fix_it.replacement);
            }
        }
    }
}

/// Retains every diagnostic handed to it, for test assertions or IDE-style
/// batch inspection.
#[derive(Default)]
pub struct StoredDiagnosticConsumer {
    diagnostics: Vec<Diagnostic>,
}

impl StoredDiagnosticConsumer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn clear(&mut self) {
        self.diagnostics.clear();
    }
}

impl DiagnosticConsumer for StoredDiagnosticConsumer {
    fn handle_diagnostic(&mut self, diagnostic: &Diagnostic, _source_manager: &SourceManager) {
        self.diagnostics.push(diagnostic.clone());
    }
}

/// Drops every diagnostic on the floor; useful for probing "would this
/// succeed" without producing output.
#[derive(Default)]
pub struct IgnoringDiagnosticConsumer;

impl DiagnosticConsumer for IgnoringDiagnosticConsumer {
    fn handle_diagnostic(&mut self, _diagnostic: &Diagnostic, _source_manager: &SourceManager) {}
}

/// Forwards every diagnostic to each of a list of owned consumers.
#[derive(Default)]
pub struct MultiplexDiagnosticConsumer {
    consumers: Vec<RefCell<Box<dyn DiagnosticConsumer>>>,
}

impl MultiplexDiagnosticConsumer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_consumer(&mut self, consumer: Box<dyn DiagnosticConsumer>) {
        self.consumers.push(RefCell::new(consumer));
    }
}

impl DiagnosticConsumer for MultiplexDiagnosticConsumer {
    fn handle_diagnostic(&mut self, diagnostic: &Diagnostic, source_manager: &SourceManager) {
        for consumer in &self.consumers {
            consumer.borrow_mut().handle_diagnostic(diagnostic, source_manager);
        }
    }

    fn finish(&mut self) {
        for consumer in &self.consumers {
            consumer.borrow_mut().finish();
        }
    }
}
