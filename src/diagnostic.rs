use crate::span::Span;
use std::fmt;

/// Which compiler pass raised a diagnostic. Mirrors the five fatal error
/// categories a Dragon-Lang program can fail with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Lexical,
    Parse,
    Semantic,
    Optimizer,
    Vm,
}

impl ErrorKind {
    /// The stable tag printed ahead of a rendered diagnostic's message,
    /// e.g. `lexical-error`.
    pub fn tag(self) -> &'static str {
        match self {
            ErrorKind::Lexical => "lexical-error",
            ErrorKind::Parse => "parse-error",
            ErrorKind::Semantic => "semantic-error",
            ErrorKind::Optimizer => "optimizer-error",
            ErrorKind::Vm => "vm-error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A compiler diagnostic (error or warning) from any pass in the pipeline.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: ErrorKind,
    pub message: String,
    pub span: Span,
    pub notes: Vec<String>,
    pub help: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl Diagnostic {
    pub fn error(kind: ErrorKind, message: String, span: Span) -> Self {
        Self {
            severity: Severity::Error,
            kind,
            message,
            span,
            notes: Vec::new(),
            help: None,
        }
    }

    pub fn warning(kind: ErrorKind, message: String, span: Span) -> Self {
        Self {
            severity: Severity::Warning,
            kind,
            message,
            span,
            notes: Vec::new(),
            help: None,
        }
    }

    pub fn with_note(mut self, note: String) -> Self {
        self.notes.push(note);
        self
    }

    pub fn with_help(mut self, help: String) -> Self {
        self.help = Some(help);
        self
    }

    /// Render the diagnostic to stderr using ariadne.
    pub fn render(&self, filename: &str, source: &str) {
        use ariadne::{Color, Label, Report, ReportKind, Source};

        let kind = match self.severity {
            Severity::Error => ReportKind::Error,
            Severity::Warning => ReportKind::Warning,
        };

        let color = match self.severity {
            Severity::Error => Color::Red,
            Severity::Warning => Color::Yellow,
        };

        let message = format!("{}: {}", self.kind.tag(), self.message);

        let mut report = Report::build(kind, filename, self.span.start as usize)
            .with_message(&message)
            .with_label(
                Label::new((filename, self.span.start as usize..self.span.end as usize))
                    .with_message(&self.message)
                    .with_color(color),
            );

        for note in &self.notes {
            report = report.with_note(note);
        }

        if let Some(help) = &self.help {
            report = report.with_help(help);
        }

        report
            .finish()
            .eprint((filename, Source::from(source)))
            .unwrap();
    }
}

/// Render a list of diagnostics, in order.
pub fn render_diagnostics(diagnostics: &[Diagnostic], filename: &str, source: &str) {
    for diag in diagnostics {
        diag.render(filename, source);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let span = Span::new(0, 10, 15);
        let d = Diagnostic::error(ErrorKind::Semantic, "type mismatch".to_string(), span);
        assert_eq!(d.severity, Severity::Error);
        assert_eq!(d.kind, ErrorKind::Semantic);
        assert_eq!(d.message, "type mismatch");
        assert_eq!(d.span.start, 10);
        assert_eq!(d.span.end, 15);
        assert!(d.notes.is_empty());
        assert!(d.help.is_none());
    }

    #[test]
    fn test_warning_construction() {
        let span = Span::dummy();
        let d = Diagnostic::warning(ErrorKind::Semantic, "unused variable".to_string(), span);
        assert_eq!(d.severity, Severity::Warning);
    }

    #[test]
    fn test_with_note() {
        let d = Diagnostic::error(ErrorKind::Parse, "error".to_string(), Span::dummy())
            .with_note("expected ';'".to_string())
            .with_note("found EOF".to_string());
        assert_eq!(d.notes.len(), 2);
        assert_eq!(d.notes[0], "expected ';'");
        assert_eq!(d.notes[1], "found EOF");
    }

    #[test]
    fn test_with_help() {
        let d = Diagnostic::error(ErrorKind::Parse, "error".to_string(), Span::dummy())
            .with_help("insert a semicolon".to_string());
        assert_eq!(d.help.as_deref(), Some("insert a semicolon"));
    }

    #[test]
    fn test_chained_builders() {
        let d = Diagnostic::warning(ErrorKind::Semantic, "hint".to_string(), Span::new(0, 0, 5))
            .with_note("note 1".to_string())
            .with_help("help text".to_string())
            .with_note("note 2".to_string());
        assert_eq!(d.severity, Severity::Warning);
        assert_eq!(d.notes.len(), 2);
        assert!(d.help.is_some());
    }

    #[test]
    fn test_tag_matches_error_kind() {
        assert_eq!(ErrorKind::Lexical.tag(), "lexical-error");
        assert_eq!(ErrorKind::Parse.tag(), "parse-error");
        assert_eq!(ErrorKind::Semantic.tag(), "semantic-error");
        assert_eq!(ErrorKind::Optimizer.tag(), "optimizer-error");
        assert_eq!(ErrorKind::Vm.tag(), "vm-error");
    }

    #[test]
    fn test_render_does_not_panic() {
        let source = "func main() {\n    int x = 1;\n    return x;\n}\n";
        let d = Diagnostic::error(ErrorKind::Semantic, "type mismatch".to_string(), Span::new(0, 18, 23))
            .with_note("expected int, found string".to_string());
        // Renders to stderr; we only verify it doesn't panic.
        d.render("test.dragon", source);
    }

    #[test]
    fn test_render_diagnostics_multiple() {
        let source = "func main() {\n    return 0;\n}\n";
        let diagnostics = vec![
            Diagnostic::warning(ErrorKind::Semantic, "unused x".to_string(), Span::new(0, 4, 5)),
            Diagnostic::warning(ErrorKind::Semantic, "unused y".to_string(), Span::new(0, 14, 15)),
        ];
        render_diagnostics(&diagnostics, "test.dragon", source);
    }
}
