use thiserror::Error;

/// What kind of structural problem stopped the compressor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A closing tag arrived while no element was open
    UnmatchedClose,
    /// `{% endstrip %}` without a matching `{% strip %}`
    UnexpectedEndMarker,
    /// A strip marker that isn't exactly `{% keyword %}`
    MalformedMarker,
    /// `{%`, `{{`, `{#` or a string literal that never ends
    UnterminatedDirective,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::UnmatchedClose => "Unmatched close tag",
            ErrorKind::UnexpectedEndMarker => "Unexpected end marker",
            ErrorKind::MalformedMarker => "Malformed marker",
            ErrorKind::UnterminatedDirective => "Unterminated directive",
        }
    }
}

/// The single error surfaced by the compressor.
///
/// `line` is 1-based. For an unmatched close tag it is the line of the tag
/// itself, which may lie below the start of the literal-text token holding
/// it. For marker and lexer errors it is the line of the offending token or
/// of the directive that was left open.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (line {line})")]
pub struct StructuralError {
    pub kind: ErrorKind,
    pub message: String,
    pub line: usize,
    pub help: Option<String>,
}

impl StructuralError {
    pub fn new(kind: ErrorKind, message: impl Into<String>, line: usize) -> Self {
        Self {
            kind,
            message: message.into(),
            line,
            help: None,
        }
    }

    /// Add help text
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Render the error with source context
    pub fn render(&self, source: &str, filename: &str) -> String {
        self.render_inner(source, filename, false)
    }

    /// Render the error with ANSI color codes
    pub fn render_color(&self, source: &str, filename: &str) -> String {
        self.render_inner(source, filename, true)
    }

    fn render_inner(&self, source: &str, filename: &str, color: bool) -> String {
        let red = if color { "\x1b[1;31m" } else { "" };
        let dim = if color { "\x1b[2m" } else { "" };
        let cyan = if color { "\x1b[1;38;5;73m" } else { "" };
        let reset = if color { "\x1b[0m" } else { "" };

        let mut output = String::new();
        output.push('\n');
        output.push_str(&format!(" {}file:{} {}:{}\n", dim, reset, filename, self.line));
        output.push_str(&format!(
            "{}error:{} {}: {}\n",
            red,
            reset,
            self.kind.as_str(),
            self.message
        ));

        if let Some(source_line) = source.lines().nth(self.line.saturating_sub(1)) {
            let width = format!("{}", self.line).len().max(2);
            let indent = source_line.len() - source_line.trim_start().len();
            let carets = "^".repeat(source_line.trim().chars().count().max(1));

            output.push_str(&format!("{}{:>width$} |{}\n", dim, "", reset, width = width));
            output.push_str(&format!(
                "{}{:>width$} |{} {}\n",
                dim,
                self.line,
                reset,
                source_line,
                width = width
            ));
            output.push_str(&format!(
                "{}{:>width$} |{} {}{}{}{}\n",
                dim,
                "",
                reset,
                " ".repeat(indent),
                red,
                carets,
                reset,
                width = width
            ));
        }

        if let Some(ref help) = self.help {
            output.push('\n');
            for (i, help_line) in help.lines().enumerate() {
                if i == 0 {
                    output.push_str(&format!(" {}help:{} {}\n", cyan, reset, help_line));
                } else {
                    output.push_str(&format!("       {}\n", help_line));
                }
            }
        }

        output.push('\n');
        output
    }
}

/// Result type for compression
pub type Result<T> = std::result::Result<T, StructuralError>;
