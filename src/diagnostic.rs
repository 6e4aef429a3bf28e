use thiserror::Error;

/// Where in the source a diagnostic points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// ` at '<lexeme>'`
    Lexeme(String),
    /// ` at end`
    End,
    /// No location suffix (semantic errors, lexical error tokens).
    None,
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Location::Lexeme(lexeme) => write!(f, " at '{}'", lexeme),
            Location::End => write!(f, " at end"),
            Location::None => Ok(()),
        }
    }
}

/// A user-facing error report with a source line.
///
/// Displays as `[line N] error at 'x': message`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[line {line}] error{location}: {message}")]
pub struct Diagnostic {
    pub line: usize,
    pub location: Location,
    pub message: String,
}

impl Diagnostic {
    pub fn new(line: usize, location: Location, message: impl Into<String>) -> Self {
        Diagnostic {
            line,
            location,
            message: message.into(),
        }
    }

    /// A diagnostic without a location suffix.
    pub fn at_line(line: usize, message: impl Into<String>) -> Self {
        Self::new(line, Location::None, message)
    }
}

/// First-error-wins collector for one pass.
///
/// The first reported diagnostic is kept and panic mode is latched; every
/// later report in the same pass is dropped.
#[derive(Debug, Default)]
pub struct Diagnostics {
    first: Option<Diagnostic>,
    panic_mode: bool,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        if self.panic_mode {
            tracing::trace!(suppressed = %diagnostic, "diagnostic dropped in panic mode");
            return;
        }
        self.panic_mode = true;
        self.first = Some(diagnostic);
    }

    pub fn had_error(&self) -> bool {
        self.first.is_some()
    }

    /// Returns `value` if nothing was reported, otherwise the first diagnostic.
    pub fn finish<T>(self, value: T) -> Result<T, Diagnostic> {
        match self.first {
            Some(diagnostic) => Err(diagnostic),
            None => Ok(value),
        }
    }
}
