//! Support for reading Hy source into syntax models.
//!
//! Two readers live here:
//! - [`Reader`], the base reader. It understands the Hy surface grammar,
//!   discards comments, and runs reader macros registered for `#tag` forms.
//! - [`SafeReader`], the same grammar with `#` and `;` re-routed:
//!   dispatch forms become inert symbols and comments become [`Comment`](crate::data::Comment)
//!   nodes. It never runs reader macros.

use std::io::ErrorKind;

use crate::data::Model;

mod atoms;
mod base;
mod macros;
mod safe;
mod strings;
mod table;

pub use base::Reader;
pub use macros::{
    current_reader_macros, reader_macro, register_reader_macro, unregister_reader_macro,
    MacroHandler, ReaderMacros,
};
pub use safe::SafeReader;
pub use table::{default_table, Handler, ReaderTable};

/// Read all of the input with the base reader.
pub fn read_all(input: &str) -> ReadResult<Vec<Model>> {
    Reader::new(input).collect()
}

/// Read all of the input with the safe reader: comments kept, nothing run.
pub fn read_all_safe(input: &str) -> ReadResult<Vec<Model>> {
    SafeReader::new(input).collect()
}

/// A location in the input. Lines and columns count from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Default for Position {
    fn default() -> Self {
        Position { line: 1, column: 1 }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Error type if a read does not complete.
///
/// A reader may experience a true lexical error, e.g. "())", that no additional input can fix.
/// This is distinct from a reader that gets an unexpected end-of-input, e.g. "(()":
/// it may be that more input will fix the issue.
///
/// If input is coming in interactively, this is a useful distinction;
/// in the first case, we'd want to indicate an error to the user,
/// while in the latter we'd like to prompt the user for more input.
///
/// This type covers this distinction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadErr {
    /// Malformed input.
    Lex { message: String, position: Position },
    /// The input stopped where more was required.
    PrematureEnd { message: String, position: Position },
}

impl std::fmt::Display for ReadErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::result::Result<(), std::fmt::Error> {
        match self {
            ReadErr::Lex { message, position } => {
                write!(f, "error in input at {position}: {message}")
            }
            ReadErr::PrematureEnd { message, position } => {
                write!(f, "incomplete input at {position}: {message}")
            }
        }
    }
}

impl std::error::Error for ReadErr {}

impl ReadErr {
    pub fn lex(message: impl Into<String>, position: Position) -> Self {
        ReadErr::Lex {
            message: message.into(),
            position,
        }
    }

    pub fn premature_end(message: impl Into<String>, position: Position) -> Self {
        ReadErr::PrematureEnd {
            message: message.into(),
            position,
        }
    }

    pub fn position(&self) -> Position {
        match self {
            ReadErr::Lex { position, .. } | ReadErr::PrematureEnd { position, .. } => *position,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ReadErr::Lex { message, .. } | ReadErr::PrematureEnd { message, .. } => message,
        }
    }

    /// True if more input might complete the read.
    pub fn is_incomplete(&self) -> bool {
        matches!(self, ReadErr::PrematureEnd { .. })
    }

    /// Add additional context to an error.
    pub fn annotate(self, more: impl AsRef<str>) -> Self {
        match self {
            ReadErr::Lex { message, position } => ReadErr::Lex {
                message: format!("{}: {}", more.as_ref(), message),
                position,
            },
            ReadErr::PrematureEnd { message, position } => ReadErr::PrematureEnd {
                message: format!("{}: {}", more.as_ref(), message),
                position,
            },
        }
    }
}

/// The main result type for this module:
/// a T (model, character, etc), or an error, or incomplete.
pub type ReadResult<T> = Result<T, ReadErr>;

impl From<ReadErr> for std::io::Error {
    fn from(value: ReadErr) -> Self {
        let kind = if value.is_incomplete() {
            ErrorKind::UnexpectedEof
        } else {
            ErrorKind::InvalidInput
        };
        std::io::Error::new(kind, value.to_string())
    }
}

/// Options shared by [`Reader`] and [`SafeReader`].
#[derive(Debug, Clone, Default)]
pub struct ReaderOptions {
    /// Start with a copy of the process-wide reader macros.
    /// Always off for a [`SafeReader`].
    pub use_current_readers: bool,
    /// Skip a leading `#!` line.
    pub skip_shebang: bool,
    /// Name of the input, added to error messages.
    pub filename: Option<String>,
}

impl ReaderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn use_current_readers(mut self, enabled: bool) -> Self {
        self.use_current_readers = enabled;
        self
    }

    pub fn skip_shebang(mut self, enabled: bool) -> Self {
        self.skip_shebang = enabled;
        self
    }

    pub fn with_filename(mut self, name: impl Into<String>) -> Self {
        self.filename = Some(name.into());
        self
    }
}
