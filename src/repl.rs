//! Read-print loop over the safe reader.
//!
//! Input is accumulated line by line until it reads completely; then each
//! node is printed back as source. Nothing is evaluated, and `#tag` forms are
//! never expanded.

use std::io::{BufRead, Write};

use crate::data::{to_source, Model};
use crate::reader::{read_all_safe, ReadErr};

/// What came of feeding a line to an [`Accumulator`].
#[derive(Debug, PartialEq)]
pub enum Step {
    /// The pending input read completely.
    Read(Vec<Model>),
    /// The pending input is incomplete; more is needed.
    NeedMore,
    /// The pending input can't be read. It has been discarded.
    Failed(ReadErr),
}

/// Input that hasn't yet read as a complete set of forms.
#[derive(Debug, Default)]
pub struct Accumulator {
    pending: String,
}

impl Accumulator {
    /// True if there is no partial input waiting.
    pub fn is_empty(&self) -> bool {
        self.pending.trim().is_empty()
    }

    pub fn push_line(&mut self, line: &str) -> Step {
        self.pending.push_str(line);
        if !line.ends_with('\n') {
            self.pending.push('\n');
        }
        match read_all_safe(&self.pending) {
            Ok(models) => {
                self.pending.clear();
                Step::Read(models)
            }
            Err(e) if e.is_incomplete() => Step::NeedMore,
            Err(e) => {
                self.pending.clear();
                Step::Failed(e)
            }
        }
    }

    /// Give up on any partial input, returning the error it had.
    pub fn finish(&mut self) -> Option<ReadErr> {
        if self.is_empty() {
            return None;
        }
        let pending = std::mem::take(&mut self.pending);
        read_all_safe(&pending).err()
    }
}

/// Non-interactive loop: read from `input` until EOF.
///
/// Read nodes go to `output`, read errors to `errors`. Only I/O failures are
/// returned as errors.
pub fn run(
    input: &mut impl BufRead,
    output: &mut impl Write,
    errors: &mut impl Write,
) -> std::io::Result<()> {
    let mut acc = Accumulator::default();
    let mut line = String::new();
    loop {
        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        match acc.push_line(&line) {
            Step::Read(models) => output.write_all(to_source(&models).as_bytes())?,
            Step::NeedMore => (),
            Step::Failed(e) => writeln!(errors, "{e}")?,
        }
    }
    if let Some(e) = acc.finish() {
        writeln!(errors, "{e}")?;
    }
    output.flush()?;
    errors.flush()
}

#[cfg(feature = "repl")]
pub use interactive::{interactive, ReplConfig};

#[cfg(feature = "repl")]
mod interactive {
    use std::path::PathBuf;

    use rustyline::{error::ReadlineError, DefaultEditor};

    use super::{Accumulator, Step};
    use crate::data::to_source;

    const DEFAULT_PROMPT: &str = "=> ";
    const CONTINUATION_PROMPT: &str = "... ";

    /// Settings for the interactive loop.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct ReplConfig {
        /// Where line history is kept, if anywhere.
        pub history: Option<PathBuf>,
        pub prompt: String,
    }

    impl Default for ReplConfig {
        fn default() -> Self {
            ReplConfig {
                history: None,
                prompt: DEFAULT_PROMPT.to_owned(),
            }
        }
    }

    impl ReplConfig {
        /// `SAFEHY_HISTORY` names the history file (default `~/.safehy-history`);
        /// `SAFEHY_PROMPT` sets the prompt.
        pub fn from_env() -> Self {
            Self::from_vars(|name| std::env::var(name).ok())
        }

        fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
            let history = match var("SAFEHY_HISTORY") {
                Some(path) if path.is_empty() => None,
                Some(path) => Some(PathBuf::from(path)),
                None => var("HOME").map(|home| PathBuf::from(home).join(".safehy-history")),
            };
            let prompt = var("SAFEHY_PROMPT").unwrap_or_else(|| DEFAULT_PROMPT.to_owned());
            ReplConfig { history, prompt }
        }
    }

    /// Interactive loop on the terminal, with line editing and history.
    pub fn interactive(config: &ReplConfig) -> std::io::Result<()> {
        let mut editor = DefaultEditor::new().map_err(std::io::Error::other)?;
        if let Some(path) = &config.history {
            if let Err(e) = editor.load_history(path) {
                tracing::debug!("no history loaded from {}: {e}", path.display());
            }
        }

        let mut acc = Accumulator::default();
        loop {
            let prompt = if acc.is_empty() {
                config.prompt.as_str()
            } else {
                CONTINUATION_PROMPT
            };
            match editor.readline(prompt) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        // History is best-effort.
                        let _ = editor.add_history_entry(line.as_str());
                    }
                    match acc.push_line(&line) {
                        Step::Read(models) => print!("{}", to_source(&models)),
                        Step::NeedMore => (),
                        Step::Failed(e) => eprintln!("{e}"),
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    // Drop partial input, keep going.
                    acc = Accumulator::default();
                }
                Err(ReadlineError::Eof) => break,
                Err(e) => return Err(std::io::Error::other(e)),
            }
        }
        if let Some(e) = acc.finish() {
            eprintln!("{e}");
        }

        if let Some(path) = &config.history {
            if let Err(e) = editor.save_history(path) {
                tracing::warn!("could not save history to {}: {e}", path.display());
            }
        }
        Ok(())
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run_on(input: &str) -> (String, String) {
        let mut output = Vec::new();
        let mut errors = Vec::new();
        run(&mut Cursor::new(input.as_bytes()), &mut output, &mut errors)
            .expect("in-memory I/O should not fail");
        (
            String::from_utf8(output).expect("output should be UTF-8"),
            String::from_utf8(errors).expect("errors should be UTF-8"),
        )
    }

    #[test]
    fn mirrors_input() {
        let (out, err) = run_on("(+ 1 2) ; sum\n#tag x\n");
        assert_eq!(out, "(+ 1 2)\n; sum\n#tag\nx\n");
        assert_eq!(err, "");
    }

    #[test]
    fn waits_for_complete_forms() {
        let (out, err) = run_on("(defn f [x]\n  (* x\n     2))\n");
        assert_eq!(out, "(defn f [x] (* x 2))\n");
        assert_eq!(err, "");
    }

    #[test]
    fn reports_errors_and_continues() {
        let (out, err) = run_on("(a))\n(b)\n");
        assert_eq!(out, "(b)\n");
        assert!(err.contains("error in input"), "unexpected errors: {err:?}");
    }

    #[test]
    fn reports_incomplete_input_at_eof() {
        let (out, err) = run_on("(a\n");
        assert_eq!(out, "");
        assert!(err.contains("incomplete input"), "unexpected errors: {err:?}");
    }

    #[test]
    fn bad_fstring_does_not_swallow_later_forms() {
        let (out, err) = run_on("f\"{(a}\"\n(b)\n(c)\n");
        assert_eq!(out, "(b)\n(c)\n");
        assert!(err.contains("error in input"), "unexpected errors: {err:?}");
    }

    #[test]
    fn accumulator_steps() {
        let mut acc = Accumulator::default();
        assert!(acc.is_empty());
        assert_eq!(acc.push_line("(a"), Step::NeedMore);
        assert!(!acc.is_empty());
        assert_eq!(
            acc.push_line("b)"),
            Step::Read(vec![Model::Expression(vec![
                Model::symbol("a"),
                Model::symbol("b")
            ])])
        );
        assert!(acc.is_empty());
        assert!(matches!(acc.push_line(")"), Step::Failed(ReadErr::Lex { .. })));
        assert!(acc.finish().is_none());
    }
}
