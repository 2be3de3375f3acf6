//! The base reader: Hy's surface grammar over a character cursor.

use std::iter::FusedIterator;

use super::atoms::{as_identifier, ends_ident};
use super::macros::{current_reader_macros, MacroHandler, ReaderMacros};
use super::strings::{read_bracket_string, read_string, StringPrefix};
use super::table::{default_table, Handler, ReaderTable};
use super::{Position, ReadErr, ReadResult, ReaderOptions};
use crate::data::Model;

/// Reads Hy source into models, one top-level form at a time.
///
/// What happens at each introducer character is decided by the reader's own
/// copy of a [`ReaderTable`]; characters without an entry are read as
/// identifiers (numbers, keywords, symbols, or a string prefix).
///
/// The reader is an iterator over top-level models. After the first error it
/// yields nothing more.
pub struct Reader<'a> {
    source: &'a str,
    // Byte offset of the cursor into `source`.
    offset: usize,
    line: usize,
    column: usize,

    table: ReaderTable,
    macros: ReaderMacros,
    options: ReaderOptions,

    started: bool,
    failed: bool,
}

impl<'a> Reader<'a> {
    pub fn new(source: &'a str) -> Self {
        Self::with_options(source, ReaderOptions::default())
    }

    /// A reader with the default table. If `use_current_readers` is set,
    /// it starts with a copy of the process-wide reader macros.
    pub fn with_options(source: &'a str, options: ReaderOptions) -> Self {
        let macros = if options.use_current_readers {
            current_reader_macros()
        } else {
            ReaderMacros::default()
        };
        Self::with_table(source, options, default_table().clone(), macros)
    }

    /// A reader with an explicit table and set of reader macros.
    pub fn with_table(
        source: &'a str,
        options: ReaderOptions,
        table: ReaderTable,
        macros: ReaderMacros,
    ) -> Self {
        Reader {
            source,
            offset: 0,
            line: 1,
            column: 1,
            table,
            macros,
            options,
            started: false,
            failed: false,
        }
    }

    /// A reader over other text that reads it the same way this one does:
    /// same table, same reader macros.
    pub(crate) fn nested<'b>(&self, source: &'b str) -> Reader<'b> {
        let options = ReaderOptions {
            skip_shebang: false,
            ..self.options.clone()
        };
        Reader::with_table(source, options, self.table.clone(), self.macros.clone())
    }

    pub fn options(&self) -> &ReaderOptions {
        &self.options
    }

    pub fn table(&self) -> &ReaderTable {
        &self.table
    }

    pub(crate) fn table_mut(&mut self) -> &mut ReaderTable {
        &mut self.table
    }

    pub fn reader_macros(&self) -> &ReaderMacros {
        &self.macros
    }

    pub(crate) fn reader_macros_mut(&mut self) -> &mut ReaderMacros {
        &mut self.macros
    }

    /// Add a reader macro to this reader only.
    pub fn register_reader_macro(&mut self, name: &str, handler: MacroHandler) {
        self.macros.register(name, handler);
    }

    /// Position of the next character.
    pub fn cursor(&self) -> Position {
        Position {
            line: self.line,
            column: self.column,
        }
    }

    /// The unread input.
    pub fn rest(&self) -> &'a str {
        &self.source[self.offset..]
    }

    pub fn peekc(&self) -> Option<char> {
        self.rest().chars().next()
    }

    pub fn getc(&mut self) -> Option<char> {
        let c = self.peekc()?;
        self.offset += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Consume `len` bytes of input (which must end on a character boundary).
    pub(crate) fn take_span(&mut self, len: usize) -> String {
        let end = self.offset + len;
        let mut out = String::with_capacity(len);
        while self.offset < end {
            match self.getc() {
                Some(c) => out.push(c),
                None => break,
            }
        }
        out
    }

    pub fn slurp_space(&mut self) {
        while self.peekc().is_some_and(char::is_whitespace) {
            self.getc();
        }
    }

    /// The identifier at the cursor, without consuming it.
    pub fn peek_ident(&self) -> &'a str {
        let rest = self.rest();
        let end = rest.find(ends_ident).unwrap_or(rest.len());
        &rest[..end]
    }

    /// Consume the identifier at the cursor. May be empty.
    pub fn read_ident(&mut self) -> String {
        let len = self.peek_ident().len();
        self.take_span(len)
    }

    /// Accumulate characters until `closing` matches one, or input runs out.
    ///
    /// The closing character is not consumed. With `escapes`, a backslash
    /// keeps the character after it from closing the span; the backslash
    /// stays in the text either way. The flag is true if a closer was found.
    pub fn read_chars_until(
        &mut self,
        closing: impl Fn(char) -> bool,
        escapes: bool,
    ) -> (String, bool) {
        let mut text = String::new();
        while let Some(c) = self.peekc() {
            if closing(c) {
                return (text, true);
            }
            self.getc();
            text.push(c);
            if escapes && c == '\\' {
                if let Some(escaped) = self.getc() {
                    text.push(escaped);
                }
            }
        }
        (text, false)
    }

    /// Read the next form, skipping anything that doesn't produce one.
    pub fn parse_one_form(&mut self) -> ReadResult<Model> {
        loop {
            self.slurp_space();
            if self.peekc().is_none() {
                return Err(ReadErr::premature_end(
                    "Premature end of input while expecting a form",
                    self.cursor(),
                ));
            }
            if let Some(model) = self.dispatch()? {
                return Ok(model);
            }
        }
    }

    /// Read forms up to and including `closer`.
    ///
    /// `start` is the position of the opening bracket, for error reporting.
    fn parse_forms_until(&mut self, closer: char, start: Position) -> ReadResult<Vec<Model>> {
        let mut forms = Vec::new();
        loop {
            self.slurp_space();
            match self.peekc() {
                None => {
                    return Err(ReadErr::premature_end(
                        format!("Premature end of input: expected '{closer}' to close the form opened here"),
                        start,
                    ))
                }
                Some(c) if c == closer => {
                    self.getc();
                    return Ok(forms);
                }
                Some(_) => {
                    if let Some(model) = self.dispatch()? {
                        forms.push(model);
                    }
                }
            }
        }
    }

    /// Read one node at the cursor. `None` means the input there produced
    /// no node (e.g. a discarded comment).
    fn dispatch(&mut self) -> ReadResult<Option<Model>> {
        let start = self.cursor();
        let Some(c) = self.getc() else {
            return Err(ReadErr::premature_end("Premature end of input", start));
        };
        let handler = self.table.get(c);
        tracing::trace!(?c, ?handler, line = start.line, column = start.column, "dispatch");
        match handler {
            Some(handler) => self.run_handler(handler, c, start),
            None => self.read_default(c, start).map(Some),
        }
    }

    fn run_handler(&mut self, handler: Handler, c: char, start: Position) -> ReadResult<Option<Model>> {
        match handler {
            Handler::Expression => self.parse_forms_until(')', start).map(Model::Expression).map(Some),
            Handler::List => self.parse_forms_until(']', start).map(Model::List).map(Some),
            Handler::Dict => self.parse_forms_until('}', start).map(Model::Dict).map(Some),
            Handler::Closer => Err(ReadErr::lex(
                format!("Ran into a '{c}' where it wasn't expected"),
                start,
            )),
            Handler::String => read_string(self, StringPrefix::default(), start).map(Some),
            Handler::Quote => self.wrap_next("quote"),
            Handler::Quasiquote => self.wrap_next("quasiquote"),
            Handler::Unquote => {
                if self.peekc() == Some('@') {
                    self.getc();
                    self.wrap_next("unquote-splice")
                } else {
                    self.wrap_next("unquote")
                }
            }
            Handler::TagDispatch => self.tag_dispatch(start),
            Handler::SkipComment => {
                self.read_chars_until(|c| c == '\n', false);
                Ok(None)
            }
            Handler::InertDispatch => self.inert_dispatch(start).map(Some),
            Handler::LineComment => Ok(Some(self.line_comment())),
        }
    }

    /// `(name <next form>)`
    fn wrap_next(&mut self, name: &str) -> ReadResult<Option<Model>> {
        let form = self.parse_one_form()?;
        Ok(Some(Model::call(name, [form])))
    }

    /// Everything that isn't introduced by a table character.
    fn read_default(&mut self, c: char, start: Position) -> ReadResult<Model> {
        let mut ident = String::from(c);
        ident.push_str(&self.read_ident());
        if self.peekc() == Some('"') {
            if let Some(prefix) = StringPrefix::parse(&ident) {
                self.getc();
                return read_string(self, prefix, start);
            }
        }
        as_identifier(&ident, start)
    }

    /// Fail unless there's something to dispatch on after a `#`.
    pub(crate) fn require_dispatch_target(&self, start: Position) -> ReadResult<()> {
        match self.peekc() {
            Some(c) if !c.is_whitespace() => Ok(()),
            _ => Err(ReadErr::premature_end(
                "Premature end of input while attempting dispatch",
                start,
            )),
        }
    }

    /// The base `#` handler: reader macros first, then the built-in `#` forms.
    fn tag_dispatch(&mut self, start: Position) -> ReadResult<Option<Model>> {
        self.require_dispatch_target(start)?;

        let ident = self.peek_ident();
        if let Some(handler) = self.macros.get(ident) {
            let tag = format!("#{ident}");
            self.take_span(ident.len());
            tracing::debug!(%tag, "running reader macro");
            return handler(self, &tag);
        }

        let Some(c) = self.getc() else {
            return Err(ReadErr::premature_end(
                "Premature end of input while attempting dispatch",
                start,
            ));
        };
        match c {
            '(' => self.parse_forms_until(')', start).map(Model::Tuple).map(Some),
            '{' => self.parse_forms_until('}', start).map(Model::Set).map(Some),
            '_' => {
                self.parse_one_form()?;
                Ok(None)
            }
            '*' => {
                if self.peekc() == Some('*') {
                    self.getc();
                    self.wrap_next("unpack-mapping")
                } else {
                    self.wrap_next("unpack-iterable")
                }
            }
            '^' => {
                let annotation = self.parse_one_form()?;
                let target = self.parse_one_form()?;
                Ok(Some(Model::call("annotate", [target, annotation])))
            }
            '[' => read_bracket_string(self, start).map(Some),
            other => {
                let tag = format!("#{other}{}", self.read_ident());
                Err(ReadErr::lex(format!("reader macro '{tag}' is not defined"), start))
            }
        }
    }

    fn skip_shebang(&mut self) {
        if self.options.skip_shebang && self.rest().starts_with("#!") {
            tracing::trace!("skipping shebang line");
            self.read_chars_until(|c| c == '\n', false);
        }
    }

    fn decorate(&self, err: ReadErr) -> ReadErr {
        match &self.options.filename {
            Some(name) => err.annotate(name),
            None => err,
        }
    }
}

impl Iterator for Reader<'_> {
    type Item = ReadResult<Model>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        if !self.started {
            self.started = true;
            self.skip_shebang();
        }
        loop {
            self.slurp_space();
            self.peekc()?;
            match self.dispatch() {
                Ok(Some(model)) => return Some(Ok(model)),
                Ok(None) => continue,
                Err(err) => {
                    self.failed = true;
                    return Some(Err(self.decorate(err)));
                }
            }
        }
    }
}

impl FusedIterator for Reader<'_> {}
