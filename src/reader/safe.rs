//! The safe reader: Hy's grammar with nothing executed and comments kept.

use std::iter::FusedIterator;

use super::macros::ReaderMacros;
use super::table::{Handler, ReaderTable};
use super::{Position, ReadResult, Reader, ReaderOptions};
use crate::data::{Comment, Model, Symbol};

/// What the safe reader changes in the default table.
const SAFE_OVERRIDES: &[(char, Handler)] = &[('#', Handler::InertDispatch), (';', Handler::LineComment)];

/// A reader that never runs reader macros.
///
/// `#tag` forms are read as symbols named `#tag`, and `;` comments are kept
/// as [`Comment`] nodes. Everything else reads exactly as with [`Reader`].
pub struct SafeReader<'a> {
    reader: Reader<'a>,
}

impl<'a> SafeReader<'a> {
    pub fn new(source: &'a str) -> Self {
        Self::with_options(source, ReaderOptions::default())
    }

    /// `use_current_readers` is ignored: a safe reader has no reader macros.
    pub fn with_options(source: &'a str, options: ReaderOptions) -> Self {
        let options = options.use_current_readers(false);
        let mut reader = Reader::with_options(source, options);
        reader.table_mut().apply(SAFE_OVERRIDES);
        // Last, so nothing registered during construction survives.
        reader.reader_macros_mut().clear();
        tracing::debug!(
            filename = reader.options().filename.as_deref(),
            "constructed safe reader"
        );
        SafeReader { reader }
    }

    pub fn options(&self) -> &ReaderOptions {
        self.reader.options()
    }

    pub fn table(&self) -> &ReaderTable {
        self.reader.table()
    }

    /// Always empty.
    pub fn reader_macros(&self) -> &ReaderMacros {
        self.reader.reader_macros()
    }

    pub fn cursor(&self) -> Position {
        self.reader.cursor()
    }
}

impl Iterator for SafeReader<'_> {
    type Item = ReadResult<Model>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.next()
    }
}

impl FusedIterator for SafeReader<'_> {}

impl Reader<'_> {
    /// `#` with the tag read as a symbol.
    ///
    /// The tag is the identifier after the `#` or, if there isn't one, the
    /// single character there. Nothing after the tag is consumed.
    pub(super) fn inert_dispatch(&mut self, start: Position) -> ReadResult<Model> {
        self.require_dispatch_target(start)?;
        let mut ident = self.read_ident();
        if ident.is_empty() {
            ident.extend(self.getc());
        }
        Ok(Model::Symbol(Symbol::dispatch(format!("#{ident}"))))
    }

    /// `;` up to (not including) the end of the line.
    pub(super) fn line_comment(&mut self) -> Model {
        let (text, _) = self.read_chars_until(|c| c == '\n', false);
        Model::Comment(Comment::new(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{same_code_items, to_source, FPart};
    use crate::reader::macros::{reader_macro, register_reader_macro, unregister_reader_macro};
    use crate::reader::{read_all, read_all_safe, ReadErr};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn sym(name: &str) -> Model {
        Model::symbol(name)
    }

    #[test]
    fn tag_is_a_symbol() -> ReadResult<()> {
        let got = read_all_safe("#foo")?;
        assert_eq!(got, vec![sym("#foo")]);
        let s = got[0].as_symbol().expect("should be a symbol");
        assert!(s.from_dispatch());
        Ok(())
    }

    #[test]
    fn tag_argument_is_read_separately() -> ReadResult<()> {
        let got = read_all_safe("(#my-macro (a b) c)")?;
        let want = vec![Model::Expression(vec![
            sym("#my-macro"),
            Model::Expression(vec![sym("a"), sym("b")]),
            sym("c"),
        ])];
        assert_eq!(got, want);
        Ok(())
    }

    #[test]
    fn punctuation_tags() -> ReadResult<()> {
        let got = read_all_safe("#_ x #* y #^ int")?;
        assert_eq!(
            got,
            vec![sym("#_"), sym("x"), sym("#*"), sym("y"), sym("#^"), sym("int")]
        );
        Ok(())
    }

    #[test]
    fn bracket_after_hash_is_a_single_character_tag() {
        let mut reader = SafeReader::new("#(1 2)");
        assert_eq!(reader.next(), Some(Ok(sym("#("))));
        assert_eq!(reader.next(), Some(Ok(Model::Integer(1))));
        assert_eq!(reader.next(), Some(Ok(Model::Integer(2))));
        assert!(matches!(reader.next(), Some(Err(ReadErr::Lex { .. }))));
        assert_eq!(reader.next(), None);
    }

    #[test]
    fn global_reader_macros_never_run() -> ReadResult<()> {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        register_reader_macro(
            "safe-test-counter",
            reader_macro(move |_, _| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Some(Model::Integer(1)))
            }),
        );

        let options = ReaderOptions::new().use_current_readers(true);
        let reader = SafeReader::with_options("#safe-test-counter 2", options);
        assert!(reader.reader_macros().is_empty());
        assert!(!reader.options().use_current_readers);
        let got: Vec<Model> = reader.collect::<ReadResult<_>>()?;
        assert_eq!(got, vec![sym("#safe-test-counter"), Model::Integer(2)]);
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        // The same input, read by an unsafe reader, does run it.
        let options = ReaderOptions::new().use_current_readers(true);
        let got: Vec<Model> =
            Reader::with_options("#safe-test-counter 2", options).collect::<ReadResult<_>>()?;
        assert_eq!(got, vec![Model::Integer(1), Model::Integer(2)]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        unregister_reader_macro("safe-test-counter");
        Ok(())
    }

    #[test]
    fn bare_hash_is_incomplete() {
        for input in ["#", "# foo", "#\n"] {
            match read_all_safe(input) {
                Err(ReadErr::PrematureEnd { position, .. }) => {
                    assert_eq!(position, Position { line: 1, column: 1 }, "case {input:?}")
                }
                v => panic!("expected incomplete error for {input:?}, got {v:?}"),
            }
        }
    }

    #[test]
    fn incomplete_dispatch_points_at_hash() {
        let cases = [
            ("(a #", Position { line: 1, column: 4 }),
            ("(a\n  # b)", Position { line: 2, column: 3 }),
        ];
        for (input, want) in cases {
            match read_all_safe(input) {
                Err(ReadErr::PrematureEnd { position, .. }) => {
                    assert_eq!(position, want, "case {input:?}")
                }
                v => panic!("expected incomplete error for {input:?}, got {v:?}"),
            }
        }
    }

    #[test]
    fn comments_are_kept() -> ReadResult<()> {
        let got = read_all_safe("; hello world\n(+ 1 2)")?;
        assert_eq!(got.len(), 2);
        let comment = got[0].as_comment().expect("should be a comment");
        assert_eq!(comment.text(), " hello world");
        assert_eq!(
            got[1],
            Model::Expression(vec![sym("+"), Model::Integer(1), Model::Integer(2)])
        );
        Ok(())
    }

    #[test]
    fn comments_inside_forms() -> ReadResult<()> {
        let got = read_all_safe("(a ; one\n b) ; two")?;
        assert_eq!(got.len(), 2);
        let items = got[0].items().expect("should be a sequence");
        assert_eq!(items.len(), 3);
        assert_eq!(items[1].as_comment().map(Comment::text), Some(" one"));
        assert_eq!(got[1].as_comment().map(Comment::text), Some(" two"));
        Ok(())
    }

    #[test]
    fn comment_at_eof_has_no_newline() -> ReadResult<()> {
        let got = read_all_safe(";;; banner")?;
        assert_eq!(got[0].as_comment().map(Comment::text), Some(";; banner"));
        Ok(())
    }

    #[test]
    fn comments_and_tags_round_trip() -> ReadResult<()> {
        let source = "; header\n(defn f [x] ; doc\n  #tag x)\n#inert (y)\n";
        let first = read_all_safe(source)?;
        let rendered = to_source(&first);
        let second = read_all_safe(&rendered)?;
        assert!(
            same_code_items(&first, &second),
            "round trip changed the code:\n{rendered}"
        );
        assert_eq!(
            first.iter().filter(|m| m.is_comment()).count(),
            second.iter().filter(|m| m.is_comment()).count()
        );
        Ok(())
    }

    #[test]
    fn same_as_base_without_hash_or_semicolon() -> ReadResult<()> {
        let source = r#"(defn greet [name] (print f"hello {name}!" 'x `(a ~b ~@c)) {:k [1 2.5 3j]} b"\x01")"#;
        assert_eq!(read_all_safe(source)?, read_all(source)?);
        Ok(())
    }

    #[test]
    fn fstring_components_stay_safe() -> ReadResult<()> {
        let got = read_all_safe(r#"f"{#foo}""#)?;
        match &got[..] {
            [Model::FString(f)] => match &f.parts[..] {
                [FPart::Component(c)] => assert_eq!(*c.form, sym("#foo")),
                parts => panic!("unexpected parts: {parts:?}"),
            },
            v => panic!("unexpected models: {v:?}"),
        }
        Ok(())
    }

    #[test]
    fn table_has_overrides() {
        let reader = SafeReader::new("");
        assert_eq!(reader.table().get('#'), Some(Handler::InertDispatch));
        assert_eq!(reader.table().get(';'), Some(Handler::LineComment));
        assert_eq!(reader.table().get('('), Some(Handler::Expression));
        // Only the two overrides differ from the default table.
        let defaults = crate::reader::default_table();
        let mut changed: Vec<(char, Handler)> = reader
            .table()
            .iter()
            .filter(|&(c, h)| defaults.get(c) != Some(h))
            .collect();
        changed.sort_by_key(|&(c, _)| c);
        assert_eq!(changed, SAFE_OVERRIDES);
        assert_eq!(reader.table().len(), defaults.len());
        // The default table is untouched.
        assert_eq!(crate::reader::default_table().get('#'), Some(Handler::TagDispatch));
    }
}
