//! The reader table: which handler runs for each introducer character.

use std::collections::HashMap;
use std::sync::OnceLock;

/// A grammar rule, selected by the character that starts a form.
///
/// Handlers are plain tags; the reader decides what each one does.
/// Characters with no entry go to the default identifier/atom rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handler {
    /// `(`
    Expression,
    /// `[`
    List,
    /// `{`
    Dict,
    /// A closing bracket with no matching opener.
    Closer,
    /// `"`
    String,
    /// `'`
    Quote,
    /// `` ` ``
    Quasiquote,
    /// `~` and `~@`
    Unquote,
    /// `#`: reader macros and the built-in `#` forms.
    TagDispatch,
    /// `;`, discarding the comment.
    SkipComment,
    /// `#`, read as an inert symbol.
    InertDispatch,
    /// `;`, kept as a comment node.
    LineComment,
}

/// Mapping from introducer character to handler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReaderTable {
    entries: HashMap<char, Handler>,
}

impl ReaderTable {
    pub fn get(&self, introducer: char) -> Option<Handler> {
        self.entries.get(&introducer).copied()
    }

    /// Install a handler, replacing whatever the table had for the character.
    pub fn set(&mut self, introducer: char, handler: Handler) -> Option<Handler> {
        self.entries.insert(introducer, handler)
    }

    /// Install each of the overrides, in order.
    pub fn apply(&mut self, overrides: &[(char, Handler)]) {
        for &(introducer, handler) in overrides {
            self.set(introducer, handler);
        }
    }

    /// A copy of this table with the overrides applied on top.
    pub fn with_overrides(&self, overrides: &[(char, Handler)]) -> ReaderTable {
        let mut table = self.clone();
        table.apply(overrides);
        table
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, Handler)> + '_ {
        self.entries.iter().map(|(&c, &h)| (c, h))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

const DEFAULT_ENTRIES: &[(char, Handler)] = &[
    ('(', Handler::Expression),
    ('[', Handler::List),
    ('{', Handler::Dict),
    (')', Handler::Closer),
    (']', Handler::Closer),
    ('}', Handler::Closer),
    ('"', Handler::String),
    ('\'', Handler::Quote),
    ('`', Handler::Quasiquote),
    ('~', Handler::Unquote),
    ('#', Handler::TagDispatch),
    (';', Handler::SkipComment),
];

/// The base reader's table. Built once; readers work on their own copies.
pub fn default_table() -> &'static ReaderTable {
    static TABLE: OnceLock<ReaderTable> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = ReaderTable::default();
        table.apply(DEFAULT_ENTRIES);
        table
    })
}
