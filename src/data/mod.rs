//! Hy syntax models.
//!
//! A `Model` is one node of read (but never evaluated) source: an atom,
//! a nested form, or a preserved comment.
//! For each type, the Display implementation renders the model as source text
//! that reads back as an equivalent model.
//!
//! Limitations:
//! - Integers are i64; larger literals are a read error.
//! - Symbols are not mangled or interned.

mod comment;
mod display;

pub use comment::Comment;
pub use display::to_source;

pub type Integer = i64;
pub type Float = f64;

/// One node of Hy syntax.
#[derive(Debug, Clone, PartialEq)]
pub enum Model {
    Symbol(Symbol),
    Keyword(String),
    Integer(Integer),
    Float(Float),
    Complex(Complex),
    String(LString),
    Bytes(Vec<u8>),
    FString(FString),
    /// `( ... )`
    Expression(Vec<Model>),
    /// `[ ... ]`
    List(Vec<Model>),
    /// `{ ... }`: alternating keys and values, unchecked.
    Dict(Vec<Model>),
    /// `#{ ... }`
    Set(Vec<Model>),
    /// `#( ... )`
    Tuple(Vec<Model>),
    Comment(Comment),
}

/// A symbol name.
///
/// Symbols produced from an intercepted `#` dispatch are tagged, so a consumer
/// can tell them apart from ordinary identifiers. The tag doesn't take part in
/// equality: two symbols are equal when their names are.
#[derive(Debug, Clone)]
pub struct Symbol {
    name: String,
    from_dispatch: bool,
}

impl Symbol {
    pub fn new(name: impl Into<String>) -> Self {
        Symbol {
            name: name.into(),
            from_dispatch: false,
        }
    }

    /// A symbol standing in for a dispatch form that was read but not run.
    pub fn dispatch(name: impl Into<String>) -> Self {
        Symbol {
            name: name.into(),
            from_dispatch: true,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }

    pub fn from_dispatch(&self) -> bool {
        self.from_dispatch
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

/// A string literal.
///
/// Bracket strings (`#[delim[...]delim]`) remember their delimiter so they can
/// be rendered the way they were written; equality only looks at the value.
#[derive(Debug, Clone)]
pub struct LString {
    pub value: String,
    pub brackets: Option<String>,
}

impl LString {
    pub fn new(value: impl Into<String>) -> Self {
        LString {
            value: value.into(),
            brackets: None,
        }
    }
}

impl PartialEq for LString {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Complex {
    pub real: Float,
    pub imag: Float,
}

/// A formatted string: literal runs and `{...}` components.
#[derive(Debug, Clone, PartialEq)]
pub struct FString {
    pub parts: Vec<FPart>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FPart {
    Literal(String),
    Component(FComponent),
}

/// An interpolated component of an f-string: `{form !c :spec}`.
#[derive(Debug, Clone, PartialEq)]
pub struct FComponent {
    pub form: Box<Model>,
    pub conversion: Option<char>,
    pub format_spec: Option<String>,
}

impl From<Symbol> for Model {
    fn from(value: Symbol) -> Self {
        Model::Symbol(value)
    }
}

impl From<Comment> for Model {
    fn from(value: Comment) -> Self {
        Model::Comment(value)
    }
}

impl From<Integer> for Model {
    fn from(value: Integer) -> Self {
        Model::Integer(value)
    }
}

impl From<Float> for Model {
    fn from(value: Float) -> Self {
        Model::Float(value)
    }
}

impl Model {
    pub fn symbol(name: impl Into<String>) -> Self {
        Model::Symbol(Symbol::new(name))
    }

    pub fn keyword(name: impl Into<String>) -> Self {
        Model::Keyword(name.into())
    }

    pub fn string(value: impl Into<String>) -> Self {
        Model::String(LString::new(value))
    }

    /// An expression headed by the named symbol, e.g. `(quote x)`.
    pub fn call(head: &str, args: impl IntoIterator<Item = Model>) -> Self {
        let mut items = vec![Model::symbol(head)];
        items.extend(args);
        Model::Expression(items)
    }

    pub fn as_symbol(&self) -> Option<&Symbol> {
        match self {
            Model::Symbol(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_comment(&self) -> Option<&Comment> {
        match self {
            Model::Comment(c) => Some(c),
            _ => None,
        }
    }

    pub fn is_comment(&self) -> bool {
        matches!(self, Model::Comment(_))
    }

    /// The children of a bracketed form, if this is one.
    pub fn items(&self) -> Option<&[Model]> {
        match self {
            Model::Expression(v)
            | Model::List(v)
            | Model::Dict(v)
            | Model::Set(v)
            | Model::Tuple(v) => Some(v),
            _ => None,
        }
    }

    /// Short name of the kind of model, for diagnostics and rendering.
    pub fn kind(&self) -> &'static str {
        match self {
            Model::Symbol(_) => "symbol",
            Model::Keyword(_) => "keyword",
            Model::Integer(_) => "integer",
            Model::Float(_) => "float",
            Model::Complex(_) => "complex",
            Model::String(_) => "string",
            Model::Bytes(_) => "bytes",
            Model::FString(_) => "fstring",
            Model::Expression(_) => "expression",
            Model::List(_) => "list",
            Model::Dict(_) => "dict",
            Model::Set(_) => "set",
            Model::Tuple(_) => "tuple",
            Model::Comment(_) => "comment",
        }
    }

    /// Value of the model in a boolean context.
    ///
    /// Empty names, empty sequences, zero and comments are all false.
    pub fn is_truthy(&self) -> bool {
        match self {
            Model::Symbol(s) => !s.as_str().is_empty(),
            Model::Keyword(k) => !k.is_empty(),
            Model::Integer(i) => *i != 0,
            Model::Float(f) => *f != 0.0,
            Model::Complex(c) => c.real != 0.0 || c.imag != 0.0,
            Model::String(s) => !s.value.is_empty(),
            Model::Bytes(b) => !b.is_empty(),
            Model::FString(f) => !f.parts.is_empty(),
            Model::Expression(v)
            | Model::List(v)
            | Model::Dict(v)
            | Model::Set(v)
            | Model::Tuple(v) => !v.is_empty(),
            Model::Comment(c) => c.is_truthy(),
        }
    }

    /// Structural comparison that skips comments.
    ///
    /// Comments inside bracketed forms (at any depth) are ignored, so two forms
    /// that differ only in their comments compare as the same code.
    /// A comment compared directly is never the same as anything.
    pub fn same_code(&self, other: &Model) -> bool {
        use Model::*;
        match (self, other) {
            (Comment(_), _) | (_, Comment(_)) => false,
            (Expression(a), Expression(b))
            | (List(a), List(b))
            | (Dict(a), Dict(b))
            | (Set(a), Set(b))
            | (Tuple(a), Tuple(b)) => same_code_items(a, b),
            (FString(a), FString(b)) => {
                a.parts.len() == b.parts.len()
                    && a.parts.iter().zip(b.parts.iter()).all(|pair| match pair {
                        (FPart::Literal(x), FPart::Literal(y)) => x == y,
                        (FPart::Component(x), FPart::Component(y)) => {
                            x.conversion == y.conversion
                                && x.format_spec == y.format_spec
                                && x.form.same_code(&y.form)
                        }
                        _ => false,
                    })
            }
            (a, b) => a == b,
        }
    }
}

/// Compare two sequences of models with comments removed.
pub fn same_code_items(a: &[Model], b: &[Model]) -> bool {
    let mut a = a.iter().filter(|m| !m.is_comment());
    let mut b = b.iter().filter(|m| !m.is_comment());
    loop {
        match (a.next(), b.next()) {
            (None, None) => return true,
            (Some(x), Some(y)) if x.same_code(y) => continue,
            _ => return false,
        }
    }
}
