//! Line comments, kept as syntax nodes.

use std::hash::{Hash, Hasher};

/// A line comment: everything after a `;` up to the end of the line.
///
/// The text excludes the `;` and the terminating newline.
/// Rendering always puts the newline back, even if the comment was at the
/// very end of the input; that way the rendered comment can never swallow
/// whatever is rendered after it.
///
/// Comments are inert with respect to equality: a `Comment` is never equal
/// to anything, not even to itself. Structural comparisons of syntax trees
/// therefore don't depend on comment *contents*, but it also means comments
/// can't be deduplicated or used as keys by value. Don't copy this pattern
/// elsewhere without the same caveat.
#[derive(Debug, Clone)]
pub struct Comment {
    text: String,
}

impl Comment {
    /// The character that introduces a comment.
    pub const INTRODUCER: char = ';';

    /// Create a comment from its body text.
    ///
    /// The text is stored verbatim. The reader never produces embedded
    /// newlines, but they're preserved if a caller passes them in.
    pub fn new(text: impl Into<String>) -> Self {
        Comment { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Render the comment back to source text: `;`, the text, and a newline.
    pub fn render(&self) -> String {
        format!("{}{}\n", Self::INTRODUCER, self.text)
    }

    /// Comments never count as substantive content in a boolean context.
    pub fn is_truthy(&self) -> bool {
        false
    }
}

impl PartialEq for Comment {
    fn eq(&self, _other: &Self) -> bool {
        false
    }
}

impl Hash for Comment {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.text.hash(state)
    }
}

impl std::fmt::Display for Comment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}{}", Self::INTRODUCER, self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(c: &Comment) -> u64 {
        let mut h = DefaultHasher::new();
        c.hash(&mut h);
        h.finish()
    }

    #[test]
    fn render_adds_newline() {
        let c = Comment::new(" hello world");
        assert_eq!(c.render(), "; hello world\n");
        assert_eq!(c.to_string(), "; hello world\n");
    }

    #[test]
    fn render_keeps_embedded_newlines() {
        let c = Comment::new("one\ntwo");
        assert_eq!(c.render(), ";one\ntwo\n");
    }

    #[test]
    #[allow(clippy::eq_op)]
    fn never_equal() {
        let a = Comment::new("same");
        let b = Comment::new("same");
        assert!(a != b);
        assert!(!(a == b));
        // Not even to itself.
        assert!(a != a);
    }

    #[test]
    fn hash_follows_text() {
        assert_eq!(hash_of(&Comment::new("x")), hash_of(&Comment::new("x")));
        assert_ne!(hash_of(&Comment::new("x")), hash_of(&Comment::new("y")));
    }

    #[test]
    fn always_falsy() {
        assert!(!Comment::new("").is_truthy());
        assert!(!Comment::new("content").is_truthy());
    }
}
