//! String-like literals: plain, raw, bytes, f-strings and bracket strings.

use super::{Position, ReadErr, ReadResult, Reader};
use crate::data::{FComponent, FPart, FString, LString, Model};

/// The letters that may prefix a string literal: `r`, `b` and `f`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StringPrefix {
    pub raw: bool,
    pub bytes: bool,
    pub fstring: bool,
}

impl StringPrefix {
    /// Parse an identifier as a string prefix, if it is one.
    pub fn parse(ident: &str) -> Option<StringPrefix> {
        let mut prefix = StringPrefix::default();
        for c in ident.chars() {
            let flag = match c.to_ascii_lowercase() {
                'r' => &mut prefix.raw,
                'b' => &mut prefix.bytes,
                'f' => &mut prefix.fstring,
                _ => return None,
            };
            if *flag {
                return None;
            }
            *flag = true;
        }
        if ident.is_empty() || (prefix.bytes && prefix.fstring) {
            return None;
        }
        Some(prefix)
    }
}

/// Read the rest of a string literal; the opening quote is already consumed.
///
/// `start` is where the literal began, prefix included.
pub(super) fn read_string(
    reader: &mut Reader<'_>,
    prefix: StringPrefix,
    start: Position,
) -> ReadResult<Model> {
    let (text, closed) = reader.read_chars_until(|c| c == '"', true);
    if !closed {
        return Err(ReadErr::premature_end("Partial string literal", start));
    }
    reader.getc();

    if prefix.fstring {
        return read_fstring(reader, &text, prefix.raw, start).map(Model::FString);
    }
    if prefix.bytes {
        return unescape_bytes(&text, prefix.raw, start).map(Model::Bytes);
    }
    let value = if prefix.raw {
        text
    } else {
        unescape(&text, start)?
    };
    Ok(Model::String(LString::new(value)))
}

/// Read a bracket string: `#[delim[ ... ]delim]`. The `#[` is already consumed.
pub(super) fn read_bracket_string(reader: &mut Reader<'_>, start: Position) -> ReadResult<Model> {
    let (delim, closed) = reader.read_chars_until(|c| c == '[', false);
    if !closed {
        return Err(ReadErr::premature_end(
            "Premature end of input while reading a bracket string",
            start,
        ));
    }
    reader.getc();
    let terminator = format!("]{delim}]");
    let Some(len) = reader.rest().find(&terminator) else {
        return Err(ReadErr::premature_end(
            format!("Bracket string is missing its terminator {terminator:?}"),
            start,
        ));
    };
    let value = reader.take_span(len);
    reader.take_span(terminator.len());
    Ok(Model::String(LString {
        value,
        brackets: Some(delim),
    }))
}

type Chars<'a> = std::iter::Peekable<std::str::Chars<'a>>;

/// Exactly `digits` hex digits.
fn read_hex(chars: &mut Chars<'_>, digits: usize, start: Position) -> ReadResult<u32> {
    let hex: String = (0..digits)
        .map_while(|_| chars.next_if(char::is_ascii_hexdigit))
        .collect();
    if hex.len() != digits {
        return Err(ReadErr::lex(format!("truncated hex escape: {hex:?}"), start));
    }
    u32::from_str_radix(&hex, 16)
        .map_err(|e| ReadErr::lex(format!("invalid hex escape {hex:?}: {e}"), start))
}

/// Up to three octal digits, the first of which has already been read.
fn read_octal(first: char, chars: &mut Chars<'_>) -> u32 {
    let mut value = first.to_digit(8).unwrap_or(0);
    for _ in 0..2 {
        match chars.peek().and_then(|c| c.to_digit(8)) {
            Some(d) => {
                value = value * 8 + d;
                chars.next();
            }
            None => break,
        }
    }
    value
}

/// Python-style escapes, for `str` literals.
pub fn unescape(text: &str, start: Position) -> ReadResult<String> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(e) = chars.next() else {
            return Err(ReadErr::lex("string ends in a lone backslash", start));
        };
        match e {
            '\n' => (),
            '\\' | '"' | '\'' => out.push(e),
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'a' => out.push('\x07'),
            'b' => out.push('\x08'),
            'f' => out.push('\x0c'),
            'v' => out.push('\x0b'),
            '0'..='7' => {
                let code = read_octal(e, &mut chars);
                out.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
            }
            'x' | 'u' | 'U' => {
                let digits = match e {
                    'x' => 2,
                    'u' => 4,
                    _ => 8,
                };
                let code = read_hex(&mut chars, digits, start)?;
                let decoded = char::from_u32(code).ok_or_else(|| {
                    ReadErr::lex(format!("escape \\{e} names an invalid character {code:#x}"), start)
                })?;
                out.push(decoded);
            }
            other => {
                return Err(ReadErr::lex(format!("invalid escape sequence \\{other}"), start));
            }
        }
    }
    Ok(out)
}

/// Escapes for `bytes` literals. Literal characters must be ASCII.
pub fn unescape_bytes(text: &str, raw: bool, start: Position) -> ReadResult<Vec<u8>> {
    if !text.is_ascii() {
        return Err(ReadErr::lex("bytes can only contain ASCII literal characters", start));
    }
    if raw {
        return Ok(text.as_bytes().to_vec());
    }
    let mut out = Vec::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c as u8);
            continue;
        }
        let Some(e) = chars.next() else {
            return Err(ReadErr::lex("bytes literal ends in a lone backslash", start));
        };
        match e {
            '\n' => (),
            '\\' | '"' | '\'' => out.push(e as u8),
            'n' => out.push(b'\n'),
            't' => out.push(b'\t'),
            'r' => out.push(b'\r'),
            'a' => out.push(0x07),
            'b' => out.push(0x08),
            'f' => out.push(0x0c),
            'v' => out.push(0x0b),
            '0'..='7' => {
                let code = read_octal(e, &mut chars);
                out.push((code & 0xff) as u8);
            }
            'x' => {
                let code = read_hex(&mut chars, 2, start)?;
                out.push(code as u8);
            }
            other => {
                return Err(ReadErr::lex(format!("invalid escape sequence \\{other}"), start));
            }
        }
    }
    Ok(out)
}

fn flush_literal(
    literal: &mut String,
    parts: &mut Vec<FPart>,
    raw: bool,
    start: Position,
) -> ReadResult<()> {
    if literal.is_empty() {
        return Ok(());
    }
    let s = if raw {
        std::mem::take(literal)
    } else {
        let s = unescape(literal, start)?;
        literal.clear();
        s
    };
    parts.push(FPart::Literal(s));
    Ok(())
}

/// Split the body of an f-string into literal runs and components.
///
/// Each component is read with a copy of `reader`'s table and reader macros,
/// so the component syntax is exactly what the enclosing reader accepts.
fn read_fstring(
    reader: &Reader<'_>,
    text: &str,
    raw: bool,
    start: Position,
) -> ReadResult<FString> {
    let mut parts = Vec::new();
    let mut literal = String::new();
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        match c {
            '{' if chars.peek().map(|&(_, c)| c) == Some('{') => {
                chars.next();
                literal.push('{');
            }
            '}' if chars.peek().map(|&(_, c)| c) == Some('}') => {
                chars.next();
                literal.push('}');
            }
            '}' => {
                return Err(ReadErr::lex("f-string: single '}' is not allowed", start));
            }
            '{' => {
                // Find the matching close brace.
                let mut depth = 1;
                let mut end = None;
                for (j, c) in chars.by_ref() {
                    match c {
                        '{' => depth += 1,
                        '}' => {
                            depth -= 1;
                            if depth == 0 {
                                end = Some(j);
                                break;
                            }
                        }
                        _ => (),
                    }
                }
                let Some(end) = end else {
                    return Err(ReadErr::lex("f-string: expecting '}'", start));
                };
                flush_literal(&mut literal, &mut parts, raw, start)?;
                let component = read_fcomponent(reader, &text[i + 1..end], start)?;
                parts.push(FPart::Component(component));
            }
            c => literal.push(c),
        }
    }
    flush_literal(&mut literal, &mut parts, raw, start)?;
    Ok(FString { parts })
}

/// Read one `{form !c :spec}` component (without the braces).
fn read_fcomponent(reader: &Reader<'_>, source: &str, start: Position) -> ReadResult<FComponent> {
    if source.trim().is_empty() {
        return Err(ReadErr::lex("f-string: empty expression not allowed", start));
    }
    // The literal is already closed, so nothing after it can complete the
    // component: every failure inside it is a lex error at the literal.
    let rebase = |e: ReadErr| {
        ReadErr::lex(format!("in f-string component: {}", e.message()), start)
    };
    let mut sub = reader.nested(source);
    let form = sub.parse_one_form().map_err(rebase)?;

    sub.slurp_space();
    let mut conversion = None;
    if sub.peekc() == Some('!') {
        sub.getc();
        conversion = sub.getc();
        if conversion.is_none() {
            return Err(ReadErr::lex("f-string: missing conversion character after '!'", start));
        }
        sub.slurp_space();
    }
    let mut format_spec = None;
    if sub.peekc() == Some(':') {
        sub.getc();
        format_spec = Some(sub.rest().to_owned());
    } else if !sub.rest().trim().is_empty() {
        return Err(ReadErr::lex(
            format!("f-string: trailing text {:?} after component", sub.rest()),
            start,
        ));
    }
    Ok(FComponent {
        form: Box::new(form),
        conversion,
        format_spec,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos() -> Position {
        Position::default()
    }

    #[test]
    fn prefixes() {
        assert_eq!(
            StringPrefix::parse("rb"),
            Some(StringPrefix {
                raw: true,
                bytes: true,
                fstring: false
            })
        );
        assert_eq!(
            StringPrefix::parse("F"),
            Some(StringPrefix {
                raw: false,
                bytes: false,
                fstring: true
            })
        );
        assert_eq!(StringPrefix::parse("bf"), None);
        assert_eq!(StringPrefix::parse("rr"), None);
        assert_eq!(StringPrefix::parse("x"), None);
        assert_eq!(StringPrefix::parse(""), None);
    }

    #[test]
    fn string_escapes() -> ReadResult<()> {
        assert_eq!(unescape(r#"a\"b\\c\nd"#, pos())?, "a\"b\\c\nd");
        assert_eq!(unescape(r"\x41é\U0001F600", pos())?, "A\u{e9}\u{1F600}");
        assert_eq!(unescape(r"\101\0", pos())?, "A\0");
        assert_eq!(unescape("line \\\ncontinued", pos())?, "line continued");
        Ok(())
    }

    #[test]
    fn invalid_escape() {
        match unescape(r"\q", pos()) {
            Err(ReadErr::Lex { .. }) => (),
            v => panic!("unexpected result for invalid escape: {v:?}"),
        }
        match unescape(r"\x4", pos()) {
            Err(ReadErr::Lex { .. }) => (),
            v => panic!("unexpected result for truncated escape: {v:?}"),
        }
    }

    #[test]
    fn bytes_escapes() -> ReadResult<()> {
        assert_eq!(unescape_bytes(r"a\x00\xff\n", false, pos())?, b"a\x00\xff\n");
        assert_eq!(unescape_bytes(r"a\n", true, pos())?, b"a\\n");
        assert!(unescape_bytes("caf\u{e9}", false, pos()).is_err());
        Ok(())
    }

    #[test]
    fn unbalanced_fstring_component_is_a_lex_error() {
        let input = "(x)\n(y)\n  f\"{(a}\"";
        match crate::reader::read_all_safe(input) {
            Err(ReadErr::Lex { message, position }) => {
                assert!(message.contains("f-string"), "unexpected message {message:?}");
                // The literal starts at the prefix.
                assert_eq!(position, Position { line: 3, column: 3 });
            }
            v => panic!("expected lex error, got {v:?}"),
        }
    }

    #[test]
    fn fstring_component_errors_keep_lex_kind() {
        match crate::reader::read_all(r#"f"{)}""#) {
            Err(ReadErr::Lex { position, .. }) => {
                assert_eq!(position, Position { line: 1, column: 1 })
            }
            v => panic!("expected lex error, got {v:?}"),
        }
    }
}
