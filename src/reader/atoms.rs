//! Classifying identifiers: numbers, keywords and symbols.

use super::{Position, ReadErr, ReadResult};
use crate::data::{Complex, Float, Integer, Model};

/// Characters that can't be part of an identifier.
const NON_IDENT: &str = "()[]{};\"'`~";

/// True if the character ends an identifier.
pub fn ends_ident(c: char) -> bool {
    c.is_whitespace() || NON_IDENT.contains(c)
}

mod regex {
    use regex::Regex;
    use std::sync::OnceLock;

    pub(super) fn integer() -> &'static Regex {
        static MATCH: OnceLock<Regex> = OnceLock::new();
        MATCH.get_or_init(|| {
            // Optional sign, then a prefixed base or plain decimal digits.
            // `_` and `,` are separators and can appear anywhere after the first digit.
            Regex::new(r"\A[-+]?(0[xX][0-9a-fA-F_]+|0[oO][0-7_]+|0[bB][01_]+|[0-9][0-9_,]*)\z")
                .expect("could not compile regex for integer")
        })
    }

    pub(super) fn float() -> &'static Regex {
        static MATCH: OnceLock<Regex> = OnceLock::new();
        MATCH.get_or_init(|| {
            // Needs a point or an exponent; bare digits are integers.
            Regex::new(
                r"\A[-+]?([0-9][0-9_,]*\.[0-9_,]*([eE][-+]?[0-9]+)?|\.[0-9][0-9_,]*([eE][-+]?[0-9]+)?|[0-9][0-9_,]*[eE][-+]?[0-9]+)\z",
            )
            .expect("could not compile regex for float")
        })
    }

    pub(super) fn decimal() -> &'static Regex {
        static MATCH: OnceLock<Regex> = OnceLock::new();
        MATCH.get_or_init(|| {
            // Either half of a complex literal.
            Regex::new(r"\A[-+]?([0-9][0-9_,]*(\.[0-9_,]*)?|\.[0-9][0-9_,]*)([eE][-+]?[0-9]+)?\z")
                .expect("could not compile regex for decimal")
        })
    }
}

fn strip_separators(s: &str) -> String {
    s.chars().filter(|&c| c != '_' && c != ',').collect()
}

fn parse_integer(ident: &str, start: Position) -> ReadResult<Option<Integer>> {
    if !regex::integer().is_match(ident) {
        return Ok(None);
    }
    let (sign, unsigned) = match ident.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", ident.strip_prefix('+').unwrap_or(ident)),
    };
    let (radix, digits) = match unsigned.get(..2) {
        Some("0x" | "0X") => (16, &unsigned[2..]),
        Some("0o" | "0O") => (8, &unsigned[2..]),
        Some("0b" | "0B") => (2, &unsigned[2..]),
        _ => (10, unsigned),
    };
    let digits = format!("{sign}{}", strip_separators(digits));
    Integer::from_str_radix(&digits, radix)
        .map(Some)
        .map_err(|e| ReadErr::lex(format!("could not read {ident:?} as an integer: {e}"), start))
}

fn parse_decimal(s: &str) -> Option<Float> {
    strip_separators(s).parse().ok()
}

fn parse_float(ident: &str) -> Option<Float> {
    match ident {
        "NaN" => Some(Float::NAN),
        "Inf" => Some(Float::INFINITY),
        "-Inf" => Some(Float::NEG_INFINITY),
        _ if regex::float().is_match(ident) => parse_decimal(ident),
        _ => None,
    }
}

/// Complex literals: `2j`, `1.5-2j`, `1e3+4.5J`.
fn parse_complex(ident: &str) -> Option<Complex> {
    let body = ident
        .strip_suffix('j')
        .or_else(|| ident.strip_suffix('J'))?;
    // The imaginary part starts at the last sign that isn't leading and
    // isn't part of an exponent.
    let split = body
        .char_indices()
        .filter(|&(i, c)| {
            (c == '+' || c == '-') && i > 0 && !body[..i].ends_with(['e', 'E'])
        })
        .map(|(i, _)| i)
        .last();
    let (real, imag) = match split {
        Some(i) => (&body[..i], &body[i..]),
        None => ("", body),
    };
    if !imag.contains(|c: char| c.is_ascii_digit()) || !regex::decimal().is_match(imag) {
        return None;
    }
    let real = if real.is_empty() {
        0.0
    } else if regex::decimal().is_match(real) {
        parse_decimal(real)?
    } else {
        return None;
    };
    Some(Complex {
        real,
        imag: parse_decimal(imag)?,
    })
}

/// Turn an identifier into the model it denotes.
///
/// Numbers win over everything else; then keywords (`:name`); then symbols.
pub fn as_identifier(ident: &str, start: Position) -> ReadResult<Model> {
    if let Some(i) = parse_integer(ident, start)? {
        return Ok(Model::Integer(i));
    }
    if let Some(f) = parse_float(ident) {
        return Ok(Model::Float(f));
    }
    if let Some(c) = parse_complex(ident) {
        return Ok(Model::Complex(c));
    }
    if let Some(name) = ident.strip_prefix(':') {
        return Ok(Model::keyword(name));
    }
    Ok(Model::symbol(ident))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(ident: &str) -> Model {
        as_identifier(ident, Position::default()).unwrap()
    }

    #[test]
    fn recognize_symbols() {
        for sym in [
            "hello",
            "tree->list",
            "operator<>",
            "Queryable?",
            "IMPORTANT!",
            "-",
            "+",
            "...",
            "j",
            "-j",
            "1+",
            "inf",
            "nan",
            "a.b",
        ] {
            assert_eq!(classify(sym), Model::symbol(sym), "case {sym}");
        }
    }

    #[test]
    fn recognize_integers() {
        let cases: &[(&str, Integer)] = &[
            ("24601", 24601),
            ("-6", -6),
            ("+7", 7),
            ("1_000", 1000),
            ("1,000,000", 1_000_000),
            ("0xff", 255),
            ("-0X1F", -31),
            ("0o17", 15),
            ("0b1010", 10),
        ];
        for (ident, want) in cases {
            assert_eq!(classify(ident), Model::Integer(*want), "case {ident}");
        }
    }

    #[test]
    fn integer_overflow_is_an_error() {
        let err = as_identifier("99999999999999999999", Position::default()).unwrap_err();
        assert!(!err.is_incomplete());
    }

    #[test]
    fn recognize_floats() {
        let cases: &[(&str, Float)] = &[
            ("-3.33", -3.33),
            ("3.", 3.0),
            (".5", 0.5),
            ("1e3", 1000.0),
            ("2.5E-1", 0.25),
            ("1_000.5", 1000.5),
            ("Inf", Float::INFINITY),
            ("-Inf", Float::NEG_INFINITY),
        ];
        for (ident, want) in cases {
            assert_eq!(classify(ident), Model::Float(*want), "case {ident}");
        }
        match classify("NaN") {
            Model::Float(f) => assert!(f.is_nan()),
            m => panic!("unexpected model for NaN: {m:?}"),
        }
    }

    #[test]
    fn recognize_complex() {
        let cases: &[(&str, Float, Float)] = &[
            ("2j", 0.0, 2.0),
            ("-2.5J", 0.0, -2.5),
            ("1+2j", 1.0, 2.0),
            ("1.0-2.0j", 1.0, -2.0),
            ("1e3+4j", 1000.0, 4.0),
            ("1e-3-4j", 0.001, -4.0),
        ];
        for (ident, real, imag) in cases {
            assert_eq!(
                classify(ident),
                Model::Complex(Complex {
                    real: *real,
                    imag: *imag
                }),
                "case {ident}"
            );
        }
    }

    #[test]
    fn recognize_keywords() {
        assert_eq!(classify(":key"), Model::keyword("key"));
        assert_eq!(classify(":"), Model::keyword(""));
    }

    #[test]
    fn ident_terminators() {
        for c in ['(', ')', '[', ']', '{', '}', ';', '"', '\'', '`', '~', ' ', '\n'] {
            assert!(ends_ident(c), "{c:?} should end an identifier");
        }
        for c in ['#', ':', '.', '-', 'a', '@', ','] {
            assert!(!ends_ident(c), "{c:?} should not end an identifier");
        }
    }
}
