//! Rendering models back to Hy source text.

use std::fmt::{self, Display, Formatter, Write};

use super::{Complex, FComponent, FPart, FString, Float, LString, Model, Symbol};

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Floats render so they read back as floats: always with a point or exponent.
fn write_float(f: &mut Formatter<'_>, v: Float) -> fmt::Result {
    if v.is_nan() {
        f.write_str("NaN")
    } else if v.is_infinite() {
        f.write_str(if v > 0.0 { "Inf" } else { "-Inf" })
    } else {
        write!(f, "{v:?}")
    }
}

impl Display for Complex {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.real != 0.0 || self.real.is_sign_negative() {
            write_float(f, self.real)?;
            if !self.imag.is_sign_negative() {
                f.write_char('+')?;
            }
        }
        write_float(f, self.imag)?;
        f.write_char('j')
    }
}

impl Display for LString {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(delim) = &self.brackets {
            return write!(f, "#[{delim}[{}]{delim}]", self.value);
        }
        f.write_char('"')?;
        for c in self.value.chars() {
            match c {
                '\\' => f.write_str(r"\\")?,
                '"' => f.write_str("\\\"")?,
                c => f.write_char(c)?,
            }
        }
        f.write_char('"')
    }
}

fn write_bytes(f: &mut Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    f.write_str("b\"")?;
    for &b in bytes {
        match b {
            b'\\' => f.write_str(r"\\")?,
            b'"' => f.write_str("\\\"")?,
            b'\n' => f.write_str(r"\n")?,
            b'\t' => f.write_str(r"\t")?,
            b'\r' => f.write_str(r"\r")?,
            0x20..=0x7e => f.write_char(b as char)?,
            _ => write!(f, "\\x{b:02x}")?,
        }
    }
    f.write_char('"')
}

impl Display for FComponent {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}", self.form)?;
        if let Some(c) = self.conversion {
            write!(f, " !{c}")?;
        }
        if let Some(spec) = &self.format_spec {
            write!(f, " :{spec}")?;
        }
        f.write_char('}')
    }
}

impl Display for FString {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("f\"")?;
        for part in &self.parts {
            match part {
                FPart::Literal(s) => {
                    for c in s.chars() {
                        match c {
                            '\\' => f.write_str(r"\\")?,
                            '"' => f.write_str("\\\"")?,
                            '{' => f.write_str("{{")?,
                            '}' => f.write_str("}}")?,
                            c => f.write_char(c)?,
                        }
                    }
                }
                FPart::Component(c) => c.fmt(f)?,
            }
        }
        f.write_char('"')
    }
}

fn write_seq(f: &mut Formatter<'_>, open: &str, items: &[Model], close: &str) -> fmt::Result {
    f.write_str(open)?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_char(' ')?;
        }
        item.fmt(f)?;
    }
    f.write_str(close)
}

impl Display for Model {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Model::Symbol(s) => s.fmt(f),
            Model::Keyword(k) => write!(f, ":{k}"),
            Model::Integer(i) => write!(f, "{i}"),
            Model::Float(v) => write_float(f, *v),
            Model::Complex(c) => c.fmt(f),
            Model::String(s) => s.fmt(f),
            Model::Bytes(b) => write_bytes(f, b),
            Model::FString(s) => s.fmt(f),
            Model::Expression(v) => write_seq(f, "(", v, ")"),
            Model::List(v) => write_seq(f, "[", v, "]"),
            Model::Dict(v) => write_seq(f, "{", v, "}"),
            Model::Set(v) => write_seq(f, "#{", v, "}"),
            Model::Tuple(v) => write_seq(f, "#(", v, ")"),
            Model::Comment(c) => c.fmt(f),
        }
    }
}

/// Render a sequence of top-level models as source, one per line.
///
/// Comments already end in a newline, so they don't get another one.
pub fn to_source<'a>(models: impl IntoIterator<Item = &'a Model>) -> String {
    let mut out = String::new();
    for model in models {
        // Writing to a String can't fail.
        let _ = write!(out, "{model}");
        if !model.is_comment() {
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Comment;

    #[test]
    fn render_atoms() {
        let cases: &[(Model, &str)] = &[
            (Model::symbol("hello"), "hello"),
            (Model::keyword("key"), ":key"),
            (Model::Integer(-6), "-6"),
            (Model::Float(1.0), "1.0"),
            (Model::Float(f64::NAN), "NaN"),
            (Model::Float(f64::NEG_INFINITY), "-Inf"),
            (
                Model::Complex(Complex {
                    real: 0.0,
                    imag: 3.0,
                }),
                "3.0j",
            ),
            (
                Model::Complex(Complex {
                    real: 1.0,
                    imag: -2.0,
                }),
                "1.0-2.0j",
            ),
            (Model::string("say \"hi\"\\"), r#""say \"hi\"\\""#),
            (Model::Bytes(b"a\x00\"".to_vec()), r#"b"a\x00\"""#),
        ];
        for (model, want) in cases {
            assert_eq!(&model.to_string(), want);
        }
    }

    #[test]
    fn render_bracket_string() {
        let s = Model::String(LString {
            value: "no \"escapes\" here".to_owned(),
            brackets: Some("x".to_owned()),
        });
        assert_eq!(s.to_string(), "#[x[no \"escapes\" here]x]");
    }

    #[test]
    fn render_nested_with_comment() {
        let form = Model::Expression(vec![
            Model::symbol("+"),
            Model::Comment(Comment::new(" first")),
            Model::Integer(1),
            Model::List(vec![Model::Integer(2)]),
            Model::Set(vec![]),
        ]);
        assert_eq!(form.to_string(), "(+ ; first\n 1 [2] #{})");
    }

    #[test]
    fn render_fstring() {
        let s = Model::FString(FString {
            parts: vec![
                FPart::Literal("{a} ".to_owned()),
                FPart::Component(FComponent {
                    form: Box::new(Model::symbol("x")),
                    conversion: Some('r'),
                    format_spec: Some(">5".to_owned()),
                }),
            ],
        });
        assert_eq!(s.to_string(), "f\"{{a}} {x !r :>5}\"");
    }

    #[test]
    fn source_lines() {
        let models = [
            Model::Comment(Comment::new(" top")),
            Model::symbol("a"),
            Model::Integer(2),
        ];
        assert_eq!(to_source(&models), "; top\na\n2\n");
    }
}
