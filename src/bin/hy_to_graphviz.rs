//! Render a safely-read Hy syntax tree as Graphviz.
//!
//! Usage:
//!
//! ```ignore
//! <input.hy hy_to_graphviz | dot -T png >output.png
//! ```

use std::io::{stdout, Read, Write};

use safehy::{read_all_safe, render_graphviz};

/// Reads a Hy file on input, renders it as Graphviz.
pub fn main() -> std::io::Result<()> {
    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;
    let models = read_all_safe(&input)?;
    let out = render_graphviz(&models);
    stdout().write_all(&out)
}
