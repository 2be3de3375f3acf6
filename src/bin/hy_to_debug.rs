//! Read Hy source safely and render it into:
//! - Hy on stdout, i.e. a mirror of the input (comments included)
//! - Debug on stderr - the internal representation from the `safehy` crate.
//!
//! The debug format is given by the defaults of the `derive(Debug)` macro in Rust.
//!
//! ```ignore
//! <input.hy hy_to_debug
//! ```

use std::io::{Read, Write};

use safehy::{ReaderOptions, SafeReader};

fn main() -> std::io::Result<()> {
    let mut s = String::new();
    std::io::stdin().lock().read_to_string(&mut s)?;

    let options = ReaderOptions::new().skip_shebang(true).with_filename("<stdin>");
    let mut stdout = std::io::stdout().lock();
    let mut stderr = std::io::stderr().lock();
    for model in SafeReader::with_options(&s, options) {
        let model = model?;
        stdout.write_all(safehy::to_source([&model]).as_bytes())?;
        writeln!(stderr, "{:?}", model)?;
    }
    Ok(())
}
