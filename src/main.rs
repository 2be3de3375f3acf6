//! Safe read-print loop for Hy.
//!
//! On a terminal, runs interactively with line editing and history
//! (see `SAFEHY_HISTORY` and `SAFEHY_PROMPT`). Otherwise reads stdin to EOF,
//! printing each read node back as source and each read error on stderr.
//!
//! ```ignore
//! <input.hy safehy
//! ```

use std::io::IsTerminal;

use safehy::repl;

fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt::init();

    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        let config = repl::ReplConfig::from_env();
        tracing::debug!(?config, "starting interactive session");
        return repl::interactive(&config);
    }

    let mut input = stdin.lock();
    let mut stdout = std::io::stdout().lock();
    let mut stderr = std::io::stderr().lock();
    repl::run(&mut input, &mut stdout, &mut stderr)
}
