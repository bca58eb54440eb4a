//! Operator confirmation prompt.

use std::io::{BufRead, Write};

use tokio::sync::oneshot;

pub const PROMPT: &str = "Continue (y/n)? ";

/// Ask on `out` until a line reading `y` (any case) arrives on `input`.
///
/// Returns `Ok(false)` at end of input.
pub fn confirm_from(mut input: impl BufRead, mut out: impl Write) -> std::io::Result<bool> {
    loop {
        write!(out, "{PROMPT}")?;
        out.flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(false);
        }
        if line.trim().eq_ignore_ascii_case("y") {
            return Ok(true);
        }
    }
}

/// Ask on stdin/stdout without blocking the runtime.
///
/// The read runs on a detached thread so an abandoned prompt never holds up
/// runtime shutdown.
pub async fn confirm_stdin() -> std::io::Result<bool> {
    let (tx, rx) = oneshot::channel();
    std::thread::Builder::new()
        .name("pcq-prompt".to_string())
        .spawn(move || {
            let answer = confirm_from(std::io::stdin().lock(), std::io::stdout());
            let _ = tx.send(answer);
        })?;
    rx.await.unwrap_or(Ok(false))
}
