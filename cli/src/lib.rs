pub mod commands;
pub mod context;
pub mod logging;
pub mod repl;
pub mod world;

pub use context::Session;
pub use repl::{parse_line, readline};

/// Parse and run one line. Returns true when the session should end.
pub fn respond(line: &str, session: &mut Session) -> Result<bool, String> {
    match parse_line(line)? {
        Some(command) => commands::run(command, session).map_err(|e| format_error(&e)),
        None => Ok(false),
    }
}

/// Error message with its cause chain
fn format_error(err: &dyn std::error::Error) -> String {
    let mut message = format!("error: {err}");
    let mut cause = err.source();
    while let Some(c) = cause {
        message.push_str(&format!(": {c}"));
        cause = c.source();
    }
    message
}
