//! Progress and error lines printed on stdout.
//!
//! CI logs are the audience, so every line is a single `- ` prefixed
//! sentence. Colors are dropped automatically when stdout is not a terminal.

use console::style;

/// Text of a progress line, e.g. `- committing changes`.
pub fn format_step(message: &str) -> String {
    format!("{} {}", style("-").yellow(), message)
}

pub fn format_error(message: &str) -> String {
    format!("{} {}", style("ERROR:").red().bold(), message)
}

/// Print a progress line before a stage starts.
pub fn display_step(message: &str) {
    println!("{}", format_step(message));
}

/// Print the failure that ended the run.
pub fn display_error(message: &str) {
    println!("{}", format_error(message));
}

pub fn display_success(message: &str) {
    println!("{} {}", style("-").green(), style(message).green());
}
