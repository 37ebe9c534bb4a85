mod presenter;
mod progress;
mod sink;

pub use presenter::{ChatMessageType, format_exchange, help_text, style_chat_text, welcome_banner};
pub use sink::TerminalSink;

use console::style;

/// Prints a formatted error message to stderr.
pub fn present_error(error: anyhow::Error) {
    let error_text = style("ERROR:").red().bold();
    eprintln!("\n{error_text} {error:#}");
}
