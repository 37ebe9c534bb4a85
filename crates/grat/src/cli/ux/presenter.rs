use console::{Style, StyledObject};
use grat_core::completion::{ChatMessage, SenderType};
use grat_core::conversation::{Exchange, ReasonerEntry};

const MAX_LOG_MESSAGE_CHARS: usize = 500;

/// Represents the type of a chat message, used for styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatMessageType {
    /// The prompt for user input.
    Prompt,
    /// Section headers, e.g. the reasoning header.
    Header,
    /// Label preceding reasoner output.
    Label,
    /// Name of the model answering.
    Model,
    /// Status lines, like elapsed time.
    Footer,
    /// Confirmation of a session change.
    Notice,
    /// An error message.
    Error,
}

/// Styles a string of text according to the specified `ChatMessageType`.
pub fn style_chat_text(text: &str, style: ChatMessageType) -> StyledObject<&str> {
    let style_obj = match style {
        ChatMessageType::Prompt => Style::new().color256(208).bold(),
        ChatMessageType::Header => Style::new().blue(),
        ChatMessageType::Label => Style::new().white().dim(),
        ChatMessageType::Model => Style::new().green(),
        ChatMessageType::Footer => Style::new().yellow(),
        ChatMessageType::Notice => Style::new().magenta(),
        ChatMessageType::Error => Style::new().red().bold(),
    };
    style_obj.apply_to(text)
}

pub fn welcome_banner() -> String {
    let title = Style::new().cyan().bold().apply_to("gRAT");
    let subtitle = Style::new()
        .cyan()
        .apply_to("Gemini retrieval augmented thinking");
    format!("{title} - {subtitle}\n\n{}", help_text())
}

pub fn help_text() -> String {
    let commands = [
        ("quit", "exit"),
        ("model <name>", "change the responder model"),
        ("reasoning", "toggle reasoning visibility"),
        ("clear", "clear chat history"),
        ("log", "show the last exchange sent to each model"),
        ("help", "show this help"),
    ];
    let mut out = style_chat_text("Commands:", ChatMessageType::Footer).to_string();
    for (name, description) in commands {
        out.push_str(&format!(
            "\n • Type {} to {description}",
            Style::new().magenta().bold().apply_to(format!("'{name}'"))
        ));
    }
    out
}

fn truncate(text: &str) -> String {
    if text.chars().count() > MAX_LOG_MESSAGE_CHARS {
        let mut content: String = text.chars().take(MAX_LOG_MESSAGE_CHARS).collect();
        content.push_str("\n... [truncated]");
        content
    } else {
        text.to_string()
    }
}

fn format_message(message: &ChatMessage) -> String {
    let sender_tag = match message.sender {
        SenderType::User => "USER:",
        SenderType::Assistant => "ASSISTANT:",
    };
    format!("{sender_tag} {}", truncate(&message.text))
}

/// Formats the most recent exchange as recorded in both histories.
pub fn format_exchange(exchange: Option<Exchange<'_>>) -> String {
    let Some(exchange) = exchange else {
        return "No recent messages to display".to_string();
    };

    let mut out = String::new();
    out.push_str("=== LAST EXCHANGE ===\n");
    out.push_str("--- reasoner ---\n");
    for entry in exchange.reasoner {
        let line = match entry {
            ReasonerEntry::Raw(text) => format!("RAW: {}", truncate(text)),
            ReasonerEntry::Message(message) => format_message(message),
        };
        out.push_str(&line);
        out.push('\n');
    }
    out.push_str("--- responder ---\n");
    for message in exchange.responder {
        out.push_str(&format_message(message));
        out.push('\n');
    }
    out.push_str("=====================\n");
    out
}
