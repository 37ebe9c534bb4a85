use std::io::Write;

use grat_core::sink::{OutputSink, SinkEvent};
use tracing::warn;

use super::presenter::{ChatMessageType, style_chat_text};
use super::progress::GenerationSpinner;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Thought,
    Response,
    Answer,
}

/// Renders turn events to a terminal as they stream.
///
/// The "Model Thought:" and "Model Response:" labels are printed when the kind
/// of reasoner output changes, not for every fragment.
pub struct TerminalSink<W: Write> {
    out: W,
    spinner: Option<GenerationSpinner>,
    section: Option<Section>,
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            spinner: None,
            section: None,
        }
    }

    /// Shows a spinner with `msg` until the first event arrives.
    pub fn with_spinner(mut self, msg: impl Into<String>) -> Self {
        self.spinner = Some(GenerationSpinner::new(msg.into()));
        self
    }

    #[cfg(test)]
    fn into_inner(mut self) -> W {
        self.clear_spinner();
        let Self { out, .. } = self;
        out
    }

    fn clear_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.clear();
        }
    }

    fn enter(&mut self, section: Section) -> std::io::Result<()> {
        if self.section == Some(section) {
            return Ok(());
        }
        let label = match section {
            Section::Thought => "Model Thought:",
            Section::Response => "Model Response:",
            Section::Answer => {
                self.section = Some(section);
                return Ok(());
            }
        };
        if self.section.is_some() {
            writeln!(self.out)?;
        }
        writeln!(self.out, "{}", style_chat_text(label, ChatMessageType::Label))?;
        self.section = Some(section);
        Ok(())
    }

    fn render(&mut self, event: SinkEvent) -> std::io::Result<()> {
        match event {
            SinkEvent::ReasoningStarted => {
                self.section = None;
                writeln!(
                    self.out,
                    "\n{}",
                    style_chat_text("Reasoning Process", ChatMessageType::Header)
                )?;
            }
            SinkEvent::Thought(text) => {
                self.enter(Section::Thought)?;
                write!(self.out, "{text}")?;
            }
            SinkEvent::Response(text) => {
                self.enter(Section::Response)?;
                write!(self.out, "{text}")?;
            }
            SinkEvent::ThinkingTime(time) => {
                let line = format!("Thought for {time}");
                writeln!(
                    self.out,
                    "\n\n{}",
                    style_chat_text(&line, ChatMessageType::Footer)
                )?;
                self.section = None;
            }
            SinkEvent::AnswerStarted(model) => {
                writeln!(self.out, "\n{}", style_chat_text(&model, ChatMessageType::Model))?;
                self.enter(Section::Answer)?;
            }
            SinkEvent::AnswerDelta(text) => {
                write!(self.out, "{text}")?;
            }
            SinkEvent::AnswerFinished => {
                writeln!(self.out, "\n")?;
                self.section = None;
            }
            SinkEvent::Error(message) => {
                writeln!(
                    self.out,
                    "\n{}",
                    style_chat_text(&message, ChatMessageType::Error)
                )?;
            }
        }
        self.out.flush()
    }
}

impl<W: Write> OutputSink for TerminalSink<W> {
    fn emit(&mut self, event: SinkEvent) {
        self.clear_spinner();
        if let Err(err) = self.render(event) {
            warn!(%err, "Failed to write to terminal");
        }
    }
}
