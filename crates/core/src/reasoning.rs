//! Extraction of a reasoning transcript from a reasoner's thought stream.
use crate::completion::{BackendError, Reasoner};
use crate::conversation::ConversationState;
use crate::sink::{OutputSink, SinkEvent};
use futures::StreamExt;
use std::time::{Duration, Instant};
use tracing::debug;

/// Outcome of the reasoning stage.
#[derive(Debug, Clone, PartialEq)]
pub struct Reasoning {
    /// Concatenated thought fragments. Empty when the reasoner had no thoughts.
    pub transcript: String,
    pub elapsed: Duration,
}

/// Formats time spent thinking: seconds below a minute, minutes from there.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs_f64();
    if secs >= 60.0 {
        format!("{:.1} minutes", secs / 60.0)
    } else {
        format!("{secs:.1} seconds")
    }
}

pub struct ReasoningExtractor<'a> {
    reasoner: &'a dyn Reasoner,
    visible: bool,
}

impl<'a> ReasoningExtractor<'a> {
    pub fn new(reasoner: &'a dyn Reasoner, visible: bool) -> Self {
        Self { reasoner, visible }
    }

    /// Streams the reasoner's output for `user_input` and collects its thoughts.
    ///
    /// The raw input is recorded in the reasoner history before streaming and
    /// stays there even if the stream fails. Thoughts are emitted only when
    /// visible; final fragments are always emitted and never accumulated.
    pub async fn extract(
        &self,
        user_input: &str,
        state: &mut ConversationState,
        sink: &mut dyn OutputSink,
    ) -> Result<Reasoning, BackendError> {
        let start_time = Instant::now();
        state.push_reasoner_input(user_input);

        if self.visible {
            sink.emit(SinkEvent::ReasoningStarted);
        }

        let mut transcript = String::new();
        let mut stream = self.reasoner.stream(user_input).await;
        while let Some(fragment) = stream.next().await {
            let fragment = fragment?;
            if fragment.is_thought {
                transcript.push_str(&fragment.text);
                if self.visible {
                    sink.emit(SinkEvent::Thought(fragment.text));
                }
            } else {
                sink.emit(SinkEvent::Response(fragment.text));
            }
        }

        let elapsed = start_time.elapsed();
        debug!(
            model = self.reasoner.model(),
            transcript_len = transcript.len(),
            ?elapsed,
            "Reasoning complete"
        );
        sink.emit(SinkEvent::ThinkingTime(format_elapsed(elapsed)));

        Ok(Reasoning {
            transcript,
            elapsed,
        })
    }
}
