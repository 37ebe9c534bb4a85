//! Ordered, labeled output of a turn as it streams.

/// One emission to the user facing transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    /// Reasoning is about to stream. Only emitted when reasoning is visible.
    ReasoningStarted,
    /// A thought fragment from the reasoner.
    Thought(String),
    /// A final (non thought) fragment from the reasoner.
    Response(String),
    /// Formatted time spent reasoning, e.g. `"45.2 seconds"`.
    ThinkingTime(String),
    /// The responder is about to stream; carries the active model.
    AnswerStarted(String),
    /// A text delta from the responder.
    AnswerDelta(String),
    /// The responder stream completed.
    AnswerFinished,
    /// A recoverable or turn ending error.
    Error(String),
}

pub trait OutputSink {
    fn emit(&mut self, event: SinkEvent);
}

/// Records every emission, in order.
impl OutputSink for Vec<SinkEvent> {
    fn emit(&mut self, event: SinkEvent) {
        self.push(event);
    }
}
