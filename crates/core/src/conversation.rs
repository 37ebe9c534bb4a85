//! The two histories of a chat session.
//!
//! Each backend receives context in its own shape. The responder history is a
//! list of role-tagged messages. The reasoner history is a flat list of raw user
//! inputs interleaved with role-tagged assistant answers.
use crate::completion::ChatMessage;

/// An entry of the reasoner history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReasonerEntry {
    /// Raw user input, recorded when a turn starts.
    Raw(String),
    /// Role-tagged message, recorded when a turn completes.
    Message(ChatMessage),
}

/// Messages from the start of the most recent turn to the end of each history.
#[derive(Debug, PartialEq, Eq)]
pub struct Exchange<'a> {
    pub reasoner: &'a [ReasonerEntry],
    pub responder: &'a [ChatMessage],
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationState {
    reasoner_history: Vec<ReasonerEntry>,
    responder_history: Vec<ChatMessage>,
    /// Lengths of both histories when the most recent turn started.
    turn_start: Option<(usize, usize)>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reasoner_history(&self) -> &[ReasonerEntry] {
        &self.reasoner_history
    }

    pub fn responder_history(&self) -> &[ChatMessage] {
        &self.responder_history
    }

    pub fn is_empty(&self) -> bool {
        self.reasoner_history.is_empty() && self.responder_history.is_empty()
    }

    pub(crate) fn push_reasoner_input(&mut self, user_input: &str) {
        self.turn_start = Some((self.reasoner_history.len(), self.responder_history.len()));
        self.reasoner_history
            .push(ReasonerEntry::Raw(user_input.to_string()));
    }

    pub(crate) fn push_responder_prompt(&mut self, prompt: String) {
        self.responder_history.push(ChatMessage::user(prompt));
    }

    /// Records a completed answer in both histories.
    pub(crate) fn commit_answer(&mut self, answer: &str) {
        self.reasoner_history
            .push(ReasonerEntry::Message(ChatMessage::assistant(answer)));
        self.responder_history.push(ChatMessage::assistant(answer));
    }

    /// Empties both histories together.
    pub fn clear(&mut self) {
        self.reasoner_history.clear();
        self.responder_history.clear();
        self.turn_start = None;
    }

    /// Both halves start at the same turn, so the responder half is empty when
    /// that turn never reached the responder.
    pub fn last_exchange(&self) -> Option<Exchange<'_>> {
        let (reasoner_start, responder_start) = self.turn_start?;
        Some(Exchange {
            reasoner: &self.reasoner_history[reasoner_start..],
            responder: &self.responder_history[responder_start..],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_answer_updates_both_histories() {
        let mut state = ConversationState::new();
        state.push_reasoner_input("hi");
        state.push_responder_prompt("<question>hi</question>".to_string());
        state.commit_answer("hello");

        assert_eq!(
            state.reasoner_history(),
            &[
                ReasonerEntry::Raw("hi".to_string()),
                ReasonerEntry::Message(ChatMessage::assistant("hello")),
            ]
        );
        assert_eq!(
            state.responder_history(),
            &[
                ChatMessage::user("<question>hi</question>"),
                ChatMessage::assistant("hello"),
            ]
        );
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut state = ConversationState::new();
        state.push_reasoner_input("hi");
        state.push_responder_prompt("prompt".to_string());

        state.clear();
        let once = state.clone();
        state.clear();

        assert!(state.is_empty());
        assert_eq!(state, once);
    }

    #[test]
    fn test_last_exchange() {
        let mut state = ConversationState::new();
        assert!(state.last_exchange().is_none());

        state.push_reasoner_input("one");
        state.push_responder_prompt("p1".to_string());
        state.commit_answer("a1");
        state.push_reasoner_input("two");
        state.push_responder_prompt("p2".to_string());

        let exchange = state.last_exchange().unwrap();
        assert_eq!(exchange.reasoner, &[ReasonerEntry::Raw("two".to_string())]);
        assert_eq!(exchange.responder, &[ChatMessage::user("p2")]);
    }

    #[test]
    fn test_last_exchange_after_reasoning_failure() {
        let mut state = ConversationState::new();
        state.push_reasoner_input("one");

        let exchange = state.last_exchange().unwrap();
        assert_eq!(exchange.reasoner.len(), 1);
        assert!(exchange.responder.is_empty());
    }

    #[test]
    fn test_last_exchange_does_not_mix_turns() {
        let mut state = ConversationState::new();
        state.push_reasoner_input("one");
        state.push_responder_prompt("p1".to_string());
        state.commit_answer("a1");
        // The second turn fails before the responder is prompted
        state.push_reasoner_input("two");

        let exchange = state.last_exchange().unwrap();
        assert_eq!(exchange.reasoner, &[ReasonerEntry::Raw("two".to_string())]);
        assert!(exchange.responder.is_empty());

        state.clear();
        assert!(state.last_exchange().is_none());
    }
}
