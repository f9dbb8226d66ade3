//! The conversation aggregate.
//!
//! Owns the message list and the parallel human/ai history the backend
//! consumes as context. A submission is optimistic: the user message lands
//! immediately, the backend call runs, and the outcome is reconciled with
//! `complete` or rolled back with `fail`. At most one turn is in flight;
//! the guard in `begin` refuses overlapping submissions instead of
//! cancelling anything.

use crate::api::{AnswerBackend, AnswerPayload, ApiError};
use crate::types::{ChatHistoryEntry, Message, Role, fresh_id};

/// Handle for one optimistic submission, held by the caller between
/// `begin` and `complete`/`fail`. The answer id is allocated up front so a
/// placeholder row and the final assistant message share it.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingTurn {
    user_id: String,
    answer_id: String,
    question: String,
}

impl PendingTurn {
    pub fn question(&self) -> &str {
        &self.question
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Conversation {
    messages: Vec<Message>,
    chat_history: Vec<ChatHistoryEntry>,
    in_flight: bool,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn chat_history(&self) -> &[ChatHistoryEntry] {
        &self.chat_history
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// The single message currently eligible for feedback controls: the
    /// last message, when it is a completed assistant answer and no turn is
    /// outstanding. Earlier answers are never re-offered for rating.
    pub fn ratable_message(&self) -> Option<&Message> {
        if self.in_flight {
            return None;
        }
        self.messages
            .last()
            .filter(|msg| msg.role == Role::Assistant && !msg.content.is_empty())
    }

    /// Starts a turn: appends the optimistic user message and raises the
    /// in-flight flag. `None` when the input trims to nothing or a turn is
    /// already outstanding; both are silent no-ops for the caller.
    pub fn begin(&mut self, input: &str) -> Option<PendingTurn> {
        let question = input.trim();
        if question.is_empty() || self.in_flight {
            return None;
        }

        let user = Message::user(question);
        let turn = PendingTurn {
            user_id: user.id.clone(),
            answer_id: fresh_id(),
            question: question.to_string(),
        };
        self.messages.push(user);
        self.in_flight = true;
        Some(turn)
    }

    /// Appends an empty assistant row for the pending answer so the view
    /// has something to render while waiting. Optional; `complete` appends
    /// the answer itself when no placeholder was shown.
    pub fn show_placeholder(&mut self, turn: &PendingTurn) {
        if self.messages.iter().any(|msg| msg.id == turn.answer_id) {
            return;
        }
        let mut placeholder = Message::assistant_placeholder(&turn.question);
        placeholder.id = turn.answer_id.clone();
        self.messages.push(placeholder);
    }

    /// Reconciles a successful response: fills the placeholder in place (or
    /// appends the assistant message), and records exactly one chat-history
    /// entry. A turn whose user message is gone resolved after `clear` and
    /// is dropped without touching current state.
    pub fn complete(&mut self, turn: &PendingTurn, payload: AnswerPayload) {
        if !self.turn_is_live(turn) {
            self.messages.retain(|msg| msg.id != turn.answer_id);
            return;
        }
        self.in_flight = false;

        let serialized_answer = serde_json::to_string(&payload.content).unwrap_or_default();

        match self
            .messages
            .iter_mut()
            .find(|msg| msg.id == turn.answer_id)
        {
            Some(placeholder) => {
                placeholder.content = payload.content;
                placeholder.sources = payload.sources;
                placeholder.recommendations = payload.recommendations;
                placeholder.run_id = payload.run_id;
            }
            None => {
                let mut answer = Message::assistant_placeholder(&turn.question);
                answer.id = turn.answer_id.clone();
                answer.content = payload.content;
                answer.sources = payload.sources;
                answer.recommendations = payload.recommendations;
                answer.run_id = payload.run_id;
                self.messages.push(answer);
            }
        }

        self.chat_history.push(ChatHistoryEntry {
            human: turn.question.clone(),
            ai: serialized_answer,
        });
    }

    /// Rolls the optimistic mutation back: the user message and any
    /// placeholder are removed, chat history stays untouched. Returns the
    /// question text so the caller can restore the input box.
    pub fn fail(&mut self, turn: &PendingTurn) -> String {
        let live = self.turn_is_live(turn);
        self.messages
            .retain(|msg| msg.id != turn.user_id && msg.id != turn.answer_id);
        if live {
            self.in_flight = false;
        }
        turn.question.clone()
    }

    /// Empties the conversation. A response still outstanding when this
    /// runs is dropped as stale on arrival; the aggregate is never left
    /// in-flight.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.chat_history.clear();
        self.in_flight = false;
    }

    fn turn_is_live(&self, turn: &PendingTurn) -> bool {
        self.messages.iter().any(|msg| msg.id == turn.user_id)
    }

    /// Runs one submission end to end. `Ok(false)` means the guard refused
    /// and nothing was sent; `Err` means the backend call failed and the
    /// optimistic message was rolled back.
    pub async fn submit(
        &mut self,
        backend: &dyn AnswerBackend,
        input: &str,
    ) -> Result<bool, ApiError> {
        let Some(turn) = self.begin(input) else {
            return Ok(false);
        };
        self.show_placeholder(&turn);

        let history = self.chat_history.clone();
        match backend.answer(turn.question(), &history).await {
            Ok(payload) => {
                self.complete(&turn, payload);
                Ok(true)
            }
            Err(err) => {
                tracing::warn!("answer request failed: {err}");
                self.fail(&turn);
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Segment;

    fn payload(text: &str) -> AnswerPayload {
        AnswerPayload {
            content: vec![Segment::Text(text.to_string())],
            ..AnswerPayload::default()
        }
    }

    #[test]
    fn begin_refuses_blank_input() {
        let mut conv = Conversation::new();
        assert!(conv.begin("").is_none());
        assert!(conv.begin("   \n").is_none());
        assert!(conv.messages().is_empty());
        assert!(!conv.is_in_flight());
    }

    #[test]
    fn begin_refuses_while_in_flight() {
        let mut conv = Conversation::new();
        let _turn = conv.begin("What programs does FTU offer?").unwrap();
        assert!(conv.begin("Hello").is_none());
        assert_eq!(conv.messages().len(), 1);
    }

    #[test]
    fn failure_rolls_back_optimistic_message() {
        let mut conv = Conversation::new();
        let before = conv.messages().len();
        let turn = conv.begin("What programs does FTU offer?").unwrap();
        conv.show_placeholder(&turn);
        let restored = conv.fail(&turn);
        assert_eq!(conv.messages().len(), before);
        assert_eq!(restored, "What programs does FTU offer?");
        assert!(!conv.is_in_flight());
        assert!(conv.chat_history().is_empty());
    }

    #[test]
    fn success_appends_one_history_entry() {
        let mut conv = Conversation::new();
        let turn = conv.begin("Học phí bao nhiêu?").unwrap();
        conv.complete(&turn, payload("Khoảng 25 triệu đồng một năm."));
        assert_eq!(conv.chat_history().len(), 1);
        assert_eq!(conv.chat_history()[0].human, "Học phí bao nhiêu?");
        assert!(conv.chat_history()[0].ai.contains("25 triệu"));
        assert_eq!(conv.messages().len(), 2);
        assert!(!conv.is_in_flight());
    }

    #[test]
    fn placeholder_is_filled_in_place() {
        let mut conv = Conversation::new();
        let turn = conv.begin("q").unwrap();
        conv.show_placeholder(&turn);
        assert_eq!(conv.messages().len(), 2);
        assert!(conv.messages()[1].is_pending());

        conv.complete(&turn, payload("answer"));
        assert_eq!(conv.messages().len(), 2);
        assert!(!conv.messages()[1].is_pending());
        assert_eq!(conv.messages()[1].question.as_deref(), Some("q"));
    }

    #[test]
    fn input_is_trimmed_before_append() {
        let mut conv = Conversation::new();
        let turn = conv.begin("  question  ").unwrap();
        assert_eq!(turn.question(), "question");
        assert_eq!(conv.messages()[0].raw_content(), "question");
    }

    #[test]
    fn ratable_is_last_completed_assistant_only() {
        let mut conv = Conversation::new();
        assert!(conv.ratable_message().is_none());

        let turn = conv.begin("first").unwrap();
        assert!(conv.ratable_message().is_none());
        conv.complete(&turn, payload("answer one"));
        assert!(conv.ratable_message().is_some());

        let turn = conv.begin("second").unwrap();
        // Older answer loses its controls while a new turn is pending.
        assert!(conv.ratable_message().is_none());
        conv.complete(&turn, payload("answer two"));
        assert_eq!(
            conv.ratable_message().map(|msg| msg.raw_content()),
            Some("answer two".to_string())
        );
    }

    #[test]
    fn clear_never_leaves_in_flight() {
        let mut conv = Conversation::new();
        let _turn = conv.begin("q").unwrap();
        conv.clear();
        assert!(!conv.is_in_flight());
        assert!(conv.messages().is_empty());
        assert!(conv.chat_history().is_empty());
    }

    #[test]
    fn response_resolving_after_clear_is_dropped() {
        let mut conv = Conversation::new();
        let stale = conv.begin("old question").unwrap();
        conv.clear();

        // The user moved on before the old call resolved.
        let fresh = conv.begin("new question").unwrap();
        conv.complete(&stale, payload("stale answer"));
        assert!(conv.is_in_flight());
        assert_eq!(conv.messages().len(), 1);
        assert!(conv.chat_history().is_empty());

        conv.complete(&fresh, payload("fresh answer"));
        assert_eq!(conv.chat_history().len(), 1);
        assert_eq!(conv.chat_history()[0].human, "new question");
    }

    #[test]
    fn failure_resolving_after_clear_keeps_new_turn() {
        let mut conv = Conversation::new();
        let stale = conv.begin("old").unwrap();
        conv.clear();
        let _fresh = conv.begin("new").unwrap();

        conv.fail(&stale);
        assert!(conv.is_in_flight());
        assert_eq!(conv.messages().len(), 1);
    }
}
