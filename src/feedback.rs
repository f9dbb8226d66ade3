//! Per-answer rating state.
//!
//! Only the most recent completed assistant message is ever ratable, and a
//! rating is terminal: `Unrated` moves to `Rated` once, on backend success,
//! and never back. A downvote has to pass through the correction form
//! first; cancelling the form submits nothing. A pending submission is
//! bound to the answer it rates, so a resolution that lands after the
//! state was rebuilt for a newer answer is ignored.

use serde::Serialize;

use crate::api::{AnswerBackend, ApiError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Vote {
    Up,
    Down,
}

/// Wire body for `POST /feedbacks`. `human_answer` carries the user's
/// correction on a downvote and is empty on an upvote.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FeedbackPayload {
    pub question: String,
    pub chatbot_answer: String,
    pub human_answer: String,
    pub like: bool,
}

/// State for the one ratable answer. Rebuilt from scratch whenever a new
/// assistant message completes; older messages keep no state at all.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FeedbackState {
    rated: bool,
    in_flight: bool,
    form_open: bool,
    comment: String,
    pending_answer: Option<String>,
}

impl FeedbackState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_rated(&self) -> bool {
        self.rated
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn form_is_open(&self) -> bool {
        self.form_open
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    /// Opens the correction form ahead of a downvote. Refused once rated or
    /// while a submission is outstanding.
    pub fn open_correction(&mut self) -> bool {
        if self.rated || self.in_flight {
            return false;
        }
        self.form_open = true;
        true
    }

    /// Closes the form without submitting anything.
    pub fn cancel_correction(&mut self) {
        self.form_open = false;
        self.comment.clear();
    }

    pub fn set_comment(&mut self, text: impl Into<String>) {
        self.comment = text.into();
    }

    /// Builds the payload, marks the submission in flight, and remembers
    /// which answer it rates. `None` means the guard refused: already
    /// rated, or a submission is outstanding.
    pub fn begin(
        &mut self,
        vote: Vote,
        answer_id: &str,
        question: &str,
        answer: &str,
    ) -> Option<FeedbackPayload> {
        if self.rated || self.in_flight {
            return None;
        }
        let human_answer = match vote {
            Vote::Up => String::new(),
            Vote::Down => self.comment.clone(),
        };
        self.in_flight = true;
        self.pending_answer = Some(answer_id.to_string());
        Some(FeedbackPayload {
            question: question.to_string(),
            chatbot_answer: answer.to_string(),
            human_answer,
            like: vote == Vote::Up,
        })
    }

    /// Resolves the outstanding submission for the given answer. Success is
    /// terminal; failure returns to `Unrated` so the user may retry. A
    /// resolution whose answer id does not match the pending one belongs to
    /// a state that has since been replaced and is dropped.
    pub fn complete(&mut self, answer_id: &str, accepted: bool) {
        if self.pending_answer.as_deref() != Some(answer_id) {
            return;
        }
        self.pending_answer = None;
        self.in_flight = false;
        if accepted {
            self.rated = true;
            self.form_open = false;
            self.comment.clear();
        }
    }
}

/// Runs one vote end to end against the backend. `Ok(false)` means the
/// guard refused and nothing was sent.
pub async fn submit_vote(
    state: &mut FeedbackState,
    backend: &dyn AnswerBackend,
    vote: Vote,
    answer_id: &str,
    question: &str,
    answer: &str,
) -> Result<bool, ApiError> {
    let Some(payload) = state.begin(vote, answer_id, question, answer) else {
        return Ok(false);
    };

    match backend.send_feedback(&payload).await {
        Ok(()) => {
            state.complete(answer_id, true);
            Ok(true)
        }
        Err(err) => {
            state.complete(answer_id, false);
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upvote_payload_has_empty_correction() {
        let mut state = FeedbackState::new();
        let payload = state
            .begin(Vote::Up, "a1", "What programs does FTU offer?", "Economics.")
            .unwrap();
        assert!(payload.like);
        assert_eq!(payload.human_answer, "");
        assert_eq!(payload.question, "What programs does FTU offer?");
    }

    #[test]
    fn downvote_payload_carries_comment() {
        let mut state = FeedbackState::new();
        assert!(state.open_correction());
        state.set_comment("Wrong answer");
        let payload = state.begin(Vote::Down, "a1", "q", "a").unwrap();
        assert!(!payload.like);
        assert_eq!(payload.human_answer, "Wrong answer");
    }

    #[test]
    fn cancel_discards_comment_and_stays_unrated() {
        let mut state = FeedbackState::new();
        state.open_correction();
        state.set_comment("Wrong answer");
        state.cancel_correction();
        assert!(!state.is_rated());
        assert!(!state.form_is_open());
        assert_eq!(state.comment(), "");
    }

    #[test]
    fn second_begin_is_refused_while_in_flight() {
        let mut state = FeedbackState::new();
        assert!(state.begin(Vote::Up, "a1", "q", "a").is_some());
        assert!(state.begin(Vote::Up, "a1", "q", "a").is_none());
    }

    #[test]
    fn rated_is_terminal() {
        let mut state = FeedbackState::new();
        state.begin(Vote::Up, "a1", "q", "a").unwrap();
        state.complete("a1", true);
        assert!(state.is_rated());
        assert!(state.begin(Vote::Down, "a1", "q", "a").is_none());
        assert!(!state.open_correction());
    }

    #[test]
    fn failed_submission_allows_retry() {
        let mut state = FeedbackState::new();
        state.begin(Vote::Up, "a1", "q", "a").unwrap();
        state.complete("a1", false);
        assert!(!state.is_rated());
        assert!(state.begin(Vote::Up, "a1", "q", "a").is_some());
    }

    #[test]
    fn success_clears_pending_comment() {
        let mut state = FeedbackState::new();
        state.open_correction();
        state.set_comment("needs a citation");
        state.begin(Vote::Down, "a1", "q", "a").unwrap();
        state.complete("a1", true);
        assert_eq!(state.comment(), "");
        assert!(!state.form_is_open());
    }

    #[test]
    fn resolution_for_a_replaced_state_is_dropped() {
        let mut state = FeedbackState::new();
        state.begin(Vote::Up, "answer-1", "q", "a").unwrap();

        // A new answer arrived before the vote resolved and the state was
        // rebuilt; the old resolution must not rate the new answer.
        state = FeedbackState::new();
        state.complete("answer-1", true);
        assert!(!state.is_rated());
        assert!(!state.is_in_flight());

        // The new answer is still freely ratable.
        assert!(state.begin(Vote::Up, "answer-2", "q", "a").is_some());
    }

    #[test]
    fn stale_failure_does_not_touch_a_fresh_state() {
        let mut state = FeedbackState::new();
        state.begin(Vote::Down, "answer-1", "q", "a").unwrap();

        state = FeedbackState::new();
        state.open_correction();
        state.set_comment("draft for the new answer");
        state.complete("answer-1", false);
        assert!(state.form_is_open());
        assert_eq!(state.comment(), "draft for the new answer");
    }
}
