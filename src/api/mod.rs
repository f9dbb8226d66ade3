//! HTTP contract with the admissions answer service.
//!
//! The service is consumed, not owned: `/function-calling` produces an
//! answer with sources and follow-up recommendations, `/feedbacks` records
//! a rating, `/get_trace` resolves a run id to a trace URL. `AnswerBackend`
//! is the seam the conversation engine talks through, so tests can swap in
//! a scripted backend.

mod client;

pub use client::{
    AnswerBackend, AnswerPayload, ApiError, ApiResult, HttpBackend, parse_answer_body,
    parse_trace_body,
};
