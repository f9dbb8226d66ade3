//! Client-side engine and UI for the FTU admissions chatbot.
//!
//! The conversation state lives entirely in memory for the lifetime of the
//! session: `conversation` owns the message list and backend context,
//! `feedback` owns the rating state for the latest answer, `sources`
//! derives deduplicated citation views, and `api` speaks the backend's
//! HTTP contract.

pub mod api;
pub mod conversation;
pub mod feedback;
pub mod sources;
pub mod types;
pub mod ui;
pub mod views;
