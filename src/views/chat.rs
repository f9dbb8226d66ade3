use std::sync::Arc;

use dioxus::events::Key;
use dioxus::prelude::*;

use crate::api::{AnswerBackend, HttpBackend};
use crate::conversation::Conversation;
use crate::feedback::{FeedbackState, Vote};
use crate::sources::dedupe_sources;
use crate::types::{Message, Role, Segment};
use crate::views::shared::{format_message_timestamp, markdown_to_html};

/// Transient banner shown above the composer. The session never dies on an
/// error; the banner is the whole recovery surface.
#[derive(Clone, Debug, PartialEq)]
pub enum Notice {
    Info(String),
    Error(String),
}

const STARTER_QUESTIONS: &[&str] = &[
    "Trường FTU có những ngành đào tạo nào?",
    "Điểm chuẩn năm ngoái của ngành Kinh tế đối ngoại?",
    "Học phí một năm là bao nhiêu?",
    "Trường có những chương trình học bổng nào?",
];

#[component]
pub fn ChatView() -> Element {
    use_context_provider(|| -> Arc<dyn AnswerBackend> { Arc::new(HttpBackend::from_env()) });
    let backend: Arc<dyn AnswerBackend> = use_context();

    let conversation = use_signal(Conversation::new);
    let input = use_signal(String::new);
    let feedback = use_signal(FeedbackState::new);
    let notice = use_signal(|| Option::<Notice>::None);

    let send_message = {
        let backend = backend.clone();
        let mut conversation = conversation;
        let mut input_signal = input;
        let mut feedback = feedback;
        let mut notice = notice;
        move |text: String| {
            let Some(turn) = conversation.with_mut(|conv| conv.begin(&text)) else {
                return;
            };
            conversation.with_mut(|conv| conv.show_placeholder(&turn));
            input_signal.set(String::new());
            feedback.set(FeedbackState::new());
            notice.set(None);

            let backend = backend.clone();
            spawn(async move {
                let history = conversation.with(|conv| conv.chat_history().to_vec());
                match backend.answer(turn.question(), &history).await {
                    Ok(payload) => {
                        conversation.with_mut(|conv| conv.complete(&turn, payload));
                    }
                    Err(err) => {
                        tracing::error!("answer request failed: {err}");
                        let question = conversation.with_mut(|conv| conv.fail(&turn));
                        input_signal.set(question);
                        notice.set(Some(Notice::Error(
                            "Không nhận được câu trả lời. Vui lòng thử lại.".to_string(),
                        )));
                    }
                }
            });
        }
    };

    let snapshot = conversation();
    let sending = snapshot.is_in_flight();
    let ratable_id = snapshot.ratable_message().map(|msg| msg.id.clone());
    let has_messages = !snapshot.messages().is_empty();

    rsx! {
        div { class: "main-container",
            div { class: "chat-wrap",
                if has_messages {
                    div { id: "chat-list", class: "chat-list",
                        // Newest-first in the DOM, column-reverse in CSS, so
                        // the list stays pinned to the latest turn.
                        for msg in snapshot.messages().iter().rev() {
                            MessageRow {
                                key: "{msg.id}",
                                message: msg.clone(),
                                ratable: Some(&msg.id) == ratable_id.as_ref(),
                                feedback,
                                notice,
                                on_recommendation: {
                                    let mut send = send_message.clone();
                                    move |rec: String| send(rec)
                                },
                            }
                        }
                    }
                } else {
                    EmptyState {
                        on_choice: {
                            let mut send = send_message.clone();
                            move |question: String| send(question)
                        },
                    }
                }
            }

            if let Some(current) = notice() {
                NoticeBanner { notice: current, slot: notice }
            }

            form { class: "composer no-divider",
                div { class: "composer-inner",
                    div { class: "hstack", style: "gap: 0.5rem; width: 100%; align-items: flex-end;",
                        if has_messages {
                            button {
                                class: "btn btn-ghost",
                                r#type: "button",
                                title: "Xóa đoạn chat",
                                onclick: {
                                    let mut conversation = conversation;
                                    let mut feedback = feedback;
                                    move |_| {
                                        conversation.with_mut(|conv| conv.clear());
                                        feedback.set(FeedbackState::new());
                                    }
                                },
                                "Xóa"
                            }
                        }
                        textarea {
                            class: "",
                            rows: "1",
                            placeholder: "Nhập câu hỏi tại đây...",
                            value: "{input}",
                            oninput: {
                                let mut input = input;
                                move |ev: Event<FormData>| input.set(ev.value())
                            },
                            onkeydown: {
                                let input = input;
                                let mut send = send_message.clone();
                                move |ev: Event<KeyboardData>| {
                                    if ev.key() == Key::Enter && !ev.modifiers().shift() {
                                        ev.prevent_default();
                                        let text = input();
                                        send(text);
                                    }
                                }
                            },
                            disabled: sending,
                            autofocus: true,
                        }
                        button {
                            class: "btn btn-primary",
                            r#type: "button",
                            disabled: sending || input().trim().is_empty(),
                            onclick: {
                                let input = input;
                                let mut send = send_message.clone();
                                move |_| {
                                    let text = input();
                                    send(text);
                                }
                            },
                            if sending { "…" } else { "Gửi" }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn EmptyState(on_choice: EventHandler<String>) -> Element {
    rsx! {
        div { class: "empty-state",
            p { class: "empty-state-hint", "Bạn có thể bắt đầu với một trong các câu hỏi sau:" }
            div { class: "starter-grid",
                for question in STARTER_QUESTIONS.iter() {
                    button {
                        class: "starter-card",
                        onclick: {
                            let question = question.to_string();
                            move |_| on_choice.call(question.clone())
                        },
                        "{question}"
                    }
                }
            }
        }
    }
}

#[component]
fn NoticeBanner(notice: Notice, slot: Signal<Option<Notice>>) -> Element {
    let mut slot = slot;
    let (class, text) = match &notice {
        Notice::Info(text) => ("notice notice-info", text.clone()),
        Notice::Error(text) => ("notice notice-error", text.clone()),
    };
    rsx! {
        div { class: "{class}",
            span { "{text}" }
            button {
                class: "notice-dismiss",
                onclick: move |_| slot.set(None),
                "×"
            }
        }
    }
}

#[component]
fn MessageRow(
    message: Message,
    ratable: bool,
    feedback: Signal<FeedbackState>,
    notice: Signal<Option<Notice>>,
    on_recommendation: EventHandler<String>,
) -> Element {
    let is_user = message.role == Role::User;
    let role_class = if is_user { "user" } else { "assistant" };
    let timestamp = format_message_timestamp(message.created_at);

    rsx! {
        div { class: format_args!("message-row {}", role_class),
            if !is_user {
                div { class: "avatar assistant", "F" }
            }
            div { class: "message-stack",
                if message.is_pending() {
                    div { class: "shimmer-line",
                        span { class: "shimmer-text", "Đang xử lý…" }
                    }
                } else {
                    div { class: format_args!("bubble {}", role_class),
                        if is_user {
                            "{message.raw_content()}"
                        } else {
                            AssistantBubble { message: message.clone(), ratable, feedback, notice, on_recommendation }
                        }
                    }
                }
                if let Some(ts) = timestamp {
                    div { class: format_args!(
                            "message-meta {}",
                            if is_user { "align-end" } else { "align-start" }
                        ),
                        span { class: "message-timestamp", "{ts}" }
                    }
                }
            }
        }
    }
}

#[component]
fn AssistantBubble(
    message: Message,
    ratable: bool,
    feedback: Signal<FeedbackState>,
    notice: Signal<Option<Notice>>,
    on_recommendation: EventHandler<String>,
) -> Element {
    let citations = dedupe_sources(&message.sources);
    let question = message.question.clone().unwrap_or_default();
    let answer = message.raw_content();

    rsx! {
        for segment in message.content.iter() {
            {match segment {
                Segment::Text(text) => rsx! {
                    div { class: "md", dangerous_inner_html: "{markdown_to_html(text)}" }
                },
                Segment::Image(url) => rsx! {
                    img { class: "answer-image", src: "{url}" }
                },
            }}
        }

        if !citations.filtered.is_empty() {
            div { class: "sources",
                div { class: "sources-heading", "Nguồn tham khảo" }
                for (index, source) in citations.filtered.iter().enumerate() {
                    div { class: "source-row",
                        span { class: "source-index", "[{index + 1}]" }
                        a {
                            class: "source-link",
                            href: "{source.url}",
                            target: "_blank",
                            rel: "noopener noreferrer",
                            "{source.label()}"
                        }
                    }
                }
            }
        }

        if let Some(run_id) = message.run_id.clone() {
            TraceLink { run_id, notice }
        }

        if ratable {
            FeedbackControls {
                message_id: message.id.clone(),
                question,
                answer,
                feedback,
                notice,
            }
        }

        if !message.recommendations.is_empty() {
            div { class: "recommendations",
                for rec in message.recommendations.iter() {
                    button {
                        class: "recommendation-chip",
                        onclick: {
                            let rec = rec.clone();
                            move |_| on_recommendation.call(rec.clone())
                        },
                        "{rec}"
                    }
                }
            }
        }
    }
}

/// Voting controls for the one ratable answer. The downvote path opens the
/// inline correction form; nothing is sent until the form is confirmed.
#[component]
fn FeedbackControls(
    message_id: String,
    question: String,
    answer: String,
    feedback: Signal<FeedbackState>,
    notice: Signal<Option<Notice>>,
) -> Element {
    let backend: Arc<dyn AnswerBackend> = use_context();
    let state = feedback();

    let send_vote = {
        let backend = backend.clone();
        let message_id = message_id.clone();
        let question = question.clone();
        let answer = answer.clone();
        let mut feedback = feedback;
        let mut notice = notice;
        move |vote: Vote| {
            let Some(payload) =
                feedback.with_mut(|state| state.begin(vote, &message_id, &question, &answer))
            else {
                return;
            };
            let backend = backend.clone();
            let message_id = message_id.clone();
            spawn(async move {
                // The state may have been rebuilt for a newer answer while
                // this request was out; `complete` drops the resolution
                // unless it still targets the answer the vote was for.
                match backend.send_feedback(&payload).await {
                    Ok(()) => {
                        feedback.with_mut(|state| state.complete(&message_id, true));
                        notice.set(Some(Notice::Info("Đánh giá thành công.".to_string())));
                    }
                    Err(err) => {
                        tracing::error!("feedback submission failed: {err}");
                        feedback.with_mut(|state| state.complete(&message_id, false));
                        notice.set(Some(Notice::Error(
                            "Gửi đánh giá thất bại. Vui lòng thử lại.".to_string(),
                        )));
                    }
                }
            });
        }
    };

    rsx! {
        div { class: "feedback-row",
            span { class: "feedback-label", "Đánh giá câu trả lời" }
            button {
                class: "btn feedback-btn",
                disabled: state.is_rated() || state.is_in_flight(),
                onclick: {
                    let mut send = send_vote.clone();
                    move |_| send(Vote::Up)
                },
                "👍"
            }
            button {
                class: "btn feedback-btn",
                disabled: state.is_rated() || state.is_in_flight(),
                onclick: {
                    let mut feedback = feedback;
                    move |_| {
                        feedback.with_mut(|state| {
                            state.open_correction();
                        });
                    }
                },
                "👎"
            }
        }

        if state.form_is_open() && !state.is_rated() {
            div { class: "correction-form",
                label { class: "correction-label", "Phản hồi" }
                textarea {
                    class: "correction-input",
                    placeholder: "Vui lòng cung cấp câu trả lời chính xác...",
                    value: "{state.comment()}",
                    oninput: {
                        let mut feedback = feedback;
                        move |ev: Event<FormData>| {
                            feedback.with_mut(|state| state.set_comment(ev.value()));
                        }
                    },
                }
                div { class: "correction-actions",
                    button {
                        class: "btn",
                        onclick: {
                            let mut feedback = feedback;
                            move |_| feedback.with_mut(|state| state.cancel_correction())
                        },
                        "Hủy"
                    }
                    button {
                        class: "btn btn-primary",
                        disabled: state.is_in_flight(),
                        onclick: {
                            let mut send = send_vote.clone();
                            move |_| send(Vote::Down)
                        },
                        "Gửi"
                    }
                }
            }
        }
    }
}

/// Resolves the answer's run id to a trace URL on demand and exposes it as
/// a link; a domain failure surfaces on the notice banner.
#[component]
fn TraceLink(run_id: String, notice: Signal<Option<Notice>>) -> Element {
    let backend: Arc<dyn AnswerBackend> = use_context();
    let trace = use_signal(|| Option::<String>::None);
    let loading = use_signal(|| false);

    rsx! {
        div { class: "trace-row",
            if let Some(url) = trace() {
                a { class: "trace-link", href: "{url}", target: "_blank", "Mở trace" }
            } else {
                button {
                    class: "btn btn-ghost trace-btn",
                    disabled: loading(),
                    onclick: {
                        let backend = backend.clone();
                        let run_id = run_id.clone();
                        let mut trace = trace;
                        let mut loading = loading;
                        let mut notice = notice;
                        move |_| {
                            if loading() {
                                return;
                            }
                            loading.set(true);
                            let backend = backend.clone();
                            let run_id = run_id.clone();
                            spawn(async move {
                                match backend.trace_url(&run_id).await {
                                    Ok(url) => trace.set(Some(url)),
                                    Err(err) => {
                                        tracing::error!("trace lookup failed: {err}");
                                        notice.set(Some(Notice::Error(
                                            "Không thể xem trace.".to_string(),
                                        )));
                                    }
                                }
                                loading.set(false);
                            });
                        }
                    },
                    "Xem trace"
                }
            }
        }
    }
}
