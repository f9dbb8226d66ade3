use dioxus::prelude::*;

use crate::views::ChatView;

const ADMISSIONS_PAGE: &str = "https://www.facebook.com/TuyensinhFTU";

#[component]
pub fn App() -> Element {
    rsx! {
        style { dangerous_inner_html: "{APP_CSS}" }
        AppHeader {}
        ChatView {}
    }
}

#[component]
fn AppHeader() -> Element {
    rsx! {
        div { class: "header no-divider",
            div { class: "header-content",
                h1 { class: "header-title",
                    "Chatbot Tuyển Sinh trường Đại học Ngoại thương (FTU)"
                }
                h2 { class: "header-subtitle",
                    "Hỗ trợ tư vấn, hỏi đáp thông tin tuyển sinh trường Đại học Ngoại thương "
                    a {
                        class: "header-link",
                        href: ADMISSIONS_PAGE,
                        target: "_blank",
                        "Trang tuyển sinh FTU"
                    }
                }
            }
        }
    }
}

const APP_CSS: &str = r#"
:root {
    --color-bg-primary: #ffffff;
    --color-text-primary: #1a1a1a;
    --color-text-muted: #606060;
    --color-accent: #c0181a;
    --color-border: #c5c5c5;
    --color-chat-user-bg: #c0181a;
    --color-chat-user-text: #ffffff;
    --color-chat-assistant-bg: #f5f5f5;
    --color-chat-assistant-text: #1a1a1a;
    --color-chip-bg: #dbeafe;
    --color-chip-text: #1e40af;
    --color-notice-error: #fde8e8;
    --color-notice-info: #e6f4ea;
}
body { margin: 0; background: var(--color-bg-primary); color: var(--color-text-primary); font-family: system-ui, sans-serif; }
.header { padding: 1rem 2rem 0.5rem; text-align: center; }
.header-title { font-size: 1.4rem; font-weight: 600; margin: 0; }
.header-subtitle { font-size: 1rem; font-weight: 400; color: var(--color-text-muted); margin: 0.4rem 0 0; }
.header-link { color: var(--color-accent); font-weight: 600; text-decoration: none; }
.main-container { display: flex; flex-direction: column; height: calc(100vh - 6rem); max-width: 56rem; margin: 0 auto; padding: 0 1rem; }
.chat-wrap { flex: 1; min-height: 0; display: flex; flex-direction: column; }
.chat-list { flex: 1; overflow-y: auto; display: flex; flex-direction: column-reverse; gap: 0.75rem; padding: 0.5rem 0; }
.message-row { display: flex; gap: 0.5rem; }
.message-row.user { justify-content: flex-end; }
.avatar.assistant { width: 1.8rem; height: 1.8rem; border-radius: 50%; background: var(--color-accent); color: #fff; display: flex; align-items: center; justify-content: center; flex-shrink: 0; }
.message-stack { max-width: 85%; display: flex; flex-direction: column; gap: 0.2rem; }
.bubble { padding: 0.6rem 0.9rem; border-radius: 0.8rem; }
.bubble.user { background: var(--color-chat-user-bg); color: var(--color-chat-user-text); }
.bubble.assistant { background: var(--color-chat-assistant-bg); color: var(--color-chat-assistant-text); }
.message-meta { font-size: 0.7rem; color: var(--color-text-muted); }
.message-meta.align-end { text-align: right; }
.shimmer-line { padding: 0.6rem 0.9rem; }
.shimmer-text { color: var(--color-text-muted); animation: pulse 1.2s ease-in-out infinite; }
@keyframes pulse { 50% { opacity: 0.4; } }
.answer-image { max-width: 100%; border-radius: 0.4rem; margin: 0.4rem 0; }
.sources { border-top: 1px solid var(--color-border); margin-top: 0.6rem; padding-top: 0.4rem; }
.sources-heading { font-weight: 600; font-size: 0.85rem; margin-bottom: 0.2rem; }
.source-row { font-size: 0.85rem; }
.source-index { font-weight: 600; color: var(--color-text-muted); margin-right: 0.3rem; }
.source-link { color: #3182ce; text-decoration: none; }
.feedback-row { display: flex; align-items: center; gap: 0.5rem; margin-top: 0.8rem; }
.feedback-label { font-size: 0.9rem; }
.feedback-btn { font-size: 1rem; }
.correction-form { display: flex; flex-direction: column; gap: 0.4rem; margin-top: 0.5rem; padding: 0.6rem; border: 1px solid var(--color-border); border-radius: 0.5rem; }
.correction-input { resize: vertical; min-height: 3rem; }
.correction-actions { display: flex; justify-content: flex-end; gap: 0.4rem; }
.recommendations { display: flex; flex-wrap: wrap; gap: 0.4rem; margin-top: 0.6rem; border-top: 1px solid var(--color-border); padding-top: 0.6rem; }
.recommendation-chip { background: var(--color-chip-bg); color: var(--color-chip-text); border: none; border-radius: 0.6rem; padding: 0.3rem 0.7rem; cursor: pointer; font-size: 0.85rem; }
.recommendation-chip:hover { filter: brightness(0.95); }
.trace-row { margin-top: 0.4rem; }
.trace-link { font-size: 0.8rem; color: #3182ce; }
.notice { display: flex; justify-content: space-between; align-items: center; border-radius: 0.5rem; padding: 0.5rem 0.8rem; margin: 0.4rem 0; }
.notice-error { background: var(--color-notice-error); }
.notice-info { background: var(--color-notice-info); }
.notice-dismiss { background: none; border: none; cursor: pointer; font-size: 1rem; }
.composer { padding: 0.6rem 0 1rem; }
.composer textarea { flex: 1; border: 1px solid var(--color-border); border-radius: 0.6rem; padding: 0.5rem 0.8rem; font: inherit; }
.btn { border: 1px solid var(--color-border); background: none; border-radius: 0.5rem; padding: 0.4rem 0.9rem; cursor: pointer; }
.btn-primary { background: var(--color-accent); border-color: var(--color-accent); color: #fff; }
.btn:disabled { opacity: 0.5; cursor: default; }
.btn-ghost { border: none; }
.hstack { display: flex; }
.empty-state { flex: 1; display: flex; flex-direction: column; justify-content: center; gap: 0.8rem; }
.empty-state-hint { color: var(--color-text-muted); text-align: center; }
.starter-grid { display: grid; grid-template-columns: repeat(2, 1fr); gap: 0.6rem; }
.starter-card { border: 1px solid var(--color-border); border-radius: 0.6rem; background: none; padding: 0.8rem; cursor: pointer; text-align: left; font: inherit; }
.starter-card:hover { border-color: var(--color-accent); }
"#;
