use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
    Function,
}

/// One ordered piece of an answer body. The backend interleaves prose with
/// image URLs, so order matters for rendering.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "lowercase")]
pub enum Segment {
    Text(String),
    Image(String),
}

/// A citation attached to an assistant answer. `url` is the identity key
/// when collapsing duplicates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Source {
    pub fn label(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.url)
    }
}

/// One completed exchange, kept only as context for the next backend call.
/// Never rendered.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatHistoryEntry {
    pub human: String,
    pub ai: String,
}

/// One conversational turn as held by the client. Ids are generated locally
/// and never reused; `question` carries the originating user question onto
/// the assistant message so feedback payloads can reference it.
#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: Vec<Segment>,
    pub sources: Vec<Source>,
    pub recommendations: Vec<String>,
    pub run_id: Option<String>,
    pub question: Option<String>,
    pub created_at: Option<OffsetDateTime>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            id: fresh_id(),
            role: Role::User,
            content: vec![Segment::Text(text.into())],
            sources: Vec::new(),
            recommendations: Vec::new(),
            run_id: None,
            question: None,
            created_at: Some(OffsetDateTime::now_utc()),
        }
    }

    /// Empty assistant message standing in for an answer that has not
    /// arrived yet.
    pub fn assistant_placeholder(question: impl Into<String>) -> Self {
        Self {
            id: fresh_id(),
            role: Role::Assistant,
            content: Vec::new(),
            sources: Vec::new(),
            recommendations: Vec::new(),
            run_id: None,
            question: Some(question.into()),
            created_at: Some(OffsetDateTime::now_utc()),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.role == Role::Assistant && self.content.is_empty()
    }

    /// Plain-text view of the message body, used for feedback payloads and
    /// chat-history serialization.
    pub fn raw_content(&self) -> String {
        self.content
            .iter()
            .filter_map(|segment| match segment {
                Segment::Text(text) => Some(text.as_str()),
                Segment::Image(_) => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub(crate) fn fresh_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_wire_shape() {
        let parsed: Vec<Segment> = serde_json::from_str(
            r#"[{"type":"text","content":"hello"},{"type":"image","content":"https://ftu.edu.vn/logo.png"}]"#,
        )
        .unwrap();
        assert_eq!(
            parsed,
            vec![
                Segment::Text("hello".to_string()),
                Segment::Image("https://ftu.edu.vn/logo.png".to_string()),
            ]
        );
    }

    #[test]
    fn raw_content_skips_images() {
        let mut msg = Message::assistant_placeholder("q");
        msg.content = vec![
            Segment::Text("first".to_string()),
            Segment::Image("https://ftu.edu.vn/map.png".to_string()),
            Segment::Text("second".to_string()),
        ];
        assert_eq!(msg.raw_content(), "first\nsecond");
    }

    #[test]
    fn source_label_falls_back_to_url() {
        let untitled = Source {
            url: "https://ftu.edu.vn".to_string(),
            title: None,
        };
        assert_eq!(untitled.label(), "https://ftu.edu.vn");

        let titled = Source {
            url: "https://ftu.edu.vn".to_string(),
            title: Some("FTU".to_string()),
        };
        assert_eq!(titled.label(), "FTU");
    }

    #[test]
    fn message_ids_are_unique() {
        let a = Message::user("hi");
        let b = Message::user("hi");
        assert_ne!(a.id, b.id);
    }
}
