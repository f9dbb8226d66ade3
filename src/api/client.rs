use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::feedback::FeedbackPayload;
use crate::types::{ChatHistoryEntry, Segment, Source};

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("backend error {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("{0}")]
    Domain(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Parsed success payload of a `/function-calling` call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnswerPayload {
    pub content: Vec<Segment>,
    pub sources: Vec<Source>,
    pub recommendations: Vec<String>,
    pub run_id: Option<String>,
}

/// The three backend operations the client depends on.
#[async_trait]
pub trait AnswerBackend: Send + Sync {
    async fn answer(
        &self,
        question: &str,
        chat_history: &[ChatHistoryEntry],
    ) -> ApiResult<AnswerPayload>;

    async fn send_feedback(&self, payload: &FeedbackPayload) -> ApiResult<()>;

    async fn trace_url(&self, run_id: &str) -> ApiResult<String>;
}

pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("FTU_API_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(base_url)
    }

    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            base_url,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[derive(serde::Serialize)]
struct AnswerRequest<'a> {
    question: &'a str,
    chat_history: &'a [ChatHistoryEntry],
}

#[derive(serde::Serialize)]
struct TraceRequest<'a> {
    run_id: &'a str,
}

#[derive(Deserialize)]
struct AnswerEnvelope {
    status: u16,
    #[serde(default)]
    output: Option<AnswerOutput>,
}

#[derive(Deserialize)]
struct AnswerOutput {
    response: Vec<AnswerItem>,
}

#[derive(Deserialize)]
struct AnswerItem {
    content: Vec<Segment>,
    #[serde(default)]
    sources: Vec<Source>,
    #[serde(default)]
    recommendations: Vec<String>,
    #[serde(default)]
    run_id: Option<String>,
}

/// The envelope wraps the answer in a single-element `output.response`
/// array. Any other length is a contract violation and treated as a domain
/// failure rather than guessed at.
pub fn parse_answer_body(body: &str) -> ApiResult<AnswerPayload> {
    let envelope: AnswerEnvelope =
        serde_json::from_str(body).map_err(|err| ApiError::Malformed(err.to_string()))?;

    if envelope.status != 200 {
        return Err(ApiError::Domain(format!(
            "backend reported status {}",
            envelope.status
        )));
    }

    let output = envelope
        .output
        .ok_or_else(|| ApiError::Malformed("missing output".to_string()))?;

    if output.response.len() != 1 {
        return Err(ApiError::Domain(format!(
            "expected a single answer, got {}",
            output.response.len()
        )));
    }

    let item = output.response.into_iter().next().expect("length checked");
    Ok(AnswerPayload {
        content: item.content,
        sources: item.sources,
        recommendations: item.recommendations,
        run_id: item.run_id,
    })
}

/// `/get_trace` answers with a quoted URL string on success, or an object
/// carrying `code: 400` when the trace cannot be served.
pub fn parse_trace_body(body: &str) -> ApiResult<String> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|err| ApiError::Malformed(err.to_string()))?;

    if value.get("code").and_then(|code| code.as_i64()) == Some(400) {
        return Err(ApiError::Domain("unable to view trace".to_string()));
    }

    match value {
        serde_json::Value::String(url) => Ok(url),
        other => Err(ApiError::Malformed(format!(
            "expected trace URL string, got {other}"
        ))),
    }
}

#[async_trait]
impl AnswerBackend for HttpBackend {
    async fn answer(
        &self,
        question: &str,
        chat_history: &[ChatHistoryEntry],
    ) -> ApiResult<AnswerPayload> {
        let response = self
            .client
            .post(self.endpoint("/function-calling"))
            .json(&AnswerRequest {
                question,
                chat_history,
            })
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            parse_answer_body(&body)
        } else {
            Err(ApiError::Status { status, body })
        }
    }

    async fn send_feedback(&self, payload: &FeedbackPayload) -> ApiResult<()> {
        let response = self
            .client
            .post(self.endpoint("/feedbacks"))
            .json(payload)
            .send()
            .await?;
        let status = response.status();

        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::Status { status, body })
        }
    }

    async fn trace_url(&self, run_id: &str) -> ApiResult<String> {
        let response = self
            .client
            .post(self.endpoint("/get_trace"))
            .json(&TraceRequest { run_id })
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            parse_trace_body(&body)
        } else {
            Err(ApiError::Status { status, body })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_answer_envelope() {
        let body = r#"{
            "status": 200,
            "output": {
                "response": [{
                    "content": [{"type": "text", "content": "FTU offers economics programs."}],
                    "sources": [{"url": "https://ftu.edu.vn", "title": "FTU"}],
                    "recommendations": ["What are the tuition fees?"]
                }]
            }
        }"#;
        let payload = parse_answer_body(body).unwrap();
        assert_eq!(payload.content.len(), 1);
        assert_eq!(payload.sources.len(), 1);
        assert_eq!(
            payload.recommendations,
            vec!["What are the tuition fees?".to_string()]
        );
        assert!(payload.run_id.is_none());
    }

    #[test]
    fn missing_citation_fields_default_to_empty() {
        let body = r#"{
            "status": 200,
            "output": {"response": [{"content": [{"type": "text", "content": "hi"}]}]}
        }"#;
        let payload = parse_answer_body(body).unwrap();
        assert!(payload.sources.is_empty());
        assert!(payload.recommendations.is_empty());
    }

    #[test]
    fn non_200_envelope_status_is_domain_failure() {
        let body = r#"{"status": 500, "output": {"response": []}}"#;
        assert!(matches!(parse_answer_body(body), Err(ApiError::Domain(_))));
    }

    #[test]
    fn multi_element_response_is_domain_failure() {
        let body = r#"{
            "status": 200,
            "output": {"response": [
                {"content": [{"type": "text", "content": "a"}]},
                {"content": [{"type": "text", "content": "b"}]}
            ]}
        }"#;
        assert!(matches!(parse_answer_body(body), Err(ApiError::Domain(_))));
    }

    #[test]
    fn garbage_body_is_malformed() {
        assert!(matches!(
            parse_answer_body("not json"),
            Err(ApiError::Malformed(_))
        ));
        assert!(matches!(
            parse_answer_body(r#"{"status": 200}"#),
            Err(ApiError::Malformed(_))
        ));
    }

    #[test]
    fn trace_url_unquoted() {
        assert_eq!(
            parse_trace_body(r#""https://smith.langchain.com/run/abc""#).unwrap(),
            "https://smith.langchain.com/run/abc"
        );
    }

    #[test]
    fn trace_code_400_is_domain_failure() {
        assert!(matches!(
            parse_trace_body(r#"{"code": 400, "message": "no such run"}"#),
            Err(ApiError::Domain(_))
        ));
    }
}
