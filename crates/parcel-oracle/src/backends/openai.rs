use super::CompletionBackend;
use crate::config::{OracleConfig, OracleProvider};
use async_trait::async_trait;
use parcel_core::{Message, OracleError, ParcelError, ParcelResult};

/// OpenAI-compatible chat-completions backend.
///
/// Works with OpenAI, OpenRouter, Groq, and any other provider that
/// implements the OpenAI chat completions API.
pub struct OpenAiBackend {
    config: OracleConfig,
    api_key: String,
    http: reqwest::Client,
}

impl OpenAiBackend {
    pub fn new(config: OracleConfig, api_key: impl Into<String>) -> ParcelResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ParcelError::Http(e.to_string()))?;
        Ok(Self {
            config,
            api_key: api_key.into(),
            http,
        })
    }

    fn build_messages(&self, messages: &[Message]) -> Vec<serde_json::Value> {
        messages
            .iter()
            .map(|m| {
                serde_json::json!({
                    "role": m.role.as_str(),
                    "content": m.content,
                })
            })
            .collect()
    }

    fn add_provider_headers(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let request = request
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json");

        // OpenRouter asks for attribution headers
        if matches!(self.config.provider, OracleProvider::OpenRouter) {
            request.header("X-Title", "Parcel Tracker")
        } else {
            request
        }
    }
}

#[async_trait]
impl CompletionBackend for OpenAiBackend {
    async fn complete(
        &self,
        messages: &[Message],
        max_tokens: Option<u32>,
    ) -> Result<String, OracleError> {
        let url = format!("{}/v1/chat/completions", self.config.base_url());

        let mut body = serde_json::json!({
            "model": self.config.model_id,
            "messages": self.build_messages(messages),
        });
        if let Some(limit) = max_tokens.or(self.config.max_tokens) {
            body["max_tokens"] = serde_json::json!(limit);
        }

        let resp = self
            .add_provider_headers(self.http.post(&url))
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        let status = resp.status();
        let text = resp.text().await.map_err(|e| transport_error(&e))?;

        if !status.is_success() {
            return Err(parse_error_body(status.as_u16(), &text));
        }

        let resp_body: serde_json::Value = serde_json::from_str(&text)
            .map_err(|e| OracleError::Unexpected(format!("invalid completion response: {e}")))?;
        parse_completion(&resp_body)
    }
}

fn transport_error(e: &reqwest::Error) -> OracleError {
    if e.is_timeout() {
        OracleError::Unexpected(format!("request timed out: {e}"))
    } else {
        OracleError::classify(e.to_string())
    }
}

/// Classifies a non-2xx response from `{"error": {"message", "code"}}`.
pub fn parse_error_body(status: u16, body: &str) -> OracleError {
    let json: Option<serde_json::Value> = serde_json::from_str(body).ok();
    let error = json.as_ref().map(|v| &v["error"]);
    let code = error.and_then(|e| e["code"].as_str());
    let detail = error
        .and_then(|e| e["message"].as_str())
        .unwrap_or(body);

    OracleError::from_upstream(
        Some(status),
        code,
        format!("OpenAI API error {status}: {detail}"),
    )
}

/// Extracts `choices[0].message.content`. A missing content field is an
/// empty answer, a missing `choices` array is a malformed response.
pub fn parse_completion(body: &serde_json::Value) -> Result<String, OracleError> {
    let choice = body["choices"]
        .as_array()
        .and_then(|choices| choices.first())
        .ok_or_else(|| OracleError::Unexpected(format!("completion response has no choices: {body}")))?;

    Ok(choice["message"]["content"]
        .as_str()
        .unwrap_or_default()
        .to_string())
}
