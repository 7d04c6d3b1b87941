use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::models::SearchCriteria;

/// Errors that can occur when calling the conversational parser
#[derive(Debug, Error)]
pub enum ParserError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Parser returned error: {0}")]
    ApiError(String),

    #[error("Unauthorized: invalid parser API key")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Optional model-backed text-to-criteria translator
///
/// Any error makes the engine fall back to the heuristic interpreter.
#[async_trait]
pub trait ConversationalParser: Send + Sync {
    async fn parse(
        &self,
        text: &str,
        context: Option<&SearchCriteria>,
    ) -> Result<SearchCriteria, ParserError>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ParseRequest<'a> {
    query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    previous_criteria: Option<&'a SearchCriteria>,
}

/// Parser reached over HTTP
///
/// POSTs `{query, previousCriteria}` to the configured endpoint and expects
/// `SearchCriteria` JSON back, either bare or under a `criteria` key.
pub struct HttpConversationalParser {
    endpoint: String,
    api_key: Option<String>,
    client: Client,
}

impl HttpConversationalParser {
    pub fn new(endpoint: String, api_key: Option<String>, timeout: Duration) -> Result<Self, ParserError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            endpoint,
            api_key: api_key.filter(|k| !k.is_empty()),
            client,
        })
    }
}

#[async_trait]
impl ConversationalParser for HttpConversationalParser {
    async fn parse(
        &self,
        text: &str,
        context: Option<&SearchCriteria>,
    ) -> Result<SearchCriteria, ParserError> {
        let body = ParseRequest {
            query: text,
            previous_criteria: context,
        };

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        tracing::debug!("Calling conversational parser at {}", self.endpoint);

        let response = request.send().await?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => return Err(ParserError::Unauthorized),
            status if !status.is_success() => {
                return Err(ParserError::ApiError(format!("Parser responded with {}", status)));
            }
            _ => {}
        }

        let json: Value = response.json().await?;
        let criteria = json.get("criteria").unwrap_or(&json);

        serde_json::from_value(criteria.clone())
            .map_err(|e| ParserError::InvalidResponse(format!("Failed to parse criteria: {}", e)))
    }
}
