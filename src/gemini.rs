//! # Gemini Recommendation Client
//!
//! Sends one `generateContent` request per turn to the Gemini API with the
//! Sonic prompt, the system instruction, and the JSON response schema, then
//! hands the returned text to [`response::parse_recommendation`].
//!
//! ## Failure classification
//!
//! | Condition                                         | Kind                         |
//! |---------------------------------------------------|------------------------------|
//! | blank key, HTTP 401/403, "API key not valid" body | `invalid_credential`         |
//! | no candidate text, malformed or invalid JSON      | `empty_response`             |
//! | transport error, timeout, any other status        | `network_or_service_error`   |
//!
//! The key travels as the `key` query parameter and is never logged.

use crate::config::RuntimeConfig;
use crate::error::RecommendError;
use crate::prompt;
use crate::recommend::{Query, Recommender};
use crate::response::{self, Recommendation};
use anyhow::{Context, Result};
use log::{debug, warn};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Markers in an error body that identify a rejected API key.
const INVALID_KEY_MARKERS: [&str; 3] = ["API key not valid", "API_KEY_INVALID", "API key is invalid"];

/// Longest error body excerpt kept in a service error.
const ERROR_SNIPPET_LEN: usize = 200;

// ============================================================================
// API Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    system_instruction: SystemInstruction,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<TextPart>,
}

#[derive(Debug, Serialize)]
struct SystemInstruction {
    parts: Vec<TextPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TextPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Debug, Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    code: u16,
    #[serde(default)]
    message: String,
}

// ============================================================================
// Client
// ============================================================================

/// Blocking Gemini client.
pub struct GeminiClient {
    client: Client,
    endpoint: String,
    model: String,
}

impl GeminiClient {
    /// Build a client from the runtime configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed (TLS backend
    /// initialization failure).
    pub fn new(config: &RuntimeConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client for the recommendation service")?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    /// `generateContent` URL for the configured model, without the key.
    #[must_use]
    pub fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }

    fn build_request(query: &Query, languages: &[String]) -> GenerateRequest {
        GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![TextPart {
                    text: prompt::build_prompt(query, languages),
                }],
            }],
            system_instruction: SystemInstruction {
                parts: vec![TextPart {
                    text: prompt::SYSTEM_INSTRUCTION.to_string(),
                }],
            },
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: prompt::response_schema(),
            },
        }
    }
}

impl Recommender for GeminiClient {
    fn recommend(
        &self,
        query: &Query,
        languages: &[String],
        api_key: &str,
    ) -> Result<Recommendation, RecommendError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(RecommendError::InvalidCredential);
        }

        let request = Self::build_request(query, languages);
        debug!(
            "POST {} ({:?}, {} preferred languages)",
            self.url(),
            query,
            languages.len()
        );

        let response = self
            .client
            .post(self.url())
            .query(&[("key", api_key)])
            .json(&request)
            .send()?;

        let status = response.status();
        let body = response.text()?;
        debug!("Recommendation service replied {status} ({} bytes)", body.len());

        if !status.is_success() {
            let err = classify_failure(status.as_u16(), &body);
            warn!("Recommendation request failed: {}", err.kind());
            return Err(err);
        }

        let text = extract_text(&body)?;
        response::parse_recommendation(&text)
    }
}

/// Pull the candidate text out of a successful `generateContent` body.
fn extract_text(body: &str) -> Result<String, RecommendError> {
    let parsed: GenerateResponse = serde_json::from_str(body).map_err(|e| {
        RecommendError::EmptyResponse(format!("unreadable service envelope: {e}"))
    })?;

    if let Some(error) = parsed.error {
        return Err(classify_failure(error.code, &error.message));
    }

    let text: String = parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(RecommendError::EmptyResponse(
            "Received an empty response from the AI.".to_string(),
        ));
    }
    Ok(text)
}

/// Map a failed reply to its error kind.
#[must_use]
pub fn classify_failure(status: u16, body: &str) -> RecommendError {
    if matches!(status, 401 | 403) || INVALID_KEY_MARKERS.iter().any(|m| body.contains(m)) {
        return RecommendError::InvalidCredential;
    }

    let snippet: String = body.trim().chars().take(ERROR_SNIPPET_LEN).collect();
    RecommendError::Service(format!("HTTP {status}: {snippet}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::path::PathBuf;

    fn test_config() -> RuntimeConfig {
        RuntimeConfig {
            endpoint: "http://127.0.0.1:9/v1beta/".to_string(),
            ..RuntimeConfig::with_db_path(PathBuf::from("unused.db"))
        }
    }

    #[test]
    fn test_url_uses_model_and_trims_slash() {
        let client = GeminiClient::new(&test_config()).expect("client");
        assert_eq!(
            client.url(),
            "http://127.0.0.1:9/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_request_body_shape() {
        let request = GeminiClient::build_request(&Query::Utterance("feeling low".into()), &[]);
        let value = serde_json::to_value(&request).expect("serializable");

        assert_eq!(value["contents"][0]["role"], "user");
        assert!(value["contents"][0]["parts"][0]["text"]
            .as_str()
            .expect("prompt text")
            .contains("feeling low"));
        assert_eq!(value["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(value["generationConfig"]["responseSchema"]["type"], "OBJECT");
        assert!(value["systemInstruction"]["parts"][0]["text"]
            .as_str()
            .expect("system text")
            .starts_with("You are Sonic AI."));
    }

    #[test]
    fn test_blank_key_fails_before_network() {
        let client = GeminiClient::new(&test_config()).expect("client");
        let err = client
            .recommend(&Query::Utterance("happy".into()), &[], "   ")
            .expect_err("blank key must fail");
        assert_eq!(err.kind(), ErrorKind::InvalidCredential);
    }

    #[test]
    fn test_classify_failure() {
        assert_eq!(classify_failure(401, "").kind(), ErrorKind::InvalidCredential);
        assert_eq!(classify_failure(403, "forbidden").kind(), ErrorKind::InvalidCredential);
        assert_eq!(
            classify_failure(400, r#"{"error":{"message":"API key not valid. Please pass a valid API key."}}"#).kind(),
            ErrorKind::InvalidCredential
        );
        assert_eq!(classify_failure(400, "bad request").kind(), ErrorKind::NetworkOrServiceError);
        assert_eq!(classify_failure(503, "overloaded").kind(), ErrorKind::NetworkOrServiceError);
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"{\"a\":"},{"text":"1}"}]}}]}"#;
        assert_eq!(extract_text(body).expect("text"), r#"{"a":1}"#);
    }

    #[test]
    fn test_extract_text_rejects_empty_envelopes() {
        for body in [
            r#"{"candidates":[]}"#,
            r#"{}"#,
            r#"{"candidates":[{"finishReason":"SAFETY"}]}"#,
            r#"{"candidates":[{"content":{"parts":[{"text":"  "}]}}]}"#,
            "<html>",
        ] {
            let err = extract_text(body).expect_err("no usable text");
            assert_eq!(err.kind(), ErrorKind::EmptyResponse, "body {body}");
        }
    }

    #[test]
    fn test_extract_text_surfaces_embedded_error() {
        let body = r#"{"error":{"code":400,"message":"API key not valid.","status":"INVALID_ARGUMENT"}}"#;
        assert_eq!(extract_text(body).expect_err("error").kind(), ErrorKind::InvalidCredential);
    }
}
