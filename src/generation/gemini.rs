// Gemini `generateContent` client

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use super::{GenerationError, GenerationRequest, TextGenerator};
use crate::config::GenerationConfig;

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [RequestPart<'a>; 1],
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

pub struct GeminiClient {
    http: reqwest::Client,
    /// Always ends in `/` so joins append instead of replacing the last segment
    base_url: Url,
}

impl GeminiClient {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, GenerationError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            http: builder.build()?,
            base_url,
        })
    }

    pub fn from_config(config: &GenerationConfig) -> Result<Self, GenerationError> {
        Self::new(&config.base_url, config.timeout_secs.map(Duration::from_secs))
    }

    fn endpoint(&self, model: &str) -> Result<Url, GenerationError> {
        Ok(self
            .base_url
            .join(&format!("v1beta/models/{model}:generateContent"))?)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, request: GenerationRequest<'_>) -> Result<String, GenerationError> {
        let body = GenerateContentRequest {
            contents: [Content {
                parts: [RequestPart {
                    text: request.prompt,
                }],
            }],
        };

        let response = self
            .http
            .post(self.endpoint(request.model)?)
            .header("x-goog-api-key", request.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorEnvelope>(&bytes)
                .map(|envelope| envelope.error.message)
                .ok()
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| format!("Generation API responded with {status}"));
            return Err(GenerationError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateContentResponse = serde_json::from_slice(&bytes)
            .map_err(|e| GenerationError::Decode(e.to_string()))?;

        completion_text(parsed).ok_or(GenerationError::EmptyCompletion)
    }
}

/// Concatenated text parts of the first candidate
fn completion_text(response: GenerateContentResponse) -> Option<String> {
    let parts = response.candidates.into_iter().next()?.content?.parts;
    let texts: Vec<String> = parts.into_iter().filter_map(|p| p.text).collect();
    if texts.is_empty() {
        None
    } else {
        Some(texts.concat())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    const MODEL: &str = "gemini-2.5-flash-preview-04-17";

    fn request(prompt: &str) -> GenerationRequest<'_> {
        GenerationRequest {
            api_key: "test-key",
            model: MODEL,
            prompt,
        }
    }

    #[tokio::test]
    async fn test_generate_sends_prompt_and_returns_text() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path(format!("/v1beta/models/{MODEL}:generateContent"))
                    .header("x-goog-api-key", "test-key")
                    .json_body(json!({ "contents": [{ "parts": [{ "text": "Hola" }] }] }));
                then.status(200).json_body(json!({
                    "candidates": [{
                        "content": {
                            "role": "model",
                            "parts": [{ "text": "Saludos equipo, " }, { "text": "nueva consulta." }]
                        },
                        "finishReason": "STOP"
                    }]
                }));
            })
            .await;

        let client = GeminiClient::new(&server.base_url(), None).unwrap();
        let text = client.generate(request("Hola")).await.unwrap();

        assert_eq!(text, "Saludos equipo, nueva consulta.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_upstream_error_message_is_surfaced() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(400).json_body(json!({
                    "error": { "code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT" }
                }));
            })
            .await;

        let client = GeminiClient::new(&server.base_url(), None).unwrap();
        let err = client.generate(request("Hola")).await.unwrap_err();

        assert!(matches!(err, GenerationError::Upstream { status: 400, .. }));
        assert_eq!(err.to_string(), "API key not valid.");
    }

    #[tokio::test]
    async fn test_upstream_error_without_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(503).body("unavailable");
            })
            .await;

        let client = GeminiClient::new(&server.base_url(), None).unwrap();
        let err = client.generate(request("Hola")).await.unwrap_err();
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn test_blocked_prompt_has_no_completion() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(200)
                    .json_body(json!({ "promptFeedback": { "blockReason": "SAFETY" } }));
            })
            .await;

        let client = GeminiClient::new(&server.base_url(), None).unwrap();
        let err = client.generate(request("Hola")).await.unwrap_err();
        assert!(matches!(err, GenerationError::EmptyCompletion));
    }

    #[test]
    fn test_endpoint_joins_onto_base() {
        for base in ["https://example.test", "https://example.test/"] {
            let client = GeminiClient::new(base, None).unwrap();
            assert_eq!(
                client.endpoint("m").unwrap().as_str(),
                "https://example.test/v1beta/models/m:generateContent"
            );
        }
        let proxied = GeminiClient::new("http://127.0.0.1:8080/gemini", None).unwrap();
        assert_eq!(
            proxied.endpoint("m").unwrap().as_str(),
            "http://127.0.0.1:8080/gemini/v1beta/models/m:generateContent"
        );
    }

    #[test]
    fn test_rejects_unparseable_base_url() {
        assert!(matches!(
            GeminiClient::new("not a url", None),
            Err(GenerationError::InvalidBaseUrl(_))
        ));
    }
}
