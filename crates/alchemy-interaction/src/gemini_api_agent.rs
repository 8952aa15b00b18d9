//! GeminiFusionClient - Direct REST API implementation for Gemini.
//!
//! Sends one `generateContent` call per fusion, asking for JSON output that
//! follows the request's response schema.

use alchemy_core::config::{GeminiSettings, api_key_from_env};
use alchemy_core::error::AlchemyError;
use alchemy_core::provider::{FusionProvider, FusionRequest, ProviderError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode, header::HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

const API_KEY_HEADER: &str = "x-goog-api-key";
const JSON_MIME_TYPE: &str = "application/json";

/// Provider that talks to the Gemini HTTP API.
#[derive(Clone)]
pub struct GeminiFusionClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiFusionClient {
    /// Creates a client from settings and an API key.
    ///
    /// The HTTP client carries the configured request timeout.
    pub fn new(
        settings: &GeminiSettings,
        api_key: impl Into<String>,
    ) -> alchemy_core::Result<Self> {
        let client = Client::builder()
            .timeout(settings.timeout())
            .build()
            .map_err(|e| AlchemyError::config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            model: settings.model.clone(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Creates a client whose API key comes from the environment.
    pub fn try_from_env(settings: &GeminiSettings) -> alchemy_core::Result<Self> {
        Self::new(settings, api_key_from_env()?)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", self.base_url, self.model)
    }

    async fn send_request(&self, body: &GenerateContentRequest) -> Result<String, ProviderError> {
        let response = self
            .client
            .post(self.endpoint())
            .header(API_KEY_HEADER, &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|err| ProviderError::Request {
                is_retryable: err.is_connect() || err.is_timeout(),
                message: format!("Gemini API request failed: {}", err.without_url()),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let retry_after = parse_retry_after(response.headers().get("retry-after"));
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            return Err(map_http_error(status, body_text, retry_after));
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|err| {
            ProviderError::Other(format!("Failed to parse Gemini response: {}", err.without_url()))
        })?;

        extract_text_response(parsed)
    }
}

#[async_trait]
impl FusionProvider for GeminiFusionClient {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, request: &FusionRequest) -> Result<String, ProviderError> {
        let body = GenerateContentRequest::from_fusion(request);
        tracing::debug!(model = %self.model, "Sending Gemini generateContent request");
        self.send_request(&body).await
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    system_instruction: Content,
    generation_config: GenerationConfig,
}

impl GenerateContentRequest {
    fn from_fusion(request: &FusionRequest) -> Self {
        Self {
            contents: vec![Content::text(Some("user"), &request.user_instruction)],
            system_instruction: Content::text(None, &request.system_instruction),
            generation_config: GenerationConfig {
                response_mime_type: JSON_MIME_TYPE,
                response_schema: request.response_schema.clone(),
            },
        }
    }
}

#[derive(Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

impl Content {
    fn text(role: Option<&str>, text: &str) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![Part {
                text: text.to_string(),
            }],
        }
    }
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

fn extract_text_response(response: GenerateContentResponse) -> Result<String, ProviderError> {
    response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().find_map(|part| part.text))
        .filter(|text| !text.trim().is_empty())
        .ok_or(ProviderError::EmptyResponse)
}

fn map_http_error(status: StatusCode, body: String, retry_after: Option<Duration>) -> ProviderError {
    let message = serde_json::from_str::<ErrorWrapper>(&body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.clone());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or_else(|_| body.clone());

    let is_retryable = matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    );

    ProviderError::Http {
        status_code: status.as_u16(),
        message,
        is_retryable,
        retry_after,
    }
}

fn parse_retry_after(header: Option<&HeaderValue>) -> Option<Duration> {
    let value = header?.to_str().ok()?;
    // HTTP-date form is not used by Gemini
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request() -> FusionRequest {
        FusionRequest {
            system_instruction: "你是一位炼金术大师。".to_string(),
            user_instruction: "融合这两个元素: 🔥 和 ❄️".to_string(),
            response_schema: json!({ "type": "OBJECT" }),
        }
    }

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(GenerateContentRequest::from_fusion(&request())).unwrap();

        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "融合这两个元素: 🔥 和 ❄️");
        assert!(body["systemInstruction"].get("role").is_none());
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "你是一位炼金术大师。");
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["generationConfig"]["responseSchema"]["type"], "OBJECT");
    }

    #[test]
    fn test_extract_first_candidate_text() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [
                { "content": { "parts": [{ "text": "{\"name\":\"霜火水晶\"}" }] } },
                { "content": { "parts": [{ "text": "second" }] } }
            ]
        }))
        .unwrap();

        assert_eq!(
            extract_text_response(response).unwrap(),
            "{\"name\":\"霜火水晶\"}"
        );
    }

    #[test]
    fn test_extract_empty_response() {
        for value in [
            json!({}),
            json!({ "candidates": [] }),
            json!({ "candidates": [{ "finishReason": "SAFETY" }] }),
            json!({ "candidates": [{ "content": { "parts": [{ "text": "  " }] } }] }),
        ] {
            let response: GenerateContentResponse = serde_json::from_value(value).unwrap();
            assert_eq!(
                extract_text_response(response).unwrap_err(),
                ProviderError::EmptyResponse
            );
        }
    }

    #[test]
    fn test_map_http_error_with_google_body() {
        let body = json!({
            "error": { "code": 429, "message": "Quota exceeded", "status": "RESOURCE_EXHAUSTED" }
        })
        .to_string();

        let err = map_http_error(
            StatusCode::TOO_MANY_REQUESTS,
            body,
            Some(Duration::from_secs(7)),
        );
        assert_eq!(
            err,
            ProviderError::Http {
                status_code: 429,
                message: "RESOURCE_EXHAUSTED: Quota exceeded".to_string(),
                is_retryable: true,
                retry_after: Some(Duration::from_secs(7)),
            }
        );
    }

    #[test]
    fn test_map_http_error_plain_body() {
        let err = map_http_error(StatusCode::BAD_REQUEST, "bad".to_string(), None);
        assert!(!err.is_retryable());
        assert_eq!(err.to_string(), "HTTP 400: bad");
    }

    #[test]
    fn test_parse_retry_after() {
        let header = HeaderValue::from_static("12");
        assert_eq!(parse_retry_after(Some(&header)), Some(Duration::from_secs(12)));
        let date = HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT");
        assert_eq!(parse_retry_after(Some(&date)), None);
        assert_eq!(parse_retry_after(None), None);
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let settings = GeminiSettings {
            base_url: "http://localhost:9/v1beta/models/".to_string(),
            ..GeminiSettings::default()
        };
        let client = GeminiFusionClient::new(&settings, "key").unwrap();
        assert_eq!(
            client.endpoint(),
            "http://localhost:9/v1beta/models/gemini-2.5-flash:generateContent"
        );
        assert_eq!(client.model(), "gemini-2.5-flash");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_request_error() {
        let settings = GeminiSettings {
            base_url: "http://127.0.0.1:9/v1beta/models".to_string(),
            timeout_secs: 2,
            ..GeminiSettings::default()
        };
        let client = GeminiFusionClient::new(&settings, "key").unwrap();

        let err = client.generate(&request()).await.unwrap_err();
        assert!(matches!(err, ProviderError::Request { .. }), "{err}");
    }
}
