use std::time::Duration;

use base64::{Engine, engine::general_purpose::STANDARD};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::error::{GeminiError, Operation};
use super::transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport, TransportError};
use super::types::{
    GenerateContentResponse, GenerationRequest, SynthesisRequest, SynthesizeResponse,
};
use crate::utils::trim_line;

pub const GENERATIVE_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const TTS_BASE_URL: &str = "https://texttospeech.googleapis.com";
pub const API_KEY_HEADER: &str = "x-goog-api-key";

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-preview-05-20";
pub const DEFAULT_VOICE: &str = "en-US-Wavenet-D";
pub const DEFAULT_LANGUAGE: &str = "en-US";
pub const AUDIO_ENCODING: &str = "MP3";
pub const MAX_TTS_CHARS: usize = 5000;

const TEMPERATURE: f64 = 0.7;
const MAX_OUTPUT_TOKENS: u32 = 1024;

const PROBE_PROMPT: &str = "Say 'Hello' in one word only.";
const PROBE_MAX_OUTPUT_TOKENS: u32 = 50;
const PROBE_TIMEOUT: Duration = Duration::from_secs(30);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

pub const CONNECTION_OK: &str = "Connection successful";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub generative: String,
    pub tts: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            generative: GENERATIVE_BASE_URL.to_string(),
            tts: TTS_BASE_URL.to_string(),
        }
    }
}

impl Endpoints {
    fn generate_content(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.generative.trim_end_matches('/'),
            model
        )
    }

    fn synthesize(&self) -> String {
        format!("{}/v1/text:synthesize", self.tts.trim_end_matches('/'))
    }
}

/// Stateless client for the hosted generation and speech endpoints.
///
/// Every call is exactly one request; nothing is retried.
pub struct GeminiClient<T> {
    api_key: Option<String>,
    endpoints: Endpoints,
    transport: T,
}

impl GeminiClient<ReqwestTransport> {
    pub fn from_api_key(api_key: &str) -> Self {
        Self::new(api_key, ReqwestTransport::new())
    }
}

impl<T: Transport> GeminiClient<T> {
    /// A blank key yields an unconfigured client whose calls never reach the transport.
    pub fn new(api_key: &str, transport: T) -> Self {
        let api_key = trim_line(api_key).map(str::to_string);
        if api_key.is_none() {
            warn!("Gemini client created without an API key");
        }
        Self {
            api_key,
            endpoints: Endpoints::default(),
            transport,
        }
    }

    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub async fn test_connection(&self) -> Result<&'static str, GeminiError> {
        let request = GenerationRequest {
            prompt: PROBE_PROMPT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: TEMPERATURE,
            max_output_tokens: PROBE_MAX_OUTPUT_TOKENS,
        };
        let operation = Operation::ConnectionTest;
        let response = self
            .post(
                operation,
                self.endpoints.generate_content(&request.model),
                &request.payload(),
                PROBE_TIMEOUT,
            )
            .await?;

        if !response.is_ok() {
            warn!(status = response.status, "connection test rejected");
            return Err(GeminiError::ConnectionRejected {
                status: response.status,
                body: response.body,
            });
        }

        serde_json::from_str::<serde_json::Value>(&response.body)
            .map_err(|source| GeminiError::MalformedBody { operation, source })?;
        info!("connection test succeeded");
        Ok(CONNECTION_OK)
    }

    pub async fn generate_text(&self, prompt: &str, model: &str) -> Result<String, GeminiError> {
        self.generate(&GenerationRequest {
            prompt: prompt.to_string(),
            model: model.to_string(),
            temperature: TEMPERATURE,
            max_output_tokens: MAX_OUTPUT_TOKENS,
        })
        .await
    }

    pub async fn generate(&self, request: &GenerationRequest) -> Result<String, GeminiError> {
        let operation = Operation::TextGeneration;
        let response = self
            .post(
                operation,
                self.endpoints.generate_content(&request.model),
                &request.payload(),
                REQUEST_TIMEOUT,
            )
            .await?;
        let response = expect_ok(operation, response)?;

        let parsed: GenerateContentResponse = serde_json::from_str(&response.body)
            .map_err(|source| GeminiError::MalformedBody { operation, source })?;
        let text = parsed.first_text().ok_or(GeminiError::NoText)?;
        info!(chars = text.chars().count(), "text generation succeeded");
        Ok(text.to_string())
    }

    pub async fn generate_tts_audio(
        &self,
        text: &str,
        voice_name: &str,
    ) -> Result<Vec<u8>, GeminiError> {
        self.synthesize(&SynthesisRequest {
            text: text.to_string(),
            voice_name: voice_name.to_string(),
            language_code: DEFAULT_LANGUAGE.to_string(),
            audio_encoding: AUDIO_ENCODING.to_string(),
        })
        .await
    }

    pub async fn synthesize(&self, request: &SynthesisRequest) -> Result<Vec<u8>, GeminiError> {
        let operation = Operation::Synthesis;
        let response = self
            .post(
                operation,
                self.endpoints.synthesize(),
                &request.payload(),
                REQUEST_TIMEOUT,
            )
            .await?;
        let response = expect_ok(operation, response)?;

        let parsed: SynthesizeResponse = serde_json::from_str(&response.body)
            .map_err(|source| GeminiError::MalformedBody { operation, source })?;
        let encoded = parsed.audio_content.ok_or(GeminiError::NoAudio)?;
        let audio = STANDARD
            .decode(encoded.as_bytes())
            .map_err(|source| GeminiError::InvalidAudio { operation, source })?;
        info!(bytes = audio.len(), "speech synthesis succeeded");
        Ok(audio)
    }

    async fn post(
        &self,
        operation: Operation,
        url: String,
        payload: &impl Serialize,
        timeout: Duration,
    ) -> Result<HttpResponse, GeminiError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(GeminiError::NotConfigured);
        };
        let body = serde_json::to_value(payload).map_err(|err| GeminiError::Transport {
            operation,
            source: TransportError::Encode(err),
        })?;

        debug!(%operation, %url, "sending request");
        let request = HttpRequest {
            url,
            headers: vec![
                ("Content-Type".to_string(), "application/json".to_string()),
                (API_KEY_HEADER.to_string(), api_key.to_string()),
            ],
            body,
            timeout,
        };

        let response = self
            .transport
            .post_json(request)
            .await
            .map_err(|source| {
                warn!(%operation, error = %source, "request did not complete");
                GeminiError::Transport { operation, source }
            })?;
        debug!(%operation, status = response.status, "received response");
        Ok(response)
    }
}

fn expect_ok(operation: Operation, response: HttpResponse) -> Result<HttpResponse, GeminiError> {
    if response.is_ok() {
        return Ok(response);
    }
    warn!(%operation, status = response.status, "request rejected");
    Err(GeminiError::Status {
        status: response.status,
        body: response.body,
    })
}

/// Short description of a synthesis call, used for dry runs.
pub fn tts_request_preview(text: &str) -> String {
    let head: String = text.chars().take(50).collect();
    format!("TTS request prepared for: {head}...")
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::gemini::transport::mock::MockTransport;
    use serde_json::json;

    fn header<'a>(request: &'a HttpRequest, name: &str) -> Option<&'a str> {
        request
            .headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    #[tokio::test]
    async fn generate_text_returns_first_candidate_text() {
        let transport = MockTransport::replying(
            200,
            json!({"candidates": [{"content": {"parts": [{"text": "Paris"}]}}]}).to_string(),
        );
        let client = GeminiClient::new("key-123", &transport);

        let text = client
            .generate_text("Capital of France?", DEFAULT_MODEL)
            .await
            .unwrap();
        assert_eq!(text, "Paris");

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(
            request.url,
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash-preview-05-20:generateContent"
        );
        assert_eq!(header(request, "x-goog-api-key"), Some("key-123"));
        assert_eq!(header(request, "Content-Type"), Some("application/json"));
        assert_eq!(request.timeout, Duration::from_secs(60));
        assert_eq!(
            request.body,
            json!({
                "contents": [{"parts": [{"text": "Capital of France?"}]}],
                "generationConfig": {"temperature": 0.7, "maxOutputTokens": 1024}
            })
        );
    }

    #[tokio::test]
    async fn generate_text_without_candidates_reports_no_text() {
        let transport = MockTransport::replying(200, "{}");
        let client = GeminiClient::new("key", &transport);

        let err = client.generate_text("hi", DEFAULT_MODEL).await.unwrap_err();
        assert!(matches!(err, GeminiError::NoText));
        assert_eq!(err.to_string(), "No text generated");
    }

    #[tokio::test]
    async fn generate_text_surfaces_status_and_body() {
        let transport = MockTransport::replying(400, "bad request");
        let client = GeminiClient::new("key", &transport);

        let err = client.generate_text("hi", DEFAULT_MODEL).await.unwrap_err();
        assert_eq!(err.to_string(), "HTTP 400: bad request");
        assert_eq!(err.status_code(), Some(400));
    }

    #[tokio::test]
    async fn generate_text_reports_transport_failures() {
        let transport = MockTransport::failing(TransportError::Timeout(REQUEST_TIMEOUT));
        let client = GeminiClient::new("key", &transport);

        let err = client.generate_text("hi", DEFAULT_MODEL).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Text generation failed: request timed out after 60s"
        );
    }

    #[tokio::test]
    async fn generate_text_rejects_non_json_success_body() {
        let transport = MockTransport::replying(200, "<html>");
        let client = GeminiClient::new("key", &transport);

        let err = client.generate_text("hi", DEFAULT_MODEL).await.unwrap_err();
        assert!(err.to_string().starts_with("Text generation failed: "));
    }

    #[tokio::test]
    async fn custom_model_lands_in_the_url() {
        let transport = MockTransport::replying(
            200,
            json!({"candidates": [{"content": {"parts": [{"text": "ok"}]}}]}).to_string(),
        );
        let client = GeminiClient::new("key", &transport).with_endpoints(Endpoints {
            generative: "http://localhost:9000/".to_string(),
            tts: TTS_BASE_URL.to_string(),
        });

        client.generate_text("hi", "gemini-pro").await.unwrap();
        assert_eq!(
            transport.requests()[0].url,
            "http://localhost:9000/v1beta/models/gemini-pro:generateContent"
        );
    }

    #[tokio::test]
    async fn tts_decodes_audio_content() {
        let audio = b"ID3\x03\x00fake-mp3".to_vec();
        let transport = MockTransport::replying(
            200,
            json!({"audioContent": STANDARD.encode(&audio)}).to_string(),
        );
        let client = GeminiClient::new("key", &transport);

        let decoded = client
            .generate_tts_audio("hello there", DEFAULT_VOICE)
            .await
            .unwrap();
        assert_eq!(decoded, audio);

        let request = &transport.requests()[0];
        assert_eq!(
            request.url,
            "https://texttospeech.googleapis.com/v1/text:synthesize"
        );
        assert_eq!(header(request, API_KEY_HEADER), Some("key"));
        assert_eq!(
            request.body,
            json!({
                "input": {"text": "hello there"},
                "voice": {"languageCode": "en-US", "name": "en-US-Wavenet-D"},
                "audioConfig": {"audioEncoding": "MP3"}
            })
        );
    }

    #[tokio::test]
    async fn tts_without_audio_content() {
        let transport = MockTransport::replying(200, "{}");
        let client = GeminiClient::new("key", &transport);

        let err = client
            .generate_tts_audio("hello", DEFAULT_VOICE)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "No audio content in response");
    }

    #[tokio::test]
    async fn tts_with_invalid_base64() {
        let transport = MockTransport::replying(200, json!({"audioContent": "@@@"}).to_string());
        let client = GeminiClient::new("key", &transport);

        let err = client
            .generate_tts_audio("hello", DEFAULT_VOICE)
            .await
            .unwrap_err();
        assert!(matches!(err, GeminiError::InvalidAudio { .. }));
        assert!(err.to_string().starts_with("TTS generation failed: "));
    }

    #[tokio::test]
    async fn tts_surfaces_status_and_body() {
        let transport = MockTransport::replying(403, "forbidden");
        let client = GeminiClient::new("key", &transport);

        let err = client
            .generate_tts_audio("hello", DEFAULT_VOICE)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "HTTP 403: forbidden");
    }

    #[tokio::test]
    async fn connection_test_uses_the_probe_request() {
        let transport = MockTransport::replying(200, "{}");
        let client = GeminiClient::new("key", &transport);

        assert_eq!(client.test_connection().await.unwrap(), "Connection successful");

        let request = &transport.requests()[0];
        assert_eq!(request.timeout, Duration::from_secs(30));
        assert_eq!(
            request.body,
            json!({
                "contents": [{"parts": [{"text": "Say 'Hello' in one word only."}]}],
                "generationConfig": {"temperature": 0.7, "maxOutputTokens": 50}
            })
        );
    }

    #[tokio::test]
    async fn connection_test_failures() {
        let transport = MockTransport::replying(401, "invalid key");
        let client = GeminiClient::new("key", &transport);
        let err = client.test_connection().await.unwrap_err();
        assert_eq!(err.to_string(), "API call failed: HTTP 401: invalid key");

        let transport = MockTransport::failing(TransportError::Connect("dns error".to_string()));
        let client = GeminiClient::new("key", &transport);
        let err = client.test_connection().await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Connection failed: could not connect: dns error"
        );
    }

    #[tokio::test]
    async fn connection_test_requires_a_json_success_body() {
        let transport = MockTransport::replying(200, "<html>ok</html>");
        let client = GeminiClient::new("key", &transport);

        let err = client.test_connection().await.unwrap_err();
        assert!(matches!(err, GeminiError::MalformedBody { .. }));
        assert!(err.to_string().starts_with("Connection failed: "));
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn unencodable_payload_is_reported_before_sending() {
        let transport = MockTransport::new();
        let client = GeminiClient::new("key", &transport);
        let payload: BTreeMap<(u8, u8), u8> = BTreeMap::from([((1, 2), 3)]);

        let err = client
            .post(
                Operation::TextGeneration,
                "http://localhost/unused".to_string(),
                &payload,
                REQUEST_TIMEOUT,
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GeminiError::Transport {
                source: TransportError::Encode(_),
                ..
            }
        ));
        assert!(
            err.to_string()
                .starts_with("Text generation failed: could not encode request body: ")
        );
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn unconfigured_client_never_sends() {
        let transport = MockTransport::new();
        let client = GeminiClient::new("   ", &transport);
        assert!(!client.is_configured());

        let err = client.test_connection().await.unwrap_err();
        assert!(matches!(err, GeminiError::NotConfigured));
        let err = client.generate_text("hi", DEFAULT_MODEL).await.unwrap_err();
        assert_eq!(err.to_string(), "Client not initialized");
        let err = client
            .generate_tts_audio("hi", DEFAULT_VOICE)
            .await
            .unwrap_err();
        assert!(matches!(err, GeminiError::NotConfigured));

        assert_eq!(transport.request_count(), 0);
    }

    #[test]
    fn preview_truncates_to_fifty_chars() {
        let text = "é".repeat(80);
        let preview = tts_request_preview(&text);
        assert_eq!(
            preview,
            format!("TTS request prepared for: {}...", "é".repeat(50))
        );
    }
}
