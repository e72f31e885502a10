use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

use crate::config::GeminiConfig;
use crate::error::{PartscoutError, Result};
use crate::llm::provider::{Content, GenerateRequest, GenerativeBackend, Part, RemoteFile};
use crate::models::ChatRole;

const API_KEY_HEADER: &str = "x-goog-api-key";
const UPLOAD_URL_HEADER: &str = "x-goog-upload-url";

/// REST client for the Gemini generative language API.
#[derive(Clone, Debug)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<WireContent<'a>>,
    contents: Vec<WireContent<'a>>,
    generation_config: WireGenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
struct WireContent<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<WirePart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum WirePart<'a> {
    Text {
        text: &'a str,
    },
    File {
        #[serde(rename = "fileData")]
        file_data: WireFileData<'a>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireFileData<'a> {
    mime_type: &'a str,
    file_uri: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireGenerationConfig<'a> {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
    response_mime_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<&'a Value>,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(default)]
    candidates: Vec<WireCandidate>,
}

#[derive(Debug, Deserialize)]
struct WireCandidate {
    content: Option<WireResponseContent>,
}

#[derive(Debug, Deserialize)]
struct WireResponseContent {
    #[serde(default)]
    parts: Vec<WireResponsePart>,
}

#[derive(Debug, Deserialize)]
struct WireResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireUploadResponse {
    file: WireFile,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireFile {
    name: String,
    uri: String,
    mime_type: String,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| PartscoutError::Config("GEMINI_API_KEY is not set".to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PartscoutError::Config(format!("Failed to create HTTP client: {e}")))?;

        let model = config
            .model
            .strip_prefix("models/")
            .unwrap_or(&config.model)
            .to_string();

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model,
        })
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    fn upload_start_url(&self) -> String {
        format!("{}/upload/v1beta/files", self.base_url)
    }
}

#[async_trait]
impl GenerativeBackend for GeminiClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn upload_file(
        &self,
        bytes: Vec<u8>,
        mime_type: &str,
        display_name: &str,
    ) -> Result<RemoteFile> {
        let size = bytes.len();

        let start = self
            .client
            .post(self.upload_start_url())
            .header(API_KEY_HEADER, &self.api_key)
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", size.to_string())
            .header("X-Goog-Upload-Header-Content-Type", mime_type)
            .json(&json!({ "file": { "display_name": display_name } }))
            .send()
            .await?;
        let start = ensure_success(start).await?;

        let upload_url = start
            .headers()
            .get(UPLOAD_URL_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| {
                PartscoutError::Remote("Upload session did not return an upload URL".to_string())
            })?;

        let finished = self
            .client
            .post(&upload_url)
            .header(API_KEY_HEADER, &self.api_key)
            .header("X-Goog-Upload-Offset", "0")
            .header("X-Goog-Upload-Command", "upload, finalize")
            .body(bytes)
            .send()
            .await?;
        let finished = ensure_success(finished).await?;

        let uploaded: WireUploadResponse = finished.json().await?;
        tracing::debug!(
            file = %uploaded.file.name,
            mime_type = %uploaded.file.mime_type,
            size,
            "Uploaded file to Gemini"
        );

        Ok(RemoteFile {
            name: uploaded.file.name,
            uri: uploaded.file.uri,
            mime_type: uploaded.file.mime_type,
        })
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<String> {
        let body = to_wire(request);

        let response = self
            .client
            .post(self.generate_url())
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await?;
        let response = ensure_success(response).await?;

        let parsed: WireResponse = response.json().await?;
        extract_text(parsed)
    }
}

fn wire_role(role: ChatRole) -> &'static str {
    match role {
        ChatRole::User => "user",
        ChatRole::Model => "model",
    }
}

fn wire_parts(parts: &[Part]) -> Vec<WirePart<'_>> {
    parts
        .iter()
        .map(|part| match part {
            Part::Text(text) => WirePart::Text { text },
            Part::File(file) => WirePart::File {
                file_data: WireFileData {
                    mime_type: &file.mime_type,
                    file_uri: &file.uri,
                },
            },
        })
        .collect()
}

fn to_wire(request: &GenerateRequest) -> WireRequest<'_> {
    let options = &request.options;

    WireRequest {
        system_instruction: request.system_instruction.as_deref().map(|text| WireContent {
            role: None,
            parts: vec![WirePart::Text { text }],
        }),
        contents: request
            .contents
            .iter()
            .map(|content: &Content| WireContent {
                role: Some(wire_role(content.role)),
                parts: wire_parts(&content.parts),
            })
            .collect(),
        generation_config: WireGenerationConfig {
            temperature: options.temperature,
            top_p: options.top_p,
            top_k: options.top_k,
            max_output_tokens: options.max_output_tokens,
            response_mime_type: &options.response_mime_type,
            response_schema: options.response_schema.as_ref(),
        },
    }
}

fn extract_text(response: WireResponse) -> Result<String> {
    let text: String = response
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

    if text.is_empty() {
        return Err(PartscoutError::Remote(
            "Gemini returned no text in its response".to_string(),
        ));
    }

    Ok(text)
}

async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(PartscoutError::Remote(format!(
        "Gemini API error ({status}): {}",
        error_message(&body)
    )))
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| value["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::provider::GenerationOptions;
    use pretty_assertions::assert_eq;

    fn config(api_key: Option<&str>) -> GeminiConfig {
        GeminiConfig {
            api_key: api_key.map(str::to_string),
            ..GeminiConfig::default()
        }
    }

    #[test]
    fn test_missing_api_key_is_a_config_error() {
        let err = GeminiClient::new(&config(None)).unwrap_err();
        assert!(matches!(err, PartscoutError::Config(_)));
    }

    #[test]
    fn test_urls() {
        let client = GeminiClient::new(&GeminiConfig {
            base_url: "http://localhost:9999/".to_string(),
            model: "models/gemini-2.0-flash".to_string(),
            ..config(Some("key"))
        })
        .unwrap();

        assert_eq!(client.model(), "gemini-2.0-flash");
        assert_eq!(
            client.generate_url(),
            "http://localhost:9999/v1beta/models/gemini-2.0-flash:generateContent"
        );
        assert_eq!(
            client.upload_start_url(),
            "http://localhost:9999/upload/v1beta/files"
        );
    }

    #[test]
    fn test_request_wire_format() {
        let file = RemoteFile {
            name: "files/abc".into(),
            uri: "https://example.test/files/abc".into(),
            mime_type: "image/png".into(),
        };
        let request = GenerateRequest::new(vec![Content::user(vec![
            Part::text("Image: "),
            Part::File(file),
        ])])
        .with_system_instruction("Be brief.")
        .with_options(GenerationOptions::string_list());

        let value = serde_json::to_value(to_wire(&request)).unwrap();
        assert_eq!(
            value,
            json!({
                "systemInstruction": { "parts": [{ "text": "Be brief." }] },
                "contents": [{
                    "role": "user",
                    "parts": [
                        { "text": "Image: " },
                        { "fileData": {
                            "mimeType": "image/png",
                            "fileUri": "https://example.test/files/abc"
                        } }
                    ]
                }],
                "generationConfig": {
                    "temperature": 0.7_f32,
                    "topP": 0.95_f32,
                    "topK": 40,
                    "maxOutputTokens": 8192,
                    "responseMimeType": "application/json",
                    "responseSchema": { "type": "ARRAY", "items": { "type": "STRING" } }
                }
            })
        );
    }

    #[test]
    fn test_plain_request_omits_optional_fields() {
        let request = GenerateRequest::new(vec![Content::user(vec![Part::text("hi")])]);
        let value = serde_json::to_value(to_wire(&request)).unwrap();

        assert!(value.get("systemInstruction").is_none());
        assert!(value["generationConfig"].get("responseSchema").is_none());
        assert_eq!(value["generationConfig"]["responseMimeType"], "text/plain");
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let response: WireResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "Intel " }, { "text": "Core i9" }] }
            }]
        }))
        .unwrap();
        assert_eq!(extract_text(response).unwrap(), "Intel Core i9");
    }

    #[test]
    fn test_extract_text_without_candidates_fails() {
        let response: WireResponse = serde_json::from_value(json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        }))
        .unwrap();
        assert!(matches!(
            extract_text(response).unwrap_err(),
            PartscoutError::Remote(_)
        ));
    }

    #[test]
    fn test_error_message_prefers_api_message() {
        assert_eq!(
            error_message(r#"{"error":{"code":400,"message":"API key not valid"}}"#),
            "API key not valid"
        );
        assert_eq!(error_message("upstream timeout"), "upstream timeout");
    }
}
