use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::Result;
use crate::models::{ChatRole, ChatTurn};

/// A file already uploaded to the remote service and addressable by URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    pub name: String,
    pub uri: String,
    pub mime_type: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    Text(String),
    File(RemoteFile),
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Content {
    pub role: ChatRole,
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user(parts: Vec<Part>) -> Self {
        Self {
            role: ChatRole::User,
            parts,
        }
    }
}

impl From<&ChatTurn> for Content {
    fn from(turn: &ChatTurn) -> Self {
        Self {
            role: turn.role,
            parts: vec![Part::text(turn.content.clone())],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOptions {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
    pub response_mime_type: String,
    pub response_schema: Option<Value>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.95,
            top_k: 40,
            max_output_tokens: 8192,
            response_mime_type: "text/plain".to_string(),
            response_schema: None,
        }
    }
}

impl GenerationOptions {
    /// Structured output constrained to a JSON array of strings.
    pub fn string_list() -> Self {
        Self {
            response_mime_type: "application/json".to_string(),
            response_schema: Some(json!({
                "type": "ARRAY",
                "items": { "type": "STRING" }
            })),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    pub system_instruction: Option<String>,
    pub contents: Vec<Content>,
    pub options: GenerationOptions,
}

impl GenerateRequest {
    pub fn new(contents: Vec<Content>) -> Self {
        Self {
            system_instruction: None,
            contents,
            options: GenerationOptions::default(),
        }
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }
}

/// The remote generative-AI service as seen by the assistant.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Model identifier used for generation calls.
    fn model(&self) -> &str;

    async fn upload_file(
        &self,
        bytes: Vec<u8>,
        mime_type: &str,
        display_name: &str,
    ) -> Result<RemoteFile>;

    /// Runs one generation call and returns the concatenated response text.
    async fn generate(&self, request: &GenerateRequest) -> Result<String>;
}
