use std::path::Path;
use std::sync::Arc;

use crate::error::{PartscoutError, Result};
use crate::llm::{
    prompts, Content, GenerateRequest, GenerationOptions, GenerativeBackend, Part, RemoteFile,
};
use crate::models::{CandidateProduct, ChatReply, ChatTurn};

use super::parsing::parse_product_ids;

/// Hardware identification, similarity ranking and chat on top of a
/// generative backend. Every failure is returned to the caller as an error.
#[derive(Clone)]
pub struct HardwareAssistant {
    backend: Arc<dyn GenerativeBackend>,
}

impl HardwareAssistant {
    pub fn new(backend: Arc<dyn GenerativeBackend>) -> Self {
        Self { backend }
    }

    pub fn model(&self) -> &str {
        self.backend.model()
    }

    async fn upload(&self, path: &Path) -> Result<RemoteFile> {
        let mime_type = mime_guess::from_path(path).first().ok_or_else(|| {
            PartscoutError::InvalidInput(format!(
                "Could not determine MIME type for {}",
                path.display()
            ))
        })?;

        let bytes = tokio::fs::read(path).await?;
        let display_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("upload");

        self.backend
            .upload_file(bytes, mime_type.essence_str(), display_name)
            .await
    }

    /// Names the PC component shown in the image, or returns the fixed refusal
    /// sentence when the model decides it is not hardware.
    pub async fn identify_from_image(&self, path: &Path) -> Result<String> {
        let file = self.upload(path).await?;

        let mut parts: Vec<Part> = prompts::identification_preamble()
            .into_iter()
            .map(Part::Text)
            .collect();
        parts.push(Part::File(file));
        parts.extend(prompts::identification_epilogue().into_iter().map(Part::Text));

        let text = self
            .backend
            .generate(&GenerateRequest::new(vec![Content::user(parts)]))
            .await?;

        let result = text.trim().to_string();
        tracing::debug!(image = %path.display(), result = %result, "Identified hardware");
        Ok(result)
    }

    /// Ranks `candidates` against the image. Only products from `candidates`
    /// are returned, in the model's relevance order.
    pub async fn find_similar(
        &self,
        path: &Path,
        candidates: &[CandidateProduct],
    ) -> Result<Vec<CandidateProduct>> {
        if candidates.is_empty() {
            tracing::debug!("No candidate products, skipping similarity ranking");
            return Ok(Vec::new());
        }

        let file = self.upload(path).await?;

        let parts = vec![
            Part::text(prompts::similarity_instruction()),
            Part::text("Image: "),
            Part::File(file),
            Part::text("Product Database:"),
            Part::text(prompts::product_database(candidates)),
            Part::text(prompts::similarity_answer_cue()),
        ];
        let request = GenerateRequest::new(vec![Content::user(parts)])
            .with_options(GenerationOptions::string_list());

        let text = self.backend.generate(&request).await?;
        let ids = parse_product_ids(&text);

        let matches: Vec<CandidateProduct> = ids
            .iter()
            .filter_map(|id| candidates.iter().find(|candidate| &candidate.id == id))
            .cloned()
            .collect();

        if matches.len() < ids.len() {
            tracing::warn!(
                returned = ids.len(),
                matched = matches.len(),
                "Model suggested ids outside the candidate set"
            );
        }

        Ok(matches)
    }

    /// One chat turn. The returned history is `history` followed by the user
    /// query and the model's answer.
    pub async fn chat(&self, query: &str, history: &[ChatTurn]) -> Result<ChatReply> {
        let mut contents: Vec<Content> = history.iter().map(Content::from).collect();
        contents.push(Content::user(vec![Part::text(query)]));

        let request =
            GenerateRequest::new(contents).with_system_instruction(prompts::chat_system_instruction());

        let response = self.backend.generate(&request).await?.trim().to_string();

        let mut updated = history.to_vec();
        updated.push(ChatTurn::user(query));
        updated.push(ChatTurn::model(response.clone()));

        Ok(ChatReply {
            response,
            history: updated,
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::error::{PartscoutError, Result};
    use crate::llm::{GenerateRequest, GenerativeBackend, RemoteFile};

    /// Backend that replays canned answers and records what it was sent.
    #[derive(Default)]
    pub struct ScriptedBackend {
        answers: Mutex<VecDeque<Result<String>>>,
        pub requests: Mutex<Vec<GenerateRequest>>,
        pub uploads: Mutex<Vec<(String, String)>>,
        pub fail_uploads: bool,
    }

    impl ScriptedBackend {
        pub fn answering<I, S>(answers: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            Self {
                answers: Mutex::new(answers.into_iter().map(|a| Ok(a.into())).collect()),
                ..Self::default()
            }
        }

        pub fn failing(message: &str) -> Self {
            Self {
                answers: Mutex::new(VecDeque::from(vec![Err(PartscoutError::Remote(
                    message.to_string(),
                ))])),
                ..Self::default()
            }
        }

        pub fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl GenerativeBackend for ScriptedBackend {
        fn model(&self) -> &str {
            "scripted"
        }

        async fn upload_file(
            &self,
            _bytes: Vec<u8>,
            mime_type: &str,
            display_name: &str,
        ) -> Result<RemoteFile> {
            if self.fail_uploads {
                return Err(PartscoutError::Remote("upload rejected".to_string()));
            }
            self.uploads
                .lock()
                .unwrap()
                .push((display_name.to_string(), mime_type.to_string()));
            Ok(RemoteFile {
                name: format!("files/{display_name}"),
                uri: format!("https://files.test/{display_name}"),
                mime_type: mime_type.to_string(),
            })
        }

        async fn generate(&self, request: &GenerateRequest) -> Result<String> {
            self.requests.lock().unwrap().push(request.clone());
            self.answers
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(PartscoutError::Remote("no scripted answer".to_string())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::ScriptedBackend;
    use super::*;
    use crate::models::ChatRole;
    use pretty_assertions::assert_eq;

    async fn image(dir: &tempfile::TempDir, name: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        tokio::fs::write(&path, b"\x89PNG fake").await.unwrap();
        path
    }

    fn candidates() -> Vec<CandidateProduct> {
        ["10", "20", "30", "40"]
            .into_iter()
            .map(|id| CandidateProduct {
                id: id.to_string(),
                name: format!("Part {id}"),
                category: "GPU".to_string(),
                description: String::new(),
            })
            .collect()
    }

    #[tokio::test]
    async fn test_identify_sends_file_between_segments() {
        let dir = tempfile::tempdir().unwrap();
        let path = image(&dir, "gpu.png").await;
        let backend = Arc::new(ScriptedBackend::answering(["  NVIDIA RTX 4090 \n"]));
        let assistant = HardwareAssistant::new(backend.clone());

        let result = assistant.identify_from_image(&path).await.unwrap();
        assert_eq!(result, "NVIDIA RTX 4090");

        let uploads = backend.uploads.lock().unwrap().clone();
        assert_eq!(uploads, vec![("gpu.png".to_string(), "image/png".to_string())]);

        let requests = backend.requests.lock().unwrap();
        let parts = &requests[0].contents[0].parts;
        assert_eq!(parts.len(), 7);
        assert!(matches!(parts[4], Part::File(_)));
        assert_eq!(parts[6], Part::text("Description: "));
        assert!(requests[0].system_instruction.is_none());
    }

    #[tokio::test]
    async fn test_unknown_extension_is_invalid_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = image(&dir, "blob.unknownext").await;
        let backend = Arc::new(ScriptedBackend::answering(["unused"]));
        let assistant = HardwareAssistant::new(backend.clone());

        let err = assistant.identify_from_image(&path).await.unwrap_err();
        assert!(matches!(err, PartscoutError::InvalidInput(_)));
        assert_eq!(backend.request_count(), 0);
    }

    #[tokio::test]
    async fn test_find_similar_keeps_response_order_and_drops_strangers() {
        let dir = tempfile::tempdir().unwrap();
        let path = image(&dir, "card.jpg").await;
        let backend = Arc::new(ScriptedBackend::answering([r#"["30", "99", "10", "30"]"#]));
        let assistant = HardwareAssistant::new(backend.clone());

        let matches = assistant.find_similar(&path, &candidates()).await.unwrap();
        let ids: Vec<&str> = matches.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["30", "10"]);

        let requests = backend.requests.lock().unwrap();
        assert_eq!(requests[0].options.response_mime_type, "application/json");
    }

    #[tokio::test]
    async fn test_find_similar_without_candidates_skips_remote() {
        let dir = tempfile::tempdir().unwrap();
        let path = image(&dir, "card.jpg").await;
        let backend = Arc::new(ScriptedBackend::default());
        let assistant = HardwareAssistant::new(backend.clone());

        assert!(assistant.find_similar(&path, &[]).await.unwrap().is_empty());
        assert_eq!(backend.request_count(), 0);
    }

    #[tokio::test]
    async fn test_chat_without_history_is_single_turn() {
        let backend = Arc::new(ScriptedBackend::answering(["A graphics card."]));
        let assistant = HardwareAssistant::new(backend.clone());

        let reply = assistant.chat("What is a GPU?", &[]).await.unwrap();
        assert_eq!(reply.response, "A graphics card.");
        assert_eq!(
            reply.history,
            vec![
                ChatTurn::user("What is a GPU?"),
                ChatTurn::model("A graphics card.")
            ]
        );

        let requests = backend.requests.lock().unwrap();
        assert_eq!(requests[0].contents.len(), 1);
        assert!(requests[0]
            .system_instruction
            .as_deref()
            .unwrap()
            .contains("professional computer consultant"));
    }

    #[tokio::test]
    async fn test_chat_replays_history() {
        let backend = Arc::new(ScriptedBackend::answering(["Yes, with a BIOS update."]));
        let assistant = HardwareAssistant::new(backend.clone());
        let history = vec![
            ChatTurn::user("Is B650 good?"),
            ChatTurn::model("Yes, for Ryzen 7000."),
        ];

        let reply = assistant
            .chat("Does it support Ryzen 9000?", &history)
            .await
            .unwrap();
        assert_eq!(reply.history.len(), 4);
        assert_eq!(reply.history[..2], history[..]);

        let requests = backend.requests.lock().unwrap();
        let roles: Vec<ChatRole> = requests[0].contents.iter().map(|c| c.role).collect();
        assert_eq!(roles, vec![ChatRole::User, ChatRole::Model, ChatRole::User]);
    }

    #[tokio::test]
    async fn test_chat_propagates_remote_failure() {
        let backend = Arc::new(ScriptedBackend::failing("quota exceeded"));
        let assistant = HardwareAssistant::new(backend);

        let err = assistant.chat("hi", &[]).await.unwrap_err();
        assert!(err.to_string().contains("quota exceeded"));
    }
}
