use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::config::HardwareConfig;
use crate::db::DatabaseBackend;
use crate::error::{PartscoutError, Result};
use crate::intelligence::HardwareAssistant;
use crate::models::{
    CandidateProduct, HardwareChat, HardwareIdentification, HardwareQuery, Product,
    ProductSimilaritySearch,
};
use crate::storage::{file_extension, sanitize_filename, MediaStorage};

const IDENTIFICATION_NAMESPACE: &str = "hw";
const SIMILARITY_NAMESPACE: &str = "pss";

/// An uploaded image as received from the client.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct ChatOutcome {
    pub chat: HardwareChat,
    pub response: String,
}

#[derive(Debug, Clone)]
pub struct SimilarityOutcome {
    pub search: ProductSimilaritySearch,
    pub products: Vec<Product>,
}

/// Turns assistant failures into the success-shaped values clients have
/// always received. Each failure is logged before it is swallowed.
pub mod degrade {
    use crate::error::PartscoutError;
    use crate::models::{CandidateProduct, ChatReply, ChatTurn};

    pub fn identification(error: &PartscoutError) -> String {
        tracing::warn!(error = %error, "Hardware identification failed");
        format!("Error processing image: {error}")
    }

    pub fn chat(error: &PartscoutError, history: Vec<ChatTurn>) -> ChatReply {
        tracing::warn!(error = %error, "Hardware chat failed");
        ChatReply {
            response: format!("Error processing query: {error}"),
            history,
        }
    }

    pub fn similar(error: &PartscoutError) -> Vec<CandidateProduct> {
        tracing::warn!(error = %error, "Similar product search failed");
        Vec::new()
    }
}

/// Looks up `ids` in the catalog and returns the products in the same order.
/// Ids that no longer resolve are skipped.
pub async fn products_in_order(db: &dyn DatabaseBackend, ids: &[String]) -> Result<Vec<Product>> {
    let mut by_id: HashMap<String, Product> = db
        .get_products_by_ids(ids)
        .await?
        .into_iter()
        .map(|product| (product.id.clone(), product))
        .collect();

    Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
}

#[derive(Clone)]
pub struct HardwareService {
    db: Arc<dyn DatabaseBackend>,
    storage: MediaStorage,
    assistant: HardwareAssistant,
    max_similar_results: usize,
}

impl HardwareService {
    pub fn new(
        db: Arc<dyn DatabaseBackend>,
        storage: MediaStorage,
        assistant: HardwareAssistant,
        config: &HardwareConfig,
    ) -> Self {
        Self {
            db,
            storage,
            assistant,
            max_similar_results: config.max_similar_results.max(1),
        }
    }

    /// Stores the image, asks the assistant what it shows and records the
    /// answer.
    pub async fn identify(&self, upload: ImageUpload) -> Result<HardwareIdentification> {
        let file_name = format!("{}_{}", Uuid::new_v4(), sanitize_filename(&upload.filename));
        let image = self
            .storage
            .save(IDENTIFICATION_NAMESPACE, &file_name, &upload.bytes)
            .await?;

        let result = match self
            .assistant
            .identify_from_image(&self.storage.path(&image))
            .await
        {
            Ok(result) => result,
            Err(error) => degrade::identification(&error),
        };

        let record = HardwareIdentification::new(image, result);
        self.db.create_identification(&record).await?;

        tracing::info!(id = %record.id, image = %record.image, "Hardware identification stored");
        Ok(record)
    }

    /// Runs one chat turn. A missing or unknown `session_id` starts a new
    /// session with a freshly generated id.
    pub async fn chat_message(&self, session_id: Option<&str>, query: &str) -> Result<ChatOutcome> {
        let existing = match session_id.map(str::trim).filter(|id| !id.is_empty()) {
            Some(requested) => {
                let found = self.db.get_chat_by_session_id(requested).await?;
                if found.is_none() {
                    tracing::info!(
                        requested_session = %requested,
                        "Unknown chat session, starting a new one"
                    );
                }
                found
            }
            None => None,
        };

        let mut chat = match existing {
            Some(chat) => chat,
            None => {
                let chat = HardwareChat::start();
                self.db.create_chat(&chat).await?;
                tracing::debug!(session_id = %chat.session_id, "Created chat session");
                chat
            }
        };

        let reply = match self.assistant.chat(query, &chat.history).await {
            Ok(reply) => reply,
            Err(error) => degrade::chat(&error, chat.history.clone()),
        };

        if let Some(updated_at) = self.db.update_chat_history(&chat.id, &reply.history).await? {
            chat.updated_at = updated_at;
        }
        chat.history = reply.history;

        self.db
            .create_query(&HardwareQuery::new(&chat.id, query, &reply.response))
            .await?;

        tracing::info!(
            session_id = %chat.session_id,
            turns = chat.history.len(),
            "Chat turn recorded"
        );

        Ok(ChatOutcome {
            chat,
            response: reply.response,
        })
    }

    /// Finds up to `max_results` catalog products resembling the image,
    /// optionally limited to one category.
    pub async fn find_similar_products(
        &self,
        upload: ImageUpload,
        category_id: Option<&str>,
        max_results: i32,
    ) -> Result<SimilarityOutcome> {
        if max_results < 1 {
            return Err(PartscoutError::Validation(
                "maxResults must be at least 1".to_string(),
            ));
        }
        let limit = self.effective_limit(max_results);

        let stem = Uuid::new_v4().to_string();
        let file_name = match file_extension(&upload.filename) {
            Some(ext) => format!("{stem}.{ext}"),
            None => stem,
        };
        let image = self
            .storage
            .save(SIMILARITY_NAMESPACE, &file_name, &upload.bytes)
            .await?;
        let path = self.storage.path(&image);

        let catalog = self.db.list_products(category_id).await?;
        let candidates: Vec<CandidateProduct> = catalog.iter().map(CandidateProduct::from).collect();

        let identified = match self.assistant.identify_from_image(&path).await {
            Ok(result) => result,
            Err(error) => degrade::identification(&error),
        };

        let mut matches = match self.assistant.find_similar(&path, &candidates).await {
            Ok(matches) => matches,
            Err(error) => degrade::similar(&error),
        };
        matches.truncate(limit);

        let ids: Vec<String> = matches.into_iter().map(|candidate| candidate.id).collect();
        let search = ProductSimilaritySearch::new(image, Some(identified), ids);
        self.db.create_similarity_search(&search).await?;

        let products = products_in_order(self.db.as_ref(), &search.similar_product_ids).await?;

        tracing::info!(
            id = %search.id,
            candidates = candidates.len(),
            matched = products.len(),
            "Product similarity search stored"
        );

        Ok(SimilarityOutcome { search, products })
    }

    fn effective_limit(&self, requested: i32) -> usize {
        let requested = usize::try_from(requested).unwrap_or(1);
        if requested > self.max_similar_results {
            tracing::debug!(
                requested,
                max = self.max_similar_results,
                "Clamping maxResults"
            );
        }
        requested.min(self.max_similar_results)
    }
}
