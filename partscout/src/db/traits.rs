use async_trait::async_trait;

use crate::error::Result;
use crate::models::{
    Category, ChatTurn, HardwareChat, HardwareIdentification, HardwareQuery, Product,
    ProductSimilaritySearch,
};

// ---------------------------------------------------------------------------
// Individual store traits
// ---------------------------------------------------------------------------

/// Identification records, newest first.
#[async_trait]
pub trait IdentificationStore: Send + Sync {
    async fn create_identification(&self, record: &HardwareIdentification) -> Result<()>;
    async fn get_identification_by_id(&self, id: &str) -> Result<Option<HardwareIdentification>>;
    async fn list_identifications(&self) -> Result<Vec<HardwareIdentification>>;
}

/// Chat sessions and their turns.
#[async_trait]
pub trait ChatStore: Send + Sync {
    async fn create_chat(&self, chat: &HardwareChat) -> Result<()>;
    async fn get_chat_by_session_id(&self, session_id: &str) -> Result<Option<HardwareChat>>;
    /// Sessions ordered by most recent activity.
    async fn list_chats(&self) -> Result<Vec<HardwareChat>>;
    /// Replace the stored history and bump `updated_at`. Returns the new
    /// `updated_at`, or `None` when the chat no longer exists.
    async fn update_chat_history(
        &self,
        chat_id: &str,
        history: &[ChatTurn],
    ) -> Result<Option<chrono::DateTime<chrono::Utc>>>;
    /// Delete a session together with its turns.
    async fn delete_chat(&self, chat_id: &str) -> Result<bool>;

    async fn create_query(&self, query: &HardwareQuery) -> Result<()>;
    /// Turns of a session in chronological order.
    async fn list_queries_for_chat(&self, chat_id: &str) -> Result<Vec<HardwareQuery>>;
}

/// Similarity search records, newest first.
#[async_trait]
pub trait SimilaritySearchStore: Send + Sync {
    async fn create_similarity_search(&self, search: &ProductSimilaritySearch) -> Result<()>;
    async fn get_similarity_search_by_id(
        &self,
        id: &str,
    ) -> Result<Option<ProductSimilaritySearch>>;
    async fn list_similarity_searches(&self) -> Result<Vec<ProductSimilaritySearch>>;
}

/// The storefront catalog. The API only reads it; writes exist for seeding.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn list_products(&self, category_id: Option<&str>) -> Result<Vec<Product>>;
    async fn get_products_by_ids(&self, ids: &[String]) -> Result<Vec<Product>>;
    async fn upsert_category(&self, category: &Category) -> Result<()>;
    async fn upsert_product(&self, product: &Product) -> Result<()>;
}

// ---------------------------------------------------------------------------
// Unified backend supertrait
// ---------------------------------------------------------------------------

/// A complete database backend that combines all store traits plus lifecycle
/// operations.
#[async_trait]
pub trait DatabaseBackend:
    IdentificationStore + ChatStore + SimilaritySearchStore + CatalogStore
{
    /// Cheap liveness probe used by the health check.
    async fn ping(&self) -> Result<()>;

    /// Sync with remote (e.g. Turso replication). No-op for local-only backends.
    async fn sync(&self) -> Result<()>;
}
