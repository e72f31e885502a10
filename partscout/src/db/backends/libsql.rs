use crate::db::connection::Database;
use crate::db::repository::{
    ChatRepository, IdentificationRepository, ProductRepository, SimilaritySearchRepository,
};
use crate::db::traits::{
    CatalogStore, ChatStore, DatabaseBackend, IdentificationStore, SimilaritySearchStore,
};
use crate::error::Result;
use crate::models::{
    Category, ChatTurn, HardwareChat, HardwareIdentification, HardwareQuery, Product,
    ProductSimilaritySearch,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub struct LibSqlBackend {
    db: Database,
}

impl LibSqlBackend {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl IdentificationStore for LibSqlBackend {
    async fn create_identification(&self, record: &HardwareIdentification) -> Result<()> {
        let conn = self.db.connect()?;
        IdentificationRepository::create(&conn, record).await
    }
    async fn get_identification_by_id(&self, id: &str) -> Result<Option<HardwareIdentification>> {
        let conn = self.db.connect()?;
        IdentificationRepository::get_by_id(&conn, id).await
    }
    async fn list_identifications(&self) -> Result<Vec<HardwareIdentification>> {
        let conn = self.db.connect()?;
        IdentificationRepository::list(&conn).await
    }
}

#[async_trait]
impl ChatStore for LibSqlBackend {
    async fn create_chat(&self, chat: &HardwareChat) -> Result<()> {
        let conn = self.db.connect()?;
        ChatRepository::create(&conn, chat).await
    }
    async fn get_chat_by_session_id(&self, session_id: &str) -> Result<Option<HardwareChat>> {
        let conn = self.db.connect()?;
        ChatRepository::get_by_session_id(&conn, session_id).await
    }
    async fn list_chats(&self) -> Result<Vec<HardwareChat>> {
        let conn = self.db.connect()?;
        ChatRepository::list(&conn).await
    }
    async fn update_chat_history(
        &self,
        chat_id: &str,
        history: &[ChatTurn],
    ) -> Result<Option<DateTime<Utc>>> {
        let conn = self.db.connect()?;
        ChatRepository::update_history(&conn, chat_id, history).await
    }
    async fn delete_chat(&self, chat_id: &str) -> Result<bool> {
        let conn = self.db.connect()?;
        ChatRepository::delete(&conn, chat_id).await
    }
    async fn create_query(&self, query: &HardwareQuery) -> Result<()> {
        let conn = self.db.connect()?;
        ChatRepository::create_query(&conn, query).await
    }
    async fn list_queries_for_chat(&self, chat_id: &str) -> Result<Vec<HardwareQuery>> {
        let conn = self.db.connect()?;
        ChatRepository::list_queries(&conn, chat_id).await
    }
}

#[async_trait]
impl SimilaritySearchStore for LibSqlBackend {
    async fn create_similarity_search(&self, search: &ProductSimilaritySearch) -> Result<()> {
        let conn = self.db.connect()?;
        SimilaritySearchRepository::create(&conn, search).await
    }
    async fn get_similarity_search_by_id(
        &self,
        id: &str,
    ) -> Result<Option<ProductSimilaritySearch>> {
        let conn = self.db.connect()?;
        SimilaritySearchRepository::get_by_id(&conn, id).await
    }
    async fn list_similarity_searches(&self) -> Result<Vec<ProductSimilaritySearch>> {
        let conn = self.db.connect()?;
        SimilaritySearchRepository::list(&conn).await
    }
}

#[async_trait]
impl CatalogStore for LibSqlBackend {
    async fn list_products(&self, category_id: Option<&str>) -> Result<Vec<Product>> {
        let conn = self.db.connect()?;
        ProductRepository::list(&conn, category_id).await
    }
    async fn get_products_by_ids(&self, ids: &[String]) -> Result<Vec<Product>> {
        let conn = self.db.connect()?;
        ProductRepository::get_by_ids(&conn, ids).await
    }
    async fn upsert_category(&self, category: &Category) -> Result<()> {
        let conn = self.db.connect()?;
        ProductRepository::upsert_category(&conn, category).await
    }
    async fn upsert_product(&self, product: &Product) -> Result<()> {
        let conn = self.db.connect()?;
        ProductRepository::upsert_product(&conn, product).await
    }
}

#[async_trait]
impl DatabaseBackend for LibSqlBackend {
    async fn ping(&self) -> Result<()> {
        self.db.ping().await
    }

    async fn sync(&self) -> Result<()> {
        self.db.sync().await
    }
}
