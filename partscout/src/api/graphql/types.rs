use async_graphql::{Context, InputObject, Object, Result, SimpleObject, ID};
use chrono::{DateTime, Utc};

use crate::api::state::AppState;
use crate::models::{
    ChatTurn, HardwareChat, HardwareIdentification, HardwareQuery, Product,
    ProductSimilaritySearch,
};
use crate::services::products_in_order;

use super::errors::{query_error, HardwareError};

pub struct HardwareIdentificationNode(pub HardwareIdentification);

/// Result of identifying a hardware component in an image.
#[Object(name = "HardwareIdentification")]
impl HardwareIdentificationNode {
    async fn id(&self) -> ID {
        ID(self.0.id.clone())
    }

    /// Stored image path, relative to the media root.
    async fn image(&self) -> &str {
        &self.0.image
    }

    async fn result(&self) -> &str {
        &self.0.result
    }

    async fn created_at(&self) -> DateTime<Utc> {
        self.0.created_at
    }
}

#[derive(SimpleObject)]
#[graphql(name = "ChatTurn")]
pub struct ChatTurnNode {
    /// `user` or `model`.
    pub role: String,
    pub content: String,
}

impl From<&ChatTurn> for ChatTurnNode {
    fn from(turn: &ChatTurn) -> Self {
        Self {
            role: turn.role.to_string(),
            content: turn.content.clone(),
        }
    }
}

pub struct HardwareQueryNode(pub HardwareQuery);

/// One question and answer of a chat session.
#[Object(name = "HardwareQuery")]
impl HardwareQueryNode {
    async fn id(&self) -> ID {
        ID(self.0.id.clone())
    }

    async fn question(&self) -> &str {
        &self.0.question
    }

    async fn answer(&self) -> &str {
        &self.0.answer
    }

    async fn created_at(&self) -> DateTime<Utc> {
        self.0.created_at
    }
}

pub struct HardwareChatNode(pub HardwareChat);

/// A hardware chat session.
#[Object(name = "HardwareChat")]
impl HardwareChatNode {
    async fn id(&self) -> ID {
        ID(self.0.id.clone())
    }

    async fn session_id(&self) -> &str {
        &self.0.session_id
    }

    async fn history(&self) -> Vec<ChatTurnNode> {
        self.0.history.iter().map(ChatTurnNode::from).collect()
    }

    /// Turns of this session in the order they were asked.
    async fn queries(&self, ctx: &Context<'_>) -> Result<Vec<HardwareQueryNode>> {
        let state = ctx.data::<AppState>()?;
        let queries = state
            .db
            .list_queries_for_chat(&self.0.id)
            .await
            .map_err(query_error)?;
        Ok(queries.into_iter().map(HardwareQueryNode).collect())
    }

    async fn created_at(&self) -> DateTime<Utc> {
        self.0.created_at
    }

    async fn updated_at(&self) -> DateTime<Utc> {
        self.0.updated_at
    }
}

#[derive(SimpleObject, Clone)]
pub struct Category {
    pub id: ID,
    pub name: String,
}

pub struct ProductNode(pub Product);

#[Object(name = "Product")]
impl ProductNode {
    async fn id(&self) -> ID {
        ID(self.0.id.clone())
    }

    async fn name(&self) -> &str {
        &self.0.name
    }

    async fn category(&self) -> Option<Category> {
        match (&self.0.category_id, &self.0.category_name) {
            (Some(id), Some(name)) => Some(Category {
                id: ID(id.clone()),
                name: name.clone(),
            }),
            _ => None,
        }
    }

    async fn description(&self) -> &str {
        &self.0.description
    }
}

pub struct ProductSimilaritySearchNode(pub ProductSimilaritySearch);

/// A search for catalog products resembling an uploaded image.
#[Object(name = "ProductSimilaritySearch")]
impl ProductSimilaritySearchNode {
    async fn id(&self) -> ID {
        ID(self.0.id.clone())
    }

    async fn image(&self) -> &str {
        &self.0.image
    }

    async fn identified_component(&self) -> Option<&str> {
        self.0.identified_component.as_deref()
    }

    /// Matched product ids, most relevant first.
    async fn similar_product_ids(&self) -> Vec<ID> {
        self.0
            .similar_product_ids
            .iter()
            .map(|id| ID(id.clone()))
            .collect()
    }

    /// Matched products still present in the catalog, most relevant first.
    async fn similar_products(&self, ctx: &Context<'_>) -> Result<Vec<ProductNode>> {
        let state = ctx.data::<AppState>()?;
        let products = products_in_order(state.db.as_ref(), &self.0.similar_product_ids)
            .await
            .map_err(query_error)?;
        Ok(products.into_iter().map(ProductNode).collect())
    }

    async fn created_at(&self) -> DateTime<Utc> {
        self.0.created_at
    }
}

#[derive(InputObject)]
pub struct HardwareChatMessageInput {
    /// Session to continue. Leave empty to start a new one.
    pub session_id: Option<String>,
    pub query: String,
}

#[derive(InputObject)]
pub struct FindSimilarProductsInput {
    /// Limits the candidate products to one category.
    pub category_id: Option<ID>,
    #[graphql(default = 3)]
    pub max_results: i32,
}

#[derive(SimpleObject)]
pub struct IdentifyHardwareImagePayload {
    pub identification: Option<HardwareIdentificationNode>,
    pub errors: Vec<HardwareError>,
}

#[derive(SimpleObject)]
pub struct HardwareChatMessagePayload {
    pub chat: Option<HardwareChatNode>,
    pub response: Option<String>,
    pub errors: Vec<HardwareError>,
}

#[derive(SimpleObject)]
pub struct FindSimilarProductsPayload {
    pub product_search: Option<ProductSimilaritySearchNode>,
    pub similar_products: Vec<ProductNode>,
    pub errors: Vec<HardwareError>,
}
