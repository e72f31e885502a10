use async_graphql::{Context, EmptySubscription, Object, Result, Schema, Upload, ID};
use tokio::io::AsyncReadExt;

use crate::api::state::AppState;
use crate::services::ImageUpload;

use super::errors::{query_error, HardwareError};
use super::types::{
    FindSimilarProductsInput, FindSimilarProductsPayload, HardwareChatMessageInput,
    HardwareChatMessagePayload, HardwareChatNode, HardwareIdentificationNode,
    IdentifyHardwareImagePayload, ProductNode, ProductSimilaritySearchNode,
};

pub type PartscoutSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

pub fn build_schema(state: AppState) -> PartscoutSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(state)
        .finish()
}

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Get a specific hardware identification by ID.
    async fn hardware_identification(
        &self,
        ctx: &Context<'_>,
        id: ID,
    ) -> Result<Option<HardwareIdentificationNode>> {
        let state = ctx.data::<AppState>()?;
        let record = state
            .db
            .get_identification_by_id(&id)
            .await
            .map_err(query_error)?;
        Ok(record.map(HardwareIdentificationNode))
    }

    /// List all hardware identifications, newest first.
    async fn hardware_identifications(
        &self,
        ctx: &Context<'_>,
    ) -> Result<Vec<HardwareIdentificationNode>> {
        let state = ctx.data::<AppState>()?;
        let records = state.db.list_identifications().await.map_err(query_error)?;
        Ok(records.into_iter().map(HardwareIdentificationNode).collect())
    }

    /// Get a specific hardware chat session by session ID.
    async fn hardware_chat(
        &self,
        ctx: &Context<'_>,
        session_id: String,
    ) -> Result<Option<HardwareChatNode>> {
        let state = ctx.data::<AppState>()?;
        let chat = state
            .db
            .get_chat_by_session_id(&session_id)
            .await
            .map_err(query_error)?;
        Ok(chat.map(HardwareChatNode))
    }

    /// List all hardware chat sessions, most recently active first.
    async fn hardware_chats(&self, ctx: &Context<'_>) -> Result<Vec<HardwareChatNode>> {
        let state = ctx.data::<AppState>()?;
        let chats = state.db.list_chats().await.map_err(query_error)?;
        Ok(chats.into_iter().map(HardwareChatNode).collect())
    }

    /// Get a specific product similarity search by ID.
    async fn product_similarity_search(
        &self,
        ctx: &Context<'_>,
        id: ID,
    ) -> Result<Option<ProductSimilaritySearchNode>> {
        let state = ctx.data::<AppState>()?;
        let search = state
            .db
            .get_similarity_search_by_id(&id)
            .await
            .map_err(query_error)?;
        Ok(search.map(ProductSimilaritySearchNode))
    }

    /// List all product similarity searches, newest first.
    async fn product_similarity_searches(
        &self,
        ctx: &Context<'_>,
    ) -> Result<Vec<ProductSimilaritySearchNode>> {
        let state = ctx.data::<AppState>()?;
        let searches = state
            .db
            .list_similarity_searches()
            .await
            .map_err(query_error)?;
        Ok(searches.into_iter().map(ProductSimilaritySearchNode).collect())
    }
}

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Identify hardware from an uploaded image.
    async fn identify_hardware_image(
        &self,
        ctx: &Context<'_>,
        image: Upload,
    ) -> Result<IdentifyHardwareImagePayload> {
        let state = ctx.data::<AppState>()?;

        let upload = match read_upload(ctx, &image, state.config.server.max_upload_bytes).await {
            Ok(upload) => upload,
            Err(error) => {
                return Ok(IdentifyHardwareImagePayload {
                    identification: None,
                    errors: vec![error],
                })
            }
        };

        Ok(match state.hardware.identify(upload).await {
            Ok(record) => IdentifyHardwareImagePayload {
                identification: Some(HardwareIdentificationNode(record)),
                errors: Vec::new(),
            },
            Err(error) => IdentifyHardwareImagePayload {
                identification: None,
                errors: vec![HardwareError::from_error(Some("image"), &error)],
            },
        })
    }

    /// Chat with the hardware expert about hardware-related topics.
    async fn hardware_chat_message(
        &self,
        ctx: &Context<'_>,
        input: HardwareChatMessageInput,
    ) -> Result<HardwareChatMessagePayload> {
        let state = ctx.data::<AppState>()?;

        if input.query.trim().is_empty() {
            return Ok(HardwareChatMessagePayload {
                chat: None,
                response: None,
                errors: vec![HardwareError::required("query")],
            });
        }

        Ok(
            match state
                .hardware
                .chat_message(input.session_id.as_deref(), &input.query)
                .await
            {
                Ok(outcome) => HardwareChatMessagePayload {
                    chat: Some(HardwareChatNode(outcome.chat)),
                    response: Some(outcome.response),
                    errors: Vec::new(),
                },
                Err(error) => HardwareChatMessagePayload {
                    chat: None,
                    response: None,
                    errors: vec![HardwareError::from_error(None, &error)],
                },
            },
        )
    }

    /// Find similar products based on an uploaded hardware image.
    async fn find_similar_products(
        &self,
        ctx: &Context<'_>,
        image: Upload,
        input: FindSimilarProductsInput,
    ) -> Result<FindSimilarProductsPayload> {
        let state = ctx.data::<AppState>()?;

        let failed = |error: HardwareError| FindSimilarProductsPayload {
            product_search: None,
            similar_products: Vec::new(),
            errors: vec![error],
        };

        if input.max_results < 1 {
            return Ok(failed(HardwareError::invalid(
                "maxResults",
                "maxResults must be at least 1",
            )));
        }

        let upload = match read_upload(ctx, &image, state.config.server.max_upload_bytes).await {
            Ok(upload) => upload,
            Err(error) => return Ok(failed(error)),
        };

        let category_id = input
            .category_id
            .as_deref()
            .map(String::as_str)
            .filter(|id| !id.is_empty());

        Ok(
            match state
                .hardware
                .find_similar_products(upload, category_id, input.max_results)
                .await
            {
                Ok(outcome) => FindSimilarProductsPayload {
                    product_search: Some(ProductSimilaritySearchNode(outcome.search)),
                    similar_products: outcome.products.into_iter().map(ProductNode).collect(),
                    errors: Vec::new(),
                },
                Err(error) => failed(HardwareError::from_error(None, &error)),
            },
        )
    }
}

/// Reads a multipart upload into memory, rejecting empty and oversized files.
async fn read_upload(
    ctx: &Context<'_>,
    image: &Upload,
    max_bytes: usize,
) -> std::result::Result<ImageUpload, HardwareError> {
    let value = image
        .value(ctx)
        .map_err(|e| HardwareError::invalid("image", format!("Unreadable upload: {e}")))?;

    let size = value
        .size()
        .map_err(|e| HardwareError::invalid("image", format!("Unreadable upload: {e}")))?;
    if size == 0 {
        return Err(HardwareError::required("image"));
    }
    if size > max_bytes as u64 {
        return Err(HardwareError::invalid(
            "image",
            format!("Upload exceeds the {max_bytes} byte limit"),
        ));
    }

    let mut bytes = Vec::with_capacity(size as usize);
    tokio::fs::File::from_std(value.content)
        .read_to_end(&mut bytes)
        .await
        .map_err(|e| HardwareError::invalid("image", format!("Unreadable upload: {e}")))?;

    Ok(ImageUpload {
        filename: value.filename,
        bytes,
    })
}
