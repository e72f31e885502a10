use chrono::{DateTime, SubsecRound, Utc};
use nanoid::nanoid;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ChatTurn;

/// Current time at the microsecond precision the record store keeps.
pub fn timestamp_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Stored answer to "what hardware is in this image".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HardwareIdentification {
    pub id: String,
    /// Storage-relative path of the uploaded image.
    pub image: String,
    pub result: String,
    pub created_at: DateTime<Utc>,
}

impl HardwareIdentification {
    pub fn new(image: String, result: String) -> Self {
        Self {
            id: nanoid!(),
            image,
            result,
            created_at: timestamp_now(),
        }
    }
}

impl std::fmt::Display for HardwareIdentification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Hardware identification at {}", self.created_at)
    }
}

/// A conversation thread. `history` only ever grows after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HardwareChat {
    pub id: String,
    pub session_id: String,
    pub history: Vec<ChatTurn>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl HardwareChat {
    /// Open an empty session under a freshly generated session id.
    pub fn start() -> Self {
        let now = timestamp_now();
        Self {
            id: nanoid!(),
            session_id: Uuid::new_v4().to_string(),
            history: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl std::fmt::Display for HardwareChat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Chat session {}", self.session_id)
    }
}

/// A single question/answer pair within a chat session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HardwareQuery {
    pub id: String,
    pub chat_id: String,
    pub question: String,
    pub answer: String,
    pub created_at: DateTime<Utc>,
}

impl HardwareQuery {
    pub fn new(chat_id: &str, question: &str, answer: &str) -> Self {
        Self {
            id: nanoid!(),
            chat_id: chat_id.to_string(),
            question: question.to_string(),
            answer: answer.to_string(),
            created_at: timestamp_now(),
        }
    }
}

impl std::fmt::Display for HardwareQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Query in chat {} at {}", self.chat_id, self.created_at)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductSimilaritySearch {
    pub id: String,
    pub image: String,
    pub identified_component: Option<String>,
    /// Matched product ids in relevance order.
    pub similar_product_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl ProductSimilaritySearch {
    pub fn new(
        image: String,
        identified_component: Option<String>,
        similar_product_ids: Vec<String>,
    ) -> Self {
        Self {
            id: nanoid!(),
            image,
            identified_component,
            similar_product_ids,
            created_at: timestamp_now(),
        }
    }
}

impl std::fmt::Display for ProductSimilaritySearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Product similarity search at {}", self.created_at)
    }
}
