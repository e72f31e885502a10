//! Fixed prompt text for the hardware assistant.
//!
//! The remote model is sensitive to exact wording, so the sentences below are
//! kept verbatim between releases.

use crate::models::CandidateProduct;

/// Exact reply expected from the model for non-hardware images.
pub const NOT_HARDWARE_REPLY: &str = "I cannot identify this as a PC hardware component";

/// Exact reply expected from the model for off-topic chat questions.
pub const OFF_TOPIC_REPLY: &str = "I can't answer that!";

/// Characters of a product description shown to the model.
pub const DESCRIPTION_PREVIEW_CHARS: usize = 100;

/// Text segments sent ahead of the image for identification.
pub fn identification_preamble() -> Vec<String> {
    vec![
        "What object is this? Describe how it might be used".to_string(),
        "Object: The input is a PC hardware Image (any hardware component related to computers)"
            .to_string(),
        format!(
            "Description: You are a computer parts expert. Identify PC hardware components from images, \
including processors, graphics cards, motherboards, memory modules, storage devices, and PSUs. \
Focus on specific characteristics like brand logos, form factors, and component features. \
The output should only be the exact name of the device, for example, 'Intel Core i9-10900K' for a processor \
or 'ASUS B560 Motherboard' for a motherboard. If given any other images simply reply with \
'{NOT_HARDWARE_REPLY}'"
        ),
        "Object: ".to_string(),
    ]
}

/// Text segments sent after the image for identification.
pub fn identification_epilogue() -> Vec<String> {
    vec![String::new(), "Description: ".to_string()]
}

/// Opening instruction of a similarity search.
pub fn similarity_instruction() -> &'static str {
    "I have an image of a PC hardware component and a database of products. \
Based on the image, identify the component and suggest the most similar products \
from the database. Return the product IDs of the 3 most relevant matches."
}

/// Closing line of a similarity search; asks for a JSON array of ids.
pub fn similarity_answer_cue() -> &'static str {
    "Most similar product IDs (JSON array of strings, most relevant first):"
}

/// Renders the candidate catalog, one product per line.
///
/// # Example
/// ```
/// use partscout::llm::prompts::product_database;
/// use partscout::models::CandidateProduct;
///
/// let lines = product_database(&[CandidateProduct {
///     id: "42".into(),
///     name: "RTX 4070".into(),
///     category: "GPU".into(),
///     description: "Ada Lovelace card".into(),
/// }]);
/// assert_eq!(
///     lines,
///     "Product ID: 42, Name: RTX 4070, Category: GPU, Description: Ada Lovelace card..."
/// );
/// ```
pub fn product_database(candidates: &[CandidateProduct]) -> String {
    candidates
        .iter()
        .map(|product| {
            let preview: String = product
                .description
                .chars()
                .take(DESCRIPTION_PREVIEW_CHARS)
                .collect();
            format!(
                "Product ID: {}, Name: {}, Category: {}, Description: {}...",
                product.id, product.name, product.category, preview
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// System instruction for hardware chat sessions.
pub fn chat_system_instruction() -> String {
    format!(
        "Act as a professional computer consultant with expertise in both hardware and software. \
Provide accurate and up-to-date recommendations based on the latest technologies and best practices. \
Keep responses concise and answer only the question asked. \
Avoid unnecessary introductions or explanations unless explicitly requested by the user. \
If clarification is needed, ask a short follow-up question. \
Anything not related to computers respond with '{OFF_TOPIC_REPLY}'"
    )
}
