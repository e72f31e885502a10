mod chats;
mod identifications;
mod products;
mod similarity_searches;

pub use chats::ChatRepository;
pub use identifications::IdentificationRepository;
pub use products::ProductRepository;
pub use similarity_searches::SimilaritySearchRepository;
