mod catalog;
mod hardware;

pub use catalog::{read_seed_file, seed_catalog};
pub use hardware::{
    degrade, products_in_order, ChatOutcome, HardwareService, ImageUpload, SimilarityOutcome,
};
