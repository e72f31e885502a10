mod api;
pub mod prompts;
mod provider;

pub use api::GeminiClient;
pub use provider::{
    Content, GenerateRequest, GenerationOptions, GenerativeBackend, Part, RemoteFile,
};
