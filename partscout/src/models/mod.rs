mod catalog;
mod chat;
mod hardware;

pub use catalog::*;
pub use chat::*;
pub use hardware::*;
