mod errors;
mod schema;
mod types;

pub use errors::{HardwareError, HardwareErrorCode};
pub use schema::{build_schema, MutationRoot, PartscoutSchema, QueryRoot};
