mod assistant;
mod parsing;

pub use assistant::HardwareAssistant;
pub use parsing::parse_product_ids;

#[cfg(test)]
pub(crate) use assistant::testing;
