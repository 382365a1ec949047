//! Infrastructure layer - network access and venue adapters

pub mod exchanges;
pub mod http;
