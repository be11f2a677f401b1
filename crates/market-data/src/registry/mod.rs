//! Source registry module.
//!
//! Maps each [`ProviderId`](crate::models::ProviderId) to the
//! [`TokenDataSource`](crate::provider::TokenDataSource) that answers for it.

mod registry;

pub use registry::SourceRegistry;
