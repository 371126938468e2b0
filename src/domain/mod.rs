// Domain layer - Session types and the pure aggregation primitives
pub mod efficiency;
pub mod error;
pub mod snapshot;
pub mod summary;
pub mod truncate;
