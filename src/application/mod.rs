// Application layer - Aggregation use cases and collaborator traits
pub mod aggregator;
pub mod charge_aggregator;
pub mod drive_aggregator;
pub mod session_repository;
pub mod session_service;
