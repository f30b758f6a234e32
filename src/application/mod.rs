// Application layer - Use cases and the chart pipeline
pub mod chart_service;
pub mod pipeline;
pub mod reading_repository;
pub mod streaming_service;
pub mod tank_service;
