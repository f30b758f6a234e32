// Domain layer - Readings, chart shaping and render models
pub mod granularity;
pub mod reading;
pub mod render;
pub mod sampler;
pub mod summary;
pub mod tank;
pub mod thresholds;
pub mod ticks;
