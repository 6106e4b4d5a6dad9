// Application layer - Session lifecycle, windowing and projections
pub mod history_source;
pub mod metrics_projection;
pub mod session;
pub mod window_buffer;
