// Library root - Real-time telemetry acquisition and windowing
pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;
