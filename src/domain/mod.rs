// Domain layer - Plain data types shared by every other layer
pub mod command;
pub mod connection;
pub mod dashboard;
pub mod sample;
pub mod telemetry;
