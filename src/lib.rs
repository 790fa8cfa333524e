pub mod configuration;
pub mod controller;
pub mod domain;
pub mod submission;
pub mod telemetry;
pub mod utils;
