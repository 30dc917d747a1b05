//! Configuration loading: settings files and seed mock files.

pub mod error;
pub mod parser;
pub mod settings;
