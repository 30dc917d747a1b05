//! Core domain types for mock definitions.

pub mod method;
pub mod origin;
pub mod reply;
pub mod spec;
