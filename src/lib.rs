// Library root: exposes internals for integration tests.
// The binary entry point is src/main.rs.

pub mod engine;
pub mod error;
pub mod launcher;
pub mod logger;
pub mod settings;
