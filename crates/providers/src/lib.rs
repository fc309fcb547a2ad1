//! Local model backends for the generative response engine.

pub mod backend;
pub mod ollama;

pub use backend::{GenerationParams, ModelBackend, ModelSession};
pub use ollama::OllamaBackend;
