//! Local text-generation backends.
//!
//! A backend is loaded once into a [`ModelSession`], which then serves every
//! generation request for the lifetime of the process.

use anyhow::Result;
use async_trait::async_trait;

/// Fixed sampling parameters for one generation call
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub do_sample: bool,
    pub temperature: f32,
    pub top_p: f32,
    pub repetition_penalty: f32,
    /// Blocks repeated n-grams of this size; not every backend honours it
    pub no_repeat_ngram_size: usize,
    /// Token budget on top of the prompt length
    pub max_new_tokens: usize,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            do_sample: true,
            temperature: 0.6,
            top_p: 0.85,
            repetition_penalty: 1.5,
            no_repeat_ngram_size: 3,
            max_new_tokens: 100,
        }
    }
}

/// Something that can produce a ready model session
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Human-readable name, used in logs
    fn name(&self) -> &str;

    async fn load(&self) -> Result<Box<dyn ModelSession>>;
}

/// A loaded model bound to its runtime
#[async_trait]
pub trait ModelSession: Send + Sync {
    fn describe(&self) -> String;

    /// Raw decoded output for `prompt`. May or may not echo the prompt.
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String>;
}
