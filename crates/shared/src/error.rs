//! Error taxonomy for the assistant core.
//!
//! None of these are fatal. Each one is logged where it happens and turned
//! into a display string before it reaches the host.

/// Failures that can occur below the public engine/action contracts
#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    #[error("Model could not be loaded: {0}")]
    ModelLoad(String),

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("Action on '{target}' failed: {source}")]
    Action {
        target: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Settings error: {0}")]
    Settings(String),
}

impl AssistantError {
    pub fn action(target: impl Into<String>, source: std::io::Error) -> Self {
        AssistantError::Action {
            target: target.into(),
            source,
        }
    }

    /// Inner message without the variant prefix, for user-facing strings
    pub fn detail(&self) -> String {
        match self {
            AssistantError::ModelLoad(msg)
            | AssistantError::Generation(msg)
            | AssistantError::Settings(msg) => msg.clone(),
            AssistantError::Action { source, .. } => source.to_string(),
        }
    }
}
