//! Replies from a local text-generation model.
//!
//! The model session is loaded lazily and kept for the lifetime of the
//! engine. A failed load is remembered and retried on the next call. All
//! generation goes through one async mutex, so calls are serialized.

use super::ResponseEngine;
use crate::postprocess::postprocess;
use async_trait::async_trait;
use providers::{GenerationParams, ModelBackend, ModelSession};
use shared::AssistantError;
use std::sync::Arc;
use tokio::sync::Mutex;

pub const LOAD_FAILED_REPLY: &str =
    "Entschuldigung, ich konnte das Sprachmodell nicht laden. Ich verwende stattdessen einfache Antworten.";
pub const GENERATION_FAILED_REPLY: &str =
    "Entschuldigung, bei der Generierung der Antwort ist ein Fehler aufgetreten.";

const PERSONA: &str = "Du bist ein intelligenter deutscher Assistent. \
Deine Antworten sind immer klar, präzise und bleiben strikt beim Thema. \
Du antwortest ausschließlich auf Deutsch, ohne Sprachmischung. \
Deine Antworten sind kurz, direkt und hilfreich. \
Du wiederholst dich nicht und sprichst nicht über Themen, die nicht angefragt wurden. ";

/// Lifecycle of the model session
enum ModelState {
    Uninitialized,
    Ready(Box<dyn ModelSession>),
    Failed(String),
}

impl ModelState {
    fn label(&self) -> &'static str {
        match self {
            ModelState::Uninitialized => "uninitialized",
            ModelState::Ready(_) => "ready",
            ModelState::Failed(_) => "failed",
        }
    }
}

pub struct GenerativeEngine {
    backend: Arc<dyn ModelBackend>,
    state: Mutex<ModelState>,
    params: GenerationParams,
    history_turns: usize,
}

impl GenerativeEngine {
    pub fn new(backend: Arc<dyn ModelBackend>) -> Self {
        Self {
            backend,
            state: Mutex::new(ModelState::Uninitialized),
            params: GenerationParams::default(),
            history_turns: 0,
        }
    }

    /// Feed the last `turns` history lines into the prompt. Zero keeps the
    /// prompt limited to the latest input.
    pub fn with_history_turns(mut self, turns: usize) -> Self {
        self.history_turns = turns;
        self
    }

    pub fn params(&self) -> &GenerationParams {
        &self.params
    }

    /// Load the model now unless it is already loaded.
    pub async fn ensure_loaded(&self) -> Result<(), AssistantError> {
        let mut state = self.state.lock().await;
        Self::load_into(&*self.backend, &mut state).await
    }

    pub async fn is_loaded(&self) -> bool {
        matches!(*self.state.lock().await, ModelState::Ready(_))
    }

    async fn load_into(
        backend: &dyn ModelBackend,
        state: &mut ModelState,
    ) -> Result<(), AssistantError> {
        if let ModelState::Ready(_) = state {
            return Ok(());
        }
        if let ModelState::Failed(reason) = state {
            tracing::debug!("retrying model load after earlier failure: {}", reason);
        }

        tracing::info!(backend = backend.name(), "loading local model");
        match backend.load().await {
            Ok(session) => {
                tracing::info!("model loaded: {}", session.describe());
                *state = ModelState::Ready(session);
                Ok(())
            }
            Err(e) => {
                let reason = e.to_string();
                tracing::warn!("error loading model: {}", reason);
                *state = ModelState::Failed(reason.clone());
                Err(AssistantError::ModelLoad(reason))
            }
        }
    }

    /// Prompt sent to the model for `text`
    pub fn build_prompt(&self, text: &str, history: &[String]) -> String {
        let mut prompt = String::from(PERSONA);
        prompt.push_str("\n\n");

        if self.history_turns > 0 {
            let start = history.len().saturating_sub(self.history_turns);
            for line in &history[start..] {
                prompt.push_str(line);
                prompt.push('\n');
            }
        }

        prompt.push_str(&format!("Benutzer: {}\nAssistent:", text));
        prompt
    }
}

#[async_trait]
impl ResponseEngine for GenerativeEngine {
    fn name(&self) -> &'static str {
        "generative"
    }

    async fn generate(&self, text: &str, history: &[String]) -> String {
        let mut state = self.state.lock().await;
        if Self::load_into(&*self.backend, &mut state).await.is_err() {
            return LOAD_FAILED_REPLY.to_string();
        }
        let ModelState::Ready(session) = &*state else {
            tracing::error!("model state is {} after successful load", state.label());
            return LOAD_FAILED_REPLY.to_string();
        };

        let prompt = self.build_prompt(text, history);
        match session.generate(&prompt, &self.params).await {
            Ok(raw) => postprocess(&raw, &prompt),
            Err(e) => {
                let err = AssistantError::Generation(e.to_string());
                tracing::error!("error generating response: {}", err);
                GENERATION_FAILED_REPLY.to_string()
            }
        }
    }
}
