//! Response engines behind the shared `generate(text, history)` contract.

use async_trait::async_trait;
use providers::ModelBackend;
use shared::settings::{EnginePreference, EngineSettings};
use std::sync::Arc;

pub mod generative;
pub mod rule_based;

pub use generative::GenerativeEngine;
pub use rule_based::{Category, RuleBasedEngine};

/// Produces a reply for user text. Implementations never fail: every
/// internal error is turned into a display string.
#[async_trait]
pub trait ResponseEngine: Send + Sync {
    fn name(&self) -> &'static str;

    async fn generate(&self, text: &str, history: &[String]) -> String;
}

/// Outcome of the one-time engine selection at startup
pub struct EngineSelection {
    pub engine: Arc<dyn ResponseEngine>,
    /// Set when the generative engine was wanted but could not be loaded
    pub fallback_reason: Option<String>,
}

/// Pick the engine for this session.
///
/// The generative engine is only used if its model loads now; otherwise the
/// rule-based engine takes over for the rest of the process.
pub async fn select_engine(
    settings: &EngineSettings,
    backend: Arc<dyn ModelBackend>,
) -> EngineSelection {
    if settings.preference == EnginePreference::RuleBased {
        tracing::info!("using rule-based engine (configured)");
        return EngineSelection {
            engine: Arc::new(RuleBasedEngine::new()),
            fallback_reason: None,
        };
    }

    let generative = GenerativeEngine::new(backend).with_history_turns(settings.history_turns);
    match generative.ensure_loaded().await {
        Ok(()) => {
            tracing::info!("using generative engine");
            EngineSelection {
                engine: Arc::new(generative),
                fallback_reason: None,
            }
        }
        Err(e) => {
            tracing::warn!("generative engine unavailable, falling back to rules: {}", e);
            EngineSelection {
                engine: Arc::new(RuleBasedEngine::new()),
                fallback_reason: Some(e.detail()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Result};
    use providers::{GenerationParams, ModelSession};

    struct StaticSession;

    #[async_trait]
    impl ModelSession for StaticSession {
        fn describe(&self) -> String {
            "static".into()
        }

        async fn generate(&self, _prompt: &str, _params: &GenerationParams) -> Result<String> {
            Ok("Servus aus dem Modell.".into())
        }
    }

    struct Backend {
        available: bool,
    }

    #[async_trait]
    impl ModelBackend for Backend {
        fn name(&self) -> &str {
            "test"
        }

        async fn load(&self) -> Result<Box<dyn ModelSession>> {
            if self.available {
                Ok(Box::new(StaticSession))
            } else {
                Err(anyhow!("daemon offline"))
            }
        }
    }

    fn settings(preference: EnginePreference) -> EngineSettings {
        EngineSettings {
            preference,
            ..EngineSettings::default()
        }
    }

    #[tokio::test]
    async fn test_auto_prefers_generative_when_available() {
        let selection = select_engine(
            &settings(EnginePreference::Auto),
            Arc::new(Backend { available: true }),
        )
        .await;
        assert_eq!(selection.engine.name(), "generative");
        assert!(selection.fallback_reason.is_none());
    }

    #[tokio::test]
    async fn test_falls_back_to_rules_when_model_missing() {
        let selection = select_engine(
            &settings(EnginePreference::Generative),
            Arc::new(Backend { available: false }),
        )
        .await;
        assert_eq!(selection.engine.name(), "rule_based");
        assert_eq!(selection.fallback_reason.as_deref(), Some("daemon offline"));
    }

    #[tokio::test]
    async fn test_rule_based_preference_skips_backend() {
        let selection = select_engine(
            &settings(EnginePreference::RuleBased),
            Arc::new(Backend { available: true }),
        )
        .await;
        assert_eq!(selection.engine.name(), "rule_based");
    }
}
