pub mod command;
pub mod error;
pub mod history;

pub use command::Command;
pub use error::AssistantError;
pub use history::ChatHistory;

pub mod settings {
    use serde::{Deserialize, Serialize};

    fn default_history_limit() -> usize {
        20
    }

    fn default_timeout() -> Option<u64> {
        Some(120)
    }

    fn default_search_url() -> String {
        "https://www.google.com/search?q=".into()
    }

    /// Which response engine the host should try to use
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
    #[serde(rename_all = "snake_case")]
    pub enum EnginePreference {
        /// Generative if the local model loads, rule-based otherwise
        #[default]
        Auto,
        RuleBased,
        Generative,
    }

    impl EnginePreference {
        pub fn parse(value: &str) -> Option<Self> {
            match value.trim().to_lowercase().as_str() {
                "auto" => Some(EnginePreference::Auto),
                "rule_based" | "rules" | "simple" => Some(EnginePreference::RuleBased),
                "generative" | "local" | "model" => Some(EnginePreference::Generative),
                _ => None,
            }
        }
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct EngineSettings {
        pub preference: EnginePreference,
        pub local_model: String, // e.g., "llama3.2:3b" for Ollama
        /// Base URL of the local model daemon; `None` means the default loopback address
        #[serde(default)]
        pub base_url: Option<String>,
        /// How many history lines to feed into the generative prompt (0 = latest input only)
        #[serde(default)]
        pub history_turns: usize,
    }

    impl Default for EngineSettings {
        fn default() -> Self {
            Self {
                preference: EnginePreference::Auto,
                local_model: "llama3.2:3b".into(),
                base_url: None,
                history_turns: 0,
            }
        }
    }

    /// Cosmetic pause before a reply is shown
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ThinkingDelaySettings {
        pub min_ms: u64,
        pub max_ms: u64,
    }

    impl Default for ThinkingDelaySettings {
        fn default() -> Self {
            Self {
                min_ms: 500,
                max_ms: 2000,
            }
        }
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct AppSettings {
        #[serde(default)]
        pub engine: EngineSettings,
        #[serde(default = "default_history_limit")]
        pub history_limit: usize,
        #[serde(default)]
        pub thinking_delay: ThinkingDelaySettings,
        /// Seconds before a pending reply is abandoned; `None` waits forever
        #[serde(default = "default_timeout")]
        pub response_timeout_secs: Option<u64>,
        #[serde(default = "default_search_url")]
        pub search_url: String,
    }

    impl Default for AppSettings {
        fn default() -> Self {
            Self {
                engine: EngineSettings::default(),
                history_limit: default_history_limit(),
                thinking_delay: ThinkingDelaySettings::default(),
                response_timeout_secs: default_timeout(),
                search_url: default_search_url(),
            }
        }
    }
}
