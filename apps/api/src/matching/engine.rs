//! AI engine. Decides once, at startup, whether matching talks to the LLM or
//! runs the simulation, and owns the injected `TextGenerator`.
//!
//! All public matching operations take an `&AiEngine`. Fallible inner steps
//! return `Result<_, AiError>`; each operation converts an error into its
//! simulated result in exactly one place.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::llm_client::json_extract::ExtractError;
use crate::llm_client::{GeminiClient, Generation, LlmError, TextGenerator};

/// Why the engine is not calling the LLM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationReason {
    /// `USE_AI_SIMULATION` is set.
    Forced,
    MissingApiKey,
    ClientInitFailed,
}

impl fmt::Display for SimulationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationReason::Forced => f.write_str("USE_AI_SIMULATION is set"),
            SimulationReason::MissingApiKey => f.write_str("GEMINI_API_KEY is not set"),
            SimulationReason::ClientInitFailed => f.write_str("Gemini client failed to initialize"),
        }
    }
}

#[derive(Clone)]
enum Backend {
    Live(Arc<dyn TextGenerator>),
    Simulated(SimulationReason),
}

/// Failure of one live AI step. The `Display` text is what the simulation
/// embeds in its output so testers can see why the fallback ran.
#[derive(Debug, Error)]
pub enum AiError {
    #[error("API call/processing error: {0}")]
    Upstream(#[from] LlmError),

    #[error("API JSON parsing error: {0}")]
    Parse(#[from] ExtractError),

    #[error("API JSON parsing error: unexpected response shape: {0}")]
    Schema(#[source] serde_json::Error),

    #[error("API call/processing error: failed to build prompt: {0}")]
    Prompt(#[source] serde_json::Error),

    #[error("API call/processing error: response blocked by safety settings ({0})")]
    Blocked(String),
}

#[derive(Clone)]
pub struct AiEngine {
    backend: Backend,
}

impl AiEngine {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            backend: Backend::Live(generator),
        }
    }

    pub fn simulated(reason: SimulationReason) -> Self {
        Self {
            backend: Backend::Simulated(reason),
        }
    }

    /// Builds the engine from startup configuration. Configuration problems
    /// are logged here once; every later call silently simulates.
    pub fn from_config(config: &Config) -> Self {
        if config.use_ai_simulation {
            info!("USE_AI_SIMULATION is set. AI calls will be simulated.");
            return Self::simulated(SimulationReason::Forced);
        }

        let Some(api_key) = config.gemini_api_key.clone() else {
            warn!("GEMINI_API_KEY not set. AI features will be simulated.");
            return Self::simulated(SimulationReason::MissingApiKey);
        };

        match GeminiClient::new(
            api_key,
            config.gemini_model.clone(),
            config.gemini_api_base.clone(),
        ) {
            Ok(client) => {
                info!("Gemini client configured (model: {})", config.gemini_model);
                Self::new(Arc::new(client))
            }
            Err(e) => {
                warn!("Could not configure Gemini client: {e}. AI features will be simulated.");
                Self::simulated(SimulationReason::ClientInitFailed)
            }
        }
    }

    pub fn is_simulated(&self) -> bool {
        matches!(self.backend, Backend::Simulated(_))
    }

    pub fn simulation_reason(&self) -> Option<SimulationReason> {
        match self.backend {
            Backend::Simulated(reason) => Some(reason),
            Backend::Live(_) => None,
        }
    }

    /// Model label for logs and health output.
    pub fn backend_label(&self) -> String {
        match &self.backend {
            Backend::Live(generator) => generator.model_name().to_string(),
            Backend::Simulated(_) => "simulation".to_string(),
        }
    }

    /// The live generator, or `None` when simulating (logged with the reason).
    pub(crate) fn generator(&self, task: &str) -> Option<&dyn TextGenerator> {
        match &self.backend {
            Backend::Live(generator) => Some(generator.as_ref()),
            Backend::Simulated(reason) => {
                info!("Using simulated {task} ({reason})");
                None
            }
        }
    }
}

/// Sends one prompt and returns the raw generation.
pub(crate) async fn generate(
    generator: &dyn TextGenerator,
    task: &str,
    prompt: &str,
) -> Result<Generation, AiError> {
    info!("Sending prompt to {} for {task}", generator.model_name());
    let generation = generator.generate_content(prompt).await?;
    debug!(
        "Raw {task} response (blocked: {}): {:?}",
        generation.is_blocked(),
        generation.text()
    );
    Ok(generation)
}

/// Sends one prompt and requires a text completion.
pub(crate) async fn generate_text(
    generator: &dyn TextGenerator,
    task: &str,
    prompt: &str,
) -> Result<String, AiError> {
    let generation = generate(generator, task, prompt).await?;
    match generation {
        Generation {
            text: Some(text), ..
        } => Ok(text),
        Generation {
            block_reason: Some(reason),
            ..
        } => Err(AiError::Blocked(reason)),
        _ => Err(AiError::Upstream(LlmError::EmptyContent)),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory `TextGenerator` for exercising the live code paths.

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::llm_client::{Generation, LlmError, TextGenerator};

    pub enum Reply {
        Text(String),
        Blocked(String),
        Fail,
    }

    pub struct FakeGenerator {
        reply: Reply,
        calls: AtomicUsize,
        prompts: Mutex<Vec<String>>,
    }

    impl FakeGenerator {
        pub fn text(text: &str) -> Self {
            Self::with(Reply::Text(text.to_string()))
        }

        pub fn blocked(reason: &str) -> Self {
            Self::with(Reply::Blocked(reason.to_string()))
        }

        pub fn failing() -> Self {
            Self::with(Reply::Fail)
        }

        fn with(reply: Reply) -> Self {
            Self {
                reply,
                calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn last_prompt(&self) -> Option<String> {
            self.prompts.lock().unwrap().last().cloned()
        }
    }

    #[async_trait]
    impl TextGenerator for FakeGenerator {
        async fn generate_content(&self, prompt: &str) -> Result<Generation, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(prompt.to_string());
            match &self.reply {
                Reply::Text(text) => Ok(Generation {
                    text: Some(text.clone()),
                    block_reason: None,
                }),
                Reply::Blocked(reason) => Ok(Generation {
                    text: None,
                    block_reason: Some(reason.clone()),
                }),
                Reply::Fail => Err(LlmError::Api {
                    status: 503,
                    message: "model overloaded".to_string(),
                }),
            }
        }

        fn model_name(&self) -> &str {
            "fake-model"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::FakeGenerator;
    use super::*;

    fn config(use_ai_simulation: bool, gemini_api_key: Option<&str>) -> Config {
        Config {
            gemini_api_key: gemini_api_key.map(String::from),
            use_ai_simulation,
            ..Config::for_tests()
        }
    }

    #[test]
    fn test_simulation_flag_wins_over_api_key() {
        let engine = AiEngine::from_config(&config(true, Some("key")));
        assert!(engine.is_simulated());
        assert_eq!(engine.simulation_reason(), Some(SimulationReason::Forced));
    }

    #[test]
    fn test_missing_api_key_simulates() {
        let engine = AiEngine::from_config(&config(false, None));
        assert_eq!(
            engine.simulation_reason(),
            Some(SimulationReason::MissingApiKey)
        );
        assert_eq!(engine.backend_label(), "simulation");
    }

    #[test]
    fn test_api_key_builds_live_engine() {
        let engine = AiEngine::from_config(&config(false, Some("key")));
        assert!(!engine.is_simulated());
        assert_eq!(engine.backend_label(), crate::llm_client::DEFAULT_MODEL);
    }

    #[tokio::test]
    async fn test_generate_text_maps_block_to_error() {
        let fake = FakeGenerator::blocked("SAFETY");
        let err = generate_text(&fake, "profile extraction", "prompt")
            .await
            .unwrap_err();
        assert!(matches!(err, AiError::Blocked(ref r) if r == "SAFETY"));
    }

    #[tokio::test]
    async fn test_upstream_error_message_prefix() {
        let fake = FakeGenerator::failing();
        let err = generate_text(&fake, "job matching", "prompt")
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("API call/processing error:"));
        assert_eq!(fake.calls(), 1);
    }
}
