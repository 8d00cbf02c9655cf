use super::env::env_or_default;

pub const DEFAULT_API_BASE: &str = "http://localhost:11434/v1";
pub const DEFAULT_MODEL: &str = "llama2";
/// Ollama ignores the key but the client always sends one.
pub const DEFAULT_API_KEY: &str = "ollama";

/// Where the OpenAI-compatible chat completions API lives and which model to ask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmConfig {
    pub api_base: String,
    pub model: String,
    pub api_key: String,
}

impl Default for LlmConfig {
    /// A local Ollama server running llama2.
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: DEFAULT_API_KEY.to_string(),
        }
    }
}

/// Reads LLM_API_BASE, LLM_MODEL and OPENAI_API_KEY, defaulting each one independently.
pub fn get_llm_config() -> LlmConfig {
    LlmConfig {
        api_base: env_or_default("LLM_API_BASE", DEFAULT_API_BASE),
        model: env_or_default("LLM_MODEL", DEFAULT_MODEL),
        api_key: env_or_default("OPENAI_API_KEY", DEFAULT_API_KEY),
    }
}
