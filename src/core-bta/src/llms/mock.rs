//! Mock LLM provider for testing
//!
//! This module provides a mock implementation of the `LlmProvider` trait
//! that can be configured to return predefined responses or errors,
//! without making real API calls. Every call is recorded so tests can
//! assert on the order agents ran in and what each one was told.

use std::{sync::Mutex, time::Duration};

use async_trait::async_trait;

use crate::{Error, llms::LlmProvider};

/// Mock LLM provider for testing
///
/// Can be configured to:
/// - Return specific responses based on the system message or prompt content
/// - Return a default response for any prompt
/// - Simulate API failures
/// - Take a while to answer
pub struct MockLlmProvider {
    /// Ordered (substring, response) pairs. The first key found in the system message, then in the prompt, wins.
    responses: Vec<(String, String)>,
    /// Default response if no specific match found
    default_response: Option<String>,
    /// If true, always return an error
    should_fail: bool,
    /// Sleep this long before answering
    delay: Option<Duration>,
    /// Every (system, prompt) pair this provider was asked to complete
    calls: Mutex<Vec<(String, String)>>,
}

impl MockLlmProvider {
    /// Create a new empty mock provider
    pub fn new() -> Self {
        Self {
            responses: Vec::new(),
            default_response: None,
            should_fail: false,
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock that returns a specific response when the system message or prompt contains the given text
    pub fn with_response(contains: &str, response: &str) -> Self {
        Self::with_responses(vec![(contains, response)])
    }

    /// Create a mock with multiple configured responses
    pub fn with_responses(responses: Vec<(&str, &str)>) -> Self {
        let mut provider = Self::new();
        for (key, response) in responses {
            provider.add_response(key, response);
        }
        provider
    }

    /// Create a mock with a default response for any prompt
    pub fn with_default(response: &str) -> Self {
        let mut provider = Self::new();
        provider.set_default(response);
        provider
    }

    /// Create a mock that always fails with an error
    pub fn with_failure() -> Self {
        let mut provider = Self::new();
        provider.set_should_fail(true);
        provider
    }

    /// Create a mock that answers each of the medical crew's agents with a short, recognizable section.
    pub fn with_medical_sections() -> Self {
        Self::with_responses(vec![
            ("Senior Medical Doctor", sample_medical_section()),
            ("Clinical Nutritionist", sample_nutrition_section()),
            ("Exercise Physiologist", sample_exercise_section()),
        ])
    }

    /// Add a response mapping to this provider
    pub fn add_response(&mut self, contains: &str, response: &str) {
        self.responses.push((contains.to_string(), response.to_string()));
    }

    /// Set the default response
    pub fn set_default(&mut self, response: &str) {
        self.default_response = Some(response.to_string());
    }

    /// Set whether this provider should fail
    pub fn set_should_fail(&mut self, should_fail: bool) {
        self.should_fail = should_fail;
    }

    /// Make every call wait before answering
    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = Some(delay);
    }

    /// All (system, prompt) pairs received so far, in call order.
    pub fn calls(&self) -> Vec<(String, String)> {
        match self.calls.lock() {
            Ok(calls) => calls.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn record(&self, system: &str, prompt: &str) {
        let mut calls = match self.calls.lock() {
            Ok(calls) => calls,
            Err(poisoned) => poisoned.into_inner(),
        };
        calls.push((system.to_string(), prompt.to_string()));
    }
}

impl Default for MockLlmProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmProvider for MockLlmProvider {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, Error> {
        self.record(system, prompt);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.should_fail {
            return Err(Error::ProviderFailure("Mock LLM provider configured to fail".to_string()));
        }

        for (key, response) in &self.responses {
            if system.contains(key) || prompt.contains(key) {
                return Ok(response.clone());
            }
        }

        if let Some(default) = &self.default_response {
            return Ok(default.clone());
        }

        Err(Error::ProviderFailure(
            "Mock LLM provider has no response configured for this prompt".to_string(),
        ))
    }
}

//
// Test Fixtures
//

pub fn sample_medical_section() -> &'static str {
    "Hemoglobin is below the reference range, which suggests mild anemia. Total cholesterol is elevated."
}

pub fn sample_nutrition_section() -> &'static str {
    "Increase iron-rich foods such as lentils and spinach. Reduce saturated fat."
}

pub fn sample_exercise_section() -> &'static str {
    "Start with 20 minutes of brisk walking five days a week and build up gradually."
}
