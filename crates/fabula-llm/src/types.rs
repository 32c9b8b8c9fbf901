/// Provider-independent text generation request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationRequest {
    /// Instruction that frames every answer (system prompt)
    pub system_instruction: Option<String>,
    /// The user prompt
    pub prompt: String,
    /// Upper bound on generated tokens
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: Option<f64>,
    /// Identifier of an earlier response to continue from
    pub previous_response_id: Option<String>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            prompt: prompt.into(),
            max_tokens,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    #[must_use]
    pub const fn with_temperature(mut self, temperature: Option<f64>) -> Self {
        self.temperature = temperature;
        self
    }

    #[must_use]
    pub fn with_previous_response_id(mut self, id: Option<String>) -> Self {
        self.previous_response_id = id;
        self
    }
}

/// Generated text plus the provider's response identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    pub text: String,
    /// Present when the provider supports conversation chaining
    pub response_id: Option<String>,
}
