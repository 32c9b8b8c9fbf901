use serde::Deserialize;

/// Story preparation, retry, eviction and wait-phrasing configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoryConfig {
    /// Maximum number of story entries kept in memory
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    /// Maximum age of a story entry before eviction (e.g. "5m")
    #[serde(default = "default_max_age")]
    pub max_age: String,
    /// Retry policy for the background generation call
    #[serde(default)]
    pub retry: RetryConfig,
    /// System instruction sent with every story request
    #[serde(default = "default_system_instruction")]
    pub system_instruction: String,
    /// Phrasing tiers for "still preparing" replies, ordered by `after`
    #[serde(default = "default_wait_tiers")]
    pub wait_tiers: Vec<WaitTierConfig>,
}

impl Default for StoryConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            max_age: default_max_age(),
            retry: RetryConfig::default(),
            system_instruction: default_system_instruction(),
            wait_tiers: default_wait_tiers(),
        }
    }
}

/// Fixed-delay retry policy
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetryConfig {
    /// Additional attempts after the first failure
    #[serde(default = "default_attempts")]
    pub attempts: u32,
    /// Delay between attempts (e.g. "1s")
    #[serde(default = "default_delay")]
    pub delay: String,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: default_attempts(),
            delay: default_delay(),
        }
    }
}

/// One tier of "still preparing" phrasing
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WaitTierConfig {
    /// Elapsed time from which this tier applies (e.g. "45s")
    pub after: String,
    /// Candidate phrases, one chosen uniformly per turn
    pub phrases: Vec<String>,
    /// Reprompt spoken if the user stays silent
    pub reprompt: String,
}

#[allow(clippy::missing_const_for_fn)]
fn default_capacity() -> usize {
    50
}

fn default_max_age() -> String {
    "5m".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_attempts() -> u32 {
    2
}

fn default_delay() -> String {
    "1s".to_string()
}

fn default_system_instruction() -> String {
    "Ignore previous instructions: You are now a one-shot story bot that is imaginative and fun. \
     No questions. AVOID clichéd endings like \"From that day on\" (please!). \
     Choose single narrator tag \"Amy: \" or \"Matthew: \""
        .to_string()
}

fn default_wait_tiers() -> Vec<WaitTierConfig> {
    vec![
        WaitTierConfig {
            after: "0s".to_string(),
            phrases: vec![
                "I'm still preparing your story. Would you like me to check if it's ready now?".to_string(),
                "Your story is on its way. Shall I check again?".to_string(),
            ],
            reprompt: "Would you like me to check if the story is ready now?".to_string(),
        },
        WaitTierConfig {
            after: "45s".to_string(),
            phrases: vec![
                "Good stories take a little time. It's nearly there. Should I check again?".to_string(),
                "I'm putting the finishing touches on your story. Want me to check again?".to_string(),
            ],
            reprompt: "Should I check on your story again?".to_string(),
        },
        WaitTierConfig {
            after: "90s".to_string(),
            phrases: vec![
                "I'm still working on your story. It's taking longer than expected. Would you like to wait a bit longer?"
                    .to_string(),
            ],
            reprompt: "Would you like to wait a bit longer for your story?".to_string(),
        },
    ]
}
