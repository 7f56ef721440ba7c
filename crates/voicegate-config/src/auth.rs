use secrecy::SecretString;
use serde::Deserialize;

/// Voice-token authentication configuration
///
/// Every request outside `public_paths` must carry one of `voice_tokens`
/// in the `x-voice-token` header.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// Accepted tokens
    #[serde(default)]
    pub voice_tokens: Vec<SecretString>,

    /// Path prefixes that skip authentication
    #[serde(default = "default_public_paths")]
    pub public_paths: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            voice_tokens: Vec::new(),
            public_paths: default_public_paths(),
        }
    }
}

fn default_public_paths() -> Vec<String> {
    vec!["/health".to_string()]
}
