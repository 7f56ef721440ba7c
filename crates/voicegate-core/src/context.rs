use sha2::{Digest, Sha256};

/// Caller that passed the voice-token gate
///
/// Inserted into request extensions by the auth middleware. Only a short
/// fingerprint of the token is kept so it can appear in logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    /// First 8 hex characters of the token's SHA-256 digest
    pub fingerprint: String,
}

impl Caller {
    /// Build a caller from the raw token it presented
    pub fn from_token(token: &str) -> Self {
        let digest = Sha256::digest(token.as_bytes());
        let fingerprint = digest.iter().take(4).map(|byte| format!("{byte:02x}")).collect();

        Self { fingerprint }
    }
}
