use std::path::Path;

use secrecy::ExposeSecret;

use crate::Config;

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        let config = Self::parse(&raw)?;

        tracing::debug!(path = %path.display(), "configuration loaded");

        Ok(config)
    }

    /// Parse and validate configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if expansion, parsing, or validation fails
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error if no voice token or Deepgram key is configured,
    /// or if chunking and timeout settings are unusable
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_auth_config()?;
        self.validate_tts_config()?;
        self.validate_server_config()?;
        Ok(())
    }

    fn validate_auth_config(&self) -> anyhow::Result<()> {
        if self.auth.voice_tokens.is_empty() {
            anyhow::bail!("auth.voice_tokens must contain at least one token");
        }

        if self.auth.voice_tokens.iter().any(|t| t.expose_secret().trim().is_empty()) {
            anyhow::bail!("auth.voice_tokens must not contain empty tokens");
        }

        if let Some(path) = self.auth.public_paths.iter().find(|p| !p.starts_with('/')) {
            anyhow::bail!("auth.public_paths entry '{path}' must start with '/'");
        }

        if self.auth.public_paths.iter().any(|p| p.trim_end_matches('/').is_empty()) {
            anyhow::bail!("auth.public_paths must not contain '/', it would expose every route");
        }

        Ok(())
    }

    fn validate_tts_config(&self) -> anyhow::Result<()> {
        let has_key = self
            .tts
            .deepgram
            .api_key
            .as_ref()
            .is_some_and(|key| !key.expose_secret().trim().is_empty());

        if !has_key {
            anyhow::bail!("tts.deepgram.api_key is required");
        }

        if self.tts.max_chunk_chars == 0 {
            anyhow::bail!("tts.max_chunk_chars must be greater than 0");
        }

        if self.tts.timeout.is_zero() {
            anyhow::bail!("tts.timeout must be greater than 0");
        }

        if self.tts.connect_timeout.is_zero() {
            anyhow::bail!("tts.connect_timeout must be greater than 0");
        }

        Ok(())
    }

    fn validate_server_config(&self) -> anyhow::Result<()> {
        let health = &self.server.health;

        if health.enabled && !health.path.starts_with('/') {
            anyhow::bail!("server.health.path must start with '/'");
        }

        Ok(())
    }
}
