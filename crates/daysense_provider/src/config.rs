use crate::ProviderError;
use secrecy::SecretString;

#[derive(Clone, Debug)]
pub struct Config {
    pub access_token: SecretString,
    pub base_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ProviderError> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Testable helper that reads configuration values using the provided
    /// function. This avoids mutating global environment in tests and keeps
    /// `from_env()` small and safe.
    pub fn from_env_with<F>(mut get: F) -> Result<Self, ProviderError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let token = get("DAYSENSE_BRIDGE_TOKEN")
            .ok_or_else(|| ProviderError::Config("DAYSENSE_BRIDGE_TOKEN missing".into()))?;
        let base_url =
            get("DAYSENSE_BRIDGE_URL").unwrap_or_else(|| "http://127.0.0.1:8077".into());
        Ok(Self {
            access_token: SecretString::new(token.into()),
            base_url,
        })
    }
}
