//! Credential lookup — provider name → API key.
//!
//! Keys come from per-provider overrides (usually the config file) first,
//! then from the provider's environment variable. Empty values are treated
//! as absent.

use std::collections::HashMap;

/// Environment variable holding the key for `provider`.
///
/// `stub` needs none; `openai` uses `OPENAI_API_KEY`; any other provider
/// uses `<PROVIDER>_API_KEY` upper-cased with `-` mapped to `_`.
pub fn env_var_for(provider: &str) -> Option<String> {
    match provider {
        "stub" => None,
        "openai" => Some("OPENAI_API_KEY".into()),
        other => Some(format!("{}_API_KEY", other.to_uppercase().replace('-', "_"))),
    }
}

/// Resolves API keys for providers.
#[derive(Clone)]
pub struct Credentials {
    overrides: HashMap<String, String>,
    read_env: bool,
}

impl Credentials {
    /// Overrides empty; falls back to the environment.
    pub fn new() -> Self {
        Self {
            overrides: HashMap::new(),
            read_env: true,
        }
    }

    /// Set a key for one provider.
    pub fn with_key(mut self, provider: impl Into<String>, key: impl Into<String>) -> Self {
        self.overrides.insert(provider.into(), key.into());
        self
    }

    /// Merge in a provider → key map.
    pub fn with_overrides(mut self, keys: HashMap<String, String>) -> Self {
        self.overrides.extend(keys);
        self
    }

    /// Never consult the environment.
    pub fn without_env(mut self) -> Self {
        self.read_env = false;
        self
    }

    /// The key for `provider`, if any.
    pub fn resolve(&self, provider: &str) -> Option<String> {
        self.resolve_with(provider, |var| std::env::var(var).ok())
    }

    /// Like [`resolve`](Self::resolve) with a custom environment lookup.
    pub fn resolve_with(
        &self,
        provider: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Option<String> {
        if let Some(key) = self.overrides.get(provider).filter(|k| !k.is_empty()) {
            return Some(key.clone());
        }
        if !self.read_env {
            return None;
        }
        env_var_for(provider)
            .and_then(|var| lookup(&var))
            .filter(|k| !k.is_empty())
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut providers: Vec<&str> = self.overrides.keys().map(|s| s.as_str()).collect();
        providers.sort_unstable();
        f.debug_struct("Credentials")
            .field("overrides", &providers)
            .field("read_env", &self.read_env)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_with(var: &'static str, value: &'static str) -> impl Fn(&str) -> Option<String> {
        move |k| (k == var).then(|| value.to_string())
    }

    #[test]
    fn env_var_names() {
        assert_eq!(env_var_for("stub"), None);
        assert_eq!(env_var_for("openai").as_deref(), Some("OPENAI_API_KEY"));
        assert_eq!(env_var_for("groq").as_deref(), Some("GROQ_API_KEY"));
        assert_eq!(env_var_for("my-proxy").as_deref(), Some("MY_PROXY_API_KEY"));
    }

    #[test]
    fn env_fallback() {
        let creds = Credentials::new();
        let key = creds.resolve_with("openai", env_with("OPENAI_API_KEY", "sk-env"));
        assert_eq!(key.as_deref(), Some("sk-env"));
    }

    #[test]
    fn override_wins_over_env() {
        let creds = Credentials::new().with_key("openai", "sk-config");
        let key = creds.resolve_with("openai", env_with("OPENAI_API_KEY", "sk-env"));
        assert_eq!(key.as_deref(), Some("sk-config"));
    }

    #[test]
    fn empty_values_are_absent() {
        let creds = Credentials::new().with_key("openai", "");
        assert_eq!(creds.resolve_with("openai", env_with("OPENAI_API_KEY", "")), None);
    }

    #[test]
    fn stub_never_reads_env() {
        let creds = Credentials::new();
        assert_eq!(creds.resolve_with("stub", |_| Some("leak".into())), None);
    }

    #[test]
    fn without_env_ignores_environment() {
        let creds = Credentials::new().without_env();
        assert_eq!(
            creds.resolve_with("openai", env_with("OPENAI_API_KEY", "sk-env")),
            None
        );
    }

    #[test]
    fn debug_redacts_keys() {
        let creds = Credentials::new().with_key("openai", "sk-secret-value");
        let debug = format!("{creds:?}");
        assert!(!debug.contains("sk-secret-value"));
        assert!(debug.contains("openai"));
    }
}
