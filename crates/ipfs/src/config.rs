use {
    serde::{Deserialize, Deserializer},
    std::time::Duration,
    url::Url,
};

/// Secrets should not end up in configuration files that are checked in. An
/// API key starting with `%` names the environment variable holding the
/// actual key.
fn deserialize_api_key<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw_api_key) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let Some(env_var_name) = raw_api_key.strip_prefix('%') else {
        return Ok(Some(raw_api_key));
    };
    let env_var_contents = std::env::var(env_var_name).map_err(|err| {
        tracing::error!(%err, %env_var_name, "failed to load env var");
        serde::de::Error::invalid_value(
            serde::de::Unexpected::Str(env_var_name),
            &"expected environment variable to be available",
        )
    })?;
    Ok(Some(env_var_contents))
}

fn default_api_url() -> Url {
    Url::parse(crate::NftStorage::DEFAULT_URL).expect("default URL is valid")
}

#[derive(Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct IpfsConfig {
    /// Base URL of the nft.storage compatible pinning API.
    #[serde(default = "default_api_url")]
    pub api_url: Url,

    /// Bearer token for the pinning API.
    #[serde(default, deserialize_with = "deserialize_api_key")]
    pub api_key: Option<String>,

    /// Overrides the HTTP timeout given on the command line.
    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,
}

impl Default for IpfsConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_key: None,
            timeout: None,
        }
    }
}

impl std::fmt::Debug for IpfsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("IpfsConfig")
            .field("api_url", &self.api_url.as_str())
            .field("api_key", &self.api_key.as_ref().map(|_| "SECRET"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_full() {
        let toml = r#"
        api-url = "http://localhost:8080/"
        api-key = "my-secret-key"
        timeout = "30s"
        "#;
        let config: IpfsConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.api_url.as_str(), "http://localhost:8080/");
        assert_eq!(config.api_key.as_deref(), Some("my-secret-key"));
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn deserialize_defaults() {
        let config: IpfsConfig = toml::from_str("").unwrap();
        assert_eq!(config.api_url.as_str(), "https://api.nft.storage/");
        assert_eq!(config.api_key, None);
        assert_eq!(config.timeout, None);
    }

    #[test]
    fn deserialize_api_key_from_env() {
        let env_var_name = "TEST_NFT_STORAGE_API_KEY_SECRET";
        let env_var_value = "my-secret-from-env";
        // SAFETY: no other threads access this env var.
        unsafe { std::env::set_var(env_var_name, env_var_value) };

        let toml = format!(r#"api-key = "%{env_var_name}""#);
        let config: IpfsConfig = toml::from_str(&toml).unwrap();
        assert_eq!(config.api_key.as_deref(), Some(env_var_value));

        // SAFETY: no other threads access this env var.
        unsafe { std::env::remove_var(env_var_name) };
    }

    #[test]
    fn missing_env_var_is_an_error() {
        let toml = r#"api-key = "%TEST_NFT_STORAGE_API_KEY_THAT_IS_NOT_SET""#;
        assert!(toml::from_str::<IpfsConfig>(toml).is_err());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(toml::from_str::<IpfsConfig>(r#"gateway = "https://ipfs.io""#).is_err());
    }

    #[test]
    fn debug_hides_the_key() {
        let config = IpfsConfig {
            api_key: Some("hunter2".to_owned()),
            ..Default::default()
        };
        assert!(!format!("{config:?}").contains("hunter2"));
    }
}
