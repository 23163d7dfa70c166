use std::fmt;

use thiserror::Error;

use crate::shared::constants::{
    DEFAULT_RECOGNITION_MODEL, ENDPOINT_ENV, PERSON_GROUP_ID_ENV, SUBSCRIPTION_KEY_ENV,
};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not defined in the environment")]
    Missing(&'static str),
    #[error("{0} is defined but empty")]
    Empty(&'static str),
}

/// Connection settings for the face recognition service.
///
/// Built once at startup and handed to the client constructor.
#[derive(Clone, PartialEq, Eq)]
pub struct FaceApiConfig {
    pub endpoint: String,
    pub subscription_key: String,
    pub person_group_id: String,
    pub recognition_model: String,
}

impl FaceApiConfig {
    pub fn new(
        endpoint: impl Into<String>,
        subscription_key: impl Into<String>,
        person_group_id: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            subscription_key: subscription_key.into(),
            person_group_id: person_group_id.into(),
            recognition_model: DEFAULT_RECOGNITION_MODEL.to_string(),
        }
    }

    pub fn with_recognition_model(mut self, model: impl Into<String>) -> Self {
        self.recognition_model = model.into();
        self
    }

    pub fn with_person_group_id(mut self, person_group_id: impl Into<String>) -> Self {
        self.person_group_id = person_group_id.into();
        self
    }

    /// Reads `FACE_ENDPOINT`, `FACE_SUBSCRIPTION_KEY` and `FACE_PERSON_GROUP_ID`
    /// from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`FaceApiConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |name: &'static str| -> Result<String, ConfigError> {
            let value = lookup(name).ok_or(ConfigError::Missing(name))?;
            if value.trim().is_empty() {
                return Err(ConfigError::Empty(name));
            }
            Ok(value.trim().to_string())
        };

        Ok(Self::new(
            require(ENDPOINT_ENV)?,
            require(SUBSCRIPTION_KEY_ENV)?,
            require(PERSON_GROUP_ID_ENV)?,
        ))
    }
}

impl fmt::Debug for FaceApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FaceApiConfig")
            .field("endpoint", &self.endpoint)
            .field("subscription_key", &"<redacted>")
            .field("person_group_id", &self.person_group_id)
            .field("recognition_model", &self.recognition_model)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn load(vars: &HashMap<String, String>) -> Result<FaceApiConfig, ConfigError> {
        FaceApiConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_from_lookup_reads_all_variables() {
        let vars = env(&[
            (ENDPOINT_ENV, "https://example.cognitiveservices.azure.com/"),
            (SUBSCRIPTION_KEY_ENV, "secret"),
            (PERSON_GROUP_ID_ENV, "lab-group"),
        ]);
        let config = load(&vars).unwrap();
        assert_eq!(config.endpoint, "https://example.cognitiveservices.azure.com");
        assert_eq!(config.subscription_key, "secret");
        assert_eq!(config.person_group_id, "lab-group");
        assert_eq!(config.recognition_model, DEFAULT_RECOGNITION_MODEL);
    }

    #[test]
    fn test_missing_variable_is_named() {
        let vars = env(&[(ENDPOINT_ENV, "https://example"), (PERSON_GROUP_ID_ENV, "g")]);
        assert_eq!(load(&vars), Err(ConfigError::Missing(SUBSCRIPTION_KEY_ENV)));
    }

    #[test]
    fn test_blank_variable_is_rejected() {
        let vars = env(&[
            (ENDPOINT_ENV, "https://example"),
            (SUBSCRIPTION_KEY_ENV, "secret"),
            (PERSON_GROUP_ID_ENV, "   "),
        ]);
        assert_eq!(load(&vars), Err(ConfigError::Empty(PERSON_GROUP_ID_ENV)));
    }

    #[test]
    fn test_builders_override_fields() {
        let config = FaceApiConfig::new("https://example", "k", "a")
            .with_person_group_id("b")
            .with_recognition_model("recognition_04");
        assert_eq!(config.person_group_id, "b");
        assert_eq!(config.recognition_model, "recognition_04");
    }

    #[test]
    fn test_debug_redacts_subscription_key() {
        let config = FaceApiConfig::new("https://example", "super-secret", "g");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
