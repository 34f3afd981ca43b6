use std::env;

pub const DEFAULT_CONTAINER_KEY: &str = "container";
pub const DEFAULT_LOGGER_KEY: &str = "logger";

/// Container-wide settings, shared by a root container and all of its children.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContainerConfig {
    /// Dependency name that resolves to the container itself.
    pub container_key: String,
    /// Name under which the logging collaborator is looked up.
    pub logger_key: String,
    pub warn_on_missing: bool,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            container_key: DEFAULT_CONTAINER_KEY.to_string(),
            logger_key: DEFAULT_LOGGER_KEY.to_string(),
            warn_on_missing: true,
        }
    }
}

impl ContainerConfig {
    /// Defaults, overridden by `INJECTA_CONTAINER_KEY`, `INJECTA_LOGGER_KEY`
    /// and `INJECTA_WARN_ON_MISSING` when set.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(key) = lookup("INJECTA_CONTAINER_KEY").filter(|k| !k.trim().is_empty()) {
            config.container_key = key.trim().to_string();
        }
        if let Some(key) = lookup("INJECTA_LOGGER_KEY").filter(|k| !k.trim().is_empty()) {
            config.logger_key = key.trim().to_string();
        }
        if let Some(flag) = lookup("INJECTA_WARN_ON_MISSING") {
            match flag.trim().to_ascii_lowercase().as_str() {
                "0" | "false" | "no" | "off" => config.warn_on_missing = false,
                "1" | "true" | "yes" | "on" => config.warn_on_missing = true,
                other => tracing::warn!("Ignoring INJECTA_WARN_ON_MISSING={}", other),
            }
        }
        config
    }

    pub fn container_key(mut self, key: impl Into<String>) -> Self {
        self.container_key = key.into();
        self
    }

    pub fn logger_key(mut self, key: impl Into<String>) -> Self {
        self.logger_key = key.into();
        self
    }

    pub fn warn_on_missing(mut self, enabled: bool) -> Self {
        self.warn_on_missing = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ContainerConfig::from_lookup(lookup(&[]));
        assert_eq!(config, ContainerConfig::default());
        assert_eq!(config.container_key, "container");
        assert_eq!(config.logger_key, "logger");
        assert!(config.warn_on_missing);
    }

    #[test]
    fn test_overrides() {
        let config = ContainerConfig::from_lookup(lookup(&[
            ("INJECTA_CONTAINER_KEY", " ctx "),
            ("INJECTA_LOGGER_KEY", "log"),
            ("INJECTA_WARN_ON_MISSING", "off"),
        ]));
        assert_eq!(config.container_key, "ctx");
        assert_eq!(config.logger_key, "log");
        assert!(!config.warn_on_missing);
    }

    #[test]
    fn test_invalid_flag_keeps_default() {
        let config = ContainerConfig::from_lookup(lookup(&[
            ("INJECTA_WARN_ON_MISSING", "maybe"),
            ("INJECTA_LOGGER_KEY", "  "),
        ]));
        assert!(config.warn_on_missing);
        assert_eq!(config.logger_key, "logger");
    }
}
