//! Layered configuration loading for shutguard binaries.
//!
//! Configuration is loaded from (in priority order):
//! 1. Environment variables (`<ENV_PREFIX>__SECTION__KEY`)
//! 2. Config file (`<file_prefix>.toml`, `.yaml`, `.json`, ...)
//! 3. Defaults (the section type's `Default` impl)

use serde::de::DeserializeOwned;

use crate::error::Result;

/// Where a configuration section is read from.
#[derive(Debug, Clone)]
pub struct ConfigLayers {
    /// Path prefix of the config file, without extension. The file is optional.
    pub file_prefix: String,
    /// Environment variable prefix, e.g. `SHUTGUARD`.
    pub env_prefix: String,
    /// Keys whose environment value is a comma-separated list.
    pub list_keys: Vec<String>,
}

impl ConfigLayers {
    pub fn new(file_prefix: &str, env_prefix: &str) -> Self {
        Self {
            file_prefix: file_prefix.to_string(),
            env_prefix: env_prefix.to_string(),
            list_keys: Vec::new(),
        }
    }

    /// Parse the environment value of `key` (dotted path) as a comma-separated list.
    pub fn with_list_key(mut self, key: &str) -> Self {
        self.list_keys.push(key.to_lowercase());
        self
    }

    /// Load `section` into `T`.
    ///
    /// A missing section yields `T::default()`. A section that is present but
    /// does not deserialize is an error: a half-understood configuration is
    /// not silently replaced by defaults.
    pub fn load_section<T>(&self, section: &str) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        let mut env = ::config::Environment::with_prefix(&self.env_prefix)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true);
        if !self.list_keys.is_empty() {
            env = env.list_separator(",");
            for key in &self.list_keys {
                env = env.with_list_parse_key(key);
            }
        }

        let cfg = ::config::Config::builder()
            .add_source(::config::File::with_name(&self.file_prefix).required(false))
            .add_source(env)
            .build()?;

        match cfg.get::<T>(section) {
            Ok(value) => Ok(value),
            Err(::config::ConfigError::NotFound(_)) => {
                tracing::debug!(section, "Config section absent, using defaults");
                Ok(T::default())
            }
            Err(e) => Err(e.into()),
        }
    }
}
