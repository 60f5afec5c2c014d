use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Weather provider settings
    #[serde(default)]
    pub provider: ProviderConfig,

    /// City search settings
    #[serde(default)]
    pub search: SearchConfig,

    /// Local state persistence settings
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Weather provider (OpenWeather-compatible) settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the provider API
    pub base_url: String,

    /// API key (can also be set via the OPEN_WEATHER_KEY environment variable)
    pub api_key: Option<String>,

    /// Measurement units passed to the provider ("metric" or "imperial")
    pub units: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openweathermap.org".to_string(),
            api_key: std::env::var("OPEN_WEATHER_KEY").ok(),
            units: "metric".to_string(),
        }
    }
}

/// City search / suggestion settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Debounce delay before a search query fires, in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Minimum query length before any network lookup is attempted
    #[serde(default = "default_min_query_len")]
    pub min_query_len: usize,

    /// Maximum number of city suggestions requested from the provider
    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: u32,
}

fn default_debounce_ms() -> u64 {
    400
}

fn default_min_query_len() -> usize {
    3
}

fn default_max_suggestions() -> u32 {
    5
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            min_query_len: default_min_query_len(),
            max_suggestions: default_max_suggestions(),
        }
    }
}

/// Local state persistence settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path of the persisted state file
    #[serde(default = "default_state_path_str")]
    pub state_path: String,
}

fn default_state_path_str() -> String {
    default_state_path().to_string_lossy().into_owned()
}

fn default_state_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("skycast")
        .join("weather_state.json")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            state_path: default_state_path_str(),
        }
    }
}

impl Config {
    /// Load configuration from file, creating default if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let contents =
            std::fs::read_to_string(&config_path).context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        if !validation.warnings.is_empty() {
            for warning in &validation.warnings {
                tracing::warn!("Config warning: {}", warning);
            }
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        // Validate provider base URL
        match Url::parse(&self.provider.base_url) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        "provider.base_url",
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }
                if url.host().is_none() {
                    result.add_error("provider.base_url", "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error("provider.base_url", format!("Invalid URL: {}", e));
            }
        }

        if self.provider.api_key.as_deref().unwrap_or("").is_empty() {
            result.add_warning(
                "provider.api_key",
                "No API key configured - weather fetches will fail",
            );
        }

        if self.provider.units != "metric" && self.provider.units != "imperial" {
            result.add_error(
                "provider.units",
                format!("Units must be \"metric\" or \"imperial\", got: {}", self.provider.units),
            );
        }

        // Validate search settings
        if self.search.debounce_ms == 0 {
            result.add_warning("search.debounce_ms", "Debounce disabled (0 ms)");
        } else if self.search.debounce_ms > 5000 {
            result.add_warning("search.debounce_ms", "Debounce delay is unusually long (>5s)");
        }

        if self.search.min_query_len == 0 {
            result.add_warning(
                "search.min_query_len",
                "Every keystroke will trigger a lookup (min length 0)",
            );
        }

        if self.search.max_suggestions == 0 {
            result.add_error("search.max_suggestions", "Must request at least one suggestion");
        }

        // Validate storage path
        if self.storage.state_path.trim().is_empty() {
            result.add_error("storage.state_path", "State path must not be empty");
        }

        result
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(&config_path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("skycast");

        Ok(config_dir.join("config.toml"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::default(),
            search: SearchConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_default_config() {
        let config = Config::default();
        let result = config.validate();
        assert!(result.is_valid(), "Default config should be valid: {:?}", result.errors);
    }

    #[test]
    fn test_invalid_base_url() {
        let mut config = Config::default();
        config.provider.base_url = "not-a-url".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "provider.base_url"));
    }

    #[test]
    fn test_invalid_url_scheme() {
        let mut config = Config::default();
        config.provider.base_url = "ftp://api.openweathermap.org".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.message.contains("http or https")));
    }

    #[test]
    fn test_invalid_units() {
        let mut config = Config::default();
        config.provider.units = "kelvin".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "provider.units"));
    }

    #[test]
    fn test_zero_debounce_is_warning() {
        let mut config = Config::default();
        config.search.debounce_ms = 0;
        let result = config.validate();
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.field == "search.debounce_ms"));
    }

    #[test]
    fn test_zero_suggestions_is_error() {
        let mut config = Config::default();
        config.search.max_suggestions = 0;
        let result = config.validate();
        assert!(!result.is_valid());
    }

    #[test]
    fn test_validation_result_error_summary() {
        let mut result = ValidationResult::default();
        result.add_error("field1", "error1");
        result.add_error("field2", "error2");
        let summary = result.error_summary();
        assert!(summary.contains("field1"));
        assert!(summary.contains("field2"));
    }
}
