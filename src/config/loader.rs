//! Configuration Loader
//!
//! Layers compiled-in defaults, an optional TOML file and environment
//! overrides through the `config` crate, then validates the result.

use std::path::Path;

use config::{Config, Environment, File, FileFormat, Map};
use tracing::{debug, info};

use super::error::ConfigResult;
use super::SpyltConfig;

/// Prefix for environment overrides, e.g. `SPYLT__CACHE__VERSION`
pub const ENV_PREFIX: &str = "SPYLT";
const ENV_SEPARATOR: &str = "__";

impl SpyltConfig {
    /// Load configuration from defaults, an optional TOML file and the
    /// process environment
    pub fn load<P: AsRef<Path>>(path: Option<P>) -> ConfigResult<Self> {
        Self::load_with_env(path, None)
    }

    /// Load configuration with an explicit environment map instead of the
    /// process environment. Useful for tests that must not touch global state.
    pub fn load_with_env<P: AsRef<Path>>(
        path: Option<P>,
        env: Option<Map<String, String>>,
    ) -> ConfigResult<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&SpyltConfig::default())?);

        if let Some(path) = path.as_ref() {
            let path = path.as_ref();
            debug!(path = %path.display(), "Loading configuration file");
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator(ENV_SEPARATOR)
                .separator(ENV_SEPARATOR)
                .try_parsing(true)
                .source(env),
        );

        let config: SpyltConfig = builder.build()?.try_deserialize()?;
        config.validate()?;

        info!(
            version = %config.cache.version,
            origin = %config.cache.origin,
            manifest_assets = config.cache.static_manifest.len(),
            "⚙️ CONFIG: Configuration loaded successfully"
        );

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_defaults_without_file() {
        let config = SpyltConfig::load_with_env(None::<&Path>, Some(Map::new())).unwrap();
        assert_eq!(config, SpyltConfig::default());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[cache]
version = "2.1.0"
origin = "https://spylt.example"

[health]
probe_timeout_ms = 2500
"#
        )
        .unwrap();

        let config = SpyltConfig::load_with_env(Some(file.path()), Some(Map::new())).unwrap();
        assert_eq!(config.cache.version, "2.1.0");
        assert_eq!(config.cache.origin, "https://spylt.example");
        assert_eq!(config.health.probe_timeout_ms, Some(2500));
        // Untouched sections keep their defaults
        assert_eq!(config.cache.name_prefix, "spylt");
    }

    #[test]
    fn test_env_overrides_file() {
        let mut env = Map::new();
        env.insert("SPYLT__CACHE__VERSION".to_string(), "3.0.0".to_string());

        let config = SpyltConfig::load_with_env(None::<&Path>, Some(env)).unwrap();
        assert_eq!(config.cache.version, "3.0.0");
        assert_eq!(config.cache.static_partition_name(), "spylt-static-v3.0.0");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = SpyltConfig::load_with_env(
            Some(Path::new("/nonexistent/spylt.toml")),
            Some(Map::new()),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_origin_fails_validation() {
        let mut env = Map::new();
        env.insert("SPYLT__CACHE__ORIGIN".to_string(), "not a url".to_string());

        assert!(SpyltConfig::load_with_env(None::<&Path>, Some(env)).is_err());
    }
}
