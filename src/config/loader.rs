//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{CloakConfig, StoreBackend};
use crate::domain::errors::CloakError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Loads a `.env` file from the working directory, if one exists
/// 2. Reads the TOML file
/// 3. Performs environment variable substitution (`${VAR}` syntax)
/// 4. Parses the TOML into [`CloakConfig`]
/// 5. Applies environment variable overrides (`CLOAK_*` prefix)
/// 6. Validates the configuration
///
/// # Errors
///
/// Returns [`CloakError::Configuration`] if any step fails.
///
/// # Examples
///
/// ```no_run
/// use cloak::config::load_config;
///
/// let config = load_config("cloak.toml").expect("Failed to load config");
/// println!("default k = {}", config.engine.default_k);
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<CloakConfig> {
    let path = path.as_ref();

    // Optional; a missing .env is not an error
    let _ = dotenvy::dotenv();

    if !path.exists() {
        return Err(CloakError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        CloakError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&contents)
}

/// Parses configuration from a TOML string
///
/// Runs the same substitution, override and validation steps as
/// [`load_config`], without touching the filesystem.
///
/// # Errors
///
/// Returns [`CloakError::Configuration`] if substitution, parsing or
/// validation fails.
pub fn parse_config(contents: &str) -> Result<CloakConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: CloakConfig = toml::from_str(&contents)
        .map_err(|e| CloakError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        CloakError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format `${VAR_NAME}`
///
/// Comment lines are copied verbatim.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| CloakError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut lines = Vec::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_string());
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        lines.push(processed_line);
    }

    if !missing_vars.is_empty() {
        return Err(CloakError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(lines.join("\n"))
}

/// Parses an override value, naming the variable in the error
pub(crate) fn parse_override<T: std::str::FromStr>(name: &str, val: &str) -> Result<T> {
    val.parse()
        .map_err(|_| CloakError::Configuration(format!("Invalid {} value: {}", name, val)))
}

/// Applies environment variable overrides using the `CLOAK_*` prefix
///
/// Variables follow the pattern `CLOAK_<SECTION>_<KEY>`, for example
/// `CLOAK_ENGINE_DEFAULT_K` or `CLOAK_STORE_PATH`.
fn apply_env_overrides(config: &mut CloakConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("CLOAK_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Engine overrides
    config.engine.apply_env_overrides()?;

    // Store overrides
    if let Ok(val) = std::env::var("CLOAK_STORE_BACKEND") {
        config.store.backend = match val.to_lowercase().as_str() {
            "memory" => StoreBackend::Memory,
            "file" => StoreBackend::File,
            _ => {
                return Err(CloakError::Configuration(format!(
                    "Invalid CLOAK_STORE_BACKEND: {}",
                    val
                )))
            }
        };
    }
    if let Ok(val) = std::env::var("CLOAK_STORE_PATH") {
        config.store.path = Some(val);
    }

    // Logging overrides
    if let Ok(val) = std::env::var("CLOAK_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = parse_override("CLOAK_LOGGING_LOCAL_ENABLED", &val)?;
    }
    if let Ok(val) = std::env::var("CLOAK_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Ok(val) = std::env::var("CLOAK_LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}
