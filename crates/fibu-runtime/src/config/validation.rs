//! Configuration validation.

use super::error::{ConfigError, ConfigResult};
use super::schema::{FibuConfig, LogLevel, LoggingConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &FibuConfig) -> ConfigResult<()> {
    validate_bot(config)?;
    validate_clients(config)?;
    validate_logging(&config.logging)?;
    Ok(())
}

fn validate_bot(config: &FibuConfig) -> ConfigResult<()> {
    let bot = &config.bot;
    if bot.username.trim().is_empty() {
        return Err(ConfigError::missing_field("bot.username"));
    }
    if bot.control_channel.trim().is_empty() {
        return Err(ConfigError::missing_field("bot.control_channel"));
    }
    if bot.control_channel.trim().contains(char::is_whitespace) {
        return Err(ConfigError::validation(
            "Control channel cannot contain whitespace",
        ));
    }
    Ok(())
}

fn validate_clients(config: &FibuConfig) -> ConfigResult<()> {
    validate_url(&config.tempus.base_url)?;
    validate_timeout("tempus.timeout_ms", config.tempus.timeout_ms)?;
    validate_url(&config.helix.base_url)?;
    validate_timeout("helix.timeout_ms", config.helix.timeout_ms)?;
    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> ConfigResult<()> {
    for (target, level) in &logging.filters {
        if !LogLevel::NAMES.contains(&level.to_lowercase().as_str()) {
            return Err(ConfigError::validation(format!(
                "Invalid log level for {target}: {level}. Valid values are: {:?}",
                LogLevel::NAMES
            )));
        }
    }
    Ok(())
}

fn validate_timeout(field: &str, timeout_ms: u64) -> ConfigResult<()> {
    if timeout_ms == 0 {
        return Err(ConfigError::validation(format!(
            "{field} must be greater than 0"
        )));
    }
    Ok(())
}

fn validate_url(url: &str) -> ConfigResult<()> {
    if url.is_empty() {
        return Err(ConfigError::missing_field("base_url"));
    }

    let valid_schemes = ["http://", "https://"];
    if !valid_schemes.iter().any(|s| url.starts_with(s)) {
        return Err(ConfigError::invalid_url(
            url,
            format!("URL must start with one of: {valid_schemes:?}"),
        ));
    }

    Ok(())
}
