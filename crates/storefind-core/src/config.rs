use std::str::FromStr;

use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can feed a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var).ok().filter(|v| !v.trim().is_empty())
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let google_api_key = require("GOOGLE_API_KEY")?;
    let deepseek_api_key = optional("DEEPSEEK_API_KEY");

    let env = parse_environment(&or_default("STOREFIND_ENV", "development"))?;
    let bind_addr = parse_var(&lookup, "STOREFIND_BIND_ADDR", "0.0.0.0:5000")?;
    let log_level = or_default("STOREFIND_LOG_LEVEL", "info");

    let deepseek_base_url = or_default("DEEPSEEK_BASE_URL", "https://api.deepseek.com/v1");
    let deepseek_model = or_default("DEEPSEEK_MODEL", "deepseek-chat");
    let places_base_url = or_default(
        "STOREFIND_PLACES_BASE_URL",
        "https://maps.googleapis.com/maps/api/",
    );

    let http_timeout_secs = parse_var(&lookup, "STOREFIND_HTTP_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("STOREFIND_USER_AGENT", "storefind/0.1 (store-search)");
    let max_retries = parse_var(&lookup, "STOREFIND_MAX_RETRIES", "2")?;
    let retry_backoff_base_ms = parse_var(&lookup, "STOREFIND_RETRY_BACKOFF_BASE_MS", "500")?;

    let base_radius_m: u32 = parse_var(&lookup, "STOREFIND_BASE_RADIUS_M", "5000")?;
    if base_radius_m == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "STOREFIND_BASE_RADIUS_M".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    let token_retry_delay_ms = parse_var(&lookup, "STOREFIND_TOKEN_RETRY_DELAY_MS", "2000")?;
    let enrich_batch_pause_ms = parse_var(&lookup, "STOREFIND_ENRICH_BATCH_PAUSE_MS", "1000")?;
    let rate_limit_per_minute = parse_var(&lookup, "STOREFIND_RATE_LIMIT_PER_MINUTE", "120")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        google_api_key,
        deepseek_api_key,
        deepseek_base_url,
        deepseek_model,
        places_base_url,
        http_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_ms,
        base_radius_m,
        token_retry_delay_ms,
        enrich_batch_pause_ms,
        rate_limit_per_minute,
    })
}

/// Read `var` (or `default` when unset) and parse it as `T`.
fn parse_var<F, T>(lookup: &F, var: &str, default: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = lookup(var).unwrap_or_else(|_| default.to_string());
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for anything other than
/// `development`, `test` or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "STOREFIND_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
