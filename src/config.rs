// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Rates and multipliers are not configured here; they live in the
//! admin-edited pricing record served by `PricingConfigStore`.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// OSRM-compatible routing endpoint; straight-line routing when unset
    pub routing_url: Option<String>,

    // --- Dispatch ---
    /// Candidate search radius around the pickup
    pub dispatch_radius_km: f64,
    /// Cap on drivers notified per dispatch pass
    pub dispatch_max_candidates: usize,

    // --- Sweep ---
    /// Pending rides older than this expire to NoDriversAvailable
    pub pending_ride_ttl: Duration,
    /// Scheduled rides are dispatched this long before their pickup time
    pub schedule_lead: Duration,
    pub sweep_interval: Duration,

    /// Attempts per provider call before falling back
    pub provider_max_attempts: u32,
}

impl Config {
    /// Default config for tests.
    pub fn test_default() -> Self {
        Self {
            port: 8080,
            frontend_url: "http://localhost:5173".to_string(),
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            routing_url: None,
            dispatch_radius_km: 5.0,
            dispatch_max_candidates: 10,
            pending_ride_ttl: Duration::from_secs(120),
            schedule_lead: Duration::from_secs(600),
            sweep_interval: Duration::from_secs(30),
            provider_max_attempts: 3,
        }
    }

    /// Load configuration from environment variables (and `.env` if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = Self {
            port: parse_or("PORT", 8080)?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .trim()
                .as_bytes()
                .to_vec(),
            routing_url: env::var("ROUTING_URL")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            dispatch_radius_km: parse_or("DISPATCH_RADIUS_KM", 5.0)?,
            dispatch_max_candidates: parse_or("DISPATCH_MAX_CANDIDATES", 10)?,
            pending_ride_ttl: Duration::from_secs(parse_or("PENDING_RIDE_TTL_SECS", 120)?),
            schedule_lead: Duration::from_secs(parse_or("SCHEDULE_LEAD_SECS", 600)?),
            sweep_interval: Duration::from_secs(parse_or("SWEEP_INTERVAL_SECS", 30)?),
            provider_max_attempts: parse_or("PROVIDER_MAX_ATTEMPTS", 3)?,
        };

        if config.dispatch_radius_km <= 0.0 {
            return Err(ConfigError::Invalid("DISPATCH_RADIUS_KM"));
        }
        if config.dispatch_max_candidates == 0 {
            return Err(ConfigError::Invalid("DISPATCH_MAX_CANDIDATES"));
        }
        if config.provider_max_attempts == 0 {
            return Err(ConfigError::Invalid("PROVIDER_MAX_ATTEMPTS"));
        }
        if config.sweep_interval.is_zero() {
            return Err(ConfigError::Invalid("SWEEP_INTERVAL_SECS"));
        }

        Ok(config)
    }
}

/// Read an optional variable, falling back to `default` when unset.
fn parse_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env vars are process-global, so everything env-related lives in one test.
    #[test]
    fn test_config_from_env() {
        env::set_var("JWT_SIGNING_KEY", "test_jwt_key_32_bytes_minimum!!");
        env::set_var("DISPATCH_RADIUS_KM", "3.5");
        env::remove_var("DISPATCH_MAX_CANDIDATES");

        let config = Config::from_env().expect("Config should load");
        assert_eq!(config.dispatch_radius_km, 3.5);
        assert_eq!(config.dispatch_max_candidates, 10);
        assert_eq!(config.jwt_signing_key, b"test_jwt_key_32_bytes_minimum!!");

        env::set_var("DISPATCH_RADIUS_KM", "not-a-number");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Invalid("DISPATCH_RADIUS_KM"))
        ));

        env::remove_var("DISPATCH_RADIUS_KM");
    }
}
