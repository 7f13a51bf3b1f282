//! Discogs credential resolution
//!
//! Resolution order:
//! 1. `HITSTER_DISCOGS_KEY` / `HITSTER_DISCOGS_SECRET` environment variables
//! 2. `discogs_key` / `discogs_secret` in the TOML config
//!
//! Both halves must come from the same layer. Whitespace-only values
//! count as missing.

use crate::sources::DiscogsCredentials;
use hitster_common::config::{is_valid_key, TomlConfig};
use tracing::{info, warn};

pub const DISCOGS_KEY_ENV: &str = "HITSTER_DISCOGS_KEY";
pub const DISCOGS_SECRET_ENV: &str = "HITSTER_DISCOGS_SECRET";

fn pair(key: Option<String>, secret: Option<String>) -> Option<DiscogsCredentials> {
    match (key, secret) {
        (Some(key), Some(secret)) if is_valid_key(&key) && is_valid_key(&secret) => {
            Some(DiscogsCredentials {
                key: key.trim().to_string(),
                secret: secret.trim().to_string(),
            })
        }
        _ => None,
    }
}

/// Resolve Discogs credentials from environment, then TOML
pub fn resolve_discogs_credentials(config: &TomlConfig) -> Option<DiscogsCredentials> {
    let from_env = pair(
        std::env::var(DISCOGS_KEY_ENV).ok(),
        std::env::var(DISCOGS_SECRET_ENV).ok(),
    );
    let from_toml = pair(config.discogs_key.clone(), config.discogs_secret.clone());

    match (from_env, from_toml) {
        (Some(env), Some(_)) => {
            warn!(
                "Discogs credentials found in both environment and TOML; using environment"
            );
            Some(env)
        }
        (Some(env), None) => {
            info!("Discogs credentials loaded from environment");
            Some(env)
        }
        (None, Some(toml)) => {
            info!("Discogs credentials loaded from TOML config");
            Some(toml)
        }
        (None, None) => None,
    }
}
