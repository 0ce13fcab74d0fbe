//! CLI argument parsing, validation, and startup helpers.

use crate::ServerConfig;
use clap::Parser;
use std::time::Duration;
use tracing::error;

const MIN_SECRET_LENGTH: usize = 32;

/// Environment variable holding the token signing secret.
pub const ACCESS_SECRET_ENV: &str = "ACCESS_TOKEN_SECRET";

/// Optional environment variable giving refresh tokens their own secret.
pub const REFRESH_SECRET_ENV: &str = "REFRESH_TOKEN_SECRET";

#[derive(clap::ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "tokengate",
    about = "Access and refresh token authentication server"
)]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "4000")]
    pub port: u16,

    /// Path to file containing the signing secret. Prefer using ACCESS_TOKEN_SECRET env var instead
    #[arg(long)]
    pub secret_file: Option<String>,

    /// Access token lifetime in seconds
    #[arg(long, default_value = "15", value_parser = clap::value_parser!(u64).range(1..))]
    pub access_token_lifetime: u64,

    /// Refresh token lifetime in seconds. Without it, refresh tokens only end at logout
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub refresh_token_lifetime: Option<u64>,

    /// Log output format
    #[arg(short, long, default_value = "pretty")]
    pub log_format: LogFormat,
}

/// Initialize logging based on the specified format.
pub fn init_logging(format: &LogFormat) {
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt::init(),
        LogFormat::Json => tracing_subscriber::fmt().json().init(),
        LogFormat::Compact => tracing_subscriber::fmt().compact().init(),
    }
}

/// Signing secrets loaded at startup.
pub struct Secrets {
    pub access: String,
    pub refresh: String,
}

/// Read an environment variable and clear it to prevent leaking.
fn take_env(name: &str) -> Option<String> {
    let value = std::env::var(name).ok()?;
    // SAFETY: called during startup before any handler runs,
    // and no other code is reading this environment variable.
    unsafe { std::env::remove_var(name) };
    Some(value)
}

fn check_secret_length(name: &str, secret: &str) -> bool {
    if secret.len() < MIN_SECRET_LENGTH {
        error!(
            "{} is shorter than {} characters. Use a longer secret",
            name, MIN_SECRET_LENGTH
        );
        return false;
    }
    true
}

/// Load signing secrets from environment variables or file.
/// Returns None and logs an error if the secrets cannot be loaded.
pub fn load_secrets(secret_file: Option<&str>) -> Option<Secrets> {
    let access = if let Some(secret) = take_env(ACCESS_SECRET_ENV) {
        secret
    } else if let Some(path) = secret_file {
        match std::fs::read_to_string(path) {
            Ok(content) => content.trim().to_string(),
            Err(e) => {
                error!(path = %path, error = %e, "Failed to read secret file");
                return None;
            }
        }
    } else {
        error!(
            "Signing secret is required. Set {} environment variable (recommended) or use --secret-file",
            ACCESS_SECRET_ENV
        );
        return None;
    };

    if !check_secret_length(ACCESS_SECRET_ENV, &access) {
        return None;
    }

    let refresh = match take_env(REFRESH_SECRET_ENV) {
        Some(secret) => {
            if !check_secret_length(REFRESH_SECRET_ENV, &secret) {
                return None;
            }
            secret
        }
        None => access.clone(),
    };

    Some(Secrets { access, refresh })
}

/// Build ServerConfig from validated arguments.
pub fn build_config(
    secrets: Secrets,
    access_token_lifetime: u64,
    refresh_token_lifetime: Option<u64>,
) -> ServerConfig {
    let mut config = ServerConfig::with_secret(secrets.access.into_bytes());
    config.refresh_secret = secrets.refresh.into_bytes();
    config.access_token_lifetime = Duration::from_secs(access_token_lifetime);
    config.refresh_token_lifetime = refresh_token_lifetime.map(Duration::from_secs);
    config
}
