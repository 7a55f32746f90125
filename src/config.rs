//! Command-line and environment configuration.

use std::time::Duration;

use canvas::camera::Size;
use clap::Parser;

pub const DEFAULT_URL: &str = "ws://127.0.0.1:8081";
pub const DEFAULT_RECONNECT_MS: u64 = 2000;
pub const DEFAULT_WINDOW: &str = "1920x1080";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid window size `{0}`; expected WIDTHxHEIGHT")]
    InvalidWindow(String),
    #[error("window size must be non-zero, got {width}x{height}")]
    EmptyWindow { width: u32, height: u32 },
    #[error("producer URL must use ws:// or wss://, got `{0}`")]
    InvalidUrl(String),
}

#[derive(Parser, Debug)]
#[command(name = "rangefinder", about = "Headless map overlay client for the artillery range producer")]
pub struct Cli {
    /// Producer websocket endpoint.
    #[arg(long, env = "RANGEFINDER_URL", default_value = DEFAULT_URL)]
    pub url: String,

    /// Delay between reconnect attempts, in milliseconds.
    #[arg(long, env = "RANGEFINDER_RECONNECT_MS", default_value_t = DEFAULT_RECONNECT_MS)]
    pub reconnect_ms: u64,

    /// Window the overlay is fitted into, as WIDTHxHEIGHT.
    #[arg(long, env = "RANGEFINDER_WINDOW", default_value = DEFAULT_WINDOW)]
    pub window: String,

    /// Omit debug-only label lines.
    #[arg(long)]
    pub release: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub url: String,
    pub reconnect_delay: Duration,
    pub window: Size,
    pub release: bool,
}

impl ClientConfig {
    /// Validate parsed arguments.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for a malformed window size or a non-websocket URL.
    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        if !(cli.url.starts_with("ws://") || cli.url.starts_with("wss://")) {
            return Err(ConfigError::InvalidUrl(cli.url));
        }
        Ok(Self {
            window: parse_window(&cli.window)?,
            url: cli.url,
            reconnect_delay: Duration::from_millis(cli.reconnect_ms),
            release: cli.release,
        })
    }
}

/// Parse `WIDTHxHEIGHT`.
///
/// # Errors
///
/// Returns [`ConfigError`] when either side is missing, not a number, or zero.
pub fn parse_window(raw: &str) -> Result<Size, ConfigError> {
    let invalid = || ConfigError::InvalidWindow(raw.to_owned());
    let (w, h) = raw.trim().split_once(['x', 'X']).ok_or_else(invalid)?;
    let width: u32 = w.trim().parse().map_err(|_| invalid())?;
    let height: u32 = h.trim().parse().map_err(|_| invalid())?;
    if width == 0 || height == 0 {
        return Err(ConfigError::EmptyWindow { width, height });
    }
    Ok(Size::new(f64::from(width), f64::from(height)))
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
