use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::layout::geometry::{
    PageGeometry, FIT_THRESHOLD_RATIO, MAX_PAGES, PAGE_BUFFER_PX, PAGE_HEIGHT_PX, PAGE_WIDTH_PX,
    SPACING_STEP_PX,
};

/// Idle time after which a session is dropped.
pub const SESSION_TTL_SECS: u64 = 1800;
/// Upper bound on live sessions per process.
pub const MAX_SESSIONS: usize = 1000;

/// Application configuration loaded from environment variables.
/// Every variable is optional; invalid values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub page: PageGeometry,
    pub session_ttl: Duration,
    pub max_sessions: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let page = PageGeometry {
            page_height: env_or("PAGE_HEIGHT_PX", PAGE_HEIGHT_PX)?,
            page_width: env_or("PAGE_WIDTH_PX", PAGE_WIDTH_PX)?,
            buffer: env_or("PAGE_BUFFER_PX", PAGE_BUFFER_PX)?,
            fit_threshold_ratio: env_or("FIT_THRESHOLD_RATIO", FIT_THRESHOLD_RATIO)?,
            spacing_step: env_or("SPACING_STEP_PX", SPACING_STEP_PX)?,
            max_pages: env_or("MAX_PAGES", MAX_PAGES)?,
        };
        validate_geometry(&page)?;

        let ttl_secs: u64 = env_or("SESSION_TTL_SECS", SESSION_TTL_SECS)?;
        if ttl_secs == 0 {
            bail!("SESSION_TTL_SECS must be positive");
        }
        let max_sessions: usize = env_or("MAX_SESSIONS", MAX_SESSIONS)?;
        if max_sessions == 0 {
            bail!("MAX_SESSIONS must be positive");
        }

        Ok(Config {
            port: env_or("PORT", 8080u16).context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            page,
            session_ttl: Duration::from_secs(ttl_secs),
            max_sessions,
        })
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}

fn validate_geometry(page: &PageGeometry) -> Result<()> {
    if !(page.page_height.is_finite() && page.page_height > 0.0) {
        bail!("PAGE_HEIGHT_PX must be a positive number");
    }
    if !(page.page_width.is_finite() && page.page_width > 0.0) {
        bail!("PAGE_WIDTH_PX must be a positive number");
    }
    if !(page.buffer.is_finite() && page.buffer >= 0.0) {
        bail!("PAGE_BUFFER_PX must be zero or positive");
    }
    if !(page.fit_threshold_ratio > 0.0 && page.fit_threshold_ratio <= 1.0) {
        bail!("FIT_THRESHOLD_RATIO must be in (0, 1]");
    }
    if page.spacing_step == 0 {
        bail!("SPACING_STEP_PX must be positive");
    }
    if page.max_pages == 0 {
        bail!("MAX_PAGES must be positive");
    }
    Ok(())
}
