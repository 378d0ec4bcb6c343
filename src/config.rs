use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::scrollback::DEFAULT_VISIBLE_LINES;
use crate::toast::{QUIET_THRESHOLD, TOAST_DURATION};

const APP_DIR: &str = "portfolio-terminal";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub openai_api_key: Option<String>,
    pub data_dir: PathBuf,
    pub visible_lines: usize,
    pub site_url: String,
    pub request_timeout: Duration,
    pub toast_duration: Duration,
    pub quiet_threshold: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            data_dir: default_data_dir(),
            visible_lines: DEFAULT_VISIBLE_LINES,
            site_url: "http://localhost:3000".to_string(),
            request_timeout: Duration::from_secs(60),
            toast_duration: TOAST_DURATION,
            quiet_threshold: QUIET_THRESHOLD,
        }
    }
}

impl AppConfig {
    /// Read configuration from the environment, loading `.env` first if present.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            openai_api_key: lookup("OPENAI_API_KEY").filter(|key| !key.trim().is_empty()),
            data_dir: lookup("TERMINAL_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            visible_lines: parse_or("TERMINAL_VISIBLE_LINES", &lookup, defaults.visible_lines),
            site_url: lookup("TERMINAL_SITE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.site_url),
            request_timeout: Duration::from_secs(parse_or(
                "TERMINAL_REQUEST_TIMEOUT_SECS",
                &lookup,
                defaults.request_timeout.as_secs(),
            )),
            toast_duration: defaults.toast_duration,
            quiet_threshold: defaults.quiet_threshold,
        }
    }

    pub fn storage_path(&self) -> PathBuf {
        self.data_dir.join("storage.json")
    }

    pub fn avatars_path(&self) -> PathBuf {
        self.data_dir.join("avatars.json")
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join("terminal.log")
    }

    /// Turn a site-relative link such as `/cv.pdf` into an absolute URL.
    pub fn resolve_link(&self, href: &str) -> String {
        if href.starts_with('/') {
            format!("{}{}", self.site_url, href)
        } else {
            href.to_string()
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(env::temp_dir)
        .join(APP_DIR)
}

fn parse_or<T: FromStr + Copy>(key: &str, lookup: &impl Fn(&str) -> Option<String>, default: T) -> T {
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring invalid {}={:?}", key, raw);
            default
        }),
        None => default,
    }
}
