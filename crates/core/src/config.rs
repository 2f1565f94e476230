use serde::Serialize;

use crate::error::SettingError;
use crate::settings::{Setting, SettingInfo};

pub static LOG_LEVEL: Setting<&str> =
    Setting::new("log_level", "INFO").describe("Level of logging");

pub static LOG_DIR: Setting<&str> =
    Setting::new("log_dir", "").describe("Directory to save logs");

pub static BIN_DIR: Setting<&str> =
    Setting::new("bin_dir", "bin").describe("Directory to save any output (bin)");

pub static IGNORE_FILETYPES: Setting<&str> = Setting::new(
    "ignore_filetypes",
    ".png,.pdf,.txt,.doc,.jpg,.gif",
)
.describe("File types of websites to ignore (e.g. \".filetype1,.filetype2\")");

pub static URL_REQUEST_TIMER: Setting<f64> = Setting::new("url_request_timer", 0.1)
    .describe("Time to wait per request (not to populate server with multiple requests)");

pub static MAX_URLS: Setting<i64> =
    Setting::new("max_urls", 10000).describe("The maximum number of urls to fetch/crawl");

pub static MAX_URL_LENGTH: Setting<i64> = Setting::new("max_url_length", 300)
    .describe("The maximum length (character count) of a url to fetch/crawl");

/// Every declared setting, in declaration order.
pub static SETTINGS: &[&dyn SettingInfo] = &[
    &LOG_LEVEL,
    &LOG_DIR,
    &BIN_DIR,
    &IGNORE_FILETYPES,
    &URL_REQUEST_TIMER,
    &MAX_URLS,
    &MAX_URL_LENGTH,
];

/// Resolved values of every declared setting, taken at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Config {
    pub log_level: String,
    pub log_dir: String,
    pub bin_dir: String,
    pub ignore_filetypes: Vec<String>,
    pub url_request_timer: f64,
    pub max_urls: i64,
    pub max_url_length: i64,
}

impl Config {
    /// Resolve all settings from the current environment.
    pub fn from_env() -> Result<Self, SettingError> {
        Ok(Self {
            log_level: LOG_LEVEL.resolve()?,
            log_dir: LOG_DIR.resolve()?,
            bin_dir: BIN_DIR.resolve()?,
            ignore_filetypes: split_filetypes(&IGNORE_FILETYPES.resolve()?),
            url_request_timer: URL_REQUEST_TIMER.resolve()?,
            max_urls: MAX_URLS.resolve()?,
            max_url_length: MAX_URL_LENGTH.resolve()?,
        })
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

fn split_filetypes(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn catalogue_names_are_unique() {
        let names: HashSet<String> = SETTINGS.iter().map(|s| s.name()).collect();
        assert_eq!(names.len(), SETTINGS.len());
        assert!(names.contains("E6C_URL_REQUEST_TIMER"));
    }

    #[test]
    fn declared_defaults() {
        assert_eq!(LOG_LEVEL.default_value(), "INFO");
        assert_eq!(LOG_DIR.default_value(), "");
        assert_eq!(BIN_DIR.default_value(), "bin");
        assert_eq!(URL_REQUEST_TIMER.default_value(), 0.1);
        assert_eq!(MAX_URLS.default_value(), 10000);
        assert_eq!(MAX_URL_LENGTH.default_value(), 300);

        let defaults: Vec<String> = SETTINGS.iter().map(|s| s.default_display()).collect();
        assert_eq!(defaults[3], ".png,.pdf,.txt,.doc,.jpg,.gif");
    }

    #[test]
    fn filetypes_are_split_and_trimmed() {
        assert_eq!(
            split_filetypes(".png, .pdf,,.txt "),
            vec![".png", ".pdf", ".txt"]
        );
        assert!(split_filetypes("").is_empty());
    }

    #[test]
    fn snapshot_renders_as_toml() {
        let cfg = Config {
            log_level: "INFO".into(),
            log_dir: String::new(),
            bin_dir: "bin".into(),
            ignore_filetypes: split_filetypes(IGNORE_FILETYPES.default_value().as_str()),
            url_request_timer: 0.1,
            max_urls: 10,
            max_url_length: 300,
        };
        let rendered = cfg.to_toml().unwrap();
        assert!(rendered.contains("max_url_length = 300"));
        assert!(rendered.contains("bin_dir = \"bin\""));
        assert!(rendered.contains("\".pdf\""));
    }
}
