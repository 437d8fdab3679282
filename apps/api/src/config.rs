use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::layout::FontFamily;
use crate::llm_client::{GeminiSettings, DEFAULT_API_BASE, DEFAULT_MODEL};
use crate::optimization::prompts::DEFAULT_JOB_DESCRIPTION;

pub const DEFAULT_EVALUATION_MARKER: &str = "Evaluation and changes made";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_api_base: String,
    pub gemini_model: String,
    pub gemini_timeout_secs: u64,
    pub gemini_max_attempts: u32,
    pub port: u16,
    pub rust_log: String,
    /// Flat directory holding rendered PDFs. Created at startup, never cleaned.
    pub output_dir: PathBuf,
    pub max_upload_bytes: usize,
    /// Title the model is asked to put before its evaluation; the response is split on it.
    pub evaluation_marker: String,
    pub default_job_description: String,
    pub pdf_font: FontFamily,
    pub pdf_font_size_pt: f32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let evaluation_marker = std::env::var("EVALUATION_MARKER")
            .unwrap_or_else(|_| DEFAULT_EVALUATION_MARKER.to_string());
        validate_marker(&evaluation_marker)?;

        let pdf_font_size_pt: f32 = parse_env("PDF_FONT_SIZE", 12.0)?;
        if !(4.0..=72.0).contains(&pdf_font_size_pt) {
            bail!("PDF_FONT_SIZE must be between 4 and 72 points");
        }

        Ok(Config {
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            gemini_api_base: std::env::var("GEMINI_API_BASE")
                .unwrap_or_else(|_| DEFAULT_API_BASE.to_string()),
            gemini_model: std::env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            gemini_timeout_secs: parse_env("GEMINI_TIMEOUT_SECS", 120)?,
            gemini_max_attempts: parse_env("GEMINI_MAX_ATTEMPTS", 1)?,
            port: parse_env("PORT", 3000)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            output_dir: std::env::var("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("generated")),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            evaluation_marker,
            default_job_description: std::env::var("DEFAULT_JOB_DESCRIPTION")
                .unwrap_or_else(|_| DEFAULT_JOB_DESCRIPTION.to_string()),
            pdf_font: parse_env("PDF_FONT", FontFamily::Helvetica)?,
            pdf_font_size_pt,
        })
    }

    pub fn gemini_settings(&self) -> GeminiSettings {
        GeminiSettings {
            api_key: self.gemini_api_key.clone(),
            api_base: self.gemini_api_base.clone(),
            model: self.gemini_model.clone(),
            timeout: Duration::from_secs(self.gemini_timeout_secs),
            max_attempts: self.gemini_max_attempts,
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Parses an optional variable, falling back to `default` when unset.
fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => parse_value(key, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| anyhow::anyhow!("{key} has an invalid value '{raw}': {e}"))
}

fn validate_marker(marker: &str) -> Result<()> {
    if marker.trim().is_empty() {
        bail!("EVALUATION_MARKER must not be empty");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value_accepts_port() {
        let port: u16 = parse_value("PORT", " 8080 ").unwrap();
        assert_eq!(port, 8080);
    }

    #[test]
    fn test_parse_value_reports_key_on_failure() {
        let err = parse_value::<u16>("PORT", "eighty").unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_parse_value_font_family() {
        let font: FontFamily = parse_value("PDF_FONT", "courier").unwrap();
        assert_eq!(font, FontFamily::Courier);
    }

    #[test]
    fn test_blank_marker_rejected() {
        assert!(validate_marker("   ").is_err());
        assert!(validate_marker(DEFAULT_EVALUATION_MARKER).is_ok());
    }
}
