use anyhow::{Context, Result};

use crate::classifier::Profile;

/// Application configuration loaded from environment variables.
/// Both runner binaries load the full struct; unused halves are cheap.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub scraper_gateway_url: String,
    pub linkedin_username: String,
    pub linkedin_password: String,
    pub search_keywords: Vec<String>,
    pub scraper_interval_secs: u64,
    pub evaluator_interval_secs: u64,
    pub openrouter_api_key: String,
    pub llm_model: String,
    pub headless: bool,
    pub user_skills: String,
    pub user_experience: String,
    pub user_preferences: String,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            scraper_gateway_url: require_env("SCRAPER_GATEWAY_URL")?,
            linkedin_username: require_env("LINKEDIN_USERNAME")?,
            linkedin_password: require_env("LINKEDIN_PASSWORD")?,
            search_keywords: parse_keywords(
                &env_or("SEARCH_KEYWORDS", "Python Developer"),
            ),
            scraper_interval_secs: parse_secs("SCRAPER_INTERVAL_SECONDS", 21_600)?,
            evaluator_interval_secs: parse_secs("EVALUATOR_INTERVAL_SECONDS", 3_600)?,
            openrouter_api_key: require_env("OPENROUTER_API_KEY")?,
            llm_model: env_or("LLM_MODEL", "google/gemini-1.5-pro"),
            // The scraping backend only runs headless in production.
            headless: env_or("ENVIRONMENT", "development") == "production",
            user_skills: env_or("USER_SKILLS", "Python, Data Science"),
            user_experience: env_or("USER_EXPERIENCE", "5+ years in software development"),
            user_preferences: env_or("USER_PREFERENCES", "Remote work"),
            rust_log: env_or("RUST_LOG", "info"),
        })
    }

    /// The fixed profile postings are classified against.
    pub fn profile(&self) -> Profile {
        Profile {
            skills: self.user_skills.clone(),
            experience: self.user_experience.clone(),
            preferences: self.user_preferences.clone(),
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_secs(key: &str, default: u64) -> Result<u64> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<u64>()
            .with_context(|| format!("{key} must be a whole number of seconds")),
        Err(_) => Ok(default),
    }
}

/// Splits a comma-separated keyword list, trimming whitespace and dropping
/// empty segments.
fn parse_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}
