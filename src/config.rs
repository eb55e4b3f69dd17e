//! Startup configuration for the EHReezy client.
//!
//! The only configurable piece is where the REST API lives. An explicit
//! `EHREEZY_API_URL` always wins; otherwise `EHREEZY_ENV=development`
//! selects the local dev API, and anything else falls through to the
//! production URL.

use std::env;
use tracing::warn;

const PRODUCTION_API_URL: &str = "https://api.ehreezy.com/api";
const DEVELOPMENT_API_URL: &str = "http://localhost:8000/api";

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
}

impl ApiConfig {
    pub fn from_env() -> Self {
        let config = Self {
            base_url: resolve_base_url(
                env::var("EHREEZY_API_URL").ok().as_deref(),
                env::var("EHREEZY_ENV").ok().as_deref(),
            ),
        };

        if env::var("EHREEZY_API_URL").is_err() {
            warn!(base_url = %config.base_url, "EHREEZY_API_URL not set, using default");
        }

        config
    }
}

/// Pure resolution, split out from the env reads so it can be tested.
fn resolve_base_url(explicit: Option<&str>, environment: Option<&str>) -> String {
    if let Some(url) = explicit.filter(|u| !u.is_empty()) {
        // A trailing slash doubles up when paths are appended.
        return url.trim_end_matches('/').to_string();
    }
    match environment {
        Some("development") | Some("local") => DEVELOPMENT_API_URL.to_string(),
        _ => PRODUCTION_API_URL.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_url_wins_over_environment() {
        let url = resolve_base_url(Some("https://staging.ehreezy.com/api/"), Some("development"));
        assert_eq!(url, "https://staging.ehreezy.com/api");
    }

    #[test]
    fn development_environment_selects_localhost() {
        assert_eq!(resolve_base_url(None, Some("development")), DEVELOPMENT_API_URL);
        assert_eq!(resolve_base_url(None, Some("local")), DEVELOPMENT_API_URL);
    }

    #[test]
    fn default_is_production() {
        assert_eq!(resolve_base_url(None, None), PRODUCTION_API_URL);
        assert_eq!(resolve_base_url(Some(""), Some("production")), PRODUCTION_API_URL);
    }
}
