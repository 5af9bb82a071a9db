use crate::config::types::{CrawlSection, SiteConfig, SiteSection};
use crate::ConfigError;
use url::Url;

/// Validates an entire site configuration
pub fn validate(config: &SiteConfig) -> Result<(), ConfigError> {
    validate_site_section(&config.site)?;
    validate_crawl_section(&config.crawl)?;
    Ok(())
}

fn validate_site_section(site: &SiteSection) -> Result<(), ConfigError> {
    if site.source.is_empty() {
        return Err(ConfigError::Validation("source cannot be empty".to_string()));
    }

    let base = Url::parse(&site.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url '{}': {}", site.base_url, e)))?;

    if base.scheme() != "http" && base.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "base-url must be http(s), got '{}'",
            site.base_url
        )));
    }

    if base.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' has no host",
            site.base_url
        )));
    }

    if let Some(domain) = &site.domain {
        if domain.is_empty() {
            return Err(ConfigError::Validation("domain cannot be empty".to_string()));
        }
    }

    if !site.convert_rate.is_finite() || site.convert_rate <= 0.0 {
        return Err(ConfigError::Validation(format!(
            "convert-rate must be a positive number, got {}",
            site.convert_rate
        )));
    }

    if site.batch_size < 1 || site.batch_size > 500 {
        return Err(ConfigError::Validation(format!(
            "batch-size must be between 1 and 500, got {}",
            site.batch_size
        )));
    }

    for seed in &site.extra_seeds {
        Url::parse(seed)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid extra seed '{}': {}", seed, e)))?;
    }

    Ok(())
}

fn validate_crawl_section(crawl: &CrawlSection) -> Result<(), ConfigError> {
    if crawl.fetch_timeout_ms < 1 {
        return Err(ConfigError::Validation(
            "fetch-timeout-ms must be >= 1".to_string(),
        ));
    }

    if crawl.error_threshold < 1 {
        return Err(ConfigError::Validation(
            "error-threshold must be >= 1".to_string(),
        ));
    }

    Ok(())
}
