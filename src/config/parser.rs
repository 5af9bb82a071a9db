use crate::config::types::SiteConfig;
use crate::config::validation::validate;
use crate::ConfigResult;
use std::fs;
use std::path::Path;

/// Loads and validates a site configuration file.
///
/// # Arguments
///
/// * `path` - Path to the TOML site file
///
/// # Returns
///
/// * `Ok(SiteConfig)` - Parsed and validated configuration
/// * `Err(ConfigError)` - File unreadable, malformed TOML, or invalid values
pub fn load_site_config(path: &Path) -> ConfigResult<SiteConfig> {
    let contents = fs::read_to_string(path)?;
    parse_site_config(&contents)
}

/// Parses a site configuration from a TOML string.
pub fn parse_site_config(contents: &str) -> ConfigResult<SiteConfig> {
    let config: SiteConfig = toml::from_str(contents)?;
    validate(&config)?;
    Ok(config)
}
