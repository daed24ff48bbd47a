use crate::config::types::{
    Config, CrawlerConfig, LemmatizerConfig, SearchConfig, SiteEntry, StorageConfig,
};
use crate::morphology::Language;
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_storage_config(&config.storage)?;
    validate_lemmatizer_config(&config.lemmatizer)?;
    validate_search_config(&config.search)?;
    validate_sites(&config.sites)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.max_concurrent_fetches < 1 || config.max_concurrent_fetches > 256 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_fetches must be between 1 and 256, got {}",
            config.max_concurrent_fetches
        )));
    }

    if let Some(referrer) = &config.referrer {
        Url::parse(referrer)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid referrer '{}': {}", referrer, e)))?;
    }

    Ok(())
}

fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_lemmatizer_config(config: &LemmatizerConfig) -> Result<(), ConfigError> {
    if Language::from_name(&config.language).is_none() {
        return Err(ConfigError::Validation(format!(
            "Unsupported lemmatizer language '{}'",
            config.language
        )));
    }
    Ok(())
}

fn validate_search_config(config: &SearchConfig) -> Result<(), ConfigError> {
    if config.default_limit < 1 {
        return Err(ConfigError::Validation(
            "default_limit must be >= 1".to_string(),
        ));
    }
    Ok(())
}

/// Validates the list of sites to index
fn validate_sites(sites: &[SiteEntry]) -> Result<(), ConfigError> {
    if sites.is_empty() {
        return Err(ConfigError::Validation(
            "At least one site must be configured".to_string(),
        ));
    }

    for site in sites {
        if site.name.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "Site '{}' must have a name",
                site.url
            )));
        }
        validate_site_url(&site.url)?;
    }

    Ok(())
}

fn validate_site_url(url: &str) -> Result<(), ConfigError> {
    let parsed = Url::parse(url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid site URL '{}': {}", url, e)))?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Site URL '{}' must use HTTP or HTTPS",
            url
        )));
    }

    if parsed.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "Site URL '{}' has no host",
            url
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(url: &str, name: &str) -> SiteEntry {
        SiteEntry {
            url: url.to_string(),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_validate_site_url() {
        assert!(validate_site_url("https://example.com").is_ok());
        assert!(validate_site_url("http://127.0.0.1:8080/").is_ok());

        assert!(validate_site_url("").is_err());
        assert!(validate_site_url("ftp://example.com").is_err());
        assert!(validate_site_url("not a url").is_err());
    }

    #[test]
    fn test_validate_sites() {
        assert!(validate_sites(&[site("https://example.com", "Example")]).is_ok());

        assert!(validate_sites(&[]).is_err());
        assert!(validate_sites(&[site("https://example.com", "  ")]).is_err());
    }

    #[test]
    fn test_validate_language() {
        let ok = LemmatizerConfig {
            language: "English".to_string(),
        };
        assert!(validate_lemmatizer_config(&ok).is_ok());

        let bad = LemmatizerConfig {
            language: "klingon".to_string(),
        };
        assert!(validate_lemmatizer_config(&bad).is_err());
    }
}
