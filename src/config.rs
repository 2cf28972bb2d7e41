//! Configuration loader: merges env vars, .env file, and config.toml.

use common::config::BotConfig;
use common::Error;
use std::path::Path;

fn parse_positive_u64(raw: &str, env_name: &str) -> Result<u64, Error> {
    let parsed = raw
        .trim()
        .parse::<u64>()
        .map_err(|_| Error::Config(format!("{env_name} must be an integer > 0")))?;
    if parsed == 0 {
        return Err(Error::Config(format!("{env_name} must be an integer > 0")));
    }
    Ok(parsed)
}

fn parse_non_negative_f64(raw: &str, env_name: &str) -> Result<f64, Error> {
    let parsed = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| Error::Config(format!("{env_name} must be a number >= 0")))?;
    if parsed < 0.0 {
        return Err(Error::Config(format!("{env_name} must be a number >= 0")));
    }
    Ok(parsed)
}

fn validate_config(config: &BotConfig) -> Result<(), Error> {
    let mut issues: Vec<String> = Vec::new();

    if config.cache.ttl_secs == 0 {
        issues.push("cache.ttl_secs must be > 0".into());
    }
    if config.cache.lookback_days < 2 {
        issues.push("cache.lookback_days must be >= 2 (current plus prior close)".into());
    }

    if config.feed.timeout_secs == 0 {
        issues.push("feed.timeout_secs must be > 0".into());
    }

    if config.watch.interval_secs == 0 {
        issues.push("watch.interval_secs must be > 0".into());
    }
    if config.watch.movers_threshold_pct < 0.0 {
        issues.push("watch.movers_threshold_pct must be >= 0".into());
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "Invalid config:\n - {}",
            issues.join("\n - ")
        )))
    }
}

/// Load bot configuration from environment and optional config file.
pub fn load_config() -> Result<BotConfig, Error> {
    // 1. Load .env file from project root or parent directories.
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!("No .env file loaded: {}", e);
    }

    // 2. Start with defaults.
    let mut config = BotConfig::default();

    // 3. Try loading config.toml if it exists.
    let config_path = Path::new("config.toml");
    if config_path.exists() {
        let contents = std::fs::read_to_string(config_path)
            .map_err(|e| Error::Config(format!("Failed to read config.toml: {}", e)))?;
        config = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config.toml: {}", e)))?;
    }

    // 4. Override with environment variables (highest priority). The
    //    feed base URL is resolved inside the client, not here.
    if let Ok(raw) = std::env::var("PULSE_CACHE_TTL_SECS") {
        config.cache.ttl_secs = parse_positive_u64(&raw, "PULSE_CACHE_TTL_SECS")?;
    }
    if let Ok(raw) = std::env::var("PULSE_LOOKBACK_DAYS") {
        config.cache.lookback_days = raw
            .trim()
            .parse::<u32>()
            .map_err(|_| Error::Config("PULSE_LOOKBACK_DAYS must be an integer >= 2".into()))?;
    }
    if let Ok(raw) = std::env::var("PULSE_FEED_TIMEOUT_SECS") {
        config.feed.timeout_secs = parse_positive_u64(&raw, "PULSE_FEED_TIMEOUT_SECS")?;
    }
    if let Ok(raw) = std::env::var("PULSE_WATCH_INTERVAL_SECS") {
        config.watch.interval_secs = parse_positive_u64(&raw, "PULSE_WATCH_INTERVAL_SECS")?;
    }
    if let Ok(raw) = std::env::var("PULSE_MOVERS_THRESHOLD_PCT") {
        config.watch.movers_threshold_pct =
            parse_non_negative_f64(&raw, "PULSE_MOVERS_THRESHOLD_PCT")?;
    }

    // 5. Validate.
    validate_config(&config)?;

    Ok(config)
}
