//! Validated configuration for the generator, the DNS checker and reporting.
//!
//! Every struct deserializes with defaults for missing fields, so a JSON config file
//! only needs to name the values it changes. `validate` runs once, when a component is
//! built, never at the point of use.

use crate::error::{ProbeError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "UPPERCASE")]
#[value(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`.
    pub fn as_directive(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error | LogLevel::Critical => "error",
        }
    }
}

/// DNS resolution settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DnsConfig {
    /// Per-query timeout in seconds
    pub timeout: f64,
    /// Attempts per query; the whole lookup may take `timeout * retries`
    pub retries: u32,
    /// Maximum simultaneous in-flight lookups
    pub concurrent_limit: usize,
    /// Lookups started per second
    pub rate_limit: f64,
    /// Explicit nameserver addresses; the system configuration is used when absent
    pub nameservers: Option<Vec<String>>,
}

impl Default for DnsConfig {
    fn default() -> Self {
        Self {
            timeout: 5.0,
            retries: 3,
            concurrent_limit: 100,
            rate_limit: 10.0,
            nameservers: None,
        }
    }
}

impl DnsConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.timeout.is_finite() || !(0.1..=30.0).contains(&self.timeout) {
            return Err(ProbeError::config(format!(
                "DNS timeout must be between 0.1 and 30 seconds, got {}",
                self.timeout
            )));
        }
        if !(1..=10).contains(&self.retries) {
            return Err(ProbeError::config(format!(
                "DNS retries must be between 1 and 10, got {}",
                self.retries
            )));
        }
        if !(1..=1000).contains(&self.concurrent_limit) {
            return Err(ProbeError::config(format!(
                "concurrent limit must be between 1 and 1000, got {}",
                self.concurrent_limit
            )));
        }
        if !self.rate_limit.is_finite() || self.rate_limit <= 0.0 {
            return Err(ProbeError::config(format!(
                "rate limit must be a positive number of queries per second, got {}",
                self.rate_limit
            )));
        }
        self.nameserver_addrs()?;
        Ok(())
    }

    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs_f64(self.timeout)
    }

    /// Upper bound for one domain's lookup, all attempts included.
    pub fn lifetime(&self) -> Duration {
        self.timeout_duration() * self.retries
    }

    pub fn nameserver_addrs(&self) -> Result<Vec<IpAddr>> {
        let Some(nameservers) = &self.nameservers else {
            return Ok(Vec::new());
        };
        nameservers
            .iter()
            .map(|ns| {
                ns.trim()
                    .parse::<IpAddr>()
                    .map_err(|_| ProbeError::config(format!("Invalid nameserver format: {}", ns)))
            })
            .collect()
    }
}

/// Mutation generator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub max_variants_per_domain: usize,
    pub max_tld_length: usize,
    pub enable_keyboard_typos: bool,
    pub enable_visual_similarity: bool,
    pub enable_character_omission: bool,
    pub enable_character_repetition: bool,
    pub enable_character_substitution: bool,
    pub enable_subdomain_variations: bool,
    pub enable_idn_confusables: bool,
    /// TLDs to use instead of the bundled list when no TLD file is given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_tlds: Option<BTreeSet<String>>,
    /// Seed for the random TLD sample; OS entropy when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_variants_per_domain: 50,
            max_tld_length: 10,
            enable_keyboard_typos: true,
            enable_visual_similarity: true,
            enable_character_omission: true,
            enable_character_repetition: true,
            enable_character_substitution: true,
            enable_subdomain_variations: true,
            enable_idn_confusables: false,
            custom_tlds: None,
            seed: None,
        }
    }
}

impl GeneratorConfig {
    pub fn validate(&self) -> Result<()> {
        if !(1..=1000).contains(&self.max_variants_per_domain) {
            return Err(ProbeError::config(format!(
                "max variants per domain must be between 1 and 1000, got {}",
                self.max_variants_per_domain
            )));
        }
        if !(2..=20).contains(&self.max_tld_length) {
            return Err(ProbeError::config(format!(
                "max TLD length must be between 2 and 20, got {}",
                self.max_tld_length
            )));
        }
        Ok(())
    }

    /// A configuration with every technique switched off.
    pub fn none_enabled() -> Self {
        Self {
            enable_keyboard_typos: false,
            enable_visual_similarity: false,
            enable_character_omission: false,
            enable_character_repetition: false,
            enable_character_substitution: false,
            enable_subdomain_variations: false,
            enable_idn_confusables: false,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_file: Option<PathBuf>,
    pub include_unresolved: bool,
    pub include_statistics: bool,
    /// 0 quiet, 1 normal, 2 verbose, 3 debug
    pub verbosity: u8,
    pub colorize: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            output_file: None,
            include_unresolved: true,
            include_statistics: true,
            verbosity: 1,
            colorize: true,
        }
    }
}

impl OutputConfig {
    pub fn validate(&self) -> Result<()> {
        if self.verbosity > 3 {
            return Err(ProbeError::config(format!(
                "verbosity must be between 0 and 3, got {}",
                self.verbosity
            )));
        }
        Ok(())
    }
}

/// Result cache behaviour for the DNS checker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    pub enabled: bool,
    pub ttl: Duration,
}

impl CachePolicy {
    pub fn enabled(ttl: Duration) -> Self {
        Self { enabled: true, ttl }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ttl: Duration::from_secs(3600),
        }
    }
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self::enabled(Duration::from_secs(3600))
    }
}

/// Top-level configuration, optionally loaded from a JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub dns: DnsConfig,
    pub generator: GeneratorConfig,
    pub output: OutputConfig,
    pub log_level: LogLevel,
    pub cache_results: bool,
    /// Cache TTL in seconds
    pub cache_ttl: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            dns: DnsConfig::default(),
            generator: GeneratorConfig::default(),
            output: OutputConfig::default(),
            log_level: LogLevel::Info,
            cache_results: true,
            cache_ttl: 3600,
        }
    }
}

impl AppConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        ensure_json(path)?;
        let content = fs::read_to_string(path).map_err(|e| {
            ProbeError::file(
                path.to_string_lossy(),
                format!("Failed to read configuration file: {}", e),
            )
        })?;
        let config: AppConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        ensure_json(path)?;
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(|e| {
            ProbeError::file(
                path.to_string_lossy(),
                format!("Failed to write configuration file: {}", e),
            )
        })
    }

    pub fn validate(&self) -> Result<()> {
        self.dns.validate()?;
        self.generator.validate()?;
        self.output.validate()?;
        if self.cache_ttl < 60 {
            return Err(ProbeError::config(format!(
                "cache TTL must be at least 60 seconds, got {}",
                self.cache_ttl
            )));
        }
        Ok(())
    }

    pub fn cache_policy(&self) -> CachePolicy {
        CachePolicy {
            enabled: self.cache_results,
            ttl: Duration::from_secs(self.cache_ttl),
        }
    }
}

fn ensure_json(path: &Path) -> Result<()> {
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        Ok(())
    } else {
        Err(ProbeError::config(format!(
            "Unsupported config file format: {}",
            path.display()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(AppConfig::default().validate().is_ok());
        assert!(!GeneratorConfig::default().enable_idn_confusables);
        assert_eq!(DnsConfig::default().lifetime(), Duration::from_secs(15));
    }

    #[test]
    fn test_dns_config_rejects_non_positive_limits() {
        let zero_concurrency = DnsConfig {
            concurrent_limit: 0,
            ..DnsConfig::default()
        };
        assert!(zero_concurrency.validate().is_err());

        let zero_rate = DnsConfig {
            rate_limit: 0.0,
            ..DnsConfig::default()
        };
        assert!(zero_rate.validate().is_err());

        let negative_rate = DnsConfig {
            rate_limit: -3.0,
            ..DnsConfig::default()
        };
        assert!(negative_rate.validate().is_err());
    }

    #[test]
    fn test_nameserver_validation() {
        let good = DnsConfig {
            nameservers: Some(vec!["8.8.8.8".to_string(), "2606:4700:4700::1111".to_string()]),
            ..DnsConfig::default()
        };
        assert_eq!(good.nameserver_addrs().unwrap().len(), 2);

        let bad = DnsConfig {
            nameservers: Some(vec!["dns.google".to_string()]),
            ..DnsConfig::default()
        };
        assert!(matches!(bad.validate(), Err(ProbeError::Config(_))));
    }

    #[test]
    fn test_generator_bounds() {
        let config = GeneratorConfig {
            max_variants_per_domain: 0,
            ..GeneratorConfig::default()
        };
        assert!(config.validate().is_err());

        let config = GeneratorConfig {
            max_tld_length: 21,
            ..GeneratorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"dns": {"rate_limit": 50.0}, "log_level": "DEBUG"}"#).unwrap();
        assert_eq!(config.dns.rate_limit, 50.0);
        assert_eq!(config.dns.retries, 3);
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.generator, GeneratorConfig::default());
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("domprobe.json");

        let mut config = AppConfig::default();
        config.output.format = OutputFormat::Csv;
        config.generator.seed = Some(7);
        config.to_file(&path).unwrap();

        assert_eq!(AppConfig::from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_rejects_non_json_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("domprobe.toml");
        std::fs::write(&path, "").unwrap();
        assert!(matches!(AppConfig::from_file(&path), Err(ProbeError::Config(_))));
    }

    #[test]
    fn test_short_cache_ttl_rejected() {
        let config = AppConfig {
            cache_ttl: 10,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
