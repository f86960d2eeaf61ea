//! The boundary between the checker and the DNS resolver library.
//!
//! "No such domain" and "no answer" come back as [`RecordAnswer::NoRecords`], and a
//! resolver timeout as [`RecordAnswer::TimedOut`]. Only genuine failures are errors.

use crate::config::DnsConfig;
use crate::error::{ProbeError, Result};
use crate::types::RecordKind;
use async_trait::async_trait;
use trust_dns_resolver::config::{NameServerConfigGroup, ResolverConfig, ResolverOpts};
use trust_dns_resolver::error::ResolveErrorKind;
use trust_dns_resolver::proto::rr::RecordType;
use trust_dns_resolver::{system_conf, TokioAsyncResolver};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordAnswer {
    /// Textual record values; addresses for A and AAAA
    Records(Vec<String>),
    NoRecords,
    TimedOut,
}

#[async_trait]
pub trait DnsBackend: Send + Sync {
    async fn query(&self, domain: &str, kind: RecordKind) -> Result<RecordAnswer>;
}

/// [`DnsBackend`] on top of the tokio trust-dns resolver.
pub struct TrustDnsBackend {
    resolver: TokioAsyncResolver,
}

impl TrustDnsBackend {
    /// Build a resolver with the configured timeout, attempts and nameservers.
    ///
    /// The resolver's own cache is disabled; caching is the checker's job.
    pub fn new(config: &DnsConfig) -> Result<Self> {
        let mut opts = ResolverOpts::default();
        opts.timeout = config.timeout_duration();
        opts.attempts = config.retries as usize;
        opts.cache_size = 0;

        let nameservers = config.nameserver_addrs()?;
        let resolver_config = if nameservers.is_empty() {
            match system_conf::read_system_conf() {
                Ok((system, _)) => system,
                Err(e) => {
                    warn!(error = %e, "Could not read system resolver configuration, using defaults");
                    ResolverConfig::default()
                }
            }
        } else {
            info!(?nameservers, "Using custom nameservers");
            ResolverConfig::from_parts(
                None,
                vec![],
                NameServerConfigGroup::from_ips_clear(&nameservers, 53, true),
            )
        };

        Ok(Self {
            resolver: TokioAsyncResolver::tokio(resolver_config, opts),
        })
    }
}

fn record_type(kind: RecordKind) -> RecordType {
    match kind {
        RecordKind::A => RecordType::A,
        RecordKind::Aaaa => RecordType::AAAA,
        RecordKind::Mx => RecordType::MX,
        RecordKind::Txt => RecordType::TXT,
        RecordKind::Ns => RecordType::NS,
        RecordKind::Cname => RecordType::CNAME,
    }
}

#[async_trait]
impl DnsBackend for TrustDnsBackend {
    async fn query(&self, domain: &str, kind: RecordKind) -> Result<RecordAnswer> {
        match self.resolver.lookup(domain, record_type(kind)).await {
            Ok(lookup) => {
                let values: Vec<String> = lookup
                    .iter()
                    .map(|rdata| match rdata.ip_addr() {
                        Some(ip) => ip.to_string(),
                        None => rdata.to_string(),
                    })
                    .collect();
                if values.is_empty() {
                    Ok(RecordAnswer::NoRecords)
                } else {
                    Ok(RecordAnswer::Records(values))
                }
            }
            Err(err) => match err.kind() {
                ResolveErrorKind::NoRecordsFound { .. } => Ok(RecordAnswer::NoRecords),
                ResolveErrorKind::Timeout => Ok(RecordAnswer::TimedOut),
                _ => Err(ProbeError::Resolver(err.to_string())),
            },
        }
    }
}
