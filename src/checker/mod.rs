//! Resolution checker: classifies candidate domains by whether they resolve.
//!
//! Lookups are bounded by a semaphore (in-flight count) and a governor rate limiter
//! (lookups started per second). Results are optionally cached for a fixed TTL.

pub mod backend;
pub mod cache;

pub use backend::{DnsBackend, RecordAnswer, TrustDnsBackend};
pub use cache::ResultCache;

use crate::config::{CachePolicy, DnsConfig};
use crate::context::RunContext;
use crate::error::{ProbeError, Result};
use crate::types::{CheckerStats, RecordKind, ResolutionResult};
use futures::FutureExt;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use std::any::Any;
use std::collections::BTreeMap;
use std::net::IpAddr;
use std::num::NonZeroU32;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::{debug, error, info, warn, Instrument};

/// Queried by [`DnsChecker::health_check`]; expected to always resolve.
pub const HEALTH_CHECK_DOMAIN: &str = "google.com";

enum AddressOutcome {
    Found(Vec<IpAddr>),
    NotFound,
    TimedOut,
}

struct Inner {
    config: DnsConfig,
    backend: Arc<dyn DnsBackend>,
    limiter: DefaultDirectRateLimiter,
    permits: Semaphore,
    cache: Option<ResultCache>,
    cache_ttl: Duration,
    ctx: RunContext,
}

/// Cheap to clone; clones share the resolver, limiters and cache.
#[derive(Clone)]
pub struct DnsChecker {
    inner: Arc<Inner>,
}

impl DnsChecker {
    pub fn new(config: DnsConfig, cache: CachePolicy, ctx: RunContext) -> Result<Self> {
        config.validate()?;
        let backend = TrustDnsBackend::new(&config)?;
        Self::with_backend(config, cache, Arc::new(backend), ctx)
    }

    /// Build a checker over any [`DnsBackend`].
    pub fn with_backend(
        config: DnsConfig,
        cache: CachePolicy,
        backend: Arc<dyn DnsBackend>,
        ctx: RunContext,
    ) -> Result<Self> {
        config.validate()?;
        let limiter = RateLimiter::direct(rate_quota(config.rate_limit)?);
        let permits = Semaphore::new(config.concurrent_limit);

        ctx.span().in_scope(|| {
            info!(
                concurrent_limit = config.concurrent_limit,
                rate_limit = config.rate_limit,
                timeout = config.timeout,
                retries = config.retries,
                cache = cache.enabled,
                "DNS checker initialized"
            );
        });

        Ok(Self {
            inner: Arc::new(Inner {
                permits,
                limiter,
                cache: cache.enabled.then(|| ResultCache::new(cache.ttl)),
                cache_ttl: cache.ttl,
                backend,
                config,
                ctx,
            }),
        })
    }

    pub fn config(&self) -> &DnsConfig {
        &self.inner.config
    }

    /// Check one domain, serving a fresh cached result when there is one.
    pub async fn check_domain(&self, domain: &str) -> ResolutionResult {
        let span = self.inner.ctx.span().clone();
        async move {
            if let Some(cache) = &self.inner.cache {
                if let Some(hit) = cache.get(domain) {
                    debug!(domain, "Cache hit");
                    return hit;
                }
            }

            let result = self.lookup(domain).await;
            debug!(
                domain,
                status = %result.status,
                response_ms = result.response_time.as_millis() as u64,
                "DNS check complete"
            );

            if let Some(cache) = &self.inner.cache {
                cache.insert(domain, result.clone());
            }
            result
        }
        .instrument(span)
        .await
    }

    /// Check every domain, at most `concurrent_limit` at a time.
    ///
    /// Returns exactly one result per input, in completion order. A lookup task that
    /// panics becomes an errored result for its domain; a task that cannot be joined
    /// becomes an errored result for `unknown`.
    pub async fn check_domains<I, S>(&self, domains: I) -> Vec<ResolutionResult>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let span = self.inner.ctx.span().clone();
        let mut tasks = JoinSet::new();

        for domain in domains {
            let domain: String = domain.into();
            let checker = self.clone();
            tasks.spawn(
                async move {
                    let outcome = AssertUnwindSafe(checker.check_domain(&domain))
                        .catch_unwind()
                        .await;
                    match outcome {
                        Ok(result) => result,
                        Err(payload) => {
                            let message = panic_message(payload.as_ref());
                            error!(domain = %domain, error = %message, "DNS lookup task panicked");
                            ResolutionResult::errored(domain, message, Duration::ZERO)
                        }
                    }
                }
                .instrument(span.clone()),
            );
        }

        span.in_scope(|| info!(count = tasks.len(), "Checking DNS for domains"));

        let mut results = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(result) => results.push(result),
                Err(e) => {
                    span.in_scope(|| error!(error = %e, "DNS lookup task failed"));
                    results.push(ResolutionResult::errored("unknown", e.to_string(), Duration::ZERO));
                }
            }
        }

        span.in_scope(|| info!(count = results.len(), "Completed DNS checks"));
        results
    }

    /// One uncached lookup of [`HEALTH_CHECK_DOMAIN`].
    pub async fn health_check(&self) -> bool {
        let span = self.inner.ctx.span().clone();
        async move {
            let result = self.lookup(HEALTH_CHECK_DOMAIN).await;
            if result.is_resolved() {
                debug!("DNS health check passed");
            } else {
                warn!(
                    status = %result.status,
                    error = result.error_message.as_deref().unwrap_or(""),
                    "DNS health check failed"
                );
            }
            result.is_resolved()
        }
        .instrument(span)
        .await
    }

    /// Query every record type in [`RecordKind::INSPECTED`].
    ///
    /// Bypasses the cache and limiters. A failed query leaves an empty list.
    pub async fn inspect(&self, domain: &str) -> BTreeMap<RecordKind, Vec<String>> {
        let mut records = BTreeMap::new();
        for kind in RecordKind::INSPECTED {
            let values = match self.inner.backend.query(domain, kind).await {
                Ok(RecordAnswer::Records(values)) => values,
                Ok(_) => Vec::new(),
                Err(e) => {
                    self.inner
                        .ctx
                        .span()
                        .in_scope(|| debug!(domain, record = %kind, error = %e, "Record query failed"));
                    Vec::new()
                }
            };
            records.insert(kind, values);
        }
        records
    }

    pub fn stats(&self) -> CheckerStats {
        CheckerStats {
            cache_size: self.inner.cache.as_ref().map_or(0, ResultCache::len),
            cache_ttl: self.inner.cache_ttl.as_secs(),
            concurrent_limit: self.inner.config.concurrent_limit,
            timeout: self.inner.config.timeout,
            retries: self.inner.config.retries,
        }
    }

    pub fn clear_cache(&self) {
        if let Some(cache) = &self.inner.cache {
            cache.clear();
            self.inner.ctx.span().in_scope(|| info!("DNS cache cleared"));
        }
    }

    /// Uncached lookup: concurrency slot, rate slot, then A and AAAA.
    async fn lookup(&self, domain: &str) -> ResolutionResult {
        let _permit = match self.inner.permits.acquire().await {
            Ok(permit) => permit,
            Err(e) => return ResolutionResult::errored(domain, e.to_string(), Duration::ZERO),
        };

        let started = Instant::now();
        self.inner.limiter.until_ready().await;

        match timeout(self.inner.config.lifetime(), self.resolve_addresses(domain)).await {
            Ok(Ok(AddressOutcome::Found(ips))) => {
                ResolutionResult::resolved(domain, ips, started.elapsed())
            }
            Ok(Ok(AddressOutcome::NotFound)) => ResolutionResult::unresolved(domain, started.elapsed()),
            Ok(Ok(AddressOutcome::TimedOut)) | Err(_) => {
                ResolutionResult::timed_out(domain, started.elapsed())
            }
            Ok(Err(e)) => {
                warn!(domain, error = %e, "DNS lookup failed");
                ResolutionResult::errored(domain, e.to_string(), started.elapsed())
            }
        }
    }

    async fn resolve_addresses(&self, domain: &str) -> Result<AddressOutcome> {
        let mut timed_out = 0;

        for kind in [RecordKind::A, RecordKind::Aaaa] {
            match self.inner.backend.query(domain, kind).await? {
                RecordAnswer::Records(values) => {
                    let ips: Vec<IpAddr> = values.iter().filter_map(|v| v.parse().ok()).collect();
                    if !ips.is_empty() {
                        return Ok(AddressOutcome::Found(ips));
                    }
                }
                RecordAnswer::NoRecords => {}
                RecordAnswer::TimedOut => timed_out += 1,
            }
        }

        if timed_out == 2 {
            Ok(AddressOutcome::TimedOut)
        } else {
            Ok(AddressOutcome::NotFound)
        }
    }
}

/// One lookup per `1 / rate` seconds, with bursts of up to `rate` lookups.
fn rate_quota(rate: f64) -> Result<Quota> {
    let period = Duration::try_from_secs_f64(1.0 / rate)
        .map_err(|_| ProbeError::config(format!("Invalid rate limit: {}", rate)))?;
    let burst = NonZeroU32::new(rate.floor().clamp(1.0, u32::MAX as f64) as u32)
        .unwrap_or(NonZeroU32::MIN);
    Quota::with_period(period)
        .map(|quota| quota.allow_burst(burst))
        .ok_or_else(|| ProbeError::config(format!("Rate limit too high: {}", rate)))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "DNS lookup task panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixed {
        answer: RecordAnswer,
        calls: AtomicUsize,
    }

    impl Fixed {
        fn new(answer: RecordAnswer) -> Arc<Self> {
            Arc::new(Self {
                answer,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl DnsBackend for Fixed {
        async fn query(&self, _domain: &str, _kind: RecordKind) -> Result<RecordAnswer> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.answer.clone())
        }
    }

    struct Failing;

    #[async_trait]
    impl DnsBackend for Failing {
        async fn query(&self, _domain: &str, _kind: RecordKind) -> Result<RecordAnswer> {
            Err(ProbeError::Resolver("connection refused".to_string()))
        }
    }

    fn fast_config() -> DnsConfig {
        DnsConfig {
            rate_limit: 1000.0,
            ..DnsConfig::default()
        }
    }

    fn checker(backend: Arc<dyn DnsBackend>) -> DnsChecker {
        DnsChecker::with_backend(fast_config(), CachePolicy::disabled(), backend, RunContext::default())
            .unwrap()
    }

    #[tokio::test]
    async fn test_resolved_stops_after_ipv4() {
        let backend = Fixed::new(RecordAnswer::Records(vec!["192.0.2.1".to_string()]));
        let result = checker(backend.clone()).check_domain("example.test").await;

        assert!(result.is_resolved());
        assert_eq!(result.ip_addresses, vec!["192.0.2.1".parse::<IpAddr>().unwrap()]);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_no_records_is_unresolved() {
        let backend = Fixed::new(RecordAnswer::NoRecords);
        let result = checker(backend.clone()).check_domain("missing.test").await;

        assert_eq!(result.status, crate::types::ResolutionStatus::Unresolved);
        assert!(result.ip_addresses.is_empty());
        assert_eq!(result.error_message, None);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_resolver_timeout_is_timed_out() {
        let result = checker(Fixed::new(RecordAnswer::TimedOut))
            .check_domain("slow.test")
            .await;
        assert_eq!(result.status, crate::types::ResolutionStatus::TimedOut);
    }

    #[tokio::test]
    async fn test_backend_error_is_captured() {
        let result = checker(Arc::new(Failing)).check_domain("broken.test").await;
        assert_eq!(result.status, crate::types::ResolutionStatus::Errored);
        assert!(result.error_message.unwrap().contains("connection refused"));
    }

    #[test]
    fn test_rejects_invalid_limits() {
        let backend: Arc<dyn DnsBackend> = Fixed::new(RecordAnswer::NoRecords);
        for config in [
            DnsConfig {
                concurrent_limit: 0,
                ..DnsConfig::default()
            },
            DnsConfig {
                rate_limit: 0.0,
                ..DnsConfig::default()
            },
            DnsConfig {
                rate_limit: -5.0,
                ..DnsConfig::default()
            },
        ] {
            let built = DnsChecker::with_backend(
                config,
                CachePolicy::default(),
                backend.clone(),
                RunContext::default(),
            );
            assert!(matches!(built, Err(ProbeError::Config(_))));
        }
    }

    #[test]
    fn test_rate_quota() {
        assert!(rate_quota(10.0).is_ok());
        assert!(rate_quota(0.5).is_ok());
        assert!(rate_quota(f64::INFINITY).is_err());
    }

    #[test]
    fn test_stats_without_cache() {
        let stats = checker(Fixed::new(RecordAnswer::NoRecords)).stats();
        assert_eq!(stats.cache_size, 0);
        assert_eq!(stats.concurrent_limit, 100);
        assert_eq!(stats.retries, 3);
    }
}
