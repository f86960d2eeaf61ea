//! Value types produced by the resolution checker.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionStatus {
    Resolved,
    Unresolved,
    #[serde(rename = "timeout")]
    TimedOut,
    #[serde(rename = "error")]
    Errored,
}

impl ResolutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionStatus::Resolved => "resolved",
            ResolutionStatus::Unresolved => "unresolved",
            ResolutionStatus::TimedOut => "timeout",
            ResolutionStatus::Errored => "error",
        }
    }
}

impl fmt::Display for ResolutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of checking one candidate domain. Never mutated once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionResult {
    pub domain: String,
    pub status: ResolutionStatus,
    pub ip_addresses: Vec<IpAddr>,
    /// Time spent from rate-limiter acquisition to classification
    #[serde(with = "duration_secs")]
    pub response_time: Duration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ResolutionResult {
    pub fn resolved<D: Into<String>>(domain: D, ip_addresses: Vec<IpAddr>, response_time: Duration) -> Self {
        Self::build(domain, ResolutionStatus::Resolved, ip_addresses, response_time, None)
    }

    pub fn unresolved<D: Into<String>>(domain: D, response_time: Duration) -> Self {
        Self::build(domain, ResolutionStatus::Unresolved, Vec::new(), response_time, None)
    }

    pub fn timed_out<D: Into<String>>(domain: D, response_time: Duration) -> Self {
        Self::build(
            domain,
            ResolutionStatus::TimedOut,
            Vec::new(),
            response_time,
            Some("DNS query timeout".to_string()),
        )
    }

    pub fn errored<D: Into<String>, M: Into<String>>(domain: D, message: M, response_time: Duration) -> Self {
        Self::build(
            domain,
            ResolutionStatus::Errored,
            Vec::new(),
            response_time,
            Some(message.into()),
        )
    }

    fn build<D: Into<String>>(
        domain: D,
        status: ResolutionStatus,
        ip_addresses: Vec<IpAddr>,
        response_time: Duration,
        error_message: Option<String>,
    ) -> Self {
        Self {
            domain: domain.into(),
            status,
            ip_addresses,
            response_time,
            error_message,
            timestamp: Utc::now(),
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.status == ResolutionStatus::Resolved
    }
}

/// DNS record types available to the multi-record inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordKind {
    A,
    Aaaa,
    Mx,
    Txt,
    Ns,
    Cname,
}

impl RecordKind {
    pub const INSPECTED: [RecordKind; 6] = [
        RecordKind::A,
        RecordKind::Aaaa,
        RecordKind::Mx,
        RecordKind::Txt,
        RecordKind::Ns,
        RecordKind::Cname,
    ];
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordKind::A => "A",
            RecordKind::Aaaa => "AAAA",
            RecordKind::Mx => "MX",
            RecordKind::Txt => "TXT",
            RecordKind::Ns => "NS",
            RecordKind::Cname => "CNAME",
        };
        f.write_str(name)
    }
}

/// Snapshot of a checker's cache and settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckerStats {
    pub cache_size: usize,
    pub cache_ttl: u64,
    pub concurrent_limit: usize,
    pub timeout: f64,
    pub retries: u32,
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(duration.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}
