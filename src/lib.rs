//! Typosquatting candidate generation and DNS resolution checking.
//!
//! [`MutationGenerator`] turns an input domain into look-alike candidates;
//! [`DnsChecker`] finds out which of them resolve, under a concurrency bound and a
//! query rate limit, with an optional result cache.

pub mod checker;
pub mod config;
pub mod context;
pub mod domain;
pub mod error;
pub mod generator;
pub mod input;
pub mod logging;
pub mod output;
pub mod pipeline;
pub mod tld;
pub mod types;

pub use checker::{DnsBackend, DnsChecker, RecordAnswer, TrustDnsBackend};
pub use config::{AppConfig, CachePolicy, DnsConfig, GeneratorConfig, LogLevel, OutputConfig, OutputFormat};
pub use context::RunContext;
pub use error::{ProbeError, Result};
pub use generator::{Candidates, MutationGenerator, Technique};
pub use output::{Reporter, Statistics};
pub use pipeline::Pipeline;
pub use tld::TldSet;
pub use types::{CheckerStats, RecordKind, ResolutionResult, ResolutionStatus};
