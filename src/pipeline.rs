//! End-to-end run: load inputs, generate candidates, check them, report.

use crate::checker::DnsChecker;
use crate::config::AppConfig;
use crate::context::RunContext;
use crate::error::{ProbeError, Result};
use crate::generator::MutationGenerator;
use crate::input::load_domains;
use crate::output::{render_summary_header, Reporter};
use crate::tld::TldSet;
use crate::types::ResolutionResult;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

/// Candidates handed to the checker per batch.
pub const BATCH_SIZE: usize = 1000;

pub struct Pipeline {
    config: AppConfig,
    tld_file: Option<PathBuf>,
    ctx: RunContext,
}

impl Pipeline {
    pub fn new(config: AppConfig, tld_file: Option<PathBuf>, ctx: RunContext) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            tld_file,
            ctx,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// The TLD file when one was given, then the configured custom TLDs, then the
    /// bundled list.
    pub fn load_tlds(&self) -> Result<TldSet> {
        let max_length = self.config.generator.max_tld_length;
        match (&self.tld_file, &self.config.generator.custom_tlds) {
            (Some(path), _) => TldSet::from_file(path, max_length),
            (None, Some(custom)) => TldSet::new(custom, max_length),
            (None, None) => TldSet::bundled(max_length),
        }
    }

    /// All candidates for the domains named by `input`, in generation order.
    pub fn generate(&self, input: &str) -> Result<Vec<String>> {
        self.expand(&load_domains(input)?)
    }

    fn expand(&self, domains: &[String]) -> Result<Vec<String>> {
        let generator =
            MutationGenerator::new(self.config.generator.clone(), self.load_tlds()?, self.ctx.clone())?;

        let candidates: Vec<String> = generator.generate_all(domains).collect();
        if candidates.is_empty() {
            return Err(ProbeError::NoCandidates);
        }

        self.ctx.span().in_scope(|| {
            info!(
                input_domains = domains.len(),
                candidates = candidates.len(),
                "Generated domain variations"
            )
        });
        Ok(candidates)
    }

    /// Generate, check and write the report.
    pub async fn run(&self, input: &str) -> Result<Vec<ResolutionResult>> {
        let started = Instant::now();
        let reporter = Reporter::new(self.config.output.clone())?;
        let checker = DnsChecker::new(
            self.config.dns.clone(),
            self.config.cache_policy(),
            self.ctx.clone(),
        )?;

        if !checker.health_check().await {
            self.ctx
                .span()
                .in_scope(|| warn!("DNS health check failed, but continuing"));
        }

        let domains = load_domains(input)?;
        let candidates = self.expand(&domains)?;
        if self.config.output.verbosity > 0 {
            eprintln!(
                "{}",
                render_summary_header(domains.len(), candidates.len(), self.config.output.format)
            );
        }

        let results = self.check_all(&checker, &candidates).await;

        reporter.write(&results, started.elapsed())?;

        if self.config.output.verbosity >= 2 {
            let stats = checker.stats();
            eprintln!("DNS Cache: {} entries", stats.cache_size);
        }
        Ok(results)
    }

    /// Check candidates in batches of [`BATCH_SIZE`], advancing a progress bar.
    pub async fn check_all(&self, checker: &DnsChecker, candidates: &[String]) -> Vec<ResolutionResult> {
        let progress = self.progress_bar(candidates.len());
        let mut results = Vec::with_capacity(candidates.len());

        for batch in candidates.chunks(BATCH_SIZE) {
            results.extend(checker.check_domains(batch.iter().cloned()).await);
            progress.inc(batch.len() as u64);
        }

        progress.finish_and_clear();
        results
    }

    fn progress_bar(&self, total: usize) -> ProgressBar {
        if self.config.output.verbosity == 0 {
            return ProgressBar::hidden();
        }

        let progress = ProgressBar::new(total as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
        {
            progress.set_style(style.progress_chars("#>-"));
        }
        progress.set_message("Checking DNS resolution");
        progress
    }
}
