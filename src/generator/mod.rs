//! Typosquatting candidate generation.
//!
//! [`MutationGenerator::variations`] normalizes one input domain, runs the enabled
//! techniques in a fixed order, and combines each label variant with a selection of
//! TLDs. The returned [`Candidates`] iterator is lazy and single-pass: work happens as
//! it is consumed and stops once the per-domain cap is reached.

mod tables;
pub mod techniques;

pub use tables::{COMMON_TLDS, SUBDOMAIN_PREFIXES};
pub use techniques::Technique;

use crate::config::GeneratorConfig;
use crate::context::RunContext;
use crate::domain::{is_valid_domain_name, normalize, KnownSuffixes, SuffixSplitter};
use crate::error::Result;
use crate::tld::TldSet;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, error, info, warn};

/// Upper bound on randomly sampled extra TLDs per label variant.
pub const TLD_SAMPLE_SIZE: usize = 10;

pub struct MutationGenerator {
    config: GeneratorConfig,
    tlds: TldSet,
    common: Vec<String>,
    sample_pool: Vec<String>,
    splitter: Box<dyn SuffixSplitter>,
    ctx: RunContext,
}

impl MutationGenerator {
    pub fn new(config: GeneratorConfig, tlds: TldSet, ctx: RunContext) -> Result<Self> {
        config.validate()?;

        let within_bound = |tld: &str| tld.chars().count() <= config.max_tld_length;
        let common = COMMON_TLDS
            .iter()
            .copied()
            .filter(|&tld| tlds.contains(tld) && within_bound(tld))
            .map(str::to_string)
            .collect();
        let sample_pool = tlds
            .iter()
            .filter(|&tld| within_bound(tld))
            .map(str::to_string)
            .collect();

        ctx.span().in_scope(|| info!(tlds = tlds.len(), "Initialized mutation generator"));

        Ok(Self {
            config,
            tlds,
            common,
            sample_pool,
            splitter: Box::new(KnownSuffixes),
            ctx,
        })
    }

    /// Replace the default suffix splitter.
    pub fn with_splitter<S: SuffixSplitter + 'static>(mut self, splitter: S) -> Self {
        self.splitter = Box::new(splitter);
        self
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn tlds(&self) -> &TldSet {
        &self.tlds
    }

    /// Candidates for a single input domain.
    ///
    /// An input with no extractable label yields nothing and logs a warning.
    pub fn variations(&self, domain: &str) -> Candidates<'_> {
        let _entered = self.ctx.span().enter();
        let original = normalize(domain);

        let Some((base, suffix)) = self.splitter.split(&original).filter(|(label, _)| !label.is_empty())
        else {
            warn!(domain, "Could not extract domain from input");
            return Candidates::empty(self, original);
        };

        debug!(base = %base, suffix = %suffix, "Generating variations");

        let techniques: Vec<Technique> = Technique::ALL
            .into_iter()
            .filter(|t| t.is_enabled(&self.config))
            .collect();
        let rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Candidates {
            generator: self,
            original,
            base,
            suffix,
            techniques: techniques.into_iter(),
            labels: Vec::new().into_iter(),
            label: String::new(),
            tlds: Vec::new().into_iter(),
            seen: HashSet::new(),
            emitted: 0,
            rng,
            finished: false,
        }
    }

    /// Candidates for every input domain, one domain after another.
    pub fn generate_all<'a, I, S>(&'a self, domains: I) -> impl Iterator<Item = String> + 'a
    where
        I: IntoIterator<Item = S>,
        I::IntoIter: 'a,
        S: AsRef<str>,
    {
        domains
            .into_iter()
            .flat_map(move |domain| self.variations(domain.as_ref()))
    }

    /// TLDs to pair with one label variant: the original suffix, the common TLDs, then
    /// a random sample, without repeats.
    fn relevant_tlds(&self, original_suffix: &str, rng: &mut StdRng) -> Vec<String> {
        let mut selection: Vec<&str> = Vec::new();

        if !original_suffix.is_empty() && self.tlds.contains(original_suffix) {
            selection.push(original_suffix);
        }
        selection.extend(self.common.iter().map(String::as_str));
        selection.extend(
            self.sample_pool
                .choose_multiple(rng, TLD_SAMPLE_SIZE)
                .map(String::as_str),
        );

        let mut seen = HashSet::new();
        selection.retain(|tld| seen.insert(*tld));
        selection.into_iter().map(str::to_string).collect()
    }

    fn run_technique(&self, technique: Technique, label: &str) -> Vec<String> {
        match panic::catch_unwind(AssertUnwindSafe(|| technique.variants(label))) {
            Ok(variants) => variants,
            Err(_) => {
                self.ctx
                    .span()
                    .in_scope(|| error!(%technique, label, "Mutation technique failed"));
                Vec::new()
            }
        }
    }
}

/// Lazy stream of candidate domains for one input domain.
pub struct Candidates<'a> {
    generator: &'a MutationGenerator,
    original: String,
    base: String,
    suffix: String,
    techniques: std::vec::IntoIter<Technique>,
    labels: std::vec::IntoIter<String>,
    label: String,
    tlds: std::vec::IntoIter<String>,
    seen: HashSet<String>,
    emitted: usize,
    rng: StdRng,
    finished: bool,
}

impl<'a> Candidates<'a> {
    fn empty(generator: &'a MutationGenerator, original: String) -> Self {
        Self {
            generator,
            original,
            base: String::new(),
            suffix: String::new(),
            techniques: Vec::new().into_iter(),
            labels: Vec::new().into_iter(),
            label: String::new(),
            tlds: Vec::new().into_iter(),
            seen: HashSet::new(),
            emitted: 0,
            rng: StdRng::seed_from_u64(0),
            finished: true,
        }
    }

    /// The normalized input domain these candidates are derived from.
    pub fn original(&self) -> &str {
        &self.original
    }

    fn finish(&mut self) -> Option<String> {
        if !self.finished {
            self.finished = true;
            self.generator.ctx.span().in_scope(|| {
                debug!(
                    domain = %self.original,
                    count = self.emitted,
                    "Generated variations"
                )
            });
        }
        None
    }
}

impl Iterator for Candidates<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            if self.finished || self.emitted >= self.generator.config.max_variants_per_domain {
                return self.finish();
            }

            if let Some(tld) = self.tlds.next() {
                let candidate = format!("{}.{}", self.label, tld);
                if candidate != self.original
                    && is_valid_domain_name(&candidate)
                    && !self.seen.contains(&candidate)
                {
                    self.seen.insert(candidate.clone());
                    self.emitted += 1;
                    return Some(candidate);
                }
                continue;
            }

            if let Some(label) = self.labels.next() {
                self.tlds = self
                    .generator
                    .relevant_tlds(&self.suffix, &mut self.rng)
                    .into_iter();
                self.label = label;
                continue;
            }

            match self.techniques.next() {
                Some(technique) => {
                    self.labels = self.generator.run_technique(technique, &self.base).into_iter();
                }
                None => return self.finish(),
            }
        }
    }
}
