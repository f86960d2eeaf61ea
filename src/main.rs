use clap::Parser;
use domprobe::config::{AppConfig, LogLevel, OutputFormat};
use domprobe::context::RunContext;
use domprobe::error::{ProbeError, Result};
use domprobe::logging::init_logging;
use domprobe::pipeline::Pipeline;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "domprobe")]
#[command(version)]
#[command(about = "Generate typosquatting variations of domains and check which of them resolve")]
struct Cli {
    /// A domain (example.com) or a file with one domain per line
    #[arg(required_unless_present = "write_config")]
    input: Option<String>,

    /// TLD file, one TLD per line (defaults to the bundled list)
    #[arg(short = 't', long)]
    tld_file: Option<PathBuf>,

    /// Maximum variants per input domain
    #[arg(short = 'm', long)]
    max_variants: Option<usize>,

    /// Maximum TLD length
    #[arg(long)]
    max_tld_length: Option<usize>,

    /// Write results to this file instead of stdout
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'f', long, value_enum)]
    format: Option<OutputFormat>,

    /// Maximum simultaneous DNS lookups
    #[arg(short = 'c', long)]
    concurrent: Option<usize>,

    /// DNS queries per second
    #[arg(short = 'r', long)]
    rate_limit: Option<f64>,

    /// DNS timeout in seconds
    #[arg(long)]
    timeout: Option<f64>,

    /// DNS attempts per query
    #[arg(long)]
    retries: Option<u32>,

    /// Custom DNS nameserver (repeatable)
    #[arg(long = "nameservers")]
    nameservers: Vec<String>,

    /// Disable DNS result caching
    #[arg(long)]
    no_cache: bool,

    /// Leave unresolved domains out of the report
    #[arg(long)]
    exclude_unresolved: bool,

    /// Leave the statistics out of the report
    #[arg(long)]
    no_statistics: bool,

    /// Output verbosity (0 quiet, 1 normal, 2 verbose, 3 debug)
    #[arg(short = 'v', long)]
    verbosity: Option<u8>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Logging level (RUST_LOG overrides it)
    #[arg(long, value_enum)]
    log_level: Option<LogLevel>,

    /// Load configuration from a JSON file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the effective configuration to a JSON file
    #[arg(long)]
    write_config: Option<PathBuf>,

    /// Seed for the random TLD sample, for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// Print candidates without checking DNS
    #[arg(long)]
    generate_only: bool,

    /// Disable keyboard-adjacency typos
    #[arg(long)]
    disable_keyboard_typos: bool,

    /// Disable visual look-alike substitutions
    #[arg(long)]
    disable_visual_similarity: bool,

    /// Disable character omission
    #[arg(long)]
    disable_character_omission: bool,

    /// Disable character repetition
    #[arg(long)]
    disable_character_repetition: bool,

    /// Disable character substitution
    #[arg(long)]
    disable_character_substitution: bool,

    /// Disable subdomain-style affixes
    #[arg(long)]
    disable_subdomain_variations: bool,

    /// Enable IDN homoglyph substitutions
    #[arg(long)]
    enable_idn_confusables: bool,
}

impl Cli {
    /// Options given on the command line win over the configuration file.
    fn apply(&self, config: &mut AppConfig) {
        let generator = &mut config.generator;
        if let Some(max) = self.max_variants {
            generator.max_variants_per_domain = max;
        }
        if let Some(max) = self.max_tld_length {
            generator.max_tld_length = max;
        }
        if self.seed.is_some() {
            generator.seed = self.seed;
        }
        if self.disable_keyboard_typos {
            generator.enable_keyboard_typos = false;
        }
        if self.disable_visual_similarity {
            generator.enable_visual_similarity = false;
        }
        if self.disable_character_omission {
            generator.enable_character_omission = false;
        }
        if self.disable_character_repetition {
            generator.enable_character_repetition = false;
        }
        if self.disable_character_substitution {
            generator.enable_character_substitution = false;
        }
        if self.disable_subdomain_variations {
            generator.enable_subdomain_variations = false;
        }
        if self.enable_idn_confusables {
            generator.enable_idn_confusables = true;
        }

        let dns = &mut config.dns;
        if let Some(concurrent) = self.concurrent {
            dns.concurrent_limit = concurrent;
        }
        if let Some(rate) = self.rate_limit {
            dns.rate_limit = rate;
        }
        if let Some(timeout) = self.timeout {
            dns.timeout = timeout;
        }
        if let Some(retries) = self.retries {
            dns.retries = retries;
        }
        if !self.nameservers.is_empty() {
            dns.nameservers = Some(self.nameservers.clone());
        }

        let output = &mut config.output;
        if let Some(format) = self.format {
            output.format = format;
        }
        if self.output.is_some() {
            output.output_file = self.output.clone();
        }
        if self.exclude_unresolved {
            output.include_unresolved = false;
        }
        if self.no_statistics {
            output.include_statistics = false;
        }
        if let Some(verbosity) = self.verbosity {
            output.verbosity = verbosity;
        }
        if self.no_color {
            output.colorize = false;
        }

        if let Some(level) = self.log_level {
            config.log_level = level;
        }
        if self.no_cache {
            config.cache_results = false;
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::default(),
    };
    cli.apply(&mut config);
    config.validate()?;

    init_logging(config.log_level, config.output.colorize);
    if let Some(path) = &cli.config {
        info!(path = %path.display(), "Loaded configuration");
    }

    if let Some(path) = &cli.write_config {
        config.to_file(path)?;
        info!(path = %path.display(), "Configuration written");
    }
    let Some(input) = cli.input.as_deref() else {
        return Ok(());
    };

    let pipeline = Pipeline::new(config, cli.tld_file.clone(), RunContext::new("domprobe"))?;

    if cli.generate_only {
        let candidates = pipeline.generate(input)?;
        for candidate in &candidates {
            println!("{}", candidate);
        }
        eprintln!("Generated {} variations", candidates.len());
        return Ok(());
    }

    tokio::select! {
        outcome = pipeline.run(input) => outcome.map(|_| ()),
        _ = tokio::signal::ctrl_c() => Err(ProbeError::Interrupted),
    }
}
