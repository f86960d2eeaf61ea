//! Run statistics and the text, JSON and CSV report renderers.

use crate::config::{OutputConfig, OutputFormat};
use crate::error::{ProbeError, Result};
use crate::types::{ResolutionResult, ResolutionStatus};
use chrono::Utc;
use console::{measure_text_width, pad_str, style, truncate_str, Alignment, Color};
use serde::Serialize;
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;
use std::fs;
use std::time::Duration;
use tracing::info;

const TOP_TLD_COUNT: usize = 10;
const ERROR_COLUMN_WIDTH: usize = 40;
pub const REPORT_FORMAT_VERSION: &str = "1.0";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TldCount {
    pub tld: String,
    pub count: usize,
}

/// Aggregate figures over one run's results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    pub total_domains: usize,
    pub resolved_count: usize,
    pub unresolved_count: usize,
    pub error_count: usize,
    pub timeout_count: usize,
    /// Percentage of results that resolved
    pub resolution_rate: f64,
    pub avg_response_time: f64,
    pub min_response_time: f64,
    pub max_response_time: f64,
    pub total_execution_time: f64,
    pub domains_per_second: f64,
    /// Result count per status name, for statuses that occurred
    pub status_distribution: BTreeMap<String, usize>,
    pub top_tlds: Vec<TldCount>,
    pub error_messages: BTreeMap<String, usize>,
}

impl Statistics {
    /// Response-time figures only consider positive times, so cache hits and
    /// synthetic errors do not drag the average down.
    pub fn from_results(results: &[ResolutionResult], elapsed: Duration) -> Self {
        let count = |status: ResolutionStatus| results.iter().filter(|r| r.status == status).count();
        let total = results.len();
        let resolved = count(ResolutionStatus::Resolved);

        let times: Vec<f64> = results
            .iter()
            .map(|r| r.response_time.as_secs_f64())
            .filter(|&t| t > 0.0)
            .collect();
        let (avg, min, max) = if times.is_empty() {
            (0.0, 0.0, 0.0)
        } else {
            (
                times.iter().sum::<f64>() / times.len() as f64,
                times.iter().copied().fold(f64::INFINITY, f64::min),
                times.iter().copied().fold(0.0, f64::max),
            )
        };

        let mut tlds: HashMap<&str, usize> = HashMap::new();
        for result in results {
            if let Some((_, tld)) = result.domain.rsplit_once('.') {
                *tlds.entry(tld).or_insert(0) += 1;
            }
        }
        let mut top_tlds: Vec<TldCount> = tlds
            .into_iter()
            .map(|(tld, count)| TldCount {
                tld: tld.to_string(),
                count,
            })
            .collect();
        top_tlds.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.tld.cmp(&b.tld)));
        top_tlds.truncate(TOP_TLD_COUNT);

        let mut status_distribution = BTreeMap::new();
        for result in results {
            *status_distribution.entry(result.status.to_string()).or_insert(0) += 1;
        }

        let mut error_messages = BTreeMap::new();
        for message in results.iter().filter_map(|r| r.error_message.as_deref()) {
            *error_messages.entry(message.to_string()).or_insert(0) += 1;
        }

        let elapsed_secs = elapsed.as_secs_f64();
        Self {
            total_domains: total,
            resolved_count: resolved,
            unresolved_count: count(ResolutionStatus::Unresolved),
            error_count: count(ResolutionStatus::Errored),
            timeout_count: count(ResolutionStatus::TimedOut),
            resolution_rate: if total == 0 {
                0.0
            } else {
                resolved as f64 / total as f64 * 100.0
            },
            avg_response_time: avg,
            min_response_time: min,
            max_response_time: max,
            total_execution_time: elapsed_secs,
            domains_per_second: if elapsed_secs > 0.0 {
                total as f64 / elapsed_secs
            } else {
                0.0
            },
            status_distribution,
            top_tlds,
            error_messages,
        }
    }
}

#[derive(Serialize)]
struct ReportMetadata {
    timestamp: String,
    /// Every checked domain, including ones filtered out of `results`
    total_domains: usize,
    format_version: &'static str,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    metadata: ReportMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    statistics: Option<&'a Statistics>,
    results: Vec<&'a ResolutionResult>,
}

/// Renders results in the configured format.
pub struct Reporter {
    config: OutputConfig,
}

impl Reporter {
    pub fn new(config: OutputConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &OutputConfig {
        &self.config
    }

    fn visible<'a>(&self, results: &'a [ResolutionResult]) -> Vec<&'a ResolutionResult> {
        results
            .iter()
            .filter(|r| self.config.include_unresolved || r.status != ResolutionStatus::Unresolved)
            .collect()
    }

    pub fn render(&self, results: &[ResolutionResult], elapsed: Duration) -> Result<String> {
        let statistics = self
            .config
            .include_statistics
            .then(|| Statistics::from_results(results, elapsed));
        let visible = self.visible(results);

        match self.config.format {
            OutputFormat::Text => Ok(self.render_text(&visible, statistics.as_ref())),
            OutputFormat::Json => {
                let report = JsonReport {
                    metadata: ReportMetadata {
                        timestamp: Utc::now().to_rfc3339(),
                        total_domains: results.len(),
                        format_version: REPORT_FORMAT_VERSION,
                    },
                    statistics: statistics.as_ref(),
                    results: visible,
                };
                Ok(serde_json::to_string_pretty(&report)?)
            }
            OutputFormat::Csv => Ok(render_csv(&visible)),
        }
    }

    /// Render and send the report to the output file, or stdout.
    pub fn write(&self, results: &[ResolutionResult], elapsed: Duration) -> Result<()> {
        let rendered = self.render(results, elapsed)?;
        match &self.config.output_file {
            Some(path) => {
                fs::write(path, rendered).map_err(|e| {
                    ProbeError::file(path.to_string_lossy(), format!("Failed to write output: {}", e))
                })?;
                info!(path = %path.display(), format = ?self.config.format, "Results saved");
            }
            None => print!("{}", rendered),
        }
        Ok(())
    }

    fn render_text(&self, results: &[&ResolutionResult], statistics: Option<&Statistics>) -> String {
        let show_errors = self.config.verbosity >= 2;
        let colorize = self.config.colorize && self.config.output_file.is_none();

        let rows: Vec<[String; 5]> = results
            .iter()
            .map(|r| {
                let ips = if r.ip_addresses.is_empty() {
                    "-".to_string()
                } else {
                    r.ip_addresses
                        .iter()
                        .map(|ip| ip.to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                };
                let time = if r.response_time.is_zero() {
                    "-".to_string()
                } else {
                    format!("{:.3}s", r.response_time.as_secs_f64())
                };
                [
                    r.domain.clone(),
                    r.status.to_string(),
                    ips,
                    time,
                    truncate_str(r.error_message.as_deref().unwrap_or("-"), ERROR_COLUMN_WIDTH, "...")
                        .into_owned(),
                ]
            })
            .collect();

        let headers = ["DOMAIN", "STATUS", "IP ADDRESSES", "RESPONSE TIME", "ERROR"];
        let columns = if show_errors { 5 } else { 4 };
        let mut widths: Vec<usize> = headers[..columns].iter().map(|h| measure_text_width(h)).collect();
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row.iter()) {
                *width = (*width).max(measure_text_width(cell));
            }
        }

        let mut out = String::new();
        let _ = writeln!(out, "Domain Resolution Results ({} domains)", results.len());
        let header_line: Vec<Cow<'_, str>> = headers[..columns]
            .iter()
            .zip(&widths)
            .map(|(h, w)| pad_str(h, *w, Alignment::Left, None))
            .collect();
        let _ = writeln!(out, "{}", header_line.join("  ").trim_end());
        let _ = writeln!(out, "{}", "-".repeat(widths.iter().sum::<usize>() + 2 * (columns - 1)));

        for (row, result) in rows.iter().zip(results) {
            let cells: Vec<String> = row[..columns]
                .iter()
                .zip(&widths)
                .enumerate()
                .map(|(i, (cell, w))| {
                    let padded = pad_str(cell, *w, Alignment::Left, None);
                    if i == 1 && colorize {
                        // only styled when stdout is a colour-capable terminal
                        style(padded).fg(status_color(result.status)).to_string()
                    } else {
                        padded.into_owned()
                    }
                })
                .collect();
            let _ = writeln!(out, "{}", cells.join("  ").trim_end());
        }

        if let Some(stats) = statistics {
            out.push('\n');
            out.push_str(&render_statistics(stats));
        }
        out
    }
}

fn status_color(status: ResolutionStatus) -> Color {
    match status {
        ResolutionStatus::Resolved => Color::Green,
        ResolutionStatus::Unresolved => Color::Yellow,
        ResolutionStatus::TimedOut => Color::Magenta,
        ResolutionStatus::Errored => Color::Red,
    }
}

/// Scan summary shown on stderr before checking starts.
pub fn render_summary_header(input_domains: usize, generated: usize, format: OutputFormat) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {}",
        style("domprobe").cyan().bold().for_stderr(),
        style(format!("v{}", env!("CARGO_PKG_VERSION"))).dim().for_stderr()
    );
    let _ = writeln!(out, "{}", style("Scan Summary").bold().for_stderr());
    let _ = writeln!(out, "  Input domains:         {}", input_domains);
    let _ = writeln!(out, "  Generated variations:  {}", generated);
    let _ = writeln!(out, "  Output format:         {}", format.as_str().to_uppercase());
    out
}

pub fn render_statistics(stats: &Statistics) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Statistics");
    let _ = writeln!(out, "  Total domains:       {}", stats.total_domains);
    let _ = writeln!(out, "  Resolved:            {}", stats.resolved_count);
    let _ = writeln!(out, "  Unresolved:          {}", stats.unresolved_count);
    let _ = writeln!(out, "  Timeouts:            {}", stats.timeout_count);
    let _ = writeln!(out, "  Errors:              {}", stats.error_count);
    let _ = writeln!(out, "  Resolution rate:     {:.1}%", stats.resolution_rate);
    let _ = writeln!(out, "  Avg response time:   {:.3}s", stats.avg_response_time);
    let _ = writeln!(
        out,
        "  Min/max response:    {:.3}s / {:.3}s",
        stats.min_response_time, stats.max_response_time
    );
    let _ = writeln!(out, "  Execution time:      {:.2}s", stats.total_execution_time);
    let _ = writeln!(out, "  Domains per second:  {:.1}", stats.domains_per_second);

    if !stats.top_tlds.is_empty() {
        let tlds: Vec<String> = stats
            .top_tlds
            .iter()
            .map(|t| format!(".{} ({})", t.tld, t.count))
            .collect();
        let _ = writeln!(out, "  Top TLDs:            {}", tlds.join(", "));
    }
    for (message, count) in &stats.error_messages {
        let _ = writeln!(out, "  Error ({}x): {}", count, message);
    }
    out
}

fn csv_field(value: &str) -> Cow<'_, str> {
    if value.contains(|c: char| matches!(c, ',' | '"' | '\n' | '\r')) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

fn render_csv(results: &[&ResolutionResult]) -> String {
    let mut out = String::from("domain,status,ip_addresses,response_time,error_message,timestamp\n");
    for r in results {
        let ips = r
            .ip_addresses
            .iter()
            .map(|ip| ip.to_string())
            .collect::<Vec<_>>()
            .join(";");
        let _ = writeln!(
            out,
            "{},{},{},{},{},{}",
            csv_field(&r.domain),
            r.status,
            csv_field(&ips),
            r.response_time.as_secs_f64(),
            csv_field(r.error_message.as_deref().unwrap_or("")),
            r.timestamp.to_rfc3339(),
        );
    }
    out
}
