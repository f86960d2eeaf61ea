//! Input domain loading: a single domain argument or a file of domains.

use crate::error::{ProbeError, Result};
use std::fs;
use std::path::Path;
use tracing::info;

/// Extensions that mark an argument as a file even when it contains a dot.
const FILE_EXTENSIONS: &[&str] = &["txt", "csv", "json", "log", "conf", "cfg", "ini", "yaml", "yml"];

/// Guess whether a command line argument is a domain rather than a file path.
pub fn is_domain_name(input: &str) -> bool {
    let input = input.trim();

    if input.contains('/') || input.contains('\\') || input.starts_with('.') {
        return false;
    }

    if let Some((_, last)) = input.rsplit_once('.') {
        if FILE_EXTENSIONS.contains(&last.to_lowercase().as_str()) {
            return false;
        }
    }

    input.contains('.')
        && (4..=253).contains(&input.len())
        && input
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
}

/// Resolve an input argument into the list of domains to process.
pub fn load_domains(input: &str) -> Result<Vec<String>> {
    if is_domain_name(input) {
        let domain = input.trim().to_lowercase();
        info!(domain = %domain, "Processing single domain");
        return Ok(vec![domain]);
    }
    load_domains_from_file(input)
}

/// One domain per line; blank lines and `#` comments are skipped.
pub fn load_domains_from_file<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        ProbeError::file(path.to_string_lossy(), format!("Failed to read domains file: {}", e))
    })?;

    let domains: Vec<String> = content
        .lines()
        .map(|line| line.trim().to_lowercase())
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect();

    if domains.is_empty() {
        return Err(ProbeError::file(path.to_string_lossy(), "No domains found in file"));
    }

    info!(count = domains.len(), path = %path.display(), "Loaded input domains");
    Ok(domains)
}
