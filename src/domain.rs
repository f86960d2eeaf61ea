//! Domain normalization, suffix splitting and validity rules.

use crate::tld::is_known_tld;
use lazy_static::lazy_static;
use std::collections::HashSet;
use url::Url;

/// Multi-label public suffixes recognised by [`KnownSuffixes`].
const MULTI_LABEL_SUFFIXES: &[&str] = &[
    "co.uk", "org.uk", "me.uk", "ac.uk", "gov.uk", "ltd.uk", "plc.uk", "net.uk",
    "com.au", "net.au", "org.au", "edu.au", "gov.au", "asn.au", "id.au",
    "co.nz", "net.nz", "org.nz", "govt.nz", "ac.nz",
    "co.jp", "ne.jp", "or.jp", "ac.jp", "go.jp",
    "co.kr", "or.kr", "ne.kr",
    "com.br", "net.br", "org.br", "gov.br",
    "com.cn", "net.cn", "org.cn", "gov.cn",
    "co.in", "net.in", "org.in", "firm.in", "gen.in",
    "co.za", "org.za", "web.za",
    "com.mx", "org.mx", "gob.mx",
    "com.tr", "net.tr", "org.tr",
    "com.ar", "com.co", "com.sg", "com.hk", "com.tw", "com.my", "com.ph",
    "com.pk", "com.ng", "com.eg", "com.sa", "com.ua", "com.pl", "com.es",
    "co.il", "co.id", "co.th", "co.ke", "in.th", "ac.th",
];

lazy_static! {
    static ref MULTI_LABEL: HashSet<&'static str> = MULTI_LABEL_SUFFIXES.iter().copied().collect();
}

/// Splits a normalized host into its registrable label and public suffix.
pub trait SuffixSplitter: Send + Sync {
    /// Returns `(label, suffix)`, or `None` when no label can be extracted.
    fn split(&self, host: &str) -> Option<(String, String)>;
}

/// Suffix splitter backed by a built-in list of multi-label public suffixes.
///
/// Any final label not covered by the list is treated as a single-label suffix.
#[derive(Debug, Default, Clone, Copy)]
pub struct KnownSuffixes;

impl SuffixSplitter for KnownSuffixes {
    fn split(&self, host: &str) -> Option<(String, String)> {
        let parts: Vec<&str> = host.split('.').collect();
        if parts.iter().any(|p| p.is_empty()) {
            return None;
        }

        let suffix_len = if parts.len() >= 3 && MULTI_LABEL.contains(parts[parts.len() - 2..].join(".").as_str()) {
            2
        } else if parts.len() >= 2 {
            1
        } else {
            0
        };

        // a bare TLD has no registrable label
        if parts.len() == 1 && is_known_tld(parts[0]) {
            return None;
        }

        let label_index = parts.len().checked_sub(suffix_len + 1)?;
        let label = parts[label_index].to_string();
        let suffix = parts[parts.len() - suffix_len..].join(".");
        Some((label, suffix))
    }
}

/// Clean up raw user input into a bare lower-case host name.
///
/// Trims whitespace, lower-cases, strips any URL scheme, path or port, drops one
/// trailing root dot and a leading `www.`.
pub fn normalize(input: &str) -> String {
    let mut host = input.trim().to_lowercase();

    if host.contains("://") {
        if let Some(parsed) = Url::parse(&host).ok().and_then(|u| u.host_str().map(str::to_string)) {
            host = parsed;
        }
    }

    if let Some(end) = host.find(|c: char| matches!(c, '/' | '?' | '#')) {
        host.truncate(end);
    }
    if let Some(colon) = host.rfind(':') {
        if host[colon + 1..].chars().all(|c| c.is_ascii_digit()) {
            host.truncate(colon);
        }
    }
    if host.ends_with('.') {
        host.pop();
    }

    match host.strip_prefix("www.") {
        Some(rest) => rest.to_string(),
        None => host,
    }
}

/// Check a full candidate domain against the name rules.
///
/// At most 253 characters, at least two dot-separated parts, each part 1 to 63
/// characters of alphanumerics, hyphens or non-ASCII code points, never starting or
/// ending with a hyphen.
pub fn is_valid_domain_name(domain: &str) -> bool {
    if domain.is_empty() || domain.chars().count() > 253 {
        return false;
    }

    let parts: Vec<&str> = domain.split('.').collect();
    if parts.len() < 2 {
        return false;
    }

    parts.iter().all(|part| {
        let len = part.chars().count();
        (1..=63).contains(&len)
            && !part.starts_with('-')
            && !part.ends_with('-')
            && part
                .chars()
                .all(|c| c.is_alphanumeric() || c == '-' || !c.is_ascii())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        let cases = [
            ("example.com", "example.com"),
            ("EXAMPLE.COM", "example.com"),
            ("www.example.com", "example.com"),
            ("http://example.com", "example.com"),
            ("https://www.example.com/login?next=1", "example.com"),
            ("  example.com  ", "example.com"),
            ("example.com/path/to", "example.com"),
            ("example.com:8443", "example.com"),
            ("example.com.", "example.com"),
            ("https://www.Example.com./", "example.com"),
            ("www.com", "com"),
        ];
        for (input, expected) in cases {
            assert_eq!(normalize(input), expected, "failed for {:?}", input);
        }
    }

    #[test]
    fn test_split_single_label_suffix() {
        assert_eq!(
            KnownSuffixes.split("example.com"),
            Some(("example".to_string(), "com".to_string()))
        );
        assert_eq!(
            KnownSuffixes.split("login.example.org"),
            Some(("example".to_string(), "org".to_string()))
        );
    }

    #[test]
    fn test_split_multi_label_suffix() {
        assert_eq!(
            KnownSuffixes.split("bbc.co.uk"),
            Some(("bbc".to_string(), "co.uk".to_string()))
        );
        assert_eq!(
            KnownSuffixes.split("shop.example.com.au"),
            Some(("example".to_string(), "com.au".to_string()))
        );
        // Two labels only: the registrable label wins over the suffix list
        assert_eq!(
            KnownSuffixes.split("co.uk"),
            Some(("co".to_string(), "uk".to_string()))
        );
    }

    #[test]
    fn test_split_without_label() {
        assert_eq!(KnownSuffixes.split(""), None);
        assert_eq!(KnownSuffixes.split("example..com"), None);
        assert_eq!(
            KnownSuffixes.split("localhost"),
            Some(("localhost".to_string(), String::new()))
        );
        assert_eq!(KnownSuffixes.split("com"), None);
        assert_eq!(KnownSuffixes.split("uk"), None);
        assert_eq!(KnownSuffixes.split(&normalize("www.com")), None);
        assert_eq!(
            KnownSuffixes.split(&normalize("example.com.")),
            Some(("example".to_string(), "com".to_string()))
        );
    }

    #[test]
    fn test_is_valid_domain_name() {
        for domain in ["example.com", "sub.example.com", "test-domain.org", "a.co", "tеst.com"] {
            assert!(is_valid_domain_name(domain), "should be valid: {}", domain);
        }

        let too_long = format!("{}.com", "a".repeat(254));
        let long_part = format!("{}.com", "a".repeat(64));
        for domain in [
            "",
            "invalid",
            too_long.as_str(),
            long_part.as_str(),
            "-invalid.com",
            "invalid-.com",
            ".com",
            "ex@mple.com",
            "ex!ample.com",
        ] {
            assert!(!is_valid_domain_name(domain), "should be invalid: {}", domain);
        }
    }
}
