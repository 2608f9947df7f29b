//! Input validation and the `(label, suffix)` split.

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use url::{Host, Url};

use crate::error::{Error, Result};

lazy_static! {
    // 1-63 chars per label, no leading/trailing hyphen, alphabetic start on the TLD.
    static ref DOMAIN_RE: Regex = Regex::new(
        r"(?i)^(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z](?:[a-z0-9-]{0,61}[a-z0-9])?$"
    )
    .expect("domain grammar is a valid regex");
}

const MAX_DOMAIN_LEN: usize = 253;

/// Resolves the public suffix (`com`, `co.uk`, ...) of a domain.
pub trait PublicSuffixResolver: Send + Sync {
    fn effective_suffix(&self, domain: &str) -> Option<String>;
}

/// Public suffix lookups against the list compiled into the `psl` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct PslSuffix;

impl PublicSuffixResolver for PslSuffix {
    fn effective_suffix(&self, domain: &str) -> Option<String> {
        psl::suffix_str(domain).map(str::to_string)
    }
}

/// A validated domain split into its mutable label and its public suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainTarget {
    pub label: String,
    pub suffix: String,
}

impl DomainTarget {
    /// Joins a (mutated) label back onto this target's suffix.
    pub fn fqdn(&self, label: &str) -> String {
        format!("{}.{}", label, self.suffix)
    }
}

impl fmt::Display for DomainTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.label, self.suffix)
    }
}

pub fn validate_domain(domain: &str) -> bool {
    domain.len() <= MAX_DOMAIN_LEN && DOMAIN_RE.is_match(domain)
}

/// Validates `input` and splits it into label and suffix.
///
/// Without `include_subdomains` the label is the registrable name only
/// (`subdomain.test.co.uk` gives `test`); with it, everything left of the
/// suffix is kept (`subdomain.test`).
pub fn normalize(
    input: &str,
    include_subdomains: bool,
    suffixes: &dyn PublicSuffixResolver,
) -> Result<DomainTarget> {
    let domain = input.trim().trim_end_matches('.').to_ascii_lowercase();
    let invalid = || Error::InvalidDomain(input.to_string());

    if !validate_domain(&domain) {
        return Err(invalid());
    }

    let suffix = suffixes
        .effective_suffix(&domain)
        .filter(|s| !s.is_empty())
        .ok_or_else(invalid)?;

    let left = domain
        .strip_suffix(suffix.as_str())
        .and_then(|rest| rest.strip_suffix('.'))
        .filter(|rest| !rest.is_empty())
        .ok_or_else(invalid)?;

    let label = if include_subdomains {
        left
    } else {
        left.rsplit('.').next().unwrap_or(left)
    };

    Ok(DomainTarget {
        label: label.to_string(),
        suffix,
    })
}

/// IDNA (punycode) form of a domain, `None` if it cannot be encoded.
pub fn to_ascii(domain: &str) -> Option<String> {
    match Host::parse(domain) {
        Ok(Host::Domain(ascii)) => Some(ascii),
        _ => None,
    }
}

/// Accepts a bare domain or a URL and returns the host part.
pub fn host_from_input(input: &str) -> String {
    let input = input.trim();
    if input.contains("://") {
        if let Some(host) = Url::parse(input)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
        {
            return host;
        }
    }
    input.to_string()
}
