use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use async_trait::async_trait;
use trust_dns_resolver::config::{LookupIpStrategy, ResolverConfig, ResolverOpts};
use trust_dns_resolver::error::ResolveErrorKind;
use trust_dns_resolver::TokioAsyncResolver;

use super::{LookupError, Resolver};
use crate::domain::to_ascii;

/// A-record lookups through a shared tokio resolver.
pub struct DnsResolver {
    resolver: TokioAsyncResolver,
}

impl DnsResolver {
    pub fn new(timeout: Option<Duration>) -> Self {
        let mut opts = ResolverOpts::default();
        opts.ip_strategy = LookupIpStrategy::Ipv4Only;
        // The pipeline's own timeout bounds the whole lookup; keep a single attempt.
        opts.attempts = 1;
        if let Some(timeout) = timeout {
            opts.timeout = timeout;
        }
        Self {
            resolver: TokioAsyncResolver::tokio(ResolverConfig::default(), opts),
        }
    }
}

#[async_trait]
impl Resolver for DnsResolver {
    async fn resolve(&self, domain: &str) -> Result<Option<Ipv4Addr>, LookupError> {
        let name = to_ascii(domain).unwrap_or_else(|| domain.to_string());
        // Fully qualified, so search domains from resolv.conf are not appended.
        let lookup = match self.resolver.lookup_ip(format!("{name}.")).await {
            Ok(lookup) => lookup,
            Err(err) if matches!(err.kind(), ResolveErrorKind::NoRecordsFound { .. }) => {
                return Ok(None)
            }
            Err(err) => return Err(err.into()),
        };

        Ok(lookup.iter().find_map(|ip| match ip {
            IpAddr::V4(v4) => Some(v4),
            IpAddr::V6(_) => None,
        }))
    }
}
