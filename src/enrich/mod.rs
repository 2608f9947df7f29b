//! Concurrent DNS / GeoIP / whois enrichment of generated candidates.
//!
//! Each [`EnrichmentJob`] yields exactly one [`Record`]. Lookup failures
//! never surface as errors: the affected field is simply left empty.

pub mod dns;
pub mod geo;
pub mod whois;

use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::net::{IpAddr, Ipv4Addr};
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::domain::DomainTarget;
use crate::permutation::{Candidate, Technique};

pub use dns::DnsResolver;
pub use geo::MaxMindGeolocator;
pub use whois::TcpWhoisClient;

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("dns: {0}")]
    Resolve(#[from] trust_dns_resolver::error::ResolveError),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("whois: {0}")]
    Whois(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Geolocation {
    pub country_code: String,
    pub city: String,
}

impl fmt::Display for Geolocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.country_code.is_empty(), self.city.is_empty()) {
            (_, true) => f.write_str(&self.country_code),
            (true, false) => f.write_str(&self.city),
            (false, false) => write!(f, "{}, {}", self.country_code, self.city),
        }
    }
}

/// Registration timestamps, verbatim as the registry returned them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WhoisDates {
    pub created: Option<String>,
    pub updated: Option<String>,
}

/// The enrichment outcome for one candidate domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub technique: Technique,
    pub domain: String,
    #[serde(default)]
    pub a_record: Option<String>,
    #[serde(default)]
    pub geolocation: Option<Geolocation>,
    #[serde(rename = "whoiscreation", default)]
    pub whois_created: Option<String>,
    #[serde(rename = "whoismodification", default)]
    pub whois_updated: Option<String>,
}

impl Record {
    pub fn new(technique: Technique, domain: impl Into<String>) -> Self {
        Self {
            technique,
            domain: domain.into(),
            a_record: None,
            geolocation: None,
            whois_created: None,
            whois_updated: None,
        }
    }

    pub fn is_enriched(&self) -> bool {
        self.a_record.is_some()
            || self.geolocation.is_some()
            || self.whois_created.is_some()
            || self.whois_updated.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentJob {
    pub technique: Technique,
    pub domain: String,
    pub want_resolve: bool,
    pub want_geo: bool,
    pub want_whois: bool,
}

#[async_trait]
pub trait Resolver: Send + Sync {
    async fn resolve(&self, domain: &str) -> Result<Option<Ipv4Addr>, LookupError>;
}

pub trait Geolocator: Send + Sync {
    fn geolocate(&self, ip: IpAddr) -> Option<Geolocation>;
}

#[async_trait]
pub trait WhoisClient: Send + Sync {
    async fn whois(&self, domain: &str) -> Result<Option<WhoisDates>, LookupError>;
}

/// External lookup backends. A missing backend behaves like a failed lookup.
#[derive(Clone, Default)]
pub struct Collaborators {
    pub resolver: Option<Arc<dyn Resolver>>,
    pub geolocator: Option<Arc<dyn Geolocator>>,
    pub whois: Option<Arc<dyn WhoisClient>>,
}

struct Lookups {
    config: PipelineConfig,
    collaborators: Collaborators,
}

impl Lookups {
    async fn run(&self, job: EnrichmentJob) -> Record {
        let EnrichmentJob {
            technique,
            domain,
            want_resolve,
            want_geo,
            want_whois,
        } = job;

        // Geolocation needs an address even when A records were not asked for.
        let address_then_geo = async {
            let address = if want_resolve || want_geo {
                self.resolve(&domain).await
            } else {
                None
            };
            let geolocation = match address {
                Some(ip) if want_geo => self.geolocate(ip),
                _ => None,
            };
            (address, geolocation)
        };
        let registration = async {
            if want_whois {
                self.whois(&domain).await
            } else {
                None
            }
        };

        let ((address, geolocation), dates) = tokio::join!(address_then_geo, registration);
        let dates = dates.unwrap_or_default();

        Record {
            technique,
            a_record: address.filter(|_| want_resolve).map(|ip| ip.to_string()),
            geolocation,
            whois_created: dates.created,
            whois_updated: dates.updated,
            domain,
        }
    }

    async fn resolve(&self, domain: &str) -> Option<Ipv4Addr> {
        let resolver = self.collaborators.resolver.as_ref()?;
        match self.limited(resolver.resolve(domain)).await {
            Ok(address) => address,
            Err(err) => {
                debug!(domain, error = %err, "A lookup failed");
                None
            }
        }
    }

    fn geolocate(&self, ip: Ipv4Addr) -> Option<Geolocation> {
        self.collaborators.geolocator.as_ref()?.geolocate(IpAddr::V4(ip))
    }

    async fn whois(&self, domain: &str) -> Option<WhoisDates> {
        let client = self.collaborators.whois.as_ref()?;
        match self.limited(client.whois(domain)).await {
            Ok(dates) => dates,
            Err(err) => {
                debug!(domain, error = %err, "whois lookup failed");
                None
            }
        }
    }

    async fn limited<T>(
        &self,
        lookup: impl Future<Output = Result<T, LookupError>>,
    ) -> Result<T, LookupError> {
        match self.config.lookup_timeout {
            Some(limit) => tokio::time::timeout(limit, lookup)
                .await
                .unwrap_or_else(|_| Err(LookupError::Timeout(limit))),
            None => lookup.await,
        }
    }
}

/// Fans enrichment jobs out over a bounded worker pool.
///
/// Built once per run from an immutable [`PipelineConfig`]; every call to
/// [`Pipeline::enrich`] gets its own queue, channel and completion counter.
pub struct Pipeline {
    lookups: Arc<Lookups>,
}

impl Pipeline {
    pub fn new(config: PipelineConfig, collaborators: Collaborators) -> Self {
        Self {
            lookups: Arc::new(Lookups {
                config,
                collaborators,
            }),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.lookups.config
    }

    pub fn jobs(&self, target: &DomainTarget, candidates: &[Candidate]) -> Vec<EnrichmentJob> {
        let config = self.config();
        candidates
            .iter()
            .map(|candidate| EnrichmentJob {
                technique: candidate.technique,
                domain: target.fqdn(&candidate.label),
                want_resolve: config.resolve,
                want_geo: config.geolocate,
                want_whois: config.whois,
            })
            .collect()
    }

    /// Starts the workers and returns the stream of records in completion
    /// order. Must be called from within a tokio runtime.
    pub fn enrich(&self, jobs: Vec<EnrichmentJob>) -> RecordStream {
        let total = jobs.len();
        let workers = self.config().worker_count(total);
        let queue = Arc::new(Mutex::new(VecDeque::from(jobs)));
        let completed = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = mpsc::channel(1);

        info!(jobs = total, workers, "enrichment started");

        for _ in 0..workers {
            let queue = Arc::clone(&queue);
            let lookups = Arc::clone(&self.lookups);
            let completed = Arc::clone(&completed);
            let tx = tx.clone();

            tokio::spawn(async move {
                loop {
                    let next = queue.lock().await.pop_front();
                    let Some(job) = next else { break };

                    let record = lookups.run(job).await;
                    completed.fetch_add(1, Ordering::Relaxed);

                    if tx.send(record).await.is_err() {
                        break;
                    }
                }
            });
        }

        RecordStream {
            rx,
            total,
            received: 0,
            completed,
        }
    }

    /// Releases the lookup backends, including the shared GeoIP handle.
    pub fn shutdown(self) {
        match Arc::try_unwrap(self.lookups) {
            Ok(lookups) => {
                drop(lookups);
                debug!("lookup backends released");
            }
            Err(_) => debug!("pipeline shut down while workers are still draining"),
        }
    }
}

/// Records as jobs complete; ends after the last job has reported.
pub struct RecordStream {
    rx: mpsc::Receiver<Record>,
    total: usize,
    received: usize,
    completed: Arc<AtomicUsize>,
}

impl RecordStream {
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Relaxed)
    }

    pub async fn collect_all(mut self) -> Vec<Record> {
        let mut records = Vec::with_capacity(self.total);
        while let Some(record) = self.next().await {
            records.push(record);
        }
        records
    }
}

impl Stream for RecordStream {
    type Item = Record;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Record>> {
        let polled = self.rx.poll_recv(cx);
        match &polled {
            Poll::Ready(Some(_)) => self.received += 1,
            Poll::Ready(None) => debug!(records = self.received, "enrichment finished"),
            Poll::Pending => {}
        }
        polled
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.total.saturating_sub(self.received);
        (left, Some(left))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[derive(Default)]
    struct MockResolver {
        failing: HashSet<String>,
        delay: Duration,
        calls: AtomicUsize,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    #[async_trait]
    impl Resolver for MockResolver {
        async fn resolve(&self, domain: &str) -> Result<Option<Ipv4Addr>, LookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.failing.contains(domain) {
                Err(LookupError::Io(std::io::ErrorKind::ConnectionRefused.into()))
            } else {
                Ok(Some(Ipv4Addr::new(192, 0, 2, 1)))
            }
        }
    }

    struct MockGeolocator;

    impl Geolocator for MockGeolocator {
        fn geolocate(&self, _ip: IpAddr) -> Option<Geolocation> {
            Some(Geolocation {
                country_code: "US".into(),
                city: "Springfield".into(),
            })
        }
    }

    struct MockWhois;

    #[async_trait]
    impl WhoisClient for MockWhois {
        async fn whois(&self, domain: &str) -> Result<Option<WhoisDates>, LookupError> {
            if domain.starts_with("unregistered") {
                return Ok(None);
            }
            Ok(Some(WhoisDates {
                created: Some("1997-09-15T04:00:00Z".into()),
                updated: Some("2019-09-09T15:39:04Z".into()),
            }))
        }
    }

    fn job(domain: &str, resolve: bool, geo: bool, whois: bool) -> EnrichmentJob {
        EnrichmentJob {
            technique: Technique::Addition,
            domain: domain.to_string(),
            want_resolve: resolve,
            want_geo: geo,
            want_whois: whois,
        }
    }

    fn pipeline(config: PipelineConfig, resolver: Arc<MockResolver>) -> Pipeline {
        Pipeline::new(
            config,
            Collaborators {
                resolver: Some(resolver),
                geolocator: Some(Arc::new(MockGeolocator)),
                whois: Some(Arc::new(MockWhois)),
            },
        )
    }

    #[tokio::test]
    async fn test_one_record_per_job() {
        let resolver = Arc::new(MockResolver::default());
        let pipeline = pipeline(PipelineConfig { concurrency: 4, ..Default::default() }, resolver);

        let jobs: Vec<_> = (0..25).map(|i| job(&format!("d{i}.com"), true, false, false)).collect();
        let mut stream = pipeline.enrich(jobs);
        assert_eq!(stream.total(), 25);
        assert_eq!(stream.size_hint(), (25, Some(25)));

        let mut records = Vec::new();
        while let Some(record) = stream.next().await {
            records.push(record);
        }
        assert_eq!(records.len(), 25);
        assert_eq!(stream.completed(), 25);
        assert_eq!(stream.size_hint(), (0, Some(0)));
        let domains: HashSet<_> = records.iter().map(|r| r.domain.as_str()).collect();
        assert_eq!(domains.len(), 25);
        assert!(records.iter().all(|r| r.a_record.as_deref() == Some("192.0.2.1")));
    }

    #[tokio::test]
    async fn test_empty_batch_closes_immediately() {
        let pipeline = pipeline(PipelineConfig::default(), Arc::new(MockResolver::default()));
        let mut stream = pipeline.enrich(Vec::new());
        assert!(stream.next().await.is_none());
        assert_eq!(stream.completed(), 0);
    }

    #[tokio::test]
    async fn test_failed_resolution_leaves_other_fields_alone() {
        let resolver = Arc::new(MockResolver {
            failing: ["broken.com".to_string()].into_iter().collect(),
            ..Default::default()
        });
        let pipeline = pipeline(PipelineConfig::default(), resolver);

        let records = pipeline
            .enrich(vec![
                job("broken.com", true, true, true),
                job("fine.com", true, true, true),
                job("unregistered.com", true, false, true),
            ])
            .collect_all()
            .await;

        let by_domain = |d: &str| records.iter().find(|r| r.domain == d).unwrap().clone();

        let broken = by_domain("broken.com");
        assert_eq!(broken.a_record, None);
        assert_eq!(broken.geolocation, None);
        assert_eq!(broken.whois_created.as_deref(), Some("1997-09-15T04:00:00Z"));

        let fine = by_domain("fine.com");
        assert_eq!(fine.a_record.as_deref(), Some("192.0.2.1"));
        assert_eq!(fine.geolocation.as_ref().map(|g| g.to_string()).as_deref(), Some("US, Springfield"));
        assert_eq!(fine.whois_updated.as_deref(), Some("2019-09-09T15:39:04Z"));

        let unregistered = by_domain("unregistered.com");
        assert!(unregistered.a_record.is_some());
        assert_eq!(unregistered.whois_created, None);
        assert_eq!(unregistered.whois_updated, None);
    }

    #[tokio::test]
    async fn test_geolocation_without_reporting_address() {
        let pipeline = pipeline(PipelineConfig::default(), Arc::new(MockResolver::default()));
        let records = pipeline.enrich(vec![job("geo.com", false, true, false)]).collect_all().await;
        assert_eq!(records[0].a_record, None);
        assert!(records[0].geolocation.is_some());
    }

    #[tokio::test]
    async fn test_no_lookups_when_nothing_is_wanted() {
        let resolver = Arc::new(MockResolver::default());
        let pipeline = pipeline(PipelineConfig::default(), Arc::clone(&resolver));

        let records = pipeline
            .enrich(vec![job("a.com", false, false, false), job("b.com", false, false, false)])
            .collect_all()
            .await;

        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| !r.is_enriched()));
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_backend_is_an_empty_field() {
        let pipeline = Pipeline::new(PipelineConfig::default(), Collaborators::default());
        let records = pipeline.enrich(vec![job("a.com", true, true, true)]).collect_all().await;
        assert_eq!(records, vec![Record::new(Technique::Addition, "a.com")]);
    }

    #[tokio::test]
    async fn test_worker_pool_caps_concurrency() {
        let resolver = Arc::new(MockResolver {
            delay: Duration::from_millis(10),
            ..Default::default()
        });
        let pipeline = pipeline(
            PipelineConfig { concurrency: 3, ..Default::default() },
            Arc::clone(&resolver),
        );

        let jobs: Vec<_> = (0..20).map(|i| job(&format!("d{i}.com"), true, false, false)).collect();
        let stream = pipeline.enrich(jobs);
        let records = stream.collect_all().await;

        assert_eq!(records.len(), 20);
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 20);
        assert!(resolver.max_in_flight.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn test_zero_concurrency_fans_out_per_job() {
        let resolver = Arc::new(MockResolver {
            delay: Duration::from_millis(50),
            ..Default::default()
        });
        let pipeline = pipeline(
            PipelineConfig { concurrency: 0, ..Default::default() },
            Arc::clone(&resolver),
        );

        let jobs: Vec<_> = (0..30).map(|i| job(&format!("d{i}.com"), true, false, false)).collect();
        let records = pipeline.enrich(jobs).collect_all().await;

        assert_eq!(records.len(), 30);
        assert!(resolver.max_in_flight.load(Ordering::SeqCst) > 3);
    }

    #[tokio::test]
    async fn test_slow_lookup_times_out_to_empty() {
        let resolver = Arc::new(MockResolver {
            delay: Duration::from_millis(500),
            ..Default::default()
        });
        let pipeline = pipeline(
            PipelineConfig {
                lookup_timeout: Some(Duration::from_millis(20)),
                ..Default::default()
            },
            resolver,
        );

        let records = pipeline.enrich(vec![job("slow.com", true, false, true)]).collect_all().await;
        assert_eq!(records[0].a_record, None);
        assert!(records[0].whois_created.is_some());
    }

    #[test]
    fn test_jobs_carry_config_flags() {
        let config = PipelineConfig { resolve: true, whois: true, ..Default::default() };
        let pipeline = pipeline(config, Arc::new(MockResolver::default()));
        let target = DomainTarget { label: "test".into(), suffix: "co.uk".into() };
        let candidates = vec![Candidate { technique: Technique::Omission, label: "est".into() }];

        let jobs = pipeline.jobs(&target, &candidates);
        assert_eq!(
            jobs,
            vec![EnrichmentJob {
                technique: Technique::Omission,
                domain: "est.co.uk".into(),
                want_resolve: true,
                want_geo: false,
                want_whois: true,
            }]
        );
        pipeline.shutdown();
    }
}
