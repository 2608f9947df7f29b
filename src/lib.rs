//! Typosquatting permutation engine with concurrent DNS, GeoIP and whois
//! enrichment.
//!
//! ```no_run
//! use dnsmorph::{candidates, normalize, PslSuffix, Technique};
//!
//! let target = normalize("www.example.com", false, &PslSuffix).unwrap();
//! for candidate in candidates(&Technique::ALL, &target.label) {
//!     println!("{} {}", candidate.technique, target.fqdn(&candidate.label));
//! }
//! ```

pub mod config;
pub mod domain;
pub mod enrich;
pub mod error;
pub mod output;
pub mod permutation;
mod tables;

pub use config::PipelineConfig;
pub use domain::{normalize, validate_domain, DomainTarget, PslSuffix, PublicSuffixResolver};
pub use enrich::{
    Collaborators, EnrichmentJob, Geolocation, Geolocator, LookupError, Pipeline, Record,
    RecordStream, Resolver, WhoisClient, WhoisDates,
};
pub use error::{Error, Result};
pub use permutation::{candidates, generate, Candidate, Technique};
