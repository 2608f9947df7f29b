use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgGroup, Parser};
use dnsmorph::config::DEFAULT_CONCURRENCY;
use dnsmorph::output::ExportFormat;
use dnsmorph::{PipelineConfig, Technique};

#[derive(Parser, Debug)]
#[command(name = "dnsmorph", version)]
#[command(about = "Generate typosquatting and homograph permutations of a domain and look them up")]
#[command(group(ArgGroup::new("input").required(true).args(["domain", "list"])))]
pub struct Cli {
    /// Domain (or URL) to permutate
    #[arg(short, long)]
    pub domain: Option<String>,

    /// File with one domain per line
    #[arg(short, long, value_name = "FILE")]
    pub list: Option<PathBuf>,

    /// Resolve A records for every candidate
    #[arg(short, long)]
    pub resolve: bool,

    /// Geolocate resolved addresses (needs --geodb)
    #[arg(short, long)]
    pub geolocate: bool,

    /// Look up whois creation and modification dates
    #[arg(short, long)]
    pub whois: bool,

    /// Permutate subdomains as well as the registrable name
    #[arg(short, long)]
    pub include_subdomains: bool,

    /// Show every candidate, even without lookup results, and log debug output
    #[arg(short, long)]
    pub verbose: bool,

    /// Export results as CSV instead of printing them
    #[arg(long, conflicts_with = "json")]
    pub csv: bool,

    /// Export results as JSON instead of printing them
    #[arg(long)]
    pub json: bool,

    /// Directory the CSV/JSON export is written to
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Only run these techniques (default: all)
    #[arg(short, long = "technique", value_enum, value_delimiter = ',')]
    pub techniques: Vec<Technique>,

    /// Maximum concurrent lookups, 0 for one task per candidate
    #[arg(short, long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Timeout for a single lookup in seconds, 0 to disable
    #[arg(long, value_name = "SECS", default_value_t = 5)]
    pub timeout: u64,

    /// GeoLite2-City database used by --geolocate
    #[arg(long, value_name = "PATH", default_value = "GeoLite2-City.mmdb")]
    pub geodb: PathBuf,
}

impl Cli {
    pub fn lookup_timeout(&self) -> Option<Duration> {
        (self.timeout > 0).then(|| Duration::from_secs(self.timeout))
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            resolve: self.resolve,
            geolocate: self.geolocate,
            whois: self.whois,
            concurrency: self.concurrency,
            lookup_timeout: self.lookup_timeout(),
        }
    }

    pub fn export_format(&self) -> Option<ExportFormat> {
        if self.csv {
            Some(ExportFormat::Csv)
        } else if self.json {
            Some(ExportFormat::Json)
        } else {
            None
        }
    }

    /// Selected techniques in reporting order, all ten when none were given.
    pub fn techniques(&self) -> Vec<Technique> {
        if self.techniques.is_empty() {
            return Technique::ALL.to_vec();
        }
        Technique::ALL
            .into_iter()
            .filter(|t| self.techniques.contains(t))
            .collect()
    }
}
