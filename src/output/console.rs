use std::fmt::Write as _;

use colored::Colorize;

use crate::enrich::Record;
use crate::permutation::Technique;

/// Streams records to stdout, one technique block at a time.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleReporter {
    verbose: bool,
    lookups: bool,
}

impl ConsoleReporter {
    /// `lookups` is whether any enrichment was requested; when it was, records
    /// nothing could be found for are hidden unless `verbose`.
    pub fn new(verbose: bool, lookups: bool) -> Self {
        Self { verbose, lookups }
    }

    pub fn should_show(&self, record: &Record) -> bool {
        self.verbose || !self.lookups || record.is_enriched()
    }

    pub fn print_header(&self, technique: Technique, candidates: usize) {
        println!(
            "\n{} {}",
            technique.as_str().yellow().bold(),
            format!("({} candidates)", candidates).dimmed()
        );
    }

    pub fn print_record(&self, record: &Record) {
        if self.should_show(record) {
            println!("{}", self.format_record(record));
        }
    }

    pub fn format_record(&self, record: &Record) -> String {
        let mut line = format!("  {}", record.domain.bold());
        if let Some(address) = &record.a_record {
            let _ = write!(line, "  {}", address.green());
        }
        if let Some(geolocation) = &record.geolocation {
            let _ = write!(line, "  {}", geolocation.to_string().cyan());
        }
        if let Some(created) = &record.whois_created {
            let _ = write!(line, "  created {}", created.blue());
        }
        if let Some(updated) = &record.whois_updated {
            let _ = write!(line, "  updated {}", updated.blue());
        }
        line
    }
}
