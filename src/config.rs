use std::time::Duration;

pub const DEFAULT_CONCURRENCY: usize = 50;
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Immutable settings for one enrichment pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    pub resolve: bool,
    pub geolocate: bool,
    pub whois: bool,
    /// Worker cap. `0` spawns one worker per job.
    pub concurrency: usize,
    /// Applied to every single sub-lookup, not to the whole job.
    pub lookup_timeout: Option<Duration>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            resolve: false,
            geolocate: false,
            whois: false,
            concurrency: DEFAULT_CONCURRENCY,
            lookup_timeout: Some(DEFAULT_LOOKUP_TIMEOUT),
        }
    }
}

impl PipelineConfig {
    pub fn any_lookup(&self) -> bool {
        self.resolve || self.geolocate || self.whois
    }

    pub fn worker_count(&self, jobs: usize) -> usize {
        if self.concurrency == 0 {
            jobs
        } else {
            self.concurrency.min(jobs)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_count() {
        let bounded = PipelineConfig { concurrency: 4, ..Default::default() };
        assert_eq!(bounded.worker_count(100), 4);
        assert_eq!(bounded.worker_count(2), 2);
        assert_eq!(bounded.worker_count(0), 0);

        let unbounded = PipelineConfig { concurrency: 0, ..Default::default() };
        assert_eq!(unbounded.worker_count(270), 270);
    }

    #[test]
    fn test_any_lookup() {
        assert!(!PipelineConfig::default().any_lookup());
        assert!(PipelineConfig { whois: true, ..Default::default() }.any_lookup());
    }
}
