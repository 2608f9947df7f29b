use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use colored::Colorize;
use dnsmorph::config::DEFAULT_LOOKUP_TIMEOUT;
use dnsmorph::domain::host_from_input;
use dnsmorph::enrich::{DnsResolver, MaxMindGeolocator, TcpWhoisClient};
use dnsmorph::output::{ConsoleReporter, ExportFormat};
use dnsmorph::{candidates, normalize, Collaborators, DomainTarget, Pipeline, PslSuffix, Technique};
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::cli::Cli;

pub async fn run_from_cli(cli: Cli) -> anyhow::Result<()> {
    init_tracing(cli.verbose);
    eprintln!("{} v.{}", "DNSMORPH".yellow(), env!("CARGO_PKG_VERSION"));

    let targets = read_inputs(&cli)?
        .iter()
        .map(|input| normalize(&host_from_input(input), cli.include_subdomains, &PslSuffix))
        .collect::<Result<Vec<DomainTarget>, _>>()?;

    let config = cli.pipeline_config();
    let pipeline = Pipeline::new(config, collaborators(&cli)?);
    let techniques = cli.techniques();
    let reporter = ConsoleReporter::new(cli.verbose, config.any_lookup());

    let mut generated = 0;
    for target in &targets {
        info!(%target, label = %target.label, suffix = %target.suffix, "permutating");
        generated += match cli.export_format() {
            Some(format) => export_target(&pipeline, target, &techniques, format, &cli.output_dir).await?,
            None => stream_target(&pipeline, target, &techniques, reporter).await,
        };
    }

    pipeline.shutdown();
    eprintln!("Generated {} variations", generated);
    Ok(())
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let level = if verbose { "debug" } else { "warn" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "dnsmorph={level},trust_dns_proto=warn,trust_dns_resolver=warn"
        ))
    });
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn read_inputs(cli: &Cli) -> anyhow::Result<Vec<String>> {
    if let Some(domain) = &cli.domain {
        return Ok(vec![domain.clone()]);
    }
    let Some(path) = &cli.list else {
        bail!("supply a domain with -d or a list file with -l");
    };

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read domain list {}", path.display()))?;
    let inputs: Vec<String> = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect();

    if inputs.is_empty() {
        bail!("no domains found in {}", path.display());
    }
    Ok(inputs)
}

fn collaborators(cli: &Cli) -> anyhow::Result<Collaborators> {
    let mut collaborators = Collaborators::default();

    if cli.resolve || cli.geolocate {
        collaborators.resolver = Some(Arc::new(DnsResolver::new(cli.lookup_timeout())));
    }
    if cli.geolocate {
        let geolocator = MaxMindGeolocator::open(&cli.geodb)
            .context("geolocation needs a GeoLite2-City database, pass it with --geodb")?;
        collaborators.geolocator = Some(Arc::new(geolocator));
    }
    if cli.whois {
        let io_timeout = cli.lookup_timeout().unwrap_or(DEFAULT_LOOKUP_TIMEOUT);
        collaborators.whois = Some(Arc::new(TcpWhoisClient::new(io_timeout)));
    }

    Ok(collaborators)
}

/// One pipeline run per technique, printing records as they complete.
async fn stream_target(
    pipeline: &Pipeline,
    target: &DomainTarget,
    techniques: &[Technique],
    reporter: ConsoleReporter,
) -> usize {
    println!("{}", target.to_string().bold());

    let mut generated = 0;
    for &technique in techniques {
        let candidates = candidates(&[technique], &target.label);
        reporter.print_header(technique, candidates.len());

        let mut records = pipeline.enrich(pipeline.jobs(target, &candidates));
        while let Some(record) = records.next().await {
            reporter.print_record(&record);
        }
        generated += candidates.len();
    }
    generated
}

/// All techniques through one pipeline run, written out once drained.
async fn export_target(
    pipeline: &Pipeline,
    target: &DomainTarget,
    techniques: &[Technique],
    format: ExportFormat,
    output_dir: &Path,
) -> anyhow::Result<usize> {
    let candidates = candidates(techniques, &target.label);
    let progress = ProgressBar::new(candidates.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("{prefix} [{bar:40}] {pos}/{len} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );
    progress.set_prefix(target.to_string());

    let mut stream = pipeline.enrich(pipeline.jobs(target, &candidates));
    let mut records = Vec::with_capacity(stream.total());
    while let Some(record) = stream.next().await {
        progress.inc(1);
        records.push(record);
    }
    progress.finish_and_clear();

    if records.len() != candidates.len() {
        warn!(expected = candidates.len(), received = records.len(), "some lookups never reported");
    }

    let path = output_dir.join(format!("{}.{}", target, format.extension()));
    format.write(&path, &records)?;
    eprintln!("{} {}", "wrote".green(), path.display());
    Ok(records.len())
}
