use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::enrich::Record;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    pub fn write(self, path: &Path, records: &[Record]) -> Result<()> {
        match self {
            ExportFormat::Csv => write_csv(path, records),
            ExportFormat::Json => write_json(path, records),
        }
    }
}

#[derive(Serialize)]
struct ExportRef<'a> {
    results: &'a [Record],
}

#[derive(Deserialize)]
struct Export {
    results: Vec<Record>,
}

pub fn to_json_string(records: &[Record]) -> Result<String> {
    Ok(serde_json::to_string_pretty(&ExportRef { results: records })?)
}

pub fn from_json_str(json: &str) -> Result<Vec<Record>> {
    Ok(serde_json::from_str::<Export>(json)?.results)
}

pub fn write_json(path: &Path, records: &[Record]) -> Result<()> {
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &ExportRef { results: records })?;
    writer.flush().map_err(|e| Error::io(path, e))?;
    info!(path = %path.display(), records = records.len(), "json export written");
    Ok(())
}

pub fn read_json(path: &Path) -> Result<Vec<Record>> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let export: Export = serde_json::from_reader(BufReader::new(file))?;
    Ok(export.results)
}

/// Columns: technique, domain, a_record, geolocation, whoiscreation,
/// whoismodification. Missing values are empty cells.
pub fn csv_row(record: &Record) -> [String; 6] {
    [
        record.technique.to_string(),
        record.domain.clone(),
        record.a_record.clone().unwrap_or_default(),
        record
            .geolocation
            .as_ref()
            .map(|g| g.to_string())
            .unwrap_or_default(),
        record.whois_created.clone().unwrap_or_default(),
        record.whois_updated.clone().unwrap_or_default(),
    ]
}

pub fn write_csv(path: &Path, records: &[Record]) -> Result<()> {
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    for record in records {
        writer.write_record(csv_row(record))?;
    }
    writer.flush().map_err(|e| Error::io(path, e))?;
    info!(path = %path.display(), records = records.len(), "csv export written");
    Ok(())
}
