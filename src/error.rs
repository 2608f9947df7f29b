use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors: bad input or I/O the run cannot continue without.
#[derive(Debug, Error)]
pub enum Error {
    #[error("please supply a valid domain: {0:?}")]
    InvalidDomain(String),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot open geolocation database {}: {source}", path.display())]
    GeoDatabase {
        path: PathBuf,
        #[source]
        source: maxminddb::MaxMindDBError,
    },

    #[error("json export: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv export: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
