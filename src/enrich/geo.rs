use std::net::IpAddr;
use std::path::Path;
use std::sync::Arc;

use maxminddb::{geoip2, Reader};
use tracing::{debug, info};

use super::{Geolocation, Geolocator};
use crate::error::{Error, Result};

/// GeoLite2-City lookups over one database handle opened at startup.
///
/// Cloning shares the handle; the database is released when the last clone
/// (normally the one owned by the pipeline) is dropped.
#[derive(Clone)]
pub struct MaxMindGeolocator {
    reader: Arc<Reader<Vec<u8>>>,
}

impl MaxMindGeolocator {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = Reader::open_readfile(path).map_err(|source| Error::GeoDatabase {
            path: path.to_path_buf(),
            source,
        })?;
        info!(database = %path.display(), kind = %reader.metadata.database_type, "geolocation database opened");
        Ok(Self {
            reader: Arc::new(reader),
        })
    }
}

impl Geolocator for MaxMindGeolocator {
    fn geolocate(&self, ip: IpAddr) -> Option<Geolocation> {
        let city: geoip2::City = match self.reader.lookup(ip) {
            Ok(city) => city,
            Err(err) => {
                debug!(%ip, error = %err, "no geolocation");
                return None;
            }
        };

        let country_code = city
            .country
            .and_then(|country| country.iso_code)
            .unwrap_or_default()
            .to_string();
        let city_name = city
            .city
            .and_then(|city| city.names)
            .and_then(|names| names.get("en").copied())
            .unwrap_or_default()
            .to_string();

        if country_code.is_empty() && city_name.is_empty() {
            return None;
        }
        Some(Geolocation {
            country_code,
            city: city_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_database_is_reported() {
        let err = MaxMindGeolocator::open("/nonexistent/GeoLite2-City.mmdb").err().unwrap();
        assert!(matches!(err, Error::GeoDatabase { .. }));
        assert!(err.to_string().contains("GeoLite2-City.mmdb"));
    }
}
