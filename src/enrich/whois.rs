use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

use super::{LookupError, WhoisClient, WhoisDates};
use crate::domain::to_ascii;

const WHOIS_PORT: u16 = 43;
const IANA_WHOIS: &str = "whois.iana.org";

const CREATED_KEYS: &[&str] = &[
    "creation date",
    "created",
    "created on",
    "registered on",
    "registration time",
    "domain registration date",
    "domain name commencement date",
];

const UPDATED_KEYS: &[&str] = &[
    "updated date",
    "last updated",
    "last updated on",
    "last-update",
    "last modified",
    "modified",
    "changed",
];

const UNREGISTERED_MARKERS: &[&str] = &[
    "no match",
    "not found",
    "no entries found",
    "domain status: available",
    "domain not found",
    "no data found",
];

/// Plain whois over TCP port 43: registry server by TLD, IANA otherwise,
/// following at most one `refer:` hop.
pub struct TcpWhoisClient {
    io_timeout: Duration,
}

impl TcpWhoisClient {
    pub fn new(io_timeout: Duration) -> Self {
        Self { io_timeout }
    }

    async fn query(&self, server: &str, domain: &str) -> Result<String, LookupError> {
        let elapsed = |_| LookupError::Timeout(self.io_timeout);

        let mut stream = timeout(self.io_timeout, TcpStream::connect((server, WHOIS_PORT)))
            .await
            .map_err(elapsed)??;

        let query = format!("{}\r\n", domain);
        timeout(self.io_timeout, stream.write_all(query.as_bytes()))
            .await
            .map_err(elapsed)??;

        let mut response = Vec::new();
        timeout(self.io_timeout, stream.read_to_end(&mut response))
            .await
            .map_err(elapsed)??;

        Ok(String::from_utf8_lossy(&response).into_owned())
    }
}

#[async_trait]
impl WhoisClient for TcpWhoisClient {
    async fn whois(&self, domain: &str) -> Result<Option<WhoisDates>, LookupError> {
        let domain = to_ascii(domain).unwrap_or_else(|| domain.to_string());
        let tld = domain.rsplit('.').next().unwrap_or_default();
        let server = whois_server(tld);

        let response = self.query(server, &domain).await?;
        match referral_server(&response).filter(|r| !r.eq_ignore_ascii_case(server)) {
            Some(referral) => {
                debug!(%domain, %referral, "following whois referral");
                let response = self.query(&referral, &domain).await?;
                whois_response_dates(&referral, &response)
            }
            None => whois_response_dates(server, &response),
        }
    }
}

/// Interprets the final answer of a lookup, `server` being the host that sent it.
///
/// IANA only describes TLDs, so its own `created`/`changed` lines are never
/// taken as domain dates. Unregistered markers only count when no dates
/// were found.
pub fn whois_response_dates(server: &str, response: &str) -> Result<Option<WhoisDates>, LookupError> {
    if server.eq_ignore_ascii_case(IANA_WHOIS) {
        return Err(LookupError::Whois("no registry whois server for this tld".to_string()));
    }

    let dates = parse_dates(response);
    if dates.created.is_some() || dates.updated.is_some() {
        return Ok(Some(dates));
    }
    if is_unregistered(response) {
        return Ok(None);
    }
    Err(LookupError::Whois(format!("no dates in response from {server}")))
}

pub fn whois_server(tld: &str) -> &'static str {
    match tld.to_ascii_lowercase().as_str() {
        "com" | "net" => "whois.verisign-grs.com",
        "org" => "whois.pir.org",
        "info" => "whois.afilias.net",
        "biz" => "whois.neulevel.biz",
        "us" => "whois.nic.us",
        "co" => "whois.nic.co",
        "io" => "whois.nic.io",
        "me" => "whois.nic.me",
        "uk" => "whois.nic.uk",
        "ca" => "whois.cira.ca",
        "de" => "whois.denic.de",
        "fr" => "whois.afnic.fr",
        "ru" => "whois.tcinet.ru",
        "cn" => "whois.cnnic.net.cn",
        "jp" => "whois.jprs.jp",
        "au" => "whois.auda.org.au",
        "br" => "whois.registro.br",
        "app" | "dev" => "whois.nic.google",
        "tech" => "whois.nic.tech",
        _ => IANA_WHOIS,
    }
}

fn referral_server(response: &str) -> Option<String> {
    response.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        let value = value.trim();
        (key.trim().eq_ignore_ascii_case("refer") && !value.is_empty()).then(|| value.to_string())
    })
}

pub fn is_unregistered(response: &str) -> bool {
    let response = response.to_lowercase();
    UNREGISTERED_MARKERS.iter().any(|marker| response.contains(marker))
}

/// First creation and update timestamps found in a whois response.
pub fn parse_dates(response: &str) -> WhoisDates {
    let mut dates = WhoisDates::default();

    for line in response.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim().to_ascii_lowercase();
        let value = value.trim();
        if value.is_empty() {
            continue;
        }

        if dates.created.is_none() && CREATED_KEYS.contains(&key.as_str()) {
            dates.created = Some(value.to_string());
        } else if dates.updated.is_none() && UPDATED_KEYS.contains(&key.as_str()) {
            dates.updated = Some(value.to_string());
        }
    }

    dates
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERISIGN: &str = "   Domain Name: GOOGLE.COM\r
   Registry Domain ID: 2138514_DOMAIN_COM-VRSN\r
   Registrar WHOIS Server: whois.markmonitor.com\r
   Updated Date: 2019-09-09T15:39:04Z\r
   Creation Date: 1997-09-15T04:00:00Z\r
   Registry Expiry Date: 2028-09-14T04:00:00Z\r
>>> Last update of whois database: 2024-05-01T10:00:00Z <<<\r
";

    const NOMINET: &str = "
    Domain name:
        bbc.co.uk

    Relevant dates:
        Registered on: before Aug-1996
        Expiry date:  13-Dec-2030
        Last updated:  26-Jun-2023
";

    #[test]
    fn test_parse_verisign_dates() {
        let dates = parse_dates(VERISIGN);
        assert_eq!(dates.created.as_deref(), Some("1997-09-15T04:00:00Z"));
        assert_eq!(dates.updated.as_deref(), Some("2019-09-09T15:39:04Z"));
    }

    #[test]
    fn test_parse_nominet_dates() {
        let dates = parse_dates(NOMINET);
        assert_eq!(dates.created.as_deref(), Some("before Aug-1996"));
        assert_eq!(dates.updated.as_deref(), Some("26-Jun-2023"));
    }

    #[test]
    fn test_parse_denic_changed_only() {
        let dates = parse_dates("Domain: example.de\nStatus: connect\nChanged: 2018-03-12T21:44:25+01:00\n");
        assert_eq!(dates.created, None);
        assert_eq!(dates.updated.as_deref(), Some("2018-03-12T21:44:25+01:00"));
    }

    #[test]
    fn test_unregistered_markers() {
        assert!(is_unregistered("No match for \"EXAMPEL-XYZ.COM\".\r\n"));
        assert!(is_unregistered("Domain not found."));
        assert!(!is_unregistered(VERISIGN));
    }

    #[test]
    fn test_referral_from_iana() {
        let iana = "% IANA WHOIS server\n\ndomain:       XYZ\n\nrefer:        whois.nic.xyz\n";
        assert_eq!(referral_server(iana).as_deref(), Some("whois.nic.xyz"));
        assert_eq!(referral_server(VERISIGN), None);
    }

    const IANA_TLD_RECORD: &str = "% IANA WHOIS server\n\ndomain:       GR\n\norganisation: ICS-FORTH GR\n\ncreated:      1989-07-24\nchanged:      2023-11-13\nsource:       IANA\n";

    #[test]
    fn test_iana_tld_record_is_not_domain_dates() {
        assert_eq!(whois_server("gr"), IANA_WHOIS);
        assert_eq!(referral_server(IANA_TLD_RECORD), None);
        assert!(parse_dates(IANA_TLD_RECORD).created.is_some());
        assert!(matches!(
            whois_response_dates(IANA_WHOIS, IANA_TLD_RECORD),
            Err(LookupError::Whois(_))
        ));
    }

    #[test]
    fn test_dates_win_over_unregistered_boilerplate() {
        let response = format!("{VERISIGN}NOTICE: if a record is not found, contact the registrar.\r\n");
        assert!(is_unregistered(&response));

        let dates = whois_response_dates("whois.verisign-grs.com", &response).unwrap().unwrap();
        assert_eq!(dates.created.as_deref(), Some("1997-09-15T04:00:00Z"));
        assert_eq!(dates.updated.as_deref(), Some("2019-09-09T15:39:04Z"));
    }

    #[test]
    fn test_response_without_dates() {
        assert_eq!(
            whois_response_dates("whois.verisign-grs.com", "No match for \"EXAMPEL-XYZ.COM\".\r\n").unwrap(),
            None
        );
        assert!(matches!(
            whois_response_dates("whois.nic.uk", "Domain name: bbc.co.uk\n"),
            Err(LookupError::Whois(_))
        ));
    }

    #[test]
    fn test_whois_server_selection() {
        assert_eq!(whois_server("com"), "whois.verisign-grs.com");
        assert_eq!(whois_server("UK"), "whois.nic.uk");
        assert_eq!(whois_server("dev"), "whois.nic.google");
        assert_eq!(whois_server("xyz"), IANA_WHOIS);
    }
}
