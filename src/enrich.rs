//! Network enrichment for the most-referenced domains: one IPv4 address per
//! domain, then ASN/ownership and geo attributes keyed by that address.
//! Every lookup is single-try with a bounded timeout; failures degrade to
//! absent fields and never abort the batch.

use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::time::Duration;

use anyhow::Result;
use hickory_resolver::config::{LookupIpStrategy, ResolverConfig, ResolverOpts};
use hickory_resolver::system_conf::read_system_conf;
use hickory_resolver::TokioAsyncResolver;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info};

use crate::aggregate::DomainCount;
use crate::config::AppConfig;

/// Enrichment result for one domain. Any field past `bookmark_count` may be
/// absent; no resolved address means the ASN/geo lookups were never made.
#[derive(Debug, Clone, PartialEq)]
pub struct HostRecord {
    pub domain: String,
    pub bookmark_count: u64,
    pub ipv4: Option<Ipv4Addr>,
    pub asn: Option<String>,
    pub org: Option<String>,
    pub geo_country: Option<String>,
    pub geo_city: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

#[derive(Debug, Default)]
struct GeoInfo {
    country: Option<String>,
    city: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

pub struct Enricher {
    resolver: TokioAsyncResolver,
    client: Client,
    asn_api_url: String,
    geo_api_url: String,
    top_domains: usize,
    inter_domain_delay: Duration,
    /// Fixed host table that bypasses live DNS resolution. Used by the
    /// integration tests and useful for deterministic offline runs.
    static_hosts: Option<HashMap<String, Ipv4Addr>>,
}

impl Enricher {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let (resolver_config, mut opts) = read_system_conf().unwrap_or_else(|e| {
            debug!("System resolver configuration unavailable ({}), using defaults", e);
            (ResolverConfig::default(), ResolverOpts::default())
        });
        opts.timeout = Duration::from_secs(config.dns.lookup_timeout_secs);
        opts.attempts = 1;
        opts.ip_strategy = LookupIpStrategy::Ipv4Only;
        let resolver = TokioAsyncResolver::tokio(resolver_config, opts);

        let client = Client::builder()
            .timeout(Duration::from_secs(config.http.request_timeout_secs))
            .user_agent(&config.http.user_agent)
            .build()?;

        Ok(Self {
            resolver,
            client,
            asn_api_url: config.enrichment.asn_api_url.clone(),
            geo_api_url: config.enrichment.geo_api_url.trim_end_matches('/').to_string(),
            top_domains: config.enrichment.top_domains,
            inter_domain_delay: Duration::from_millis(config.enrichment.inter_domain_delay_ms),
            static_hosts: None,
        })
    }

    /// Replace live DNS resolution with a fixed host table; domains missing
    /// from the table behave as resolution failures.
    pub fn with_static_hosts(mut self, hosts: HashMap<String, Ipv4Addr>) -> Self {
        self.static_hosts = Some(hosts);
        self
    }

    /// Enrich the top domains by bookmark count, strictly one at a time in
    /// the given (descending-count) order.
    pub async fn enrich_domains(&self, domains: &[DomainCount]) -> Vec<HostRecord> {
        let limit = domains.len().min(self.top_domains);
        if limit < domains.len() {
            info!("Enriching top {} of {} domains", limit, domains.len());
        } else {
            info!("Enriching {} domains", limit);
        }

        let bar = ProgressBar::new(limit as u64);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .expect("valid progress bar template")
                .progress_chars("#>-"),
        );

        let mut records = Vec::with_capacity(limit);
        for entry in &domains[..limit] {
            bar.set_message(entry.domain.clone());
            records.push(self.enrich_domain(&entry.domain, entry.count).await);
            bar.inc(1);
        }
        bar.finish_and_clear();
        records
    }

    async fn enrich_domain(&self, domain: &str, bookmark_count: u64) -> HostRecord {
        let mut record = HostRecord {
            domain: domain.to_string(),
            bookmark_count,
            ipv4: None,
            asn: None,
            org: None,
            geo_country: None,
            geo_city: None,
            lat: None,
            lon: None,
        };

        let Some(ip) = self.resolve_ipv4(domain).await else {
            // No address, no ASN/geo lookups and no courtesy delay.
            debug!("No IPv4 address for {}, skipping ASN and geo lookups", domain);
            return record;
        };
        record.ipv4 = Some(ip);

        match self.lookup_asn(ip).await {
            Ok((asn, org)) => {
                record.asn = asn;
                record.org = org;
            }
            Err(e) => debug!("ASN lookup failed for {} ({}): {}", domain, ip, e),
        }

        match self.lookup_geo(ip).await {
            Ok(geo) => {
                record.geo_country = geo.country;
                record.geo_city = geo.city;
                record.lat = geo.lat;
                record.lon = geo.lon;
            }
            Err(e) => debug!("Geo lookup failed for {} ({}): {}", domain, ip, e),
        }

        // Courtesy pause toward the lookup services before the next domain.
        if !self.inter_domain_delay.is_zero() {
            tokio::time::sleep(self.inter_domain_delay).await;
        }

        record
    }

    async fn resolve_ipv4(&self, domain: &str) -> Option<Ipv4Addr> {
        if let Some(hosts) = &self.static_hosts {
            return hosts.get(domain).copied();
        }
        match self.resolver.ipv4_lookup(domain).await {
            Ok(lookup) => lookup.iter().next().map(|a| a.0),
            Err(e) => {
                debug!("DNS resolution failed for {}: {}", domain, e);
                None
            }
        }
    }

    /// Query the ASN/ownership service. Returns `(asn, holder)`; an empty
    /// `asns` list is a successful lookup with both absent.
    async fn lookup_asn(&self, ip: Ipv4Addr) -> Result<(Option<String>, Option<String>)> {
        let response: Value = self
            .client
            .get(&self.asn_api_url)
            .query(&[("resource", ip.to_string())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let Some(first) = response["data"]["asns"].as_array().and_then(|a| a.first()) else {
            return Ok((None, None));
        };
        // The service reports the AS number as a JSON number; tolerate a
        // string as well.
        let asn = match &first["asn"] {
            Value::Number(n) => Some(n.to_string()),
            Value::String(s) => Some(s.clone()),
            _ => None,
        };
        let org = first["holder"].as_str().map(str::to_string);
        Ok((asn, org))
    }

    /// Query the geo-IP service. Any status other than `"success"` yields
    /// all-absent fields without being an error.
    async fn lookup_geo(&self, ip: Ipv4Addr) -> Result<GeoInfo> {
        let response: Value = self
            .client
            .get(format!("{}/{}", self.geo_api_url, ip))
            .query(&[("fields", "status,country,city,lat,lon")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if response["status"].as_str() != Some("success") {
            debug!("Geo service returned non-success status for {}", ip);
            return Ok(GeoInfo::default());
        }
        Ok(GeoInfo {
            country: response["country"].as_str().map(str::to_string),
            city: response["city"].as_str().map(str::to_string),
            lat: response["lat"].as_f64(),
            lon: response["lon"].as_f64(),
        })
    }
}
