//! Hostname resolution and fallback URL planning
//!
//! Resolution is advisory: the transport asks whether the endpoint's host
//! resolves, and only when it does not does it rewrite the endpoint onto the
//! configured fallback addresses. The hostname then travels in an explicit
//! `Host` header so virtual hosting on the far side still works.

use async_trait::async_trait;
use hickory_resolver::TokioAsyncResolver;
use hickory_resolver::config::{NameServerConfigGroup, ResolverConfig, ResolverOpts};
use hickory_resolver::system_conf::read_system_conf;
use reqwest::Url;
use std::fmt::Display;
use std::net::IpAddr;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

const DNS_PORT: u16 = 53;

/// Why a hostname could not be resolved
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("lookup of {host} failed: {message}")]
    Failed { host: String, message: String },

    #[error("lookup of {host} returned no addresses")]
    NoAddresses { host: String },
}

/// Resolves hostnames to addresses
#[async_trait]
pub trait HostResolver: Send + Sync {
    async fn resolve(&self, host: &str) -> Result<Vec<IpAddr>, LookupError>;
}

/// DNS resolver backed by hickory
///
/// Queries the configured name servers over UDP and TCP on port 53, or the
/// system configuration when none are given.
pub struct DnsHostResolver {
    inner: TokioAsyncResolver,
}

impl DnsHostResolver {
    pub fn new(name_servers: &[IpAddr], timeout: Duration) -> Self {
        let (config, mut opts) = if name_servers.is_empty() {
            debug!("No resolvers configured, using system DNS configuration");
            system_config_or_default(read_system_conf())
        } else {
            let group = NameServerConfigGroup::from_ips_clear(name_servers, DNS_PORT, true);
            (
                ResolverConfig::from_parts(None, vec![], group),
                ResolverOpts::default(),
            )
        };
        opts.timeout = timeout;

        Self {
            inner: TokioAsyncResolver::tokio(config, opts),
        }
    }
}

/// An unreadable system configuration must not stop startup.
fn system_config_or_default<E: Display>(
    system: Result<(ResolverConfig, ResolverOpts), E>,
) -> (ResolverConfig, ResolverOpts) {
    system.unwrap_or_else(|e| {
        warn!("Cannot read system DNS configuration ({}), using built-in defaults", e);
        (ResolverConfig::default(), ResolverOpts::default())
    })
}

#[async_trait]
impl HostResolver for DnsHostResolver {
    async fn resolve(&self, host: &str) -> Result<Vec<IpAddr>, LookupError> {
        if let Ok(ip) = host.parse::<IpAddr>() {
            return Ok(vec![ip]);
        }

        let lookup = self
            .inner
            .lookup_ip(host)
            .await
            .map_err(|e| LookupError::Failed {
                host: host.to_string(),
                message: e.to_string(),
            })?;

        let addresses: Vec<IpAddr> = lookup.iter().collect();
        if addresses.is_empty() {
            return Err(LookupError::NoAddresses {
                host: host.to_string(),
            });
        }
        Ok(addresses)
    }
}

/// One URL to try, with the `Host` header to send when it was rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub url: Url,
    pub host_header: Option<String>,
}

impl Candidate {
    pub fn direct(url: Url) -> Self {
        Self {
            url,
            host_header: None,
        }
    }
}

/// Decide which URLs a dispatch should walk.
///
/// Returns `[endpoint]` when the host is numeric or resolves. Otherwise each
/// fallback address becomes a candidate with the host swapped for the
/// address (scheme, port and path kept). With no fallbacks the endpoint is
/// kept as the only candidate.
pub async fn plan_candidates(
    endpoint: &Url,
    resolver: &dyn HostResolver,
    fallback_addresses: &[IpAddr],
) -> Vec<Candidate> {
    let Some(host) = endpoint.host_str() else {
        return vec![Candidate::direct(endpoint.clone())];
    };
    let host = host.trim_start_matches('[').trim_end_matches(']');
    if host.parse::<IpAddr>().is_ok() {
        return vec![Candidate::direct(endpoint.clone())];
    }

    match resolver.resolve(host).await {
        Ok(addresses) if !addresses.is_empty() => {
            debug!(host, resolved = addresses.len(), "Endpoint host resolved");
            return vec![Candidate::direct(endpoint.clone())];
        }
        Ok(_) => warn!(host, "Endpoint host resolved to no addresses"),
        Err(e) => warn!(host, error = %e, "Endpoint host did not resolve"),
    }

    if fallback_addresses.is_empty() {
        return vec![Candidate::direct(endpoint.clone())];
    }

    let host_header = match endpoint.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    };

    let candidates: Vec<Candidate> = fallback_addresses
        .iter()
        .filter_map(|address| {
            let mut url = endpoint.clone();
            url.set_ip_host(*address).ok()?;
            Some(Candidate {
                url,
                host_header: Some(host_header.clone()),
            })
        })
        .collect();

    if candidates.is_empty() {
        return vec![Candidate::direct(endpoint.clone())];
    }

    debug!(host, candidates = candidates.len(), "Using fallback addresses");
    candidates
}
