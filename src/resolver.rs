//! Alias resolution against the configured nameservers.

use async_trait::async_trait;
use hickory_resolver::config::{LookupIpStrategy, NameServerConfig, ResolverConfig, ResolverOpts};
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::proto::op::ResponseCode;
use hickory_resolver::proto::xfer::Protocol;
use hickory_resolver::proto::ProtoErrorKind;
use hickory_resolver::{ResolveError, ResolveErrorKind, TokioResolver};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tracing::{trace, warn};

use crate::error::ResolveFailure;
use crate::metrics::{self, ResolutionResult, Timer};

/// Default DNS port when a nameserver entry has none.
const DNS_PORT: u16 = 53;

/// Resolves a hostname to its addresses.
#[async_trait]
pub trait AliasResolver: Send + Sync {
    /// Resolve `host`. An empty answer is reported as [`ResolveFailure::NoAnswer`].
    async fn resolve(&self, host: &str) -> Result<Vec<IpAddr>, ResolveFailure>;
}

/// Parse a nameserver entry, `ip` or `ip:port`.
pub fn parse_nameserver(entry: &str) -> Result<SocketAddr, ResolveFailure> {
    let entry = entry.trim();
    if let Ok(addr) = entry.parse::<SocketAddr>() {
        return Ok(addr);
    }
    entry
        .parse::<IpAddr>()
        .map(|ip| SocketAddr::new(ip, DNS_PORT))
        .map_err(|_| ResolveFailure::Misconfigured(format!("invalid nameserver address '{entry}'")))
}

/// Treat an alias as a fully-qualified name so no search domain is appended.
fn fqdn(host: &str) -> String {
    if host.ends_with('.') {
        host.to_string()
    } else {
        format!("{host}.")
    }
}

/// Map a hickory error onto the failure taxonomy.
fn classify(host: &str, err: &ResolveError) -> ResolveFailure {
    let ResolveErrorKind::Proto(proto) = err.kind() else {
        return ResolveFailure::Other(err.to_string());
    };

    match proto.kind() {
        ProtoErrorKind::NoRecordsFound { response_code, .. }
            if *response_code == ResponseCode::NXDomain =>
        {
            ResolveFailure::NxDomain(host.to_string())
        }
        ProtoErrorKind::NoRecordsFound { .. } => ResolveFailure::NoAnswer(host.to_string()),
        ProtoErrorKind::Timeout => ResolveFailure::Timeout(host.to_string()),
        _ => ResolveFailure::Other(err.to_string()),
    }
}

enum Backend {
    Ready(TokioResolver),
    Misconfigured(ResolveFailure),
}

/// Resolver querying A records from explicit nameservers.
///
/// Bad nameserver entries do not fail construction; every lookup then fails
/// with [`ResolveFailure::Misconfigured`].
pub struct HickoryResolver {
    backend: Backend,
}

impl HickoryResolver {
    /// Build a resolver for the given nameserver entries.
    pub fn new<S: AsRef<str>>(nameservers: &[S], timeout: Duration) -> Self {
        let addrs: Result<Vec<SocketAddr>, ResolveFailure> = nameservers
            .iter()
            .map(|s| s.as_ref())
            .filter(|s| !s.trim().is_empty())
            .map(parse_nameserver)
            .collect();

        let backend = match addrs {
            Ok(addrs) => Backend::Ready(Self::build(&addrs, timeout)),
            Err(e) => {
                warn!(error = %e, "nameserver configuration invalid, lookups will fail");
                Backend::Misconfigured(e)
            }
        };

        Self { backend }
    }

    fn build(addrs: &[SocketAddr], timeout: Duration) -> TokioResolver {
        let mut config = ResolverConfig::new();
        for addr in addrs {
            config.add_name_server(NameServerConfig::new(*addr, Protocol::Udp));
            config.add_name_server(NameServerConfig::new(*addr, Protocol::Tcp));
        }

        let mut opts = ResolverOpts::default();
        opts.timeout = timeout;
        opts.ip_strategy = LookupIpStrategy::Ipv4Only;

        TokioResolver::builder_with_config(config, TokioConnectionProvider::default())
            .with_options(opts)
            .build()
    }
}

#[async_trait]
impl AliasResolver for HickoryResolver {
    async fn resolve(&self, host: &str) -> Result<Vec<IpAddr>, ResolveFailure> {
        let timer = Timer::start();

        let result = match &self.backend {
            Backend::Misconfigured(failure) => Err(failure.clone()),
            Backend::Ready(resolver) => match resolver.lookup_ip(fqdn(host)).await {
                Ok(lookup) => {
                    let ips: Vec<IpAddr> = lookup.iter().collect();
                    if ips.is_empty() {
                        Err(ResolveFailure::NoAnswer(host.to_string()))
                    } else {
                        Ok(ips)
                    }
                }
                Err(e) => Err(classify(host, &e)),
            },
        };

        trace!(host, ?result, "resolved alias");
        metrics::record_resolution(ResolutionResult::from(&result), timer.elapsed());
        result
    }
}
