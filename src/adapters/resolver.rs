use std::net::{IpAddr, SocketAddr};

use hickory_resolver::TokioAsyncResolver;
use hickory_resolver::config::{
    LookupIpStrategy, NameServerConfig, Protocol, ResolverConfig, ResolverOpts,
};

use crate::domain::probe::AddressFamily;
use crate::error::RprobeError;

const DNS_PORT: u16 = 53;

/// Resolve the IP address for a host name according to the family policy.
///
/// Literal IPv4/IPv6 input is returned unchanged without any lookup, even
/// when a custom DNS server is configured. With `AddressFamily::Auto` the
/// IPv4 candidates are preferred and IPv6 is the fallback; the forced
/// modes never cross families.
pub async fn resolve_ip(
    host: &str,
    family: AddressFamily,
    dns_server: Option<IpAddr>,
) -> Result<IpAddr, RprobeError> {
    if let Ok(ip) = host.parse::<IpAddr>() {
        return match family {
            AddressFamily::V4 if ip.is_ipv6() => Err(RprobeError::Dns(format!(
                "'{host}' is an IPv6 literal but IPv4 was forced"
            ))),
            AddressFamily::V6 if ip.is_ipv4() => Err(RprobeError::Dns(format!(
                "'{host}' is an IPv4 literal but IPv6 was forced"
            ))),
            _ => Ok(ip),
        };
    }

    let addrs = match dns_server {
        Some(server) => lookup_custom(host, family, server).await?,
        None => lookup_system(host).await?,
    };

    pick(addrs, family).ok_or_else(|| match family {
        AddressFamily::V4 => RprobeError::Dns(format!("No IPv4 address found for '{host}'")),
        AddressFamily::V6 => RprobeError::Dns(format!("No IPv6 address found for '{host}'")),
        AddressFamily::Auto => RprobeError::Dns(format!("No IP address found for '{host}'")),
    })
}

/// Lookup against the system resolver configuration.
async fn lookup_system(host: &str) -> Result<Vec<IpAddr>, RprobeError> {
    // The port is only there to satisfy the socket-address form.
    let addrs = tokio::net::lookup_host((host, 0u16))
        .await
        .map_err(|e| RprobeError::Dns(format!("{e}")))?;
    Ok(addrs.map(|a| a.ip()).collect())
}

/// Lookup against one specific nameserver (UDP port 53).
async fn lookup_custom(
    host: &str,
    family: AddressFamily,
    server: IpAddr,
) -> Result<Vec<IpAddr>, RprobeError> {
    let mut config = ResolverConfig::new();
    config.add_name_server(NameServerConfig::new(
        SocketAddr::new(server, DNS_PORT),
        Protocol::Udp,
    ));
    let mut opts = ResolverOpts::default();
    opts.ip_strategy = match family {
        AddressFamily::V4 => LookupIpStrategy::Ipv4Only,
        AddressFamily::V6 => LookupIpStrategy::Ipv6Only,
        AddressFamily::Auto => LookupIpStrategy::Ipv4thenIpv6,
    };
    let resolver = TokioAsyncResolver::tokio(config, opts);
    let lookup = resolver
        .lookup_ip(host)
        .await
        .map_err(|e| RprobeError::Dns(format!("{e}")))?;
    Ok(lookup.iter().collect())
}

fn pick(addrs: Vec<IpAddr>, family: AddressFamily) -> Option<IpAddr> {
    match family {
        AddressFamily::V4 => addrs.into_iter().find(IpAddr::is_ipv4),
        AddressFamily::V6 => addrs.into_iter().find(IpAddr::is_ipv6),
        AddressFamily::Auto => {
            let (v4, v6): (Vec<IpAddr>, Vec<IpAddr>) =
                addrs.into_iter().partition(IpAddr::is_ipv4);
            v4.into_iter().chain(v6).next()
        }
    }
}
