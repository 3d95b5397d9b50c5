use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

#[cfg(feature = "icmp")]
use crate::adapters::icmp::EchoClient;
use crate::adapters::{resolver, tcp};
use crate::domain::probe::{
    OutcomeKind, ProbeConfig, ProbeMethod, ProbeOutcome, ProbeReport, ProbeTarget, Target,
};
use crate::error::RprobeError;
use crate::stats::summarize;

/// Parsed view of a target string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTarget<'a> {
    pub host: &'a str,
    pub port: Option<u16>,
    pub is_ipv6_literal: bool,
}

/// Strict port parsing with range check (1..=65535).
fn parse_port_strict(s: &str) -> Result<u16, RprobeError> {
    let raw = u32::from_str(s).map_err(|_| RprobeError::Other(format!("invalid port: '{s}'")))?;
    if raw == 0 || raw > u16::MAX as u32 {
        return Err(RprobeError::Other(format!(
            "port out of range [1..65535]: {raw}"
        )));
    }
    Ok(raw as u16)
}

/// Count occurrences of ':' (helps distinguish host:port vs bare IPv6).
#[inline]
fn colon_count(s: &str) -> usize {
    s.as_bytes().iter().filter(|&&b| b == b':').count()
}

/// Parse a user target string without regexes.
///
/// Supported forms:
/// - "hostname"
/// - "hostname:80"
/// - "1.2.3.4"
/// - "1.2.3.4:80"
/// - "[2001:db8::1]"
/// - "[2001:db8::1]:443"
/// - "2001:db8::1"              (bare IPv6, **no** port allowed)
///
/// Rules:
/// - If it starts with '[', it must be bracketed IPv6, optional ":port".
/// - Otherwise:
///   - If there's more than one ':', treat as **bare IPv6** (no port).
///   - If there's exactly one ':', treat as "host:port".
///   - If there's zero ':', treat as "host" (hostname or IPv4).
pub fn parse_target(input: &str) -> Result<ParsedTarget<'_>, RprobeError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(RprobeError::Other("empty target".into()));
    }

    // Case 1: Bracketed IPv6: "[v6]" or "[v6]:port"
    if let Some(rest) = s.strip_prefix('[') {
        let Some(bracket_pos) = rest.find(']') else {
            return Err(RprobeError::Other(format!("missing closing ']' in '{s}'")));
        };
        let host = &rest[..bracket_pos];
        let tail = &rest[bracket_pos + 1..];

        let port = if let Some(p) = tail.strip_prefix(':') {
            Some(parse_port_strict(p)?)
        } else if tail.is_empty() {
            None
        } else {
            return Err(RprobeError::Other(format!(
                "unexpected trailing characters in '{s}'"
            )));
        };

        return Ok(ParsedTarget {
            host,
            port,
            is_ipv6_literal: true,
        });
    }

    // Case 2: Non-bracketed input
    match colon_count(s) {
        0 => Ok(ParsedTarget {
            host: s,
            port: None,
            is_ipv6_literal: false,
        }),

        1 => {
            let mut it = s.rsplitn(2, ':');
            let port_str = it.next().unwrap();
            let host = it.next().unwrap_or("");
            if host.is_empty() {
                return Err(RprobeError::Other(format!(
                    "missing host before port in '{s}'"
                )));
            }
            let port = parse_port_strict(port_str)?;
            Ok(ParsedTarget {
                host,
                port: Some(port),
                is_ipv6_literal: false,
            })
        }

        _ => Ok(ParsedTarget {
            host: s,
            port: None,
            is_ipv6_literal: true,
        }),
    }
}

/// Per-invocation attempt dispatcher, built once after resolution.
enum Dispatcher {
    Tcp {
        addr: SocketAddr,
    },
    #[cfg(feature = "icmp")]
    Icmp {
        client: EchoClient,
        ip: std::net::IpAddr,
    },
}

impl Dispatcher {
    async fn dispatch(&self, seq: u32, config: &ProbeConfig) -> (OutcomeKind, Option<Duration>) {
        #[cfg(not(feature = "icmp"))]
        let _ = seq;
        match self {
            Dispatcher::Tcp { addr } => tcp::connect_once(*addr, config.timeout, config.ttl).await,
            #[cfg(feature = "icmp")]
            Dispatcher::Icmp { client, ip } => client.echo_once(*ip, seq, config.timeout).await,
        }
    }
}

/// Run a full probe and return its report.
///
/// Convenience wrapper over [`run_probe_with`] for callers that do not
/// need per-attempt streaming.
pub async fn run_probe(
    target: &ProbeTarget,
    method: ProbeMethod,
    config: &ProbeConfig,
    cancel: CancellationToken,
) -> Result<ProbeReport, RprobeError> {
    run_probe_with(target, method, config, cancel, |_, _| {}).await
}

/// Run a full probe: resolve the target, issue paced attempts, summarize.
///
/// `on_outcome` is invoked with the resolved target once per recorded
/// attempt, in sequence order, before the next attempt is issued —
/// callers stream per-attempt lines from it. Outcomes are only recorded
/// for dispatched attempts:
/// cancellation observed between attempts stops the loop without adding
/// an outcome, while cancellation during an in-flight attempt records a
/// `Cancelled` outcome and stops. Either way the outcomes collected so
/// far are summarized; cancellation is a normal termination path, not an
/// error.
#[instrument(skip(config, cancel, on_outcome))]
pub async fn run_probe_with<F>(
    target: &ProbeTarget,
    method: ProbeMethod,
    config: &ProbeConfig,
    cancel: CancellationToken,
    mut on_outcome: F,
) -> Result<ProbeReport, RprobeError>
where
    F: FnMut(&Target, &ProbeOutcome),
{
    let ip = resolver::resolve_ip(&target.host, target.family, target.dns_server).await?;
    let resolved = Target {
        name: target.host.clone(),
        ip,
        port: target.port,
    };

    let dispatcher = match method {
        ProbeMethod::Tcp => {
            let port = target
                .port
                .ok_or_else(|| RprobeError::Other("tcp probing requires a port".into()))?;
            Dispatcher::Tcp {
                addr: SocketAddr::new(ip, port),
            }
        }
        #[cfg(feature = "icmp")]
        ProbeMethod::Icmp => Dispatcher::Icmp {
            client: EchoClient::new(ip, config.ttl)?,
            ip,
        },
    };

    let mut outcomes: Vec<ProbeOutcome> = Vec::new();
    let mut seq: u32 = 0;
    loop {
        if cancel.is_cancelled() {
            debug!(seq, "cancelled before attempt");
            break;
        }
        if let Some(count) = config.count {
            if seq >= count {
                break;
            }
        }
        seq += 1;

        // The attempt races the cancellation token so a Ctrl-C does not
        // have to wait out a slow timeout.
        let (kind, rtt) = tokio::select! {
            biased;
            _ = cancel.cancelled() => (OutcomeKind::Cancelled, None),
            res = dispatcher.dispatch(seq, config) => res,
        };

        let outcome = ProbeOutcome { seq, rtt, kind };
        on_outcome(&resolved, &outcome);
        outcomes.push(outcome);
        if kind == OutcomeKind::Cancelled {
            break;
        }

        let more_remaining = config.count.is_none_or(|count| seq < count);
        if more_remaining {
            tokio::select! {
                _ = time::sleep(config.interval) => {}
                _ = cancel.cancelled() => break,
            }
        }
    }

    let summary = summarize(&outcomes);
    Ok(ProbeReport {
        target: resolved,
        outcomes,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_hostname() {
        let parsed = parse_target("example.com").unwrap();
        assert_eq!(parsed.host, "example.com");
        assert_eq!(parsed.port, None);
        assert!(!parsed.is_ipv6_literal);
    }

    #[test]
    fn parses_host_with_port() {
        let parsed = parse_target("example.com:8080").unwrap();
        assert_eq!(parsed.host, "example.com");
        assert_eq!(parsed.port, Some(8080));
    }

    #[test]
    fn parses_bracketed_ipv6_with_port() {
        let parsed = parse_target("[2001:db8::1]:443").unwrap();
        assert_eq!(parsed.host, "2001:db8::1");
        assert_eq!(parsed.port, Some(443));
        assert!(parsed.is_ipv6_literal);
    }

    #[test]
    fn bare_ipv6_takes_no_port() {
        let parsed = parse_target("2001:db8::1").unwrap();
        assert_eq!(parsed.host, "2001:db8::1");
        assert_eq!(parsed.port, None);
        assert!(parsed.is_ipv6_literal);
    }

    #[test]
    fn rejects_port_zero_and_overflow() {
        assert!(parse_target("example.com:0").is_err());
        assert!(parse_target("example.com:65536").is_err());
    }

    #[test]
    fn rejects_empty_and_malformed_targets() {
        assert!(parse_target("").is_err());
        assert!(parse_target("   ").is_err());
        assert!(parse_target("[2001:db8::1").is_err());
        assert!(parse_target("[2001:db8::1]x").is_err());
        assert!(parse_target(":80").is_err());
    }
}
