use std::net::IpAddr;
use std::time::Duration;

#[cfg(feature = "json")]
use serde::Serialize;

/// Address family policy applied during resolution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(Serialize))]
#[cfg_attr(feature = "json", serde(rename_all = "lowercase"))]
pub enum AddressFamily {
    /// Resolve IPv4 first, fall back to IPv6.
    #[default]
    Auto,
    /// IPv4 only.
    V4,
    /// IPv6 only.
    V6,
}

/// Target host before resolution.
#[derive(Clone, Debug)]
pub struct ProbeTarget {
    pub host: String,
    /// Required for TCP probing, ignored for echo probing.
    pub port: Option<u16>,
    pub family: AddressFamily,
    /// Resolver to query instead of the system configuration.
    pub dns_server: Option<IpAddr>,
}

impl ProbeTarget {
    pub fn new(host: impl Into<String>, port: Option<u16>) -> Self {
        Self {
            host: host.into(),
            port,
            family: AddressFamily::Auto,
            dns_server: None,
        }
    }
}

/// How attempts are issued.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProbeMethod {
    /// Timed TCP connect to host:port.
    Tcp,
    /// ICMP echo request.
    #[cfg(feature = "icmp")]
    Icmp,
}

/// Pacing and bounds for one probe invocation.
#[derive(Clone, Debug)]
pub struct ProbeConfig {
    /// Number of attempts, `None` for continuous mode.
    pub count: Option<u32>,
    /// Per-attempt timeout.
    pub timeout: Duration,
    /// Fixed delay between attempts.
    pub interval: Duration,
    /// Time-to-live applied to outgoing attempts, 1..=255.
    pub ttl: u32,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            count: Some(4),
            timeout: Duration::from_millis(1000),
            interval: Duration::from_secs(1),
            ttl: 128,
        }
    }
}

/// Classification of a single attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(Serialize))]
#[cfg_attr(feature = "json", serde(rename_all = "snake_case"))]
pub enum OutcomeKind {
    Success,
    Timeout,
    ConnectionRefused,
    Unreachable,
    Cancelled,
}

/// One timed attempt.
#[derive(Clone, Copy, Debug)]
pub struct ProbeOutcome {
    /// 1-based sequence number.
    pub seq: u32,
    /// Round trip time, present only on success.
    pub rtt: Option<Duration>,
    pub kind: OutcomeKind,
}

impl ProbeOutcome {
    pub fn rtt_ms(&self) -> Option<f64> {
        self.rtt.map(|d| d.as_secs_f64() * 1000.0)
    }
}

/// Target host resolved to an IP address.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "json", derive(Serialize))]
pub struct Target {
    pub name: String,
    pub ip: IpAddr,
    pub port: Option<u16>,
}

impl Target {
    /// "host:port" when a port is involved, bare host otherwise.
    pub fn endpoint(&self) -> String {
        match self.port {
            Some(port) => format!("{}:{}", self.ip, port),
            None => self.ip.to_string(),
        }
    }
}

/// Full record of one probe invocation, immutable once produced.
#[derive(Clone, Debug)]
pub struct ProbeReport {
    pub target: Target,
    pub outcomes: Vec<ProbeOutcome>,
    pub summary: crate::stats::ProbeSummary,
}
