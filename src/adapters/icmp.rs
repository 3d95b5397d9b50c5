use std::net::IpAddr;
use std::time::Duration;

use rand::random;
use surge_ping::{Client, Config, ICMP, PingIdentifier, PingSequence, SurgeError};
use tracing::debug;

use crate::domain::probe::OutcomeKind;
use crate::error::RprobeError;

/// Payload size matching the classic ping tools.
const ECHO_PAYLOAD: [u8; 32] = [0u8; 32];

/// Reusable ICMP echo client bound to one address family.
///
/// Raw ICMP sockets usually need elevated privileges; failing to open one
/// is an invocation-level error, not a per-attempt outcome.
pub struct EchoClient {
    client: Client,
    ident: PingIdentifier,
}

impl EchoClient {
    /// Build a client matching the family of `ip`, with the given TTL on
    /// outgoing echoes.
    pub fn new(ip: IpAddr, ttl: u32) -> Result<Self, RprobeError> {
        let kind = if ip.is_ipv6() { ICMP::V6 } else { ICMP::V4 };
        let config = Config::builder().kind(kind).ttl(ttl).build();
        let client = Client::new(&config)
            .map_err(|e| RprobeError::Network(format!("icmp socket: {e}")))?;
        Ok(Self {
            client,
            ident: PingIdentifier(random()),
        })
    }

    /// Send one echo request and classify the reply.
    pub async fn echo_once(
        &self,
        ip: IpAddr,
        seq: u32,
        timeout: Duration,
    ) -> (OutcomeKind, Option<Duration>) {
        let mut pinger = self.client.pinger(ip, self.ident).await;
        pinger.timeout(timeout);
        match pinger.ping(PingSequence(seq as u16), &ECHO_PAYLOAD).await {
            Ok((_packet, rtt)) => (OutcomeKind::Success, Some(rtt)),
            Err(SurgeError::Timeout { .. }) => (OutcomeKind::Timeout, None),
            Err(e) => {
                debug!(error = %e, %ip, "echo failed");
                (OutcomeKind::Unreachable, None)
            }
        }
    }
}
