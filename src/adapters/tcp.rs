use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time::{self, Instant};
use tracing::debug;

use crate::domain::probe::OutcomeKind;

/// One timed connect to `addr`, classified.
///
/// The round trip time is the elapsed time until the connect completes.
/// The connection is dropped right after; nothing is sent on it.
pub async fn connect_once(
    addr: SocketAddr,
    timeout: Duration,
    ttl: u32,
) -> (OutcomeKind, Option<Duration>) {
    let start = Instant::now();
    match time::timeout(timeout, TcpStream::connect(addr)).await {
        Ok(Ok(stream)) => {
            let rtt = start.elapsed();
            // TTL applies to everything sent on the established socket.
            if let Err(e) = stream.set_ttl(ttl) {
                debug!(error = %e, "failed to set ttl on connected socket");
            }
            (OutcomeKind::Success, Some(rtt))
        }
        Ok(Err(e)) => {
            debug!(error = %e, %addr, "connect failed");
            (classify_io(&e), None)
        }
        Err(_) => (OutcomeKind::Timeout, None),
    }
}

/// Map a connect error onto an outcome kind. Per-attempt errors never
/// abort a probe run, so everything unclassified lands on `Unreachable`.
fn classify_io(err: &io::Error) -> OutcomeKind {
    match err.kind() {
        io::ErrorKind::ConnectionRefused => OutcomeKind::ConnectionRefused,
        io::ErrorKind::TimedOut => OutcomeKind::Timeout,
        io::ErrorKind::HostUnreachable | io::ErrorKind::NetworkUnreachable => {
            OutcomeKind::Unreachable
        }
        _ => OutcomeKind::Unreachable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refused_and_timeout_classify_distinctly() {
        let refused = io::Error::from(io::ErrorKind::ConnectionRefused);
        assert_eq!(classify_io(&refused), OutcomeKind::ConnectionRefused);
        let timed_out = io::Error::from(io::ErrorKind::TimedOut);
        assert_eq!(classify_io(&timed_out), OutcomeKind::Timeout);
    }

    #[test]
    fn unknown_errors_count_as_unreachable() {
        let other = io::Error::other("weird transport failure");
        assert_eq!(classify_io(&other), OutcomeKind::Unreachable);
    }
}
