use futures::future::join_all;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::domain::probe::{ProbeConfig, ProbeMethod, ProbeReport, ProbeTarget};
use crate::error::RprobeError;

use super::probe::run_probe;

/// Probe many targets concurrently and return one [`ProbeReport`] each.
///
/// Every target runs its own sequential attempt loop with its own
/// counters; only the targets run in parallel. Each probe gets a child
/// of `cancel`, so cancelling the parent stops the whole batch.
#[instrument(skip(config, cancel))]
pub async fn probe_many(
    targets: &[ProbeTarget],
    method: ProbeMethod,
    config: &ProbeConfig,
    cancel: CancellationToken,
) -> Result<Vec<ProbeReport>, RprobeError> {
    let futures = targets
        .iter()
        .map(|t| run_probe(t, method, config, cancel.child_token()))
        .collect::<Vec<_>>();
    let results = join_all(futures).await;
    let mut out = Vec::new();
    for res in results {
        out.push(res?);
    }
    Ok(out)
}
