//! Sequential batch coordination with inter-transfer pacing.

use super::{OwnershipTransfer, TransferOptions, TransferOutcome};
use crate::client::DriveClient;
use std::time::Duration;
use tracing::{info, warn};

/// Configuration for a batch run.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Fixed pause between consecutive transfers. Pacing for the Drive API
    /// rate limits, not backoff; there is no retry at this layer.
    pub delay_between_transfers: Duration,

    /// Whether a per-file failure lets the batch proceed to the next file.
    /// When false the batch halts at the first failure and the remaining
    /// files stay unprocessed.
    pub continue_on_error: bool,

    /// Whether Drive should email the target about each new grant.
    pub send_notification_email: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            delay_between_transfers: Duration::from_secs(1),
            continue_on_error: true,
            send_notification_email: false,
        }
    }
}

/// Aggregate result of a batch run.
///
/// `total` always equals the input length. Unprocessed trailing files after
/// an early halt contribute no outcome and count toward neither bucket, so
/// `successful + failed <= total`, with equality whenever the batch ran to
/// completion.
#[derive(Debug, Clone)]
pub struct BatchSummary {
    /// Number of files whose ownership transferred (or already belonged to
    /// the target).
    pub successful: usize,
    /// Number of files whose transfer failed.
    pub failed: usize,
    /// Length of the input sequence.
    pub total: usize,
    /// Per-file outcomes, in input order, for every processed file.
    pub outcomes: Vec<TransferOutcome>,
}

/// Sequences the transfer protocol over a list of files.
///
/// Strictly sequential and single-threaded: transfers never overlap, and the
/// inter-transfer delay is a timed suspension point between consecutive
/// items. The coordinator holds no progress state; a halted batch is not
/// resumable.
pub struct BatchCoordinator<'a> {
    client: &'a DriveClient,
    config: BatchConfig,
}

impl<'a> BatchCoordinator<'a> {
    /// Creates a coordinator over a source client.
    pub fn new(client: &'a DriveClient, config: BatchConfig) -> Self {
        Self { client, config }
    }

    /// Transfers every file to the target principal, in input order.
    pub async fn run<S: AsRef<str>>(&self, file_ids: &[S], target_email: &str) -> BatchSummary {
        let protocol = OwnershipTransfer::new(self.client);
        let options = TransferOptions {
            send_notification_email: self.config.send_notification_email,
        };

        let total = file_ids.len();
        let mut outcomes = Vec::with_capacity(total);
        let mut successful = 0;
        let mut failed = 0;

        for (index, file_id) in file_ids.iter().enumerate() {
            if index > 0 {
                tokio::time::sleep(self.config.delay_between_transfers).await;
            }

            let file_id = file_id.as_ref();
            match protocol.transfer(file_id, target_email, &options).await {
                Ok(outcome) => {
                    successful += 1;
                    info!(
                        file_id,
                        position = index + 1,
                        total,
                        "transfer succeeded"
                    );
                    outcomes.push(outcome);
                }
                Err(error) => {
                    failed += 1;
                    warn!(file_id, position = index + 1, total, %error, "transfer failed");
                    outcomes.push(TransferOutcome::failed(file_id, &error));

                    if !self.config.continue_on_error {
                        warn!(
                            remaining = total - index - 1,
                            "halting batch on first failure"
                        );
                        break;
                    }
                }
            }
        }

        info!(successful, failed, total, "batch complete");
        BatchSummary {
            successful,
            failed,
            total,
            outcomes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DriveTransferConfig;
    use crate::mocks::{MockTransport, StaticTokenProvider};
    use crate::transport::HttpMethod;
    use serde_json::json;
    use std::sync::Arc;
    use tokio::time::Instant;

    fn client_over(transport: Arc<MockTransport>) -> DriveClient {
        let config = DriveTransferConfig::builder()
            .auth_provider(StaticTokenProvider)
            .build()
            .unwrap();
        DriveClient::with_transport(config, transport).unwrap()
    }

    /// Registers a file whose target permission already holds owner, so a
    /// transfer succeeds without any write call.
    fn register_owned_file(transport: &MockTransport, file_id: &str, owner: &str) {
        transport.on(
            HttpMethod::Get,
            &format!("/drive/v3/files/{}", file_id),
            200,
            json!({
                "id": file_id,
                "name": format!("{}.txt", file_id),
                "owners": [{"emailAddress": owner}]
            }),
        );
        transport.on(
            HttpMethod::Get,
            &format!("/drive/v3/files/{}/permissions", file_id),
            200,
            json!({"permissions": [
                {"id": "p1", "type": "user", "role": "owner", "emailAddress": owner}
            ]}),
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_partial_failure_continues_and_accounts_every_file() {
        let transport = Arc::new(MockTransport::new());
        register_owned_file(&transport, "F1", "b@x.com");
        // F2 is never registered, so it surfaces NotFound.
        register_owned_file(&transport, "F3", "b@x.com");

        let client = client_over(transport);
        let coordinator = BatchCoordinator::new(&client, BatchConfig::default());

        let summary = coordinator.run(&["F1", "F2", "F3"], "b@x.com").await;

        assert_eq!(summary.total, 3);
        assert_eq!(summary.successful, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.successful + summary.failed, summary.total);

        let ids: Vec<_> = summary.outcomes.iter().map(|o| o.file_id.as_str()).collect();
        assert_eq!(ids, vec!["F1", "F2", "F3"]);
        assert!(summary.outcomes[0].success);
        assert!(!summary.outcomes[1].success);
        assert!(summary.outcomes[1]
            .error
            .as_deref()
            .unwrap()
            .contains("File not found"));
        assert!(summary.outcomes[2].success);
    }

    #[tokio::test(start_paused = true)]
    async fn test_halt_on_first_failure_leaves_tail_unprocessed() {
        let transport = Arc::new(MockTransport::new());
        // F1 fails; F2 and F3 would succeed but must never be reached.
        register_owned_file(&transport, "F2", "b@x.com");
        register_owned_file(&transport, "F3", "b@x.com");

        let client = client_over(transport.clone());
        let config = BatchConfig {
            continue_on_error: false,
            ..Default::default()
        };
        let coordinator = BatchCoordinator::new(&client, config);

        let summary = coordinator.run(&["F1", "F2", "F3"], "b@x.com").await;

        assert_eq!(summary.total, 3);
        assert_eq!(summary.successful, 0);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.outcomes.len(), 1);
        assert!(summary.successful + summary.failed <= summary.total);

        // Only the failing file was touched.
        assert!(transport
            .calls()
            .iter()
            .all(|c| c.path.contains("/files/F1")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_runs_between_consecutive_transfers_only() {
        let transport = Arc::new(MockTransport::new());
        register_owned_file(&transport, "F1", "b@x.com");
        register_owned_file(&transport, "F2", "b@x.com");
        register_owned_file(&transport, "F3", "b@x.com");

        let client = client_over(transport);
        let config = BatchConfig {
            delay_between_transfers: Duration::from_millis(500),
            ..Default::default()
        };
        let coordinator = BatchCoordinator::new(&client, config);

        let started = Instant::now();
        let summary = coordinator.run(&["F1", "F2", "F3"], "b@x.com").await;
        let elapsed = started.elapsed();

        assert_eq!(summary.successful, 3);
        // Two gaps for three files, no trailing delay.
        assert!(elapsed >= Duration::from_millis(1000));
        assert!(elapsed < Duration::from_millis(1500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_file_batch_never_sleeps() {
        let transport = Arc::new(MockTransport::new());
        register_owned_file(&transport, "F1", "b@x.com");

        let client = client_over(transport);
        let config = BatchConfig {
            delay_between_transfers: Duration::from_secs(3600),
            ..Default::default()
        };
        let coordinator = BatchCoordinator::new(&client, config);

        let started = Instant::now();
        let summary = coordinator.run(&["F1"], "b@x.com").await;

        assert_eq!(summary.successful, 1);
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let transport = Arc::new(MockTransport::new());
        let client = client_over(transport);
        let coordinator = BatchCoordinator::new(&client, BatchConfig::default());

        let summary = coordinator.run::<&str>(&[], "b@x.com").await;

        assert_eq!(summary.total, 0);
        assert_eq!(summary.successful, 0);
        assert_eq!(summary.failed, 0);
        assert!(summary.outcomes.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_target_fails_every_file_without_api_calls() {
        let transport = Arc::new(MockTransport::new());
        let client = client_over(transport.clone());
        let coordinator = BatchCoordinator::new(&client, BatchConfig::default());

        let summary = coordinator.run(&["F1", "F2"], "not-an-email").await;

        assert_eq!(summary.failed, 2);
        assert_eq!(summary.successful, 0);
        assert!(transport.calls().is_empty());
    }
}
