//! # Offline Submission System
//!
//! Keeps price submissions from being lost when the agent has no signal, and
//! from being stored twice when the signal is flaky.
//!
//! ## Architecture
//!
//! - **Queue**: Durable store for submissions that could not be delivered yet
//! - **Dispatcher**: One delivery attempt, classified into a [`DeliveryOutcome`]
//! - **Reconciliation**: Asks the server whether an ambiguous attempt landed
//! - **Retry**: Bounded retry accounting per queued record
//!
//! [`OfflineManager`] ties these together: the direct-submit path, the manual
//! queue drain and the automatic drain after reconnecting.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use price_survey::client::api_client::HttpSurveyApi;
//! use price_survey::client::config::Config;
//! use price_survey::client::local_db::LocalDatabase;
//! use price_survey::client::offline::OfflineManager;
//! use price_survey::client::sync::ConnectivityMonitor;
//! use std::sync::Arc;
//!
//! # async fn example(draft: price_survey::shared::SubmissionDraft) -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::from_env()?;
//! let api = HttpSurveyApi::new(config.clone());
//! let online = api.probe().await;
//!
//! let manager = Arc::new(OfflineManager::new(
//!     Arc::new(LocalDatabase::open(config.queue_path()).await?),
//!     Arc::new(api),
//!     ConnectivityMonitor::new(online),
//!     config.app(),
//! ));
//! manager.spawn_auto_drain();
//!
//! let outcome = manager.submit(draft).await?;
//! println!("{}", outcome);
//! # Ok(())
//! # }
//! ```

pub mod dispatcher;
pub mod queue;
pub mod reconciliation;
pub mod retry;

pub use dispatcher::{DeliveryOutcome, SubmissionDispatcher};
pub use queue::{MemoryQueueStore, PendingSubmission, QueueStore, StoreError, SubmissionQueue};
pub use reconciliation::{ReconciliationResult, Reconciler};
pub use retry::{RetryDecision, RetryPolicy};

use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::client::api_client::SurveyApi;
use crate::client::geolocation::{acquire_position, GeoError, LocationProvider};
use crate::client::sync::{ConnectivityMonitor, DrainPhase, DrainState};
use crate::shared::config::AppConfig;
use crate::shared::{SharedError, SubmissionDraft, ValidationIssue};

/// Capacity of the drain report channel; slow observers miss old reports
const REPORT_CHANNEL_CAPACITY: usize = 16;

/// How often a deferred auto-drain checks whether the running drain ended
const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Offline layer failures
#[derive(Debug, Error)]
pub enum OfflineError {
    #[error("Device is offline")]
    Offline,

    #[error("A queue drain is already in progress")]
    DrainInProgress,

    #[error("Submission is invalid: {0}")]
    Invalid(SharedError),

    #[error("Server rejected the submission: {message}")]
    Rejected {
        message: String,
        issues: Vec<ValidationIssue>,
    },

    #[error("Local storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Location unavailable: {0}")]
    Location(#[from] GeoError),
}

impl OfflineError {
    /// Field-level problems, when the failure was a validation failure
    pub fn issues(&self) -> &[ValidationIssue] {
        match self {
            OfflineError::Invalid(err) => err.issues(),
            OfflineError::Rejected { issues, .. } => issues,
            _ => &[],
        }
    }
}

/// Result of the direct-submit path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The server stored the submission
    Delivered { id: Option<String> },
    /// The outlet already has a submission for that day
    AlreadyCaptured,
    /// The attempt was ambiguous and the server confirmed it holds the record
    Confirmed { id: Option<String> },
    /// Saved locally for a later drain
    Queued { pending_id: String },
}

impl fmt::Display for SubmitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitOutcome::Delivered { .. } => write!(f, "Submission saved"),
            SubmitOutcome::AlreadyCaptured => {
                write!(f, "This outlet already has a submission for today")
            }
            SubmitOutcome::Confirmed { .. } => write!(f, "Submission confirmed on server"),
            SubmitOutcome::Queued { pending_id } => {
                write!(f, "Saved offline as {}; it will be sent when online", pending_id)
            }
        }
    }
}

/// Why a queued record was given up on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    ValidationRejected { message: String },
    RetriesExhausted { attempts: u32, last_error: String },
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::ValidationRejected { message } => write!(f, "rejected: {}", message),
            FailureReason::RetriesExhausted {
                attempts,
                last_error,
            } => write!(f, "gave up after {} attempts ({})", attempts, last_error),
        }
    }
}

/// A record dropped from the queue without reaching the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermanentFailure {
    pub pending_id: String,
    pub outlet_name: String,
    pub reason: FailureReason,
}

/// Totals for one queue drain
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Records delivered, already present, or confirmed by reconciliation
    pub success_count: usize,
    /// Records that failed this attempt, whether requeued or dropped
    pub failed_count: usize,
    /// Dropped records the agent has to re-enter or escalate
    pub permanent_failures: Vec<PermanentFailure>,
    /// Connectivity was lost before every record was tried
    pub interrupted: bool,
}

impl DrainReport {
    pub fn attempted(&self) -> usize {
        self.success_count + self.failed_count
    }
}

/// Coordinates queueing, delivery and reconnect drains
pub struct OfflineManager {
    queue: SubmissionQueue,
    dispatcher: SubmissionDispatcher,
    reconciler: Reconciler,
    retry: RetryPolicy,
    connectivity: ConnectivityMonitor,
    drain_state: DrainState,
    settle_delay: Duration,
    location_timeout: Duration,
    reports: broadcast::Sender<DrainReport>,
}

impl fmt::Debug for OfflineManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OfflineManager")
            .field("online", &self.connectivity.is_online())
            .field("phase", &self.drain_state.phase())
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl OfflineManager {
    pub fn new(
        store: Arc<dyn QueueStore>,
        api: Arc<dyn SurveyApi>,
        connectivity: ConnectivityMonitor,
        config: &AppConfig,
    ) -> Self {
        let (reports, _) = broadcast::channel(REPORT_CHANNEL_CAPACITY);
        Self {
            queue: SubmissionQueue::new(store),
            dispatcher: SubmissionDispatcher::new(api.clone()),
            reconciler: Reconciler::new(api),
            retry: RetryPolicy::new(config.max_retries),
            connectivity,
            drain_state: DrainState::new(),
            settle_delay: config.settle_delay,
            location_timeout: config.location_timeout,
            reports,
        }
    }

    pub fn is_online(&self) -> bool {
        self.connectivity.is_online()
    }

    pub fn connectivity(&self) -> &ConnectivityMonitor {
        &self.connectivity
    }

    pub fn queue(&self) -> &SubmissionQueue {
        &self.queue
    }

    pub fn drain_phase(&self) -> DrainPhase {
        self.drain_state.phase()
    }

    /// Everything still waiting for delivery
    pub async fn pending(&self) -> Result<Vec<PendingSubmission>, OfflineError> {
        Ok(self.queue.list_all().await?)
    }

    pub async fn pending_count(&self) -> Result<usize, OfflineError> {
        Ok(self.queue.count().await?)
    }

    /// Receive the report of every automatic drain
    pub fn subscribe_reports(&self) -> broadcast::Receiver<DrainReport> {
        self.reports.subscribe()
    }

    /// Deliver a new submission now, or queue it when that is not possible
    ///
    /// Invalid drafts are refused before anything is queued or sent. The
    /// request carries the identifier the record would get in the queue, so a
    /// later retry of the same record reuses the idempotency key.
    pub async fn submit(&self, draft: SubmissionDraft) -> Result<SubmitOutcome, OfflineError> {
        let draft = draft.normalized();
        draft.validate().map_err(OfflineError::Invalid)?;

        let record = PendingSubmission::new(draft);

        if !self.is_online() {
            tracing::info!("[OFFLINE] Offline, queueing '{}'", record.draft.outlet_name);
            return self.queue_record(record).await;
        }

        match self.dispatcher.dispatch(&record).await {
            DeliveryOutcome::Created { id } => {
                tracing::info!("[OFFLINE] Delivered '{}'", record.draft.outlet_name);
                Ok(SubmitOutcome::Delivered { id })
            }
            DeliveryOutcome::Duplicate => Ok(SubmitOutcome::AlreadyCaptured),
            DeliveryOutcome::ValidationRejected { message, issues } => {
                Err(OfflineError::Rejected { message, issues })
            }
            DeliveryOutcome::AmbiguousFailure { reason } => {
                match self.reconciler.reconcile_draft(&record.draft).await {
                    ReconciliationResult::Confirmed { id } => Ok(SubmitOutcome::Confirmed { id }),
                    result => {
                        tracing::warn!(
                            "[OFFLINE] Ambiguous delivery of '{}' ({}), {}; queueing",
                            record.draft.outlet_name,
                            reason,
                            result
                        );
                        self.queue_record(record).await
                    }
                }
            }
            DeliveryOutcome::RetryableFailure { reason } => {
                tracing::warn!(
                    "[OFFLINE] Delivery of '{}' failed ({}); queueing",
                    record.draft.outlet_name,
                    reason
                );
                self.queue_record(record).await
            }
        }
    }

    /// Attach a location fix when the draft has none, then submit
    pub async fn capture_and_submit(
        &self,
        mut draft: SubmissionDraft,
        location: &dyn LocationProvider,
    ) -> Result<SubmitOutcome, OfflineError> {
        if draft.geo.is_none() {
            let fix = acquire_position(location, self.location_timeout)
                .await
                .inspect_err(|e| tracing::warn!("[OFFLINE] No location fix: {}", e))?;
            draft = draft.with_geo(fix);
        }
        self.submit(draft).await
    }

    async fn queue_record(&self, record: PendingSubmission) -> Result<SubmitOutcome, OfflineError> {
        let pending_id = self.queue.enqueue_pending(record).await?;
        Ok(SubmitOutcome::Queued { pending_id })
    }

    /// Try every queued record once, oldest first
    ///
    /// Refused while offline or while another drain runs; neither case
    /// touches the queue. A storage failure aborts the drain.
    pub async fn drain_all(&self) -> Result<DrainReport, OfflineError> {
        if !self.is_online() {
            return Err(OfflineError::Offline);
        }
        let _guard = self
            .drain_state
            .try_begin()
            .ok_or(OfflineError::DrainInProgress)?;

        let records = self.queue.list_all().await?;
        tracing::info!("[OFFLINE] Draining {} queued submissions", records.len());

        let mut report = DrainReport::default();
        for record in records {
            if !self.is_online() {
                tracing::warn!("[OFFLINE] Connectivity lost, stopping drain");
                report.interrupted = true;
                break;
            }
            self.drain_one(record, &mut report).await?;
        }

        tracing::info!(
            "[OFFLINE] Drain finished: {} succeeded, {} failed, {} dropped",
            report.success_count,
            report.failed_count,
            report.permanent_failures.len()
        );
        Ok(report)
    }

    async fn drain_one(
        &self,
        mut record: PendingSubmission,
        report: &mut DrainReport,
    ) -> Result<(), StoreError> {
        let reason = match self.dispatcher.dispatch(&record).await {
            DeliveryOutcome::Created { .. } | DeliveryOutcome::Duplicate => {
                self.queue.remove(&record.id).await?;
                report.success_count += 1;
                return Ok(());
            }
            DeliveryOutcome::ValidationRejected { message, .. } => {
                self.queue.remove(&record.id).await?;
                report.failed_count += 1;
                report.permanent_failures.push(PermanentFailure {
                    pending_id: record.id,
                    outlet_name: record.draft.outlet_name,
                    reason: FailureReason::ValidationRejected { message },
                });
                return Ok(());
            }
            DeliveryOutcome::AmbiguousFailure { reason } => {
                match self.reconciler.reconcile_draft(&record.draft).await {
                    ReconciliationResult::Confirmed { .. } => {
                        self.queue.remove(&record.id).await?;
                        report.success_count += 1;
                        return Ok(());
                    }
                    result => format!("{} ({})", reason, result),
                }
            }
            DeliveryOutcome::RetryableFailure { reason } => reason,
        };

        report.failed_count += 1;
        match self.retry.record_failure(&mut record, &reason) {
            RetryDecision::Requeue => {
                tracing::debug!("[OFFLINE] {} requeued after attempt {}", record.id, record.retry_count);
                self.queue.update(&record).await?;
            }
            RetryDecision::Exhausted { attempts } => {
                tracing::warn!("[OFFLINE] Dropping {} after {} attempts", record.id, attempts);
                self.queue.remove(&record.id).await?;
                report.permanent_failures.push(PermanentFailure {
                    pending_id: record.id,
                    outlet_name: record.draft.outlet_name,
                    reason: FailureReason::RetriesExhausted {
                        attempts,
                        last_error: reason,
                    },
                });
            }
        }
        Ok(())
    }

    /// Drain the queue after every offline -> online transition
    ///
    /// The task waits out the settle delay, then drains only if the device is
    /// still online and something is queued. It holds a weak reference and
    /// ends once the manager is dropped.
    pub fn spawn_auto_drain(self: &Arc<Self>) -> JoinHandle<()> {
        let manager = Arc::downgrade(self);
        let settle_delay = self.settle_delay;
        let mut transitions = self.connectivity.subscribe();
        // Read before spawning so a reconnect racing the task start is still seen.
        let mut was_online = *transitions.borrow_and_update();

        tokio::spawn(async move {
            while transitions.changed().await.is_ok() {
                let online = *transitions.borrow_and_update();
                let reconnected = online && !was_online;
                was_online = online;
                if !reconnected {
                    continue;
                }

                tokio::time::sleep(settle_delay).await;
                let Some(manager) = manager.upgrade() else {
                    break;
                };
                manager.auto_drain().await;
            }
            tracing::debug!("[OFFLINE] Auto-drain task stopped");
        })
    }

    async fn auto_drain(&self) {
        loop {
            if !self.is_online() {
                tracing::debug!("[OFFLINE] Connection flapped during settle delay, skipping drain");
                return;
            }
            match self.pending_count().await {
                Ok(0) => return,
                Ok(_) => {}
                Err(e) => {
                    tracing::error!("[OFFLINE] Cannot read queue for auto-drain: {}", e);
                    return;
                }
            }

            match self.drain_all().await {
                Ok(report) => {
                    // No subscribers is fine.
                    let _ = self.reports.send(report);
                    return;
                }
                Err(OfflineError::DrainInProgress) => {
                    tracing::debug!("[OFFLINE] Another drain is running, re-checking once it ends");
                    self.wait_for_idle().await;
                }
                Err(e) => {
                    tracing::warn!("[OFFLINE] Auto-drain failed: {}", e);
                    return;
                }
            }
        }
    }

    async fn wait_for_idle(&self) {
        while self.drain_phase() == DrainPhase::Draining {
            tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
        }
    }
}
