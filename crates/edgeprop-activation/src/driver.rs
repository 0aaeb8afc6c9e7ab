//! Submission and polling driver

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use edgeprop_transport::{
    ActivationSubmission, ApiError, CallContext, PropertyApi, SubmitReply,
};
use edgeprop_types::{
    ActivationId, ActivationJob, ActivationKind, ActivationStatus, ActivationWarning, Network,
    PropertyId,
};

use crate::cancel::CancelToken;
use crate::error::{ActivationError, ActivationResult};

/// Driver tuning
#[derive(Debug, Clone)]
pub struct ActivationConfig {
    /// Fixed interval between status polls
    pub poll_interval: Duration,

    /// Warning-acknowledgement resubmissions allowed after the first submit
    pub max_warning_resubmits: u32,
}

impl Default for ActivationConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(30),
            max_warning_resubmits: 5,
        }
    }
}

/// Outcome of a submission
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    /// The remote accepted the job
    Submitted(ActivationJob),

    /// Deactivation of a version that was not active: idempotent success,
    /// there is no job to poll
    AlreadyInactive,
}

/// Terminal outcome of a poll
#[derive(Debug, Clone)]
pub enum PollOutcome {
    /// Every status item reached ACTIVE
    Active,

    /// A terminal non-active status appeared; the last response body
    Failed(Value),

    /// Cancelled by token or deadline; remote state untouched
    Cancelled,
}

/// Cancellation and deadline for one poll
#[derive(Debug, Default)]
pub struct PollOptions {
    pub cancel: Option<CancelToken>,
    pub deadline: Option<Duration>,
}

/// Drives activation jobs to terminal state
pub struct ActivationDriver {
    api: PropertyApi,
    config: ActivationConfig,
}

enum Step {
    Done,
    Continue,
    Failed,
}

impl ActivationDriver {
    pub fn new(api: PropertyApi, config: ActivationConfig) -> Self {
        Self { api, config }
    }

    /// Submit an activation/deactivation, acknowledging warnings as needed
    #[instrument(skip(self, ctx, notify_emails))]
    pub async fn submit(
        &self,
        ctx: &CallContext,
        property_id: &PropertyId,
        version: u64,
        network: Network,
        kind: ActivationKind,
        notify_emails: &[String],
    ) -> ActivationResult<SubmitOutcome> {
        let mut acks: Vec<String> = Vec::new();
        let mut collected: Vec<ActivationWarning> = Vec::new();
        let mut resubmits: u32 = 0;

        loop {
            let submission = ActivationSubmission {
                property_version: version,
                network,
                activation_type: kind,
                notify_emails: notify_emails.to_vec(),
                acknowledge_warnings: acks.clone(),
            };

            match self.api.submit_activation(ctx, property_id, &submission).await {
                Ok(SubmitReply::Created(activation_id)) => {
                    info!(activation_id = %activation_id, "Activation submitted");
                    return Ok(SubmitOutcome::Submitted(ActivationJob {
                        property_id: property_id.clone(),
                        version,
                        network,
                        kind,
                        activation_id,
                        status: ActivationStatus::New,
                        submitted_at: chrono::Utc::now(),
                    }));
                }
                Ok(SubmitReply::Warnings(warnings)) => {
                    for warning in warnings {
                        if !acks.contains(&warning.message_id) {
                            acks.push(warning.message_id.clone());
                        }
                        if !collected.iter().any(|w| w.message_id == warning.message_id) {
                            collected.push(warning);
                        }
                    }
                    if resubmits >= self.config.max_warning_resubmits {
                        warn!(attempts = resubmits, "Warning resubmission budget exhausted");
                        return Err(ActivationError::WarningsExceeded {
                            attempts: resubmits,
                            warnings: collected,
                        });
                    }
                    resubmits += 1;
                    debug!(resubmits, acknowledged = acks.len(), "Resubmitting with acknowledgements");
                }
                Err(e) if kind == ActivationKind::Deactivate && already_inactive(&e) => {
                    info!(property_id = %property_id, %network, "Version already inactive");
                    return Ok(SubmitOutcome::AlreadyInactive);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Poll a job on the fixed interval until terminal, cancel, or deadline
    #[instrument(skip(self, ctx, options))]
    pub async fn poll_to_terminal(
        &self,
        ctx: &CallContext,
        property_id: &PropertyId,
        activation_id: &ActivationId,
        options: PollOptions,
    ) -> ActivationResult<PollOutcome> {
        let mut cancel = options.cancel;
        let deadline_at = options
            .deadline
            .map(|d| tokio::time::Instant::now() + d);

        loop {
            match self.api.get_activation(ctx, property_id, activation_id).await {
                Ok(report) => match classify(&report.statuses)? {
                    Step::Done => return Ok(PollOutcome::Active),
                    Step::Failed => return Ok(PollOutcome::Failed(report.body)),
                    Step::Continue => {}
                },
                // A transient 500 from the status endpoint means try again,
                // not that the job failed
                Err(e) if e.rejection_status() == Some(500) => {
                    debug!(activation_id = %activation_id, "Status endpoint returned 500, still pending");
                }
                Err(e) => return Err(e.into()),
            }

            tokio::select! {
                _ = tokio::time::sleep(self.config.poll_interval) => {}
                _ = wait_cancel(&mut cancel) => return Ok(PollOutcome::Cancelled),
                _ = wait_deadline(deadline_at) => return Ok(PollOutcome::Cancelled),
            }
        }
    }
}

fn classify(statuses: &[ActivationStatus]) -> ActivationResult<Step> {
    if statuses.is_empty() {
        return Err(ApiError::Protocol("activation status list is empty".to_string()).into());
    }
    if statuses
        .iter()
        .any(|s| *s != ActivationStatus::Active && !s.is_in_progress())
    {
        return Ok(Step::Failed);
    }
    if statuses.iter().all(|s| *s == ActivationStatus::Active) {
        return Ok(Step::Done);
    }
    Ok(Step::Continue)
}

/// "Version not active" / "property not active in STAGING" rejections are
/// idempotent successes when deactivating
fn already_inactive(error: &ApiError) -> bool {
    let Some(body) = error.rejection_body() else {
        return false;
    };
    let text = body
        .get("detail")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| body.to_string());
    text.to_ascii_lowercase().contains("not active")
}

async fn wait_cancel(token: &mut Option<CancelToken>) {
    match token {
        Some(token) => token.cancelled().await,
        None => std::future::pending().await,
    }
}

async fn wait_deadline(at: Option<tokio::time::Instant>) {
    match at {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}
