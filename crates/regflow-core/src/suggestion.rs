//! DQ rule suggestions
//!
//! Suggestions are produced by a [`SuggestionProvider`] on a background
//! task. The caller can cancel the task at any time; the task also gives up
//! after the configured timeout. Either way the outcome is reported, never
//! a hang.

use crate::error::SuggestionError;
use crate::gate::GateItem;
use async_trait::async_trait;
use regflow_records::{DqDimension, DqRule, RecordError};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

#[derive(Debug, Default)]
struct CancelState {
    cancelled: AtomicBool,
    notify: Notify,
}

/// Shared cancellation flag
///
/// Clones observe the same flag. Cancelling is idempotent.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    inner: Arc<CancelState>,
}

impl CancellationToken {
    /// Fresh, uncancelled token
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::Release);
        self.inner.notify.notify_waiters();
    }

    /// Whether cancellation was requested
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// Resolve once cancellation is requested
    pub async fn cancelled(&self) {
        loop {
            // registered before the flag check so a concurrent cancel is not missed
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

/// What to suggest rules for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionRequest {
    /// Target CDE
    pub cde: String,
    /// Dimensions still uncovered
    pub dimensions: Vec<DqDimension>,
}

/// One proposed DQ rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSuggestion {
    /// Target CDE
    pub cde: String,
    /// Dimension covered
    pub dimension: DqDimension,
    /// Proposed logic
    pub logic: String,
    /// Proposed threshold, percent
    pub threshold: f64,
    /// Provider confidence in `[0, 1]`
    pub confidence: f64,
}

impl RuleSuggestion {
    /// Convert into a DQ rule
    ///
    /// # Errors
    /// `InvalidField` when the proposal is not a valid rule.
    pub fn to_rule(&self) -> Result<DqRule, RecordError> {
        DqRule::new(self.cde.clone(), self.dimension, self.logic.clone(), self.threshold)
    }

    /// Present the proposal on an approval gate
    ///
    /// # Errors
    /// `InvalidConfidence` when the provider reported a score outside `[0, 1]`.
    pub fn to_gate_item(&self) -> Result<GateItem, crate::error::GateError> {
        GateItem::suggested(
            format!("{}:{}", self.cde, self.dimension),
            format!("{} {} rule", self.cde, self.dimension),
            format!("{} (threshold {}%)", self.logic, self.threshold),
            self.confidence,
        )
    }
}

/// Source of rule suggestions
#[async_trait]
pub trait SuggestionProvider: Send + Sync + 'static {
    /// Propose rules for the request
    async fn suggest(&self, request: SuggestionRequest)
        -> Result<Vec<RuleSuggestion>, SuggestionError>;
}

/// Built-in provider proposing one templated rule per dimension
///
/// Waits `delay` before answering.
#[derive(Debug, Clone, Default)]
pub struct TemplateProvider {
    delay: Duration,
}

impl TemplateProvider {
    /// Provider answering after `delay`
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    fn template(cde: &str, dimension: DqDimension) -> (String, f64, f64) {
        match dimension {
            DqDimension::Completeness => (format!("{cde} IS NOT NULL"), 99.5, 0.9),
            DqDimension::Accuracy => (format!("{cde} MATCHES golden_source.{cde}"), 98.0, 0.7),
            DqDimension::Validity => (format!("{cde} CONFORMS TO domain({cde})"), 99.0, 0.85),
            DqDimension::Consistency => (format!("{cde} EQUALS upstream.{cde}"), 97.0, 0.75),
            DqDimension::Timeliness => (format!("{cde}_loaded_at <= reporting_cutoff"), 100.0, 0.8),
            DqDimension::Uniqueness => (format!("COUNT(DISTINCT {cde}) = COUNT({cde})"), 100.0, 0.9),
            DqDimension::Integrity => (format!("{cde} REFERENCES master({cde})"), 99.0, 0.65),
        }
    }
}

#[async_trait]
impl SuggestionProvider for TemplateProvider {
    async fn suggest(
        &self,
        request: SuggestionRequest,
    ) -> Result<Vec<RuleSuggestion>, SuggestionError> {
        if request.cde.trim().is_empty() {
            return Err(SuggestionError::Provider("CDE name is empty".to_string()));
        }
        tokio::time::sleep(self.delay).await;
        Ok(request
            .dimensions
            .iter()
            .map(|dimension| {
                let (logic, threshold, confidence) = Self::template(&request.cde, *dimension);
                RuleSuggestion {
                    cde: request.cde.clone(),
                    dimension: *dimension,
                    logic,
                    threshold,
                    confidence,
                }
            })
            .collect())
    }
}

/// How a suggestion task ended
#[derive(Debug, Clone, PartialEq)]
pub enum SuggestionOutcome {
    /// Provider answered
    Ready(Vec<RuleSuggestion>),
    /// Provider failed or the task died
    Failed(SuggestionError),
    /// Caller cancelled
    Cancelled,
    /// No answer within the timeout
    TimedOut,
}

impl SuggestionOutcome {
    /// Suggestions, when the provider answered
    ///
    /// # Errors
    /// `Failed` carries its error; cancellation and timeout are reported as
    /// `Aborted`.
    pub fn into_result(self) -> Result<Vec<RuleSuggestion>, SuggestionError> {
        match self {
            Self::Ready(suggestions) => Ok(suggestions),
            Self::Failed(err) => Err(err),
            Self::Cancelled => Err(SuggestionError::Aborted("cancelled".to_string())),
            Self::TimedOut => Err(SuggestionError::Aborted("timed out".to_string())),
        }
    }
}

/// Running suggestion request
///
/// Dropping the task cancels it.
#[derive(Debug)]
pub struct SuggestionTask {
    token: CancellationToken,
    handle: JoinHandle<SuggestionOutcome>,
}

impl SuggestionTask {
    /// Spawn `provider` on the current runtime
    pub fn spawn<P: SuggestionProvider>(
        provider: Arc<P>,
        request: SuggestionRequest,
        timeout: Duration,
    ) -> Self {
        let token = CancellationToken::new();
        let watch = token.clone();
        let cde = request.cde.clone();

        let handle = tokio::spawn(async move {
            tokio::select! {
                biased;
                () = watch.cancelled() => {
                    tracing::warn!(%cde, "suggestion cancelled");
                    SuggestionOutcome::Cancelled
                }
                result = tokio::time::timeout(timeout, provider.suggest(request)) => match result {
                    Ok(Ok(suggestions)) => {
                        tracing::debug!(%cde, count = suggestions.len(), "suggestions ready");
                        SuggestionOutcome::Ready(suggestions)
                    }
                    Ok(Err(err)) => {
                        tracing::warn!(%cde, error = %err, "suggestion failed");
                        SuggestionOutcome::Failed(err)
                    }
                    Err(_) => {
                        tracing::warn!(%cde, ?timeout, "suggestion timed out");
                        SuggestionOutcome::TimedOut
                    }
                },
            }
        });

        Self { token, handle }
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Token observing this task
    #[must_use]
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Wait for the task to finish
    pub async fn outcome(mut self) -> SuggestionOutcome {
        match (&mut self.handle).await {
            Ok(outcome) => outcome,
            Err(err) => SuggestionOutcome::Failed(SuggestionError::Aborted(err.to_string())),
        }
    }
}

impl Drop for SuggestionTask {
    fn drop(&mut self) {
        if !self.handle.is_finished() {
            self.token.cancel();
        }
    }
}
