//! Submission controller. Drives the form through
//! `Editing → Validating → {Blocked | Submitting} → Success → Editing`.
//!
//! Every mutation re-validates synchronously before returning. The only
//! temporal behaviour is the reset timer armed on success; it is owned by the
//! controller, so cancelling or dropping the controller disarms it.

use std::collections::BTreeSet;
use std::pin::Pin;
use std::time::Duration;

use chrono::Utc;
use tokio::time::{Instant, Sleep};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::currency;
use crate::errors::SubmissionError;
use crate::form::{CanonicalAmount, Field, FieldUpdate, FileRef, FormData, PaymentMethod, PledgeRecord};
use crate::sink::SubmissionSink;
use crate::store::{FormStateStore, Observer, SubscriptionId};
use crate::validator::{self, ErrorMap};

pub const DEFAULT_RESET_DELAY: Duration = Duration::from_secs(5);

pub const SUCCESS_TITLE: &str = "Pernyataan berhasil dikirim!";
pub const SUCCESS_BODY: &str =
    "Data Anda telah berhasil dikirim. Terima kasih atas Janji Iman Anda.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Editing,
    Validating,
    Blocked,
    Submitting,
    Success,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The sink accepted the pledge; the success view is up.
    Submitted,
    /// Validation failed; nothing was sent.
    Blocked(ErrorMap),
    /// The sink reported a failure; the form stays editable.
    Failed(SubmissionError),
    /// A submission arrived while the success view was showing.
    Ignored,
}

/// One-shot reset timer. Dropping it cancels it.
#[derive(Debug)]
struct ResetTimer {
    sleep: Pin<Box<Sleep>>,
}

impl ResetTimer {
    fn arm(delay: Duration) -> Self {
        Self {
            sleep: Box::pin(tokio::time::sleep(delay)),
        }
    }

    fn deadline(&self) -> Instant {
        self.sleep.deadline()
    }

    async fn elapsed(&mut self) {
        self.sleep.as_mut().await
    }
}

pub struct SubmissionController<S> {
    store: FormStateStore,
    errors: ErrorMap,
    phase: Phase,
    sink: S,
    reset_delay: Duration,
    reset_timer: Option<ResetTimer>,
    submission_error: Option<SubmissionError>,
}

impl<S: SubmissionSink> SubmissionController<S> {
    pub fn new(sink: S) -> Self {
        Self::with_reset_delay(sink, DEFAULT_RESET_DELAY)
    }

    pub fn with_reset_delay(sink: S, reset_delay: Duration) -> Self {
        let store = FormStateStore::new();
        let errors = validator::validate(store.data());
        Self {
            store,
            errors,
            phase: Phase::Editing,
            sink,
            reset_delay,
            reset_timer: None,
            submission_error: None,
        }
    }

    // ─────────────────────────────────────────────────────────
    // Read side
    // ─────────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn data(&self) -> &FormData {
        self.store.data()
    }

    pub fn touched(&self) -> &BTreeSet<Field> {
        self.store.touched()
    }

    /// Every current error, touched or not.
    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    /// Errors for fields the user has touched.
    pub fn visible_errors(&self) -> ErrorMap {
        self.errors.filtered(|f| self.store.is_touched(f))
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_valid()
    }

    /// Amount as shown in the input, e.g. `IDR 100.000`.
    pub fn display_amount(&self) -> String {
        currency::to_display(self.store.data().faith_promise.as_str())
    }

    /// The proof upload is only offered for transfers.
    pub fn proof_visible(&self) -> bool {
        self.store.data().payment_method == Some(PaymentMethod::Transfer)
    }

    pub fn submission_error(&self) -> Option<&SubmissionError> {
        self.submission_error.as_ref()
    }

    pub fn reset_pending(&self) -> bool {
        self.reset_timer.is_some()
    }

    pub fn reset_deadline(&self) -> Option<Instant> {
        self.reset_timer.as_ref().map(ResetTimer::deadline)
    }

    pub fn subscribe(&mut self, observer: Observer) -> SubscriptionId {
        self.store.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    // ─────────────────────────────────────────────────────────
    // Editing
    // ─────────────────────────────────────────────────────────

    /// Write one field and re-validate. Returns `false` (and changes
    /// nothing) while the success view is showing.
    pub fn set_field(&mut self, update: FieldUpdate) -> bool {
        if self.phase == Phase::Success {
            debug!("Ignoring {} edit during success view", update.field());
            return false;
        }
        self.store.set_field(update);
        self.revalidate();
        true
    }

    pub fn input_full_name(&mut self, value: &str) -> bool {
        self.set_field(FieldUpdate::FullName(value.to_string()))
    }

    /// Takes the raw field content; only its digits are kept.
    pub fn input_faith_promise(&mut self, raw: &str) -> bool {
        self.set_field(FieldUpdate::FaithPromise(CanonicalAmount::from_input(raw)))
    }

    /// Switching away from Transfer keeps any attached proof.
    pub fn select_payment_method(&mut self, method: PaymentMethod) -> bool {
        self.set_field(FieldUpdate::PaymentMethod(Some(method)))
    }

    pub fn attach_proof(&mut self, file: FileRef) -> bool {
        if !self.set_field(FieldUpdate::ProofOfTransfer(Some(file))) {
            return false;
        }
        self.blur(Field::ProofOfTransfer);
        true
    }

    /// The user left `field`.
    pub fn blur(&mut self, field: Field) {
        if self.phase == Phase::Success {
            return;
        }
        self.store.mark_touched(field);
        self.revalidate();
    }

    fn revalidate(&mut self) {
        let resume = self.phase;
        self.transition(Phase::Validating);
        self.errors = validator::validate(self.store.data());
        self.transition(resume);
    }

    // ─────────────────────────────────────────────────────────
    // Submission
    // ─────────────────────────────────────────────────────────

    pub async fn submit(&mut self) -> SubmitOutcome {
        if self.phase == Phase::Success {
            debug!("Submit ignored while success view is showing");
            return SubmitOutcome::Ignored;
        }

        self.cancel_reset();
        self.submission_error = None;

        self.transition(Phase::Validating);
        self.errors = validator::validate(self.store.data());
        for field in Field::REQUIRED {
            self.store.mark_touched(field);
        }

        let record = match PledgeRecord::from_form(self.store.data(), Utc::now()) {
            Some(record) if self.errors.is_valid() => record,
            _ => {
                self.transition(Phase::Blocked);
                info!("Submission blocked by {} field error(s)", self.errors.len());
                self.transition(Phase::Editing);
                return SubmitOutcome::Blocked(self.errors.clone());
            }
        };

        self.transition(Phase::Submitting);
        match self.sink.submit(&record).await {
            Ok(()) => {
                info!(
                    "Pledge submitted: {} ({})",
                    record.full_name,
                    currency::to_display(&record.faith_promise)
                );
                self.transition(Phase::Success);
                self.reset_timer = Some(ResetTimer::arm(self.reset_delay));
                SubmitOutcome::Submitted
            }
            Err(e) => {
                warn!("Submission failed: {e}");
                self.submission_error = Some(e.clone());
                self.transition(Phase::Blocked);
                self.transition(Phase::Editing);
                SubmitOutcome::Failed(e)
            }
        }
    }

    /// [`Self::submit`], abandoned if `cancel` fires first. An abandoned
    /// submission returns `None` and leaves the form editable with its data
    /// intact; whether the sink recorded the pledge is unknown.
    pub async fn submit_or_cancel(&mut self, cancel: &CancellationToken) -> Option<SubmitOutcome> {
        let outcome = tokio::select! {
            outcome = self.submit() => Some(outcome),
            _ = cancel.cancelled() => None,
        };
        if outcome.is_none() {
            warn!("Submission abandoned on shutdown");
            self.transition(Phase::Editing);
        }
        outcome
    }

    /// Resolves once the armed reset timer fires and the form has been reset.
    /// Never resolves while no reset is pending.
    ///
    /// Cancel-safe: if dropped before the timer fires, the timer stays armed.
    pub async fn wait_for_reset(&mut self) {
        match self.reset_timer.as_mut() {
            Some(timer) => timer.elapsed().await,
            None => std::future::pending::<()>().await,
        }
        self.complete_reset();
    }

    /// Empty the form, clear the touched set and leave the success view.
    pub fn complete_reset(&mut self) {
        self.reset_timer = None;
        self.store.reset();
        self.errors = validator::validate(self.store.data());
        self.transition(Phase::Editing);
        info!("Form reset");
    }

    /// Disarm the reset timer. The success view (if showing) stays up until
    /// [`Self::complete_reset`] is called. Returns whether a timer was armed.
    pub fn cancel_reset(&mut self) -> bool {
        let armed = self.reset_timer.take().is_some();
        if armed {
            debug!("Reset timer cancelled");
        }
        armed
    }

    /// Tear down the controller, releasing the reset timer.
    pub fn shutdown(mut self) {
        if self.cancel_reset() {
            info!("Controller shut down with a pending reset");
        }
    }

    fn transition(&mut self, to: Phase) {
        if self.phase != to {
            debug!("phase {:?} -> {:?}", self.phase, to);
            self.phase = to;
        }
    }
}
