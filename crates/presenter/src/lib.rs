pub mod navigate;

use encoder::{QrEncoder, QrImage, QrOptions};
use itqr_core::parsing::{intent_fingerprint, parse_amount};
use itqr_core::{Amount, PaymentStatus, DIRECT_PAYMENT_FAILED, QR_GENERATION_FAILED};
use navigate::Navigator;
use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;

/// What the page renders. Published after every state change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PresenterSnapshot {
    pub intent: String,
    pub amount: Amount,
    pub amount_display: String,
    pub qr_url: Option<String>,
    /// Off-screen copy of the last rendered code. Survives edits.
    pub hidden_qr_url: Option<String>,
    pub error: Option<String>,
    pub status: PaymentStatus,
    pub loading: bool,
    pub can_submit: bool,
}

#[derive(Debug, Default)]
struct PresenterState {
    intent: String,
    amount: Amount,
    qr: Option<QrImage>,
    hidden_qr: Option<QrImage>,
    error: Option<String>,
    status: PaymentStatus,
    loading: bool,
    // bumped on every edit; an encode started under an older revision is stale
    revision: u64,
}

impl PresenterState {
    fn trimmed_intent(&self) -> &str {
        self.intent.trim()
    }

    fn can_submit(&self) -> bool {
        !self.loading && !self.trimmed_intent().is_empty()
    }

    /// Best-effort: any parse failure leaves the previous amount in place.
    fn refresh_amount(&mut self) {
        match parse_amount(&self.intent) {
            Ok(amount) => self.amount = amount,
            Err(err) => tracing::trace!(error = %err, "no amount in intent"),
        }
    }

    fn snapshot(&self) -> PresenterSnapshot {
        PresenterSnapshot {
            intent: self.intent.clone(),
            amount: self.amount,
            amount_display: self.amount.to_string(),
            qr_url: self.qr.as_ref().map(|q| q.data_uri.clone()),
            hidden_qr_url: self.hidden_qr.as_ref().map(|q| q.data_uri.clone()),
            error: self.error.clone(),
            status: self.status,
            loading: self.loading,
            can_submit: self.can_submit(),
        }
    }
}

/// Turns a payment intent into either a direct app launch or a QR code.
pub struct IntentPresenter {
    encoder: Arc<dyn QrEncoder + 'static>,
    navigator: Arc<dyn Navigator + 'static>,
    options: QrOptions,
    state: Mutex<PresenterState>,
    updates: watch::Sender<PresenterSnapshot>,
}

impl IntentPresenter {
    /// Seed the presenter, optionally with an intent shared through a link.
    ///
    /// The amount is extracted from the inbound intent exactly as it is on
    /// every later edit.
    pub fn new(
        encoder: Arc<dyn QrEncoder + 'static>,
        navigator: Arc<dyn Navigator + 'static>,
        inbound: Option<String>,
    ) -> Self {
        let mut state = PresenterState {
            intent: inbound.unwrap_or_default(),
            ..PresenterState::default()
        };
        if !state.intent.is_empty() {
            tracing::info!(intent = %intent_fingerprint(&state.intent), "loaded inbound intent");
            state.refresh_amount();
        }
        let (updates, _) = watch::channel(state.snapshot());
        Self {
            encoder,
            navigator,
            options: QrOptions::payment(),
            state: Mutex::new(state),
            updates,
        }
    }

    pub fn snapshot(&self) -> PresenterSnapshot {
        self.lock().snapshot()
    }

    /// Observe every published state, including the transient `processing`.
    pub fn subscribe(&self) -> watch::Receiver<PresenterSnapshot> {
        self.updates.subscribe()
    }

    pub fn can_submit(&self) -> bool {
        self.lock().can_submit()
    }

    pub fn edit_intent(&self, text: impl Into<String>) -> PresenterSnapshot {
        let text = text.into();
        self.update(move |s| {
            s.intent = text;
            s.qr = None;
            s.error = None;
            s.status = PaymentStatus::Idle;
            s.revision = s.revision.wrapping_add(1);
            s.refresh_amount();
        });
        self.snapshot()
    }

    /// Hand the intent to the platform's UPI handler. Never changes the status.
    pub fn submit_direct(&self) -> PresenterSnapshot {
        let intent = {
            let state = self.lock();
            if !state.can_submit() {
                return state.snapshot();
            }
            state.trimmed_intent().to_string()
        };

        let fingerprint = intent_fingerprint(&intent);
        match self.navigator.open(&intent) {
            Ok(()) => tracing::info!(intent = %fingerprint, "opened UPI intent"),
            Err(err) => {
                tracing::warn!(intent = %fingerprint, error = %err, "failed to open UPI intent");
                self.update(|s| s.error = Some(DIRECT_PAYMENT_FAILED.to_string()));
            }
        }
        self.snapshot()
    }

    /// Render the intent as a QR code.
    ///
    /// The status reads `processing` for the whole encode. A result that
    /// arrives after the intent was edited is dropped.
    pub async fn submit_qr(&self) -> PresenterSnapshot {
        let started = self.update(|s| {
            if !s.can_submit() {
                return None;
            }
            s.loading = true;
            s.status = PaymentStatus::Processing;
            Some((s.trimmed_intent().to_string(), s.revision))
        });
        let Some((intent, revision)) = started else {
            return self.snapshot();
        };
        let loading = LoadingGuard {
            presenter: self,
            revision,
        };

        let fingerprint = intent_fingerprint(&intent);
        tracing::debug!(intent = %fingerprint, "generating QR code");
        let result = self.encoder.encode(&intent, &self.options).await;

        self.update(|s| {
            if s.revision != revision {
                tracing::debug!(intent = %fingerprint, "intent edited during encode, dropping result");
                return;
            }
            match result {
                Ok(image) => {
                    tracing::info!(intent = %fingerprint, "QR code ready");
                    s.hidden_qr = Some(image.clone());
                    s.qr = Some(image);
                    s.error = None;
                    s.status = PaymentStatus::Success;
                }
                Err(err) => {
                    tracing::warn!(intent = %fingerprint, error = %err, "QR encoding failed");
                    s.error = Some(QR_GENERATION_FAILED.to_string());
                    s.status = PaymentStatus::Error;
                }
            }
        });
        drop(loading);
        self.snapshot()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, PresenterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn update<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut PresenterState) -> R,
    {
        let (out, next) = {
            let mut state = self.lock();
            let out = f(&mut state);
            (out, state.snapshot())
        };
        self.updates.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        });
        out
    }
}

/// Clears `loading` when the encode finishes, fails, or its future is dropped.
///
/// A dropped encode never reached an outcome, so a `processing` status it set
/// falls back to `idle`.
struct LoadingGuard<'a> {
    presenter: &'a IntentPresenter,
    revision: u64,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        let revision = self.revision;
        self.presenter.update(|s| {
            s.loading = false;
            if s.revision == revision && s.status == PaymentStatus::Processing {
                s.status = PaymentStatus::Idle;
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoder::mock::MockEncoder;
    use navigate::RecordingNavigator;

    fn presenter(inbound: Option<&str>) -> IntentPresenter {
        IntentPresenter::new(
            MockEncoder::new(),
            Arc::new(RecordingNavigator::new()),
            inbound.map(str::to_string),
        )
    }

    #[test]
    fn starts_idle_and_empty() {
        let snap = presenter(None).snapshot();
        assert_eq!(snap.intent, "");
        assert_eq!(snap.status, PaymentStatus::Idle);
        assert_eq!(snap.amount, Amount::ZERO);
        assert!(!snap.can_submit);
    }

    #[test]
    fn inbound_intent_seeds_field_and_amount() {
        let snap = presenter(Some("upi://pay?pa=merchant@bank&am=250.00")).snapshot();
        assert_eq!(snap.intent, "upi://pay?pa=merchant@bank&am=250.00");
        assert_eq!(snap.amount.value(), 250.0);
        assert_eq!(snap.amount_display, "₹250.00");
        assert!(snap.can_submit);
    }

    #[test]
    fn edit_keeps_amount_when_unparseable() {
        let p = presenter(None);
        p.edit_intent("upi://pay?am=99.5");
        assert_eq!(p.snapshot().amount.value(), 99.5);
        p.edit_intent("upi://pay?pa=x@y");
        assert_eq!(p.snapshot().amount.value(), 99.5);
        p.edit_intent("garbage");
        assert_eq!(p.snapshot().amount.value(), 99.5);
        p.edit_intent("upi://pay?am=abc");
        assert_eq!(p.snapshot().amount.value(), 99.5);
    }

    #[test]
    fn whitespace_intent_cannot_submit() {
        let p = presenter(None);
        let snap = p.edit_intent("   ");
        assert!(!snap.can_submit);
        assert!(!p.can_submit());
    }

    #[test]
    fn snapshot_serializes_for_the_page() {
        let snap = presenter(Some("upi://pay?am=1")).snapshot();
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["status"], "idle");
        assert_eq!(json["amount"], 1.0);
        assert_eq!(json["qr_url"], serde_json::Value::Null);
    }
}
