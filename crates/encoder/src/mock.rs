use super::{EncodeError, QrEncoder, QrImage, QrOptions};
use async_trait::async_trait;
use base64::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

/// Test double producing fake but deterministic data URIs.
#[derive(Default)]
pub struct MockEncoder {
    failure: Option<EncodeError>,
    gate: Option<Semaphore>,
    calls: AtomicUsize,
    requests: Mutex<Vec<(String, QrOptions)>>,
}

impl MockEncoder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Every encode fails with `err`.
    pub fn failing(err: EncodeError) -> Arc<Self> {
        Arc::new(Self {
            failure: Some(err),
            ..Self::default()
        })
    }

    /// Every encode waits for a matching [`MockEncoder::release`].
    pub fn gated() -> Arc<Self> {
        Arc::new(Self {
            gate: Some(Semaphore::new(0)),
            ..Self::default()
        })
    }

    /// Let one pending (or future) encode complete.
    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1);
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<(String, QrOptions)> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl QrEncoder for MockEncoder {
    async fn encode(&self, text: &str, options: &QrOptions) -> Result<QrImage, EncodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push((text.to_string(), options.clone()));
        }

        if let Some(gate) = &self.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }

        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        let payload = format!(
            "{text}|{}|{}|{}|{}",
            options.width, options.margin, options.dark, options.light
        );
        Ok(QrImage {
            data_uri: format!("data:image/png;base64,{}", BASE64_STANDARD.encode(payload)),
            size_px: options.width,
        })
    }
}
