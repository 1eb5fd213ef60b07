use crate::clients::controller::Controller;
use crate::framework::RequestClient;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, instrument};

const UNSET: u8 = 0;
const RELEASED: u8 = 1;
const HELD: u8 = 2;

/// The last keep-awake value any bound controller asked for.
///
/// Owned by the host and shared with every client it hands out, so a restarted
/// actor can be told what it was doing before.
#[derive(Debug, Clone)]
pub struct DesiredState(Arc<AtomicU8>);

impl Default for DesiredState {
    fn default() -> Self {
        Self(Arc::new(AtomicU8::new(UNSET)))
    }
}

impl DesiredState {
    pub fn record(&self, desired: bool) {
        let value = if desired { HELD } else { RELEASED };
        self.0.store(value, Ordering::Release);
    }

    pub fn get(&self) -> Option<bool> {
        match self.0.load(Ordering::Acquire) {
            HELD => Some(true),
            RELEASED => Some(false),
            _ => None,
        }
    }
}

/// Counts one live binding until the last clone of its client is dropped.
#[derive(Debug)]
pub(crate) struct Binding {
    bindings: Arc<AtomicUsize>,
}

impl Binding {
    pub(crate) fn new(bindings: Arc<AtomicUsize>) -> Self {
        let count = bindings.fetch_add(1, Ordering::AcqRel) + 1;
        debug!(bindings = count, "Controller bound");
        Self { bindings }
    }
}

impl Drop for Binding {
    fn drop(&mut self) {
        let count = self.bindings.fetch_sub(1, Ordering::AcqRel) - 1;
        debug!(bindings = count, "Controller unbound");
    }
}

/// Client for a bound controller.
///
/// Every `set_keep_awake` is remembered in the host's [`DesiredState`] before it is
/// submitted. The binding is released when the last clone is dropped.
#[derive(Clone)]
pub struct WakerClient {
    inner: RequestClient,
    desired: DesiredState,
    _binding: Arc<Binding>,
}

impl WakerClient {
    pub(crate) fn new(inner: RequestClient, desired: DesiredState, binding: Binding) -> Self {
        Self {
            inner,
            desired,
            _binding: Arc::new(binding),
        }
    }
}

#[async_trait]
impl Controller for WakerClient {
    fn inner(&self) -> &RequestClient {
        &self.inner
    }

    #[instrument(skip(self))]
    fn set_keep_awake(&self, value: bool) {
        debug!("Sending request");
        self.desired.record(value);
        self.inner.submit_set_keep_awake(value);
    }
}
