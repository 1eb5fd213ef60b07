use crate::clients::waker_client::Binding;
use crate::clients::{DesiredState, WakerClient};
use crate::framework::{
    stop_hints, ActorHandle, ActorState, HintReceiver, RequestActor, RequestClient, StopHint,
    TeardownReport, WakeCapability,
};
use crate::lifecycle::WakerConfig;
use crate::wake_actor::{SimulatedWakeLock, WakerError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// The host that owns the keep-awake actor's lifecycle.
///
/// `WakerService` is responsible for:
/// - **Lifecycle Management**: starting the actor and tearing it down (the actor never
///   stops itself)
/// - **Bindings**: handing out [`WakerClient`]s and counting how many are alive
/// - **Stop Hints**: receiving the actor's advisory hints and deciding whether they
///   apply ([`WakerService::should_stop`])
/// - **Restart Memory**: remembering the last desired state and resubmitting it to a
///   fresh actor when `sticky` is set
///
/// # Example
///
/// ```ignore
/// let mut service = WakerService::simulated(WakerConfig::default());
/// let controller = service.bind();
///
/// controller.set_keep_awake(true);
/// assert!(controller.keep_awake_state(timeout).await?);
///
/// controller.set_keep_awake(false);
/// drop(controller);
/// service.next_stop_hint().await;
/// if service.should_stop() {
///     service.shutdown().await?;
/// }
/// ```
pub struct WakerService<F> {
    config: WakerConfig,
    factory: F,
    client: RequestClient,
    handle: Option<ActorHandle>,
    hints: HintReceiver,
    bindings: Arc<AtomicUsize>,
    desired: DesiredState,
}

impl WakerService<Box<dyn Fn() -> SimulatedWakeLock + Send + Sync>> {
    /// Starts a service over a [`SimulatedWakeLock`] tagged with `config.lock_tag`.
    pub fn simulated(config: WakerConfig) -> Self {
        let tag = config.lock_tag.clone();
        Self::start(config, Box::new(move || SimulatedWakeLock::new(tag.clone())))
    }
}

impl<C, F> WakerService<F>
where
    C: WakeCapability,
    F: Fn() -> C,
{
    /// Builds a capability with `factory`, wraps it in a new actor and spawns it.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(config: WakerConfig, factory: F) -> Self {
        let (client, handle, hints) = launch(&factory);
        info!(lock_tag = %config.lock_tag, "Waker service started");
        Self {
            config,
            factory,
            client,
            handle: Some(handle),
            hints,
            bindings: Arc::new(AtomicUsize::new(0)),
            desired: DesiredState::default(),
        }
    }

    /// Hands out a controller bound to the current actor.
    ///
    /// The binding lasts until the last clone of the returned client is dropped.
    /// Clients bound before a [`restart`](Self::restart) keep pointing at the old,
    /// stopped actor; bind again afterwards.
    pub fn bind(&self) -> WakerClient {
        WakerClient::new(
            self.client.clone(),
            self.desired.clone(),
            Binding::new(self.bindings.clone()),
        )
    }

    pub fn config(&self) -> &WakerConfig {
        &self.config
    }

    /// Number of controllers currently bound.
    pub fn bindings(&self) -> usize {
        self.bindings.load(Ordering::Acquire)
    }

    pub fn state(&self) -> ActorState {
        self.client.state()
    }

    /// The last keep-awake value a controller asked for, if any.
    pub fn last_desired(&self) -> Option<bool> {
        self.desired.get()
    }

    /// Waits for the next stop hint from the actor.
    ///
    /// Hints withdrawn by a later acquire are skipped. Returns `None` once the current
    /// actor has shut down.
    pub async fn next_stop_hint(&mut self) -> Option<StopHint> {
        loop {
            self.hints.changed().await.ok()?;
            if let Some(hint) = *self.hints.borrow_and_update() {
                return Some(hint);
            }
        }
    }

    /// The stop hint the actor is currently publishing, if any.
    pub fn pending_stop_hint(&self) -> Option<StopHint> {
        *self.hints.borrow()
    }

    /// Whether a stop hint should be acted on now.
    ///
    /// A released lock alone is not enough: while a controller is bound the service
    /// stays up so the controller can keep using it. A hint that a later
    /// `SetKeepAwake(true)` has withdrawn never applies.
    pub fn should_stop(&self) -> bool {
        self.config.stop_on_release
            && self.bindings() == 0
            && self.handle.is_some()
            && self.pending_stop_hint().is_some()
    }

    /// Tears the current actor down (Running → Stopped).
    pub async fn stop(&mut self) -> Result<TeardownReport, WakerError> {
        let handle = self.handle.take().ok_or(WakerError::NotRunning)?;
        let report = handle.stop().await?;
        info!(
            processed = report.processed,
            dropped = report.dropped,
            released_on_teardown = report.released_on_teardown,
            "Waker service stopped"
        );
        Ok(report)
    }

    /// Replaces the actor with a fresh instance over a new capability.
    ///
    /// With `sticky` set, the last desired state is resubmitted to the new actor.
    pub async fn restart(&mut self) -> Result<(), WakerError> {
        if self.handle.is_some() {
            self.stop().await?;
        }

        let (client, handle, hints) = launch(&self.factory);
        self.client = client;
        self.handle = Some(handle);
        self.hints = hints;
        info!("Waker service restarted");

        match self.desired.get() {
            Some(desired) if self.config.sticky => {
                info!(desired, "Restoring last desired state");
                self.client.submit_set_keep_awake(desired);
            }
            _ => debug!("Nothing to restore"),
        }
        Ok(())
    }

    /// Stops the actor for good and consumes the service.
    pub async fn shutdown(mut self) -> Result<TeardownReport, WakerError> {
        info!("Shutting down waker service...");
        self.stop().await
    }
}

fn launch<C, F>(factory: &F) -> (RequestClient, ActorHandle, HintReceiver)
where
    C: WakeCapability,
    F: Fn() -> C,
{
    let (actor, client) = RequestActor::new(factory());
    let (hint_tx, hint_rx) = stop_hints();
    let handle = actor.start(hint_tx);
    (client, handle, hint_rx)
}
