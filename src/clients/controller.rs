use crate::framework::{Callback, FrameworkError, RequestClient};
use crate::wake_actor::WakerError;
use async_trait::async_trait;
use std::time::Duration;

/// The surface a foreground toggle uses to drive the keep-awake owner.
///
/// Implementors only supply [`Controller::inner`]; the rest is provided on top of
/// the generic [`RequestClient`]. Override `set_keep_awake` to observe the values a
/// caller asks for.
#[async_trait]
pub trait Controller: Send + Sync {
    /// Access the inner submission client.
    fn inner(&self) -> &RequestClient;

    /// Ask the owner to hold (`true`) or drop (`false`) the wake lock.
    fn set_keep_awake(&self, value: bool) {
        tracing::debug!(value, "set_keep_awake");
        self.inner().submit_set_keep_awake(value);
    }

    /// Ask whether the wake lock is held. `callback` runs on the actor's task.
    fn is_keeping_awake(&self, callback: Callback<bool>) {
        tracing::debug!("is_keeping_awake");
        self.inner().submit_query(callback);
    }

    /// Query the owner and wait up to `within` for the answer.
    ///
    /// A reply that never comes means the owner is gone; that is reported as
    /// [`WakerError::OwnerUnavailable`] rather than left to hang.
    #[tracing::instrument(skip(self))]
    async fn keep_awake_state(&self, within: Duration) -> Result<bool, WakerError> {
        tracing::debug!("Sending request");
        let reply = tokio::time::timeout(within, self.inner().query())
            .await
            .map_err(|_| FrameworkError::ReplyTimeout(within))?;
        Ok(reply?)
    }
}
