//! Keep-awake actor over the simulated platform wake lock.

pub mod error;
pub mod simulated;

pub use error::*;
pub use simulated::*;

use crate::framework::{RequestActor, RequestClient};
use crate::lifecycle::WakerConfig;

/// Creates a new keep-awake actor and its client.
///
/// The actor is not running yet; call [`RequestActor::start`] to spawn it.
pub fn new(config: &WakerConfig) -> (RequestActor<SimulatedWakeLock>, RequestClient) {
    RequestActor::new(SimulatedWakeLock::new(config.lock_tag.clone()))
}
