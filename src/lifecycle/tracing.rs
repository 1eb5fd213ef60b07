//! # Observability & Tracing
//!
//! [`setup_tracing`] initializes structured logging with the `tracing` crate.
//!
//! ## What Gets Traced
//!
//! - **Actor Lifecycle**: `Actor started`, `Shutdown` with processed/dropped counts
//! - **Commands**: `SetKeepAwake desired=..`, `IsKeepingAwake held=..` (debug)
//! - **Wake lock**: `Wake lock acquired` / `Wake lock released` under the lock's tag
//! - **Edge cases**: commands dropped at teardown (warn), panicking reply callbacks (error)
//!
//! ## Usage Examples
//!
//! ```bash
//! # Lifecycle and lock transitions
//! RUST_LOG=info cargo run
//!
//! # Every command, every submission dropped because the actor was gone
//! RUST_LOG=debug cargo run
//!
//! # Only the actor
//! RUST_LOG=waker::framework=debug cargo run
//! ```
//!
//! **With `RUST_LOG=info`**:
//!
//! ```text
//! INFO Waker service started lock_tag="WakerService"
//! INFO Actor started resource="wake_lock"
//! INFO Wake lock acquired tag="WakerService" acquisitions=1
//! INFO Wake lock released tag="WakerService"
//! INFO Shutdown resource="wake_lock" processed=4 dropped=0 released_on_teardown=false
//! ```

/// Initializes the tracing subscriber, filtered by `RUST_LOG`.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false) // resource/tag fields identify the source
        .compact()
        .init();
}
