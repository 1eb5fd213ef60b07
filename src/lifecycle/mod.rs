//! # Host Lifecycle
//!
//! This module manages the runtime lifecycle of the keep-awake actor: starting it,
//! handing out controllers, reacting to stop hints, restarting it and tearing it down.
//!
//! ## The Host Pattern
//!
//! The actor never decides when it stops. It processes commands and, after a
//! release, sends a [`StopHint`](crate::framework::StopHint). The host owns the
//! decision:
//!
//! ```rust,ignore
//! let mut service = WakerService::simulated(WakerConfig::load()?);
//!
//! while service.next_stop_hint().await.is_some() {
//!     if service.should_stop() {
//!         service.shutdown().await?;
//!         break;
//!     }
//! }
//! ```
//!
//! ## Restart Memory
//!
//! The actor keeps no memory across instances. When `sticky` is set the host
//! remembers the last value any controller asked for and resubmits it to the fresh
//! actor in [`WakerService::restart`].
//!
//! ## Configuration & Tracing
//!
//! - [`WakerConfig`] - serde config with defaults, loaded from `WAKER_CONFIG`
//! - [`setup_tracing`] - `tracing-subscriber` setup driven by `RUST_LOG`

pub mod config;
pub mod tracing;
pub mod waker_service;

pub use config::*;
pub use self::tracing::*;
pub use waker_service::*;
