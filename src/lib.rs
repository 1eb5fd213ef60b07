//! # Waker
//!
//! > **A serialized owner for a single wake lock.**
//!
//! A foreground toggle asks a background owner to hold or drop a wake lock (the thing
//! that keeps a device from suspending) and to report whether it currently holds it.
//! Requests can come from anywhere, at any time, concurrently. This crate routes all of
//! them through one actor so the lock is only ever touched from a single task.
//!
//! ## 🏗️ Design
//!
//! ### Single writer, message passing
//!
//! The lock is one mutable bit shared by uncoordinated callers (clicks, rebinds,
//! restarts). Instead of locking it, every request is a [`Command`](framework::Command)
//! sent through a mailbox to a [`RequestActor`](framework::RequestActor), which:
//! - handles commands **one at a time, oldest first** (no reordering, no coalescing),
//! - answers queries by calling the caller's one-shot callback **from its own task**,
//! - never blocks a caller: submission only enqueues.
//!
//! ### Nothing is fatal
//!
//! A command sent to an actor that is not running is dropped silently. A query that is
//! dropped never gets a reply; callers that care use a timeout
//! ([`Controller::keep_awake_state`](clients::Controller::keep_awake_state)). Double
//! acquire and double release are no-ops.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Engine ([`framework`])
//! - **Role**: the actor, its mailbox and the idempotent [`ResourceOwner`](framework::ResourceOwner).
//! - **Key items**: [`WakeCapability`](framework::WakeCapability),
//!   [`RequestActor`](framework::RequestActor), [`RequestClient`](framework::RequestClient).
//!
//! ### 2. The Host ([`lifecycle`])
//! - **Role**: starts and stops the actor, hands out controllers, acts on stop hints,
//!   restarts with the last desired state.
//! - **Key items**: [`WakerService`](lifecycle::WakerService), [`WakerConfig`](lifecycle::WakerConfig).
//!
//! ### 3. The Interface ([`clients`])
//! - **Role**: what a toggle talks to.
//! - **Key items**: [`Controller`](clients::Controller), [`WakerClient`](clients::WakerClient).
//!
//! ### 4. The Platform ([`wake_actor`])
//! - **Role**: the simulated wake lock and the crate's error type.
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! RUST_LOG=info cargo run
//! ```
//!
//! ```bash
//! cargo test
//! ```

pub mod clients;
pub mod framework;
pub mod lifecycle;
pub mod wake_actor;
