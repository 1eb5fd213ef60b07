//! Actor framework for the keep-awake resource.
//!
//! This module provides the serialization point that owns the wake lock and the
//! non-blocking client used to reach it.
//!
//! # Main Components
//!
//! - [`WakeCapability`] - Trait the platform wake lock implements
//! - [`ResourceOwner`] - Idempotent holder of the capability
//! - [`RequestActor`] - The single consumer that owns the owner
//! - [`RequestClient`] - Cloneable, non-blocking submission handle
//! - [`FrameworkError`] - Common error types
//!
//! # Testing
//!
//! See [`mock`] module for a journaling capability and a ready-started mock actor.

pub mod core;
pub mod mock;
pub mod owner;

// Re-export core types for convenience
pub use self::core::*;
pub use self::owner::ResourceOwner;
