//! Controller-facing wrappers around [`RequestClient`](crate::framework::RequestClient).

pub mod controller;
pub mod waker_client;

pub use controller::*;
pub use waker_client::*;
