//! Runtime: owns the mounted views and executes their commands.
//!
//! - `app` - `Runtime`, the host-facing event loop and worker threads

pub mod app;

pub use app::{Runtime, ValueChange};
