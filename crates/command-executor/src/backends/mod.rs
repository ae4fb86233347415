//! Launcher backends
//!
//! Only local execution is provided. Other execution contexts can be added by
//! implementing the [`Launcher`](crate::launcher::Launcher) trait.

pub mod local;
pub use local::{LocalLauncher, LocalProcessHandle, MergedOutputStream};
