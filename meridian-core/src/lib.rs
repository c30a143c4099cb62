//! ABOUTME: Data model, error hierarchy, configuration and logging bootstrap
//! ABOUTME: shared by every crate implementing the retrieval core

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use config::CoreConfig;
pub use error::{BackendError, CoreError, Result};
