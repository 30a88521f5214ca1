//! Result type alias shared across the workspace.
//!
//! This module defines a convenient alias that defaults the error type to the
//! common `GoldError`, so functions can simply return `Result<T>`.
use crate::error::GoldError;

/// Workspace-wide `Result` alias with `GoldError` as the default error.
pub type Result<T, E = GoldError> = std::result::Result<T, E>;
