// nm-reconcile - Error Types
// SPDX-License-Identifier: MIT

//! Shared error types for nm-reconcile.

use thiserror::Error;

/// Result type alias for nm-reconcile operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for nm-reconcile operations.
#[derive(Debug, Error)]
pub enum Error {
    // ========================================
    // D-Bus Errors
    // ========================================
    #[error("D-Bus error: {0}")]
    Dbus(String),

    #[error("NetworkManager D-Bus error: {0}")]
    NetworkManagerDbus(String),

    #[error("D-Bus connection failed: {0}")]
    DbusConnectionFailed(String),

    // ========================================
    // Activation Errors
    // ========================================
    #[error("Activation failed: {0}")]
    ActivationFailed(String),

    #[error("Activation of {name:?} timed out after {seconds}s")]
    ActivationTimeout { name: String, seconds: u64 },

    // ========================================
    // Configuration Errors
    // ========================================
    #[error("Configuration not found: {0}")]
    ConfigNotFound(String),

    #[error("Failed to read configuration: {0}")]
    ConfigReadFailed(String),

    #[error("Failed to parse configuration: {0}")]
    ConfigParseFailed(String),

    // ========================================
    // System Errors
    // ========================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// Convert from zbus errors
impl From<zbus::Error> for Error {
    fn from(err: zbus::Error) -> Self {
        Error::Dbus(err.to_string())
    }
}

// Convert from YAML parse errors
impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::ConfigParseFailed(err.to_string())
    }
}
