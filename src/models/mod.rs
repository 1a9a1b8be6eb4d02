// nm-reconcile - Shared Models
// SPDX-License-Identifier: MIT

//! Shared types and constants for nm-reconcile:
//!
//! - **DesiredConnection**: one configuration entry of the desired state
//! - **ConnectionProfile**: the wired-Ethernet profile shape submitted to
//!   NetworkManager, with its `a{sa{sv}}` conversion
//! - **Error**: shared error types

pub mod desired;
pub mod error;
pub mod profile;

pub use desired::DesiredConnection;
pub use error::{Error, Result};
pub use profile::{ConnectionProfile, ConnectionSettings, StaticAddress};

/// Well-known bus name of the NetworkManager service.
pub const NM_SERVICE_NAME: &str = "org.freedesktop.NetworkManager";

/// Object path of the NetworkManager manager object.
pub const NM_OBJECT_PATH: &str = "/org/freedesktop/NetworkManager";

/// Object path of the NetworkManager settings (stored connections) object.
pub const NM_SETTINGS_PATH: &str = "/org/freedesktop/NetworkManager/Settings";
