// nm-reconcile - Desired Connection Record
// SPDX-License-Identifier: MIT

//! Desired-state connection records.
//!
//! One record per configuration entry. The `method` string is carried
//! verbatim to NetworkManager, which validates it at activation time.

use serde::Deserialize;

/// One desired connection, as declared in the configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DesiredConnection {
    /// Identifier the connection should be known as.
    pub name: String,
    /// Physical interface to bind to (e.g., "eth0").
    pub iface: String,
    /// IPv4 method, e.g. "auto" (DHCP) or "manual" (static).
    pub method: String,
    /// Static IPv4 address (dotted quad), for methods that imply one.
    /// A /24 prefix is always applied.
    #[serde(default)]
    pub ipv4: Option<String>,
}
