// nm-reconcile - Network Service Capabilities
// SPDX-License-Identifier: MIT

//! The capability surface this tool consumes from the network-management
//! service, as a trait so the reconciliation logic can be exercised against
//! an in-memory fake.

use async_trait::async_trait;
use zbus::zvariant::OwnedObjectPath;

use crate::models::{ConnectionProfile, Result};

/// NMDeviceState, decoded from the `State` property (u32).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceState {
    Unknown,
    Unmanaged,
    Unavailable,
    Disconnected,
    Prepare,
    Config,
    NeedAuth,
    IpConfig,
    IpCheck,
    Secondaries,
    Activated,
    Deactivating,
    Failed,
}

impl DeviceState {
    pub fn from_u32(raw: u32) -> Self {
        match raw {
            10 => Self::Unmanaged,
            20 => Self::Unavailable,
            30 => Self::Disconnected,
            40 => Self::Prepare,
            50 => Self::Config,
            60 => Self::NeedAuth,
            70 => Self::IpConfig,
            80 => Self::IpCheck,
            90 => Self::Secondaries,
            100 => Self::Activated,
            110 => Self::Deactivating,
            120 => Self::Failed,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Unmanaged => "unmanaged",
            Self::Unavailable => "unavailable",
            Self::Disconnected => "disconnected",
            Self::Prepare => "prepare",
            Self::Config => "config",
            Self::NeedAuth => "need-auth",
            Self::IpConfig => "ip-config",
            Self::IpCheck => "ip-check",
            Self::Secondaries => "secondaries",
            Self::Activated => "activated",
            Self::Deactivating => "deactivating",
            Self::Failed => "failed",
        }
    }
}

/// NMActiveConnectionState, decoded from the active connection's `State`
/// property (u32).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveConnectionState {
    Unknown,
    Activating,
    Activated,
    Deactivating,
    Deactivated,
}

impl ActiveConnectionState {
    pub fn from_u32(raw: u32) -> Self {
        match raw {
            1 => Self::Activating,
            2 => Self::Activated,
            3 => Self::Deactivating,
            4 => Self::Deactivated,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Activating => "activating",
            Self::Activated => "activated",
            Self::Deactivating => "deactivating",
            Self::Deactivated => "deactivated",
        }
    }
}

/// Human-readable description for NMDeviceType values this tool is likely
/// to encounter when listing devices.
pub fn device_type_description(raw: u32) -> &'static str {
    match raw {
        1 => "ethernet",
        2 => "wifi",
        5 => "bluetooth",
        10 => "bond",
        11 => "vlan",
        13 => "bridge",
        14 => "generic",
        16 => "tun",
        20 => "veth",
        22 => "dummy",
        29 => "wireguard",
        32 => "loopback",
        _ => "unknown",
    }
}

/// One physical device as reported by the service. Diagnostic only;
/// reconciliation decisions never depend on this.
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    /// Interface name (e.g., "eth0").
    pub iface: String,
    /// Device type description (e.g., "ethernet").
    pub type_description: String,
    /// Current activation state.
    pub state: DeviceState,
    /// Identifier of the connection applied to the device, when activated.
    pub active_connection_id: Option<String>,
}

/// Successful activation handle: the service-assigned active-connection
/// path and its state at the time of the reply.
#[derive(Debug, Clone)]
pub struct ActivationHandle {
    pub path: OwnedObjectPath,
    pub state: ActiveConnectionState,
}

/// The four operations consumed from the network-management service.
///
/// Backed by NetworkManager's D-Bus API in production ([`crate::nm_client::NmClient`])
/// and by an in-memory fake in tests.
#[async_trait]
pub trait NetworkService: Send + Sync {
    /// All physical devices and their current activation state.
    async fn list_devices(&self) -> Result<Vec<DeviceInfo>>;

    /// Identifiers of all stored connection profiles.
    async fn list_connection_ids(&self) -> Result<Vec<String>>;

    /// Resolve a device handle by interface name; `None` when no device
    /// with that name exists.
    async fn resolve_device(&self, iface: &str) -> Result<Option<OwnedObjectPath>>;

    /// Create the given profile and activate it on the given device.
    /// Completes once the service has accepted and started the activation.
    async fn add_and_activate(
        &self,
        profile: &ConnectionProfile,
        device: &OwnedObjectPath,
    ) -> Result<ActivationHandle>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_state_decoding() {
        assert_eq!(DeviceState::from_u32(100), DeviceState::Activated);
        assert_eq!(DeviceState::from_u32(30), DeviceState::Disconnected);
        assert_eq!(DeviceState::from_u32(7), DeviceState::Unknown);
        assert_eq!(DeviceState::Activated.as_str(), "activated");
    }

    #[test]
    fn test_active_connection_state_decoding() {
        assert_eq!(
            ActiveConnectionState::from_u32(2),
            ActiveConnectionState::Activated
        );
        assert_eq!(
            ActiveConnectionState::from_u32(99),
            ActiveConnectionState::Unknown
        );
    }

    #[test]
    fn test_device_type_description() {
        assert_eq!(device_type_description(1), "ethernet");
        assert_eq!(device_type_description(2), "wifi");
        assert_eq!(device_type_description(999), "unknown");
    }
}
