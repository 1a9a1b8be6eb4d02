// nm-reconcile - NetworkManager D-Bus Client
// SPDX-License-Identifier: MIT

//! Async D-Bus client for the org.freedesktop.NetworkManager service.

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::{debug, error};
use zbus::zvariant::{ObjectPath, OwnedObjectPath, OwnedValue, Value};
use zbus::Connection;

use crate::models::{
    ConnectionProfile, Error, Result, NM_OBJECT_PATH, NM_SERVICE_NAME, NM_SETTINGS_PATH,
};
use crate::service::{
    device_type_description, ActivationHandle, ActiveConnectionState, DeviceInfo, DeviceState,
    NetworkService,
};

const NM_MANAGER_INTERFACE: &str = "org.freedesktop.NetworkManager";
const NM_DEVICE_INTERFACE: &str = "org.freedesktop.NetworkManager.Device";
const NM_ACTIVE_INTERFACE: &str = "org.freedesktop.NetworkManager.Connection.Active";
const NM_SETTINGS_INTERFACE: &str = "org.freedesktop.NetworkManager.Settings";
const NM_SETTINGS_CONNECTION_INTERFACE: &str = "org.freedesktop.NetworkManager.Settings.Connection";
const DBUS_PROPERTIES_INTERFACE: &str = "org.freedesktop.DBus.Properties";

/// Error reply name for "no device with that interface name".
const UNKNOWN_DEVICE_ERROR: &str = "org.freedesktop.NetworkManager.UnknownDevice";

/// D-Bus client for the NetworkManager daemon on the system bus.
pub struct NmClient {
    connection: Connection,
}

impl NmClient {
    /// Connect to NetworkManager via the system bus.
    pub async fn connect() -> Result<Self> {
        match Connection::system().await {
            Ok(connection) => {
                debug!("Connected to system D-Bus");
                Ok(Self { connection })
            }
            Err(e) => {
                error!("Failed to connect to system D-Bus: {}", e);
                Err(Error::DbusConnectionFailed(e.to_string()))
            }
        }
    }

    /// The daemon's reported version string.
    pub async fn daemon_version(&self) -> Result<String> {
        self.get_property(NM_OBJECT_PATH, NM_MANAGER_INTERFACE, "Version")
            .await
    }

    /// Read one property via org.freedesktop.DBus.Properties.
    async fn get_property<T>(&self, path: &str, interface: &str, name: &str) -> Result<T>
    where
        T: TryFrom<OwnedValue>,
        T::Error: std::fmt::Display,
    {
        let reply = self
            .connection
            .call_method(
                Some(NM_SERVICE_NAME),
                path,
                Some(DBUS_PROPERTIES_INTERFACE),
                "Get",
                &(interface, name),
            )
            .await?;
        let value: OwnedValue = reply.body().deserialize()?;
        T::try_from(value).map_err(|e| {
            Error::NetworkManagerDbus(format!(
                "unexpected type for property {interface}.{name}: {e}"
            ))
        })
    }

    /// Identifier of the connection applied to an active-connection object.
    async fn active_connection_id(&self, path: &OwnedObjectPath) -> Result<String> {
        self.get_property(path.as_str(), NM_ACTIVE_INTERFACE, "Id")
            .await
    }
}

#[async_trait]
impl NetworkService for NmClient {
    async fn list_devices(&self) -> Result<Vec<DeviceInfo>> {
        let reply = self
            .connection
            .call_method(
                Some(NM_SERVICE_NAME),
                NM_OBJECT_PATH,
                Some(NM_MANAGER_INTERFACE),
                "GetDevices",
                &(),
            )
            .await?;
        let paths: Vec<OwnedObjectPath> = reply.body().deserialize()?;

        let mut devices = Vec::with_capacity(paths.len());
        for path in paths {
            let iface: String = self
                .get_property(path.as_str(), NM_DEVICE_INTERFACE, "Interface")
                .await?;
            let device_type: u32 = self
                .get_property(path.as_str(), NM_DEVICE_INTERFACE, "DeviceType")
                .await?;
            let state_raw: u32 = self
                .get_property(path.as_str(), NM_DEVICE_INTERFACE, "State")
                .await?;
            let state = DeviceState::from_u32(state_raw);

            let mut active_connection_id = None;
            if state == DeviceState::Activated {
                let active_path: OwnedObjectPath = self
                    .get_property(path.as_str(), NM_DEVICE_INTERFACE, "ActiveConnection")
                    .await?;
                // "/" means no active connection despite the state.
                if active_path.as_str() != "/" {
                    match self.active_connection_id(&active_path).await {
                        Ok(id) => active_connection_id = Some(id),
                        Err(e) => debug!(
                            "Could not read active connection id for {}: {}",
                            iface, e
                        ),
                    }
                }
            }

            devices.push(DeviceInfo {
                iface,
                type_description: device_type_description(device_type).to_string(),
                state,
                active_connection_id,
            });
        }
        Ok(devices)
    }

    async fn list_connection_ids(&self) -> Result<Vec<String>> {
        let reply = self
            .connection
            .call_method(
                Some(NM_SERVICE_NAME),
                NM_SETTINGS_PATH,
                Some(NM_SETTINGS_INTERFACE),
                "ListConnections",
                &(),
            )
            .await?;
        let paths: Vec<OwnedObjectPath> = reply.body().deserialize()?;

        let mut ids = Vec::with_capacity(paths.len());
        for path in paths {
            let reply = self
                .connection
                .call_method(
                    Some(NM_SERVICE_NAME),
                    path.as_str(),
                    Some(NM_SETTINGS_CONNECTION_INTERFACE),
                    "GetSettings",
                    &(),
                )
                .await?;
            let body = reply.body();
            let settings: HashMap<String, HashMap<String, OwnedValue>> = body.deserialize()?;
            let id = settings
                .get("connection")
                .and_then(|block| block.get("id"))
                .and_then(|value| match &**value {
                    Value::Str(s) => Some(s.to_string()),
                    _ => None,
                });
            if let Some(id) = id {
                debug!("  - {}  ---  {}", id, path.as_str());
                ids.push(id);
            } else {
                debug!("Stored connection {} has no id; skipping", path.as_str());
            }
        }
        Ok(ids)
    }

    async fn resolve_device(&self, iface: &str) -> Result<Option<OwnedObjectPath>> {
        let result = self
            .connection
            .call_method(
                Some(NM_SERVICE_NAME),
                NM_OBJECT_PATH,
                Some(NM_MANAGER_INTERFACE),
                "GetDeviceByIpIface",
                &(iface,),
            )
            .await;
        match result {
            Ok(reply) => Ok(Some(reply.body().deserialize()?)),
            Err(zbus::Error::MethodError(name, _, _)) if name.as_str() == UNKNOWN_DEVICE_ERROR => {
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn add_and_activate(
        &self,
        profile: &ConnectionProfile,
        device: &OwnedObjectPath,
    ) -> Result<ActivationHandle> {
        let settings = profile.to_settings();
        let reply = self
            .connection
            .call_method(
                Some(NM_SERVICE_NAME),
                NM_OBJECT_PATH,
                Some(NM_MANAGER_INTERFACE),
                "AddAndActivateConnection",
                // "/" as the specific object: no preference for an
                // access point or similar.
                &(settings, device, ObjectPath::from_static_str_unchecked("/")),
            )
            .await
            .map_err(|e| Error::ActivationFailed(e.to_string()))?;
        let (_settings_path, active_path): (OwnedObjectPath, OwnedObjectPath) =
            reply.body().deserialize()?;

        let state = match self
            .get_property::<u32>(active_path.as_str(), NM_ACTIVE_INTERFACE, "State")
            .await
        {
            Ok(raw) => ActiveConnectionState::from_u32(raw),
            Err(e) => {
                debug!(
                    "Could not read activation state for {}: {}",
                    active_path.as_str(),
                    e
                );
                ActiveConnectionState::Unknown
            }
        };

        Ok(ActivationHandle {
            path: active_path,
            state,
        })
    }
}
