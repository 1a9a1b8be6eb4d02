// nm-reconcile - Connection Profile Builder
// SPDX-License-Identifier: MIT

//! In-memory connection profiles and their NetworkManager wire shape.
//!
//! Profile construction is pure: no I/O, no validation. Malformed input
//! (bad method string, bad address) is rejected by NetworkManager at
//! activation time, not here.

use std::collections::HashMap;

use zbus::zvariant::Value;

use crate::models::DesiredConnection;

/// Connection type tag for wired Ethernet.
pub const CONNECTION_TYPE_ETHERNET: &str = "802-3-ethernet";

/// IPv6 method applied to every profile. This tool only manages IPv4;
/// IPv6 must not be silently auto-configured.
pub const IPV6_METHOD_IGNORE: &str = "ignore";

/// Prefix length applied to every static IPv4 address.
pub const STATIC_IPV4_PREFIX: u32 = 24;

/// The `a{sa{sv}}` settings shape NetworkManager consumes.
pub type ConnectionSettings = HashMap<String, HashMap<String, Value<'static>>>;

/// A static IPv4 address entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticAddress {
    /// Dotted-quad address, carried verbatim from the configuration.
    pub address: String,
    /// Prefix length in bits.
    pub prefix: u32,
}

/// One connection profile, built fresh per activation attempt.
///
/// Three settings blocks: connection identity, IPv4 configuration,
/// IPv6 configuration (always "ignore").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionProfile {
    /// Connection identifier (`connection.id`).
    pub id: String,
    /// Bound interface name (`connection.interface-name`).
    pub interface: String,
    /// IPv4 method, verbatim from the desired record.
    pub ipv4_method: String,
    /// Optional static IPv4 address with the fixed /24 prefix.
    pub ipv4_address: Option<StaticAddress>,
    /// IPv6 method; unconditionally [`IPV6_METHOD_IGNORE`].
    pub ipv6_method: &'static str,
}

impl ConnectionProfile {
    /// Build a wired-Ethernet profile from a desired connection record.
    pub fn build(desired: &DesiredConnection) -> Self {
        Self {
            id: desired.name.clone(),
            interface: desired.iface.clone(),
            ipv4_method: desired.method.clone(),
            ipv4_address: desired.ipv4.as_ref().map(|address| StaticAddress {
                address: address.clone(),
                prefix: STATIC_IPV4_PREFIX,
            }),
            ipv6_method: IPV6_METHOD_IGNORE,
        }
    }

    /// Convert to the `a{sa{sv}}` settings map for `AddAndActivateConnection`.
    pub fn to_settings(&self) -> ConnectionSettings {
        let mut connection = HashMap::new();
        connection.insert("id".to_string(), Value::from(self.id.clone()));
        connection.insert("type".to_string(), Value::from(CONNECTION_TYPE_ETHERNET));
        connection.insert(
            "interface-name".to_string(),
            Value::from(self.interface.clone()),
        );

        let mut ipv4 = HashMap::new();
        ipv4.insert("method".to_string(), Value::from(self.ipv4_method.clone()));
        if let Some(addr) = &self.ipv4_address {
            let mut entry: HashMap<String, Value<'static>> = HashMap::new();
            entry.insert("address".to_string(), Value::from(addr.address.clone()));
            entry.insert("prefix".to_string(), Value::from(addr.prefix));
            // NM's modern address format: aa{sv} under "address-data".
            ipv4.insert("address-data".to_string(), Value::from(vec![entry]));
        }

        let mut ipv6 = HashMap::new();
        ipv6.insert("method".to_string(), Value::from(self.ipv6_method));

        let mut settings = HashMap::new();
        settings.insert("connection".to_string(), connection);
        settings.insert("ipv4".to_string(), ipv4);
        settings.insert("ipv6".to_string(), ipv6);
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desired(name: &str, iface: &str, method: &str, ipv4: Option<&str>) -> DesiredConnection {
        DesiredConnection {
            name: name.to_string(),
            iface: iface.to_string(),
            method: method.to_string(),
            ipv4: ipv4.map(str::to_string),
        }
    }

    #[test]
    fn test_build_static_profile() {
        let profile =
            ConnectionProfile::build(&desired("lan1", "eth0", "manual", Some("192.168.1.10")));
        assert_eq!(profile.id, "lan1");
        assert_eq!(profile.interface, "eth0");
        assert_eq!(profile.ipv4_method, "manual");
        assert_eq!(
            profile.ipv4_address,
            Some(StaticAddress {
                address: "192.168.1.10".to_string(),
                prefix: 24,
            })
        );
        assert_eq!(profile.ipv6_method, "ignore");
    }

    #[test]
    fn test_build_dhcp_profile_has_no_address() {
        let profile = ConnectionProfile::build(&desired("uplink", "eth1", "auto", None));
        assert_eq!(profile.ipv4_method, "auto");
        assert_eq!(profile.ipv4_address, None);
        assert_eq!(profile.ipv6_method, "ignore");
    }

    #[test]
    fn test_method_is_carried_verbatim() {
        // Validation is NM's job; an unrecognized method passes through untouched.
        let profile = ConnectionProfile::build(&desired("odd", "eth0", "link-local", None));
        assert_eq!(profile.ipv4_method, "link-local");
    }

    #[test]
    fn test_settings_map_shape() {
        let profile =
            ConnectionProfile::build(&desired("lan1", "eth0", "manual", Some("192.168.1.10")));
        let settings = profile.to_settings();

        let connection = &settings["connection"];
        assert_eq!(connection["id"], Value::from("lan1"));
        assert_eq!(connection["type"], Value::from("802-3-ethernet"));
        assert_eq!(connection["interface-name"], Value::from("eth0"));

        let ipv4 = &settings["ipv4"];
        assert_eq!(ipv4["method"], Value::from("manual"));
        assert!(ipv4.contains_key("address-data"));

        assert_eq!(settings["ipv6"]["method"], Value::from("ignore"));
    }

    #[test]
    fn test_settings_map_omits_address_data_for_dhcp() {
        let profile = ConnectionProfile::build(&desired("uplink", "eth1", "auto", None));
        let settings = profile.to_settings();
        assert!(!settings["ipv4"].contains_key("address-data"));
    }
}
