// SPDX-License-Identifier: GPL-3.0-or-later
use serde::Deserialize;

use std::net;

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub(crate) struct StreamSettings {
    /// The address to bind the server to. Defaults to `0.0.0.0`.
    #[serde(default = "StreamSettings::default_address")]
    pub(crate) address: net::IpAddr,

    /// The port to bind the server to. Default to `80`.
    #[serde(default = "StreamSettings::default_port")]
    pub(crate) port: u16,
}

impl StreamSettings {
    fn default_address() -> net::IpAddr {
        net::IpAddr::from([0u8, 0u8, 0u8, 0u8])
    }

    fn default_port() -> u16 {
        80u16
    }
}

impl From<&StreamSettings> for net::SocketAddr {
    fn from(settings: &StreamSettings) -> Self {
        net::SocketAddr::new(settings.address, settings.port)
    }
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            address: Self::default_address(),
            port: Self::default_port(),
        }
    }
}

#[cfg(test)]
mod stream_test {
    use super::StreamSettings;
    use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

    #[test]
    fn default_settings() {
        let parsed: Result<StreamSettings, _> = toml::from_str("");
        assert!(parsed.is_ok(), "Failed to parse empty TOML");
        let parsed = parsed.unwrap();
        let expected = StreamSettings::default();
        assert_eq!(parsed, expected);
        assert_eq!(
            SocketAddr::from(&parsed),
            "0.0.0.0:80".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn ipv4_local_address() {
        let parsed: Result<StreamSettings, _> = toml::from_str("address = \"127.0.0.1\"");
        assert!(parsed.is_ok(), "Failed to parse IPv4 address");
        let parsed = parsed.unwrap();
        let expected = StreamSettings {
            address: IpAddr::from(Ipv4Addr::new(127, 0, 0, 1)),
            ..StreamSettings::default()
        };
        assert_eq!(parsed, expected);
    }

    #[test]
    fn ipv6_wildcard_address() {
        let parsed: Result<StreamSettings, _> = toml::from_str("address = \"::\"");
        assert!(parsed.is_ok(), "Failed to parse IPv6 address");
        let parsed = parsed.unwrap();
        let expected = StreamSettings {
            address: IpAddr::from(Ipv6Addr::new(0, 0, 0, 0, 0, 0, 0, 0)),
            ..StreamSettings::default()
        };
        assert_eq!(parsed, expected);
    }

    #[test]
    fn port() {
        let parsed: Result<StreamSettings, _> = toml::from_str("port = 1337");
        assert!(parsed.is_ok(), "Failed to parse port number");
        let parsed = parsed.unwrap();
        let expected = StreamSettings {
            port: 1337u16,
            ..StreamSettings::default()
        };
        assert_eq!(parsed, expected);
    }

    #[test]
    fn string_port() {
        let parsed: Result<StreamSettings, _> = toml::from_str("port = \"foo\"");
        assert!(parsed.is_err(), "Incorrectly parsed string as port number");
    }
}
