// SPDX-License-Identifier: GPL-3.0-or-later
use anyhow::anyhow;
use serde::Deserialize;
use url::Url;

use std::convert::{TryFrom, TryInto};
use std::str::FromStr;

pub(crate) const DEFAULT_MQTT_PORT: u16 = 1883;

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub(crate) struct MetricsSettings {
    /// The MQTT server to publish samples to. Only plain TCP (`mqtt://`) is supported; if no port
    /// is given 1883 is used.
    pub(crate) server: MqttUrl,

    /// The first component of every metric name.
    #[serde(default = "MetricsSettings::default_base_topic")]
    pub(crate) base_topic: String,

    /// The second component of every metric name. Defaults to the system host name.
    #[serde(default)]
    pub(crate) host: Option<String>,

    /// The client ID used when connecting to the server.
    #[serde(default = "MetricsSettings::default_client_id")]
    pub(crate) client_id: String,

    #[serde(default)]
    pub(crate) username: Option<String>,

    #[serde(default)]
    pub(crate) password: Option<String>,

    /// Interval between keep-alive pings, in seconds.
    #[serde(default = "MetricsSettings::default_keep_alive")]
    pub(crate) keep_alive: u16,
}

impl MetricsSettings {
    fn default_base_topic() -> String {
        "sentient".to_string()
    }

    fn default_client_id() -> String {
        env!("CARGO_PKG_NAME").to_string()
    }

    fn default_keep_alive() -> u16 {
        30
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(try_from = "Url")]
pub(crate) struct MqttUrl(Url);

impl MqttUrl {
    pub(crate) fn host(&self) -> &str {
        // Presence checked when the URL was validated.
        self.0.host_str().unwrap_or_default()
    }

    pub(crate) fn port(&self) -> u16 {
        self.0.port().unwrap_or(DEFAULT_MQTT_PORT)
    }
}

impl TryFrom<Url> for MqttUrl {
    type Error = anyhow::Error;

    /// Attempt to create an [MqttUrl] from a [Url].
    ///
    /// It is an error if the scheme is not 'mqtt' or if there is no host. The default port is
    /// applied if no port is given.
    fn try_from(mut url: Url) -> anyhow::Result<Self> {
        match url.scheme() {
            "mqtt" => (),
            invalid => return Err(anyhow!("invalid scheme '{}'", invalid)),
        }
        match url.host_str() {
            Some(host) if !host.is_empty() => (),
            _ => return Err(anyhow!("no MQTT server host given")),
        }
        if url.port().is_none() {
            url.set_port(Some(DEFAULT_MQTT_PORT))
                .map_err(|_| anyhow!("unable set default MQTT port"))?;
        }
        Ok(Self(url))
    }
}

impl FromStr for MqttUrl {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let url: url::Url = s.parse()?;
        url.try_into()
    }
}

#[cfg(test)]
mod test {
    use super::MetricsSettings;

    #[test]
    fn defaults() {
        let source = r#"
        server = "mqtt://127.0.0.1"
        "#;
        let parsed = toml::from_str(source);
        assert!(parsed.is_ok(), "Unable to parse TOML: {:?}", parsed);
        let parsed: MetricsSettings = parsed.unwrap();
        let expected = MetricsSettings {
            server: "mqtt://127.0.0.1".parse().unwrap(),
            base_topic: "sentient".to_string(),
            host: None,
            client_id: "thermal-fusion".to_string(),
            username: None,
            password: None,
            keep_alive: 30,
        };
        assert_eq!(parsed, expected);
    }

    #[test]
    fn host_override() {
        let source = r#"
        server = "mqtt://broker.example"
        base_topic = "greenhouse"
        host = "plantspy"
        "#;
        let parsed: MetricsSettings = toml::from_str(source).unwrap();
        assert_eq!(parsed.base_topic, "greenhouse");
        assert_eq!(parsed.host.as_deref(), Some("plantspy"));
    }

    #[test]
    fn server_required() {
        let parsed: Result<MetricsSettings, _> = toml::from_str("base_topic = \"sentient\"");
        assert!(parsed.is_err());
    }
}
